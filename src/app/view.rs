use super::state::UploadState;
use crate::upload::UploadStatus;
use crate::utils::file_size::human_size;

/// Metadata block shown for one selected file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileBlock {
    pub heading: String,
    pub name: String,
    pub mime_type: String,
    pub size: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Pending,
    Good,
    Bad,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub text: &'static str,
    pub tone: Tone,
}

/// What the window shows for a given selection and status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub files: Vec<FileBlock>,
    /// Label of the upload button, absent when nothing is selected
    pub upload_label: Option<&'static str>,
    pub upload_enabled: bool,
    pub status_line: Option<StatusLine>,
}

pub fn status_line(status: UploadStatus) -> Option<StatusLine> {
    match status {
        UploadStatus::Idle => None,
        UploadStatus::Uploading => Some(StatusLine {
            text: "⏳ Uploading in progress...",
            tone: Tone::Pending,
        }),
        UploadStatus::Success => Some(StatusLine {
            text: "✅ Upload succeeded!",
            tone: Tone::Good,
        }),
        UploadStatus::Fail => Some(StatusLine {
            text: "❌ Upload failed!",
            tone: Tone::Bad,
        }),
    }
}

pub fn present(state: &UploadState) -> View {
    let selection = state.selection();
    let files = selection
        .files()
        .iter()
        .enumerate()
        .map(|(index, file)| FileBlock {
            heading: format!("File number {} details:", index + 1),
            name: format!("Name: {}", file.name),
            mime_type: format!("Type: {}", file.mime_type),
            size: format!(
                "Size: {} bytes ({})",
                file.size_bytes,
                human_size(file.size_bytes)
            ),
        })
        .collect();

    let upload_label = match selection.len() {
        0 => None,
        1 => Some("📤 Upload a file"),
        _ => Some("📤 Upload files"),
    };

    View {
        files,
        upload_label,
        upload_enabled: state.can_submit(),
        status_line: status_line(state.status()),
    }
}
