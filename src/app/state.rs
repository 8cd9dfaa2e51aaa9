use crate::error::UploadError;
use crate::upload::{Selection, UploadStatus};
use serde_json::Value;

/// Inputs to the uploader's state machine.
#[derive(Debug)]
pub enum Event {
    FilesChosen(Selection),
    SubmitRequested,
    UploadResolved {
        generation: u64,
        outcome: Result<Value, UploadError>,
    },
}

/// Work the caller must start after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Dispatch {
        generation: u64,
        selection: Selection,
    },
}

/// Everything the uploader knows: the current pick and where its upload is.
///
/// `generation` advances on every new selection. An upload is tagged with the
/// generation it was started in, and a resolution carrying any other
/// generation is discarded.
#[derive(Debug, Default)]
pub struct UploadState {
    selection: Selection,
    status: UploadStatus,
    generation: u64,
}

impl UploadState {
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn status(&self) -> UploadStatus {
        self.status
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn can_submit(&self) -> bool {
        !self.selection.is_empty() && self.status != UploadStatus::Uploading
    }

    pub fn apply(&mut self, event: Event) -> Option<Command> {
        match event {
            Event::FilesChosen(selection) => {
                self.generation += 1;
                tracing::info!(
                    files = selection.len(),
                    generation = self.generation,
                    previous = ?self.status,
                    "files chosen"
                );
                self.selection = selection;
                self.status = UploadStatus::Idle;
                None
            }
            Event::SubmitRequested => {
                if self.selection.is_empty() {
                    tracing::debug!("submit ignored, nothing selected");
                    return None;
                }
                if self.status == UploadStatus::Uploading {
                    tracing::debug!(generation = self.generation, "submit ignored, upload in flight");
                    return None;
                }
                self.status = UploadStatus::Uploading;
                Some(Command::Dispatch {
                    generation: self.generation,
                    selection: self.selection.clone(),
                })
            }
            Event::UploadResolved {
                generation,
                outcome,
            } => {
                if generation != self.generation || self.status != UploadStatus::Uploading {
                    tracing::debug!(
                        generation,
                        current = self.generation,
                        "discarding stale upload resolution"
                    );
                    return None;
                }
                self.status = match outcome {
                    Ok(_) => {
                        tracing::info!(generation, "upload succeeded");
                        UploadStatus::Success
                    }
                    Err(e) => {
                        tracing::warn!(generation, error = %e, "upload failed");
                        UploadStatus::Fail
                    }
                };
                None
            }
        }
    }
}
