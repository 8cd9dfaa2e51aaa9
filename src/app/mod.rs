mod controller;
mod state;
mod ui;
pub mod view;

pub use controller::UploadController;
pub use state::{Command, Event, UploadState};

use crate::upload::{Selection, UploadEndpoint, UploadStatus};
use eframe::{egui, App};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;

pub struct FileUploaderApp {
    controller: UploadController,
    endpoint_label: String,
}

impl FileUploaderApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        endpoint: Arc<dyn UploadEndpoint>,
        endpoint_label: String,
        runtime: Handle,
    ) -> Self {
        tracing::info!(endpoint = %endpoint_label, "initializing file uploader");
        Self {
            controller: UploadController::new(endpoint, runtime),
            endpoint_label,
        }
    }

    fn pick_files(&mut self) {
        let Some(paths) = rfd::FileDialog::new().pick_files() else {
            return;
        };
        self.controller.choose_files(Selection::from_paths(paths));
    }

    pub fn update_state(&mut self, ctx: &egui::Context) {
        if self.controller.poll() {
            ctx.request_repaint();
        }
        if self.controller.status() == UploadStatus::Uploading {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}

impl App for FileUploaderApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.update_state(ctx);
        self.render(ctx);
    }
}
