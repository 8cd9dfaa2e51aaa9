use super::view::{self, FileBlock, Tone};
use super::FileUploaderApp;
use eframe::egui::{self, Color32, RichText};

impl FileUploaderApp {
    pub fn render(&mut self, ctx: &egui::Context) {
        let view = view::present(self.controller.state());

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.add_space(20.0);
                ui.vertical_centered(|ui| {
                    ui.heading("File Uploader");
                    ui.add_space(5.0);
                    ui.label(
                        RichText::new(format!("Files are sent to {}", self.endpoint_label))
                            .color(ui.visuals().text_color().gamma_multiply(0.7)),
                    );
                });

                ui.add_space(20.0);

                ui.group(|ui| {
                    ui.horizontal(|ui| {
                        if ui.button("📁 Choose Files").clicked() {
                            self.pick_files();
                        }
                        let count = self.controller.selection().len();
                        if count > 0 {
                            ui.label(format!("{} selected", count));
                        }
                    });
                });

                ui.add_space(10.0);

                for block in &view.files {
                    render_file_block(ui, block);
                    ui.add_space(6.0);
                }

                if let Some(label) = view.upload_label {
                    ui.add_space(10.0);
                    ui.vertical_centered(|ui| {
                        ui.add_enabled_ui(view.upload_enabled, |ui| {
                            let button =
                                egui::Button::new(label).min_size(egui::vec2(200.0, 40.0));
                            if ui.add(button).clicked() {
                                self.controller.submit();
                            }
                        });
                    });
                }

                if let Some(line) = &view.status_line {
                    ui.add_space(15.0);
                    ui.vertical_centered(|ui| {
                        ui.colored_label(tone_color(line.tone), line.text);
                    });
                }
            });
        });
    }
}

fn render_file_block(ui: &mut egui::Ui, block: &FileBlock) {
    egui::Frame::none()
        .fill(ui.style().visuals.extreme_bg_color)
        .inner_margin(8.0)
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(RichText::new(block.heading.as_str()).strong());
            ui.label(block.name.as_str());
            ui.label(block.mime_type.as_str());
            ui.label(block.size.as_str());
        });
}

fn tone_color(tone: Tone) -> Color32 {
    match tone {
        Tone::Pending => Color32::from_rgb(150, 150, 150),
        Tone::Good => Color32::from_rgb(0, 180, 0),
        Tone::Bad => Color32::from_rgb(220, 50, 50),
    }
}
