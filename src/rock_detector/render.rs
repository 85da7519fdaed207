use crate::config::Config;
use crate::rock_detector::core::Msg;
use crate::rock_detector::main::RockDetector;
use crate::rock_detector::view_model::{CameraView, Tone, ViewModel};
use egui::load::SizedTexture;

const POSITIVE_COLOR: egui::Color32 = egui::Color32::from_rgb(46, 125, 50);
const NEGATIVE_COLOR: egui::Color32 = egui::Color32::from_rgb(198, 40, 40);

pub struct RockDetectorApp {
    config: Config,
    detector: RockDetector,
    preview: Option<egui::TextureHandle>,
    preview_version: u64,
}

impl RockDetectorApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: Config, detector: RockDetector) -> Self {
        let ctx = cc.egui_ctx.clone();
        detector.set_waker(move || ctx.request_repaint());

        Self {
            config,
            detector,
            preview: None,
            preview_version: 0,
        }
    }

    fn refresh_preview(&mut self, ctx: &egui::Context) {
        let Some((version, frame)) = self.detector.surface().frame_since(self.preview_version)
        else {
            return;
        };
        self.preview_version = version;

        match frame {
            Some(frame) => {
                let image = egui::ColorImage::from_rgb(
                    [frame.width() as usize, frame.height() as usize],
                    frame.as_raw(),
                );
                match &mut self.preview {
                    Some(texture) => texture.set(image, egui::TextureOptions::LINEAR),
                    None => {
                        self.preview = Some(ctx.load_texture(
                            "camera-preview",
                            image,
                            egui::TextureOptions::LINEAR,
                        ))
                    }
                }
            }
            None => self.preview = None,
        }
    }
}

impl eframe::App for RockDetectorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.detector.process_pending();
        self.refresh_preview(ctx);

        let view = ViewModel::from_model(self.detector.model());
        let preview = self.preview.as_ref();
        let max_width = self.config.preview_max_width;
        let mut clicked = Vec::new();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(16.0);
                ui.heading("Rock Detector");
                ui.add_space(12.0);

                match &view.camera {
                    CameraView::Live {
                        analyze_button,
                        stop_button,
                    } => {
                        match preview {
                            Some(texture) => {
                                let size = texture.size_vec2();
                                let scale = (max_width / size.x).min(1.0);
                                ui.add(egui::Image::new(SizedTexture::new(
                                    texture.id(),
                                    size * scale,
                                )));
                            }
                            None => {
                                ui.label("Waiting for the first frame...");
                            }
                        }

                        ui.add_space(8.0);
                        ui.horizontal(|ui| {
                            let analyze = egui::Button::new(analyze_button.label);
                            if ui.add_enabled(analyze_button.enabled, analyze).clicked() {
                                clicked.push(Msg::AnalyzeClicked);
                            }
                            let stop = egui::Button::new(stop_button.label);
                            if ui.add_enabled(stop_button.enabled, stop).clicked() {
                                clicked.push(Msg::StopCameraClicked);
                            }
                        });
                    }
                    CameraView::Closed { open_button, error } => {
                        let open = egui::Button::new(open_button.label);
                        if ui.add_enabled(open_button.enabled, open).clicked() {
                            clicked.push(Msg::StartCameraClicked);
                        }
                        if let Some(error) = error {
                            ui.add_space(8.0);
                            ui.label(egui::RichText::new(error).color(NEGATIVE_COLOR));
                        }
                    }
                }

                if view.show_spinner {
                    ui.add_space(8.0);
                    ui.spinner();
                }

                if let Some((text, tone)) = &view.result {
                    let color = match tone {
                        Tone::Positive => POSITIVE_COLOR,
                        Tone::Negative => NEGATIVE_COLOR,
                    };
                    ui.add_space(8.0);
                    ui.label(egui::RichText::new(text).color(color).size(20.0));
                }
            });
        });

        for msg in clicked {
            self.detector.dispatch(msg);
        }
    }
}
