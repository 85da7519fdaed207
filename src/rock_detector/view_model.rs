use crate::rock_detector::core::{CameraStatus, Model};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Positive,
    Negative,
}

/// Positive when the verdict contains "yes" in any case.
pub fn tone_of(text: &str) -> Tone {
    if text.to_lowercase().contains("yes") {
        Tone::Positive
    } else {
        Tone::Negative
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonView {
    pub label: &'static str,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraView {
    Closed {
        open_button: ButtonView,
        error: Option<String>,
    },
    Live {
        analyze_button: ButtonView,
        stop_button: ButtonView,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewModel {
    pub camera: CameraView,
    pub show_spinner: bool,
    pub result: Option<(String, Tone)>,
}

impl ViewModel {
    pub fn from_model(model: &Model) -> Self {
        let analyzing = model.analyzing();

        let camera = match model.camera {
            CameraStatus::Active { .. } => CameraView::Live {
                analyze_button: ButtonView {
                    label: if analyzing {
                        "Analyzing..."
                    } else {
                        "Check for Rock"
                    },
                    enabled: !analyzing,
                },
                stop_button: ButtonView {
                    label: "Stop Camera",
                    enabled: !analyzing,
                },
            },
            CameraStatus::Starting => CameraView::Closed {
                open_button: ButtonView {
                    label: "Opening camera...",
                    enabled: false,
                },
                error: None,
            },
            CameraStatus::Inactive => CameraView::Closed {
                open_button: ButtonView {
                    label: "Open Camera",
                    enabled: true,
                },
                error: model.camera_error.clone(),
            },
        };

        let result = model
            .result_text
            .as_ref()
            .filter(|text| !text.is_empty())
            .map(|text| (text.clone(), tone_of(text)));

        Self {
            camera,
            show_spinner: analyzing,
            result,
        }
    }
}
