use crate::camera_controller::StreamSession;
use crate::config::Config;
use crate::device_camera::interface::CameraError;
use crate::frame_capturer::interface::JpegBlob;
use crate::image_classifier::interface::Verdict;
use image::RgbImage;

pub const NO_RESPONSE_MESSAGE: &str = "No response message";
pub const ANALYZE_ERROR_MESSAGE: &str = "Error analyzing the image.";

//
//
//

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum CameraStatus {
    #[default]
    Inactive,
    Starting,
    Active {
        session: StreamSession,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AnalysisPhase {
    #[default]
    Idle,
    Capturing,
    Encoding,
    Uploading,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Model {
    pub camera: CameraStatus,
    pub analysis: AnalysisPhase,
    pub result_text: Option<String>,
    pub camera_error: Option<String>,
}

impl Model {
    pub fn camera_active(&self) -> bool {
        matches!(self.camera, CameraStatus::Active { .. })
    }

    pub fn analyzing(&self) -> bool {
        self.analysis != AnalysisPhase::Idle
    }
}

#[derive(Debug)]
pub enum Msg {
    StartCameraClicked,
    StopCameraClicked,
    AnalyzeClicked,
    CameraStartDone(Result<StreamSession, CameraError>),
    FrameCaptureDone(Option<RgbImage>),
    FrameEncodeDone(Result<JpegBlob, Box<dyn std::error::Error + Send + Sync>>),
    ClassifyDone(Result<Verdict, Box<dyn std::error::Error + Send + Sync>>),
}

impl Msg {
    pub fn to_display_string(&self) -> String {
        match self {
            Msg::FrameCaptureDone(Some(frame)) => {
                format!("FrameCaptureDone(Some({}x{}))", frame.width(), frame.height())
            }
            msg => format!("{:?}", msg),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    StartCamera,
    StopCamera,
    StreamPreview { session_id: u64 },
    CaptureFrame,
    EncodeFrame { frame: RgbImage },
    Classify { frame: JpegBlob },
}

impl Effect {
    pub fn to_display_string(&self) -> String {
        match self {
            Effect::EncodeFrame { frame } => {
                format!("EncodeFrame {{ frame: {}x{} }}", frame.width(), frame.height())
            }
            effect => format!("{:?}", effect),
        }
    }
}

//
//
//

pub fn init() -> (Model, Vec<Effect>) {
    (Model::default(), vec![])
}

pub fn transition(_config: &Config, model: Model, msg: Msg) -> (Model, Vec<Effect>) {
    match msg {
        Msg::StartCameraClicked => match model.camera {
            CameraStatus::Inactive => (
                Model {
                    camera: CameraStatus::Starting,
                    result_text: None,
                    camera_error: None,
                    ..model
                },
                vec![Effect::StartCamera],
            ),
            CameraStatus::Starting | CameraStatus::Active { .. } => (model, vec![]),
        },

        Msg::CameraStartDone(Ok(session)) => match model.camera {
            CameraStatus::Starting => (
                Model {
                    camera: CameraStatus::Active { session },
                    ..model
                },
                vec![Effect::StreamPreview {
                    session_id: session.id,
                }],
            ),
            // Stopped while the request was pending.
            CameraStatus::Inactive => (model, vec![Effect::StopCamera]),
            CameraStatus::Active { .. } => (model, vec![]),
        },

        Msg::CameraStartDone(Err(error)) => match model.camera {
            CameraStatus::Starting => (
                Model {
                    camera: CameraStatus::Inactive,
                    camera_error: Some(error.user_message().to_string()),
                    ..model
                },
                vec![],
            ),
            _ => (model, vec![]),
        },

        Msg::StopCameraClicked => (
            Model {
                camera: CameraStatus::Inactive,
                ..model
            },
            vec![Effect::StopCamera],
        ),

        Msg::AnalyzeClicked => {
            if !model.camera_active() || model.analyzing() {
                return (model, vec![]);
            }
            (
                Model {
                    analysis: AnalysisPhase::Capturing,
                    ..model
                },
                vec![Effect::CaptureFrame],
            )
        }

        Msg::FrameCaptureDone(captured) => match (model.analysis, captured) {
            (AnalysisPhase::Capturing, Some(frame)) => (
                Model {
                    analysis: AnalysisPhase::Encoding,
                    result_text: None,
                    ..model
                },
                vec![Effect::EncodeFrame { frame }],
            ),
            (AnalysisPhase::Capturing, None) => (
                Model {
                    analysis: AnalysisPhase::Idle,
                    ..model
                },
                vec![],
            ),
            _ => (model, vec![]),
        },

        Msg::FrameEncodeDone(encoded) => match (model.analysis, encoded) {
            (AnalysisPhase::Encoding, Ok(frame)) => (
                Model {
                    analysis: AnalysisPhase::Uploading,
                    ..model
                },
                vec![Effect::Classify { frame }],
            ),
            (AnalysisPhase::Encoding, Err(_)) => (
                Model {
                    analysis: AnalysisPhase::Idle,
                    ..model
                },
                vec![],
            ),
            _ => (model, vec![]),
        },

        Msg::ClassifyDone(classified) => {
            if model.analysis != AnalysisPhase::Uploading {
                return (model, vec![]);
            }
            let result_text = match classified {
                Ok(verdict) => verdict
                    .message
                    .unwrap_or_else(|| NO_RESPONSE_MESSAGE.to_string()),
                Err(_) => ANALYZE_ERROR_MESSAGE.to_string(),
            };
            (
                Model {
                    analysis: AnalysisPhase::Idle,
                    result_text: Some(result_text),
                    ..model
                },
                vec![],
            )
        }
    }
}
