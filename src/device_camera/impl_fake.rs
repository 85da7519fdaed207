use crate::device_camera::interface::{CameraError, DeviceCamera, MediaStream};
use crate::library::logger::interface::Logger;
use image::{Rgb, RgbImage};
use rand::Rng;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
    Unavailable,
}

#[allow(dead_code)]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeState {
    pub requests: usize,
    pub streams_opened: usize,
    pub live_tracks: usize,
    pub tracks_stopped: usize,
    pub frames_read: usize,
}

/// Shared view into what the fake camera has handed out.
#[derive(Debug, Clone, Default)]
pub struct FakeCameraProbe {
    state: Arc<Mutex<ProbeState>>,
}

impl FakeCameraProbe {
    #[allow(dead_code)]
    pub fn snapshot(&self) -> ProbeState {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn update(&self, f: impl FnOnce(&mut ProbeState)) {
        f(&mut self.state.lock().unwrap_or_else(|e| e.into_inner()));
    }
}

pub struct DeviceCameraFake {
    logger: Arc<dyn Logger + Send + Sync>,
    permission: Permission,
    latency: Duration,
    size: (u32, u32),
    failing_reads: bool,
    probe: FakeCameraProbe,
}

impl DeviceCameraFake {
    pub fn new(logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            logger: logger.with_namespace("camera").with_namespace("fake"),
            permission: Permission::Granted,
            latency: Duration::ZERO,
            size: (320, 240),
            failing_reads: false,
            probe: FakeCameraProbe::default(),
        }
    }

    #[allow(dead_code)]
    pub fn with_permission(mut self, permission: Permission) -> Self {
        self.permission = permission;
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }

    #[allow(dead_code)]
    pub fn with_failing_reads(mut self) -> Self {
        self.failing_reads = true;
        self
    }

    #[allow(dead_code)]
    pub fn probe(&self) -> FakeCameraProbe {
        self.probe.clone()
    }
}

impl DeviceCamera for DeviceCameraFake {
    fn request_stream(&self) -> Result<Box<dyn MediaStream>, CameraError> {
        let _ = self.logger.info("Requesting video stream...");
        self.probe.update(|state| state.requests += 1);
        std::thread::sleep(self.latency);

        match self.permission {
            Permission::Granted => {
                self.probe.update(|state| {
                    state.streams_opened += 1;
                    state.live_tracks += 1;
                });
                let _ = self.logger.info("Video stream granted");
                Ok(Box::new(MediaStreamFake {
                    size: self.size,
                    tick: 0,
                    live: true,
                    failing_reads: self.failing_reads,
                    probe: self.probe.clone(),
                }))
            }
            Permission::Denied => Err(CameraError::PermissionDenied(
                "user dismissed the camera prompt".to_string(),
            )),
            Permission::Unavailable => {
                Err(CameraError::Unavailable("no capture device found".to_string()))
            }
        }
    }
}

struct MediaStreamFake {
    size: (u32, u32),
    tick: u32,
    live: bool,
    failing_reads: bool,
    probe: FakeCameraProbe,
}

impl MediaStream for MediaStreamFake {
    fn native_size(&self) -> (u32, u32) {
        self.size
    }

    fn read_frame(&mut self) -> Result<RgbImage, CameraError> {
        if !self.live {
            return Err(CameraError::Stream("track ended".to_string()));
        }
        if self.failing_reads {
            return Err(CameraError::Stream("device stopped delivering frames".to_string()));
        }

        let mut rng = rand::rng();
        let tick = self.tick;
        self.tick = self.tick.wrapping_add(4);
        let (width, height) = self.size;

        // Scrolling grey gradient with a little sensor noise.
        let frame = RgbImage::from_fn(width, height, |x, y| {
            let base = ((x + y + tick) % 256) as u8;
            let noise: u8 = rng.random_range(0..12);
            let value = base.saturating_add(noise);
            Rgb([value, value, value.saturating_sub(10)])
        });

        self.probe.update(|state| state.frames_read += 1);
        Ok(frame)
    }

    fn live_tracks(&self) -> usize {
        usize::from(self.live)
    }

    fn stop_tracks(&mut self) -> usize {
        if !self.live {
            return 0;
        }
        self.live = false;
        self.probe.update(|state| {
            state.live_tracks -= 1;
            state.tracks_stopped += 1;
        });
        1
    }
}

impl Drop for MediaStreamFake {
    fn drop(&mut self) {
        self.stop_tracks();
    }
}
