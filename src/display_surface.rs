use image::RgbImage;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Default)]
struct SurfaceState {
    bound: bool,
    frame: Option<RgbImage>,
    version: u64,
}

/// Where the live preview is shown. Holds the latest frame of the bound stream.
#[derive(Clone, Default)]
pub struct DisplaySurface {
    state: Arc<Mutex<SurfaceState>>,
}

impl DisplaySurface {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SurfaceState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn bind(&self) {
        let mut state = self.lock();
        state.bound = true;
        state.frame = None;
        state.version += 1;
    }

    pub fn unbind(&self) {
        let mut state = self.lock();
        state.bound = false;
        state.frame = None;
        state.version += 1;
    }

    #[allow(dead_code)]
    pub fn is_bound(&self) -> bool {
        self.lock().bound
    }

    /// Frames presented while nothing is bound are dropped.
    pub fn present(&self, frame: RgbImage) -> bool {
        let mut state = self.lock();
        if !state.bound {
            return false;
        }
        state.frame = Some(frame);
        state.version += 1;
        true
    }

    #[allow(dead_code)]
    pub fn version(&self) -> u64 {
        self.lock().version
    }

    /// Returns the frame only when it changed after `seen_version`.
    pub fn frame_since(&self, seen_version: u64) -> Option<(u64, Option<RgbImage>)> {
        let state = self.lock();
        if state.version == seen_version {
            return None;
        }
        Some((state.version, state.frame.clone()))
    }

    /// Runs `f` against the current frame without copying it out.
    pub fn with_frame<T>(&self, f: impl FnOnce(&RgbImage) -> T) -> Option<T> {
        let state = self.lock();
        if !state.bound {
            return None;
        }
        state.frame.as_ref().map(f)
    }
}
