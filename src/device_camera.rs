#[cfg_attr(feature = "camera-v4l", allow(dead_code))]
pub mod impl_fake;
#[cfg(feature = "camera-v4l")]
pub mod impl_v4l;
pub mod interface;
