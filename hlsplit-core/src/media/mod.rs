//! Media metadata model.
//!
//! The types in [`info`] are produced by the prober and consumed by the
//! planner and the splitter.

pub mod info;

pub use info::{
    ContainerInfo, FormatDescriptor, FrameRate, StreamDescriptor, StreamKind, VIDEO_EXTENSIONS,
    is_video_path,
};
