pub mod config;
pub mod controller;
pub mod face;
pub mod loop_worker;
pub mod presence;

pub use config::{FaceHeuristicConfig, SkinToneThresholds};
pub use controller::SensingController;
pub use face::{analyze_frame, classify_frame, FrameStats};
pub use loop_worker::{FaceSample, SamplerSettings};
pub use presence::{FacePresenceState, PresenceTransition};
