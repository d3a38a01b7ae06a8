pub mod controller;
pub mod loop_worker;
pub mod state;

pub use controller::ProctorMonitor;
pub use loop_worker::{LoopExit, NO_FACE_NOTICE};
pub use state::MonitorSnapshot;
