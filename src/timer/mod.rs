pub mod controller;
pub mod state;

pub use controller::ExamCountdown;
pub use state::{CountdownState, CountdownStatus};
