pub mod logging;

pub use logging::{init_logging, DEFAULT_LOG_LEVEL};
