mod capture;
mod engine;

pub use capture::{DisplayCapture, MonitorInfo, ScreenCapture, list_monitors};
pub use engine::{ProcessArguments, ProcessEngine, Recognizer};
