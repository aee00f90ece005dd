#![forbid(unsafe_code)]

pub mod countdown;
pub mod diagnostics;
pub mod error;
pub mod model;
pub mod passage;
pub mod time;

pub use countdown::{Countdown, CountdownTick, DEFAULT_TIME_BUDGET_SECS};
pub use diagnostics::analyze;
pub use error::Error;
pub use time::Clock;
