mod progress;
mod service;
mod timer;
mod view;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use progress::{SessionPhase, SessionProgress};
pub use service::{Navigation, SessionService, SubmitPrompt, TickOutcome};
pub use timer::{TICK_PERIOD, Tick, TickerHandle, spawn_ticker};
pub use view::{NavigatorCell, SessionEvent, SessionView, ViewSignal};
pub use workflow::SessionLoopService;
