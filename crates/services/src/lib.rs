#![forbid(unsafe_code)]

pub mod app_services;
pub mod diagnostics;
pub mod error;
pub mod sessions;

pub use reading_core::Clock;
pub use sessions as session;

pub use app_services::AppServices;
pub use diagnostics::DiagnosticService;
pub use error::{AppServicesError, DiagnosticError, SessionError};

pub use sessions::{
    Navigation, SessionEvent, SessionLoopService, SessionPhase, SessionProgress, SessionService,
    SessionView, SubmitPrompt, TickOutcome, ViewSignal,
};
