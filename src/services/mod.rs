pub mod orchestrator;
pub mod quota;
pub mod signals;

pub use orchestrator::{SignalOrchestrator, SignalRequest};
pub use quota::{DailyQuotaTracker, QuotaError};
pub use signals::{Analysis, ScoringEngine};
