pub mod dispatcher;
pub mod matching;
pub mod messages;
pub mod orchestrator;

pub use dispatcher::CommandDispatcher;
pub use matching::{make_matches, MatchResult};
pub use orchestrator::{pairing_day, BatchError, DailyRunReport, OffboardingReport, PairingOrchestrator};
