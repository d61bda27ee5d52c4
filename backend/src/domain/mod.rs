pub mod auth_key_store;
pub mod command;
pub mod notifier;
pub mod recurser;
pub mod recurser_store;
pub mod schedule;

pub use crate::domain::auth_key_store::{AuthKeyError, AuthKeyStore, KeyRef};
pub use crate::domain::command::{Command, CommandParseError};
pub use crate::domain::notifier::{Notifier, Recipients};
pub use crate::domain::recurser::{Caller, Recurser, Subscription};
pub use crate::domain::recurser_store::{RecurserStore, StoreError};
pub use crate::domain::schedule::WeekSchedule;
