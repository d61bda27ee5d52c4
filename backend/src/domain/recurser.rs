use crate::domain::schedule::WeekSchedule;
use serde::{Deserialize, Serialize};

/// A Pairing Bot subscriber as stored in the recursers table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recurser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub is_skipping_tomorrow: bool,
    pub schedule: WeekSchedule,
}

impl Recurser {
    pub fn new_subscriber(caller: &Caller) -> Self {
        Self {
            id: caller.id.clone(),
            name: caller.name.clone(),
            email: caller.email.clone(),
            is_skipping_tomorrow: false,
            schedule: WeekSchedule::weekdays(),
        }
    }
}

/// Who sent a chat command, as reported by the chat platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub id: String,
    pub email: String,
    pub name: String,
}

impl Caller {
    pub fn new(id: impl Into<String>, email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            name: name.into(),
        }
    }
}

/// Result of looking a caller up in the store. A caller is subscribed
/// exactly when a record exists for their id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subscription {
    Subscribed(Recurser),
    /// Carries the record the caller would get if they subscribed now.
    NotSubscribed(Recurser),
}
