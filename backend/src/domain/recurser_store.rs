use crate::domain::recurser::{Caller, Recurser, Subscription};
use crate::utils::error_chain_fmt;
use async_trait::async_trait;
use chrono::Weekday;

#[derive(thiserror::Error)]
pub enum StoreError {
    #[error("{0}")]
    MalformedRecord(String),
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// Persistence for subscriber records, keyed by chat platform user id.
#[async_trait]
pub trait RecurserStore: Send + Sync {
    /// Fetches the caller's record, refreshing its name and email from the
    /// caller. Callers without a record get a fresh default record back.
    async fn get_by_id(&self, caller: &Caller) -> Result<Subscription, StoreError>;

    /// Upserts the record, leaving attributes it does not carry untouched.
    async fn set(&self, recurser: &Recurser) -> Result<(), StoreError>;

    async fn delete(&self, recurser_id: &str) -> Result<(), StoreError>;

    async fn get_all(&self) -> Result<Vec<Recurser>, StoreError>;

    /// Subscribers scheduled on `day` who are not skipping it.
    async fn list_eligible(&self, day: Weekday) -> Result<Vec<Recurser>, StoreError>;

    async fn list_skipping_tomorrow(&self) -> Result<Vec<Recurser>, StoreError>;

    async fn unset_skipping_tomorrow(&self, recurser: &Recurser) -> Result<(), StoreError>;
}
