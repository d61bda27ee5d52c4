use crate::domain::auth_key_store::API_KEY;
use crate::domain::{AuthKeyError, AuthKeyStore, Notifier, Recipients, Recurser, RecurserStore, StoreError};
use crate::pairing::matching::{make_matches, MatchResult};
use crate::pairing::messages;
use crate::utils::error_chain_fmt;
use chrono::{DateTime, Datelike, TimeZone, Weekday};
use rand::Rng;
use secrecy::Secret;
use serde::Serialize;
use std::sync::Arc;

#[derive(thiserror::Error)]
pub enum BatchError {
    #[error("Failed to list the subscribers to offboard")]
    ListFailed(#[source] StoreError),
    #[error("Failed to fetch the credential for outbound messages")]
    CredentialUnavailable(#[source] AuthKeyError),
}

impl std::fmt::Debug for BatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// Outcome of one daily pairing run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DailyRunReport {
    pub day: String,
    pub eligible: usize,
    pub pairs: usize,
    pub odd_one_out: Option<String>,
    pub notification_failures: usize,
    pub skippers_reset: usize,
    pub reset_failures: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OffboardingReport {
    pub offboarded: usize,
    pub delete_failures: usize,
    pub notification_failures: usize,
}

/// The day a run started at `now` is matching people for.
pub fn pairing_day<Tz: TimeZone>(now: &DateTime<Tz>) -> Weekday {
    now.weekday().succ()
}

/// Drives the scheduled runs: the daily match and the end of batch
/// offboarding. Every step works through the injected collaborators and
/// keeps going past failures on individual subscribers.
pub struct PairingOrchestrator {
    store: Arc<dyn RecurserStore>,
    keys: Arc<dyn AuthKeyStore>,
    notifier: Arc<dyn Notifier>,
    owner_handle: String,
}

impl PairingOrchestrator {
    pub fn new(
        store: Arc<dyn RecurserStore>,
        keys: Arc<dyn AuthKeyStore>,
        notifier: Arc<dyn Notifier>,
        owner_handle: impl Into<String>,
    ) -> Self {
        Self {
            store,
            keys,
            notifier,
            owner_handle: owner_handle.into(),
        }
    }

    #[tracing::instrument(name = "run_daily_match", skip(self, rng), fields(day = %day))]
    pub async fn run_daily_match<R: Rng + Send + ?Sized>(
        &self,
        day: Weekday,
        rng: &mut R,
    ) -> DailyRunReport {
        let mut report = DailyRunReport {
            day: day.to_string(),
            ..DailyRunReport::default()
        };

        let eligible = match self.store.list_eligible(day).await {
            Ok(eligible) => eligible,
            Err(e) => {
                tracing::error!(
                    error.cause_chain = ?e,
                    error.message = %e,
                    "Failed to list eligible subscribers, nobody will be matched"
                );
                Vec::new()
            }
        };
        let skippers = match self.store.list_skipping_tomorrow().await {
            Ok(skippers) => Some(skippers),
            Err(e) => {
                tracing::error!(
                    error.cause_chain = ?e,
                    error.message = %e,
                    "Failed to list skipping subscribers, skip flags will not be reset"
                );
                None
            }
        };

        report.eligible = eligible.len();
        tracing::info!("There are {} eligible subscribers", eligible.len());

        let matches = make_matches(eligible, rng);
        for result in &matches {
            match result {
                MatchResult::Pair(_, _) => report.pairs += 1,
                MatchResult::OddOneOut(recurser) => report.odd_one_out = Some(recurser.id.clone()),
            }
        }

        if !matches.is_empty() {
            match self.keys.get(API_KEY).await {
                Ok(credential) => {
                    report.notification_failures = self.notify_matches(&credential, &matches).await;
                }
                Err(e) => {
                    tracing::error!(
                        error.cause_chain = ?e,
                        error.message = %e,
                        "Failed to fetch the outbound credential, no matches were announced"
                    );
                    report.notification_failures = matches.len();
                }
            }
        }

        if let Some(skippers) = skippers {
            let (reset, failed) = self.reset_skippers(&skippers).await;
            report.skippers_reset = reset;
            report.reset_failures = failed;
        }

        tracing::info!(
            pairs = report.pairs,
            notification_failures = report.notification_failures,
            skippers_reset = report.skippers_reset,
            "Daily match finished"
        );

        report
    }

    #[tracing::instrument(name = "notify_matches", skip_all)]
    async fn notify_matches(&self, credential: &Secret<String>, matches: &[MatchResult]) -> usize {
        let mut failures = 0;

        for result in matches {
            let (recipients, body) = match result {
                MatchResult::Pair(first, second) => (
                    Recipients::pair(first.email.as_str(), second.email.as_str()),
                    messages::MATCHED,
                ),
                MatchResult::OddOneOut(recurser) => {
                    (Recipients::single(recurser.email.as_str()), messages::ODD_ONE_OUT)
                }
            };

            if let Err(e) = self.notifier.send_message(credential, &recipients, body).await {
                failures += 1;
                tracing::warn!(
                    error.cause_chain = ?e,
                    error.message = %e,
                    recipients = %recipients,
                    "Failed to announce a match"
                );
            }
        }

        failures
    }

    #[tracing::instrument(name = "reset_skippers", skip_all, fields(skippers = skippers.len()))]
    async fn reset_skippers(&self, skippers: &[Recurser]) -> (usize, usize) {
        let mut reset = 0;
        let mut failed = 0;

        for recurser in skippers {
            match self.store.unset_skipping_tomorrow(recurser).await {
                Ok(()) => reset += 1,
                Err(e) => {
                    failed += 1;
                    tracing::warn!(
                        error.cause_chain = ?e,
                        error.message = %e,
                        recurser_id = %recurser.id,
                        "Failed to reset a skip flag"
                    );
                }
            }
        }

        (reset, failed)
    }

    #[tracing::instrument(name = "run_end_of_batch", skip(self))]
    pub async fn run_end_of_batch(&self) -> Result<OffboardingReport, BatchError> {
        let recursers = self.store.get_all().await.map_err(BatchError::ListFailed)?;
        let credential = self
            .keys
            .get(API_KEY)
            .await
            .map_err(BatchError::CredentialUnavailable)?;

        tracing::info!("Offboarding {} subscribers", recursers.len());

        let mut report = OffboardingReport::default();
        for recurser in &recursers {
            let body = match self.store.delete(&recurser.id).await {
                Ok(()) => {
                    report.offboarded += 1;
                    messages::OFFBOARDED.to_string()
                }
                Err(e) => {
                    report.delete_failures += 1;
                    tracing::warn!(
                        error.cause_chain = ?e,
                        error.message = %e,
                        recurser_id = %recurser.id,
                        "Failed to offboard a subscriber"
                    );
                    messages::offboarding_failed(&self.owner_handle)
                }
            };

            let recipients = Recipients::single(recurser.email.as_str());
            if let Err(e) = self.notifier.send_message(&credential, &recipients, &body).await {
                report.notification_failures += 1;
                tracing::warn!(
                    error.cause_chain = ?e,
                    error.message = %e,
                    recurser_id = %recurser.id,
                    "Failed to tell a subscriber about offboarding"
                );
            }
        }

        Ok(report)
    }
}
