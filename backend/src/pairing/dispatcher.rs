use crate::domain::{Caller, Command, Recurser, RecurserStore, StoreError, Subscription, WeekSchedule};
use crate::pairing::messages;
use std::sync::Arc;

/// Applies one chat command to the caller's subscriber record and
/// produces the reply to send back.
pub struct CommandDispatcher {
    store: Arc<dyn RecurserStore>,
    owner_handle: String,
}

impl CommandDispatcher {
    pub fn new(store: Arc<dyn RecurserStore>, owner_handle: impl Into<String>) -> Self {
        Self {
            store,
            owner_handle: owner_handle.into(),
        }
    }

    #[tracing::instrument(
        name = "dispatch_command",
        skip(self, caller),
        fields(recurser_id = %caller.id)
    )]
    pub async fn dispatch(&self, command: Command, caller: &Caller) -> String {
        let subscription = match self.store.get_by_id(caller).await {
            Ok(subscription) => subscription,
            Err(e) => return self.read_failed(e),
        };

        match (command, subscription) {
            (Command::Subscribe, Subscription::Subscribed(_)) => {
                messages::ALREADY_SUBSCRIBED.to_string()
            }
            (Command::Subscribe, Subscription::NotSubscribed(_)) => {
                let recurser = Recurser::new_subscriber(caller);
                self.write(&recurser, messages::SUBSCRIBED).await
            }
            (Command::Unsubscribe, Subscription::Subscribed(recurser)) => {
                match self.store.delete(&recurser.id).await {
                    Ok(()) => messages::UNSUBSCRIBED.to_string(),
                    Err(e) => self.write_failed(e),
                }
            }
            (Command::Schedule(days), Subscription::Subscribed(mut recurser)) => {
                recurser.schedule = WeekSchedule::from_days(&days);
                self.write(&recurser, messages::SCHEDULE_SET).await
            }
            (Command::Skip, Subscription::Subscribed(mut recurser)) => {
                recurser.is_skipping_tomorrow = true;
                self.write(&recurser, messages::SKIPPING).await
            }
            (Command::Unskip, Subscription::Subscribed(mut recurser)) => {
                recurser.is_skipping_tomorrow = false;
                self.write(&recurser, messages::UNSKIPPING).await
            }
            (Command::Status, Subscription::Subscribed(recurser)) => messages::status(&recurser),
            (Command::Count, _) => self.count().await,
            (Command::Help, _) => messages::HELP.to_string(),
            (_, Subscription::NotSubscribed(_)) => messages::NOT_SUBSCRIBED.to_string(),
        }
    }

    async fn count(&self) -> String {
        match self.store.get_all().await {
            Ok(recursers) => messages::subscriber_count(recursers.len()),
            Err(e) => self.read_failed(e),
        }
    }

    async fn write(&self, recurser: &Recurser, reply: &str) -> String {
        match self.store.set(recurser).await {
            Ok(()) => reply.to_string(),
            Err(e) => self.write_failed(e),
        }
    }

    fn read_failed(&self, e: StoreError) -> String {
        tracing::error!(
            error.cause_chain = ?e,
            error.message = %e,
            "Failed to read a subscriber record"
        );
        messages::read_error(&self.owner_handle)
    }

    fn write_failed(&self, e: StoreError) -> String {
        tracing::error!(
            error.cause_chain = ?e,
            error.message = %e,
            "Failed to write a subscriber record"
        );
        messages::write_error(&self.owner_handle)
    }
}
