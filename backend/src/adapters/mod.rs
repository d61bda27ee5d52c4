pub mod dynamodb_recurser_store;
pub mod in_memory;
pub mod ssm_auth_key_store;
pub mod zulip_notifier;

pub use dynamodb_recurser_store::DynamoDbRecurserStore;
pub use in_memory::{InMemoryAuthKeyStore, InMemoryRecurserStore, RecordingNotifier, SentMessage};
pub use ssm_auth_key_store::SsmAuthKeyStore;
pub use zulip_notifier::ZulipNotifier;
