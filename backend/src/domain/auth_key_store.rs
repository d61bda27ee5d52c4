use crate::utils::error_chain_fmt;
use async_trait::async_trait;
use secrecy::Secret;

/// Location of a secret inside the key store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyRef {
    pub namespace: &'static str,
    pub name: &'static str,
}

/// Token the chat platform sends along with every webhook call.
pub const BOT_TOKEN: KeyRef = KeyRef {
    namespace: "botauth",
    name: "token",
};

/// Credential used to send messages through the chat platform API.
pub const API_KEY: KeyRef = KeyRef {
    namespace: "apiauth",
    name: "key",
};

/// Shared secret presented by the scheduler on the batch endpoints.
pub const SCHEDULER_TOKEN: KeyRef = KeyRef {
    namespace: "scheduler",
    name: "token",
};

#[derive(thiserror::Error)]
pub enum AuthKeyError {
    #[error("No secret stored at {0}")]
    MissingKey(String),
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for AuthKeyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

#[async_trait]
pub trait AuthKeyStore: Send + Sync {
    async fn get_key(&self, namespace: &str, name: &str) -> Result<Secret<String>, AuthKeyError>;

    async fn get(&self, key: KeyRef) -> Result<Secret<String>, AuthKeyError> {
        self.get_key(key.namespace, key.name).await
    }
}
