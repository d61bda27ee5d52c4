use async_trait::async_trait;
use secrecy::Secret;
use std::fmt;

/// One or two chat addresses a private message goes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipients(Vec<String>);

impl Recipients {
    pub fn single(email: impl Into<String>) -> Self {
        Self(vec![email.into()])
    }

    pub fn pair(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self(vec![first.into(), second.into()])
    }

    pub fn addresses(&self) -> &[String] {
        &self.0
    }

    pub fn contains(&self, email: &str) -> bool {
        self.0.iter().any(|address| address == email)
    }
}

impl fmt::Display for Recipients {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(", "))
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_message(
        &self,
        credential: &Secret<String>,
        recipients: &Recipients,
        body: &str,
    ) -> Result<(), anyhow::Error>;
}
