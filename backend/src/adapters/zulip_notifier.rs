use crate::domain::{Notifier, Recipients};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use std::time::Duration;

/// Sends private messages through the Zulip REST API as the bot user.
#[derive(Debug, Clone)]
pub struct ZulipNotifier {
    http_client: Client,
    api_url: String,
    bot_email: String,
}

impl ZulipNotifier {
    pub fn new(api_url: String, bot_email: String, timeout: Duration) -> Result<Self, anyhow::Error> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build the Zulip HTTP client")?;

        Ok(Self {
            http_client,
            api_url,
            bot_email,
        })
    }
}

#[async_trait]
impl Notifier for ZulipNotifier {
    #[tracing::instrument(name = "send_zulip_message", skip(self, credential, body), fields(recipients = %recipients))]
    async fn send_message(
        &self,
        credential: &Secret<String>,
        recipients: &Recipients,
        body: &str,
    ) -> Result<(), anyhow::Error> {
        let url = format!("{}/messages", self.api_url.trim_end_matches('/'));
        let to = recipients.to_string();
        let form = [
            ("type", "private"),
            ("to", to.as_str()),
            ("content", body),
        ];

        self.http_client
            .post(&url)
            .basic_auth(&self.bot_email, Some(credential.expose_secret()))
            .form(&form)
            .send()
            .await
            .context(format!("Failed to reach Zulip at {}", url))?
            .error_for_status()
            .context("Zulip rejected the message")?;

        Ok(())
    }
}
