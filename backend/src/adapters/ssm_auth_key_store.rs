use crate::domain::{AuthKeyError, AuthKeyStore};
use anyhow::Context;
use async_trait::async_trait;
use aws_sdk_ssm::Client;
use secrecy::Secret;

/// Secrets kept as SecureString parameters named
/// `{prefix}/{namespace}/{name}`.
#[derive(Debug, Clone)]
pub struct SsmAuthKeyStore {
    client: Client,
    parameter_prefix: String,
}

impl SsmAuthKeyStore {
    pub fn new(client: Client, parameter_prefix: String) -> Self {
        Self {
            client,
            parameter_prefix,
        }
    }

    fn parameter_name(&self, namespace: &str, name: &str) -> String {
        format!(
            "{}/{}/{}",
            self.parameter_prefix.trim_end_matches('/'),
            namespace,
            name
        )
    }
}

#[async_trait]
impl AuthKeyStore for SsmAuthKeyStore {
    #[tracing::instrument(skip(self))]
    async fn get_key(&self, namespace: &str, name: &str) -> Result<Secret<String>, AuthKeyError> {
        let parameter_name = self.parameter_name(namespace, name);

        let response = self
            .client
            .get_parameter()
            .name(&parameter_name)
            .with_decryption(true)
            .send()
            .await;

        let output = match response {
            Ok(output) => output,
            Err(e)
                if e.as_service_error()
                    .map(|e| e.is_parameter_not_found())
                    .unwrap_or(false) =>
            {
                return Err(AuthKeyError::MissingKey(parameter_name));
            }
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("Failure reading parameter {}", parameter_name))
                    .into())
            }
        };

        output
            .parameter
            .and_then(|parameter| parameter.value)
            .map(Secret::new)
            .ok_or(AuthKeyError::MissingKey(parameter_name))
    }
}
