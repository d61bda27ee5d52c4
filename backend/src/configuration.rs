use config::{ConfigError, FileFormat};
use serde::Deserialize;
use std::time::Duration;
use telemetry::TelemetrySettings;

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
    pub secrets: SecretSettings,
    pub zulip: ZulipSettings,
    pub telemetry: TelemetrySettings,
}

#[derive(Deserialize, Clone)]
pub struct ApplicationSettings {
    pub application_port: u16,
    pub host_name: String,
    /// While set, only the owner gets answers from the bot.
    pub maintenance_mode: bool,
    pub owner_id: String,
    /// Zulip mention used in messages that ask people to contact the owner.
    pub owner_handle: String,
}

#[derive(Deserialize, Clone)]
pub struct DatabaseSettings {
    pub table_name: String,
    pub use_local: bool,
    pub local_endpoint: String,
}

#[derive(Deserialize, Clone)]
pub struct SecretSettings {
    pub parameter_prefix: String,
}

#[derive(Deserialize, Clone)]
pub struct ZulipSettings {
    pub api_url: String,
    pub bot_email: String,
    pub timeout_milliseconds: u64,
}

impl ZulipSettings {
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_millis(self.timeout_milliseconds)
    }
}

pub async fn get_configuration() -> Result<Settings, ConfigError> {
    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(ConfigError::Message)?;

    let builder = match environment {
        Environment::Local => {
            let base_path = std::env::current_dir().map_err(|e| ConfigError::Foreign(Box::new(e)))?;
            let configuration_directory = base_path.join("configuration");
            let environment_filename = format!("{}.yaml", environment.as_str());

            config::Config::builder()
                .add_source(config::File::from(configuration_directory.join("base.yaml")))
                .add_source(config::File::from(
                    configuration_directory.join(environment_filename),
                ))
        }
        Environment::Production => {
            let document = read_configuration_parameter()
                .await
                .map_err(|e| ConfigError::Foreign(e.into()))?;

            config::Config::builder().add_source(config::File::from_str(&document, FileFormat::Yaml))
        }
    };

    // E.g. `APP_APPLICATION__MAINTENANCE_MODE=true` sets `Settings.application.maintenance_mode`
    builder
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize::<Settings>()
}

/// Production settings are a YAML document stored in the SSM parameter
/// named by `CONFIG_PARAMETER_NAME`.
async fn read_configuration_parameter() -> Result<String, anyhow::Error> {
    use anyhow::Context;

    let parameter_name =
        std::env::var("CONFIG_PARAMETER_NAME").context("CONFIG_PARAMETER_NAME is not set")?;

    let aws_config = crate::startup::load_aws_config().await;
    let ssm_client = aws_sdk_ssm::Client::new(&aws_config);

    ssm_client
        .get_parameter()
        .name(&parameter_name)
        .with_decryption(true)
        .send()
        .await
        .context(format!("Failed to read configuration parameter {}", parameter_name))?
        .parameter
        .and_then(|parameter| parameter.value)
        .context(format!("Configuration parameter {} is empty", parameter_name))
}

#[derive(Debug)]
pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either local or production",
                other
            )),
        }
    }
}
