use crate::adapters::{DynamoDbRecurserStore, SsmAuthKeyStore, ZulipNotifier};
use crate::configuration::{DatabaseSettings, Settings};
use crate::domain::{AuthKeyStore, Notifier, RecurserStore};
use crate::pairing::{CommandDispatcher, PairingOrchestrator};
use aws_config::meta::region::RegionProviderChain;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use std::sync::Arc;

pub fn make_region_provider() -> RegionProviderChain {
    RegionProviderChain::default_provider().or_else(Region::new("us-east-1"))
}

pub async fn load_aws_config() -> SdkConfig {
    aws_config::defaults(BehaviorVersion::latest())
        .region(make_region_provider())
        .load()
        .await
}

fn configure_dynamo(aws_config: &SdkConfig, db_settings: &DatabaseSettings) -> aws_sdk_dynamodb::Config {
    let conf_builder = aws_sdk_dynamodb::config::Builder::from(aws_config);

    match db_settings.use_local {
        true => conf_builder
            .endpoint_url(db_settings.local_endpoint.as_str())
            .build(),
        false => conf_builder.build(),
    }
}

/// The store, key store and notifier every entrypoint works through.
#[derive(Clone)]
pub struct Collaborators {
    pub store: Arc<dyn RecurserStore>,
    pub keys: Arc<dyn AuthKeyStore>,
    pub notifier: Arc<dyn Notifier>,
}

impl Collaborators {
    pub async fn from_settings(configuration: &Settings) -> Result<Self, anyhow::Error> {
        let aws_config = load_aws_config().await;

        let dynamo_client =
            aws_sdk_dynamodb::Client::from_conf(configure_dynamo(&aws_config, &configuration.database));
        let ssm_client = aws_sdk_ssm::Client::new(&aws_config);

        let notifier = ZulipNotifier::new(
            configuration.zulip.api_url.clone(),
            configuration.zulip.bot_email.clone(),
            configuration.zulip.timeout_duration(),
        )?;

        Ok(Self {
            store: Arc::new(DynamoDbRecurserStore::new(
                dynamo_client,
                configuration.database.table_name.clone(),
            )),
            keys: Arc::new(SsmAuthKeyStore::new(
                ssm_client,
                configuration.secrets.parameter_prefix.clone(),
            )),
            notifier: Arc::new(notifier),
        })
    }

    pub fn dispatcher(&self, configuration: &Settings) -> CommandDispatcher {
        CommandDispatcher::new(
            self.store.clone(),
            configuration.application.owner_handle.clone(),
        )
    }

    pub fn orchestrator(&self, configuration: &Settings) -> PairingOrchestrator {
        PairingOrchestrator::new(
            self.store.clone(),
            self.keys.clone(),
            self.notifier.clone(),
            configuration.application.owner_handle.clone(),
        )
    }
}
