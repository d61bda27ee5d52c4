use backend::adapters::{InMemoryAuthKeyStore, InMemoryRecurserStore, RecordingNotifier};
use backend::configuration::{get_configuration, Settings};
use backend::domain::auth_key_store::{API_KEY, BOT_TOKEN, SCHEDULER_TOKEN};
use backend::domain::{Caller, Recurser, WeekSchedule};
use backend::startup::Collaborators;
use chrono::Weekday;
use once_cell::sync::Lazy;
use pairing_bot::routes::SCHEDULER_TOKEN_HEADER;
use pairing_bot::startup::Application;
use secrecy::Secret;
use serde_json::{json, Value};
use std::sync::Arc;
use telemetry::{get_subscriber, init_subscriber, TelemetrySettings};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

pub const WEBHOOK_TOKEN: &str = "webhook-t0k3n";
pub const SCHEDULER_SECRET: &str = "scheduler-t0k3n";
pub const OWNER_ID: &str = "1";

pub const EVERY_DAY: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

// Ensure that the `tracing` stack is only initialised once using `once_cell`
static TRACING: Lazy<()> = Lazy::new(|| {
    let settings = TelemetrySettings {
        otlp_endpoint: String::new(),
        honeycomb_api_key: Secret::new(String::new()),
        dataset_name: "test-pairing-bot".to_string(),
    };
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();

    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(
            subscriber_name,
            default_filter_level,
            std::io::stdout,
            &settings,
            None,
        );
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(
            subscriber_name,
            default_filter_level,
            std::io::sink,
            &settings,
            None,
        );
        init_subscriber(subscriber);
    };
});

pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    pub store: Arc<InMemoryRecurserStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub request_done_receiver: UnboundedReceiver<()>,
}

impl TestApp {
    pub async fn post_webhook(&self, body: &Value) -> reqwest::Response {
        self.api_client
            .post(&format!("{}/webhooks", &self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_raw_webhook(&self, body: &'static str) -> reqwest::Response {
        self.api_client
            .post(&format!("{}/webhooks", &self.address))
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// Sends a private message from `sender_id` to the bot and returns the
    /// reply body.
    pub async fn message_bot(&self, sender_id: i64, content: &str) -> Value {
        let response = self
            .post_webhook(&webhook_body(content, sender_id, WEBHOOK_TOKEN))
            .await;
        assert_eq!(200, response.status().as_u16());

        response.json().await.expect("Reply is not JSON")
    }

    pub async fn post_match(&self, scheduler_token: Option<&str>) -> reqwest::Response {
        self.post_scheduled("match", scheduler_token).await
    }

    pub async fn post_end_of_batch(&self, scheduler_token: Option<&str>) -> reqwest::Response {
        self.post_scheduled("endofbatch", scheduler_token).await
    }

    async fn post_scheduled(&self, path: &str, scheduler_token: Option<&str>) -> reqwest::Response {
        let mut request = self.api_client.post(&format!("{}/{}", &self.address, path));
        if let Some(token) = scheduler_token {
            request = request.header(SCHEDULER_TOKEN_HEADER, token);
        }

        request.send().await.expect("Failed to execute request.")
    }
}

pub fn test_keys() -> InMemoryAuthKeyStore {
    InMemoryAuthKeyStore::default()
        .with_key(BOT_TOKEN, WEBHOOK_TOKEN)
        .with_key(SCHEDULER_TOKEN, SCHEDULER_SECRET)
        .with_key(API_KEY, "zulip-api-key")
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(Vec::new(), test_keys(), |_| {}).await
}

/// Launches the application on a random port with in-memory collaborators.
/// `configure` can tweak the settings read from `configuration/`.
pub async fn spawn_app_with(
    recursers: Vec<Recurser>,
    keys: InMemoryAuthKeyStore,
    configure: impl FnOnce(&mut Settings),
) -> TestApp {
    Lazy::force(&TRACING);

    let mut configuration = get_configuration()
        .await
        .expect("Failed to read configuration.");
    // Use a random OS port
    configuration.application.application_port = 0;
    configuration.application.host_name = "127.0.0.1".to_string();
    configuration.application.owner_id = OWNER_ID.to_string();
    configure(&mut configuration);

    let store = Arc::new(InMemoryRecurserStore::with_recursers(recursers));
    let notifier = Arc::new(RecordingNotifier::default());
    let collaborators = Collaborators {
        store: store.clone(),
        keys: Arc::new(keys),
        notifier: notifier.clone(),
    };

    let (request_done_sender, request_done_receiver) = unbounded_channel::<()>();

    let application = Application::build_with(configuration, collaborators, request_done_sender)
        .expect("Failed to build application.");
    let application_port = application.port();
    let _ = tokio::spawn(application.run_until_stopped());

    TestApp {
        address: format!("http://127.0.0.1:{}", application_port),
        api_client: reqwest::Client::new(),
        store,
        notifier,
        request_done_receiver,
    }
}

/// An outgoing webhook as Zulip sends it for a private message to the bot.
pub fn webhook_body(content: &str, sender_id: i64, token: &str) -> Value {
    json!({
        "bot_email": "pairing-bot@recurse.zulipchat.com",
        "bot_full_name": "Pairing Bot",
        "data": content,
        "token": token,
        "trigger": "private_message",
        "message": {
            "id": 112,
            "type": "private",
            "content": content,
            "sender_id": sender_id,
            "sender_email": format!("user{}@example.com", sender_id),
            "sender_full_name": format!("User {}", sender_id),
            "display_recipient": [
                { "id": sender_id, "email": format!("user{}@example.com", sender_id) },
                { "id": 9999, "email": "pairing-bot@recurse.zulipchat.com" }
            ]
        }
    })
}

pub fn subscriber(id: i64, days: &[Weekday]) -> Recurser {
    let caller = Caller::new(
        id.to_string(),
        format!("user{}@example.com", id),
        format!("User {}", id),
    );
    let mut recurser = Recurser::new_subscriber(&caller);
    recurser.schedule = WeekSchedule::from_days(days);
    recurser
}

pub fn content(reply: &Value) -> &str {
    reply["content"].as_str().unwrap_or_default()
}
