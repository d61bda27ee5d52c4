use backend::adapters::{InMemoryAuthKeyStore, InMemoryRecurserStore, ZulipNotifier};
use backend::domain::auth_key_store::API_KEY;
use backend::domain::{Caller, Recurser, WeekSchedule};
use backend::pairing::PairingOrchestrator;
use chrono::Weekday;
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use fake::Fake;
use once_cell::sync::Lazy;
use secrecy::Secret;
use std::sync::Arc;
use std::time::Duration;
use telemetry::{get_subscriber, init_subscriber, TelemetrySettings};
use wiremock::MockServer;

pub const OWNER_HANDLE: &str = "@_**Pairing Bot Owner**";

static TRACING: Lazy<()> = Lazy::new(|| {
    let settings = TelemetrySettings {
        otlp_endpoint: String::new(),
        honeycomb_api_key: Secret::new(String::new()),
        dataset_name: "test-pairing-bot".to_string(),
    };
    let default_filter = "info".to_string();
    let subscriber_name = "test".to_string();

    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(subscriber_name, default_filter, std::io::stdout, &settings, None);
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(subscriber_name, default_filter, std::io::sink, &settings, None);
        init_subscriber(subscriber);
    };
});

pub struct TestPipeline {
    pub zulip_server: MockServer,
    pub store: Arc<InMemoryRecurserStore>,
    pub orchestrator: PairingOrchestrator,
}

/// Wires the orchestrator to an in-memory store holding `recursers` and a
/// real Zulip notifier pointed at a mock server.
pub async fn spawn_pipeline(recursers: Vec<Recurser>) -> TestPipeline {
    Lazy::force(&TRACING);

    let zulip_server = MockServer::start().await;
    let store = Arc::new(InMemoryRecurserStore::with_recursers(recursers));
    let keys = InMemoryAuthKeyStore::default().with_key(API_KEY, "zulip-api-key");
    let notifier = ZulipNotifier::new(
        format!("{}/api/v1", zulip_server.uri()),
        "pairing-bot@zulip.example.com".to_string(),
        Duration::from_millis(500),
    )
    .expect("Failed to build the Zulip notifier");

    let orchestrator = PairingOrchestrator::new(
        store.clone(),
        Arc::new(keys),
        Arc::new(notifier),
        OWNER_HANDLE,
    );

    TestPipeline {
        zulip_server,
        store,
        orchestrator,
    }
}

pub fn subscriber(id: &str, skipping: bool, days: &[Weekday]) -> Recurser {
    let name: String = Name().fake();
    let email: String = SafeEmail().fake();
    let mut recurser = Recurser::new_subscriber(&Caller::new(id, email, name));
    recurser.is_skipping_tomorrow = skipping;
    recurser.schedule = WeekSchedule::from_days(days);
    recurser
}

/// Form fields of a request the notifier sent to Zulip.
pub fn form_fields(request: &wiremock::Request) -> Vec<(String, String)> {
    serde_urlencoded::from_bytes(&request.body).expect("Zulip request body is not a form")
}

pub fn field(request: &wiremock::Request, name: &str) -> String {
    form_fields(request)
        .into_iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value)
        .unwrap_or_default()
}
