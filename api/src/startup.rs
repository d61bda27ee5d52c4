use crate::middleware::SignalRequestDone;
use crate::routes::{handle_webhook, health_check, run_daily_match, run_end_of_batch};
use actix_web::dev::{Server, Service};
use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::web::Data;
use actix_web::{web, App, HttpMessage, HttpServer};
use backend::configuration::Settings;
use backend::domain::AuthKeyStore;
use backend::startup::Collaborators;
use std::net::TcpListener;
use telemetry::CustomLevelRootSpanBuilder;
use tokio::sync::mpsc::UnboundedSender;
use tracing_actix_web::{RequestId, TracingLogger};

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    pub async fn build(
        configuration: Settings,
        request_done_sender: UnboundedSender<()>,
    ) -> Result<Self, anyhow::Error> {
        let collaborators = Collaborators::from_settings(&configuration).await?;

        Self::build_with(configuration, collaborators, request_done_sender)
    }

    /// Builds the server around the given collaborators instead of the
    /// AWS and Zulip backed ones.
    pub fn build_with(
        configuration: Settings,
        collaborators: Collaborators,
        request_done_sender: UnboundedSender<()>,
    ) -> Result<Self, anyhow::Error> {
        let listener = TcpListener::bind(format!(
            "{}:{}",
            configuration.application.host_name, configuration.application.application_port
        ))?;
        let port = listener.local_addr()?.port();

        let server = run(listener, configuration, collaborators, request_done_sender)?;

        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

fn run(
    listener: TcpListener,
    configuration: Settings,
    collaborators: Collaborators,
    request_done_sender: UnboundedSender<()>,
) -> Result<Server, anyhow::Error> {
    let dispatcher = Data::new(collaborators.dispatcher(&configuration));
    let orchestrator = Data::new(collaborators.orchestrator(&configuration));
    let keys: Data<dyn AuthKeyStore> = Data::from(collaborators.keys.clone());
    let application_settings = Data::new(configuration.application.clone());
    let request_done_sender = Data::new(request_done_sender);

    let server = HttpServer::new(move || {
        App::new()
            .wrap_fn(|req, srv| {
                let request_id = req.extensions().get::<RequestId>().copied();
                let res = srv.call(req);
                async move {
                    let mut res = res.await?;
                    if let Some(request_id) = request_id {
                        if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
                            res.headers_mut()
                                .insert(HeaderName::from_static("x-request-id"), value);
                        }
                    }
                    Ok(res)
                }
            })
            .wrap(TracingLogger::<CustomLevelRootSpanBuilder>::new())
            .wrap(SignalRequestDone)
            .route("/health_check", web::get().to(health_check))
            .route("/webhooks", web::post().to(handle_webhook))
            .route("/match", web::post().to(run_daily_match))
            .route("/endofbatch", web::post().to(run_end_of_batch))
            .app_data(dispatcher.clone())
            .app_data(orchestrator.clone())
            .app_data(keys.clone())
            .app_data(application_settings.clone())
            .app_data(request_done_sender.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
