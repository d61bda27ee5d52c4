use backend::configuration::get_configuration;
use lambda_extension::{service_fn, Extension};
use pairing_bot::startup::Application;
use std::env;
use std::sync::Arc;
use telemetry::{get_subscriber, init_subscriber, init_tracer, TraceFlushExtension};
use tokio::sync::mpsc::unbounded_channel;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let configuration = get_configuration().await?;

    let tracer = init_tracer(&configuration.telemetry)?;
    let subscriber = get_subscriber(
        configuration.telemetry.dataset_name.clone(),
        "info".into(),
        std::io::stdout,
        &configuration.telemetry,
        tracer.as_ref(),
    );
    init_subscriber(subscriber);

    let (request_done_sender, request_done_receiver) = unbounded_channel::<()>();

    if env::var("AWS_LAMBDA_RUNTIME_API").is_ok() {
        let tracer = tracer.map(Arc::new);

        tokio::spawn(async move {
            let flush_extension = Arc::new(TraceFlushExtension::new(request_done_receiver));
            let extension = Extension::new()
                // Internal extensions only support INVOKE events.
                .with_events(&["INVOKE"])
                .with_events_processor(service_fn(|event| {
                    let tracer = tracer.clone();
                    let flush_extension = flush_extension.clone();
                    async move { flush_extension.invoke(event, tracer).await }
                }))
                // Internal extension names MUST be unique within a given Lambda function.
                .with_extension_name("internal-flush")
                .register()
                .await;

            match extension {
                Ok(extension) => {
                    if let Err(e) = extension.run().await {
                        tracing::error!(error.message = %e, "Flush extension stopped");
                    }
                }
                Err(e) => tracing::error!(error.message = %e, "Failed to register the flush extension"),
            }
        });
    }

    let application = Application::build(configuration, request_done_sender).await?;

    application.run_until_stopped().await?;

    Ok(())
}
