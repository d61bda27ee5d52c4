use backend::configuration::get_configuration;
use backend::scheduled_handler::ScheduledJobHandler;
use backend::startup::Collaborators;
use aws_lambda_events::eventbridge::EventBridgeEvent;
use lambda_extension::Extension;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use std::sync::Arc;
use telemetry::{get_subscriber, init_subscriber, init_tracer, TraceFlushExtension};
use tokio::sync::mpsc::unbounded_channel;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let configuration = get_configuration().await?;

    let tracer = init_tracer(&configuration.telemetry)?;
    let subscriber = get_subscriber(
        "pairing-bot-daily-match".into(),
        "info".into(),
        std::io::stdout,
        &configuration.telemetry,
        tracer.as_ref(),
    );
    init_subscriber(subscriber);

    let collaborators = Collaborators::from_settings(&configuration).await?;
    let orchestrator = Arc::new(collaborators.orchestrator(&configuration));

    let (request_done_sender, request_done_receiver) = unbounded_channel::<()>();
    let flush_extension = Arc::new(TraceFlushExtension::new(request_done_receiver));
    let tracer = tracer.map(Arc::new);

    let extension = Extension::new()
        // Internal extensions only support INVOKE events.
        .with_events(&["INVOKE"])
        .with_events_processor(service_fn(|event| {
            let tracer = tracer.clone();
            let flush_extension = flush_extension.clone();
            async move { flush_extension.invoke(event, tracer).await }
        }))
        .with_extension_name("internal-flush")
        // Extensions must be registered before lambda_runtime::run() ends the Init phase.
        .register()
        .await?;

    let handler = Arc::new(ScheduledJobHandler::new(request_done_sender));

    tokio::try_join!(
        run(service_fn(|event: LambdaEvent<EventBridgeEvent>| {
            let handler = handler.clone();
            let orchestrator = orchestrator.clone();
            async move { handler.daily_match(event, &orchestrator).await }
        })),
        extension.run(),
    )?;

    Ok(())
}
