use crate::pairing::{pairing_day, DailyRunReport, OffboardingReport, PairingOrchestrator};
use aws_lambda_events::eventbridge::EventBridgeEvent;
use chrono::Local;
use lambda_runtime::{Error, LambdaEvent};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::mpsc::UnboundedSender;

/// Runs the scheduled jobs for EventBridge triggered invocations and tells
/// the flush extension when each invocation is done.
pub struct ScheduledJobHandler {
    request_done_sender: UnboundedSender<()>,
}

impl ScheduledJobHandler {
    pub fn new(request_done_sender: UnboundedSender<()>) -> Self {
        Self { request_done_sender }
    }

    #[tracing::instrument(
        name = "scheduled_daily_match",
        skip(self, event, orchestrator),
        fields(request_id = %event.context.request_id)
    )]
    pub async fn daily_match(
        &self,
        event: LambdaEvent<EventBridgeEvent>,
        orchestrator: &PairingOrchestrator,
    ) -> Result<DailyRunReport, Error> {
        let day = pairing_day(&Local::now());
        let mut rng = StdRng::from_entropy();

        let report = orchestrator.run_daily_match(day, &mut rng).await;

        let _ = self.request_done_sender.send(());

        Ok(report)
    }

    #[tracing::instrument(
        name = "scheduled_end_of_batch",
        skip(self, event, orchestrator),
        fields(request_id = %event.context.request_id)
    )]
    pub async fn end_of_batch(
        &self,
        event: LambdaEvent<EventBridgeEvent>,
        orchestrator: &PairingOrchestrator,
    ) -> Result<OffboardingReport, Error> {
        let outcome = orchestrator.run_end_of_batch().await;

        let _ = self.request_done_sender.send(());

        outcome.map_err(|e| {
            tracing::error!(
                error.cause_chain = ?e,
                error.message = %e,
                "End of batch offboarding did not run"
            );
            e.into()
        })
    }
}
