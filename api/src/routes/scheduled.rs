use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, ResponseError};
use backend::domain::auth_key_store::SCHEDULER_TOKEN;
use backend::domain::AuthKeyStore;
use backend::pairing::{pairing_day, BatchError, PairingOrchestrator};
use backend::utils::error_chain_fmt;
use chrono::Local;
use rand::rngs::StdRng;
use rand::SeedableRng;
use secrecy::ExposeSecret;

pub const SCHEDULER_TOKEN_HEADER: &str = "X-Scheduler-Token";

#[derive(thiserror::Error)]
pub enum ScheduledRunError {
    #[error("The caller is not the scheduler")]
    NotTheScheduler,
    #[error(transparent)]
    OffboardingFailed(#[from] BatchError),
}

impl std::fmt::Debug for ScheduledRunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for ScheduledRunError {
    fn status_code(&self) -> StatusCode {
        match self {
            ScheduledRunError::NotTheScheduler => StatusCode::NOT_FOUND,
            ScheduledRunError::OffboardingFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Only the scheduler knows the shared token. Every other caller, and any
/// failure to read the token, looks like a missing route.
async fn reject_unless_scheduler(
    request: &HttpRequest,
    keys: &dyn AuthKeyStore,
) -> Result<(), ScheduledRunError> {
    let presented = request
        .headers()
        .get(SCHEDULER_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or(ScheduledRunError::NotTheScheduler)?;

    let expected = keys.get(SCHEDULER_TOKEN).await.map_err(|e| {
        tracing::error!(
            error.cause_chain = ?e,
            error.message = %e,
            "Failed to read the scheduler token"
        );
        ScheduledRunError::NotTheScheduler
    })?;

    if presented != expected.expose_secret().as_str() {
        tracing::warn!("Rejected a scheduled run from an unknown caller");
        return Err(ScheduledRunError::NotTheScheduler);
    }
    Ok(())
}

#[tracing::instrument(name = "Running the daily match", skip(request, keys, orchestrator))]
pub async fn run_daily_match(
    request: HttpRequest,
    keys: web::Data<dyn AuthKeyStore>,
    orchestrator: web::Data<PairingOrchestrator>,
) -> Result<HttpResponse, ScheduledRunError> {
    reject_unless_scheduler(&request, keys.get_ref()).await?;

    let day = pairing_day(&Local::now());
    let mut rng = StdRng::from_entropy();
    let report = orchestrator.run_daily_match(day, &mut rng).await;

    Ok(HttpResponse::Ok().json(report))
}

#[tracing::instrument(name = "Offboarding the batch", skip(request, keys, orchestrator))]
pub async fn run_end_of_batch(
    request: HttpRequest,
    keys: web::Data<dyn AuthKeyStore>,
    orchestrator: web::Data<PairingOrchestrator>,
) -> Result<HttpResponse, ScheduledRunError> {
    reject_unless_scheduler(&request, keys.get_ref()).await?;

    let report = orchestrator.run_end_of_batch().await?;

    Ok(HttpResponse::Ok().json(report))
}
