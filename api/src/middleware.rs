use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::web::Data;
use actix_web::Error;
use std::future::{ready, Future, Ready};
use std::pin::Pin;
use tokio::sync::mpsc::UnboundedSender;

/// Signals the request-done channel registered as app data once a response
/// has been produced, so the Lambda flush extension can export the spans of
/// that invocation.
pub struct SignalRequestDone;

impl<S, B> Transform<S, ServiceRequest> for SignalRequestDone
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = SignalRequestDoneMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SignalRequestDoneMiddleware { service }))
    }
}

pub struct SignalRequestDoneMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for SignalRequestDoneMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    actix_web::dev::forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let channel = request_done_channel(&req);
        let fut = self.service.call(req);

        Box::pin(async move {
            let outcome = fut.await;
            if let Some(channel) = channel {
                // Nobody is listening outside Lambda.
                let _ = channel.send(());
            }
            outcome
        })
    }
}

fn request_done_channel(req: &ServiceRequest) -> Option<UnboundedSender<()>> {
    req.app_data::<Data<UnboundedSender<()>>>()
        .map(|data| data.get_ref().clone())
}
