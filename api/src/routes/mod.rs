mod health_check;
mod scheduled;
mod webhooks;

pub use health_check::*;
pub use scheduled::*;
pub use webhooks::*;
