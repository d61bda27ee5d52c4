pub mod adapters;
pub mod configuration;
pub mod domain;
pub mod pairing;
#[cfg(feature = "lambda")]
pub mod scheduled_handler;
pub mod startup;
pub mod utils;
