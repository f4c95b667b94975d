pub mod authentication;
pub mod configuration;
pub mod documents;
pub mod domain;
pub mod export;
pub mod registry;
pub mod routes;
pub mod startup;
pub mod telemetry;
pub mod utils;
