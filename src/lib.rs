pub mod configuration;
pub mod dispatcher;
pub mod domain;
pub mod form;
pub mod providers;
pub mod routes;
pub mod startup;
pub mod telemetry;
pub mod utils;
