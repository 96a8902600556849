// Library for tests to access modules

pub mod computer_repo;
pub mod config;
pub mod dashboard;
pub mod models;
pub mod notifier;
pub mod registry;
pub mod routes;
pub mod status;
pub mod telemetry;
pub mod version;
pub mod worker;
