pub mod campus;
pub mod client;
pub mod config;
pub mod domains;
pub mod error;
pub mod storage;
pub mod telemetry;
pub mod uploads;
