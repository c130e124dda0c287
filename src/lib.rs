pub mod aggregate;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod file_reader;
pub mod filter;
pub mod logger;
pub mod model;
pub mod report;
pub mod route;
pub mod session;
pub mod shutdown;
pub mod source;
pub mod state;

#[allow(clippy::wildcard_imports)]
pub mod schema;
