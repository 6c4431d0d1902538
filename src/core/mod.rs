pub mod config;
pub mod error;
pub mod session;
pub mod startup;
pub mod state;
pub mod tracing_init;
