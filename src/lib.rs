pub mod core;
pub mod models;
pub mod stores;
pub mod api;
pub mod sync;
pub mod merge;
pub mod assessment;
pub mod utils;

#[cfg(test)]
mod testing;
