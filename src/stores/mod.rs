pub mod history_cache;
pub mod skill_store;
