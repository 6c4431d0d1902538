pub mod assessment;
pub mod dashboard;
pub mod league;
pub mod profile;
pub mod skill;
