pub mod engine;
pub mod onboarding;
