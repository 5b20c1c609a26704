//! # Onboarding Module
//!
//! Collects the answers from each onboarding screen for the authenticated user
//! and records when onboarding is finished. Storage is behind the
//! `OnboardingStore` trait with in-memory and SQLite implementations.

pub mod handlers;
pub mod models;
pub mod routes;
pub mod store;
pub mod store_memory;
pub mod store_sqlite;
pub mod validators;

#[cfg(test)]
mod tests;

pub use routes::onboarding_routes;
pub use store::OnboardingStore;
pub use store_memory::InMemoryOnboardingStore;
pub use store_sqlite::SqliteOnboardingStore;
