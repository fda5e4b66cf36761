//! Personal diet-tracking API: session-scoped meal logging plus adherence
//! metrics (counts and the best on-diet streak).

pub mod app;
pub mod config;
pub mod error;
pub mod meals;
pub mod state;
pub mod store;
pub mod users;
