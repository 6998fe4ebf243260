//! Brand Assist — content-strategy assistant core.

pub mod config;
pub mod error;
pub mod generator;
pub mod identity;
pub mod llm;
pub mod model;
pub mod schedule;
pub mod session;
pub mod store;
pub mod tasks;
