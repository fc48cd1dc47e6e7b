//! HTTP endpoint modules.

pub mod health;
pub mod webhooks;
