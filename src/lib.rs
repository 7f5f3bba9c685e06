//! Squeegee — a Telegram order-taking bot for window washing.

pub mod bot;
pub mod channels;
pub mod config;
pub mod dialog;
pub mod error;
pub mod export;
pub mod models;
pub mod pricing;
pub mod store;
