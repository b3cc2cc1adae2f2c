pub mod analytics;
pub mod api;
pub mod auth;
pub mod config;
pub mod content;
pub mod error;
pub mod form;
pub mod i18n;
pub mod listing;
pub mod notify;
pub mod preview;
pub mod retry;
