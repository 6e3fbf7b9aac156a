//! Pantry client - typed access to the pantry service and live proactive meal
//! notifications.

pub mod api;
pub mod auth;
pub mod commands;
pub mod config;
pub mod display;
pub mod notify;
