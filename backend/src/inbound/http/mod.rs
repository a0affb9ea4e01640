//! HTTP inbound adapter exposing REST endpoints.

pub mod admin;
pub mod auth;
pub mod customers;
pub mod error;
pub mod health;
pub mod notifications;
pub mod parcels;
pub mod proxy;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

pub use error::ApiResult;
