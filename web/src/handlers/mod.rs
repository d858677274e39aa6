//! HTTP request handlers.
//!
//! This module contains all HTTP handlers organized by domain.

pub mod admin;
pub mod auth;
pub mod health;

pub use health::health_check;
