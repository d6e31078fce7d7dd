//! Elections and everything they are made of, independent of HTTP.

pub mod api;
pub mod auth;
pub mod candidate;
pub mod clock;
pub mod election;
pub mod notification;
pub mod principal;
pub mod registry;
pub mod voter;
