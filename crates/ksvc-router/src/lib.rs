//! Router adapter for ksvc
//!
//! Compiled services sit behind a router that fans a request out to one or
//! more of them and hands back a single response. This crate is the caller's
//! side of that contract: submit a request, get one decoded response (plus
//! the metadata to forward) or a definitive error.

#![deny(missing_docs)]

pub mod error;
pub mod mission_control;

pub use error::RouteError;
pub use mission_control::{MissionControl, Routed, Router, RouterRequest, RouterResponse};
