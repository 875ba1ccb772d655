//! Backend gateway client for the registration review desk.
//!
//! Wraps the gateway's HTTP JSON API (login, pending reviews, review
//! detail, decisions, site updates, area/block catalog, dashboard
//! overview) using [`reqwest`], and owns the operator's session.
//!
//! The [`ReviewGateway`] trait is the seam the workflow controller is
//! written against, so tests can substitute a scripted gateway.

pub mod api;
pub mod config;
pub mod error;
pub mod gateway;
pub mod routes;
pub mod session;
pub mod types;

pub use api::GatewayClient;
pub use config::{ConfigError, GatewayConfig};
pub use error::GatewayError;
pub use gateway::ReviewGateway;
pub use session::{FileSessionStore, MemorySessionStore, Session, SessionError, SessionStore};
