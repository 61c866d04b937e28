//! Core PubSubHubbub hub engine.
//!
//! This crate owns every piece of protocol logic and shared state: the
//! content store, the subscription registry, the connection limiter, and
//! the fetch/verify/distribute pipeline. It has no HTTP surface of its own
//! — `psgb-hubd` wires an `axum::Router` on top of [`Hub`]'s public async
//! methods.

mod config;
mod content_store;
mod dispatcher;
mod distributor;
mod error;
mod fetcher;
mod hub;
mod limiter;
mod random;
mod subscription;
mod verifier;

pub use config::{HubSettings, LoggingOutput, LoggingSettings};
pub use content_store::{ATOM_CONTENT_TYPE, RSS_CONTENT_TYPE};
pub use error::{HubError, Result};
pub use hub::Hub;
pub use subscription::SubscribeRequest;
