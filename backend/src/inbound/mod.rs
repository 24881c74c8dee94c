//! Inbound adapters that translate external requests into domain service
//! calls while keeping framework details at the edge.
//!
//! REST endpoints live under [`http`]; live match updates are streamed over
//! [`ws`].

pub mod http;
pub mod ws;
