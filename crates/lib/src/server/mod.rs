//! Webhook server: LINE callback endpoint plus a health probe, on a single port.
//!
//! `POST /callback` checks `X-Line-Signature` against the raw body, parses the events and hands
//! each to the dispatcher before acknowledging with `200 OK`.

mod routes;

pub use routes::{router, run_server, serve, ServerState};
