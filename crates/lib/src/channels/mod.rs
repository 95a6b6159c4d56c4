//! Messaging channels.
//!
//! LINE is the only platform: inbound webhook events are parsed here and replies go back
//! through the `ReplySender` seam so the dispatcher never talks HTTP directly.

pub mod line;
mod sender;

pub use sender::ReplySender;
