//! Reply seam between the dispatcher and the messaging platform.

use crate::channels::line::{LineError, ReplyMessage};
use async_trait::async_trait;

/// Sends an ordered list of messages keyed by a one-time reply token.
/// Implemented by `LineClient`; tests substitute recorders.
#[async_trait]
pub trait ReplySender: Send + Sync {
    async fn send_reply(&self, reply_token: &str, messages: &[ReplyMessage]) -> Result<(), LineError>;
}
