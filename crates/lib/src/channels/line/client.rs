//! Messaging API client: reply with a one-time reply token.

use crate::channels::line::message::ReplyMessage;
use crate::channels::ReplySender;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

const LINE_API_BASE: &str = "https://api.line.me";

/// LINE accepts at most five messages per reply.
pub const MAX_REPLY_MESSAGES: usize = 5;

#[derive(Debug, thiserror::Error)]
pub enum LineError {
    #[error("line request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("line api error: {0}")]
    Api(String),
    #[error("line reply rejected locally: {0}")]
    Invalid(String),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplyRequest<'a> {
    reply_token: &'a str,
    messages: &'a [ReplyMessage],
}

/// Client for the LINE Messaging API (reply endpoint only).
#[derive(Clone)]
pub struct LineClient {
    base_url: String,
    channel_access_token: String,
    client: reqwest::Client,
}

impl LineClient {
    pub fn new(
        base_url: Option<String>,
        channel_access_token: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, LineError> {
        let base_url = base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| LINE_API_BASE.to_string());
        let mut builder = reqwest::Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        Ok(Self {
            base_url,
            channel_access_token: channel_access_token.into(),
            client: builder.build()?,
        })
    }

    /// POST /v2/bot/message/reply: send `messages` in order using `reply_token`.
    pub async fn reply_message(
        &self,
        reply_token: &str,
        messages: &[ReplyMessage],
    ) -> Result<(), LineError> {
        if messages.is_empty() || messages.len() > MAX_REPLY_MESSAGES {
            return Err(LineError::Invalid(format!(
                "reply must carry 1..={} messages, got {}",
                MAX_REPLY_MESSAGES,
                messages.len()
            )));
        }
        let url = format!("{}/v2/bot/message/reply", self.base_url);
        let body = ReplyRequest {
            reply_token,
            messages,
        };
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.channel_access_token)
            .json(&body)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(LineError::Api(format!("reply failed: {} {}", status, body)));
        }
        log::debug!("line reply sent: {} message(s)", messages.len());
        Ok(())
    }
}

#[async_trait]
impl ReplySender for LineClient {
    async fn send_reply(&self, reply_token: &str, messages: &[ReplyMessage]) -> Result<(), LineError> {
        self.reply_message(reply_token, messages).await
    }
}
