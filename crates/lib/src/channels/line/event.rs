//! LINE webhook payload: raw wire types and the inbound events the dispatcher handles.

use serde::Deserialize;

/// Webhook POST body: `{ "destination", "events": [...] }`.
/// Events stay raw JSON until `into_inbound_events`, so one odd event cannot reject a delivery.
#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub events: Vec<serde_json::Value>,
}

/// One raw webhook event. Only message events are modeled; follow, unfollow, postback etc. parse as `Other`.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WebhookEvent {
    Message(MessageEvent),
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEvent {
    /// Absent on events delivered in standby mode.
    #[serde(default)]
    pub reply_token: Option<String>,
    pub message: EventMessage,
}

/// Message body of a message event. Stickers, images etc. parse as `Other`.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EventMessage {
    Text {
        text: String,
    },
    Location {
        latitude: f64,
        longitude: f64,
    },
    #[serde(other)]
    Other,
}

/// An event the bot has a handler for.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    Text {
        reply_token: String,
        text: String,
    },
    Location {
        reply_token: String,
        latitude: f64,
        longitude: f64,
    },
}

impl InboundEvent {
    pub fn reply_token(&self) -> &str {
        match self {
            InboundEvent::Text { reply_token, .. } | InboundEvent::Location { reply_token, .. } => {
                reply_token
            }
        }
    }
}

impl WebhookEvent {
    /// Convert to an inbound event; `None` for events with no registered handler
    /// or nothing to reply to.
    pub fn into_inbound(self) -> Option<InboundEvent> {
        let WebhookEvent::Message(event) = self else {
            return None;
        };
        let reply_token = event.reply_token?;
        match event.message {
            EventMessage::Text { text } => Some(InboundEvent::Text { reply_token, text }),
            EventMessage::Location {
                latitude,
                longitude,
            } => Some(InboundEvent::Location {
                reply_token,
                latitude,
                longitude,
            }),
            EventMessage::Other => None,
        }
    }
}

impl WebhookPayload {
    /// Parse a raw webhook body.
    pub fn parse(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }

    /// Inbound events in delivery order, skipping those with no handler.
    /// Events that do not match the expected shape are logged and skipped.
    pub fn into_inbound_events(self) -> Vec<InboundEvent> {
        self.events
            .into_iter()
            .filter_map(|raw| match serde_json::from_value::<WebhookEvent>(raw) {
                Ok(event) => event.into_inbound(),
                Err(e) => {
                    log::debug!("skipping malformed webhook event: {}", e);
                    None
                }
            })
            .collect()
    }
}
