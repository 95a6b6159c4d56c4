//! LINE Messaging API: webhook events, signature check, outbound messages, reply client.

mod client;
mod event;
mod message;
pub mod signature;

pub use client::{LineClient, LineError, MAX_REPLY_MESSAGES};
pub use event::{EventMessage, InboundEvent, MessageEvent, WebhookEvent, WebhookPayload};
pub use message::{Action, CarouselColumn, ReplyMessage, Template};
