//! Event dispatcher: text -> location prompt, location -> places lookup + carousel.

use crate::channels::line::{InboundEvent, ReplyMessage};
use crate::channels::ReplySender;
use crate::config::{Config, LookupFailurePolicy};
use crate::places::{Coordinates, PlacesLookup};
use crate::reply::{self, ReplyComposer};
use std::sync::Arc;

/// Routes inbound events to their handler and sends the reply. Built once at startup.
pub struct Dispatcher {
    places: Arc<dyn PlacesLookup>,
    replies: Arc<dyn ReplySender>,
    composer: ReplyComposer,
    on_failure: LookupFailurePolicy,
}

impl Dispatcher {
    pub fn new(
        places: Arc<dyn PlacesLookup>,
        replies: Arc<dyn ReplySender>,
        composer: ReplyComposer,
        on_failure: LookupFailurePolicy,
    ) -> Self {
        Self {
            places,
            replies,
            composer,
            on_failure,
        }
    }

    /// Dispatcher with composer and failure policy taken from config.
    pub fn from_config(
        config: &Config,
        places: Arc<dyn PlacesLookup>,
        replies: Arc<dyn ReplySender>,
    ) -> Self {
        Self::new(
            places,
            replies,
            ReplyComposer::from_config(&config.reply),
            config.places.on_failure,
        )
    }

    /// Handle one event and send its reply. Send failures are logged, never returned.
    pub async fn dispatch(&self, event: InboundEvent) {
        let messages = self.messages_for(&event).await;
        if let Err(e) = self
            .replies
            .send_reply(event.reply_token(), &messages)
            .await
        {
            log::error!("sending reply failed: {}", e);
        }
    }

    /// The messages the bot answers `event` with.
    pub async fn messages_for(&self, event: &InboundEvent) -> Vec<ReplyMessage> {
        match event {
            InboundEvent::Text { .. } => reply::location_prompt(),
            InboundEvent::Location {
                latitude,
                longitude,
                ..
            } => {
                let origin = Coordinates::new(*latitude, *longitude);
                self.location_reply(origin).await
            }
        }
    }

    async fn location_reply(&self, origin: Coordinates) -> Vec<ReplyMessage> {
        let places = match self.places.nearby(origin).await {
            Ok(places) => places,
            Err(e) => match self.on_failure {
                LookupFailurePolicy::Empty => {
                    log::warn!("places lookup near {} failed, replying as no results: {}", origin, e);
                    Vec::new()
                }
                LookupFailurePolicy::Report => {
                    log::error!("places lookup near {} failed: {}", origin, e);
                    return reply::lookup_failed();
                }
            },
        };
        log::info!("places lookup near {}: {} candidate(s)", origin, places.len());
        self.composer.compose(places, origin, &mut rand::thread_rng())
    }
}
