//! Reply composer: place records -> LINE messages.
//!
//! Empty results become a single "not found" text. Otherwise up to `max_columns` places are
//! picked uniformly at random (a partial Fisher–Yates shuffle, so the picked cards are also in
//! random order) and rendered as a carousel preceded by a lead-in text.

use crate::channels::line::{Action, CarouselColumn, ReplyMessage};
use crate::config::ReplyConfig;
use crate::places::{Coordinates, PlaceRecord};
use rand::seq::SliceRandom;
use rand::Rng;
use url::form_urlencoded;

/// LINE carousels hold at most ten columns.
pub const MAX_CAROUSEL_COLUMNS: usize = 10;

pub const PROMPT_TEXT: &str = "カフェを探すね！\n今あなたのいる場所を送ってほしいな！";
/// Opens the location picker in the LINE app.
pub const LOCATION_PICKER_TEXT: &str = "line://nv/location";
pub const NOT_FOUND_TEXT: &str = "うーん...近くに今開いているカフェはないね！\nまた違うところで試してね！";
pub const FOUND_LEAD_TEXT: &str = "今開いているカフェが見つかったよ！";
pub const LOOKUP_FAILED_TEXT: &str = "ごめんね、今カフェを探せなかったよ…\nしばらくしてからまた試してね！";
pub const CAROUSEL_ALT_TEXT: &str = "CloSpots List";
pub const SEARCH_LABEL: &str = "Googleで検索";
pub const ROUTE_LABEL: &str = "ここからのルート";

const SEARCH_URL: &str = "https://www.google.co.jp/search";
const ROUTE_URL: &str = "http://maps.google.com/maps";

const TITLE_MAX_CHARS: usize = 40;
const TEXT_MAX_CHARS: usize = 60;
const EMPTY_FIELD: &str = "-";

/// Reply to a text message: ask for the user's location.
pub fn location_prompt() -> Vec<ReplyMessage> {
    vec![
        ReplyMessage::text(PROMPT_TEXT),
        ReplyMessage::text(LOCATION_PICKER_TEXT),
    ]
}

pub fn not_found() -> Vec<ReplyMessage> {
    vec![ReplyMessage::text(NOT_FOUND_TEXT)]
}

pub fn lookup_failed() -> Vec<ReplyMessage> {
    vec![ReplyMessage::text(LOOKUP_FAILED_TEXT)]
}

/// Web search for "<name> <address>".
pub fn search_url(place: &PlaceRecord) -> String {
    let q = format!("{} {}", place.name, place.address);
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("q", &q)
        .finish();
    format!("{}?{}", SEARCH_URL, query)
}

/// Walking directions from `origin` to `destination`.
pub fn route_url(origin: Coordinates, destination: Coordinates) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("saddr", &origin.to_string())
        .append_pair("daddr", &destination.to_string())
        .append_pair("dirflg", "w")
        .finish();
    format!("{}?{}", ROUTE_URL, query)
}

fn truncate_chars(s: &str, max: usize) -> String {
    let s = s.trim();
    if s.is_empty() {
        return EMPTY_FIELD.to_string();
    }
    match s.char_indices().nth(max) {
        Some((i, _)) => s[..i].to_string(),
        None => s.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct ReplyComposer {
    max_columns: usize,
}

impl Default for ReplyComposer {
    fn default() -> Self {
        Self::new(MAX_CAROUSEL_COLUMNS)
    }
}

impl ReplyComposer {
    /// `max_columns` is clamped to 1..=10.
    pub fn new(max_columns: usize) -> Self {
        Self {
            max_columns: max_columns.clamp(1, MAX_CAROUSEL_COLUMNS),
        }
    }

    pub fn from_config(config: &ReplyConfig) -> Self {
        Self::new(config.max_columns)
    }

    /// Compose the reply to a location message sent from `origin`.
    pub fn compose<R: Rng + ?Sized>(
        &self,
        mut places: Vec<PlaceRecord>,
        origin: Coordinates,
        rng: &mut R,
    ) -> Vec<ReplyMessage> {
        if places.is_empty() {
            return not_found();
        }
        let amount = places.len().min(self.max_columns);
        let (picked, _) = places.partial_shuffle(rng, amount);

        // Thumbnails must be on every column or on none.
        let with_thumbnails = picked.iter().all(|p| !p.icon_url.trim().is_empty());
        let columns = picked
            .iter()
            .map(|p| self.column(p, origin, with_thumbnails))
            .collect();

        vec![
            ReplyMessage::text(FOUND_LEAD_TEXT),
            ReplyMessage::carousel(CAROUSEL_ALT_TEXT, columns),
        ]
    }

    fn column(&self, place: &PlaceRecord, origin: Coordinates, with_thumbnail: bool) -> CarouselColumn {
        CarouselColumn {
            thumbnail_image_url: with_thumbnail.then(|| place.icon_url.clone()),
            title: truncate_chars(&place.name, TITLE_MAX_CHARS),
            text: truncate_chars(&place.address, TEXT_MAX_CHARS),
            actions: vec![
                Action::uri(SEARCH_LABEL, search_url(place)),
                Action::uri(ROUTE_LABEL, route_url(origin, place.location)),
            ],
        }
    }
}
