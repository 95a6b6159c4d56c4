//! Outbound message objects in the Messaging API wire shape.

use serde::Serialize;

/// A message sent with a reply token: plain text or a template (carousel).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ReplyMessage {
    Text {
        text: String,
    },
    Template {
        #[serde(rename = "altText")]
        alt_text: String,
        template: Template,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Template {
    Carousel { columns: Vec<CarouselColumn> },
}

/// One carousel card. LINE requires every column of a carousel to have the same action count
/// and to agree on whether a thumbnail is present.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarouselColumn {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_image_url: Option<String>,
    pub title: String,
    pub text: String,
    pub actions: Vec<Action>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Action {
    Uri { label: String, uri: String },
}

impl ReplyMessage {
    pub fn text(text: impl Into<String>) -> Self {
        ReplyMessage::Text { text: text.into() }
    }

    pub fn carousel(alt_text: impl Into<String>, columns: Vec<CarouselColumn>) -> Self {
        ReplyMessage::Template {
            alt_text: alt_text.into(),
            template: Template::Carousel { columns },
        }
    }

    /// Text body when this is a text message.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ReplyMessage::Text { text } => Some(text),
            ReplyMessage::Template { .. } => None,
        }
    }

    /// Carousel columns when this is a carousel template.
    pub fn carousel_columns(&self) -> Option<&[CarouselColumn]> {
        match self {
            ReplyMessage::Template {
                template: Template::Carousel { columns },
                ..
            } => Some(columns),
            ReplyMessage::Text { .. } => None,
        }
    }
}

impl Action {
    pub fn uri(label: impl Into<String>, uri: impl Into<String>) -> Self {
        Action::Uri {
            label: label.into(),
            uri: uri.into(),
        }
    }

    pub fn target(&self) -> &str {
        match self {
            Action::Uri { uri, .. } => uri,
        }
    }
}
