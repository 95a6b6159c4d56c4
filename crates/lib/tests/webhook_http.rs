//! Integration test: serve the webhook routes on a free port and drive them over HTTP.
//! The places API and the LINE reply API are replaced with in-process fakes.

use async_trait::async_trait;
use lib::channels::line::{signature, LineError, ReplyMessage};
use lib::channels::ReplySender;
use lib::config::LookupFailurePolicy;
use lib::dispatch::Dispatcher;
use lib::places::{Coordinates, PlaceRecord, PlacesError, PlacesLookup};
use lib::reply::{ReplyComposer, FOUND_LEAD_TEXT, NOT_FOUND_TEXT, PROMPT_TEXT};
use lib::server::{self, ServerState};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;

const SECRET: &str = "integration-channel-secret";

struct FixedPlaces {
    places: Vec<PlaceRecord>,
    origins: Mutex<Vec<Coordinates>>,
}

#[async_trait]
impl PlacesLookup for FixedPlaces {
    async fn nearby(&self, origin: Coordinates) -> Result<Vec<PlaceRecord>, PlacesError> {
        self.origins.lock().await.push(origin);
        Ok(self.places.clone())
    }
}

#[derive(Default)]
struct Recorder {
    sent: Mutex<Vec<(String, Vec<ReplyMessage>)>>,
}

#[async_trait]
impl ReplySender for Recorder {
    async fn send_reply(&self, reply_token: &str, messages: &[ReplyMessage]) -> Result<(), LineError> {
        self.sent
            .lock()
            .await
            .push((reply_token.to_string(), messages.to_vec()));
        Ok(())
    }
}

struct Harness {
    base_url: String,
    places: Arc<FixedPlaces>,
    recorder: Arc<Recorder>,
    client: reqwest::Client,
}

async fn start(places: Vec<PlaceRecord>) -> Harness {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind free port");
    let port = listener.local_addr().expect("local_addr").port();
    let places = Arc::new(FixedPlaces {
        places,
        origins: Mutex::new(Vec::new()),
    });
    let recorder = Arc::new(Recorder::default());
    let dispatcher = Dispatcher::new(
        places.clone(),
        recorder.clone(),
        ReplyComposer::default(),
        LookupFailurePolicy::Empty,
    );
    let state = ServerState::new(SECRET, Arc::new(dispatcher));
    tokio::spawn(async move {
        let _ = server::serve(listener, state).await;
    });
    Harness {
        base_url: format!("http://127.0.0.1:{}", port),
        places,
        recorder,
        client: reqwest::Client::new(),
    }
}

impl Harness {
    async fn post_signed(&self, body: &str) -> reqwest::Response {
        let sig = signature::sign(SECRET, body.as_bytes());
        self.post_with_signature(body, Some(&sig)).await
    }

    async fn post_with_signature(&self, body: &str, sig: Option<&str>) -> reqwest::Response {
        let mut req = self
            .client
            .post(format!("{}/callback", self.base_url))
            .header("Content-Type", "application/json")
            .body(body.to_string());
        if let Some(s) = sig {
            req = req.header("X-Line-Signature", s);
        }
        req.send().await.expect("callback request")
    }
}

fn place(i: usize) -> PlaceRecord {
    PlaceRecord {
        name: format!("Cafe {}", i),
        address: format!("{}-2-3 Jinnan", i),
        location: Coordinates::new(35.66 + i as f64 / 1000.0, 139.70),
        icon_url: "https://maps.gstatic.com/mapfiles/place_api/icons/cafe-71.png".to_string(),
    }
}

fn text_body(token: &str, text: &str) -> String {
    serde_json::json!({
        "destination": "U0",
        "events": [{
            "type": "message",
            "replyToken": token,
            "source": { "type": "user", "userId": "U1" },
            "timestamp": 1700000000000u64,
            "message": { "type": "text", "id": "1", "text": text }
        }]
    })
    .to_string()
}

fn location_body(token: &str, lat: f64, lng: f64) -> String {
    serde_json::json!({
        "destination": "U0",
        "events": [{
            "type": "message",
            "replyToken": token,
            "source": { "type": "user", "userId": "U1" },
            "timestamp": 1700000000000u64,
            "message": { "type": "location", "id": "2", "address": "東京都渋谷区", "latitude": lat, "longitude": lng }
        }]
    })
    .to_string()
}

#[tokio::test]
async fn health_reports_running_and_port() {
    let h = start(vec![]).await;
    let resp = h.client.get(format!("{}/", h.base_url)).send().await.unwrap();
    assert!(resp.status().is_success());
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json.get("runtime").and_then(|v| v.as_str()), Some("running"));
    let port: u64 = h.base_url.rsplit(':').next().unwrap().parse().unwrap();
    assert_eq!(json.get("port").and_then(|v| v.as_u64()), Some(port));
}

#[tokio::test]
async fn bad_signature_is_rejected_and_nothing_is_sent() {
    let h = start(vec![place(1)]).await;
    let body = text_body("rt", "hello");
    let wrong = signature::sign("some-other-secret", body.as_bytes());
    let resp = h.post_with_signature(&body, Some(&wrong)).await;
    assert_eq!(resp.status().as_u16(), 400);
    let resp = h.post_with_signature(&body, None).await;
    assert_eq!(resp.status().as_u16(), 400);
    assert!(h.recorder.sent.lock().await.is_empty());
}

#[tokio::test]
async fn text_message_gets_location_prompt() {
    let h = start(vec![place(1)]).await;
    let resp = h.post_signed(&text_body("rt-text", "カフェ行きたい")).await;
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");

    let sent = h.recorder.sent.lock().await;
    assert_eq!(sent.len(), 1);
    let (token, messages) = &sent[0];
    assert_eq!(token, "rt-text");
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].as_text(), Some(PROMPT_TEXT));
    assert_eq!(messages[1].as_text(), Some("line://nv/location"));
    assert!(h.places.origins.lock().await.is_empty());
}

#[tokio::test]
async fn location_with_no_results_gets_not_found() {
    let h = start(vec![]).await;
    let resp = h.post_signed(&location_body("rt-loc", 35.6581, 139.7017)).await;
    assert_eq!(resp.status().as_u16(), 200);

    let sent = h.recorder.sent.lock().await;
    assert_eq!(sent[0].1, vec![ReplyMessage::text(NOT_FOUND_TEXT)]);
    assert_eq!(
        h.places.origins.lock().await.as_slice(),
        &[Coordinates::new(35.6581, 139.7017)]
    );
}

#[tokio::test]
async fn location_with_many_results_gets_ten_distinct_columns() {
    let input: Vec<PlaceRecord> = (0..15).map(place).collect();
    let known: HashSet<String> = input.iter().map(|p| p.name.clone()).collect();
    let h = start(input).await;
    let resp = h.post_signed(&location_body("rt-many", 35.6581, 139.7017)).await;
    assert_eq!(resp.status().as_u16(), 200);

    let sent = h.recorder.sent.lock().await;
    let (token, messages) = &sent[0];
    assert_eq!(token, "rt-many");
    assert_eq!(messages[0].as_text(), Some(FOUND_LEAD_TEXT));
    let columns = messages[1].carousel_columns().expect("carousel");
    assert_eq!(columns.len(), 10);
    let titles: HashSet<String> = columns.iter().map(|c| c.title.clone()).collect();
    assert_eq!(titles.len(), 10);
    assert!(titles.is_subset(&known));
    for c in columns {
        assert!(c.actions[1].target().contains("saddr=35.6581%2C139.7017"));
        assert!(c.actions[1].target().ends_with("dirflg=w"));
    }
}

#[tokio::test]
async fn signed_but_malformed_body_is_rejected() {
    let h = start(vec![]).await;
    let resp = h.post_signed("{ not json").await;
    assert_eq!(resp.status().as_u16(), 400);
    assert!(h.recorder.sent.lock().await.is_empty());
}

#[tokio::test]
async fn verify_request_and_unhandled_events_are_acknowledged() {
    let h = start(vec![]).await;
    let resp = h.post_signed(r#"{"destination":"U0","events":[]}"#).await;
    assert_eq!(resp.status().as_u16(), 200);

    let follow = r#"{"destination":"U0","events":[{"type":"follow","replyToken":"rt","source":{"type":"user","userId":"U1"},"timestamp":1}]}"#;
    let resp = h.post_signed(follow).await;
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
    assert!(h.recorder.sent.lock().await.is_empty());
}

#[tokio::test]
async fn standby_event_does_not_reject_the_delivery() {
    let h = start(vec![]).await;
    let body = serde_json::json!({
        "destination": "U0",
        "events": [
            {
                "type": "message",
                "mode": "standby",
                "source": { "type": "user", "userId": "U1" },
                "timestamp": 1700000000000u64,
                "message": { "type": "text", "id": "1", "text": "seen by another channel" }
            },
            {
                "type": "message",
                "mode": "active",
                "replyToken": "rt-active",
                "source": { "type": "user", "userId": "U1" },
                "timestamp": 1700000000001u64,
                "message": { "type": "text", "id": "2", "text": "カフェ" }
            }
        ]
    })
    .to_string();
    let resp = h.post_signed(&body).await;
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");

    let sent = h.recorder.sent.lock().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "rt-active");
    assert_eq!(sent[0].1[0].as_text(), Some(PROMPT_TEXT));
}
