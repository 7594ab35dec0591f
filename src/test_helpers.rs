//! Shared test helpers: feed fixtures and in-memory collaborators.

use crate::controller::{ConnectivityProbe, Presenter};
use crate::error::TransportError;
use crate::feed::{DEFAULT_ENDPOINT, FeedSource, LoadRequest};
use crate::types::Record;
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// A trimmed USGS response with three events; the third has no place
pub(crate) const THREE_EARTHQUAKES: &str = r#"{
  "type": "FeatureCollection",
  "metadata": {
    "generated": 1454126400000,
    "url": "https://earthquake.usgs.gov/fdsnws/event/1/query?format=geojson&limit=10&minmag=1&orderby=time",
    "title": "USGS Earthquakes",
    "status": 200,
    "api": "1.5.2",
    "limit": 10,
    "offset": 1,
    "count": 3
  },
  "features": [
    {
      "type": "Feature",
      "properties": {
        "mag": 7.2,
        "place": "88km N of Yelizovo, Russia",
        "time": 1454124312220,
        "updated": 1460674294040,
        "url": "https://earthquake.usgs.gov/earthquakes/eventpage/us20004vvx",
        "tsunami": 1,
        "type": "earthquake"
      },
      "geometry": { "type": "Point", "coordinates": [158.5463, 53.9776, 177] },
      "id": "us20004vvx"
    },
    {
      "type": "Feature",
      "properties": {
        "mag": 6.1,
        "place": "94km SSE of Taron, Papua New Guinea",
        "time": 1454116620730,
        "updated": 1460674293040,
        "url": "https://earthquake.usgs.gov/earthquakes/eventpage/us20004vvv",
        "tsunami": 0,
        "type": "earthquake"
      },
      "geometry": { "type": "Point", "coordinates": [153.2454, -5.2952, 26] },
      "id": "us20004vvv"
    },
    {
      "type": "Feature",
      "properties": {
        "mag": 4.9,
        "place": null,
        "time": 1454051617940,
        "updated": 1460674292040,
        "url": "https://earthquake.usgs.gov/earthquakes/eventpage/us20004vr1",
        "tsunami": 0,
        "type": "earthquake"
      },
      "geometry": { "type": "Point", "coordinates": [-178.1436, -17.6539, 531] },
      "id": "us20004vr1"
    }
  ]
}"#;

/// A response with one event
pub(crate) const ONE_EARTHQUAKE: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {
      "type": "Feature",
      "properties": {
        "mag": 5.5,
        "place": "12km W of Ridgecrest, CA",
        "time": 1562383193040,
        "url": "https://earthquake.usgs.gov/earthquakes/eventpage/ci38457511"
      }
    }
  ]
}"#;

/// A response with no events
pub(crate) const NO_EARTHQUAKES: &str = r#"{"type": "FeatureCollection", "features": []}"#;

/// Build a feature; `None` leaves the property out entirely
pub(crate) fn feature_json(
    mag: Option<Value>,
    place: Option<&str>,
    time: Option<Value>,
    url: Option<&str>,
) -> Value {
    let mut properties = serde_json::Map::new();
    if let Some(mag) = mag {
        properties.insert("mag".into(), mag);
    }
    if let Some(place) = place {
        properties.insert("place".into(), json!(place));
    }
    if let Some(time) = time {
        properties.insert("time".into(), time);
    }
    if let Some(url) = url {
        properties.insert("url".into(), json!(url));
    }
    json!({ "type": "Feature", "properties": Value::Object(properties) })
}

/// Wrap features in a FeatureCollection document
pub(crate) fn feed_json(features: Vec<Value>) -> String {
    json!({ "type": "FeatureCollection", "features": features }).to_string()
}

/// Request against the default endpoint with the given filters
pub(crate) fn request(min_magnitude: &str, order_by: &str) -> LoadRequest {
    LoadRequest::build(DEFAULT_ENDPOINT, min_magnitude, order_by).unwrap()
}

type Response = Result<Vec<u8>, TransportError>;

/// In-memory [`FeedSource`] whose responses are released on demand.
///
/// Each registered URL answers only after its gate is notified, so tests
/// control exactly when a worker finishes.
#[derive(Default)]
pub(crate) struct GatedSource {
    responses: Mutex<HashMap<String, (Response, Arc<Notify>)>>,
    fetches: AtomicUsize,
}

impl GatedSource {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register a response that waits for the returned gate
    pub(crate) fn respond_gated(&self, request: &LoadRequest, response: Response) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.responses
            .lock()
            .unwrap()
            .insert(request.as_str().to_string(), (response, Arc::clone(&gate)));
        gate
    }

    /// Register a response that is returned without waiting
    pub(crate) fn respond(&self, request: &LoadRequest, response: Response) {
        self.respond_gated(request, response).notify_one();
    }

    /// Number of fetches started so far
    pub(crate) fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FeedSource for GatedSource {
    async fn fetch(&self, request: &LoadRequest) -> Result<Vec<u8>, TransportError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let entry = self.responses.lock().unwrap().get(request.as_str()).cloned();
        let Some((response, gate)) = entry else {
            return Err(TransportError::Request {
                url: request.to_string(),
                message: "no response registered".into(),
            });
        };
        gate.notified().await;
        response
    }

    fn name(&self) -> &'static str {
        "gated"
    }
}

/// [`FeedSource`] whose fetch panics, standing in for a buggy implementation
pub(crate) struct PanickingSource;

#[async_trait]
impl FeedSource for PanickingSource {
    async fn fetch(&self, _request: &LoadRequest) -> Result<Vec<u8>, TransportError> {
        panic!("feed source blew up");
    }

    fn name(&self) -> &'static str {
        "panicking"
    }
}

/// Connectivity probe with a switchable answer
pub(crate) struct FixedConnectivity(AtomicBool);

impl FixedConnectivity {
    pub(crate) fn new(connected: bool) -> Arc<Self> {
        Arc::new(Self(AtomicBool::new(connected)))
    }

    pub(crate) fn set(&self, connected: bool) {
        self.0.store(connected, Ordering::SeqCst);
    }
}

impl ConnectivityProbe for FixedConnectivity {
    fn is_connected(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Everything a [`RecordingPresenter`] has been told
#[derive(Debug, Default)]
pub(crate) struct PresenterState {
    pub list: Vec<Record>,
    pub empty_message: Option<String>,
    pub loading_visible: bool,
    pub set_list_calls: usize,
}

/// Presenter that records calls into shared state
#[derive(Clone, Default)]
pub(crate) struct RecordingPresenter {
    state: Arc<Mutex<PresenterState>>,
}

impl RecordingPresenter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn list(&self) -> Vec<Record> {
        self.state.lock().unwrap().list.clone()
    }

    pub(crate) fn empty_message(&self) -> Option<String> {
        self.state.lock().unwrap().empty_message.clone()
    }

    pub(crate) fn loading_visible(&self) -> bool {
        self.state.lock().unwrap().loading_visible
    }

    pub(crate) fn set_list_calls(&self) -> usize {
        self.state.lock().unwrap().set_list_calls
    }
}

impl Presenter for RecordingPresenter {
    fn set_list(&mut self, records: &[Record]) {
        let mut state = self.state.lock().unwrap();
        state.list = records.to_vec();
        state.set_list_calls += 1;
    }

    fn set_empty_message(&mut self, message: &str) {
        self.state.lock().unwrap().empty_message = Some(message.to_string());
    }

    fn set_loading_visible(&mut self, visible: bool) {
        self.state.lock().unwrap().loading_visible = visible;
    }
}
