//! Feed documents served by the mock server

use serde_json::{Value, json};

/// One GeoJSON feature with the properties the pipeline reads
pub fn feature(mag: f64, place: &str, time: i64, id: &str) -> Value {
    json!({
        "type": "Feature",
        "properties": {
            "mag": mag,
            "place": place,
            "time": time,
            "url": format!("https://earthquake.usgs.gov/earthquakes/eventpage/{id}"),
            "type": "earthquake"
        },
        "geometry": { "type": "Point", "coordinates": [0.0, 0.0, 10.0] },
        "id": id
    })
}

/// A FeatureCollection around `features`
pub fn collection(features: Vec<Value>) -> Value {
    json!({
        "type": "FeatureCollection",
        "metadata": { "status": 200, "count": features.len() },
        "features": features
    })
}

/// Three events, newest first
pub fn three_earthquakes() -> Value {
    collection(vec![
        feature(7.2, "88km N of Yelizovo, Russia", 1454124312220, "us20004vvx"),
        feature(6.1, "94km SSE of Taron, Papua New Guinea", 1454116620730, "us20004vvv"),
        feature(4.9, "Fiji region", 1454051617940, "us20004vr1"),
    ])
}

/// Two large events ordered by magnitude
pub fn strong_earthquakes() -> Value {
    collection(vec![
        feature(8.3, "48km W of Illapel, Chile", 1442446603560, "us20003k7a"),
        feature(7.8, "36km E of Khudi, Nepal", 1429942551310, "us20002926"),
    ])
}
