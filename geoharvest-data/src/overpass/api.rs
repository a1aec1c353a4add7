//! Overpass QL query construction and response parsing.

use std::collections::BTreeMap;

use geoharvest_core::{GeoPoint, Landmark};
use serde::Deserialize;

/// Name given to elements without a usable `name` tag.
pub(crate) const UNKNOWN_NAME: &str = "Unknown";

/// Tag filters selecting landmark-worthy features.
const FEATURE_FILTERS: [(&str, &str); 6] = [
    ("historic", "monument"),
    ("building", "church"),
    ("building", "government"),
    ("tourism", "museum"),
    ("amenity", "theatre"),
    ("tourism", "attraction"),
];

/// Keys consulted, in order, for the landmark kind.
const KIND_KEYS: [&str; 3] = ["historic", "tourism", "amenity"];

/// `application/json` body of an Overpass interpreter response.
#[derive(Debug, Deserialize)]
pub(crate) struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<Element>,
}

/// A node or way. Nodes carry `lat`/`lon`; ways carry a `center` under
/// `out center`.
#[derive(Debug, Deserialize)]
pub(crate) struct Element {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub center: Option<Center>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

/// Centroid Overpass computes for ways.
#[derive(Debug, Clone, Copy, Deserialize)]
pub(crate) struct Center {
    pub lat: f64,
    pub lon: f64,
}

impl Element {
    /// Convert a tagged, positioned element into a [`Landmark`].
    ///
    /// Untagged elements, elements without a position and out-of-range
    /// positions yield `None`.
    fn into_landmark(self) -> Option<Landmark> {
        if self.tags.is_empty() {
            return None;
        }
        let (lat, lon) = match (self.lat, self.lon, self.center) {
            (Some(lat), Some(lon), _) => (lat, lon),
            (_, _, Some(center)) => (center.lat, center.lon),
            _ => return None,
        };
        let coord = GeoPoint::new(lat, lon).ok()?;
        let name = self
            .tags
            .get("name")
            .map(String::as_str)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(UNKNOWN_NAME)
            .to_owned();
        let kind = KIND_KEYS
            .iter()
            .find_map(|key| self.tags.get(*key))
            .cloned();
        Landmark::new(name, coord, kind).ok()
    }
}

/// Build the interpreter query for landmarks inside the area named `city`.
pub(crate) fn landmark_query(city: &str) -> String {
    let area = escape(city);
    let mut query = format!("[out:json];\narea[\"name\"=\"{area}\"]->.searchArea;\n(\n");
    for (key, value) in FEATURE_FILTERS {
        for element in ["way", "node"] {
            query.push_str(&format!(
                "  {element}[\"{key}\"=\"{value}\"](area.searchArea);\n"
            ));
        }
    }
    query.push_str(");\nout center;\n");
    query
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Landmarks in `response`, named ones first, each group in response order.
pub(crate) fn into_landmarks(response: OverpassResponse) -> Vec<Landmark> {
    let mut landmarks: Vec<Landmark> = response
        .elements
        .into_iter()
        .filter_map(Element::into_landmark)
        .collect();
    landmarks.sort_by_key(|landmark| landmark.name() == UNKNOWN_NAME);
    landmarks
}
