//! Graph API response types for the `images` endpoint.
//!
//! See: <https://www.mapillary.com/developer/api-documentation#image>

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use geoharvest_core::{Candidate, GeoPoint};
use serde::Deserialize;

/// Fields requested from the `images` endpoint.
pub(crate) const IMAGE_FIELDS: &str = "id,thumb_2048_url,computed_compass_angle,captured_at,geometry";

/// Envelope returned by `GET /images`.
#[derive(Debug, Deserialize)]
pub(crate) struct ImagesResponse {
    /// Matching images; absent when nothing matched.
    #[serde(default)]
    pub data: Vec<ImageRecord>,
}

/// One image entry.
#[derive(Debug, Deserialize)]
pub(crate) struct ImageRecord {
    pub id: String,
    pub thumb_2048_url: Option<String>,
    pub computed_compass_angle: Option<f64>,
    /// Capture time in milliseconds since the Unix epoch.
    pub captured_at: Option<u64>,
    pub geometry: Option<PointGeometry>,
}

/// GeoJSON point; `coordinates` is `[lon, lat]`.
#[derive(Debug, Deserialize)]
pub(crate) struct PointGeometry {
    pub coordinates: [f64; 2],
}

impl PointGeometry {
    fn to_geo_point(&self) -> Option<GeoPoint> {
        let [lon, lat] = self.coordinates;
        GeoPoint::new(lat, lon).ok()
    }
}

impl ImageRecord {
    /// Convert to a candidate, or `None` when there is nothing to download.
    pub(crate) fn into_candidate(self) -> Option<Candidate> {
        let url = self.thumb_2048_url.filter(|url| !url.is_empty())?;
        let mut candidate = Candidate::new(self.id, url);
        if let Some(coord) = self.geometry.as_ref().and_then(PointGeometry::to_geo_point) {
            candidate = candidate.with_coord(coord);
        }
        if let Some(angle) = self.computed_compass_angle.filter(|a| a.is_finite()) {
            candidate = candidate.with_compass_angle(angle);
        }
        if let Some(captured) = self.captured_at.and_then(epoch_millis) {
            candidate = candidate.with_captured_at(captured);
        }
        Some(candidate)
    }
}

fn epoch_millis(millis: u64) -> Option<SystemTime> {
    UNIX_EPOCH.checked_add(Duration::from_millis(millis))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const SAMPLE: &str = r#"{
        "data": [
            {
                "id": "498763468214164",
                "thumb_2048_url": "https://scontent.example/t2048.jpg",
                "computed_compass_angle": 112.5,
                "captured_at": 1600000000000,
                "geometry": {"type": "Point", "coordinates": [23.5897, 46.7699]}
            },
            {
                "id": "1133771290445590",
                "captured_at": 1500000000000
            }
        ]
    }"#;

    #[rstest]
    fn deserialise_images_response() {
        let response: ImagesResponse = serde_json::from_str(SAMPLE).expect("should deserialise");
        assert_eq!(response.data.len(), 2);
    }

    #[rstest]
    fn empty_envelope_has_no_images() {
        let response: ImagesResponse = serde_json::from_str("{}").expect("should deserialise");
        assert!(response.data.is_empty());
    }

    #[rstest]
    fn records_without_thumbnail_are_dropped() {
        let response: ImagesResponse = serde_json::from_str(SAMPLE).expect("should deserialise");
        let candidates: Vec<Candidate> = response
            .data
            .into_iter()
            .filter_map(ImageRecord::into_candidate)
            .collect();
        assert_eq!(candidates.len(), 1);
        let candidate = candidates.first().expect("one candidate");
        assert_eq!(candidate.provider_ref, "498763468214164");
        assert_eq!(candidate.locator, "https://scontent.example/t2048.jpg");
        assert_eq!(candidate.compass_angle, Some(112.5));
        let coord = candidate.coord.expect("geometry parsed");
        assert!((coord.lat() - 46.7699).abs() < 1e-9);
        assert!((coord.lon() - 23.5897).abs() < 1e-9);
        assert_eq!(
            candidate.captured_at,
            Some(UNIX_EPOCH + Duration::from_secs(1_600_000_000))
        );
    }

    #[rstest]
    fn out_of_range_geometry_is_ignored() {
        let record = ImageRecord {
            id: "1".to_owned(),
            thumb_2048_url: Some("https://example/x.jpg".to_owned()),
            computed_compass_angle: None,
            captured_at: None,
            geometry: Some(PointGeometry {
                coordinates: [200.0, 10.0],
            }),
        };
        let candidate = record.into_candidate().expect("has thumbnail");
        assert!(candidate.coord.is_none());
    }
}
