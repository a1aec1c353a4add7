//! Places API response types for Nearby Search and Place Details.
//!
//! See: <https://developers.google.com/maps/documentation/places/web-service/search-nearby>

use geoharvest_core::{GeoPoint, ProviderError};
use serde::Deserialize;

use super::provider::NAME;

/// Fields requested from Place Details.
pub(crate) const DETAIL_FIELDS: &str = "photos,geometry";

/// `GET nearbysearch/json` envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct NearbyResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<PlaceSummary>,
    pub error_message: Option<String>,
}

/// One Nearby Search hit.
#[derive(Debug, Deserialize)]
pub(crate) struct PlaceSummary {
    pub place_id: String,
}

/// `GET details/json` envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct DetailsResponse {
    pub status: String,
    pub result: Option<PlaceDetails>,
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PlaceDetails {
    #[serde(default)]
    pub photos: Vec<Photo>,
    pub geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Photo {
    pub photo_reference: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Geometry {
    pub location: LatLng,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl PlaceDetails {
    /// Position of the place, when reported and in range.
    pub(crate) fn location(&self) -> Option<GeoPoint> {
        let location = &self.geometry.as_ref()?.location;
        GeoPoint::new(location.lat, location.lng).ok()
    }

    /// Non-empty photo references in response order.
    pub(crate) fn photo_references(self) -> impl Iterator<Item = String> {
        self.photos
            .into_iter()
            .map(|photo| photo.photo_reference)
            .filter(|reference| !reference.is_empty())
    }
}

/// Interpret the `status` field shared by every Places response.
///
/// Returns `Ok(true)` when results follow and `Ok(false)` for
/// `ZERO_RESULTS` and `NOT_FOUND`.
pub(crate) fn check_status(status: &str, error_message: Option<&str>) -> Result<bool, ProviderError> {
    let message = || match error_message {
        Some(detail) => format!("{status}: {detail}"),
        None => status.to_owned(),
    };
    match status {
        "OK" => Ok(true),
        "ZERO_RESULTS" | "NOT_FOUND" => Ok(false),
        "OVER_QUERY_LIMIT" | "UNKNOWN_ERROR" => Err(ProviderError::transient(NAME, message())),
        _ => Err(ProviderError::permanent(NAME, message())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("OK", Some(true))]
    #[case("ZERO_RESULTS", Some(false))]
    #[case("NOT_FOUND", Some(false))]
    fn usable_statuses(#[case] status: &str, #[case] expected: Option<bool>) {
        assert_eq!(check_status(status, None).ok(), expected);
    }

    #[rstest]
    #[case("OVER_QUERY_LIMIT", true)]
    #[case("UNKNOWN_ERROR", true)]
    #[case("REQUEST_DENIED", false)]
    #[case("INVALID_REQUEST", false)]
    fn failing_statuses_are_classified(#[case] status: &str, #[case] transient: bool) {
        let err = check_status(status, Some("detail")).expect_err("status should fail");
        assert_eq!(err.is_transient(), transient);
        assert!(err.to_string().contains("detail"));
    }

    #[rstest]
    fn details_expose_location_and_photo_references() {
        let body = r#"{
            "status": "OK",
            "result": {
                "geometry": {"location": {"lat": 44.4275, "lng": 26.0873}},
                "photos": [
                    {"photo_reference": "ref-a", "width": 4032, "height": 3024},
                    {"photo_reference": ""},
                    {"photo_reference": "ref-b"}
                ]
            }
        }"#;
        let response: DetailsResponse = serde_json::from_str(body).expect("should deserialise");
        let details = response.result.expect("result present");
        assert_eq!(
            details.location(),
            Some(GeoPoint::new(44.4275, 26.0873).expect("valid"))
        );
        let references: Vec<String> = details.photo_references().collect();
        assert_eq!(references, vec!["ref-a".to_owned(), "ref-b".to_owned()]);
    }

    #[rstest]
    fn nearby_results_default_to_empty() {
        let response: NearbyResponse =
            serde_json::from_str(r#"{"status": "ZERO_RESULTS"}"#).expect("should deserialise");
        assert!(response.results.is_empty());
        assert!(response.error_message.is_none());
    }
}
