//! Named subjects that viewpoints are planned around.

use thiserror::Error;

use crate::GeoPoint;

/// Stem used when a landmark name contains no filename-safe characters.
const FALLBACK_STEM: &str = "landmark";

/// A named location worth photographing.
///
/// Landmarks are produced by a discovery collaborator and never mutated; the
/// name doubles as the display label and, once cleaned, as the filename key
/// for downloaded images.
///
/// # Examples
///
/// ```
/// use geoharvest_core::{GeoPoint, Landmark};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let coord = GeoPoint::new(46.7697, 23.5899)?;
/// let landmark = Landmark::new("St. Michael's Church", coord, Some("church".into()))?;
/// assert_eq!(landmark.file_stem(), "St_Michaels_Church");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Landmark {
    name: String,
    coord: GeoPoint,
    kind: Option<String>,
}

/// Errors returned by [`Landmark::new`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LandmarkError {
    /// The name was empty or whitespace.
    #[error("landmark name must not be empty")]
    EmptyName,
}

impl Landmark {
    /// Validate and construct a [`Landmark`].
    ///
    /// # Errors
    ///
    /// Returns [`LandmarkError::EmptyName`] when `name` is blank.
    pub fn new(
        name: impl Into<String>,
        coord: GeoPoint,
        kind: Option<String>,
    ) -> Result<Self, LandmarkError> {
        let owned = name.into();
        if owned.trim().is_empty() {
            return Err(LandmarkError::EmptyName);
        }
        Ok(Self {
            name: owned,
            coord,
            kind,
        })
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Position of the landmark.
    #[must_use]
    pub const fn coord(&self) -> GeoPoint {
        self.coord
    }

    /// Optional category such as `museum` or `monument`.
    #[must_use]
    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    /// Filesystem-safe version of the name.
    ///
    /// Quotes are dropped, slashes, backslashes and spaces become `_`, and
    /// anything other than alphanumerics, `_` and `-` is removed.
    #[must_use]
    pub fn file_stem(&self) -> String {
        let stem: String = self
            .name
            .chars()
            .filter(|c| *c != '"')
            .map(|c| if matches!(c, '/' | '\\' | ' ') { '_' } else { c })
            .filter(|c| c.is_alphanumeric() || matches!(c, '_' | '-'))
            .collect();
        if stem.is_empty() {
            FALLBACK_STEM.to_owned()
        } else {
            stem
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn origin() -> GeoPoint {
        GeoPoint::new(0.0, 0.0).expect("valid")
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn rejects_blank_names(#[case] name: &str) {
        assert_eq!(
            Landmark::new(name, origin(), None),
            Err(LandmarkError::EmptyName)
        );
    }

    #[rstest]
    #[case("Teatrul \"Lucian Blaga\"", "Teatrul_Lucian_Blaga")]
    #[case("A/B\\C", "A_B_C")]
    #[case("Muzeul de Artă", "Muzeul_de_Artă")]
    #[case("???", "landmark")]
    fn cleans_names_for_filenames(#[case] name: &str, #[case] expected: &str) {
        let landmark = Landmark::new(name, origin(), None).expect("landmark");
        assert_eq!(landmark.file_stem(), expected);
    }
}
