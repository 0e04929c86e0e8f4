use serde::Deserialize;

use crate::constants::DEFAULT_LANGUAGE;
use crate::error::{CoreError, CoreResult};

/// One place/language pair processed by a reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
pub struct PlaceTarget {
    pub place: String,
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

impl PlaceTarget {
    /// ## Summary
    /// Creates a target, normalizing both parts to lowercase.
    ///
    /// ## Errors
    /// Returns an error if either part is empty or contains a path separator.
    pub fn new(place: &str, language: &str) -> CoreResult<Self> {
        let place = place.trim().to_lowercase();
        let language = language.trim().to_lowercase();

        for (label, value) in [("place", &place), ("language", &language)] {
            if value.is_empty() {
                return Err(CoreError::InvalidInput(format!("{label} must not be empty")));
            }
            if value.contains(['/', '\\']) || value.starts_with('.') {
                return Err(CoreError::InvalidInput(format!(
                    "{label} is not a valid file stem: {value}"
                )));
            }
        }

        Ok(Self { place, language })
    }

    /// ## Summary
    /// Returns the `{place}.{language}` stem shared by data and snapshot files.
    #[must_use]
    pub fn file_stem(&self) -> String {
        format!("{}.{}", self.place, self.language)
    }
}

impl std::fmt::Display for PlaceTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.place, self.language)
    }
}
