//! Candidate artwork images as returned by providers.

use serde::{Deserialize, Serialize};

/// Community rating of an image: the sortable value plus the display text
/// the picker shows ("7.2", "Not rated").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub value: f64,
    pub display: String,
}

impl Rating {
    pub fn new(value: f64) -> Self {
        Rating {
            value,
            display: format!("{value:.1}"),
        }
    }

    /// The rating a provider assigns when an image has no votes at all.
    pub fn not_rated() -> Self {
        Rating {
            value: 5.0,
            display: "Not rated".to_string(),
        }
    }
}

/// Pixel dimensions of an image, plus the display text the picker shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
    pub display: String,
}

impl ImageSize {
    pub fn new(width: u32, height: u32) -> Self {
        ImageSize {
            width,
            height,
            display: format!("{width}x{height}"),
        }
    }
}

/// A single candidate image for one art type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateImage {
    /// Full-size image URL.
    pub url: String,
    /// Name of the provider that supplied the candidate.
    pub provider: String,
    /// ISO-639-1 language of any text baked into the image, `None` for
    /// language-free art.
    pub language: Option<String>,
    pub rating: Rating,
    pub size: ImageSize,
    /// Disc-media subtype for `discart` candidates ("bluray", "dvd").
    pub subtype: Option<String>,
    /// Optional human-readable title.
    pub title: Option<String>,
    /// Backdrop is attributed to a specific season (TV shows only).
    pub has_season: bool,
    /// The image is already assigned in the library.
    pub existing: bool,
    /// Preview URL shown by the picker; set when merging existing art.
    pub preview: Option<String>,
    /// A second provider also returned this URL.
    pub second_provider: Option<String>,
    /// Aspect ratio is anomalous for the art type.
    pub goofy: bool,
}

impl CandidateImage {
    /// A candidate with neutral rating and size; callers fill in the rest.
    pub fn new(url: impl Into<String>, provider: impl Into<String>) -> Self {
        CandidateImage {
            url: url.into(),
            provider: provider.into(),
            language: None,
            rating: Rating::not_rated(),
            size: ImageSize::new(0, 0),
            subtype: None,
            title: None,
            has_season: false,
            existing: false,
            preview: None,
            second_provider: None,
            goofy: false,
        }
    }

    pub fn with_language(mut self, language: Option<&str>) -> Self {
        self.language = language.map(str::to_string);
        self
    }

    pub fn with_rating(mut self, value: f64) -> Self {
        self.rating = Rating::new(value);
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = ImageSize::new(width, height);
        self
    }
}
