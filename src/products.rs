//! Products

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::Deserialize;

/// Product identifier as issued by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Create a product id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ProductId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ProductId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Denormalised display data captured alongside a line's price, so a cart can
/// be rendered without another catalog lookup.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProductDisplay {
    /// Product title
    pub title: String,

    /// Primary image reference (URL or asset key)
    pub image_ref: Option<String>,
}

impl ProductDisplay {
    /// Create display data with a title and no image.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            image_ref: None,
        }
    }

    /// Attach an image reference.
    #[must_use]
    pub fn with_image(mut self, image_ref: impl Into<String>) -> Self {
        self.image_ref = Some(image_ref.into());
        self
    }
}
