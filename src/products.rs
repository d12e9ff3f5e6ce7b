//! Products

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};

/// Storefront product identifier, as carried by the add-to-cart controls.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Create a product id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path of the display image for this product.
    pub fn image_ref(&self) -> String {
        format!("images/product{}.jpg", self.0)
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

/// Merge key of a line item.
///
/// The display name takes part in identity because variants of one product (sizes)
/// share an id and differ only by the label folded into the name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineKey {
    id: ProductId,
    name: String,
}

impl LineKey {
    /// Create a key from a product id and display name.
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Product id
    pub fn id(&self) -> &ProductId {
        &self.id
    }

    /// Display name, including any variant label.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Exact match against a raw `(id, name)` pair taken from a control.
    pub fn matches(&self, id: &str, name: &str) -> bool {
        self.id.as_str() == id && self.name == name
    }
}

impl Display for LineKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}:{}", self.id, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_ref_is_derived_from_id() {
        assert_eq!(ProductId::new("3").image_ref(), "images/product3.jpg");
    }

    #[test]
    fn line_key_matching_is_exact() {
        let key = LineKey::new("1", "Bamboo Parol Kit (Small)");

        assert!(key.matches("1", "Bamboo Parol Kit (Small)"));
        assert!(!key.matches("1", "Bamboo Parol Kit (Large)"));
        assert!(!key.matches("1", "bamboo parol kit (small)"));
        assert!(!key.matches("2", "Bamboo Parol Kit (Small)"));
    }

    #[test]
    fn line_keys_with_same_id_and_different_names_differ() {
        assert_ne!(
            LineKey::new("1", "Bamboo Parol Kit (Small)"),
            LineKey::new("1", "Bamboo Parol Kit (Large)")
        );
    }
}
