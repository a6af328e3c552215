//! Value Objects for the storefront catalog

use serde::{Deserialize, Serialize};
use std::fmt;

/// SKU (Stock Keeping Unit) value object. Numeric, distinct from the row id.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sku(String);

impl Sku {
    pub fn new(value: impl Into<String>) -> Result<Self, SkuError> {
        let value = value.into().trim().to_string();
        if value.is_empty() { return Err(SkuError::Empty); }
        if value.len() > 32 { return Err(SkuError::TooLong); }
        if !value.chars().all(|c| c.is_ascii_digit()) { return Err(SkuError::NotNumeric); }
        Ok(Self(value))
    }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for Sku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum SkuError { Empty, TooLong, NotNumeric }
impl std::error::Error for SkuError {}
impl fmt::Display for SkuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "SKU empty"),
            Self::TooLong => write!(f, "SKU too long"),
            Self::NotNumeric => write!(f, "SKU must contain digits only"),
        }
    }
}

/// URL-safe identifier derived from a display name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slug(String);

impl Slug {
    /// Accept an explicit slug as typed by an admin. Lowercased and trimmed.
    pub fn new(value: impl Into<String>) -> Result<Self, SlugError> {
        let value = value.into().trim().to_lowercase();
        if value.is_empty() { return Err(SlugError::Empty); }
        if value.len() > 120 { return Err(SlugError::TooLong); }
        let valid = value.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        if !valid || value.starts_with('-') || value.ends_with('-') { return Err(SlugError::InvalidCharacters); }
        Ok(Self(value))
    }

    /// Derive a slug from a display name: alphanumerics kept, every other run
    /// of characters collapsed into a single `-`.
    pub fn from_name(name: &str) -> Result<Self, SlugError> {
        let mut out = String::with_capacity(name.len());
        let mut pending_dash = false;
        for c in name.trim().chars() {
            if c.is_ascii_alphanumeric() {
                if pending_dash && !out.is_empty() { out.push('-'); }
                out.push(c.to_ascii_lowercase());
                pending_dash = false;
            } else {
                pending_dash = true;
            }
        }
        Self::new(out)
    }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum SlugError { Empty, TooLong, InvalidCharacters }
impl std::error::Error for SlugError {}
impl fmt::Display for SlugError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "slug empty"),
            Self::TooLong => write!(f, "slug too long"),
            Self::InvalidCharacters => write!(f, "slug may only contain lowercase letters, digits and single dashes"),
        }
    }
}
