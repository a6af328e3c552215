//! Product Aggregate
//!
//! Admin-authored product drafts. The draft is checked here before it reaches
//! the repository: identifiers are normalised and prices must be coherent.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::value_objects::{Sku, SkuError, Slug, SlugError};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus { #[default] Draft, Published }

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self { Self::Draft => "draft", Self::Published => "published" }
    }
    pub fn parse(value: &str) -> Option<Self> {
        match value { "draft" => Some(Self::Draft), "published" => Some(Self::Published), _ => None }
    }
}

/// Normalised identity and pricing of a product about to be written.
#[derive(Clone, Debug)]
pub struct ProductDraft {
    pub sku: Sku,
    pub slug: Slug,
    pub price: Decimal,
    pub original_price: Option<Decimal>,
    pub buy_price: Option<Decimal>,
    pub keywords: Vec<String>,
}

impl ProductDraft {
    pub fn new(
        sku: &str,
        slug: Option<&str>,
        name: &str,
        price: Decimal,
        original_price: Option<Decimal>,
        buy_price: Option<Decimal>,
        keywords: &[String],
    ) -> Result<Self, ProductError> {
        let sku = Sku::new(sku)?;
        let slug = match slug.map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) => Slug::new(s)?,
            None => Slug::from_name(name)?,
        };
        if price.is_sign_negative() { return Err(ProductError::NegativePrice); }
        if original_price.is_some_and(|p| p.is_sign_negative()) || buy_price.is_some_and(|p| p.is_sign_negative()) {
            return Err(ProductError::NegativePrice);
        }
        if let Some(original) = original_price {
            if original < price { return Err(ProductError::OriginalBelowPrice); }
        }
        Ok(Self { sku, slug, price, original_price, buy_price, keywords: normalize_keywords(keywords) })
    }
}

/// Trim, lowercase and dedupe keywords, preserving first occurrence order.
pub fn normalize_keywords(keywords: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(keywords.len());
    for k in keywords {
        let k = k.trim().to_lowercase();
        if !k.is_empty() && !out.contains(&k) { out.push(k); }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProductError {
    #[error("Invalid SKU: {0}")]
    Sku(#[from] SkuError),
    #[error("Invalid slug: {0}")]
    Slug(#[from] SlugError),
    #[error("Prices cannot be negative")]
    NegativePrice,
    #[error("Original price must not be lower than the selling price")]
    OriginalBelowPrice,
    #[error("Insufficient inventory")]
    InsufficientInventory,
}
