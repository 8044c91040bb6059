// Catalog data for the package configurator
// Categories with priced options, discount codes and the pre-built packages.
// The catalog is loaded once and only ever read afterwards.

use crate::booking::{PackageId, WeddingPackage};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use thiserror::Error;

// Sample catalog shipped with the crate
pub const SAMPLE_CATALOG_PATH: &str = "samples/catalog.json";

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("JSON parse error: {0}")]
    JsonParseError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Duplicate category: {0}")]
    DuplicateCategory(String),

    #[error("Duplicate option '{label}' in category {category}")]
    DuplicateOption { category: String, label: String },

    #[error("Discount code {code} has percent {percent}, expected 0-100")]
    InvalidPercent { code: String, percent: u8 },

    #[error("Discount code must not be blank")]
    BlankDiscountCode,

    #[error("Discount code {0} is listed more than once")]
    DuplicateDiscountCode(String),

    #[error("Combined price of the most expensive options does not fit in u64")]
    TotalOverflow,

    #[error("Duplicate package id: {0}")]
    DuplicatePackage(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CatalogOption {
    pub label: String,
    pub price: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Category {
    pub name: String,
    pub options: Vec<CatalogOption>,
}

impl Category {
    pub fn option(&self, label: &str) -> Option<&CatalogOption> {
        self.options.iter().find(|opt| opt.label == label)
    }

    pub(crate) fn option_index(&self, label: &str) -> Option<usize> {
        self.options.iter().position(|opt| opt.label == label)
    }
}

// On-disk layout of a catalog file
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
struct CatalogFile {
    categories: Vec<Category>,
    discount_codes: HashMap<String, u8>,
    packages: Vec<WeddingPackage>,
}

/// Read-only catalog shared by every configurator session.
///
/// Category order is preserved from the source data and drives the order of
/// the feature list in a booking request.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    categories: Vec<Category>,
    discount_codes: HashMap<String, u8>,
    packages: Vec<WeddingPackage>,
}

impl Catalog {
    pub fn new(
        categories: Vec<Category>,
        discount_codes: HashMap<String, u8>,
        packages: Vec<WeddingPackage>,
    ) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for category in &categories {
            if !seen.insert(category.name.as_str()) {
                return Err(CatalogError::DuplicateCategory(category.name.clone()));
            }

            let mut labels = HashSet::new();
            for option in &category.options {
                if !labels.insert(option.label.as_str()) {
                    return Err(CatalogError::DuplicateOption {
                        category: category.name.clone(),
                        label: option.label.clone(),
                    });
                }
            }
        }

        // Every reachable raw total must stay representable
        checked_max_total(&categories).ok_or(CatalogError::TotalOverflow)?;

        let mut normalized = HashMap::with_capacity(discount_codes.len());
        for (code, percent) in discount_codes {
            let code = normalize_code(&code);
            if code.is_empty() {
                return Err(CatalogError::BlankDiscountCode);
            }
            if percent > 100 {
                return Err(CatalogError::InvalidPercent { code, percent });
            }
            if normalized.insert(code.clone(), percent).is_some() {
                return Err(CatalogError::DuplicateDiscountCode(code));
            }
        }

        let mut package_ids = HashSet::new();
        for package in &packages {
            if !package_ids.insert(package.id.clone()) {
                return Err(CatalogError::DuplicatePackage(package.id.to_string()));
            }
        }

        Ok(Self {
            categories,
            discount_codes: normalized,
            packages,
        })
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile =
            serde_json::from_str(json).map_err(|e| CatalogError::JsonParseError(e.to_string()))?;
        Self::new(file.categories, file.discount_codes, file.packages)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub(crate) fn category_index(&self, name: &str) -> Option<usize> {
        self.categories.iter().position(|c| c.name == name)
    }

    pub fn option(&self, category: &str, label: &str) -> Option<&CatalogOption> {
        self.category(category).and_then(|c| c.option(label))
    }

    // Looks a code up after trimming and uppercasing it
    pub fn discount_percent(&self, code: &str) -> Option<u8> {
        self.discount_codes.get(&normalize_code(code)).copied()
    }

    pub fn discount_codes(&self) -> &HashMap<String, u8> {
        &self.discount_codes
    }

    pub fn packages(&self) -> &[WeddingPackage] {
        &self.packages
    }

    pub fn package(&self, id: &PackageId) -> Option<&WeddingPackage> {
        self.packages.iter().find(|p| &p.id == id)
    }

    // Highest possible raw total: the most expensive option of every category
    pub fn max_total(&self) -> u64 {
        checked_max_total(&self.categories).unwrap_or(u64::MAX)
    }
}

fn checked_max_total(categories: &[Category]) -> Option<u64> {
    categories
        .iter()
        .filter_map(|c| c.options.iter().map(|o| o.price).max())
        .try_fold(0u64, |total, price| total.checked_add(price))
}

pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

// Small catalog for inline tests across the crate
#[cfg(test)]
pub(crate) const SMALL_CATALOG_JSON: &str = r#"
{
  "categories": [
    {
      "name": "Hall",
      "options": [
        { "label": "5-Star Hall-Avendra", "price": 200000 },
        { "label": "3-Star Hall-Araliya", "price": 150000 },
        { "label": "3-Star Hall-Hotel Grand", "price": 100000 }
      ]
    },
    {
      "name": "catering",
      "options": [
        { "label": "Full Catering Service-Repa Catering", "price": 120000 },
        { "label": "Basic Catering-Anglis", "price": 80000 }
      ]
    },
    {
      "name": "music",
      "options": [
        { "label": "Live Band-News", "price": 80000 },
        { "label": "DJ & Sound System-BDJ Standard", "price": 40000 }
      ]
    },
    {
      "name": "Vehicle",
      "options": [
        { "label": "Luxury Vehicle-Fit", "price": 1 }
      ]
    }
  ],
  "discount_codes": { "SAVE2023": 5, "DREAM123": 10, "WEDDING15": 15, "half": 50 },
  "packages": [
    {
      "id": 2,
      "wedding_type": "Classic",
      "price": 1500000,
      "preview_image": "classic.jpg",
      "description": "A timeless classic package.",
      "features": ["3-Star Hall-Araliya", "Basic Catering-Anglis"]
    }
  ]
}
"#;

#[cfg(test)]
pub(crate) fn small_catalog() -> Catalog {
    Catalog::from_json(SMALL_CATALOG_JSON).expect("inline catalog is valid")
}
