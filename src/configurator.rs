// Custom wedding package configurator
// Tracks one session's selection, keeps the running total in step with it and
// applies percentage discount codes. Nothing here performs I/O.

use crate::booking::{
    BookingRequest, ContactInfo, PackageId, CUSTOM_PREVIEW_IMAGE, CUSTOM_WEDDING_TYPE,
};
use crate::catalog::{normalize_code, Catalog};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfiguratorError {
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Option '{label}' is not available for {category}")]
    InvalidOption { category: String, label: String },

    #[error("Please select {what} before {action}")]
    EmptySelection {
        what: &'static str,
        action: &'static str,
    },

    #[error("Please enter a discount code")]
    MissingCode,

    #[error("Invalid discount code")]
    InvalidCode(String),

    #[error("Please provide a contact email to book a package")]
    MissingContact,
}

impl ConfiguratorError {
    fn empty_for_discount() -> Self {
        ConfiguratorError::EmptySelection {
            what: "items",
            action: "applying a discount code",
        }
    }

    fn empty_for_booking() -> Self {
        ConfiguratorError::EmptySelection {
            what: "at least one service",
            action: "booking",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AppliedDiscount {
    code: String,
    percent: u8,
}

/// One user's configurator session over a shared catalog.
///
/// `raw_total` is maintained incrementally: every selection change subtracts
/// the replaced option's price before adding the new one, so the total always
/// equals the sum of the currently selected options.
#[derive(Debug, Clone)]
pub struct PackageConfigurator {
    catalog: Arc<Catalog>,
    // Indexed like catalog.categories(); holds the chosen option index
    selected: Vec<Option<usize>>,
    raw_total: u64,
    discount: Option<AppliedDiscount>,
}

impl PackageConfigurator {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        let selected = vec![None; catalog.categories().len()];
        Self {
            catalog,
            selected,
            raw_total: 0,
            discount: None,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Selects `label` for `category`, or clears the category when the label
    /// is blank. Returns the new raw total.
    pub fn select_option(&mut self, category: &str, label: &str) -> Result<u64, ConfiguratorError> {
        let cat_idx = self
            .catalog
            .category_index(category)
            .ok_or_else(|| ConfiguratorError::UnknownCategory(category.to_string()))?;
        let cat = &self.catalog.categories()[cat_idx];

        let label = label.trim();
        let new_idx = if label.is_empty() {
            None
        } else {
            let idx = cat
                .option_index(label)
                .ok_or_else(|| ConfiguratorError::InvalidOption {
                    category: category.to_string(),
                    label: label.to_string(),
                })?;
            Some(idx)
        };

        let previous_price = self.selected[cat_idx].map_or(0, |idx| cat.options[idx].price);
        let new_price = new_idx.map_or(0, |idx| cat.options[idx].price);

        self.raw_total = self.raw_total - previous_price + new_price;
        self.selected[cat_idx] = new_idx;

        Ok(self.raw_total)
    }

    pub fn clear_option(&mut self, category: &str) -> Result<u64, ConfiguratorError> {
        self.select_option(category, "")
    }

    /// Validates and applies a discount code, replacing any earlier one.
    /// A failed attempt leaves the applied discount untouched.
    pub fn apply_discount_code(&mut self, code: &str) -> Result<u8, ConfiguratorError> {
        if self.raw_total == 0 {
            return Err(ConfiguratorError::empty_for_discount());
        }

        let code = normalize_code(code);
        if code.is_empty() {
            return Err(ConfiguratorError::MissingCode);
        }

        let percent = self
            .catalog
            .discount_percent(&code)
            .ok_or_else(|| ConfiguratorError::InvalidCode(code.clone()))?;

        self.discount = Some(AppliedDiscount { code, percent });
        Ok(percent)
    }

    pub fn clear_discount(&mut self) {
        self.discount = None;
    }

    pub fn raw_total(&self) -> u64 {
        self.raw_total
    }

    pub fn applied_discount_percent(&self) -> u8 {
        self.discount.as_ref().map_or(0, |d| d.percent)
    }

    pub fn applied_code(&self) -> Option<&str> {
        self.discount.as_ref().map(|d| d.code.as_str())
    }

    pub fn compute_final_price(&self) -> u64 {
        discounted_price(self.raw_total, self.applied_discount_percent())
    }

    // Amount taken off by the applied discount
    pub fn savings(&self) -> u64 {
        self.raw_total - self.compute_final_price()
    }

    pub fn selected_label(&self, category: &str) -> Option<&str> {
        let cat_idx = self.catalog.category_index(category)?;
        let opt_idx = self.selected[cat_idx]?;
        Some(self.catalog.categories()[cat_idx].options[opt_idx].label.as_str())
    }

    /// Current selection as (category, label) pairs in catalog order.
    pub fn selection(&self) -> Vec<(&str, &str)> {
        self.catalog
            .categories()
            .iter()
            .zip(&self.selected)
            .filter_map(|(cat, sel)| {
                sel.map(|idx| (cat.name.as_str(), cat.options[idx].label.as_str()))
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.iter().all(Option::is_none)
    }

    pub fn build_booking_request(
        &self,
        contact: &ContactInfo,
    ) -> Result<BookingRequest, ConfiguratorError> {
        if self.raw_total == 0 {
            return Err(ConfiguratorError::empty_for_booking());
        }

        let features = self
            .selection()
            .into_iter()
            .map(|(_, label)| label.to_string())
            .collect();

        BookingRequest::assemble(
            PackageId::Custom,
            CUSTOM_WEDDING_TYPE,
            self.compute_final_price(),
            CUSTOM_PREVIEW_IMAGE,
            features,
            contact,
        )
    }

    // Back to a fresh session: nothing selected, no discount
    pub fn reset(&mut self) {
        self.selected.iter_mut().for_each(|sel| *sel = None);
        self.raw_total = 0;
        self.discount = None;
    }
}

/// `raw_total` reduced by `percent`, rounded half-up to a whole currency unit.
pub fn discounted_price(raw_total: u64, percent: u8) -> u64 {
    let percent = u128::from(percent.min(100));
    let scaled = u128::from(raw_total) * (100 - percent);
    // Result never exceeds raw_total, so it fits back into u64
    ((scaled + 50) / 100) as u64
}
