// Booking payloads exchanged with the persistence API
// Field names follow the create-booking contract exactly so a request can be
// persisted without any transformation.

use crate::configurator::ConfiguratorError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const CUSTOM_PACKAGE_ID: &str = "custom";
pub const CUSTOM_WEDDING_TYPE: &str = "Custom Package";
pub const CUSTOM_PREVIEW_IMAGE: &str = "custom-package.jpg";

/// Identifies what was booked: a configured package, a built-in package with a
/// numeric id, or a stored package document id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawPackageId", into = "RawPackageId")]
pub enum PackageId {
    Custom,
    Number(u64),
    Id(String),
}

// Wire form of a package id. Reads of stored bookings may return the
// referenced package document in place of its id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawPackageId {
    Number(u64),
    Text(String),
    Populated {
        #[serde(rename = "_id")]
        id: String,
    },
}

impl From<RawPackageId> for PackageId {
    fn from(raw: RawPackageId) -> Self {
        match raw {
            RawPackageId::Number(n) => PackageId::Number(n),
            RawPackageId::Text(s) if s == CUSTOM_PACKAGE_ID => PackageId::Custom,
            RawPackageId::Text(s) | RawPackageId::Populated { id: s } => PackageId::Id(s),
        }
    }
}

impl From<PackageId> for RawPackageId {
    fn from(id: PackageId) -> Self {
        match id {
            PackageId::Custom => RawPackageId::Text(CUSTOM_PACKAGE_ID.to_string()),
            PackageId::Number(n) => RawPackageId::Number(n),
            PackageId::Id(s) => RawPackageId::Text(s),
        }
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackageId::Custom => f.write_str(CUSTOM_PACKAGE_ID),
            PackageId::Number(n) => write!(f, "{}", n),
            PackageId::Id(s) => f.write_str(s),
        }
    }
}

// Contact details of the requesting user
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ContactInfo {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, rename = "phoneNumber")]
    pub phone_number: Option<String>,
}

impl ContactInfo {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            phone_number: None,
        }
    }

    pub fn with_phone(mut self, phone_number: impl Into<String>) -> Self {
        self.phone_number = Some(phone_number.into());
        self
    }

    pub fn email(&self) -> Result<&str, ConfiguratorError> {
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty())
            .ok_or(ConfiguratorError::MissingContact)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BookingRequest {
    #[serde(rename = "packageId")]
    pub package_id: PackageId,
    #[serde(default)]
    pub wedding_type: String,
    #[serde(default)]
    pub price: u64,
    #[serde(default)]
    pub preview_image: String,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default, rename = "phoneNumber")]
    pub phone_number: String,
    #[serde(default)]
    pub email: String,
}

impl BookingRequest {
    // Shared by the custom and the pre-built booking paths
    pub(crate) fn assemble(
        package_id: PackageId,
        wedding_type: &str,
        price: u64,
        preview_image: &str,
        features: Vec<String>,
        contact: &ContactInfo,
    ) -> Result<Self, ConfiguratorError> {
        let email = contact.email()?.to_string();

        Ok(Self {
            package_id,
            wedding_type: wedding_type.to_string(),
            price,
            preview_image: preview_image.to_string(),
            features,
            phone_number: contact.phone_number.clone().unwrap_or_default(),
            email,
        })
    }
}

/// A pre-built package booked as a whole, with a fixed price and feature list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct WeddingPackage {
    pub id: PackageId,
    pub wedding_type: String,
    pub price: u64,
    #[serde(default)]
    pub preview_image: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub features: Vec<String>,
}

impl WeddingPackage {
    pub fn booking_request(&self, contact: &ContactInfo) -> Result<BookingRequest, ConfiguratorError> {
        BookingRequest::assemble(
            self.id.clone(),
            &self.wedding_type,
            self.price,
            &self.preview_image,
            self.features.clone(),
            contact,
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// A booking as stored by the persistence API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BookingRecord {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(flatten)]
    pub request: BookingRequest,
    #[serde(default)]
    pub status: BookingStatus,
    #[serde(rename = "bookedAt", default = "Utc::now")]
    pub booked_at: DateTime<Utc>,
}
