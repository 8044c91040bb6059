// Wedding package listings managed by admins
// Add, list, update and delete package documents. Every listing can be offered
// for booking as a pre-built package.

use crate::booking::{PackageId, WeddingPackage};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PackageError {
    #[error("Please provide all the fields (missing: {})", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Package already exists: {0}")]
    AlreadyExists(String),

    #[error("Package not found: {0}")]
    NotFound(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PackageListing {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "pckCode")]
    pub pck_code: String,
    #[serde(rename = "packageName")]
    pub package_name: String,
    pub price: u64,
    pub description: String,
    pub image: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl PackageListing {
    // Listings carry no feature breakdown, so the package books with none
    pub fn to_wedding_package(&self) -> WeddingPackage {
        WeddingPackage {
            id: PackageId::Id(self.id.clone()),
            wedding_type: self.package_name.clone(),
            price: self.price,
            preview_image: self.image.clone(),
            description: self.description.clone(),
            features: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NewPackage {
    #[serde(rename = "pckCode", default)]
    pub pck_code: String,
    #[serde(rename = "packageName", default)]
    pub package_name: String,
    #[serde(default)]
    pub price: u64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
}

impl NewPackage {
    fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.pck_code.trim().is_empty() {
            missing.push("pckCode");
        }
        if self.package_name.trim().is_empty() {
            missing.push("packageName");
        }
        if self.price == 0 {
            missing.push("price");
        }
        if self.description.trim().is_empty() {
            missing.push("description");
        }
        if self.image.trim().is_empty() {
            missing.push("image");
        }
        missing
    }
}

// Partial update; absent fields keep their stored value
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PackageUpdate {
    #[serde(rename = "pckCode", default)]
    pub pck_code: Option<String>,
    #[serde(rename = "packageName", default)]
    pub package_name: Option<String>,
    #[serde(default)]
    pub price: Option<u64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Default)]
pub struct PackageStore {
    listings: RwLock<Vec<PackageListing>>,
    next_id: AtomicU64,
}

impl PackageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, package: NewPackage) -> Result<PackageListing, PackageError> {
        let missing = package.missing_fields();
        if !missing.is_empty() {
            return Err(PackageError::MissingFields(missing));
        }

        let mut listings = self.listings.write();
        if listings.iter().any(|l| l.pck_code == package.pck_code) {
            return Err(PackageError::AlreadyExists(package.pck_code));
        }

        let now = Utc::now();
        let listing = PackageListing {
            id: format!("pck-{:06}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1),
            pck_code: package.pck_code,
            package_name: package.package_name,
            price: package.price,
            description: package.description,
            image: package.image,
            created_at: now,
            updated_at: now,
        };
        listings.push(listing.clone());

        info!(package_id = %listing.id, pck_code = %listing.pck_code, "package added");
        Ok(listing)
    }

    pub fn list(&self) -> Vec<PackageListing> {
        let listings = self.listings.read();
        debug!(count = listings.len(), "listed packages");
        listings.clone()
    }

    pub fn get(&self, id: &str) -> Result<PackageListing, PackageError> {
        self.listings
            .read()
            .iter()
            .find(|l| l.id == id)
            .cloned()
            .ok_or_else(|| PackageError::NotFound(id.to_string()))
    }

    pub fn update(&self, id: &str, update: PackageUpdate) -> Result<PackageListing, PackageError> {
        let mut listings = self.listings.write();

        if let Some(code) = &update.pck_code {
            if listings.iter().any(|l| l.id != id && &l.pck_code == code) {
                return Err(PackageError::AlreadyExists(code.clone()));
            }
        }

        let listing = listings
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| PackageError::NotFound(id.to_string()))?;

        if let Some(code) = update.pck_code {
            listing.pck_code = code;
        }
        if let Some(name) = update.package_name {
            listing.package_name = name;
        }
        if let Some(price) = update.price {
            listing.price = price;
        }
        if let Some(description) = update.description {
            listing.description = description;
        }
        if let Some(image) = update.image {
            listing.image = image;
        }
        listing.updated_at = Utc::now();

        info!(package_id = %id, "package updated");
        Ok(listing.clone())
    }

    pub fn delete(&self, id: &str) -> Result<(), PackageError> {
        let mut listings = self.listings.write();
        let before = listings.len();
        listings.retain(|l| l.id != id);

        if listings.len() == before {
            return Err(PackageError::NotFound(id.to_string()));
        }
        info!(package_id = %id, "package deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::ContactInfo;
    use test_case::test_case;

    fn gold() -> NewPackage {
        NewPackage {
            pck_code: "GOLD01".to_string(),
            package_name: "Gold".to_string(),
            price: 2000000,
            description: "Gold wedding package".to_string(),
            image: "gold.jpg".to_string(),
        }
    }

    #[test]
    fn test_add_and_list() {
        let store = PackageStore::new();
        let listing = store.add(gold()).unwrap();
        assert_eq!(listing.id, "pck-000001");
        assert_eq!(listing.created_at, listing.updated_at);

        let all = store.list();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].package_name, "Gold");
    }

    #[test]
    fn test_duplicate_code_rejected() {
        let store = PackageStore::new();
        store.add(gold()).unwrap();
        assert_eq!(
            store.add(gold()),
            Err(PackageError::AlreadyExists("GOLD01".to_string()))
        );
        assert_eq!(store.list().len(), 1);
    }

    #[test_case(NewPackage { pck_code: String::new(), ..gold() }, vec!["pckCode"]; "#1 missing code")]
    #[test_case(NewPackage { price: 0, ..gold() }, vec!["price"]; "#2 zero price")]
    #[test_case(NewPackage { description: " ".to_string(), image: String::new(), ..gold() }, vec!["description", "image"]; "#3 several fields")]
    fn test_missing_fields(package: NewPackage, expected: Vec<&'static str>) {
        let store = PackageStore::new();
        assert_eq!(store.add(package), Err(PackageError::MissingFields(expected)));
    }

    #[test]
    fn test_missing_fields_message() {
        let err = PackageError::MissingFields(vec!["price", "image"]);
        assert_eq!(err.to_string(), "Please provide all the fields (missing: price, image)");
    }

    #[test]
    fn test_partial_update() {
        let store = PackageStore::new();
        let listing = store.add(gold()).unwrap();

        let updated = store
            .update(
                &listing.id,
                PackageUpdate {
                    price: Some(1800000),
                    ..PackageUpdate::default()
                },
            )
            .unwrap();
        assert_eq!(updated.price, 1800000);
        assert_eq!(updated.package_name, "Gold");
        assert!(updated.updated_at >= listing.updated_at);
    }

    #[test]
    fn test_update_to_taken_code_rejected() {
        let store = PackageStore::new();
        store.add(gold()).unwrap();
        let silver = store
            .add(NewPackage {
                pck_code: "SILVER01".to_string(),
                ..gold()
            })
            .unwrap();

        let result = store.update(
            &silver.id,
            PackageUpdate {
                pck_code: Some("GOLD01".to_string()),
                ..PackageUpdate::default()
            },
        );
        assert_eq!(result, Err(PackageError::AlreadyExists("GOLD01".to_string())));
    }

    #[test]
    fn test_update_and_delete_unknown() {
        let store = PackageStore::new();
        assert_eq!(
            store.update("missing", PackageUpdate::default()),
            Err(PackageError::NotFound("missing".to_string()))
        );
        assert_eq!(store.delete("missing"), Err(PackageError::NotFound("missing".to_string())));
    }

    #[test]
    fn test_delete() {
        let store = PackageStore::new();
        let listing = store.add(gold()).unwrap();
        store.delete(&listing.id).unwrap();
        assert!(store.list().is_empty());
        assert!(store.get(&listing.id).is_err());
    }

    #[test]
    fn test_listing_books_as_package() {
        let store = PackageStore::new();
        let listing = store.add(gold()).unwrap();

        let request = listing
            .to_wedding_package()
            .booking_request(&ContactInfo::new("c@example.com"))
            .unwrap();
        assert_eq!(request.package_id, PackageId::Id(listing.id.clone()));
        assert_eq!(request.wedding_type, "Gold");
        assert_eq!(request.price, 2000000);
        assert_eq!(request.preview_image, "gold.jpg");
        assert!(request.features.is_empty());
    }

    #[test]
    fn test_new_package_from_form_json() {
        let package: NewPackage = serde_json::from_str(
            r#"{"pckCode":"P1","packageName":"Pearl","price":900000,"description":"d"}"#,
        )
        .unwrap();
        assert_eq!(
            PackageStore::new().add(package),
            Err(PackageError::MissingFields(vec!["image"]))
        );
    }
}
