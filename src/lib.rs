// Wedding package pricing and booking library

pub mod admin;
pub mod booking;
pub mod catalog;
pub mod config;
pub mod configurator;
pub mod http_client;
pub mod packages;
pub mod store;

// Re-export key types for convenience
pub use admin::{filter_bookings, BookingFilter, BookingSummary, DateRange};
pub use booking::{
    BookingRecord, BookingRequest, BookingStatus, ContactInfo, PackageId, WeddingPackage,
};
pub use catalog::{Catalog, CatalogError, CatalogOption, Category};
pub use config::AppConfig;
pub use configurator::{discounted_price, ConfiguratorError, PackageConfigurator};
pub use http_client::{ClientConfig, ClientError, ClientStats, HttpBookingClient, RetryConfig};
pub use packages::{NewPackage, PackageError, PackageListing, PackageStore, PackageUpdate};
pub use store::{submit_booking, BookingStore, InMemoryBookingStore, StoreError};
