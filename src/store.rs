// Booking persistence contract
// Anything that can create, read, update and delete booking documents.

use crate::booking::{BookingRecord, BookingRequest, BookingStatus, PackageId};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Booking not found: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    Transport(String),

    #[error("API error: {status_code} - {message}")]
    Api { status_code: u16, message: String },

    #[error("Decode error: {0}")]
    Decode(String),
}

impl StoreError {
    // Whether repeating the same call could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            StoreError::Transport(_) => true,
            StoreError::Api { status_code, .. } => *status_code >= 500,
            _ => false,
        }
    }
}

#[async_trait]
pub trait BookingStore: Send + Sync + 'static {
    // Persist a new booking and return the stored record
    async fn create(&self, request: BookingRequest) -> Result<BookingRecord, StoreError>;

    async fn list(&self) -> Result<Vec<BookingRecord>, StoreError>;

    async fn get(&self, id: &str) -> Result<BookingRecord, StoreError>;

    async fn update_status(
        &self,
        id: &str,
        status: BookingStatus,
    ) -> Result<BookingRecord, StoreError>;

    async fn delete(&self, id: &str) -> Result<(), StoreError>;
}

// Checks the stored document's required fields
pub fn validate_request(request: &BookingRequest) -> Result<(), StoreError> {
    if request.email.trim().is_empty() {
        return Err(StoreError::Validation("email is required".to_string()));
    }
    if let PackageId::Id(id) = &request.package_id {
        if id.trim().is_empty() {
            return Err(StoreError::Validation("packageId is required".to_string()));
        }
    }
    Ok(())
}

/// Hands a finished booking request to the store.
///
/// No retry or queueing happens here: the outcome goes straight back to the
/// caller, who decides whether to resubmit.
pub async fn submit_booking<S>(store: &S, request: BookingRequest) -> Result<BookingRecord, StoreError>
where
    S: BookingStore + ?Sized,
{
    let package_id = request.package_id.clone();
    match store.create(request).await {
        Ok(record) => {
            info!(booking_id = %record.id, package_id = %package_id, price = record.request.price, "booking submitted");
            Ok(record)
        }
        Err(e) => {
            warn!(package_id = %package_id, error = %e, "booking submission failed");
            Err(e)
        }
    }
}

/// Process-local store, mainly for tests and offline use.
#[derive(Debug, Default)]
pub struct InMemoryBookingStore {
    bookings: DashMap<String, BookingRecord>,
    next_id: AtomicU64,
}

impl InMemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bookings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookings.is_empty()
    }

    fn generate_id(&self) -> String {
        let seq = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        format!("booking-{:06}", seq)
    }
}

#[async_trait]
impl BookingStore for InMemoryBookingStore {
    async fn create(&self, request: BookingRequest) -> Result<BookingRecord, StoreError> {
        validate_request(&request)?;

        let record = BookingRecord {
            id: self.generate_id(),
            request,
            status: BookingStatus::Pending,
            booked_at: Utc::now(),
        };
        self.bookings.insert(record.id.clone(), record.clone());

        debug!(booking_id = %record.id, "booking created");
        Ok(record)
    }

    async fn list(&self) -> Result<Vec<BookingRecord>, StoreError> {
        let mut records: Vec<BookingRecord> =
            self.bookings.iter().map(|entry| entry.value().clone()).collect();
        records.sort_by(|a, b| a.booked_at.cmp(&b.booked_at).then_with(|| a.id.cmp(&b.id)));

        debug!(count = records.len(), "listed bookings");
        Ok(records)
    }

    async fn get(&self, id: &str) -> Result<BookingRecord, StoreError> {
        self.bookings
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn update_status(
        &self,
        id: &str,
        status: BookingStatus,
    ) -> Result<BookingRecord, StoreError> {
        let mut entry = self
            .bookings
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        entry.status = status;

        info!(booking_id = %id, status = %status, "booking status updated");
        Ok(entry.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        match self.bookings.remove(id) {
            Some(_) => {
                info!(booking_id = %id, "booking deleted");
                Ok(())
            }
            None => Err(StoreError::NotFound(id.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::ContactInfo;
    use crate::catalog::small_catalog;
    use crate::configurator::PackageConfigurator;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;
    use tokio_test::{assert_err, assert_ok};
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;

    // Counts INFO events seen while installed as the default subscriber
    #[derive(Clone, Default)]
    struct InfoCounter(Arc<AtomicUsize>);

    impl<S: tracing::Subscriber> Layer<S> for InfoCounter {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == tracing::Level::INFO {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    fn custom_request(email: &str) -> BookingRequest {
        let mut cfg = PackageConfigurator::new(Arc::new(small_catalog()));
        cfg.select_option("Hall", "5-Star Hall-Avendra").unwrap();
        cfg.select_option("catering", "Full Catering Service-Repa Catering").unwrap();
        cfg.apply_discount_code("WEDDING15").unwrap();
        cfg.build_booking_request(&ContactInfo::new(email)).unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let store = InMemoryBookingStore::new();
        let record = assert_ok!(submit_booking(&store, custom_request("a@example.com")).await);

        assert_eq!(record.id, "booking-000001");
        assert_eq!(record.status, BookingStatus::Pending);
        assert_eq!(record.request.price, 272000);

        let fetched = assert_ok!(store.get(&record.id).await);
        assert_eq!(fetched, record);
    }

    #[tokio::test]
    async fn test_submission_logs_one_info_event() {
        let counter = InfoCounter::default();
        let _guard =
            tracing::subscriber::set_default(tracing_subscriber::registry().with(counter.clone()));

        let store = InMemoryBookingStore::new();
        assert_ok!(submit_booking(&store, custom_request("a@example.com")).await);
        assert_eq!(counter.0.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_create_rejects_missing_email() {
        let store = InMemoryBookingStore::new();
        let mut request = custom_request("a@example.com");
        request.email = String::new();

        let result = submit_booking(&store, request).await;
        assert!(matches!(result, Err(StoreError::Validation(_))));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_blank_package_id() {
        let store = InMemoryBookingStore::new();
        let mut request = custom_request("a@example.com");
        request.package_id = PackageId::Id("  ".to_string());
        assert_err!(store.create(request).await);
    }

    #[tokio::test]
    async fn test_update_status_and_delete() -> anyhow::Result<()> {
        let store = InMemoryBookingStore::new();
        let record = store.create(custom_request("a@example.com")).await?;

        let updated = store.update_status(&record.id, BookingStatus::Confirmed).await?;
        assert_eq!(updated.status, BookingStatus::Confirmed);
        assert_eq!(store.get(&record.id).await?.status, BookingStatus::Confirmed);

        store.delete(&record.id).await?;
        assert!(matches!(store.get(&record.id).await, Err(StoreError::NotFound(_))));
        assert!(matches!(store.delete(&record.id).await, Err(StoreError::NotFound(_))));
        assert!(matches!(
            store.update_status(&record.id, BookingStatus::Cancelled).await,
            Err(StoreError::NotFound(_))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_concurrent_creates_get_unique_ids() {
        let store = Arc::new(InMemoryBookingStore::new());

        let tasks = (0..50).map(|i| {
            let store = Arc::clone(&store);
            async move { store.create(custom_request(&format!("user{}@example.com", i))).await }
        });
        let results = futures::future::join_all(tasks).await;

        assert!(results.iter().all(|r| r.is_ok()));
        assert_eq!(store.len(), 50);

        let listed = store.list().await.unwrap();
        let ids: HashSet<_> = listed.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn test_retryable_errors() {
        assert!(StoreError::Transport("reset".to_string()).is_retryable());
        assert!(StoreError::Api { status_code: 503, message: String::new() }.is_retryable());
        assert!(!StoreError::Api { status_code: 404, message: String::new() }.is_retryable());
        assert!(!StoreError::Validation(String::new()).is_retryable());
    }
}
