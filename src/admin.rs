// Admin views over stored bookings
// Filtering by status, package type, free text and booking date, plus the
// summary figures shown on the dashboard.

use crate::booking::{BookingRecord, BookingStatus};
use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DateRange {
    #[default]
    All,
    Today,
    Week,
    Month,
}

impl DateRange {
    fn contains(&self, booked_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self {
            DateRange::All => true,
            DateRange::Today => booked_at.date_naive() == now.date_naive(),
            DateRange::Week => booked_at >= now - Duration::days(7),
            DateRange::Month => now
                .checked_sub_months(Months::new(1))
                .map_or(true, |start| booked_at >= start),
        }
    }
}

// Every criterion is optional; an empty filter matches everything
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct BookingFilter {
    pub status: Option<BookingStatus>,
    pub package_type: Option<String>,
    // Case-insensitive match on email or wedding type
    pub search: Option<String>,
    pub date_range: DateRange,
}

impl BookingFilter {
    pub fn matches(&self, booking: &BookingRecord, now: DateTime<Utc>) -> bool {
        if !self.status.map_or(true, |status| booking.status == status) {
            return false;
        }

        if !self
            .package_type
            .as_ref()
            .map_or(true, |t| &booking.request.wedding_type == t)
        {
            return false;
        }

        let search = self.search.as_deref().map(str::trim).unwrap_or_default();
        if !search.is_empty() {
            let needle = search.to_lowercase();
            let hit = booking.request.email.to_lowercase().contains(&needle)
                || booking.request.wedding_type.to_lowercase().contains(&needle);
            if !hit {
                return false;
            }
        }

        self.date_range.contains(booking.booked_at, now)
    }
}

pub fn filter_bookings(
    bookings: &[BookingRecord],
    criteria: &BookingFilter,
    now: DateTime<Utc>,
) -> Vec<BookingRecord> {
    bookings
        .iter()
        .filter(|b| criteria.matches(b, now))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BookingSummary {
    pub total_bookings: usize,
    pub pending: usize,
    pub confirmed: usize,
    pub cancelled: usize,
    // Sum of prices over bookings that are not cancelled
    pub total_revenue: u64,
    pub by_wedding_type: BTreeMap<String, usize>,
}

impl BookingSummary {
    pub fn from_bookings<'a>(bookings: impl IntoIterator<Item = &'a BookingRecord>) -> Self {
        let mut summary = Self::default();

        for booking in bookings {
            summary.total_bookings += 1;
            match booking.status {
                BookingStatus::Pending => summary.pending += 1,
                BookingStatus::Confirmed => summary.confirmed += 1,
                BookingStatus::Cancelled => summary.cancelled += 1,
            }
            if booking.status != BookingStatus::Cancelled {
                summary.total_revenue += booking.request.price;
            }
            *summary
                .by_wedding_type
                .entry(booking.request.wedding_type.clone())
                .or_insert(0) += 1;
        }

        summary
    }
}
