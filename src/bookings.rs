//! Booking records and the in-memory booking ledger

use crate::runtime::{BookingLedger, PortError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, PoisonError};
use uuid::Uuid;

/// Everything a booking needs except the ledger-assigned id and timestamp
#[derive(Debug, Clone, PartialEq)]
pub struct NewBooking {
    pub session_id: String,
    pub provider_id: String,
    pub provider_name: String,
    pub service_type: String,
    pub date: String,
    pub time: String,
    pub duration_hours: f64,
    pub location: String,
    pub hourly_rate: u32,
}

impl NewBooking {
    pub fn total_estimate(&self) -> u64 {
        total_estimate(self.hourly_rate, self.duration_hours)
    }
}

/// `hourly_rate * duration_hours`, rounded to the nearest whole unit
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn total_estimate(hourly_rate: u32, duration_hours: f64) -> u64 {
    let total = (f64::from(hourly_rate) * duration_hours).round();
    if total.is_finite() && total > 0.0 {
        total as u64
    } else {
        0
    }
}

/// A confirmed booking. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRecord {
    pub id: String,
    pub session_id: String,
    pub provider_id: String,
    pub provider_name: String,
    pub service_type: String,
    pub date: String,
    pub time: String,
    pub duration_hours: f64,
    pub location: String,
    pub hourly_rate: u32,
    pub total_estimate: u64,
    pub created_at: DateTime<Utc>,
}

impl BookingRecord {
    fn from_new(booking: NewBooking, created_at: DateTime<Utc>) -> Self {
        let total_estimate = booking.total_estimate();
        Self {
            id: Uuid::new_v4().to_string(),
            session_id: booking.session_id,
            provider_id: booking.provider_id,
            provider_name: booking.provider_name,
            service_type: booking.service_type,
            date: booking.date,
            time: booking.time,
            duration_hours: booking.duration_hours,
            location: booking.location,
            hourly_rate: booking.hourly_rate,
            total_estimate,
            created_at,
        }
    }
}

/// Process-lifetime ledger; keeps insertion order
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    bookings: Mutex<Vec<BookingRecord>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<BookingRecord>> {
        self.bookings.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl BookingLedger for InMemoryLedger {
    async fn create_booking(&self, booking: NewBooking) -> Result<BookingRecord, PortError> {
        let record = BookingRecord::from_new(booking, Utc::now());
        tracing::info!(
            booking_id = %record.id,
            session_id = %record.session_id,
            provider_id = %record.provider_id,
            total_estimate = record.total_estimate,
            "Booking created"
        );
        self.lock().push(record.clone());
        Ok(record)
    }

    async fn list_bookings(&self) -> Result<Vec<BookingRecord>, PortError> {
        Ok(self.lock().clone())
    }

    async fn get_booking(&self, id: &str) -> Result<Option<BookingRecord>, PortError> {
        Ok(self.lock().iter().find(|b| b.id == id).cloned())
    }
}
