//! Incrementally accumulated booking fields

use serde::{Deserialize, Serialize};

/// Booking fields gathered across turns. Absent fields are never serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookingDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_type: Option<String>,
    /// `YYYY-MM-DD`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// `HH:MM`, 24-hour
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl BookingDraft {
    /// Fold a partial extraction result into this draft.
    ///
    /// Only present values are taken; a `None` in `partial` never clears an
    /// existing value.
    pub fn merge(&mut self, partial: BookingDraft) {
        let BookingDraft {
            service_type,
            date,
            time,
            duration_hours,
            location,
        } = partial;

        if service_type.is_some() {
            self.service_type = service_type;
        }
        if date.is_some() {
            self.date = date;
        }
        if time.is_some() {
            self.time = time;
        }
        if duration_hours.is_some() {
            self.duration_hours = duration_hours;
        }
        if location.is_some() {
            self.location = location;
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == BookingDraft::default()
    }
}
