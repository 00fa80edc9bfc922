//! Deterministic provider matching
//!
//! Pipeline: service filter -> Haversine distance (<= 25 km) -> availability
//! within +/- 2 h of the requested time -> rank by rating desc, distance asc ->
//! top 3. Pure over a static catalog: identical inputs give identical output.

mod catalog;
mod geo;

pub use catalog::{Provider, ProviderCatalog};
pub use geo::GeoPoint;

use crate::session::BookingDraft;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Providers farther than this from the requester are never offered
pub const MAX_DISTANCE_KM: f64 = 25.0;

/// Half-width of the accepted availability window, inclusive
pub const SLOT_WINDOW_SECS: i64 = 2 * 60 * 60;

/// At most this many candidates are offered
pub const MAX_CANDIDATES: usize = 3;

/// Origin used when the requester's coordinates are unknown (Nairobi CBD)
pub const DEFAULT_ORIGIN: GeoPoint = GeoPoint {
    lat: -1.286_389,
    lng: 36.817_223,
};

pub const DEFAULT_SERVICE_TYPE: &str = "standard";
pub const DEFAULT_TIME: &str = "09:00";
pub const DEFAULT_DURATION_HOURS: f64 = 2.0;

const SLOT_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"];

/// A provider that passed every filter, with the data that qualified it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedProvider {
    #[serde(flatten)]
    pub provider: Provider,
    /// Rounded to one decimal place
    pub distance_km: f64,
    /// The availability entry that satisfied the request
    pub matched_slot: String,
}

/// What the requester asked for
#[derive(Debug, Clone, PartialEq)]
pub struct MatchCriteria {
    pub service_type: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub duration_hours: f64,
    pub origin: Option<GeoPoint>,
}

impl MatchCriteria {
    /// Build criteria from an accumulated draft, filling the usual defaults.
    ///
    /// Returns `None` when the date is absent or either date or time fails to parse.
    pub fn from_draft(draft: &BookingDraft, origin: Option<GeoPoint>) -> Option<Self> {
        let date = NaiveDate::parse_from_str(draft.date.as_deref()?, "%Y-%m-%d").ok()?;
        let time = parse_clock(draft.time.as_deref().unwrap_or(DEFAULT_TIME))?;
        Some(Self {
            service_type: draft
                .service_type
                .clone()
                .unwrap_or_else(|| DEFAULT_SERVICE_TYPE.to_string()),
            date,
            time,
            duration_hours: draft.duration_hours.unwrap_or(DEFAULT_DURATION_HOURS),
            origin,
        })
    }
}

fn parse_clock(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .ok()
}

fn parse_slot(slot: &str) -> Option<NaiveDateTime> {
    SLOT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(slot, fmt).ok())
}

fn round_tenth(km: f64) -> f64 {
    (km * 10.0).round() / 10.0
}

/// Stateless matching pipeline over a catalog
#[derive(Debug, Clone)]
pub struct ProviderMatcher {
    catalog: ProviderCatalog,
    default_origin: GeoPoint,
}

impl ProviderMatcher {
    pub fn new(catalog: ProviderCatalog) -> Self {
        Self {
            catalog,
            default_origin: DEFAULT_ORIGIN,
        }
    }

    #[cfg(test)]
    pub fn with_default_origin(mut self, origin: GeoPoint) -> Self {
        self.default_origin = origin;
        self
    }

    /// Run the full pipeline and return at most `MAX_CANDIDATES`, best first
    pub fn find(&self, criteria: &MatchCriteria) -> Vec<MatchedProvider> {
        let origin = criteria.origin.unwrap_or(self.default_origin);
        let requested = criteria.date.and_time(criteria.time);

        let mut results: Vec<MatchedProvider> = self
            .catalog
            .providers()
            .iter()
            .filter(|p| p.offers(&criteria.service_type))
            .filter_map(|p| {
                let distance = origin.distance_km(&p.location());
                if distance > MAX_DISTANCE_KM {
                    return None;
                }
                let slot = find_slot(p, requested)?;
                Some(MatchedProvider {
                    provider: p.clone(),
                    distance_km: round_tenth(distance),
                    matched_slot: slot.to_string(),
                })
            })
            .collect();

        // Stable: full ties keep catalog order
        results.sort_by(|a, b| {
            b.provider
                .rating
                .total_cmp(&a.provider.rating)
                .then_with(|| a.distance_km.total_cmp(&b.distance_km))
        });
        results.truncate(MAX_CANDIDATES);

        tracing::debug!(
            service_type = %criteria.service_type,
            date = %criteria.date,
            time = %criteria.time,
            duration_hours = criteria.duration_hours,
            matched = results.len(),
            "Provider match"
        );

        results
    }
}

/// First slot on the requested date within the window around the requested time
fn find_slot(provider: &Provider, requested: NaiveDateTime) -> Option<&str> {
    provider.availability.iter().map(String::as_str).find(|slot| {
        parse_slot(slot).is_some_and(|at| {
            at.date() == requested.date()
                && (at - requested).num_seconds().abs() <= SLOT_WINDOW_SECS
        })
    })
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use proptest::prelude::*;

    const NINE: &str = "2026-06-01T09:00";

    fn ids(results: &[MatchedProvider]) -> Vec<&str> {
        results.iter().map(|m| m.provider.id.as_str()).collect()
    }

    #[test]
    fn test_rating_dominates_distance() {
        let m = matcher(vec![
            provider("near", 4.0, 2.0, &[NINE]),
            provider("far", 4.5, 20.0, &[NINE]),
        ]);
        let results = m.find(&criteria("standard", "2026-06-01", "09:00"));
        assert_eq!(ids(&results), vec!["far", "near"]);
    }

    #[test]
    fn test_equal_rating_broken_by_distance() {
        let m = matcher(vec![
            provider("b", 4.5, 10.0, &[NINE]),
            provider("a", 4.5, 3.0, &[NINE]),
        ]);
        let results = m.find(&criteria("standard", "2026-06-01", "09:00"));
        assert_eq!(ids(&results), vec!["a", "b"]);
    }

    #[test]
    fn test_excludes_providers_beyond_radius() {
        let m = matcher(vec![
            provider("too-far", 5.0, 30.0, &[NINE]),
            provider("ok", 3.0, 24.9, &[NINE]),
        ]);
        let results = m.find(&criteria("standard", "2026-06-01", "09:00"));
        assert_eq!(ids(&results), vec!["ok"]);
    }

    #[test]
    fn test_service_filter() {
        let mut move_only = provider("mover", 5.0, 1.0, &[NINE]);
        move_only.services = ["move_in_out".to_string()].into();
        let m = matcher(vec![move_only, provider("std", 4.0, 1.0, &[NINE])]);

        let results = m.find(&criteria("standard", "2026-06-01", "09:00"));
        assert_eq!(ids(&results), vec!["std"]);
    }

    #[test]
    fn test_availability_window_is_inclusive_at_two_hours() {
        let m = matcher(vec![
            provider("exact", 4.0, 1.0, &["2026-06-01T11:00"]),
            provider("over", 4.0, 1.0, &["2026-06-01T11:01"]),
            provider("early", 4.0, 1.0, &["2026-06-01T07:00"]),
        ]);
        let results = m.find(&criteria("standard", "2026-06-01", "09:00"));
        assert_eq!(ids(&results), vec!["exact", "early"]);
    }

    #[test]
    fn test_slot_must_fall_on_requested_date() {
        let m = matcher(vec![provider("p", 4.0, 1.0, &["2026-06-02T00:30"])]);
        // 23:30 on the 1st is within two hours of 00:30 on the 2nd, but a different date
        assert!(m.find(&criteria("standard", "2026-06-01", "23:30")).is_empty());
    }

    #[test]
    fn test_records_first_qualifying_slot() {
        let m = matcher(vec![provider(
            "p",
            4.0,
            1.0,
            &["2026-05-31T09:00", "2026-06-01T08:00", "2026-06-01T09:00", "bogus"],
        )]);
        let results = m.find(&criteria("standard", "2026-06-01", "09:00"));
        assert_eq!(results[0].matched_slot, "2026-06-01T08:00");
    }

    #[test]
    fn test_truncates_to_three_in_rank_order() {
        let m = matcher(vec![
            provider("r3", 3.0, 1.0, &[NINE]),
            provider("r5", 5.0, 1.0, &[NINE]),
            provider("r4", 4.0, 1.0, &[NINE]),
            provider("r45", 4.5, 1.0, &[NINE]),
            provider("r2", 2.0, 1.0, &[NINE]),
        ]);
        let results = m.find(&criteria("standard", "2026-06-01", "09:00"));
        assert_eq!(ids(&results), vec!["r5", "r45", "r4"]);
    }

    #[test]
    fn test_distance_rounded_to_one_decimal() {
        let m = matcher(vec![provider("p", 4.0, 3.14159, &[NINE])]);
        let results = m.find(&criteria("standard", "2026-06-01", "09:00"));
        assert!((results[0].distance_km - 3.1).abs() < 1e-9);
    }

    #[test]
    fn test_explicit_origin_overrides_default() {
        let m = matcher(vec![provider("p", 4.0, 0.0, &[NINE])]);
        let mut c = criteria("standard", "2026-06-01", "09:00");
        c.origin = Some(GeoPoint { lat: 1.0, lng: 0.0 });
        // ~111 km away from the explicit origin
        assert!(m.find(&c).is_empty());
    }

    #[test]
    fn test_criteria_from_draft_defaults() {
        let draft = BookingDraft {
            date: Some("2026-06-01".to_string()),
            ..Default::default()
        };
        let c = MatchCriteria::from_draft(&draft, None).unwrap();
        assert_eq!(c.service_type, "standard");
        assert_eq!(c.time, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert!((c.duration_hours - 2.0).abs() < f64::EPSILON);

        assert!(MatchCriteria::from_draft(&BookingDraft::default(), None).is_none());
        let bad = BookingDraft {
            date: Some("June first".to_string()),
            ..Default::default()
        };
        assert!(MatchCriteria::from_draft(&bad, None).is_none());
    }

    fn arb_provider() -> impl Strategy<Value = Provider> {
        (
            "[a-z]{4}",
            0u8..=50,
            0u32..40,
            proptest::sample::select(vec!["07:00", "09:00", "10:30", "12:00", "15:00"]),
        )
            .prop_map(|(id, rating_tenths, km, time)| {
                let slot = format!("2026-06-01T{time}");
                provider(&id, f64::from(rating_tenths) / 10.0, f64::from(km), &[slot.as_str()])
            })
    }

    proptest! {
        #[test]
        fn prop_match_is_deterministic(providers in proptest::collection::vec(arb_provider(), 0..12)) {
            let m = matcher(providers);
            let c = criteria("standard", "2026-06-01", "09:00");
            prop_assert_eq!(m.find(&c), m.find(&c));
        }

        #[test]
        fn prop_results_are_ranked_and_bounded(providers in proptest::collection::vec(arb_provider(), 0..12)) {
            let m = matcher(providers);
            let results = m.find(&criteria("standard", "2026-06-01", "09:00"));
            prop_assert!(results.len() <= MAX_CANDIDATES);
            for pair in results.windows(2) {
                let (a, b) = (&pair[0], &pair[1]);
                prop_assert!(
                    a.provider.rating > b.provider.rating
                        || (a.provider.rating.total_cmp(&b.provider.rating).is_eq()
                            && a.distance_km <= b.distance_km)
                );
            }
            for r in &results {
                prop_assert!(r.distance_km <= MAX_DISTANCE_KM + 0.05);
            }
        }
    }
}
