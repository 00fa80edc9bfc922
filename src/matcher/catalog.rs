//! Read-only provider catalog
//!
//! Loaded once at startup and shared behind an `Arc`; never mutated.

use super::geo::{GeoError, GeoPoint};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read provider catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid provider catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Provider {id}: {source}")]
    Location { id: String, source: GeoError },
    #[error("Provider {id}: rating must be between 0 and 5, got {rating}")]
    Rating { id: String, rating: f64 },
}

/// A bookable service provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub id: String,
    pub name: String,
    pub services: BTreeSet<String>,
    pub lat: f64,
    pub lng: f64,
    pub ward: String,
    pub rating: f64,
    /// Local datetimes, `YYYY-MM-DDTHH:MM`, in offering order
    pub availability: Vec<String>,
    pub hourly_rate: u32,
}

impl Provider {
    pub fn location(&self) -> GeoPoint {
        GeoPoint {
            lat: self.lat,
            lng: self.lng,
        }
    }

    pub fn offers(&self, service_type: &str) -> bool {
        self.services.contains(service_type)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        GeoPoint::new(self.lat, self.lng).map_err(|source| CatalogError::Location {
            id: self.id.clone(),
            source,
        })?;
        if !(0.0..=5.0).contains(&self.rating) {
            return Err(CatalogError::Rating {
                id: self.id.clone(),
                rating: self.rating,
            });
        }
        Ok(())
    }
}

/// Immutable, cheaply clonable provider list
#[derive(Debug, Clone, Default)]
pub struct ProviderCatalog {
    providers: Arc<[Provider]>,
}

impl ProviderCatalog {
    pub fn new(providers: Vec<Provider>) -> Result<Self, CatalogError> {
        for provider in &providers {
            provider.validate()?;
        }
        Ok(Self {
            providers: providers.into(),
        })
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        Self::new(serde_json::from_str(json)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn providers(&self) -> &[Provider] {
        &self.providers
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
