//! User profiles: the registered address used for matching

use crate::matcher::{GeoPoint, DEFAULT_ORIGIN};
use crate::runtime::{PortError, ProfileDirectory};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Registered address of the user behind a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub address: String,
    /// `None` falls back to the matcher's default origin
    pub location: Option<GeoPoint>,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            address: "Kenyatta Avenue, Nairobi CBD".to_string(),
            location: Some(DEFAULT_ORIGIN),
        }
    }
}

/// Directory that answers every session with one configured profile
#[derive(Debug, Clone, Default)]
pub struct StaticProfileDirectory {
    profile: UserProfile,
}

impl StaticProfileDirectory {
    pub fn new(profile: UserProfile) -> Self {
        Self { profile }
    }
}

#[async_trait]
impl ProfileDirectory for StaticProfileDirectory {
    async fn profile(&self, _session_id: &str) -> Result<UserProfile, PortError> {
        Ok(self.profile.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_every_session_gets_the_configured_profile() {
        let profile = UserProfile {
            address: "Ngong Road, Kilimani".to_string(),
            location: Some(GeoPoint {
                lat: -1.2921,
                lng: 36.7856,
            }),
        };
        let directory = StaticProfileDirectory::new(profile.clone());

        assert_eq!(directory.profile("a").await.unwrap(), profile);
        assert_eq!(directory.profile("b").await.unwrap(), profile);
        assert_eq!(
            StaticProfileDirectory::default().profile("c").await.unwrap().location,
            Some(DEFAULT_ORIGIN)
        );
    }
}
