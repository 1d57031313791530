use crate::domain::model::{CandidateRecord, Coordinates};
use serde::{Deserialize, Serialize};

pub const EARTH_RADIUS_KM: f64 = 6371.0;
pub const DEFAULT_RADIUS_KM: f64 = 10.0;

/// What to do with a candidate whose position cannot be read while a fence is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingPositionPolicy {
    #[default]
    Drop,
    Keep,
}

/// Great-circle distance in kilometres.
pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lng = (b.longitude - a.longitude).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.latitude.to_radians().cos() * b.latitude.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geofence {
    pub radius_km: f64,
    pub missing_position: MissingPositionPolicy,
}

impl Default for Geofence {
    fn default() -> Self {
        Self {
            radius_km: DEFAULT_RADIUS_KM,
            missing_position: MissingPositionPolicy::Drop,
        }
    }
}

impl Geofence {
    pub fn new(radius_km: f64, missing_position: MissingPositionPolicy) -> Self {
        Self {
            radius_km,
            missing_position,
        }
    }

    /// Keeps candidates within `radius_km` of `center`. Identity when `center` is `None`.
    pub fn apply(
        &self,
        candidates: Vec<CandidateRecord>,
        center: Option<Coordinates>,
    ) -> Vec<CandidateRecord> {
        let Some(center) = center else {
            return candidates;
        };

        let before = candidates.len();
        let kept: Vec<CandidateRecord> = candidates
            .into_iter()
            .filter(|candidate| self.admits(candidate, center))
            .collect();

        if kept.len() < before {
            tracing::debug!(
                "Geofence ({} km around {}) dropped {} of {} candidates",
                self.radius_km,
                center,
                before - kept.len(),
                before
            );
        }
        kept
    }

    fn admits(&self, candidate: &CandidateRecord, center: Coordinates) -> bool {
        match candidate.position() {
            Some(position) => haversine_km(center, position) <= self.radius_km,
            None => self.missing_position == MissingPositionPolicy::Keep,
        }
    }
}
