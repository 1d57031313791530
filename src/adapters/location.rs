use crate::domain::model::Coordinates;
use crate::domain::ports::LocationProvider;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Position known up front (CLI flags, a UI that already asked the device).
/// `None` behaves like a denied permission prompt.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedLocation {
    coordinates: Option<Coordinates>,
}

impl FixedLocation {
    pub fn new(coordinates: Option<Coordinates>) -> Self {
        Self { coordinates }
    }

    /// Builds from optional lat/lng flags; both must be present.
    pub fn from_parts(latitude: Option<f64>, longitude: Option<f64>) -> Self {
        Self::new(latitude.zip(longitude).map(|(lat, lng)| Coordinates::new(lat, lng)))
    }

    pub fn denied() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn locate(&self) -> Result<Option<Coordinates>> {
        Ok(self.coordinates)
    }
}
