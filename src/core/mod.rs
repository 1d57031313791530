pub mod discovery;
pub mod extractor;
pub mod geofence;
pub mod normalizer;
pub mod prompt;

pub use crate::domain::model::{CandidateRecord, Coordinates, GenerationSettings, RawResponse, Venue};
pub use crate::domain::ports::{CredentialSource, LocationProvider, SearchProvider};
pub use crate::utils::error::Result;
