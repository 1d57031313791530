use crate::domain::model::{Coordinates, GenerationSettings, RawResponse};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Synchronous secret lookup. `None` means no usable credential.
pub trait CredentialSource: Send + Sync {
    fn resolve(&self) -> Option<String>;
}

/// One outbound generation call. Implementations must not retry.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn generate(&self, prompt: &str, settings: &GenerationSettings) -> Result<RawResponse>;

    /// Tag stamped on every venue this provider produced.
    fn provenance(&self) -> &str;
}

/// Time-boxing is the caller's job; `Ok(None)` means the user denied access.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn locate(&self) -> Result<Option<Coordinates>>;
}

#[async_trait]
impl<T: SearchProvider + ?Sized> SearchProvider for Box<T> {
    async fn generate(&self, prompt: &str, settings: &GenerationSettings) -> Result<RawResponse> {
        (**self).generate(prompt, settings).await
    }

    fn provenance(&self) -> &str {
        (**self).provenance()
    }
}
