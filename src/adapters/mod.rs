// Adapters layer: concrete implementations of the domain ports (providers, credentials, location).

pub mod credentials;
pub mod gemini;
pub mod location;
pub mod openai;

pub use credentials::{EnvCredentialSource, StaticCredential};
pub use gemini::{GeminiConfig, GeminiProvider};
pub use location::FixedLocation;
pub use openai::{OpenAiCompatibleProvider, OpenAiConfig};
