use crate::domain::ports::CredentialSource;
use std::env;

/// Reads the first non-empty variable out of an ordered list.
#[derive(Debug, Clone)]
pub struct EnvCredentialSource {
    vars: Vec<String>,
}

impl EnvCredentialSource {
    pub fn new<I, S>(vars: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            vars: vars.into_iter().map(Into::into).collect(),
        }
    }

    pub fn gemini() -> Self {
        Self::new(["GEMINI_API_KEY", "API_KEY"])
    }

    pub fn openai() -> Self {
        Self::new(["OPENAI_API_KEY"])
    }

    pub fn vars(&self) -> &[String] {
        &self.vars
    }
}

impl CredentialSource for EnvCredentialSource {
    fn resolve(&self) -> Option<String> {
        self.vars.iter().find_map(|name| {
            env::var(name)
                .ok()
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        })
    }
}

/// A key handed over directly, e.g. from a config file.
#[derive(Clone, Default)]
pub struct StaticCredential(Option<String>);

impl StaticCredential {
    pub fn new(key: impl Into<String>) -> Self {
        Self(Some(key.into()))
    }

    pub fn none() -> Self {
        Self(None)
    }
}

impl std::fmt::Debug for StaticCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let shown = if self.0.is_some() { "Some(***)" } else { "None" };
        f.debug_tuple("StaticCredential").field(&shown).finish()
    }
}

impl CredentialSource for StaticCredential {
    fn resolve(&self) -> Option<String> {
        self.0
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string)
    }
}

impl<T: CredentialSource + ?Sized> CredentialSource for Box<T> {
    fn resolve(&self) -> Option<String> {
        (**self).resolve()
    }
}
