//! Endpoint newtype
//!
//! The content GraphQL endpoint, with a default pointing at the hosted content graph.

use std::ops::Deref;

use serde::Deserialize;
use url::Url;

/// A content GraphQL endpoint
#[derive(Debug)]
pub struct Endpoint(Url);

impl Endpoint {
    /// Unwrap the endpoint into its inner URL
    pub fn into_inner(self) -> Url {
        self.0
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self(defaults::endpoint())
    }
}

impl<'de> Deserialize<'de> for Endpoint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let url = Url::deserialize(deserializer)?;
        if url.cannot_be_a_base() {
            return Err(serde::de::Error::custom(format!(
                "endpoint must be an absolute http(s) URL, got {url}"
            )));
        }
        Ok(Self(url))
    }
}

impl Deref for Endpoint {
    type Target = Url;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

mod defaults {
    use url::Url;

    pub(super) fn endpoint() -> Url {
        // Covered by [test::default_endpoint_parses_correctly]
        #[allow(clippy::unwrap_used)]
        Url::parse("https://cg.optimizely.com/content/v2").unwrap()
    }

}
