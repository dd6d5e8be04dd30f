//! Shared HTTP client construction for the REST adapters.

use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::error::Result;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Build a client whose requests time out after `timeout`.
///
/// # Errors
/// Returns an error if the TLS backend cannot be initialised.
pub fn client(timeout: Duration) -> Result<Client> {
    Ok(Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()?)
}

/// Join `path` onto `base`, keeping any path prefix `base` already has.
///
/// # Errors
/// Returns an error if `base` is not an absolute URL.
pub fn endpoint(base: &str, path: &str) -> Result<Url> {
    let base = if base.ends_with('/') {
        Url::parse(base)?
    } else {
        Url::parse(&format!("{base}/"))?
    };
    Ok(base.join(path.trim_start_matches('/'))?)
}
