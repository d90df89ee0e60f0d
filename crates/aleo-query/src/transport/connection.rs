use reqwest::Url;

use crate::error::ConfigError;

/// Join the API root and the network segment into the prefix every request
/// path is appended to.
pub(super) fn resolve_root(base_url: &str, network: &str) -> Result<String, ConfigError> {
    let parsed = Url::parse(base_url).map_err(|e| ConfigError::InvalidEndpoint {
        url: base_url.to_owned(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => {}
        other => return Err(ConfigError::UnsupportedScheme(other.to_owned())),
    }

    let root = base_url.trim_end_matches('/');
    let network = network.trim_matches('/');
    if network.is_empty() {
        Ok(root.to_owned())
    } else {
        Ok(format!("{root}/{network}"))
    }
}

pub(super) fn resolve_auth(
    auth: Option<&(String, String)>,
) -> Result<Option<(String, String)>, ConfigError> {
    match auth {
        None => Ok(None),
        Some((user, pass)) if user.is_empty() || pass.is_empty() => {
            Err(ConfigError::EmptyCredentials)
        }
        Some((user, pass)) => Ok(Some((user.clone(), pass.clone()))),
    }
}
