//! Process-wide gateway configuration.
//!
//! Built once at startup from whatever source the binary chooses (flags,
//! environment) and passed by reference to the components that need it.
//! Nothing in the workspace reads the environment per request.

use crate::errors::ConfigError;

/// Origin allowed to call the gateway from a browser when none is configured.
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:3000";

/// The server-held catalog API key.
///
/// Deliberately has no `Display` or `Serialize`; `Debug` is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Creates a key, returning `None` if the value is empty or blank.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let v = value.into();
        if v.trim().is_empty() {
            None
        } else {
            Some(Self(v))
        }
    }

    /// Returns the raw key for attaching to an upstream request.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

/// Validated gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    api_key: ApiKey,
    allowed_origin: String,
}

impl GatewayConfig {
    /// Validates raw configuration values.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::MissingApiKey`] if `api_key` is absent or blank.
    /// - [`ConfigError::InvalidOrigin`] if `allowed_origin` is not an
    ///   `http`/`https` origin made of visible ASCII.
    pub fn new(
        api_key: Option<String>,
        allowed_origin: Option<String>,
    ) -> Result<Self, ConfigError> {
        let api_key = api_key.and_then(ApiKey::new).ok_or(ConfigError::MissingApiKey)?;
        let allowed_origin = match allowed_origin {
            Some(origin) => validate_origin(origin)?,
            None => DEFAULT_ALLOWED_ORIGIN.to_owned(),
        };
        Ok(Self {
            api_key,
            allowed_origin,
        })
    }

    /// The catalog API key.
    pub fn api_key(&self) -> &ApiKey {
        &self.api_key
    }

    /// The single browser origin allowed to call the gateway.
    pub fn allowed_origin(&self) -> &str {
        &self.allowed_origin
    }
}

fn validate_origin(origin: String) -> Result<String, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidOrigin {
        origin: origin.clone(),
        reason: reason.to_owned(),
    };

    if !origin.bytes().all(|b| b.is_ascii_graphic()) {
        return Err(invalid("must be visible ASCII without whitespace"));
    }
    let host = origin
        .strip_prefix("https://")
        .or_else(|| origin.strip_prefix("http://"))
        .ok_or_else(|| invalid("scheme must be http or https"))?;
    if host.is_empty() || host.contains('/') {
        return Err(invalid("must be scheme and host only, without a path"));
    }
    Ok(origin)
}
