//! Declarative settings document for [`crate::CasConfiguration`].

use std::path::Path;

use cas_client_core::{
    DEFAULT_ENCODING, DEFAULT_TIME_TOLERANCE_MS, Protocol, ProxyList, SERVICE_PARAMETER,
};
use serde::{Deserialize, Serialize};

use crate::ConfigurationError;

/// Plain, serializable subset of a CAS configuration.
///
/// Collaborators (resolver, logout handler, receptor, backend) are wired in
/// code; everything else can come from a JSON document whose keys follow the
/// camelCase field names (`loginUrl`, `timeTolerance`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct CasSettings {
    /// Expected validation response encoding.
    pub encoding: String,
    /// CAS login URL.
    pub login_url: Option<String>,
    /// CAS prefix URL.
    pub prefix_url: Option<String>,
    /// CAS REST tickets URL.
    pub rest_url: Option<String>,
    /// SAML clock-skew tolerance in milliseconds.
    pub time_tolerance: u64,
    /// Protocol tag.
    pub protocol: Protocol,
    /// Force re-authentication on login redirects.
    pub renew: bool,
    /// Request silent login on login redirects.
    pub gateway: bool,
    /// Accept proxy tickets from any proxy chain.
    pub accept_any_proxy: bool,
    /// Allowed proxy chains for proxy protocols.
    pub allowed_proxy_chains: ProxyList,
    /// Query parameter carrying the post-logout URL.
    pub post_logout_url_parameter: String,
}

impl Default for CasSettings {
    fn default() -> Self {
        Self {
            encoding: DEFAULT_ENCODING.to_string(),
            login_url: None,
            prefix_url: None,
            rest_url: None,
            time_tolerance: DEFAULT_TIME_TOLERANCE_MS,
            protocol: Protocol::default(),
            renew: false,
            gateway: false,
            accept_any_proxy: false,
            allowed_proxy_chains: ProxyList::default(),
            post_logout_url_parameter: SERVICE_PARAMETER.to_string(),
        }
    }
}

impl CasSettings {
    /// Decodes settings from a JSON document.
    ///
    /// # Errors
    /// Returns [`ConfigurationError::Settings`] for malformed JSON, unknown
    /// keys or an unknown protocol tag.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigurationError> {
        serde_json::from_str(raw).map_err(ConfigurationError::Settings)
    }

    /// Reads and decodes a JSON settings file.
    ///
    /// # Errors
    /// Returns [`ConfigurationError::Io`] when the file cannot be read and
    /// [`ConfigurationError::Settings`] when it cannot be decoded.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigurationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Encodes settings as pretty-printed JSON.
    ///
    /// # Errors
    /// Returns [`ConfigurationError::Settings`] when encoding fails.
    pub fn to_json_string(&self) -> Result<String, ConfigurationError> {
        serde_json::to_string_pretty(self).map_err(ConfigurationError::Settings)
    }
}
