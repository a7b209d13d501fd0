use serde::Serialize;

use crate::discovery::DISCOVERY_HREF;
use crate::identity::IDENTITY_HREF;

/// The configuration of a [`Device`](crate::device::Device).
///
/// Versions left unset fall back to the values advertised by default by
/// the identity resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "deserialize", derive(serde::Deserialize))]
pub struct DeviceConfig {
    /// Device identifier.
    pub id: String,
    /// Device name.
    pub name: String,
    /// Specification version.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub spec_version: Option<String>,
    /// Data model version.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub data_model_version: Option<String>,
    /// Protocol independent identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub protocol_independent_id: Option<String>,
    /// Identifier of the identity resource.
    #[serde(default = "default_identity_href")]
    pub identity_href: String,
    /// Identifier of the discovery resource.
    #[serde(default = "default_discovery_href")]
    pub discovery_href: String,
}

impl DeviceConfig {
    /// Creates a [`DeviceConfig`] with the default resource identifiers.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            spec_version: None,
            data_model_version: None,
            protocol_independent_id: None,
            identity_href: default_identity_href(),
            discovery_href: default_discovery_href(),
        }
    }

    /// Sets the specification version.
    #[must_use]
    pub fn spec_version(mut self, spec_version: impl Into<String>) -> Self {
        self.spec_version = Some(spec_version.into());
        self
    }

    /// Sets the data model version.
    #[must_use]
    pub fn data_model_version(mut self, data_model_version: impl Into<String>) -> Self {
        self.data_model_version = Some(data_model_version.into());
        self
    }

    /// Sets the protocol independent identifier.
    #[must_use]
    pub fn protocol_independent_id(mut self, protocol_independent_id: impl Into<String>) -> Self {
        self.protocol_independent_id = Some(protocol_independent_id.into());
        self
    }

    /// Sets the identifier of the identity resource.
    #[must_use]
    pub fn identity_href(mut self, identity_href: impl Into<String>) -> Self {
        self.identity_href = identity_href.into();
        self
    }

    /// Sets the identifier of the discovery resource.
    #[must_use]
    pub fn discovery_href(mut self, discovery_href: impl Into<String>) -> Self {
        self.discovery_href = discovery_href.into();
        self
    }

    /// Parses a [`DeviceConfig`] from a `json` string.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::Serialization`](crate::error::ErrorKind::Serialization)
    /// when the string is not a valid configuration.
    #[cfg(feature = "deserialize")]
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        serde_json::from_str(json).map_err(crate::error::Error::from)
    }
}

fn default_identity_href() -> String {
    IDENTITY_HREF.into()
}

fn default_discovery_href() -> String {
    DISCOVERY_HREF.into()
}
