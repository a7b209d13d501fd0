use crate::attribute::Attribute;
use crate::error::{Error, ErrorKind, Result};
use crate::operation::ResourceOperations;
use crate::resource::Resource;
use crate::resource_type::ResourceType;
use crate::validator::Validator;
use crate::value::Value;

/// Default `href` of the identity resource.
pub const IDENTITY_HREF: &str = "/oic/d";
/// Resource type of the identity resource.
pub const IDENTITY_RESOURCE_TYPE: &str = "oic.wk.d";
/// Specification version advertised when none is configured.
pub const DEFAULT_SPEC_VERSION: &str = "ocf.2.0.5";
/// Data model version advertised when none is configured.
pub const DEFAULT_DATA_MODEL_VERSION: &str = "ocf.res.1.3.0";

/// The identity resource of a device.
///
/// It carries the device identifier and its descriptive metadata as
/// read-only attributes:
///
/// - `di`: device identifier
/// - `n`: device name
/// - `icv`: specification version
/// - `dmv`: data model version
/// - `piid`: protocol independent identifier, when configured
#[derive(Debug)]
pub struct IdentityResource {
    device_id: String,
    resource: Resource,
}

impl IdentityResource {
    /// Creates an [`IdentityResourceBuilder`].
    #[must_use]
    #[inline]
    pub fn builder(device_id: impl Into<String>, name: impl Into<String>) -> IdentityResourceBuilder {
        IdentityResourceBuilder {
            href: IDENTITY_HREF.into(),
            device_id: device_id.into(),
            name: name.into(),
            spec_version: DEFAULT_SPEC_VERSION.into(),
            data_model_version: DEFAULT_DATA_MODEL_VERSION.into(),
            protocol_independent_id: None,
        }
    }

    /// Returns the device identifier.
    #[must_use]
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Returns the underlying [`Resource`].
    #[must_use]
    pub const fn resource(&self) -> &Resource {
        &self.resource
    }

    pub(crate) fn into_parts(self) -> (String, Resource) {
        (self.device_id, self.resource)
    }
}

/// An [`IdentityResource`] builder.
#[derive(Debug)]
pub struct IdentityResourceBuilder {
    href: String,
    device_id: String,
    name: String,
    spec_version: String,
    data_model_version: String,
    protocol_independent_id: Option<String>,
}

impl IdentityResourceBuilder {
    /// Sets the `href`.
    #[must_use]
    pub fn href(mut self, href: impl Into<String>) -> Self {
        self.href = href.into();
        self
    }

    /// Sets the specification version.
    #[must_use]
    pub fn spec_version(mut self, spec_version: impl Into<String>) -> Self {
        self.spec_version = spec_version.into();
        self
    }

    /// Sets the data model version.
    #[must_use]
    pub fn data_model_version(mut self, data_model_version: impl Into<String>) -> Self {
        self.data_model_version = data_model_version.into();
        self
    }

    /// Sets the protocol independent identifier.
    #[must_use]
    pub fn protocol_independent_id(mut self, protocol_independent_id: impl Into<String>) -> Self {
        self.protocol_independent_id = Some(protocol_independent_id.into());
        self
    }

    /// Builds the [`IdentityResource`].
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::InvalidParams`] when the device identifier
    /// or the `href` is empty.
    pub fn build(self) -> Result<IdentityResource> {
        if self.device_id.is_empty() {
            return Err(Error::new(
                ErrorKind::InvalidParams,
                "A device requires a non-empty identifier",
            ));
        }

        let mut attributes = vec![
            read_only("di", &self.device_id)?,
            read_only("n", self.name)?,
            read_only("icv", self.spec_version)?,
            read_only("dmv", self.data_model_version)?,
        ];
        if let Some(piid) = self.protocol_independent_id {
            attributes.push(read_only("piid", piid)?);
        }

        let resource = Resource::builder(self.href)
            .resource_type(ResourceType::new(IDENTITY_RESOURCE_TYPE, attributes)?)
            .discoverable()
            .operations(ResourceOperations::read_only())
            .build()?;

        Ok(IdentityResource {
            device_id: self.device_id,
            resource,
        })
    }
}

fn read_only(id: &str, value: impl Into<String>) -> Result<Attribute> {
    Attribute::new(id, Value::constant(value.into()), Validator::string())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use crate::error::ErrorKind;
    use crate::request::Request;
    use crate::serialize;

    use super::{IDENTITY_HREF, IdentityResource};

    #[test]
    fn test_identity_payload() {
        let identity = IdentityResource::builder("96a718fc-2d53-4b6f-9a3a-2a3d3c2e5f01", "Lamp")
            .protocol_independent_id("2b2c1e0a-5d4f-4c8e-9b7a-0f1e2d3c4b5a")
            .build()
            .unwrap();

        assert_eq!(identity.device_id(), "96a718fc-2d53-4b6f-9a3a-2a3d3c2e5f01");
        assert_eq!(identity.resource().id(), IDENTITY_HREF);
        assert!(identity.resource().is_discoverable());

        let (_, resource) = identity.into_parts();
        let resource = Arc::new(resource);
        let response = resource
            .operations()
            .retrieve(&Request::new(resource.clone()))
            .unwrap();

        assert_eq!(
            serialize(response.payload()),
            json!({
                "di": "96a718fc-2d53-4b6f-9a3a-2a3d3c2e5f01",
                "dmv": "ocf.res.1.3.0",
                "icv": "ocf.2.0.5",
                "if": ["oic.if.baseline"],
                "n": "Lamp",
                "piid": "2b2c1e0a-5d4f-4c8e-9b7a-0f1e2d3c4b5a",
                "rt": ["oic.wk.d"],
            })
        );
    }

    #[test]
    fn test_invalid_identity() {
        assert_eq!(
            IdentityResource::builder("", "Lamp")
                .build()
                .unwrap_err()
                .kind(),
            ErrorKind::InvalidParams
        );
        assert_eq!(
            IdentityResource::builder("96a718fc", "Lamp")
                .href("")
                .build()
                .unwrap_err()
                .kind(),
            ErrorKind::InvalidParams
        );
    }
}
