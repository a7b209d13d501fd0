use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::RwLock;
use tracing::info;

use crate::config::DeviceConfig;
use crate::discovery::{DISCOVERY_RESOURCE_TYPE, discovery_resource};
use crate::error::{Error, ErrorKind, Result};
use crate::identity::IdentityResource;
use crate::iterator::MapIterator;
use crate::resource::Resource;

type Resources = HashMap<String, Arc<Resource>>;

/// A registry of [`Resource`]s keyed by their identifiers.
///
/// A device always contains its identity resource and its discovery
/// resource.
///
/// The registry is never modified in place: adding or deleting a resource
/// builds a new registry and replaces the current one while holding an
/// exclusive lock. Readers take a snapshot of the current registry, which
/// stays unchanged whatever happens afterwards.
#[derive(Debug)]
pub struct Device {
    device_id: String,
    identity_href: String,
    discovery_href: String,
    resources: RwLock<Arc<Resources>>,
}

impl Device {
    /// Creates a [`Device`] out of its identity and discovery resources.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::InvalidParams`] when the two resources
    /// share the same identifier, or when the discovery resource does not
    /// have the discovery resource type.
    pub fn new(identity: IdentityResource, discovery: Resource) -> Result<Self> {
        let (device_id, identity) = identity.into_parts();

        if identity.id() == discovery.id() {
            return Err(Error::new(
                ErrorKind::InvalidParams,
                format!(
                    "Identity and discovery resources share the identifier `{}`",
                    discovery.id()
                ),
            ));
        }

        if discovery.get_resource_type(DISCOVERY_RESOURCE_TYPE).is_err() {
            return Err(Error::new(
                ErrorKind::InvalidParams,
                format!(
                    "Resource `{}` is not a `{DISCOVERY_RESOURCE_TYPE}` resource",
                    discovery.id()
                ),
            ));
        }

        let identity_href = identity.id().to_string();
        let discovery_href = discovery.id().to_string();

        let mut resources = Resources::new();
        resources.insert(identity_href.clone(), Arc::new(identity));
        resources.insert(discovery_href.clone(), Arc::new(discovery));

        Ok(Self {
            device_id,
            identity_href,
            discovery_href,
            resources: RwLock::new(Arc::new(resources)),
        })
    }

    /// Creates a [`Device`] from a [`DeviceConfig`].
    ///
    /// # Errors
    ///
    /// Fails when the configuration does not describe a valid device.
    pub fn from_config(config: &DeviceConfig) -> Result<Self> {
        let mut identity = IdentityResource::builder(config.id.as_str(), config.name.as_str())
            .href(config.identity_href.as_str());
        if let Some(spec_version) = &config.spec_version {
            identity = identity.spec_version(spec_version.as_str());
        }
        if let Some(data_model_version) = &config.data_model_version {
            identity = identity.data_model_version(data_model_version.as_str());
        }
        if let Some(piid) = &config.protocol_independent_id {
            identity = identity.protocol_independent_id(piid.as_str());
        }

        Self::new(
            identity.build()?,
            discovery_resource(config.discovery_href.as_str())?,
        )
    }

    /// Returns the device identifier, as exposed by the identity resource.
    #[must_use]
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Returns the identifier of the identity resource.
    #[must_use]
    pub fn identity_href(&self) -> &str {
        &self.identity_href
    }

    /// Returns the identifier of the discovery resource.
    #[must_use]
    pub fn discovery_href(&self) -> &str {
        &self.discovery_href
    }

    /// Adds a [`Resource`].
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::Exist`] when a resource with the same
    /// identifier is already registered. The registry is left unchanged.
    pub fn add_resource(&self, resource: impl Into<Arc<Resource>>) -> Result<()> {
        let resource = resource.into();

        let mut current = self.resources.write();
        if current.contains_key(resource.id()) {
            return Err(Error::new(
                ErrorKind::Exist,
                format!(
                    "Resource `{}` already exists on device `{}`",
                    resource.id(),
                    self.device_id
                ),
            ));
        }

        let mut resources = Resources::clone(&current);
        info!(
            "Adding resource `{}` to device `{}`",
            resource.id(),
            self.device_id
        );
        resources.insert(resource.id().to_string(), resource);
        *current = Arc::new(resources);

        Ok(())
    }

    /// Deletes a [`Resource`], returning it.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::NotExist`] when no resource has the given identifier
    /// - [`ErrorKind::InvalidParams`] when the identifier is the one of the
    ///   identity or the discovery resource
    ///
    /// The registry is left unchanged on failure.
    pub fn delete_resource(&self, id: &str) -> Result<Arc<Resource>> {
        if id == self.identity_href || id == self.discovery_href {
            return Err(Error::new(
                ErrorKind::InvalidParams,
                format!("Resource `{id}` is mandatory and cannot be deleted"),
            ));
        }

        let mut current = self.resources.write();
        let mut resources = Resources::clone(&current);
        let removed = resources.remove(id).ok_or_else(|| self.not_exist(id))?;
        info!("Deleting resource `{id}` from device `{}`", self.device_id);
        *current = Arc::new(resources);

        Ok(removed)
    }

    /// Retrieves a [`Resource`].
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::NotExist`] when no resource has the given
    /// identifier.
    pub fn get_resource(&self, id: &str) -> Result<Arc<Resource>> {
        self.snapshot()
            .get(id)
            .cloned()
            .ok_or_else(|| self.not_exist(id))
    }

    /// Iterates over a snapshot of the registered resources, in ascending
    /// order of their identifiers.
    ///
    /// Resources added or deleted after the call are not observed.
    #[must_use]
    pub fn resource_iter(&self) -> MapIterator<String, Arc<Resource>> {
        MapIterator::new(
            self.snapshot()
                .iter()
                .map(|(id, resource)| (id.clone(), resource.clone())),
        )
    }

    /// Returns the number of registered resources, the identity and
    /// discovery resources included.
    #[must_use]
    pub fn resource_count(&self) -> usize {
        self.snapshot().len()
    }

    fn snapshot(&self) -> Arc<Resources> {
        self.resources.read().clone()
    }

    fn not_exist(&self, id: &str) -> Error {
        Error::new(
            ErrorKind::NotExist,
            format!(
                "Resource `{id}` does not exist on device `{}`",
                self.device_id
            ),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use crate::attribute::Attribute;
    use crate::config::DeviceConfig;
    use crate::discovery::{DISCOVERY_HREF, discovery_resource};
    use crate::error::{Error, ErrorKind};
    use crate::identity::{IDENTITY_HREF, IdentityResource};
    use crate::interface::{CREATE_INTERFACE, ResourceInterface};
    use crate::operation::ResourceOperations;
    use crate::payload::PayloadMap;
    use crate::request::Request;
    use crate::resource::Resource;
    use crate::resource_type::ResourceType;
    use crate::serialize;
    use crate::validator::Validator;
    use crate::value::Value;

    use super::Device;

    const DEVICE_ID: &str = "96a718fc-2d53-4b6f-9a3a-2a3d3c2e5f01";

    fn device() -> Device {
        let identity = IdentityResource::builder(DEVICE_ID, "Lamp").build().unwrap();
        Device::new(identity, discovery_resource(DISCOVERY_HREF).unwrap()).unwrap()
    }

    fn light(id: &str) -> Resource {
        Resource::builder(id)
            .resource_type(
                ResourceType::new(
                    "oic.r.switch.binary",
                    [Attribute::new("value", Value::constant(true), Validator::bool()).unwrap()],
                )
                .unwrap(),
            )
            .discoverable()
            .operations(ResourceOperations::read_only())
            .build()
            .unwrap()
    }

    fn ids(device: &Device) -> Vec<String> {
        device.resource_iter().map(|(id, _)| id).collect()
    }

    #[test]
    fn test_mandatory_resources() {
        let device = device();

        assert_eq!(device.device_id(), DEVICE_ID);
        assert_eq!(device.identity_href(), IDENTITY_HREF);
        assert_eq!(device.discovery_href(), DISCOVERY_HREF);
        assert_eq!(ids(&device), [IDENTITY_HREF, DISCOVERY_HREF]);
        assert_eq!(device.resource_count(), 2);
    }

    #[test]
    fn test_invalid_device() {
        let identity = IdentityResource::builder(DEVICE_ID, "Lamp").build().unwrap();
        assert_eq!(
            Device::new(identity, discovery_resource(IDENTITY_HREF).unwrap())
                .unwrap_err()
                .kind(),
            ErrorKind::InvalidParams
        );

        // A resource without the discovery resource type.
        let identity = IdentityResource::builder(DEVICE_ID, "Lamp").build().unwrap();
        assert_eq!(
            Device::new(identity, light(DISCOVERY_HREF)).unwrap_err().kind(),
            ErrorKind::InvalidParams
        );
    }

    #[test]
    fn test_add_delete() {
        let device = device();

        device.add_resource(light("/light")).unwrap();
        assert_eq!(device.resource_count(), 3);

        assert_eq!(
            device.add_resource(light("/light")).unwrap_err().kind(),
            ErrorKind::Exist
        );
        assert_eq!(device.resource_count(), 3);

        assert_eq!(device.delete_resource("/light").unwrap().id(), "/light");
        assert_eq!(
            device.delete_resource("/light").unwrap_err().kind(),
            ErrorKind::NotExist
        );
        assert_eq!(
            device.get_resource("/light").unwrap_err().kind(),
            ErrorKind::NotExist
        );
        assert_eq!(ids(&device), [IDENTITY_HREF, DISCOVERY_HREF]);
    }

    #[test]
    fn test_mandatory_resources_not_deletable() {
        let device = device();

        for id in [IDENTITY_HREF, DISCOVERY_HREF] {
            assert_eq!(
                device.delete_resource(id).unwrap_err().kind(),
                ErrorKind::InvalidParams
            );
        }
        assert_eq!(device.resource_count(), 2);
    }

    #[test]
    fn test_from_config() {
        let config = DeviceConfig::new(DEVICE_ID, "Lamp")
            .identity_href("/device")
            .spec_version("ocf.2.2.0");

        let device = Device::from_config(&config).unwrap();
        assert_eq!(device.identity_href(), "/device");
        assert_eq!(ids(&device), ["/device", DISCOVERY_HREF]);

        let identity = device.get_resource("/device").unwrap();
        let payload = identity
            .operations()
            .retrieve(&Request::new(identity.clone()))
            .unwrap();
        assert_eq!(
            serialize(payload.payload()),
            json!({
                "di": DEVICE_ID,
                "dmv": "ocf.res.1.3.0",
                "icv": "ocf.2.2.0",
                "if": ["oic.if.baseline"],
                "n": "Lamp",
                "rt": ["oic.wk.d"],
            })
        );
    }

    #[test]
    fn test_registry_interface() {
        let device = Arc::new(device());

        let collection = Arc::new(
            Resource::builder("/lights")
                .resource_type(ResourceType::new("oic.wk.col", []).unwrap())
                .interface(ResourceInterface::registry(CREATE_INTERFACE))
                .operations(
                    ResourceOperations::builder()
                        .retrieve()
                        .create(|request: &Request| {
                            let href = request
                                .payload()
                                .as_map()
                                .and_then(|map| map.get("href"))
                                .and_then(|href| href.as_str())
                                .unwrap_or("/lights/0");
                            Ok(Arc::new(light(href)))
                        })
                        .delete(|request: &Request| {
                            request.device().map_or_else(
                                || Err(Error::new(ErrorKind::InvalidParams, "No device")),
                                |device| device.get_resource("/lights/1"),
                            )
                        })
                        .build()
                        .unwrap(),
                )
                .build()
                .unwrap(),
        );
        device.add_resource(collection.clone()).unwrap();

        let create = Request::builder(collection.clone())
            .device(device.clone())
            .interface(CREATE_INTERFACE)
            .payload(PayloadMap::new().insert("href", "/lights/1"))
            .build();

        let response = collection.operations().create(&create).unwrap();
        assert_eq!(
            serialize(response.payload()),
            json!({
                "href": "/lights/1",
                "if": ["oic.if.baseline"],
                "rt": ["oic.r.switch.binary"],
            })
        );
        assert!(device.get_resource("/lights/1").is_ok());

        // Creating the same resource twice is refused by the device.
        assert_eq!(
            collection.operations().create(&create).unwrap_err().kind(),
            ErrorKind::Exist
        );

        collection.operations().delete(&create).unwrap();
        assert_eq!(
            device.get_resource("/lights/1").unwrap_err().kind(),
            ErrorKind::NotExist
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_snapshot_isolation() {
        let device = Arc::new(device());
        device.add_resource(light("/light")).unwrap();

        let before = device.resource_iter();

        let writers: Vec<_> = (0..4)
            .map(|writer| {
                let device = device.clone();
                tokio::spawn(async move {
                    for index in 0..8 {
                        device
                            .add_resource(light(&format!("/light/{writer}/{index}")))
                            .unwrap();
                    }
                })
            })
            .collect();

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let device = device.clone();
                tokio::spawn(async move {
                    for _ in 0..8 {
                        // Each snapshot is consistent on its own.
                        let iterator = device.resource_iter();
                        let len = iterator.len();
                        assert_eq!(iterator.count(), len);
                    }
                })
            })
            .collect();

        for handle in writers.into_iter().chain(readers) {
            handle.await.unwrap();
        }

        let ids: Vec<String> = before.map(|(id, _)| id).collect();
        assert_eq!(ids, ["/light", IDENTITY_HREF, DISCOVERY_HREF]);
        assert_eq!(device.resource_count(), 3 + 4 * 8);
    }
}
