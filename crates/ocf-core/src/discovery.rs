use crate::error::Result;
use crate::interface::{
    DEFAULT_INTERFACE, LINK_LIST_INTERFACE, ResourceInterface, Retrieve, interface_ids,
    resource_type_ids,
};
use crate::operation::{ResourceOperations, Response};
use crate::payload::{Payload, PayloadMap};
use crate::request::Request;
use crate::resource::Resource;
use crate::resource_type::ResourceType;
use crate::transaction::Transaction;

/// Default `href` of the discovery resource.
pub const DISCOVERY_HREF: &str = "/oic/res";
/// Resource type of the discovery resource.
pub const DISCOVERY_RESOURCE_TYPE: &str = "oic.wk.res";

/// Policy bit of a discoverable resource.
pub const DISCOVERABLE: i64 = 0x1;
/// Policy bit of an observable resource.
pub const OBSERVABLE: i64 = 0x2;

/// Builds the discovery resource.
///
/// The default and the link list interfaces render the discovery payload,
/// the baseline interface renders the resource itself.
///
/// # Errors
///
/// Fails when the `href` is empty.
pub fn discovery_resource(href: impl Into<String>) -> Result<Resource> {
    Resource::builder(href)
        .resource_type(ResourceType::new(DISCOVERY_RESOURCE_TYPE, [])?)
        .interface(ResourceInterface::new(DEFAULT_INTERFACE).retrieve(Discovery))
        .interface(ResourceInterface::new(LINK_LIST_INTERFACE).retrieve(Discovery))
        .discoverable()
        .operations(ResourceOperations::read_only())
        .build()
}

/// Returns the policy bitmask of a [`Resource`].
#[must_use]
pub fn policy_bitmask(resource: &Resource) -> i64 {
    let mut bitmask = 0;
    if resource.is_discoverable() {
        bitmask |= DISCOVERABLE;
    }
    if resource.is_observeable() {
        bitmask |= OBSERVABLE;
    }
    bitmask
}

/// The discovery dispatch strategy.
///
/// It lists every resource registered on the device of the request, in
/// ascending order of their identifiers. Each link carries:
///
/// - `href`: the resource identifier
/// - `anchor`: `ocf://` followed by the device identifier
/// - `rel`: `self`, only for the discovery resource
/// - `p`: the policy, whose `bm` entry is the [`policy_bitmask`]
/// - `if` and `rt`: the interface and resource type identifiers
///
/// Attribute values are not part of a link.
#[derive(Debug, Clone, Copy, Default)]
pub struct Discovery;

impl Retrieve for Discovery {
    fn retrieve(&self, request: &Request, _transaction: &mut dyn Transaction) -> Result<Response> {
        let device = request.require_device()?;
        let anchor = format!("ocf://{}", device.device_id());

        let links = device
            .resource_iter()
            .map(|(href, resource)| {
                let mut link = PayloadMap::new();
                if href == device.discovery_href() {
                    link.add("rel", "self");
                }
                link.add("href", href);
                link.add("anchor", anchor.as_str());
                link.add("p", PayloadMap::new().insert("bm", policy_bitmask(&resource)));
                link.add("if", interface_ids(&resource));
                link.add("rt", resource_type_ids(&resource));
                link.sort_keys();
                Payload::Map(link)
            })
            .collect::<Vec<Payload>>();

        Ok(Response::new(Payload::Array(links)))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use crate::attribute::Attribute;
    use crate::device::Device;
    use crate::error::ErrorKind;
    use crate::identity::IdentityResource;
    use crate::interface::{BASELINE_INTERFACE, LINK_LIST_INTERFACE};
    use crate::operation::ResourceOperations;
    use crate::request::Request;
    use crate::resource::Resource;
    use crate::resource_type::ResourceType;
    use crate::serialize;
    use crate::validator::Validator;
    use crate::value::Value;

    use super::{DISCOVERY_HREF, discovery_resource, policy_bitmask};

    const DEVICE_ID: &str = "96a718fc-2d53-4b6f-9a3a-2a3d3c2e5f01";

    fn device() -> Arc<Device> {
        let identity = IdentityResource::builder(DEVICE_ID, "Lamp").build().unwrap();
        let device = Device::new(identity, discovery_resource(DISCOVERY_HREF).unwrap()).unwrap();

        device
            .add_resource(
                Resource::builder("/light")
                    .resource_type(
                        ResourceType::new(
                            "oic.r.switch.binary",
                            [Attribute::new("value", Value::constant(true), Validator::bool())
                                .unwrap()],
                        )
                        .unwrap(),
                    )
                    .discoverable()
                    .observable()
                    .operations(ResourceOperations::read_only())
                    .build()
                    .unwrap(),
            )
            .unwrap();

        Arc::new(device)
    }

    fn discover(device: &Arc<Device>, interface: &str) -> serde_json::Value {
        let discovery = device.get_resource(DISCOVERY_HREF).unwrap();
        let request = Request::builder(discovery.clone())
            .device(device.clone())
            .interface(interface)
            .build();
        serialize(discovery.operations().retrieve(&request).unwrap().payload())
    }

    #[test]
    fn test_discovery() {
        let device = device();
        let anchor = format!("ocf://{DEVICE_ID}");

        let expected = json!([
            {
                "anchor": anchor,
                "href": "/light",
                "if": ["oic.if.baseline"],
                "p": { "bm": 3 },
                "rt": ["oic.r.switch.binary"],
            },
            {
                "anchor": anchor,
                "href": "/oic/d",
                "if": ["oic.if.baseline"],
                "p": { "bm": 1 },
                "rt": ["oic.wk.d"],
            },
            {
                "anchor": anchor,
                "href": "/oic/res",
                "if": ["oic.if.baseline", "oic.if.ll"],
                "p": { "bm": 1 },
                "rel": "self",
                "rt": ["oic.wk.res"],
            },
        ]);

        assert_eq!(discover(&device, ""), expected);
        assert_eq!(discover(&device, LINK_LIST_INTERFACE), expected);
    }

    #[test]
    fn test_discovery_baseline() {
        let device = device();

        assert_eq!(
            discover(&device, BASELINE_INTERFACE),
            json!({
                "if": ["oic.if.baseline", "oic.if.ll"],
                "rt": ["oic.wk.res"],
            })
        );
    }

    #[test]
    fn test_discovery_without_device() {
        let discovery = Arc::new(discovery_resource(DISCOVERY_HREF).unwrap());

        assert_eq!(
            discovery
                .operations()
                .retrieve(&Request::new(discovery.clone()))
                .unwrap_err()
                .kind(),
            ErrorKind::InvalidParams
        );
    }

    #[test]
    fn test_policy_bitmask() {
        let device = device();

        assert_eq!(policy_bitmask(&device.get_resource("/light").unwrap()), 3);
        assert_eq!(policy_bitmask(&device.get_resource(DISCOVERY_HREF).unwrap()), 1);
    }
}
