use std::sync::Arc;

use crate::error::Result;
use crate::operation::{Failure, Failures, Response};
use crate::payload::{Payload, PayloadMap};
use crate::request::Request;
use crate::resource::Resource;
use crate::transaction::Transaction;

/// Identifier of the default interface.
pub const DEFAULT_INTERFACE: &str = "";
/// Identifier of the baseline interface.
pub const BASELINE_INTERFACE: &str = "oic.if.baseline";
/// Identifier of the link list interface.
pub const LINK_LIST_INTERFACE: &str = "oic.if.ll";
/// Identifier of the create interface.
pub const CREATE_INTERFACE: &str = "oic.if.create";

/// Retrieve capability of a [`ResourceInterface`].
pub trait Retrieve: Send + Sync {
    /// Renders the requested resource.
    ///
    /// # Errors
    ///
    /// Fails when the response cannot be produced at all. Failures
    /// concerning single attributes belong to the [`Response`].
    fn retrieve(&self, request: &Request, transaction: &mut dyn Transaction) -> Result<Response>;
}

/// Update capability of a [`ResourceInterface`].
///
/// Attributes have already been written, and the transaction committed,
/// when the interface is invoked: it only shapes the response.
pub trait Update: Send + Sync {
    /// Shapes the response of an update, given the failures it produced.
    ///
    /// # Errors
    ///
    /// Fails when the response cannot be produced.
    fn update(&self, request: &Request, failures: Failures) -> Result<Response>;
}

/// Create capability of a [`ResourceInterface`].
pub trait Create: Send + Sync {
    /// Integrates and describes a newly created resource.
    ///
    /// # Errors
    ///
    /// Fails when the resource cannot be integrated.
    fn create(&self, request: &Request, resource: Arc<Resource>) -> Result<Response>;
}

/// Delete capability of a [`ResourceInterface`].
pub trait Delete: Send + Sync {
    /// Removes a resource and confirms its deletion.
    ///
    /// # Errors
    ///
    /// Fails when the resource cannot be removed.
    fn delete(&self, request: &Request, resource: Arc<Resource>) -> Result<Response>;
}

/// A named strategy translating requests into attribute operations and
/// shaping their responses.
///
/// An interface implements any subset of the [`Retrieve`], [`Update`],
/// [`Create`], and [`Delete`] capabilities. A missing capability is
/// reported by the corresponding `as_*` method.
#[derive(Clone)]
pub struct ResourceInterface {
    id: String,
    retrieve: Option<Arc<dyn Retrieve>>,
    update: Option<Arc<dyn Update>>,
    create: Option<Arc<dyn Create>>,
    delete: Option<Arc<dyn Delete>>,
}

impl std::fmt::Debug for ResourceInterface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceInterface")
            .field("id", &self.id)
            .field("retrieve", &self.retrieve.is_some())
            .field("update", &self.update.is_some())
            .field("create", &self.create.is_some())
            .field("delete", &self.delete.is_some())
            .finish()
    }
}

impl ResourceInterface {
    /// Creates a [`ResourceInterface`] without capabilities.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            retrieve: None,
            update: None,
            create: None,
            delete: None,
        }
    }

    /// Creates a baseline [`ResourceInterface`].
    ///
    /// It retrieves all the attributes of a resource together with its
    /// `if` and `rt` metadata, and confirms updates with an empty payload.
    #[must_use]
    pub fn baseline(id: impl Into<String>) -> Self {
        Self::new(id).retrieve(Baseline).update(Baseline)
    }

    /// Creates a registry [`ResourceInterface`].
    ///
    /// It adds created resources to the device of the request, removes
    /// deleted ones from it, and describes them with their `href`, `if`,
    /// and `rt` metadata.
    #[must_use]
    pub fn registry(id: impl Into<String>) -> Self {
        Self::new(id).create(Registry).delete(Registry)
    }

    /// Sets the [`Retrieve`] capability.
    #[must_use]
    pub fn retrieve(mut self, retrieve: impl Retrieve + 'static) -> Self {
        self.retrieve = Some(Arc::new(retrieve));
        self
    }

    /// Sets the [`Update`] capability.
    #[must_use]
    pub fn update(mut self, update: impl Update + 'static) -> Self {
        self.update = Some(Arc::new(update));
        self
    }

    /// Sets the [`Create`] capability.
    #[must_use]
    pub fn create(mut self, create: impl Create + 'static) -> Self {
        self.create = Some(Arc::new(create));
        self
    }

    /// Sets the [`Delete`] capability.
    #[must_use]
    pub fn delete(mut self, delete: impl Delete + 'static) -> Self {
        self.delete = Some(Arc::new(delete));
        self
    }

    /// Returns the identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Checks whether this is the default interface.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.id == DEFAULT_INTERFACE
    }

    /// Returns the [`Retrieve`] capability, if any.
    #[must_use]
    pub fn as_retrieve(&self) -> Option<&dyn Retrieve> {
        self.retrieve.as_deref()
    }

    /// Returns the [`Update`] capability, if any.
    #[must_use]
    pub fn as_update(&self) -> Option<&dyn Update> {
        self.update.as_deref()
    }

    /// Returns the [`Create`] capability, if any.
    #[must_use]
    pub fn as_create(&self) -> Option<&dyn Create> {
        self.create.as_deref()
    }

    /// Returns the [`Delete`] capability, if any.
    #[must_use]
    pub fn as_delete(&self) -> Option<&dyn Delete> {
        self.delete.as_deref()
    }
}

/// The baseline dispatch strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct Baseline;

impl Retrieve for Baseline {
    fn retrieve(&self, request: &Request, transaction: &mut dyn Transaction) -> Result<Response> {
        let resource = request.resource();

        let mut payload = PayloadMap::new();
        payload.add("if", interface_ids(resource));
        payload.add("rt", resource_type_ids(resource));

        let mut failures = Failures::new();
        for (_, resource_type) in resource.resource_type_iter() {
            for (id, attribute) in resource_type.attribute_iter() {
                match attribute.get_value(transaction) {
                    Ok(value) => payload.add(id, value),
                    Err(e) => failures.push(Failure::attribute(id, e)),
                }
            }
        }

        payload.sort_keys();
        Ok(Response::with_failures(Payload::Map(payload), failures))
    }
}

impl Update for Baseline {
    fn update(&self, _request: &Request, failures: Failures) -> Result<Response> {
        Ok(Response::with_failures(
            Payload::Map(PayloadMap::new()),
            failures,
        ))
    }
}

struct Registry;

impl Create for Registry {
    fn create(&self, request: &Request, resource: Arc<Resource>) -> Result<Response> {
        let payload = describe(&resource);
        request.require_device()?.add_resource(resource)?;
        Ok(Response::new(payload))
    }
}

impl Delete for Registry {
    fn delete(&self, request: &Request, resource: Arc<Resource>) -> Result<Response> {
        request.require_device()?.delete_resource(resource.id())?;
        Ok(Response::new(describe(&resource)))
    }
}

// Identifiers of the non-default interfaces of a resource, sorted.
pub(crate) fn interface_ids(resource: &Resource) -> Vec<String> {
    resource
        .interface_iter()
        .filter(|(_, interface)| !interface.is_default())
        .map(|(id, _)| id.to_string())
        .collect()
}

// Identifiers of the resource types of a resource, sorted.
pub(crate) fn resource_type_ids(resource: &Resource) -> Vec<String> {
    resource
        .resource_type_iter()
        .map(|(id, _)| id.to_string())
        .collect()
}

fn describe(resource: &Resource) -> Payload {
    let mut payload = PayloadMap::new();
    payload.add("href", resource.id());
    payload.add("if", interface_ids(resource));
    payload.add("rt", resource_type_ids(resource));
    Payload::Map(payload)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use crate::attribute::Attribute;
    use crate::error::{Error, ErrorKind, Result};
    use crate::operation::{Failures, ResourceOperations, Response};
    use crate::payload::{Payload, PayloadMap};
    use crate::request::Request;
    use crate::resource::Resource;
    use crate::resource_type::ResourceType;
    use crate::serialize;
    use crate::transaction::Transaction;
    use crate::validator::Validator;
    use crate::value::Value;

    use super::{
        BASELINE_INTERFACE, DEFAULT_INTERFACE, ResourceInterface, Retrieve, Update,
    };

    fn x_test() -> ResourceType {
        ResourceType::new(
            "x.test",
            [
                Attribute::new("alwaysTrue", Value::constant(true), Validator::bool()).unwrap(),
                Attribute::new("alwaysFalse", Value::constant(false), Validator::bool()).unwrap(),
            ],
        )
        .unwrap()
    }

    fn retrieve(resource: &Arc<Resource>, interface: &str) -> Response {
        let request = Request::builder(resource.clone())
            .interface(interface)
            .build();
        resource.operations().retrieve(&request).unwrap()
    }

    #[test]
    fn test_baseline_retrieve() {
        let resource = Arc::new(
            Resource::builder("/test")
                .resource_type(x_test())
                .operations(ResourceOperations::read_only())
                .build()
                .unwrap(),
        );

        let response = retrieve(&resource, DEFAULT_INTERFACE);

        assert!(response.is_complete());
        assert_eq!(
            response.payload().to_json().unwrap(),
            r#"{"alwaysFalse":false,"alwaysTrue":true,"if":["oic.if.baseline"],"rt":["x.test"]}"#
        );

        // Both synthesized interfaces render the same payload.
        assert_eq!(retrieve(&resource, BASELINE_INTERFACE), response);
    }

    #[test]
    fn test_baseline_metadata() {
        let resource = Arc::new(
            Resource::builder("/test")
                .resource_type(x_test())
                .resource_type(ResourceType::new("x.empty", []).unwrap())
                .interface(ResourceInterface::baseline("oic.if.r"))
                .operations(ResourceOperations::read_only())
                .build()
                .unwrap(),
        );

        assert_eq!(
            serialize(retrieve(&resource, "oic.if.r").payload()),
            json!({
                "alwaysFalse": false,
                "alwaysTrue": true,
                "if": ["oic.if.baseline", "oic.if.r"],
                "rt": ["x.empty", "x.test"],
            })
        );
    }

    struct Brightness;

    impl Retrieve for Brightness {
        fn retrieve(
            &self,
            request: &Request,
            transaction: &mut dyn Transaction,
        ) -> Result<Response> {
            let attribute = request
                .resource()
                .get_resource_type("oic.r.light.brightness")?
                .get_attribute("brightness")?;
            Ok(Response::new(attribute.get_value(transaction)?))
        }
    }

    impl Update for Brightness {
        fn update(&self, _request: &Request, failures: Failures) -> Result<Response> {
            match failures.iter().next() {
                Some(failure) => Err(Error::new(
                    failure.error().kind(),
                    "Brightness not updated",
                )),
                None => Ok(Response::new(Payload::Bool(true))),
            }
        }
    }

    #[test]
    fn test_custom_interface() {
        let interface = ResourceInterface::new("x.brightness")
            .retrieve(Brightness)
            .update(Brightness);

        assert_eq!(interface.id(), "x.brightness");
        assert!(interface.as_retrieve().is_some() && interface.as_update().is_some());
        assert!(interface.as_create().is_none() && interface.as_delete().is_none());

        let resource = Arc::new(
            Resource::builder("/light")
                .resource_type(
                    ResourceType::new(
                        "oic.r.light.brightness",
                        [Attribute::new(
                            "brightness",
                            Value::constant(42_i64),
                            Validator::int_with_limits(0, 100),
                        )
                        .unwrap()],
                    )
                    .unwrap(),
                )
                .interface(interface)
                .operations(ResourceOperations::builder().retrieve().update().build().unwrap())
                .build()
                .unwrap(),
        );

        assert_eq!(
            retrieve(&resource, "x.brightness").payload(),
            &Payload::Int(42)
        );

        // The constant brightness cannot be written.
        let request = Request::builder(resource.clone())
            .interface("x.brightness")
            .payload(PayloadMap::new().insert("brightness", 50_i64))
            .build();
        assert_eq!(
            resource.operations().update(&request).unwrap_err().kind(),
            ErrorKind::AccessDenied
        );
    }
}
