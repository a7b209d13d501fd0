use hashbrown::HashMap;

use crate::error::{Error, ErrorKind, Result};
use crate::interface::{BASELINE_INTERFACE, DEFAULT_INTERFACE, ResourceInterface};
use crate::iterator::MapIterator;
use crate::operation::ResourceOperations;
use crate::resource_type::ResourceType;

/// An addressable device capability.
///
/// A [`Resource`] is composed of:
///
/// - An identifier, which is also its `href`
/// - One or more [`ResourceType`]s, describing its attributes
/// - A set of [`ResourceInterface`]s, always including the default
///   interface and the baseline one
/// - The [`ResourceOperations`] it supports
/// - Discoverability and observability flags
#[derive(Debug)]
pub struct Resource {
    id: String,
    discoverable: bool,
    observable: bool,
    resource_types: HashMap<String, ResourceType>,
    interfaces: HashMap<String, ResourceInterface>,
    operations: ResourceOperations,
}

impl Resource {
    /// Creates a [`ResourceBuilder`].
    #[must_use]
    #[inline]
    pub fn builder(id: impl Into<String>) -> ResourceBuilder {
        ResourceBuilder {
            id: id.into(),
            discoverable: false,
            observable: false,
            resource_types: Vec::new(),
            interfaces: Vec::new(),
            operations: None,
        }
    }

    /// Returns the identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Checks whether the resource is listed by discovery.
    #[must_use]
    pub const fn is_discoverable(&self) -> bool {
        self.discoverable
    }

    /// Checks whether the resource can be observed.
    #[must_use]
    pub const fn is_observeable(&self) -> bool {
        self.observable
    }

    /// Iterates over the resource types in ascending order of their
    /// identifiers.
    #[must_use]
    pub fn resource_type_iter(&self) -> MapIterator<&str, &ResourceType> {
        MapIterator::new(
            self.resource_types
                .iter()
                .map(|(id, resource_type)| (id.as_str(), resource_type)),
        )
    }

    /// Iterates over the interfaces in ascending order of their
    /// identifiers.
    #[must_use]
    pub fn interface_iter(&self) -> MapIterator<&str, &ResourceInterface> {
        MapIterator::new(
            self.interfaces
                .iter()
                .map(|(id, interface)| (id.as_str(), interface)),
        )
    }

    /// Retrieves a [`ResourceType`].
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::NotExist`] when the resource does not have
    /// the given resource type.
    pub fn get_resource_type(&self, id: &str) -> Result<&ResourceType> {
        self.resource_types
            .get(id)
            .ok_or_else(|| self.not_exist("resource type", id))
    }

    /// Retrieves a [`ResourceInterface`].
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::NotExist`] when the resource does not have
    /// the given interface.
    pub fn get_interface(&self, id: &str) -> Result<&ResourceInterface> {
        self.interface(id)
            .ok_or_else(|| self.not_exist("interface", id))
    }

    /// Returns the [`ResourceOperations`].
    #[must_use]
    pub const fn operations(&self) -> &ResourceOperations {
        &self.operations
    }

    pub(crate) fn interface(&self, id: &str) -> Option<&ResourceInterface> {
        self.interfaces.get(id)
    }

    fn not_exist(&self, entity: &str, id: &str) -> Error {
        Error::new(
            ErrorKind::NotExist,
            format!("Resource `{}` has no {entity} `{id}`", self.id),
        )
    }
}

/// A [`Resource`] builder.
#[derive(Debug)]
pub struct ResourceBuilder {
    id: String,
    discoverable: bool,
    observable: bool,
    resource_types: Vec<ResourceType>,
    interfaces: Vec<ResourceInterface>,
    operations: Option<ResourceOperations>,
}

impl ResourceBuilder {
    /// Adds a [`ResourceType`].
    #[must_use]
    pub fn resource_type(mut self, resource_type: ResourceType) -> Self {
        self.resource_types.push(resource_type);
        self
    }

    /// Adds a [`ResourceInterface`].
    #[must_use]
    pub fn interface(mut self, interface: ResourceInterface) -> Self {
        self.interfaces.push(interface);
        self
    }

    /// Makes the resource discoverable.
    #[must_use]
    pub fn discoverable(mut self) -> Self {
        self.discoverable = true;
        self
    }

    /// Makes the resource observable.
    #[must_use]
    pub fn observable(mut self) -> Self {
        self.observable = true;
        self
    }

    /// Sets the [`ResourceOperations`].
    #[must_use]
    pub fn operations(mut self, operations: ResourceOperations) -> Self {
        self.operations = Some(operations);
        self
    }

    /// Builds the [`Resource`].
    ///
    /// When the default or the baseline interface is missing, a baseline
    /// [`ResourceInterface`] is added with that identifier.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::InvalidParams`] when:
    ///
    /// - the identifier is empty
    /// - no resource type has been added
    /// - two resource types, or two interfaces, share the same identifier
    /// - no [`ResourceOperations`] have been set
    pub fn build(self) -> Result<Resource> {
        let id = self.id;
        if id.is_empty() {
            return Err(Error::new(
                ErrorKind::InvalidParams,
                "A resource requires a non-empty identifier",
            ));
        }

        if self.resource_types.is_empty() {
            return Err(Error::new(
                ErrorKind::InvalidParams,
                format!("Resource `{id}` requires at least one resource type"),
            ));
        }

        let Some(operations) = self.operations else {
            return Err(Error::new(
                ErrorKind::InvalidParams,
                format!("Resource `{id}` requires its operations"),
            ));
        };

        let mut resource_types = HashMap::new();
        for resource_type in self.resource_types {
            if resource_types.contains_key(resource_type.id()) {
                return Err(duplicated(&id, "resource type", resource_type.id()));
            }
            resource_types.insert(resource_type.id().to_string(), resource_type);
        }

        let mut interfaces = HashMap::new();
        for interface in self.interfaces {
            if interfaces.contains_key(interface.id()) {
                return Err(duplicated(&id, "interface", interface.id()));
            }
            interfaces.insert(interface.id().to_string(), interface);
        }

        for mandatory in [DEFAULT_INTERFACE, BASELINE_INTERFACE] {
            interfaces
                .entry(mandatory.to_string())
                .or_insert_with(|| ResourceInterface::baseline(mandatory));
        }

        Ok(Resource {
            id,
            discoverable: self.discoverable,
            observable: self.observable,
            resource_types,
            interfaces,
            operations,
        })
    }
}

fn duplicated(resource: &str, entity: &str, id: &str) -> Error {
    Error::new(
        ErrorKind::InvalidParams,
        format!("Resource `{resource}` contains {entity} `{id}` twice"),
    )
}
