use hashbrown::HashMap;

use crate::attribute::Attribute;
use crate::error::{Error, ErrorKind, Result};
use crate::iterator::MapIterator;

// Keys carrying the metadata of a resource in a baseline payload.
const RESERVED_IDS: [&str; 2] = ["if", "rt"];

/// A named set of [`Attribute`]s a resource conforms to.
///
/// Attribute identifiers are unique within a [`ResourceType`], which is
/// immutable once created.
#[derive(Debug)]
pub struct ResourceType {
    id: String,
    attributes: HashMap<String, Attribute>,
}

impl ResourceType {
    /// Creates a [`ResourceType`].
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::InvalidParams`] when:
    ///
    /// - the identifier is empty
    /// - two attributes share the same identifier
    /// - an attribute is named `if` or `rt`
    pub fn new<I>(id: impl Into<String>, attributes: I) -> Result<Self>
    where
        I: IntoIterator<Item = Attribute>,
    {
        let id = id.into();
        if id.is_empty() {
            return Err(Error::new(
                ErrorKind::InvalidParams,
                "A resource type requires a non-empty identifier",
            ));
        }

        let mut map = HashMap::new();
        for attribute in attributes {
            if RESERVED_IDS.contains(&attribute.id()) {
                return Err(Error::new(
                    ErrorKind::InvalidParams,
                    format!(
                        "Resource type `{id}` cannot contain the reserved attribute `{}`",
                        attribute.id()
                    ),
                ));
            }
            if map.contains_key(attribute.id()) {
                return Err(Error::new(
                    ErrorKind::InvalidParams,
                    format!(
                        "Resource type `{id}` contains attribute `{}` twice",
                        attribute.id()
                    ),
                ));
            }
            map.insert(attribute.id().to_string(), attribute);
        }

        Ok(Self {
            id,
            attributes: map,
        })
    }

    /// Returns the identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Checks whether the resource type has no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Iterates over the attributes in ascending order of their identifiers.
    #[must_use]
    pub fn attribute_iter(&self) -> MapIterator<&str, &Attribute> {
        MapIterator::new(
            self.attributes
                .iter()
                .map(|(id, attribute)| (id.as_str(), attribute)),
        )
    }

    /// Retrieves an [`Attribute`].
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::NotExist`] when no attribute has the given
    /// identifier.
    pub fn get_attribute(&self, id: &str) -> Result<&Attribute> {
        self.attribute(id).ok_or_else(|| {
            Error::new(
                ErrorKind::NotExist,
                format!("Resource type `{}` has no attribute `{id}`", self.id),
            )
        })
    }

    // Lookup without the error, for callers that skip missing attributes.
    pub(crate) fn attribute(&self, id: &str) -> Option<&Attribute> {
        self.attributes.get(id)
    }
}
