use std::sync::Arc;

use crate::error::{Error, ErrorKind, Result};
use crate::payload::Payload;
use crate::transaction::Transaction;
use crate::validator::Validator;
use crate::value::Value;

/// A named property of a resource type.
///
/// An [`Attribute`] mediates every access to its [`Value`]: a payload is
/// written only after its [`Validator`] accepted it.
#[derive(Debug)]
pub struct Attribute {
    // Identifier.
    id: String,
    // Stored or computed state.
    value: Value,
    // Validator, possibly shared among attributes.
    validator: Arc<Validator>,
}

impl Attribute {
    /// Creates an [`Attribute`].
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::InvalidParams`] when the identifier is empty.
    pub fn new(
        id: impl Into<String>,
        value: Value,
        validator: impl Into<Arc<Validator>>,
    ) -> Result<Self> {
        Self::builder(id).value(value).validator(validator).build()
    }

    /// Creates an [`AttributeBuilder`].
    #[must_use]
    #[inline]
    pub fn builder(id: impl Into<String>) -> AttributeBuilder {
        AttributeBuilder {
            id: id.into(),
            value: None,
            validator: None,
        }
    }

    /// Returns the identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the [`Value`].
    #[must_use]
    pub const fn value(&self) -> &Value {
        &self.value
    }

    /// Returns the [`Validator`].
    #[must_use]
    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// Reads the attribute.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::AccessDenied`] when the value is not gettable
    /// - Any error returned by the value
    pub fn get_value(&self, transaction: &mut dyn Transaction) -> Result<Payload> {
        if !self.value.is_gettable() {
            return Err(self.access_denied("read"));
        }
        self.value.get(transaction)
    }

    /// Validates and writes the attribute.
    ///
    /// # Errors
    ///
    /// - Any validation error
    /// - [`ErrorKind::AccessDenied`] when the value is not settable
    /// - Any error returned by the value
    pub fn set_value(&self, transaction: &mut dyn Transaction, payload: Payload) -> Result<()> {
        self.validator.validate_value(&payload)?;
        if !self.value.is_settable() {
            return Err(self.access_denied("written"));
        }
        self.value.set(transaction, payload)
    }

    /// Restores the attribute default.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::AccessDenied`] when the value is not settable
    /// - [`ErrorKind::OperationNotSupported`] when the value has no default
    /// - Any error returned by the value
    pub fn set_default_value(&self, transaction: &mut dyn Transaction) -> Result<()> {
        if !self.value.is_settable() {
            return Err(self.access_denied("reset"));
        }
        self.value.set_default(transaction)
    }

    fn access_denied(&self, access: &str) -> Error {
        Error::new(
            ErrorKind::AccessDenied,
            format!("Attribute `{}` cannot be {access}", self.id),
        )
    }
}

/// An [`Attribute`] builder.
///
/// The value and the validator are both mandatory.
#[derive(Debug)]
pub struct AttributeBuilder {
    id: String,
    value: Option<Value>,
    validator: Option<Arc<Validator>>,
}

impl AttributeBuilder {
    /// Sets the [`Value`].
    #[must_use]
    pub fn value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    /// Sets the [`Validator`].
    #[must_use]
    pub fn validator(mut self, validator: impl Into<Arc<Validator>>) -> Self {
        self.validator = Some(validator.into());
        self
    }

    /// Builds the [`Attribute`].
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::InvalidParams`] when the identifier is empty,
    /// or the value or the validator is missing.
    pub fn build(self) -> Result<Attribute> {
        if self.id.is_empty() {
            return Err(Error::new(
                ErrorKind::InvalidParams,
                "An attribute requires a non-empty identifier",
            ));
        }

        let Some(value) = self.value else {
            return Err(Error::new(
                ErrorKind::InvalidParams,
                format!("Attribute `{}` requires a value", self.id),
            ));
        };

        let Some(validator) = self.validator else {
            return Err(Error::new(
                ErrorKind::InvalidParams,
                format!("Attribute `{}` requires a validator", self.id),
            ));
        };

        Ok(Attribute {
            id: self.id,
            value,
            validator,
        })
    }
}
