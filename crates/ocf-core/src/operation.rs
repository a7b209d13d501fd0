use std::sync::Arc;

use tracing::warn;

use crate::error::{Error, ErrorKind, Result};
use crate::interface::ResourceInterface;
use crate::iterator::MapIterator;
use crate::payload::Payload;
use crate::request::Request;
use crate::resource::Resource;
use crate::transaction::{ScopedTransaction, TransactionOpener};

/// A failure recorded while processing a request.
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    attribute: Option<String>,
    error: Error,
}

impl Failure {
    /// Creates a [`Failure`] related to an attribute.
    #[must_use]
    pub fn attribute(id: impl Into<String>, error: Error) -> Self {
        Self {
            attribute: Some(id.into()),
            error,
        }
    }

    /// Creates a [`Failure`] not related to any attribute.
    #[must_use]
    pub const fn operation(error: Error) -> Self {
        Self {
            attribute: None,
            error,
        }
    }

    /// Returns the identifier of the attribute that failed, if any.
    #[must_use]
    pub fn attribute_id(&self) -> Option<&str> {
        self.attribute.as_deref()
    }

    /// Returns the [`Error`].
    #[must_use]
    pub const fn error(&self) -> &Error {
        &self.error
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.attribute {
            Some(attribute) => write!(f, "{attribute}: {}", self.error),
            None => write!(f, "{}", self.error),
        }
    }
}

/// A collection of [`Failure`]s, in the order they were recorded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Failures(Vec<Failure>);

impl Failures {
    /// Creates an empty [`Failures`] collection.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Records a [`Failure`].
    pub fn push(&mut self, failure: Failure) {
        self.0.push(failure);
    }

    /// Checks whether no failure has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of recorded failures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates over the recorded failures.
    pub fn iter(&self) -> std::slice::Iter<'_, Failure> {
        self.0.iter()
    }
}

impl IntoIterator for Failures {
    type Item = Failure;
    type IntoIter = std::vec::IntoIter<Failure>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Failures {
    type Item = &'a Failure;
    type IntoIter = std::slice::Iter<'a, Failure>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// The outcome of a resource operation.
///
/// A response may carry failures next to its payload: an operation
/// processes every attribute it can and reports the ones it could not.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    payload: Payload,
    failures: Failures,
}

impl Response {
    /// Creates a [`Response`] without failures.
    #[must_use]
    pub const fn new(payload: Payload) -> Self {
        Self {
            payload,
            failures: Failures::new(),
        }
    }

    /// Creates a [`Response`] with failures.
    #[must_use]
    pub const fn with_failures(payload: Payload, failures: Failures) -> Self {
        Self { payload, failures }
    }

    /// Returns the [`Payload`].
    #[must_use]
    pub const fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Returns the [`Failures`].
    #[must_use]
    pub const fn failures(&self) -> &Failures {
        &self.failures
    }

    /// Checks whether the operation completed without failures.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Splits the [`Response`] into its payload and failures.
    #[must_use]
    pub fn into_parts(self) -> (Payload, Failures) {
        (self.payload, self.failures)
    }
}

/// A closure building a new [`Resource`] out of a create request.
pub type CreateResource = Arc<dyn Fn(&Request) -> Result<Arc<Resource>> + Send + Sync>;

/// A closure returning the [`Resource`] a delete request removes.
pub type DeleteResource = Arc<dyn Fn(&Request) -> Result<Arc<Resource>> + Send + Sync>;

/// The operations a [`Resource`] supports.
///
/// Each operation is independent: a resource may support any subset of
/// them.
pub struct ResourceOperations {
    opener: Option<TransactionOpener>,
    retrieve: bool,
    update: bool,
    create: Option<CreateResource>,
    delete: Option<DeleteResource>,
}

impl std::fmt::Debug for ResourceOperations {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceOperations")
            .field("transactional", &self.opener.is_some())
            .field("retrieve", &self.retrieve)
            .field("update", &self.update)
            .field("create", &self.create.is_some())
            .field("delete", &self.delete.is_some())
            .finish()
    }
}

impl ResourceOperations {
    /// Creates a [`ResourceOperationsBuilder`].
    #[must_use]
    #[inline]
    pub fn builder() -> ResourceOperationsBuilder {
        ResourceOperationsBuilder(Self {
            opener: None,
            retrieve: false,
            update: false,
            create: None,
            delete: None,
        })
    }

    /// Creates [`ResourceOperations`] supporting only retrieval, without
    /// a backing store.
    #[must_use]
    pub fn read_only() -> Self {
        Self {
            opener: None,
            retrieve: true,
            update: false,
            create: None,
            delete: None,
        }
    }

    /// Checks whether retrieval is supported.
    #[must_use]
    pub const fn supports_retrieve(&self) -> bool {
        self.retrieve
    }

    /// Checks whether update is supported.
    #[must_use]
    pub const fn supports_update(&self) -> bool {
        self.update
    }

    /// Checks whether creation is supported.
    #[must_use]
    pub const fn supports_create(&self) -> bool {
        self.create.is_some()
    }

    /// Checks whether deletion is supported.
    #[must_use]
    pub const fn supports_delete(&self) -> bool {
        self.delete.is_some()
    }

    /// Retrieves the requested resource through the requested interface.
    ///
    /// The transaction is always dropped before returning, even on success.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::OperationNotSupported`] when retrieval is not supported
    /// - [`ErrorKind::InvalidInterface`] when the interface is missing or
    ///   cannot retrieve
    /// - Any error raised while opening or dropping the transaction, or by
    ///   the interface
    pub fn retrieve(&self, request: &Request) -> Result<Response> {
        if !self.retrieve {
            return Err(not_supported("retrieve", request));
        }

        let interface = resolve(request, "retrieve", ResourceInterface::as_retrieve)?;

        let mut transaction = ScopedTransaction::open(self.opener.as_ref())?;
        let response = interface.retrieve(request, transaction.transaction()?);
        let released = transaction.drop_changes();

        match (response, released) {
            (Ok(response), Ok(())) => Ok(response),
            (Ok(_), Err(e)) | (Err(e), Ok(())) => Err(e),
            (Err(e), Err(release)) => {
                warn!(
                    "Unable to release the transaction of `{}`: {release}",
                    request.resource().id()
                );
                Err(e)
            }
        }
    }

    /// Updates the requested resource and shapes the response through the
    /// requested interface.
    ///
    /// Every key of the request payload is written to each attribute with
    /// the same identifier, on every resource type of the resource. Keys
    /// matching no attribute are ignored. Failures do not stop the
    /// processing of the remaining keys: they are collected, together with
    /// a possible commit failure, and handed to the interface.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::OperationNotSupported`] when update is not supported
    /// - [`ErrorKind::InvalidInterface`] when the interface is missing or
    ///   cannot update
    /// - [`ErrorKind::InvalidType`] when the request payload is not a map
    /// - Any error raised while opening the transaction, or by the interface
    pub fn update(&self, request: &Request) -> Result<Response> {
        if !self.update {
            return Err(not_supported("update", request));
        }

        let interface = resolve(request, "update", ResourceInterface::as_update)?;

        let Payload::Map(values) = request.payload() else {
            return Err(Error::new(
                ErrorKind::InvalidType,
                format!(
                    "An update of `{}` requires a map, found {}",
                    request.resource().id(),
                    request.payload().kind()
                ),
            ));
        };

        let mut transaction = ScopedTransaction::open(self.opener.as_ref())?;
        let mut failures = Failures::new();

        {
            let handle = transaction.transaction()?;
            for (key, payload) in MapIterator::new(values.iter()) {
                for (_, resource_type) in request.resource().resource_type_iter() {
                    let Some(attribute) = resource_type.attribute(key) else {
                        continue;
                    };
                    if let Err(e) = attribute.set_value(handle, payload.clone()) {
                        failures.push(Failure::attribute(key.as_str(), e));
                    }
                }
            }
        }

        if let Err(e) = transaction.commit() {
            failures.push(Failure::operation(e));
        }

        interface.update(request, failures)
    }

    /// Creates a new resource and describes it through the requested
    /// interface.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::InvalidInterface`] when the interface is missing or
    ///   cannot create
    /// - [`ErrorKind::OperationNotSupported`] when creation is not supported
    /// - Any error raised by the creation closure or the interface
    pub fn create(&self, request: &Request) -> Result<Response> {
        let interface = resolve(request, "create", ResourceInterface::as_create)?;
        let create = self
            .create
            .as_ref()
            .ok_or_else(|| not_supported("create", request))?;

        let resource = create(request)?;
        interface.create(request, resource)
    }

    /// Deletes a resource and confirms it through the requested interface.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::InvalidInterface`] when the interface is missing or
    ///   cannot delete
    /// - [`ErrorKind::OperationNotSupported`] when deletion is not supported
    /// - Any error raised by the deletion closure or the interface
    pub fn delete(&self, request: &Request) -> Result<Response> {
        let interface = resolve(request, "delete", ResourceInterface::as_delete)?;
        let delete = self
            .delete
            .as_ref()
            .ok_or_else(|| not_supported("delete", request))?;

        let resource = delete(request)?;
        interface.delete(request, resource)
    }
}

/// A [`ResourceOperations`] builder.
pub struct ResourceOperationsBuilder(ResourceOperations);

impl std::fmt::Debug for ResourceOperationsBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ResourceOperationsBuilder")
            .field(&self.0)
            .finish()
    }
}

impl ResourceOperationsBuilder {
    /// Sets the [`TransactionOpener`].
    ///
    /// Without an opener, operations run within a
    /// [`DummyTransaction`](crate::transaction::DummyTransaction).
    #[must_use]
    pub fn transaction_opener(mut self, opener: TransactionOpener) -> Self {
        self.0.opener = Some(opener);
        self
    }

    /// Enables retrieval.
    #[must_use]
    pub fn retrieve(mut self) -> Self {
        self.0.retrieve = true;
        self
    }

    /// Enables update.
    #[must_use]
    pub fn update(mut self) -> Self {
        self.0.update = true;
        self
    }

    /// Enables creation through the given closure.
    #[must_use]
    pub fn create<F>(mut self, create: F) -> Self
    where
        F: Fn(&Request) -> Result<Arc<Resource>> + Send + Sync + 'static,
    {
        self.0.create = Some(Arc::new(create));
        self
    }

    /// Enables deletion through the given closure.
    #[must_use]
    pub fn delete<F>(mut self, delete: F) -> Self
    where
        F: Fn(&Request) -> Result<Arc<Resource>> + Send + Sync + 'static,
    {
        self.0.delete = Some(Arc::new(delete));
        self
    }

    /// Builds the [`ResourceOperations`].
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::InvalidParams`] when no operation has been
    /// enabled.
    pub fn build(self) -> Result<ResourceOperations> {
        let operations = self.0;
        if !(operations.retrieve
            || operations.update
            || operations.create.is_some()
            || operations.delete.is_some())
        {
            return Err(Error::new(
                ErrorKind::InvalidParams,
                "A resource requires at least one operation",
            ));
        }
        Ok(operations)
    }
}

fn resolve<'a, T: ?Sized>(
    request: &'a Request,
    operation: &str,
    capability: impl Fn(&'a ResourceInterface) -> Option<&'a T>,
) -> Result<&'a T> {
    request
        .resource()
        .interface(request.interface())
        .and_then(capability)
        .ok_or_else(|| {
            Error::new(
                ErrorKind::InvalidInterface,
                format!(
                    "Resource `{}` has no interface `{}` able to {operation}",
                    request.resource().id(),
                    request.interface()
                ),
            )
        })
}

fn not_supported(operation: &str, request: &Request) -> Error {
    Error::new(
        ErrorKind::OperationNotSupported,
        format!(
            "Resource `{}` does not support {operation}",
            request.resource().id()
        ),
    )
}
