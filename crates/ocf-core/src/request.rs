use std::sync::Arc;

use crate::device::Device;
use crate::error::{Error, ErrorKind, Result};
use crate::interface::DEFAULT_INTERFACE;
use crate::payload::{Payload, PayloadMap};
use crate::resource::Resource;

/// A request addressed to a [`Resource`].
///
/// It is produced by the transport layer and carries the target resource,
/// the device the resource belongs to, the identifier of the interface
/// shaping the operation, and the input [`Payload`].
#[derive(Debug, Clone)]
pub struct Request {
    resource: Arc<Resource>,
    device: Option<Arc<Device>>,
    interface: String,
    payload: Payload,
}

impl Request {
    /// Creates a [`Request`] for the default interface, with an empty
    /// payload.
    #[must_use]
    #[inline]
    pub fn new(resource: Arc<Resource>) -> Self {
        Self::builder(resource).build()
    }

    /// Creates a [`RequestBuilder`].
    #[must_use]
    #[inline]
    pub fn builder(resource: Arc<Resource>) -> RequestBuilder {
        RequestBuilder(Self {
            resource,
            device: None,
            interface: DEFAULT_INTERFACE.into(),
            payload: Payload::Map(PayloadMap::new()),
        })
    }

    /// Returns the target [`Resource`].
    #[must_use]
    pub fn resource(&self) -> &Arc<Resource> {
        &self.resource
    }

    /// Returns the [`Device`] the target resource belongs to, if known.
    #[must_use]
    pub fn device(&self) -> Option<&Arc<Device>> {
        self.device.as_ref()
    }

    // Operations acting on the registry cannot run without a device.
    pub(crate) fn require_device(&self) -> Result<&Arc<Device>> {
        self.device.as_ref().ok_or_else(|| {
            Error::new(
                ErrorKind::InvalidParams,
                format!(
                    "The request to `{}` does not carry a device",
                    self.resource.id()
                ),
            )
        })
    }

    /// Returns the interface identifier.
    #[must_use]
    pub fn interface(&self) -> &str {
        &self.interface
    }

    /// Returns the input [`Payload`].
    #[must_use]
    pub const fn payload(&self) -> &Payload {
        &self.payload
    }
}

/// A [`Request`] builder.
#[derive(Debug)]
pub struct RequestBuilder(Request);

impl RequestBuilder {
    /// Sets the [`Device`] the target resource belongs to.
    #[must_use]
    pub fn device(mut self, device: Arc<Device>) -> Self {
        self.0.device = Some(device);
        self
    }

    /// Sets the interface identifier.
    #[must_use]
    pub fn interface(mut self, interface: impl Into<String>) -> Self {
        self.0.interface = interface.into();
        self
    }

    /// Sets the input [`Payload`].
    #[must_use]
    pub fn payload(mut self, payload: impl Into<Payload>) -> Self {
        self.0.payload = payload.into();
        self
    }

    /// Builds the [`Request`].
    #[must_use]
    #[inline]
    pub fn build(self) -> Request {
        self.0
    }
}
