use crate::error::{Error, ErrorKind, Result};
use crate::payload::{FromPayload, Payload};
use crate::transaction::Transaction;

type Getter = Box<dyn Fn(&mut dyn Transaction) -> Result<Payload> + Send + Sync>;
type Setter = Box<dyn Fn(&mut dyn Transaction, Payload) -> Result<()> + Send + Sync>;
type DefaultSetter = Box<dyn Fn(&mut dyn Transaction) -> Result<()> + Send + Sync>;

/// A unit of stored or computed state.
///
/// A [`Value`] exposes up to three capabilities, each one backed by a
/// closure owning or sharing the actual state:
///
/// - get: reads the current state
/// - set: replaces the current state
/// - set default: restores the initial state
///
/// A [`Value`] never validates its input: the owning
/// [`Attribute`](crate::attribute::Attribute) does.
pub struct Value {
    get: Option<Getter>,
    set: Option<Setter>,
    set_default: Option<DefaultSetter>,
}

impl std::fmt::Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Value")
            .field("gettable", &self.is_gettable())
            .field("settable", &self.is_settable())
            .field("default", &self.has_default())
            .finish()
    }
}

impl Value {
    /// Creates a [`ValueBuilder`].
    #[must_use]
    #[inline]
    pub fn builder() -> ValueBuilder {
        ValueBuilder {
            get: None,
            set: None,
            set_default: None,
        }
    }

    /// Creates a read-only [`Value`] always returning the given payload.
    #[must_use]
    pub fn constant(payload: impl Into<Payload>) -> Self {
        let payload = payload.into();
        Self {
            get: Some(Box::new(move |_: &mut dyn Transaction| Ok(payload.clone()))),
            set: None,
            set_default: None,
        }
    }

    /// Checks whether the [`Value`] can be read.
    #[must_use]
    pub const fn is_gettable(&self) -> bool {
        self.get.is_some()
    }

    /// Checks whether the [`Value`] can be written.
    #[must_use]
    pub const fn is_settable(&self) -> bool {
        self.set.is_some()
    }

    /// Checks whether the [`Value`] can be restored to its default.
    #[must_use]
    pub const fn has_default(&self) -> bool {
        self.set_default.is_some()
    }

    /// Reads the [`Value`].
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::OperationNotSupported`] when the value is not gettable
    /// - Any error returned by the getter
    pub fn get(&self, transaction: &mut dyn Transaction) -> Result<Payload> {
        let get = self
            .get
            .as_ref()
            .ok_or_else(|| not_supported("read"))?;
        get(transaction)
    }

    /// Writes the [`Value`].
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::OperationNotSupported`] when the value is not settable
    /// - Any error returned by the setter
    pub fn set(&self, transaction: &mut dyn Transaction, payload: Payload) -> Result<()> {
        let set = self
            .set
            .as_ref()
            .ok_or_else(|| not_supported("written"))?;
        set(transaction, payload)
    }

    /// Restores the [`Value`] default.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::OperationNotSupported`] when the value has no default
    /// - Any error returned by the default initializer
    pub fn set_default(&self, transaction: &mut dyn Transaction) -> Result<()> {
        let set_default = self
            .set_default
            .as_ref()
            .ok_or_else(|| not_supported("reset to a default"))?;
        set_default(transaction)
    }
}

/// A [`Value`] builder.
pub struct ValueBuilder {
    get: Option<Getter>,
    set: Option<Setter>,
    set_default: Option<DefaultSetter>,
}

impl ValueBuilder {
    /// Sets the getter.
    #[must_use]
    pub fn get<T, F>(mut self, get: F) -> Self
    where
        T: Into<Payload>,
        F: Fn(&mut dyn Transaction) -> Result<T> + Send + Sync + 'static,
    {
        self.get = Some(Box::new(
            move |transaction: &mut dyn Transaction| -> Result<Payload> {
                get(transaction).map(Into::into)
            },
        ));
        self
    }

    /// Sets the setter.
    ///
    /// The input payload is converted into `T` before calling the setter.
    #[must_use]
    pub fn set<T, F>(mut self, set: F) -> Self
    where
        T: FromPayload,
        F: Fn(&mut dyn Transaction, T) -> Result<()> + Send + Sync + 'static,
    {
        self.set = Some(Box::new(
            move |transaction: &mut dyn Transaction, payload: Payload| -> Result<()> {
                set(transaction, T::from_payload(payload)?)
            },
        ));
        self
    }

    /// Sets the default initializer.
    #[must_use]
    pub fn set_default<F>(mut self, set_default: F) -> Self
    where
        F: Fn(&mut dyn Transaction) -> Result<()> + Send + Sync + 'static,
    {
        self.set_default = Some(Box::new(set_default));
        self
    }

    /// Builds the [`Value`].
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::InvalidParams`] when neither a getter nor a
    /// setter has been supplied.
    pub fn build(self) -> Result<Value> {
        if self.get.is_none() && self.set.is_none() {
            return Err(Error::new(
                ErrorKind::InvalidParams,
                "A value requires at least a getter or a setter",
            ));
        }

        Ok(Value {
            get: self.get,
            set: self.set,
            set_default: self.set_default,
        })
    }
}

fn not_supported(access: &str) -> Error {
    Error::new(
        ErrorKind::OperationNotSupported,
        format!("The value cannot be {access}"),
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use crate::error::ErrorKind;
    use crate::payload::Payload;
    use crate::transaction::DummyTransaction;

    use super::Value;

    fn switch(initial: bool) -> (Value, Arc<Mutex<bool>>) {
        let state = Arc::new(Mutex::new(initial));
        let (get_state, set_state, default_state) = (state.clone(), state.clone(), state.clone());

        let value = Value::builder()
            .get(move |_| Ok(*get_state.lock()))
            .set(move |_, value: bool| {
                *set_state.lock() = value;
                Ok(())
            })
            .set_default(move |_| {
                *default_state.lock() = initial;
                Ok(())
            })
            .build()
            .unwrap();

        (value, state)
    }

    #[test]
    fn test_no_capabilities() {
        assert_eq!(
            Value::builder()
                .set_default(|_| Ok(()))
                .build()
                .unwrap_err()
                .kind(),
            ErrorKind::InvalidParams
        );
    }

    #[test]
    fn test_get_set_default() {
        let mut transaction = DummyTransaction;
        let (value, state) = switch(true);

        assert!(value.is_gettable() && value.is_settable() && value.has_default());

        value.set(&mut transaction, Payload::Bool(false)).unwrap();
        assert!(!*state.lock());
        assert_eq!(value.get(&mut transaction), Ok(Payload::Bool(false)));

        value.set_default(&mut transaction).unwrap();
        assert_eq!(value.get(&mut transaction), Ok(Payload::Bool(true)));
    }

    #[test]
    fn test_typed_setter() {
        let mut transaction = DummyTransaction;
        let (value, state) = switch(true);

        // The value does not validate, but a typed setter cannot accept
        // another type.
        assert_eq!(
            value
                .set(&mut transaction, Payload::Int(0))
                .unwrap_err()
                .kind(),
            ErrorKind::InvalidType
        );
        assert!(*state.lock());
    }

    #[test]
    fn test_missing_capabilities() {
        let mut transaction = DummyTransaction;
        let value = Value::constant("lamp");

        assert_eq!(value.get(&mut transaction), Ok(Payload::String("lamp".into())));
        assert_eq!(
            value
                .set(&mut transaction, "bulb".into())
                .unwrap_err()
                .kind(),
            ErrorKind::OperationNotSupported
        );
        assert_eq!(
            value.set_default(&mut transaction).unwrap_err().kind(),
            ErrorKind::OperationNotSupported
        );

        let write_only = Value::builder()
            .set(|_, _: i64| Ok(()))
            .build()
            .unwrap();
        assert!(!write_only.is_gettable());
        assert_eq!(
            write_only.get(&mut transaction).unwrap_err().kind(),
            ErrorKind::OperationNotSupported
        );
    }
}
