use std::sync::Arc;

use hashbrown::HashMap;

use crate::error::{Error, ErrorKind, Result};
use crate::payload::Payload;

/// A refinement predicate applied after the type check.
///
/// It may restrict a value to a range, an allow-list, or any other
/// condition, failing with its own [`Error`].
pub type Refinement<T> = Arc<dyn Fn(&T) -> Result<()> + Send + Sync>;

enum ValidatorKind {
    Bool(Option<Refinement<bool>>),
    Int(Option<Refinement<i64>>),
    Double(Option<Refinement<f64>>),
    String(Option<Refinement<str>>),
    Bytes(Option<Refinement<[u8]>>),
    Enum(Vec<String>),
    Map(HashMap<String, Validator>),
    Array(Box<Validator>),
}

/// A predicate deciding whether a candidate [`Payload`] is acceptable.
///
/// Validation is a pure function of the validator and the candidate: it has
/// no side effects on any value.
pub struct Validator {
    kind: ValidatorKind,
}

/// Alternative name of a [`Validator`].
pub type Limit = Validator;

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            ValidatorKind::Bool(_) => f.write_str("Bool"),
            ValidatorKind::Int(_) => f.write_str("Int"),
            ValidatorKind::Double(_) => f.write_str("Double"),
            ValidatorKind::String(_) => f.write_str("String"),
            ValidatorKind::Bytes(_) => f.write_str("Bytes"),
            ValidatorKind::Enum(values) => f.debug_tuple("Enum").field(values).finish(),
            ValidatorKind::Map(keys) => f.debug_tuple("Map").field(keys).finish(),
            ValidatorKind::Array(element) => f.debug_tuple("Array").field(element).finish(),
        }
    }
}

impl Validator {
    /// Creates a [`bool`] validator.
    #[must_use]
    pub const fn bool() -> Self {
        Self::init(ValidatorKind::Bool(None))
    }

    /// Creates a [`bool`] validator with a refinement.
    #[must_use]
    pub fn bool_with<F>(refinement: F) -> Self
    where
        F: Fn(&bool) -> Result<()> + Send + Sync + 'static,
    {
        Self::init(ValidatorKind::Bool(Some(Arc::new(refinement))))
    }

    /// Creates an integer validator.
    #[must_use]
    pub const fn int() -> Self {
        Self::init(ValidatorKind::Int(None))
    }

    /// Creates an integer validator with a refinement.
    #[must_use]
    pub fn int_with<F>(refinement: F) -> Self
    where
        F: Fn(&i64) -> Result<()> + Send + Sync + 'static,
    {
        Self::init(ValidatorKind::Int(Some(Arc::new(refinement))))
    }

    /// Creates an integer validator accepting values in `[min, max]`.
    #[must_use]
    pub fn int_with_limits(min: i64, max: i64) -> Self {
        Self::int_with(move |value| check_limits(*value, min, max))
    }

    /// Creates a floating point validator.
    ///
    /// Integer payloads are accepted as well.
    #[must_use]
    pub const fn double() -> Self {
        Self::init(ValidatorKind::Double(None))
    }

    /// Creates a floating point validator with a refinement.
    #[must_use]
    pub fn double_with<F>(refinement: F) -> Self
    where
        F: Fn(&f64) -> Result<()> + Send + Sync + 'static,
    {
        Self::init(ValidatorKind::Double(Some(Arc::new(refinement))))
    }

    /// Creates a floating point validator accepting values in `[min, max]`.
    #[must_use]
    pub fn double_with_limits(min: f64, max: f64) -> Self {
        Self::double_with(move |value| check_limits(*value, min, max))
    }

    /// Creates a characters sequence validator.
    #[must_use]
    pub const fn string() -> Self {
        Self::init(ValidatorKind::String(None))
    }

    /// Creates a characters sequence validator with a refinement.
    #[must_use]
    pub fn string_with<F>(refinement: F) -> Self
    where
        F: Fn(&str) -> Result<()> + Send + Sync + 'static,
    {
        Self::init(ValidatorKind::String(Some(Arc::new(refinement))))
    }

    /// Creates a characters sequence validator accepting at most
    /// `max_length` characters.
    #[must_use]
    pub fn string_with_max_length(max_length: usize) -> Self {
        Self::string_with(move |value| {
            let length = value.chars().count();
            if length > max_length {
                Err(Error::new(
                    ErrorKind::InvalidParams,
                    format!("{length} characters exceed the maximum length of {max_length}"),
                ))
            } else {
                Ok(())
            }
        })
    }

    /// Creates a byte string validator.
    #[must_use]
    pub const fn bytes() -> Self {
        Self::init(ValidatorKind::Bytes(None))
    }

    /// Creates a byte string validator with a refinement.
    #[must_use]
    pub fn bytes_with<F>(refinement: F) -> Self
    where
        F: Fn(&[u8]) -> Result<()> + Send + Sync + 'static,
    {
        Self::init(ValidatorKind::Bytes(Some(Arc::new(refinement))))
    }

    /// Creates an enumeration validator.
    ///
    /// A candidate must be a characters sequence equal to one of the
    /// allowed values.
    #[must_use]
    pub fn enumeration<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::init(ValidatorKind::Enum(
            values.into_iter().map(Into::into).collect(),
        ))
    }

    /// Creates a map validator.
    ///
    /// Every key of a candidate must have a validator among the given ones.
    /// Keys missing from a candidate are not required.
    #[must_use]
    pub fn map<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = (S, Validator)>,
        S: Into<String>,
    {
        Self::init(ValidatorKind::Map(
            keys.into_iter()
                .map(|(key, validator)| (key.into(), validator))
                .collect(),
        ))
    }

    /// Creates an array validator checking each element against the given
    /// validator.
    #[must_use]
    pub fn array(element: Validator) -> Self {
        Self::init(ValidatorKind::Array(Box::new(element)))
    }

    /// Validates a candidate [`Payload`].
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::InvalidType`] when the candidate has a wrong type
    /// - [`ErrorKind::InvalidEnumValue`] when the candidate is not an allowed
    ///   enumeration value
    /// - [`ErrorKind::InvalidKeyOfMap`] when a map key has no validator
    /// - Any error returned by a refinement
    pub fn validate_value(&self, candidate: &Payload) -> Result<()> {
        match (&self.kind, candidate) {
            (ValidatorKind::Bool(refinement), Payload::Bool(value)) => refine(refinement, value),
            (ValidatorKind::Int(refinement), Payload::Int(value)) => refine(refinement, value),
            (ValidatorKind::Double(refinement), Payload::Double(_) | Payload::Int(_)) => {
                match candidate.as_f64() {
                    Some(value) => refine(refinement, &value),
                    None => Err(self.invalid_type(candidate)),
                }
            }
            (ValidatorKind::String(refinement), Payload::String(value)) => {
                refine(refinement, value.as_str())
            }
            (ValidatorKind::Bytes(refinement), Payload::Bytes(value)) => {
                refine(refinement, value.as_slice())
            }
            (ValidatorKind::Enum(values), Payload::String(value)) => {
                if values.iter().any(|allowed| allowed == value) {
                    Ok(())
                } else {
                    Err(Error::new(
                        ErrorKind::InvalidEnumValue,
                        format!("`{value}` is not one of {values:?}"),
                    ))
                }
            }
            (ValidatorKind::Map(validators), Payload::Map(map)) => {
                for (key, value) in map {
                    let Some(validator) = validators.get(key.as_str()) else {
                        return Err(Error::new(
                            ErrorKind::InvalidKeyOfMap,
                            format!("No validator registered for key `{key}`"),
                        ));
                    };
                    validator.validate_value(value)?;
                }
                Ok(())
            }
            (ValidatorKind::Array(element), Payload::Array(values)) => values
                .iter()
                .try_for_each(|value| element.validate_value(value)),
            _ => Err(self.invalid_type(candidate)),
        }
    }

    const fn init(kind: ValidatorKind) -> Self {
        Self { kind }
    }

    const fn expected(&self) -> &'static str {
        match self.kind {
            ValidatorKind::Bool(_) => "bool",
            ValidatorKind::Int(_) => "int",
            ValidatorKind::Double(_) => "double",
            ValidatorKind::String(_) | ValidatorKind::Enum(_) => "string",
            ValidatorKind::Bytes(_) => "bytes",
            ValidatorKind::Map(_) => "map",
            ValidatorKind::Array(_) => "array",
        }
    }

    fn invalid_type(&self, candidate: &Payload) -> Error {
        Error::new(
            ErrorKind::InvalidType,
            format!(
                "Expected a {} payload, found a {} one",
                self.expected(),
                candidate.kind()
            ),
        )
    }
}

fn refine<T: ?Sized>(refinement: &Option<Refinement<T>>, value: &T) -> Result<()> {
    refinement
        .as_ref()
        .map_or(Ok(()), |refinement| refinement(value))
}

fn check_limits<T>(value: T, min: T, max: T) -> Result<()>
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    if !(min..=max).contains(&value) {
        Err(Error::new(
            ErrorKind::InvalidParams,
            format!("{value} is outside the [{min}, {max}] limits"),
        ))
    } else {
        Ok(())
    }
}
