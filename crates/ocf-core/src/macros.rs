// Defines a newtype over an `IndexMap` using the `hashbrown` default hasher,
// together with its constructors and iterators.
macro_rules! map {
    (
        $(#[$attr:meta])*
        pub struct $name:ident(IndexMap<$key:ty, $value:ty, DefaultHashBuilder>);
    ) => {
        $(#[$attr])*
        pub struct $name(indexmap::IndexMap<$key, $value, hashbrown::DefaultHashBuilder>);

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl IntoIterator for $name {
            type Item = ($key, $value);
            type IntoIter = indexmap::map::IntoIter<$key, $value>;

            fn into_iter(self) -> Self::IntoIter {
                self.0.into_iter()
            }
        }

        impl<'a> IntoIterator for &'a $name {
            type Item = (&'a $key, &'a $value);
            type IntoIter = indexmap::map::Iter<'a, $key, $value>;

            fn into_iter(self) -> Self::IntoIter {
                self.0.iter()
            }
        }

        impl FromIterator<($key, $value)> for $name {
            fn from_iter<I: IntoIterator<Item = ($key, $value)>>(iter: I) -> Self {
                let mut map = Self::new();
                map.0.extend(iter);
                map
            }
        }

        impl $name {
            #[doc = concat!("Creates an empty [`", stringify!($name), "`].")]
            #[must_use]
            #[inline]
            pub fn new() -> Self {
                Self(indexmap::IndexMap::with_hasher(
                    hashbrown::DefaultHashBuilder::default(),
                ))
            }

            #[doc = concat!("Adds an entry to [`", stringify!($name), "`].")]
            #[doc = ""]
            #[doc = "An existing entry with the same key is replaced."]
            #[inline]
            pub fn add(&mut self, key: impl Into<$key>, value: impl Into<$value>) {
                self.0.insert(key.into(), value.into());
            }

            #[doc = concat!("Inserts an entry, returning the updated [`", stringify!($name), "`].")]
            #[must_use]
            #[inline]
            pub fn insert(mut self, key: impl Into<$key>, value: impl Into<$value>) -> Self {
                self.add(key, value);
                self
            }

            #[doc = concat!("Checks whether [`", stringify!($name), "`] is empty.")]
            #[must_use]
            #[inline]
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            #[doc = concat!("Returns the number of entries in [`", stringify!($name), "`].")]
            #[must_use]
            #[inline]
            pub fn len(&self) -> usize {
                self.0.len()
            }

            #[doc = "Returns an iterator over the entries."]
            #[doc = ""]
            #[doc = "**Iterates over the entries in the order they were inserted.**"]
            #[inline]
            pub fn iter(&self) -> indexmap::map::Iter<'_, $key, $value> {
                self.0.iter()
            }
        }
    };
}

pub(crate) use map;
