//! The caller model attached to successful authentications.

use {
    derive_builder::Builder,
    std::collections::{hash_map::Iter, HashMap},
};

/// The authenticated caller associated with a public key.
///
/// Principal structs are immutable. Use [`PrincipalBuilder`] (or
/// [`Principal::new`]) to construct one.
#[derive(Builder, Clone, Debug, Default, Eq, PartialEq)]
pub struct Principal {
    /// The public key the caller presented.
    #[builder(setter(into))]
    public_key: String,

    /// A human-readable name for diagnostics, if known.
    #[builder(setter(into, strip_option), default)]
    display_name: Option<String>,
}

impl Principal {
    /// Create a [`PrincipalBuilder`] to construct a [`Principal`].
    #[inline]
    pub fn builder() -> PrincipalBuilder {
        PrincipalBuilder::default()
    }

    /// Create a `Principal` identified by a public key alone.
    pub fn new(public_key: impl Into<String>) -> Self {
        Principal {
            public_key: public_key.into(),
            display_name: None,
        }
    }

    /// Retrieve the public key the caller presented.
    #[inline]
    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    /// Retrieve the human-readable name for diagnostics, if known.
    #[inline]
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }
}

/// Auxiliary key/value data a credential resolver may attach to a successful
/// authentication, carried through to the dispatch layer unchanged.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SessionData {
    data: HashMap<String, String>,
}

impl SessionData {
    /// Create an empty `SessionData`.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a key/value pair, returning the previous value for the key, if
    /// any.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.data.insert(key.into(), value.into())
    }

    /// Retrieve the value for a key, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }

    /// Whether there is no attached data.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The number of attached key/value pairs.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Iterate over the attached key/value pairs.
    pub fn iter(&self) -> Iter<'_, String, String> {
        self.data.iter()
    }
}

impl From<HashMap<String, String>> for SessionData {
    fn from(data: HashMap<String, String>) -> Self {
        SessionData {
            data,
        }
    }
}
