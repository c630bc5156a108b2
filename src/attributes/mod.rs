//! Request-scoped metadata.
//!
//! [`AttributeCollection`] is a thin named bag for values that middleware
//! layers attach to a request while it travels through an application:
//! route parameters, authenticated identities, deadlines. Values are
//! arbitrary JSON-shaped data; the collection applies no normalization and
//! no retrieval logic beyond plain get/set/remove.

use serde_json::Value;

use crate::collection::KeyValueCollection;

/// A named bag of arbitrary request metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeCollection {
    inner: KeyValueCollection<Value>,
}

impl AttributeCollection {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self {
            inner: KeyValueCollection::new(),
        }
    }

    /// Look up an attribute; absent attributes yield `None`.
    pub fn get_attribute(&self, name: &str) -> Option<&Value> {
        self.inner.get(name)
    }

    /// Whether the attribute exists.
    pub fn has_attribute(&self, name: &str) -> bool {
        self.inner.has(name)
    }

    /// Assign an attribute, overwriting any prior value.
    pub fn set_attribute(&mut self, name: &str, value: impl Into<Value>) {
        self.inner.set(name, value.into());
    }

    /// Remove an attribute.
    pub fn remove_attribute(&mut self, name: &str) {
        self.inner.remove(name);
    }

    /// Copy with the attribute assigned; the receiver is untouched.
    pub fn with_attribute(&self, name: &str, value: impl Into<Value>) -> Self {
        let mut attributes = self.clone();
        attributes.set_attribute(name, value);
        attributes
    }

    /// Copy without the attribute; the receiver is untouched.
    pub fn without_attribute(&self, name: &str) -> Self {
        let mut attributes = self.clone();
        attributes.remove_attribute(name);
        attributes
    }

    /// Iterate attributes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.inner.iter()
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether the collection holds no attributes.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
