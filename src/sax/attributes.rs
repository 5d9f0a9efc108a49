//! Attribute Accumulator
//!
//! Collects the attributes of one element, in declaration order, before they
//! are delivered with the element-start event. The replay engine owns one
//! instance and clears it after every delivery, so its allocation is reused
//! across elements.

use std::sync::Arc;

use crate::buffer::Opaque;

/// Attribute value as stored in the buffer
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Text(Arc<str>),
    Object(Opaque),
}

impl AttributeValue {
    /// Text of a textual value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(text) => Some(&**text),
            AttributeValue::Object(_) => None,
        }
    }
}

impl PartialEq<str> for AttributeValue {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == Some(other)
    }
}

impl PartialEq<&str> for AttributeValue {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == Some(*other)
    }
}

/// One attribute of an element
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub uri: Arc<str>,
    pub local_name: Arc<str>,
    pub qname: Arc<str>,
    /// Attribute type token, e.g. `CDATA`
    pub attr_type: Arc<str>,
    pub value: AttributeValue,
}

impl Attribute {
    /// Textual attribute from borrowed parts
    pub fn new(uri: &str, local_name: &str, qname: &str, attr_type: &str, value: &str) -> Self {
        Attribute {
            uri: Arc::from(uri),
            local_name: Arc::from(local_name),
            qname: Arc::from(qname),
            attr_type: Arc::from(attr_type),
            value: AttributeValue::Text(Arc::from(value)),
        }
    }
}

/// Attributes of one element
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    attributes: Vec<Attribute>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Attributes {
            attributes: Vec::with_capacity(capacity),
        }
    }

    /// Append an attribute whose qualified name is already resolved
    pub fn add_attribute_with_qname(
        &mut self,
        uri: Arc<str>,
        local_name: Arc<str>,
        qname: Arc<str>,
        attr_type: Arc<str>,
        value: AttributeValue,
    ) {
        self.attributes.push(Attribute {
            uri,
            local_name,
            qname,
            attr_type,
            value,
        });
    }

    pub fn push(&mut self, attribute: Attribute) {
        self.attributes.push(attribute);
    }

    /// Remove all attributes, keeping the allocation
    pub fn clear(&mut self) {
        self.attributes.clear();
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Attribute> {
        self.attributes.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Attribute> {
        self.attributes.iter()
    }

    pub fn as_slice(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Position of the attribute with this qualified name
    pub fn index_of_qname(&self, qname: &str) -> Option<usize> {
        self.attributes.iter().position(|a| &*a.qname == qname)
    }

    /// Position of the attribute with this namespace URI and local name
    pub fn index_of(&self, uri: &str, local_name: &str) -> Option<usize> {
        self.attributes
            .iter()
            .position(|a| &*a.uri == uri && &*a.local_name == local_name)
    }

    /// Value of the attribute with this qualified name
    pub fn value(&self, qname: &str) -> Option<&AttributeValue> {
        self.index_of_qname(qname).map(|i| &self.attributes[i].value)
    }

    /// Value of the attribute with this namespace URI and local name
    pub fn value_ns(&self, uri: &str, local_name: &str) -> Option<&AttributeValue> {
        self.index_of(uri, local_name)
            .map(|i| &self.attributes[i].value)
    }

    pub fn to_vec(&self) -> Vec<Attribute> {
        self.attributes.clone()
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = &'a Attribute;
    type IntoIter = std::slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.attributes.iter()
    }
}

impl FromIterator<Attribute> for Attributes {
    fn from_iter<I: IntoIterator<Item = Attribute>>(iter: I) -> Self {
        Attributes {
            attributes: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Attributes {
        [
            Attribute::new("", "id", "id", "ID", "a1"),
            Attribute::new("urn:x", "b", "p:b", "CDATA", "v"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_lookup_by_qname() {
        let attrs = sample();
        assert_eq!(attrs.index_of_qname("p:b"), Some(1));
        assert_eq!(attrs.value("id").and_then(AttributeValue::as_str), Some("a1"));
        assert_eq!(attrs.value("missing"), None);
    }

    #[test]
    fn test_lookup_by_namespace() {
        let attrs = sample();
        assert_eq!(attrs.index_of("urn:x", "b"), Some(1));
        assert_eq!(attrs.index_of("", "b"), None);
        assert!(attrs.value_ns("urn:x", "b").is_some_and(|v| *v == "v"));
    }

    #[test]
    fn test_clear_keeps_order_for_next_element() {
        let mut attrs = sample();
        attrs.clear();
        assert!(attrs.is_empty());

        attrs.add_attribute_with_qname(
            Arc::from(""),
            Arc::from("z"),
            Arc::from("z"),
            Arc::from("CDATA"),
            AttributeValue::Text(Arc::from("1")),
        );
        attrs.push(Attribute::new("", "a", "a", "CDATA", "2"));
        let names: Vec<_> = attrs.iter().map(|a| &*a.local_name).collect();
        assert_eq!(names, vec!["z", "a"]);
    }

    #[test]
    fn test_object_value_has_no_text() {
        let value = AttributeValue::Object(Opaque::new(1.5f64));
        assert_eq!(value.as_str(), None);
        assert!(value != "1.5");
    }
}
