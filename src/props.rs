//! Declarative child descriptions.
//!
//! A [`Descriptor`] names a component kind and the props to build it with.
//! Components return a fresh list of descriptors on every update pass; the
//! reconciler compares them with what is mounted.

use std::collections::BTreeMap;

use crate::error::ConfigurationError;

#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
    Bool(bool),
    Int(i64),
    Text(String),
    List(Vec<PropValue>),
    Child(Box<Descriptor>),
}

impl From<bool> for PropValue {
    fn from(v: bool) -> Self {
        PropValue::Bool(v)
    }
}

impl From<i64> for PropValue {
    fn from(v: i64) -> Self {
        PropValue::Int(v)
    }
}

impl From<i32> for PropValue {
    fn from(v: i32) -> Self {
        PropValue::Int(i64::from(v))
    }
}

impl From<u32> for PropValue {
    fn from(v: u32) -> Self {
        PropValue::Int(i64::from(v))
    }
}

impl From<&str> for PropValue {
    fn from(v: &str) -> Self {
        PropValue::Text(v.to_string())
    }
}

impl From<String> for PropValue {
    fn from(v: String) -> Self {
        PropValue::Text(v)
    }
}

impl From<Descriptor> for PropValue {
    fn from(v: Descriptor) -> Self {
        PropValue::Child(Box::new(v))
    }
}

impl From<Vec<Descriptor>> for PropValue {
    fn from(v: Vec<Descriptor>) -> Self {
        PropValue::List(v.into_iter().map(PropValue::from).collect())
    }
}

impl From<Vec<i64>> for PropValue {
    fn from(v: Vec<i64>) -> Self {
        PropValue::List(v.into_iter().map(PropValue::Int).collect())
    }
}

/// Named props of one descriptor.
///
/// The typed getters need the component kind only to produce a useful
/// error message.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Props {
    values: BTreeMap<String, PropValue>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<PropValue>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn invalid(kind: &str, prop: &str, expected: &'static str) -> ConfigurationError {
        ConfigurationError::InvalidProp {
            kind: kind.to_string(),
            prop: prop.to_string(),
            expected,
        }
    }

    fn missing(kind: &str, prop: &str) -> ConfigurationError {
        ConfigurationError::MissingProp {
            kind: kind.to_string(),
            prop: prop.to_string(),
        }
    }

    pub fn text(&self, kind: &str, name: &str) -> Result<&str, ConfigurationError> {
        match self.get(name) {
            Some(PropValue::Text(s)) => Ok(s),
            Some(_) => Err(Self::invalid(kind, name, "text")),
            None => Err(Self::missing(kind, name)),
        }
    }

    pub fn text_or<'a>(
        &'a self,
        kind: &str,
        name: &str,
        default: &'a str,
    ) -> Result<&'a str, ConfigurationError> {
        match self.get(name) {
            None => Ok(default),
            Some(_) => self.text(kind, name),
        }
    }

    pub fn int_or(&self, kind: &str, name: &str, default: i64) -> Result<i64, ConfigurationError> {
        match self.get(name) {
            Some(PropValue::Int(v)) => Ok(*v),
            Some(_) => Err(Self::invalid(kind, name, "an integer")),
            None => Ok(default),
        }
    }

    /// Integer prop that fits an `i32`, such as a coordinate.
    pub fn i32_or(&self, kind: &str, name: &str, default: i32) -> Result<i32, ConfigurationError> {
        let value = self.int_or(kind, name, i64::from(default))?;
        i32::try_from(value).map_err(|_| Self::invalid(kind, name, "a 32-bit integer"))
    }

    /// Non-negative integer prop, converted to `u32`.
    pub fn u32_or(&self, kind: &str, name: &str, default: u32) -> Result<u32, ConfigurationError> {
        let value = self.int_or(kind, name, i64::from(default))?;
        u32::try_from(value).map_err(|_| Self::invalid(kind, name, "a non-negative integer"))
    }

    pub fn bool_or(&self, kind: &str, name: &str, default: bool) -> Result<bool, ConfigurationError> {
        match self.get(name) {
            Some(PropValue::Bool(v)) => Ok(*v),
            Some(_) => Err(Self::invalid(kind, name, "a boolean")),
            None => Ok(default),
        }
    }

    pub fn child(&self, kind: &str, name: &str) -> Result<Option<&Descriptor>, ConfigurationError> {
        match self.get(name) {
            Some(PropValue::Child(d)) => Ok(Some(d)),
            Some(_) => Err(Self::invalid(kind, name, "a component descriptor")),
            None => Ok(None),
        }
    }

    /// A list of descriptors; a missing prop is an empty list.
    pub fn children(&self, kind: &str, name: &str) -> Result<Vec<Descriptor>, ConfigurationError> {
        match self.get(name) {
            None => Ok(Vec::new()),
            Some(PropValue::List(items)) => items
                .iter()
                .map(|item| match item {
                    PropValue::Child(d) => Ok((**d).clone()),
                    _ => Err(Self::invalid(kind, name, "a list of component descriptors")),
                })
                .collect(),
            Some(_) => Err(Self::invalid(kind, name, "a list of component descriptors")),
        }
    }

    /// A list of non-negative integers; a missing prop is an empty list.
    pub fn u32_list(&self, kind: &str, name: &str) -> Result<Vec<u32>, ConfigurationError> {
        match self.get(name) {
            None => Ok(Vec::new()),
            Some(PropValue::List(items)) => items
                .iter()
                .map(|item| match item {
                    PropValue::Int(v) => u32::try_from(*v)
                        .map_err(|_| Self::invalid(kind, name, "a list of non-negative integers")),
                    _ => Err(Self::invalid(kind, name, "a list of non-negative integers")),
                })
                .collect(),
            Some(_) => Err(Self::invalid(kind, name, "a list of non-negative integers")),
        }
    }
}

/// A (kind, props) pair describing one desired child.
#[derive(Debug, Clone, PartialEq)]
pub struct Descriptor {
    pub kind: String,
    pub props: Props,
}

impl Descriptor {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            props: Props::new(),
        }
    }

    /// Builder-style prop setter.
    ///
    /// ```ignore
    /// Descriptor::new("text").prop("text", "Settings").prop("size", 14)
    /// ```
    pub fn prop(mut self, name: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.props.set(name, value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_getters() {
        let d = Descriptor::new("text")
            .prop("text", "Hello")
            .prop("size", 14)
            .prop("bold", true);
        assert_eq!(d.props.text("text", "text").unwrap(), "Hello");
        assert_eq!(d.props.u32_or("text", "size", 10).unwrap(), 14);
        assert!(d.props.bool_or("text", "bold", false).unwrap());
        assert_eq!(d.props.u32_or("text", "missing", 7).unwrap(), 7);
    }

    #[test]
    fn test_missing_and_invalid_props() {
        let d = Descriptor::new("text").prop("size", "big");
        assert!(matches!(
            d.props.text("text", "text"),
            Err(ConfigurationError::MissingProp { .. })
        ));
        assert!(matches!(
            d.props.int_or("text", "size", 12),
            Err(ConfigurationError::InvalidProp { .. })
        ));
        let negative = Descriptor::new("row").prop("size", -3);
        assert!(negative.props.u32_or("row", "size", 0).is_err());
    }

    #[test]
    fn test_coordinates_must_fit_i32() {
        let d = Descriptor::new("text").prop("x", -5).prop("y", 1i64 << 32);
        assert_eq!(d.props.i32_or("text", "x", 0).unwrap(), -5);
        assert_eq!(d.props.i32_or("text", "missing", 3).unwrap(), 3);
        assert!(matches!(
            d.props.i32_or("text", "y", 0),
            Err(ConfigurationError::InvalidProp { expected: "a 32-bit integer", .. })
        ));
        assert!(Descriptor::new("text")
            .prop("y", i64::from(i32::MIN) - 1)
            .props
            .i32_or("text", "y", 0)
            .is_err());
    }

    #[test]
    fn test_child_lists() {
        let rows = vec![Descriptor::new("a"), Descriptor::new("b")];
        let d = Descriptor::new("list").prop("rows", rows.clone());
        assert_eq!(d.props.children("list", "rows").unwrap(), rows);
        assert!(d.props.children("list", "other").unwrap().is_empty());

        let bad = Descriptor::new("list").prop("rows", vec![1i64, 2]);
        assert!(bad.props.children("list", "rows").is_err());
        assert_eq!(bad.props.u32_list("list", "rows").unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_descriptor_equality_includes_props() {
        let a = Descriptor::new("text").prop("text", "a");
        let b = Descriptor::new("text").prop("text", "b");
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }
}
