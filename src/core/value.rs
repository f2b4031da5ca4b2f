use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    None,
    Bool(bool),
    Text(String),
    Group(IndexMap<String, Value>),
}

impl Value {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn empty_group() -> Self {
        Self::Group(IndexMap::new())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::None => true,
            Self::Text(v) => v.is_empty(),
            Self::Group(v) => v.is_empty(),
            Self::Bool(_) => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Self::Group(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_group_mut(&mut self) -> Option<&mut IndexMap<String, Value>> {
        match self {
            Self::Group(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Self::Group(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::None => "empty",
            Self::Bool(_) => "boolean",
            Self::Text(_) => "text",
            Self::Group(_) => "group",
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Borrowed view of a single field, as the validators see it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Absent,
    Text(&'a str),
    Flag(bool),
}

impl<'a> FieldValue<'a> {
    pub fn from_value(value: Option<&'a Value>) -> Self {
        match value {
            Some(Value::Text(v)) => Self::Text(v.as_str()),
            Some(Value::Bool(v)) => Self::Flag(*v),
            _ => Self::Absent,
        }
    }

    /// Empty text, an unset value and an unchecked box all count as blank.
    /// Whitespace is text; format rules report it.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Absent => true,
            Self::Text(v) => v.is_empty(),
            Self::Flag(v) => !*v,
        }
    }

    pub fn as_text(&self) -> Option<&'a str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_checked(&self) -> bool {
        matches!(self, Self::Flag(true))
    }

    /// Loose equality used by cross-field rules and conditions: an absent
    /// value equals empty text.
    pub fn matches(&self, other: &FieldValue<'_>) -> bool {
        match (self, other) {
            (FieldValue::Flag(a), FieldValue::Flag(b)) => a == b,
            (FieldValue::Flag(_), _) | (_, FieldValue::Flag(_)) => false,
            (a, b) => a.as_text().unwrap_or("") == b.as_text().unwrap_or(""),
        }
    }

    pub fn matches_value(&self, other: &Value) -> bool {
        self.matches(&FieldValue::from_value(Some(other)))
    }
}

#[cfg(test)]
mod tests {
    use super::{FieldValue, Value};
    use indexmap::IndexMap;

    #[test]
    fn deserializes_nested_group_from_json() {
        let value: Value =
            serde_json::from_str(r#"{"name":"Ana","contact":{"phone":"123"},"ok":true}"#)
                .expect("value should parse");
        let Value::Group(map) = value else {
            panic!("expected group");
        };
        assert_eq!(map.get("name").and_then(Value::as_text), Some("Ana"));
        assert_eq!(map.get("ok").and_then(Value::as_bool), Some(true));
        assert!(map.get("contact").is_some_and(Value::is_group));
    }

    #[test]
    fn serializes_none_as_null() {
        let mut map = IndexMap::new();
        map.insert("a".to_string(), Value::None);
        let json = serde_json::to_string(&Value::Group(map)).expect("serialize");
        assert_eq!(json, r#"{"a":null}"#);
    }

    #[test]
    fn blank_covers_empty_and_unchecked() {
        assert!(FieldValue::Absent.is_blank());
        assert!(FieldValue::Text("").is_blank());
        assert!(!FieldValue::Text("   ").is_blank());
        assert!(FieldValue::Flag(false).is_blank());
        assert!(!FieldValue::Text("x").is_blank());
        assert!(!FieldValue::Flag(true).is_blank());
    }

    #[test]
    fn absent_matches_empty_text_only() {
        assert!(FieldValue::Absent.matches(&FieldValue::Text("")));
        assert!(!FieldValue::Absent.matches(&FieldValue::Text("a")));
        assert!(!FieldValue::Flag(false).matches(&FieldValue::Absent));
    }

    #[test]
    fn matches_compares_views_with_unrelated_lifetimes() {
        let stored = Value::text("credit");
        let field = FieldValue::from_value(Some(&stored));
        let checked = {
            let expected = String::from("credit");
            let flag = Value::Bool(true);
            (
                field.matches(&FieldValue::Text(expected.as_str())),
                field.matches(&FieldValue::from_value(Some(&flag))),
            )
        };
        assert_eq!(checked, (true, false));
        assert!(FieldValue::Flag(true).matches_value(&Value::Bool(true)));
        assert!(!FieldValue::Text("credit").matches_value(&Value::text("paypal")));
    }
}
