use crate::error::FieldPathError;
use std::fmt;
use std::str::FromStr;

/// A form field address: either a top-level field (`email`) or a field
/// inside a single named group (`emergencyContact.phone`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldPath {
    group: Option<String>,
    name: String,
}

impl FieldPath {
    pub fn top(name: impl Into<String>) -> Self {
        Self {
            group: None,
            name: name.into(),
        }
    }

    pub fn nested(group: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            group: Some(group.into()),
            name: name.into(),
        }
    }

    pub fn parse(input: &str) -> Result<Self, FieldPathError> {
        let raw = input.trim();
        if raw.is_empty() {
            return Err(FieldPathError::new(input, "path is empty"));
        }

        let mut segments = Vec::with_capacity(2);
        for segment in raw.split('.') {
            if segment.is_empty() {
                return Err(FieldPathError::new(raw, "empty segment"));
            }
            if let Some(ch) = segment.chars().find(|ch| !is_key_char(*ch)) {
                return Err(FieldPathError::new(
                    raw,
                    format!("unexpected character '{ch}' in '{segment}'"),
                ));
            }
            segments.push(segment);
        }

        match segments.as_slice() {
            [name] => Ok(Self::top(*name)),
            [group, name] => Ok(Self::nested(*group, *name)),
            _ => Err(FieldPathError::new(
                raw,
                "only one level of grouping is supported",
            )),
        }
    }

    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(group) = &self.group {
            f.write_str(group)?;
            f.write_str(".")?;
        }
        f.write_str(&self.name)
    }
}

impl FromStr for FieldPath {
    type Err = FieldPathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for FieldPath {
    type Error = FieldPathError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

fn is_key_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '-'
}
