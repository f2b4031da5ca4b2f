use crate::core::{FieldPath, FieldValue, FormModel, Value};
use crate::error::WizardError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Open, string-keyed form values with at most one level of grouping.
/// Groups must exist before their fields can be written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormData {
    values: IndexMap<String, Value>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_group(mut self, name: impl Into<String>) -> Self {
        self.values.insert(name.into(), Value::empty_group());
        self
    }

    pub fn with_value(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn from_values(values: IndexMap<String, Value>) -> Self {
        Self { values }
    }

    pub fn get(&self, path: &FieldPath) -> Option<&Value> {
        match path.group() {
            None => self.values.get(path.name()),
            Some(group) => self
                .values
                .get(group)
                .and_then(Value::as_group)
                .and_then(|map| map.get(path.name())),
        }
    }

    pub fn get_str(&self, path: &str) -> Result<Option<&Value>, WizardError> {
        let path = FieldPath::parse(path)?;
        Ok(self.get(&path))
    }

    pub fn set(&mut self, path: &FieldPath, value: Value) -> Result<(), WizardError> {
        if value.is_group() {
            return Err(WizardError::TypeMismatch {
                field: path.to_string(),
                expected: "text or boolean",
            });
        }

        let Some(group) = path.group() else {
            if self.values.get(path.name()).is_some_and(Value::is_group) {
                return Err(WizardError::NotAField {
                    path: path.to_string(),
                });
            }
            self.values.insert(path.name().to_string(), value);
            return Ok(());
        };

        let slot = self
            .values
            .get_mut(group)
            .ok_or_else(|| WizardError::UnknownGroup {
                path: path.to_string(),
                group: group.to_string(),
            })?;
        let map = slot.as_group_mut().ok_or_else(|| WizardError::NotAGroup {
            path: path.to_string(),
            group: group.to_string(),
        })?;
        map.insert(path.name().to_string(), value);
        Ok(())
    }

    pub fn set_str(&mut self, path: &str, value: impl Into<Value>) -> Result<(), WizardError> {
        let path = FieldPath::parse(path)?;
        self.set(&path, value.into())
    }

    pub fn values(&self) -> &IndexMap<String, Value> {
        &self.values
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FormModel for FormData {
    type Field = FieldPath;

    fn field(&self, field: &FieldPath) -> FieldValue<'_> {
        FieldValue::from_value(self.get(field))
    }

    fn set_field(&mut self, field: &FieldPath, value: Value) -> Result<(), WizardError> {
        self.set(field, value)
    }
}
