//! Declarative flows for `FormData`, loaded from YAML.
//!
//! ```yaml
//! initial:
//!   paymentMethod: credit
//!   emergencyContact: {}
//! steps:
//!   - id: payment
//!     title: Payment
//!     fields:
//!       - path: paymentMethod
//!         rules: [{ kind: required }]
//!       - path: cardNumber
//!         when: { field: paymentMethod, equals: credit }
//!         rules:
//!           - kind: required
//!           - kind: pattern
//!             regex: '^\d{13,19}$'
//!             strip_whitespace: true
//!             message: Please enter a valid card number
//! ```

use crate::core::{FieldPath, FormData, FormModel, Value};
use crate::error::{ConfigError, WizardError};
use crate::state::flow::Flow;
use crate::state::step::{FieldSpec, StepDefinition};
use crate::validators::Rule;
use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FlowConfig {
    #[serde(default)]
    pub initial: IndexMap<String, Value>,
    pub steps: Vec<StepConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepConfig {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub when: Option<Condition>,
    #[serde(default)]
    pub fields: Vec<FieldConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    pub path: String,
    #[serde(default)]
    pub when: Option<Condition>,
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleConfig {
    Required {
        #[serde(default)]
        message: Option<String>,
    },
    Accepted {
        #[serde(default)]
        message: Option<String>,
    },
    Email {
        #[serde(default)]
        message: Option<String>,
    },
    Pattern {
        regex: String,
        #[serde(default)]
        strip_whitespace: bool,
        #[serde(default)]
        message: Option<String>,
    },
    MinLength {
        min: usize,
        #[serde(default)]
        message: Option<String>,
    },
    MaxLength {
        max: usize,
        #[serde(default)]
        message: Option<String>,
    },
    Range {
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
        #[serde(default)]
        message: Option<String>,
    },
    Matches {
        field: String,
        #[serde(default)]
        message: Option<String>,
    },
}

/// `{ field, equals }` holds when the field currently has that value;
/// `{ field, not_equals }` when it does not. Both may be given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub field: String,
    #[serde(default)]
    pub equals: Option<Value>,
    #[serde(default)]
    pub not_equals: Option<Value>,
}

impl Condition {
    fn compile(&self) -> Result<impl Fn(&FormData) -> bool + Send + Sync + 'static, ConfigError> {
        let path = FieldPath::parse(&self.field).map_err(WizardError::from)?;
        let equals = self.equals.clone();
        let not_equals = self.not_equals.clone();

        Ok(move |form: &FormData| {
            let current = form.field(&path);
            equals
                .as_ref()
                .is_none_or(|expected| current.matches_value(expected))
                && not_equals
                    .as_ref()
                    .is_none_or(|excluded| !current.matches_value(excluded))
        })
    }
}

impl FlowConfig {
    pub fn from_yaml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(input)?)
    }

    /// Compiles every step and returns the flow together with the starting
    /// form. Paths, regexes and step structure are all checked here, so a
    /// flow that builds never fails on a malformed declaration later.
    pub fn build(&self) -> Result<(Flow<FormData>, FormData), ConfigError> {
        let steps = self
            .steps
            .iter()
            .map(StepConfig::compile)
            .collect::<Result<Vec<_>, _>>()?;
        let flow = Flow::new(steps)?;

        let mut form = FormData::new();
        for (name, value) in &self.initial {
            let path = FieldPath::parse(name).map_err(WizardError::from)?;
            match value {
                Value::Group(members) if path.group().is_none() => {
                    form = form.with_group(name.clone());
                    for (member, value) in members {
                        let nested = FieldPath::parse(&format!("{name}.{member}"))
                            .map_err(WizardError::from)?;
                        form.set(&nested, value.clone())?;
                    }
                }
                _ => form.set(&path, value.clone())?,
            }
        }

        debug!(
            steps = flow.len(),
            initial = self.initial.len(),
            "loaded flow config"
        );
        Ok((flow, form))
    }
}

impl StepConfig {
    fn compile(&self) -> Result<StepDefinition<FormData>, ConfigError> {
        if self.fields.is_empty() {
            return Err(ConfigError::EmptyStep {
                step: self.id.clone(),
            });
        }

        let title = self.title.clone().unwrap_or_else(|| self.id.clone());
        let mut builder = StepDefinition::<FormData>::builder(self.id.clone(), title);
        for field in &self.fields {
            builder = builder.field_spec(field.compile()?);
        }
        if let Some(when) = &self.when {
            builder = builder.applies_when(when.compile()?);
        }
        Ok(builder.build())
    }
}

impl FieldConfig {
    fn compile(&self) -> Result<FieldSpec<FormData>, ConfigError> {
        let field = FieldPath::parse(&self.path).map_err(WizardError::from)?;
        let rules = self
            .rules
            .iter()
            .map(|rule| rule.compile(&self.path))
            .collect::<Result<Vec<_>, _>>()?;

        let mut spec = FieldSpec::new(field, rules);
        if let Some(when) = &self.when {
            spec.when = Some(Arc::new(when.compile()?));
        }
        Ok(spec)
    }
}

impl RuleConfig {
    fn compile(&self, field: &str) -> Result<Rule<FormData>, ConfigError> {
        let (rule, message) = match self {
            Self::Required { message } => (Rule::required(), message),
            Self::Accepted { message } => (Rule::accepted(), message),
            Self::Email { message } => (Rule::email(), message),
            Self::Pattern {
                regex,
                strip_whitespace,
                message,
            } => {
                let regex = Regex::new(regex).map_err(|source| ConfigError::Pattern {
                    field: field.to_string(),
                    source,
                })?;
                let rule = if *strip_whitespace {
                    Rule::stripped_pattern(regex, "Invalid format")
                } else {
                    Rule::pattern(regex, "Invalid format")
                };
                (rule, message)
            }
            Self::MinLength { min, message } => (
                Rule::min_length(*min, format!("Must be at least {min} characters")),
                message,
            ),
            Self::MaxLength { max, message } => (
                Rule::max_length(*max, format!("Must be at most {max} characters")),
                message,
            ),
            Self::Range { min, max, message } => {
                (Rule::range(*min, *max, "Value is out of range"), message)
            }
            Self::Matches {
                field: other,
                message,
            } => {
                let other = FieldPath::parse(other).map_err(WizardError::from)?;
                (Rule::matches(other, "Values do not match"), message)
            }
        };

        Ok(match message {
            Some(message) => rule.with_message(message.clone()),
            None => rule,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::FlowConfig;
    use crate::core::{FieldPath, Value};
    use crate::error::{ConfigError, WizardError};
    use crate::runtime::{Outcome, Wizard};
    use crate::validators::{EMAIL_MESSAGE, REQUIRED_MESSAGE};

    const REGISTRATION: &str = r#"
initial:
  paymentMethod: credit
  receiveUpdates: true
  emergencyContact: {}
steps:
  - id: details
    title: Your Details
    fields:
      - path: firstName
        rules: [{ kind: required }]
      - path: email
        rules: [{ kind: required }, { kind: email }]
      - path: emergencyContact.phone
        rules: [{ kind: required, message: Emergency phone is required }]
  - id: payment
    title: Payment
    when: { field: paymentMethod, not_equals: paypal }
    fields:
      - path: cardNumber
        rules:
          - kind: required
          - kind: pattern
            regex: '^\d{13,19}$'
            strip_whitespace: true
            message: Please enter a valid card number
  - id: confirmation
    fields:
      - path: acceptTerms
        rules: [{ kind: accepted }]
"#;

    fn path(raw: &str) -> FieldPath {
        FieldPath::parse(raw).expect("path")
    }

    #[test]
    fn builds_flow_and_initial_form() {
        let config = FlowConfig::from_yaml_str(REGISTRATION).expect("yaml");
        let (flow, form) = config.build().expect("build");
        assert_eq!(flow.len(), 3);
        assert_eq!(flow.steps()[2].title, "confirmation");
        assert_eq!(
            form.get(&path("paymentMethod")).and_then(Value::as_text),
            Some("credit")
        );
        assert!(
            form.get(&path("emergencyContact"))
                .is_some_and(Value::is_group)
        );
    }

    #[test]
    fn declared_rules_and_messages_apply() {
        let (flow, form) = FlowConfig::from_yaml_str(REGISTRATION)
            .expect("yaml")
            .build()
            .expect("build");
        let mut wizard = Wizard::with_form(flow, form);
        wizard.update_field(&path("email"), "nope").expect("write");

        assert!(wizard.advance().expect("advance").is_rejected());
        assert_eq!(wizard.error(&path("firstName")), Some(REQUIRED_MESSAGE));
        assert_eq!(wizard.error(&path("email")), Some(EMAIL_MESSAGE));
        assert_eq!(
            wizard.error(&path("emergencyContact.phone")),
            Some("Emergency phone is required")
        );
    }

    #[test]
    fn step_condition_skips_payment() {
        let (flow, form) = FlowConfig::from_yaml_str(REGISTRATION)
            .expect("yaml")
            .build()
            .expect("build");
        let mut wizard = Wizard::with_form(flow, form);
        wizard
            .update_fields([
                (path("firstName"), Value::text("Jane")),
                (path("email"), Value::text("jane@doe.com")),
                (path("emergencyContact.phone"), Value::text("555-0100")),
                (path("paymentMethod"), Value::text("paypal")),
            ])
            .expect("writes");
        assert_eq!(
            wizard.advance().expect("advance"),
            Outcome::Moved { from: 0, to: 2 }
        );
    }

    #[test]
    fn initial_groups_hold_one_level_only() {
        let config = FlowConfig::from_yaml_str(
            "initial: { emergencyContact: { name: Ann } }\nsteps: [{ id: a, fields: [{ path: x }] }]",
        )
        .expect("yaml");
        let (_, form) = config.build().expect("build");
        assert_eq!(
            form.get(&path("emergencyContact.name")).and_then(Value::as_text),
            Some("Ann")
        );

        let nested = FlowConfig::from_yaml_str(
            "initial: { emergencyContact: { a: { b: x } } }\nsteps: [{ id: a, fields: [{ path: x }] }]",
        )
        .expect("yaml")
        .build()
        .err()
        .expect("nested group");
        assert!(matches!(
            nested,
            ConfigError::Wizard(WizardError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn bad_regex_names_the_field() {
        let yaml = r#"
steps:
  - id: a
    fields:
      - path: zip
        rules: [{ kind: pattern, regex: '([0-9' }]
"#;
        let err = FlowConfig::from_yaml_str(yaml)
            .expect("yaml")
            .build()
            .err()
            .expect("invalid regex");
        assert!(matches!(err, ConfigError::Pattern { ref field, .. } if field == "zip"));
    }

    #[test]
    fn structural_errors_are_reported() {
        let empty_step = FlowConfig::from_yaml_str("steps: [{ id: a }]")
            .expect("yaml")
            .build()
            .err()
            .expect("empty step");
        assert!(matches!(empty_step, ConfigError::EmptyStep { ref step } if step == "a"));

        let bad_path = FlowConfig::from_yaml_str("steps: [{ id: a, fields: [{ path: 'a..b' }] }]")
            .expect("yaml")
            .build()
            .err()
            .expect("bad path");
        assert!(matches!(
            bad_path,
            ConfigError::Wizard(WizardError::InvalidPath(_))
        ));

        assert!(matches!(
            FlowConfig::from_yaml_str("steps: [{ id: a, fields: [{ path: x, rules: [{ kind: shout }] }] }]"),
            Err(ConfigError::Yaml(_))
        ));
    }
}
