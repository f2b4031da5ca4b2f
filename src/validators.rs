use crate::core::{FieldValue, FormModel};
use regex::Regex;
use std::sync::{Arc, LazyLock};

pub const REQUIRED_MESSAGE: &str = "This field is required";
pub const EMAIL_MESSAGE: &str = "Please enter a valid email address";
pub const ACCEPT_MESSAGE: &str = "You must accept this to continue";

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern must compile")
});

pub type CustomCheck<M> = Arc<dyn Fn(FieldValue<'_>, &M) -> Option<String> + Send + Sync>;

/// A single declared constraint on a field. Format rules pass on blank input
/// so that emptiness is reported once, by `Required`.
pub enum Rule<M: FormModel> {
    Required {
        message: String,
    },
    Accepted {
        message: String,
    },
    Email {
        message: String,
    },
    Pattern {
        regex: Regex,
        strip_whitespace: bool,
        message: String,
    },
    MinLength {
        min: usize,
        message: String,
    },
    MaxLength {
        max: usize,
        message: String,
    },
    Range {
        min: Option<f64>,
        max: Option<f64>,
        message: String,
    },
    Matches {
        other: M::Field,
        message: String,
    },
    Custom(CustomCheck<M>),
}

impl<M: FormModel> Clone for Rule<M> {
    fn clone(&self) -> Self {
        match self {
            Self::Required { message } => Self::Required {
                message: message.clone(),
            },
            Self::Accepted { message } => Self::Accepted {
                message: message.clone(),
            },
            Self::Email { message } => Self::Email {
                message: message.clone(),
            },
            Self::Pattern {
                regex,
                strip_whitespace,
                message,
            } => Self::Pattern {
                regex: regex.clone(),
                strip_whitespace: *strip_whitespace,
                message: message.clone(),
            },
            Self::MinLength { min, message } => Self::MinLength {
                min: *min,
                message: message.clone(),
            },
            Self::MaxLength { max, message } => Self::MaxLength {
                max: *max,
                message: message.clone(),
            },
            Self::Range { min, max, message } => Self::Range {
                min: *min,
                max: *max,
                message: message.clone(),
            },
            Self::Matches { other, message } => Self::Matches {
                other: other.clone(),
                message: message.clone(),
            },
            Self::Custom(check) => Self::Custom(Arc::clone(check)),
        }
    }
}

impl<M: FormModel> Rule<M> {
    pub fn required() -> Self {
        Self::Required {
            message: REQUIRED_MESSAGE.to_string(),
        }
    }

    pub fn accepted() -> Self {
        Self::Accepted {
            message: ACCEPT_MESSAGE.to_string(),
        }
    }

    pub fn email() -> Self {
        Self::Email {
            message: EMAIL_MESSAGE.to_string(),
        }
    }

    pub fn pattern(regex: Regex, message: impl Into<String>) -> Self {
        Self::Pattern {
            regex,
            strip_whitespace: false,
            message: message.into(),
        }
    }

    /// Like `pattern`, but whitespace is removed before matching
    /// (`4242 4242 4242 4242` checks as `4242424242424242`).
    pub fn stripped_pattern(regex: Regex, message: impl Into<String>) -> Self {
        Self::Pattern {
            regex,
            strip_whitespace: true,
            message: message.into(),
        }
    }

    pub fn min_length(min: usize, message: impl Into<String>) -> Self {
        Self::MinLength {
            min,
            message: message.into(),
        }
    }

    pub fn max_length(max: usize, message: impl Into<String>) -> Self {
        Self::MaxLength {
            max,
            message: message.into(),
        }
    }

    pub fn range(min: Option<f64>, max: Option<f64>, message: impl Into<String>) -> Self {
        Self::Range {
            min,
            max,
            message: message.into(),
        }
    }

    pub fn matches(other: M::Field, message: impl Into<String>) -> Self {
        Self::Matches {
            other,
            message: message.into(),
        }
    }

    pub fn custom(
        check: impl Fn(FieldValue<'_>, &M) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        Self::Custom(Arc::new(check))
    }

    pub fn with_message(self, message: impl Into<String>) -> Self {
        let message = message.into();
        match self {
            Self::Required { .. } => Self::Required { message },
            Self::Accepted { .. } => Self::Accepted { message },
            Self::Email { .. } => Self::Email { message },
            Self::Pattern {
                regex,
                strip_whitespace,
                ..
            } => Self::Pattern {
                regex,
                strip_whitespace,
                message,
            },
            Self::MinLength { min, .. } => Self::MinLength { min, message },
            Self::MaxLength { max, .. } => Self::MaxLength { max, message },
            Self::Range { min, max, .. } => Self::Range { min, max, message },
            Self::Matches { other, .. } => Self::Matches { other, message },
            Self::Custom(check) => Self::Custom(check),
        }
    }
}

/// Checks `value` against `rule`. `form` is the full snapshot, consulted only
/// by cross-field and custom rules. Pure; safe to call on every keystroke.
pub fn validate<M: FormModel>(value: FieldValue<'_>, rule: &Rule<M>, form: &M) -> Option<String> {
    let fail = |message: &String| Some(message.clone());

    match rule {
        Rule::Required { message } => value.is_blank().then(|| message.clone()),
        Rule::Accepted { message } => (!value.is_checked()).then(|| message.clone()),
        Rule::Email { message } => match non_blank_text(value) {
            Some(text) if !EMAIL.is_match(text) => fail(message),
            _ => None,
        },
        Rule::Pattern {
            regex,
            strip_whitespace,
            message,
        } => {
            let text = non_blank_text(value)?;
            let matched = if *strip_whitespace {
                let stripped: String = text.chars().filter(|ch| !ch.is_whitespace()).collect();
                regex.is_match(&stripped)
            } else {
                regex.is_match(text)
            };
            (!matched).then(|| message.clone())
        }
        Rule::MinLength { min, message } => {
            let text = non_blank_text(value)?;
            (text.chars().count() < *min).then(|| message.clone())
        }
        Rule::MaxLength { max, message } => {
            let text = value.as_text()?;
            (text.chars().count() > *max).then(|| message.clone())
        }
        Rule::Range { min, max, message } => {
            let text = non_blank_text(value)?;
            let Ok(number) = text.trim().parse::<f64>() else {
                return fail(message);
            };
            let below = min.is_some_and(|min| number < min);
            let above = max.is_some_and(|max| number > max);
            (below || above || number.is_nan()).then(|| message.clone())
        }
        Rule::Matches { other, message } => {
            (!value.matches(&form.field(other))).then(|| message.clone())
        }
        Rule::Custom(check) => check(value, form),
    }
}

/// Runs `rules` in order and returns the first failure.
pub fn run_rules<M: FormModel>(value: FieldValue<'_>, rules: &[Rule<M>], form: &M) -> Option<String> {
    rules.iter().find_map(|rule| validate(value, rule, form))
}

fn non_blank_text(value: FieldValue<'_>) -> Option<&str> {
    value.as_text().filter(|text| !text.is_empty())
}
