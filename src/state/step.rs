use crate::core::FormModel;
use crate::state::validation::FieldErrors;
use crate::validators::{Rule, run_rules};
use std::sync::Arc;

pub type Predicate<M> = Arc<dyn Fn(&M) -> bool + Send + Sync>;

/// Cross-field check run once per step validation. Returns `(field, message)`
/// pairs for every violation it finds.
pub type StepValidator<M> =
    Box<dyn Fn(&M) -> Vec<(<M as FormModel>::Field, String)> + Send + Sync>;

pub struct FieldSpec<M: FormModel> {
    pub field: M::Field,
    pub rules: Vec<Rule<M>>,
    pub when: Option<Predicate<M>>,
}

impl<M: FormModel> FieldSpec<M> {
    pub fn new(field: M::Field, rules: Vec<Rule<M>>) -> Self {
        Self {
            field,
            rules,
            when: None,
        }
    }

    /// Fields whose `when` predicate is false are skipped during validation.
    pub fn is_active(&self, form: &M) -> bool {
        self.when.as_ref().is_none_or(|when| when(form))
    }
}

pub struct StepDefinition<M: FormModel> {
    pub id: String,
    pub title: String,
    pub fields: Vec<FieldSpec<M>>,
    pub applies_when: Option<Predicate<M>>,
    pub validators: Vec<StepValidator<M>>,
}

impl<M: FormModel> StepDefinition<M> {
    pub fn builder(id: impl Into<String>, title: impl Into<String>) -> StepBuilder<M> {
        StepBuilder::new(id, title)
    }

    pub fn field_ids(&self) -> impl Iterator<Item = &M::Field> {
        self.fields.iter().map(|spec| &spec.field)
    }

    pub fn owns(&self, field: &M::Field) -> bool {
        self.fields.iter().any(|spec| &spec.field == field)
    }

    pub fn is_applicable(&self, form: &M) -> bool {
        self.applies_when.as_ref().is_none_or(|when| when(form))
    }

    /// Complete error map for this step only; empty means the step is valid.
    /// An inapplicable step never reports errors.
    pub fn validate_step(&self, form: &M) -> FieldErrors<M::Field> {
        let mut errors = FieldErrors::new();
        if !self.is_applicable(form) {
            return errors;
        }

        for spec in self.fields.iter().filter(|spec| spec.is_active(form)) {
            if let Some(error) = run_rules(form.field(&spec.field), &spec.rules, form) {
                errors.insert(spec.field.clone(), error);
            }
        }

        for validator in &self.validators {
            errors.extend(validator(form));
        }

        errors
    }
}

pub struct StepBuilder<M: FormModel> {
    id: String,
    title: String,
    fields: Vec<FieldSpec<M>>,
    applies_when: Option<Predicate<M>>,
    validators: Vec<StepValidator<M>>,
}

impl<M: FormModel> StepBuilder<M> {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            fields: Vec::new(),
            applies_when: None,
            validators: Vec::new(),
        }
    }

    pub fn field(mut self, field: M::Field, rules: impl IntoIterator<Item = Rule<M>>) -> Self {
        self.fields
            .push(FieldSpec::new(field, rules.into_iter().collect()));
        self
    }

    pub fn field_when(
        mut self,
        field: M::Field,
        when: impl Fn(&M) -> bool + Send + Sync + 'static,
        rules: impl IntoIterator<Item = Rule<M>>,
    ) -> Self {
        self.fields.push(FieldSpec {
            field,
            rules: rules.into_iter().collect(),
            when: Some(Arc::new(when)),
        });
        self
    }

    pub fn field_spec(mut self, spec: FieldSpec<M>) -> Self {
        self.fields.push(spec);
        self
    }

    pub fn require(self, field: M::Field) -> Self {
        self.field(field, [Rule::required()])
    }

    pub fn applies_when(mut self, when: impl Fn(&M) -> bool + Send + Sync + 'static) -> Self {
        self.applies_when = Some(Arc::new(when));
        self
    }

    pub fn validate(
        mut self,
        f: impl Fn(&M) -> Vec<(M::Field, String)> + Send + Sync + 'static,
    ) -> Self {
        self.validators.push(Box::new(f));
        self
    }

    pub fn build(self) -> StepDefinition<M> {
        StepDefinition {
            id: self.id,
            title: self.title,
            fields: self.fields,
            applies_when: self.applies_when,
            validators: self.validators,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::StepDefinition;
    use crate::core::{FieldPath, FormData};
    use crate::validators::{REQUIRED_MESSAGE, Rule};

    fn path(raw: &str) -> FieldPath {
        FieldPath::parse(raw).expect("path")
    }

    fn payment_step() -> StepDefinition<FormData> {
        StepDefinition::<FormData>::builder("payment", "Payment")
            .require(path("paymentMethod"))
            .field_when(
                path("cardNumber"),
                |form: &FormData| {
                    form.get(&FieldPath::top("paymentMethod"))
                        .and_then(|v| v.as_text())
                        == Some("credit")
                },
                [Rule::required()],
            )
            .build()
    }

    #[test]
    fn inactive_fields_are_not_checked() {
        let step = payment_step();
        let mut form = FormData::new();
        form.set_str("paymentMethod", "paypal").expect("write");
        assert!(step.validate_step(&form).is_empty());

        form.set_str("paymentMethod", "credit").expect("write");
        let errors = step.validate_step(&form);
        assert_eq!(errors.get(&path("cardNumber")), Some(REQUIRED_MESSAGE));
    }

    #[test]
    fn cross_field_validator_runs_once_and_keeps_field_errors() {
        let step = StepDefinition::<FormData>::builder("account", "Account")
            .require(path("password"))
            .require(path("confirmPassword"))
            .validate(|form: &FormData| {
                let a = form.get(&FieldPath::top("password"));
                let b = form.get(&FieldPath::top("confirmPassword"));
                if a != b {
                    vec![(FieldPath::top("confirmPassword"), "Passwords do not match".into())]
                } else {
                    vec![]
                }
            })
            .build();

        let mut form = FormData::new();
        form.set_str("password", "secret1").expect("write");
        let errors = step.validate_step(&form);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get(&path("confirmPassword")), Some(REQUIRED_MESSAGE));

        form.set_str("confirmPassword", "secret2").expect("write");
        let errors = step.validate_step(&form);
        assert_eq!(
            errors.get(&path("confirmPassword")),
            Some("Passwords do not match")
        );
    }

    #[test]
    fn inapplicable_step_reports_nothing() {
        let step = StepDefinition::<FormData>::builder("extra", "Extra")
            .require(path("notes"))
            .applies_when(|_| false)
            .build();
        assert!(step.validate_step(&FormData::new()).is_empty());
    }
}
