//! The event-registration flow: "Your Details", "Payment", "Confirmation".
//!
//! The form is a plain record, so every field address is an enum variant and
//! cannot be misspelled. Serialized output keeps the flat camelCase shape
//! hosts already post to their backends.

use crate::core::{FieldValue, FormModel, Value};
use crate::error::{FieldPathError, WizardError};
use crate::runtime::Wizard;
use crate::state::flow::Flow;
use crate::state::step::StepDefinition;
use crate::validators::Rule;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

pub const CARD_NUMBER_MESSAGE: &str = "Please enter a valid card number";
pub const EXPIRY_MESSAGE: &str = "Please use MM/YY format";
pub const CVV_MESSAGE: &str = "Please enter a valid CVV";

static CARD_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{13,19}$").expect("card pattern must compile"));
static EXPIRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(0[1-9]|1[0-2])/([0-9]{2})$").expect("expiry pattern must compile")
});
static CVV: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{3,4}$").expect("cvv pattern must compile"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Credit,
    Paypal,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Credit => "credit",
            Self::Paypal => "paypal",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "credit" => Some(Self::Credit),
            "paypal" => Some(Self::Paypal),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyContact {
    pub name: String,
    pub phone: String,
    pub relation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    pub payment_method: PaymentMethod,
    pub card_number: String,
    pub cardholder_name: String,
    pub expiry_date: String,
    pub cvv: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agreements {
    pub accept_terms: bool,
    pub accept_privacy: bool,
    pub accept_waiver: bool,
    pub receive_updates: bool,
}

impl Default for Agreements {
    fn default() -> Self {
        Self {
            accept_terms: false,
            accept_privacy: false,
            accept_waiver: false,
            receive_updates: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: String,
    pub gender: String,
    pub address: String,
    pub city: String,
    pub country: String,
    pub emergency_contact: EmergencyContact,
    #[serde(flatten)]
    pub payment: PaymentDetails,
    #[serde(flatten)]
    pub agreements: Agreements,
}

impl RegistrationForm {
    pub fn pays_by_card(&self) -> bool {
        self.payment.payment_method == PaymentMethod::Credit
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistrationField {
    FirstName,
    LastName,
    Email,
    Phone,
    DateOfBirth,
    Gender,
    Address,
    City,
    Country,
    EmergencyContactName,
    EmergencyContactPhone,
    EmergencyContactRelation,
    PaymentMethod,
    CardNumber,
    CardholderName,
    ExpiryDate,
    Cvv,
    AcceptTerms,
    AcceptPrivacy,
    AcceptWaiver,
    ReceiveUpdates,
}

impl RegistrationField {
    pub const ALL: [RegistrationField; 21] = [
        Self::FirstName,
        Self::LastName,
        Self::Email,
        Self::Phone,
        Self::DateOfBirth,
        Self::Gender,
        Self::Address,
        Self::City,
        Self::Country,
        Self::EmergencyContactName,
        Self::EmergencyContactPhone,
        Self::EmergencyContactRelation,
        Self::PaymentMethod,
        Self::CardNumber,
        Self::CardholderName,
        Self::ExpiryDate,
        Self::Cvv,
        Self::AcceptTerms,
        Self::AcceptPrivacy,
        Self::AcceptWaiver,
        Self::ReceiveUpdates,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::DateOfBirth => "dateOfBirth",
            Self::Gender => "gender",
            Self::Address => "address",
            Self::City => "city",
            Self::Country => "country",
            Self::EmergencyContactName => "emergencyContact.name",
            Self::EmergencyContactPhone => "emergencyContact.phone",
            Self::EmergencyContactRelation => "emergencyContact.relation",
            Self::PaymentMethod => "paymentMethod",
            Self::CardNumber => "cardNumber",
            Self::CardholderName => "cardholderName",
            Self::ExpiryDate => "expiryDate",
            Self::Cvv => "cvv",
            Self::AcceptTerms => "acceptTerms",
            Self::AcceptPrivacy => "acceptPrivacy",
            Self::AcceptWaiver => "acceptWaiver",
            Self::ReceiveUpdates => "receiveUpdates",
        }
    }
}

impl fmt::Display for RegistrationField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Accepts the dotted names hosts use for inputs, e.g. `emergencyContact.phone`.
impl FromStr for RegistrationField {
    type Err = WizardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        Self::ALL
            .into_iter()
            .find(|field| field.path() == raw)
            .ok_or_else(|| {
                WizardError::InvalidPath(FieldPathError::new(raw, "not a registration field"))
            })
    }
}

impl FormModel for RegistrationForm {
    type Field = RegistrationField;

    fn field(&self, field: &RegistrationField) -> FieldValue<'_> {
        use RegistrationField as F;

        match field {
            F::FirstName => FieldValue::Text(&self.first_name),
            F::LastName => FieldValue::Text(&self.last_name),
            F::Email => FieldValue::Text(&self.email),
            F::Phone => FieldValue::Text(&self.phone),
            F::DateOfBirth => FieldValue::Text(&self.date_of_birth),
            F::Gender => FieldValue::Text(&self.gender),
            F::Address => FieldValue::Text(&self.address),
            F::City => FieldValue::Text(&self.city),
            F::Country => FieldValue::Text(&self.country),
            F::EmergencyContactName => FieldValue::Text(&self.emergency_contact.name),
            F::EmergencyContactPhone => FieldValue::Text(&self.emergency_contact.phone),
            F::EmergencyContactRelation => FieldValue::Text(&self.emergency_contact.relation),
            F::PaymentMethod => FieldValue::Text(self.payment.payment_method.as_str()),
            F::CardNumber => FieldValue::Text(&self.payment.card_number),
            F::CardholderName => FieldValue::Text(&self.payment.cardholder_name),
            F::ExpiryDate => FieldValue::Text(&self.payment.expiry_date),
            F::Cvv => FieldValue::Text(&self.payment.cvv),
            F::AcceptTerms => FieldValue::Flag(self.agreements.accept_terms),
            F::AcceptPrivacy => FieldValue::Flag(self.agreements.accept_privacy),
            F::AcceptWaiver => FieldValue::Flag(self.agreements.accept_waiver),
            F::ReceiveUpdates => FieldValue::Flag(self.agreements.receive_updates),
        }
    }

    fn set_field(&mut self, field: &RegistrationField, value: Value) -> Result<(), WizardError> {
        use RegistrationField as F;

        let field = *field;
        match field {
            F::FirstName => self.first_name = text(field, value)?,
            F::LastName => self.last_name = text(field, value)?,
            F::Email => self.email = text(field, value)?,
            F::Phone => self.phone = text(field, value)?,
            F::DateOfBirth => self.date_of_birth = text(field, value)?,
            F::Gender => self.gender = text(field, value)?,
            F::Address => self.address = text(field, value)?,
            F::City => self.city = text(field, value)?,
            F::Country => self.country = text(field, value)?,
            F::EmergencyContactName => self.emergency_contact.name = text(field, value)?,
            F::EmergencyContactPhone => self.emergency_contact.phone = text(field, value)?,
            F::EmergencyContactRelation => self.emergency_contact.relation = text(field, value)?,
            F::PaymentMethod => {
                let raw = text(field, value)?;
                self.payment.payment_method =
                    PaymentMethod::parse(&raw).ok_or_else(|| WizardError::TypeMismatch {
                        field: field.to_string(),
                        expected: "payment method (credit or paypal)",
                    })?;
            }
            F::CardNumber => self.payment.card_number = format_card_number(&text(field, value)?),
            F::CardholderName => self.payment.cardholder_name = text(field, value)?,
            F::ExpiryDate => self.payment.expiry_date = text(field, value)?,
            F::Cvv => self.payment.cvv = text(field, value)?,
            F::AcceptTerms => self.agreements.accept_terms = flag(field, value)?,
            F::AcceptPrivacy => self.agreements.accept_privacy = flag(field, value)?,
            F::AcceptWaiver => self.agreements.accept_waiver = flag(field, value)?,
            F::ReceiveUpdates => self.agreements.receive_updates = flag(field, value)?,
        }
        Ok(())
    }
}

fn text(field: RegistrationField, value: Value) -> Result<String, WizardError> {
    match value {
        Value::Text(text) => Ok(text),
        Value::None => Ok(String::new()),
        _ => Err(WizardError::TypeMismatch {
            field: field.to_string(),
            expected: "text",
        }),
    }
}

fn flag(field: RegistrationField, value: Value) -> Result<bool, WizardError> {
    match value {
        Value::Bool(flag) => Ok(flag),
        Value::None => Ok(false),
        _ => Err(WizardError::TypeMismatch {
            field: field.to_string(),
            expected: "boolean",
        }),
    }
}

/// Groups the first 4 to 16 digits of `value` in blocks of four. Input with
/// fewer than four digits is returned unchanged.
pub fn format_card_number(value: &str) -> String {
    let digits: String = value.chars().filter(char::is_ascii_digit).take(16).collect();
    if digits.len() < 4 {
        return value.to_string();
    }

    digits
        .as_bytes()
        .chunks(4)
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn registration_flow() -> Result<Flow<RegistrationForm>, WizardError> {
    use RegistrationField as F;

    let details = StepDefinition::<RegistrationForm>::builder("details", "Your Details")
        .require(F::FirstName)
        .require(F::LastName)
        .field(F::Email, [Rule::required(), Rule::email()])
        .require(F::Phone)
        .require(F::DateOfBirth)
        .require(F::Gender)
        .field(F::Address, [])
        .field(F::City, [])
        .require(F::Country)
        .require(F::EmergencyContactName)
        .require(F::EmergencyContactPhone)
        .require(F::EmergencyContactRelation)
        .build();

    let by_card = |form: &RegistrationForm| form.pays_by_card();
    let payment = StepDefinition::<RegistrationForm>::builder("payment", "Payment")
        .require(F::PaymentMethod)
        .field_when(
            F::CardNumber,
            by_card,
            [
                Rule::required(),
                Rule::stripped_pattern(CARD_NUMBER.clone(), CARD_NUMBER_MESSAGE),
            ],
        )
        .field_when(F::CardholderName, by_card, [Rule::required()])
        .field_when(
            F::ExpiryDate,
            by_card,
            [Rule::required(), Rule::pattern(EXPIRY.clone(), EXPIRY_MESSAGE)],
        )
        .field_when(
            F::Cvv,
            by_card,
            [Rule::required(), Rule::pattern(CVV.clone(), CVV_MESSAGE)],
        )
        .build();

    let confirmation = StepDefinition::<RegistrationForm>::builder("confirmation", "Confirmation")
        .field(F::AcceptTerms, [Rule::accepted()])
        .field(F::AcceptPrivacy, [Rule::accepted()])
        .field(F::AcceptWaiver, [Rule::accepted()])
        .field(F::ReceiveUpdates, [])
        .build();

    Flow::new(vec![details, payment, confirmation])
}

pub fn registration_wizard() -> Result<Wizard<RegistrationForm>, WizardError> {
    Ok(Wizard::new(registration_flow()?))
}

#[cfg(test)]
mod tests {
    use super::{
        CARD_NUMBER_MESSAGE, CVV_MESSAGE, EXPIRY_MESSAGE, PaymentMethod, RegistrationField as F,
        RegistrationForm, format_card_number, registration_wizard,
    };
    use crate::core::{FormModel, Value};
    use crate::error::WizardError;
    use crate::runtime::{Outcome, Wizard};
    use crate::state::store::{BlobStore, MemoryBlobStore, get_json, put_json};
    use crate::validators::{ACCEPT_MESSAGE, EMAIL_MESSAGE, REQUIRED_MESSAGE};

    fn fill_details(wizard: &mut Wizard<RegistrationForm>) {
        wizard
            .update_fields([
                (F::FirstName, Value::text("Jane")),
                (F::LastName, Value::text("Doe")),
                (F::Email, Value::text("jane@doe.com")),
                (F::Phone, Value::text("+31 6 1234 5678")),
                (F::DateOfBirth, Value::text("1990-04-12")),
                (F::Gender, Value::text("female")),
                (F::Country, Value::text("Netherlands")),
                (F::EmergencyContactName, Value::text("John Doe")),
                (F::EmergencyContactPhone, Value::text("+31 6 8765 4321")),
                (F::EmergencyContactRelation, Value::text("Spouse")),
            ])
            .expect("writes");
    }

    #[test]
    fn card_number_is_grouped_in_fours() {
        assert_eq!(format_card_number("4242424242424242"), "4242 4242 4242 4242");
        assert_eq!(format_card_number("4242-4242 42"), "4242 4242 42");
        assert_eq!(format_card_number("12"), "12");
        assert_eq!(
            format_card_number("12345678901234567890"),
            "1234 5678 9012 3456"
        );
    }

    #[test]
    fn field_paths_match_form_keys() {
        assert_eq!(F::EmergencyContactPhone.to_string(), "emergencyContact.phone");
        assert_eq!(
            "emergencyContact.relation".parse::<F>().expect("known field"),
            F::EmergencyContactRelation
        );
        assert!(matches!(
            "medical.allergies".parse::<F>(),
            Err(WizardError::InvalidPath(_))
        ));
    }

    #[test]
    fn wrong_kind_of_value_is_rejected() {
        let mut form = RegistrationForm::default();
        assert!(matches!(
            form.set_field(&F::AcceptTerms, Value::text("yes")),
            Err(WizardError::TypeMismatch { .. })
        ));
        assert!(matches!(
            form.set_field(&F::PaymentMethod, Value::text("cash")),
            Err(WizardError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn details_step_reports_every_missing_field() {
        let mut wizard = registration_wizard().expect("flow");
        wizard.update_field(&F::Email, "not-an-email").expect("write");
        let outcome = wizard.advance().expect("advance");
        assert!(outcome.is_rejected());
        assert_eq!(wizard.error(&F::FirstName), Some(REQUIRED_MESSAGE));
        assert_eq!(wizard.error(&F::EmergencyContactRelation), Some(REQUIRED_MESSAGE));
        assert_eq!(wizard.error(&F::Email), Some(EMAIL_MESSAGE));
        assert_eq!(wizard.error(&F::Address), None);
        assert_eq!(wizard.errors().len(), 10);
        assert_eq!(wizard.first_error(), Some(F::FirstName));
    }

    #[test]
    fn card_fields_checked_only_for_card_payment() {
        let mut wizard = registration_wizard().expect("flow");
        fill_details(&mut wizard);
        wizard.advance().expect("advance");
        assert_eq!(wizard.current_step().id, "payment");

        wizard
            .update_fields([
                (F::CardNumber, Value::text("4242")),
                (F::CardholderName, Value::text("Jane Doe")),
                (F::ExpiryDate, Value::text("13/27")),
                (F::Cvv, Value::text("12")),
            ])
            .expect("writes");
        assert!(wizard.advance().expect("advance").is_rejected());
        assert_eq!(wizard.error(&F::CardNumber), Some(CARD_NUMBER_MESSAGE));
        assert_eq!(wizard.error(&F::ExpiryDate), Some(EXPIRY_MESSAGE));
        assert_eq!(wizard.error(&F::Cvv), Some(CVV_MESSAGE));

        wizard.update_field(&F::PaymentMethod, "paypal").expect("write");
        assert_eq!(wizard.form().payment.payment_method, PaymentMethod::Paypal);
        assert_eq!(
            wizard.advance().expect("advance"),
            Outcome::Moved { from: 1, to: 2 }
        );
    }

    #[test]
    fn full_registration_submits_once_and_archives() {
        let mut wizard = registration_wizard().expect("flow");
        fill_details(&mut wizard);
        wizard.advance().expect("advance");
        wizard
            .update_fields([
                (F::CardNumber, Value::text("4242424242424242")),
                (F::CardholderName, Value::text("Jane Doe")),
                (F::ExpiryDate, Value::text("09/27")),
                (F::Cvv, Value::text("123")),
            ])
            .expect("writes");
        assert_eq!(wizard.form().payment.card_number, "4242 4242 4242 4242");
        wizard.advance().expect("advance");
        assert!(wizard.is_last_step());
        assert_eq!(wizard.progress_percent(), 100);

        wizard.update_field(&F::AcceptTerms, true).expect("write");
        let mut store = MemoryBlobStore::new();
        let outcome = wizard
            .submit(|form| put_json(&mut store, "jane-doe", form).expect("archive"))
            .expect("submit");
        assert!(outcome.is_rejected());
        assert_eq!(wizard.error(&F::AcceptPrivacy), Some(ACCEPT_MESSAGE));
        assert!(store.list().is_empty());

        wizard
            .update_fields([
                (F::AcceptPrivacy, Value::Bool(true)),
                (F::AcceptWaiver, Value::Bool(true)),
            ])
            .expect("writes");
        let outcome = wizard
            .submit(|form| put_json(&mut store, "jane-doe", form).expect("archive"))
            .expect("submit");
        assert_eq!(outcome, Outcome::Submitted);

        let again = wizard
            .submit(|form| put_json(&mut store, "jane-doe-2", form).expect("archive"))
            .expect("submit");
        assert!(again.is_rejected());
        assert_eq!(store.list(), vec!["jane-doe".to_string()]);

        let stored = store.get("jane-doe").expect("stored");
        assert_eq!(stored["emergencyContact"]["name"], "John Doe");
        assert_eq!(stored["paymentMethod"], "credit");
        assert_eq!(stored["receiveUpdates"], true);

        let back: RegistrationForm = get_json(&store, "jane-doe")
            .expect("decode")
            .expect("present");
        assert_eq!(&back, wizard.form());
    }
}
