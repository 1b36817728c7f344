use std::fmt;

use serde::{Deserialize, Serialize};

/// Raw applicant input exactly as collected by the form, CLI, or CSV row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanApplicationForm {
    pub gender: String,
    pub married: String,
    pub dependents: String,
    pub education: String,
    pub self_employed: String,
    pub applicant_income: f64,
    pub coapplicant_income: f64,
    /// Requested amount, in thousands.
    pub loan_amount: f64,
    /// Repayment term, in days.
    pub loan_amount_term: f64,
    pub credit_history: f64,
    pub property_area: String,
}

impl Default for LoanApplicationForm {
    /// Mirrors the initial state of the intake form.
    fn default() -> Self {
        Self {
            gender: Gender::Male.label().to_string(),
            married: Answer::Yes.label().to_string(),
            dependents: Dependents::Zero.label().to_string(),
            education: Education::Graduate.label().to_string(),
            self_employed: Answer::Yes.label().to_string(),
            applicant_income: 5000.0,
            coapplicant_income: 0.0,
            loan_amount: 100.0,
            loan_amount_term: 360.0,
            credit_history: CreditHistory::MeetsGuidelines.value(),
            property_area: PropertyArea::Urban.label().to_string(),
        }
    }
}

/// Names the form field responsible for a validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    Gender,
    Married,
    Dependents,
    Education,
    SelfEmployed,
    ApplicantIncome,
    CoapplicantIncome,
    LoanAmount,
    LoanAmountTerm,
    CreditHistory,
    PropertyArea,
}

impl FormField {
    pub const fn label(self) -> &'static str {
        match self {
            FormField::Gender => "gender",
            FormField::Married => "married",
            FormField::Dependents => "dependents",
            FormField::Education => "education",
            FormField::SelfEmployed => "self_employed",
            FormField::ApplicantIncome => "applicant_income",
            FormField::CoapplicantIncome => "coapplicant_income",
            FormField::LoanAmount => "loan_amount",
            FormField::LoanAmountTerm => "loan_amount_term",
            FormField::CreditHistory => "credit_history",
            FormField::PropertyArea => "property_area",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Raised when a raw field value falls outside its enumerated or numeric domain.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {field}: {reason}")]
pub struct InvalidInput {
    pub field: FormField,
    pub reason: String,
}

impl InvalidInput {
    pub fn new(field: FormField, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

fn parse_choice<T: Copy>(
    field: FormField,
    raw: &str,
    choices: &[(&'static str, T)],
) -> Result<T, InvalidInput> {
    let trimmed = raw.trim();
    choices
        .iter()
        .find(|(label, _)| *label == trimmed)
        .map(|(_, value)| *value)
        .ok_or_else(|| {
            let allowed = choices
                .iter()
                .map(|(label, _)| format!("'{label}'"))
                .collect::<Vec<_>>()
                .join(", ");
            InvalidInput::new(field, format!("'{raw}' is not one of {allowed}"))
        })
}

fn validate_amount(field: FormField, value: f64) -> Result<f64, InvalidInput> {
    if !value.is_finite() {
        return Err(InvalidInput::new(field, "value must be a finite number"));
    }
    if value < 0.0 {
        return Err(InvalidInput::new(
            field,
            format!("{value} is negative; amounts must be non-negative"),
        ));
    }
    Ok(value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];

    pub fn parse(raw: &str) -> Result<Self, InvalidInput> {
        parse_choice(
            FormField::Gender,
            raw,
            &[("Male", Gender::Male), ("Female", Gender::Female)],
        )
    }

    pub const fn label(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }

    pub const fn code(self) -> f64 {
        match self {
            Gender::Male => 1.0,
            Gender::Female => 0.0,
        }
    }
}

/// Yes/No answer shared by the `married` and `self_employed` fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Answer {
    Yes,
    No,
}

impl Answer {
    pub const ALL: [Answer; 2] = [Answer::Yes, Answer::No];

    pub fn parse(field: FormField, raw: &str) -> Result<Self, InvalidInput> {
        parse_choice(field, raw, &[("Yes", Answer::Yes), ("No", Answer::No)])
    }

    pub const fn label(self) -> &'static str {
        match self {
            Answer::Yes => "Yes",
            Answer::No => "No",
        }
    }

    pub const fn code(self) -> f64 {
        match self {
            Answer::Yes => 1.0,
            Answer::No => 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dependents {
    Zero,
    One,
    Two,
    ThreeOrMore,
}

impl Dependents {
    pub const ALL: [Dependents; 4] = [
        Dependents::Zero,
        Dependents::One,
        Dependents::Two,
        Dependents::ThreeOrMore,
    ];

    pub fn parse(raw: &str) -> Result<Self, InvalidInput> {
        parse_choice(
            FormField::Dependents,
            raw,
            &[
                ("0", Dependents::Zero),
                ("1", Dependents::One),
                ("2", Dependents::Two),
                ("3+", Dependents::ThreeOrMore),
            ],
        )
    }

    pub const fn label(self) -> &'static str {
        match self {
            Dependents::Zero => "0",
            Dependents::One => "1",
            Dependents::Two => "2",
            Dependents::ThreeOrMore => "3+",
        }
    }

    /// "3+" collapses to 3.
    pub const fn code(self) -> f64 {
        match self {
            Dependents::Zero => 0.0,
            Dependents::One => 1.0,
            Dependents::Two => 2.0,
            Dependents::ThreeOrMore => 3.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Education {
    Graduate,
    NotGraduate,
}

impl Education {
    pub const ALL: [Education; 2] = [Education::Graduate, Education::NotGraduate];

    pub fn parse(raw: &str) -> Result<Self, InvalidInput> {
        parse_choice(
            FormField::Education,
            raw,
            &[
                ("Graduate", Education::Graduate),
                ("Not Graduate", Education::NotGraduate),
            ],
        )
    }

    pub const fn label(self) -> &'static str {
        match self {
            Education::Graduate => "Graduate",
            Education::NotGraduate => "Not Graduate",
        }
    }

    pub const fn code(self) -> f64 {
        match self {
            Education::Graduate => 0.0,
            Education::NotGraduate => 1.0,
        }
    }
}

/// Whether the applicant's credit history meets lending guidelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CreditHistory {
    MeetsGuidelines,
    BelowGuidelines,
}

impl CreditHistory {
    pub const ALL: [CreditHistory; 2] = [
        CreditHistory::MeetsGuidelines,
        CreditHistory::BelowGuidelines,
    ];

    pub fn from_value(value: f64) -> Result<Self, InvalidInput> {
        if value == 1.0 {
            Ok(CreditHistory::MeetsGuidelines)
        } else if value == 0.0 {
            Ok(CreditHistory::BelowGuidelines)
        } else {
            Err(InvalidInput::new(
                FormField::CreditHistory,
                format!("{value} is not one of 1.0, 0.0"),
            ))
        }
    }

    pub const fn value(self) -> f64 {
        match self {
            CreditHistory::MeetsGuidelines => 1.0,
            CreditHistory::BelowGuidelines => 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyArea {
    Urban,
    Semiurban,
    Rural,
}

impl PropertyArea {
    pub const ALL: [PropertyArea; 3] = [
        PropertyArea::Urban,
        PropertyArea::Semiurban,
        PropertyArea::Rural,
    ];

    pub fn parse(raw: &str) -> Result<Self, InvalidInput> {
        parse_choice(
            FormField::PropertyArea,
            raw,
            &[
                ("Urban", PropertyArea::Urban),
                ("Semiurban", PropertyArea::Semiurban),
                ("Rural", PropertyArea::Rural),
            ],
        )
    }

    pub const fn label(self) -> &'static str {
        match self {
            PropertyArea::Urban => "Urban",
            PropertyArea::Semiurban => "Semiurban",
            PropertyArea::Rural => "Rural",
        }
    }

    pub const fn code(self) -> f64 {
        match self {
            PropertyArea::Urban => 2.0,
            PropertyArea::Semiurban => 1.0,
            PropertyArea::Rural => 0.0,
        }
    }
}

/// Validated, strongly typed submission. Built per request and discarded afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub gender: Gender,
    pub married: Answer,
    pub dependents: Dependents,
    pub education: Education,
    pub self_employed: Answer,
    pub applicant_income: f64,
    pub coapplicant_income: f64,
    pub loan_amount: f64,
    pub loan_amount_term: f64,
    pub credit_history: CreditHistory,
    pub property_area: PropertyArea,
}

impl ApplicationRecord {
    /// Validate every raw field, failing on the first value outside its domain.
    pub fn from_form(form: &LoanApplicationForm) -> Result<Self, InvalidInput> {
        Ok(Self {
            gender: Gender::parse(&form.gender)?,
            married: Answer::parse(FormField::Married, &form.married)?,
            dependents: Dependents::parse(&form.dependents)?,
            education: Education::parse(&form.education)?,
            self_employed: Answer::parse(FormField::SelfEmployed, &form.self_employed)?,
            applicant_income: validate_amount(FormField::ApplicantIncome, form.applicant_income)?,
            coapplicant_income: validate_amount(
                FormField::CoapplicantIncome,
                form.coapplicant_income,
            )?,
            loan_amount: validate_amount(FormField::LoanAmount, form.loan_amount)?,
            loan_amount_term: validate_amount(FormField::LoanAmountTerm, form.loan_amount_term)?,
            credit_history: CreditHistory::from_value(form.credit_history)?,
            property_area: PropertyArea::parse(&form.property_area)?,
        })
    }
}

impl TryFrom<&LoanApplicationForm> for ApplicationRecord {
    type Error = InvalidInput;

    fn try_from(form: &LoanApplicationForm) -> Result<Self, Self::Error> {
        Self::from_form(form)
    }
}

impl From<&ApplicationRecord> for LoanApplicationForm {
    fn from(record: &ApplicationRecord) -> Self {
        Self {
            gender: record.gender.label().to_string(),
            married: record.married.label().to_string(),
            dependents: record.dependents.label().to_string(),
            education: record.education.label().to_string(),
            self_employed: record.self_employed.label().to_string(),
            applicant_income: record.applicant_income,
            coapplicant_income: record.coapplicant_income,
            loan_amount: record.loan_amount,
            loan_amount_term: record.loan_amount_term,
            credit_history: record.credit_history.value(),
            property_area: record.property_area.label().to_string(),
        }
    }
}
