use serde::{Deserialize, Deserializer};
use std::io::Read;
use std::path::Path;
use tracing::warn;

use super::artifacts::{Predict, Rescale};
use super::decision::LoanDecision;
use super::domain::{FormField, InvalidInput, LoanApplicationForm};
use super::engine::{LoanApprovalEngine, PredictionError, PredictionOutcome};

/// Failure reading the batch input itself, as opposed to a bad row.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("failed to read applicant file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid applicant CSV data: {0}")]
    Csv(#[from] csv::Error),
}

/// Outcome for one data row. `row` is 1-based and excludes the header.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchEntry {
    pub row: usize,
    pub loan_id: Option<String>,
    pub result: Result<PredictionOutcome, PredictionError>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BatchReport {
    pub entries: Vec<BatchEntry>,
}

impl BatchReport {
    pub fn approved(&self) -> usize {
        self.count(LoanDecision::Approved)
    }

    pub fn rejected(&self) -> usize {
        self.count(LoanDecision::Rejected)
    }

    pub fn failed(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.result.is_err())
            .count()
    }

    fn count(&self, decision: LoanDecision) -> usize {
        self.entries
            .iter()
            .filter(|entry| matches!(&entry.result, Ok(outcome) if outcome.decision == decision))
            .count()
    }
}

/// Score every row of a loan dataset CSV. Rows are independent: a row with an
/// out-of-domain value is reported and the rest are still scored.
pub fn score_csv<R, S, M>(
    engine: &LoanApprovalEngine<S, M>,
    reader: R,
) -> Result<BatchReport, BatchError>
where
    R: Read,
    S: Rescale,
    M: Predict,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut report = BatchReport::default();

    for (index, record) in csv_reader.deserialize::<DatasetRow>().enumerate() {
        let row = record?;
        let loan_id = row.loan_id.clone();
        let result = row
            .to_form()
            .map_err(PredictionError::from)
            .and_then(|form| engine.assess(&form));

        if let Err(err) = &result {
            warn!(row = index + 1, loan_id = loan_id.as_deref(), %err, "skipping applicant row");
        }

        report.entries.push(BatchEntry {
            row: index + 1,
            loan_id,
            result,
        });
    }

    Ok(report)
}

pub fn score_csv_path<P, S, M>(
    engine: &LoanApprovalEngine<S, M>,
    path: P,
) -> Result<BatchReport, BatchError>
where
    P: AsRef<Path>,
    S: Rescale,
    M: Predict,
{
    let file = std::fs::File::open(path)?;
    score_csv(engine, file)
}

/// One row of the loan dataset. Every column is read as text so that blank or
/// malformed cells become per-row validation errors instead of aborting the batch.
#[derive(Debug, Deserialize)]
struct DatasetRow {
    #[serde(rename = "Loan_ID", default, deserialize_with = "empty_string_as_none")]
    loan_id: Option<String>,
    #[serde(rename = "Gender", default)]
    gender: String,
    #[serde(rename = "Married", default)]
    married: String,
    #[serde(rename = "Dependents", default)]
    dependents: String,
    #[serde(rename = "Education", default)]
    education: String,
    #[serde(rename = "Self_Employed", default)]
    self_employed: String,
    #[serde(rename = "ApplicantIncome", default)]
    applicant_income: String,
    #[serde(rename = "CoapplicantIncome", default)]
    coapplicant_income: String,
    #[serde(rename = "LoanAmount", default)]
    loan_amount: String,
    #[serde(rename = "Loan_Amount_Term", default)]
    loan_amount_term: String,
    #[serde(rename = "Credit_History", default)]
    credit_history: String,
    #[serde(rename = "Property_Area", default)]
    property_area: String,
}

impl DatasetRow {
    fn to_form(&self) -> Result<LoanApplicationForm, InvalidInput> {
        Ok(LoanApplicationForm {
            gender: self.gender.clone(),
            married: self.married.clone(),
            dependents: self.dependents.clone(),
            education: self.education.clone(),
            self_employed: self.self_employed.clone(),
            applicant_income: parse_number(FormField::ApplicantIncome, &self.applicant_income)?,
            coapplicant_income: parse_number(
                FormField::CoapplicantIncome,
                &self.coapplicant_income,
            )?,
            loan_amount: parse_number(FormField::LoanAmount, &self.loan_amount)?,
            loan_amount_term: parse_number(FormField::LoanAmountTerm, &self.loan_amount_term)?,
            credit_history: parse_number(FormField::CreditHistory, &self.credit_history)?,
            property_area: self.property_area.clone(),
        })
    }
}

fn parse_number(field: FormField, raw: &str) -> Result<f64, InvalidInput> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(InvalidInput::new(field, "value is missing"));
    }
    trimmed
        .parse::<f64>()
        .map_err(|_| InvalidInput::new(field, format!("'{raw}' is not a number")))
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
