use crate::cli::ArtifactArgs;
use crate::infra::load_engine;
use clap::Args;
use loan_approval::error::AppError;
use loan_approval::prediction::{
    score_csv_path, BatchEntry, BatchReport, LoanApplicationForm, PredictionOutcome,
};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct PredictArgs {
    /// Applicant gender (Male, Female)
    #[arg(long, default_value = "Male")]
    pub(crate) gender: String,
    /// Marital status (Yes, No)
    #[arg(long, default_value = "Yes")]
    pub(crate) married: String,
    /// Number of dependents (0, 1, 2, 3+)
    #[arg(long, default_value = "0")]
    pub(crate) dependents: String,
    /// Education level (Graduate, Not Graduate)
    #[arg(long, default_value = "Graduate")]
    pub(crate) education: String,
    /// Self employed (Yes, No)
    #[arg(long, default_value = "Yes")]
    pub(crate) self_employed: String,
    /// Applicant income
    #[arg(long, default_value_t = 5000.0, allow_negative_numbers = true)]
    pub(crate) applicant_income: f64,
    /// Coapplicant income
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub(crate) coapplicant_income: f64,
    /// Loan amount, in thousands
    #[arg(long, default_value_t = 100.0, allow_negative_numbers = true)]
    pub(crate) loan_amount: f64,
    /// Loan amount term, in days
    #[arg(long, default_value_t = 360.0, allow_negative_numbers = true)]
    pub(crate) loan_amount_term: f64,
    /// Credit history meets guidelines (1.0, 0.0)
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    pub(crate) credit_history: f64,
    /// Property area (Urban, Semiurban, Rural)
    #[arg(long, default_value = "Urban")]
    pub(crate) property_area: String,
    /// Print the full outcome, including feature rows, as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

impl PredictArgs {
    pub(crate) fn form(&self) -> LoanApplicationForm {
        LoanApplicationForm {
            gender: self.gender.clone(),
            married: self.married.clone(),
            dependents: self.dependents.clone(),
            education: self.education.clone(),
            self_employed: self.self_employed.clone(),
            applicant_income: self.applicant_income,
            coapplicant_income: self.coapplicant_income,
            loan_amount: self.loan_amount,
            loan_amount_term: self.loan_amount_term,
            credit_history: self.credit_history,
            property_area: self.property_area.clone(),
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// Loan dataset CSV (Gender, Married, Dependents, ... Property_Area columns)
    #[arg(long)]
    pub(crate) input: PathBuf,
}

pub(crate) fn run_predict(args: PredictArgs, artifacts: ArtifactArgs) -> Result<(), AppError> {
    let engine = load_engine(artifacts)?;
    let form = args.form();
    let outcome = engine.assess(&form)?;

    if args.json {
        println!("{}", to_pretty_json(&outcome.view())?);
    } else {
        render_prediction(&form, &outcome);
    }

    Ok(())
}

pub(crate) fn run_batch(args: BatchArgs, artifacts: ArtifactArgs) -> Result<(), AppError> {
    let engine = load_engine(artifacts)?;
    let report = score_csv_path(&engine, &args.input)?;
    render_batch_report(&args.input, &report);
    Ok(())
}

pub(crate) fn to_pretty_json<T: Serialize>(value: &T) -> Result<String, AppError> {
    serde_json::to_string_pretty(value)
        .map_err(std::io::Error::from)
        .map_err(AppError::from)
}

fn render_prediction(form: &LoanApplicationForm, outcome: &PredictionOutcome) {
    println!("Loan approval prediction");
    println!(
        "Applicant: {} | married {} | dependents {} | {} | self employed {}",
        form.gender.trim(),
        form.married.trim(),
        form.dependents.trim(),
        form.education.trim(),
        form.self_employed.trim()
    );
    println!(
        "Income: {} applicant + {} coapplicant | credit history {:.1} | {} property",
        form.applicant_income,
        form.coapplicant_income,
        form.credit_history,
        form.property_area.trim()
    );
    println!(
        "Loan: {} thousand over {} days",
        form.loan_amount, form.loan_amount_term
    );
    println!("\nLoan Application Status: {}", outcome.status());
}

fn render_batch_report(input: &std::path::Path, report: &BatchReport) {
    println!("Loan approval batch: {}", input.display());
    for entry in &report.entries {
        println!("- {}", batch_line(entry));
    }
    println!(
        "\n{} approved, {} rejected, {} failed",
        report.approved(),
        report.rejected(),
        report.failed()
    );
}

pub(crate) fn batch_line(entry: &BatchEntry) -> String {
    let label = match &entry.loan_id {
        Some(id) => format!("row {} ({id})", entry.row),
        None => format!("row {}", entry.row),
    };
    match &entry.result {
        Ok(outcome) => format!("{label}: {}", outcome.status()),
        Err(err) => format!("{label}: error: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loan_approval::prediction::{
        FeatureVector, FormField, InvalidInput, LoanDecision, PredictionError,
    };

    fn outcome(decision: LoanDecision) -> PredictionOutcome {
        let row = FeatureVector::from_values([0.0; 11]);
        PredictionOutcome {
            decision,
            features: row,
            scaled_features: row,
        }
    }

    #[test]
    fn batch_line_includes_loan_id_when_present() {
        let entry = BatchEntry {
            row: 2,
            loan_id: Some("LP001003".to_string()),
            result: Ok(outcome(LoanDecision::Rejected)),
        };
        assert_eq!(batch_line(&entry), "row 2 (LP001003): Rejected");
    }

    #[test]
    fn batch_line_reports_row_errors() {
        let entry = BatchEntry {
            row: 4,
            loan_id: None,
            result: Err(PredictionError::from(InvalidInput::new(
                FormField::LoanAmount,
                "value is missing",
            ))),
        };
        assert_eq!(
            batch_line(&entry),
            "row 4: error: invalid loan_amount: value is missing"
        );
    }

    #[test]
    fn prediction_view_renders_as_json() {
        let json =
            to_pretty_json(&outcome(LoanDecision::Approved).view()).expect("view serializes");
        assert!(json.contains("\"status\": \"Approved\""));
    }

    #[test]
    fn json_failures_are_returned_as_errors() {
        let mut keyed_by_pair = std::collections::BTreeMap::new();
        keyed_by_pair.insert((1u8, 2u8), "pair");

        let err = to_pretty_json(&keyed_by_pair).expect_err("tuple keys are not JSON keys");

        assert!(matches!(err, AppError::Io(_)));
    }
}
