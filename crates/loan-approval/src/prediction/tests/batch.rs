use super::common::*;
use crate::prediction::batch::{score_csv, BatchError};
use crate::prediction::decision::LoanDecision;
use crate::prediction::domain::FormField;
use crate::prediction::engine::PredictionError;

const DATASET: &str = "\
Loan_ID,Gender,Married,Dependents,Education,Self_Employed,ApplicantIncome,CoapplicantIncome,LoanAmount,Loan_Amount_Term,Credit_History,Property_Area,Loan_Status
LP001002,Male,No,0,Graduate,No,5849,0,128,360,1,Urban,Y
LP001003,Male,Yes,1,Graduate,No,4583,1508,128,360,1,Rural,N
LP001005,Male,Yes,0,Graduate,Yes,3000,0,66,360,0,Urban,Y
LP001008,Male,No,0,Graduate,No,6000,0,,360,1,Urban,Y
LP001013,Male,Yes,3+,Not Graduate,No,2333,1516,95,360,1,Semiurban,Y
";

#[test]
fn scores_each_row_independently() {
    let (engine, model) = offset_engine();

    let report = score_csv(&engine, DATASET.as_bytes()).expect("csv parses");

    assert_eq!(report.entries.len(), 5);
    assert_eq!(report.approved(), 3);
    assert_eq!(report.rejected(), 1);
    assert_eq!(report.failed(), 1);
    assert_eq!(model.seen().len(), 4);

    let third = &report.entries[2];
    assert_eq!(third.row, 3);
    assert_eq!(third.loan_id.as_deref(), Some("LP001005"));
    assert_eq!(
        third.result.as_ref().map(|outcome| outcome.decision),
        Ok(LoanDecision::Rejected)
    );
}

#[test]
fn blank_cells_become_row_errors() {
    let (engine, _) = offset_engine();

    let report = score_csv(&engine, DATASET.as_bytes()).expect("csv parses");

    let missing = &report.entries[3];
    assert_eq!(missing.loan_id.as_deref(), Some("LP001008"));
    match &missing.result {
        Err(PredictionError::InvalidInput(err)) => {
            assert_eq!(err.field, FormField::LoanAmount);
            assert_eq!(err.reason, "value is missing");
        }
        other => panic!("expected a missing loan amount, got {other:?}"),
    }
}

#[test]
fn dependents_three_plus_is_encoded_from_csv() {
    let (engine, _) = offset_engine();

    let report = score_csv(&engine, DATASET.as_bytes()).expect("csv parses");

    let last = report.entries[4].result.as_ref().expect("row scores");
    assert_eq!(last.features.values()[2], 3.0);
    assert_eq!(last.features.values()[3], 1.0);
    assert_eq!(last.features.values()[10], 1.0);
}

#[test]
fn loan_id_column_is_optional() {
    let (engine, _) = offset_engine();
    let csv = "\
Gender,Married,Dependents,Education,Self_Employed,ApplicantIncome,CoapplicantIncome,LoanAmount,Loan_Amount_Term,Credit_History,Property_Area
Female,No,2,Graduate,No,3510,0,76,360,0,Urban
";

    let report = score_csv(&engine, csv.as_bytes()).expect("csv parses");

    assert_eq!(report.entries.len(), 1);
    assert!(report.entries[0].loan_id.is_none());
    assert_eq!(report.rejected(), 1);
}

#[test]
fn ragged_rows_fail_the_batch() {
    let (engine, _) = offset_engine();
    let csv = "\
Gender,Married,Dependents,Education,Self_Employed,ApplicantIncome,CoapplicantIncome,LoanAmount,Loan_Amount_Term,Credit_History,Property_Area
Female,No,2
";

    let err = score_csv(&engine, csv.as_bytes()).expect_err("ragged row");

    assert!(matches!(err, BatchError::Csv(_)));
}
