use serde::{Deserialize, Serialize};

use super::artifacts::InferenceError;
use super::domain::ApplicationRecord;

/// Width of the row the classifier was trained on.
pub const FEATURE_COUNT: usize = 11;

/// Number of continuous columns handed to the scaler.
pub const SCALED_COUNT: usize = 4;

/// Continuous columns handed to the scaler, in the order the scaler was fitted.
pub const SCALED_COLUMNS: [FeatureColumn; SCALED_COUNT] = [
    FeatureColumn::ApplicantIncome,
    FeatureColumn::CoapplicantIncome,
    FeatureColumn::LoanAmount,
    FeatureColumn::LoanAmountTerm,
];

/// Column layout of the feature vector. Discriminants are the column indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureColumn {
    Gender = 0,
    Married = 1,
    Dependents = 2,
    Education = 3,
    SelfEmployed = 4,
    ApplicantIncome = 5,
    CoapplicantIncome = 6,
    LoanAmount = 7,
    LoanAmountTerm = 8,
    CreditHistory = 9,
    PropertyArea = 10,
}

impl FeatureColumn {
    pub const ALL: [FeatureColumn; FEATURE_COUNT] = [
        FeatureColumn::Gender,
        FeatureColumn::Married,
        FeatureColumn::Dependents,
        FeatureColumn::Education,
        FeatureColumn::SelfEmployed,
        FeatureColumn::ApplicantIncome,
        FeatureColumn::CoapplicantIncome,
        FeatureColumn::LoanAmount,
        FeatureColumn::LoanAmountTerm,
        FeatureColumn::CreditHistory,
        FeatureColumn::PropertyArea,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Header used for the column in the loan dataset.
    pub const fn dataset_header(self) -> &'static str {
        match self {
            FeatureColumn::Gender => "Gender",
            FeatureColumn::Married => "Married",
            FeatureColumn::Dependents => "Dependents",
            FeatureColumn::Education => "Education",
            FeatureColumn::SelfEmployed => "Self_Employed",
            FeatureColumn::ApplicantIncome => "ApplicantIncome",
            FeatureColumn::CoapplicantIncome => "CoapplicantIncome",
            FeatureColumn::LoanAmount => "LoanAmount",
            FeatureColumn::LoanAmountTerm => "Loan_Amount_Term",
            FeatureColumn::CreditHistory => "Credit_History",
            FeatureColumn::PropertyArea => "Property_Area",
        }
    }
}

/// Fixed-order numeric row passed to the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    /// Lay the encoded record out in column order. No values are transformed here.
    pub fn assemble(record: &ApplicationRecord) -> Self {
        Self([
            record.gender.code(),
            record.married.code(),
            record.dependents.code(),
            record.education.code(),
            record.self_employed.code(),
            record.applicant_income,
            record.coapplicant_income,
            record.loan_amount,
            record.loan_amount_term,
            record.credit_history.value(),
            record.property_area.code(),
        ])
    }

    pub const fn from_values(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.0
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn get(&self, column: FeatureColumn) -> f64 {
        self.0[column.index()]
    }

    /// Values of [`SCALED_COLUMNS`], in scaler order.
    pub fn scaled_block(&self) -> [f64; SCALED_COUNT] {
        SCALED_COLUMNS.map(|column| self.get(column))
    }

    /// Overwrite the continuous columns with rescaled values; every other column is untouched.
    pub fn replace_scaled_block(&mut self, rescaled: &[f64]) -> Result<(), InferenceError> {
        if rescaled.len() != SCALED_COUNT {
            return Err(InferenceError::RescaleShape {
                expected: SCALED_COUNT,
                actual: rescaled.len(),
            });
        }

        if let Some((column, _)) = SCALED_COLUMNS
            .iter()
            .zip(rescaled)
            .find(|(_, value)| !value.is_finite())
        {
            return Err(InferenceError::NonFinite {
                column: column.dataset_header(),
            });
        }

        for (column, value) in SCALED_COLUMNS.iter().zip(rescaled) {
            self.0[column.index()] = *value;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_indices_follow_declaration_order() {
        for (position, column) in FeatureColumn::ALL.iter().enumerate() {
            assert_eq!(column.index(), position);
        }
        let scaled: Vec<usize> = SCALED_COLUMNS.iter().map(|column| column.index()).collect();
        assert_eq!(scaled, vec![5, 6, 7, 8]);
    }

    #[test]
    fn replace_scaled_block_rejects_wrong_width() {
        let mut vector = FeatureVector::from_values([0.0; FEATURE_COUNT]);
        let err = vector
            .replace_scaled_block(&[1.0, 2.0, 3.0])
            .expect_err("three values must be rejected");
        assert!(matches!(
            err,
            InferenceError::RescaleShape {
                expected: 4,
                actual: 3
            }
        ));
        assert_eq!(vector, FeatureVector::from_values([0.0; FEATURE_COUNT]));
    }

    #[test]
    fn replace_scaled_block_rejects_non_finite_values() {
        let mut vector = FeatureVector::from_values([1.0; FEATURE_COUNT]);
        let err = vector
            .replace_scaled_block(&[0.5, f64::NAN, 0.5, 0.5])
            .expect_err("NaN must be rejected");
        assert!(matches!(
            err,
            InferenceError::NonFinite {
                column: "CoapplicantIncome"
            }
        ));
        assert_eq!(vector.get(FeatureColumn::ApplicantIncome), 1.0);
    }
}
