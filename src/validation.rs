//! Turns `validator` output into a single field/rule violation.

use validator::{Validate, ValidationErrors};

use crate::error::{AppError, AppResult};

/// Validate `value`, reporting the first violated constraint.
///
/// Fields are ordered by name so the reported violation is stable across runs.
pub fn validate<T: Validate>(value: &T) -> AppResult<()> {
    value.validate().map_err(|errors| {
        let (field, rule) = first_violation(&errors);
        AppError::Validation { field, rule }
    })
}

fn first_violation(errors: &ValidationErrors) -> (String, String) {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let rule = errs
                .first()
                .map(|e| e.code.to_string())
                .unwrap_or_else(|| "invalid".to_string());
            (field.to_string(), rule)
        })
        .min_by(|a, b| a.0.cmp(&b.0))
        .unwrap_or_else(|| ("body".to_string(), "invalid".to_string()))
}
