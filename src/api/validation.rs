//! Request body validation
//!
//! Request DTOs declare their format rules with `validator` derives; this
//! module turns a failed validation into a flat, sorted list of field errors
//! named as they appear on the wire.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

/// One rule violated by one request field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub code: String,
    pub message: String,
}

/// Validate a request body, collecting every violated rule
pub fn validate_request<T: Validate>(request: &T) -> Result<(), Vec<FieldError>> {
    request.validate().map_err(|errors| field_errors(&errors))
}

fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut fields: Vec<FieldError> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            let field = to_camel_case(field.as_ref());

            errs.iter().map(move |err| FieldError {
                field: field.clone(),
                code: err.code.to_string(),
                message: err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field)),
            })
        })
        .collect();

    fields.sort_by(|a, b| a.field.cmp(&b.field).then_with(|| a.code.cmp(&b.code)));
    fields
}

fn to_camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;

    for c in name.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }

    out
}
