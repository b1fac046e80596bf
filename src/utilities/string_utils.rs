//! Placeholder substitution for free-text fields.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use thiserror::Error;

use crate::project::variables::VariableSet;

static VARIABLE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_\-]*)\}").expect("valid placeholder regex"));

/// Errors raised while interpolating a single text field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// One or more placeholders have no value in the variable set.
    #[error("Template variable(s) not found in inputs: {}", .0.join(", "))]
    MissingVariables(Vec<String>),
}

/// Names of all placeholders in `text`, in order of first appearance.
pub fn placeholders(text: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for cap in VARIABLE_PATTERN.captures_iter(text) {
        let name = &cap[1];
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// Whether `text` contains at least one `{name}` marker.
pub fn has_placeholders(text: &str) -> bool {
    VARIABLE_PATTERN.is_match(text)
}

/// Replace every marker that has a value in `variables`, leaving unknown markers as they are.
///
/// Like [`interpolate_only`] this is a single pass; it is used for fields where a
/// marker without a value is not an error.
pub fn replace_placeholders(text: &str, variables: &VariableSet) -> String {
    VARIABLE_PATTERN
        .replace_all(text, |cap: &Captures<'_>| match variables.get(&cap[1]) {
            Some(value) => value.to_string(),
            None => cap[0].to_string(),
        })
        .into_owned()
}

/// Interpolate placeholders (e.g., `{key}`) in a field while leaving JSON untouched.
///
/// Text without markers is returned unchanged. Otherwise every marker must have a
/// value; all missing names are reported together. Substitution is a single pass,
/// so a substituted value is never expanded again.
pub fn interpolate_only(input: &str, variables: &VariableSet) -> Result<String, TemplateError> {
    if !has_placeholders(input) {
        return Ok(input.to_string());
    }

    let missing: Vec<String> = placeholders(input)
        .into_iter()
        .filter(|name| variables.get(name).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(TemplateError::MissingVariables(missing));
    }

    let result = VARIABLE_PATTERN.replace_all(input, |cap: &Captures<'_>| {
        variables.get(&cap[1]).unwrap_or_default().to_string()
    });
    Ok(result.into_owned())
}
