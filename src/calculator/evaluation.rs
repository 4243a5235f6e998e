//! Expression evaluation using fasteval.
//!
//! Wraps fasteval to turn the expression buffer into the value shown under
//! it. The evaluator is pure and cheap enough to run on every keystroke.

use std::f64::consts::{E, PI};

/// Display value for any failed evaluation.
pub const ERROR_DISPLAY: &str = "Error";

/// Result of evaluating the expression buffer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Evaluation {
    /// Nothing to evaluate.
    #[default]
    Empty,
    /// Successful evaluation, formatted for display and re-insertion.
    Value(String),
    /// The expression could not be evaluated.
    Error,
}

impl Evaluation {
    /// Rebuild an evaluation from its display form.
    pub fn from_display(display: &str) -> Self {
        match display {
            "" => Self::Empty,
            ERROR_DISPLAY => Self::Error,
            value => Self::Value(value.to_string()),
        }
    }

    /// Get the display string: empty, the value, or `"Error"`.
    pub fn display(&self) -> &str {
        match self {
            Self::Empty => "",
            Self::Value(value) => value,
            Self::Error => ERROR_DISPLAY,
        }
    }

    /// Get the value, if the evaluation succeeded.
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }
}

/// Evaluate a mathematical expression.
///
/// An empty expression yields [`Evaluation::Empty`]; parse failures,
/// unknown names, wrong arities and non-finite results all collapse into
/// [`Evaluation::Error`].
pub fn evaluate(input: &str) -> Evaluation {
    let expression = input.trim();
    if expression.is_empty() {
        return Evaluation::Empty;
    }

    let mut namespace = |name: &str, args: Vec<f64>| -> Option<f64> { extension(name, &args) };

    match fasteval::ez_eval(expression, &mut namespace) {
        Ok(value) if value.is_finite() => Evaluation::Value(format_value(value)),
        Ok(value) => {
            tracing::debug!(expression, value, "expression evaluated to a non-finite value");
            Evaluation::Error
        }
        Err(err) => {
            tracing::trace!(expression, error = ?err, "expression did not evaluate");
            Evaluation::Error
        }
    }
}

/// Names the keypad inserts that fasteval does not provide itself.
fn extension(name: &str, args: &[f64]) -> Option<f64> {
    match (name, args) {
        ("pi", []) => Some(PI),
        ("e", []) => Some(E),
        ("sqrt", [x]) => Some(x.sqrt()),
        ("ln", [x]) => Some(x.ln()),
        ("log10", [x]) => Some(x.log10()),
        ("exp", [x]) => Some(x.exp()),
        _ => None,
    }
}

/// Format a number so the evaluator can read it back.
///
/// Magnitudes below `1e-6` would lose their digits at ten decimal places,
/// so they use the shortest exponent form instead (`1e-12`).
fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else if value.abs() < 1e-6 {
        format!("{:e}", value)
    } else {
        let formatted = format!("{:.10}", value);
        formatted
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }
}
