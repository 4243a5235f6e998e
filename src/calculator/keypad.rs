//! Scientific keypad buttons and the tokens they insert.
//!
//! Button labels are what the user sees; tokens are what lands in the
//! expression buffer and must be understood by the evaluator.

/// Display label of the circle constant.
pub const PI_LABEL: &str = "π";

/// Evaluator name of the circle constant.
pub const PI_TOKEN: &str = "pi";

/// Keypad buttons as (label, inserted token), in keypad order.
///
/// Function buttons insert an empty argument list; the cursor ends up after
/// the closing parenthesis, just like any other inserted token.
const KEYS: &[(&str, &str)] = &[
    ("sin", "sin()"),
    ("cos", "cos()"),
    ("tan", "tan()"),
    ("asin", "asin()"),
    ("acos", "acos()"),
    ("atan", "atan()"),
    ("ln", "ln()"),
    ("log", "log10()"),
    ("sqrt", "sqrt()"),
    (PI_LABEL, PI_LABEL),
    ("(", "("),
    (")", ")"),
    ("^", "^"),
];

/// Get the token inserted by the button with the given label.
pub fn token_for(label: &str) -> Option<&'static str> {
    let label = match label {
        "pi" => PI_LABEL,
        "√" => "sqrt",
        other => other,
    };

    KEYS.iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(label))
        .map(|(_, token)| *token)
}

/// Translate a token into the evaluator's syntax.
///
/// Only the circle constant differs between its label and its evaluated
/// name; everything else passes through unchanged.
pub fn evaluator_token(token: &str) -> &str {
    if token == PI_LABEL { PI_TOKEN } else { token }
}

/// All keypad labels, in keypad order.
pub fn labels() -> impl Iterator<Item = &'static str> {
    KEYS.iter().map(|(label, _)| *label)
}
