//! Turning raw OCR fragments into numeric tokens.
//!
//! Engines often split one reading into several detections ("12" "5", or
//! "3.1" "4"). Digit-only fragments are glued onto the previous token.

use regex::Regex;
use std::sync::LazyLock;

use crate::models::Detection;

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+(\.[0-9]+)?$").expect("valid number pattern"));

static DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+$").expect("valid digits pattern"));

/// Standardize detections in the order the engine reported them
pub fn standardize(detections: &[Detection]) -> Vec<String> {
    standardize_texts(detections.iter().map(|d| d.text.as_str()))
}

/// Standardize raw text fragments.
///
/// A digit-only fragment that follows a token is appended to it as text,
/// also after a decimal token ("3.14" then "9" gives "3.149"). Otherwise
/// integers and decimals start a new token and everything else is dropped.
pub fn standardize_texts<'a>(texts: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut numbers: Vec<String> = Vec::new();

    for raw in texts {
        let text = raw.trim();

        // continuation is checked first: every digit run is also a valid number
        if DIGITS.is_match(text) && !numbers.is_empty() {
            if let Some(last) = numbers.last_mut() {
                last.push_str(text);
            }
        } else if NUMBER.is_match(text) {
            numbers.push(text.to_string());
        }
    }

    numbers
}
