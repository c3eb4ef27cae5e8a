/*
 * scale.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Rescaling of `style.scale`.
//!
//! Scales are percentages stored as strings (`"80%"`). Applying a factor
//! multiplies whatever is there, so repeated application compounds. A
//! missing or unreadable scale counts as `100%`.

use crate::node::{Node, Record, Scalar, format_number};

pub const STYLE_KEY: &str = "style";
pub const SCALE_KEY: &str = "scale";

const DEFAULT_SCALE: f64 = 100.0;

/// Whether `scale_factor` changes anything.
///
/// Exactly `1`, non-finite and non-positive factors are no-ops.
pub fn is_effective_factor(scale_factor: f64) -> bool {
    scale_factor.is_finite() && scale_factor > 0.0 && scale_factor != 1.0
}

/// Multiply an element's `style.scale` by `scale_factor`, in place.
///
/// `style` is turned into a record first, even when the factor is a no-op.
pub fn apply_scale(element: &mut Record, scale_factor: f64) {
    let style = element
        .entry(STYLE_KEY.to_string())
        .or_insert_with(Node::empty_record)
        .make_record();

    if !is_effective_factor(scale_factor) {
        return;
    }

    let base = current_scale(style.get(SCALE_KEY)).unwrap_or(DEFAULT_SCALE);
    style.insert(
        SCALE_KEY.to_string(),
        Node::string(format_percent(base * scale_factor)),
    );
}

/// Render a percentage: rounded half-up to two decimals, no trailing zeros.
pub fn format_percent(value: f64) -> String {
    let rounded = (value * 100.0 + 0.5).floor() / 100.0;
    format!("{}%", format_number(rounded))
}

/// The stored scale, or `None` when the default applies.
///
/// Strings are read by their leading number, so `"0%"` is a real zero. Other
/// values are coerced with [`Node::to_number`]; a zero from them (null,
/// `false`, `[]`, `0`) falls back to the default like NaN does.
fn current_scale(value: Option<&Node>) -> Option<f64> {
    let number = match value? {
        Node::Scalar(Scalar::String(text)) => parse_float_prefix(text)?,
        other => {
            let number = other.to_number();
            if number == 0.0 {
                return None;
            }
            number
        }
    };
    number.is_finite().then_some(number)
}

/// Parse the longest leading decimal number of `text`, ignoring what follows.
///
/// Leading whitespace and an optional sign are accepted, as are a fraction
/// and an exponent: `" 12.5e1px"` reads as `125`.
fn parse_float_prefix(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut digits = end - int_start;

    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        if digits > 0 || frac_end > frac_start {
            digits += frac_end - frac_start;
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    text[..end].parse().ok()
}
