// SPDX-License-Identifier: MIT OR Apache-2.0
//! Property values and their interpolation.
//!
//! A value is either a number or a string. Strings are interpolated token by
//! token: every number embedded in the string is tweened on its own while
//! the text around the numbers is kept, so `"10px"` → `"20px"` or
//! `"rgb(0,0,0)"` → `"#ff0000"` animate as expected.

use crate::easing::EasingChain;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Value stored in a keyframe property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// Plain number
    Number(f64),
    /// String with zero or more embedded numbers
    Text(String),
}

impl PropertyValue {
    /// Get as number if possible
    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(v) => Some(*v),
            PropertyValue::Text(_) => None,
        }
    }

    /// Get as string if possible
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s),
            PropertyValue::Number(_) => None,
        }
    }

    /// Interpolate from `self` towards `to` at linear `progress` in `[0, 1]`,
    /// shaped by `easing`.
    ///
    /// Values that cannot be interpolated (a number and a string, or strings
    /// with different shapes) step from `self` to `to` at progress 1.
    pub fn tween(&self, to: &PropertyValue, progress: f64, easing: &EasingChain) -> PropertyValue {
        if progress <= 0.0 {
            return self.clone();
        }
        if progress >= 1.0 {
            return to.clone();
        }

        match (self, to) {
            (PropertyValue::Number(a), PropertyValue::Number(b)) => {
                PropertyValue::Number(a + (b - a) * easing.primary().ease(progress))
            }
            (PropertyValue::Text(a), PropertyValue::Text(b)) => tween_text(a, b, progress, easing)
                .map(PropertyValue::Text)
                .unwrap_or_else(|| self.clone()),
            _ => self.clone(),
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Number(v) => write!(f, "{}", format_number(*v)),
            PropertyValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Number(value)
    }
}

impl From<f32> for PropertyValue {
    fn from(value: f32) -> Self {
        PropertyValue::Number(f64::from(value))
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        PropertyValue::Number(f64::from(value))
    }
}

impl From<u32> for PropertyValue {
    fn from(value: u32) -> Self {
        PropertyValue::Number(f64::from(value))
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Text(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Text(value)
    }
}

/// Piece of a tokenized string
#[derive(Debug, Clone, PartialEq)]
enum Chunk {
    Literal(String),
    Number(f64),
}

/// Tween two strings with the same literal skeleton. Returns `None` when
/// the skeletons or token counts differ.
fn tween_text(from: &str, to: &str, progress: f64, easing: &EasingChain) -> Option<String> {
    let from_chunks = tokenize(&expand_hex_colors(from));
    let to_chunks = tokenize(&expand_hex_colors(to));

    if from_chunks.len() != to_chunks.len() {
        return None;
    }

    let mut out = String::with_capacity(from.len().max(to.len()));
    let mut token_index = 0;
    let mut channels_left = 0u8;

    for (a, b) in from_chunks.iter().zip(&to_chunks) {
        match (a, b) {
            (Chunk::Literal(la), Chunk::Literal(lb)) => {
                if la != lb {
                    return None;
                }
                update_color_state(la, &mut channels_left);
                out.push_str(la);
            }
            (Chunk::Number(na), Chunk::Number(nb)) => {
                let eased = easing.curve(token_index).ease(progress);
                let value = na + (nb - na) * eased;
                if channels_left > 0 {
                    channels_left -= 1;
                    out.push_str(&format_number(value.floor()));
                } else {
                    out.push_str(&format_number(value));
                }
                token_index += 1;
            }
            _ => return None,
        }
    }

    Some(out)
}

/// Split a string into literal runs and numbers
fn tokenize(s: &str) -> Vec<Chunk> {
    let bytes = s.as_bytes();
    let mut chunks = Vec::new();
    let mut literal_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if let Some(end) = number_end(bytes, i) {
            if literal_start < i {
                chunks.push(Chunk::Literal(s[literal_start..i].to_string()));
            }
            match s[i..end].parse::<f64>() {
                Ok(n) => chunks.push(Chunk::Number(n)),
                Err(_) => chunks.push(Chunk::Literal(s[i..end].to_string())),
            }
            i = end;
            literal_start = end;
        } else {
            i += 1;
        }
    }
    if literal_start < bytes.len() {
        chunks.push(Chunk::Literal(s[literal_start..].to_string()));
    }

    chunks
}

/// If a number starts at `start`, return the index one past its end.
/// Accepts `-?\d*\.?\d+` with at least one digit.
fn number_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut i = start;
    if bytes.get(i) == Some(&b'-') {
        i += 1;
    }
    let int_start = i;
    while bytes.get(i).is_some_and(u8::is_ascii_digit) {
        i += 1;
    }
    let has_int = i > int_start;

    if bytes.get(i) == Some(&b'.') && bytes.get(i + 1).is_some_and(u8::is_ascii_digit) {
        i += 1;
        while bytes.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
        }
        return Some(i);
    }

    has_int.then_some(i)
}

/// Start flooring the next three numbers after an unclosed `rgb(`/`rgba(`
fn update_color_state(literal: &str, channels_left: &mut u8) {
    if let Some(open) = literal.rfind('(') {
        let head = &literal[..open];
        let closed = literal[open..].contains(')');
        if !closed && (head.ends_with("rgb") || head.ends_with("rgba")) {
            *channels_left = 3;
            return;
        }
    }
    if literal.contains(')') {
        *channels_left = 0;
    }
}

/// Rewrite `#rgb` and `#rrggbb` colors as `rgb(r,g,b)`
fn expand_hex_colors(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(pos) = rest.find('#') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let hex_len = after.bytes().take_while(u8::is_ascii_hexdigit).count();

        match parse_hex(&after[..hex_len]) {
            Some([r, g, b]) => {
                out.push_str(&format!("rgb({r},{g},{b})"));
                rest = &after[hex_len..];
            }
            None => {
                out.push('#');
                rest = after;
            }
        }
    }
    out.push_str(rest);

    out
}

fn parse_hex(hex: &str) -> Option<[u8; 3]> {
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 => {
            let mut rgb = [0u8; 3];
            for (slot, c) in rgb.iter_mut().zip(hex.chars()) {
                let doubled: String = [c, c].iter().collect();
                *slot = channel(&doubled)?;
            }
            Some(rgb)
        }
        6 => Some([channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?]),
        _ => None,
    }
}

/// Print a number with at most four decimals and no trailing zeros
pub(crate) fn format_number(value: f64) -> String {
    let rounded = if value.fract() == 0.0 {
        value
    } else {
        (value * 10_000.0).round() / 10_000.0
    };
    if rounded == 0.0 {
        "0".to_string()
    } else if rounded.fract() == 0.0 {
        format!("{rounded}")
    } else {
        let text = format!("{rounded:.4}");
        text.trim_end_matches('0').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear() -> EasingChain {
        EasingChain::default()
    }

    #[test]
    fn test_number_tween() {
        let from = PropertyValue::from(0);
        let to = PropertyValue::from(100);
        assert_eq!(from.tween(&to, 0.5, &linear()), PropertyValue::Number(50.0));
        assert_eq!(from.tween(&to, 0.0, &linear()), from);
        assert_eq!(from.tween(&to, 1.0, &linear()), to);
    }

    #[test]
    fn test_eased_number_tween() {
        let from = PropertyValue::from(0);
        let to = PropertyValue::from(100);
        let value = from.tween(&to, 0.5, &EasingChain::parse("easeInQuad"));
        assert_eq!(value.as_number(), Some(25.0));
    }

    #[test]
    fn test_unit_string_tween() {
        let from = PropertyValue::from("10px");
        let to = PropertyValue::from("20px");
        assert_eq!(from.tween(&to, 0.5, &linear()), PropertyValue::from("15px"));
    }

    #[test]
    fn test_multi_token_easing() {
        let from = PropertyValue::from("translate(0px, 0px)");
        let to = PropertyValue::from("translate(100px, 100px)");
        let value = from.tween(&to, 0.5, &EasingChain::parse("linear easeInQuad"));
        assert_eq!(value, PropertyValue::from("translate(50px, 25px)"));
    }

    #[test]
    fn test_hex_color_tween() {
        let from = PropertyValue::from("#000");
        let to = PropertyValue::from("#ff0000");
        let value = from.tween(&to, 0.5, &linear());
        // Color channels are floored to integers
        assert_eq!(value, PropertyValue::from("rgb(127,0,0)"));
    }

    #[test]
    fn test_negative_and_fractional_numbers() {
        let from = PropertyValue::from("rotate(-90deg) scale(0.5)");
        let to = PropertyValue::from("rotate(90deg) scale(1.5)");
        let value = from.tween(&to, 0.25, &linear());
        assert_eq!(value, PropertyValue::from("rotate(-45deg) scale(0.75)"));
    }

    #[test]
    fn test_mismatched_values_step() {
        let from = PropertyValue::from("10px");
        let to = PropertyValue::from("solid 2px");
        assert_eq!(from.tween(&to, 0.9, &linear()), from);
        assert_eq!(from.tween(&to, 1.0, &linear()), to);

        let number = PropertyValue::from(5);
        assert_eq!(number.tween(&to, 0.5, &linear()), number);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(15.0), "15");
        assert_eq!(format_number(0.33333333), "0.3333");
        assert_eq!(format_number(-2.5), "-2.5");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(1e20), "100000000000000000000");
    }

    #[test]
    fn test_huge_tokens_keep_their_digits() {
        let from = PropertyValue::from("100000000000000000000px");
        let to = PropertyValue::from("300000000000000000000px");
        let value = from.tween(&to, 0.5, &linear());
        assert_eq!(value, PropertyValue::from("200000000000000000000px"));
    }

    #[test]
    fn test_untagged_serialization() {
        let values = vec![PropertyValue::from(1.5), PropertyValue::from("red")];
        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(json, r#"[1.5,"red"]"#);
        let back: Vec<PropertyValue> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, values);
    }
}
