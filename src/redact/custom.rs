//! ReDoS-safety gate for user-supplied redaction patterns
//!
//! A custom pattern's *source string* is inspected before it is ever
//! compiled or evaluated against input: nested quantifiers
//! (`(a+)+`), consecutive quantifiers (`a++`, `a*+`), and an explicit
//! repetition count above `max_repetition` are rejected outright. This is a
//! structural check on the pattern text, not a runtime guard — a rejected
//! pattern never reaches `Regex::new`.

use crate::error::{LoglyError, Result};

/// Validates a pattern source string against the nested/consecutive
/// quantifier and repetition-cap rules, then compiles it.
pub fn compile_checked(source: &str, max_repetition: u32) -> Result<regex::Regex> {
    check_quantifier_nesting(source)?;
    check_repetition_bound(source, max_repetition)?;
    regex::Regex::new(source).map_err(LoglyError::Regex)
}

/// Rejects a quantifier directly following a group that itself ends in a
/// quantifier, e.g. `(a+)+`, `(a*)+`, `(a+)*` — the classic catastrophic
/// backtracking shape — and bare consecutive quantifiers like `a++`.
fn check_quantifier_nesting(source: &str) -> Result<()> {
    let chars: Vec<char> = source.chars().collect();
    let mut depth_quantified: Vec<bool> = Vec::new();
    let mut last_was_quantifier = false;

    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '\\' => {
                i += 1;
                last_was_quantifier = false;
            }
            '(' => {
                depth_quantified.push(false);
                last_was_quantifier = false;
            }
            ')' => {
                let inner_quantified = depth_quantified.pop().unwrap_or(false);
                if inner_quantified && matches!(chars.get(i + 1), Some('+' | '*' | '?')) {
                    return Err(LoglyError::UnsafePattern(format!(
                        "nested quantifier after group close at byte offset {i}"
                    )));
                }
                last_was_quantifier = false;
            }
            '+' | '*' => {
                if last_was_quantifier {
                    return Err(LoglyError::UnsafePattern(format!(
                        "consecutive quantifiers at byte offset {i}"
                    )));
                }
                if let Some(top) = depth_quantified.last_mut() {
                    *top = true;
                }
                last_was_quantifier = true;
            }
            '?' => {
                // lazy-quantifier suffix (`a+?`) is fine; only flag when not
                // immediately following another quantifier character already
                // handled above.
                last_was_quantifier = false;
            }
            '{' => {
                if let Some(end) = source[byte_index(&chars, i)..].find('}') {
                    let inner = &source[byte_index(&chars, i) + 1..byte_index(&chars, i) + end];
                    if inner.chars().all(|c| c.is_ascii_digit() || c == ',') {
                        if last_was_quantifier {
                            return Err(LoglyError::UnsafePattern(format!(
                                "consecutive quantifiers at byte offset {i}"
                            )));
                        }
                        if let Some(top) = depth_quantified.last_mut() {
                            *top = true;
                        }
                        last_was_quantifier = true;
                    }
                }
            }
            _ => {
                last_was_quantifier = false;
            }
        }
        i += 1;
    }

    Ok(())
}

fn byte_index(chars: &[char], char_index: usize) -> usize {
    chars[..char_index].iter().map(|c| c.len_utf8()).sum()
}

/// Rejects an explicit `{n}`/`{n,m}` repetition whose upper bound exceeds
/// `max_repetition`.
fn check_repetition_bound(source: &str, max_repetition: u32) -> Result<()> {
    let mut rest = source;
    while let Some(start) = rest.find('{') {
        let after = &rest[start + 1..];
        let Some(end) = after.find('}') else {
            break;
        };
        let inner = &after[..end];
        if inner.chars().all(|c| c.is_ascii_digit() || c == ',') && !inner.is_empty() {
            let upper = inner.split(',').next_back().unwrap_or("");
            if let Ok(n) = upper.parse::<u32>() {
                if n > max_repetition {
                    return Err(LoglyError::UnsafePattern(format!(
                        "repetition bound {n} exceeds max_repetition {max_repetition}"
                    )));
                }
            }
        }
        rest = &after[end + 1..];
    }
    Ok(())
}
