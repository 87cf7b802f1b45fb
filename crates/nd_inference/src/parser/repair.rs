//! Text repairs for almost-JSON model output.
//!
//! Every repair is a pure `&str -> String` transform. They are applied in the
//! order of [`REPAIRS`], with a parse attempt after each one.

use lazy_static::lazy_static;
use regex::Regex;

pub type Repair = fn(&str) -> String;

/// Repairs in application order, with the name used in log lines.
pub const REPAIRS: &[(&str, Repair)] = &[
    ("smart quotes", normalize_quotes),
    ("trailing commas", strip_trailing_commas),
    ("single quotes", double_quote_single_quoted),
    ("array closers", fix_array_closers),
    ("control characters", strip_control_chars),
    ("delimiter balance", balance_delimiters),
];

lazy_static! {
    static ref FENCE_OPEN: Regex = Regex::new(r"^```[A-Za-z0-9_+.-]*\s*").unwrap();
    static ref FENCE_CLOSE: Regex = Regex::new(r"\s*```$").unwrap();
    static ref TRAILING_COMMA: Regex = Regex::new(r",\s*([\]}])").unwrap();
    static ref ARRAY_CLOSED_BY_BRACE: Regex = Regex::new(r"(\[[^\[\]]*?)\s*\}").unwrap();
    static ref CONTROL_CHARS: Regex = Regex::new(
        r"[\x00-\x1f\x7f\x{200e}\x{200f}\x{202a}-\x{202e}\x{2060}\x{2066}-\x{2069}\x{feff}]"
    )
    .unwrap();
}

/// Removes a surrounding Markdown code fence, with or without a language tag.
pub fn strip_fences(text: &str) -> String {
    let text = text.trim();
    let text = FENCE_OPEN.replace(text, "");
    FENCE_CLOSE.replace(&text, "").into_owned()
}

/// Applies every repair in order.
pub fn clean(text: &str) -> String {
    REPAIRS
        .iter()
        .fold(text.to_string(), |acc, (_, repair)| repair(&acc))
}

pub fn normalize_quotes(text: &str) -> String {
    text.replace(&['\u{201c}', '\u{201d}'][..], "\"")
        .replace(&['\u{2018}', '\u{2019}'][..], "'")
}

pub fn strip_trailing_commas(text: &str) -> String {
    TRAILING_COMMA.replace_all(text, "$1").into_owned()
}

/// Turns `'value'` into `"value"` when the opening quote follows a colon or
/// whitespace. Quotes inside double-quoted strings are left alone.
pub fn double_quote_single_quoted(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            i += 1;
            continue;
        }

        if c == '"' {
            in_string = true;
        } else if c == '\'' && i > 0 && (chars[i - 1] == ':' || chars[i - 1].is_whitespace()) {
            if let Some(len) = chars[i + 1..].iter().position(|&ch| ch == '\'') {
                let inner: String = chars[i + 1..i + 1 + len].iter().collect();
                out.push('"');
                out.push_str(&inner.replace('"', "\\\""));
                out.push('"');
                i += len + 2;
                continue;
            }
        }
        out.push(c);
        i += 1;
    }

    out
}

/// `["a", "b"}` becomes `["a", "b"]`.
pub fn fix_array_closers(text: &str) -> String {
    ARRAY_CLOSED_BY_BRACE.replace_all(text, "${1}]").into_owned()
}

/// Drops control characters, byte-order marks and bidi marks.
pub fn strip_control_chars(text: &str) -> String {
    CONTROL_CHARS.replace_all(text, "").into_owned()
}

/// Closes unclosed strings, brackets and braces, and trims trailing closers
/// that have no opener.
///
/// Trimming only looks at the end of the text, so an excess closer in the
/// middle survives and a legitimate trailing closer may be cut instead.
pub fn balance_delimiters(text: &str) -> String {
    let mut open = Vec::new();
    let mut excess_braces = 0usize;
    let mut excess_brackets = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for c in text.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' | '[' => open.push(c),
            '}' if open.last() == Some(&'{') => {
                open.pop();
            }
            ']' if open.last() == Some(&'[') => {
                open.pop();
            }
            '}' => excess_braces += 1,
            ']' => excess_brackets += 1,
            _ => {}
        }
    }

    let mut out = text.trim_end().to_string();
    loop {
        match out.chars().last() {
            Some('}') if excess_braces > 0 => excess_braces -= 1,
            Some(']') if excess_brackets > 0 => excess_brackets -= 1,
            _ => break,
        }
        out.pop();
        out.truncate(out.trim_end().len());
    }

    if in_string {
        out.push('"');
    }
    for opener in open.iter().rev() {
        out.push(if *opener == '{' { '}' } else { ']' });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_fences() {
        assert_eq!(strip_fences("```json\n{\"A\": []}\n```"), "{\"A\": []}");
        assert_eq!(strip_fences("```\n{}\n```"), "{}");
        assert_eq!(strip_fences("  {\"A\": []}  "), "{\"A\": []}");
    }

    #[test]
    fn test_normalize_quotes() {
        assert_eq!(normalize_quotes("{\u{201c}A\u{201d}: [\u{2018}x\u{2019}]}"), "{\"A\": ['x']}");
    }

    #[test]
    fn test_strip_trailing_commas() {
        assert_eq!(strip_trailing_commas("{\"A\": [\"x\", ],\n}"), "{\"A\": [\"x\"]}");
    }

    #[test]
    fn test_double_quote_single_quoted() {
        assert_eq!(double_quote_single_quoted("{\"A\": 'x'}"), "{\"A\": \"x\"}");
        assert_eq!(double_quote_single_quoted("[\"a\", 'b']"), "[\"a\", \"b\"]");
        // Apostrophes inside double-quoted strings stay put.
        let text = "{\"A\": [\"Biden's plan\", \"it's 'quoted' here\"]}";
        assert_eq!(double_quote_single_quoted(text), text);
        // Only quotes after a colon or whitespace are touched.
        assert_eq!(double_quote_single_quoted("{'A':['x']}"), "{'A':['x']}");
    }

    #[test]
    fn test_double_quote_escapes_inner_double_quotes() {
        assert_eq!(
            double_quote_single_quoted("{\"A\": 'say \"hi\"'}"),
            "{\"A\": \"say \\\"hi\\\"\"}"
        );
    }

    #[test]
    fn test_fix_array_closers() {
        assert_eq!(fix_array_closers("{\"A\": [\"x\", \"y\"}"), "{\"A\": [\"x\", \"y\"]");
        let valid = "{\"A\": [\"x\"], \"B\": [\"y\"]}";
        assert_eq!(fix_array_closers(valid), valid);
    }

    #[test]
    fn test_strip_control_chars() {
        assert_eq!(strip_control_chars("\u{feff}{\"A\":\u{200f} [\"x\"]}\u{0}"), "{\"A\": [\"x\"]}");
    }

    #[test]
    fn test_balance_appends_missing_closers_in_order() {
        assert_eq!(balance_delimiters("{\"A\": [\"x\""), "{\"A\": [\"x\"]}");
        assert_eq!(balance_delimiters("{\"A\": [\"x"), "{\"A\": [\"x\"]}");
    }

    #[test]
    fn test_balance_trims_excess_closers() {
        assert_eq!(balance_delimiters("{\"A\": [\"x\"]}}"), "{\"A\": [\"x\"]}");
        // An excess closer that is not at the end is left in place.
        let text = "{\"A\": [\"x\"]]}";
        assert_eq!(balance_delimiters(text), text);
    }

    #[test]
    fn test_balance_ignores_delimiters_in_strings() {
        let text = "{\"A\": [\"a { b [ c\"]}";
        assert_eq!(balance_delimiters(text), text);
    }

    #[test]
    fn test_clean_runs_every_repair() {
        let cleaned = clean("{\u{201c}A\u{201d}: [ 'x', 'y',}");
        assert_eq!(cleaned, "{\"A\": [ \"x\", \"y\"]}");
    }
}
