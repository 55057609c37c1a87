use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Fraction digits kept when a result is echoed or written to history.
pub const MAX_FRACTION_DIGITS: usize = 10;

static NUMBER_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?P<int>[0-9]+)(?P<frac>\.[0-9]*)?|(?P<bare>\.[0-9]+)").unwrap());

/// Renders an evaluation result with at most ten fraction digits and no
/// trailing zeros. The output always uses `.` so it can be parsed again.
pub fn format_result(x: f64) -> String {
    if !x.is_finite() {
        return "Error".to_string();
    }

    let s = format!("{:.*}", MAX_FRACTION_DIGITS, x);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

fn group_digits(digits: &str, separator: char) -> String {
    let len = digits.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(c);
    }
    grouped
}

/// Inserts `separator` into the integer part of every numeric literal in a
/// partially typed expression. Operators, names and fractions are untouched.
pub fn group_display(expr: &str, separator: char) -> String {
    NUMBER_RUN
        .replace_all(expr, |caps: &Captures| {
            if let Some(bare) = caps.name("bare") {
                return bare.as_str().to_string();
            }
            let mut out = group_digits(&caps["int"], separator);
            if let Some(frac) = caps.name("frac") {
                out.push_str(frac.as_str());
            }
            out
        })
        .into_owned()
}

/// Spaces binary operators out for the history list, e.g. `2+sin(3)` -> `2 + sin(3)`.
pub fn format_with_spaces(expr: &str) -> String {
    let mut result = String::new();
    let mut last_char = '\0';

    for c in expr.chars() {
        match c {
            '+' | '-' | '*' | '/' | '^' => {
                // a sign right after an operator or an opening paren stays attached
                let unary = matches!(last_char, '\0' | '(' | '+' | '-' | '*' | '/' | '^' | '%');
                if unary {
                    result.push(c);
                } else {
                    result.push(' ');
                    result.push(c);
                    result.push(' ');
                }
                last_char = c;
            }
            _ if c.is_whitespace() => continue,
            _ => {
                result.push(c);
                last_char = c;
            }
        }
    }

    result.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_is_bounded_and_trimmed() {
        assert_eq!(format_result(14.0), "14");
        assert_eq!(format_result(0.5), "0.5");
        assert_eq!(format_result(1.0 / 3.0), "0.3333333333");
        assert_eq!(format_result(2.0 / 3.0), "0.6666666667");
        assert_eq!(format_result(-2.5), "-2.5");
        assert_eq!(format_result(0.1 + 0.2), "0.3");
        assert_eq!(format_result(1e-12), "0");
        assert_eq!(format_result(-1e-12), "0");
        assert_eq!(format_result(123456789.0), "123456789");
    }

    #[test]
    fn non_finite_renders_error() {
        assert_eq!(format_result(f64::INFINITY), "Error");
        assert_eq!(format_result(f64::NAN), "Error");
    }

    #[test]
    fn grouping_touches_only_integer_parts() {
        assert_eq!(group_display("1234567", ','), "1,234,567");
        assert_eq!(group_display("1234.5678", ','), "1,234.5678");
        assert_eq!(group_display("sin(12345)+999", ','), "sin(12,345)+999");
        assert_eq!(group_display("1000.", ','), "1,000.");
        assert_eq!(group_display(".12345", ','), ".12345");
        assert_eq!(group_display("√π", ','), "√π");
        assert_eq!(group_display("1234567", ' '), "1 234 567");
    }

    #[test]
    fn grouping_is_idempotent() {
        for input in ["1234567.891", "12*3456-(7890%", "-98765.4321", "0"] {
            let once = group_display(&format_result_or_raw(input), ',');
            let twice = group_display(&once, ',');
            assert_eq!(once, twice);
        }
        let shown = group_display(&format_result(1234567.0 / 3.0), ',');
        assert_eq!(shown, "411,522.3333333333");
        assert_eq!(group_display(&shown, ','), shown);
    }

    fn format_result_or_raw(input: &str) -> String {
        input
            .parse::<f64>()
            .map(format_result)
            .unwrap_or_else(|_| input.to_string())
    }

    #[test]
    fn spacing_keeps_unary_signs() {
        assert_eq!(format_with_spaces("2+3*4"), "2 + 3 * 4");
        assert_eq!(format_with_spaces("-5^2"), "-5 ^ 2");
        assert_eq!(format_with_spaces("3*-2"), "3 * -2");
        assert_eq!(format_with_spaces("sin(-90)+ 1"), "sin(-90) + 1");
        assert_eq!(format_with_spaces("50%"), "50%");
    }
}
