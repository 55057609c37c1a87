use std::f64::consts::{E, PI};
use std::fmt;
use thiserror::Error;

/// How trigonometric arguments and inverse-trig results are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AngleMode {
    #[default]
    Degree,
    Radian,
}

impl AngleMode {
    pub fn toggled(self) -> Self {
        match self {
            AngleMode::Degree => AngleMode::Radian,
            AngleMode::Radian => AngleMode::Degree,
        }
    }
}

impl fmt::Display for AngleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AngleMode::Degree => write!(f, "DEG"),
            AngleMode::Radian => write!(f, "RAD"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("Unexpected character '{found}' at position {position}")]
    UnexpectedCharacter { found: char, position: usize },

    #[error("Unexpected end of input")]
    UnexpectedEnd,

    #[error("Unknown token: '{0}'")]
    UnknownToken(String),

    #[error("Invalid number: '{0}'")]
    InvalidNumber(String),

    #[error("Result is not finite: {0}")]
    NonFiniteResult(f64),
}

pub struct Step {
    pub operation: String,
    pub result: f64,
}

pub struct EvaluationTrace {
    pub steps: Vec<Step>,
    pub detailed_mode: bool,
}

impl EvaluationTrace {
    pub fn new(detailed_mode: bool) -> Self {
        EvaluationTrace {
            steps: Vec::new(),
            detailed_mode,
        }
    }

    pub fn add_step(&mut self, operation: String, result: f64) {
        if self.detailed_mode {
            self.steps.push(Step { operation, result });
        }
    }
}

/// Single-character lookahead over the input. `current` is `None` past the end.
struct Cursor {
    chars: Vec<char>,
    pos: usize,
    current: Option<char>,
}

impl Cursor {
    fn new(input: &str) -> Self {
        let chars: Vec<char> = input.chars().collect();
        let current = chars.first().copied();
        Cursor { chars, pos: 0, current }
    }

    fn advance(&mut self) {
        if self.pos < self.chars.len() {
            self.pos += 1;
        }
        self.current = self.chars.get(self.pos).copied();
    }

    /// Skips spaces, then consumes `expected` if it is next.
    fn consume_if(&mut self, expected: char) -> bool {
        while self.current == Some(' ') {
            self.advance();
        }
        if self.current == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn slice(&self, start: usize) -> String {
        self.chars[start..self.pos].iter().collect()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }
}

#[derive(Debug, Clone, Copy)]
enum Function {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Log,
    Ln,
    Sqrt,
}

impl Function {
    fn resolve(name: &str) -> Option<Self> {
        let function = match name {
            "sin" => Function::Sin,
            "cos" => Function::Cos,
            "tan" => Function::Tan,
            "asin" => Function::Asin,
            "acos" => Function::Acos,
            "atan" => Function::Atan,
            "log" => Function::Log,
            "ln" => Function::Ln,
            "√" => Function::Sqrt,
            _ => return None,
        };
        Some(function)
    }

    fn apply(self, x: f64, mode: AngleMode) -> f64 {
        let to_input = |x: f64| match mode {
            AngleMode::Degree => x.to_radians(),
            AngleMode::Radian => x,
        };
        let from_output = |x: f64| match mode {
            AngleMode::Degree => x.to_degrees(),
            AngleMode::Radian => x,
        };

        match self {
            Function::Sin => to_input(x).sin(),
            Function::Cos => to_input(x).cos(),
            Function::Tan => to_input(x).tan(),
            Function::Asin => from_output(x.asin()),
            Function::Acos => from_output(x.acos()),
            Function::Atan => from_output(x.atan()),
            Function::Log => x.log10(),
            Function::Ln => x.ln(),
            Function::Sqrt => x.sqrt(),
        }
    }
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_lowercase() || c == '√' || c == 'π'
}

fn is_number_char(c: char) -> bool {
    c.is_ascii_digit() || c == '.'
}

/// Product `1..=trunc(x)`. Truncations below 1 give the empty product.
fn factorial(x: f64) -> f64 {
    let n = x as i64;
    let mut result = 1.0;
    for i in 1..=n {
        result *= i as f64;
        if result == f64::INFINITY {
            break;
        }
    }
    result
}

struct Parser<'t> {
    cursor: Cursor,
    mode: AngleMode,
    trace: &'t mut EvaluationTrace,
}

impl<'t> Parser<'t> {
    fn parse(&mut self) -> Result<f64, EvalError> {
        let result = self.expression()?;
        if !self.cursor.at_end() {
            return Err(self.unexpected());
        }
        Ok(result)
    }

    fn unexpected(&self) -> EvalError {
        match self.cursor.current {
            Some(found) => EvalError::UnexpectedCharacter {
                found,
                position: self.cursor.pos,
            },
            None => EvalError::UnexpectedEnd,
        }
    }

    fn expression(&mut self) -> Result<f64, EvalError> {
        let mut left = self.term()?;

        loop {
            if self.cursor.consume_if('+') {
                let right = self.term()?;
                let operation = format!("{} + {}", left, right);
                left += right;
                self.trace.add_step(operation, left);
            } else if self.cursor.consume_if('-') {
                let right = self.term()?;
                let operation = format!("{} - {}", left, right);
                left -= right;
                self.trace.add_step(operation, left);
            } else {
                return Ok(left);
            }
        }
    }

    fn term(&mut self) -> Result<f64, EvalError> {
        let mut left = self.factor()?;

        loop {
            if self.cursor.consume_if('*') {
                let right = self.factor()?;
                let operation = format!("{} * {}", left, right);
                left *= right;
                self.trace.add_step(operation, left);
            } else if self.cursor.consume_if('/') {
                let right = self.factor()?;
                let operation = format!("{} / {}", left, right);
                left /= right;
                self.trace.add_step(operation, left);
            } else if self.cursor.consume_if('%') {
                let right = self.factor()?;
                let operation = format!("{} mod {}", left, right);
                left %= right;
                self.trace.add_step(operation, left);
            } else {
                return Ok(left);
            }
        }
    }

    fn factor(&mut self) -> Result<f64, EvalError> {
        if self.cursor.consume_if('+') {
            return self.factor();
        }
        if self.cursor.consume_if('-') {
            let value = -self.factor()?;
            self.trace.add_step(format!("-{}", -value), value);
            return Ok(value);
        }

        let mut x = self.primary()?;

        // The exponent is a full factor, so it takes its own postfix operators first.
        if self.cursor.consume_if('^') {
            let exponent = self.factor()?;
            let operation = format!("{} ^ {}", x, exponent);
            x = x.powf(exponent);
            self.trace.add_step(operation, x);
        }
        if self.cursor.consume_if('!') {
            let operation = format!("{}!", x);
            x = factorial(x);
            self.trace.add_step(operation, x);
        }
        if self.cursor.consume_if('%') {
            let operation = format!("{}%", x);
            x /= 100.0;
            self.trace.add_step(operation, x);
        }
        Ok(x)
    }

    fn primary(&mut self) -> Result<f64, EvalError> {
        if self.cursor.consume_if('(') {
            let x = self.expression()?;
            self.cursor.consume_if(')');
            return Ok(x);
        }

        let start = self.cursor.pos;
        let current = self.cursor.current;
        match current {
            Some(c) if is_number_char(c) => {
                while matches!(self.cursor.current, Some(c) if is_number_char(c)) {
                    self.cursor.advance();
                }
                let literal = self.cursor.slice(start);
                literal
                    .parse::<f64>()
                    .map_err(|_| EvalError::InvalidNumber(literal))
            }
            Some(c) if is_identifier_char(c) => {
                while matches!(self.cursor.current, Some(c) if is_identifier_char(c)) {
                    self.cursor.advance();
                }
                let name = self.cursor.slice(start);
                self.identifier(name)
            }
            _ => Err(self.unexpected()),
        }
    }

    fn identifier(&mut self, name: String) -> Result<f64, EvalError> {
        match name.as_str() {
            "π" => return Ok(PI),
            "e" => return Ok(E),
            _ => {}
        }

        let function = Function::resolve(&name).ok_or_else(|| EvalError::UnknownToken(name.clone()))?;
        let argument = self.factor()?;
        let result = function.apply(argument, self.mode);
        self.trace.add_step(format!("{}({})", name, argument), result);
        Ok(result)
    }
}

/// Evaluates `input` in one forward scan, recording steps into `trace`.
pub fn evaluate_traced(
    input: &str,
    mode: AngleMode,
    trace: &mut EvaluationTrace,
) -> Result<f64, EvalError> {
    log::trace!("evaluating {:?} in {} mode", input, mode);
    let mut parser = Parser {
        cursor: Cursor::new(input),
        mode,
        trace,
    };
    let result = parser.parse();
    log::trace!("{:?} -> {:?}", input, result);
    result
}

pub fn evaluate(input: &str, mode: AngleMode) -> Result<f64, EvalError> {
    evaluate_traced(input, mode, &mut EvaluationTrace::new(false))
}

/// Like [`evaluate`], but infinities and NaN are reported as errors.
pub fn evaluate_finite(input: &str, mode: AngleMode) -> Result<f64, EvalError> {
    let value = evaluate(input, mode)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EvalError::NonFiniteResult(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(input: &str) -> f64 {
        evaluate(input, AngleMode::Degree).unwrap()
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn precedence_and_grouping() {
        assert_eq!(eval("2+3*4"), 14.0);
        assert_eq!(eval("(2+3)*4"), 20.0);
        assert_eq!(eval("10-4-3"), 3.0);
        assert_eq!(eval("64/4/2"), 8.0);
        assert_eq!(eval(" 2 +  3 * 4 "), 14.0);
    }

    #[test]
    fn missing_close_paren_is_tolerated() {
        assert_eq!(eval("(2+3"), 5.0);
        assert_eq!(eval("((1+1)*(2+2"), 8.0);
    }

    #[test]
    fn unary_signs() {
        assert_eq!(eval("--5"), 5.0);
        assert_eq!(eval("+-+5"), -5.0);
        assert_eq!(eval("3*-2"), -6.0);
        // unary minus wraps the whole factor, power included
        assert_eq!(eval("-5^2"), -25.0);
    }

    #[test]
    fn decimal_literals() {
        assert_close(eval(".5+1."), 1.5);
        assert_close(eval("0.1*3"), 0.30000000000000004);
    }

    #[test]
    fn trig_follows_angle_mode() {
        assert_close(eval("sin(90)"), 1.0);
        assert_close(eval("cos(180)"), -1.0);
        assert_close(eval("sin90"), 1.0);

        let radians = evaluate("sin(90)", AngleMode::Radian).unwrap();
        assert_close(radians, 90f64.sin());
        assert!((radians - 0.894).abs() < 1e-3);
    }

    #[test]
    fn inverse_trig_converts_result() {
        assert!((eval("asin(sin(30))") - 30.0).abs() < 1e-9);
        assert_close(eval("atan(1)"), 45.0);
        assert_close(evaluate("acos(0)", AngleMode::Radian).unwrap(), PI / 2.0);
    }

    #[test]
    fn logs_roots_and_constants() {
        assert_close(eval("log(1000)"), 3.0);
        assert_close(eval("ln(e)"), 1.0);
        assert_close(eval("√(16)"), 4.0);
        assert_close(eval("√9+1"), 4.0);
        assert_close(eval("2*π"), 2.0 * PI);
        assert_close(eval("π^2"), PI * PI);
    }

    #[test]
    fn factorial_uses_truncation() {
        assert_eq!(eval("5!"), 120.0);
        assert_eq!(eval("0!"), 1.0);
        assert_eq!(eval("5.9!"), 120.0);
        assert_eq!(eval("200!"), f64::INFINITY);
    }

    // Characterization: negative truncations yield the empty product.
    #[test]
    fn negative_factorial_is_one() {
        assert_eq!(eval("(-3)!"), 1.0);
        // unary minus applies after the factorial here
        assert_eq!(eval("-3!"), -6.0);
    }

    #[test]
    fn postfix_percent() {
        assert_eq!(eval("50%"), 0.5);
        assert_close(eval("200*10%"), 20.0);
    }

    // Characterization: the exponent factor consumes postfix operators itself.
    #[test]
    fn postfix_after_power_binds_to_exponent() {
        assert_eq!(eval("2^3!"), 64.0);
        assert_close(eval("100^50%"), 10.0);
        // the second '!' is left for the power itself
        assert_eq!(eval("2^2!!"), 24.0);
        assert_eq!(eval("2^3^2"), 512.0);
    }

    // Characterization: postfix percent wins, so binary modulo needs a second '%'.
    #[test]
    fn percent_versus_modulo() {
        assert_eq!(
            evaluate("10%3", AngleMode::Degree),
            Err(EvalError::UnexpectedCharacter { found: '3', position: 3 })
        );
        assert_close(eval("10%%3"), 0.1);
        assert_close(eval("750%%3"), 1.5);
    }

    #[test]
    fn division_by_zero_is_a_value() {
        assert_eq!(eval("5/0"), f64::INFINITY);
        assert_eq!(eval("-5/0"), f64::NEG_INFINITY);
        assert!(eval("0/0").is_nan());
        assert!(eval("(-8)^(1/3)").is_nan());
        assert!(eval("log(0-1)").is_nan());
    }

    #[test]
    fn finite_wrapper_reports_non_finite() {
        assert!(matches!(
            evaluate_finite("5/0", AngleMode::Degree),
            Err(EvalError::NonFiniteResult(v)) if v == f64::INFINITY
        ));
        assert_eq!(evaluate_finite("1+1", AngleMode::Degree), Ok(2.0));
    }

    #[test]
    fn unknown_identifiers_are_rejected() {
        assert_eq!(
            evaluate("xyz(5)", AngleMode::Degree),
            Err(EvalError::UnknownToken("xyz".to_string()))
        );
        assert_eq!(
            evaluate("sinx(", AngleMode::Degree),
            Err(EvalError::UnknownToken("sinx".to_string()))
        );
        assert_eq!(
            evaluate("πe", AngleMode::Degree),
            Err(EvalError::UnknownToken("πe".to_string()))
        );
    }

    #[test]
    fn malformed_input() {
        assert_eq!(
            evaluate("2+3)", AngleMode::Degree),
            Err(EvalError::UnexpectedCharacter { found: ')', position: 3 })
        );
        assert_eq!(
            evaluate("2#", AngleMode::Degree),
            Err(EvalError::UnexpectedCharacter { found: '#', position: 1 })
        );
        assert_eq!(evaluate("2+", AngleMode::Degree), Err(EvalError::UnexpectedEnd));
        assert_eq!(evaluate("", AngleMode::Degree), Err(EvalError::UnexpectedEnd));
        assert_eq!(
            evaluate("1.2.3", AngleMode::Degree),
            Err(EvalError::InvalidNumber("1.2.3".to_string()))
        );
        assert_eq!(
            evaluate("2π", AngleMode::Degree),
            Err(EvalError::UnexpectedCharacter { found: 'π', position: 1 })
        );
    }

    #[test]
    fn trace_records_steps_only_in_detailed_mode() {
        let mut trace = EvaluationTrace::new(true);
        let result = evaluate_traced("2+3*4", AngleMode::Degree, &mut trace).unwrap();
        assert_eq!(result, 14.0);
        let operations: Vec<&str> = trace.steps.iter().map(|s| s.operation.as_str()).collect();
        assert_eq!(operations, vec!["3 * 4", "2 + 12"]);

        let mut quiet = EvaluationTrace::new(false);
        evaluate_traced("2+3*4", AngleMode::Degree, &mut quiet).unwrap();
        assert!(quiet.steps.is_empty());
    }

    #[test]
    fn angle_mode_toggles() {
        assert_eq!(AngleMode::Degree.toggled(), AngleMode::Radian);
        assert_eq!(AngleMode::Radian.toggled(), AngleMode::Degree);
    }
}
