//! Arithmetic extraction for the calculator rule
//!
//! Pulls the first two integers out of an utterance and evaluates the
//! operator named by a keyword. Spoken input is messy, so the scan is
//! deliberately loose: any two digit runs anywhere in the text qualify.

use regex::Regex;
use std::sync::LazyLock;

/// Matches runs of decimal digits anywhere in the utterance
static NUMBERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("Invalid number regex"));

/// Keywords that bring an utterance into the calculator rule
pub const TRIGGER_WORDS: &[&str] = &[
    "calculate",
    "plus",
    "add",
    "minus",
    "subtract",
    "times",
    "multiply",
    "divided",
];

/// The four supported operators
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

/// A parsed calculation request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Calculation {
    pub a: i64,
    pub b: i64,
    pub op: Operator,
}

impl Calculation {
    /// Render the spoken answer sentence
    ///
    /// Division is rounded to two decimal places; a zero divisor gets an
    /// explicit refusal instead of a non-finite value.
    pub fn answer(&self) -> String {
        match self.op {
            Operator::Add => {
                format!("{} plus {} equals {}.", self.a, self.b, self.a.saturating_add(self.b))
            }
            Operator::Subtract => {
                format!("{} minus {} equals {}.", self.a, self.b, self.a.saturating_sub(self.b))
            }
            Operator::Multiply => {
                format!("{} times {} equals {}.", self.a, self.b, self.a.saturating_mul(self.b))
            }
            Operator::Divide => {
                if self.b == 0 {
                    format!("I can't divide {} by zero.", self.a)
                } else {
                    format!(
                        "{} divided by {} equals {:.2}.",
                        self.a,
                        self.b,
                        self.a as f64 / self.b as f64
                    )
                }
            }
        }
    }
}

/// Check whether the lower-cased utterance asks for a calculation
pub fn is_calculation_request(lower: &str) -> bool {
    TRIGGER_WORDS.iter().any(|word| lower.contains(word))
}

/// Pick the operator by keyword, first match wins
///
/// The check order doubles as precedence when an utterance names several
/// operators ("9 plus 10 minus 3" adds).
pub fn detect_operator(lower: &str) -> Option<Operator> {
    if lower.contains("plus") || lower.contains("add") {
        return Some(Operator::Add);
    }
    if lower.contains("minus") || lower.contains("subtract") {
        return Some(Operator::Subtract);
    }
    if lower.contains("times") || lower.contains("multiply") {
        return Some(Operator::Multiply);
    }
    if lower.contains("divided") {
        return Some(Operator::Divide);
    }
    None
}

/// First two integers in utterance order, scanned from the raw text
///
/// Digit runs that overflow `i64` are skipped rather than aborting the scan.
pub fn extract_operands(text: &str) -> Option<(i64, i64)> {
    let mut numbers = NUMBERS
        .find_iter(text)
        .filter_map(|m| m.as_str().parse::<i64>().ok());
    let a = numbers.next()?;
    let b = numbers.next()?;
    Some((a, b))
}

/// Parse a full calculation from the utterance
///
/// Returns `None` when the operands or the operator are missing, letting
/// the caller fall through to later rules.
pub fn parse_calculation(raw: &str, lower: &str) -> Option<Calculation> {
    let (a, b) = extract_operands(raw)?;
    let op = detect_operator(lower)?;
    Some(Calculation { a, b, op })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_operands_first_two() {
        assert_eq!(extract_operands("what is 5 plus 3"), Some((5, 3)));
        assert_eq!(extract_operands("12 and 34 and 56"), Some((12, 34)));
        assert_eq!(extract_operands("room101 seats 20"), Some((101, 20)));
    }

    #[test]
    fn test_extract_operands_insufficient() {
        assert_eq!(extract_operands("just 7"), None);
        assert_eq!(extract_operands("no numbers here"), None);
        assert_eq!(extract_operands(""), None);
    }

    #[test]
    fn test_extract_operands_skips_overflow() {
        assert_eq!(
            extract_operands("99999999999999999999999999 then 4 then 2"),
            Some((4, 2))
        );
    }

    #[test]
    fn test_detect_operator_keywords() {
        assert_eq!(detect_operator("five plus three"), Some(Operator::Add));
        assert_eq!(detect_operator("add these up"), Some(Operator::Add));
        assert_eq!(detect_operator("nine minus two"), Some(Operator::Subtract));
        assert_eq!(detect_operator("subtract it"), Some(Operator::Subtract));
        assert_eq!(detect_operator("four times four"), Some(Operator::Multiply));
        assert_eq!(detect_operator("multiply them"), Some(Operator::Multiply));
        assert_eq!(detect_operator("ten divided by two"), Some(Operator::Divide));
        assert_eq!(detect_operator("what time is it"), None);
    }

    #[test]
    fn test_detect_operator_first_match_wins() {
        assert_eq!(detect_operator("9 plus 10 minus 3"), Some(Operator::Add));
        assert_eq!(
            detect_operator("6 minus 2 divided by 2"),
            Some(Operator::Subtract)
        );
    }

    #[test]
    fn test_answer_sentences() {
        let calc = Calculation { a: 5, b: 3, op: Operator::Add };
        assert_eq!(calc.answer(), "5 plus 3 equals 8.");

        let calc = Calculation { a: 9, b: 12, op: Operator::Subtract };
        assert_eq!(calc.answer(), "9 minus 12 equals -3.");

        let calc = Calculation { a: 6, b: 7, op: Operator::Multiply };
        assert_eq!(calc.answer(), "6 times 7 equals 42.");
    }

    #[test]
    fn test_division_rounds_to_two_places() {
        let calc = Calculation { a: 10, b: 3, op: Operator::Divide };
        assert_eq!(calc.answer(), "10 divided by 3 equals 3.33.");

        let calc = Calculation { a: 7, b: 2, op: Operator::Divide };
        assert_eq!(calc.answer(), "7 divided by 2 equals 3.50.");
    }

    #[test]
    fn test_division_by_zero_refused() {
        let calc = Calculation { a: 5, b: 0, op: Operator::Divide };
        assert_eq!(calc.answer(), "I can't divide 5 by zero.");
    }

    #[test]
    fn test_parse_calculation() {
        assert_eq!(
            parse_calculation("what is 5 plus 3", "what is 5 plus 3"),
            Some(Calculation { a: 5, b: 3, op: Operator::Add })
        );
        // Operands come from the raw text, the operator from the lower-cased text
        assert_eq!(
            parse_calculation("Calculate 8 TIMES 2", "calculate 8 times 2"),
            Some(Calculation { a: 8, b: 2, op: Operator::Multiply })
        );
        // Trigger word without operands declines
        assert_eq!(parse_calculation("calculate something", "calculate something"), None);
        // Operands without an operator keyword decline
        assert_eq!(parse_calculation("calculate 5 and 3", "calculate 5 and 3"), None);
    }

    #[test]
    fn test_is_calculation_request() {
        assert!(is_calculation_request("what is 2 plus 2"));
        assert!(is_calculation_request("add 3 and 4"));
        assert!(is_calculation_request("calculate this"));
        assert!(!is_calculation_request("tell me a joke"));
    }
}
