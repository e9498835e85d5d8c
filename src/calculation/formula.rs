//! Formula expression evaluation.
//!
//! Formulas are a small arithmetic language over the worker's variables:
//!
//! ```text
//! expr       := additive (("<" | "<=" | ">" | ">=" | "==" | "!=") additive)?
//! additive   := term (("+" | "-") term)*
//! term       := unary (("*" | "/") unary)*
//! unary      := ("-" | "+") unary | primary
//! primary    := NUMBER | VARIABLE | FUNCTION "(" expr ("," expr)* ")" | "(" expr ")"
//! ```
//!
//! Functions are `IF(cond, a, b)`, `MAX(a, b, ...)`, `MIN(a, b, ...)`,
//! `ABS(a)`, `ROUND(a)` and `ROUND(a, places)`. Comparisons yield 1 or 0.
//!
//! The tokenizer is the allowlist: any character outside digits, `.`,
//! identifiers, the operators, parentheses, commas and whitespace is
//! rejected. Identifiers are read whole and resolved against the context as
//! a single unit, so `BASE` never matches inside `BASE_EXTRA`. Arithmetic
//! is decimal and overflow-checked.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

use super::context::VariableContext;

/// Longest formula accepted, in characters.
pub const MAX_FORMULA_LENGTH: usize = 1024;

/// Deepest nesting of parentheses, unary operators and calls accepted.
pub const MAX_NESTING_DEPTH: usize = 64;

/// Largest number of decimal places `ROUND(a, places)` accepts.
const MAX_ROUND_PLACES: u32 = 10;

/// Why a formula could not be evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaError {
    /// The formula was empty or whitespace only.
    #[error("formula is empty")]
    Empty,

    /// The formula exceeded [`MAX_FORMULA_LENGTH`].
    #[error("formula is {length} characters long, limit is {max}")]
    TooLong {
        /// Actual length.
        length: usize,
        /// The limit.
        max: usize,
    },

    /// A character outside the allowlist.
    #[error("disallowed character {ch:?} at position {position}")]
    DisallowedCharacter {
        /// The offending character.
        ch: char,
        /// Character offset in the formula.
        position: usize,
    },

    /// A numeric literal that is not a valid decimal.
    #[error("invalid number literal '{literal}'")]
    InvalidNumber {
        /// The literal as written.
        literal: String,
    },

    /// An identifier that is neither a known variable nor a function.
    #[error("unknown variable '{name}'")]
    UnknownVariable {
        /// The identifier.
        name: String,
    },

    /// A call to a function outside the supported set.
    #[error("unknown function '{name}'")]
    UnknownFunction {
        /// The function name as written.
        name: String,
    },

    /// A supported function called with the wrong number of arguments.
    #[error("{function} expects {expected} argument(s), got {found}")]
    WrongArity {
        /// The function.
        function: &'static str,
        /// Human-readable expected count.
        expected: &'static str,
        /// Actual count.
        found: usize,
    },

    /// A function argument outside its accepted range.
    #[error("invalid argument to {function}: {message}")]
    InvalidArgument {
        /// The function.
        function: &'static str,
        /// What was wrong.
        message: String,
    },

    /// A token where it cannot appear.
    #[error("unexpected token '{found}'")]
    UnexpectedToken {
        /// The token as text.
        found: String,
    },

    /// The formula ended in the middle of an expression.
    #[error("unexpected end of formula")]
    UnexpectedEnd,

    /// Nesting exceeded [`MAX_NESTING_DEPTH`].
    #[error("formula nesting exceeds {max} levels")]
    NestingTooDeep {
        /// The limit.
        max: usize,
    },

    /// Division by zero.
    #[error("division by zero")]
    DivisionByZero,

    /// A result outside the decimal range.
    #[error("arithmetic overflow")]
    Overflow,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(Decimal),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
    Comma,
    Lt,
    Lte,
    Gt,
    Gte,
    EqEq,
    Neq,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Number(n) => n.to_string(),
            Token::Ident(name) => name.clone(),
            Token::Plus => "+".to_string(),
            Token::Minus => "-".to_string(),
            Token::Star => "*".to_string(),
            Token::Slash => "/".to_string(),
            Token::LParen => "(".to_string(),
            Token::RParen => ")".to_string(),
            Token::Comma => ",".to_string(),
            Token::Lt => "<".to_string(),
            Token::Lte => "<=".to_string(),
            Token::Gt => ">".to_string(),
            Token::Gte => ">=".to_string(),
            Token::EqEq => "==".to_string(),
            Token::Neq => "!=".to_string(),
        }
    }
}

fn tokenize(src: &str) -> Result<Vec<Token>, FormulaError> {
    let chars: Vec<char> = src.chars().collect();
    let mut tokens = Vec::new();
    let mut pos = 0usize;

    while pos < chars.len() {
        let c = chars[pos];

        if c.is_ascii_whitespace() {
            pos += 1;
            continue;
        }

        if c.is_ascii_digit() || c == '.' {
            let start = pos;
            while pos < chars.len() && (chars[pos].is_ascii_digit() || chars[pos] == '.') {
                pos += 1;
            }
            let literal: String = chars[start..pos].iter().collect();
            let value = parse_number(&literal)?;
            tokens.push(Token::Number(value));
            continue;
        }

        if c.is_ascii_alphabetic() || c == '_' {
            let start = pos;
            while pos < chars.len() && (chars[pos].is_ascii_alphanumeric() || chars[pos] == '_') {
                pos += 1;
            }
            tokens.push(Token::Ident(chars[start..pos].iter().collect()));
            continue;
        }

        let next = chars.get(pos + 1).copied();
        let (token, width) = match (c, next) {
            ('<', Some('=')) => (Token::Lte, 2),
            ('>', Some('=')) => (Token::Gte, 2),
            ('=', Some('=')) => (Token::EqEq, 2),
            ('!', Some('=')) => (Token::Neq, 2),
            ('<', _) => (Token::Lt, 1),
            ('>', _) => (Token::Gt, 1),
            ('+', _) => (Token::Plus, 1),
            ('-', _) => (Token::Minus, 1),
            ('*', _) => (Token::Star, 1),
            ('/', _) => (Token::Slash, 1),
            ('(', _) => (Token::LParen, 1),
            (')', _) => (Token::RParen, 1),
            (',', _) => (Token::Comma, 1),
            _ => return Err(FormulaError::DisallowedCharacter { ch: c, position: pos }),
        };
        tokens.push(token);
        pos += width;
    }

    Ok(tokens)
}

fn parse_number(literal: &str) -> Result<Decimal, FormulaError> {
    let invalid = || FormulaError::InvalidNumber {
        literal: literal.to_string(),
    };
    if literal.matches('.').count() > 1 || !literal.chars().any(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    let normalized = if literal.starts_with('.') {
        format!("0{}", literal)
    } else {
        literal.trim_end_matches('.').to_string()
    };
    normalized.parse::<Decimal>().map_err(|_| invalid())
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum CompareOp {
    Lt,
    Lte,
    Gt,
    Gte,
    Eq,
    Neq,
}

/// Parsed formula. Variables are already resolved to their values, and
/// `IF` branches are only evaluated when taken.
#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Number(Decimal),
    Neg(Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Compare(CompareOp, Box<Expr>, Box<Expr>),
    If(Box<Expr>, Box<Expr>, Box<Expr>),
    Max(Vec<Expr>),
    Min(Vec<Expr>),
    Abs(Box<Expr>),
    Round(Box<Expr>, Option<Box<Expr>>),
}

struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    variables: &'a VariableContext,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, expected: Token) -> Result<(), FormulaError> {
        match self.advance() {
            Some(ref token) if *token == expected => Ok(()),
            Some(token) => Err(FormulaError::UnexpectedToken {
                found: token.describe(),
            }),
            None => Err(FormulaError::UnexpectedEnd),
        }
    }

    fn enter(&mut self) -> Result<(), FormulaError> {
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            return Err(FormulaError::NestingTooDeep {
                max: MAX_NESTING_DEPTH,
            });
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn parse_formula(&mut self) -> Result<Expr, FormulaError> {
        let expr = self.parse_expr()?;
        match self.peek() {
            None => Ok(expr),
            Some(token) => Err(FormulaError::UnexpectedToken {
                found: token.describe(),
            }),
        }
    }

    fn parse_expr(&mut self) -> Result<Expr, FormulaError> {
        let left = self.parse_additive()?;
        let op = match self.peek() {
            Some(Token::Lt) => CompareOp::Lt,
            Some(Token::Lte) => CompareOp::Lte,
            Some(Token::Gt) => CompareOp::Gt,
            Some(Token::Gte) => CompareOp::Gte,
            Some(Token::EqEq) => CompareOp::Eq,
            Some(Token::Neq) => CompareOp::Neq,
            _ => return Ok(left),
        };
        self.advance();
        let right = self.parse_additive()?;
        Ok(Expr::Compare(op, Box::new(left), Box::new(right)))
    }

    fn parse_additive(&mut self) -> Result<Expr, FormulaError> {
        let mut left = self.parse_term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_term()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
    }

    fn parse_term(&mut self) -> Result<Expr, FormulaError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_unary()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, FormulaError> {
        self.enter()?;
        let expr = match self.peek() {
            Some(Token::Minus) => {
                self.advance();
                Expr::Neg(Box::new(self.parse_unary()?))
            }
            Some(Token::Plus) => {
                self.advance();
                self.parse_unary()?
            }
            _ => self.parse_primary()?,
        };
        self.leave();
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, FormulaError> {
        match self.advance() {
            Some(Token::Number(value)) => Ok(Expr::Number(value)),
            Some(Token::LParen) => {
                let expr = self.parse_expr()?;
                self.expect(Token::RParen)?;
                Ok(expr)
            }
            Some(Token::Ident(name)) => {
                if self.peek() == Some(&Token::LParen) {
                    self.advance();
                    self.parse_call(&name)
                } else {
                    self.variables
                        .get(&name)
                        .map(Expr::Number)
                        .ok_or(FormulaError::UnknownVariable { name })
                }
            }
            Some(token) => Err(FormulaError::UnexpectedToken {
                found: token.describe(),
            }),
            None => Err(FormulaError::UnexpectedEnd),
        }
    }

    /// Parses the arguments of a call whose opening parenthesis is consumed.
    fn parse_call(&mut self, name: &str) -> Result<Expr, FormulaError> {
        let mut args = Vec::new();
        if self.peek() != Some(&Token::RParen) {
            loop {
                args.push(self.parse_expr()?);
                match self.peek() {
                    Some(Token::Comma) => {
                        self.advance();
                    }
                    _ => break,
                }
            }
        }
        self.expect(Token::RParen)?;

        let found = args.len();
        match name.to_ascii_uppercase().as_str() {
            "IF" => {
                let [cond, then, otherwise]: [Expr; 3] =
                    args.try_into().map_err(|_| FormulaError::WrongArity {
                        function: "IF",
                        expected: "3",
                        found,
                    })?;
                Ok(Expr::If(Box::new(cond), Box::new(then), Box::new(otherwise)))
            }
            "MAX" if found >= 2 => Ok(Expr::Max(args)),
            "MIN" if found >= 2 => Ok(Expr::Min(args)),
            "MAX" => Err(FormulaError::WrongArity {
                function: "MAX",
                expected: "at least 2",
                found,
            }),
            "MIN" => Err(FormulaError::WrongArity {
                function: "MIN",
                expected: "at least 2",
                found,
            }),
            "ABS" => {
                let [value]: [Expr; 1] = args.try_into().map_err(|_| FormulaError::WrongArity {
                    function: "ABS",
                    expected: "1",
                    found,
                })?;
                Ok(Expr::Abs(Box::new(value)))
            }
            "ROUND" => {
                let mut args = args.into_iter();
                match (args.next(), args.next(), args.next()) {
                    (Some(value), None, None) => Ok(Expr::Round(Box::new(value), None)),
                    (Some(value), Some(places), None) => {
                        Ok(Expr::Round(Box::new(value), Some(Box::new(places))))
                    }
                    _ => Err(FormulaError::WrongArity {
                        function: "ROUND",
                        expected: "1 or 2",
                        found,
                    }),
                }
            }
            _ => Err(FormulaError::UnknownFunction {
                name: name.to_string(),
            }),
        }
    }
}

fn truth(value: bool) -> Decimal {
    if value { Decimal::ONE } else { Decimal::ZERO }
}

fn eval(expr: &Expr) -> Result<Decimal, FormulaError> {
    match expr {
        Expr::Number(value) => Ok(*value),
        Expr::Neg(inner) => Ok(-eval(inner)?),
        Expr::Binary(op, lhs, rhs) => {
            let (a, b) = (eval(lhs)?, eval(rhs)?);
            match op {
                BinaryOp::Add => a.checked_add(b).ok_or(FormulaError::Overflow),
                BinaryOp::Sub => a.checked_sub(b).ok_or(FormulaError::Overflow),
                BinaryOp::Mul => a.checked_mul(b).ok_or(FormulaError::Overflow),
                BinaryOp::Div if b.is_zero() => Err(FormulaError::DivisionByZero),
                BinaryOp::Div => a.checked_div(b).ok_or(FormulaError::Overflow),
            }
        }
        Expr::Compare(op, lhs, rhs) => {
            let (a, b) = (eval(lhs)?, eval(rhs)?);
            Ok(truth(match op {
                CompareOp::Lt => a < b,
                CompareOp::Lte => a <= b,
                CompareOp::Gt => a > b,
                CompareOp::Gte => a >= b,
                CompareOp::Eq => a == b,
                CompareOp::Neq => a != b,
            }))
        }
        Expr::If(cond, then, otherwise) => {
            if eval(cond)?.is_zero() {
                eval(otherwise)
            } else {
                eval(then)
            }
        }
        Expr::Max(args) => fold_extreme(args, Decimal::max),
        Expr::Min(args) => fold_extreme(args, Decimal::min),
        Expr::Abs(inner) => Ok(eval(inner)?.abs()),
        Expr::Round(value, places) => {
            let value = eval(value)?;
            let places = match places {
                None => 0,
                Some(places) => round_places(eval(places)?)?,
            };
            Ok(value.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero))
        }
    }
}

fn fold_extreme(args: &[Expr], pick: fn(Decimal, Decimal) -> Decimal) -> Result<Decimal, FormulaError> {
    let mut values = args.iter().map(eval);
    let first = values.next().ok_or(FormulaError::UnexpectedEnd)??;
    values.try_fold(first, |acc, value: Result<Decimal, FormulaError>| {
        value.map(|value| pick(acc, value))
    })
}

fn round_places(places: Decimal) -> Result<u32, FormulaError> {
    let invalid = || FormulaError::InvalidArgument {
        function: "ROUND",
        message: format!("places must be a whole number from 0 to {}", MAX_ROUND_PLACES),
    };
    if !places.fract().is_zero() {
        return Err(invalid());
    }
    match places.to_u32() {
        Some(places) if places <= MAX_ROUND_PLACES => Ok(places),
        _ => Err(invalid()),
    }
}

/// Evaluates a formula, reporting why it failed.
///
/// The raw result is returned: no clamping and no rounding.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::{FormulaError, VariableContext, try_evaluate};
/// use rust_decimal::Decimal;
///
/// let vars = VariableContext::from_pairs([("BASIC_SALARY", Decimal::from(1500))]);
/// assert_eq!(try_evaluate("BASIC_SALARY / 0", &vars), Err(FormulaError::DivisionByZero));
/// ```
pub fn try_evaluate(expression: &str, variables: &VariableContext) -> Result<Decimal, FormulaError> {
    let length = expression.chars().count();
    if length > MAX_FORMULA_LENGTH {
        return Err(FormulaError::TooLong {
            length,
            max: MAX_FORMULA_LENGTH,
        });
    }
    let tokens = tokenize(expression)?;
    if tokens.is_empty() {
        return Err(FormulaError::Empty);
    }
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
        variables,
    };
    let expr = parser.parse_formula()?;
    eval(&expr)
}

/// Evaluates a formula and never fails.
///
/// Malformed formulas, unknown names, disallowed characters and arithmetic
/// errors all yield zero. Negative results are clamped to zero.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::{VariableContext, evaluate};
/// use rust_decimal::Decimal;
///
/// let vars = VariableContext::from_pairs([("BASIC_SALARY", Decimal::from(1500))]);
/// assert_eq!(evaluate("MAX(BASIC_SALARY, 1000)", &vars), Decimal::from(1500));
/// assert_eq!(evaluate("BASIC_SALARY; rm -rf /", &vars), Decimal::ZERO);
/// ```
pub fn evaluate(expression: &str, variables: &VariableContext) -> Decimal {
    match try_evaluate(expression, variables) {
        Ok(value) if value.is_sign_negative() => Decimal::ZERO,
        Ok(value) => value,
        Err(_) => Decimal::ZERO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn vars(pairs: &[(&str, &str)]) -> VariableContext {
        VariableContext::from_pairs(pairs.iter().map(|(k, v)| (*k, dec(v))))
    }

    #[test]
    fn test_literal_arithmetic_and_precedence() {
        let empty = VariableContext::default();
        assert_eq!(evaluate("1 + 2 * 3", &empty), dec("7"));
        assert_eq!(evaluate("(1 + 2) * 3", &empty), dec("9"));
        assert_eq!(evaluate("10 / 4", &empty), dec("2.5"));
        assert_eq!(evaluate("10 - 2 - 3", &empty), dec("5"));
        assert_eq!(evaluate("-2 * -3", &empty), dec("6"));
        assert_eq!(evaluate(".5 + 1.", &empty), dec("1.5"));
    }

    #[test]
    fn test_max_with_variable() {
        let high = vars(&[("BASIC_SALARY", "1500")]);
        let low = vars(&[("BASIC_SALARY", "500")]);
        assert_eq!(evaluate("MAX(BASIC_SALARY, 1000)", &high), dec("1500"));
        assert_eq!(evaluate("MAX(BASIC_SALARY, 1000)", &low), dec("1000"));
    }

    #[test]
    fn test_min_abs_round() {
        let v = vars(&[("X", "-12.345")]);
        assert_eq!(evaluate("MIN(5, 3, 9)", &v), dec("3"));
        assert_eq!(evaluate("ABS(X)", &v), dec("12.345"));
        assert_eq!(evaluate("ROUND(ABS(X))", &v), dec("12"));
        assert_eq!(evaluate("ROUND(ABS(X), 2)", &v), dec("12.35"));
        assert_eq!(evaluate("ROUND(2.5)", &v), dec("3"));
    }

    #[test]
    fn test_if_with_comparisons() {
        let v = vars(&[("TENURE_YEARS", "6"), ("BASIC_SALARY", "2000")]);
        assert_eq!(
            evaluate("IF(TENURE_YEARS >= 5, BASIC_SALARY * 0.1, 0)", &v),
            dec("200")
        );
        assert_eq!(evaluate("IF(TENURE_YEARS < 5, 100, 50)", &v), dec("50"));
        assert_eq!(evaluate("IF(TENURE_YEARS == 6, 1, 2)", &v), dec("1"));
        assert_eq!(evaluate("IF(TENURE_YEARS != 6, 1, 2)", &v), dec("2"));
        assert_eq!(evaluate("TENURE_YEARS > 3", &v), dec("1"));
    }

    #[test]
    fn test_if_only_evaluates_taken_branch() {
        let v = vars(&[("WORKED_DAYS", "0")]);
        assert_eq!(
            try_evaluate("IF(WORKED_DAYS > 0, 3000 / WORKED_DAYS, 7)", &v),
            Ok(dec("7"))
        );
    }

    #[test]
    fn test_function_names_are_case_insensitive() {
        let v = vars(&[("A", "4")]);
        assert_eq!(evaluate("max(A, 2) + Min(A, 2)", &v), dec("6"));
    }

    #[test]
    fn test_prefix_variable_names_are_not_partially_replaced() {
        let v = vars(&[("BASE", "100"), ("BASE_EXTRA", "5")]);
        assert_eq!(evaluate("BASE_EXTRA", &v), dec("5"));
        assert_eq!(evaluate("BASE + BASE_EXTRA", &v), dec("105"));

        let only_base = vars(&[("BASE", "100")]);
        assert_eq!(
            try_evaluate("BASE_EXTRA * 2", &only_base),
            Err(FormulaError::UnknownVariable {
                name: "BASE_EXTRA".to_string()
            })
        );
    }

    #[test]
    fn test_disallowed_tokens_yield_zero() {
        let v = vars(&[("BASIC_SALARY", "1000")]);
        for formula in [
            "BASIC_SALARY; process.exit()",
            "BASIC_SALARY && 1",
            "\"1000\"",
            "BASIC_SALARY = 5",
            "BASIC_SALARY % 7",
            "[1]",
            "BASIC_SALARY ^ 2",
        ] {
            assert_eq!(evaluate(formula, &v), Decimal::ZERO, "formula {:?}", formula);
        }
        assert_eq!(
            try_evaluate("1 $ 2", &v),
            Err(FormulaError::DisallowedCharacter { ch: '$', position: 2 })
        );
    }

    #[test]
    fn test_unknown_identifiers_and_functions_yield_zero() {
        let v = VariableContext::default();
        assert_eq!(evaluate("eval(1)", &v), Decimal::ZERO);
        assert_eq!(
            try_evaluate("SQRT(4)", &v),
            Err(FormulaError::UnknownFunction {
                name: "SQRT".to_string()
            })
        );
        assert_eq!(
            try_evaluate("SALARY", &v),
            Err(FormulaError::UnknownVariable {
                name: "SALARY".to_string()
            })
        );
    }

    #[test]
    fn test_malformed_formulas_yield_zero() {
        let v = VariableContext::default();
        assert_eq!(try_evaluate("", &v), Err(FormulaError::Empty));
        assert_eq!(try_evaluate("   ", &v), Err(FormulaError::Empty));
        assert_eq!(try_evaluate("1 +", &v), Err(FormulaError::UnexpectedEnd));
        assert_eq!(try_evaluate("(1 + 2", &v), Err(FormulaError::UnexpectedEnd));
        assert!(matches!(
            try_evaluate("1 2", &v),
            Err(FormulaError::UnexpectedToken { .. })
        ));
        assert!(matches!(
            try_evaluate("1..2", &v),
            Err(FormulaError::InvalidNumber { .. })
        ));
        assert!(matches!(
            try_evaluate("1 < 2 < 3", &v),
            Err(FormulaError::UnexpectedToken { .. })
        ));
        assert_eq!(evaluate("1 +", &v), Decimal::ZERO);
    }

    #[test]
    fn test_arity_is_checked() {
        let v = VariableContext::default();
        assert!(matches!(
            try_evaluate("IF(1, 2)", &v),
            Err(FormulaError::WrongArity { function: "IF", found: 2, .. })
        ));
        assert!(matches!(
            try_evaluate("MAX(1)", &v),
            Err(FormulaError::WrongArity { function: "MAX", .. })
        ));
        assert!(matches!(
            try_evaluate("ABS()", &v),
            Err(FormulaError::WrongArity { function: "ABS", found: 0, .. })
        ));
        assert!(matches!(
            try_evaluate("ROUND(1, 2, 3)", &v),
            Err(FormulaError::WrongArity { function: "ROUND", .. })
        ));
        assert!(matches!(
            try_evaluate("ROUND(1.5, 0.5)", &v),
            Err(FormulaError::InvalidArgument { function: "ROUND", .. })
        ));
    }

    #[test]
    fn test_division_by_zero_yields_zero() {
        let v = vars(&[("WORKED_DAYS", "0")]);
        assert_eq!(
            try_evaluate("100 / WORKED_DAYS", &v),
            Err(FormulaError::DivisionByZero)
        );
        assert_eq!(evaluate("100 / WORKED_DAYS", &v), Decimal::ZERO);
    }

    #[test]
    fn test_negative_results_are_clamped() {
        let v = vars(&[("BASIC_SALARY", "1000")]);
        assert_eq!(try_evaluate("BASIC_SALARY - 1500", &v), Ok(dec("-500")));
        assert_eq!(evaluate("BASIC_SALARY - 1500", &v), Decimal::ZERO);
    }

    #[test]
    fn test_overflow_yields_zero() {
        let v = VariableContext::default();
        let formula = "79228162514264337593543950335 * 10";
        assert_eq!(try_evaluate(formula, &v), Err(FormulaError::Overflow));
        assert_eq!(evaluate(formula, &v), Decimal::ZERO);
    }

    #[test]
    fn test_nesting_and_length_limits() {
        let v = VariableContext::default();
        let deep = format!("{}1{}", "(".repeat(100), ")".repeat(100));
        assert_eq!(
            try_evaluate(&deep, &v),
            Err(FormulaError::NestingTooDeep {
                max: MAX_NESTING_DEPTH
            })
        );
        let long = "1+".repeat(600) + "1";
        assert!(matches!(
            try_evaluate(&long, &v),
            Err(FormulaError::TooLong { .. })
        ));
        let ok = format!("{}1{}", "(".repeat(10), ")".repeat(10));
        assert_eq!(evaluate(&ok, &v), dec("1"));
    }

    proptest! {
        #[test]
        fn prop_evaluate_never_panics_and_is_non_negative(formula in ".{0,80}") {
            let v = vars(&[("BASIC_SALARY", "2500"), ("TOTAL_EARNINGS", "3000")]);
            let result = evaluate(&formula, &v);
            prop_assert!(result >= Decimal::ZERO);
        }

        #[test]
        fn prop_operator_soup_never_panics(formula in "[0-9A-Z_ ()+*/<>=!,.-]{0,60}") {
            let v = vars(&[("A", "1"), ("B", "0")]);
            let _ = evaluate(&formula, &v);
        }
    }
}
