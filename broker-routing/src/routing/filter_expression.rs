/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Boolean selector language evaluated against message headers.
//!
//! The grammar is a subset of JMS message selectors:
//!
//! ```text
//! expr     := and ( OR and )*
//! and      := unary ( AND unary )*
//! unary    := NOT unary | compare
//! compare  := identifier IS [NOT] NULL | operand ( cmp_op operand )?
//! operand  := identifier | 'string' | number | TRUE | FALSE | ( expr )
//! cmp_op   := = | <> | != | < | <= | > | >=
//! ```
//!
//! Parsing happens once when a binding is added. `AND`/`OR` chains are kept flat, and
//! parentheses plus `NOT` may nest at most [`MAX_NESTING_DEPTH`] levels, so evaluation depth
//! is bounded no matter how long an accepted expression is. Evaluation never panics; any
//! failure is reported as a [`FilterEvaluationError`] and the caller decides how to treat it.

use crate::headers::{HeaderValue, Headers};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::iter::Peekable;
use std::str::CharIndices;

/// Deepest combined nesting of parentheses and `NOT` accepted by the parser.
pub const MAX_NESTING_DEPTH: usize = 64;

/// Syntax error with the byte offset where it was detected.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FilterParseError {
    position: usize,
    message: String,
}

impl FilterParseError {
    fn new(position: usize, message: impl Into<String>) -> Self {
        Self {
            position,
            message: message.into(),
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }
}

impl Display for FilterParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at offset {}", self.message, self.position)
    }
}

impl Error for FilterParseError {}

/// Failure while evaluating a well-formed expression against one header set.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FilterEvaluationError {
    MissingOperand(String),
    TypeMismatch {
        operator: &'static str,
        left: &'static str,
        right: &'static str,
    },
    NotBoolean(&'static str),
}

impl Display for FilterEvaluationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterEvaluationError::MissingOperand(name) => {
                write!(f, "header '{name}' is not present")
            }
            FilterEvaluationError::TypeMismatch {
                operator,
                left,
                right,
            } => write!(f, "cannot apply '{operator}' to {left} and {right}"),
            FilterEvaluationError::NotBoolean(found) => {
                write!(f, "expected a boolean, found {found}")
            }
        }
    }
}

impl Error for FilterEvaluationError {}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "<>",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }

    fn is_equality(&self) -> bool {
        matches!(self, CompareOp::Eq | CompareOp::Ne)
    }

    fn holds(&self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Eq => ordering == Ordering::Equal,
            CompareOp::Ne => ordering != Ordering::Equal,
            CompareOp::Lt => ordering == Ordering::Less,
            CompareOp::Le => ordering != Ordering::Greater,
            CompareOp::Gt => ordering == Ordering::Greater,
            CompareOp::Ge => ordering != Ordering::Less,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Identifier(String),
    Literal(HeaderValue),
    Compare(CompareOp),
    And,
    Or,
    Not,
    Is,
    Null,
    LeftParen,
    RightParen,
}

struct Lexer<'a> {
    source: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
        }
    }

    fn tokenize(mut self) -> Result<Vec<(usize, Token)>, FilterParseError> {
        let mut tokens = Vec::new();
        while let Some(&(position, ch)) = self.chars.peek() {
            let token = match ch {
                c if c.is_whitespace() => {
                    self.chars.next();
                    continue;
                }
                '(' => {
                    self.chars.next();
                    Token::LeftParen
                }
                ')' => {
                    self.chars.next();
                    Token::RightParen
                }
                '=' => {
                    self.chars.next();
                    Token::Compare(CompareOp::Eq)
                }
                '!' => {
                    self.chars.next();
                    self.expect_char('=', position)?;
                    Token::Compare(CompareOp::Ne)
                }
                '<' => {
                    self.chars.next();
                    if self.next_if_char('>') {
                        Token::Compare(CompareOp::Ne)
                    } else if self.next_if_char('=') {
                        Token::Compare(CompareOp::Le)
                    } else {
                        Token::Compare(CompareOp::Lt)
                    }
                }
                '>' => {
                    self.chars.next();
                    if self.next_if_char('=') {
                        Token::Compare(CompareOp::Ge)
                    } else {
                        Token::Compare(CompareOp::Gt)
                    }
                }
                '\'' => self.string_literal(position)?,
                c if c.is_ascii_digit() || c == '-' => self.number_literal(position)?,
                c if c.is_ascii_alphabetic() || c == '_' || c == '$' => self.word(position),
                other => {
                    return Err(FilterParseError::new(
                        position,
                        format!("unexpected character '{other}'"),
                    ))
                }
            };
            tokens.push((position, token));
        }
        Ok(tokens)
    }

    fn next_if_char(&mut self, expected: char) -> bool {
        self.chars.next_if(|&(_, ch)| ch == expected).is_some()
    }

    fn expect_char(&mut self, expected: char, position: usize) -> Result<(), FilterParseError> {
        if self.next_if_char(expected) {
            Ok(())
        } else {
            Err(FilterParseError::new(position, format!("expected '{expected}'")))
        }
    }

    fn string_literal(&mut self, start: usize) -> Result<Token, FilterParseError> {
        self.chars.next();
        let mut value = String::new();
        loop {
            match self.chars.next() {
                Some((_, '\'')) => {
                    if self.next_if_char('\'') {
                        value.push('\'');
                    } else {
                        return Ok(Token::Literal(HeaderValue::String(value)));
                    }
                }
                Some((_, ch)) => value.push(ch),
                None => return Err(FilterParseError::new(start, "unterminated string literal")),
            }
        }
    }

    fn number_literal(&mut self, start: usize) -> Result<Token, FilterParseError> {
        let mut end = start;
        let mut is_float = false;
        if let Some((position, '-')) = self.chars.peek().copied() {
            self.chars.next();
            end = position + 1;
        }
        while let Some(&(position, ch)) = self.chars.peek() {
            if ch.is_ascii_digit() {
                end = position + 1;
            } else if ch == '.' && !is_float {
                is_float = true;
                end = position + 1;
            } else {
                break;
            }
            self.chars.next();
        }

        let text = &self.source[start..end];
        let literal = if is_float {
            text.parse::<f64>().map(HeaderValue::Float).ok()
        } else {
            text.parse::<i64>().map(HeaderValue::Integer).ok()
        };
        literal
            .map(Token::Literal)
            .ok_or_else(|| FilterParseError::new(start, format!("invalid number '{text}'")))
    }

    fn word(&mut self, start: usize) -> Token {
        let mut end = start;
        while let Some(&(position, ch)) = self.chars.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' || ch == '.' || ch == '$' {
                end = position + ch.len_utf8();
                self.chars.next();
            } else {
                break;
            }
        }

        let word = &self.source[start..end];
        match word.to_ascii_uppercase().as_str() {
            "AND" => Token::And,
            "OR" => Token::Or,
            "NOT" => Token::Not,
            "IS" => Token::Is,
            "NULL" => Token::Null,
            "TRUE" => Token::Literal(HeaderValue::Boolean(true)),
            "FALSE" => Token::Literal(HeaderValue::Boolean(false)),
            _ => Token::Identifier(word.to_string()),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Expr {
    Literal(HeaderValue),
    Identifier(String),
    Compare {
        operator: CompareOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    IsNull {
        name: String,
        negated: bool,
    },
    And(Vec<Expr>),
    Or(Vec<Expr>),
    Not(Box<Expr>),
}

struct Parser {
    tokens: Vec<(usize, Token)>,
    cursor: usize,
    end: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.cursor).map(|(_, token)| token)
    }

    fn position(&self) -> usize {
        self.tokens
            .get(self.cursor)
            .map(|(position, _)| *position)
            .unwrap_or(self.end)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.cursor).map(|(_, token)| token.clone());
        self.cursor += 1;
        token
    }

    fn next_if(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    fn descend(&mut self, position: usize) -> Result<(), FilterParseError> {
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            return Err(FilterParseError::new(
                position,
                format!("expression nests deeper than {MAX_NESTING_DEPTH} levels"),
            ));
        }
        Ok(())
    }

    fn ascend(&mut self) {
        self.depth -= 1;
    }

    fn parse(mut self) -> Result<Expr, FilterParseError> {
        let expr = self.or_expr()?;
        if self.cursor < self.tokens.len() {
            return Err(FilterParseError::new(self.position(), "unexpected trailing input"));
        }
        Ok(expr)
    }

    fn or_expr(&mut self) -> Result<Expr, FilterParseError> {
        let first = self.and_expr()?;
        if self.peek() != Some(&Token::Or) {
            return Ok(first);
        }
        let mut terms = vec![first];
        while self.next_if(&Token::Or) {
            terms.push(self.and_expr()?);
        }
        Ok(Expr::Or(terms))
    }

    fn and_expr(&mut self) -> Result<Expr, FilterParseError> {
        let first = self.unary_expr()?;
        if self.peek() != Some(&Token::And) {
            return Ok(first);
        }
        let mut terms = vec![first];
        while self.next_if(&Token::And) {
            terms.push(self.unary_expr()?);
        }
        Ok(Expr::And(terms))
    }

    fn unary_expr(&mut self) -> Result<Expr, FilterParseError> {
        let position = self.position();
        if self.next_if(&Token::Not) {
            self.descend(position)?;
            let inner = self.unary_expr()?;
            self.ascend();
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.compare_expr()
    }

    fn compare_expr(&mut self) -> Result<Expr, FilterParseError> {
        let position = self.position();
        let left = self.operand()?;

        if let Some(Token::Compare(operator)) = self.peek().cloned() {
            self.cursor += 1;
            let right = self.operand()?;
            return Ok(Expr::Compare {
                operator,
                left: Box::new(left),
                right: Box::new(right),
            });
        }

        if self.peek() == Some(&Token::Is) {
            let Expr::Identifier(name) = left else {
                return Err(FilterParseError::new(
                    position,
                    "IS NULL applies only to a header name",
                ));
            };
            self.cursor += 1;
            let negated = self.next_if(&Token::Not);
            if !self.next_if(&Token::Null) {
                return Err(FilterParseError::new(self.position(), "expected NULL"));
            }
            return Ok(Expr::IsNull { name, negated });
        }

        Ok(left)
    }

    fn operand(&mut self) -> Result<Expr, FilterParseError> {
        let position = self.position();
        match self.advance() {
            Some(Token::Identifier(name)) => Ok(Expr::Identifier(name)),
            Some(Token::Literal(value)) => Ok(Expr::Literal(value)),
            Some(Token::LeftParen) => {
                self.descend(position)?;
                let inner = self.or_expr()?;
                if !self.next_if(&Token::RightParen) {
                    return Err(FilterParseError::new(self.position(), "expected ')'"));
                }
                self.ascend();
                Ok(inner)
            }
            Some(_) => Err(FilterParseError::new(position, "expected an operand")),
            None => Err(FilterParseError::new(position, "unexpected end of expression")),
        }
    }
}

/// A compiled filter expression.
///
/// ```
/// use broker_routing::{FilterExpression, HeaderValue, Headers};
///
/// let filter = FilterExpression::parse("region = 'eu' AND priority >= 5").unwrap();
/// let mut headers = Headers::new();
/// headers.insert("region".to_string(), HeaderValue::from("eu"));
/// headers.insert("priority".to_string(), HeaderValue::from(7));
///
/// assert_eq!(filter.evaluate(&headers), Ok(true));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct FilterExpression {
    source: String,
    root: Expr,
}

impl FilterExpression {
    pub fn parse(source: &str) -> Result<Self, FilterParseError> {
        let tokens = Lexer::new(source).tokenize()?;
        let root = Parser {
            tokens,
            cursor: 0,
            end: source.len(),
            depth: 0,
        }
        .parse()?;

        Ok(Self {
            source: source.to_string(),
            root,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn evaluate(&self, headers: &Headers) -> Result<bool, FilterEvaluationError> {
        evaluate_predicate(&self.root, headers)
    }
}

fn evaluate_predicate(expr: &Expr, headers: &Headers) -> Result<bool, FilterEvaluationError> {
    match expr {
        Expr::And(terms) => {
            for term in terms {
                if !evaluate_predicate(term, headers)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Expr::Or(terms) => {
            for term in terms {
                if evaluate_predicate(term, headers)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Expr::Not(inner) => Ok(!evaluate_predicate(inner, headers)?),
        other => match evaluate_value(other, headers)?.as_ref() {
            HeaderValue::Boolean(value) => Ok(*value),
            value => Err(FilterEvaluationError::NotBoolean(value.type_name())),
        },
    }
}

fn evaluate_value<'a>(
    expr: &'a Expr,
    headers: &'a Headers,
) -> Result<Cow<'a, HeaderValue>, FilterEvaluationError> {
    match expr {
        Expr::Literal(value) => Ok(Cow::Borrowed(value)),
        Expr::Identifier(name) => headers
            .get(name)
            .map(Cow::Borrowed)
            .ok_or_else(|| FilterEvaluationError::MissingOperand(name.clone())),
        Expr::IsNull { name, negated } => {
            let is_null = !headers.contains_key(name);
            Ok(Cow::Owned(HeaderValue::Boolean(is_null != *negated)))
        }
        Expr::Compare {
            operator,
            left,
            right,
        } => {
            let left = evaluate_value(left, headers)?;
            let right = evaluate_value(right, headers)?;
            compare(*operator, &left, &right).map(|holds| Cow::Owned(HeaderValue::Boolean(holds)))
        }
        Expr::And(..) | Expr::Or(..) | Expr::Not(_) => {
            evaluate_predicate(expr, headers).map(|value| Cow::Owned(HeaderValue::Boolean(value)))
        }
    }
}

fn compare(
    operator: CompareOp,
    left: &HeaderValue,
    right: &HeaderValue,
) -> Result<bool, FilterEvaluationError> {
    let mismatch = || FilterEvaluationError::TypeMismatch {
        operator: operator.symbol(),
        left: left.type_name(),
        right: right.type_name(),
    };

    let ordering = match (left, right) {
        (HeaderValue::Integer(l), HeaderValue::Integer(r)) => Some(l.cmp(r)),
        (HeaderValue::Integer(l), HeaderValue::Float(r)) => (*l as f64).partial_cmp(r),
        (HeaderValue::Float(l), HeaderValue::Integer(r)) => l.partial_cmp(&(*r as f64)),
        (HeaderValue::Float(l), HeaderValue::Float(r)) => l.partial_cmp(r),
        (HeaderValue::String(l), HeaderValue::String(r)) if operator.is_equality() => {
            Some(l.cmp(r))
        }
        (HeaderValue::Boolean(l), HeaderValue::Boolean(r)) if operator.is_equality() => {
            Some(l.cmp(r))
        }
        _ => return Err(mismatch()),
    };

    // NaN is unordered: only `<>` holds.
    Ok(match ordering {
        Some(ordering) => operator.holds(ordering),
        None => operator == CompareOp::Ne,
    })
}

#[cfg(test)]
mod tests {
    use super::{FilterEvaluationError, FilterExpression, MAX_NESTING_DEPTH};
    use crate::headers::{HeaderValue, Headers};

    fn headers(pairs: &[(&str, HeaderValue)]) -> Headers {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }

    fn eval(expression: &str, headers: &Headers) -> Result<bool, FilterEvaluationError> {
        FilterExpression::parse(expression)
            .expect("expression should parse")
            .evaluate(headers)
    }

    #[test]
    fn string_equality_and_inequality() {
        let h = headers(&[("region", HeaderValue::from("eu"))]);

        assert_eq!(eval("region = 'eu'", &h), Ok(true));
        assert_eq!(eval("region <> 'eu'", &h), Ok(false));
        assert_eq!(eval("region != 'us'", &h), Ok(true));
    }

    #[test]
    fn numeric_comparisons_mix_integers_and_floats() {
        let h = headers(&[
            ("priority", HeaderValue::from(5)),
            ("weight", HeaderValue::from(2.5)),
        ]);

        assert_eq!(eval("priority >= 5", &h), Ok(true));
        assert_eq!(eval("priority > 5", &h), Ok(false));
        assert_eq!(eval("weight < 3", &h), Ok(true));
        assert_eq!(eval("priority > weight", &h), Ok(true));
        assert_eq!(eval("weight <= -1.5", &h), Ok(false));
    }

    #[test]
    fn boolean_connectives_and_precedence() {
        let h = headers(&[
            ("region", HeaderValue::from("eu")),
            ("priority", HeaderValue::from(1)),
            ("urgent", HeaderValue::from(true)),
        ]);

        assert_eq!(eval("region = 'us' OR priority = 1 AND urgent", &h), Ok(true));
        assert_eq!(eval("(region = 'us' OR priority = 1) AND NOT urgent", &h), Ok(false));
        assert_eq!(eval("not urgent = false", &h), Ok(true));
    }

    #[test]
    fn missing_operand_is_an_evaluation_error() {
        let h = Headers::new();

        assert_eq!(
            eval("region = 'eu'", &h),
            Err(FilterEvaluationError::MissingOperand("region".to_string()))
        );
    }

    #[test]
    fn short_circuit_skips_missing_operands() {
        let h = headers(&[("region", HeaderValue::from("eu"))]);

        assert_eq!(eval("region = 'us' AND priority > 3", &h), Ok(false));
        assert_eq!(eval("region = 'eu' OR priority > 3", &h), Ok(true));
    }

    #[test]
    fn is_null_checks_presence() {
        let h = headers(&[("region", HeaderValue::from("eu"))]);

        assert_eq!(eval("tenant IS NULL", &h), Ok(true));
        assert_eq!(eval("region IS NOT NULL", &h), Ok(true));
        assert_eq!(eval("region is null", &h), Ok(false));
    }

    #[test]
    fn type_mismatches_are_evaluation_errors() {
        let h = headers(&[
            ("region", HeaderValue::from("eu")),
            ("priority", HeaderValue::from(5)),
        ]);

        assert!(matches!(
            eval("region > 'a'", &h),
            Err(FilterEvaluationError::TypeMismatch { .. })
        ));
        assert!(matches!(
            eval("priority = 'five'", &h),
            Err(FilterEvaluationError::TypeMismatch { .. })
        ));
        assert_eq!(
            eval("priority", &h),
            Err(FilterEvaluationError::NotBoolean("integer"))
        );
    }

    #[test]
    fn is_null_requires_a_header_name() {
        for invalid in ["(priority > 5) IS NULL", "'eu' IS NOT NULL"] {
            assert!(
                FilterExpression::parse(invalid).is_err(),
                "expected parse failure for {invalid:?}"
            );
        }

        // The comparison alone still fails at evaluation and never turns into a match.
        let h = headers(&[("priority", HeaderValue::from("high"))]);
        assert!(matches!(
            eval("priority > 5 OR tenant IS NOT NULL", &h),
            Err(FilterEvaluationError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn nan_is_unordered() {
        let h = headers(&[("ratio", HeaderValue::from(f64::NAN))]);

        assert_eq!(eval("ratio <> 1", &h), Ok(true));
        assert_eq!(eval("ratio <> 1.5", &h), Ok(true));
        assert_eq!(eval("ratio = 1", &h), Ok(false));
        assert_eq!(eval("ratio < 1", &h), Ok(false));
        assert_eq!(eval("ratio >= 1.5", &h), Ok(false));
    }

    #[test]
    fn long_connective_chains_evaluate_iteratively() {
        let h = headers(&[("a", HeaderValue::from(1))]);
        let all_hold = vec!["a = 1"; 50_000].join(" AND ");
        let none_hold = vec!["a = 2"; 50_000].join(" OR ");

        assert_eq!(eval(&all_hold, &h), Ok(true));
        assert_eq!(eval(&none_hold, &h), Ok(false));
        assert_eq!(eval(&format!("{none_hold} OR a = 1"), &h), Ok(true));
    }

    #[test]
    fn nesting_is_bounded() {
        let h = headers(&[("a", HeaderValue::from(1))]);
        let nested = |depth: usize| format!("{}a = 1{}", "(".repeat(depth), ")".repeat(depth));
        let negated = |depth: usize| format!("{}a = 1", "NOT ".repeat(depth));

        assert_eq!(eval(&nested(MAX_NESTING_DEPTH), &h), Ok(true));
        assert_eq!(eval(&negated(MAX_NESTING_DEPTH), &h), Ok(true));
        assert!(FilterExpression::parse(&nested(MAX_NESTING_DEPTH + 1)).is_err());
        assert!(FilterExpression::parse(&negated(MAX_NESTING_DEPTH + 1)).is_err());
        assert!(FilterExpression::parse(&nested(20_000)).is_err());
        assert!(FilterExpression::parse(&negated(20_000)).is_err());
    }

    #[test]
    fn quoted_quotes_are_unescaped() {
        let h = headers(&[("name", HeaderValue::from("o'brien"))]);

        assert_eq!(eval("name = 'o''brien'", &h), Ok(true));
    }

    #[test]
    fn malformed_expressions_fail_to_parse() {
        for malformed in [
            "region =",
            "region = 'eu",
            "(region = 'eu'",
            "region IS 'eu'",
            "region = 'eu' garbage",
            "priority # 3",
            "",
        ] {
            assert!(
                FilterExpression::parse(malformed).is_err(),
                "expected parse failure for {malformed:?}"
            );
        }
    }

    #[test]
    fn parse_error_reports_offset() {
        let error = FilterExpression::parse("region = 'eu' AND ?").unwrap_err();

        assert_eq!(error.position(), 18);
    }
}
