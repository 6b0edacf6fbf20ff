//! Boolean match expressions over named selector results.
//!
//! Grammar, lowest to highest precedence:
//!
//! ```text
//! expr   = term { OR term }
//! term   = factor { AND factor }
//! factor = NOT factor | "(" expr ")" | ident
//! ```
//!
//! Keywords are case-insensitive and whitespace is free. Selector names
//! are the only atoms; the bare literals `true` and `false` are rejected.

use std::collections::HashMap;

use crate::error::{GroupError, Result};

/// A parsed boolean formula over selector names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchExpr {
    /// Reference to a named selector's result.
    Ref(String),
    Not(Box<MatchExpr>),
    And(Box<MatchExpr>, Box<MatchExpr>),
    Or(Box<MatchExpr>, Box<MatchExpr>),
}

impl MatchExpr {
    /// Parse an expression string.
    pub fn parse(input: &str) -> Result<Self> {
        let tokens = tokenize(input)?;
        let mut parser = Parser { tokens, pos: 0 };
        let expr = parser.or_expr()?;
        if parser.pos != parser.tokens.len() {
            return Err(GroupError::MalformedExpression(format!(
                "unexpected trailing input in {input:?}"
            )));
        }
        Ok(expr)
    }

    /// OR of every name, in declaration order.
    ///
    /// This is the implicit expression for groups that declare selectors
    /// without combining them explicitly.
    pub fn any_of(names: &[String]) -> Result<Self> {
        let mut iter = names.iter();
        let first = iter
            .next()
            .ok_or_else(|| GroupError::MalformedExpression("no selectors to combine".to_string()))?;
        Ok(iter.fold(MatchExpr::Ref(first.clone()), |acc, name| {
            MatchExpr::Or(Box::new(acc), Box::new(MatchExpr::Ref(name.clone())))
        }))
    }

    /// Every selector name the expression references.
    pub fn references(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_refs(&mut out);
        out
    }

    fn collect_refs<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            MatchExpr::Ref(name) => out.push(name),
            MatchExpr::Not(inner) => inner.collect_refs(out),
            MatchExpr::And(a, b) | MatchExpr::Or(a, b) => {
                a.collect_refs(out);
                b.collect_refs(out);
            }
        }
    }

    /// Evaluate against precomputed selector results.
    ///
    /// All operands are evaluated; there is no observable short-circuit.
    pub fn evaluate(&self, results: &HashMap<String, bool>) -> Result<bool> {
        match self {
            MatchExpr::Ref(name) => results
                .get(name)
                .copied()
                .ok_or_else(|| GroupError::UnknownSelectorReference(name.clone())),
            MatchExpr::Not(inner) => Ok(!inner.evaluate(results)?),
            MatchExpr::And(a, b) => Ok(a.evaluate(results)? & b.evaluate(results)?),
            MatchExpr::Or(a, b) => Ok(a.evaluate(results)? | b.evaluate(results)?),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    And,
    Or,
    Not,
    LParen,
    RParen,
}

fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut word = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') {
                        word.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                match word.to_ascii_uppercase().as_str() {
                    "AND" => tokens.push(Token::And),
                    "OR" => tokens.push(Token::Or),
                    "NOT" => tokens.push(Token::Not),
                    // selectors are the only atoms
                    "TRUE" | "FALSE" => {
                        return Err(GroupError::MalformedExpression(format!(
                            "boolean literal {word:?} is not allowed"
                        )))
                    }
                    _ => tokens.push(Token::Ident(word)),
                }
            }
            other => {
                return Err(GroupError::MalformedExpression(format!(
                    "unexpected character {other:?}"
                )))
            }
        }
    }

    if tokens.is_empty() {
        return Err(GroupError::MalformedExpression("empty expression".to_string()));
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn or_expr(&mut self) -> Result<MatchExpr> {
        let mut left = self.and_expr()?;
        while self.peek() == Some(&Token::Or) {
            self.pos += 1;
            let right = self.and_expr()?;
            left = MatchExpr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> Result<MatchExpr> {
        let mut left = self.factor()?;
        while self.peek() == Some(&Token::And) {
            self.pos += 1;
            let right = self.factor()?;
            left = MatchExpr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn factor(&mut self) -> Result<MatchExpr> {
        match self.next() {
            Some(Token::Not) => Ok(MatchExpr::Not(Box::new(self.factor()?))),
            Some(Token::LParen) => {
                let expr = self.or_expr()?;
                match self.next() {
                    Some(Token::RParen) => Ok(expr),
                    _ => Err(GroupError::MalformedExpression(
                        "unbalanced parentheses".to_string(),
                    )),
                }
            }
            Some(Token::Ident(name)) => Ok(MatchExpr::Ref(name)),
            Some(token) => Err(GroupError::MalformedExpression(format!(
                "unexpected token {token:?}"
            ))),
            None => Err(GroupError::MalformedExpression(
                "unexpected end of expression".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results(pairs: &[(&str, bool)]) -> HashMap<String, bool> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_single_reference() {
        let expr = MatchExpr::parse("sel1").unwrap();
        assert_eq!(expr, MatchExpr::Ref("sel1".to_string()));
        assert!(expr.evaluate(&results(&[("sel1", true)])).unwrap());
        assert!(!expr.evaluate(&results(&[("sel1", false)])).unwrap());
    }

    #[test]
    fn test_precedence_not_over_and_over_or() {
        // a OR b AND NOT c == a OR (b AND (NOT c))
        let expr = MatchExpr::parse("a OR b AND NOT c").unwrap();
        assert_eq!(
            expr,
            MatchExpr::Or(
                Box::new(MatchExpr::Ref("a".to_string())),
                Box::new(MatchExpr::And(
                    Box::new(MatchExpr::Ref("b".to_string())),
                    Box::new(MatchExpr::Not(Box::new(MatchExpr::Ref("c".to_string())))),
                )),
            )
        );

        let r = results(&[("a", false), ("b", true), ("c", false)]);
        assert!(expr.evaluate(&r).unwrap());
    }

    #[test]
    fn test_parentheses_override_precedence() {
        let expr = MatchExpr::parse("(a OR b) AND c").unwrap();
        let r = results(&[("a", true), ("b", false), ("c", false)]);
        assert!(!expr.evaluate(&r).unwrap());

        let r = results(&[("a", true), ("b", false), ("c", true)]);
        assert!(expr.evaluate(&r).unwrap());
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        let upper = MatchExpr::parse("a and not b or c").unwrap();
        let lower = MatchExpr::parse("a AND NOT b OR c").unwrap();
        assert_eq!(upper, lower);
    }

    #[test]
    fn test_whitespace_is_free() {
        assert_eq!(
            MatchExpr::parse("a AND b").unwrap(),
            MatchExpr::parse("  a   AND(b)  ").unwrap(),
        );
    }

    #[test]
    fn test_boolean_literals_are_rejected() {
        for input in ["true", "a OR false", "TRUE AND b"] {
            let err = MatchExpr::parse(input).unwrap_err();
            assert!(matches!(err, GroupError::MalformedExpression(_)), "{input}");
        }
    }

    #[test]
    fn test_malformed_expressions() {
        for input in ["", "   ", "(a OR b", "a OR", "AND a", "a b", "a ? b", "NOT"] {
            let err = MatchExpr::parse(input).unwrap_err();
            assert!(matches!(err, GroupError::MalformedExpression(_)), "{input:?}");
        }
    }

    #[test]
    fn test_unknown_reference_fails_evaluation() {
        let expr = MatchExpr::parse("a AND ghost").unwrap();
        let err = expr.evaluate(&results(&[("a", true)])).unwrap_err();
        assert_eq!(err, GroupError::UnknownSelectorReference("ghost".to_string()));
    }

    #[test]
    fn test_any_of_builds_declaration_order_or() {
        let expr = MatchExpr::any_of(&["a".to_string(), "b".to_string(), "c".to_string()]).unwrap();
        assert_eq!(expr.references(), vec!["a", "b", "c"]);

        assert!(expr.evaluate(&results(&[("a", false), ("b", false), ("c", true)])).unwrap());
        assert!(!expr.evaluate(&results(&[("a", false), ("b", false), ("c", false)])).unwrap());
    }

    #[test]
    fn test_any_of_rejects_empty_list() {
        let err = MatchExpr::any_of(&[]).unwrap_err();
        assert!(matches!(err, GroupError::MalformedExpression(_)));
    }

    #[test]
    fn test_references_collects_every_name() {
        let expr = MatchExpr::parse("a AND (b OR NOT c) AND a").unwrap();
        assert_eq!(expr.references(), vec!["a", "b", "c", "a"]);
    }

    #[test]
    fn test_identifiers_may_contain_separators() {
        let expr = MatchExpr::parse("rack-1 OR rack.2 OR rack_3").unwrap();
        assert_eq!(expr.references(), vec!["rack-1", "rack.2", "rack_3"]);
    }
}
