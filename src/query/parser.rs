use serde::{Deserialize, Serialize};

use crate::core::error::{Error, Result};
use crate::query::ast::BoolExpr;
use crate::query::plan::{self, QueryPlan};

/// Which expression grammar the engine accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryDialect {
    /// Recursive boolean grammar: `&` binds tighter than `|`, parentheses
    /// group arbitrarily, no limit on the number of operands.
    General,
    /// Strict-compatibility mode: 1, 3 or 5 space-separated tokens with at
    /// most one parenthesized pair, rejected otherwise.
    Legacy,
}

/// Parses filter expressions and compiles them to set-algebra plans.
pub struct QueryParser {
    dialect: QueryDialect,
}

impl QueryParser {
    pub fn new(dialect: QueryDialect) -> Self {
        QueryParser { dialect }
    }

    pub fn dialect(&self) -> QueryDialect {
        self.dialect
    }

    /// Compile a raw expression into an executable plan.
    pub fn compile(&self, raw: &str) -> Result<QueryPlan> {
        match self.dialect {
            QueryDialect::General => {
                let expr = parse_expression(raw)?;
                Ok(QueryPlan::from_expr(&expr))
            }
            QueryDialect::Legacy => plan::compile_legacy(raw),
        }
    }
}

impl Default for QueryParser {
    fn default() -> Self {
        QueryParser::new(QueryDialect::General)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(String),
    And,
    Or,
    Open,
    Close,
}

fn lex(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c == '&' {
            chars.next();
            tokens.push(Token::And);
        } else if c == '|' {
            chars.next();
            tokens.push(Token::Or);
        } else if c == '(' {
            chars.next();
            tokens.push(Token::Open);
        } else if c == ')' {
            chars.next();
            tokens.push(Token::Close);
        } else if c.is_alphanumeric() {
            let mut literal = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_alphanumeric() {
                    literal.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push(Token::Literal(literal));
        } else {
            return Err(Error::query_format(format!(
                "unexpected character '{}' in query expression",
                c
            )));
        }
    }

    Ok(tokens)
}

/// Parse a boolean filter expression into its AST.
///
/// Grammar: `or := and ('|' and)*`, `and := primary ('&' primary)*`,
/// `primary := '(' or ')' | literal`.
pub fn parse_expression(raw: &str) -> Result<BoolExpr> {
    let tokens = lex(raw)?;
    if tokens.is_empty() {
        return Err(Error::query_format("empty query expression"));
    }

    let mut parser = Parser { tokens: &tokens, pos: 0 };
    let expr = parser.parse_or()?;

    if parser.pos != tokens.len() {
        return Err(Error::query_format(
            "unexpected trailing input after expression",
        ));
    }

    Ok(expr)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn parse_or(&mut self) -> Result<BoolExpr> {
        let mut left = self.parse_and()?;
        while self.peek() == Some(&Token::Or) {
            self.advance();
            let right = self.parse_and()?;
            left = BoolExpr::or(left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<BoolExpr> {
        let mut left = self.parse_primary()?;
        while self.peek() == Some(&Token::And) {
            self.advance();
            let right = self.parse_primary()?;
            left = BoolExpr::and(left, right);
        }
        Ok(left)
    }

    fn parse_primary(&mut self) -> Result<BoolExpr> {
        match self.advance() {
            Some(Token::Literal(value)) => Ok(BoolExpr::Literal(value.clone())),
            Some(Token::Open) => {
                let inner = self.parse_or()?;
                match self.advance() {
                    Some(Token::Close) => Ok(inner),
                    _ => Err(Error::query_format("unbalanced parenthesis")),
                }
            }
            Some(token) => Err(Error::query_format(format!(
                "expected literal or '(', found {:?}",
                token
            ))),
            None => Err(Error::query_format("expression ends with an operator")),
        }
    }
}
