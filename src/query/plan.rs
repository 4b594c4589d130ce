use serde::{Deserialize, Serialize};

use crate::core::error::{Error, Result};
use crate::query::ast::BoolExpr;

/// Executable set-algebra plan over posting lookups.
///
/// `Union` and `Intersect` are n-ary; same-operator chains compile into a
/// single node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryPlan {
    Literal(String),
    Union(Vec<QueryPlan>),
    Intersect(Vec<QueryPlan>),
}

impl QueryPlan {
    pub fn literal(value: impl Into<String>) -> Self {
        QueryPlan::Literal(value.into())
    }

    /// Compile an expression tree, flattening `a & b & c` into one 3-way
    /// intersect and `a | b | c` into one 3-way union.
    pub fn from_expr(expr: &BoolExpr) -> QueryPlan {
        match expr {
            BoolExpr::Literal(value) => QueryPlan::Literal(value.clone()),
            BoolExpr::And(_, _) => {
                let mut children = Vec::new();
                flatten_and(expr, &mut children);
                QueryPlan::Intersect(children)
            }
            BoolExpr::Or(_, _) => {
                let mut children = Vec::new();
                flatten_or(expr, &mut children);
                QueryPlan::Union(children)
            }
        }
    }

    /// Literals in evaluation order; this is also the SQL binding order.
    pub fn literals(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_literals(&mut out);
        out
    }

    fn collect_literals<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            QueryPlan::Literal(value) => out.push(value),
            QueryPlan::Union(children) | QueryPlan::Intersect(children) => {
                for child in children {
                    child.collect_literals(out);
                }
            }
        }
    }
}

fn flatten_and(expr: &BoolExpr, out: &mut Vec<QueryPlan>) {
    match expr {
        BoolExpr::And(left, right) => {
            flatten_and(left, out);
            flatten_and(right, out);
        }
        other => out.push(QueryPlan::from_expr(other)),
    }
}

fn flatten_or(expr: &BoolExpr, out: &mut Vec<QueryPlan>) {
    match expr {
        BoolExpr::Or(left, right) => {
            flatten_or(left, out);
            flatten_or(right, out);
        }
        other => out.push(QueryPlan::from_expr(other)),
    }
}

/// Compile an expression under the legacy bounded grammar.
///
/// Tokenization contract: strip every `(` and `)`, split on single spaces,
/// trim each entry. Only 1, 3 or 5 tokens are accepted. The mixed 5-token
/// case applies one step of boolean distribution, with the source pattern
/// picked from first-occurrence character positions of `&`, `|`, `(`, `)` in
/// the unstripped expression.
pub fn compile_legacy(raw: &str) -> Result<QueryPlan> {
    let stripped: String = raw.chars().filter(|c| !matches!(c, '(' | ')')).collect();
    let parts: Vec<&str> = stripped.split(' ').map(str::trim).collect();

    match parts.len() {
        1 => Ok(QueryPlan::literal(parts[0])),
        3 => compile_pair(parts[0], parts[1], parts[2]),
        5 => compile_triple(raw, &stripped),
        count => Err(Error::query_format(format!(
            "expected 1, 3 or 5 query tokens, found {}",
            count
        ))),
    }
}

fn compile_pair(left: &str, operator: &str, right: &str) -> Result<QueryPlan> {
    let operands = vec![QueryPlan::literal(left), QueryPlan::literal(right)];
    match operator {
        "&" => Ok(QueryPlan::Intersect(operands)),
        "|" => Ok(QueryPlan::Union(operands)),
        other => Err(Error::query_format(format!(
            "unknown operator '{}', expected '&' or '|'",
            other
        ))),
    }
}

fn compile_triple(raw: &str, stripped: &str) -> Result<QueryPlan> {
    let has_and = stripped.contains('&');
    let has_or = stripped.contains('|');

    let cleaned: String = stripped
        .chars()
        .filter(|c| !matches!(c, '&' | '|'))
        .collect();
    let literals: Vec<&str> = cleaned.split_whitespace().collect();
    if literals.len() < 3 {
        return Err(Error::query_format(
            "a five-token expression needs three literals",
        ));
    }
    let (a, b, c) = (literals[0], literals[1], literals[2]);

    if !(has_and && has_or) {
        // Homogeneous operators collapse into one 3-way node.
        let operands = vec![
            QueryPlan::literal(a),
            QueryPlan::literal(b),
            QueryPlan::literal(c),
        ];
        return Ok(if !has_or {
            QueryPlan::Intersect(operands)
        } else {
            QueryPlan::Union(operands)
        });
    }

    Ok(distribute(raw, a, b, c))
}

/// One step of boolean distribution for the mixed-operator case.
///
/// The source pattern is selected from the first occurrence of each symbol in
/// the unstripped expression, with -1 standing in for an absent symbol. The
/// two patterns whose conjunction sits outside the parentheses keep a bare
/// literal on that side instead of a degenerate one-operand union.
fn distribute(raw: &str, a: &str, b: &str, c: &str) -> QueryPlan {
    let idx_and = symbol_index(raw, '&');
    let idx_or = symbol_index(raw, '|');
    let idx_open = symbol_index(raw, '(');
    let idx_close = symbol_index(raw, ')');

    let union = |x: &str, y: &str| {
        QueryPlan::Union(vec![QueryPlan::literal(x), QueryPlan::literal(y)])
    };

    if idx_and > idx_open && idx_and < idx_close {
        if idx_close < idx_or {
            // (a & b) | c  ≡  (a ∨ c) ∧ (b ∨ c)
            QueryPlan::Intersect(vec![union(a, c), union(b, c)])
        } else {
            // a | (b & c)  ≡  (a ∨ b) ∧ (a ∨ c)
            QueryPlan::Intersect(vec![union(a, b), union(a, c)])
        }
    } else if idx_close < idx_and {
        // (a | b) & c
        QueryPlan::Intersect(vec![union(a, b), QueryPlan::literal(c)])
    } else {
        // a & (b | c)
        QueryPlan::Intersect(vec![QueryPlan::literal(a), union(b, c)])
    }
}

fn symbol_index(raw: &str, symbol: char) -> i64 {
    raw.find(symbol).map(|i| i as i64).unwrap_or(-1)
}
