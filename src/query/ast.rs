use serde::{Deserialize, Serialize};

/// Boolean filter expression over token literals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoolExpr {
    Literal(String),
    And(Box<BoolExpr>, Box<BoolExpr>),
    Or(Box<BoolExpr>, Box<BoolExpr>),
}

impl BoolExpr {
    pub fn literal(value: impl Into<String>) -> Self {
        BoolExpr::Literal(value.into())
    }

    pub fn and(left: BoolExpr, right: BoolExpr) -> Self {
        BoolExpr::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: BoolExpr, right: BoolExpr) -> Self {
        BoolExpr::Or(Box::new(left), Box::new(right))
    }

    /// Literals in left-to-right source order.
    pub fn literals(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_literals(&mut out);
        out
    }

    fn collect_literals<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            BoolExpr::Literal(value) => out.push(value),
            BoolExpr::And(left, right) | BoolExpr::Or(left, right) => {
                left.collect_literals(out);
                right.collect_literals(out);
            }
        }
    }
}
