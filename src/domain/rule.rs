//! Condition AST for scoring rules.
//!
//! - `Operand`: What can be compared (frame columns, constants)
//! - `Rule`: comparison and composite conditions over the latest bar

use std::fmt;

use crate::domain::indicator::frame::FrameField;

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Field(FrameField),
    Constant(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    Above {
        left: Operand,
        right: Operand,
    },
    Below {
        left: Operand,
        right: Operand,
    },
    Between {
        operand: Operand,
        lower: f64,
        upper: f64,
    },
    Equals {
        left: Operand,
        right: Operand,
    },
    And(Vec<Rule>),
    Or(Vec<Rule>),
    Not(Box<Rule>),
    /// Bollinger band inside the Keltner channel on the evaluated bar.
    Squeeze,
}

impl Rule {
    pub fn above(left: FrameField, right: FrameField) -> Self {
        Rule::Above {
            left: Operand::Field(left),
            right: Operand::Field(right),
        }
    }

    pub fn below(left: FrameField, right: f64) -> Self {
        Rule::Below {
            left: Operand::Field(left),
            right: Operand::Constant(right),
        }
    }

    pub fn greater_than(left: FrameField, right: f64) -> Self {
        Rule::Above {
            left: Operand::Field(left),
            right: Operand::Constant(right),
        }
    }

    pub fn between(field: FrameField, lower: f64, upper: f64) -> Self {
        Rule::Between {
            operand: Operand::Field(field),
            lower,
            upper,
        }
    }

    pub fn not(rule: Rule) -> Self {
        Rule::Not(Box::new(rule))
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Field(field) => write!(f, "{}", field),
            Operand::Constant(v) => write!(f, "{}", v),
        }
    }
}

/// Renders the DSL text that parses back into the same rule.
impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Above { left, right } => write!(f, "ABOVE({}, {})", left, right),
            Rule::Below { left, right } => write!(f, "BELOW({}, {})", left, right),
            Rule::Equals { left, right } => write!(f, "EQUALS({}, {})", left, right),
            Rule::Between {
                operand,
                lower,
                upper,
            } => write!(f, "BETWEEN({}, {}, {})", operand, lower, upper),
            Rule::And(rules) | Rule::Or(rules) => {
                let keyword = if matches!(self, Rule::And(_)) { "AND" } else { "OR" };
                write!(f, "{}(", keyword)?;
                for (i, rule) in rules.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", rule)?;
                }
                write!(f, ")")
            }
            Rule::Not(inner) => write!(f, "NOT({})", inner),
            Rule::Squeeze => write!(f, "SQUEEZE"),
        }
    }
}
