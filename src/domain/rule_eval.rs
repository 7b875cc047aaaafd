//! Rule evaluation against an indicator frame.
//!
//! # Evaluation Semantics
//!
//! - Comparison rules: Evaluate at the given bar index
//! - Undefined operands (warmup, out of range) resolve to NaN, so every
//!   comparison touching them is `false` and `NOT` of it is `true`
//! - `AND`: Short-circuits on first `false`
//! - `OR`: Short-circuits on first `true`

use crate::domain::indicator::frame::IndicatorFrame;
use crate::domain::rule::{Operand, Rule};

const EPSILON: f64 = 1e-9;

pub fn evaluate(rule: &Rule, frame: &IndicatorFrame, bar_index: usize) -> bool {
    match rule {
        Rule::Above { left, right } => {
            resolve_operand(left, frame, bar_index) > resolve_operand(right, frame, bar_index)
        }
        Rule::Below { left, right } => {
            resolve_operand(left, frame, bar_index) < resolve_operand(right, frame, bar_index)
        }
        Rule::Between {
            operand,
            lower,
            upper,
        } => {
            let val = resolve_operand(operand, frame, bar_index);
            val >= *lower && val <= *upper
        }
        Rule::Equals { left, right } => {
            let left_val = resolve_operand(left, frame, bar_index);
            let right_val = resolve_operand(right, frame, bar_index);
            (left_val - right_val).abs() < EPSILON
        }
        Rule::And(rules) => rules.iter().all(|r| evaluate(r, frame, bar_index)),
        Rule::Or(rules) => rules.iter().any(|r| evaluate(r, frame, bar_index)),
        Rule::Not(rule) => !evaluate(rule, frame, bar_index),
        Rule::Squeeze => frame.squeeze_at(bar_index),
    }
}

fn resolve_operand(operand: &Operand, frame: &IndicatorFrame, bar_index: usize) -> f64 {
    match operand {
        Operand::Constant(v) => *v,
        Operand::Field(field) => frame.value(*field, bar_index).unwrap_or(f64::NAN),
    }
}
