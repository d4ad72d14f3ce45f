use std::fmt;
use std::str::FromStr;

use formats::table::{Row, parse_number};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Comparison applied between a cell and the threshold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[default]
    Greater,
    Less,
    /// Exact float equality, no tolerance.
    Equal,
}

impl Operator {
    pub const ALL: [Operator; 3] = [Operator::Greater, Operator::Less, Operator::Equal];

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Greater => ">",
            Operator::Less => "<",
            Operator::Equal => "=",
        }
    }

    pub fn test(self, value: f64, threshold: f64) -> bool {
        match self {
            Operator::Greater => value > threshold,
            Operator::Less => value < threshold,
            Operator::Equal => value == threshold,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown filter operator: {0:?}")]
pub struct UnknownOperator(pub String);

impl FromStr for Operator {
    type Err = UnknownOperator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operator::ALL
            .into_iter()
            .find(|op| op.symbol() == s.trim())
            .ok_or_else(|| UnknownOperator(s.to_string()))
    }
}

/// A single-predicate filter. An empty field or a missing threshold is the
/// identity filter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub field: String,
    pub op: Operator,
    pub threshold: Option<f64>,
}

impl FilterSpec {
    pub fn new(field: impl Into<String>, op: Operator, threshold: f64) -> Self {
        Self {
            field: field.into(),
            op,
            threshold: Some(threshold),
        }
    }

    pub fn identity() -> Self {
        Self::default()
    }

    /// Builds a filter from raw form input. Threshold text that is not a number
    /// leaves the filter as identity.
    pub fn from_input(field: &str, op: Operator, threshold: &str) -> Self {
        Self {
            field: field.trim().to_string(),
            op,
            threshold: parse_number(threshold),
        }
    }

    pub fn is_identity(&self) -> bool {
        self.field.is_empty() || self.threshold.is_none()
    }

    /// Whether `row` passes. Rows without a numeric value in the field fail
    /// any active filter.
    pub fn matches(&self, row: &Row) -> bool {
        let Some(threshold) = self.threshold.filter(|_| !self.field.is_empty()) else {
            return true;
        };
        row.number(&self.field)
            .is_some_and(|v| self.op.test(v, threshold))
    }
}

/// Positions of the rows that pass the filter, in table order.
pub fn filter_indices(rows: &[Row], spec: &FilterSpec) -> Vec<usize> {
    if spec.is_identity() {
        return (0..rows.len()).collect();
    }
    rows.iter()
        .enumerate()
        .filter(|(_, r)| spec.matches(r))
        .map(|(i, _)| i)
        .collect()
}

/// Derived working set. The input rows are never modified.
pub fn filter<'a>(rows: &'a [Row], spec: &FilterSpec) -> Vec<&'a Row> {
    filter_indices(rows, spec)
        .into_iter()
        .map(|i| &rows[i])
        .collect()
}
