//! Query-string to filter translation.
//!
//! Keys are parsed structurally: `field=value` is an equality term and
//! `field[op]=value` a comparison term when `op` is one of the bracket
//! operators (`gt`, `gte`, `lt`, `lte`, `in`). Any other bracket token is
//! kept verbatim as an embedded-document match. Values are never inspected,
//! so a value spelled `gte` stays a plain string.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::document::ID_FIELD;
use crate::error::DataError;
use crate::params::QueryParams;

/// Comparison operators understood by the document store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    Ne,
    Nin,
}

impl Operator {
    /// Operators that may be written as `field[op]=value` in a query string.
    pub const BRACKET: [Operator; 5] = [
        Operator::Gt,
        Operator::Gte,
        Operator::Lt,
        Operator::Lte,
        Operator::In,
    ];

    pub fn token(self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Gt => "gt",
            Operator::Gte => "gte",
            Operator::Lt => "lt",
            Operator::Lte => "lte",
            Operator::In => "in",
            Operator::Ne => "ne",
            Operator::Nin => "nin",
        }
    }

    /// The operator as spelled in the store's native filter documents.
    pub fn native(self) -> &'static str {
        match self {
            Operator::Eq => "$eq",
            Operator::Gt => "$gt",
            Operator::Gte => "$gte",
            Operator::Lt => "$lt",
            Operator::Lte => "$lte",
            Operator::In => "$in",
            Operator::Ne => "$ne",
            Operator::Nin => "$nin",
        }
    }

    /// Case-sensitive lookup of a textual token.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "eq" => Some(Operator::Eq),
            "gt" => Some(Operator::Gt),
            "gte" => Some(Operator::Gte),
            "lt" => Some(Operator::Lt),
            "lte" => Some(Operator::Lte),
            "in" => Some(Operator::In),
            "ne" => Some(Operator::Ne),
            "nin" => Some(Operator::Nin),
            _ => None,
        }
    }

    pub fn is_bracket(self) -> bool {
        Self::BRACKET.contains(&self)
    }
}

/// Right-hand side of a filter term. Scalars stay textual; the store casts
/// them to the type of the stored field when matching.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Text(String),
    List(Vec<String>),
    Document(Map<String, Value>),
}

impl Operand {
    fn to_value(&self) -> Value {
        match self {
            Operand::Text(s) => Value::String(s.clone()),
            Operand::List(items) => Value::Array(items.iter().cloned().map(Value::String).collect()),
            Operand::Document(map) => Value::Object(map.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterTerm {
    /// Dotted field path, e.g. `location.state`.
    pub path: String,
    pub op: Operator,
    pub operand: Operand,
}

impl FilterTerm {
    pub fn new(path: impl Into<String>, op: Operator, operand: Operand) -> Self {
        Self {
            path: path.into(),
            op,
            operand,
        }
    }
}

/// A conjunction of filter terms.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    terms: Vec<FilterTerm>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn and(mut self, term: FilterTerm) -> Self {
        self.terms.push(term);
        self
    }

    /// Equality on one field.
    pub fn eq(path: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new().and(FilterTerm::new(path, Operator::Eq, Operand::Text(value.into())))
    }

    pub fn by_id(id: impl Into<String>) -> Self {
        Self::eq(ID_FIELD, id)
    }

    /// Combine two filters into one conjunction.
    pub fn merge(mut self, other: Filter) -> Self {
        self.terms.extend(other.terms);
        self
    }

    pub fn terms(&self) -> &[FilterTerm] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// The distinct field paths this filter constrains.
    pub fn fields(&self) -> BTreeSet<&str> {
        self.terms.iter().map(|t| t.path.as_str()).collect()
    }

    /// Render in the store's native syntax, e.g. `{"averageCost": {"$lte": "10000"}}`.
    pub fn to_document(&self) -> Value {
        let mut out = Map::new();
        for path in self.ordered_paths() {
            let terms: Vec<&FilterTerm> = self.terms.iter().filter(|t| t.path == path).collect();
            let rendered = match terms.as_slice() {
                [only] if only.op == Operator::Eq => only.operand.to_value(),
                _ => {
                    let mut ops = Map::new();
                    for term in terms {
                        ops.insert(term.op.native().to_string(), term.operand.to_value());
                    }
                    Value::Object(ops)
                }
            };
            out.insert(path.to_string(), rendered);
        }
        Value::Object(out)
    }

    fn ordered_paths(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for term in &self.terms {
            if !seen.contains(&term.path.as_str()) {
                seen.push(term.path.as_str());
            }
        }
        seen
    }
}

#[derive(Default)]
struct PathConditions {
    equals: Vec<String>,
    compares: Vec<(Operator, String)>,
    members: Vec<String>,
    literal: Map<String, Value>,
}

/// Translate the non-reserved query parameters into a [`Filter`].
///
/// Repeated plain keys collapse into an `in` term, repeated `field[in]`
/// keys accumulate into one value list, and unrecognised bracket tokens are
/// merged into a single embedded-document match per field.
pub fn translate(params: &QueryParams) -> Result<Filter, DataError> {
    let mut by_path: Vec<(String, PathConditions)> = Vec::new();

    for (key, value) in params.filter_terms() {
        if key.is_empty() {
            continue;
        }
        let (path, token) = split_key(key)?;
        let idx = match by_path.iter().position(|(p, _)| p == path) {
            Some(idx) => idx,
            None => {
                by_path.push((path.to_string(), PathConditions::default()));
                by_path.len() - 1
            }
        };
        let slot = &mut by_path[idx].1;
        match token.map(|t| (t, Operator::from_token(t))) {
            None => slot.equals.push(value.to_string()),
            Some((_, Some(Operator::In))) => slot.members.push(value.to_string()),
            Some((_, Some(op))) if op.is_bracket() => slot.compares.push((op, value.to_string())),
            Some((raw, _)) => {
                slot.literal
                    .insert(raw.to_string(), Value::String(value.to_string()));
            }
        }
    }

    let mut filter = Filter::new();
    for (path, conds) in by_path {
        let mut equals = conds.equals;
        if equals.len() == 1 {
            let value = equals.remove(0);
            filter = filter.and(FilterTerm::new(&path, Operator::Eq, Operand::Text(value)));
        } else if !equals.is_empty() {
            filter = filter.and(FilterTerm::new(&path, Operator::In, Operand::List(equals)));
        }
        for (op, value) in conds.compares {
            filter = filter.and(FilterTerm::new(&path, op, Operand::Text(value)));
        }
        if !conds.members.is_empty() {
            filter = filter.and(FilterTerm::new(&path, Operator::In, Operand::List(conds.members)));
        }
        if !conds.literal.is_empty() {
            filter = filter.and(FilterTerm::new(&path, Operator::Eq, Operand::Document(conds.literal)));
        }
    }

    tracing::debug!(filter = %filter.to_document(), "translated query filter");
    Ok(filter)
}

/// Split `field[token]` into its parts. Plain keys carry no token.
fn split_key(key: &str) -> Result<(&str, Option<&str>), DataError> {
    let malformed = || DataError::invalid_query(format!("Malformed filter parameter '{key}'"));

    match key.find('[') {
        None if key.contains(']') => Err(malformed()),
        None => Ok((key, None)),
        Some(open) => {
            let path = &key[..open];
            let rest = &key[open + 1..];
            let token = rest.strip_suffix(']').ok_or_else(malformed)?;
            let token_ok = !token.is_empty()
                && token.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
            if path.is_empty() || path.contains(']') || !token_ok {
                return Err(malformed());
            }
            Ok((path, Some(token)))
        }
    }
}
