//! In-process evaluation of [`FindQuery`] descriptors over JSON documents,
//! shared by every store that keeps documents as JSON.
//!
//! Query values arrive as text and are cast to the type of the stored field
//! before comparing: `"10000"` compares numerically against a number field
//! and `"true"` against a boolean. A term on an array field matches when any
//! element matches.

use std::cmp::Ordering;

use serde_json::{Map, Value};

use crate::document::{id_of, new_id, timestamp, Relation, RelationKind, CREATED_AT_FIELD, ID_FIELD};
use crate::error::DataError;
use crate::filter::{Filter, FilterTerm, Operand, Operator};
use crate::query::{FindQuery, Populate, Projection, SortSpec};

/// Value at a dotted path, traversing nested objects.
pub fn lookup<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(doc, |current, segment| current.get(segment))
}

pub fn matches(doc: &Value, filter: &Filter) -> bool {
    filter.terms().iter().all(|term| term_matches(doc, term))
}

fn term_matches(doc: &Value, term: &FilterTerm) -> bool {
    let target = lookup(doc, &term.path);
    match (term.op, &term.operand) {
        (Operator::Eq, operand) => target.is_some_and(|t| operand_equals(t, operand)),
        (Operator::Ne, operand) => !target.is_some_and(|t| operand_equals(t, operand)),
        (Operator::In, operand) => target.is_some_and(|t| operand_equals(t, operand)),
        (Operator::Nin, operand) => !target.is_some_and(|t| operand_equals(t, operand)),
        (op, Operand::Text(raw)) => target.is_some_and(|t| ordering_holds(t, raw, op)),
        _ => false,
    }
}

fn operand_equals(target: &Value, operand: &Operand) -> bool {
    match operand {
        Operand::Text(raw) => text_equals(target, raw),
        Operand::List(items) => items.iter().any(|raw| text_equals(target, raw)),
        Operand::Document(map) => match target {
            Value::Object(obj) => obj == map,
            Value::Array(items) => items.iter().any(|item| item.as_object() == Some(map)),
            _ => false,
        },
    }
}

fn text_equals(target: &Value, raw: &str) -> bool {
    match target {
        Value::Array(items) => items.iter().any(|item| !item.is_array() && text_equals(item, raw)),
        other => compare_text(other, raw) == Some(Ordering::Equal),
    }
}

fn ordering_holds(target: &Value, raw: &str, op: Operator) -> bool {
    if let Value::Array(items) = target {
        return items.iter().any(|item| !item.is_array() && ordering_holds(item, raw, op));
    }
    match compare_text(target, raw) {
        Some(ord) => match op {
            Operator::Gt => ord == Ordering::Greater,
            Operator::Gte => ord != Ordering::Less,
            Operator::Lt => ord == Ordering::Less,
            Operator::Lte => ord != Ordering::Greater,
            _ => false,
        },
        None => false,
    }
}

/// Compare a stored scalar with a textual query value cast to its type.
/// `None` when the text cannot be cast.
fn compare_text(target: &Value, raw: &str) -> Option<Ordering> {
    match target {
        Value::Number(n) => {
            let lhs = n.as_f64()?;
            let rhs = raw.trim().parse::<f64>().ok()?;
            lhs.partial_cmp(&rhs)
        }
        Value::String(s) => Some(s.as_str().cmp(raw)),
        Value::Bool(b) => parse_bool(raw).map(|rhs| b.cmp(&rhs)),
        _ => None,
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

/// Store-order rank of a value's type: missing/null, numbers, strings,
/// objects, arrays, booleans.
fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Number(_)) => 1,
        Some(Value::String(_)) => 2,
        Some(Value::Object(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Bool(_)) => 5,
    }
}

pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let by_rank = type_rank(a).cmp(&type_rank(b));
    if by_rank != Ordering::Equal {
        return by_rank;
    }
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(x @ (Value::Object(_) | Value::Array(_))), Some(y)) => x.to_string().cmp(&y.to_string()),
        _ => Ordering::Equal,
    }
}

/// Stable multi-key sort; documents that compare equal keep their order.
pub fn sort_documents(docs: &mut [Value], spec: &SortSpec) {
    if spec.is_empty() {
        return;
    }
    docs.sort_by(|a, b| {
        for key in spec.keys() {
            let ord = compare_values(lookup(a, &key.path), lookup(b, &key.path));
            let ord = if key.descending { ord.reverse() } else { ord };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });
}

pub fn project(doc: &Value, projection: &Projection) -> Value {
    match projection {
        Projection::All => doc.clone(),
        Projection::Include(fields) => {
            let mut out = Value::Object(Map::new());
            if let Some(id) = doc.get(ID_FIELD) {
                insert_path(&mut out, ID_FIELD, id.clone());
            }
            for field in fields {
                if let Some(value) = lookup(doc, field) {
                    insert_path(&mut out, field, value.clone());
                }
            }
            out
        }
        Projection::Exclude(fields) => {
            let mut out = doc.clone();
            for field in fields {
                remove_path(&mut out, field);
            }
            out
        }
    }
}

pub fn strip_hidden(doc: &mut Value, hidden: &[&str]) {
    for field in hidden {
        remove_path(doc, field);
    }
}

fn insert_path(doc: &mut Value, path: &str, value: Value) {
    let mut current = doc;
    let mut segments = path.split('.').peekable();
    while let Some(segment) = segments.next() {
        let Value::Object(map) = current else {
            return;
        };
        if segments.peek().is_none() {
            map.insert(segment.to_string(), value);
            return;
        }
        current = map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
}

fn remove_path(doc: &mut Value, path: &str) {
    match path.rsplit_once('.') {
        None => {
            if let Value::Object(map) = doc {
                map.remove(path);
            }
        }
        Some((parent, leaf)) => {
            let parent = parent
                .split('.')
                .try_fold(doc, |current, segment| current.get_mut(segment));
            if let Some(Value::Object(map)) = parent {
                map.remove(leaf);
            }
        }
    }
}

/// Filter, sort, window and project one collection's documents.
/// Relation expansion and hidden-field removal happen afterwards.
pub fn select_page<'a, I>(docs: I, query: &FindQuery) -> Vec<Value>
where
    I: IntoIterator<Item = &'a Value>,
{
    let mut matched: Vec<Value> = docs
        .into_iter()
        .filter(|doc| matches(doc, query.filter_ref()))
        .cloned()
        .collect();
    sort_documents(&mut matched, query.sort_spec());

    let skip = usize::try_from(query.skip_count()).unwrap_or(usize::MAX);
    let limit = query
        .limit_count()
        .map(|l| usize::try_from(l).unwrap_or(usize::MAX))
        .unwrap_or(usize::MAX);

    matched
        .into_iter()
        .skip(skip)
        .take(limit)
        .map(|doc| project(&doc, query.projection()))
        .collect()
}

/// Inline related documents into `doc` according to `relation`.
/// The relation's hidden fields never reach the inlined copies.
pub fn expand(doc: &mut Value, relation: &Relation, populate: &Populate, related: &[Value]) {
    match relation.kind {
        RelationKind::Reference => {
            let Some(id) = doc.get(relation.name).and_then(Value::as_str).map(str::to_string) else {
                return;
            };
            let found = related
                .iter()
                .find(|candidate| id_of(candidate) == Some(id.as_str()))
                .map(|candidate| inline(candidate, relation, populate))
                .unwrap_or(Value::Null);
            if let Value::Object(map) = doc {
                map.insert(relation.name.to_string(), found);
            }
        }
        RelationKind::ReverseMany { foreign_field } => {
            let Some(id) = id_of(doc).map(str::to_string) else {
                return;
            };
            let children: Vec<Value> = related
                .iter()
                .filter(|candidate| lookup(candidate, foreign_field).and_then(Value::as_str) == Some(id.as_str()))
                .map(|candidate| inline(candidate, relation, populate))
                .collect();
            if let Value::Object(map) = doc {
                map.insert(relation.name.to_string(), Value::Array(children));
            }
        }
    }
}

fn inline(related: &Value, relation: &Relation, populate: &Populate) -> Value {
    let mut copy = project(related, &populate.select);
    strip_hidden(&mut copy, relation.hidden);
    copy
}

/// Assign `_id` and `createdAt` to a new document when they are absent.
pub fn prepare_insert(mut doc: Map<String, Value>) -> Result<Value, DataError> {
    match doc.get(ID_FIELD) {
        None => {
            doc.insert(ID_FIELD.to_string(), Value::String(new_id()));
        }
        Some(Value::String(id)) => {
            crate::document::parse_id(id)?;
        }
        Some(other) => return Err(DataError::InvalidId(other.to_string())),
    }
    doc.entry(CREATED_AT_FIELD.to_string())
        .or_insert_with(|| Value::String(timestamp()));
    Ok(Value::Object(doc))
}

/// Apply top-level `$set`-style changes. The identity field never changes.
pub fn apply_changes(doc: &mut Value, changes: Map<String, Value>) {
    if let Value::Object(map) = doc {
        for (key, value) in changes {
            if key != ID_FIELD {
                map.insert(key, value);
            }
        }
    }
}

/// Reject `candidate` if another document already holds one of its unique values.
pub fn check_unique<'a, I>(existing: I, candidate: &Value, unique_fields: &[&str]) -> Result<(), DataError>
where
    I: IntoIterator<Item = &'a Value>,
{
    if unique_fields.is_empty() {
        return Ok(());
    }
    let own_id = id_of(candidate);
    for other in existing {
        if own_id.is_some() && id_of(other) == own_id {
            continue;
        }
        for field in unique_fields {
            let value = lookup(candidate, field);
            if value.is_some_and(|v| !v.is_null()) && lookup(other, field) == value {
                return Err(DataError::Duplicate(field.to_string()));
            }
        }
    }
    Ok(())
}
