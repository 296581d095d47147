//! JSON path lookup for response assertions: `data[0].bootcamp.name`,
//! `data.len()`, `pagination.next.page`.

use serde_json::Value;

static NULL: Value = Value::Null;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathToken {
    Field(String),
    Index(usize),
    Len,
}

pub fn tokenize_path(path: &str) -> Vec<PathToken> {
    let mut tokens = Vec::new();
    for segment in path.split('.').filter(|s| !s.is_empty()) {
        if segment == "len()" {
            tokens.push(PathToken::Len);
            continue;
        }
        let (field, mut rest) = segment.split_at(segment.find('[').unwrap_or(segment.len()));
        if !field.is_empty() {
            tokens.push(PathToken::Field(field.to_string()));
        }
        while let Some(inner) = rest.strip_prefix('[') {
            let close = inner
                .find(']')
                .unwrap_or_else(|| panic!("unclosed bracket in JSON path {path:?}"));
            let index = inner[..close]
                .parse()
                .unwrap_or_else(|_| panic!("non-numeric array index in JSON path {path:?}"));
            tokens.push(PathToken::Index(index));
            rest = &inner[close + 1..];
        }
    }
    tokens
}

/// Resolve `path` against `root`. Missing steps resolve to `null`.
pub fn resolve_path(root: &Value, path: &str) -> Value {
    let mut current = root;
    for token in tokenize_path(path) {
        current = match token {
            PathToken::Field(name) => current.get(&name).unwrap_or(&NULL),
            PathToken::Index(idx) => current.get(idx).unwrap_or(&NULL),
            PathToken::Len => {
                let len = match current {
                    Value::Array(items) => items.len(),
                    Value::Object(map) => map.len(),
                    Value::String(s) => s.len(),
                    other => panic!("len() applied to non-collection {other} in JSON path {path:?}"),
                };
                return Value::from(len);
            }
        };
    }
    current.clone()
}
