use serde_json::Value;

use crate::error::DataError;

/// Identity field present on every stored document.
pub const ID_FIELD: &str = "_id";

/// Creation timestamp assigned by the store on insert.
pub const CREATED_AT_FIELD: &str = "createdAt";

/// Trait describing a stored document type: its collection and the rules the
/// store enforces for it.
///
/// ```ignore
/// impl Document for Course {
///     fn collection() -> &'static str { "courses" }
///     fn relations() -> &'static [Relation] {
///         const RELATIONS: &[Relation] = &[Relation::reference("bootcamp", "bootcamps")];
///         RELATIONS
///     }
/// }
/// ```
pub trait Document: Send + Sync + 'static {
    fn collection() -> &'static str;

    /// Relations that may be expanded when querying this collection.
    fn relations() -> &'static [Relation] {
        &[]
    }

    /// Fields whose values must be unique across the collection.
    fn unique_fields() -> &'static [&'static str] {
        &[]
    }

    /// Fields never returned by a query unless it explicitly reveals them.
    fn hidden_fields() -> &'static [&'static str] {
        &[]
    }
}

/// How a relation links two collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    /// The field at `name` holds the `_id` of one document in `collection`.
    Reference,
    /// Every document in `collection` whose `foreign_field` equals this
    /// document's `_id` is attached as an array under `name`.
    ReverseMany { foreign_field: &'static str },
}

/// A declared link from one collection to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relation {
    pub name: &'static str,
    pub collection: &'static str,
    pub kind: RelationKind,
    /// Hidden fields of `collection`, stripped from expanded documents.
    pub hidden: &'static [&'static str],
}

impl Relation {
    pub const fn reference(path: &'static str, collection: &'static str) -> Self {
        Self {
            name: path,
            collection,
            kind: RelationKind::Reference,
            hidden: &[],
        }
    }

    pub const fn virtual_many(
        name: &'static str,
        collection: &'static str,
        foreign_field: &'static str,
    ) -> Self {
        Self {
            name,
            collection,
            kind: RelationKind::ReverseMany { foreign_field },
            hidden: &[],
        }
    }

    /// Declare the related collection's hidden fields.
    ///
    /// ```ignore
    /// Relation::reference("user", "users").hiding(User::HIDDEN_FIELDS)
    /// ```
    pub const fn hiding(self, hidden: &'static [&'static str]) -> Self {
        Self { hidden, ..self }
    }
}

/// Generate a fresh document id: 24 lower-case hex characters.
pub fn new_id() -> String {
    let simple = uuid::Uuid::new_v4().simple().to_string();
    simple[..24].to_string()
}

pub fn is_valid_id(id: &str) -> bool {
    id.len() == 24 && id.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// Check an id coming from a request path or body.
pub fn parse_id(id: &str) -> Result<&str, DataError> {
    if is_valid_id(id) {
        Ok(id)
    } else {
        Err(DataError::InvalidId(id.to_string()))
    }
}

/// Current time in the format stored under `createdAt`.
pub fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// The `_id` of a stored document, if it has one.
pub fn id_of(doc: &Value) -> Option<&str> {
    doc.get(ID_FIELD).and_then(Value::as_str)
}
