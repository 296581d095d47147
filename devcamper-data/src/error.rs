/// Errors that can occur in the data layer.
#[derive(Debug)]
pub enum DataError {
    NotFound(String),
    /// An identifier that is not a well-formed document id.
    InvalidId(String),
    /// Malformed filter or projection syntax coming from the client.
    InvalidQuery(String),
    /// A unique field already holds this value in another document.
    Duplicate(String),
    UnknownRelation { collection: String, relation: String },
    Database(Box<dyn std::error::Error + Send + Sync>),
    Other(String),
}

impl DataError {
    /// Construct a `Database` variant from any error type.
    pub fn database(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        DataError::Database(Box::new(err))
    }

    pub fn invalid_query(msg: impl Into<String>) -> Self {
        DataError::InvalidQuery(msg.into())
    }
}

impl std::fmt::Display for DataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataError::NotFound(msg) => write!(f, "Not found: {msg}"),
            DataError::InvalidId(id) => write!(f, "Invalid document id: {id}"),
            DataError::InvalidQuery(msg) => write!(f, "Invalid query: {msg}"),
            DataError::Duplicate(field) => write!(f, "Duplicate value for unique field '{field}'"),
            DataError::UnknownRelation { collection, relation } => {
                write!(f, "Cannot populate '{relation}' on collection '{collection}'")
            }
            DataError::Database(err) => write!(f, "Database error: {err}"),
            DataError::Other(msg) => write!(f, "Data error: {msg}"),
        }
    }
}

impl std::error::Error for DataError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DataError::Database(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::database(err)
    }
}

impl From<DataError> for devcamper_core::AppError {
    fn from(err: DataError) -> Self {
        use devcamper_core::AppError;
        match err {
            DataError::NotFound(msg) => AppError::NotFound(msg),
            DataError::InvalidId(_) => AppError::NotFound("Resource not found".into()),
            DataError::InvalidQuery(msg) => AppError::BadRequest(msg),
            DataError::Duplicate(_) => AppError::BadRequest("Duplicate field value entered".into()),
            other @ DataError::UnknownRelation { .. } => AppError::Internal(other.to_string()),
            DataError::Database(e) => AppError::Internal(e.to_string()),
            DataError::Other(msg) => AppError::Internal(msg),
        }
    }
}
