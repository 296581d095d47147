pub mod document;
pub mod error;
pub mod eval;
pub mod filter;
pub mod memory;
pub mod page;
pub mod params;
pub mod query;
pub mod results;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod store;

pub use document::{Document, Relation, RelationKind};
pub use error::DataError;
pub use filter::{translate, Filter, FilterTerm, Operand, Operator};
pub use memory::MemoryStore;
pub use page::{PageLink, PageWindow, Pageable, PaginationLinks};
pub use params::QueryParams;
pub use query::{FindQuery, Populate, Projection, SortSpec};
pub use results::{AdvancedResults, Envelope};
#[cfg(feature = "sqlite")]
pub use sqlite::{SqliteStore, SqlxErrorExt};
pub use store::DocumentStore;

pub mod prelude {
    //! Re-exports of the most commonly used data types.
    pub use crate::{
        AdvancedResults, DataError, Document, DocumentStore, Envelope, Filter, FindQuery, MemoryStore,
        Populate, QueryParams, Relation,
    };
}
