//! The advanced results pipeline: query string in, paginated envelope out.
//!
//! ```ignore
//! let pipeline = AdvancedResults::<Bootcamp>::new().populate("courses");
//! let envelope = pipeline.run(&store, &params).await?;
//! ```

use std::marker::PhantomData;

use devcamper_core::axum::response::{IntoResponse, Response};
use devcamper_core::axum::Json;
use serde::Serialize;
use serde_json::Value;

use crate::document::Document;
use crate::error::DataError;
use crate::filter::translate;
use crate::page::{PageWindow, Pageable, PaginationLinks};
use crate::params::QueryParams;
use crate::query::{FindQuery, Populate, Projection, SortSpec};
use crate::store::DocumentStore;

/// Paginated list response.
///
/// `count` is the number of documents in `data`, not the total match count.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope {
    pub success: bool,
    pub count: usize,
    pub pagination: PaginationLinks,
    pub data: Vec<Value>,
    #[serde(skip)]
    pub window: PageWindow,
}

impl Envelope {
    pub fn new(data: Vec<Value>, window: PageWindow) -> Self {
        Self {
            success: true,
            count: data.len(),
            pagination: window.links(),
            data,
            window,
        }
    }
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Per-resource list pipeline. Relations to expand are fixed when the
/// pipeline is built; everything else comes from the request's query string.
pub struct AdvancedResults<M> {
    populate: Vec<Populate>,
    _marker: PhantomData<fn() -> M>,
}

impl<M: Document> Default for AdvancedResults<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Document> Clone for AdvancedResults<M> {
    fn clone(&self) -> Self {
        Self {
            populate: self.populate.clone(),
            _marker: PhantomData,
        }
    }
}

impl<M: Document> AdvancedResults<M> {
    pub fn new() -> Self {
        Self {
            populate: Vec::new(),
            _marker: PhantomData,
        }
    }

    pub fn populate(mut self, populate: impl Into<Populate>) -> Self {
        self.populate.push(populate.into());
        self
    }

    /// Compile the query string into a pending find plus the requested page.
    /// Nothing touches the store yet.
    pub fn compile(&self, params: &QueryParams) -> Result<(FindQuery, Pageable), DataError> {
        let filter = translate(params)?;

        let projection = match params.get("select") {
            Some(list) => Projection::parse(list)?,
            None => Projection::All,
        };
        let sort = match params.get("sort").map(SortSpec::parse) {
            Some(sort) if !sort.is_empty() => sort,
            _ => SortSpec::newest_first(),
        };
        let pageable = Pageable::from_params(params);

        let query = self.populate.iter().cloned().fold(
            FindQuery::new::<M>()
                .filter(filter)
                .select(projection)
                .sort(sort)
                .skip(pageable.start_index())
                .limit(pageable.limit),
            FindQuery::populate,
        );
        Ok((query, pageable))
    }

    /// Count the matching documents, fetch the requested page and wrap it.
    pub async fn run<S: DocumentStore>(&self, store: &S, params: &QueryParams) -> Result<Envelope, DataError> {
        let (query, pageable) = self.compile(params)?;
        let total = store.count(query.collection(), query.filter_ref()).await?;
        let window = pageable.window(total);
        let data = query.execute(store).await?;

        tracing::debug!(
            collection = M::collection(),
            page = window.page,
            limit = window.limit,
            total,
            returned = data.len(),
            "advanced results"
        );
        Ok(Envelope::new(data, window))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Relation;
    use serde_json::json;

    struct Course;

    impl Document for Course {
        fn collection() -> &'static str {
            "courses"
        }

        fn relations() -> &'static [Relation] {
            const RELATIONS: &[Relation] = &[Relation::reference("bootcamp", "bootcamps")];
            RELATIONS
        }
    }

    fn compile(raw: &str) -> (FindQuery, Pageable) {
        AdvancedResults::<Course>::new()
            .populate(Populate::path("bootcamp").select(["name", "description"]))
            .compile(&QueryParams::parse(raw))
            .unwrap()
    }

    #[test]
    fn defaults_sort_newest_first_and_take_the_first_page() {
        let (query, pageable) = compile("");
        assert_eq!(query.sort_spec().to_spec(), "-createdAt");
        assert_eq!(query.skip_count(), 0);
        assert_eq!(query.limit_count(), Some(25));
        assert_eq!(pageable, Pageable::default());
        assert_eq!(query.populates().len(), 1);
    }

    #[test]
    fn reserved_parameters_shape_the_query() {
        let (query, _) = compile("select=title,tuition&sort=tuition,-title&page=3&limit=4&minimumSkill=beginner");
        assert_eq!(query.projection().to_spec(), "title tuition");
        assert_eq!(query.sort_spec().to_spec(), "tuition -title");
        assert_eq!(query.skip_count(), 8);
        assert_eq!(query.limit_count(), Some(4));
        assert_eq!(query.filter_ref().to_document(), json!({"minimumSkill": "beginner"}));
    }

    #[test]
    fn malformed_filters_fail_before_the_store() {
        let err = AdvancedResults::<Course>::new()
            .compile(&QueryParams::parse("tuition[lte=1"))
            .unwrap_err();
        assert!(matches!(err, DataError::InvalidQuery(_)));
    }

    #[test]
    fn envelope_counts_the_page_not_the_total() {
        let window = Pageable::new(2, 2).window(5);
        let envelope = Envelope::new(vec![json!({"a": 1}), json!({"a": 2})], window);
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({
                "success": true,
                "count": 2,
                "pagination": {"next": {"page": 3, "limit": 2}, "prev": {"page": 1, "limit": 2}},
                "data": [{"a": 1}, {"a": 2}]
            })
        );
    }
}
