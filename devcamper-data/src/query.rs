use crate::document::{Document, Relation, CREATED_AT_FIELD};
use crate::error::DataError;
use crate::filter::Filter;
use crate::store::DocumentStore;

/// Which fields a query returns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Projection {
    /// Every field.
    #[default]
    All,
    /// Only these paths, plus the identity field.
    Include(Vec<String>),
    /// Every field except these paths.
    Exclude(Vec<String>),
}

impl Projection {
    /// Parse a comma-separated list such as `name,description` or
    /// `-description,-photo`. Mixing inclusions and exclusions is rejected.
    pub fn parse(list: &str) -> Result<Self, DataError> {
        let fields: Vec<&str> = list
            .split(',')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .collect();
        if fields.is_empty() {
            return Ok(Projection::All);
        }
        let excluded = fields.iter().filter(|f| f.starts_with('-')).count();
        if excluded == 0 {
            Ok(Projection::Include(fields.iter().map(|f| f.to_string()).collect()))
        } else if excluded == fields.len() {
            Ok(Projection::Exclude(
                fields.iter().map(|f| f[1..].to_string()).collect(),
            ))
        } else {
            Err(DataError::invalid_query(
                "Projection cannot mix included and excluded fields",
            ))
        }
    }

    pub fn include<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Projection::Include(fields.into_iter().map(Into::into).collect())
    }

    /// Space-joined field list, the way the store spells projections.
    pub fn to_spec(&self) -> String {
        match self {
            Projection::All => String::new(),
            Projection::Include(fields) => fields.join(" "),
            Projection::Exclude(fields) => fields
                .iter()
                .map(|f| format!("-{f}"))
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub path: String,
    pub descending: bool,
}

/// Multi-key sort order; earlier keys take precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortSpec {
    keys: Vec<SortKey>,
}

impl SortSpec {
    /// Parse `name,-averageCost`: a leading `-` sorts that key descending.
    pub fn parse(list: &str) -> Self {
        let keys = list
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty() && *k != "-")
            .map(|k| match k.strip_prefix('-') {
                Some(path) => SortKey {
                    path: path.to_string(),
                    descending: true,
                },
                None => SortKey {
                    path: k.to_string(),
                    descending: false,
                },
            })
            .collect();
        Self { keys }
    }

    /// Most recently created first.
    pub fn newest_first() -> Self {
        Self {
            keys: vec![SortKey {
                path: CREATED_AT_FIELD.to_string(),
                descending: true,
            }],
        }
    }

    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Space-joined spec, e.g. `name -averageCost`.
    pub fn to_spec(&self) -> String {
        self.keys
            .iter()
            .map(|k| {
                if k.descending {
                    format!("-{}", k.path)
                } else {
                    k.path.clone()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A relation to expand on every result, optionally narrowed to some fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Populate {
    pub path: String,
    pub select: Projection,
}

impl Populate {
    pub fn path(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            select: Projection::All,
        }
    }

    pub fn select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select = Projection::include(fields);
        self
    }
}

impl From<&str> for Populate {
    fn from(path: &str) -> Self {
        Populate::path(path)
    }
}

/// A pending find over one collection. Each builder method consumes the
/// descriptor and returns the updated one; [`FindQuery::execute`] runs it once.
#[derive(Debug, Clone)]
pub struct FindQuery {
    collection: &'static str,
    relations: &'static [Relation],
    hidden: &'static [&'static str],
    filter: Filter,
    projection: Projection,
    sort: SortSpec,
    skip: u64,
    limit: Option<u64>,
    populate: Vec<Populate>,
    reveal_hidden: bool,
}

impl FindQuery {
    pub fn new<M: Document>() -> Self {
        Self {
            collection: M::collection(),
            relations: M::relations(),
            hidden: M::hidden_fields(),
            filter: Filter::new(),
            projection: Projection::All,
            sort: SortSpec::default(),
            skip: 0,
            limit: None,
            populate: Vec::new(),
            reveal_hidden: false,
        }
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    pub fn select(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }

    pub fn sort(mut self, sort: SortSpec) -> Self {
        self.sort = sort;
        self
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = skip;
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn populate(mut self, populate: Populate) -> Self {
        self.populate.push(populate);
        self
    }

    /// Return hidden fields too (e.g. a password hash for credential checks).
    pub fn reveal_hidden(mut self) -> Self {
        self.reveal_hidden = true;
        self
    }

    pub fn collection(&self) -> &'static str {
        self.collection
    }

    pub fn filter_ref(&self) -> &Filter {
        &self.filter
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn sort_spec(&self) -> &SortSpec {
        &self.sort
    }

    pub fn skip_count(&self) -> u64 {
        self.skip
    }

    pub fn limit_count(&self) -> Option<u64> {
        self.limit
    }

    pub fn populates(&self) -> &[Populate] {
        &self.populate
    }

    pub fn reveals_hidden(&self) -> bool {
        self.reveal_hidden
    }

    /// Fields to strip from results.
    pub fn hidden_fields(&self) -> &'static [&'static str] {
        if self.reveal_hidden { &[] } else { self.hidden }
    }

    /// Match each requested expansion against the declared relations.
    pub fn resolve_populates(&self) -> Result<Vec<(Relation, &Populate)>, DataError> {
        self.populate
            .iter()
            .map(|p| {
                self.relations
                    .iter()
                    .find(|r| r.name == p.path)
                    .map(|r| (*r, p))
                    .ok_or_else(|| DataError::UnknownRelation {
                        collection: self.collection.to_string(),
                        relation: p.path.clone(),
                    })
            })
            .collect()
    }

    /// Materialize the query against a store.
    pub async fn execute<S: DocumentStore>(self, store: &S) -> Result<Vec<serde_json::Value>, DataError> {
        store.find(&self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Bootcamp;

    impl Document for Bootcamp {
        fn collection() -> &'static str {
            "bootcamps"
        }

        fn relations() -> &'static [Relation] {
            const RELATIONS: &[Relation] = &[Relation::virtual_many("courses", "courses", "bootcamp")];
            RELATIONS
        }

        fn hidden_fields() -> &'static [&'static str] {
            &["secret"]
        }
    }

    #[test]
    fn select_list_becomes_space_joined_projection() {
        let projection = Projection::parse("name,description,housing").unwrap();
        assert_eq!(projection.to_spec(), "name description housing");
        assert_eq!(Projection::parse("").unwrap(), Projection::All);
    }

    #[test]
    fn exclusion_projection_and_mixing() {
        let projection = Projection::parse("-photo,-description").unwrap();
        assert_eq!(
            projection,
            Projection::Exclude(vec!["photo".into(), "description".into()])
        );
        assert!(matches!(
            Projection::parse("name,-photo"),
            Err(DataError::InvalidQuery(_))
        ));
    }

    #[test]
    fn sort_list_marks_descending_keys() {
        let sort = SortSpec::parse("name,-averageCost");
        assert_eq!(sort.to_spec(), "name -averageCost");
        assert!(!sort.keys()[0].descending);
        assert!(sort.keys()[1].descending);
        assert_eq!(SortSpec::newest_first().to_spec(), "-createdAt");
    }

    #[test]
    fn unknown_relation_fails_resolution() {
        let query = FindQuery::new::<Bootcamp>().populate(Populate::path("reviews"));
        assert!(matches!(
            query.resolve_populates(),
            Err(DataError::UnknownRelation { .. })
        ));

        let query = FindQuery::new::<Bootcamp>().populate("courses".into());
        let resolved = query.resolve_populates().unwrap();
        assert_eq!(resolved[0].0.collection, "courses");
    }

    #[test]
    fn hidden_fields_can_be_revealed() {
        let query = FindQuery::new::<Bootcamp>();
        assert_eq!(query.hidden_fields(), &["secret"]);
        assert!(query.reveal_hidden().hidden_fields().is_empty());
    }
}
