//! Reusable, composable query filters.
//!
//! A [`Query`] is an ordered list of [`Filter`]s combined with logical AND.
//! Named [`Criteria`] push filters onto a query; repositories evaluate the
//! final query before any pagination happens. In-memory adapters use
//! [`Query::matches`]; SQL adapters render each filter into a `WHERE` clause.

use crate::state::{DeletedState, EnableState};

/// Columns every filterable record exposes.
pub trait Filterable {
    fn record_id(&self) -> i64;
    fn name(&self) -> &str;
    fn state(&self) -> EnableState;
    fn is_deleted(&self) -> DeletedState;
}

/// A single equality/containment predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// `is_deleted = 0`
    NotDeleted,
    /// `state = ?`
    State(EnableState),
    /// `name = ?`
    NameEq(String),
    /// `name LIKE '%?%'`
    NameLike(String),
    /// `id IN (...)`
    IdIn(Vec<i64>),
    /// `id <> ?`
    IdNot(i64),
}

impl Filter {
    pub fn matches<T: Filterable + ?Sized>(&self, record: &T) -> bool {
        match self {
            Filter::NotDeleted => record.is_deleted() == DeletedState::NotDeleted,
            Filter::State(state) => record.state() == *state,
            Filter::NameEq(name) => record.name() == name,
            Filter::NameLike(fragment) => record.name().contains(fragment.as_str()),
            Filter::IdIn(ids) => ids.contains(&record.record_id()),
            Filter::IdNot(id) => record.record_id() != *id,
        }
    }
}

/// Conjunction of filters, in the order they were pushed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    filters: Vec<Filter>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Apply a named criterion.
    pub fn with<C: Criteria + ?Sized>(self, criteria: &C) -> Self {
        criteria.apply(self)
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn matches<T: Filterable + ?Sized>(&self, record: &T) -> bool {
        self.filters.iter().all(|f| f.matches(record))
    }
}

/// A named, reusable query filter.
pub trait Criteria {
    fn apply(&self, query: Query) -> Query;
}

/// Excludes soft-deleted records.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsDeletedCriteria;

impl Criteria for IsDeletedCriteria {
    fn apply(&self, query: Query) -> Query {
        query.push(Filter::NotDeleted)
    }
}

/// Restricts to one enable state (enabled unless told otherwise).
#[derive(Debug, Clone, Copy, Default)]
pub struct StateCriteria {
    state: EnableState,
}

impl StateCriteria {
    pub fn new(state: EnableState) -> Self {
        Self { state }
    }
}

impl Criteria for StateCriteria {
    fn apply(&self, query: Query) -> Query {
        query.push(Filter::State(self.state))
    }
}

/// Exact name match.
#[derive(Debug, Clone)]
pub struct NameCriteria {
    name: String,
}

impl NameCriteria {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Criteria for NameCriteria {
    fn apply(&self, query: Query) -> Query {
        query.push(Filter::NameEq(self.name.clone()))
    }
}

/// Substring name match. A missing or blank fragment leaves the query alone,
/// so listing endpoints can pass the raw search box through.
#[derive(Debug, Clone, Default)]
pub struct NameLikeCriteria {
    fragment: Option<String>,
}

impl NameLikeCriteria {
    pub fn new(fragment: Option<impl Into<String>>) -> Self {
        Self {
            fragment: fragment.map(Into::into),
        }
    }
}

impl Criteria for NameLikeCriteria {
    fn apply(&self, query: Query) -> Query {
        match self.fragment.as_deref().map(str::trim) {
            Some(fragment) if !fragment.is_empty() => {
                query.push(Filter::NameLike(fragment.to_string()))
            }
            _ => query,
        }
    }
}

/// Restricts to a set of identifiers.
#[derive(Debug, Clone, Default)]
pub struct IdInCriteria {
    ids: Vec<i64>,
}

impl IdInCriteria {
    pub fn new<I>(ids: impl IntoIterator<Item = I>) -> Self
    where
        I: Into<i64>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }
}

impl Criteria for IdInCriteria {
    fn apply(&self, query: Query) -> Query {
        query.push(Filter::IdIn(self.ids.clone()))
    }
}
