//! Declarative query structures
//!
//! A [`QuerySpec`] describes what to read (table, selected fields, predicates,
//! ordering, joins) without containing any SQL text apart from trusted join
//! predicates. Rendering happens in [`super::builder`] and [`super::join`].

use indexmap::IndexMap;

use super::join::{JoinKind, JoinSpec};

/// A literal value usable in a predicate
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    Integer(i64),
    Real(f64),
    Bool(bool),
    Null,
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Integer(value)
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Real(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Bool(value)
    }
}

/// Right-hand side of a where entry
#[derive(Debug, Clone, PartialEq)]
pub enum WhereValue {
    /// `field = value`
    Scalar(SqlValue),
    /// `field IN (v1, v2, ...)`
    List(Vec<SqlValue>),
    /// `field IS NULL`
    Null,
}

impl WhereValue {
    /// Build a list value from anything convertible to [`SqlValue`]
    pub fn list<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<SqlValue>,
    {
        WhereValue::List(values.into_iter().map(Into::into).collect())
    }
}

macro_rules! scalar_where_value {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for WhereValue {
                fn from(value: $ty) -> Self {
                    WhereValue::Scalar(value.into())
                }
            }
        )*
    };
}

scalar_where_value!(SqlValue, &str, String, i64, f64, bool);

impl From<Vec<SqlValue>> for WhereValue {
    fn from(values: Vec<SqlValue>) -> Self {
        WhereValue::List(values)
    }
}

/// Fields to select
#[derive(Debug, Clone, PartialEq)]
pub enum SelectSpec {
    /// Bare field names; empty means every column
    Fields(Vec<String>),
    /// Source field to alias, in insertion order
    Aliased(IndexMap<String, String>),
}

impl SelectSpec {
    /// Select every column
    pub fn all() -> Self {
        SelectSpec::Fields(Vec::new())
    }

    /// Select bare fields
    pub fn fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SelectSpec::Fields(fields.into_iter().map(Into::into).collect())
    }

    /// Select fields under aliases, keeping the given order
    pub fn aliased<I, S, A>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, A)>,
        S: Into<String>,
        A: Into<String>,
    {
        SelectSpec::Aliased(
            pairs
                .into_iter()
                .map(|(source, alias)| (source.into(), alias.into()))
                .collect(),
        )
    }
}

impl Default for SelectSpec {
    fn default() -> Self {
        Self::all()
    }
}

/// Ordered mapping of field to predicate value
///
/// Inserting a field that is already present replaces its value in place, so
/// the rendered clause keeps the position of the first insertion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WhereSpec {
    entries: IndexMap<String, WhereValue>,
}

impl WhereSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a predicate
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<WhereValue>) {
        self.entries.insert(field.into(), value.into());
    }

    /// Builder form of [`WhereSpec::insert`]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<WhereValue>) -> Self {
        self.insert(field, value);
        self
    }

    /// Add an `IS NULL` predicate
    pub fn with_null(mut self, field: impl Into<String>) -> Self {
        self.entries.insert(field.into(), WhereValue::Null);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &WhereValue)> {
        self.entries.iter()
    }
}

/// Sort direction; anything not explicitly descending sorts ascending
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// Ordered sequence of sort keys
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderSpec {
    keys: Vec<(String, Direction)>,
}

impl OrderSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn asc(mut self, field: impl Into<String>) -> Self {
        self.keys.push((field.into(), Direction::Asc));
        self
    }

    pub fn desc(mut self, field: impl Into<String>) -> Self {
        self.keys.push((field.into(), Direction::Desc));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, Direction)> {
        self.keys.iter()
    }
}

/// Complete description of one read
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    pub table: String,
    pub select: SelectSpec,
    pub filter: WhereSpec,
    pub order_by: OrderSpec,
    pub joins: Vec<JoinSpec>,
}

impl QuerySpec {
    /// Start a query over `table` selecting every column
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            select: SelectSpec::all(),
            filter: WhereSpec::new(),
            order_by: OrderSpec::new(),
            joins: Vec::new(),
        }
    }

    pub fn select(mut self, select: SelectSpec) -> Self {
        self.select = select;
        self
    }

    pub fn filter(mut self, filter: WhereSpec) -> Self {
        self.filter = filter;
        self
    }

    pub fn order_by(mut self, order_by: OrderSpec) -> Self {
        self.order_by = order_by;
        self
    }

    /// Append a join; joins render in the order they are added
    pub fn join(mut self, kind: JoinKind, table: impl Into<String>, predicate: impl Into<String>) -> Self {
        self.joins.push(JoinSpec::new(kind, table, predicate));
        self
    }
}
