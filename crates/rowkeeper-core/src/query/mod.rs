//! Minimal SQL statement model
//!
//! A [`Query`] describes one statement against one table. It carries no
//! SQL text; [`Builder`] renders it for a [`Dialect`].

pub mod builder;

pub use builder::{Builder, Dialect};

use crate::value::Value;
use crate::value_set::ValueSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    Select,
    Insert,
    Update,
    Delete,
}

/// Comparison operators usable in a filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Like,
    In,
    NotIn,
    IsNull,
    IsNotNull,
}

impl Operator {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::NotEq => "!=",
            Operator::Lt => "<",
            Operator::LtEq => "<=",
            Operator::Gt => ">",
            Operator::GtEq => ">=",
            Operator::Like => "LIKE",
            Operator::In => "IN",
            Operator::NotIn => "NOT IN",
            Operator::IsNull => "IS NULL",
            Operator::IsNotNull => "IS NOT NULL",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    None,
    Single(Value),
    List(Vec<Value>),
}

/// One `column <op> operand` term; terms are joined with AND
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: String,
    pub operator: Operator,
    pub operand: Operand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub direction: Direction,
}

impl OrderBy {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: Direction::Asc,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: Direction::Desc,
        }
    }
}

/// What a SELECT returns
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Projection {
    #[default]
    All,
    Count,
    Columns(Vec<String>),
}

/// Alias of the single column a count projection yields
pub const COUNT_ALIAS: &str = "count";

#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    query_type: QueryType,
    table: String,
    projection: Projection,
    conditions: Vec<Condition>,
    order: Vec<OrderBy>,
    limit: Option<u64>,
    offset: u64,
    value_sets: Vec<ValueSet>,
}

impl Query {
    fn new(query_type: QueryType, table: impl Into<String>) -> Self {
        Self {
            query_type,
            table: table.into(),
            projection: Projection::All,
            conditions: Vec::new(),
            order: Vec::new(),
            limit: None,
            offset: 0,
            value_sets: Vec::new(),
        }
    }

    pub fn select(table: impl Into<String>) -> Self {
        Self::new(QueryType::Select, table)
    }

    pub fn insert(table: impl Into<String>) -> Self {
        Self::new(QueryType::Insert, table)
    }

    pub fn update(table: impl Into<String>) -> Self {
        Self::new(QueryType::Update, table)
    }

    pub fn delete(table: impl Into<String>) -> Self {
        Self::new(QueryType::Delete, table)
    }

    /// Compare a column with a single value
    ///
    /// `Eq`/`NotEq` against `Value::Null` render as `IS NULL`/`IS NOT NULL`.
    pub fn filter(
        &mut self,
        column: impl Into<String>,
        operator: Operator,
        value: impl Into<Value>,
    ) -> &mut Self {
        self.conditions.push(Condition {
            column: column.into(),
            operator,
            operand: Operand::Single(value.into()),
        });
        self
    }

    /// Compare a column with a list, for `In`/`NotIn`
    pub fn filter_list<I, V>(
        &mut self,
        column: impl Into<String>,
        operator: Operator,
        values: I,
    ) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.conditions.push(Condition {
            column: column.into(),
            operator,
            operand: Operand::List(values.into_iter().map(Into::into).collect()),
        });
        self
    }

    /// Operand-less test, for `IsNull`/`IsNotNull`
    pub fn filter_null(&mut self, column: impl Into<String>, operator: Operator) -> &mut Self {
        self.conditions.push(Condition {
            column: column.into(),
            operator,
            operand: Operand::None,
        });
        self
    }

    pub fn order_by(&mut self, order: OrderBy) -> &mut Self {
        self.order.push(order);
        self
    }

    /// Restrict the number of rows; a limit of zero means "no limit"
    pub fn limit(&mut self, limit: u64, offset: u64) -> &mut Self {
        self.limit = (limit > 0).then_some(limit);
        self.offset = offset;
        self
    }

    pub fn offset(&mut self, offset: u64) -> &mut Self {
        self.offset = offset;
        self
    }

    pub fn count(&mut self) -> &mut Self {
        self.projection = Projection::Count;
        self
    }

    pub fn columns<I, S>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projection = Projection::Columns(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn add_value_set(&mut self, value_set: ValueSet) -> &mut Self {
        self.value_sets.push(value_set);
        self
    }

    pub fn has_value_sets(&self) -> bool {
        !self.value_sets.is_empty()
    }

    pub fn query_type(&self) -> QueryType {
        self.query_type
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn order(&self) -> &[OrderBy] {
        &self.order
    }

    pub fn limit_value(&self) -> Option<u64> {
        self.limit
    }

    pub fn offset_value(&self) -> u64 {
        self.offset
    }

    pub fn value_sets(&self) -> &[ValueSet] {
        &self.value_sets
    }
}
