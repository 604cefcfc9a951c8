//! Renders [`Query`] values to SQL text

use super::{Condition, Direction, Operand, Operator, Projection, Query, QueryType, COUNT_ALIAS};
use crate::errors::{OrmError, Result};
use crate::value::Value;
use serde::Deserialize;

/// SQL flavour spoken by the connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    MySql,
    Sqlite,
}

impl Dialect {
    pub fn begin_transaction_sql(&self) -> &'static str {
        match self {
            Dialect::MySql => "START TRANSACTION",
            Dialect::Sqlite => "BEGIN TRANSACTION",
        }
    }

    pub fn commit_sql(&self) -> &'static str {
        "COMMIT"
    }

    pub fn rollback_sql(&self) -> &'static str {
        "ROLLBACK"
    }

    /// Row count standing in for "no limit" when only an offset is given
    fn unbounded_limit(&self) -> &'static str {
        match self {
            Dialect::MySql => "18446744073709551615",
            Dialect::Sqlite => "-1",
        }
    }
}

/// Dialect-aware SQL renderer
///
/// # Example
///
/// ```
/// use rowkeeper_core::query::{Builder, Dialect, Operator, OrderBy, Query};
///
/// let mut query = Query::select("users");
/// query
///     .filter("name", Operator::Eq, "O'Brien")
///     .order_by(OrderBy::desc("id"))
///     .limit(10, 0);
///
/// let sql = Builder::new(Dialect::Sqlite).build(&query).unwrap();
/// assert_eq!(
///     sql,
///     "SELECT * FROM `users` WHERE `name` = 'O''Brien' ORDER BY `id` DESC LIMIT 10"
/// );
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Builder {
    dialect: Dialect,
}

impl Builder {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Render a query
    ///
    /// # Errors
    ///
    /// `InvalidQuery` for INSERT/UPDATE without value sets, UPDATE with more
    /// than one value set, empty IN lists, or non-finite floats.
    pub fn build(&self, query: &Query) -> Result<String> {
        match query.query_type() {
            QueryType::Select => self.build_select(query),
            QueryType::Insert => self.build_insert(query),
            QueryType::Update => self.build_update(query),
            QueryType::Delete => self.build_delete(query),
        }
    }

    pub fn quote_identifier(&self, identifier: &str) -> String {
        format!("`{}`", identifier.replace('`', "``"))
    }

    /// Render a value as an SQL literal
    ///
    /// # Errors
    ///
    /// `InvalidQuery` for NaN or infinite floats.
    pub fn quote_value(&self, value: &Value) -> Result<String> {
        match value {
            Value::Null => Ok("NULL".to_string()),
            Value::Int(i) => Ok(i.to_string()),
            Value::Float(f) if f.is_finite() => Ok(f.to_string()),
            Value::Float(f) => Err(OrmError::InvalidQuery {
                reason: format!("cannot render float {f}"),
            }),
            Value::Bool(b) => Ok(if *b { "1" } else { "0" }.to_string()),
            other => {
                let raw = other.to_raw().unwrap_or_default();
                Ok(self.quote_text(&raw))
            }
        }
    }

    fn quote_text(&self, text: &str) -> String {
        let escaped = match self.dialect {
            Dialect::MySql => text.replace('\\', "\\\\").replace('\'', "''"),
            Dialect::Sqlite => text.replace('\'', "''"),
        };
        format!("'{escaped}'")
    }

    fn build_select(&self, query: &Query) -> Result<String> {
        let projection = match query.projection() {
            Projection::All => "*".to_string(),
            Projection::Count => format!("COUNT(1) AS {}", self.quote_identifier(COUNT_ALIAS)),
            Projection::Columns(columns) => columns
                .iter()
                .map(|c| self.quote_identifier(c))
                .collect::<Vec<_>>()
                .join(", "),
        };

        let mut sql = format!(
            "SELECT {} FROM {}",
            projection,
            self.quote_identifier(query.table())
        );
        self.push_where(&mut sql, query.conditions())?;

        if !query.order().is_empty() {
            let order = query
                .order()
                .iter()
                .map(|o| {
                    let direction = match o.direction {
                        Direction::Asc => "ASC",
                        Direction::Desc => "DESC",
                    };
                    format!("{} {}", self.quote_identifier(&o.column), direction)
                })
                .collect::<Vec<_>>()
                .join(", ");
            sql.push_str(" ORDER BY ");
            sql.push_str(&order);
        }

        match (query.limit_value(), query.offset_value()) {
            (Some(limit), 0) => sql.push_str(&format!(" LIMIT {limit}")),
            (Some(limit), offset) => sql.push_str(&format!(" LIMIT {limit} OFFSET {offset}")),
            (None, 0) => {}
            (None, offset) => sql.push_str(&format!(
                " LIMIT {} OFFSET {offset}",
                self.dialect.unbounded_limit()
            )),
        }

        Ok(sql)
    }

    fn build_insert(&self, query: &Query) -> Result<String> {
        let mut columns: Vec<&str> = Vec::new();
        for value_set in query.value_sets() {
            for column in value_set.columns() {
                if !columns.contains(&column) {
                    columns.push(column);
                }
            }
        }
        if columns.is_empty() {
            return Err(OrmError::InvalidQuery {
                reason: format!("insert into '{}' has no values", query.table()),
            });
        }

        let mut rows = Vec::with_capacity(query.value_sets().len());
        for value_set in query.value_sets() {
            let values = columns
                .iter()
                .map(|column| match value_set.get(column) {
                    Some(value) => self.quote_value(value),
                    None => Ok("NULL".to_string()),
                })
                .collect::<Result<Vec<_>>>()?;
            rows.push(format!("({})", values.join(", ")));
        }

        let column_list = columns
            .iter()
            .map(|c| self.quote_identifier(c))
            .collect::<Vec<_>>()
            .join(", ");

        Ok(format!(
            "INSERT INTO {} ({}) VALUES {}",
            self.quote_identifier(query.table()),
            column_list,
            rows.join(", ")
        ))
    }

    fn build_update(&self, query: &Query) -> Result<String> {
        let value_set = match query.value_sets() {
            [single] if single.has_values() => single,
            [] | [_] => {
                return Err(OrmError::InvalidQuery {
                    reason: format!("update of '{}' has no values", query.table()),
                })
            }
            many => {
                return Err(OrmError::InvalidQuery {
                    reason: format!(
                        "update of '{}' carries {} value sets, expected one",
                        query.table(),
                        many.len()
                    ),
                })
            }
        };

        let assignments = value_set
            .iter()
            .map(|(column, value)| {
                Ok(format!(
                    "{} = {}",
                    self.quote_identifier(column),
                    self.quote_value(value)?
                ))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut sql = format!(
            "UPDATE {} SET {}",
            self.quote_identifier(query.table()),
            assignments.join(", ")
        );
        self.push_where(&mut sql, query.conditions())?;
        Ok(sql)
    }

    fn build_delete(&self, query: &Query) -> Result<String> {
        let mut sql = format!("DELETE FROM {}", self.quote_identifier(query.table()));
        self.push_where(&mut sql, query.conditions())?;
        Ok(sql)
    }

    fn push_where(&self, sql: &mut String, conditions: &[Condition]) -> Result<()> {
        if conditions.is_empty() {
            return Ok(());
        }
        let rendered = conditions
            .iter()
            .map(|c| self.render_condition(c))
            .collect::<Result<Vec<_>>>()?;
        sql.push_str(" WHERE ");
        sql.push_str(&rendered.join(" AND "));
        Ok(())
    }

    fn render_condition(&self, condition: &Condition) -> Result<String> {
        let column = self.quote_identifier(&condition.column);
        let operator = condition.operator;

        match (operator, &condition.operand) {
            (Operator::IsNull | Operator::IsNotNull, _) => {
                Ok(format!("{} {}", column, operator.as_sql()))
            }
            (Operator::Eq, Operand::Single(Value::Null)) => Ok(format!("{column} IS NULL")),
            (Operator::NotEq, Operand::Single(Value::Null)) => Ok(format!("{column} IS NOT NULL")),
            (Operator::In | Operator::NotIn, Operand::List(values)) => {
                if values.is_empty() {
                    return Err(OrmError::InvalidQuery {
                        reason: format!(
                            "empty {} list for column '{}'",
                            operator.as_sql(),
                            condition.column
                        ),
                    });
                }
                let list = values
                    .iter()
                    .map(|v| self.quote_value(v))
                    .collect::<Result<Vec<_>>>()?;
                Ok(format!("{} {} ({})", column, operator.as_sql(), list.join(", ")))
            }
            (Operator::In | Operator::NotIn, Operand::Single(value)) => Ok(format!(
                "{} {} ({})",
                column,
                operator.as_sql(),
                self.quote_value(value)?
            )),
            (_, Operand::Single(value)) => Ok(format!(
                "{} {} {}",
                column,
                operator.as_sql(),
                self.quote_value(value)?
            )),
            (_, Operand::List(_)) => Err(OrmError::InvalidQuery {
                reason: format!("operator {} does not take a list", operator.as_sql()),
            }),
            (_, Operand::None) => Err(OrmError::InvalidQuery {
                reason: format!("operator {} needs a value", operator.as_sql()),
            }),
        }
    }
}
