//! SQL clause rendering
//!
//! Every identifier and literal that reaches SQLite passes through
//! [`escape_identifier`] or [`escape_value`] in this file. Rendering is
//! deterministic: clauses follow the insertion order of their specs.

use super::spec::{OrderSpec, SelectSpec, SqlValue, WhereSpec, WhereValue};

/// Quote an identifier for SQLite.
///
/// Dotted names are qualified names: each segment is quoted on its own, so
/// `stop_times.stop_id` becomes `"stop_times"."stop_id"`. Embedded double
/// quotes are doubled.
pub fn escape_identifier(identifier: &str) -> String {
    identifier
        .split('.')
        .map(|segment| format!("\"{}\"", segment.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(".")
}

/// Render a literal for SQLite
pub fn escape_value(value: &SqlValue) -> String {
    match value {
        SqlValue::Text(s) => format!("'{}'", s.replace('\'', "''")),
        SqlValue::Integer(i) => i.to_string(),
        SqlValue::Real(f) if f.is_finite() => {
            // Keep a decimal point so SQLite treats the literal as REAL
            let rendered = f.to_string();
            if rendered.contains(['.', 'e', 'E']) {
                rendered
            } else {
                format!("{}.0", rendered)
            }
        }
        SqlValue::Real(_) => "NULL".to_string(),
        SqlValue::Bool(b) => String::from(if *b { "1" } else { "0" }),
        SqlValue::Null => "NULL".to_string(),
    }
}

/// `SELECT ...` clause
pub fn build_select(select: &SelectSpec) -> String {
    let items = match select {
        SelectSpec::Fields(fields) if fields.is_empty() => "*".to_string(),
        SelectSpec::Fields(fields) => fields
            .iter()
            .map(|field| escape_identifier(field))
            .collect::<Vec<_>>()
            .join(", "),
        SelectSpec::Aliased(aliases) if aliases.is_empty() => "*".to_string(),
        SelectSpec::Aliased(aliases) => aliases
            .iter()
            .map(|(source, alias)| {
                format!("{} AS {}", escape_identifier(source), escape_identifier(alias))
            })
            .collect::<Vec<_>>()
            .join(", "),
    };

    format!("SELECT {}", items)
}

fn renders_null(value: &SqlValue) -> bool {
    match value {
        SqlValue::Null => true,
        SqlValue::Real(f) => !f.is_finite(),
        _ => false,
    }
}

/// A single predicate of the where clause
fn build_predicate(field: &str, value: &WhereValue) -> String {
    let field = escape_identifier(field);
    match value {
        WhereValue::List(values) => format!(
            "{} IN ({})",
            field,
            values.iter().map(escape_value).collect::<Vec<_>>().join(", ")
        ),
        WhereValue::Null => format!("{} IS NULL", field),
        // Non-finite reals render as the NULL literal
        WhereValue::Scalar(value) if renders_null(value) => format!("{} IS NULL", field),
        WhereValue::Scalar(value) => format!("{} = {}", field, escape_value(value)),
    }
}

/// `WHERE ...` clause, or an empty string when there is nothing to filter
pub fn build_where(filter: &WhereSpec) -> String {
    if filter.is_empty() {
        return String::new();
    }

    let predicates: Vec<_> = filter
        .iter()
        .map(|(field, value)| build_predicate(field, value))
        .collect();

    format!("WHERE {}", predicates.join(" AND "))
}

/// `ORDER BY ...` clause, or an empty string when unordered
pub fn build_order_by(order: &OrderSpec) -> String {
    if order.is_empty() {
        return String::new();
    }

    let keys: Vec<_> = order
        .iter()
        .map(|(field, direction)| format!("{} {}", escape_identifier(field), direction.as_sql()))
        .collect();

    format!("ORDER BY {}", keys.join(", "))
}
