//! Declarative table definitions
//!
//! The whole schema lives here as embedded `CREATE TABLE` statements. Every
//! standing invariant is a named database-level constraint so it holds on
//! every write path, not only the ones this crate issues:
//!
//! - `booking_dates_valid`: end_date strictly after start_date
//! - `review_rating_1_5`: rating in the closed range [1, 5]
//! - `review_one_per_reviewer`: at most one review per (listing, reviewer)
//! - every foreign key is ON DELETE CASCADE (listing owns its bookings and
//!   reviews; a user owns their listings, bookings, and reviews)

use crate::error::{AppError, Result};
use std::collections::HashMap;
use tracing::info;

/// A table definition with its FK dependencies
#[derive(Debug, Clone)]
pub struct TableDefinition {
    pub name: &'static str,
    pub sql: &'static str,
    pub depends_on: &'static [&'static str],
}

const USERS_SQL: &str = r#"
CREATE TABLE users (
    id BIGSERIAL PRIMARY KEY,
    username VARCHAR(150) NOT NULL UNIQUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

const LISTINGS_SQL: &str = r#"
CREATE TABLE listings (
    id BIGSERIAL PRIMARY KEY,
    title VARCHAR(200) NOT NULL,
    description TEXT,
    price_per_night NUMERIC(10, 2) NOT NULL,
    max_guests INTEGER NOT NULL DEFAULT 1,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    host_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    CONSTRAINT listing_max_guests_positive CHECK (max_guests >= 1)
)
"#;

const BOOKINGS_SQL: &str = r#"
CREATE TABLE bookings (
    id BIGSERIAL PRIMARY KEY,
    listing_id BIGINT NOT NULL REFERENCES listings(id) ON DELETE CASCADE,
    guest_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    start_date DATE NOT NULL,
    end_date DATE NOT NULL,
    guests INTEGER NOT NULL DEFAULT 1,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT booking_dates_valid CHECK (end_date > start_date),
    CONSTRAINT booking_guests_positive CHECK (guests >= 1)
)
"#;

const REVIEWS_SQL: &str = r#"
CREATE TABLE reviews (
    id BIGSERIAL PRIMARY KEY,
    listing_id BIGINT NOT NULL REFERENCES listings(id) ON DELETE CASCADE,
    reviewer_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    rating SMALLINT NOT NULL,
    comment TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT review_rating_1_5 CHECK (rating BETWEEN 1 AND 5),
    CONSTRAINT review_one_per_reviewer UNIQUE (listing_id, reviewer_id)
)
"#;

/// All table definitions, in no particular order. Use
/// [`order_by_dependencies`] before executing.
pub fn table_definitions() -> Vec<TableDefinition> {
    vec![
        TableDefinition {
            name: "reviews",
            sql: REVIEWS_SQL,
            depends_on: &["listings", "users"],
        },
        TableDefinition {
            name: "bookings",
            sql: BOOKINGS_SQL,
            depends_on: &["listings", "users"],
        },
        TableDefinition {
            name: "listings",
            sql: LISTINGS_SQL,
            depends_on: &["users"],
        },
        TableDefinition {
            name: "users",
            sql: USERS_SQL,
            depends_on: &[],
        },
    ]
}

/// Order tables by FK dependencies (topological sort, Kahn's algorithm)
pub fn order_by_dependencies(tables: Vec<TableDefinition>) -> Result<Vec<TableDefinition>> {
    if tables.is_empty() {
        return Ok(tables);
    }

    let name_to_idx: HashMap<&str, usize> = tables
        .iter()
        .enumerate()
        .map(|(i, t)| (t.name, i))
        .collect();

    let mut in_degree: Vec<usize> = vec![0; tables.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); tables.len()];

    for (idx, table) in tables.iter().enumerate() {
        for dep_name in table.depends_on {
            if let Some(&dep_idx) = name_to_idx.get(dep_name) {
                if dep_idx != idx {
                    dependents[dep_idx].push(idx);
                    in_degree[idx] += 1;
                }
            }
            // Dependencies outside this set are external (ignore)
        }
    }

    let mut queue: Vec<usize> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, &deg)| deg == 0)
        .map(|(i, _)| i)
        .collect();

    // Sort queue by table name for deterministic ordering
    queue.sort_by(|a, b| tables[*a].name.cmp(tables[*b].name));

    let mut ordered_indices = Vec::new();

    while let Some(idx) = queue.pop() {
        ordered_indices.push(idx);

        for &dependent_idx in &dependents[idx] {
            in_degree[dependent_idx] -= 1;
            if in_degree[dependent_idx] == 0 {
                queue.push(dependent_idx);
                queue.sort_by(|a, b| tables[*a].name.cmp(tables[*b].name));
            }
        }
    }

    if ordered_indices.len() != tables.len() {
        let remaining: Vec<&str> = tables
            .iter()
            .enumerate()
            .filter(|(i, _)| !ordered_indices.contains(i))
            .map(|(_, t)| t.name)
            .collect();

        return Err(AppError::Internal(format!(
            "Circular dependency detected in table definitions: {}",
            remaining.join(", ")
        )));
    }

    let ordered: Vec<TableDefinition> = ordered_indices
        .into_iter()
        .map(|i| tables[i].clone())
        .collect();

    info!(
        "Table creation order: {}",
        ordered
            .iter()
            .map(|t| t.name)
            .collect::<Vec<_>>()
            .join(", ")
    );

    Ok(ordered)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(ordered: &[TableDefinition], name: &str) -> usize {
        ordered.iter().position(|t| t.name == name).unwrap()
    }

    #[test]
    fn test_order_by_dependencies() {
        let ordered = order_by_dependencies(table_definitions()).unwrap();
        assert_eq!(ordered.len(), 4);

        let users = position(&ordered, "users");
        let listings = position(&ordered, "listings");
        let bookings = position(&ordered, "bookings");
        let reviews = position(&ordered, "reviews");

        assert!(users < listings);
        assert!(listings < bookings);
        assert!(listings < reviews);
    }

    #[test]
    fn test_circular_dependency_detection() {
        let tables = vec![
            TableDefinition {
                name: "a",
                sql: "CREATE TABLE a ...",
                depends_on: &["b"],
            },
            TableDefinition {
                name: "b",
                sql: "CREATE TABLE b ...",
                depends_on: &["a"],
            },
        ];

        let result = order_by_dependencies(tables);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Circular dependency"));
    }

    #[test]
    fn test_booking_date_constraint_is_standing() {
        assert!(BOOKINGS_SQL.contains("CONSTRAINT booking_dates_valid CHECK (end_date > start_date)"));
    }

    #[test]
    fn test_review_rating_and_uniqueness_constraints() {
        assert!(REVIEWS_SQL.contains("CONSTRAINT review_rating_1_5 CHECK (rating BETWEEN 1 AND 5)"));
        assert!(REVIEWS_SQL.contains("CONSTRAINT review_one_per_reviewer UNIQUE (listing_id, reviewer_id)"));
    }

    #[test]
    fn test_every_foreign_key_cascades() {
        for def in table_definitions() {
            let references = def.sql.matches("REFERENCES").count();
            let cascades = def.sql.matches("ON DELETE CASCADE").count();
            assert_eq!(
                references, cascades,
                "table {} has a non-cascading foreign key",
                def.name
            );
        }
    }

    #[test]
    fn test_defaults_match_model() {
        // max_guests and guests both default to 1
        assert!(LISTINGS_SQL.contains("max_guests INTEGER NOT NULL DEFAULT 1"));
        assert!(BOOKINGS_SQL.contains("guests INTEGER NOT NULL DEFAULT 1"));
    }
}
