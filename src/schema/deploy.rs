//! Idempotent schema deployment
//!
//! Runs at startup. Tables are created in FK dependency order and tracked in
//! `_travelstay_schema` with a checksum of their normalized SQL, so an
//! unchanged definition is skipped on the next boot and a drifted one is
//! flagged in the log instead of being silently recreated.

use crate::error::{AppError, Result};
use crate::schema::tables::{order_by_dependencies, table_definitions, TableDefinition};
use deadpool_postgres::Pool;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Result of a deployment pass
#[derive(Debug, Clone)]
pub struct DeployResult {
    pub tables_created: usize,
    pub tables_skipped: usize,
}

pub struct SchemaDeployer;

impl SchemaDeployer {
    pub fn new() -> Self {
        Self
    }

    /// Ensure the tracking table exists
    async fn ensure_tracking_table(&self, client: &deadpool_postgres::Object) -> Result<()> {
        client
            .execute(
                r#"
                CREATE TABLE IF NOT EXISTS _travelstay_schema (
                    id SERIAL PRIMARY KEY,
                    table_name TEXT NOT NULL UNIQUE,
                    checksum TEXT NOT NULL,
                    deployed_at TIMESTAMPTZ DEFAULT NOW()
                )
                "#,
                &[],
            )
            .await
            .map_err(|e| AppError::Internal(format!("Tracking table creation failed: {}", e)))?;

        Ok(())
    }

    async fn table_exists(
        &self,
        client: &deadpool_postgres::Object,
        table_name: &str,
    ) -> Result<bool> {
        let row = client
            .query_opt(
                r#"
                SELECT 1 FROM information_schema.tables
                WHERE table_schema = 'public'
                AND table_name = $1
                "#,
                &[&table_name],
            )
            .await
            .unwrap_or(None);

        Ok(row.is_some())
    }

    async fn get_deployed_tables(
        &self,
        client: &deadpool_postgres::Object,
    ) -> Result<HashMap<String, String>> {
        let rows = client
            .query("SELECT table_name, checksum FROM _travelstay_schema", &[])
            .await
            .unwrap_or_default();

        let mut tables = HashMap::new();
        for row in rows {
            let name: String = row.get(0);
            let checksum: String = row.get(1);
            tables.insert(name, checksum);
        }

        Ok(tables)
    }

    async fn update_tracking(
        &self,
        client: &deadpool_postgres::Object,
        table: &TableDefinition,
        checksum: &str,
    ) -> Result<()> {
        client
            .execute(
                r#"
                INSERT INTO _travelstay_schema (table_name, checksum, deployed_at)
                VALUES ($1, $2, NOW())
                ON CONFLICT (table_name) DO UPDATE SET
                    checksum = EXCLUDED.checksum,
                    deployed_at = NOW()
                "#,
                &[&table.name, &checksum],
            )
            .await
            .ok();

        Ok(())
    }

    /// Deploy all tables, skipping ones already present with an unchanged
    /// checksum
    pub async fn deploy(&self, pool: &Pool) -> Result<DeployResult> {
        let ordered = order_by_dependencies(table_definitions())?;

        let client = pool.get().await.map_err(|e| AppError::ConnectionFailed {
            cause: e.to_string(),
        })?;

        self.ensure_tracking_table(&client).await?;
        let deployed = self.get_deployed_tables(&client).await?;

        let mut created = 0;
        let mut skipped = 0;

        for table in &ordered {
            let checksum = compute_checksum(table.sql);

            if self.table_exists(&client, table.name).await? {
                match deployed.get(table.name) {
                    Some(existing) if existing == &checksum => {
                        debug!("Table {} unchanged (checksum match), skipping", table.name);
                    }
                    Some(_) => {
                        warn!(
                            "Table {} exists with a different definition; leaving it untouched",
                            table.name
                        );
                        self.update_tracking(&client, table, &checksum).await?;
                    }
                    None => {
                        debug!("Table {} exists but is untracked, adding to tracking", table.name);
                        self.update_tracking(&client, table, &checksum).await?;
                    }
                }
                skipped += 1;
                continue;
            }

            match client.batch_execute(table.sql).await {
                Ok(_) => {
                    info!("Created table {}", table.name);
                    self.update_tracking(&client, table, &checksum).await?;
                    created += 1;
                }
                Err(e) => {
                    return Err(AppError::Internal(format!(
                        "Failed to create table {}: {}",
                        table.name, e
                    )));
                }
            }
        }

        info!(
            "Schema deployment complete: {} created, {} skipped",
            created, skipped
        );

        Ok(DeployResult {
            tables_created: created,
            tables_skipped: skipped,
        })
    }
}

impl Default for SchemaDeployer {
    fn default() -> Self {
        Self::new()
    }
}

fn compute_checksum(content: &str) -> String {
    // Normalize: remove comments, collapse whitespace, lowercase
    let single_line_re = regex::Regex::new(r"--[^\n]*").unwrap();
    let content = single_line_re.replace_all(content, "");

    let multi_line_re = regex::Regex::new(r"/\*[\s\S]*?\*/").unwrap();
    let content = multi_line_re.replace_all(&content, "");

    let whitespace_re = regex::Regex::new(r"\s+").unwrap();
    let normalized = whitespace_re
        .replace_all(&content, " ")
        .trim()
        .to_lowercase();

    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_normalization() {
        let sql1 = "CREATE TABLE users (id INT);";
        let sql2 = "CREATE   TABLE   users   (id   INT);";
        let sql3 = "create table users (id int);";
        let sql4 = "-- identity table\nCREATE TABLE users (id INT);";

        assert_eq!(compute_checksum(sql1), compute_checksum(sql2));
        assert_eq!(compute_checksum(sql1), compute_checksum(sql3));
        assert_eq!(compute_checksum(sql1), compute_checksum(sql4));
    }

    #[test]
    fn test_checksum_detects_changes() {
        let sql1 = "CREATE TABLE users (id INT);";
        let sql2 = "CREATE TABLE users (id BIGINT);";

        assert_ne!(compute_checksum(sql1), compute_checksum(sql2));
    }
}
