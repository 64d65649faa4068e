//! PostgreSQL tabular store
//!
//! Each call opens its own connection, runs one query and closes it. There is
//! no pool: connections are never shared between retrieval steps.
//!
//! Expected schema:
//!
//! ```text
//! production_data(timestamp, rig_name, well_name, basin,
//!                 production_rate, pressure, temperature)
//! maintenance_schedule(equipment_id, equipment_type,
//!                      last_maintenance_date, next_maintenance_due)
//! ```

use super::{BackendError, BackendResult, TabularStore};
use crate::types::RetrievalRecord;
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Connection, PgConnection, Row};
use tracing::debug;

pub struct PostgresTabularStore {
    url: String,
}

impl PostgresTabularStore {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    async fn connect(&self) -> BackendResult<PgConnection> {
        let conn = PgConnection::connect(&self.url)
            .await
            .map_err(|e| BackendError::Connection(e.to_string()))?;
        debug!("PostgreSQL connection established");
        Ok(conn)
    }
}

/// Trailing-average frame. The window is inlined because frame offsets cannot
/// be bound as parameters in every server version.
fn production_trends_sql(window: u32) -> String {
    format!(
        r#"SELECT to_char(timestamp, 'YYYY-MM-DD HH24:MI:SS') AS timestamp,
                  production_rate::float8 AS production_rate,
                  (AVG(production_rate) OVER (
                      ORDER BY timestamp
                      ROWS BETWEEN {window} PRECEDING AND CURRENT ROW
                  ))::float8 AS moving_avg,
                  pressure::float8 AS pressure,
                  temperature::float8 AS temperature
           FROM production_data
           WHERE rig_name = $1
           ORDER BY timestamp DESC
           LIMIT $2"#
    )
}

const WELLS_BELOW_AVERAGE_SQL: &str = r#"
    WITH recent AS (
        SELECT well_name,
               production_rate,
               AVG(production_rate) OVER (PARTITION BY well_name) AS avg_rate,
               ROW_NUMBER() OVER (PARTITION BY well_name ORDER BY timestamp DESC) AS rn
        FROM production_data
        WHERE basin = $1
          AND timestamp >= NOW() - make_interval(days => $2)
    )
    SELECT well_name,
           production_rate::float8 AS current_rate,
           avg_rate::float8 AS avg_rate,
           ((production_rate - avg_rate) / NULLIF(avg_rate, 0) * 100)::float8 AS deviation_pct
    FROM recent
    WHERE rn = 1 AND production_rate < avg_rate
    ORDER BY deviation_pct ASC"#;

const MAINTENANCE_OVERDUE_SQL: &str = r#"
    SELECT equipment_id,
           equipment_type,
           to_char(last_maintenance_date, 'YYYY-MM-DD') AS last_maintenance_date,
           to_char(next_maintenance_due, 'YYYY-MM-DD') AS next_maintenance_due,
           EXTRACT(DAY FROM (NOW() - next_maintenance_due))::int8 AS days_overdue
    FROM maintenance_schedule
    WHERE next_maintenance_due < NOW()
    ORDER BY days_overdue DESC"#;

#[async_trait]
impl TabularStore for PostgresTabularStore {
    async fn production_trends(
        &self,
        rig: &str,
        limit: u32,
        window: u32,
    ) -> BackendResult<Vec<RetrievalRecord>> {
        let mut conn = self.connect().await?;
        let rows = sqlx::query(&production_trends_sql(window))
            .bind(rig)
            .bind(i64::from(limit))
            .fetch_all(&mut conn)
            .await;
        conn.close().await.ok();

        rows?
            .iter()
            .map(|row| -> BackendResult<RetrievalRecord> {
                Ok(RetrievalRecord::new()
                    .with("timestamp", row.try_get::<Option<String>, _>("timestamp")?)
                    .with("production_rate", opt_f64(row, "production_rate")?)
                    .with("moving_avg", opt_f64(row, "moving_avg")?)
                    .with("pressure", opt_f64(row, "pressure")?)
                    .with("temperature", opt_f64(row, "temperature")?))
            })
            .collect()
    }

    async fn wells_below_average(
        &self,
        basin: &str,
        days: u32,
    ) -> BackendResult<Vec<RetrievalRecord>> {
        let mut conn = self.connect().await?;
        let rows = sqlx::query(WELLS_BELOW_AVERAGE_SQL)
            .bind(basin)
            .bind(i32::try_from(days).unwrap_or(i32::MAX))
            .fetch_all(&mut conn)
            .await;
        conn.close().await.ok();

        rows?
            .iter()
            .map(|row| -> BackendResult<RetrievalRecord> {
                Ok(RetrievalRecord::new()
                    .with("well_name", row.try_get::<String, _>("well_name")?)
                    .with("current_rate", opt_f64(row, "current_rate")?)
                    .with("avg_rate", opt_f64(row, "avg_rate")?)
                    .with("deviation_pct", opt_f64(row, "deviation_pct")?))
            })
            .collect()
    }

    async fn maintenance_overdue(&self) -> BackendResult<Vec<RetrievalRecord>> {
        let mut conn = self.connect().await?;
        let rows = sqlx::query(MAINTENANCE_OVERDUE_SQL)
            .fetch_all(&mut conn)
            .await;
        conn.close().await.ok();

        rows?
            .iter()
            .map(|row| -> BackendResult<RetrievalRecord> {
                Ok(RetrievalRecord::new()
                    .with("equipment_id", row.try_get::<String, _>("equipment_id")?)
                    .with("equipment_type", row.try_get::<Option<String>, _>("equipment_type")?)
                    .with(
                        "last_maintenance_date",
                        row.try_get::<Option<String>, _>("last_maintenance_date")?,
                    )
                    .with(
                        "next_maintenance_due",
                        row.try_get::<Option<String>, _>("next_maintenance_due")?,
                    )
                    .with("days_overdue", row.try_get::<Option<i64>, _>("days_overdue")?))
            })
            .collect()
    }

    async fn ping(&self) -> BackendResult<()> {
        let mut conn = self.connect().await?;
        let result = sqlx::query("SELECT 1").execute(&mut conn).await;
        conn.close().await.ok();
        result?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}

fn opt_f64(row: &PgRow, column: &str) -> Result<Option<f64>, sqlx::Error> {
    row.try_get::<Option<f64>, _>(column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trend_sql_inlines_window() {
        let sql = production_trends_sql(30);
        assert!(sql.contains("ROWS BETWEEN 30 PRECEDING AND CURRENT ROW"));
        assert!(sql.contains("ORDER BY timestamp DESC"));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_connection_error() {
        // Port 9 (discard) is not a PostgreSQL server
        let store = PostgresTabularStore::new("postgres://u:p@127.0.0.1:9/none");
        let err = store.ping().await.unwrap_err();
        assert!(matches!(err, BackendError::Connection(_)), "got {err:?}");
    }
}
