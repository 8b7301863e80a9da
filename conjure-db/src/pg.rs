//! Per-invocation tokio-postgres session.
//!
//! Every invocation opens its own connection from a project-scoped
//! connection string and tears it down when the adapter finishes. Pooling
//! is deliberately absent here: the adapter's contract is one short-lived
//! connection per call.

use crate::binding::{bind_value, BoundParam};
use crate::row::decode_row;
use crate::session::{SessionFactory, WriteSession};
use crate::sql::upsert_statement;
use async_trait::async_trait;
use conjure_core::{ConnectorError, ConnectorResult, RowData, RowPayload};
use postgres_types::ToSql;
use tokio::task::JoinHandle;
use tokio_postgres::{Client, NoTls};

/// Opens [`PgSession`]s with `tokio_postgres::connect`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PgSessionFactory;

#[async_trait]
impl SessionFactory for PgSessionFactory {
    async fn open(&self, conn_str: &str) -> ConnectorResult<Box<dyn WriteSession>> {
        let (client, connection) = tokio_postgres::connect(conn_str, NoTls)
            .await
            .map_err(ConnectorError::connect)?;

        // The connection future multiplexes the wire protocol; it resolves
        // once the client is dropped in `close`.
        let driver = tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!(error = %e, "postgres connection terminated with error");
            }
        });

        Ok(Box::new(PgSession {
            client: Some(client),
            driver: Some(driver),
        }))
    }
}

/// One live connection, exclusively owned by a single invocation.
pub struct PgSession {
    client: Option<Client>,
    driver: Option<JoinHandle<()>>,
}

#[async_trait]
impl WriteSession for PgSession {
    async fn upsert(
        &mut self,
        table: &str,
        on_conflict: &str,
        payload: &RowPayload,
    ) -> ConnectorResult<Vec<RowData>> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| ConnectorError::query("session already closed"))?;

        if payload.is_empty() {
            return Err(ConnectorError::EmptyPayload {
                table: table.to_string(),
            });
        }

        let columns: Vec<&str> = payload.keys().map(String::as_str).collect();
        let statement_text = upsert_statement(table, on_conflict, &columns);

        // Preparing first lets the server report every placeholder's type,
        // which drives value encoding in `binding`.
        let statement = client
            .prepare(&statement_text)
            .await
            .map_err(ConnectorError::query)?;

        let mut bound: Vec<BoundParam> = Vec::with_capacity(payload.len());
        for ((column, value), ty) in payload.iter().zip(statement.params()) {
            bound.push(bind_value(column, value, ty)?);
        }
        let params: Vec<&(dyn ToSql + Sync)> = bound
            .iter()
            .map(|param| param.as_ref() as &(dyn ToSql + Sync))
            .collect();

        let rows = client
            .query(&statement, &params)
            .await
            .map_err(ConnectorError::query)?;

        rows.iter().map(decode_row).collect()
    }

    async fn close(&mut self) {
        // Dropping the client ends the connection future; awaiting the
        // driver makes teardown observable and exactly-once.
        drop(self.client.take());
        if let Some(driver) = self.driver.take() {
            if let Err(e) = driver.await {
                tracing::warn!(error = %e, "postgres driver task did not join cleanly");
            }
        }
    }
}
