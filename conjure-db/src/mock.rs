//! In-memory session factory and sinks for exercising the adapter.
//!
//! The mock seams let tests script query results, inject faults at the
//! open and query stages, count session teardowns, and capture every
//! telemetry record, all without a live database.

use crate::session::{SessionFactory, WriteSession};
use crate::sink::RequestSink;
use async_trait::async_trait;
use conjure_core::{ConnectorError, ConnectorResult, RequestRecord, RowData, RowPayload};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// One captured upsert call.
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertCall {
    pub table: String,
    pub on_conflict: String,
    pub payload: RowPayload,
}

#[derive(Debug, Clone)]
enum Script {
    Rows(Vec<RowData>),
    QueryError(String),
    OpenError(String),
}

/// Scripted [`SessionFactory`] with fault injection and call capture.
pub struct MockSessionFactory {
    script: Script,
    opens: AtomicUsize,
    closes: Arc<AtomicUsize>,
    calls: Arc<Mutex<Vec<UpsertCall>>>,
}

impl MockSessionFactory {
    /// Sessions whose upsert returns the given rows.
    pub fn returning(rows: Vec<RowData>) -> Arc<Self> {
        Self::with_script(Script::Rows(rows))
    }

    /// Sessions whose upsert fails with a query error.
    pub fn failing_query(message: impl Into<String>) -> Arc<Self> {
        Self::with_script(Script::QueryError(message.into()))
    }

    /// A factory whose open fails outright.
    pub fn failing_open(message: impl Into<String>) -> Arc<Self> {
        Self::with_script(Script::OpenError(message.into()))
    }

    fn with_script(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script,
            opens: AtomicUsize::new(0),
            closes: Arc::new(AtomicUsize::new(0)),
            calls: Arc::new(Mutex::new(Vec::new())),
        })
    }

    /// Sessions opened so far.
    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    /// Sessions closed so far.
    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    /// Every upsert call captured across all sessions.
    pub fn calls(&self) -> Vec<UpsertCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SessionFactory for MockSessionFactory {
    async fn open(&self, _conn_str: &str) -> ConnectorResult<Box<dyn WriteSession>> {
        if let Script::OpenError(message) = &self.script {
            return Err(ConnectorError::connect(message));
        }
        self.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockSession {
            script: self.script.clone(),
            closes: Arc::clone(&self.closes),
            calls: Arc::clone(&self.calls),
        }))
    }
}

/// Session handed out by [`MockSessionFactory`].
pub struct MockSession {
    script: Script,
    closes: Arc<AtomicUsize>,
    calls: Arc<Mutex<Vec<UpsertCall>>>,
}

#[async_trait]
impl WriteSession for MockSession {
    async fn upsert(
        &mut self,
        table: &str,
        on_conflict: &str,
        payload: &RowPayload,
    ) -> ConnectorResult<Vec<RowData>> {
        self.calls.lock().unwrap().push(UpsertCall {
            table: table.to_string(),
            on_conflict: on_conflict.to_string(),
            payload: payload.clone(),
        });
        match &self.script {
            Script::Rows(rows) => Ok(rows.clone()),
            Script::QueryError(message) => Err(ConnectorError::query(message)),
            Script::OpenError(message) => Err(ConnectorError::connect(message)),
        }
    }

    async fn close(&mut self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Sink that captures every record for assertions.
#[derive(Default)]
pub struct RecordingSink {
    records: Mutex<Vec<RequestRecord>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn records(&self) -> Vec<RequestRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl RequestSink for RecordingSink {
    async fn save(&self, record: RequestRecord) -> ConnectorResult<()> {
        self.records.lock().unwrap().push(record);
        Ok(())
    }
}

/// Sink that rejects every record.
pub struct FailingSink {
    message: String,
}

impl FailingSink {
    pub fn new(message: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            message: message.into(),
        })
    }
}

#[async_trait]
impl RequestSink for FailingSink {
    async fn save(&self, _record: RequestRecord) -> ConnectorResult<()> {
        Err(ConnectorError::sink(&self.message))
    }
}
