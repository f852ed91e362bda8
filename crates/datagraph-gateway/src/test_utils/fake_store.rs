use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
};
use std::time::Duration;

use crate::data::{errors::StoreError, trace_context::TraceContext, types::GraphRecord};
use crate::traits::graph_store::{GraphSession, GraphStore, ReadQuery};

#[derive(Debug, Default)]
struct SessionCounters {
    opened: AtomicUsize,
    closed: AtomicUsize,
}

/// A fake implementation of GraphStore for testing
///
/// Rows are scripted per query pattern; an unscripted pattern returns no rows.
/// Sessions are counted so tests can check every opened session was released
/// exactly once. A session counts as released when it is dropped, so a request
/// cancelled mid-query is counted too.
#[derive(Debug, Default)]
pub struct FakeGraphStore {
    rows: Mutex<HashMap<&'static str, Vec<GraphRecord>>>,
    failures: Mutex<HashMap<&'static str, StoreError>>,
    delays: Mutex<HashMap<&'static str, Duration>>,
    counters: Arc<SessionCounters>,
    closed: AtomicBool,
}

impl FakeGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows returned for queries using `pattern`
    pub fn with_rows(self, pattern: &'static str, rows: Vec<GraphRecord>) -> Self {
        self.rows.lock().insert(pattern, rows);
        self
    }

    /// Makes queries using `pattern` fail with a `QueryError`
    pub fn failing(self, pattern: &'static str, message: impl Into<String>) -> Self {
        self.failing_with(pattern, StoreError::QueryError(message.into()))
    }

    /// Makes queries using `pattern` fail with `error`
    pub fn failing_with(self, pattern: &'static str, error: StoreError) -> Self {
        self.failures.lock().insert(pattern, error);
        self
    }

    /// Queries using `pattern` wait for `delay` before answering
    pub fn with_delay(self, pattern: &'static str, delay: Duration) -> Self {
        self.delays.lock().insert(pattern, delay);
        self
    }

    pub fn sessions_opened(&self) -> usize {
        self.counters.opened.load(Ordering::SeqCst)
    }

    pub fn sessions_closed(&self) -> usize {
        self.counters.closed.load(Ordering::SeqCst)
    }

    pub fn is_shut_down(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GraphStore for FakeGraphStore {
    async fn open_session(&self) -> Result<Box<dyn GraphSession>, StoreError> {
        if self.is_shut_down() {
            return Err(StoreError::Closed);
        }
        self.counters.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeSession {
            rows: self.rows.lock().clone(),
            failures: self.failures.lock().clone(),
            delays: self.delays.lock().clone(),
            counters: Arc::clone(&self.counters),
        }))
    }

    async fn shutdown(&self) -> Result<(), StoreError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

struct FakeSession {
    rows: HashMap<&'static str, Vec<GraphRecord>>,
    failures: HashMap<&'static str, StoreError>,
    delays: HashMap<&'static str, Duration>,
    counters: Arc<SessionCounters>,
}

impl Drop for FakeSession {
    fn drop(&mut self) {
        self.counters.closed.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl GraphSession for FakeSession {
    async fn run(
        &mut self,
        _trace_ctx: &TraceContext,
        query: &ReadQuery,
    ) -> Result<Vec<GraphRecord>, StoreError> {
        if let Some(delay) = self.delays.get(query.pattern) {
            tokio::time::sleep(*delay).await;
        }
        if let Some(error) = self.failures.get(query.pattern) {
            return Err(error.clone());
        }
        Ok(self.rows.get(query.pattern).cloned().unwrap_or_default())
    }

    async fn close(self: Box<Self>) -> Result<(), StoreError> {
        drop(self);
        Ok(())
    }
}
