use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::{JoinError, JoinHandle};

use crate::api::models::SearchResponse;
use crate::error::ClientError;
use crate::guard::{QueryEvent, StaleResponseGuard};

/// A response payload matched to the counter the server echoed back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub result: String,
    pub req_count: u64,
}

/// The remote query endpoint.
#[async_trait::async_trait]
pub trait SearchApi: Send + Sync + 'static {
    async fn search(&self, query: &str, req_count: u64) -> Result<SearchResult, ClientError>;
}

/// The two visible output regions plus an inline error surface.
pub trait SearchView: Send + 'static {
    fn show(&mut self, query: &str, result: &str);
    fn show_error(&mut self, query: &str, message: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseOutcome {
    /// The response was the latest one and is now visible.
    Applied,
    /// A newer query was submitted before this response arrived.
    Stale,
    /// The latest request failed; the view shows an inline error.
    Failed,
    /// A superseded request failed; nothing was shown.
    FailedStale,
}

#[derive(Debug, Clone)]
pub struct HttpSearchApi {
    client: reqwest::Client,
    url: String,
}

impl HttpSearchApi {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait::async_trait]
impl SearchApi for HttpSearchApi {
    async fn search(&self, query: &str, req_count: u64) -> Result<SearchResult, ClientError> {
        let counter = req_count.to_string();
        let response = self
            .client
            .get(&self.url)
            .query(&[("query", query), ("req_count", counter.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status));
        }

        let body = response.text().await?;
        let payload: SearchResponse =
            serde_json::from_str(&body).map_err(|e| ClientError::Malformed(e.to_string()))?;
        let req_count = payload
            .req_count
            .ok_or_else(|| ClientError::Malformed("missing req_count".to_string()))?;

        Ok(SearchResult {
            result: payload.result,
            req_count,
        })
    }
}

struct ViewState<V> {
    view: V,
    displayed: u64,
}

struct Inner<A, V> {
    guard: StaleResponseGuard,
    api: A,
    view: Mutex<ViewState<V>>,
}

/// Sends one request per input event and shows only the answer to the most
/// recent one.
///
/// Superseded requests are not aborted; their responses are dropped when
/// they arrive. Every request runs on its own tokio task, so `submit` must
/// be called from within a runtime.
pub struct SearchBox<A, V> {
    inner: Arc<Inner<A, V>>,
}

impl<A, V> Clone for SearchBox<A, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

/// A submitted request still in flight.
#[derive(Debug)]
pub struct RequestHandle {
    req_count: u64,
    task: JoinHandle<ResponseOutcome>,
}

impl RequestHandle {
    pub fn req_count(&self) -> u64 {
        self.req_count
    }

    /// Waits until the response has been handled.
    pub async fn outcome(self) -> Result<ResponseOutcome, JoinError> {
        self.task.await
    }
}

impl<A: SearchApi, V: SearchView> SearchBox<A, V> {
    pub fn new(api: A, view: V) -> Self {
        Self {
            inner: Arc::new(Inner {
                guard: StaleResponseGuard::new(),
                api,
                view: Mutex::new(ViewState { view, displayed: 0 }),
            }),
        }
    }

    pub fn guard(&self) -> &StaleResponseGuard {
        &self.inner.guard
    }

    pub fn submit(&self, query: impl Into<String>) -> RequestHandle {
        let event = self.inner.guard.submit(query);
        log::debug!("Submitting query {:?} as request {}", event.query, event.req_count);

        let req_count = event.req_count;
        let this = self.clone();
        let task = tokio::spawn(async move {
            let response = this.inner.api.search(&event.query, event.req_count).await;
            this.on_response(&event, response).await
        });

        RequestHandle { req_count, task }
    }

    /// Applies a completed response if it answers the latest submitted query.
    pub async fn on_response(
        &self,
        event: &QueryEvent,
        response: Result<SearchResult, ClientError>,
    ) -> ResponseOutcome {
        let guard = &self.inner.guard;
        let mut state = self.inner.view.lock().await;

        // An answer carrying another request's counter cannot be paired with
        // this query.
        let response = response.and_then(|found| {
            if found.req_count == event.req_count {
                Ok(found)
            } else {
                Err(ClientError::Malformed(format!(
                    "request {} was answered with counter {}",
                    event.req_count, found.req_count
                )))
            }
        });

        match response {
            Ok(found) => {
                if !guard.is_fresh(found.req_count) || found.req_count <= state.displayed {
                    log::debug!(
                        "Dropping stale response {} (latest is {})",
                        found.req_count,
                        guard.latest()
                    );
                    return ResponseOutcome::Stale;
                }
                state.view.show(&event.query, &found.result);
                state.displayed = found.req_count;
                ResponseOutcome::Applied
            }
            Err(e) => {
                if !guard.is_fresh(event.req_count) {
                    log::debug!("Ignoring failure of superseded request {}: {:#}", event.req_count, e);
                    return ResponseOutcome::FailedStale;
                }
                log::warn!("Search for {:?} failed: {:#}", event.query, e);
                state.view.show_error(&event.query, &e.to_string());
                state.displayed = event.req_count;
                ResponseOutcome::Failed
            }
        }
    }

    /// Runs `f` against the view while holding the view lock.
    pub async fn with_view<R>(&self, f: impl FnOnce(&V) -> R) -> R {
        let state = self.inner.view.lock().await;
        f(&state.view)
    }
}

/// Writes the query and the result, converted from HTML to text, to a
/// terminal-like writer.
pub struct TerminalView<W> {
    out: W,
    width: usize,
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W, width: usize) -> Self {
        Self { out, width }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send + 'static> SearchView for TerminalView<W> {
    fn show(&mut self, query: &str, result: &str) {
        let text = html2text::from_read(result.as_bytes(), self.width)
            .unwrap_or_else(|_| result.to_string());
        let written =
            writeln!(self.out, "\nQuery: {query}\n{text}").and_then(|_| self.out.flush());
        if let Err(e) = written {
            log::error!("Failed to write result: {e}");
        }
    }

    fn show_error(&mut self, query: &str, message: &str) {
        let written = writeln!(self.out, "\nQuery: {query}\nSearch failed: {message}")
            .and_then(|_| self.out.flush());
        if let Err(e) = written {
            log::error!("Failed to write error: {e}");
        }
    }
}

/// The input events produced by one line of input.
///
/// With `incremental` every prefix of the line is an event of its own, the
/// way a search box fires once per keystroke; otherwise the whole line is a
/// single event, even when it is empty.
pub fn input_events(line: &str, incremental: bool) -> Vec<String> {
    if !incremental {
        return vec![line.to_string()];
    }
    line.char_indices()
        .map(|(i, c)| line[..i + c.len_utf8()].to_string())
        .collect()
}
