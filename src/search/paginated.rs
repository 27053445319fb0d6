//! Paginated Search
//!
//! Executes a [`SearchRequest`] through an [`ApiClient`], optionally following
//! the `next` links of each response until every result is retrieved or the
//! API's retrieval ceiling is reached, then rebuilds the typed results table.
//!
//! Pages are fetched one after another; a failure is reported to the caller
//! as-is, with no retry.

use serde_json::{Map, Value};
use tracing::{debug, info};

use super::request::SearchRequest;
use crate::client::ApiClient;
use crate::table::{normalize, ResultsTable};
use crate::types::{ExecutionError, PaginationFault, Record, SearchError, SearchResult};

/// The search API stops serving pages past this many results. A page that
/// crosses the limit is cut back to it.
pub const MAX_RETRIEVABLE_RESULTS: usize = 5000;

const RESULTS_FIELD: &str = "search-results";
const TOTAL_FIELD: &str = "opensearch:totalResults";
const ENTRY_FIELD: &str = "entry";
const LINK_FIELD: &str = "link";

#[derive(Debug)]
struct SearchState {
    total_result_count: u64,
    records: Vec<Record>,
    table: Option<ResultsTable>,
}

#[derive(Debug)]
pub struct PaginatedSearch {
    request: SearchRequest,
    state: Option<SearchState>,
}

impl From<SearchRequest> for PaginatedSearch {
    fn from(request: SearchRequest) -> Self {
        Self {
            request,
            state: None,
        }
    }
}

impl PaginatedSearch {
    pub fn new(query: impl Into<String>, index_label: impl Into<String>) -> Self {
        SearchRequest::new(query, index_label).into()
    }

    /// The immutable request; readable before any execution.
    pub fn request(&self) -> &SearchRequest {
        &self.request
    }

    fn state(&self, accessor: &'static str) -> SearchResult<&SearchState> {
        self.state
            .as_ref()
            .ok_or(SearchError::StateNotReady(accessor))
    }

    pub fn query(&self) -> SearchResult<&str> {
        self.state("query")?;
        Ok(self.request.query())
    }

    pub fn index_label(&self) -> SearchResult<&str> {
        self.state("index_label")?;
        Ok(self.request.index_label())
    }

    pub fn request_uri(&self) -> SearchResult<&str> {
        self.state("request_uri")?;
        Ok(self.request.uri())
    }

    /// Raw entries in arrival order.
    pub fn results(&self) -> SearchResult<&[Record]> {
        Ok(&self.state("results")?.records)
    }

    /// Total matches reported by the index. May exceed what can be retrieved.
    pub fn total_result_count(&self) -> SearchResult<u64> {
        Ok(self.state("total_result_count")?.total_result_count)
    }

    pub fn retrieved_count(&self) -> SearchResult<usize> {
        Ok(self.state("retrieved_count")?.records.len())
    }

    /// Typed table of the retrieved entries, rebuilt by each successful execute.
    pub fn table(&self) -> SearchResult<&ResultsTable> {
        self.state("table")?
            .table
            .as_ref()
            .ok_or(SearchError::StateNotReady("table"))
    }

    /// True iff the retrieved count equals the reported total exactly.
    pub fn has_all_results(&self) -> SearchResult<bool> {
        let state = self.state("has_all_results")?;
        Ok(state.records.len() as u64 == state.total_result_count)
    }

    /// Run the search. With `fetch_all`, keep following `next` links until all
    /// results are in or [`MAX_RETRIEVABLE_RESULTS`] is reached.
    pub async fn execute<C>(&mut self, client: &C, fetch_all: bool) -> SearchResult<()>
    where
        C: ApiClient + ?Sized,
    {
        info!(
            query = %self.request.query(),
            index = %self.request.index_label(),
            fetch_all,
            "Executing search"
        );

        let response = client
            .exec_request(self.request.uri())
            .await
            .map_err(ExecutionError::from)?;
        let body = search_results(&response)?;
        let total_result_count = parse_total(body)?;
        let records = parse_entries(body)?;

        let state = self.state.insert(SearchState {
            total_result_count,
            records,
            table: None,
        });

        if fetch_all {
            let mut last = response;
            while (state.records.len() as u64) < state.total_result_count
                && state.records.len() < MAX_RETRIEVABLE_RESULTS
            {
                let next = next_link(search_results(&last)?)
                    .ok_or(SearchError::PaginationProtocol {
                        retrieved: state.records.len(),
                        total: state.total_result_count,
                        fault: PaginationFault::MissingNextLink,
                    })?
                    .to_string();

                debug!(uri = %next, retrieved = state.records.len(), "Fetching next page");

                let page = client
                    .exec_request(&next)
                    .await
                    .map_err(ExecutionError::from)?;
                let entries = parse_entries(search_results(&page)?)?;
                if entries.is_empty() {
                    return Err(SearchError::PaginationProtocol {
                        retrieved: state.records.len(),
                        total: state.total_result_count,
                        fault: PaginationFault::EmptyPage,
                    });
                }

                state.records.extend(entries);
                state.records.truncate(MAX_RETRIEVABLE_RESULTS);
                last = page;
            }
        }

        state.table = Some(normalize(&state.records, self.request.uri())?);

        info!(
            total = state.total_result_count,
            retrieved = state.records.len(),
            "Search completed"
        );
        Ok(())
    }
}

fn search_results(response: &Value) -> Result<&Map<String, Value>, ExecutionError> {
    response
        .get(RESULTS_FIELD)
        .and_then(Value::as_object)
        .ok_or(ExecutionError::MissingField(RESULTS_FIELD))
}

fn parse_total(body: &Map<String, Value>) -> Result<u64, ExecutionError> {
    let value = body
        .get(TOTAL_FIELD)
        .ok_or(ExecutionError::MissingField(TOTAL_FIELD))?;

    let total = match value {
        Value::String(s) => s.trim().parse::<u64>().ok(),
        Value::Number(n) => n.as_u64(),
        _ => None,
    };

    total.ok_or_else(|| ExecutionError::InvalidTotal {
        field: TOTAL_FIELD,
        value: value.to_string(),
    })
}

fn parse_entries(body: &Map<String, Value>) -> Result<Vec<Record>, ExecutionError> {
    let malformed = |value: &Value| ExecutionError::MalformedField {
        field: ENTRY_FIELD.to_string(),
        value: value.to_string(),
    };

    match body.get(ENTRY_FIELD) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(entries)) => entries
            .iter()
            .map(|entry| entry.as_object().cloned().ok_or_else(|| malformed(entry)))
            .collect(),
        Some(other) => Err(malformed(other)),
    }
}

/// `@href` of the (last) link whose `@ref` is `next`.
fn next_link(body: &Map<String, Value>) -> Option<&str> {
    body.get(LINK_FIELD)?
        .as_array()?
        .iter()
        .filter(|link| link.get("@ref").and_then(Value::as_str) == Some("next"))
        .filter_map(|link| link.get("@href").and_then(Value::as_str))
        .last()
}
