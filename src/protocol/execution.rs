//! Contracts shared with the command executor: its result set and the
//! tracer recording HTTP traffic made during an invocation.

use indexmap::IndexMap;
use parking_lot::Mutex;

use crate::convert::DynamicValue;

/// Outcome of running one command.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandExecutionResult {
    pub results: Vec<DynamicValue>,
    pub errors: Vec<DynamicValue>,
    /// Set by the executor. May be true with no error entries.
    pub had_errors: bool,
}

impl CommandExecutionResult {
    pub fn success(results: Vec<DynamicValue>) -> Self {
        Self {
            results,
            errors: Vec::new(),
            had_errors: false,
        }
    }

    pub fn failure(errors: Vec<DynamicValue>) -> Self {
        Self {
            results: Vec::new(),
            errors,
            had_errors: true,
        }
    }
}

/// One HTTP response captured by a tracer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TracedResponse {
    pub status_code: u16,
    /// Header lines in arrival order; a name may repeat.
    pub headers: Vec<(String, String)>,
}

impl TracedResponse {
    pub fn new(status_code: u16) -> Self {
        Self {
            status_code,
            headers: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Group header values by name (case-insensitive, first spelling kept).
    pub fn header_map(&self) -> IndexMap<String, Vec<String>> {
        let mut map: IndexMap<String, Vec<String>> = IndexMap::new();
        for (name, value) in &self.headers {
            match map.keys().position(|k| k.eq_ignore_ascii_case(name)) {
                Some(index) => map[index].push(value.clone()),
                None => {
                    map.insert(name.clone(), vec![value.clone()]);
                }
            }
        }
        map
    }
}

/// Exposes responses captured during the current invocation, oldest first.
pub trait ServiceTracer: Send + Sync {
    fn responses(&self) -> Vec<TracedResponse>;

    fn last_response(&self) -> Option<TracedResponse> {
        self.responses().pop()
    }
}

/// In-memory tracer handed to the executor for one invocation.
#[derive(Debug, Default)]
pub struct RecordingTracer {
    captured: Mutex<Vec<TracedResponse>>,
}

impl RecordingTracer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, response: TracedResponse) {
        self.captured.lock().push(response);
    }

    pub fn len(&self) -> usize {
        self.captured.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.captured.lock().is_empty()
    }
}

impl ServiceTracer for RecordingTracer {
    fn responses(&self) -> Vec<TracedResponse> {
        self.captured.lock().clone()
    }

    fn last_response(&self) -> Option<TracedResponse> {
        self.captured.lock().last().cloned()
    }
}
