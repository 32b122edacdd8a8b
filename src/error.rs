//! Error taxonomy, per §7.

use thiserror::Error;

/// Errors surfaced by a single transition-guard evaluation during search.
#[derive(Error, Debug)]
pub enum SearchError {
	/// A user `transition_guard` or `direction_bias` callback returned an
	/// error; per §4.5 this aborts the whole search and surfaces to the
	/// caller unchanged.
	#[error("transition callback aborted the search: {0}")]
	CallbackAborted(String),
}

/// Errors surfaced by [`crate::facade::PathFinder`] operations.
#[derive(Error, Debug)]
pub enum PathFinderError {
	/// The query coordinate matched more than one vertex under the
	/// configured tolerance (§4.6 "Endpoint resolution").
	#[error("coordinate resolves to more than one vertex on the network: {candidates:?}")]
	AmbiguousEndpoint { candidates: Vec<String> },

	/// A search-time callback raised an error.
	#[error(transparent)]
	Search(#[from] SearchError),

	/// The worker pool rejected or failed to service a request.
	#[error(transparent)]
	Worker(#[from] WorkerError),
}

/// Errors surfaced by the worker pool, per §4.7 "Failure" and §7.
#[derive(Error, Debug, Clone)]
pub enum WorkerError {
	#[error("Worker terminated unexpectedly")]
	WorkerCrashed,
	#[error("Worker pool has been closed")]
	PoolClosed,
	#[error("{message}")]
	Reported { message: String, stack: Option<String> },
}
