//! Worker pool (§4.7): each worker owns its own clone of the network, so a
//! search in progress on one thread never observes another thread's state.
//!
//! Built directly on `std::thread`/`std::sync::mpsc` rather than a
//! data-parallel crate: the pool has to express a request/response queue
//! with a FIFO backlog, LIFO idle-worker reuse (the most recently freed
//! worker gets the next job, for cache locality), and per-worker
//! crash-and-respawn, none of which map onto a `par_iter`-style API.
//! `num_cpus` still sizes the default pool, the same way the corpus reaches
//! for it elsewhere for thread-count defaults.

use std::collections::{HashMap, VecDeque};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::coordinate::Coordinate;
use crate::error::WorkerError;
use crate::facade::{Path, PathFinder, SearchOptions};

/// One `find_path` request dispatched to the pool.
pub struct FindPathRequest {
	pub start: Coordinate,
	pub goal: Coordinate,
	pub options: SearchOptions,
}

type Reply = Sender<Result<Option<Path>, WorkerError>>;

enum Event {
	Submit(FindPathRequest, Reply),
	Idle(usize),
	Crashed(usize),
	Close,
}

enum WorkerMsg {
	Run(FindPathRequest, Reply),
	Stop,
}

/// A fixed-capacity pool of worker threads answering `find_path` queries
/// against independent clones of the same network.
pub struct WorkerPool {
	events_tx: Sender<Event>,
	dispatcher: Option<JoinHandle<()>>,
	closed: Arc<AtomicBool>,
}

impl WorkerPool {
	/// Spawns `capacity` workers (default: `num_cpus::get()`), each built by
	/// calling `factory` once on its own thread. A typical factory clones a
	/// master [`PathFinder`]: `{ let pf = master.clone(); move || pf.clone() }`.
	pub fn new(factory: impl Fn() -> PathFinder + Send + Sync + 'static, capacity: Option<usize>) -> Self {
		let capacity = capacity.unwrap_or_else(|| num_cpus::get().max(1));
		let factory = Arc::new(factory);
		let (events_tx, events_rx) = mpsc::channel::<Event>();
		let closed = Arc::new(AtomicBool::new(false));
		let next_id = Arc::new(AtomicUsize::new(0));

		let mut worker_txs: HashMap<usize, Sender<WorkerMsg>> = HashMap::new();
		let mut idle: Vec<usize> = Vec::with_capacity(capacity);
		for _ in 0..capacity {
			let id = next_id.fetch_add(1, Ordering::SeqCst);
			worker_txs.insert(id, spawn_worker(id, Arc::clone(&factory), events_tx.clone()));
			idle.push(id);
		}

		let dispatcher = thread::spawn(move || {
			let mut queue: VecDeque<(FindPathRequest, Reply)> = VecDeque::new();
			loop {
				match events_rx.recv() {
					Ok(Event::Submit(req, reply)) => match idle.pop() {
						Some(id) => {
							let _ = worker_txs[&id].send(WorkerMsg::Run(req, reply));
						}
						None => queue.push_back((req, reply)),
					},
					Ok(Event::Idle(id)) => match queue.pop_front() {
						Some((req, reply)) => {
							let _ = worker_txs[&id].send(WorkerMsg::Run(req, reply));
						}
						None => idle.push(id),
					},
					Ok(Event::Crashed(id)) => {
						log::warn!("worker {} crashed, respawning", id);
						worker_txs.remove(&id);
						let new_id = next_id.fetch_add(1, Ordering::SeqCst);
						worker_txs.insert(new_id, spawn_worker(new_id, Arc::clone(&factory), events_tx.clone()));
						match queue.pop_front() {
							Some((req, reply)) => {
								let _ = worker_txs[&new_id].send(WorkerMsg::Run(req, reply));
							}
							None => idle.push(new_id),
						}
					}
					Ok(Event::Close) | Err(_) => {
						for tx in worker_txs.values() {
							let _ = tx.send(WorkerMsg::Stop);
						}
						for (_, reply) in queue.drain(..) {
							let _ = reply.send(Err(WorkerError::PoolClosed));
						}
						break;
					}
				}
			}
		});

		Self { events_tx, dispatcher: Some(dispatcher), closed }
	}

	/// Submits a request and blocks until a worker services it.
	pub fn find_path(&self, start: Coordinate, goal: Coordinate, options: SearchOptions) -> Result<Option<Path>, WorkerError> {
		self.submit(start, goal, options).recv().unwrap_or(Err(WorkerError::PoolClosed))
	}

	/// Submits a request without blocking; the returned `Receiver` resolves
	/// once a worker (or the pool's shutdown path) replies.
	pub fn submit(&self, start: Coordinate, goal: Coordinate, options: SearchOptions) -> Receiver<Result<Option<Path>, WorkerError>> {
		let (reply_tx, reply_rx) = mpsc::channel();
		if self.closed.load(Ordering::SeqCst) {
			let _ = reply_tx.send(Err(WorkerError::PoolClosed));
			return reply_rx;
		}
		if self.events_tx.send(Event::Submit(FindPathRequest { start, goal, options }, reply_tx.clone())).is_err() {
			let _ = reply_tx.send(Err(WorkerError::PoolClosed));
		}
		reply_rx
	}

	/// Closes the pool: already-queued and in-flight requests still
	/// complete; anything submitted after this call rejects immediately
	/// with `WorkerError::PoolClosed`. Idempotent.
	pub fn close(&mut self) {
		if self.closed.swap(true, Ordering::SeqCst) {
			return;
		}
		let _ = self.events_tx.send(Event::Close);
		if let Some(handle) = self.dispatcher.take() {
			let _ = handle.join();
		}
	}
}

impl Drop for WorkerPool {
	fn drop(&mut self) {
		self.close();
	}
}

fn spawn_worker(id: usize, factory: Arc<dyn Fn() -> PathFinder + Send + Sync>, events_tx: Sender<Event>) -> Sender<WorkerMsg> {
	let (tx, rx) = mpsc::channel::<WorkerMsg>();
	thread::spawn(move || {
		let pf = factory();
		loop {
			match rx.recv() {
				Ok(WorkerMsg::Run(req, reply)) => {
					let outcome = panic::catch_unwind(AssertUnwindSafe(|| pf.find_path(req.start, req.goal, &req.options)));
					match outcome {
						Ok(Ok(path)) => {
							let _ = reply.send(Ok(path));
							let _ = events_tx.send(Event::Idle(id));
						}
						Ok(Err(e)) => {
							let _ = reply.send(Err(WorkerError::Reported { message: e.to_string(), stack: None }));
							let _ = events_tx.send(Event::Idle(id));
						}
						Err(_) => {
							let _ = reply.send(Err(WorkerError::WorkerCrashed));
							let _ = events_tx.send(Event::Crashed(id));
							break;
						}
					}
				}
				Ok(WorkerMsg::Stop) | Err(_) => break,
			}
		}
	});
	tx
}
