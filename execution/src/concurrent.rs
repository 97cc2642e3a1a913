// Copyright 2018 The Grin Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Bounded-parallelism execution: a token channel caps the number of
//! in-flight tasks at `level`, and a mutex-guarded error slot records the
//! first fatal error to short-circuit further scheduling.
//!
//! A task's receipt is delivered back to the scheduling thread over a
//! channel rather than written through a raw pointer into the shared
//! buffer: the scheduler is the sole writer of `receipts_out`, so no
//! unsafe aliasing is needed to honor "indexed by input order even when
//! completion order differs".

use std::sync::mpsc::{self, sync_channel, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;

use log::warn;

use crate::config::{ExecutorConfig, StepFlag};
use crate::context::WorldContext;
use crate::error::{Error, ErrorKind};
use crate::handler::{Receipt, Transaction, TransactionHandler, TransactionInfo};

/// First-error-wins shared slot: only the first `report` after creation
/// is retained.
struct ErrorSlot(Mutex<Option<ErrorKind>>);

impl ErrorSlot {
	fn new() -> Self {
		ErrorSlot(Mutex::new(None))
	}

	fn report(&self, kind: ErrorKind) {
		let mut slot = self.0.lock().unwrap();
		if slot.is_none() {
			*slot = Some(kind);
		}
	}

	fn peek(&self) -> Option<ErrorKind> {
		self.0.lock().unwrap().clone()
	}
}

struct TaskOutcome {
	index: usize,
	result: Result<Receipt, ErrorKind>,
}

/// One spawned transaction's retry loop: executes, and on a transient
/// failure re-acquires a fresh handler and rebuilds the per-task context
/// around the same virtual state overlay. On success, commits the task's
/// overlay into its parent before returning the receipt, so the parent's
/// `realize()` collapses a state that actually reflects every task's
/// mutation.
fn run_task(
	tx: Arc<dyn Transaction>,
	mut ctx: Arc<dyn WorldContext>,
	mut handler: Box<dyn TransactionHandler>,
	index: usize,
	retry_count: u32,
) -> Result<Receipt, ErrorKind> {
	let info = |ctx: &dyn WorldContext| {
		ctx.set_transaction_info(TransactionInfo {
			group: tx.group(),
			index: index as i32,
			timestamp: tx.timestamp(),
			nonce: tx.nonce(),
			hash: tx.hash(),
			sender: tx.sender(),
		});
	};

	let mut attempt: u32 = 0;
	loop {
		info(ctx.as_ref());
		let outcome = handler.execute(ctx.as_ref(), false);
		handler.dispose();

		match outcome {
			Ok(receipt) => {
				ctx.world_virtual_state().commit();
				return Ok(receipt);
			}
			Err(e) => {
				if !e.is_transient() || attempt == retry_count {
					return Err(e.kind());
				}
				warn!("retry tx {:x?} for {}", tx.hash(), e);
				attempt += 1;
				handler = match tx.get_handler() {
					Ok(h) => h,
					Err(e) => return Err(ErrorKind::Handler(e.to_string())),
				};
				// rebuild the per-task context around the same overlay,
				// without re-deriving it: only the handler is reacquired.
				ctx = ctx.with_virtual_state(ctx.world_virtual_state());
			}
		}
	}
}

/// Executes `txs` with up to `level` tasks in flight simultaneously.
/// `ctx` must already expose a virtual state overlay the tasks can fork
/// from; that overlay is realized (collapsed) once every spawned task has
/// committed, even if the run is cancelled partway through -- see
/// DESIGN.md for why `realize` is always awaited.
pub fn execute_concurrent(
	level: usize,
	txs: &[Arc<dyn Transaction>],
	ctx: &Arc<dyn WorldContext>,
	receipts_out: &mut [Option<Receipt>],
	config: &ExecutorConfig,
	cancel: &StepFlag,
) -> Result<(), Error> {
	assert!(level >= 1, "parallelism level must be at least 1");
	assert_eq!(txs.len(), receipts_out.len());

	if txs.is_empty() {
		return Ok(());
	}

	let outer_wvs = ctx.world_virtual_state();
	let errors = Arc::new(ErrorSlot::new());

	// token channel: a bounded semaphore of `level` permits. Acquiring a
	// token before spawning enforces "at most level tasks in flight
	// simultaneously"; a task sends its token back when it finishes.
	let (token_tx, token_rx): (Sender<()>, Receiver<()>) = sync_channel(level);
	for _ in 0..level {
		token_tx.send(()).expect("freshly created token channel");
	}

	let (outcome_tx, outcome_rx): (Sender<TaskOutcome>, Receiver<TaskOutcome>) = mpsc::channel();

	let mut spawned = 0usize;
	let mut cancelled = false;

	for (index, tx) in txs.iter().enumerate() {
		if cancel.is_cancelled() {
			cancelled = true;
			break;
		}
		if errors.peek().is_some() {
			break;
		}

		// blocks until a permit is available.
		token_rx.recv().expect("token sender outlives the loop");

		let mut handler = match tx.get_handler() {
			Ok(h) => h,
			Err(e) => {
				errors.report(ErrorKind::Handler(e.to_string()));
				let _ = token_tx.send(());
				break;
			}
		};
		let task_ctx = match handler.prepare(ctx.as_ref()) {
			Ok(c) => c,
			Err(e) => {
				errors.report(e.kind());
				let _ = token_tx.send(());
				break;
			}
		};

		let tx = tx.clone();
		let retry_count = config.retry_count;
		let errors = errors.clone();
		let outcome_tx = outcome_tx.clone();
		let token_tx = token_tx.clone();

		thread::Builder::new()
			.name("glacier-tx-exec".to_string())
			.spawn(move || {
				let result = run_task(tx, task_ctx, handler, index, retry_count);
				if let Err(ref kind) = result {
					errors.report(kind.clone());
				}
				let _ = outcome_tx.send(TaskOutcome { index, result });
				let _ = token_tx.send(());
			})
			.expect("failed to spawn transaction execution thread");

		spawned += 1;
	}

	// drain every spawned task's outcome before doing anything else: this
	// is the join barrier that makes it safe for the scheduler (and only
	// the scheduler) to write into receipts_out, and it guarantees every
	// task has in fact finished before `realize()` is asked to collapse
	// the overlay -- required even when the run above was cancelled, so
	// no in-flight task can still be mutating a child overlay once this
	// function returns.
	for _ in 0..spawned {
		let outcome = outcome_rx.recv().expect("every spawned task reports back");
		match outcome.result {
			Ok(receipt) => receipts_out[outcome.index] = Some(receipt),
			Err(kind) => errors.report(kind),
		}
	}

	outer_wvs.realize();

	if cancelled {
		return Err(ErrorKind::Interrupted.into());
	}
	if let Some(kind) = errors.peek() {
		return Err(kind.into());
	}
	Ok(())
}
