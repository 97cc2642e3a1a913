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

//! A minimal in-memory world context/virtual state and a configurable
//! transaction stand-in, shared by the sequential and concurrent test
//! suites.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use glacier_execution::{
	Error, ErrorKind, LockRequest, Receipt, ReceiptStatus, Transaction, TransactionGroup,
	TransactionHandler, TransactionInfo, WorldContext, WorldVirtualState,
};

pub struct TestWvs;

impl WorldVirtualState for TestWvs {
	fn get_future(&self, _locks: &[LockRequest]) -> Arc<dyn WorldVirtualState> {
		Arc::new(TestWvs)
	}

	fn commit(&self) {}

	fn realize(&self) {}
}

/// A `WorldVirtualState` that counts `commit`/`realize` calls instead of
/// discarding them, so a test can assert every spawned task actually folds
/// its overlay back into the parent.
pub struct CountingWvs {
	commits: Arc<AtomicU32>,
	realizes: Arc<AtomicU32>,
}

impl CountingWvs {
	pub fn new() -> (Arc<dyn WorldVirtualState>, Arc<AtomicU32>, Arc<AtomicU32>) {
		let commits = Arc::new(AtomicU32::new(0));
		let realizes = Arc::new(AtomicU32::new(0));
		let wvs = Arc::new(CountingWvs {
			commits: commits.clone(),
			realizes: realizes.clone(),
		});
		(wvs, commits, realizes)
	}
}

impl WorldVirtualState for CountingWvs {
	fn get_future(&self, _locks: &[LockRequest]) -> Arc<dyn WorldVirtualState> {
		Arc::new(CountingWvs {
			commits: self.commits.clone(),
			realizes: self.realizes.clone(),
		})
	}

	fn commit(&self) {
		self.commits.fetch_add(1, Ordering::SeqCst);
	}

	fn realize(&self) {
		self.realizes.fetch_add(1, Ordering::SeqCst);
	}
}

pub struct TestCtx {
	wvs: Mutex<Arc<dyn WorldVirtualState>>,
	skip_enabled: bool,
	last_info: Mutex<Option<TransactionInfo>>,
}

impl TestCtx {
	pub fn new(skip_enabled: bool) -> Arc<dyn WorldContext> {
		Arc::new(TestCtx {
			wvs: Mutex::new(Arc::new(TestWvs)),
			skip_enabled,
			last_info: Mutex::new(None),
		})
	}

	pub fn with_wvs(skip_enabled: bool, wvs: Arc<dyn WorldVirtualState>) -> Arc<dyn WorldContext> {
		Arc::new(TestCtx {
			wvs: Mutex::new(wvs),
			skip_enabled,
			last_info: Mutex::new(None),
		})
	}
}

impl WorldContext for TestCtx {
	fn world_virtual_state(&self) -> Arc<dyn WorldVirtualState> {
		self.wvs.lock().unwrap().clone()
	}

	fn with_virtual_state(&self, wvs: Arc<dyn WorldVirtualState>) -> Arc<dyn WorldContext> {
		Arc::new(TestCtx {
			wvs: Mutex::new(wvs),
			skip_enabled: self.skip_enabled,
			last_info: Mutex::new(None),
		})
	}

	fn skip_transaction_enabled(&self) -> bool {
		self.skip_enabled
	}

	fn set_transaction_info(&self, info: TransactionInfo) {
		*self.last_info.lock().unwrap() = Some(info);
	}

	fn block_height(&self) -> i64 {
		1
	}

	fn time_stamp(&self) -> i64 {
		0
	}
}

/// A handler that fails transiently `fail_times` times (shared across
/// every handler instance `get_handler` produces for the same
/// transaction, via the `attempts` counter) before succeeding.
pub struct FlakyHandler {
	pub attempts: Arc<AtomicU32>,
	pub fail_times: u32,
	pub step_used: u64,
}

impl TransactionHandler for FlakyHandler {
	fn prepare(&mut self, ctx: &dyn WorldContext) -> Result<Arc<dyn WorldContext>, Error> {
		Ok(ctx.with_virtual_state(ctx.world_virtual_state()))
	}

	fn execute(&mut self, _ctx: &dyn WorldContext, _estimate: bool) -> Result<Receipt, Error> {
		let n = self.attempts.fetch_add(1, Ordering::SeqCst);
		if n < self.fail_times {
			Err(ErrorKind::ExecutionFail { transient: true }.into())
		} else {
			Ok(Receipt {
				status: ReceiptStatus::Success,
				step_used: self.step_used,
				events: Vec::new(),
			})
		}
	}

	fn dispose(&mut self) {}
}

/// A handler that always fails with a permanent (non-retryable) error.
pub struct FailingHandler;

impl TransactionHandler for FailingHandler {
	fn prepare(&mut self, ctx: &dyn WorldContext) -> Result<Arc<dyn WorldContext>, Error> {
		Ok(ctx.with_virtual_state(ctx.world_virtual_state()))
	}

	fn execute(&mut self, _ctx: &dyn WorldContext, _estimate: bool) -> Result<Receipt, Error> {
		Err(ErrorKind::Precondition("permanently broken handler".to_string()).into())
	}

	fn dispose(&mut self) {}
}

pub struct TestTx {
	pub hash: [u8; 32],
	pub skippable: bool,
	pub attempts: Arc<AtomicU32>,
	pub fail_times: u32,
	pub permanent_failure: bool,
	pub step_used: u64,
}

impl TestTx {
	pub fn ok(id: u8, step_used: u64) -> Arc<dyn Transaction> {
		Arc::new(TestTx {
			hash: [id; 32],
			skippable: false,
			attempts: Arc::new(AtomicU32::new(0)),
			fail_times: 0,
			permanent_failure: false,
			step_used,
		})
	}

	pub fn skippable(id: u8) -> Arc<dyn Transaction> {
		Arc::new(TestTx {
			hash: [id; 32],
			skippable: true,
			attempts: Arc::new(AtomicU32::new(0)),
			fail_times: 0,
			permanent_failure: false,
			step_used: 0,
		})
	}

	pub fn flaky(id: u8, fail_times: u32, attempts: Arc<AtomicU32>) -> Arc<dyn Transaction> {
		Arc::new(TestTx {
			hash: [id; 32],
			skippable: false,
			attempts,
			fail_times,
			permanent_failure: false,
			step_used: 0,
		})
	}

	pub fn permanently_failing(id: u8) -> Arc<dyn Transaction> {
		Arc::new(TestTx {
			hash: [id; 32],
			skippable: false,
			attempts: Arc::new(AtomicU32::new(0)),
			fail_times: 0,
			permanent_failure: true,
			step_used: 0,
		})
	}
}

impl Transaction for TestTx {
	fn group(&self) -> TransactionGroup {
		TransactionGroup::Normal
	}

	fn timestamp(&self) -> i64 {
		0
	}

	fn nonce(&self) -> u64 {
		0
	}

	fn hash(&self) -> [u8; 32] {
		self.hash
	}

	fn sender(&self) -> Vec<u8> {
		vec![0xAB]
	}

	fn is_skippable(&self) -> bool {
		self.skippable
	}

	fn get_handler(&self) -> Result<Box<dyn TransactionHandler>, Error> {
		if self.permanent_failure {
			Ok(Box::new(FailingHandler))
		} else {
			Ok(Box::new(FlakyHandler {
				attempts: self.attempts.clone(),
				fail_times: self.fail_times,
				step_used: self.step_used,
			}))
		}
	}
}
