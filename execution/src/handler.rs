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

//! Transactions, their handlers, and the receipts they produce.

use std::sync::Arc;

use crate::context::WorldContext;
use crate::error::Error;

/// Which fee/queue group a transaction belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransactionGroup {
	Normal,
	Patch,
}

/// Per-transaction telemetry a handler's `execute` observes via the
/// context, set immediately before each attempt.
#[derive(Clone, Debug)]
pub struct TransactionInfo {
	pub group: TransactionGroup,
	pub index: i32,
	pub timestamp: i64,
	pub nonce: u64,
	pub hash: [u8; 32],
	pub sender: Vec<u8>,
}

/// Outcome status of an executed transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReceiptStatus {
	Success,
	Failure,
	Skipped,
}

/// The structured outcome of a transaction.
#[derive(Clone, Debug)]
pub struct Receipt {
	pub status: ReceiptStatus,
	pub step_used: u64,
	pub events: Vec<Vec<u8>>,
}

impl Receipt {
	/// A zero-cost receipt for a transaction the scheduler chose not to
	/// run because skipping is enabled and the transaction allows it.
	pub fn skipped() -> Receipt {
		Receipt {
			status: ReceiptStatus::Skipped,
			step_used: 0,
			events: Vec::new(),
		}
	}
}

/// Per-transaction object a scheduler drives through `prepare` (concurrent
/// mode only), `execute`, and `dispose`.
pub trait TransactionHandler: Send {
	/// Declares write locks for this transaction and returns the
	/// per-transaction world context derived from them. Only called in
	/// concurrent mode, once per handler instance, before its first
	/// `execute`.
	fn prepare(&mut self, ctx: &dyn WorldContext) -> Result<Arc<dyn WorldContext>, Error>;

	/// Performs the state mutation. `estimate` requests a dry run that
	/// still produces a receipt but must not be treated as final (unused
	/// by either executor in this crate, carried for handler
	/// implementations that support step estimation).
	fn execute(&mut self, ctx: &dyn WorldContext, estimate: bool) -> Result<Receipt, Error>;

	/// Scoped release of per-handler resources. Always called exactly
	/// once per handler instance, whether `execute` succeeded or failed.
	fn dispose(&mut self);
}

/// A single entry in the ordered transaction list fed to an executor.
pub trait Transaction: Send + Sync {
	fn group(&self) -> TransactionGroup;
	fn timestamp(&self) -> i64;
	fn nonce(&self) -> u64;
	fn hash(&self) -> [u8; 32];
	fn sender(&self) -> Vec<u8>;

	/// Whether this transaction may be synthesized as a `Skipped` receipt
	/// instead of executed, when the context permits skipping.
	fn is_skippable(&self) -> bool;

	/// Obtains a fresh handler. Called once per attempt: the first try and
	/// again before each retry.
	fn get_handler(&self) -> Result<Box<dyn TransactionHandler>, Error>;
}
