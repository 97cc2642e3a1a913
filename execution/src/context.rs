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

//! The world context / world virtual state contract: a `WorldContext`
//! exposes the chain-level facts a handler needs (height, timestamp,
//! per-transaction info) plus access to the mutable overlay; a
//! `WorldVirtualState` is that overlay, and knows how to fork
//! (`get_future`), fold back into its parent (`commit`), and collapse a
//! generation of forks into a concrete state (`realize`).

use std::sync::Arc;

use crate::handler::TransactionInfo;

/// A single write-lock declaration a handler makes during `prepare`,
/// naming the state key it intends to mutate. Used to derive a virtual
/// overlay in which no other concurrently-running task observes the
/// same key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LockRequest {
	pub key: Vec<u8>,
	pub exclusive: bool,
}

/// A forkable overlay over the world state. Concurrent tasks each hold a
/// child fork; committing folds a child's mutations into its parent, and
/// `realize` is the barrier that waits for every child derived from a
/// given fork to commit before collapsing it into a concrete state.
pub trait WorldVirtualState: Send + Sync {
	/// Derives a child overlay observing only the given lock requests. An
	/// empty lock list derives a transparent child observing everything
	/// its parent does.
	fn get_future(&self, locks: &[LockRequest]) -> Arc<dyn WorldVirtualState>;

	/// Folds this overlay's mutations into its parent.
	fn commit(&self);

	/// Blocks until every child fork derived from this overlay has
	/// committed, then collapses it into a concrete state.
	fn realize(&self);
}

/// The context a handler executes against: chain-level facts plus access
/// to the current virtual state overlay.
pub trait WorldContext: Send + Sync {
	/// The current overlay, creating one if this context doesn't have one
	/// yet.
	fn world_virtual_state(&self) -> Arc<dyn WorldVirtualState>;

	/// Rebuilds this context around a different virtual state overlay,
	/// keeping its chain-level facts (height, timestamp) unchanged. Used
	/// both to hand a task its derived overlay and to reconstruct a
	/// context around the same overlay for a retry.
	fn with_virtual_state(&self, wvs: Arc<dyn WorldVirtualState>) -> Arc<dyn WorldContext>;

	/// Whether transactions marked skippable should be synthesized as
	/// zero-cost `Skipped` receipts rather than executed.
	fn skip_transaction_enabled(&self) -> bool;

	/// Records which transaction is about to run against this context, so
	/// a handler's `execute` can attribute fees, events, and logging to
	/// it.
	fn set_transaction_info(&self, info: TransactionInfo);

	fn block_height(&self) -> i64;

	fn time_stamp(&self) -> i64;
}
