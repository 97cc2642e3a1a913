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

//! Executor tuning and the cooperative cancellation flag. Passed
//! explicitly rather than read from process-wide constants.

use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Clone, Debug)]
pub struct ExecutorConfig {
	/// Extra attempts after the first, for a transaction whose handler
	/// reports a transient `ExecutionFail`. Identical across sequential
	/// and concurrent modes.
	pub retry_count: u32,
}

impl Default for ExecutorConfig {
	fn default() -> Self {
		ExecutorConfig { retry_count: 2 }
	}
}

/// A monotonic one-way cancellation flag, observed at iteration and
/// task-spawn boundaries. Once set, it never clears.
#[derive(Default)]
pub struct StepFlag(AtomicBool);

impl StepFlag {
	pub fn new() -> Self {
		StepFlag(AtomicBool::new(false))
	}

	pub fn cancel(&self) {
		self.0.store(true, Ordering::SeqCst);
	}

	pub fn is_cancelled(&self) -> bool {
		self.0.load(Ordering::SeqCst)
	}
}
