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

//! Sequential and bounded-concurrent execution of an ordered transaction
//! list against a virtual world state overlay.
//!
//! `execute_sequential` and `execute_concurrent` share the same contract:
//! given a transaction list and a pre-sized receipt buffer, fill
//! `receipts_out[i]` with the i-th transaction's receipt in input order.
//! The two differ only in scheduling -- one transaction at a time versus
//! up to `level` transactions executing on independent world-state
//! overlays at once.

pub mod concurrent;
pub mod config;
pub mod context;
pub mod error;
pub mod handler;
pub mod sequential;

pub use concurrent::execute_concurrent;
pub use config::{ExecutorConfig, StepFlag};
pub use context::{LockRequest, WorldContext, WorldVirtualState};
pub use error::{Error, ErrorKind};
pub use handler::{
	Receipt, ReceiptStatus, Transaction, TransactionGroup, TransactionHandler, TransactionInfo,
};
pub use sequential::execute_sequential;
