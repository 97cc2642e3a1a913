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

//! The caller-facing delivery contract.
//!
//! This is a typed two-method trait rather than a shared untyped event
//! queue: `on_block` fires in ascending height
//! order, `on_end` fires exactly once, terminally.

use std::sync::mpsc::Sender;

use crate::error::Error;
use crate::reactor::ReactorEvent;

/// Receives delivery callbacks for one `fetch` session.
pub trait FetchSink: Send {
	/// Called once per height, strictly in ascending order.
	fn on_block(&self, result: BlockResult);
	/// Called exactly once, after the last `on_block` (or immediately, if
	/// the session never delivers anything). `None` on a clean finish.
	fn on_end(&self, err: Option<Error>);
}

/// An owned `(block bytes, votes bytes)` pair for one height. The fetcher
/// suspends delivering the next height until `consume` is called on this
/// value -- the sole backpressure primitive in the protocol.
pub struct BlockResult {
	height: i64,
	block: Vec<u8>,
	votes: Vec<u8>,
	ack: Sender<ReactorEvent>,
}

impl BlockResult {
	pub(crate) fn new(height: i64, block: Vec<u8>, votes: Vec<u8>, ack: Sender<ReactorEvent>) -> Self {
		BlockResult {
			height,
			block,
			votes,
			ack,
		}
	}

	pub fn height(&self) -> i64 {
		self.height
	}

	pub fn block(&self) -> &[u8] {
		&self.block
	}

	pub fn votes(&self) -> &[u8] {
		&self.votes
	}

	/// Acknowledges consumption of this block, releasing the fetcher to
	/// deliver the next height. Consuming `self` makes double-consumption
	/// a compile error.
	pub fn consume(self) {
		// the reactor thread outlives every BlockResult it hands out (it
		// only exits after emitting on_end), so this practically never
		// fails; if the session already tore down there is nothing left
		// to unblock anyway.
		let _ = self.ack.send(ReactorEvent::Consumed(self.height));
	}
}
