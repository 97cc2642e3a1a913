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

//! Per-height tracking slot and its state machine.
//!
//! Request ids are `(generation << 16) | peer_seq`: `generation` is one
//! plus this slot's retry count (bumps only when the slot itself is
//! reassigned after a failure), and `peer_seq` is a sequence number
//! handed out by the peer currently serving it (see `peer::PeerArena`).
//! Because each peer serves at most `per_peer_cap` slots at a time, a
//! response is first correlated by its source peer and only then checked
//! against that peer's assigned slot's current id -- two different slots
//! can legitimately share the same numeric id if served by different
//! peers.

use std::time::Instant;

use crate::codec::make_request_id;
use crate::peer::PeerHandle;

/// `Unassigned -> Requested -> Receiving(metadata known) -> Complete`, or
/// `Failed` on peer drop/timeout, which returns to `Unassigned` on the next
/// scheduling tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotState {
	Unassigned,
	Requested,
	Receiving,
	Complete,
	Failed,
}

/// Tracking record for one height in the requested range.
pub struct Slot {
	pub height: i64,
	retry_count: u16,
	assigned_seq: u16,
	pub state: SlotState,
	pub peer: Option<PeerHandle>,
	pub deadline: Option<Instant>,
	pub votes: Option<Vec<u8>>,
	pub block_length: Option<i32>,
	pub body: Option<Vec<u8>>,
}

impl Slot {
	pub fn new(height: i64) -> Self {
		Slot {
			height,
			retry_count: 0,
			assigned_seq: 0,
			state: SlotState::Unassigned,
			peer: None,
			deadline: None,
			votes: None,
			block_length: None,
			body: None,
		}
	}

	/// The request id correlating a peer's response to this slot's
	/// current outstanding request: `(generation << 16) | peer_seq`.
	pub fn request_id(&self) -> u32 {
		make_request_id(self.retry_count + 1, self.assigned_seq)
	}

	/// Returns this slot to `Unassigned` after a timeout or peer drop,
	/// bumping the retry count so the next `assign` changes the high word
	/// of the request id.
	pub fn reset(&mut self) {
		self.retry_count += 1;
		self.state = SlotState::Unassigned;
		self.peer = None;
		self.deadline = None;
		self.votes = None;
		self.block_length = None;
		self.body = None;
	}

	/// Assigns this slot to `peer`, under the sequence number the peer
	/// arena handed out for this assignment.
	pub fn assign(&mut self, peer: PeerHandle, peer_seq: u16, deadline: Instant) {
		self.assigned_seq = peer_seq;
		self.state = SlotState::Requested;
		self.peer = Some(peer);
		self.deadline = Some(deadline);
		self.votes = None;
		self.block_length = None;
		self.body = None;
	}

	/// A slot may only complete once both metadata and body have arrived
	/// for the *current* request id; this is checked by the caller before
	/// calling `try_complete`.
	pub fn try_complete(&mut self) -> bool {
		if self.votes.is_some() && self.body.is_some() {
			self.state = SlotState::Complete;
			true
		} else {
			false
		}
	}

	pub fn is_stale_id(&self, request_id: u32) -> bool {
		request_id != self.request_id()
	}

	pub fn take_result(&mut self) -> Option<(Vec<u8>, Vec<u8>)> {
		match (self.body.take(), self.votes.take()) {
			(Some(b), Some(v)) => Some((b, v)),
			(b, v) => {
				self.body = b;
				self.votes = v;
				None
			}
		}
	}
}
