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

//! Peer identity, transport abstraction, and the peer arena.
//!
//! Slots and peers reference each other by stable index with a
//! generation counter rather than through a cyclic
//! `Rc`/`RefCell` relation, so a peer that churns (disconnects and maybe
//! reconnects under a new arena slot) can never be confused with a slot's
//! stale reference to it.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

/// Opaque peer identity, stable for the lifetime of a connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeerId(pub u64);

/// What the fetcher needs from the surrounding peer messaging layer. A
/// real node supplies an adapter over `p2p::Peers`; tests supply an
/// in-memory mock (see `tests/fetch.rs`).
pub trait PeerTransport: Send + Sync {
	/// Identity of the remote peer behind this handle.
	fn id(&self) -> PeerId;

	/// Send a single unicast message of the given protocol to this peer.
	fn unicast(&self, protocol: u16, payload: Vec<u8>) -> Result<(), String>;

	/// Drop the connection; used when a peer has misbehaved (bad message,
	/// e.g. undecodable payload).
	fn disconnect(&self);
}

/// Stable handle into the peer arena: an index plus the generation it
/// was allocated with. A handle whose generation no longer matches the
/// arena slot's current generation refers to a peer that has since left
/// and been replaced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PeerHandle {
	pub(crate) index: usize,
	pub(crate) generation: u32,
}

struct Entry {
	generation: u32,
	occupied: bool,
	transport: Option<Arc<dyn PeerTransport>>,
	id: PeerId,
	in_flight: usize,
	last_failure: Option<Instant>,
	blacklisted_until: Option<Instant>,
	/// Monotonic counter of assignments handed to this peer, used as the
	/// low word of the wire request id (see `slot::Slot`).
	request_seq: u16,
}

/// Arena of currently known peers plus the per-peer scheduling state the
/// fetcher tracks: in-flight slot count, last failure time, and a
/// blacklist flag cleared after a cooldown.
pub struct PeerArena {
	entries: Vec<Entry>,
	by_id: HashMap<PeerId, usize>,
	round_robin_cursor: usize,
}

impl PeerArena {
	pub fn new() -> Self {
		PeerArena {
			entries: Vec::new(),
			by_id: HashMap::new(),
			round_robin_cursor: 0,
		}
	}

	/// Registers a newly connected peer, returning its handle. Reuses a
	/// freed arena slot when available.
	pub fn insert(&mut self, transport: Arc<dyn PeerTransport>) -> PeerHandle {
		let id = transport.id();
		if let Some(&idx) = self.by_id.get(&id) {
			// reconnection under the same id: bump generation, fresh state.
			let e = &mut self.entries[idx];
			e.generation += 1;
			e.occupied = true;
			e.transport = Some(transport);
			e.in_flight = 0;
			e.last_failure = None;
			e.blacklisted_until = None;
			e.request_seq = 0;
			return PeerHandle {
				index: idx,
				generation: e.generation,
			};
		}
		let idx = self.entries.len();
		self.entries.push(Entry {
			generation: 0,
			occupied: true,
			transport: Some(transport),
			id,
			in_flight: 0,
			last_failure: None,
			blacklisted_until: None,
			request_seq: 0,
		});
		self.by_id.insert(id, idx);
		PeerHandle {
			index: idx,
			generation: 0,
		}
	}

	/// Marks a peer as gone. Any `PeerHandle` referring to its old
	/// generation becomes dangling and `get`/`get_mut` will reject it.
	pub fn remove(&mut self, id: PeerId) -> Option<PeerHandle> {
		let idx = *self.by_id.get(&id)?;
		let e = &mut self.entries[idx];
		if !e.occupied {
			return None;
		}
		let handle = PeerHandle {
			index: idx,
			generation: e.generation,
		};
		e.occupied = false;
		e.transport = None;
		e.generation += 1;
		Some(handle)
	}

	pub fn get_transport(&self, h: PeerHandle) -> Option<Arc<dyn PeerTransport>> {
		let e = self.entries.get(h.index)?;
		if e.occupied && e.generation == h.generation {
			e.transport.clone()
		} else {
			None
		}
	}

	pub fn handle_for(&self, id: PeerId) -> Option<PeerHandle> {
		let idx = *self.by_id.get(&id)?;
		let e = &self.entries[idx];
		if e.occupied {
			Some(PeerHandle {
				index: idx,
				generation: e.generation,
			})
		} else {
			None
		}
	}

	fn is_valid(&self, h: PeerHandle) -> bool {
		self.entries
			.get(h.index)
			.map(|e| e.occupied && e.generation == h.generation)
			.unwrap_or(false)
	}

	pub fn note_failure(&mut self, h: PeerHandle, cooldown: std::time::Duration) {
		if !self.is_valid(h) {
			return;
		}
		let e = &mut self.entries[h.index];
		let now = Instant::now();
		e.last_failure = Some(now);
		e.blacklisted_until = Some(now + cooldown);
		e.in_flight = e.in_flight.saturating_sub(1);
	}

	/// Hands out the next request sequence number for this peer, for use
	/// as the low word of a freshly assigned slot's request id.
	pub fn next_request_seq(&mut self, h: PeerHandle) -> u16 {
		if !self.is_valid(h) {
			return 0;
		}
		let e = &mut self.entries[h.index];
		let seq = e.request_seq;
		e.request_seq = e.request_seq.wrapping_add(1);
		seq
	}

	pub fn inc_in_flight(&mut self, h: PeerHandle) {
		if self.is_valid(h) {
			self.entries[h.index].in_flight += 1;
		}
	}

	pub fn dec_in_flight(&mut self, h: PeerHandle) {
		if self.is_valid(h) {
			let e = &mut self.entries[h.index];
			e.in_flight = e.in_flight.saturating_sub(1);
		}
	}

	fn is_eligible(&self, idx: usize, per_peer_cap: usize, now: Instant) -> bool {
		let e = &self.entries[idx];
		if !e.occupied || e.transport.is_none() {
			return false;
		}
		if let Some(until) = e.blacklisted_until {
			if now < until {
				return false;
			}
		}
		e.in_flight < per_peer_cap
	}

	/// Picks the next eligible peer in round-robin order, to spread load
	/// evenly across peers.
	pub fn next_eligible(&mut self, per_peer_cap: usize) -> Option<PeerHandle> {
		let n = self.entries.len();
		if n == 0 {
			return None;
		}
		let now = Instant::now();
		for i in 0..n {
			let idx = (self.round_robin_cursor + i) % n;
			if self.is_eligible(idx, per_peer_cap, now) {
				self.round_robin_cursor = (idx + 1) % n;
				let e = &self.entries[idx];
				return Some(PeerHandle {
					index: idx,
					generation: e.generation,
				});
			}
		}
		None
	}

	/// True when no peer is currently registered. This is transient by
	/// nature -- a peer can leave and a replacement join moments later --
	/// so callers deciding whether a range is permanently unservable need
	/// more than a single snapshot of this.
	pub fn is_empty(&self) -> bool {
		self.entries.iter().all(|e| !e.occupied)
	}
}
