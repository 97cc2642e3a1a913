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

//! `BlockFetcher`: requests a height range over a peer multicast
//! substrate, reassembles responses, and delivers them to a `FetchSink`
//! strictly in order with consumer-driven backpressure.
//!
//! Scheduling is single-threaded cooperative: every session
//! owns one reactor thread and all of its state lives there. The only
//! cross-thread communication is the `mpsc::Sender<ReactorEvent>` other
//! threads (peer callbacks, the consumer acking a `BlockResult`, a
//! cancelling `FetchHandle`) push events through.

use std::collections::{HashMap, VecDeque};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Instant;

use log::{debug, warn};

use crate::codec::{self, proto, BlockData, BlockMetadata, BlockRequest, Readable};
use crate::config::FetcherConfig;
use crate::error::{Error, ErrorKind};
use crate::peer::{PeerArena, PeerId, PeerTransport};
use crate::reactor::ReactorEvent;
use crate::sink::{BlockResult, FetchSink};
use crate::slot::{Slot, SlotState};

/// Stops a session's future requests; the sink receives a terminal
/// `on_end(Cancelled)` promptly, within one scheduler turn.
pub struct FetchHandle {
	tx: Sender<ReactorEvent>,
}

impl FetchHandle {
	pub fn cancel(&self) {
		let _ = self.tx.send(ReactorEvent::Cancel);
	}
}

/// Tracks the set of currently connected peers and the set of active
/// fetch sessions, so peer join/leave and inbound packets can be fanned
/// out to every session (each session ignores anything that doesn't match
/// one of its own outstanding request ids).
pub struct BlockFetcher {
	peers: Arc<Mutex<HashMap<PeerId, Arc<dyn PeerTransport>>>>,
	sessions: Arc<Mutex<Vec<Sender<ReactorEvent>>>>,
	config: FetcherConfig,
}

impl BlockFetcher {
	pub fn new(config: FetcherConfig) -> Self {
		BlockFetcher {
			peers: Arc::new(Mutex::new(HashMap::new())),
			sessions: Arc::new(Mutex::new(Vec::new())),
			config,
		}
	}

	/// Registers a newly connected peer with the fetcher. Any active
	/// session picks it up on its next scheduling tick.
	pub fn peer_joined(&self, transport: Arc<dyn PeerTransport>) {
		let id = transport.id();
		self.peers.lock().unwrap().insert(id, transport.clone());
		self.broadcast(ReactorEvent::PeerJoined(transport));
	}

	/// Deregisters a disconnected peer.
	pub fn peer_left(&self, id: PeerId) {
		self.peers.lock().unwrap().remove(&id);
		self.broadcast(ReactorEvent::PeerLeft(id));
	}

	/// Feeds an inbound packet from the peer messaging layer to every
	/// active session.
	pub fn on_packet(&self, protocol: u16, payload: Vec<u8>, src: PeerId) {
		self.broadcast(ReactorEvent::Packet {
			protocol,
			payload,
			src,
		});
	}

	fn broadcast(&self, make: ReactorEvent) {
		// ReactorEvent isn't Clone (payload buffers shouldn't be copied
		// needlessly); for the two broadcastable variants we rebuild per
		// recipient instead.
		let mut sessions = self.sessions.lock().unwrap();
		sessions.retain(|tx| {
			let ev = clone_event(&make);
			tx.send(ev).is_ok()
		});
	}

	/// Begins asynchronous retrieval of `[from..to]` (inclusive). The sink
	/// receives `on_block` in strict ascending height order and exactly
	/// one terminal `on_end`.
	pub fn fetch(&self, from: i64, to: i64, sink: Box<dyn FetchSink>) -> FetchHandle {
		let (tx, rx) = mpsc::channel();
		self.sessions.lock().unwrap().push(tx.clone());

		let initial_peers: Vec<Arc<dyn PeerTransport>> =
			self.peers.lock().unwrap().values().cloned().collect();

		let config = self.config.clone();
		let handle_tx = tx.clone();
		thread::Builder::new()
			.name("fastsync-session".to_string())
			.spawn(move || {
				let mut session = Session::new(from, to, sink, config, handle_tx, initial_peers);
				session.run(rx);
			})
			.expect("failed to spawn fastsync session thread");

		FetchHandle { tx }
	}
}

fn clone_event(ev: &ReactorEvent) -> ReactorEvent {
	match ev {
		ReactorEvent::PeerJoined(t) => ReactorEvent::PeerJoined(t.clone()),
		ReactorEvent::PeerLeft(id) => ReactorEvent::PeerLeft(*id),
		ReactorEvent::Packet {
			protocol,
			payload,
			src,
		} => ReactorEvent::Packet {
			protocol: *protocol,
			payload: payload.clone(),
			src: *src,
		},
		ReactorEvent::Consumed(h) => ReactorEvent::Consumed(*h),
		ReactorEvent::Cancel => ReactorEvent::Cancel,
	}
}

/// The per-range fetch session: owns the sliding window of slots, the
/// peer arena, and the delivery cursor. Runs entirely on its own thread.
struct Session {
	from: i64,
	to: i64,
	sink: Box<dyn FetchSink>,
	config: FetcherConfig,
	self_tx: Sender<ReactorEvent>,

	peers: PeerArena,
	has_ever_had_peer: bool,
	window: VecDeque<Slot>,
	next_to_allocate: i64,
	cursor: i64,
	delivered_not_consumed: Option<i64>,
	cancelled: bool,
	ended: bool,
}

impl Session {
	fn new(
		from: i64,
		to: i64,
		sink: Box<dyn FetchSink>,
		config: FetcherConfig,
		self_tx: Sender<ReactorEvent>,
		initial_peers: Vec<Arc<dyn PeerTransport>>,
	) -> Self {
		let mut peers = PeerArena::new();
		let has_ever_had_peer = !initial_peers.is_empty();
		for p in initial_peers {
			peers.insert(p);
		}
		Session {
			from,
			to,
			sink,
			config,
			self_tx,
			peers,
			has_ever_had_peer,
			window: VecDeque::new(),
			next_to_allocate: from,
			cursor: from,
			delivered_not_consumed: None,
			cancelled: false,
			ended: false,
		}
	}

	fn run(&mut self, rx: Receiver<ReactorEvent>) {
		if self.from > self.to {
			self.finish(Some(ErrorKind::InvalidRange(self.from, self.to).into()));
			return;
		}

		self.schedule();
		self.try_deliver();

		loop {
			if self.ended {
				return;
			}

			let wait = self.next_wake();
			match rx.recv_timeout(wait) {
				Ok(ev) => self.handle_event(ev),
				Err(RecvTimeoutError::Timeout) => {}
				Err(RecvTimeoutError::Disconnected) => {
					// every sender clone (fetcher + handle) dropped: treat
					// as an implicit cancel so we don't spin forever.
					self.finish(Some(ErrorKind::Cancelled.into()));
					return;
				}
			}

			if self.cancelled {
				self.finish(Some(ErrorKind::Cancelled.into()));
				return;
			}

			self.check_timeouts();
			self.schedule();
			self.try_deliver();

			if self.cursor > self.to && self.delivered_not_consumed.is_none() {
				self.finish(None);
				return;
			}
		}
	}

	fn next_wake(&self) -> std::time::Duration {
		let now = Instant::now();
		let mut wait = self.config.tick_interval;
		for slot in &self.window {
			if let Some(deadline) = slot.deadline {
				if deadline > now {
					let remaining = deadline - now;
					if remaining < wait {
						wait = remaining;
					}
				} else {
					wait = std::time::Duration::from_millis(0);
				}
			}
		}
		wait
	}

	fn handle_event(&mut self, ev: ReactorEvent) {
		match ev {
			ReactorEvent::PeerJoined(t) => {
				self.has_ever_had_peer = true;
				self.peers.insert(t);
			}
			ReactorEvent::PeerLeft(id) => {
				if let Some(handle) = self.peers.handle_for(id) {
					for slot in self.window.iter_mut() {
						if slot.peer == Some(handle) && slot.state == SlotState::Requested {
							slot.reset();
						}
					}
				}
				self.peers.remove(id);
			}
			ReactorEvent::Packet {
				protocol,
				payload,
				src,
			} => self.handle_packet(protocol, &payload, src),
			ReactorEvent::Consumed(height) => {
				if self.delivered_not_consumed == Some(height) {
					self.delivered_not_consumed = None;
					self.window.pop_front();
					self.cursor = height + 1;
				}
			}
			ReactorEvent::Cancel => {
				self.cancelled = true;
			}
		}
	}

	fn handle_packet(&mut self, protocol: u16, payload: &[u8], src: PeerId) {
		let peer_handle = match self.peers.handle_for(src) {
			Some(h) => h,
			None => return,
		};

		let completed = match protocol {
			proto::BLOCK_METADATA => {
				let msg = match BlockMetadata::read(&mut &payload[..]) {
					Ok(m) => m,
					Err(e) => {
						debug!("discarding malformed BlockMetadata: {}", e);
						return;
					}
				};
				match self.find_slot_for_peer(peer_handle) {
					Some(slot) if !slot.is_stale_id(msg.request_id) => {
						slot.votes = Some(msg.votes);
						slot.block_length = Some(msg.block_length);
						slot.state = SlotState::Receiving;
						slot.try_complete()
					}
					Some(slot) => {
						debug!("discarding stale BlockMetadata for height {}", slot.height);
						false
					}
					None => false,
				}
			}
			proto::BLOCK_DATA => {
				let msg = match BlockData::read(&mut &payload[..]) {
					Ok(m) => m,
					Err(e) => {
						debug!("discarding malformed BlockData: {}", e);
						return;
					}
				};
				match self.find_slot_for_peer(peer_handle) {
					Some(slot) if !slot.is_stale_id(msg.request_id) => {
						slot.body = Some(msg.block_payload);
						slot.try_complete()
					}
					Some(slot) => {
						debug!("discarding stale BlockData for height {}", slot.height);
						false
					}
					None => false,
				}
			}
			_ => false,
		};
		// the peer's slot of work is done once both halves have arrived;
		// free it up for the next assignment regardless of how long the
		// consumer takes to ack delivery of the completed slot.
		if completed {
			self.peers.dec_in_flight(peer_handle);
		}
	}

	/// Looks up the slot `peer_handle` is currently serving. Because
	/// `per_peer_cap` bounds a peer to one assignment at a time in the
	/// default configuration, this is the sole correlation key: request
	/// ids are only guaranteed unique within the scope of the peer that
	/// was given them, not globally across the window.
	fn find_slot_for_peer(&mut self, peer_handle: crate::peer::PeerHandle) -> Option<&mut Slot> {
		self.window
			.iter_mut()
			.find(|s| s.peer == Some(peer_handle) && s.state != SlotState::Complete)
	}

	fn check_timeouts(&mut self) {
		let now = Instant::now();
		let cooldown = self.config.peer_cooldown;
		let mut to_blacklist = Vec::new();
		for slot in self.window.iter_mut() {
			if slot.state == SlotState::Requested || slot.state == SlotState::Receiving {
				if let Some(deadline) = slot.deadline {
					if now >= deadline {
						if let Some(peer) = slot.peer {
							to_blacklist.push(peer);
						}
						warn!(
							"slot at height {} timed out, rescheduling",
							slot.height
						);
						slot.reset();
					}
				}
			}
		}
		for peer in to_blacklist {
			self.peers.note_failure(peer, cooldown);
		}
	}

	fn schedule(&mut self) {
		// grow the window up to capacity with newly allocated slots.
		while self.window.len() < self.config.window_size && self.next_to_allocate <= self.to {
			self.window.push_back(Slot::new(self.next_to_allocate));
			self.next_to_allocate += 1;
		}

		// assign every Unassigned/Failed slot to an eligible peer.
		let per_peer_cap = self.config.per_peer_cap;
		let timeout = self.config.request_timeout;
		let mut assignments = Vec::new();
		for (i, slot) in self.window.iter().enumerate() {
			if slot.state == SlotState::Unassigned {
				assignments.push(i);
			}
		}
		for i in assignments {
			if let Some(peer) = self.peers.next_eligible(per_peer_cap) {
				let deadline = Instant::now() + timeout;
				let peer_seq = self.peers.next_request_seq(peer);
				let slot = &mut self.window[i];
				slot.assign(peer, peer_seq, deadline);
				self.peers.inc_in_flight(peer);
				if let Some(transport) = self.peers.get_transport(peer) {
					let req = BlockRequest {
						request_id: slot.request_id(),
						height: slot.height,
					};
					if transport
						.unicast(proto::BLOCK_REQUEST, codec::ser_vec(&req))
						.is_err()
					{
						slot.reset();
						self.peers.note_failure(peer, self.config.peer_cooldown);
					}
				}
			}
		}

		// a currently-empty arena is only a permanent dead end if no peer
		// has ever joined this session: a peer dropping mid-fetch also
		// empties the arena for the one scheduling pass before its
		// replacement's PeerJoined is processed, and that transient gap
		// must not be mistaken for an unservable range.
		if !self.has_ever_had_peer && self.peers.is_empty() {
			let work_remains = self.next_to_allocate <= self.to
				|| self
					.window
					.iter()
					.any(|s| s.state != SlotState::Complete);
			if work_remains {
				self.finish(Some(ErrorKind::NoPeers.into()));
			}
		}
	}

	fn try_deliver(&mut self) {
		if self.ended {
			return;
		}
		while self.delivered_not_consumed.is_none() {
			let complete = self
				.window
				.front()
				.map(|s| s.state == SlotState::Complete)
				.unwrap_or(false);
			if !complete {
				break;
			}
			let slot = self.window.front_mut().unwrap();
			let height = slot.height;
			if let Some((body, votes)) = slot.take_result() {
				self.delivered_not_consumed = Some(height);
				let result = BlockResult::new(height, body, votes, self.self_tx.clone());
				self.sink.on_block(result);
			} else {
				break;
			}
		}
	}

	fn finish(&mut self, err: Option<Error>) {
		if self.ended {
			return;
		}
		self.ended = true;
		self.sink.on_end(err);
	}
}
