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

//! End-to-end coverage for `BlockFetcher` against an in-memory mock peer
//! transport standing in for the real p2p substrate.

use std::collections::HashMap;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use glacier_fastsync::codec::{self, proto, BlockData, BlockMetadata, BlockRequest, Readable};
use glacier_fastsync::{
	BlockFetcher, BlockResult, Error, FetchSink, FetcherConfig, PeerId, PeerTransport,
};

/// A single request observed by the harness: which peer it was sent to,
/// and its full decoded body.
#[derive(Clone, Debug)]
struct SeenRequest {
	peer: PeerId,
	req: BlockRequest,
}

struct MockPeer {
	id: PeerId,
	req_tx: Sender<SeenRequest>,
}

impl PeerTransport for MockPeer {
	fn id(&self) -> PeerId {
		self.id
	}

	fn unicast(&self, protocol: u16, payload: Vec<u8>) -> Result<(), String> {
		assert_eq!(protocol, proto::BLOCK_REQUEST);
		let req = BlockRequest::read(&mut &payload[..]).expect("well-formed BlockRequest");
		self.req_tx
			.send(SeenRequest { peer: self.id, req })
			.map_err(|e| e.to_string())
	}

	fn disconnect(&self) {}
}

/// Captures `on_block`/`on_end` callbacks for inspection from the test
/// thread. Held as an `Arc` shared between the sink handed to `fetch` (via
/// a thin forwarding wrapper, since `fetch` needs ownership) and the test.
struct CollectingSink {
	blocks: Mutex<Vec<(i64, Vec<u8>)>>,
	ended: Mutex<Option<Option<String>>>,
	done_tx: Sender<()>,
}

impl CollectingSink {
	fn new(done_tx: Sender<()>) -> Arc<CollectingSink> {
		Arc::new(CollectingSink {
			blocks: Mutex::new(Vec::new()),
			ended: Mutex::new(None),
			done_tx,
		})
	}

	fn record_block(&self, result: BlockResult) {
		self.blocks
			.lock()
			.unwrap()
			.push((result.height(), result.block().to_vec()));
		result.consume();
	}

	fn record_end(&self, err: Option<Error>) {
		*self.ended.lock().unwrap() = Some(err.map(|e| e.to_string()));
		let _ = self.done_tx.send(());
	}
}

/// Forwards to a shared `CollectingSink` so the test thread can keep its
/// own handle after `Box<dyn FetchSink>` ownership moves into the session.
struct SinkHandle(Arc<CollectingSink>);

impl FetchSink for SinkHandle {
	fn on_block(&self, result: BlockResult) {
		self.0.record_block(result);
	}

	fn on_end(&self, err: Option<Error>) {
		self.0.record_end(err);
	}
}

fn block_body(height: i64) -> Vec<u8> {
	vec![height as u8; 4]
}

/// Pushes a full metadata+data response pair for `req` as if it came from
/// `src`, through the fetcher's public packet-ingestion entrypoint.
fn deliver_response(fetcher: &BlockFetcher, src: PeerId, req: &BlockRequest) {
	let meta = BlockMetadata {
		request_id: req.request_id,
		block_length: 4,
		votes: vec![0xAA],
	};
	fetcher.on_packet(proto::BLOCK_METADATA, codec::ser_vec(&meta), src);

	let data = BlockData {
		request_id: req.request_id,
		block_payload: block_body(req.height),
	};
	fetcher.on_packet(proto::BLOCK_DATA, codec::ser_vec(&data), src);
}

fn recv_request(rx: &Receiver<SeenRequest>) -> SeenRequest {
	rx.recv_timeout(Duration::from_secs(2))
		.expect("expected a BlockRequest to be sent")
}

#[test]
fn single_peer_delivers_full_range_in_order() {
	let _ = env_logger::try_init();
	let (req_tx, req_rx) = channel();
	let fetcher = BlockFetcher::new(FetcherConfig {
		window_size: 4,
		..FetcherConfig::default()
	});

	let peer_a = PeerId(1);
	fetcher.peer_joined(Arc::new(MockPeer {
		id: peer_a,
		req_tx: req_tx.clone(),
	}));

	let (done_tx, done_rx) = channel();
	let sink = CollectingSink::new(done_tx);
	let _handle = fetcher.fetch(10, 13, Box::new(SinkHandle(sink.clone())));

	for h in 10..=13 {
		let seen = recv_request(&req_rx);
		assert_eq!(seen.peer, peer_a);
		assert_eq!(seen.req.height, h);
		deliver_response(&fetcher, peer_a, &seen.req);
	}

	done_rx
		.recv_timeout(Duration::from_secs(2))
		.expect("session should finish");
	let blocks = sink.blocks.lock().unwrap();
	assert_eq!(blocks.len(), 4);
	for (i, (height, body)) in blocks.iter().enumerate() {
		assert_eq!(*height, 10 + i as i64);
		assert_eq!(*body, block_body(*height));
	}
	assert_eq!(*sink.ended.lock().unwrap(), Some(None));
}

#[test]
fn two_peers_each_get_a_distinct_first_request_id() {
	let _ = env_logger::try_init();
	// two different peers, each serving their first assigned slot, are
	// handed request id 0x10000 -- it is only unique within a peer's own
	// scope, not globally.
	let (req_tx, req_rx) = channel();
	let fetcher = BlockFetcher::new(FetcherConfig {
		window_size: 8,
		per_peer_cap: 1,
		..FetcherConfig::default()
	});

	let peer_b = PeerId(2);
	let peer_c = PeerId(3);
	fetcher.peer_joined(Arc::new(MockPeer {
		id: peer_b,
		req_tx: req_tx.clone(),
	}));
	fetcher.peer_joined(Arc::new(MockPeer {
		id: peer_c,
		req_tx: req_tx.clone(),
	}));

	let (done_tx, _done_rx) = channel();
	let sink = CollectingSink::new(done_tx);
	let _handle = fetcher.fetch(1, 2, Box::new(SinkHandle(sink)));

	let mut by_peer: HashMap<PeerId, SeenRequest> = HashMap::new();
	for _ in 0..2 {
		let seen = recv_request(&req_rx);
		by_peer.insert(seen.peer, seen);
	}

	assert_eq!(by_peer[&peer_b].req.request_id, 0x10000);
	assert_eq!(by_peer[&peer_c].req.request_id, 0x10000);
}

#[test]
fn dropped_peer_reassigns_its_in_flight_slot() {
	let _ = env_logger::try_init();
	let (req_tx, req_rx) = channel();
	let fetcher = BlockFetcher::new(FetcherConfig {
		window_size: 2,
		per_peer_cap: 2,
		..FetcherConfig::default()
	});

	let peer_a = PeerId(1);
	fetcher.peer_joined(Arc::new(MockPeer {
		id: peer_a,
		req_tx: req_tx.clone(),
	}));

	let (done_tx, done_rx) = channel();
	let sink = CollectingSink::new(done_tx);
	let _handle = fetcher.fetch(5, 6, Box::new(SinkHandle(sink.clone())));

	let _first = recv_request(&req_rx);
	let _second = recv_request(&req_rx);

	// peer_a vanishes before answering either request.
	fetcher.peer_left(peer_a);

	let peer_d = PeerId(4);
	fetcher.peer_joined(Arc::new(MockPeer {
		id: peer_d,
		req_tx: req_tx.clone(),
	}));

	for _ in 0..2 {
		let seen = recv_request(&req_rx);
		assert_eq!(seen.peer, peer_d);
		deliver_response(&fetcher, peer_d, &seen.req);
	}

	done_rx
		.recv_timeout(Duration::from_secs(2))
		.expect("session should finish");
	assert_eq!(sink.blocks.lock().unwrap().len(), 2);
}

#[test]
fn metadata_without_body_times_out_and_reschedules() {
	let _ = env_logger::try_init();
	let (req_tx, req_rx) = channel();
	let fetcher = BlockFetcher::new(FetcherConfig {
		window_size: 1,
		per_peer_cap: 1,
		request_timeout: Duration::from_millis(50),
		peer_cooldown: Duration::from_millis(10),
		tick_interval: Duration::from_millis(10),
		..FetcherConfig::default()
	});

	let peer_a = PeerId(1);
	fetcher.peer_joined(Arc::new(MockPeer {
		id: peer_a,
		req_tx: req_tx.clone(),
	}));

	let (done_tx, done_rx) = channel();
	let sink = CollectingSink::new(done_tx);
	let _handle = fetcher.fetch(7, 7, Box::new(SinkHandle(sink.clone())));

	let first = recv_request(&req_rx);
	assert_eq!(first.peer, peer_a);

	// only the metadata half arrives; the body never does.
	let meta = BlockMetadata {
		request_id: first.req.request_id,
		block_length: 4,
		votes: vec![0xAA],
	};
	fetcher.on_packet(proto::BLOCK_METADATA, codec::ser_vec(&meta), peer_a);

	// peer_a sits out its cooldown after the slot times out; a second peer
	// is the one that ends up serving the retried request.
	let peer_e = PeerId(5);
	fetcher.peer_joined(Arc::new(MockPeer {
		id: peer_e,
		req_tx: req_tx.clone(),
	}));

	let retried = recv_request(&req_rx);
	assert_eq!(retried.peer, peer_e);
	assert_eq!(retried.req.height, 7);
	assert_ne!(retried.req.request_id, first.req.request_id);
	deliver_response(&fetcher, peer_e, &retried.req);

	done_rx
		.recv_timeout(Duration::from_secs(2))
		.expect("session should finish");
	let blocks = sink.blocks.lock().unwrap();
	assert_eq!(blocks.len(), 1);
	assert_eq!(blocks[0].0, 7);
}

#[test]
fn cancel_ends_session_promptly_without_delivering() {
	let _ = env_logger::try_init();
	let (req_tx, req_rx) = channel();
	let fetcher = BlockFetcher::new(FetcherConfig::default());

	let peer_a = PeerId(1);
	fetcher.peer_joined(Arc::new(MockPeer {
		id: peer_a,
		req_tx: req_tx.clone(),
	}));

	let (done_tx, done_rx) = channel();
	let sink = CollectingSink::new(done_tx);
	let handle = fetcher.fetch(100, 105, Box::new(SinkHandle(sink.clone())));

	let _first = recv_request(&req_rx);
	handle.cancel();

	done_rx
		.recv_timeout(Duration::from_secs(2))
		.expect("session should finish");
	assert!(sink.blocks.lock().unwrap().is_empty());
	let ended = sink.ended.lock().unwrap();
	assert!(ended.as_ref().unwrap().as_ref().unwrap().contains("cancelled"));
}

#[test]
fn no_peers_ever_registered_fails_fast() {
	let _ = env_logger::try_init();
	let fetcher = BlockFetcher::new(FetcherConfig::default());

	let (done_tx, done_rx) = channel();
	let sink = CollectingSink::new(done_tx);
	let _handle = fetcher.fetch(1, 1, Box::new(SinkHandle(sink.clone())));

	done_rx
		.recv_timeout(Duration::from_secs(2))
		.expect("session should finish");
	let ended = sink.ended.lock().unwrap();
	assert!(ended.as_ref().unwrap().as_ref().unwrap().contains("no peers"));
}

#[test]
fn inverted_range_is_rejected_immediately() {
	let _ = env_logger::try_init();
	let fetcher = BlockFetcher::new(FetcherConfig::default());

	let (done_tx, done_rx) = channel();
	let sink = CollectingSink::new(done_tx);
	let _handle = fetcher.fetch(10, 5, Box::new(SinkHandle(sink.clone())));

	done_rx
		.recv_timeout(Duration::from_secs(2))
		.expect("session should finish");
	let ended = sink.ended.lock().unwrap();
	assert!(ended
		.as_ref()
		.unwrap()
		.as_ref()
		.unwrap()
		.contains("invalid range"));
}
