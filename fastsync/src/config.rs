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

//! Tuning knobs for `BlockFetcher`, passed explicitly rather than read
//! from process-wide constants.

use std::time::Duration;

#[derive(Clone, Debug)]
pub struct FetcherConfig {
	/// Size of the sliding window of active slots. Also the high-water
	/// mark: new requests stop being issued once this many slots are
	/// outstanding or completed-but-undelivered.
	pub window_size: usize,
	/// Maximum in-flight requests per peer. Defaults to one, so each
	/// peer serves one slot at a time.
	pub per_peer_cap: usize,
	/// How long a `Requested` slot waits before its deadline expires.
	pub request_timeout: Duration,
	/// Cooldown a peer sits out after a timeout or bad message before it
	/// becomes eligible for scheduling again.
	pub peer_cooldown: Duration,
	/// Reactor poll granularity: how often the session loop wakes up on
	/// its own to check slot deadlines even with no inbound event.
	pub tick_interval: Duration,
}

impl Default for FetcherConfig {
	fn default() -> Self {
		FetcherConfig {
			window_size: 32,
			per_peer_cap: 1,
			request_timeout: Duration::from_secs(8),
			peer_cooldown: Duration::from_secs(5),
			tick_interval: Duration::from_millis(200),
		}
	}
}
