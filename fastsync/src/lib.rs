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

//! Out-of-band parallel block range synchronization.
//!
//! `BlockFetcher` requests a contiguous height range across whichever
//! peers are currently registered, reassembling responses that may
//! arrive out of order or from several peers at once, and delivers them
//! to a `FetchSink` strictly in ascending order with consumer-driven
//! backpressure. See `fetcher::BlockFetcher` for the entry point.

pub mod codec;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod peer;
pub mod reactor;
pub mod sink;
pub mod slot;

pub use config::FetcherConfig;
pub use error::{Error, ErrorKind};
pub use fetcher::{BlockFetcher, FetchHandle};
pub use peer::{PeerHandle, PeerId, PeerTransport};
pub use sink::{BlockResult, FetchSink};
