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

//! The single event type driving a session's reactor thread. All state
//! mutation for a session happens only on that thread, in response to one
//! of these; there are no other locks on a session's slot table.

use std::sync::Arc;

use crate::peer::{PeerId, PeerTransport};

pub enum ReactorEvent {
	PeerJoined(Arc<dyn PeerTransport>),
	PeerLeft(PeerId),
	Packet {
		protocol: u16,
		payload: Vec<u8>,
		src: PeerId,
	},
	/// The consumer finished with the block at this height.
	Consumed(i64),
	Cancel,
}
