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

//! Wire codec for the three fastsync messages. Follows the same
//! length-delimited, big-endian, list-of-fields scheme as
//! `core::ser`: fixed-width integers, byte strings prefixed by a `u32`
//! length. Kept local to this crate rather than reusing `core::ser`'s
//! `Writeable`/`Readable` so the fetcher has no dependency on chain types.

use std::io::{self, Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

/// Protocol identifiers for the three message kinds. Opaque and stable
/// across peers, as required by the wire contract.
pub mod proto {
	pub const BLOCK_REQUEST: u16 = 0xb001;
	pub const BLOCK_METADATA: u16 = 0xb002;
	pub const BLOCK_DATA: u16 = 0xb003;
}

/// Anything that can be written to the wire in the fetcher's codec.
pub trait Writeable {
	fn write<W: Write>(&self, w: &mut W) -> io::Result<()>;
}

/// Anything that can be read back off the wire.
pub trait Readable: Sized {
	fn read<R: Read>(r: &mut R) -> io::Result<Self>;
}

fn write_bytes<W: Write>(w: &mut W, b: &[u8]) -> io::Result<()> {
	w.write_u32::<BigEndian>(b.len() as u32)?;
	w.write_all(b)
}

fn read_bytes<R: Read>(r: &mut R) -> io::Result<Vec<u8>> {
	let len = r.read_u32::<BigEndian>()? as usize;
	// a lone peer should never be able to make us allocate unbounded
	// memory for a claimed length.
	if len > 64_000_000 {
		return Err(io::Error::new(
			io::ErrorKind::InvalidData,
			format!("claimed length too large: {}", len),
		));
	}
	let mut buf = vec![0u8; len];
	r.read_exact(&mut buf)?;
	Ok(buf)
}

/// `→ peer`: ask for a single block by height, tagged with a request id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockRequest {
	pub request_id: u32,
	pub height: i64,
}

impl Writeable for BlockRequest {
	fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
		w.write_u32::<BigEndian>(self.request_id)?;
		w.write_i64::<BigEndian>(self.height)
	}
}

impl Readable for BlockRequest {
	fn read<R: Read>(r: &mut R) -> io::Result<Self> {
		let request_id = r.read_u32::<BigEndian>()?;
		let height = r.read_i64::<BigEndian>()?;
		Ok(BlockRequest { request_id, height })
	}
}

/// `← peer`: announces the block's encoded length and carries the vote
/// set. Arrives before `BlockData`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockMetadata {
	pub request_id: u32,
	pub block_length: i32,
	pub votes: Vec<u8>,
}

impl Writeable for BlockMetadata {
	fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
		w.write_u32::<BigEndian>(self.request_id)?;
		w.write_i32::<BigEndian>(self.block_length)?;
		write_bytes(w, &self.votes)
	}
}

impl Readable for BlockMetadata {
	fn read<R: Read>(r: &mut R) -> io::Result<Self> {
		let request_id = r.read_u32::<BigEndian>()?;
		let block_length = r.read_i32::<BigEndian>()?;
		let votes = read_bytes(r)?;
		Ok(BlockMetadata {
			request_id,
			block_length,
			votes,
		})
	}
}

/// `← peer`: the block's raw payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockData {
	pub request_id: u32,
	pub block_payload: Vec<u8>,
}

impl Writeable for BlockData {
	fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
		w.write_u32::<BigEndian>(self.request_id)?;
		write_bytes(w, &self.block_payload)
	}
}

impl Readable for BlockData {
	fn read<R: Read>(r: &mut R) -> io::Result<Self> {
		let request_id = r.read_u32::<BigEndian>()?;
		let block_payload = read_bytes(r)?;
		Ok(BlockData {
			request_id,
			block_payload,
		})
	}
}

/// Serializes a `Writeable` into a freshly allocated buffer.
pub fn ser_vec<T: Writeable>(msg: &T) -> Vec<u8> {
	let mut buf = Vec::new();
	// writing into a Vec<u8> cannot fail.
	msg.write(&mut buf).expect("write to Vec<u8> is infallible");
	buf
}

/// Forms the wire request id from a slot's retry generation and the
/// serving peer's per-peer sequence number, per the
/// `(generation << 16) | peer_seq` layout required for interop.
pub fn make_request_id(generation: u16, peer_seq: u16) -> u32 {
	((generation as u32) << 16) | (peer_seq as u32)
}
