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

//! Error types surfaced by the fetcher. Per-peer faults (bad message,
//! timeout) never reach here directly -- only the terminal outcome of a
//! whole range fetch does.

use std::fmt::{self, Display};
use failure::{Backtrace, Context, Fail};

/// Error definition, wrapping an `ErrorKind` with a backtrace.
#[derive(Debug)]
pub struct Error {
	inner: Context<ErrorKind>,
}

/// The terminal outcomes a `FetchHandle` session can end with.
#[derive(Clone, Eq, PartialEq, Debug, Fail)]
pub enum ErrorKind {
	/// No eligible peer exists to service the remaining range and none
	/// can ever appear again (range is permanently unservable).
	#[fail(display = "no peers available to service block range")]
	NoPeers,
	/// The fetch was cancelled via `FetchHandle::cancel`.
	#[fail(display = "fetch cancelled")]
	Cancelled,
	/// A response failed to decode under the wire codec.
	#[fail(display = "invalid message: {}", _0)]
	InvalidMessage(String),
	/// Requested range is empty or inverted.
	#[fail(display = "invalid range [{}..{}]", _0, _1)]
	InvalidRange(i64, i64),
}

impl Fail for Error {
	fn cause(&self) -> Option<&dyn Fail> {
		self.inner.cause()
	}

	fn backtrace(&self) -> Option<&Backtrace> {
		self.inner.backtrace()
	}
}

impl Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		Display::fmt(&self.inner, f)
	}
}

impl Error {
	/// The kind of this error, for matching without consuming it.
	pub fn kind(&self) -> ErrorKind {
		self.inner.get_context().clone()
	}
}

impl From<ErrorKind> for Error {
	fn from(kind: ErrorKind) -> Error {
		Error {
			inner: Context::new(kind),
		}
	}
}

impl From<Context<ErrorKind>> for Error {
	fn from(inner: Context<ErrorKind>) -> Error {
		Error { inner }
	}
}
