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

//! Error taxonomy for `execute_sequential`/`execute_concurrent`. Only
//! `ExecutionFail { transient: true }` is retryable; everything else
//! aborts the whole transition immediately.

use std::fmt::{self, Display};
use failure::{Backtrace, Context, Fail};

#[derive(Debug)]
pub struct Error {
	inner: Context<ErrorKind>,
}

#[derive(Clone, Eq, PartialEq, Debug, Fail)]
pub enum ErrorKind {
	/// Cooperative cancellation was observed at an iteration or task-spawn
	/// boundary.
	#[fail(display = "transition interrupted")]
	Interrupted,
	/// A transaction handler reported a fault. `transient` classifies
	/// whether it is eligible for retry (e.g. a concurrency conflict on
	/// world state) or is a permanent failure of the transaction itself.
	#[fail(display = "execution failed (transient={})", transient)]
	ExecutionFail { transient: bool },
	/// The handler or world context was used in a way that violates its
	/// preconditions.
	#[fail(display = "precondition violated: {}", _0)]
	Precondition(String),
	/// Obtaining or preparing a transaction handler failed.
	#[fail(display = "handler error: {}", _0)]
	Handler(String),
}

impl ErrorKind {
	/// Whether this error is eligible for the executor's retry loop.
	pub fn is_transient(&self) -> bool {
		matches!(self, ErrorKind::ExecutionFail { transient: true })
	}
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
	pub fn kind(&self) -> ErrorKind {
		self.inner.get_context().clone()
	}

	pub fn is_transient(&self) -> bool {
		self.kind().is_transient()
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
