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

//! Single-threaded, blocking-per-transaction execution.

use std::sync::Arc;

use log::{trace, warn};

use crate::config::{ExecutorConfig, StepFlag};
use crate::context::WorldContext;
use crate::error::{Error, ErrorKind};
use crate::handler::{Receipt, Transaction, TransactionInfo};

/// Executes `txs` against `ctx` in input order, writing one receipt per
/// transaction into `receipts_out`. On success every slot is filled; on
/// failure the contents of `receipts_out` are unspecified and the first
/// fatal error is returned.
pub fn execute_sequential(
	txs: &[Arc<dyn Transaction>],
	ctx: &dyn WorldContext,
	receipts_out: &mut [Option<Receipt>],
	config: &ExecutorConfig,
	cancel: &StepFlag,
) -> Result<(), Error> {
	assert_eq!(txs.len(), receipts_out.len());

	let skipping = ctx.skip_transaction_enabled();
	for (index, tx) in txs.iter().enumerate() {
		if cancel.is_cancelled() {
			return Err(ErrorKind::Interrupted.into());
		}

		if skipping && tx.is_skippable() {
			trace!("skip tx {:x?}", tx.hash());
			receipts_out[index] = Some(Receipt::skipped());
			continue;
		}

		trace!("start tx {:x?}", tx.hash());
		let mut attempt: u32 = 0;
		loop {
			let mut handler = tx
				.get_handler()
				.map_err(|e| ErrorKind::Handler(e.to_string()))?;
			ctx.set_transaction_info(TransactionInfo {
				group: tx.group(),
				index: index as i32,
				timestamp: tx.timestamp(),
				nonce: tx.nonce(),
				hash: tx.hash(),
				sender: tx.sender(),
			});
			let outcome = handler.execute(ctx, false);
			handler.dispose();

			match outcome {
				Ok(receipt) => {
					receipts_out[index] = Some(receipt);
					break;
				}
				Err(e) => {
					if !e.is_transient() {
						warn!("fail to execute tx {:x?}: {}", tx.hash(), e);
						return Err(e);
					}
					if attempt == config.retry_count {
						warn!(
							"fail to execute tx {:x?} after {} retries: {}",
							tx.hash(),
							attempt,
							e
						);
						return Err(e);
					}
					warn!("retry tx {:x?} for {}", tx.hash(), e);
					attempt += 1;
				}
			}
		}
	}
	Ok(())
}
