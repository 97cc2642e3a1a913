// Copyright 2017 The Grin Developers
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

//! Top-level Pool type, methods, and tests

use types::*;
pub use graph;

use core::core::transaction;
use core::core::block;
use core::core::hash;
use core::global;

use util::secp::pedersen::Commitment;

use std::sync::Arc;
use std::collections::{HashMap, HashSet};

/// The pool itself.
/// The transactions HashMap holds ownership of all transactions in the pool,
/// keyed by their transaction hash.
pub struct TransactionPool<T> {
	config: PoolConfig,
	/// All transactions in the pool
	pub transactions: HashMap<hash::Hash, Box<transaction::Transaction>>,
	/// The pool itself
	pub pool: Pool,
	/// Orphans in the pool
	pub orphans: Orphans,

	// blockchain is a DummyChain, for now, which mimics what the future
	// chain will offer to the pool
	blockchain: Arc<T>,
	adapter: Arc<PoolAdapter>,
}

impl<T> TransactionPool<T>
where
	T: BlockChain,
{
	/// Create a new transaction pool
	pub fn new(config: PoolConfig, chain: Arc<T>, adapter: Arc<PoolAdapter>) -> TransactionPool<T> {
		TransactionPool {
			config: config,
			transactions: HashMap::new(),
			pool: Pool::empty(),
			orphans: Orphans::empty(),
			blockchain: chain,
			adapter: adapter,
		}
	}

	/// Searches for an output, designated by its commitment, from the current
	/// best UTXO view, presented by taking the best blockchain UTXO set (as
	/// determined by the blockchain component) and rectifying pool spent and
	/// unspents.
	/// Detects double spends and unknown references from the pool and
	/// blockchain only; any conflicts with entries in the orphans set must
	/// be accounted for separately, if relevant.
	pub fn search_for_best_output(&self, output_commitment: &Commitment) -> Parent {
		// The current best unspent set is:
  //   Pool unspent + (blockchain unspent - pool->blockchain spent)
  // Pool unspents are unconditional so we check those first
		self.pool
			.get_available_output(output_commitment)
			.map(|x| {
				Parent::PoolTransaction {
					tx_ref: x.source_hash().unwrap(),
				}
			})
			.or(self.search_blockchain_unspents(output_commitment))
			.or(self.search_pool_spents(output_commitment))
			.unwrap_or(Parent::Unknown)
	}

	// search_blockchain_unspents searches the current view of the blockchain
 // unspent set, represented by blockchain unspents - pool spents, for an
 // output designated by output_commitment.
	fn search_blockchain_unspents(&self, output_commitment: &Commitment) -> Option<Parent> {
		self.blockchain
			.get_unspent(output_commitment)
			.ok()
			.map(|output| {
				match self.pool.get_blockchain_spent(output_commitment) {
					Some(x) => Parent::AlreadySpent {
						other_tx: x.destination_hash().unwrap(),
					},
					None => Parent::BlockTransaction { output },
				}
			})
	}

	// search_pool_spents is the second half of pool input detection, after the
 // available_outputs have been checked. This returns either a
 // Parent::AlreadySpent or None.
	fn search_pool_spents(&self, output_commitment: &Commitment) -> Option<Parent> {
		self.pool.get_internal_spent(output_commitment).map(|x| {
			Parent::AlreadySpent {
				other_tx: x.destination_hash().unwrap(),
			}
		})
	}

	/// Get the number of transactions in the pool
	pub fn pool_size(&self) -> usize {
		self.pool.num_transactions()
	}

	/// Get the number of orphans in the pool
	pub fn orphans_size(&self) -> usize {
		self.orphans.num_transactions()
	}

	/// Get the total size (transactions + orphans) of the pool
	pub fn total_size(&self) -> usize {
		self.pool.num_transactions() + self.orphans.num_transactions()
	}

	/// Attempts to add a transaction to the pool.
	///
	/// Adds a transaction to the memory pool, deferring to the orphans pool
	/// if necessary, and performing any connection-related validity checks.
	/// Happens under an exclusive mutable reference gated by the write portion
	/// of a RWLock.
	pub fn add_to_memory_pool(
		&mut self,
		_: TxSource,
		tx: transaction::Transaction,
	) -> Result<(), PoolError> {
		// Do we have the capacity to accept this transaction?
		if let Err(e) = self.is_acceptable(&tx) {
			return Err(e);
		}

		// Making sure the transaction is valid before anything else.
		tx.validate().map_err(|_e| PoolError::Invalid)?;

		// The first check involves ensuring that an identical transaction is
  // not already in the pool's transaction set.
  // A non-authoritative similar check should be performed under the
  // pool's read lock before we get to this point, which would catch the
  // majority of duplicate cases. The race condition is caught here.
  // TODO: When the transaction identifier is finalized, the assumptions
  // here may change depending on the exact coverage of the identifier.
  // The current tx.hash() method, for example, does not cover changes
  // to fees or other elements of the signature preimage.
		let tx_hash = graph::transaction_identifier(&tx);
		if self.transactions.contains_key(&tx_hash) {
			return Err(PoolError::AlreadyInPool);
		}

		let head_header = self.blockchain.head_header()?;
		if head_header.height < tx.lock_height {
			return Err(PoolError::ImmatureTransaction {
				lock_height: tx.lock_height,
			});
		}

		// The next issue is to identify all unspent outputs that
  // this transaction will consume and make sure they exist in the set.
		let mut pool_refs: Vec<graph::Edge> = Vec::new();
		let mut orphan_refs: Vec<graph::Edge> = Vec::new();
		let mut blockchain_refs: Vec<graph::Edge> = Vec::new();

		for input in &tx.inputs {
			let base = graph::Edge::new(None, Some(tx_hash), input.commitment());

			// Note that search_for_best_output does not examine orphans, by
   // design. If an incoming transaction consumes pool outputs already
   // spent by the orphans set, this does not preclude its inclusion
   // into the pool.
			match self.search_for_best_output(&input.commitment()) {
				Parent::PoolTransaction { tx_ref: x } => pool_refs.push(base.with_source(Some(x))),
				Parent::BlockTransaction { output } => {
					// TODO - pull this out into a separate function?
					if output.features.contains(transaction::COINBASE_OUTPUT) {
						if let Ok(out_header) = self.blockchain
							.get_block_header_by_output_commit(&output.commitment())
						{
							let lock_height = out_header.height + global::coinbase_maturity();
							if head_header.height < lock_height {
								return Err(PoolError::ImmatureCoinbase {
									header: out_header,
									output: output.commitment(),
								});
							};
						};
					};
					blockchain_refs.push(base);
				}
				Parent::Unknown => orphan_refs.push(base),
				Parent::AlreadySpent { other_tx: x } => {
					return Err(PoolError::DoubleSpend {
						other_tx: x,
						spent_output: input.commitment(),
					})
				}
			}
		}

		let is_orphan = orphan_refs.len() > 0;

		// Next we examine the outputs this transaction creates and ensure
  // that they do not already exist.
  // I believe its worth preventing duplicate outputs from being
  // accepted, even though it is possible for them to be mined
  // with strict ordering. In the future, if desirable, this could
  // be node policy config or more intelligent.
		for output in &tx.outputs {
			self.check_duplicate_outputs(output, is_orphan)?
		}

		// Assertion: we have exactly as many resolved spending references as
  // inputs to the transaction.
		assert_eq!(
			tx.inputs.len(),
			blockchain_refs.len() + pool_refs.len() + orphan_refs.len()
		);

		// At this point we know if we're spending all known unspents and not
  // creating any duplicate unspents.
		let pool_entry = graph::PoolEntry::new(&tx);
		let new_unspents = tx.outputs
			.iter()
			.map(|x| graph::Edge::new(Some(tx_hash), None, x.commitment()))
			.collect();

		if !is_orphan {
			// In the non-orphan (pool) case, we've ensured that every input
   // maps one-to-one with an unspent (available) output, and each
   // output is unique. No further checks are necessary.
			self.pool
				.add_pool_transaction(pool_entry, blockchain_refs, pool_refs, new_unspents);

			self.reconcile_orphans().unwrap();
			self.adapter.tx_accepted(&tx);
			self.transactions.insert(tx_hash, Box::new(tx));
			Ok(())
		} else {
			// At this point, we're pretty sure the transaction is an orphan,
   // but we have to explicitly check for double spends against the
   // orphans set; we do not check this as part of the connectivity
   // checking above.
   // First, any references resolved to the pool need to be compared
   // against active orphan pool_connections.
   // Note that pool_connections here also does double duty to
   // account for blockchain connections.
			for pool_ref in pool_refs.iter().chain(blockchain_refs.iter()) {
				match self.orphans
					.get_external_spent_output(&pool_ref.output_commitment())
				{
					// Should the below err be subtyped to orphans somehow?
					Some(x) => {
						return Err(PoolError::DoubleSpend {
							other_tx: x.destination_hash().unwrap(),
							spent_output: x.output_commitment(),
						})
					}
					None => {}
				}
			}

			// Next, we have to consider the possibility of double spends
   // within the orphans set.
   // We also have to distinguish now between missing and internal
   // references.
			let missing_refs = self.resolve_orphan_refs(tx_hash, &mut orphan_refs)?;

			// We have passed all failure modes.
			pool_refs.append(&mut blockchain_refs);
			self.orphans.add_orphan_transaction(
				pool_entry,
				pool_refs,
				orphan_refs,
				missing_refs,
				new_unspents,
			);

			Err(PoolError::OrphanTransaction)
		}
	}

	/// Check the output for a conflict with an existing output.
	///
	/// Checks the output (by commitment) against outputs in the blockchain
	/// or in the pool. If the transaction is destined for orphans, the
	/// orphans set is checked as well.
	fn check_duplicate_outputs(
		&self,
		output: &transaction::Output,
		is_orphan: bool,
	) -> Result<(), PoolError> {
		// Checking against current blockchain unspent outputs
  // We want outputs even if they're spent by pool txs, so we ignore
  // consumed_blockchain_outputs
		if self.blockchain.get_unspent(&output.commitment()).is_ok() {
			return Err(PoolError::DuplicateOutput {
				other_tx: None,
				in_chain: true,
				output: output.commitment(),
			});
		}


		// Check for existence of this output in the pool
		match self.pool.find_output(&output.commitment()) {
			Some(x) => {
				return Err(PoolError::DuplicateOutput {
					other_tx: Some(x),
					in_chain: false,
					output: output.commitment(),
				})
			}
			None => {}
		};


		// If the transaction might go into orphans, perform the same
  // checks as above but against the orphan set instead.
		if is_orphan {
			// Checking against orphan outputs
			match self.orphans.find_output(&output.commitment()) {
				Some(x) => {
					return Err(PoolError::DuplicateOutput {
						other_tx: Some(x),
						in_chain: false,
						output: output.commitment(),
					})
				}
				None => {}
			};
			// No need to check pool connections since those are covered
   // by pool unspents and blockchain connections.
		}
		Ok(())
	}

	/// Distinguish between missing, unspent, and spent orphan refs.
	///
	/// Takes the set of orphans_refs produced during transaction connectivity
	/// validation, which do not point at valid unspents in the blockchain or
	/// pool. These references point at either a missing (orphaned) commitment,
	/// an unspent output of the orphans set, or a spent output either within
	/// the orphans set or externally from orphans to the pool or blockchain.
	/// The last case results in a failure condition and transaction acceptance
	/// is aborted.
	fn resolve_orphan_refs(
		&self,
		tx_hash: hash::Hash,
		orphan_refs: &mut Vec<graph::Edge>,
	) -> Result<HashMap<usize, ()>, PoolError> {
		let mut missing_refs: HashMap<usize, ()> = HashMap::new();
		for (i, orphan_ref) in orphan_refs.iter_mut().enumerate() {
			let orphan_commitment = &orphan_ref.output_commitment();
			match self.orphans.get_available_output(&orphan_commitment) {
				// If the edge is an available output of orphans,
				// update the prepared edge
				Some(x) => *orphan_ref = x.with_destination(Some(tx_hash)),
				// If the edge is not an available output, it is either
				// already consumed or it belongs in missing_refs.
				None => {
					match self.orphans.get_internal_spent(&orphan_commitment) {
						Some(x) => {
							return Err(PoolError::DoubleSpend {
								other_tx: x.destination_hash().unwrap(),
								spent_output: x.output_commitment(),
							})
						}
						None => {
							// The reference does not resolve to anything.
	   // Make sure this missing_output has not already
	   // been claimed, then add this entry to
	   // missing_refs
							match self.orphans.get_unknown_output(&orphan_commitment) {
								Some(x) => {
									return Err(PoolError::DoubleSpend {
										other_tx: x.destination_hash().unwrap(),
										spent_output: x.output_commitment(),
									})
								}
								None => missing_refs.insert(i, ()),
							};
						}
					};
				}
			};
		}
		Ok(missing_refs)
	}

	/// The primary goal of the reconcile_orphans method is to eliminate any
	/// orphans who conflict with the recently accepted pool transaction.
	/// TODO: How do we handle fishing orphans out that look like they could
	/// be freed? Current thought is to do so under a different lock domain
	/// so that we don't have the potential for long recursion under the write
	/// lock.
	pub fn reconcile_orphans(&self) -> Result<(), PoolError> {
		Ok(())
	}

	/// Updates the pool with the details of a new block.
	///
	/// Along with add_to_memory_pool, reconcile_block is the other major entry
	/// point for the transaction pool. This method reconciles the records in
	/// the transaction pool with the updated view presented by the incoming
	/// block. This involves removing any transactions which appear to conflict
	/// with inputs and outputs consumed in the block, and invalidating any
	/// descendents or parents of the removed transaction, where relevant.
	///
	/// Returns a list of transactions which have been evicted from the pool
	/// due to the recent block. Because transaction association information is
	/// irreversibly lost in the blockchain, we must keep track of these
	/// evicted transactions elsewhere so that we can make a best effort at
	/// returning them to the pool in the event of a reorg that invalidates
	/// this block.
	pub fn reconcile_block(
		&mut self,
		block: &block::Block,
	) -> Result<Vec<Box<transaction::Transaction>>, PoolError> {
		// If this pool has been kept in sync correctly, serializing all
  // updates, then the inputs must consume only members of the blockchain
  // utxo set.
  // If the block has been resolved properly and reduced fully to its
  // canonical form, no inputs may consume outputs generated by previous
  // transactions in the block; they would be cut-through. TODO: If this
  // is not consensus enforced, then logic must be added here to account
  // for that.
  // Based on this, we operate under the following algorithm:
  // For each block input, we examine the pool transaction, if any, that
  // consumes the same blockchain output.
  // If one exists, we mark the transaction and then examine its
  // children. Recursively, we mark each child until a child is
  // fully satisfied by outputs in the updated utxo view (after
  // reconciliation of the block), or there are no more children.
  //
  // Additionally, to protect our invariant dictating no duplicate
  // outputs, each output generated by the new utxo set is checked
  // against outputs generated by the pool and the corresponding
  // transactions are also marked.
  //
  // After marking concludes, sweeping begins. In order, the marked
  // transactions are removed, the vertexes corresponding to the
  // transactions are removed, all the marked transactions' outputs are
  // removed, and all remaining non-blockchain inputs are returned to the
  // unspent_outputs set.
  //
  // After the pool has been successfully processed, an orphans
  // reconciliation job is triggered.
		let mut marked_transactions: HashSet<hash::Hash> = HashSet::new();

		{
			// find all conflicting txs based on inputs to the block
			let conflicting_txs: HashSet<hash::Hash> = block
				.inputs
				.iter()
				.filter_map(|x| self.pool.get_external_spent_output(&x.commitment()))
				.filter_map(|x| x.destination_hash())
				.collect();

			// find all outputs that conflict - potential for duplicates so use a HashSet
   // here
			let conflicting_outputs: HashSet<hash::Hash> = block
				.outputs
				.iter()
				.filter_map(|x: &transaction::Output| {
					self.pool
						.get_internal_spent_output(&x.commitment())
						.or(self.pool.get_available_output(&x.commitment()))
				})
				.filter_map(|x| x.source_hash())
				.collect();

			// now iterate over all conflicting hashes from both txs and outputs
   // we can just use the union of the two sets here to remove duplicates
			for &txh in conflicting_txs.union(&conflicting_outputs) {
				self.mark_transaction(txh, &mut marked_transactions);
			}
		}
		let freed_txs = self.sweep_transactions(marked_transactions);

		self.reconcile_orphans().unwrap();

		Ok(freed_txs)
	}

	/// The mark portion of our mark-and-sweep pool cleanup.
	///
	/// The transaction designated by conflicting_tx is immediately marked.
	/// Each output of this transaction is then examined; if a transaction in
	/// the pool spends this output and the output is not replaced by an
	/// identical output included in the updated UTXO set, the child is marked
	/// as well and the process continues recursively.
	///
	/// Marked transactions are added to the mutable marked_txs HashMap which
	/// is supplied by the calling function.
	fn mark_transaction(&self, conflicting_tx: hash::Hash, marked_txs: &mut HashSet<hash::Hash>) {
		// we can stop recursively visiting txs if we have already seen this one
		if marked_txs.contains(&conflicting_tx) {
			return;
		}

		marked_txs.insert(conflicting_tx);

		let tx_ref = self.transactions.get(&conflicting_tx);

		for output in &tx_ref.unwrap().outputs {
			match self.pool.get_internal_spent_output(&output.commitment()) {
				Some(x) => if self.blockchain.get_unspent(&x.output_commitment()).is_err() {
					self.mark_transaction(x.destination_hash().unwrap(), marked_txs);
				},
				None => {}
			};
		}
	}
	/// The sweep portion of mark-and-sweep pool cleanup.
	///
	/// The transactions that exist in the hashmap are removed from the
	/// heap storage as well as the vertex set. Any incoming edges are removed
	/// and added to a list of freed edges. Any outbound edges are removed from
	/// both the graph and the list of freed edges. It is the responsibility of
	/// this method to ensure that the list of freed edges (inputs) are
	/// consistent.
	///
	/// TODO: There's some iteration overlap between this and the mark step.
	/// Additional bookkeeping in the mark step could optimize that away.
	fn sweep_transactions(
		&mut self,
		marked_transactions: HashSet<hash::Hash>,
	) -> Vec<Box<transaction::Transaction>> {
		let mut removed_txs = Vec::new();

		for tx_hash in &marked_transactions {
			let removed_tx = self.transactions.remove(&tx_hash).unwrap();

			self.pool
				.remove_pool_transaction(&removed_tx, &marked_transactions);

			removed_txs.push(removed_tx);
		}

		// final step is to update the pool to reflect the new set of roots
  // a tx that was non-root may now be root based on the txs removed
		self.pool.update_roots();

		removed_txs
	}

	/// Fetch mineable transactions.
	///
	/// Select a set of mineable transactions for block building.
	///
	/// TODO - txs have lock_heights, so possible to have "invalid" (immature)
	/// txs here?
	///
	pub fn prepare_mineable_transactions(
		&self,
		num_to_fetch: u32,
	) -> Vec<Box<transaction::Transaction>> {
		self.pool
			.get_mineable_transactions(num_to_fetch)
			.iter()
			.map(|x| self.transactions.get(x).unwrap().clone())
			.collect()
	}

	/// Whether the transaction is acceptable to the pool, given both how
	/// full the pool is and the transaction weight.
	fn is_acceptable(&self, tx: &transaction::Transaction) -> Result<(), PoolError> {
		if self.total_size() > self.config.max_pool_size {
			// TODO evict old/large transactions instead
			return Err(PoolError::OverCapacity);
		}

    // for a basic transaction (1 input, 2 outputs) -
    // (-1 * 1) + (4 * 2) + 1 = 8
    // 8 * 10 = 80
		if self.config.accept_fee_base > 0 {
			let mut tx_weight = -1 * (tx.inputs.len() as i32) + (4 * tx.outputs.len() as i32) + 1;
			if tx_weight < 1 {
				tx_weight = 1;
			}
			let threshold = (tx_weight as u64) * self.config.accept_fee_base;
			if tx.fee < threshold {
				return Err(PoolError::LowFeeTransaction(threshold));
			}
		}
		Ok(())
	}
}
