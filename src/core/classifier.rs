//! Vendor classifier
//!
//! Partitions a batch of pending transactions into those resolved
//! automatically from the defaults store and those needing an operator
//! decision. Grouping is by exact, case-sensitive description match; the
//! pipeline does no fuzzy matching anywhere.

use crate::core::defaults::DefaultsStore;
use crate::types::{PendingTransaction, Transaction};

/// All pending transactions sharing one vendor description
///
/// The review session resolves a whole queue with a single answer.
#[derive(Debug, Clone, PartialEq)]
pub struct VendorQueue {
    /// The shared description, used as the classification key
    pub vendor: String,
    /// The vendor's transactions, in statement order
    pub transactions: Vec<PendingTransaction>,
}

/// Outcome of classifying one imported batch
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Transactions resolved from the defaults store, no prompt needed
    pub auto: Vec<Transaction>,
    /// Vendor queues needing manual review, in first-appearance order
    pub manual: Vec<VendorQueue>,
}

/// Partition pending transactions by defaults-store lookup
///
/// Every transaction of a vendor with a store hit becomes a finalized
/// [`Transaction`] carrying that opposite account; vendors without a hit
/// are queued for the review session. Queue order follows each vendor's
/// first appearance in the statement, so prompts track statement order.
pub fn classify(pending: Vec<PendingTransaction>, defaults: &DefaultsStore) -> Classification {
    let mut groups: Vec<VendorQueue> = Vec::new();
    for txn in pending {
        match groups.iter_mut().find(|g| g.vendor == txn.description) {
            Some(group) => group.transactions.push(txn),
            None => groups.push(VendorQueue {
                vendor: txn.description.clone(),
                transactions: vec![txn],
            }),
        }
    }

    let mut auto = Vec::new();
    let mut manual = Vec::new();
    for group in groups {
        match defaults.check_vendor(&group.vendor) {
            Some(account) => {
                let account = account.to_string();
                auto.extend(
                    group
                        .transactions
                        .into_iter()
                        .map(|txn| Transaction::new(txn, account.clone())),
                );
            }
            None => manual.push(group),
        }
    }

    Classification { auto, manual }
}
