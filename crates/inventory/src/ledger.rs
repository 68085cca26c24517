use stockroom_core::{DomainResult, ItemId};

use crate::transaction::Transaction;

/// Append-only transaction log.
///
/// Entries are only added by the mutation engine and are never removed, not even
/// when the item they reference is deleted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    entries: Vec<Transaction>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a ledger from persisted entries (kept in the given order).
    ///
    /// Fails on the first entry that could not have been recorded.
    pub fn from_entries(entries: Vec<Transaction>) -> DomainResult<Self> {
        for entry in &entries {
            entry.validate()?;
        }
        Ok(Self { entries })
    }

    pub(crate) fn append(&mut self, transaction: Transaction) {
        self.entries.push(transaction);
    }

    pub fn entries(&self) -> &[Transaction] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.entries.iter()
    }

    pub fn for_item(&self, item_id: ItemId) -> impl Iterator<Item = &Transaction> {
        self.entries.iter().filter(move |t| t.item_id == item_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&Transaction> {
        self.entries.last()
    }
}

impl<'a> IntoIterator for &'a Ledger {
    type Item = &'a Transaction;
    type IntoIter = core::slice::Iter<'a, Transaction>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::TransactionType;
    use chrono::{TimeZone, Utc};
    use stockroom_core::{DomainError, TransactionId};

    fn entry(kind: TransactionType, quantity: i64) -> Transaction {
        Transaction {
            id: TransactionId::new(),
            item_id: ItemId::new(),
            item_name: "Water".to_string(),
            kind,
            quantity,
            timestamp: Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap(),
        }
    }

    #[test]
    fn from_entries_keeps_order() {
        let entries = vec![
            entry(TransactionType::Add, 10),
            entry(TransactionType::Withdraw, 4),
        ];
        let ledger = Ledger::from_entries(entries.clone()).unwrap();
        assert_eq!(ledger.entries(), entries.as_slice());
    }

    #[test]
    fn from_entries_rejects_non_positive_adjustments() {
        let entries = vec![
            entry(TransactionType::Add, 10),
            entry(TransactionType::Withdraw, 0),
        ];
        assert!(matches!(
            Ledger::from_entries(entries),
            Err(DomainError::InvalidInput(_))
        ));
    }
}
