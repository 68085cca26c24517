use stockroom_core::{DomainError, DomainResult, ItemId};

use crate::item::{StockItem, validate_name, validate_threshold};

/// Current stock state: item identity -> name, quantity, threshold.
///
/// Items are kept in insertion order, which is the order they are listed in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StockRegistry {
    items: Vec<StockItem>,
}

impl StockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a registry from persisted items.
    ///
    /// Each item is re-validated; a malformed item or a repeated id rejects the
    /// whole set.
    pub fn from_items(items: Vec<StockItem>) -> DomainResult<Self> {
        let mut registry = Self::new();
        for item in items {
            registry.add_item(item.id, &item.name, item.quantity, item.low_stock_threshold)?;
        }
        Ok(registry)
    }

    /// Create an item under a fresh identity.
    pub fn add_item(
        &mut self,
        id: ItemId,
        name: &str,
        quantity: i64,
        low_stock_threshold: Option<i64>,
    ) -> DomainResult<&StockItem> {
        let item = self.validate_new_item(id, name, quantity, low_stock_threshold)?;
        let idx = self.items.len();
        self.items.push(item);
        Ok(&self.items[idx])
    }

    /// Build the item [`add_item`](Self::add_item) would insert, without inserting it.
    pub fn validate_new_item(
        &self,
        id: ItemId,
        name: &str,
        quantity: i64,
        low_stock_threshold: Option<i64>,
    ) -> DomainResult<StockItem> {
        if self.contains(id) {
            return Err(DomainError::invalid_input(format!("item {id} already exists")));
        }
        StockItem::new(id, name, quantity, low_stock_threshold)
    }

    /// Update or clear the low-stock threshold.
    pub fn set_threshold(&mut self, id: ItemId, threshold: Option<i64>) -> DomainResult<()> {
        validate_threshold(threshold)?;
        let item = self.get_mut(id)?;
        item.low_stock_threshold = threshold;
        Ok(())
    }

    pub fn rename_item(&mut self, id: ItemId, name: &str) -> DomainResult<()> {
        let name = validate_name(name)?;
        let item = self.get_mut(id)?;
        item.name = name;
        Ok(())
    }

    /// Delete an item. Its ledger history is untouched.
    pub fn remove_item(&mut self, id: ItemId) -> DomainResult<StockItem> {
        let idx = self
            .items
            .iter()
            .position(|i| i.id == id)
            .ok_or_else(|| DomainError::not_found(format!("item {id}")))?;
        Ok(self.items.remove(idx))
    }

    /// Shift an item's quantity by a signed amount, returning the new quantity.
    pub fn apply_delta(&mut self, id: ItemId, delta: i64) -> DomainResult<i64> {
        let new_quantity = self.check_delta(id, delta)?;
        self.get_mut(id)?.quantity = new_quantity;
        Ok(new_quantity)
    }

    /// Quantity [`apply_delta`](Self::apply_delta) would produce, without applying it.
    pub fn check_delta(&self, id: ItemId, delta: i64) -> DomainResult<i64> {
        let item = self.require(id)?;
        let new_quantity = item
            .quantity
            .checked_add(delta)
            .ok_or_else(|| DomainError::invalid_input("quantity overflow"))?;
        if new_quantity < 0 {
            return Err(DomainError::insufficient_stock(
                delta.saturating_abs(),
                item.quantity,
            ));
        }
        Ok(new_quantity)
    }

    pub fn get(&self, id: ItemId) -> Option<&StockItem> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Like [`get`](Self::get) but missing items are a `NotFound` error.
    pub fn require(&self, id: ItemId) -> DomainResult<&StockItem> {
        self.get(id)
            .ok_or_else(|| DomainError::not_found(format!("item {id}")))
    }

    fn get_mut(&mut self, id: ItemId) -> DomainResult<&mut StockItem> {
        self.items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| DomainError::not_found(format!("item {id}")))
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.get(id).is_some()
    }

    /// Live quantity, or 0 for an item that no longer exists.
    pub fn quantity_of(&self, id: ItemId) -> i64 {
        self.get(id).map(|i| i.quantity).unwrap_or(0)
    }

    pub fn items(&self) -> &[StockItem] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &StockItem> {
        self.items.iter()
    }

    pub fn low_stock_items(&self) -> impl Iterator<Item = &StockItem> {
        self.items.iter().filter(|i| i.is_low_stock())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_item_assigns_given_identity_and_validates() {
        let mut registry = StockRegistry::new();
        let id = ItemId::new();

        let item = registry.add_item(id, "Water", 100, Some(10)).unwrap();
        assert_eq!(item.id, id);
        assert_eq!(item.quantity, 100);

        let err = registry.add_item(ItemId::new(), "", 1, None).unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn duplicate_identity_is_rejected() {
        let mut registry = StockRegistry::new();
        let id = ItemId::new();
        registry.add_item(id, "Water", 1, None).unwrap();

        assert!(registry.add_item(id, "Juice", 1, None).is_err());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn apply_delta_never_goes_negative() {
        let mut registry = StockRegistry::new();
        let id = ItemId::new();
        registry.add_item(id, "Water", 5, None).unwrap();

        assert_eq!(registry.apply_delta(id, -5).unwrap(), 0);
        let err = registry.apply_delta(id, -1).unwrap_err();
        assert_eq!(err, DomainError::insufficient_stock(1, 0));
        assert_eq!(registry.quantity_of(id), 0);
    }

    #[test]
    fn apply_delta_overflow_is_invalid_input() {
        let mut registry = StockRegistry::new();
        let id = ItemId::new();
        registry.add_item(id, "Bolts", i64::MAX, None).unwrap();

        assert!(matches!(
            registry.apply_delta(id, 1),
            Err(DomainError::InvalidInput(_))
        ));
        assert_eq!(registry.quantity_of(id), i64::MAX);
    }

    #[test]
    fn operations_on_missing_item_are_not_found() {
        let mut registry = StockRegistry::new();
        let ghost = ItemId::new();

        assert!(matches!(registry.set_threshold(ghost, Some(1)), Err(DomainError::NotFound(_))));
        assert!(matches!(registry.set_threshold(ghost, None), Err(DomainError::NotFound(_))));
        assert!(matches!(registry.remove_item(ghost), Err(DomainError::NotFound(_))));
        assert!(matches!(registry.apply_delta(ghost, 1), Err(DomainError::NotFound(_))));
        assert!(matches!(registry.rename_item(ghost, "x"), Err(DomainError::NotFound(_))));
        assert_eq!(registry.quantity_of(ghost), 0);
    }

    #[test]
    fn threshold_can_be_set_and_cleared() {
        let mut registry = StockRegistry::new();
        let id = ItemId::new();
        registry.add_item(id, "Soap", 3, None).unwrap();

        registry.set_threshold(id, Some(5)).unwrap();
        assert_eq!(registry.low_stock_items().count(), 1);

        registry.set_threshold(id, None).unwrap();
        assert_eq!(registry.get(id).unwrap().low_stock_threshold, None);
        assert_eq!(registry.low_stock_items().count(), 0);

        assert!(registry.set_threshold(id, Some(-1)).is_err());
    }

    #[test]
    fn remove_keeps_order_of_remaining_items() {
        let mut registry = StockRegistry::new();
        let ids: Vec<_> = (0..3).map(|_| ItemId::new()).collect();
        for (n, id) in ids.iter().enumerate() {
            registry.add_item(*id, &format!("Item {n}"), 1, None).unwrap();
        }

        let removed = registry.remove_item(ids[1]).unwrap();
        assert_eq!(removed.name, "Item 1");
        let remaining: Vec<_> = registry.iter().map(|i| i.id).collect();
        assert_eq!(remaining, vec![ids[0], ids[2]]);
    }

    #[test]
    fn apply_delta_reports_requested_amount_for_extreme_deltas() {
        let mut registry = StockRegistry::new();
        let id = ItemId::new();
        registry.add_item(id, "Water", 5, None).unwrap();

        let err = registry.apply_delta(id, i64::MIN).unwrap_err();
        assert_eq!(err, DomainError::insufficient_stock(i64::MAX, 5));
        assert_eq!(registry.quantity_of(id), 5);
    }

    #[test]
    fn check_delta_does_not_mutate() {
        let mut registry = StockRegistry::new();
        let id = ItemId::new();
        registry.add_item(id, "Water", 5, None).unwrap();

        assert_eq!(registry.check_delta(id, -2).unwrap(), 3);
        assert_eq!(registry.quantity_of(id), 5);
    }

    #[test]
    fn from_items_revalidates_persisted_items() {
        let id = ItemId::new();
        let valid = StockItem::new(id, "Water", 3, Some(1)).unwrap();
        let registry = StockRegistry::from_items(vec![valid.clone()]).unwrap();
        assert_eq!(registry.items(), std::slice::from_ref(&valid));

        let malformed = [
            StockItem { quantity: -5, ..valid.clone() },
            StockItem { name: "  ".to_string(), ..valid.clone() },
            StockItem { low_stock_threshold: Some(-1), ..valid.clone() },
        ];
        for item in malformed {
            assert!(matches!(
                StockRegistry::from_items(vec![item]),
                Err(DomainError::InvalidInput(_))
            ));
        }

        let duplicate = StockItem { name: "Juice".to_string(), ..valid.clone() };
        assert!(StockRegistry::from_items(vec![valid, duplicate]).is_err());
    }
}
