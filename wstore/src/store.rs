//! The workshop store: owned record collections and their mutation operations.
//!
//! All mutations are synchronous and id-addressed. Operations targeting an
//! existing record return `Option`: `None` signals not-found, never a panic.
//! Callers that start from a free-text reference resolve it first (see the
//! resolver module), then mutate through these operations, so the tool path
//! and the direct path share identical invariants.

use chrono::Utc;

use crate::records::{
    CalculationItem, CalculationList, Expense, InventoryItem, NotepadEntry, Order, OrderDraft,
    OrderPatch, OrderStatus, PricedMaterial,
};
use crate::StoreError;

pub(crate) fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

#[derive(Debug, Default)]
pub struct WorkshopStore {
    pub(crate) orders: Vec<Order>,
    pub(crate) inventory: Vec<InventoryItem>,
    pub(crate) expenses: Vec<Expense>,
    pub(crate) priced_materials: Vec<PricedMaterial>,
    pub(crate) saved_calculations: Vec<CalculationList>,
    pub(crate) notepad: Vec<NotepadEntry>,
    pub(crate) last_backup_date: Option<i64>,
    pub(crate) seq: u64,
}

impl WorkshopStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self, prefix: &str) -> String {
        self.seq += 1;
        format!("{prefix}-{}-{}", now_millis(), self.seq)
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn inventory(&self) -> &[InventoryItem] {
        &self.inventory
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn priced_materials(&self) -> &[PricedMaterial] {
        &self.priced_materials
    }

    pub fn saved_calculations(&self) -> &[CalculationList] {
        &self.saved_calculations
    }

    pub fn notepad(&self) -> &[NotepadEntry] {
        &self.notepad
    }

    pub fn last_backup_date(&self) -> Option<i64> {
        self.last_backup_date
    }

    pub fn mark_backed_up(&mut self) -> i64 {
        let stamp = now_millis();
        self.last_backup_date = Some(stamp);
        stamp
    }

    // --- orders ---

    /// Newest orders sit at the front of the collection, which is also the
    /// iteration order the resolver scans.
    pub fn add_order(&mut self, draft: OrderDraft) -> Order {
        let order = Order {
            id: self.next_id("order"),
            name: draft.name,
            client_name: draft.client_name,
            kind: draft.kind,
            status: OrderStatus::Progress,
            total_cost: draft.total_cost,
            paid_amount: draft.paid_amount,
            created_at: now_millis(),
            delivery_date: None,
            labor_cost: draft.labor_cost,
        };

        self.orders.insert(0, order.clone());
        order
    }

    pub fn update_order(&mut self, id: &str, patch: OrderPatch) -> Option<Order> {
        let order = self.orders.iter_mut().find(|order| order.id == id)?;

        if let Some(name) = patch.name {
            order.name = name;
        }

        if let Some(client_name) = patch.client_name {
            order.client_name = client_name;
        }

        if let Some(kind) = patch.kind {
            order.kind = kind;
        }

        if let Some(status) = patch.status {
            order.status = status;
        }

        if let Some(total_cost) = patch.total_cost {
            order.total_cost = total_cost;
        }

        if let Some(paid_amount) = patch.paid_amount {
            order.paid_amount = paid_amount;
        }

        if let Some(delivery_date) = patch.delivery_date {
            order.delivery_date = Some(delivery_date);
        }

        if let Some(labor_cost) = patch.labor_cost {
            order.labor_cost = Some(labor_cost);
        }

        Some(order.clone())
    }

    pub fn record_payment(&mut self, id: &str, amount: f64) -> Option<Order> {
        let order = self.orders.iter_mut().find(|order| order.id == id)?;
        order.paid_amount += amount;
        Some(order.clone())
    }

    pub fn set_order_status(&mut self, id: &str, status: OrderStatus) -> Option<Order> {
        let order = self.orders.iter_mut().find(|order| order.id == id)?;
        order.status = status;
        Some(order.clone())
    }

    pub fn set_delivery_date(&mut self, id: &str, delivery_date: i64) -> Option<Order> {
        let order = self.orders.iter_mut().find(|order| order.id == id)?;
        order.delivery_date = Some(delivery_date);
        Some(order.clone())
    }

    pub fn remove_order(&mut self, id: &str) -> Option<Order> {
        let position = self.orders.iter().position(|order| order.id == id)?;
        Some(self.orders.remove(position))
    }

    pub fn clear_finished_orders(&mut self) -> usize {
        let before = self.orders.len();
        self.orders.retain(|order| order.status != OrderStatus::Finished);
        before - self.orders.len()
    }

    // --- inventory ---

    pub fn add_inventory_item(
        &mut self,
        name: impl Into<String>,
        quantity: f64,
        unit: impl Into<String>,
        price: f64,
    ) -> InventoryItem {
        let item = InventoryItem {
            id: self.next_id("inv"),
            name: name.into(),
            quantity,
            unit: unit.into(),
            price,
        };

        self.inventory.insert(0, item.clone());
        item
    }

    pub fn update_inventory_item(
        &mut self,
        id: &str,
        quantity: f64,
        price: f64,
    ) -> Option<InventoryItem> {
        let item = self.inventory.iter_mut().find(|item| item.id == id)?;
        item.quantity = quantity;
        item.price = price;
        Some(item.clone())
    }

    pub fn remove_inventory_item(&mut self, id: &str) -> Option<InventoryItem> {
        let position = self.inventory.iter().position(|item| item.id == id)?;
        Some(self.inventory.remove(position))
    }

    // --- expenses ---

    pub fn add_expense(&mut self, description: impl Into<String>, amount: f64) -> Expense {
        let expense = Expense {
            id: self.next_id("exp"),
            description: description.into(),
            amount,
            date: now_millis(),
        };

        self.expenses.insert(0, expense.clone());
        expense
    }

    pub fn remove_expense(&mut self, id: &str) -> Option<Expense> {
        let position = self.expenses.iter().position(|expense| expense.id == id)?;
        Some(self.expenses.remove(position))
    }

    // --- priced materials ---

    pub fn add_priced_material(
        &mut self,
        name: impl Into<String>,
        unit: impl Into<String>,
        price: f64,
    ) -> PricedMaterial {
        let material = PricedMaterial {
            id: self.next_id("pm"),
            name: name.into(),
            unit: unit.into(),
            price,
        };

        self.priced_materials.insert(0, material.clone());
        material
    }

    pub fn update_material_price(&mut self, id: &str, price: f64) -> Option<PricedMaterial> {
        let material = self
            .priced_materials
            .iter_mut()
            .find(|material| material.id == id)?;
        material.price = price;
        Some(material.clone())
    }

    pub fn remove_priced_material(&mut self, id: &str) -> Option<PricedMaterial> {
        let position = self
            .priced_materials
            .iter()
            .position(|material| material.id == id)?;
        Some(self.priced_materials.remove(position))
    }

    // --- saved calculations ---

    /// Saving an empty list is rejected; `total_cost` is recomputed from the
    /// line totals rather than trusted from the caller.
    pub fn save_calculation(
        &mut self,
        name: impl Into<String>,
        items: Vec<CalculationItem>,
    ) -> Result<CalculationList, StoreError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(StoreError::invalid_record(
                "calculation list requires a non-empty name",
            ));
        }

        if items.is_empty() {
            return Err(StoreError::invalid_record(
                "calculation list requires at least one line item",
            ));
        }

        let total_cost = items.iter().map(|item| item.total).sum();
        let list = CalculationList {
            id: self.next_id("calc"),
            name,
            items,
            total_cost,
            created_at: now_millis(),
        };

        self.saved_calculations.insert(0, list.clone());
        Ok(list)
    }

    pub fn remove_calculation(&mut self, id: &str) -> Option<CalculationList> {
        let position = self
            .saved_calculations
            .iter()
            .position(|list| list.id == id)?;
        Some(self.saved_calculations.remove(position))
    }

    // --- notepad ---

    /// Notepad entries append at the back, oldest first.
    pub fn add_notepad_entry(&mut self, client_name: impl Into<String>, amount: f64) -> NotepadEntry {
        let entry = NotepadEntry {
            id: self.next_id("note"),
            client_name: client_name.into(),
            amount,
        };

        self.notepad.push(entry.clone());
        entry
    }

    pub fn set_notepad_amount(&mut self, id: &str, amount: f64) -> Option<NotepadEntry> {
        let entry = self.notepad.iter_mut().find(|entry| entry.id == id)?;
        entry.amount = amount;
        Some(entry.clone())
    }

    /// Applies a signed delta to a client balance, flooring the result at
    /// zero: a payment larger than the balance clears it, never goes negative.
    pub fn adjust_notepad_amount(&mut self, id: &str, delta: f64) -> Option<NotepadEntry> {
        let entry = self.notepad.iter_mut().find(|entry| entry.id == id)?;
        entry.amount = (entry.amount + delta).max(0.0);
        Some(entry.clone())
    }

    pub fn remove_notepad_entry(&mut self, id: &str) -> Option<NotepadEntry> {
        let position = self.notepad.iter().position(|entry| entry.id == id)?;
        Some(self.notepad.remove(position))
    }
}
