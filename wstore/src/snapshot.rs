//! Full-data snapshot and the repair-on-load policy.
//!
//! The load path receives raw, untyped JSON (historical exports, hand-edited
//! files, partial data) and coerces every field to a safe value instead of
//! failing: missing collections become empty, invalid enum values fall back
//! to their defaults, non-numeric amounts become zero. Records missing an id
//! or their identifying name are dropped.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::records::{
    CalculationItem, CalculationList, ChatMessage, ChatRole, Expense, InventoryItem, NotepadEntry,
    Order, OrderKind, OrderStatus, PricedMaterial,
};
use crate::store::{now_millis, WorkshopStore};

pub const FALLBACK_CLIENT_NAME: &str = "غير مسجل";
pub const FALLBACK_UNIT: &str = "قطعة";

/// The complete data set handed to and from the persistence boundary:
/// all six collections plus the conversation transcript and metadata.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Snapshot {
    pub orders: Vec<Order>,
    pub inventory: Vec<InventoryItem>,
    pub expenses: Vec<Expense>,
    pub priced_materials: Vec<PricedMaterial>,
    pub saved_calculations: Vec<CalculationList>,
    pub notepad: Vec<NotepadEntry>,
    pub chat_history: Vec<ChatMessage>,
    pub last_backup_date: Option<i64>,
}

impl Snapshot {
    /// Defensively rebuilds a snapshot from raw JSON. Never fails; anything
    /// unusable is dropped or defaulted.
    pub fn repair(raw: &Value) -> Self {
        let now = now_millis();

        let orders = object_entries(raw, "orders")
            .into_iter()
            .filter_map(|entry| repair_order(entry, now))
            .collect();

        let inventory = object_entries(raw, "inventory")
            .into_iter()
            .filter_map(repair_inventory_item)
            .collect();

        let expenses = object_entries(raw, "expenses")
            .into_iter()
            .filter_map(|entry| repair_expense(entry, now))
            .collect();

        let priced_materials = object_entries(raw, "pricedMaterials")
            .into_iter()
            .filter_map(repair_priced_material)
            .collect();

        let saved_calculations = object_entries(raw, "savedCalculations")
            .into_iter()
            .filter_map(|entry| repair_calculation(entry, now))
            .collect();

        let notepad = object_entries(raw, "notepad")
            .into_iter()
            .filter_map(repair_notepad_entry)
            .collect();

        let chat_history = object_entries(raw, "chatHistory")
            .into_iter()
            .filter_map(repair_chat_message)
            .collect();

        let last_backup_date = raw
            .get("lastBackupDate")
            .and_then(positive_millis);

        Self {
            orders,
            inventory,
            expenses,
            priced_materials,
            saved_calculations,
            notepad,
            chat_history,
            last_backup_date,
        }
    }
}

impl WorkshopStore {
    /// Replaces store contents with a repaired snapshot's collections. The
    /// transcript travels separately; the store never owns it.
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            orders: snapshot.orders.clone(),
            inventory: snapshot.inventory.clone(),
            expenses: snapshot.expenses.clone(),
            priced_materials: snapshot.priced_materials.clone(),
            saved_calculations: snapshot.saved_calculations.clone(),
            notepad: snapshot.notepad.clone(),
            last_backup_date: snapshot.last_backup_date,
            ..Self::default()
        }
    }

    pub fn snapshot(&self, chat_history: Vec<ChatMessage>) -> Snapshot {
        Snapshot {
            orders: self.orders.clone(),
            inventory: self.inventory.clone(),
            expenses: self.expenses.clone(),
            priced_materials: self.priced_materials.clone(),
            saved_calculations: self.saved_calculations.clone(),
            notepad: self.notepad.clone(),
            chat_history,
            last_backup_date: self.last_backup_date,
        }
    }
}

fn object_entries<'a>(raw: &'a Value, key: &str) -> Vec<&'a Map<String, Value>> {
    raw.get(key)
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_object).collect())
        .unwrap_or_default()
}

fn string_field(entry: &Map<String, Value>, key: &str) -> Option<String> {
    entry
        .get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string)
}

fn string_or(entry: &Map<String, Value>, key: &str, fallback: &str) -> String {
    string_field(entry, key).unwrap_or_else(|| fallback.to_string())
}

/// `Number(x) || 0` semantics: numbers and numeric strings pass through,
/// everything else (including NaN) collapses to zero.
fn number_or_zero(entry: &Map<String, Value>, key: &str) -> f64 {
    let parsed = match entry.get(key) {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text.trim().parse::<f64>().ok(),
        _ => None,
    };

    parsed.filter(|value| value.is_finite()).unwrap_or(0.0)
}

fn positive_millis(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|v| v as i64))
        .filter(|millis| *millis > 0)
}

fn millis_or(entry: &Map<String, Value>, key: &str, fallback: i64) -> i64 {
    entry
        .get(key)
        .and_then(positive_millis)
        .unwrap_or(fallback)
}

fn optional_millis(entry: &Map<String, Value>, key: &str) -> Option<i64> {
    entry.get(key).and_then(positive_millis)
}

/// `Number(x) || undefined` semantics: zero and non-numerics become absent.
fn optional_amount(entry: &Map<String, Value>, key: &str) -> Option<f64> {
    let amount = number_or_zero(entry, key);
    (amount != 0.0).then_some(amount)
}

fn repair_order(entry: &Map<String, Value>, now: i64) -> Option<Order> {
    let id = string_field(entry, "id")?;
    let name = string_field(entry, "name")?;

    let kind = entry
        .get("type")
        .and_then(Value::as_str)
        .and_then(OrderKind::parse)
        .unwrap_or_default();

    let status = entry
        .get("status")
        .and_then(Value::as_str)
        .and_then(OrderStatus::parse)
        .unwrap_or_default();

    Some(Order {
        id,
        name,
        client_name: string_or(entry, "clientName", FALLBACK_CLIENT_NAME),
        kind,
        status,
        total_cost: number_or_zero(entry, "totalCost"),
        paid_amount: number_or_zero(entry, "paidAmount"),
        created_at: millis_or(entry, "createdAt", now),
        delivery_date: optional_millis(entry, "deliveryDate"),
        labor_cost: optional_amount(entry, "laborCost"),
    })
}

fn repair_inventory_item(entry: &Map<String, Value>) -> Option<InventoryItem> {
    Some(InventoryItem {
        id: string_field(entry, "id")?,
        name: string_field(entry, "name")?,
        quantity: number_or_zero(entry, "quantity"),
        unit: string_or(entry, "unit", FALLBACK_UNIT),
        price: number_or_zero(entry, "price"),
    })
}

fn repair_expense(entry: &Map<String, Value>, now: i64) -> Option<Expense> {
    Some(Expense {
        id: string_field(entry, "id")?,
        description: string_field(entry, "description")?,
        amount: number_or_zero(entry, "amount"),
        date: millis_or(entry, "date", now),
    })
}

fn repair_priced_material(entry: &Map<String, Value>) -> Option<PricedMaterial> {
    Some(PricedMaterial {
        id: string_field(entry, "id")?,
        name: string_field(entry, "name")?,
        unit: string_or(entry, "unit", FALLBACK_UNIT),
        price: number_or_zero(entry, "price"),
    })
}

fn repair_calculation(entry: &Map<String, Value>, now: i64) -> Option<CalculationList> {
    let id = string_field(entry, "id")?;
    let name = string_field(entry, "name")?;
    let raw_items = entry.get("items").and_then(Value::as_array)?;

    let items = raw_items
        .iter()
        .filter_map(Value::as_object)
        .map(|item| CalculationItem {
            material_id: string_or(item, "materialId", ""),
            material_name: string_or(item, "materialName", ""),
            quantity: number_or_zero(item, "quantity"),
            unit: string_or(item, "unit", FALLBACK_UNIT),
            price: number_or_zero(item, "price"),
            total: number_or_zero(item, "total"),
        })
        .collect();

    Some(CalculationList {
        id,
        name,
        items,
        total_cost: number_or_zero(entry, "totalCost"),
        created_at: millis_or(entry, "createdAt", now),
    })
}

fn repair_notepad_entry(entry: &Map<String, Value>) -> Option<NotepadEntry> {
    Some(NotepadEntry {
        id: string_field(entry, "id")?,
        client_name: string_field(entry, "clientName")?,
        amount: number_or_zero(entry, "amount"),
    })
}

fn repair_chat_message(entry: &Map<String, Value>) -> Option<ChatMessage> {
    let role = match entry.get("role").and_then(Value::as_str)? {
        "user" => ChatRole::User,
        "assistant" => ChatRole::Assistant,
        "loading" => ChatRole::Loading,
        "tool-call" => ChatRole::ToolCall,
        _ => return None,
    };

    Some(ChatMessage {
        id: string_field(entry, "id")?,
        role,
        text: string_or(entry, "text", ""),
    })
}
