//! Business record types shared across the workspace.
//!
//! Serialized field names stay camelCase so persisted snapshots round-trip
//! with the historical JSON format.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderKind {
    New,
    Old,
}

impl Default for OrderKind {
    fn default() -> Self {
        Self::New
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Progress,
    Finished,
    Delivery,
}

impl Default for OrderStatus {
    fn default() -> Self {
        Self::Progress
    }
}

impl OrderStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "progress" => Some(Self::Progress),
            "finished" => Some(Self::Finished),
            "delivery" => Some(Self::Delivery),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Progress => "progress",
            Self::Finished => "finished",
            Self::Delivery => "delivery",
        }
    }
}

impl OrderKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "new" => Some(Self::New),
            "old" => Some(Self::Old),
            _ => None,
        }
    }
}

/// A workshop job. `id` is immutable once created; status transitions are
/// unordered (any status may follow any other).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub name: String,
    pub client_name: String,
    #[serde(rename = "type")]
    pub kind: OrderKind,
    pub status: OrderStatus,
    pub total_cost: f64,
    pub paid_amount: f64,
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_date: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labor_cost: Option<f64>,
}

impl Order {
    /// Computed, never stored.
    pub fn remaining(&self) -> f64 {
        self.total_cost - self.paid_amount
    }
}

/// Draft payload for creating an [`Order`]; the store assigns id, status,
/// and creation time so both the tool path and the direct path produce
/// identical records.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDraft {
    pub name: String,
    pub client_name: String,
    pub kind: OrderKind,
    pub total_cost: f64,
    pub paid_amount: f64,
    pub labor_cost: Option<f64>,
}

impl OrderDraft {
    pub fn new(
        name: impl Into<String>,
        client_name: impl Into<String>,
        kind: OrderKind,
        total_cost: f64,
    ) -> Self {
        Self {
            name: name.into(),
            client_name: client_name.into(),
            kind,
            total_cost,
            paid_amount: 0.0,
            labor_cost: None,
        }
    }

    pub fn with_paid_amount(mut self, paid_amount: f64) -> Self {
        self.paid_amount = paid_amount;
        self
    }

    pub fn with_labor_cost(mut self, labor_cost: f64) -> Self {
        self.labor_cost = Some(labor_cost);
        self
    }
}

/// Field-wise patch for [`Order`]; only `Some` fields are applied.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OrderPatch {
    pub name: Option<String>,
    pub client_name: Option<String>,
    pub kind: Option<OrderKind>,
    pub status: Option<OrderStatus>,
    pub total_cost: Option<f64>,
    pub paid_amount: Option<f64>,
    pub delivery_date: Option<i64>,
    pub labor_cost: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: String,
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,
    pub description: String,
    pub amount: f64,
    pub date: i64,
}

/// A reusable price-catalog entry, independent from the inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricedMaterial {
    pub id: String,
    pub name: String,
    pub unit: String,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationItem {
    pub material_id: String,
    pub material_name: String,
    pub quantity: f64,
    pub unit: String,
    pub price: f64,
    pub total: f64,
}

impl CalculationItem {
    pub fn from_material(material: &PricedMaterial, quantity: f64) -> Self {
        Self {
            material_id: material.id.clone(),
            material_name: material.name.clone(),
            quantity,
            unit: material.unit.clone(),
            price: material.price,
            total: quantity * material.price,
        }
    }
}

/// A saved cost calculation. Immutable once stored; edits go through
/// delete + recreate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationList {
    pub id: String,
    pub name: String,
    pub items: Vec<CalculationItem>,
    pub total_cost: f64,
    pub created_at: i64,
}

/// A running client balance in the notepad, independent from orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotepadEntry {
    pub id: String,
    pub client_name: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
    Loading,
    #[serde(rename = "tool-call")]
    ToolCall,
}

impl ChatRole {
    /// Transient roles are turn-progress markers, never permanent history.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Loading | Self::ToolCall)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub role: ChatRole,
    pub text: String,
}

impl ChatMessage {
    pub fn new(id: impl Into<String>, role: ChatRole, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role,
            text: text.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_serializes_with_historical_field_names() {
        let order = Order {
            id: "order-1".to_string(),
            name: "كنبة مودرن".to_string(),
            client_name: "أستاذ محمد".to_string(),
            kind: OrderKind::New,
            status: OrderStatus::Progress,
            total_cost: 3000.0,
            paid_amount: 1000.0,
            created_at: 1_700_000_000_000,
            delivery_date: None,
            labor_cost: Some(500.0),
        };

        let json = serde_json::to_value(&order).expect("order should serialize");
        assert_eq!(json["clientName"], "أستاذ محمد");
        assert_eq!(json["type"], "new");
        assert_eq!(json["status"], "progress");
        assert_eq!(json["totalCost"], 3000.0);
        assert_eq!(json["paidAmount"], 1000.0);
        assert_eq!(json["laborCost"], 500.0);
        assert!(json.get("deliveryDate").is_none());
    }

    #[test]
    fn remaining_is_derived_from_stored_fields() {
        let order = Order {
            id: "order-2".to_string(),
            name: "سرير 160".to_string(),
            client_name: "أستاذ علي".to_string(),
            kind: OrderKind::Old,
            status: OrderStatus::Finished,
            total_cost: 1200.0,
            paid_amount: 1500.0,
            created_at: 0,
            delivery_date: None,
            labor_cost: None,
        };

        assert_eq!(order.remaining(), -300.0);
    }

    #[test]
    fn chat_role_round_trips_tool_call_spelling() {
        let role: ChatRole = serde_json::from_str("\"tool-call\"").expect("role should parse");
        assert_eq!(role, ChatRole::ToolCall);
        assert!(role.is_transient());

        let rendered = serde_json::to_string(&ChatRole::ToolCall).expect("role should serialize");
        assert_eq!(rendered, "\"tool-call\"");
    }
}
