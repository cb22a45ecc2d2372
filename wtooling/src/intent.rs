//! The closed set of executable intents behind the fixed tool contract.
//!
//! Every tool the model may call maps to exactly one variant here. A raw
//! [`ToolCall`] is validated and coerced once, at construction; after that
//! the dispatcher works with typed payloads only.

use serde_json::Value;
use wprovider::ToolCall;
use wstore::{OrderKind, OrderStatus};

use crate::args::{
    number_or_zero, optional_amount, parse_object, required_number, required_string,
};
use crate::ToolError;

#[derive(Debug, Clone, PartialEq)]
pub struct RegisterOrder {
    pub name: String,
    pub client_name: String,
    pub kind: OrderKind,
    pub total_cost: f64,
    pub paid_amount: f64,
    pub labor_cost: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaterialQuantity {
    pub name: String,
    pub quantity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    RegisterOrder(RegisterOrder),
    RecordPayment {
        order_name: String,
        amount: f64,
    },
    UpdateOrderStatus {
        order_name: String,
        status: OrderStatus,
    },
    DeleteOrder {
        order_name: String,
    },
    SetDeliveryDate {
        order_name: String,
        /// Raw `YYYY-MM-DD` text; parse failures are reported in the tool
        /// result, not at construction.
        delivery_date: String,
    },
    GetOrderDetails {
        order_name: String,
    },
    GetDashboardSummary,
    AddExpense {
        description: String,
        amount: f64,
    },
    CalculateDetailedCost {
        items: Vec<MaterialQuantity>,
    },
    AddNotepadEntry {
        client_name: String,
        amount: f64,
    },
    UpdateNotepadEntry {
        client_name: String,
        amount_change: f64,
    },
}

impl Intent {
    pub fn from_call(call: &ToolCall) -> Result<Self, ToolError> {
        Self::parse(call).map_err(|error| error.with_tool_name(call.name.clone()))
    }

    fn parse(call: &ToolCall) -> Result<Self, ToolError> {
        let args = parse_object(&call.args)?;

        match call.name.as_str() {
            "registerOrder" => {
                let kind_text = required_string(args, "type")?;
                let kind = OrderKind::parse(&kind_text).ok_or_else(|| {
                    ToolError::invalid_arguments(format!("unknown order type '{kind_text}'"))
                })?;

                Ok(Self::RegisterOrder(RegisterOrder {
                    name: required_string(args, "name")?,
                    client_name: required_string(args, "clientName")?,
                    kind,
                    total_cost: required_number(args, "totalCost")?,
                    paid_amount: optional_amount(args, "paidAmount").unwrap_or(0.0),
                    labor_cost: optional_amount(args, "laborCost"),
                }))
            }
            "recordPayment" => Ok(Self::RecordPayment {
                order_name: required_string(args, "orderName")?,
                amount: required_number(args, "amount")?,
            }),
            "updateOrderStatus" => {
                let status_text = required_string(args, "status")?;
                let status = OrderStatus::parse(&status_text).ok_or_else(|| {
                    ToolError::invalid_arguments(format!("unknown order status '{status_text}'"))
                })?;

                Ok(Self::UpdateOrderStatus {
                    order_name: required_string(args, "orderName")?,
                    status,
                })
            }
            "deleteOrder" => Ok(Self::DeleteOrder {
                order_name: required_string(args, "orderName")?,
            }),
            "setDeliveryDate" => Ok(Self::SetDeliveryDate {
                order_name: required_string(args, "orderName")?,
                delivery_date: required_string(args, "deliveryDate")?,
            }),
            "getOrderDetails" => Ok(Self::GetOrderDetails {
                order_name: required_string(args, "orderName")?,
            }),
            "getDashboardSummary" => Ok(Self::GetDashboardSummary),
            "addExpense" => Ok(Self::AddExpense {
                description: required_string(args, "description")?,
                amount: required_number(args, "amount")?,
            }),
            "calculateDetailedCost" => {
                let items = args
                    .get("items")
                    .and_then(Value::as_object)
                    .ok_or_else(|| {
                        ToolError::invalid_arguments("missing required object 'items'")
                    })?;

                Ok(Self::CalculateDetailedCost {
                    items: items
                        .iter()
                        .map(|(name, quantity)| MaterialQuantity {
                            name: name.clone(),
                            quantity: number_or_zero(quantity),
                        })
                        .collect(),
                })
            }
            "addNotepadEntry" => Ok(Self::AddNotepadEntry {
                client_name: required_string(args, "clientName")?,
                amount: required_number(args, "amount")?,
            }),
            "updateNotepadEntry" => Ok(Self::UpdateNotepadEntry {
                client_name: required_string(args, "clientName")?,
                amount_change: required_number(args, "amountChange")?,
            }),
            other => Err(ToolError::unknown_tool(format!(
                "'{other}' is not part of the tool contract"
            ))),
        }
    }

    pub fn tool_name(&self) -> &'static str {
        match self {
            Self::RegisterOrder(_) => "registerOrder",
            Self::RecordPayment { .. } => "recordPayment",
            Self::UpdateOrderStatus { .. } => "updateOrderStatus",
            Self::DeleteOrder { .. } => "deleteOrder",
            Self::SetDeliveryDate { .. } => "setDeliveryDate",
            Self::GetOrderDetails { .. } => "getOrderDetails",
            Self::GetDashboardSummary => "getDashboardSummary",
            Self::AddExpense { .. } => "addExpense",
            Self::CalculateDetailedCost { .. } => "calculateDetailedCost",
            Self::AddNotepadEntry { .. } => "addNotepadEntry",
            Self::UpdateNotepadEntry { .. } => "updateNotepadEntry",
        }
    }

}
