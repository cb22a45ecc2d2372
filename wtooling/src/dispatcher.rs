//! Executes one tool call against the store and shapes its result payload.
//!
//! Every mutation tool follows the same discipline: resolve the free-text
//! reference first, mutate only if it resolved. An unresolved reference
//! leaves the store untouched and produces a structured not-found payload
//! for the model to narrate; it never raises an error.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use chrono::{Local, NaiveDate, TimeZone};
use serde_json::{json, Value};
use wcommon::{MetadataMap, SessionId, TraceId};
use wprovider::ToolCall;
use wstore::{MonthKey, OrderDraft, WorkshopStore};

use crate::{DispatchHooks, Intent, MaterialQuantity, NoopDispatchHooks, RegisterOrder, ToolError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchContext {
    pub session_id: SessionId,
    pub trace_id: Option<TraceId>,
    pub metadata: MetadataMap,
}

impl DispatchContext {
    pub fn new(session_id: impl Into<SessionId>) -> Self {
        Self {
            session_id: session_id.into(),
            trace_id: None,
            metadata: MetadataMap::new(),
        }
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<TraceId>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// The JSON-serializable result of one dispatch, plus whether the store
/// changed (which drives the persistence handoff).
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchOutcome {
    pub tool_name: String,
    pub payload: Value,
    pub mutated: bool,
}

#[derive(Clone)]
pub struct ToolDispatcher {
    store: Arc<Mutex<WorkshopStore>>,
    hooks: Arc<dyn DispatchHooks>,
}

impl ToolDispatcher {
    pub fn new(store: Arc<Mutex<WorkshopStore>>) -> Self {
        Self {
            store,
            hooks: Arc::new(NoopDispatchHooks),
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn DispatchHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn store(&self) -> Arc<Mutex<WorkshopStore>> {
        Arc::clone(&self.store)
    }

    /// Runs one call to completion. Resolution failures and malformed dates
    /// come back as `Ok` outcomes with failure payloads; `Err` is reserved
    /// for contract violations (unknown tool, bad arguments) and engine
    /// faults.
    pub fn dispatch(
        &self,
        call: &ToolCall,
        context: &DispatchContext,
    ) -> Result<DispatchOutcome, ToolError> {
        let started = Instant::now();
        self.hooks.on_dispatch_start(call, context);

        let result = self.dispatch_inner(call);
        match &result {
            Ok(outcome) => {
                self.hooks
                    .on_dispatch_success(call, context, outcome, started.elapsed());
            }
            Err(error) => {
                self.hooks
                    .on_dispatch_failure(call, context, error, started.elapsed());
            }
        }

        result
    }

    fn dispatch_inner(&self, call: &ToolCall) -> Result<DispatchOutcome, ToolError> {
        let intent = Intent::from_call(call)?;
        let tool_name = intent.tool_name().to_string();

        let mut store = self
            .store
            .lock()
            .map_err(|_| ToolError::execution("workshop store lock poisoned"))?;

        let (payload, mutated) = execute(intent, &mut store)?;
        Ok(DispatchOutcome {
            tool_name,
            payload,
            mutated,
        })
    }
}

fn execute(intent: Intent, store: &mut WorkshopStore) -> Result<(Value, bool), ToolError> {
    match intent {
        Intent::RegisterOrder(order) => register_order(store, order),
        Intent::RecordPayment { order_name, amount } => {
            let resolved = store.find_order(&order_name).map(|order| order.id.clone());
            match resolved.and_then(|id| store.record_payment(&id, amount)) {
                Some(order) => Ok((
                    json!({ "success": true, "updatedOrder": serialize(&order)? }),
                    true,
                )),
                None => Ok((order_not_found(), false)),
            }
        }
        Intent::UpdateOrderStatus { order_name, status } => {
            let resolved = store.find_order(&order_name).map(|order| order.id.clone());
            match resolved.and_then(|id| store.set_order_status(&id, status)) {
                Some(order) => Ok((
                    json!({ "success": true, "updatedOrder": serialize(&order)? }),
                    true,
                )),
                None => Ok((order_not_found(), false)),
            }
        }
        Intent::DeleteOrder { order_name } => {
            let resolved = store.find_order(&order_name).map(|order| order.id.clone());
            match resolved.and_then(|id| store.remove_order(&id)) {
                Some(_) => Ok((json!({ "success": true, "message": "Order deleted." }), true)),
                None => Ok((
                    json!({ "success": false, "message": "Order not found." }),
                    false,
                )),
            }
        }
        Intent::SetDeliveryDate {
            order_name,
            delivery_date,
        } => {
            let Some(timestamp) = parse_delivery_date(&delivery_date) else {
                return Ok((
                    json!({
                        "success": false,
                        "message": format!(
                            "Invalid date format provided by model. Could not parse: {delivery_date}"
                        )
                    }),
                    false,
                ));
            };

            let resolved = store.find_order(&order_name).map(|order| order.id.clone());
            match resolved.and_then(|id| store.set_delivery_date(&id, timestamp)) {
                Some(order) => Ok((
                    json!({ "success": true, "updatedOrder": serialize(&order)? }),
                    true,
                )),
                None => Ok((order_not_found(), false)),
            }
        }
        Intent::GetOrderDetails { order_name } => match store.find_order(&order_name) {
            Some(order) => Ok((
                json!({ "success": true, "orderDetails": serialize(order)? }),
                false,
            )),
            None => Ok((order_not_found(), false)),
        },
        Intent::GetDashboardSummary => {
            let summary = store.dashboard_summary(MonthKey::current());
            Ok((
                json!({
                    "progressCount": summary.progress_count,
                    "totalDebt": summary.total_debt,
                    "thisMonthIncome": summary.month_income,
                    "thisMonthExpenses": summary.month_expenses,
                    "monthlyCraftsmanshipProfit": summary.month_labor_profit,
                }),
                false,
            ))
        }
        Intent::AddExpense {
            description,
            amount,
        } => {
            let expense = store.add_expense(description, amount);
            Ok((json!({ "success": true, "expenseId": expense.id }), true))
        }
        Intent::CalculateDetailedCost { items } => Ok((detailed_cost(store, &items), false)),
        Intent::AddNotepadEntry {
            client_name,
            amount,
        } => {
            let entry = store.add_notepad_entry(client_name, amount);
            Ok((json!({ "success": true, "entryId": entry.id }), true))
        }
        Intent::UpdateNotepadEntry {
            client_name,
            amount_change,
        } => {
            let resolved = store
                .find_notepad_entry(&client_name)
                .map(|entry| entry.id.clone());
            match resolved.and_then(|id| store.adjust_notepad_amount(&id, amount_change)) {
                Some(_) => Ok((
                    json!({ "success": true, "message": "Notepad updated." }),
                    true,
                )),
                None => Ok((
                    json!({ "success": false, "message": "Client not found." }),
                    false,
                )),
            }
        }
    }
}

fn register_order(store: &mut WorkshopStore, order: RegisterOrder) -> Result<(Value, bool), ToolError> {
    let mut draft = OrderDraft::new(order.name, order.client_name, order.kind, order.total_cost)
        .with_paid_amount(order.paid_amount);
    if let Some(labor_cost) = order.labor_cost {
        draft = draft.with_labor_cost(labor_cost);
    }

    let created = store.add_order(draft);
    Ok((json!({ "success": true, "newOrder": serialize(&created)? }), true))
}

/// Per-item resolution against the price catalog: matched items contribute
/// `price × quantity`; unmatched items are flagged, not fatal.
fn detailed_cost(store: &WorkshopStore, items: &[MaterialQuantity]) -> Value {
    let mut total_cost = 0.0;
    let mut all_items_found = true;
    let mut lines = Vec::with_capacity(items.len());

    for item in items {
        match store.find_material(&item.name) {
            Some(material) => {
                let cost = material.price * item.quantity;
                total_cost += cost;
                lines.push(json!({
                    "name": item.name,
                    "quantity": item.quantity,
                    "unit": material.unit,
                    "cost": cost,
                    "found": true,
                }));
            }
            None => {
                all_items_found = false;
                lines.push(json!({
                    "name": item.name,
                    "quantity": item.quantity,
                    "found": false,
                }));
            }
        }
    }

    json!({
        "totalCost": total_cost,
        "items": lines,
        "allItemsFound": all_items_found,
    })
}

fn order_not_found() -> Value {
    json!({ "success": false, "message": "Order not found." })
}

fn serialize<T: serde::Serialize>(record: &T) -> Result<Value, ToolError> {
    serde_json::to_value(record)
        .map_err(|err| ToolError::execution(format!("failed to serialize record: {err}")))
}

fn parse_delivery_date(value: &str) -> Option<i64> {
    let date = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()?;
    let midnight = date.and_hms_opt(0, 0, 0)?;
    Local
        .from_local_datetime(&midnight)
        .earliest()
        .map(|instant| instant.timestamp_millis())
}
