//! Pure read-derivations over the store collections.
//!
//! Every function here is side-effect free. Calendar comparisons use the
//! local time zone at evaluation time; month-keyed aggregates take the month
//! explicitly so callers (and tests) control the evaluation point.

use chrono::{DateTime, Datelike, Local, NaiveDate, Utc};

use crate::records::{Order, OrderStatus};
use crate::store::WorkshopStore;

pub(crate) fn local_date(ts_millis: i64) -> Option<NaiveDate> {
    DateTime::<Utc>::from_timestamp_millis(ts_millis)
        .map(|instant| instant.with_timezone(&Local).date_naive())
}

/// A calendar month in the local time zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    pub fn of(ts_millis: i64) -> Option<Self> {
        local_date(ts_millis).map(|date| Self {
            year: date.year(),
            month: date.month(),
        })
    }

    pub fn current() -> Self {
        let now = Local::now();
        Self {
            year: now.year(),
            month: now.month(),
        }
    }

    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    pub fn contains(&self, ts_millis: i64) -> bool {
        Self::of(ts_millis) == Some(*self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DashboardSummary {
    pub progress_count: usize,
    pub total_debt: f64,
    pub month_income: f64,
    pub month_expenses: f64,
    pub month_labor_profit: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthlyTotals {
    pub month: MonthKey,
    pub income: f64,
    pub expenses: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSort {
    Newest,
    Oldest,
    Name,
}

impl WorkshopStore {
    /// Outstanding balance across all orders, computed, never stored.
    pub fn total_debt(&self) -> f64 {
        self.orders.iter().map(Order::remaining).sum()
    }

    pub fn notepad_debt(&self) -> f64 {
        self.notepad.iter().map(|entry| entry.amount).sum()
    }

    pub fn progress_count(&self) -> usize {
        self.orders
            .iter()
            .filter(|order| order.status == OrderStatus::Progress)
            .count()
    }

    /// Paid amounts over orders created in `month`. Payment timing is not
    /// tracked separately from order creation, so the creation month is the
    /// aggregation key.
    pub fn monthly_income(&self, month: MonthKey) -> f64 {
        self.orders
            .iter()
            .filter(|order| month.contains(order.created_at))
            .map(|order| order.paid_amount)
            .sum()
    }

    pub fn monthly_expenses(&self, month: MonthKey) -> f64 {
        self.expenses
            .iter()
            .filter(|expense| month.contains(expense.date))
            .map(|expense| expense.amount)
            .sum()
    }

    pub fn monthly_labor_profit(&self, month: MonthKey) -> f64 {
        self.orders
            .iter()
            .filter(|order| month.contains(order.created_at))
            .filter_map(|order| order.labor_cost)
            .sum()
    }

    pub fn dashboard_summary(&self, month: MonthKey) -> DashboardSummary {
        DashboardSummary {
            progress_count: self.progress_count(),
            total_debt: self.total_debt(),
            month_income: self.monthly_income(month),
            month_expenses: self.monthly_expenses(month),
            month_labor_profit: self.monthly_labor_profit(month),
        }
    }

    /// Income/expense totals for the `span` months ending at `last`,
    /// chronologically ascending.
    pub fn monthly_series(&self, last: MonthKey, span: usize) -> Vec<MonthlyTotals> {
        let mut months = Vec::with_capacity(span);
        let mut cursor = last;
        for _ in 0..span {
            months.push(cursor);
            cursor = cursor.previous();
        }
        months.reverse();

        months
            .into_iter()
            .map(|month| MonthlyTotals {
                month,
                income: self.monthly_income(month),
                expenses: self.monthly_expenses(month),
            })
            .collect()
    }

    /// Orders with a delivery date, soonest first.
    pub fn scheduled_orders(&self) -> Vec<&Order> {
        let mut scheduled = self
            .orders
            .iter()
            .filter(|order| order.delivery_date.is_some())
            .collect::<Vec<_>>();
        scheduled.sort_by_key(|order| order.delivery_date);
        scheduled
    }

    pub fn deliveries_due_on(&self, day: NaiveDate) -> Vec<&Order> {
        self.orders
            .iter()
            .filter(|order| {
                order
                    .delivery_date
                    .and_then(local_date)
                    .is_some_and(|date| date == day)
            })
            .collect()
    }

    pub fn orders_created_on(&self, day: NaiveDate) -> Vec<&Order> {
        self.orders
            .iter()
            .filter(|order| local_date(order.created_at).is_some_and(|date| date == day))
            .collect()
    }

    pub fn search_orders(&self, term: &str) -> Vec<&Order> {
        let needle = term.to_lowercase();
        self.orders
            .iter()
            .filter(|order| order.name.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn sorted_orders(&self, sort: OrderSort) -> Vec<&Order> {
        let mut orders = self.orders.iter().collect::<Vec<_>>();
        match sort {
            OrderSort::Newest => orders.sort_by_key(|order| std::cmp::Reverse(order.created_at)),
            OrderSort::Oldest => orders.sort_by_key(|order| order.created_at),
            OrderSort::Name => orders.sort_by(|a, b| a.name.cmp(&b.name)),
        }
        orders
    }
}
