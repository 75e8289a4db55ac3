//! The bill list pipeline: fetch, format, sort.

use crate::api::BillStore;
use crate::model::format;
use crate::model::Bill;
use crate::ui::{Navigate, ROUTE_NEW_BILL};
use crate::Result;
use anyhow::Context;
use chrono::NaiveDate;
use serde::Serialize;
use std::cmp::Ordering;
use tracing::warn;

/// A bill record augmented with human-readable date and status strings for
/// rendering. The raw record is kept alongside because ordering and the
/// receipt affordance both need canonical values, not display strings.
#[derive(Debug, Clone, Serialize)]
pub struct DisplayBill {
    #[serde(flatten)]
    pub bill: Bill,
    pub date_display: String,
    pub status_display: String,
}

impl DisplayBill {
    /// Formats one record for display. A malformed date falls back to the
    /// raw stored value; one bad record must never drop the rest of the list.
    fn from_bill(bill: Bill) -> Self {
        let date_display = match format::format_date(&bill.date) {
            Ok(formatted) => formatted,
            Err(e) => {
                warn!("showing the raw date for bill {:?}: {e:#}", bill.id);
                bill.date.clone()
            }
        };
        let status_display = format::format_status(&bill.status);
        Self {
            bill,
            date_display,
            status_display,
        }
    }

    /// The attachment URL behind the row's "eye" affordance.
    pub fn receipt_url(&self) -> Result<&str> {
        self.bill
            .file_url
            .as_deref()
            .with_context(|| format!("Bill {:?} has no receipt attached", self.bill.id))
    }
}

/// Fetches bills from the store and produces the sorted, display-formatted
/// render model. Read-only: nothing here mutates store state.
pub struct BillList {
    store: Box<dyn BillStore + Send>,
    navigate: Box<dyn Navigate + Send>,
}

impl BillList {
    pub fn new(store: Box<dyn BillStore + Send>, navigate: Box<dyn Navigate + Send>) -> Self {
        Self { store, navigate }
    }

    /// Fetches, formats and sorts the bills for rendering, most recent first.
    ///
    /// A store rejection degrades to an empty list rather than failing the
    /// whole render; per-record formatting failures degrade that record only.
    pub async fn get_bills(&mut self) -> Vec<DisplayBill> {
        let raw = match self.store.list().await {
            Ok(bills) => bills,
            Err(e) => {
                warn!("failed to fetch bills, rendering an empty list: {e:#}");
                return Vec::new();
            }
        };
        let mut rows: Vec<DisplayBill> = raw.into_iter().map(DisplayBill::from_bill).collect();
        // Order on the parsed canonical date, never on display strings:
        // lexicographic comparison of formatted dates is unsafe across
        // months and years. Records with unparsable dates sort last.
        rows.sort_by(|a, b| {
            match (canonical_date(&a.bill), canonical_date(&b.bill)) {
                (Some(a), Some(b)) => b.cmp(&a),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        });
        rows
    }

    /// The "new bill" affordance: navigates to the creation route.
    pub fn handle_click_new_bill(&mut self) {
        self.navigate.navigate(ROUTE_NEW_BILL);
    }
}

fn canonical_date(bill: &Bill) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(bill.date.trim(), "%Y-%m-%d").ok()
}
