//! The spreadsheet view: every order with the quotations raised against it
//! and the receiving reports raised against those quotations.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{
    Config, FormKind, Request, RequestStatus, Summary, SummaryRow, fields,
};

/// One order and everything downstream of it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SsotRow {
    /// The order.
    pub order_id: Uuid,
    /// Who raised it.
    pub requester: Uuid,
    /// When it was raised.
    pub created: DateTime<Utc>,
    /// Its status.
    pub status: RequestStatus,
    /// Its item rows.
    pub items: Vec<SummaryRow>,
    /// Quotations referencing the order.
    pub quotations: Vec<SsotQuotation>,
}

/// A quotation in the rollup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SsotQuotation {
    /// The quotation.
    pub quotation_id: Uuid,
    /// Its status.
    pub status: RequestStatus,
    /// Its priced item rows.
    pub items: Vec<SummaryRow>,
    /// Sum of its line totals.
    pub grand_total: Option<f64>,
    /// Receiving reports referencing the quotation.
    pub receiving: Vec<SsotReceiving>,
}

/// A receiving report in the rollup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SsotReceiving {
    /// The report.
    pub report_id: Uuid,
    /// Its status.
    pub status: RequestStatus,
    /// Its item rows with receiving status.
    pub items: Vec<SummaryRow>,
}

/// Builds the rollup, newest order first.
///
/// `requests` may hold any mix of requests; orders, quotations and receiving
/// reports are told apart by form kind and linked through their
/// `Order to Purchase ID` and `Quotation ID` responses. Deleted requests are
/// left out.
#[must_use]
pub fn build_ssot(requests: &[Request], config: &Config) -> Vec<SsotRow> {
    let live = |kind: FormKind| {
        requests
            .iter()
            .filter(move |r| r.kind() == Some(kind) && r.status != RequestStatus::Deleted)
    };

    let mut orders: Vec<&Request> = live(FormKind::OrderToPurchase).collect();
    orders.sort_by(|a, b| b.created.cmp(&a.created));

    orders
        .into_iter()
        .map(|order| {
            let quotations = live(FormKind::Quotation)
                .filter(|q| q.references(fields::ORDER_TO_PURCHASE_ID, order.id))
                .map(|quotation| {
                    let receiving = live(FormKind::ReceivingInspectingReport)
                        .filter(|r| r.references(fields::QUOTATION_ID, quotation.id))
                        .map(|report| SsotReceiving {
                            report_id: report.id,
                            status: report.status,
                            items: rows(report, config),
                        })
                        .collect();
                    let summary = Summary::for_request(quotation, config);
                    SsotQuotation {
                        quotation_id: quotation.id,
                        status: quotation.status,
                        grand_total: summary.as_ref().and_then(|s| s.grand_total),
                        items: summary.map(|s| s.rows).unwrap_or_default(),
                        receiving,
                    }
                })
                .collect();

            SsotRow {
                order_id: order.id,
                requester: order.requester,
                created: order.created,
                status: order.status,
                items: rows(order, config),
                quotations,
            }
        })
        .collect()
}

fn rows(request: &Request, config: &Config) -> Vec<SummaryRow> {
    Summary::for_request(request, config)
        .map(|summary| summary.rows)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use serde_json::json;

    use super::*;
    use crate::domain::canvass::tests::{order_with_items, quotation};

    #[test]
    fn quotations_nest_under_their_order() {
        let mut older = order_with_items(&[("Cement", 10.0, "bags")]);
        older.created -= Duration::days(1);
        let newer = order_with_items(&[("Sand", 2.0, "cubic meters")]);
        let q = quotation(&older, &[("Cement (10 bags)", 5.0, 10.0)], &[("Delivery Fee", 1.0)]);
        let mut deleted = quotation(
            &older,
            &[("Cement (10 bags)", 4.0, 10.0)],
            &[("Delivery Fee", 1.0)],
        );
        deleted.status = RequestStatus::Deleted;

        let rollup = build_ssot(
            &[older.clone(), q.clone(), newer.clone(), deleted],
            &Config::default(),
        );

        assert_eq!(rollup.len(), 2);
        assert_eq!(rollup[0].order_id, newer.id);
        assert!(rollup[0].quotations.is_empty());
        assert_eq!(rollup[1].order_id, older.id);
        assert_eq!(rollup[1].items.len(), 1);
        assert_eq!(rollup[1].quotations.len(), 1);
        assert_eq!(rollup[1].quotations[0].quotation_id, q.id);
        assert_eq!(rollup[1].quotations[0].grand_total, Some(50.0));
    }

    #[test]
    fn unrelated_quotations_are_not_linked() {
        let order = order_with_items(&[("Cement", 10.0, "bags")]);
        let mut stray = quotation(&order, &[], &[]);
        stray.responses[0].value = json!(Uuid::new_v4().to_string()).to_string();

        let rollup = build_ssot(&[order, stray], &Config::default());

        assert!(rollup[0].quotations.is_empty());
    }
}
