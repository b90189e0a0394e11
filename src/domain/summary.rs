//! Row-per-item summaries of a request's item sections.
//!
//! Rows whose numbers cannot be read are skipped with a debug log rather
//! than failing the whole summary.

use serde::Serialize;

use crate::domain::{
    Config, DuplicateSectionGroup, FormKind, Request, fields,
    unit::{extract_quantity, extract_unit},
};

/// One item row of a summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    /// The raw item label response. Rows are sorted by this.
    pub item: String,
    /// Quantity.
    pub quantity: f64,
    /// Unit, recovered from the label where the form has no unit field.
    pub unit: Option<String>,
    /// Form-specific columns.
    pub extra: SummaryExtra,
}

/// Columns that only some forms carry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SummaryExtra {
    /// Order to Purchase accounting columns.
    Order {
        /// Cost code.
        cost_code: Option<String>,
        /// GL account.
        gl_account: Option<String>,
    },
    /// Quotation pricing columns.
    Quotation {
        /// Price per unit.
        price: f64,
        /// Price times quantity.
        total: f64,
    },
    /// Receiving report status column.
    Receiving {
        /// Receiving status.
        status: Option<String>,
    },
}

/// A summary table for one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    /// The form kind summarised.
    pub kind: FormKind,
    /// Item rows, sorted by raw item label.
    pub rows: Vec<SummaryRow>,
    /// Sum of line totals, for quotations.
    pub grand_total: Option<f64>,
}

impl Summary {
    /// Summarises a request of a system-defined form.
    ///
    /// Returns `None` for user-defined forms.
    #[must_use]
    pub fn for_request(request: &Request, config: &Config) -> Option<Self> {
        let kind = request.kind()?;
        Some(build_summary_rows(
            &request.item_sections(config.leading_sections(kind)),
            kind,
        ))
    }
}

/// Builds the item table from the item section instances of a request.
///
/// `groups` should already exclude the leading non-item sections; see
/// [`Request::item_sections`].
#[must_use]
pub fn build_summary_rows(groups: &[DuplicateSectionGroup<'_>], kind: FormKind) -> Summary {
    let mut rows: Vec<SummaryRow> = groups
        .iter()
        .filter_map(|group| summary_row(group, kind))
        .collect();
    rows.sort_by(|a, b| a.item.cmp(&b.item));

    let grand_total = (kind == FormKind::Quotation).then(|| {
        rows.iter()
            .map(|row| match row.extra {
                SummaryExtra::Quotation { total, .. } => total,
                _ => 0.0,
            })
            .sum()
    });

    Summary {
        kind,
        rows,
        grand_total,
    }
}

fn summary_row(group: &DuplicateSectionGroup<'_>, kind: FormKind) -> Option<SummaryRow> {
    let skip = |reason: &str| {
        tracing::debug!(
            section = %group.section.name,
            instance = %group.id,
            reason,
            "skipping summary row"
        );
    };

    let Some(item) = group.first().and_then(|slot| slot.response).map(|r| r.as_text()) else {
        skip("no item label");
        return None;
    };
    let Some(quantity) = group.number(fields::QUANTITY) else {
        skip("quantity is not a number");
        return None;
    };

    match kind {
        FormKind::OrderToPurchase => Some(SummaryRow {
            unit: group
                .text(fields::UNIT_OF_MEASUREMENT)
                .filter(|unit| !unit.trim().is_empty()),
            extra: SummaryExtra::Order {
                cost_code: group.text(fields::COST_CODE),
                gl_account: group.text(fields::GL_ACCOUNT),
            },
            item,
            quantity,
        }),
        FormKind::Quotation | FormKind::ReceivingInspectingReport => {
            if extract_quantity(&item).is_none() {
                skip("item label has no quantity");
                return None;
            }
            let extra = if kind == FormKind::Quotation {
                let Some(price) = group.number(fields::PRICE_PER_UNIT) else {
                    skip("price is not a number");
                    return None;
                };
                SummaryExtra::Quotation {
                    price,
                    total: price * quantity,
                }
            } else {
                SummaryExtra::Receiving {
                    status: group.text(fields::RECEIVING_STATUS),
                }
            };
            Some(SummaryRow {
                unit: extract_unit(&item),
                item,
                quantity,
                extra,
            })
        }
    }
}
