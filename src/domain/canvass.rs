//! Canvass comparison of supplier quotations against an order.
//!
//! The order supplies the canonical item list. Each quotation is read
//! positionally: an `Item` response opens a line, and the `Price per Unit`
//! and `Quantity` responses after it belong to that line. Additional charges
//! add to the quotation's subtotal but not to any line.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{
    Config, DuplicateSectionGroup, FormKind, Request, Response,
    duplicate::build_positional_sections, fields, unit::format_item_label,
};

/// A required part of a system-defined form is missing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DataShapeError {
    /// The form lacks a fixed field.
    #[error("form '{form}' has no '{field}' field")]
    MissingField {
        /// Form name.
        form: String,
        /// The missing field.
        field: &'static str,
    },
    /// A fixed field was left unanswered.
    #[error("'{field}' is unanswered in section '{section}' of request {request}")]
    MissingResponse {
        /// The request being read.
        request: Uuid,
        /// Section name.
        section: String,
        /// The unanswered field.
        field: &'static str,
    },
}

/// An item requested on the order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalItem {
    /// Composite label, as offered in the quotation's item dropdown.
    pub label: String,
    /// General name.
    pub name: String,
    /// Requested quantity.
    pub quantity: f64,
    /// Unit of measurement, if given.
    pub unit: Option<String>,
    /// `"<field>: <value>"` pairs for the remaining fields, comma-joined.
    pub description: String,
}

/// One quoted line: an item with the price and quantity given for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuotedLine {
    /// The quotation it came from.
    pub quotation_id: Uuid,
    /// Price per unit, if answered.
    pub price: Option<f64>,
    /// Quantity, if answered.
    pub quantity: Option<f64>,
}

/// Running totals of one quotation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuotationTotals {
    /// The quotation.
    pub quotation_id: Uuid,
    /// Every unit price plus every additional charge.
    pub subtotal: f64,
    /// Additional charges only.
    pub additional_charges: f64,
}

/// The quotation with the lowest subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Recommendation {
    /// The recommended quotation.
    pub quotation_id: Uuid,
    /// Its subtotal.
    pub total: f64,
}

/// Outcome of comparing quotations against an order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanvassResult {
    /// The order being canvassed.
    pub order_id: Uuid,
    /// Items requested on the order, in order.
    pub items: Vec<CanonicalItem>,
    /// Quoted lines keyed by item label. Every canonical item has an entry,
    /// possibly empty.
    pub lines: BTreeMap<String, Vec<QuotedLine>>,
    /// Lowest quoted unit price per canonical item label.
    pub lowest_price: BTreeMap<String, f64>,
    /// Totals per quotation, in input order.
    pub quotations: Vec<QuotationTotals>,
    /// The lowest additional-charge subtotal across quotations.
    pub lowest_additional_charge: Option<f64>,
    /// Quotation ids by subtotal, lowest first. Ties keep input order.
    pub ranking: Vec<Uuid>,
    /// The lowest-subtotal quotation.
    pub recommended: Option<Recommendation>,
}

impl CanvassResult {
    /// Totals of the given quotation.
    #[must_use]
    pub fn totals(&self, quotation_id: Uuid) -> Option<&QuotationTotals> {
        self.quotations
            .iter()
            .find(|totals| totals.quotation_id == quotation_id)
    }
}

/// Compares quotations against the order they reference.
///
/// `quotations` are expected to be the pending quotations of `order`; they
/// are not re-checked here.
///
/// # Errors
///
/// Returns a [`DataShapeError`] if an order item lacks its general name, or a
/// quotation form has no `Item` field.
pub fn compute_canvass(
    order: &Request,
    quotations: &[Request],
    config: &Config,
) -> Result<CanvassResult, DataShapeError> {
    let items = canonical_items(order, config)?;

    let mut lines: BTreeMap<String, Vec<QuotedLine>> = items
        .iter()
        .map(|item| (item.label.clone(), Vec::new()))
        .collect();
    let mut totals = Vec::with_capacity(quotations.len());

    for quotation in quotations {
        let quoted = quoted_lines(quotation, config)?;
        let mut subtotal = quoted.additional_charges;
        for (label, line) in quoted.lines {
            subtotal += line.price.unwrap_or_default();
            lines.entry(label).or_default().push(line);
        }
        tracing::debug!(
            quotation = %quotation.id,
            subtotal,
            additional_charges = quoted.additional_charges,
            "quotation totals"
        );
        totals.push(QuotationTotals {
            quotation_id: quotation.id,
            subtotal,
            additional_charges: quoted.additional_charges,
        });
    }

    let lowest_price = items
        .iter()
        .filter_map(|item| {
            let lowest = lines
                .get(&item.label)?
                .iter()
                .filter_map(|line| line.price)
                .min_by(f64::total_cmp)?;
            Some((item.label.clone(), lowest))
        })
        .collect();

    let lowest_additional_charge = totals
        .iter()
        .map(|totals| totals.additional_charges)
        .min_by(f64::total_cmp);

    let mut ranked: Vec<&QuotationTotals> = totals.iter().collect();
    ranked.sort_by(|a, b| a.subtotal.total_cmp(&b.subtotal));
    let recommended = ranked.first().map(|best| Recommendation {
        quotation_id: best.quotation_id,
        total: best.subtotal,
    });
    let ranking = ranked.iter().map(|totals| totals.quotation_id).collect();

    Ok(CanvassResult {
        order_id: order.id,
        items,
        lines,
        lowest_price,
        quotations: totals,
        lowest_additional_charge,
        ranking,
        recommended,
    })
}

/// The items requested on an order, skipping its leading non-item sections.
///
/// # Errors
///
/// Returns a [`DataShapeError`] if an item instance has no general name.
pub fn canonical_items(
    order: &Request,
    config: &Config,
) -> Result<Vec<CanonicalItem>, DataShapeError> {
    order
        .item_sections(config.leading_sections(FormKind::OrderToPurchase))
        .iter()
        .map(|group| canonical_item(order, group, config))
        .collect()
}

fn canonical_item(
    order: &Request,
    group: &DuplicateSectionGroup<'_>,
    config: &Config,
) -> Result<CanonicalItem, DataShapeError> {
    if !group
        .fields
        .iter()
        .any(|slot| slot.field.name == fields::GENERAL_NAME)
    {
        return Err(DataShapeError::MissingField {
            form: order.form.name.clone(),
            field: fields::GENERAL_NAME,
        });
    }
    let name = group
        .text(fields::GENERAL_NAME)
        .ok_or_else(|| DataShapeError::MissingResponse {
            request: order.id,
            section: group.section.name.clone(),
            field: fields::GENERAL_NAME,
        })?;
    let quantity = group.number(fields::QUANTITY).unwrap_or_default();
    let unit = group
        .text(fields::UNIT_OF_MEASUREMENT)
        .filter(|unit| !unit.trim().is_empty());

    let description = group
        .fields
        .iter()
        .filter(|slot| {
            let name = slot.field.name.as_str();
            name != fields::GENERAL_NAME
                && name != fields::QUANTITY
                && name != fields::UNIT_OF_MEASUREMENT
                && !config.is_excluded_from_description(name)
        })
        .filter_map(|slot| {
            let value = slot.response?.as_text();
            (!value.is_empty()).then(|| format!("{}: {value}", slot.field.name))
        })
        .collect::<Vec<_>>()
        .join(", ");

    let mut label = format_item_label(&name, quantity, unit.as_deref());
    if !description.is_empty() {
        label = format!("{label} ({description})");
    }

    Ok(CanonicalItem {
        label,
        name,
        quantity,
        unit,
        description,
    })
}

struct Quoted {
    lines: Vec<(String, QuotedLine)>,
    additional_charges: f64,
}

fn quoted_lines(quotation: &Request, config: &Config) -> Result<Quoted, DataShapeError> {
    let form = &quotation.form;
    let section = form
        .field_named(fields::ITEM)
        .and_then(|item| form.section_of_field(item.id))
        .ok_or_else(|| DataShapeError::MissingField {
            form: form.name.clone(),
            field: fields::ITEM,
        })?;

    let mut stream: Vec<&Response> = Vec::new();
    let mut additional_charges = 0.0;
    for response in quotation
        .responses
        .iter()
        .filter(|response| response.request_id == quotation.id)
    {
        let Some(field) = form.field(response.field_id) else {
            continue;
        };
        match field.name.as_str() {
            fields::ITEM | fields::PRICE_PER_UNIT | fields::QUANTITY => stream.push(response),
            name if config.is_additional_charge(name) => {
                additional_charges += response.as_number().unwrap_or_default();
            }
            _ => {}
        }
    }

    let lines = build_positional_sections(section, &stream, fields::ITEM, quotation.id)
        .iter()
        .filter_map(|group| {
            let label = group.text(fields::ITEM)?;
            Some((
                label,
                QuotedLine {
                    quotation_id: quotation.id,
                    price: group.number(fields::PRICE_PER_UNIT),
                    quantity: group.number(fields::QUANTITY),
                },
            ))
        })
        .collect();

    Ok(Quoted {
        lines,
        additional_charges,
    })
}
