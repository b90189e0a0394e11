//! Field and form names with fixed meaning on system-defined forms.
//!
//! User-defined forms may reuse these names freely; the aggregations only
//! assign them meaning on forms flagged `is_formsly_form`.

/// Form name of the order that quotations are canvassed against.
pub const ORDER_TO_PURCHASE_FORM: &str = "Order to Purchase";
/// Form name of a supplier quotation.
pub const QUOTATION_FORM: &str = "Quotation";
/// Form name of a receiving/inspection report.
pub const RECEIVING_INSPECTING_REPORT_FORM: &str = "Receiving Inspecting Report";

/// Quoted item label, matching a canonical order item label.
pub const ITEM: &str = "Item";
/// Unit price on a quotation line.
pub const PRICE_PER_UNIT: &str = "Price per Unit";
/// Quantity on an item line.
pub const QUANTITY: &str = "Quantity";
/// Item name on an order line.
pub const GENERAL_NAME: &str = "General Name";
/// Unit on an order line.
pub const UNIT_OF_MEASUREMENT: &str = "Unit of Measurement";
/// Accounting field on an order line.
pub const COST_CODE: &str = "Cost Code";
/// Accounting field on an order line.
pub const GL_ACCOUNT: &str = "GL Account";
/// Receiving status on an inspection line.
pub const RECEIVING_STATUS: &str = "Receiving Status";

/// Back-reference from a quotation to its order.
pub const ORDER_TO_PURCHASE_ID: &str = "Order to Purchase ID";
/// Back-reference from a receiving report to its quotation.
pub const QUOTATION_ID: &str = "Quotation ID";
