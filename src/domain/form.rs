use std::{cmp::Ordering, fmt};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::fields;

/// A form is an ordered tree of sections, fields and options.
///
/// Storage makes no promise about ordering. Call [`Form::normalize`] (or use
/// the `ordered_*` accessors) before relying on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Form {
    /// Globally unique form identifier.
    pub id: Uuid,
    /// Display name. System-defined forms are recognised by name.
    pub name: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Whether this is a system-defined form with fixed field semantics.
    #[serde(default)]
    pub is_formsly_form: bool,
    /// Sections of the form.
    #[serde(default)]
    pub sections: Vec<Section>,
}

/// A group of fields. Duplicatable sections may be answered several times
/// within one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Section identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Position within the form. Missing values sort last.
    #[serde(default)]
    pub order: Option<u32>,
    /// Whether a request may carry several instances of this section.
    #[serde(default)]
    pub is_duplicatable: bool,
    /// Fields of the section.
    #[serde(default)]
    pub fields: Vec<Field>,
}

/// A single question on a form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Field identifier.
    pub id: Uuid,
    /// Display name, also used to recognise fixed fields.
    pub name: String,
    /// Kind of input.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Position within the section. Missing values sort last.
    #[serde(default)]
    pub order: Option<u32>,
    /// Whether an answer is mandatory.
    #[serde(default)]
    pub is_required: bool,
    /// Choices for dropdown and multiselect fields.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,
}

/// A choice offered by a dropdown or multiselect field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    /// Option identifier.
    pub id: Uuid,
    /// The value stored when the option is picked.
    pub value: String,
    /// Position within the field. Missing values sort last.
    #[serde(default)]
    pub order: Option<u32>,
}

/// The input type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldType {
    /// Single line of text.
    Text,
    /// Multi-line text.
    Textarea,
    /// Decimal number.
    Number,
    /// One choice from the options.
    Dropdown,
    /// Any number of choices from the options.
    Multiselect,
    /// Calendar date.
    Date,
    /// Time of day.
    Time,
    /// On/off toggle.
    Switch,
    /// Uploaded file reference.
    File,
    /// URL.
    Link,
    /// Yes/no answer shown only when reviewing.
    Boolean,
}

/// System-defined form families the projections know how to summarise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormKind {
    /// Order to Purchase.
    OrderToPurchase,
    /// Supplier quotation against an order.
    Quotation,
    /// Receiving/inspection report against a quotation.
    ReceivingInspectingReport,
}

impl FormKind {
    /// Recognises a system-defined form by its name.
    #[must_use]
    pub fn from_form_name(name: &str) -> Option<Self> {
        match name {
            fields::ORDER_TO_PURCHASE_FORM => Some(Self::OrderToPurchase),
            fields::QUOTATION_FORM => Some(Self::Quotation),
            fields::RECEIVING_INSPECTING_REPORT_FORM => Some(Self::ReceivingInspectingReport),
            _ => None,
        }
    }

    /// The form name this kind is recognised by.
    #[must_use]
    pub const fn form_name(self) -> &'static str {
        match self {
            Self::OrderToPurchase => fields::ORDER_TO_PURCHASE_FORM,
            Self::Quotation => fields::QUOTATION_FORM,
            Self::ReceivingInspectingReport => fields::RECEIVING_INSPECTING_REPORT_FORM,
        }
    }
}

impl fmt::Display for FormKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.form_name())
    }
}

/// Compares two optional order values so that missing values sort last.
fn by_order(a: Option<u32>, b: Option<u32>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

impl Form {
    /// Sorts sections, fields and options by their order values.
    ///
    /// The sort is stable, so entries with equal (or missing) order keep
    /// their stored relative position. Calling this repeatedly is a no-op.
    pub fn normalize(&mut self) {
        self.sections.sort_by(|a, b| by_order(a.order, b.order));
        for section in &mut self.sections {
            section.normalize();
        }
    }

    /// Consumes the form and returns it normalized.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }

    /// Sections in display order, without mutating the form.
    #[must_use]
    pub fn ordered_sections(&self) -> Vec<&Section> {
        let mut sections: Vec<_> = self.sections.iter().collect();
        sections.sort_by(|a, b| by_order(a.order, b.order));
        sections
    }

    /// The system-defined family of this form, if any.
    ///
    /// User-defined forms never map to a kind, even if their name matches.
    #[must_use]
    pub fn kind(&self) -> Option<FormKind> {
        if self.is_formsly_form {
            FormKind::from_form_name(&self.name)
        } else {
            None
        }
    }

    /// Looks up a section by id.
    #[must_use]
    pub fn section(&self, id: Uuid) -> Option<&Section> {
        self.sections.iter().find(|section| section.id == id)
    }

    /// Looks up a field anywhere in the form.
    #[must_use]
    pub fn field(&self, id: Uuid) -> Option<&Field> {
        self.sections
            .iter()
            .flat_map(|section| &section.fields)
            .find(|field| field.id == id)
    }

    /// Looks up a field by name anywhere in the form.
    #[must_use]
    pub fn field_named(&self, name: &str) -> Option<&Field> {
        self.sections
            .iter()
            .flat_map(|section| &section.fields)
            .find(|field| field.name == name)
    }

    /// The section that owns the given field.
    #[must_use]
    pub fn section_of_field(&self, field_id: Uuid) -> Option<&Section> {
        self.sections
            .iter()
            .find(|section| section.has_field(field_id))
    }
}

impl Section {
    /// Sorts fields and their options by order value.
    pub fn normalize(&mut self) {
        self.fields.sort_by(|a, b| by_order(a.order, b.order));
        for field in &mut self.fields {
            field.options.sort_by(|a, b| by_order(a.order, b.order));
        }
    }

    /// Fields in display order, without mutating the section.
    #[must_use]
    pub fn ordered_fields(&self) -> Vec<&Field> {
        let mut fields: Vec<_> = self.fields.iter().collect();
        fields.sort_by(|a, b| by_order(a.order, b.order));
        fields
    }

    /// Whether the field belongs to this section.
    #[must_use]
    pub fn has_field(&self, field_id: Uuid) -> bool {
        self.fields.iter().any(|field| field.id == field_id)
    }
}

impl Field {
    /// Options in display order, without mutating the field.
    #[must_use]
    pub fn ordered_options(&self) -> Vec<&FieldOption> {
        let mut options: Vec<_> = self.options.iter().collect();
        options.sort_by(|a, b| by_order(a.order, b.order));
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str, order: Option<u32>) -> Field {
        Field {
            id: Uuid::new_v4(),
            name: name.to_string(),
            field_type: FieldType::Text,
            order,
            is_required: false,
            options: Vec::new(),
        }
    }

    fn section(name: &str, order: Option<u32>, fields: Vec<Field>) -> Section {
        Section {
            id: Uuid::new_v4(),
            name: name.to_string(),
            order,
            is_duplicatable: false,
            fields,
        }
    }

    fn shuffled_form() -> Form {
        Form {
            id: Uuid::new_v4(),
            name: "Custom".to_string(),
            description: String::new(),
            is_formsly_form: false,
            sections: vec![
                section("unordered", None, vec![field("b", None), field("a", Some(1))]),
                section(
                    "third",
                    Some(3),
                    vec![field("z", Some(9)), field("y", Some(2)), field("x", Some(2))],
                ),
                section("first", Some(1), vec![]),
            ],
        }
    }

    fn section_names(form: &Form) -> Vec<&str> {
        form.sections.iter().map(|s| s.name.as_str()).collect()
    }

    fn field_names(section: &Section) -> Vec<&str> {
        section.fields.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn sections_sort_ascending_with_missing_last() {
        let form = shuffled_form().normalized();
        assert_eq!(section_names(&form), ["first", "third", "unordered"]);
    }

    #[test]
    fn fields_sort_stably_within_section() {
        let form = shuffled_form().normalized();
        let third = &form.sections[1];
        // y and x share an order value and keep their stored order
        assert_eq!(field_names(third), ["y", "x", "z"]);
        let unordered = &form.sections[2];
        assert_eq!(field_names(unordered), ["a", "b"]);
    }

    #[test]
    fn normalize_is_idempotent() {
        let once = shuffled_form().normalized();
        let twice = once.clone().normalized();
        assert_eq!(once, twice);
    }

    #[test]
    fn ordered_accessors_agree_with_normalize() {
        let form = shuffled_form();
        let ordered: Vec<_> = form.ordered_sections().iter().map(|s| s.id).collect();
        let normalized: Vec<_> = form.clone().normalized().sections.iter().map(|s| s.id).collect();
        assert_eq!(ordered, normalized);
    }

    #[test]
    fn options_sort_by_order() {
        let mut dropdown = field("choice", Some(1));
        dropdown.field_type = FieldType::Dropdown;
        dropdown.options = vec![
            FieldOption {
                id: Uuid::new_v4(),
                value: "late".to_string(),
                order: Some(5),
            },
            FieldOption {
                id: Uuid::new_v4(),
                value: "early".to_string(),
                order: Some(0),
            },
        ];
        let values: Vec<_> = dropdown
            .ordered_options()
            .iter()
            .map(|o| o.value.clone())
            .collect();
        assert_eq!(values, ["early", "late"]);
    }

    #[test]
    fn kind_requires_system_form() {
        let mut form = shuffled_form();
        form.name = "Quotation".to_string();
        assert_eq!(form.kind(), None);
        form.is_formsly_form = true;
        assert_eq!(form.kind(), Some(FormKind::Quotation));
    }
}
