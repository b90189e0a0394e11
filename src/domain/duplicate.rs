//! Regrouping of flat response lists into section instances.
//!
//! A request stores its answers as one flat list. Responses that share a
//! `duplicatable_section_id` belong to one instance of a duplicated section;
//! responses without one belong to the single implicit instance. The
//! [`DuplicateSectionGroup`] is the transient view that pairs every field of
//! a section with the response of one instance.

use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::domain::{Field, Response, Section};

/// One instance of a section: every field of the section, in field order,
/// each with the response given in this instance (if any).
///
/// Groups borrow from the form and the response list and are rebuilt on
/// every aggregation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateSectionGroup<'a> {
    /// The section this is an instance of.
    pub section: &'a Section,
    /// The correlation key of the instance.
    ///
    /// For untagged responses this is derived from the request and section,
    /// so it is stable across repeated passes.
    pub id: Uuid,
    /// Every field of the section, aligned with its response.
    pub fields: Vec<FieldResponse<'a>>,
}

/// A field paired with its response in one section instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldResponse<'a> {
    /// The field.
    pub field: &'a Field,
    /// The response, or `None` if the field was left unanswered.
    pub response: Option<&'a Response>,
}

impl<'a> DuplicateSectionGroup<'a> {
    fn empty(section: &'a Section, id: Uuid) -> Self {
        let fields = section
            .ordered_fields()
            .into_iter()
            .map(|field| FieldResponse {
                field,
                response: None,
            })
            .collect();
        Self {
            section,
            id,
            fields,
        }
    }

    /// Records a response against its field. Later duplicates of the same
    /// field within one instance are ignored.
    fn attach(&mut self, response: &'a Response) {
        if let Some(slot) = self
            .fields
            .iter_mut()
            .find(|slot| slot.field.id == response.field_id)
        {
            if slot.response.is_none() {
                slot.response = Some(response);
            }
        }
    }

    /// The response to the named field in this instance.
    #[must_use]
    pub fn response(&self, field_name: &str) -> Option<&'a Response> {
        self.fields
            .iter()
            .find(|slot| slot.field.name == field_name)
            .and_then(|slot| slot.response)
    }

    /// The named field's response as display text.
    #[must_use]
    pub fn text(&self, field_name: &str) -> Option<String> {
        self.response(field_name).map(Response::as_text)
    }

    /// The named field's response as a number.
    #[must_use]
    pub fn number(&self, field_name: &str) -> Option<f64> {
        self.response(field_name).and_then(Response::as_number)
    }

    /// The first field of the instance, with its response.
    #[must_use]
    pub fn first(&self) -> Option<&FieldResponse<'a>> {
        self.fields.first()
    }
}

/// Splits the responses of one request into instances of `section`.
///
/// Only responses to fields of `section` that belong to `request_id` are
/// considered. Instances appear in the order their first response appears
/// in `responses`. All untagged responses form a single instance.
///
/// A non-duplicatable section whose responses carry several correlation
/// keys yields every instance found; see [`is_correlation_ambiguous`].
#[must_use]
pub fn build_duplicate_sections<'a>(
    section: &'a Section,
    responses: &'a [Response],
    request_id: Uuid,
) -> Vec<DuplicateSectionGroup<'a>> {
    let mut groups: Vec<DuplicateSectionGroup<'a>> = Vec::new();

    for response in responses
        .iter()
        .filter(|r| r.request_id == request_id && section.has_field(r.field_id))
    {
        let id = response
            .duplicatable_section_id
            .unwrap_or_else(|| implicit_instance_id(request_id, section.id));

        let index = match groups.iter().position(|group| group.id == id) {
            Some(index) => index,
            None => {
                groups.push(DuplicateSectionGroup::empty(section, id));
                groups.len() - 1
            }
        };
        groups[index].attach(response);
    }

    if is_correlation_ambiguous(section, &groups) {
        tracing::warn!(
            section = %section.name,
            request = %request_id,
            instances = groups.len(),
            "non-duplicatable section has several instances"
        );
    }

    groups
}

/// Regroups responses positionally: a new instance starts at every response
/// to the field named `anchor`, and later responses attach to the current
/// instance until the next anchor.
///
/// `responses` are walked in the given order. Responses seen before the first
/// anchor, or to fields outside the anchor's section, are ignored. The
/// output has the same shape as [`build_duplicate_sections`]; instance ids are
/// derived from the request and the instance position.
#[must_use]
pub fn build_positional_sections<'a>(
    section: &'a Section,
    responses: &[&'a Response],
    anchor: &str,
    request_id: Uuid,
) -> Vec<DuplicateSectionGroup<'a>> {
    let Some(anchor) = section.fields.iter().find(|field| field.name == anchor) else {
        return Vec::new();
    };

    let mut groups: Vec<DuplicateSectionGroup<'a>> = Vec::new();
    for &response in responses.iter().filter(|r| section.has_field(r.field_id)) {
        if response.field_id == anchor.id {
            let id = positional_instance_id(request_id, section.id, groups.len());
            groups.push(DuplicateSectionGroup::empty(section, id));
        }
        if let Some(current) = groups.last_mut() {
            current.attach(response);
        }
    }
    groups
}

/// Whether a non-duplicatable section came back as more than one instance.
///
/// This is surfaced rather than filtered, since dropping an instance could
/// hide a real answer.
#[must_use]
pub fn is_correlation_ambiguous(section: &Section, groups: &[DuplicateSectionGroup<'_>]) -> bool {
    !section.is_duplicatable
        && groups
            .iter()
            .filter(|group| group.section.id == section.id)
            .count()
            > 1
}

fn implicit_instance_id(request_id: Uuid, section_id: Uuid) -> Uuid {
    derived_id(&[request_id.as_bytes(), section_id.as_bytes()])
}

fn positional_instance_id(request_id: Uuid, section_id: Uuid, position: usize) -> Uuid {
    derived_id(&[
        request_id.as_bytes(),
        section_id.as_bytes(),
        &position.to_le_bytes(),
    ])
}

fn derived_id(parts: &[&[u8]]) -> Uuid {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    let hash = hasher.finalize();
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&hash[..16]);
    Uuid::from_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::FieldType;

    fn field(name: &str, order: u32) -> Field {
        Field {
            id: Uuid::new_v4(),
            name: name.to_string(),
            field_type: FieldType::Text,
            order: Some(order),
            is_required: false,
            options: Vec::new(),
        }
    }

    fn section(is_duplicatable: bool) -> Section {
        Section {
            id: Uuid::new_v4(),
            name: "Item".to_string(),
            order: Some(1),
            is_duplicatable,
            // stored out of order on purpose
            fields: vec![field("Quantity", 2), field("Item", 1), field("Notes", 3)],
        }
    }

    fn answer(section: &Section, name: &str, request: Uuid, value: &str) -> Response {
        let field = section.fields.iter().find(|f| f.name == name).unwrap();
        Response::new(field.id, request, &json!(value))
    }

    fn some(text: &str) -> Option<String> {
        Some(text.to_string())
    }

    fn texts(group: &DuplicateSectionGroup<'_>) -> Vec<Option<String>> {
        group
            .fields
            .iter()
            .map(|slot| slot.response.map(Response::as_text))
            .collect()
    }

    #[test]
    fn two_tagged_instances_form_two_aligned_groups() {
        let section = section(true);
        let request = Uuid::new_v4();
        let (first, second) = (Uuid::new_v4(), Uuid::new_v4());
        let responses = vec![
            answer(&section, "Item", request, "Cement").in_duplicate(first),
            answer(&section, "Item", request, "Sand").in_duplicate(second),
            answer(&section, "Quantity", request, "10").in_duplicate(first),
            answer(&section, "Notes", request, "grey").in_duplicate(first),
            answer(&section, "Quantity", request, "20").in_duplicate(second),
            answer(&section, "Notes", request, "fine").in_duplicate(second),
        ];

        let groups = build_duplicate_sections(&section, &responses, request);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].id, first);
        assert_eq!(groups[1].id, second);
        for group in &groups {
            assert_eq!(group.fields.len(), section.fields.len());
        }
        let names: Vec<_> = groups[0].fields.iter().map(|s| s.field.name.as_str()).collect();
        assert_eq!(names, ["Item", "Quantity", "Notes"]);
        assert_eq!(
            texts(&groups[0]),
            [some("Cement"), some("10"), some("grey")]
        );
        assert_eq!(
            texts(&groups[1]),
            [some("Sand"), some("20"), some("fine")]
        );
    }

    #[test]
    fn untagged_responses_collapse_into_one_group() {
        let section = section(false);
        let request = Uuid::new_v4();
        let responses = vec![
            answer(&section, "Item", request, "Cement"),
            answer(&section, "Quantity", request, "10"),
            answer(&section, "Notes", request, "grey"),
        ];

        let groups = build_duplicate_sections(&section, &responses, request);

        assert_eq!(groups.len(), 1);
        assert!(!is_correlation_ambiguous(&section, &groups));
    }

    #[test]
    fn repeated_calls_are_consistent() {
        let section = section(true);
        let request = Uuid::new_v4();
        let tag = Uuid::new_v4();
        let responses = vec![
            answer(&section, "Item", request, "Cement"),
            answer(&section, "Item", request, "Sand").in_duplicate(tag),
            answer(&section, "Quantity", request, "10"),
        ];

        let first = build_duplicate_sections(&section, &responses, request);
        let second = build_duplicate_sections(&section, &responses, request);

        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
        assert_eq!(first[1].id, tag);
    }

    #[test]
    fn missing_answers_leave_empty_slots() {
        let section = section(true);
        let request = Uuid::new_v4();
        let responses = vec![answer(&section, "Quantity", request, "10")];

        let groups = build_duplicate_sections(&section, &responses, request);

        assert_eq!(texts(&groups[0]), [None, some("10"), None]);
    }

    #[test]
    fn other_requests_and_sections_are_ignored() {
        let section = section(true);
        let request = Uuid::new_v4();
        let stray = Response::new(Uuid::new_v4(), request, &json!("elsewhere"));
        let foreign = answer(&section, "Item", Uuid::new_v4(), "Cement");

        let responses = [stray, foreign];

        let groups = build_duplicate_sections(&section, &responses, request);

        assert!(groups.is_empty());
    }

    #[test]
    fn ambiguous_non_duplicatable_section_surfaces_every_group() {
        let section = section(false);
        let request = Uuid::new_v4();
        let responses = vec![
            answer(&section, "Item", request, "Cement").in_duplicate(Uuid::new_v4()),
            answer(&section, "Item", request, "Sand").in_duplicate(Uuid::new_v4()),
        ];

        let groups = build_duplicate_sections(&section, &responses, request);

        assert_eq!(groups.len(), 2);
        assert!(is_correlation_ambiguous(&section, &groups));
    }

    #[test]
    fn positional_grouping_starts_a_group_at_each_anchor() {
        let section = section(true);
        let request = Uuid::new_v4();
        let responses = vec![
            answer(&section, "Quantity", request, "ignored"),
            answer(&section, "Item", request, "Cement"),
            answer(&section, "Quantity", request, "10"),
            answer(&section, "Item", request, "Sand"),
            answer(&section, "Quantity", request, "20"),
        ];
        let refs: Vec<_> = responses.iter().collect();

        let groups = build_positional_sections(&section, &refs, "Item", request);

        assert_eq!(groups.len(), 2);
        assert_eq!(texts(&groups[0]), [some("Cement"), some("10"), None]);
        assert_eq!(texts(&groups[1]), [some("Sand"), some("20"), None]);
        assert_ne!(groups[0].id, groups[1].id);
    }
}
