//! Canvass aggregation over an order with many items and many competing
//! quotations, both in memory and through the file-backed directory.

#![allow(missing_docs)]

use chrono::Utc;
use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use formsly::{
    Config, Directory, Form, Request, RequestStatus, Response, Section, load_canvass,
    domain::{Field, FieldType, compute_canvass, fields, format_item_label},
};
use serde_json::{Value, json};
use tempfile::TempDir;
use uuid::Uuid;

const ITEMS: usize = 50;
const QUOTATIONS: usize = 40;

fn section(name: &str, order: u32, is_duplicatable: bool, names: &[&str]) -> Section {
    Section {
        id: Uuid::new_v4(),
        name: name.to_string(),
        order: Some(order),
        is_duplicatable,
        fields: names
            .iter()
            .zip(1..)
            .map(|(name, order)| Field {
                id: Uuid::new_v4(),
                name: (*name).to_string(),
                field_type: FieldType::Text,
                order: Some(order),
                is_required: true,
                options: Vec::new(),
            })
            .collect(),
    }
}

fn form(name: &str, sections: Vec<Section>) -> Form {
    Form {
        id: Uuid::new_v4(),
        name: name.to_string(),
        description: String::new(),
        is_formsly_form: true,
        sections,
    }
}

fn request(form: &Form) -> Request {
    Request {
        id: Uuid::new_v4(),
        form: form.clone(),
        requester: Uuid::new_v4(),
        status: RequestStatus::Pending,
        signers: Vec::new(),
        responses: Vec::new(),
        comments: Vec::new(),
        created: Utc::now(),
        additional_info: None,
    }
}

fn answer(request: &mut Request, name: &str, value: &Value, instance: Option<Uuid>) {
    let field = request.form.field_named(name).unwrap().id;
    let mut response = Response::new(field, request.id, value);
    response.duplicatable_section_id = instance;
    request.responses.push(response);
}

/// An order with `ITEMS` items and `QUOTATIONS` quotations pricing every one.
fn seed() -> (Request, Vec<Request>) {
    let order_form = form(
        fields::ORDER_TO_PURCHASE_FORM,
        vec![
            section("Main", 1, false, &["Project"]),
            section("Payment", 2, false, &["Date Needed"]),
            section(
                "Item",
                3,
                true,
                &[fields::GENERAL_NAME, fields::UNIT_OF_MEASUREMENT, fields::QUANTITY],
            ),
        ],
    );
    let quotation_form = form(
        fields::QUOTATION_FORM,
        vec![
            section("ID", 1, false, &[fields::ORDER_TO_PURCHASE_ID]),
            section("Main", 2, false, &["Supplier"]),
            section("Additional Charges", 3, false, &["Delivery Fee"]),
            section(
                "Item",
                4,
                true,
                &[fields::ITEM, fields::PRICE_PER_UNIT, fields::QUANTITY],
            ),
        ],
    );

    let mut order = request(&order_form);
    answer(&mut order, "Project", &json!("Tower A"), None);
    answer(&mut order, "Date Needed", &json!("2025-07-01"), None);
    let mut labels = Vec::with_capacity(ITEMS);
    for i in 0..ITEMS {
        let instance = Some(Uuid::new_v4());
        let name = format!("Item {i}");
        let quantity = (i + 1) * 100;
        answer(&mut order, fields::GENERAL_NAME, &json!(name), instance);
        answer(&mut order, fields::UNIT_OF_MEASUREMENT, &json!("pcs"), instance);
        answer(&mut order, fields::QUANTITY, &json!(quantity.to_string()), instance);
        #[allow(clippy::cast_precision_loss)]
        labels.push(format_item_label(&name, quantity as f64, Some("pcs")));
    }

    let quotations = (0..QUOTATIONS)
        .map(|q| {
            let mut quotation = request(&quotation_form);
            answer(
                &mut quotation,
                fields::ORDER_TO_PURCHASE_ID,
                &json!(order.id.to_string()),
                None,
            );
            answer(&mut quotation, "Supplier", &json!(format!("Supplier {q}")), None);
            answer(&mut quotation, "Delivery Fee", &json!((q * 10).to_string()), None);
            for (i, label) in labels.iter().enumerate() {
                let instance = Some(Uuid::new_v4());
                answer(&mut quotation, fields::ITEM, &json!(label), instance);
                let price = json!((i + q).to_string());
                answer(&mut quotation, fields::PRICE_PER_UNIT, &price, instance);
                answer(&mut quotation, fields::QUANTITY, &json!("1"), instance);
            }
            quotation
        })
        .collect();

    (order, quotations)
}

fn compute(c: &mut Criterion) {
    let (order, quotations) = seed();
    let config = Config::default();

    c.bench_function("compute canvass", |b| {
        b.iter(|| compute_canvass(&order, &quotations, &config).unwrap());
    });
}

fn load(c: &mut Criterion) {
    let (order, quotations) = seed();

    c.bench_function("load canvass from directory", |b| {
        b.iter_batched(
            || {
                let tmp_dir = TempDir::new().unwrap();
                let directory = Directory::open(tmp_dir.path().to_path_buf());
                directory.save_form(&order.form).unwrap();
                directory.save_form(&quotations[0].form).unwrap();
                directory.save_request(&order).unwrap();
                for quotation in &quotations {
                    directory.save_request(quotation).unwrap();
                }
                (tmp_dir, directory)
            },
            |(_tmp_dir, directory)| {
                load_canvass(&directory, order.id, directory.config()).unwrap();
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, compute, load);
criterion_main!(benches);
