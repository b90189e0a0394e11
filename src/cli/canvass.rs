use std::path::PathBuf;

use clap::Parser;
use formsly::{CanvassResult, Directory, load_canvass};
use tracing::instrument;
use uuid::Uuid;

use super::terminal::{Colorize, OutputFormat, money, print_json, print_table};

#[derive(Debug, Parser)]
pub struct Canvass {
    /// The Order to Purchase request to canvass
    order: Uuid,

    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,
}

impl Canvass {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let directory = Directory::open(root);
        let canvass = load_canvass(&directory, self.order, directory.config())?;

        match self.output {
            OutputFormat::Json => print_json(&canvass)?,
            OutputFormat::Table => print_canvass(&canvass),
        }
        Ok(())
    }
}

fn print_canvass(canvass: &CanvassResult) {
    let items: Vec<Vec<String>> = canvass
        .items
        .iter()
        .map(|item| {
            let quotes = canvass.lines.get(&item.label).map_or(0, Vec::len);
            vec![
                item.label.clone(),
                quotes.to_string(),
                canvass
                    .lowest_price
                    .get(&item.label)
                    .map_or_else(|| "-".to_string(), |price| money(*price)),
            ]
        })
        .collect();
    print_table(&["Item", "Quotes", "Lowest Price"], &items);

    println!();
    if canvass.ranking.is_empty() {
        println!("No pending quotations.");
        return;
    }

    let recommended = canvass.recommended.map(|r| r.quotation_id);
    let quotations: Vec<Vec<String>> = canvass
        .ranking
        .iter()
        .filter_map(|&id| canvass.totals(id))
        .map(|totals| {
            vec![
                totals.quotation_id.to_string(),
                money(totals.additional_charges),
                money(totals.subtotal),
                if Some(totals.quotation_id) == recommended {
                    "recommended".to_string()
                } else {
                    String::new()
                },
            ]
        })
        .collect();
    print_table(&["Quotation", "Charges", "Subtotal", ""], &quotations);

    if let Some(charge) = canvass.lowest_additional_charge {
        println!();
        println!("Lowest additional charges: {}", money(charge));
    }
    if let Some(recommended) = canvass.recommended {
        println!(
            "{}",
            format!(
                "Recommended: {} ({})",
                recommended.quotation_id,
                money(recommended.total)
            )
            .success()
        );
    }
}
