//! Rendering shared by the subcommands: the `--output` switch, item and
//! canvass tables, JSON dumps and money amounts.

use owo_colors::{OwoColorize, Style};

/// How a subcommand renders its result.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Aligned columns for people.
    #[default]
    Table,
    /// Pretty-printed JSON of the underlying result.
    Json,
}

/// Below this many columns a table is printed as `header: value` blocks.
const NARROW_COLUMNS: u16 = 60;

fn color_enabled() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

fn is_narrow() -> bool {
    terminal_size::terminal_size().is_some_and(|(width, _)| width.0 < NARROW_COLUMNS)
}

fn paint(text: &str, style: Style) -> String {
    if color_enabled() {
        text.style(style).to_string()
    } else {
        text.to_string()
    }
}

/// Highlights for status lines, recommendations and placeholders.
pub trait Colorize {
    /// Approvals, recommendations and other good news.
    fn success(&self) -> String;
    /// Cancellations, deletions and name clashes.
    fn warning(&self) -> String;
    /// Placeholders and ids.
    fn dim(&self) -> String;
}

impl<T: AsRef<str> + ?Sized> Colorize for T {
    fn success(&self) -> String {
        paint(self.as_ref(), Style::new().green())
    }

    fn warning(&self) -> String {
        paint(self.as_ref(), Style::new().yellow())
    }

    fn dim(&self) -> String {
        paint(self.as_ref(), Style::new().dimmed())
    }
}

/// Width of each column: the widest of the header and its cells.
fn column_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            rows.iter()
                .filter_map(|row| row.get(idx))
                .map(|value| value.chars().count())
                .max()
                .unwrap_or(0)
                .max(header.chars().count())
        })
        .collect()
}

/// Prints summary, canvass and entity rows as aligned columns.
///
/// Narrow terminals get one `header: value` line per cell instead.
pub fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    if is_narrow() {
        for row in rows {
            for (header, value) in headers.iter().zip(row) {
                println!("{}: {value}", header.dim());
            }
            println!();
        }
        return;
    }

    let widths = column_widths(headers, rows);

    for (header, width) in headers.iter().zip(&widths) {
        print!("{header:<width$}  ");
    }
    println!();
    for width in &widths {
        print!("{:-<width$}  ", "");
    }
    println!();

    for row in rows {
        for (value, width) in row.iter().zip(&widths) {
            print!("{value:<width$}  ");
        }
        println!();
    }
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Prices, charges and totals are shown with two decimals.
pub fn money(amount: f64) -> String {
    format!("{amount:.2}")
}
