use crate::api::Mode;
use crate::bills::{BillList, DisplayBill};
use crate::commands::Out;
use crate::ui::LogNavigate;
use crate::{Config, Result};

const HEADERS: [&str; 5] = ["Type", "Nom", "Date", "Montant", "Statut"];

/// Fetches the user's bills and renders them as a table, most recent first.
/// A row gains a trailing marker when a receipt is attached.
pub async fn list(config: Config, mode: Mode) -> Result<Out<Vec<DisplayBill>>> {
    let session = config.session().await?;
    let store = crate::api::store(mode, &config, &session)?;
    let mut bill_list = BillList::new(store, Box::new(LogNavigate));
    let rows = bill_list.get_bills().await;
    let message = if rows.is_empty() {
        "No bills to show".to_string()
    } else {
        render_table(&rows)
    };
    Ok(Out::new(message, rows))
}

/// Plain-text table rendering with per-column widths.
fn render_table(rows: &[DisplayBill]) -> String {
    let cells: Vec<[String; 5]> = rows
        .iter()
        .map(|row| {
            [
                row.bill.bill_type.clone(),
                row.bill.name.clone(),
                row.date_display.clone(),
                format!("{} €", row.bill.amount),
                match row.bill.file_url {
                    Some(_) => format!("{} 📎", row.status_display),
                    None => row.status_display.clone(),
                },
            ]
        })
        .collect();

    let mut widths: [usize; 5] = HEADERS.map(str::len);
    for row in &cells {
        for (ix, cell) in row.iter().enumerate() {
            widths[ix] = widths[ix].max(cell.chars().count());
        }
    }

    let mut lines = Vec::with_capacity(cells.len() + 1);
    lines.push(render_row(&HEADERS.map(str::to_string), &widths));
    for row in &cells {
        lines.push(render_row(row, &widths));
    }
    lines.join("\n")
}

fn render_row(cells: &[String; 5], widths: &[usize; 5]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width - cell.chars().count();
            format!("{cell}{}", " ".repeat(pad))
        })
        .collect();
    padded.join("  ").trim_end().to_string()
}
