use benchlog_core::types::{format_timestamp_ms, RunRecord};
use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}

pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    print!("{}", render_table(headers, &rows));
}

/// Left-aligned columns separated by two spaces, with a dashed rule under
/// the header. Widths count chars so non-ASCII author names line up.
fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    out.push_str(&pad_line(headers.iter().copied(), &widths));
    out.push('\n');
    let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    out.push_str(&rule.join("  "));
    out.push('\n');
    for row in rows {
        out.push_str(&pad_line(row.iter().map(String::as_str), &widths));
        out.push('\n');
    }
    out
}

fn pad_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .zip(widths)
        .map(|(c, &w)| {
            let fill = w.saturating_sub(c.chars().count());
            format!("{c}{}", " ".repeat(fill))
        })
        .collect();
    padded.join("  ").trim_end().to_string()
}

/// One table row per measurement, so multi-measurement runs stay readable.
pub fn record_rows(records: &[RunRecord]) -> Vec<Vec<String>> {
    records
        .iter()
        .flat_map(|r| {
            r.measurements.iter().map(move |m| {
                vec![
                    format_timestamp_ms(r.timestamp_ms),
                    r.short_commit().to_string(),
                    r.author.name.clone(),
                    m.name.clone(),
                    format!("{} {}", m.value, m.unit).trim_end().to_string(),
                ]
            })
        })
        .collect()
}

pub const RECORD_HEADERS: &[&str] = &["TIME", "COMMIT", "AUTHOR", "BENCH", "VALUE"];
