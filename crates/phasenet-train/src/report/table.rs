//! Fixed-width, pipe-delimited Markdown tables.

use std::io::Write;

/// Display width of a cell, counted in chars to match `{:<width$}` padding.
fn cell_width(cell: &str) -> usize {
    cell.chars().count()
}

/// Column widths: widest cell per column, header included.
pub fn column_widths(headers: &[String], rows: &[Vec<String>]) -> Vec<usize> {
    let mut sizes: Vec<usize> = headers.iter().map(|h| cell_width(h)).collect();
    for row in rows {
        for (size, cell) in sizes.iter_mut().zip(row.iter()) {
            *size = (*size).max(cell_width(cell));
        }
    }
    sizes
}

fn write_row<W: Write>(out: &mut W, cells: &[String], sizes: &[usize]) -> std::io::Result<()> {
    write!(out, "|")?;
    for (cell, &size) in cells.iter().zip(sizes) {
        write!(out, " {:<width$} |", cell, width = size)?;
    }
    writeln!(out)
}

/// Write `headers`, a dash separator and `rows`.
///
/// ```text
/// | label | abs 0    |
/// | ----- | -------- |
/// | a     | 0.500000 |
/// ```
pub fn write_table<W: Write>(
    out: &mut W,
    headers: &[String],
    rows: &[Vec<String>],
) -> std::io::Result<()> {
    let sizes = column_widths(headers, rows);
    write_row(out, headers, &sizes)?;

    let dashes: Vec<String> = sizes.iter().map(|&n| "-".repeat(n)).collect();
    write_row(out, &dashes, &sizes)?;

    for row in rows {
        write_row(out, row, &sizes)?;
    }
    Ok(())
}
