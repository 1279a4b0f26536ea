use std::io::{self, Write};

use client_core::ViewState;

/// Rendering configuration passed in by the caller. There is deliberately no
/// process-wide theme state; whoever owns the output chooses the theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub header: &'static str,
    pub row: &'static str,
    pub reset: &'static str,
}

impl Theme {
    pub fn light() -> Self {
        Self {
            header: "\x1b[1;34m",
            row: "",
            reset: "\x1b[0m",
        }
    }

    pub fn dark() -> Self {
        Self {
            header: "\x1b[1;33m",
            row: "\x1b[97m",
            reset: "\x1b[0m",
        }
    }
}

const HEADERS: [&str; 4] = ["TID", "First Name", "Last Name", "Address"];

/// Renders the current view as a fixed-width table. The record order is the
/// controller's display order and is not re-sorted here.
pub fn render_table(out: &mut impl Write, state: &ViewState, theme: &Theme) -> io::Result<()> {
    if state.busy {
        writeln!(out, "(operation in progress)")?;
    }
    if state.records.is_empty() {
        writeln!(out, "no records")?;
        return Ok(());
    }

    let mut widths: [usize; 4] = HEADERS.map(str::len);
    for record in &state.records {
        let cells = [
            &record.tid,
            &record.first_name,
            &record.last_name,
            &record.address,
        ];
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.len());
        }
    }

    write!(out, "{}", theme.header)?;
    for (header, width) in HEADERS.iter().zip(widths) {
        write!(out, "{header:<width$}  ")?;
    }
    writeln!(out, "{}", theme.reset)?;

    for record in &state.records {
        let cells = [
            record.tid.as_str(),
            record.first_name.as_str(),
            record.last_name.as_str(),
            record.address.as_str(),
        ];
        write!(out, "{}", theme.row)?;
        for (cell, width) in cells.iter().zip(widths) {
            write!(out, "{cell:<width$}  ")?;
        }
        writeln!(out, "{}", theme.reset)?;
    }

    Ok(())
}
