//! Command handlers module.
//!
//! Each handler makes one service call and writes a one-line confirmation
//! (plus any returned rows) to `out`.
//!
//! | Command | Service call | Output |
//! |---------|--------------|--------|
//! | `put` | [`SnippetService::put`] | `Stored "<snippet>" as "<name>"` |
//! | `get` | [`SnippetService::get`] | `Retrieved snippet: "<name>" => "<snippet>"` |
//! | `catalog` | [`SnippetService::catalog`] | `Retrieved catalog ordered by "<column>"` + rows |
//! | `search` | [`SnippetService::search`] | `Searched catalog using "<pattern>"` + rows |

use std::io::Write;

use snippets::{Snippet, SnippetService, SortColumn};

/// Result type for command handlers.
pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Put command.
pub fn cmd_put(
    service: &SnippetService,
    name: &str,
    snippet: &str,
    hidden: bool,
    out: &mut impl Write,
) -> CommandResult {
    let stored = service.put(name, snippet, hidden)?;
    writeln!(out, "Stored {:?} as {:?}", stored.message, stored.keyword)?;
    Ok(())
}

/// Get command.
pub fn cmd_get(service: &SnippetService, name: &str, out: &mut impl Write) -> CommandResult {
    let lookup = service.get(name)?;
    writeln!(out, "Retrieved snippet: {lookup}")?;
    Ok(())
}

/// Catalog command. `name` selects the sort column.
pub fn cmd_catalog(service: &SnippetService, name: &str, out: &mut impl Write) -> CommandResult {
    let order: SortColumn = name.parse()?;
    let rows = service.catalog(order)?;
    writeln!(out, "Retrieved catalog ordered by {:?}", order.as_sql())?;
    write_rows(&rows, out)
}

/// Search command. `name` is the pattern.
pub fn cmd_search(service: &SnippetService, name: &str, out: &mut impl Write) -> CommandResult {
    let rows = service.search(name)?;
    writeln!(out, "Searched catalog using {name:?}")?;
    write_rows(&rows, out)
}

fn write_rows(rows: &[Snippet], out: &mut impl Write) -> CommandResult {
    for row in rows {
        writeln!(out, "  {row}")?;
    }
    Ok(())
}
