//! CLI tool for cellsync - projects a grid document and outputs its cells as JSON
//!
//! Usage:
//!   cellsync_cli <grid.json>              # Output JSON to stdout
//!   cellsync_cli <grid.json> -o out.json  # Output JSON to file
//!
//! The input document looks like:
//!   {"columns": [{"columnName": "name", "editType": "text"}],
//!    "rows": [{"rowKey": 1, "name": "a"}],
//!    "config": {"danglingSpan": "skip"}}
//!
//! Set `RUST_LOG=debug` to trace projection and sync.

#![allow(clippy::exit)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::indexing_slicing)]

use std::env;
use std::fs;
use std::io::{self, Write};
use std::rc::Rc;

use cellsync::{Cell, ColumnModel, ColumnModelList, DataStore, GridConfig, RawRow, RowKey, RowList};
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
struct GridDocument {
    columns: Vec<ColumnModel>,
    rows: Vec<RawRow>,
    #[serde(default)]
    config: GridConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectedRow {
    row_key: RowKey,
    cells: Vec<Cell>,
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: cellsync_cli <grid.json> [-o output.json]");
        std::process::exit(1);
    }

    let input_path = &args[1];
    let output_path = if args.len() > 3 && args[2] == "-o" {
        Some(&args[3])
    } else {
        None
    };

    // Read input file
    let text = match fs::read_to_string(input_path) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error reading {}: {}", input_path, e);
            std::process::exit(1);
        }
    };

    // Parse grid document
    let document: GridDocument = match serde_json::from_str(&text) {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("Error parsing grid document: {}", e);
            std::process::exit(1);
        }
    };

    // Load the store and project every row
    let columns = Rc::new(ColumnModelList::new(document.columns));
    let store = Rc::new(DataStore::new(Rc::clone(&columns), &document.config));
    if let Err(e) = store.load(document.rows) {
        eprintln!("Error loading rows: {}", e);
        std::process::exit(1);
    }
    let source = Rc::clone(&store);
    let list = RowList::new(source, columns, document.config);
    list.reset(&store.row_keys());

    let projected: Vec<ProjectedRow> = list
        .rows()
        .iter()
        .map(|row| ProjectedRow {
            row_key: row.row_key(),
            cells: row.cells(),
        })
        .collect();

    // Serialize to JSON
    let json = match serde_json::to_string_pretty(&projected) {
        Ok(j) => j,
        Err(e) => {
            eprintln!("Error serializing JSON: {}", e);
            std::process::exit(1);
        }
    };

    // Output
    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(path, &json) {
                eprintln!("Error writing {}: {}", path, e);
                std::process::exit(1);
            }
            eprintln!("Written: {}", path);
        }
        None => {
            io::stdout().write_all(json.as_bytes()).unwrap();
            println!();
        }
    }
}
