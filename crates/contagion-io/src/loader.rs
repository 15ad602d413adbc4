use crate::error::{IoError, Result};
use contagion_core::{Network, NodeId};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Load a square adjacency table from a CSV file.
///
/// The header row holds an arbitrary corner cell followed by the column
/// labels; every other row holds a row label followed by one cell per column.
/// A cell whose numeric value is nonzero is an edge row -> column. Node ids
/// follow row order.
pub fn load_adjacency(path: impl AsRef<Path>) -> Result<Network> {
    let path = path.as_ref();
    let network = read_adjacency(File::open(path)?)?;
    info!(
        path = %path.display(),
        nodes = network.len(),
        edges = network.num_edges(),
        "loaded network"
    );
    Ok(network)
}

pub fn read_adjacency<R: Read>(reader: R) -> Result<Network> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = rdr.records();
    let header = match records.next() {
        Some(record) => record?,
        None => return Ok(Network::new(Vec::<String>::new())?),
    };
    let columns: Vec<String> = header.iter().skip(1).map(str::to_string).collect();

    let mut seen = HashSet::new();
    if let Some(dup) = columns.iter().find(|c| !seen.insert(c.as_str())) {
        return Err(IoError::Malformed(format!("duplicate column label '{dup}'")));
    }

    let mut rows = Vec::with_capacity(columns.len());
    let mut cells: Vec<Vec<bool>> = Vec::with_capacity(columns.len());
    for record in records {
        let record = record?;
        let label = record.get(0).unwrap_or_default().to_string();
        if record.len() != columns.len() + 1 {
            return Err(IoError::Malformed(format!(
                "row '{label}' has {} cells, expected {}",
                record.len().saturating_sub(1),
                columns.len()
            )));
        }
        let row = record
            .iter()
            .skip(1)
            .zip(&columns)
            .map(|(cell, column)| parse_cell(cell, &label, column))
            .collect::<Result<Vec<bool>>>()?;
        rows.push(label);
        cells.push(row);
    }

    if rows.len() != columns.len() {
        return Err(IoError::Malformed(format!(
            "{} rows but {} columns",
            rows.len(),
            columns.len()
        )));
    }

    let mut network = Network::new(rows)?;
    let column_ids: Vec<NodeId> = columns
        .iter()
        .map(|c| {
            network
                .index_of(c)
                .map_err(|_| IoError::Malformed(format!("column '{c}' has no matching row")))
        })
        .collect::<Result<_>>()?;

    for (u, row) in cells.iter().enumerate() {
        for (&v, &present) in column_ids.iter().zip(row) {
            if present {
                network.add_edge(u, v)?;
            }
        }
    }
    debug!(nodes = network.len(), edges = network.num_edges(), "adjacency parsed");
    Ok(network)
}

fn parse_cell(cell: &str, row: &str, column: &str) -> Result<bool> {
    if cell.is_empty() {
        return Ok(false);
    }
    cell.parse::<f64>()
        .map(|value| value != 0.0)
        .map_err(|_| IoError::Malformed(format!("cell ({row}, {column}) is not a number: '{cell}'")))
}
