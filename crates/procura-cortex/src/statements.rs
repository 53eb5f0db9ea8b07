//! SQL statements API: runs the analyst's generated SQL and decodes the rows.
//!
//! Only the first result partition is read. Cells arrive as JSON strings and
//! are typed using the column metadata in `resultSetMetaData.rowType`.

use procura_core::types::{CellValue, ResultTable};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::CortexError;

pub const STATEMENTS_PATH: &str = "/api/v2/statements";

pub fn request_body(
    statement: &str,
    timeout_secs: u64,
    warehouse: Option<&str>,
    role: Option<&str>,
) -> Value {
    let mut body = json!({
        "statement": statement,
        "timeout": timeout_secs,
    });
    if let Some(warehouse) = warehouse {
        body["warehouse"] = json!(warehouse);
    }
    if let Some(role) = role {
        body["role"] = json!(role);
    }
    body
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatementResponse {
    result_set_meta_data: Option<ResultSetMetaData>,
    #[serde(default)]
    data: Vec<Vec<Option<String>>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResultSetMetaData {
    #[serde(default)]
    num_rows: Option<u64>,
    #[serde(default)]
    row_type: Vec<ColumnType>,
}

#[derive(Deserialize)]
struct ColumnType {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    scale: Option<i64>,
}

/// Decode a successful statement response into a table.
pub fn parse_result(body: &str) -> Result<ResultTable, CortexError> {
    let response: StatementResponse = serde_json::from_str(body)?;
    let meta = response
        .result_set_meta_data
        .ok_or_else(|| CortexError::Decode("missing resultSetMetaData".to_string()))?;

    if let Some(total) = meta.num_rows {
        if total as usize > response.data.len() {
            tracing::debug!(
                total,
                returned = response.data.len(),
                "Reading first result partition only"
            );
        }
    }

    let columns = meta.row_type.iter().map(|c| c.name.clone()).collect();
    let rows = response
        .data
        .into_iter()
        .map(|row| {
            row.into_iter()
                .enumerate()
                .map(|(i, raw)| decode_cell(raw, meta.row_type.get(i)))
                .collect()
        })
        .collect();

    Ok(ResultTable { columns, rows })
}

/// Type a raw cell from its column metadata. Anything that fails to parse
/// is kept as text.
fn decode_cell(raw: Option<String>, column: Option<&ColumnType>) -> CellValue {
    let Some(raw) = raw else {
        return CellValue::Null;
    };
    let Some(column) = column else {
        return CellValue::Text(raw);
    };

    match column.kind.to_ascii_lowercase().as_str() {
        "fixed" if column.scale.unwrap_or(0) == 0 => raw
            .parse::<i64>()
            .map(CellValue::Integer)
            .or_else(|_| raw.parse::<f64>().map(CellValue::Float))
            .unwrap_or(CellValue::Text(raw)),
        "fixed" | "real" | "float" | "double" | "number" => raw
            .parse::<f64>()
            .map(CellValue::Float)
            .unwrap_or(CellValue::Text(raw)),
        "boolean" => match raw.to_ascii_lowercase().as_str() {
            "true" | "1" => CellValue::Bool(true),
            "false" | "0" => CellValue::Bool(false),
            _ => CellValue::Text(raw),
        },
        _ => CellValue::Text(raw),
    }
}
