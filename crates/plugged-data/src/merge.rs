//! Merging an edit form over the row it was opened from.

use serde_json::Value as JsonValue;

use plugged_data_core::{ErrorInfo, Response, Row, WriteResponse};
use plugged_data_query::{Filterable, IntoFilterValue};

use crate::client::AdminClient;

/// Resolve an edit form against the row it was opened from.
///
/// Only columns present in `edits` are returned, so untouched and generated
/// columns are never written back. A blank edit (`null`, which is also what a
/// non-numeric number input serializes to, or an empty string) takes the
/// original value instead, and is dropped when `original` has no such column.
pub fn merge_edit(original: &Row, edits: &Row) -> Row {
    let mut merged = Row::new();
    for (column, value) in edits.iter() {
        let resolved = if is_blank(value) {
            original.get_value(column)
        } else {
            Some(value)
        };
        if let Some(resolved) = resolved {
            merged.insert(column.clone(), resolved.clone());
        }
    }
    merged
}

fn is_blank(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => true,
        JsonValue::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Load the row whose `id_column` equals `id`, merge `edits` over it and
/// write the result back.
///
/// Two requests: a single-row read, then an update matched on the same id.
pub async fn fetch_then_patch<V>(
    client: &AdminClient,
    table: &str,
    id_column: &str,
    id: V,
    edits: &Row,
) -> WriteResponse<Row>
where
    V: IntoFilterValue + Clone,
{
    let original = match client
        .from(table)
        .select("*")
        .eq(id_column, id.clone())
        .single()
        .await
        .into_result()
    {
        Ok(Some(row)) => row,
        Ok(None) => {
            return Response::error(ErrorInfo::invalid_request(format!(
                "No row in {table} matches {id_column}"
            )))
        }
        Err(e) => return Response::error(e),
    };

    let merged = merge_edit(&original, edits);
    tracing::debug!(table, columns = merged.len(), "Patching merged row");
    client
        .from(table)
        .update(&merged)
        .eq(id_column, id)
        .await
}
