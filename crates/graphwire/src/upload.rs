//! Multipart encoding for GraphQL file uploads.
//!
//! Implements the multipart request convention GraphQL servers use to
//! accept binary uploads: an `operations` form field carrying the JSON
//! payload with every file-bound variable nulled out, a `map` field
//! linking numbered form parts to variable paths, and one numbered part
//! per attached file. Boundary generation and finalization are delegated
//! to [`reqwest::multipart::Form`].

use std::collections::HashMap;

use reqwest::multipart::{Form, Part};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::request::{FileUpload, OperationPayload};

const TARGET: &str = "graphwire::upload";

/// The two JSON form fields of a multipart operation.
pub(crate) struct UploadPayload {
    pub operations: String,
    pub map: String,
}

/// Serialize the `operations` and `map` fields for a file-bearing request.
///
/// Map keys are stringified 1-based file indices in attachment order. A
/// field used by a single file maps to `variables.<field>` and is nulled
/// in place; a field shared by n files widens to an array of n nulls, and
/// each file maps to its own `variables.<field>.<i>` entry.
pub(crate) fn encode_payload(
    query: &str,
    variables: Option<&Map<String, Value>>,
    operation_name: Option<&str>,
    files: &[FileUpload],
) -> Result<UploadPayload> {
    let mut masked = variables.cloned().unwrap_or_default();

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for file in files {
        *counts.entry(file.field.as_str()).or_default() += 1;
    }

    let mut seen: HashMap<&str, usize> = HashMap::new();
    let mut map = Map::new();
    for (index, file) in files.iter().enumerate() {
        let total = counts[file.field.as_str()];
        let occurrence = seen.entry(file.field.as_str()).or_default();

        if *occurrence == 0 {
            let placeholder = if total > 1 {
                Value::Array(vec![Value::Null; total])
            } else {
                Value::Null
            };
            write_path(&mut masked, &file.field, placeholder);
        }

        let path = if total > 1 {
            format!("variables.{}.{}", file.field, *occurrence)
        } else {
            format!("variables.{}", file.field)
        };
        *occurrence += 1;

        map.insert(
            (index + 1).to_string(),
            Value::Array(vec![Value::String(path)]),
        );
    }

    let operations = serde_json::to_string(&OperationPayload {
        query,
        variables: Some(&masked),
        operation_name,
    })
    .map_err(Error::Encode)?;
    let map = serde_json::to_string(&map).map_err(Error::Encode)?;

    Ok(UploadPayload { operations, map })
}

/// Assemble the outgoing multipart form: numbered file parts in attachment
/// order, then the `operations` and `map` fields, in that order. File
/// sources are moved into the form and streamed once at send time.
pub(crate) fn into_form(
    query: &str,
    variables: Option<&Map<String, Value>>,
    operation_name: Option<&str>,
    files: Vec<FileUpload>,
) -> Result<Form> {
    let payload = encode_payload(query, variables, operation_name, &files)?;
    tracing::trace!(
        target: TARGET,
        operations = %payload.operations,
        map = %payload.map,
        "encoded multipart operation"
    );

    let mut form = Form::new();
    for (index, file) in files.into_iter().enumerate() {
        let part = Part::stream(file.source.0).file_name(file.name);
        form = form.part((index + 1).to_string(), part);
    }
    Ok(form
        .text("operations", payload.operations)
        .text("map", payload.map))
}

/// Write `value` at a dotted path, creating intermediate objects as
/// needed. Non-object values along the way are displaced.
fn write_path(variables: &mut Map<String, Value>, path: &str, value: Value) {
    let mut current = variables;
    let mut segments = path.split('.').peekable();
    while let Some(segment) = segments.next() {
        if segments.peek().is_none() {
            current.insert(segment.to_string(), value);
            return;
        }
        let slot = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        let Value::Object(next) = slot else {
            unreachable!()
        };
        current = next;
    }
}
