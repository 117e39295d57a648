use jmc_core::{QueryRequest, QueryResult, infer, parse_document, pretty, run_query, sanitize_query};
use wasm_bindgen::prelude::*;

/// Pretty-printed shape of a JSON document.
#[wasm_bindgen]
pub fn infer_schema(json_str: &str) -> Result<String, String> {
    let json = parse_document(json_str).map_err(|e| e.to_string())?;
    Ok(pretty(&infer(&json).to_value()))
}

/// Live evaluation of a query against a JSON document.
#[wasm_bindgen]
pub fn search(query: &str, json_str: &str) -> Result<String, String> {
    let json = parse_document(json_str).map_err(|e| e.to_string())?;
    match run_query(query, &json) {
        QueryResult::Output(text) => Ok(text),
        QueryResult::Failure(message) => Err(message),
    }
}

#[wasm_bindgen]
pub fn sanitize(raw: &str) -> String {
    sanitize_query(raw)
}

/// Chat messages for a generation request, as a JSON array.
#[wasm_bindgen]
pub fn build_prompt(json_str: &str, intent: &str) -> Result<String, String> {
    let json = parse_document(json_str).map_err(|e| e.to_string())?;
    let request = QueryRequest::new(infer(&json), intent);
    serde_json::to_string(&request.messages()).map_err(|e| format!("Serialization error: {e}"))
}
