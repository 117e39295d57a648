//! Query sanitizing and JMESPath evaluation

use crate::Error;
use crate::document::pretty;
use serde_json::{Number, Value};

/// Characters language models like to wrap queries in.
const QUOTE_CHARS: [char; 3] = ['\'', '"', '`'];

/// Largest integer an `f64` holds exactly.
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

/// Strip every quote character from a generated reply.
///
/// The removal is global, not just at the ends: a reply of `` `a[0].b` ``
/// becomes `a[0].b`. Raw string literals inside the query are lost too.
///
/// # Example
/// ```
/// use jmc_core::sanitize_query;
///
/// assert_eq!(sanitize_query("`a[0].b`"), "a[0].b");
/// ```
pub fn sanitize_query(raw: &str) -> String {
    raw.replace(QUOTE_CHARS, "")
}

/// Reject integer tokens the JMESPath lexer cannot hold.
///
/// The lexer reads index and slice numbers into an `i32` and aborts on
/// overflow, so out-of-range numbers have to be caught before compiling.
/// Quoted identifiers, raw strings and literals are skipped.
fn check_number_tokens(query: &str) -> Result<(), Error> {
    let mut chars = query.char_indices().peekable();
    while let Some((start, c)) = chars.next() {
        match c {
            '"' | '\'' | '`' => {
                while let Some((_, inner)) = chars.next() {
                    if inner == '\\' {
                        chars.next();
                    } else if inner == c {
                        break;
                    }
                }
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                while chars.next_if(|(_, n)| n.is_ascii_alphanumeric() || *n == '_').is_some() {}
            }
            c if c.is_ascii_digit()
                || (c == '-' && chars.peek().is_some_and(|(_, n)| n.is_ascii_digit())) =>
            {
                let mut end = start + c.len_utf8();
                while let Some((i, d)) = chars.next_if(|(_, n)| n.is_ascii_digit()) {
                    end = i + d.len_utf8();
                }
                let token = &query[start..end];
                if token.parse::<i32>().is_err() {
                    return Err(Error::QueryEvaluationFailed(format!(
                        "Number out of range at position {start}: {token}"
                    )));
                }
            }
            _ => {}
        }
    }
    Ok(())
}

fn whole_float(n: &Number) -> Option<i64> {
    if n.is_i64() || n.is_u64() {
        return None;
    }
    let f = n.as_f64()?;
    (f.fract() == 0.0 && f.abs() <= MAX_EXACT_INT).then_some(f as i64)
}

/// Render whole-number floats as integers, the way JSON text shows them.
///
/// JMESPath functions such as `sum` or `floor` produce `f64` values.
fn normalize_numbers(value: Value) -> Value {
    match value {
        Value::Number(n) => match whole_float(&n) {
            Some(i) => Value::Number(Number::from(i)),
            None => Value::Number(n),
        },
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_numbers).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, child)| (key, normalize_numbers(child)))
                .collect(),
        ),
        other => other,
    }
}

/// Evaluate a JMESPath expression against a document.
///
/// Compile and search failures both surface as
/// [`Error::QueryEvaluationFailed`] with the evaluator's message.
pub fn evaluate(query: &str, document: &Value) -> Result<Value, Error> {
    check_number_tokens(query)?;
    let expr =
        jmespath::compile(query).map_err(|e| Error::QueryEvaluationFailed(e.to_string()))?;
    let found = expr
        .search(document.clone())
        .map_err(|e| Error::QueryEvaluationFailed(e.to_string()))?;
    let value =
        serde_json::to_value(&*found).map_err(|e| Error::QueryEvaluationFailed(e.to_string()))?;
    Ok(normalize_numbers(value))
}

/// Outcome shown in the result pane
///
/// Exactly one of output or error text is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryResult {
    /// Pretty-printed JSON result
    Output(String),
    /// Error message to display instead
    Failure(String),
}

impl QueryResult {
    pub fn text(&self) -> &str {
        match self {
            QueryResult::Output(text) | QueryResult::Failure(text) => text,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, QueryResult::Failure(_))
    }
}

impl From<Result<Value, Error>> for QueryResult {
    fn from(result: Result<Value, Error>) -> Self {
        match result {
            Ok(value) => QueryResult::Output(pretty(&value)),
            Err(e) => QueryResult::Failure(e.to_string()),
        }
    }
}

/// Evaluate and format in one step.
pub fn run_query(query: &str, document: &Value) -> QueryResult {
    evaluate(query, document).into()
}
