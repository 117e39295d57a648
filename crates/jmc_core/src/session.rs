//! Per-session orchestration of validation, generation and evaluation
//!
//! A [`Session`] owns every piece of playground state as plain fields. The
//! generation flow runs four linear stages (validate, compose, generate,
//! evaluate) and stops at the first failure. A failure only replaces the
//! state of the action that triggered it.
//!
//! No request fencing or cancellation exists: each call runs to completion
//! and its outcome overwrites the previous one.

use crate::document::{decode_upload, parse_document, pretty};
use crate::generator::QueryGenerator;
use crate::prompt::QueryRequest;
use crate::query::{QueryResult, evaluate, run_query, sanitize_query};
use crate::schema::infer;
use crate::{Error, INVALID_JSON};
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Busy flags of a session, readable while a network call is pending.
///
/// Clones share the same flags. The flags only drive a busy indicator; they
/// do not block a second call.
#[derive(Debug, Clone, Default)]
pub struct Activity {
    verifying: Arc<AtomicBool>,
    generating: Arc<AtomicBool>,
}

impl Activity {
    pub fn is_verifying(&self) -> bool {
        self.verifying.load(Ordering::SeqCst)
    }

    pub fn is_generating(&self) -> bool {
        self.generating.load(Ordering::SeqCst)
    }
}

/// Raises a flag for its lifetime, so a dropped call never stays busy.
struct Busy<'a>(&'a AtomicBool);

impl<'a> Busy<'a> {
    fn raise(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for Busy<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct Session<G> {
    generator: G,
    credential: String,
    verified: bool,
    credential_error: Option<String>,
    json_input: String,
    document: Option<Value>,
    formatted_document: Option<String>,
    json_error: Option<String>,
    prompt: String,
    query: String,
    generated_query: Option<String>,
    result: Option<QueryResult>,
    activity: Activity,
}

impl<G: QueryGenerator> Session<G> {
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            credential: String::new(),
            verified: false,
            credential_error: None,
            json_input: String::new(),
            document: None,
            formatted_document: None,
            json_error: None,
            prompt: String::new(),
            query: String::new(),
            generated_query: None,
            result: None,
            activity: Activity::default(),
        }
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub fn set_credential(&mut self, credential: impl Into<String>) {
        self.credential = credential.into();
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    /// Replace the JSON input and validate it.
    pub fn set_json_input(&mut self, text: impl Into<String>) {
        self.json_input = text.into();
        match parse_document(&self.json_input) {
            Ok(document) => {
                self.formatted_document = Some(pretty(&document));
                self.document = Some(document);
                self.json_error = None;
            }
            Err(e) => {
                tracing::debug!(len = self.json_input.len(), "JSON input is invalid");
                self.document = None;
                self.json_error = Some(e.to_string());
            }
        }
    }

    /// Feed an uploaded file through the same path as pasted text.
    pub fn ingest_upload(&mut self, bytes: &[u8]) {
        self.set_json_input(decode_upload(bytes));
    }

    /// Live evaluation: replace the query and evaluate it immediately.
    pub fn set_query(&mut self, query: impl Into<String>) -> &QueryResult {
        self.query = query.into();
        let result = match &self.document {
            Some(document) => run_query(&self.query, document),
            None => QueryResult::Failure(INVALID_JSON.to_string()),
        };
        self.result.insert(result)
    }

    /// Check the current credential against the service.
    pub async fn verify_credential(&mut self) -> Result<(), Error> {
        let outcome = {
            let _busy = Busy::raise(&self.activity.verifying);
            self.generator.verify_credential(&self.credential).await
        };

        match outcome {
            Ok(()) => {
                tracing::info!("credential verified");
                self.verified = true;
                self.credential_error = None;
                Ok(())
            }
            Err(e) => {
                let message = e.to_string();
                tracing::warn!(error = %message, "credential check failed");
                self.verified = false;
                self.credential_error = Some(message.clone());
                Err(Error::InvalidCredential(message))
            }
        }
    }

    /// Whether the prompt input should be enabled.
    pub fn can_generate(&self) -> bool {
        self.verified
            && !self.credential.is_empty()
            && !self.json_input.is_empty()
            && self.json_error.is_none()
    }

    /// Run the generation flow and return the formatted result.
    ///
    /// The gating of [`Session::can_generate`] is advisory and not enforced
    /// here; the service decides whether the credential is usable.
    pub async fn generate(&mut self) -> Result<String, Error> {
        let document = match parse_document(&self.json_input) {
            Ok(document) => document,
            Err(e) => {
                tracing::debug!("generation aborted: invalid JSON input");
                self.json_error = Some(e.to_string());
                return Err(e);
            }
        };

        let request = QueryRequest::new(infer(&document), self.prompt.as_str());
        tracing::debug!(schema = %request.schema, "composed generation request");

        let reply = {
            let _busy = Busy::raise(&self.activity.generating);
            self.generator.generate(&self.credential, &request).await
        };

        let reply = match reply {
            Ok(reply) => reply,
            Err(e) => {
                let message = e.to_string();
                tracing::warn!(error = %message, "query generation failed");
                self.result = Some(QueryResult::Failure(message.clone()));
                return Err(Error::GenerationFailed(message));
            }
        };

        let query = sanitize_query(&reply);
        tracing::info!(%query, "generated query");
        self.generated_query = Some(query.clone());
        self.query = query;

        match evaluate(&self.query, &document) {
            Ok(value) => {
                let output = pretty(&value);
                self.result = Some(QueryResult::Output(output.clone()));
                Ok(output)
            }
            Err(e) => {
                tracing::warn!(error = %e, "generated query failed to evaluate");
                self.result = Some(QueryResult::Failure(e.to_string()));
                Err(e)
            }
        }
    }

    pub fn credential(&self) -> &str {
        &self.credential
    }

    pub fn is_verified(&self) -> bool {
        self.verified
    }

    pub fn credential_error(&self) -> Option<&str> {
        self.credential_error.as_deref()
    }

    pub fn json_input(&self) -> &str {
        &self.json_input
    }

    pub fn document(&self) -> Option<&Value> {
        self.document.as_ref()
    }

    /// Pretty form of the last valid document.
    pub fn formatted_document(&self) -> Option<&str> {
        self.formatted_document.as_deref()
    }

    pub fn json_error(&self) -> Option<&str> {
        self.json_error.as_deref()
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn generated_query(&self) -> Option<&str> {
        self.generated_query.as_deref()
    }

    pub fn result(&self) -> Option<&QueryResult> {
        self.result.as_ref()
    }

    /// Shared handle on the busy flags, for observers outside the call.
    pub fn activity(&self) -> Activity {
        self.activity.clone()
    }

    pub fn is_verifying(&self) -> bool {
        self.activity.is_verifying()
    }

    pub fn is_generating(&self) -> bool {
        self.activity.is_generating()
    }
}
