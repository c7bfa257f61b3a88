//! HTTP upload entrypoint, framework-neutral: a request carries the uploaded file's
//! bytes, the response carries status, content type and body.

use crate::error::{PipelineError, Result};
use crate::normalize::normalize;
use crate::pipeline::RedditPipeline;
use crate::record::{EnrichedRecord, ENRICHMENT_COLUMNS};
use crate::schema::FieldMapping;
use crate::sentiment::Enricher;
use crate::store::{ObjectStore, CONTENT_TYPE_CSV};
use crate::tabular::{decode_csv, encode_enriched};
use crate::util::init_tracing_once;
use rayon::prelude::*;

pub const CONTENT_TYPE_TEXT: &str = "text/plain";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UploadRequest {
    /// The `file` form field, if one was sent.
    pub file: Option<Vec<u8>>,
}

impl UploadRequest {
    pub fn with_file(bytes: impl Into<Vec<u8>>) -> Self {
        Self { file: Some(bytes.into()) }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: String,
    pub body: Vec<u8>,
}

impl HttpResponse {
    fn text(status: u16, msg: impl Into<String>) -> Self {
        Self { status, content_type: CONTENT_TYPE_TEXT.to_string(), body: msg.into().into_bytes() }
    }

    fn csv(body: Vec<u8>) -> Self {
        Self { status: 200, content_type: CONTENT_TYPE_CSV.to_string(), body }
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

enum UploadError {
    BadRequest(String),
    Internal(PipelineError),
}

impl From<PipelineError> for UploadError {
    fn from(e: PipelineError) -> Self {
        UploadError::Internal(e)
    }
}

/// `CSV file must contain "title" and "selftext" columns.`
fn missing_columns_message(text_fields: &[String]) -> String {
    let quoted: Vec<String> = text_fields.iter().map(|f| format!("\"{f}\"")).collect();
    format!("CSV file must contain {} columns.", quoted.join(" and "))
}

impl RedditPipeline {
    /// Enrich one uploaded CSV. Every uploaded column is kept as text and the
    /// enrichment columns are appended. When `store` is given the result is also
    /// uploaded to `processed_bucket`/`upload_key`.
    pub fn process_upload(
        &self,
        req: &UploadRequest,
        enricher: &Enricher,
        store: Option<&dyn ObjectStore>,
    ) -> HttpResponse {
        init_tracing_once();
        let Some(bytes) = req.file.as_deref() else {
            return HttpResponse::text(400, "No file uploaded.");
        };
        match self.enrich_upload(bytes, enricher, store) {
            Ok(body) => HttpResponse::csv(body),
            Err(UploadError::BadRequest(msg)) => {
                tracing::info!("rejected upload: {}", msg);
                HttpResponse::text(400, msg)
            }
            Err(UploadError::Internal(e)) => {
                tracing::error!("upload processing failed: {}", e);
                HttpResponse::text(500, format!("Error processing the file: {e}"))
            }
        }
    }

    fn enrich_upload(
        &self,
        bytes: &[u8],
        enricher: &Enricher,
        store: Option<&dyn ObjectStore>,
    ) -> std::result::Result<Vec<u8>, UploadError> {
        std::str::from_utf8(bytes).map_err(PipelineError::from)?;
        let table = decode_csv(bytes)?;

        let text_fields = &self.opts.text_fields;
        if !text_fields.iter().all(|f| table.headers.contains(f)) {
            return Err(UploadError::BadRequest(missing_columns_message(text_fields)));
        }

        // Enrichment columns already in the upload are recomputed, not duplicated.
        let columns: Vec<String> = table
            .headers
            .iter()
            .filter(|h| !ENRICHMENT_COLUMNS.contains(&h.as_str()))
            .cloned()
            .collect();
        let mapping = FieldMapping::passthrough(columns.iter().cloned())?;

        let enriched: Vec<EnrichedRecord> = table
            .records
            .par_iter()
            .map(|raw| -> Result<EnrichedRecord> { Ok(enricher.enrich(normalize(raw, &mapping)?, text_fields)) })
            .collect::<Result<_>>()?;
        tracing::debug!(rows = enriched.len(), "upload enriched");

        let body = encode_enriched(&columns, &enriched)?;
        if let Some(store) = store {
            store
                .put(&self.opts.processed_bucket, &self.opts.upload_key, &body, CONTENT_TYPE_CSV)
                .map_err(PipelineError::from)?;
        }
        Ok(body)
    }
}
