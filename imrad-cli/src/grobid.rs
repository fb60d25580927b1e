//! Minimal GROBID client.
//!
//! POSTs a PDF to `/api/processFulltextDocument` with sentence segmentation
//! and coordinates enabled for the elements the TEI reader consumes, and
//! returns the TEI XML. Failures propagate to the caller — the labeling
//! engine never retries or masks extraction errors.

use anyhow::{anyhow, Context, Result};
use std::path::Path;
use std::time::Duration;

const BOUNDARY: &str = "------------imrad-labeler-form-boundary";

/// Elements GROBID should attach `coords` attributes to.
const COORDINATE_ELEMENTS: [&str; 6] = ["s", "p", "head", "figure", "table", "biblStruct"];

/// Fetch the fulltext TEI for a PDF from a GROBID server.
pub fn fetch_fulltext_tei(server: &str, pdf_path: &Path, timeout_secs: u64) -> Result<String> {
    let pdf_bytes = std::fs::read(pdf_path)
        .with_context(|| format!("failed to read PDF: {}", pdf_path.display()))?;
    let filename = pdf_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document.pdf".to_string());

    let url = format!(
        "{}/api/processFulltextDocument",
        server.trim_end_matches('/')
    );
    let body = multipart_body(&filename, &pdf_bytes);

    let response = ureq::post(&url)
        .timeout(Duration::from_secs(timeout_secs))
        .set(
            "Content-Type",
            &format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .send_bytes(&body)
        .map_err(|e| anyhow!("GROBID request failed: {e}"))?;

    response
        .into_string()
        .context("failed to read GROBID response body")
}

fn multipart_body(filename: &str, pdf_bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(pdf_bytes.len() + 1024);
    push_field(&mut body, "segmentSentences", "1");
    for element in COORDINATE_ELEMENTS {
        push_field(&mut body, "teiCoordinates", element);
    }
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"input\"; filename=\"{filename}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/pdf\r\n\r\n");
    body.extend_from_slice(pdf_bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn push_field(body: &mut Vec<u8>, name: &str, value: &str) {
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n").as_bytes(),
    );
}
