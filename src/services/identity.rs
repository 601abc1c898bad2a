use serde_json::Value as JsonValue;
use sha2::{Digest, Sha256};

use crate::models::job::JobRecord;
use crate::models::source::RawRecord;

const DERIVED_ID_HEX_LEN: usize = 16;

/// Moves a generic `id` field into `job_id`, string-coerced.
pub fn promote_generic_id(raw: &mut RawRecord) {
    let Some(id) = raw.remove("id") else { return };
    let id = match id {
        JsonValue::String(s) if !s.trim().is_empty() => s.trim().to_string(),
        JsonValue::Number(n) => n.to_string(),
        _ => return,
    };
    raw.insert("job_id".to_string(), JsonValue::String(id));
}

/// `<prefix>-<first 16 hex digits of SHA-256(job_url)>`. Stable across runs.
pub fn derive_job_id(prefix: &str, job_url: &str) -> String {
    let digest = Sha256::digest(job_url.as_bytes());
    let hex = hex::encode(digest);
    format!("{}-{}", prefix, &hex[..DERIVED_ID_HEX_LEN])
}

/// Fills `job_id` from the URL when the source gave none. Returns `false`
/// when the record has no URL and therefore no identity at all.
pub fn ensure_job_id(job: &mut JobRecord, prefix: &str) -> bool {
    let url = job.job_url.trim();
    if url.is_empty() {
        return false;
    }
    let missing = job
        .job_id
        .as_deref()
        .map(|id| id.trim().is_empty())
        .unwrap_or(true);
    if missing {
        job.job_id = Some(derive_job_id(prefix, url));
    }
    true
}
