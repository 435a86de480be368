// [libs/domain/graph-model/src/evidence.rs]
//! Content-addressed evidence snippets.

use serde::{Deserialize, Serialize};
use warden_identifiers::{content_hash, redaction::redact};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub kind: String,
    pub summary: String,
    /// Redacted detail text. Never holds a raw secret (§3 invariant 5).
    pub detail: String,
    pub sha256_hash: String,
}

impl Evidence {
    /// Builds an evidence item, redacting `detail` and hashing the
    /// redacted content so identical observations dedupe even if the
    /// caller passes slightly different raw (pre-redaction) text.
    pub fn new(kind: impl Into<String>, summary: impl Into<String>, detail: impl Into<String>) -> Self {
        let redacted_detail = redact(&detail.into());
        let hash = content_hash(&redacted_detail);
        Self {
            kind: kind.into(),
            summary: summary.into(),
            detail: redacted_detail,
            sha256_hash: hash,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evidence_detail_is_redacted_before_hashing() {
        let evidence = Evidence::new("header", "auth header observed", "Authorization: Bearer eyJhbGciOi.abc.def");
        assert!(!evidence.detail.contains("eyJhbGciOi"));
        assert_eq!(evidence.sha256_hash, warden_identifiers::content_hash(&evidence.detail));
    }

    #[test]
    fn identical_detail_hashes_identically() {
        let a = Evidence::new("status_diff", "s", "200->500");
        let b = Evidence::new("status_diff", "s", "200->500");
        assert_eq!(a.sha256_hash, b.sha256_hash);
    }
}
