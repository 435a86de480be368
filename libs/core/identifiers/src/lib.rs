// [libs/core/identifiers/src/lib.rs]
//! Identifier generation and content addressing for the Warden platform.
//!
//! Three concerns live here because they are all small, pure, and shared
//! by every component that touches the graph: mission id minting (§3
//! "Mission ... Identified by a ULID-like string"), edge id derivation
//! (§3 "Edge. Key = sha1(relation|from|to|mission)[:16]"), and evidence
//! redaction (§3 invariant 5, "secrets in snippets are redacted by a
//! rules-of-engagement pattern set before persistence").

pub mod redaction;
pub mod ulid;

use sha1::{Digest as Sha1Digest, Sha1};
use sha2::{Digest as Sha2Digest, Sha256};

/// Generates a new mission identifier.
///
/// Mission ids are ULID-like: lexicographically sortable by creation
/// time, which lets the orchestrator enumerate missions in creation
/// order without a secondary index.
pub fn new_mission_id() -> String {
    ulid::new_ulid()
}

/// Derives the deterministic edge key described in §3: the first
/// 16 hex characters of `sha1(relation|from|to|mission)`.
///
/// This makes `upsertEdge` naturally idempotent: re-submitting an
/// identical edge always recomputes the same key, so the store can use
/// insert-or-ignore semantics instead of a separate existence check.
pub fn edge_id(relation: &str, from: &str, to: &str, mission_id: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(relation.as_bytes());
    hasher.update(b"|");
    hasher.update(from.as_bytes());
    hasher.update(b"|");
    hasher.update(to.as_bytes());
    hasher.update(b"|");
    hasher.update(mission_id.as_bytes());
    let digest = hasher.finalize();
    hex::encode(digest)[..16].to_string()
}

/// Computes the SHA-256 content hash used to deduplicate evidence
/// items (§3 invariant 5) and to content-address reflection
/// script outputs.
pub fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// Generates a short opaque id for traces, spans, tasks and tool calls
/// (§4.1 envelope fields). These are deliberately not ULIDs: they
/// are never sorted or persisted as primary keys, only correlated.
pub fn short_opaque_id(prefix: &str) -> String {
    format!("{prefix}_{}", hex::encode(rand::random::<[u8; 8]>()))
}
