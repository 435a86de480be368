// [libs/domain/graph-model/src/error.rs]
//! Cross-cutting failure taxonomy (§7).
//!
//! Component-local error enums (`GraphError` in the store,
//! `ToolError` in the tool client, …) each expose a `code()` method
//! returning one of these. This is the value that crosses a
//! component boundary: it is what gets attached to an `ERROR` event
//! and to a mission's `errors` array.

use serde::{Deserialize, Serialize};

/// One error family per §7. The numeric prefix of `ErrorCode`
/// determines the family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorFamily {
    Network,
    Tool,
    Service,
    Data,
    Internal,
}

/// A specific numbered error code from §7, with its retry and
/// recovery characteristics baked in so callers never have to
/// re-derive them from the numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // E1xx Network -- all retryable, all recoverable.
    E101TimedOut,
    E102ConnectionRefused,
    E103DnsFailure,
    E104TlsFailure,
    // E2xx Tool -- only E203 is retryable, all recoverable.
    E201NotFound,
    E202ExecutionFailed,
    E203Timeout,
    E204InvalidOutput,
    // E3xx Service -- only E302 is retryable, all recoverable.
    E301Unavailable,
    E302RateLimited,
    E303AuthFailure,
    // E4xx Data -- none retryable, all recoverable.
    E401ParseFailure,
    E402ValidationFailure,
    E403NotFound,
    // E5xx Internal -- none retryable; E502/E503/E504 recoverable, E501 terminal.
    E501Generic,
    E502Agent,
    E503Llm,
    E504Serialization,
}

impl ErrorCode {
    pub fn family(self) -> ErrorFamily {
        use ErrorCode::*;
        match self {
            E101TimedOut | E102ConnectionRefused | E103DnsFailure | E104TlsFailure => ErrorFamily::Network,
            E201NotFound | E202ExecutionFailed | E203Timeout | E204InvalidOutput => ErrorFamily::Tool,
            E301Unavailable | E302RateLimited | E303AuthFailure => ErrorFamily::Service,
            E401ParseFailure | E402ValidationFailure | E403NotFound => ErrorFamily::Data,
            E501Generic | E502Agent | E503Llm | E504Serialization => ErrorFamily::Internal,
        }
    }

    pub fn retryable(self) -> bool {
        use ErrorCode::*;
        matches!(
            self,
            E101TimedOut | E102ConnectionRefused | E103DnsFailure | E104TlsFailure | E203Timeout | E302RateLimited
        )
    }

    pub fn recoverable(self) -> bool {
        !matches!(self, ErrorCode::E501Generic)
    }

    /// The stable short code string used in event payloads, e.g. `"E101"`.
    pub fn code_str(self) -> &'static str {
        use ErrorCode::*;
        match self {
            E101TimedOut => "E101",
            E102ConnectionRefused => "E102",
            E103DnsFailure => "E103",
            E104TlsFailure => "E104",
            E201NotFound => "E201",
            E202ExecutionFailed => "E202",
            E203Timeout => "E203",
            E204InvalidOutput => "E204",
            E301Unavailable => "E301",
            E302RateLimited => "E302",
            E303AuthFailure => "E303",
            E401ParseFailure => "E401",
            E402ValidationFailure => "E402",
            E403NotFound => "E403",
            E501Generic => "E501",
            E502Agent => "E502",
            E503Llm => "E503",
            E504Serialization => "E504",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_e203_and_e302_are_retryable_within_their_families() {
        assert!(!ErrorCode::E201NotFound.retryable());
        assert!(!ErrorCode::E202ExecutionFailed.retryable());
        assert!(ErrorCode::E203Timeout.retryable());
        assert!(!ErrorCode::E204InvalidOutput.retryable());

        assert!(!ErrorCode::E301Unavailable.retryable());
        assert!(ErrorCode::E302RateLimited.retryable());
        assert!(!ErrorCode::E303AuthFailure.retryable());
    }

    #[test]
    fn e501_is_the_only_unrecoverable_internal_code() {
        assert!(!ErrorCode::E501Generic.recoverable());
        assert!(ErrorCode::E502Agent.recoverable());
        assert!(ErrorCode::E503Llm.recoverable());
        assert!(ErrorCode::E504Serialization.recoverable());
    }

    #[test]
    fn network_family_is_always_retryable_and_recoverable() {
        for code in [
            ErrorCode::E101TimedOut,
            ErrorCode::E102ConnectionRefused,
            ErrorCode::E103DnsFailure,
            ErrorCode::E104TlsFailure,
        ] {
            assert_eq!(code.family(), ErrorFamily::Network);
            assert!(code.retryable());
            assert!(code.recoverable());
        }
    }
}
