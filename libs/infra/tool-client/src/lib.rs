// [libs/infra/tool-client/src/lib.rs]
//! External tool invocation boundary (§4.4.1). Every tool wrapper
//! (subfinder, httpx, dns, wayback, nuclei, html crawler, JS miner) is
//! treated as an opaque provider behind `ToolProvider`.

pub mod contract;
pub mod errors;
pub mod mock;
pub mod provider;

pub use contract::*;
pub use errors::ToolError;
pub use mock::MockToolProvider;
pub use provider::{HttpToolProvider, ToolProvider};
