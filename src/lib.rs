//! Audited client library for the FICS Mortgage Servicer REST gateway.
//!
//! Every servicing automation task follows the same shape: build a JSON
//! request for one vendor endpoint, send it while an audit trail records the
//! call, check the `ApiCallSuccessful` flag on the returned envelope, and
//! either hand the envelope back to the caller or decode an embedded base64
//! document and write it to disk.
//!
//! The crate splits that shape into three reusable pieces:
//! - [`api::GatewayClient`]: HTTP dispatch with a closed verb set and a
//!   bounded request timeout
//! - [`audit`]: a per-invocation log sink appended to `api_calls.log`, with
//!   sensitive fields redacted before they reach disk
//! - [`document`]: dotted-path payload extraction plus an atomic
//!   decode-and-write
//!
//! The [`tasks`] module layers the vendor's fixed endpoints on top; the
//! request field names live there as data, not as logic. The task runner
//! that parses arguments and invokes these functions is a separate program.

pub mod api;
pub mod audit;
pub mod config;
pub mod document;
pub mod error;
pub mod outcome;
pub mod tasks;

pub use api::{GatewayClient, HttpMethod};
pub use config::GatewayConfig;
pub use error::{GatewayError, Result};
pub use outcome::TaskOutcome;
pub use tasks::TaskContext;
