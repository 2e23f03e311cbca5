pub mod identity;
pub mod orchestrator;
pub mod poller;

pub use identity::{FingerprintMatch, IdentityResolver, ZoneIds};
pub use orchestrator::{CertificateLifecycle, ListFilter};
pub use poller::{await_issuance, RetryPolicy};
