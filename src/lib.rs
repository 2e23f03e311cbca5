pub mod cert;
pub mod cli;
pub mod cloud;
pub mod lifecycle;
pub mod utils;

// Re-export specific items to avoid conflicts
pub use cert::{
    CertificateInfo, CertificateRequest, ChainOption, Fingerprint, ImportRequest, ImportResponse,
    PemCollection, RenewalRequest, Zone,
};
pub use cloud::{auth::Session, client::CloudClient, transport::Transport};
pub use lifecycle::{CertificateLifecycle, ListFilter, RetryPolicy};
pub use utils::{config, errors};
