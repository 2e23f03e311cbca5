pub mod fingerprint;
pub mod metadata;
pub mod parser;
pub mod pem;
pub mod request;
pub mod zone;

pub use fingerprint::{Fingerprint, FingerprintParseError};
pub use metadata::{CertificateColumn, CertificateInfo};
pub use parser::CertificateParser;
pub use self::pem::{assemble_chain, PemCertificate, PemCollection};
pub use request::{
    CertificateRequest, ChainOption, CsrOrigin, CustomField, CustomFieldType, ImportRequest,
    ImportResponse, Location, RenewalRequest,
};
pub use zone::Zone;
