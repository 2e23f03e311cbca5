use crate::utils::errors::{CloudPkiError, Result};
use x509_parser::certification_request::X509CertificationRequest;
use x509_parser::pem::parse_x509_pem;
use x509_parser::prelude::*;

const CERTIFICATE_LABEL: &str = "CERTIFICATE";
const CSR_LABELS: [&str; 2] = ["CERTIFICATE REQUEST", "NEW CERTIFICATE REQUEST"];

pub struct CertificateParser;

impl CertificateParser {
    /// Decode the first PEM block of `pem_data` and return its DER bytes.
    /// The block must carry the CERTIFICATE label.
    pub fn certificate_der(pem_data: &str) -> Result<Vec<u8>> {
        let (_, pem) = parse_x509_pem(pem_data.trim_start().as_bytes())
            .map_err(|e| CloudPkiError::CertParsing(format!("Failed to parse PEM: {e}")))?;

        if pem.label != CERTIFICATE_LABEL {
            return Err(CloudPkiError::CertParsing(format!(
                "expected a CERTIFICATE block, found {}",
                pem.label
            )));
        }

        // Reject blocks that are PEM-shaped but not X.509
        X509Certificate::from_der(&pem.contents)
            .map_err(|e| CloudPkiError::CertParsing(format!("DER parsing error: {e}")))?;

        Ok(pem.contents)
    }

    /// Raw SubjectPublicKeyInfo of a DER certificate
    pub fn certificate_public_key(der: &[u8]) -> Result<Vec<u8>> {
        let (_, cert) = X509Certificate::from_der(der)
            .map_err(|e| CloudPkiError::CertParsing(format!("DER parsing error: {e}")))?;
        Ok(cert.public_key().raw.to_vec())
    }

    /// Raw SubjectPublicKeyInfo of a PEM encoded CSR
    pub fn csr_public_key(csr_pem: &str) -> Result<Vec<u8>> {
        let (_, pem) = parse_x509_pem(csr_pem.trim_start().as_bytes())
            .map_err(|e| CloudPkiError::CertParsing(format!("Failed to parse CSR PEM: {e}")))?;

        if !CSR_LABELS.contains(&pem.label.as_str()) {
            return Err(CloudPkiError::CertParsing(format!(
                "expected a CERTIFICATE REQUEST block, found {}",
                pem.label
            )));
        }

        let (_, csr) = X509CertificationRequest::from_der(&pem.contents)
            .map_err(|e| CloudPkiError::CertParsing(format!("CSR parsing error: {e}")))?;
        Ok(csr.certification_request_info.subject_pki.raw.to_vec())
    }

    /// Subject common name of a DER certificate, if any
    pub fn common_name(der: &[u8]) -> Option<String> {
        let (_, cert) = X509Certificate::from_der(der).ok()?;
        let cn = cert
            .subject()
            .iter_common_name()
            .next()
            .and_then(|cn| cn.as_str().ok())
            .map(str::to_string);
        cn
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Chain root -> intermediate -> leaf (EC P-256), the leaf's CSR and an unrelated CSR.

    pub const ROOT_PEM: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/testdata/root.pem"));
    pub const INTERMEDIATE_PEM: &str =
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/testdata/intermediate.pem"));
    pub const LEAF_PEM: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/testdata/leaf.pem"));
    pub const LEAF_CSR: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/testdata/leaf.csr"));
    pub const OTHER_CSR: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/testdata/other.csr"));
    pub const LEAF_FINGERPRINT: &str = "5000C98DCF8C3A1165B76402292D299BF8DC6104";
}
