use super::pem::PemCertificate;
use super::{CertificateParser, Zone};
use crate::utils::errors::{CloudPkiError, Result};
use std::time::Duration;

pub const DEFAULT_WORKLOAD: &str = "Default";

/// Where the CSR of a request comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CsrOrigin {
    /// Generated locally by the caller's tooling
    #[default]
    LocalGenerated,
    /// Supplied ready-made by the caller
    UserProvided,
    /// Generated by the service; not supported
    ServiceGenerated,
}

/// Requested ordering of a retrieved chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChainOption {
    RootFirst,
    #[default]
    RootLast,
    /// Single certificate lookups; the service does not order these
    Ignore,
}

impl ChainOption {
    /// Value of the `chainOrder` query parameter
    pub fn wire_value(&self) -> &'static str {
        match self {
            Self::RootFirst => "ROOT_FIRST",
            Self::RootLast | Self::Ignore => "EE_FIRST",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomFieldType {
    Plain,
    /// Overrides the client type reported to the service
    Origin,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomField {
    pub field_type: CustomFieldType,
    pub name: String,
    pub value: String,
}

/// Deployment labels reported as usage metadata
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub instance: String,
    pub workload: String,
}

#[derive(Debug, Clone, Default)]
pub struct CertificateRequest {
    pub zone: Zone,
    pub csr_origin: CsrOrigin,
    /// PEM encoded CSR
    pub csr: Option<String>,
    pub location: Option<Location>,
    pub custom_fields: Vec<CustomField>,
    pub validity_hours: Option<u32>,
    pub chain_option: ChainOption,
    /// How long retrieval may wait for issuance; zero means do not wait
    pub timeout: Duration,
    /// Id of the submitted request, set once the service accepted it
    pub pickup_id: Option<String>,
    pub cert_id: Option<String>,
    pub thumbprint: Option<String>,
}

impl CertificateRequest {
    pub fn new(zone: Zone, csr: String) -> Self {
        Self {
            zone,
            csr: Some(csr),
            ..Default::default()
        }
    }

    /// Origin override from custom fields, if any
    pub fn origin(&self) -> Option<&str> {
        origin_field(&self.custom_fields)
    }

    /// ISO-8601 validity duration, e.g. `PT48H`
    pub fn validity_period(&self) -> Option<String> {
        self.validity_hours
            .filter(|hours| *hours > 0)
            .map(|hours| format!("PT{hours}H"))
    }

    /// Confirm an issued certificate carries the public key of this request's CSR
    pub fn check_certificate(&self, certificate: &PemCertificate) -> Result<()> {
        let Some(csr) = self.csr.as_deref() else {
            return Ok(());
        };

        let csr_key = CertificateParser::csr_public_key(csr)?;
        let cert_key = CertificateParser::certificate_public_key(certificate.der())?;
        if csr_key != cert_key {
            return Err(CloudPkiError::Integrity(format!(
                "public key of certificate {} does not match the certificate request",
                certificate.fingerprint()
            )));
        }
        Ok(())
    }
}

pub(crate) fn origin_field(fields: &[CustomField]) -> Option<&str> {
    fields
        .iter()
        .rev()
        .find(|f| f.field_type == CustomFieldType::Origin)
        .map(|f| f.value.as_str())
}

/// Target of a renewal: exactly one of thumbprint or certificate DN
#[derive(Debug, Clone, Default)]
pub struct RenewalRequest {
    pub thumbprint: Option<String>,
    /// Certificate request id of the certificate to renew
    pub certificate_dn: Option<String>,
    /// Carries the fresh CSR and usage metadata
    pub certificate_request: Option<CertificateRequest>,
}

#[derive(Debug, Clone, Default)]
pub struct ImportRequest {
    /// PEM encoded certificate issued elsewhere
    pub certificate_data: String,
    /// Destination application id; resolved from `zone` when unset
    pub application_id: Option<String>,
    pub zone: Option<Zone>,
    pub custom_fields: Vec<CustomField>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportResponse {
    pub certificate_dn: String,
    pub cert_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cert::assemble_chain;
    use crate::cert::parser::fixtures::*;

    #[test]
    fn test_validity_period() {
        let mut request = CertificateRequest::default();
        assert_eq!(request.validity_period(), None);
        request.validity_hours = Some(0);
        assert_eq!(request.validity_period(), None);
        request.validity_hours = Some(720);
        assert_eq!(request.validity_period().as_deref(), Some("PT720H"));
    }

    #[test]
    fn test_origin_override() {
        let mut request = CertificateRequest::default();
        assert_eq!(request.origin(), None);
        request.custom_fields.push(CustomField {
            field_type: CustomFieldType::Origin,
            name: "origin".to_string(),
            value: "pipeline".to_string(),
        });
        assert_eq!(request.origin(), Some("pipeline"));
    }

    #[test]
    fn test_check_certificate() {
        let leaf = assemble_chain(LEAF_PEM, ChainOption::RootLast).unwrap();

        let matching = CertificateRequest::new(Zone::default(), LEAF_CSR.to_string());
        assert!(matching.check_certificate(leaf.certificate()).is_ok());

        let other = CertificateRequest::new(Zone::default(), OTHER_CSR.to_string());
        assert!(matches!(
            other.check_certificate(leaf.certificate()),
            Err(CloudPkiError::Integrity(_))
        ));

        // Nothing to compare against
        assert!(CertificateRequest::default()
            .check_certificate(leaf.certificate())
            .is_ok());
    }

    #[test]
    fn test_chain_option_wire_values() {
        assert_eq!(ChainOption::RootFirst.wire_value(), "ROOT_FIRST");
        assert_eq!(ChainOption::RootLast.wire_value(), "EE_FIRST");
    }
}
