use super::request::ChainOption;
use super::Fingerprint;
use crate::utils::errors::{CloudPkiError, Result};
use pem::{EncodeConfig, LineEnding, Pem};

const CERTIFICATE_TAG: &str = "CERTIFICATE";

/// A single PEM-encoded certificate with its DER bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PemCertificate {
    pem_data: String,
    der: Vec<u8>,
}

impl PemCertificate {
    fn from_der(der: Vec<u8>) -> Self {
        let config = EncodeConfig::new().set_line_ending(LineEnding::LF);
        let pem_data = pem::encode_config(&Pem::new(CERTIFICATE_TAG, der.clone()), config);
        Self { pem_data, der }
    }

    /// Get the raw PEM data
    pub fn pem_data(&self) -> &str {
        &self.pem_data
    }

    pub fn der(&self) -> &[u8] {
        &self.der
    }

    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of_der(&self.der)
    }
}

/// Certificate plus the rest of the chain, in the order the service emitted them
#[derive(Debug, Clone)]
pub struct PemCollection {
    certificate: PemCertificate,
    chain: Vec<PemCertificate>,
    order: ChainOption,
}

impl PemCollection {
    /// The leaf certificate (first received block)
    pub fn certificate(&self) -> &PemCertificate {
        &self.certificate
    }

    /// Remaining blocks in received order
    pub fn chain(&self) -> &[PemCertificate] {
        &self.chain
    }

    /// The issued end-entity certificate: the last block of a ROOT_FIRST chain,
    /// the first block otherwise
    pub fn end_entity(&self) -> &PemCertificate {
        match self.order {
            ChainOption::RootFirst => self.chain.last().unwrap_or(&self.certificate),
            ChainOption::RootLast | ChainOption::Ignore => &self.certificate,
        }
    }

    pub fn len(&self) -> usize {
        1 + self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// All certificates, leaf first
    pub fn iter(&self) -> impl Iterator<Item = &PemCertificate> {
        std::iter::once(&self.certificate).chain(self.chain.iter())
    }

    /// Get raw PEM data for all certificates concatenated
    pub fn pem_data(&self) -> String {
        self.iter().map(PemCertificate::pem_data).collect()
    }
}

/// Split a multi-PEM response into a [`PemCollection`].
///
/// Ordering is the service's job (it is asked for ROOT_FIRST or EE_FIRST); blocks are
/// never re-sorted here. The first CERTIFICATE block is the leaf. Blocks with other
/// labels are skipped.
pub fn assemble_chain(raw: &str, order: ChainOption) -> Result<PemCollection> {
    let blocks = pem::parse_many(raw.as_bytes())
        .map_err(|e| CloudPkiError::CertParsing(format!("malformed PEM response: {e}")))?;

    let mut certificates = blocks
        .into_iter()
        .filter(|block| {
            let keep = block.tag() == CERTIFICATE_TAG;
            if !keep {
                tracing::trace!("Skipping {} block in certificate response", block.tag());
            }
            keep
        })
        .map(|block| PemCertificate::from_der(block.into_contents()));

    let certificate = certificates.next().ok_or_else(|| {
        CloudPkiError::CertParsing("no certificate found in PEM response".to_string())
    })?;
    let chain: Vec<_> = certificates.collect();

    tracing::debug!(
        "Assembled chain of {} certificate(s) ({:?})",
        chain.len() + 1,
        order
    );

    Ok(PemCollection {
        certificate,
        chain,
        order,
    })
}
