use crate::cert::{Fingerprint, RenewalRequest, Zone};
use crate::cloud::auth::Session;
use crate::cloud::client::CloudClient;
use crate::cloud::models::{ApplicationDetails, CertificateSummary};
use crate::cloud::transport::Transport;
use crate::utils::errors::{CloudPkiError, Result};

/// Outcome of a fingerprint lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FingerprintMatch {
    pub request_id: String,
    /// Present when the matched record already names its certificate
    pub certificate_id: Option<String>,
}

/// Application and template ids behind a zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneIds {
    pub application_id: String,
    /// `None` selects the application's default template
    pub template_id: Option<String>,
}

/// Reduce search hits to a single owning request; disagreement is an error
pub fn reconcile_matches(
    fingerprint: &Fingerprint,
    matches: &[CertificateSummary],
) -> Result<FingerprintMatch> {
    let mut request_ids: Vec<&str> = Vec::new();
    for hit in matches {
        let id = hit.certificate_request_id.as_str();
        if !id.is_empty() && !request_ids.contains(&id) {
            request_ids.push(id);
        }
    }

    match request_ids.as_slice() {
        [] => Err(CloudPkiError::NotFound(format!(
            "no certificate found using fingerprint {fingerprint}"
        ))),
        [request_id] => {
            let certificate_id = matches
                .iter()
                .filter(|hit| hit.certificate_request_id == *request_id)
                .map(|hit| hit.id.as_str())
                .find(|id| !id.is_empty())
                .map(str::to_string);
            Ok(FingerprintMatch {
                request_id: request_id.to_string(),
                certificate_id,
            })
        }
        _ => Err(CloudPkiError::AmbiguousIdentity {
            fingerprint: fingerprint.to_string(),
            request_ids: request_ids.into_iter().map(str::to_string).collect(),
        }),
    }
}

/// Maps fingerprints, DNs and zones onto the ids follow-up calls need
pub struct IdentityResolver<'a, T> {
    client: &'a CloudClient<T>,
    session: &'a Session,
}

impl<'a, T: Transport> IdentityResolver<'a, T> {
    pub fn new(client: &'a CloudClient<T>, session: &'a Session) -> Self {
        Self { client, session }
    }

    pub async fn resolve_by_fingerprint(&self, fingerprint: &str) -> Result<FingerprintMatch> {
        let fingerprint = Fingerprint::new(fingerprint);
        let result = self
            .client
            .search_by_fingerprint(self.session, &fingerprint)
            .await?;

        tracing::debug!(
            "Fingerprint {} matched {} certificate(s)",
            fingerprint,
            result.certificates.len()
        );
        reconcile_matches(&fingerprint, &result.certificates)
    }

    pub async fn resolve_application(&self, application_name: &str) -> Result<ApplicationDetails> {
        self.client
            .get_application_by_name(self.session, application_name)
            .await
    }

    pub async fn resolve_zone(&self, zone: &Zone) -> Result<ZoneIds> {
        if zone.is_empty() {
            return Err(CloudPkiError::Validation("empty zone".to_string()));
        }

        let application = self.resolve_application(zone.application_name()).await?;
        let template_id = match zone.template_alias() {
            "" => None,
            alias => Some(
                application
                    .template_alias_map
                    .get(alias)
                    .cloned()
                    .ok_or_else(|| {
                        CloudPkiError::NotFound(format!(
                            "template alias '{alias}' is not assigned to application '{}'",
                            zone.application_name()
                        ))
                    })?,
            ),
        };

        Ok(ZoneIds {
            application_id: application.application_id,
            template_id,
        })
    }

    /// Certificate request id targeted by a renewal
    pub async fn resolve_renewal_target(&self, renewal: &RenewalRequest) -> Result<String> {
        let thumbprint = renewal.thumbprint.as_deref().filter(|s| !s.is_empty());
        let dn = renewal.certificate_dn.as_deref().filter(|s| !s.is_empty());

        match (thumbprint, dn) {
            (Some(thumbprint), None) => Ok(self.resolve_by_fingerprint(thumbprint).await?.request_id),
            (None, Some(dn)) => Ok(dn.to_string()),
            (Some(_), Some(_)) => Err(CloudPkiError::Validation(
                "failed to create renewal request: specify either CertificateDN or Thumbprint, not both"
                    .to_string(),
            )),
            (None, None) => Err(CloudPkiError::Validation(
                "failed to create renewal request: CertificateDN or Thumbprint required".to_string(),
            )),
        }
    }

    /// Require the certificate's latest request to be `expected_request_id`
    pub async fn verify_renewal_lineage(
        &self,
        certificate_id: &str,
        expected_request_id: &str,
        fingerprint: Option<&str>,
    ) -> Result<()> {
        let certificate = self
            .client
            .get_certificate(self.session, certificate_id)
            .await?;

        if certificate.certificate_request_id != expected_request_id {
            tracing::warn!(
                "Certificate {} was last produced by request {}, not {}",
                certificate_id,
                certificate.certificate_request_id,
                expected_request_id
            );
            return Err(CloudPkiError::LineageMismatch {
                request_id: expected_request_id.to_string(),
                certificate_id: certificate_id.to_string(),
                latest_request_id: certificate.certificate_request_id,
                fingerprint: fingerprint.map(str::to_string),
            });
        }
        Ok(())
    }
}
