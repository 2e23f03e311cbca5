use super::identity::IdentityResolver;
use super::poller::{await_issuance, RetryPolicy, DEFAULT_POLL_INTERVAL};
use crate::cert::request::{origin_field, DEFAULT_WORKLOAD};
use crate::cert::{
    assemble_chain, CertificateInfo, CertificateParser, CertificateRequest, ChainOption, CsrOrigin,
    Fingerprint, ImportRequest, ImportResponse, Location, PemCollection, RenewalRequest, Zone,
};
use crate::cloud::auth::Session;
use crate::cloud::client::CloudClient;
use crate::cloud::models::{
    CertificateRequestPayload, CertificateUsageMetadata, ComparisonOperator, Expression,
    ImportCertificateInfo, ImportPayload, ImportResult, LogicalOperator, Operand, Paging,
    SearchRequest, ZoneTemplate,
};
use crate::cloud::paths;
use crate::cloud::response::{parse_body, unexpected_status};
use crate::cloud::transport::{HttpTransport, Transport};
use crate::utils::errors::{CloudPkiError, Result};
use base64::{engine::general_purpose, Engine as _};
use chrono::{SecondsFormat, Utc};
use std::time::Duration;

pub const LIST_PAGE_SIZE: usize = 50;
pub const DEFAULT_LIST_LIMIT: usize = 100_000_000;
pub const IMPORT_INDEXING_DELAY: Duration = Duration::from_secs(1);

/// Selection for [`CertificateLifecycle::list_certificates`]
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub zone: Zone,
    /// Maximum number of entries; unlimited when unset
    pub limit: Option<usize>,
    pub with_expired: bool,
}

/// Drives certificates through request, issuance, retrieval, renewal and import
pub struct CertificateLifecycle<T = HttpTransport> {
    client: CloudClient<T>,
    poll_interval: Duration,
    import_indexing_delay: Duration,
}

impl<T: Transport> CertificateLifecycle<T> {
    pub fn new(client: CloudClient<T>) -> Self {
        Self {
            client,
            poll_interval: DEFAULT_POLL_INTERVAL,
            import_indexing_delay: IMPORT_INDEXING_DELAY,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn client(&self) -> &CloudClient<T> {
        &self.client
    }

    fn resolver<'a>(&'a self, session: &'a Session) -> IdentityResolver<'a, T> {
        IdentityResolver::new(&self.client, session)
    }

    pub async fn authenticate(&self, api_key: &str) -> Result<Session> {
        self.client.authenticate(api_key).await
    }

    /// Submit a signing request; records and returns the pickup id
    pub async fn request_certificate(
        &self,
        session: &Session,
        request: &mut CertificateRequest,
    ) -> Result<String> {
        if request.csr_origin == CsrOrigin::ServiceGenerated {
            return Err(CloudPkiError::Validation(
                "service generated CSR is not supported".to_string(),
            ));
        }
        let csr = request
            .csr
            .clone()
            .filter(|csr| !csr.trim().is_empty())
            .ok_or_else(|| CloudPkiError::Validation("CSR was not supplied".to_string()))?;
        session.require_company("request a certificate")?;

        let zone = self.resolver(session).resolve_zone(&request.zone).await?;
        let payload = CertificateRequestPayload {
            csr: Some(csr),
            application_id: zone.application_id,
            template_id: zone.template_id,
            api_client_information: Some(self.client.api_client_information(request.origin())),
            certificate_usage_metadata: usage_metadata(request.location.as_ref()),
            validity_period: request.validity_period(),
            ..Default::default()
        };

        let created = self
            .client
            .create_certificate_request(session, &payload)
            .await?;
        tracing::info!(
            "Submitted certificate request {} to zone {}",
            created.id,
            request.zone
        );

        request.pickup_id = Some(created.id.clone());
        Ok(created.id)
    }

    /// Fetch an issued certificate by certificate id, pickup id or thumbprint (in that order)
    pub async fn retrieve_certificate(
        &self,
        session: &Session,
        request: &CertificateRequest,
    ) -> Result<PemCollection> {
        session.require_company("retrieve a certificate")?;

        if let Some(certificate_id) = non_empty(&request.cert_id) {
            tracing::debug!("Retrieving certificate {} by id", certificate_id);
            let response = self
                .client
                .get_certificate_contents(session, certificate_id, None)
                .await?;
            if response.status != 200 {
                return Err(unexpected_status(&response, "certificate retrieval"));
            }
            return assemble_chain(&response.body_text(), ChainOption::Ignore);
        }

        let (pickup_id, known_certificate_id) = if let Some(pickup_id) = non_empty(&request.pickup_id)
        {
            (pickup_id.to_string(), None)
        } else if let Some(thumbprint) = non_empty(&request.thumbprint) {
            let found = self
                .resolver(session)
                .resolve_by_fingerprint(thumbprint)
                .await?;
            (found.request_id, found.certificate_id)
        } else {
            return Err(CloudPkiError::Validation(
                "failed to retrieve certificate: certificate id, pickup id or thumbprint required"
                    .to_string(),
            ));
        };

        let certificate_id = match known_certificate_id {
            Some(id) => id,
            None => {
                let policy = RetryPolicy::new(request.timeout).with_interval(self.poll_interval);
                await_issuance(&self.client, session, &pickup_id, policy)
                    .await?
                    .ok_or_else(|| {
                        CloudPkiError::NotFound(format!(
                            "no certificate issued for request {pickup_id}"
                        ))
                    })?
            }
        };

        let response = self
            .client
            .get_certificate_contents(session, &certificate_id, Some(request.chain_option))
            .await?;
        match response.status {
            200 => {}
            409 => {
                return Err(CloudPkiError::CertificatePending {
                    pickup_id,
                    status: None,
                })
            }
            _ => return Err(unexpected_status(&response, "certificate retrieval")),
        }

        let collection = assemble_chain(&response.body_text(), request.chain_option)?;
        request.check_certificate(collection.end_entity())?;
        Ok(collection)
    }

    /// Submit a renewal of a previously issued certificate with a fresh CSR.
    ///
    /// Returns the id of the new certificate request.
    pub async fn renew_certificate(
        &self,
        session: &Session,
        renewal: &RenewalRequest,
    ) -> Result<String> {
        let resolver = self.resolver(session);
        let request_id = resolver.resolve_renewal_target(renewal).await?;

        let previous = self
            .client
            .get_certificate_status(session, &request_id)
            .await?;
        let missing = |field: &'static str| CloudPkiError::MissingRenewalField {
            field,
            status: previous.status,
        };
        let certificate_id = previous
            .certificate_id()
            .ok_or_else(|| missing("certificateId"))?
            .to_string();
        if previous.application_id.is_empty() {
            return Err(missing("applicationId"));
        }
        if previous.template_id.is_empty() {
            return Err(missing("templateId"));
        }

        resolver
            .verify_renewal_lineage(&certificate_id, &request_id, renewal.thumbprint.as_deref())
            .await?;
        session.require_company("request a certificate")?;

        let fresh = renewal.certificate_request.as_ref();
        let csr = fresh
            .and_then(|request| non_empty(&request.csr))
            .ok_or_else(|| {
                CloudPkiError::Validation(
                    "reusing the existing CSR is not supported for renewal; a new CSR must be provided"
                        .to_string(),
                )
            })?;

        let payload = CertificateRequestPayload {
            csr: Some(csr.to_string()),
            application_id: previous.application_id.clone(),
            template_id: Some(previous.template_id.clone()),
            existing_certificate_id: Some(certificate_id.clone()),
            reuse_csr: Some(false),
            certificate_usage_metadata: usage_metadata(fresh.and_then(|r| r.location.as_ref())),
            ..Default::default()
        };

        let created = self
            .client
            .create_certificate_request(session, &payload)
            .await?;
        tracing::info!(
            "Renewal of certificate {} submitted as request {}",
            certificate_id,
            created.id
        );
        Ok(created.id)
    }

    /// Upload a certificate issued elsewhere and return its record once indexed
    pub async fn import_certificate(
        &self,
        session: &Session,
        request: &ImportRequest,
    ) -> Result<ImportResponse> {
        let der = CertificateParser::certificate_der(&request.certificate_data)
            .map_err(|e| CloudPkiError::Validation(format!("can't parse certificate: {e}")))?;

        let application_id = match (non_empty(&request.application_id), &request.zone) {
            (Some(id), _) => id.to_string(),
            (None, Some(zone)) => {
                self.resolver(session)
                    .resolve_application(zone.application_name())
                    .await?
                    .application_id
            }
            (None, None) => {
                return Err(CloudPkiError::Validation(
                    "an application id or zone is required to import a certificate".to_string(),
                ))
            }
        };

        let fingerprint = Fingerprint::of_der(&der);
        let payload = ImportPayload {
            certificates: vec![ImportCertificateInfo {
                certificate: general_purpose::STANDARD.encode(&der),
                application_ids: vec![application_id],
                api_client_information: self
                    .client
                    .api_client_information(origin_field(&request.custom_fields)),
            }],
        };

        let response = self
            .client
            .post(Some(session.api_key()), &paths::certificates(), &payload)
            .await
            .map_err(|e| CloudPkiError::RemoteUnavailable {
                status: None,
                detail: e.to_string(),
            })?;

        match response.status {
            200..=299 => {}
            400 | 403 | 409 => {
                return Err(CloudPkiError::RemoteBadData {
                    status: response.status,
                    status_text: response.status_text.clone(),
                    body: response.body_text(),
                })
            }
            500..=599 => {
                return Err(CloudPkiError::RemoteUnavailable {
                    status: Some(response.status),
                    detail: response.body_text(),
                })
            }
            _ => return Err(unexpected_status(&response, "certificate import")),
        }

        let result: ImportResult = parse_body(&response.body, "certificate import")?;
        if result.certificate_informations.len() != 1 {
            return Err(CloudPkiError::RemoteBadData {
                status: response.status,
                status_text: response.status_text.clone(),
                body: "certificate was not imported for an unknown reason".to_string(),
            });
        }

        // The search index lags behind the import; a single fixed wait, no retry
        tokio::time::sleep(self.import_indexing_delay).await;

        let found = self
            .client
            .search_by_fingerprint(session, &fingerprint)
            .await?;
        if found.certificates.len() != 1 {
            return Err(CloudPkiError::ImportInconsistent {
                fingerprint: fingerprint.to_string(),
                matches: found.certificates.len(),
            });
        }

        let record = found.certificates.into_iter().next().ok_or_else(|| {
            CloudPkiError::ImportInconsistent {
                fingerprint: fingerprint.to_string(),
                matches: 0,
            }
        })?;
        tracing::info!("Imported certificate {} ({})", record.id, fingerprint);

        Ok(ImportResponse {
            certificate_dn: record
                .subject_cn
                .into_iter()
                .next()
                .or_else(|| CertificateParser::common_name(&der))
                .unwrap_or_default(),
            cert_id: record.id,
        })
    }

    /// Page through the certificates of a zone's application
    pub async fn list_certificates(
        &self,
        session: &Session,
        filter: &ListFilter,
    ) -> Result<Vec<CertificateInfo>> {
        if filter.zone.is_empty() {
            return Err(CloudPkiError::Validation("empty zone".to_string()));
        }

        let application = self
            .resolver(session)
            .resolve_application(filter.zone.application_name())
            .await?;

        let mut remaining = filter.limit.unwrap_or(DEFAULT_LIST_LIMIT);
        let mut certificates = Vec::new();
        let mut page_number = 0;

        while remaining > 0 {
            let mut operands = vec![Operand::new(
                "appstackIds",
                ComparisonOperator::Match,
                application.application_id.as_str(),
            )];
            if !filter.with_expired {
                operands.push(Operand::new(
                    "validityEnd",
                    ComparisonOperator::Gte,
                    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
                ));
            }
            let search = SearchRequest {
                expression: Expression {
                    operator: Some(LogicalOperator::And),
                    operands,
                },
                paging: Some(Paging {
                    page_number,
                    page_size: LIST_PAGE_SIZE,
                }),
            };

            let mut batch = self
                .client
                .search_certificates(session, &search)
                .await?
                .certificates;
            tracing::trace!("Page {} returned {} certificate(s)", page_number, batch.len());

            batch.truncate(remaining);
            let received = batch.len();
            certificates.extend(batch.into_iter().map(CertificateInfo::from));

            if received < LIST_PAGE_SIZE {
                break;
            }
            remaining = remaining.saturating_sub(LIST_PAGE_SIZE);
            page_number += 1;
        }

        tracing::debug!(
            "Listed {} certificate(s) for application {}",
            certificates.len(),
            application.name
        );
        Ok(certificates)
    }

    /// Read the issuing template behind `<application>\<alias>`
    pub async fn read_zone_template(&self, session: &Session, zone: &Zone) -> Result<ZoneTemplate> {
        if zone.is_empty() || zone.template_alias().is_empty() {
            return Err(CloudPkiError::Validation(format!(
                "zone '{zone}' must name both an application and a template alias"
            )));
        }
        self.client
            .get_zone_template(session, zone.application_name(), zone.template_alias())
            .await
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn usage_metadata(location: Option<&Location>) -> Vec<CertificateUsageMetadata> {
    location
        .map(|location| {
            let workload = if location.workload.is_empty() {
                DEFAULT_WORKLOAD
            } else {
                location.workload.as_str()
            };
            vec![CertificateUsageMetadata {
                app_name: workload.to_string(),
                node_name: location.instance.clone(),
            }]
        })
        .unwrap_or_default()
}
