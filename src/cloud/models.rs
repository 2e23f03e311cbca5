use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseError {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseErrors {
    pub errors: Vec<ResponseError>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username: String,
    pub id: String,
    #[serde(default)]
    pub company_id: String,
    #[serde(default)]
    pub email_address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub active: bool,
}

/// Response of the user-account lookup used to authenticate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDetails {
    pub user: User,
    pub company: Option<Company>,
}

/// Issuance state of a certificate request, driven by the remote service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssuanceStatus {
    Requested,
    Pending,
    Issued,
    Failed,
}

impl IssuanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Requested => "REQUESTED",
            Self::Pending => "PENDING",
            Self::Issued => "ISSUED",
            Self::Failed => "FAILED",
        }
    }
}

impl fmt::Display for IssuanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Certificate request record, as returned by create and status lookups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateStatus {
    pub id: String,
    pub status: IssuanceStatus,
    #[serde(default)]
    pub application_id: String,
    #[serde(default, rename = "certificateIssuingTemplateId")]
    pub template_id: String,
    #[serde(default, rename = "certificateIds")]
    pub certificate_ids: Vec<String>,
    #[serde(default)]
    pub error_information: Option<serde_json::Value>,
}

impl CertificateStatus {
    /// First certificate id, the authoritative one once issued
    pub fn certificate_id(&self) -> Option<&str> {
        self.certificate_ids
            .first()
            .map(String::as_str)
            .filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateRequestsResponse {
    pub certificate_requests: Vec<CertificateStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiClientInformation {
    #[serde(rename = "type")]
    pub client_type: String,
    pub identifier: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateUsageMetadata {
    pub app_name: String,
    pub node_name: String,
}

/// Body of a create-request call, used for both new requests and renewals
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateRequestPayload {
    #[serde(rename = "certificateSigningRequest", skip_serializing_if = "Option::is_none")]
    pub csr: Option<String>,
    pub application_id: String,
    #[serde(
        rename = "certificateIssuingTemplateId",
        skip_serializing_if = "Option::is_none"
    )]
    pub template_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing_certificate_id: Option<String>,
    #[serde(rename = "reuseCSR", skip_serializing_if = "Option::is_none")]
    pub reuse_csr: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_client_information: Option<ApiClientInformation>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub certificate_usage_metadata: Vec<CertificateUsageMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validity_period: Option<String>,
}

/// Certificate record with its "latest request" pointer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedCertificate {
    pub id: String,
    #[serde(default)]
    pub company_id: String,
    #[serde(default)]
    pub certificate_request_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationDetails {
    #[serde(rename = "id")]
    pub application_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "certificateIssuingTemplateAliasIdMap")]
    pub template_alias_map: HashMap<String, String>,
}

/// Issuing template behind a zone
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneTemplate {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub certificate_authority: String,
    #[serde(default, rename = "subjectCNRegexes")]
    pub subject_cn_regexes: Vec<String>,
    #[serde(default)]
    pub san_regexes: Vec<String>,
    #[serde(default)]
    pub key_reuse: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComparisonOperator {
    Match,
    Eq,
    Gte,
    Lte,
    Find,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogicalOperator {
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operand {
    pub field: String,
    pub operator: ComparisonOperator,
    pub value: serde_json::Value,
}

impl Operand {
    pub fn new(field: &str, operator: ComparisonOperator, value: impl Into<serde_json::Value>) -> Self {
        Self {
            field: field.to_string(),
            operator,
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<LogicalOperator>,
    pub operands: Vec<Operand>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paging {
    pub page_number: usize,
    pub page_size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub expression: Expression,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paging: Option<Paging>,
}

impl SearchRequest {
    /// Single-operand search on an exact fingerprint
    pub fn by_fingerprint(fingerprint: &str) -> Self {
        Self {
            expression: Expression {
                operator: None,
                operands: vec![Operand::new(
                    "fingerprint",
                    ComparisonOperator::Match,
                    fingerprint,
                )],
            },
            paging: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectAlternativeNames {
    #[serde(default, rename = "dNSName")]
    pub dns_names: Vec<String>,
    #[serde(default, rename = "iPAddress")]
    pub ip_addresses: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateSummary {
    pub id: String,
    #[serde(default)]
    pub certificate_request_id: String,
    #[serde(default, rename = "subjectCN")]
    pub subject_cn: Vec<String>,
    #[serde(default)]
    pub fingerprint: String,
    #[serde(default)]
    pub serial_number: String,
    #[serde(default)]
    pub validity_start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub validity_end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub subject_alternative_names_by_type: SubjectAlternativeNames,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CertificateSearchResponse {
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub certificates: Vec<CertificateSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportCertificateInfo {
    pub certificate: String,
    pub application_ids: Vec<String>,
    pub api_client_information: ApiClientInformation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportPayload {
    pub certificates: Vec<ImportCertificateInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    #[serde(default)]
    pub certificate_informations: Vec<serde_json::Value>,
}
