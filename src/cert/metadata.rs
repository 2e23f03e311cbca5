use crate::cloud::models::CertificateSummary;
use crate::utils::output::GetColumnValue;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Certificate as reported by a listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificateInfo {
    pub id: String,
    pub cn: String,
    pub sans: Vec<String>,
    pub serial: String,
    pub fingerprint: String,
    pub not_before: Option<DateTime<Utc>>,
    pub not_after: Option<DateTime<Utc>>,
}

impl From<CertificateSummary> for CertificateInfo {
    fn from(summary: CertificateSummary) -> Self {
        Self {
            id: summary.id,
            cn: summary.subject_cn.into_iter().next().unwrap_or_default(),
            sans: summary.subject_alternative_names_by_type.dns_names,
            serial: summary.serial_number,
            fingerprint: summary.fingerprint,
            not_before: summary.validity_start,
            not_after: summary.validity_end,
        }
    }
}

impl CertificateInfo {
    pub fn is_expired(&self) -> bool {
        self.not_after.is_some_and(|t| t < Utc::now())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CertificateColumn {
    Id,
    Cn,
    Serial,
    Fingerprint,
    NotBefore,
    NotAfter,
    Sans,
    Expired,
}

impl FromStr for CertificateColumn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "id" => Ok(Self::Id),
            "cn" => Ok(Self::Cn),
            "serial" => Ok(Self::Serial),
            "fingerprint" | "thumbprint" => Ok(Self::Fingerprint),
            "not_before" => Ok(Self::NotBefore),
            "not_after" => Ok(Self::NotAfter),
            "sans" => Ok(Self::Sans),
            "expired" | "e" => Ok(Self::Expired),
            _ => Err(format!("Invalid column: {s}")),
        }
    }
}

impl CertificateColumn {
    pub fn header(&self) -> &'static str {
        match self {
            Self::Id => "ID",
            Self::Cn => "CN",
            Self::Serial => "Serial",
            Self::Fingerprint => "Fingerprint",
            Self::NotBefore => "Not Before",
            Self::NotAfter => "Not After",
            Self::Sans => "SANs",
            Self::Expired => "E",
        }
    }

    pub fn defaults() -> Vec<Self> {
        vec![Self::Id, Self::Cn, Self::NotAfter, Self::Sans]
    }
}

fn format_time(time: &Option<DateTime<Utc>>) -> String {
    time.map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

impl GetColumnValue for CertificateInfo {
    fn get_column_value(&self, column: &CertificateColumn) -> String {
        match column {
            CertificateColumn::Id => self.id.clone(),
            CertificateColumn::Cn => self.cn.clone(),
            CertificateColumn::Serial => self.serial.clone(),
            CertificateColumn::Fingerprint => self.fingerprint.clone(),
            CertificateColumn::NotBefore => format_time(&self.not_before),
            CertificateColumn::NotAfter => format_time(&self.not_after),
            CertificateColumn::Sans => self.sans.join(","),
            CertificateColumn::Expired => {
                if self.is_expired() {
                    "E".to_string()
                } else {
                    String::new()
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_summary() {
        let summary: CertificateSummary = serde_json::from_value(json!({
            "id": "cert-1",
            "certificateRequestId": "req-1",
            "subjectCN": ["svc.example.com"],
            "fingerprint": "AABB",
            "serialNumber": "01",
            "validityEnd": "2001-01-01T00:00:00Z",
            "subjectAlternativeNamesByType": {"dNSName": ["svc.example.com", "alt.example.com"]}
        }))
        .unwrap();

        let info = CertificateInfo::from(summary);
        assert_eq!(info.cn, "svc.example.com");
        assert!(info.is_expired());
        assert_eq!(
            info.get_column_value(&CertificateColumn::Sans),
            "svc.example.com,alt.example.com"
        );
        assert_eq!(
            info.get_column_value(&CertificateColumn::NotAfter),
            "2001-01-01 00:00"
        );
        assert_eq!(info.get_column_value(&CertificateColumn::NotBefore), "-");
    }

    #[test]
    fn test_column_parsing() {
        assert_eq!(
            CertificateColumn::from_str("THUMBPRINT"),
            Ok(CertificateColumn::Fingerprint)
        );
        assert!(CertificateColumn::from_str("bogus").is_err());
    }
}
