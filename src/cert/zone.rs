use crate::utils::errors::{CloudPkiError, Result};
use std::fmt;
use std::str::FromStr;

pub const ZONE_SEPARATOR: char = '\\';

/// Caller-facing target of a request: `<application>\<template alias>`.
/// An empty alias selects the application's default template.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Zone {
    application_name: String,
    template_alias: String,
}

impl Zone {
    pub fn new(application_name: &str, template_alias: &str) -> Self {
        Self {
            application_name: application_name.trim().to_string(),
            template_alias: template_alias.trim().to_string(),
        }
    }

    pub fn parse(zone: &str) -> Result<Self> {
        let zone = zone.trim();
        if zone.is_empty() {
            return Err(CloudPkiError::Validation("empty zone".to_string()));
        }

        let parsed = match zone.split_once(ZONE_SEPARATOR) {
            Some((application, alias)) => {
                if alias.contains(ZONE_SEPARATOR) {
                    return Err(CloudPkiError::Validation(format!(
                        "invalid zone '{zone}': expected <application>{ZONE_SEPARATOR}<template alias>"
                    )));
                }
                Self::new(application, alias)
            }
            None => Self::new(zone, ""),
        };

        if parsed.application_name.is_empty() {
            return Err(CloudPkiError::Validation(format!(
                "invalid zone '{zone}': application name is empty"
            )));
        }
        Ok(parsed)
    }

    pub fn application_name(&self) -> &str {
        &self.application_name
    }

    pub fn template_alias(&self) -> &str {
        &self.template_alias
    }

    pub fn is_empty(&self) -> bool {
        self.application_name.is_empty()
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.template_alias.is_empty() {
            write!(f, "{}", self.application_name)
        } else {
            write!(
                f,
                "{}{ZONE_SEPARATOR}{}",
                self.application_name, self.template_alias
            )
        }
    }
}

impl FromStr for Zone {
    type Err = CloudPkiError;
    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
