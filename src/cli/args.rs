use crate::cert::{ChainOption, Fingerprint};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cloud-pki-rs")]
#[command(version = "1.0.0")]
#[command(about = "Request, renew, import and list certificates issued by the cloud CA service")]
#[command(long_about = None)]
pub struct Cli {
    /// Service URL (defaults to the public service)
    #[arg(long, env = "CLOUD_PKI_URL")]
    pub url: Option<String>,

    /// API key; prompted for when not set
    #[arg(long, env = "CLOUD_PKI_APIKEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Zone as <application>\<template alias>
    #[arg(long, short = 'z', env = "CLOUD_PKI_ZONE")]
    pub zone: Option<String>,

    /// Config file path (default: ~/.config/cloud-pki-rs/config.yaml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (repeat for more verbosity: -v INFO, -vv DEBUG, -vvv TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Output raw tab-separated values (no formatting)
    #[arg(short, long)]
    pub raw: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Submit a CSR to the zone
    Request {
        /// PEM encoded CSR file
        #[arg(long)]
        csr: PathBuf,
        /// Requested validity in hours
        #[arg(long)]
        validity_hours: Option<u32>,
        #[command(flatten)]
        location: LocationArgs,
        /// Client type reported to the service
        #[arg(long)]
        origin: Option<String>,
        /// Seconds to wait for issuance and retrieve the chain (0: submit only)
        #[arg(long, default_value_t = 0)]
        wait: u64,
        #[arg(long, value_enum, default_value_t = ChainOrder::RootLast)]
        chain: ChainOrder,
        /// Write the retrieved chain here instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
    /// Retrieve an issued certificate and its chain
    Retrieve {
        /// Certificate request id returned by `request`
        #[arg(long, conflicts_with = "cert_id")]
        pickup_id: Option<String>,
        /// Certificate id; chain ordering does not apply
        #[arg(long)]
        cert_id: Option<String>,
        /// SHA-1 thumbprint of a certificate
        #[arg(long)]
        thumbprint: Option<Fingerprint>,
        /// CSR the certificate must match
        #[arg(long)]
        csr: Option<PathBuf>,
        /// Seconds to wait for a pending request (0: fail if not issued)
        #[arg(long, default_value_t = 0)]
        wait: u64,
        #[arg(long, value_enum, default_value_t = ChainOrder::RootLast)]
        chain: ChainOrder,
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
    /// Renew a certificate with a new CSR
    Renew {
        /// Thumbprint of the certificate to renew
        #[arg(long, required_unless_present = "request_id", conflicts_with = "request_id")]
        thumbprint: Option<Fingerprint>,
        /// Id of the certificate request that produced the certificate
        #[arg(long)]
        request_id: Option<String>,
        /// New PEM encoded CSR file
        #[arg(long)]
        csr: PathBuf,
        #[command(flatten)]
        location: LocationArgs,
    },
    /// Import a certificate issued elsewhere
    Import {
        /// PEM encoded certificate file
        file: PathBuf,
        /// Destination application id (defaults to the zone's application)
        #[arg(long)]
        application_id: Option<String>,
        #[arg(long)]
        origin: Option<String>,
    },
    /// List certificates of the zone's application
    List {
        /// Maximum number of certificates
        #[arg(long)]
        limit: Option<usize>,
        /// Include expired certificates
        #[arg(long)]
        with_expired: bool,
        /// Columns to display (comma-separated): id,cn,serial,fingerprint,not_before,not_after,sans,expired. Use +column to append to defaults.
        #[arg(long)]
        columns: Option<String>,
    },
    /// Show the issuing template behind the zone
    Zone,
}

#[derive(clap::Args, Clone, Default)]
pub struct LocationArgs {
    /// Instance name reported as usage metadata
    #[arg(long)]
    pub instance: Option<String>,
    /// Workload name reported as usage metadata
    #[arg(long, requires = "instance")]
    pub workload: Option<String>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ChainOrder {
    RootFirst,
    RootLast,
    Ignore,
}

impl From<ChainOrder> for ChainOption {
    fn from(order: ChainOrder) -> Self {
        match order {
            ChainOrder::RootFirst => Self::RootFirst,
            ChainOrder::RootLast => Self::RootLast,
            ChainOrder::Ignore => Self::Ignore,
        }
    }
}
