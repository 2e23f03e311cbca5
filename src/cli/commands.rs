use crate::cert::{
    CertificateRequest, CustomField, CustomFieldType, ImportRequest, Location, PemCollection,
    RenewalRequest,
};
use crate::cli::args::*;
use crate::cloud::auth::Session;
use crate::cloud::client::CloudClient;
use crate::lifecycle::{CertificateLifecycle, ListFilter};
use crate::utils::config::ConnectorConfig;
use crate::utils::errors::{CloudPkiError, Result};
use crate::utils::output::{parse_columns, OutputFormat};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub async fn handle_command(cli: Cli) -> Result<()> {
    // Initialize logging - always to stderr
    if !cli.quiet {
        let log_level = match cli.verbose {
            0 => "cloud_pki_rs=warn",
            1 => "cloud_pki_rs=info",
            2 => "cloud_pki_rs=debug",
            _ => "cloud_pki_rs=trace",
        };

        tracing_subscriber::fmt()
            .with_writer(io::stderr)
            .with_env_filter(log_level)
            .init();
    }

    let output = OutputFormat::new(cli.raw);

    let config = match &cli.config {
        Some(path) => ConnectorConfig::from_file(path)?,
        None => ConnectorConfig::load()?,
    }
    .with_overrides(cli.url.clone(), cli.api_key.clone(), cli.zone.clone());

    let lifecycle = CertificateLifecycle::new(CloudClient::from_config(&config)?);
    tracing::debug!("Using service at {}", lifecycle.client().base_url());

    let api_key = match config.api_key.clone() {
        Some(key) => key,
        None => rpassword::prompt_password("API key: ")
            .map_err(|e| CloudPkiError::Auth(format!("Failed to read API key: {e}")))?,
    };
    let session = lifecycle.authenticate(&api_key).await?;

    let ctx = Context {
        lifecycle,
        session,
        config,
        output,
    };
    match cli.command {
        Commands::Request {
            csr,
            validity_hours,
            location,
            origin,
            wait,
            chain,
            output,
        } => {
            let mut request =
                CertificateRequest::new(ctx.config.resolve_zone(None)?, read_file(&csr)?);
            request.validity_hours = validity_hours;
            request.location = location.into_location();
            request.custom_fields = origin_fields(origin);
            request.chain_option = chain.into();
            request.timeout = Duration::from_secs(wait);
            ctx.request(request, output).await
        }
        Commands::Retrieve {
            pickup_id,
            cert_id,
            thumbprint,
            csr,
            wait,
            chain,
            output,
        } => {
            let request = CertificateRequest {
                csr: csr.as_deref().map(read_file).transpose()?,
                pickup_id,
                cert_id,
                thumbprint: thumbprint.map(|t| t.to_string()),
                chain_option: chain.into(),
                timeout: Duration::from_secs(wait),
                ..Default::default()
            };
            let collection = ctx
                .lifecycle
                .retrieve_certificate(&ctx.session, &request)
                .await?;
            write_chain(&collection, output.as_deref())
        }
        Commands::Renew {
            thumbprint,
            request_id,
            csr,
            location,
        } => {
            let renewal = RenewalRequest {
                thumbprint: thumbprint.map(|t| t.to_string()),
                certificate_dn: request_id,
                certificate_request: Some(CertificateRequest {
                    csr: Some(read_file(&csr)?),
                    location: location.into_location(),
                    ..Default::default()
                }),
            };
            let new_request_id = ctx
                .lifecycle
                .renew_certificate(&ctx.session, &renewal)
                .await?;
            ctx.output.print_key_value(&[("Pickup ID", new_request_id)]);
            Ok(())
        }
        Commands::Import {
            file,
            application_id,
            origin,
        } => {
            let zone = match application_id {
                Some(_) => None,
                None => Some(ctx.config.resolve_zone(None)?),
            };
            let request = ImportRequest {
                certificate_data: read_file(&file)?,
                application_id,
                zone,
                custom_fields: origin_fields(origin),
            };
            let imported = ctx
                .lifecycle
                .import_certificate(&ctx.session, &request)
                .await?;
            ctx.output.print_key_value(&[
                ("Certificate ID", imported.cert_id),
                ("Common Name", imported.certificate_dn),
            ]);
            Ok(())
        }
        Commands::List {
            limit,
            with_expired,
            columns,
        } => {
            let columns = parse_columns(columns.as_deref()).map_err(CloudPkiError::Validation)?;
            let filter = ListFilter {
                zone: ctx.config.resolve_zone(None)?,
                limit,
                with_expired,
            };
            let certificates = ctx
                .lifecycle
                .list_certificates(&ctx.session, &filter)
                .await?;
            ctx.output.print_certificates(&certificates, &columns);
            Ok(())
        }
        Commands::Zone => {
            let zone = ctx.config.resolve_zone(None)?;
            let template = ctx
                .lifecycle
                .read_zone_template(&ctx.session, &zone)
                .await?;
            ctx.output.print_key_value(&[
                ("Template ID", template.id),
                ("Name", template.name),
                ("Certificate Authority", template.certificate_authority),
                ("Subject CN Regexes", template.subject_cn_regexes.join(",")),
                ("SAN Regexes", template.san_regexes.join(",")),
                ("Key Reuse", template.key_reuse.to_string()),
            ]);
            Ok(())
        }
    }
}

struct Context {
    lifecycle: CertificateLifecycle,
    session: Session,
    config: ConnectorConfig,
    output: OutputFormat,
}

impl Context {
    /// Submit, then optionally wait for issuance and fetch the chain
    async fn request(&self, mut request: CertificateRequest, output: Option<PathBuf>) -> Result<()> {
        let pickup_id = self
            .lifecycle
            .request_certificate(&self.session, &mut request)
            .await?;

        if request.timeout.is_zero() {
            self.output.print_key_value(&[("Pickup ID", pickup_id)]);
            return Ok(());
        }

        tracing::info!(
            "Waiting up to {:?} for request {} to be issued",
            request.timeout,
            pickup_id
        );
        let collection = self
            .lifecycle
            .retrieve_certificate(&self.session, &request)
            .await?;
        write_chain(&collection, output.as_deref())
    }
}

impl LocationArgs {
    fn into_location(self) -> Option<Location> {
        self.instance.map(|instance| Location {
            instance,
            workload: self.workload.unwrap_or_default(),
        })
    }
}

fn origin_fields(origin: Option<String>) -> Vec<CustomField> {
    origin
        .map(|value| {
            vec![CustomField {
                field_type: CustomFieldType::Origin,
                name: "origin".to_string(),
                value,
            }]
        })
        .unwrap_or_default()
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        CloudPkiError::Validation(format!("Failed to read {}: {e}", path.display()))
    })
}

fn write_chain(collection: &PemCollection, output: Option<&Path>) -> Result<()> {
    tracing::info!(
        "Leaf certificate thumbprint {}",
        collection.end_entity().fingerprint().as_colon_hex()
    );
    let pem = collection.pem_data();
    match output {
        Some(path) => {
            fs::write(path, pem)?;
            tracing::info!(
                "Wrote {} certificate(s) to {}",
                collection.len(),
                path.display()
            );
        }
        None => print!("{pem}"),
    }
    Ok(())
}
