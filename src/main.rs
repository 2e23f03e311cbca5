use cloud_pki_rs::cli::{handle_command, Cli};
use cloud_pki_rs::utils::errors::Result;

#[tokio::main]
async fn main() -> Result<()> {
    use clap::Parser;
    let cli = Cli::parse();

    if let Err(e) = handle_command(cli).await {
        eprintln!("Error: {e}");
        // 2: not issued yet, retry later
        std::process::exit(if e.is_pending() { 2 } else { 1 });
    }

    Ok(())
}
