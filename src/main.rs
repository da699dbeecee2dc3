//! lpac-provisioner - artifact provisioning for the desktop packaging pipeline.
//!
//! This binary resolves the target platform, provisions per-platform `lpac`
//! bundles from the latest upstream release, assembles the language resource
//! archive, and records build metadata for the packaging step.

use std::process;

use lpac_provisioner::cli;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Run CLI and get exit code
    let exit_code = match cli::run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    };

    process::exit(exit_code);
}
