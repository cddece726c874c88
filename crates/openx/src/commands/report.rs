//! Report command - posts a report request payload.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use clap::Args;

use super::Context;

/// Report endpoints live outside the `/ox/` API paths.
pub const DEFAULT_REPORT_PATH: &str = "/data/1.0/report/";

#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Endpoint path on the API domain
    #[arg(long, default_value = DEFAULT_REPORT_PATH)]
    pub path: String,

    /// File containing the JSON payload (`-` for stdin)
    #[arg(long)]
    pub payload: PathBuf,
}

pub fn run(args: ReportArgs, ctx: &Context) -> Result<()> {
    let payload = read_payload(&args.payload)?;
    serde_json::from_str::<serde_json::Value>(&payload)
        .with_context(|| format!("{} is not valid JSON", args.payload.display()))?;

    let mut client = ctx.connect()?;
    let body = client
        .gateway()?
        .post_payload(&args.path, &payload)
        .with_context(|| format!("report request to {} failed", args.path))?;

    println!("{}", body);
    Ok(())
}

fn read_payload(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut payload = String::new();
        std::io::Read::read_to_string(&mut std::io::stdin(), &mut payload)
            .context("failed to read payload from stdin")?;
        return Ok(payload);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}
