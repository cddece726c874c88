//! Accounts command - lists the accounts visible to the user.

use anyhow::{Context as _, Result};
use clap::Args;

use super::Context;
use crate::types::{Account, AccountList};

#[derive(Args, Debug)]
pub struct AccountsArgs {
    /// Maximum number of accounts to request
    #[arg(long)]
    pub limit: Option<u32>,
}

pub fn run(args: AccountsArgs, ctx: &Context) -> Result<()> {
    let mut client = ctx.connect()?;
    let gateway = client.gateway()?;

    let relative = match args.limit {
        Some(limit) => format!("account?limit={}", limit),
        None => "account".to_string(),
    };
    let accounts = gateway
        .get_json::<AccountList>(&relative)
        .context("failed to list accounts")?
        .into_accounts();
    tracing::info!(count = accounts.len(), "fetched accounts");

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&accounts)?);
    } else {
        for account in &accounts {
            println!("{}", summary_line(account));
        }
    }
    Ok(())
}

fn summary_line(account: &Account) -> String {
    format!(
        "{}\t{}\t{}",
        account.id,
        account.name,
        account.status.as_deref().unwrap_or("-")
    )
}
