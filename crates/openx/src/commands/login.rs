//! Login command - runs the SSO handshake and reports the session.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use super::Context;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Print the access token value (it grants API access; handle with care)
    #[arg(long)]
    pub show_token: bool,
}

#[derive(Debug, Serialize)]
struct LoginOutput {
    authenticated: bool,
    domain: String,
    path: String,
    cookie: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
}

pub fn run(args: LoginArgs, ctx: &Context) -> Result<()> {
    let mut client = ctx.connect()?;

    let domain = client.bridge().domain().to_string();
    let path = client.bridge().path().to_string();
    let authenticated = client.is_authenticated();
    let access_token = args
        .show_token
        .then(|| client.access_token().map(|t| t.value().to_string()))
        .flatten();
    let cookie = client.session_cookie()?.name().to_string();

    if ctx.json_output {
        let output = LoginOutput {
            authenticated,
            domain,
            path,
            cookie,
            access_token,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("Logged in to {}{}", domain, path);
        println!("Session cookie: {}", cookie);
        if let Some(token) = access_token {
            println!("Access token: {}", token);
        }
    }
    Ok(())
}
