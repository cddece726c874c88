//! Get command - fetches an entity collection or a single object.

use anyhow::{Context as _, Result};
use clap::Args;

use super::Context;

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Entity type, e.g. `account` or `user`
    pub entity: String,

    /// Fetch a single object by id
    #[arg(long)]
    pub id: Option<String>,

    /// Extra query string, e.g. `limit=10&offset=20`
    #[arg(long)]
    pub query: Option<String>,
}

pub fn run(args: GetArgs, ctx: &Context) -> Result<()> {
    let mut client = ctx.connect()?;
    let gateway = client.gateway()?;

    let query = args.query.as_deref().unwrap_or_default();
    let body = match &args.id {
        Some(id) => gateway.get_object_with_query(&args.entity, id, query),
        None => gateway.get_objects_with_query(&args.entity, query),
    }
    .with_context(|| format!("GET {} failed", args.entity))?;

    println!("{}", render(&body, ctx.json_output));
    Ok(())
}

/// Pretty-print JSON bodies for humans; pass everything through in JSON mode.
fn render(body: &str, raw: bool) -> String {
    if raw {
        return body.to_string();
    }
    serde_json::from_str::<serde_json::Value>(body)
        .and_then(|value| serde_json::to_string_pretty(&value))
        .unwrap_or_else(|_| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render() {
        assert_eq!(render(r#"{"a":1}"#, true), r#"{"a":1}"#);
        assert_eq!(render(r#"{"a":1}"#, false), "{\n  \"a\": 1\n}");
        assert_eq!(render("not json", false), "not json");
    }
}
