use anyhow::{Context, Result};
use harlens_core::ReportConfig;
use harlens_report::Interceptor;
use serde_json::Value;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

/// Read a chat request body from a file, or stdin when no file is given
pub fn read_body(file: Option<&Path>) -> Result<Value> {
    let text = match file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read message body {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read message body from stdin")?;
            buffer
        }
    };
    serde_json::from_str(&text).context("Message body is not valid JSON")
}

pub async fn execute(file: Option<&Path>, config: ReportConfig, user: Option<String>) -> Result<()> {
    let body = read_body(file)?;
    let user = user.map(|id| serde_json::json!({ "id": id }));

    let rewritten = Interceptor::new(config).inlet(body, user.as_ref()).await;
    println!("{}", serde_json::to_string_pretty(&rewritten)?);
    Ok(())
}
