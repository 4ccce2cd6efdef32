//! Reading the injected config and the pre-activation calls from disk.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use segment_client::InjectedConfig;
use segment_loader::QueuedCall;
use serde_json::Value;

/// Read a JSON object of options.
pub fn load_config(path: &Path) -> Result<InjectedConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    let value: Value = serde_json::from_str(&text)
        .with_context(|| format!("parsing config file {}", path.display()))?;
    if !value.is_object() {
        bail!("config file {} must contain a JSON object", path.display());
    }
    Ok(InjectedConfig::Json(value))
}

/// Read a JSON array of `{ "method": ..., "arguments": [...] }` records.
pub fn load_calls(path: &Path) -> Result<Vec<QueuedCall>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading calls file {}", path.display()))?;
    parse_calls(&text).with_context(|| format!("parsing calls file {}", path.display()))
}

fn parse_calls(text: &str) -> Result<Vec<QueuedCall>> {
    Ok(serde_json::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_calls() {
        let calls = parse_calls(
            r#"[
                { "method": "identify", "arguments": ["u1", { "plan": "pro" }] },
                { "method": "reset" }
            ]"#,
        )
        .unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].arguments, vec![json!("u1"), json!({ "plan": "pro" })]);
        assert!(calls[1].arguments.is_empty());
    }

    #[test]
    fn test_parse_calls_rejects_object() {
        assert!(parse_calls(r#"{ "method": "track" }"#).is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/segment.json")).unwrap_err();
        assert!(err.to_string().contains("reading config file"));
    }
}
