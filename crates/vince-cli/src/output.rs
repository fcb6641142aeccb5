use std::fmt::Write;

use serde_json::Value;
use vince_client::ValidationResult;

pub const BANNER: &str = "Vince API Key Validation Client";

const UNKNOWN: &str = "(unknown)";

pub const USAGE: &str = "\nUsage: vince-cli <api_key_to_validate>\n\
Or depend on the vince-client crate and call validate_key()\n";

/// Keys are secrets: show a short prefix only.
pub fn mask_key(key: &str) -> String {
    if key.chars().count() > 12 {
        let prefix: String = key.chars().take(8).collect();
        format!("{prefix}...")
    } else {
        "****".to_string()
    }
}

/// Human-readable report of a validation result.
pub fn summary(result: &ValidationResult) -> String {
    let mut out = String::new();
    match result {
        ValidationResult::Valid(key) => {
            let data = key.data.as_ref();
            let application = data.and_then(|d| d.application_name.as_deref());
            let key_id = data.and_then(|d| d.key_id.as_deref());
            let metadata = data.and_then(|d| d.metadata.as_ref());
            let _ = writeln!(out, "✓ Key is valid");
            let _ = writeln!(out, "  Application: {}", application.unwrap_or(UNKNOWN));
            let _ = writeln!(out, "  Key ID: {}", key_id.unwrap_or(UNKNOWN));
            let _ = writeln!(out, "  Metadata: {}", display_metadata(metadata));
        }
        ValidationResult::Invalid(failure) => {
            let _ = writeln!(out, "✗ Key is invalid");
            let _ = writeln!(out, "  Error: {}", failure.error);
            let _ = writeln!(out, "  Code: {}", failure.code);
        }
    }
    out
}

fn display_metadata(metadata: Option<&Value>) -> String {
    match metadata {
        None | Some(Value::Null) => "(none)".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
