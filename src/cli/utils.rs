use serde_json::{json, Map, Value};
use crate::cli::OutputFormat;

/// Output a result in the appropriate format.
///
/// JSON output merges the fields of `data` into `{ "ok": true, "message": ... }`;
/// text output prints the message followed by one `key: value` line per field.
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    let fields = match data {
        Some(Value::Object(fields)) => fields,
        Some(other) => {
            let mut fields = Map::new();
            fields.insert("data".to_string(), other);
            fields
        }
        None => Map::new(),
    };

    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "ok": true,
                "message": message
            });

            if let Value::Object(envelope) = &mut response {
                envelope.extend(fields);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
            for (key, value) in fields {
                match value {
                    Value::String(s) => println!("  {}: {}", key, s),
                    other => println!("  {}: {}", key, other),
                }
            }
        }
    }
    Ok(())
}

/// Report a failed command and fail it.
///
/// JSON output prints the `{ "ok": false, ... }` envelope on stdout; in both
/// formats the returned error carries the message to stderr and a non-zero
/// exit status.
pub fn output_error(
    output_format: &OutputFormat,
    message: &str,
    error_code: Option<&str>,
) -> anyhow::Result<()> {
    if let OutputFormat::Json = output_format {
        let mut response = json!({
            "ok": false,
            "error": message
        });

        if let Some(code) = error_code {
            response["error_code"] = json!(code);
        }

        println!("{}", serde_json::to_string_pretty(&response)?);
    }

    anyhow::bail!("{}", message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_fail_the_command_in_both_formats() {
        for format in [OutputFormat::Text, OutputFormat::Json] {
            let err = output_error(&format, "oracle unreachable", Some("UNREACHABLE")).unwrap_err();
            assert_eq!(err.to_string(), "oracle unreachable");
        }
    }

    #[test]
    fn success_does_not_fail() {
        assert!(output_success(&OutputFormat::Text, "done", Some(json!({ "a": 1 }))).is_ok());
    }
}
