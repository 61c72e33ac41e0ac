//! Audit logging of emitted findings.

use chrono::Utc;
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use tracing::debug;

#[derive(Serialize)]
struct AuditRecord<'a, T> {
    recorded_at: String,
    payload: &'a T,
}

/// Append a JSON record to the audit file, one record per line.
///
/// # Arguments
/// * `path` - Path to the audit file; nothing is written when `None`
/// * `payload` - Serializable payload to write
pub fn write_audit_sample<P: AsRef<Path>, T: Serialize>(
    path: Option<P>,
    payload: &T,
) -> anyhow::Result<()> {
    if let Some(audit_path) = path {
        let record = AuditRecord {
            recorded_at: Utc::now().to_rfc3339(),
            payload,
        };
        let json = serde_json::to_string(&record)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&audit_path)?;
        writeln!(file, "{}", json)?;
        debug!("Wrote audit sample to {:?}", audit_path.as_ref());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Sample {
        alert_id: &'static str,
    }

    #[test]
    fn test_appends_json_lines() {
        let path = std::env::temp_dir().join(format!("swapscope-audit-{}.jsonl", std::process::id()));
        let _ = std::fs::remove_file(&path);

        write_audit_sample(Some(&path), &Sample { alert_id: "UNISWAPV3-1" }).unwrap();
        write_audit_sample(Some(&path), &Sample { alert_id: "UNISWAPV3-2" }).unwrap();
        write_audit_sample(None::<&Path>, &Sample { alert_id: "ignored" }).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<serde_json::Value> = contents
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1]["payload"]["alert_id"], "UNISWAPV3-2");
        std::fs::remove_file(&path).unwrap();
    }
}
