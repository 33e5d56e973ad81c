//! Metrics artifact parsing.

use std::fs;
use std::path::Path;

use si_types::{MetricValue, MetricsError, RawMetrics};

/// Parse a metrics artifact into a typed mapping.
///
/// The artifact is UTF-8 text with one `metric_name: value` per line. Lines
/// starting with `#` and lines without a colon are ignored. Values parse as
/// floats where possible; otherwise the trimmed raw string is kept so
/// non-numeric metadata survives.
///
/// Fails with [`MetricsError::ArtifactNotFound`] if the file is absent and
/// with [`MetricsError::ArtifactUnparseable`] if it exists but yields zero
/// key/value pairs — an artifact with no parseable content is never treated
/// as "zero metrics".
pub fn parse_artifact(path: &Path) -> Result<RawMetrics, MetricsError> {
    if !path.exists() {
        return Err(MetricsError::ArtifactNotFound {
            path: path.to_path_buf(),
        });
    }

    let contents = fs::read_to_string(path).map_err(|e| MetricsError::ReadFailed {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut metrics = RawMetrics::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();
        let parsed = match value.parse::<f64>() {
            Ok(number) => MetricValue::Number(number),
            Err(_) => MetricValue::Text(value.to_string()),
        };
        metrics.insert(key.to_string(), parsed);
    }

    if metrics.is_empty() {
        return Err(MetricsError::ArtifactUnparseable {
            path: path.to_path_buf(),
        });
    }

    tracing::debug!(
        path = %path.display(),
        count = metrics.len(),
        "parsed metrics artifact"
    );
    Ok(metrics)
}
