use anyhow::Context;
use std::path::Path;

use astrologer_core::ChartRequest;

/// Read a chart request. `.toml` files are parsed as TOML, anything else as JSON.
pub fn load_request(path: &Path) -> anyhow::Result<ChartRequest> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read request {}", path.display()))?;

    let is_toml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("toml"));

    let request: ChartRequest = if is_toml {
        toml::from_str(&text).with_context(|| format!("Invalid TOML request {}", path.display()))?
    } else {
        serde_json::from_str(&text).with_context(|| format!("Invalid JSON request {}", path.display()))?
    };

    log::debug!(
        "Loaded {} request with {} subject(s) from {}",
        request.chart_type,
        request.subjects.len(),
        path.display()
    );
    Ok(request)
}
