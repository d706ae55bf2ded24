// Placeholder documents shown in place of content that could not be fetched
use crate::fetcher::{FetchFailure, FetchSettings};

/// Commented pseudo-script describing a failed fetch and what the command
/// would have done with the content
pub fn render_failure(failure: &FetchFailure, settings: &FetchSettings) -> String {
    match settings.shortcut_for(&failure.requested_url) {
        Some(shortcut) => {
            let mut doc = vec![
                format!("# {}", shortcut.title),
                String::new(),
                format!("# Original URL: {}", failure.requested_url),
                format!("# Expected to redirect to: {}", shortcut.final_url),
                String::new(),
                "# WARNING: Unable to download the actual script content".to_string(),
            ];
            if !shortcut.notes.is_empty() {
                doc.push(String::new());
                doc.push("# Known details about this script:".to_string());
                doc.extend(shortcut.notes.iter().map(|note| format!("# - {}", note)));
            }
            doc.extend([
                String::new(),
                "# SECURITY NOTICE:".to_string(),
                "# This script makes significant system changes".to_string(),
                "# Always review scripts before running with 'iex' (Invoke-Expression)".to_string(),
                String::new(),
                format!(
                    "Write-Host \"{} - Content not available for preview\"",
                    shortcut.title
                ),
            ]);
            doc.join("\n")
        }
        None => {
            let mut doc = vec![
                "# Script Download Failed".to_string(),
                format!("# Original URL: {}", failure.requested_url),
            ];
            if failure.resolved_url != failure.requested_url {
                doc.push(format!("# Resolved URL: {}", failure.resolved_url));
            }
            doc.extend([
                String::new(),
                "# Unable to download script content for preview".to_string(),
                "# This command would download and execute code from the internet".to_string(),
            ]);
            if !failure.attempts.is_empty() {
                doc.push(String::new());
                doc.push("# Attempts:".to_string());
                doc.extend(
                    failure
                        .attempts
                        .iter()
                        .map(|a| format!("# - {}: {}", a.route, a.error)),
                );
            }
            doc.extend([
                String::new(),
                "# The command structure:".to_string(),
                format!("# irm \"{}\" | iex", failure.requested_url),
                "#".to_string(),
                "# - irm (Invoke-RestMethod) downloads the content".to_string(),
                "# - | (pipe) passes it to the next command".to_string(),
                "# - iex (Invoke-Expression) executes the downloaded code".to_string(),
                String::new(),
                "# SECURITY WARNING:".to_string(),
                "# Only run this command if you completely trust the source".to_string(),
                "# Consider downloading and reviewing the script manually first".to_string(),
                String::new(),
                "Write-Host \"Script content not available for preview - download failed\""
                    .to_string(),
            ]);
            doc.join("\n")
        }
    }
}
