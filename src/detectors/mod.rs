//! Command family detectors.
//!
//! Each detector recognizes one family of commands with plain substring,
//! prefix or regex tests against the trimmed command, and either returns a
//! finished [`CommandAnalysis`] or `None`. Detectors that download remote
//! content hold a shared [`ContentFetcher`]; table-driven ones hold the shared
//! [`Registry`](crate::registry::Registry).

mod curl;
mod npm;
mod package_manager;
mod powershell;
mod programming_tool;
mod python_inline;
mod wget;

pub use curl::CurlDetector;
pub use npm::NpmDetector;
pub use package_manager::PackageManagerDetector;
pub use powershell::PowerShellDetector;
pub use programming_tool::ProgrammingToolDetector;
pub use python_inline::PythonInlineDetector;
pub use wget::WgetDetector;

use crate::binary::detect_binary;
use crate::fetcher::FetchedContent;
use crate::language::detect_language;
use crate::models::{CommandAnalysis, Language};
use crate::urls::extract_urls;
use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;

pub const FETCH_FAILED_WARNING: &str = "Unable to download content for preview";
pub const NETWORK_LIBRARY_WARNING: &str = "Python code makes network requests";

lazy_static! {
    static ref INLINE_CODE: Regex = Regex::new(r#"-c\s+["']([^"']+)["']"#).unwrap();
}

#[async_trait]
pub trait Detector: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &'static str;

    /// Classify the (already trimmed) command if it belongs to this family
    async fn try_match(&self, command: &str) -> Option<CommandAnalysis>;
}

/// Replace the command-derived fields with what was actually downloaded
pub(crate) fn apply_fetched(analysis: &mut CommandAnalysis, fetched: &FetchedContent) {
    let binary = detect_binary(&fetched.body, Some(&fetched.resolved_url));

    analysis.urls = extract_urls(&fetched.body);
    if binary.is_binary {
        analysis.code_language = Language::Text;
        if let Some(warning) = &binary.warning {
            analysis.warn(warning.clone());
        }
        analysis.binary_info = Some(binary);
    } else {
        analysis.code_language = detect_language(&fetched.body);
    }
    analysis.extracted_code = Some(fetched.body.clone());
}

/// Quoted argument following `-c`, e.g. `python -c 'print(1)'`
pub(crate) fn inline_code_argument(command: &str) -> Option<&str> {
    INLINE_CODE
        .captures(command)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

pub(crate) fn uses_network_library(command: &str) -> bool {
    command.contains("urllib") || command.contains("requests")
}

/// `-k`, clustered as in `-sk`, or the long form `--insecure`
pub(crate) fn has_flag(command: &str, short: char, long: &str) -> bool {
    command.split_whitespace().any(|token| {
        token == long
            || (token.starts_with('-') && !token.starts_with("--") && token[1..].contains(short))
    })
}

pub(crate) fn pipes_to_shell(command: &str) -> bool {
    command.contains("| bash") || command.contains("| sh")
}
