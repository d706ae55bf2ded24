use super::{inline_code_argument, uses_network_library, Detector, NETWORK_LIBRARY_WARNING};
use crate::models::{CommandAnalysis, Language};
use crate::urls::extract_urls;
use async_trait::async_trait;

/// `python -c '...'` anywhere in the command, e.g. after `sudo` or `env`
pub struct PythonInlineDetector;

#[async_trait]
impl Detector for PythonInlineDetector {
    fn name(&self) -> &'static str {
        "python-inline"
    }

    async fn try_match(&self, command: &str) -> Option<CommandAnalysis> {
        if !command.contains("python") || !command.contains("-c") {
            return None;
        }

        let mut analysis =
            CommandAnalysis::new("Python - Inline Execution", "Inline Python code execution")
                .with_language(Language::Python);

        if let Some(code) = inline_code_argument(command) {
            analysis.urls = extract_urls(code);
            analysis.extracted_code = Some(code.to_string());
        }
        if uses_network_library(command) {
            analysis.warn(NETWORK_LIBRARY_WARNING);
        }

        Some(analysis)
    }
}
