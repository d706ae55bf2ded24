use super::{inline_code_argument, uses_network_library, Detector, NETWORK_LIBRARY_WARNING};
use crate::models::{CommandAnalysis, Language};
use crate::registry::Registry;
use crate::urls::extract_urls;
use async_trait::async_trait;
use std::sync::Arc;

pub const INLINE_EXECUTION_WARNING: &str = "This command executes inline code";

pub struct ProgrammingToolDetector {
    registry: Arc<Registry>,
}

impl ProgrammingToolDetector {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl Detector for ProgrammingToolDetector {
    fn name(&self) -> &'static str {
        "programming-tool"
    }

    async fn try_match(&self, command: &str) -> Option<CommandAnalysis> {
        let tool = self
            .registry
            .programming_tools()
            .iter()
            .find(|t| t.matches(command))?;

        let language = if tool.is_python() {
            Language::Python
        } else {
            Language::Bash
        };
        let mut analysis = CommandAnalysis::new(
            format!("{} - Programming Tool", tool.name),
            tool.description.clone(),
        )
        .with_language(language);
        analysis.extracted_code = Some(command.to_string());

        if command.contains("-c") {
            analysis.warn(INLINE_EXECUTION_WARNING);

            // Show the inline program itself rather than the wrapper command
            if let Some(code) = inline_code_argument(command) {
                analysis.urls = extract_urls(code);
                analysis.extracted_code = Some(code.to_string());
            }
            if tool.is_python() && uses_network_library(command) {
                analysis.warn(NETWORK_LIBRARY_WARNING);
            }
        }

        Some(analysis)
    }
}
