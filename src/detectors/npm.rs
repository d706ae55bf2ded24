use super::package_manager::GLOBAL_INSTALL_WARNING;
use super::Detector;
use crate::models::{CommandAnalysis, Language};
use async_trait::async_trait;

/// Catches npm/npx when the package manager table doesn't cover them
pub struct NpmDetector;

#[async_trait]
impl Detector for NpmDetector {
    fn name(&self) -> &'static str {
        "npm"
    }

    async fn try_match(&self, command: &str) -> Option<CommandAnalysis> {
        let kind = if command.starts_with("npm ") {
            "npm - Node Package Manager"
        } else if command.starts_with("npx ") {
            "npx - Node Package Execute"
        } else {
            return None;
        };

        let mut analysis =
            CommandAnalysis::new(kind, "Command to manage or execute Node.js packages")
                .with_language(Language::Bash);

        if command.contains("install") && command.contains("-g") {
            analysis.warn(GLOBAL_INSTALL_WARNING);
        }

        Some(analysis)
    }
}
