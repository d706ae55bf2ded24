// Classifier - ordered first-match dispatch over the command detectors
use crate::detectors::{
    CurlDetector, Detector, NpmDetector, PackageManagerDetector, PowerShellDetector,
    ProgrammingToolDetector, PythonInlineDetector, WgetDetector,
};
use crate::fetcher::ContentFetcher;
use crate::models::CommandAnalysis;
use crate::registry::Registry;
use crate::safety::apply_generic_checks;
use std::sync::Arc;
use tracing::debug;

pub struct Classifier {
    detectors: Vec<Box<dyn Detector>>,
}

impl Classifier {
    /// Standard detector order: table-driven families first, then the
    /// download idioms, then the interpreter/npm fallbacks
    pub fn new(registry: Arc<Registry>, fetcher: Arc<ContentFetcher>) -> Self {
        Self::with_detectors(vec![
            Box::new(PackageManagerDetector::new(registry.clone())),
            Box::new(ProgrammingToolDetector::new(registry)),
            Box::new(PowerShellDetector::new(fetcher.clone())),
            Box::new(CurlDetector::new(fetcher.clone())),
            Box::new(WgetDetector::new(fetcher)),
            Box::new(PythonInlineDetector),
            Box::new(NpmDetector),
        ])
    }

    pub fn with_detectors(detectors: Vec<Box<dyn Detector>>) -> Self {
        Self { detectors }
    }

    pub fn detector_names(&self) -> Vec<&'static str> {
        self.detectors.iter().map(|d| d.name()).collect()
    }

    /// Classify a command. Always produces a result; the generic safety
    /// checks run after whichever detector matched, or after `Unknown`.
    pub async fn classify(&self, command: &str) -> CommandAnalysis {
        let command = command.trim();
        let mut analysis = None;

        for detector in &self.detectors {
            if let Some(found) = detector.try_match(command).await {
                debug!("Matched detector {}: {}", detector.name(), found.kind);
                analysis = Some(found);
                break;
            }
        }

        let mut analysis = analysis.unwrap_or_else(|| {
            debug!("No detector matched, falling back to Unknown");
            CommandAnalysis::unknown()
        });
        apply_generic_checks(&mut analysis, command);
        analysis
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detectors::FETCH_FAILED_WARNING;
    use crate::fetcher::testing::{script_body, ScriptedTransport};
    use crate::fetcher::{FetchSettings, OfflineTransport, Transport};
    use crate::models::Language;
    use crate::safety::{DESTRUCTIVE_WARNING, PRIVILEGE_WARNING};
    use async_trait::async_trait;

    fn classifier_with(transport: Arc<dyn Transport>) -> Classifier {
        Classifier::new(
            Arc::new(Registry::builtin()),
            Arc::new(ContentFetcher::new(transport, FetchSettings::default())),
        )
    }

    fn offline() -> Classifier {
        classifier_with(Arc::new(OfflineTransport))
    }

    #[test]
    fn test_detector_order() {
        assert_eq!(
            offline().detector_names(),
            vec![
                "package-manager",
                "programming-tool",
                "powershell",
                "curl",
                "wget",
                "python-inline",
                "npm"
            ]
        );
    }

    #[tokio::test]
    async fn test_pip_install() {
        let analysis = offline().classify("pip install requests").await;
        let info = analysis.package_info.as_ref().unwrap();
        assert_eq!(info.package_name, "requests");
        assert_eq!(info.package_manager, "pip");
        assert!(analysis
            .warnings
            .iter()
            .any(|w| w.contains("install software")));
    }

    #[tokio::test]
    async fn test_curl_insecure_silent() {
        let analysis = offline().classify("curl -sk https://example.com/x.sh").await;
        assert_eq!(analysis.kind, "cURL - HTTP Download");
        assert_eq!(analysis.parameters["mode"], "silent");
        assert_eq!(analysis.parameters["SSL"], "ignore certificates");
        assert!(analysis
            .warnings
            .iter()
            .any(|w| w.contains("SSL certificate verification")));
    }

    #[tokio::test]
    async fn test_npm_global_install() {
        let analysis = offline().classify("npm install -g foo").await;
        assert!(analysis.kind.starts_with("npm"));
        assert!(analysis
            .warnings
            .iter()
            .any(|w| w == "Global package installation"));
    }

    #[tokio::test]
    async fn test_python_inline() {
        let analysis = offline()
            .classify("python -c 'import requests; print(1)'")
            .await;
        assert_eq!(
            analysis.extracted_code.as_deref(),
            Some("import requests; print(1)")
        );
        assert!(analysis
            .warnings
            .iter()
            .any(|w| w.contains("network requests")));
    }

    #[tokio::test]
    async fn test_inline_python_detector_reached_via_wrapper() {
        let analysis = offline()
            .classify("env python3 -c 'import urllib'")
            .await;
        assert_eq!(analysis.kind, "Python - Inline Execution");
        assert_eq!(analysis.extracted_code.as_deref(), Some("import urllib"));
    }

    #[tokio::test]
    async fn test_npx_reaches_npm_detector() {
        let analysis = offline().classify("npx cowsay hi").await;
        assert_eq!(analysis.kind, "npx - Node Package Execute");
    }

    #[tokio::test]
    async fn test_unknown_with_generic_checks() {
        let analysis = offline().classify("  sudo rm -rf /var/cache  ").await;
        assert_eq!(analysis.kind, "Unknown");
        assert_eq!(analysis.description, "Unrecognized command");
        assert_eq!(analysis.code_language, Language::Text);
        assert_eq!(analysis.warnings, vec![DESTRUCTIVE_WARNING, PRIVILEGE_WARNING]);
    }

    #[tokio::test]
    async fn test_generic_checks_follow_family_warnings() {
        let analysis = offline()
            .classify("curl -fsSL https://example.com/x.sh | sudo bash")
            .await;
        assert_eq!(
            analysis.warnings,
            vec![FETCH_FAILED_WARNING, PRIVILEGE_WARNING]
        );
    }

    #[tokio::test]
    async fn test_never_empty_type_or_description() {
        let inputs = [
            "",
            "   ",
            "iwr",
            "curl",
            "wget",
            "python",
            "npm ",
            "choco install git -y",
            "echo hello | tee out.txt",
            "format",
        ];
        let classifier = offline();
        for input in inputs {
            let analysis = classifier.classify(input).await;
            assert!(!analysis.kind.is_empty(), "{:?}", input);
            assert!(!analysis.description.is_empty(), "{:?}", input);
        }
    }

    #[tokio::test]
    async fn test_idempotent_for_local_commands() {
        let classifier = offline();
        for input in ["pip install requests", "npx serve", "sudo chmod +x run.sh"] {
            let first = classifier.classify(input).await;
            let second = classifier.classify(input).await;
            assert_eq!(first, second);
        }
    }

    #[tokio::test]
    async fn test_fetched_urls_are_unique() {
        let transport = ScriptedTransport::new().page(
            "https://corsproxy.io/?https://example.com/install.sh",
            Ok(script_body()),
        );
        let analysis = classifier_with(Arc::new(transport))
            .classify("curl -fsSL https://example.com/install.sh | bash")
            .await;

        // The fixture mentions the same tarball three times
        assert_eq!(analysis.urls.len(), 1);
        assert_eq!(analysis.code_language, Language::Bash);
    }

    struct Always(&'static str);

    #[async_trait]
    impl Detector for Always {
        fn name(&self) -> &'static str {
            self.0
        }

        async fn try_match(&self, _command: &str) -> Option<CommandAnalysis> {
            Some(CommandAnalysis::new(self.0, "always matches"))
        }
    }

    #[tokio::test]
    async fn test_first_match_wins() {
        let classifier = Classifier::with_detectors(vec![
            Box::new(NpmDetector),
            Box::new(Always("first")),
            Box::new(Always("second")),
        ]);
        assert_eq!(classifier.classify("ls").await.kind, "first");
        assert_eq!(
            classifier.classify("npm test").await.kind,
            "npm - Node Package Manager"
        );
    }
}
