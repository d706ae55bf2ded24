use super::{apply_fetched, Detector, FETCH_FAILED_WARNING};
use crate::fetcher::ContentFetcher;
use crate::language::content_kind_warning;
use crate::models::{CommandAnalysis, Language};
use crate::urls::first_command_url;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

pub const REMOTE_CODE_CAUTION: &str =
    "Command would download and execute remote code - exercise extreme caution!";
pub const AUTO_EXECUTE_WARNING: &str =
    "WARNING: The command will automatically execute the downloaded code!";

const WEB_REQUEST_CMDLETS: &[&str] = &["iwr", "Invoke-WebRequest", "irm", "Invoke-RestMethod"];

pub struct PowerShellDetector {
    fetcher: Arc<ContentFetcher>,
}

impl PowerShellDetector {
    pub fn new(fetcher: Arc<ContentFetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl Detector for PowerShellDetector {
    fn name(&self) -> &'static str {
        "powershell"
    }

    async fn try_match(&self, command: &str) -> Option<CommandAnalysis> {
        if !WEB_REQUEST_CMDLETS.iter().any(|c| command.contains(c)) {
            return None;
        }

        let mut analysis = CommandAnalysis::new(
            "PowerShell - Web Request",
            "PowerShell command to download web content",
        )
        .with_language(Language::PowerShell);

        match first_command_url(command) {
            Some(url) => match self.fetcher.fetch(url).await {
                Ok(fetched) => {
                    apply_fetched(&mut analysis, &fetched);
                    if analysis.binary_info.is_none() {
                        if let Some(warning) = content_kind_warning(&fetched.body) {
                            analysis.warn(warning);
                        }
                    }
                }
                Err(failure) => {
                    debug!("PowerShell download failed: {}", failure.summary());
                    analysis.extracted_code = Some(command.to_string());
                    analysis.code_language = Language::PowerShell;
                    analysis.warn(FETCH_FAILED_WARNING);
                    analysis.warn(REMOTE_CODE_CAUTION);
                }
            },
            None => analysis.extracted_code = Some(command.to_string()),
        }

        if command.contains("| iex") || command.contains("| Invoke-Expression") {
            analysis.warn(AUTO_EXECUTE_WARNING);
        }
        if command.contains("select -ExpandProperty Content") {
            analysis.set_param("expansion", "extracts only text content");
        }

        Some(analysis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::testing::ScriptedTransport;
    use crate::fetcher::{FetchSettings, OfflineTransport};

    const SCRIPT_URL: &str = "https://example.com/setup.ps1";

    fn ps_script() -> String {
        format!(
            "param($Force)\nfunction Install-Tool {{\n  Invoke-WebRequest https://downloads.example.com/tool.zip -OutFile $env:TEMP\\tool.zip\n}}\n{}",
            "# padding line for a realistic script body\n".repeat(3)
        )
    }

    fn detector_with(transport: ScriptedTransport) -> PowerShellDetector {
        PowerShellDetector::new(Arc::new(ContentFetcher::new(
            Arc::new(transport),
            FetchSettings::default(),
        )))
    }

    fn offline() -> PowerShellDetector {
        PowerShellDetector::new(Arc::new(ContentFetcher::new(
            Arc::new(OfflineTransport),
            FetchSettings::default(),
        )))
    }

    #[tokio::test]
    async fn test_fetched_script_replaces_command() {
        let transport = ScriptedTransport::new()
            .page(&format!("https://corsproxy.io/?{}", SCRIPT_URL), Ok(ps_script()));
        let analysis = detector_with(transport)
            .try_match(&format!("irm {} | iex", SCRIPT_URL))
            .await
            .unwrap();

        assert_eq!(analysis.kind, "PowerShell - Web Request");
        assert_eq!(analysis.extracted_code, Some(ps_script()));
        assert_eq!(analysis.code_language, Language::PowerShell);
        assert_eq!(
            analysis.urls.iter().collect::<Vec<_>>(),
            vec!["https://downloads.example.com/tool.zip"]
        );
        assert_eq!(
            analysis.warnings,
            vec!["Content contains PowerShell code", AUTO_EXECUTE_WARNING]
        );
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_command() {
        let command = format!("iwr -useb {} | iex", SCRIPT_URL);
        let analysis = offline().try_match(&command).await.unwrap();

        assert_eq!(analysis.extracted_code, Some(command));
        assert_eq!(analysis.code_language, Language::PowerShell);
        assert_eq!(
            analysis.warnings,
            vec![FETCH_FAILED_WARNING, REMOTE_CODE_CAUTION, AUTO_EXECUTE_WARNING]
        );
        assert!(analysis.urls.is_empty());
    }

    #[tokio::test]
    async fn test_expand_content_parameter() {
        let command = "(Invoke-WebRequest -Uri $u) | select -ExpandProperty Content";
        let analysis = offline().try_match(command).await.unwrap();

        assert_eq!(analysis.extracted_code.as_deref(), Some(command));
        assert_eq!(
            analysis.parameters.get("expansion"),
            Some(&serde_json::json!("extracts only text content"))
        );
        assert!(analysis.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_not_powershell() {
        assert!(offline().try_match("curl https://example.com").await.is_none());
    }
}
