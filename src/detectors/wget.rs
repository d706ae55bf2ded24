use super::{apply_fetched, pipes_to_shell, Detector, FETCH_FAILED_WARNING};
use crate::fetcher::ContentFetcher;
use crate::models::{CommandAnalysis, Language};
use crate::urls::first_command_url;
use async_trait::async_trait;
use std::sync::Arc;

pub const PIPE_TO_SHELL_WARNING: &str =
    "DANGER: Command will automatically execute the downloaded file!";

pub struct WgetDetector {
    fetcher: Arc<ContentFetcher>,
}

impl WgetDetector {
    pub fn new(fetcher: Arc<ContentFetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl Detector for WgetDetector {
    fn name(&self) -> &'static str {
        "wget"
    }

    async fn try_match(&self, command: &str) -> Option<CommandAnalysis> {
        if !command.starts_with("wget") {
            return None;
        }

        let mut analysis = CommandAnalysis::new(
            "wget - File Download",
            "Command to download files from internet",
        )
        .with_language(Language::Bash);

        if writes_to_stdout(command) {
            analysis.set_param("output", "stdout (direct output)");
        }

        if let Some(url) = first_command_url(command) {
            match self.fetcher.fetch(url).await {
                Ok(fetched) => {
                    apply_fetched(&mut analysis, &fetched);
                    if pipes_to_shell(command) {
                        analysis.warn(PIPE_TO_SHELL_WARNING);
                    }
                }
                Err(failure) => {
                    analysis.extracted_code = Some(format!("Download error: {}", failure.summary()));
                    analysis.warn(FETCH_FAILED_WARNING);
                }
            }
        }

        Some(analysis)
    }
}

/// `-O-`, `-qO-`, `-O -` or `--output-document=-`
fn writes_to_stdout(command: &str) -> bool {
    let tokens: Vec<&str> = command.split_whitespace().collect();
    tokens.iter().enumerate().any(|(i, token)| {
        if *token == "--output-document=-" {
            return true;
        }
        if *token == "--output-document" {
            return tokens.get(i + 1) == Some(&"-");
        }
        if !token.starts_with('-') || token.starts_with("--") {
            return false;
        }
        token.ends_with("O-") || (token.ends_with('O') && tokens.get(i + 1) == Some(&"-"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::testing::ScriptedTransport;
    use crate::fetcher::{FetchSettings, OfflineTransport, Transport};

    fn detector(transport: Arc<dyn Transport>) -> WgetDetector {
        WgetDetector::new(Arc::new(ContentFetcher::new(
            transport,
            FetchSettings::default(),
        )))
    }

    #[tokio::test]
    async fn test_stdout_output_flag() {
        let analysis = detector(Arc::new(OfflineTransport))
            .try_match("wget -qO- https://example.com/get.sh")
            .await
            .unwrap();

        assert_eq!(analysis.kind, "wget - File Download");
        assert_eq!(analysis.parameters["output"], "stdout (direct output)");
        assert_eq!(analysis.warnings, vec![FETCH_FAILED_WARNING]);
    }

    #[tokio::test]
    async fn test_stdout_output_as_separate_token() {
        let analysis = detector(Arc::new(OfflineTransport))
            .try_match("wget -O - https://example.com/get.sh | sh")
            .await
            .unwrap();
        assert_eq!(analysis.parameters["output"], "stdout (direct output)");
    }

    #[test]
    fn test_writes_to_stdout() {
        assert!(writes_to_stdout("wget -O- https://x"));
        assert!(writes_to_stdout("wget -qO- https://x | sh"));
        assert!(writes_to_stdout("wget -qO - https://x"));
        assert!(writes_to_stdout("wget --output-document=- https://x"));
        assert!(writes_to_stdout("wget --output-document - https://x"));
        assert!(!writes_to_stdout("wget -O setup.sh https://x"));
        assert!(!writes_to_stdout("wget -q https://example.com/a-O-b"));
        assert!(!writes_to_stdout("wget --no-verbose https://x"));
    }

    #[tokio::test]
    async fn test_binary_download() {
        let target = "https://example.com/releases/tool.zip";
        let body = format!("PK\u{3}\u{4}{}", "x".repeat(200));
        let transport = ScriptedTransport::new()
            .page(&format!("https://corsproxy.io/?{}", target), Ok(body));
        let analysis = detector(Arc::new(transport))
            .try_match(&format!("wget {}", target))
            .await
            .unwrap();

        let info = analysis.binary_info.unwrap();
        assert_eq!(info.file_extension.as_deref(), Some(".zip"));
        assert_eq!(info.file_name.as_deref(), Some("tool.zip"));
        assert_eq!(analysis.code_language, Language::Text);
        assert_eq!(analysis.warnings, vec!["This is a .zip file, not a script"]);
    }

    #[tokio::test]
    async fn test_pipe_to_shell() {
        let target = "https://example.com/get.sh";
        let body = format!("#!/bin/sh\n{}", "echo installing\n".repeat(10));
        let transport = ScriptedTransport::new()
            .page(&format!("https://corsproxy.io/?{}", target), Ok(body));
        let analysis = detector(Arc::new(transport))
            .try_match(&format!("wget -O- {} | sh", target))
            .await
            .unwrap();

        assert_eq!(analysis.code_language, Language::Bash);
        assert_eq!(analysis.warnings, vec![PIPE_TO_SHELL_WARNING]);
    }
}
