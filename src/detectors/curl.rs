use super::{apply_fetched, has_flag, pipes_to_shell, Detector, FETCH_FAILED_WARNING};
use crate::fetcher::ContentFetcher;
use crate::models::{CommandAnalysis, Language};
use crate::urls::first_command_url;
use async_trait::async_trait;
use std::sync::Arc;

pub const INSECURE_SSL_WARNING: &str = "Command ignores SSL certificate verification";
pub const PIPE_TO_SHELL_WARNING: &str =
    "DANGER: Command will automatically execute the downloaded code!";

pub struct CurlDetector {
    fetcher: Arc<ContentFetcher>,
}

impl CurlDetector {
    pub fn new(fetcher: Arc<ContentFetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl Detector for CurlDetector {
    fn name(&self) -> &'static str {
        "curl"
    }

    async fn try_match(&self, command: &str) -> Option<CommandAnalysis> {
        if !command.starts_with("curl") {
            return None;
        }

        let mut analysis = CommandAnalysis::new(
            "cURL - HTTP Download",
            "Command to download content from URL",
        )
        .with_language(Language::Bash);

        if has_flag(command, 's', "--silent") {
            analysis.set_param("mode", "silent");
        }
        if has_flag(command, 'L', "--location") {
            analysis.set_param("redirect", "follow redirects");
        }
        if has_flag(command, 'k', "--insecure") {
            analysis.set_param("SSL", "ignore certificates");
            analysis.warn(INSECURE_SSL_WARNING);
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
