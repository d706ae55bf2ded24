use super::Detector;
use crate::models::{CommandAnalysis, Language, PackageInfo};
use crate::registry::Registry;
use async_trait::async_trait;
use std::sync::Arc;

pub const INSTALL_WARNING: &str = "This command will install software on your system";
pub const GLOBAL_INSTALL_WARNING: &str = "Global package installation";

pub struct PackageManagerDetector {
    registry: Arc<Registry>,
}

impl PackageManagerDetector {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl Detector for PackageManagerDetector {
    fn name(&self) -> &'static str {
        "package-manager"
    }

    async fn try_match(&self, command: &str) -> Option<CommandAnalysis> {
        let manager = self.registry.package_manager_for(command)?;

        let mut analysis = CommandAnalysis::new(
            format!("{} - Package Manager", manager.name),
            manager.description.clone(),
        )
        .with_language(Language::Bash);
        analysis.extracted_code = Some(command.to_string());

        if let Some(package) = manager.package_name(command) {
            analysis.package_info = Some(PackageInfo {
                package_name: package.to_string(),
                package_manager: manager.name.clone(),
                description: format!("Installing package: {}", package),
                search_url: manager.search_url(package),
            });
        }

        if command.contains("install") || command.contains("add") {
            analysis.warn(INSTALL_WARNING);
        }
        if command.contains("install") && command.contains("-g") {
            analysis.warn(GLOBAL_INSTALL_WARNING);
        }

        Some(analysis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> PackageManagerDetector {
        PackageManagerDetector::new(Arc::new(Registry::builtin()))
    }

    #[tokio::test]
    async fn test_pip_install() {
        let analysis = detector().try_match("pip install requests").await.unwrap();

        assert_eq!(analysis.kind, "pip - Package Manager");
        assert_eq!(analysis.code_language, Language::Bash);
        assert_eq!(analysis.extracted_code.as_deref(), Some("pip install requests"));
        assert_eq!(analysis.warnings, vec![INSTALL_WARNING]);

        let info = analysis.package_info.unwrap();
        assert_eq!(info.package_name, "requests");
        assert_eq!(info.package_manager, "pip");
        assert_eq!(info.description, "Installing package: requests");
        assert_eq!(
            info.search_url.as_deref(),
            Some("https://pypi.org/project/requests/")
        );
    }

    #[tokio::test]
    async fn test_manager_matched_mid_command() {
        let analysis = detector()
            .try_match("sudo gem install rails")
            .await
            .unwrap();
        assert_eq!(analysis.kind, "RubyGems - Package Manager");
        assert_eq!(analysis.package_info.unwrap().package_name, "rails");
    }

    #[tokio::test]
    async fn test_no_package_name_means_no_info() {
        let analysis = detector().try_match("cargo build --release").await.unwrap();
        assert_eq!(analysis.kind, "Cargo - Package Manager");
        assert!(analysis.package_info.is_none());
        assert!(analysis.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_global_npm_install() {
        let analysis = detector().try_match("npm install -g foo").await.unwrap();
        assert_eq!(analysis.package_info.unwrap().package_name, "foo");
        assert_eq!(
            analysis.warnings,
            vec![INSTALL_WARNING, GLOBAL_INSTALL_WARNING]
        );
    }

    #[tokio::test]
    async fn test_uv_pip_install_is_uv() {
        let analysis = detector().try_match("uv pip install httpx").await.unwrap();
        assert_eq!(analysis.kind, "uv - Package Manager");
        let info = analysis.package_info.unwrap();
        assert_eq!(info.package_name, "httpx");
        assert_eq!(info.package_manager, "uv");
    }

    #[tokio::test]
    async fn test_unrelated_command() {
        assert!(detector().try_match("ls -la").await.is_none());
        assert!(detector().try_match("pipx install black").await.is_none());
    }
}
