// Package manager and programming tool tables
//
// The tables are plain data (serializable entries) compiled once into an
// immutable `Registry` that detectors share through an `Arc`.

use crate::config::ConfigError;
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageManagerEntry {
    /// Command token that selects this manager (e.g. `pip`)
    pub prefix: String,
    pub name: String,
    pub description: String,
    /// Search page URL with a `{package}` placeholder
    #[serde(default)]
    pub search_url_template: String,
    /// Regex with one or two capture groups; the first non-empty one is the package
    pub install_pattern: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgrammingToolEntry {
    pub token: String,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct PackageManagerSpec {
    pub prefix: String,
    pub name: String,
    pub description: String,
    pub search_url_template: String,
    pub install_pattern: Regex,
}

impl PackageManagerSpec {
    pub fn compile(entry: &PackageManagerEntry) -> Result<Self, ConfigError> {
        let install_pattern =
            Regex::new(&entry.install_pattern).map_err(|source| ConfigError::InvalidPattern {
                prefix: entry.prefix.clone(),
                source,
            })?;
        Ok(Self {
            prefix: entry.prefix.clone(),
            name: entry.name.clone(),
            description: entry.description.clone(),
            search_url_template: entry.search_url_template.clone(),
            install_pattern,
        })
    }

    /// `pip install x` / `sudo pip install x`, but not `pipx install x`
    pub fn matches(&self, command: &str) -> bool {
        self.leads(command) || command.contains(&format!(" {} ", self.prefix))
    }

    /// The command itself starts with this manager's token
    pub fn leads(&self, command: &str) -> bool {
        command.starts_with(&format!("{} ", self.prefix))
    }

    pub fn package_name<'a>(&self, command: &'a str) -> Option<&'a str> {
        let captures = self.install_pattern.captures(command)?;
        captures
            .iter()
            .skip(1)
            .flatten()
            .map(|m| m.as_str())
            .find(|name| !name.is_empty())
    }

    pub fn search_url(&self, package: &str) -> Option<String> {
        if self.search_url_template.is_empty() {
            None
        } else {
            Some(self.search_url_template.replace("{package}", package))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgrammingToolSpec {
    pub token: String,
    pub name: String,
    pub description: String,
}

impl ProgrammingToolSpec {
    pub fn matches(&self, command: &str) -> bool {
        command == self.token || command.starts_with(&format!("{} ", self.token))
    }

    pub fn is_python(&self) -> bool {
        self.token == "python" || self.token == "python3"
    }
}

impl From<&ProgrammingToolEntry> for ProgrammingToolSpec {
    fn from(entry: &ProgrammingToolEntry) -> Self {
        Self {
            token: entry.token.clone(),
            name: entry.name.clone(),
            description: entry.description.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Registry {
    package_managers: Vec<PackageManagerSpec>,
    programming_tools: Vec<ProgrammingToolSpec>,
}

impl Registry {
    pub fn compile(
        package_managers: &[PackageManagerEntry],
        programming_tools: &[ProgrammingToolEntry],
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            package_managers: package_managers
                .iter()
                .map(PackageManagerSpec::compile)
                .collect::<Result<_, _>>()?,
            programming_tools: programming_tools.iter().map(Into::into).collect(),
        })
    }

    #[cfg(test)]
    pub fn builtin() -> Self {
        Self::compile(&default_package_managers(), &default_programming_tools())
            .expect("built-in install patterns compile")
    }

    pub fn package_managers(&self) -> &[PackageManagerSpec] {
        &self.package_managers
    }

    /// Manager for a command: one the command starts with beats one that
    /// only appears mid-command (`uv pip install` is uv, not pip)
    pub fn package_manager_for(&self, command: &str) -> Option<&PackageManagerSpec> {
        self.package_managers
            .iter()
            .find(|m| m.leads(command))
            .or_else(|| self.package_managers.iter().find(|m| m.matches(command)))
    }

    pub fn programming_tools(&self) -> &[ProgrammingToolSpec] {
        &self.programming_tools
    }
}

/// Skips `-g`, `--user`, ... before the package argument
const FLAGS: &str = r"(?:-\S+\s+)*";

fn install_after(verb: &str) -> String {
    format!(r"{}\s+{}([^\s-]\S*)", verb, FLAGS)
}

fn manager(
    prefix: &str,
    name: &str,
    description: &str,
    search_url_template: &str,
    install_pattern: String,
) -> PackageManagerEntry {
    PackageManagerEntry {
        prefix: prefix.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        search_url_template: search_url_template.to_string(),
        install_pattern,
    }
}

/// Order matters: the first manager whose prefix matches wins
pub fn default_package_managers() -> Vec<PackageManagerEntry> {
    vec![
        manager(
            "pip",
            "pip",
            "Python package installer, the standard package manager for Python",
            "https://pypi.org/project/{package}/",
            install_after(r"pip\s+install"),
        ),
        manager(
            "uv",
            "uv",
            "Ultra-fast Python package installer and resolver",
            "https://pypi.org/project/{package}/",
            format!(
                "{}|{}",
                install_after(r"uv\s+add"),
                install_after(r"uv\s+pip\s+install")
            ),
        ),
        manager(
            "npm",
            "npm",
            "Node Package Manager, the default package manager for Node.js",
            "https://www.npmjs.com/package/{package}",
            format!(
                "{}|{}",
                install_after(r"npm\s+install"),
                install_after(r"npm\s+i")
            ),
        ),
        manager(
            "yarn",
            "yarn",
            "Fast, reliable, and secure dependency management for JavaScript",
            "https://www.npmjs.com/package/{package}",
            install_after(r"yarn\s+add"),
        ),
        manager(
            "pnpm",
            "pnpm",
            "Fast, disk space efficient package manager for Node.js",
            "https://www.npmjs.com/package/{package}",
            format!(
                "{}|{}",
                install_after(r"pnpm\s+add"),
                install_after(r"pnpm\s+install")
            ),
        ),
        manager(
            "choco",
            "Chocolatey",
            "Package manager for Windows, automates software installation",
            "https://chocolatey.org/packages/{package}",
            install_after(r"choco\s+install"),
        ),
        manager(
            "winget",
            "winget",
            "Windows Package Manager, native package manager for Windows 10/11",
            "https://winget.run/pkg/{package}",
            r"winget\s+install\s+(?:--id\s+)?([^\s-]+(?:\.[^\s-]+)*)".to_string(),
        ),
        manager(
            "scoop",
            "Scoop",
            "Command-line installer for Windows, focuses on open-source software",
            "https://scoop.sh/#/apps?q={package}",
            install_after(r"scoop\s+install"),
        ),
        manager(
            "conda",
            "Conda",
            "Package manager for Python and other languages, part of Anaconda",
            "https://anaconda.org/search?q={package}",
            install_after(r"conda\s+install"),
        ),
        manager(
            "mamba",
            "Mamba",
            "Fast, robust, and cross-platform package manager (conda alternative)",
            "https://anaconda.org/search?q={package}",
            install_after(r"mamba\s+install"),
        ),
        manager(
            "cargo",
            "Cargo",
            "Rust package manager and build tool",
            "https://crates.io/crates/{package}",
            install_after(r"cargo\s+install"),
        ),
        manager(
            "gem",
            "RubyGems",
            "Package manager for Ruby programming language",
            "https://rubygems.org/gems/{package}",
            install_after(r"gem\s+install"),
        ),
        manager(
            "go",
            "Go Modules",
            "Go programming language module system",
            "https://pkg.go.dev/{package}",
            format!(r"go\s+install\s+{}([^\s@-][^\s@]*)", FLAGS),
        ),
    ]
}

pub fn default_programming_tools() -> Vec<ProgrammingToolEntry> {
    [
        (
            "python",
            "Python",
            "High-level programming language for general-purpose programming",
        ),
        (
            "python3",
            "Python 3",
            "Python 3.x interpreter for running Python scripts",
        ),
        (
            "flutter",
            "Flutter",
            "Google's UI toolkit for building cross-platform applications",
        ),
        (
            "dart",
            "Dart",
            "Programming language optimized for building mobile, desktop, server, and web applications",
        ),
    ]
    .into_iter()
    .map(|(token, name, description)| ProgrammingToolEntry {
        token: token.to_string(),
        name: name.to_string(),
        description: description.to_string(),
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(prefix: &str) -> PackageManagerSpec {
        Registry::builtin()
            .package_managers()
            .iter()
            .find(|m| m.prefix == prefix)
            .cloned()
            .unwrap()
    }

    #[test]
    fn test_builtin_tables() {
        let registry = Registry::builtin();
        assert_eq!(registry.package_managers().len(), 13);
        assert_eq!(registry.programming_tools().len(), 4);
        assert_eq!(registry.package_managers()[0].prefix, "pip");
        assert_eq!(registry.package_managers()[12].name, "Go Modules");
    }

    #[test]
    fn test_package_name_extraction() {
        assert_eq!(spec("pip").package_name("pip install requests"), Some("requests"));
        assert_eq!(spec("npm").package_name("npm install -g typescript"), Some("typescript"));
        assert_eq!(spec("npm").package_name("npm i lodash"), Some("lodash"));
        assert_eq!(spec("uv").package_name("uv pip install httpx"), Some("httpx"));
        assert_eq!(spec("uv").package_name("uv add --dev pytest"), Some("pytest"));
        assert_eq!(
            spec("winget").package_name("winget install --id Microsoft.PowerToys"),
            Some("Microsoft.PowerToys")
        );
        assert_eq!(
            spec("go").package_name("go install golang.org/x/tools/gopls@latest"),
            Some("golang.org/x/tools/gopls")
        );
        assert_eq!(spec("cargo").package_name("cargo build --release"), None);
    }

    #[test]
    fn test_prefix_matching() {
        let pip = spec("pip");
        assert!(pip.matches("pip install requests"));
        assert!(pip.matches("sudo pip install requests"));
        assert!(!pip.matches("pipx install black"));
        assert!(!pip.matches("pip"));
    }

    #[test]
    fn test_leading_manager_wins() {
        let registry = Registry::builtin();
        let pick = |cmd: &str| registry.package_manager_for(cmd).map(|m| m.prefix.clone());

        assert_eq!(pick("uv pip install httpx").as_deref(), Some("uv"));
        assert_eq!(pick("conda run pip install x").as_deref(), Some("conda"));
        assert_eq!(pick("sudo gem install rails").as_deref(), Some("gem"));
        assert_eq!(pick("ls -la"), None);
    }

    #[test]
    fn test_search_url() {
        assert_eq!(
            spec("cargo").search_url("ripgrep").as_deref(),
            Some("https://crates.io/crates/ripgrep")
        );

        let mut bare = spec("gem");
        bare.search_url_template.clear();
        assert_eq!(bare.search_url("rails"), None);
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let mut entries = default_package_managers();
        entries[0].install_pattern = "pip install (".to_string();
        let err = Registry::compile(&entries, &[]).unwrap_err();
        assert!(err.to_string().contains("pip"));
    }

    #[test]
    fn test_tool_matching() {
        let tools = Registry::builtin();
        let python = &tools.programming_tools()[0];
        assert!(python.matches("python"));
        assert!(python.matches("python script.py"));
        assert!(!python.matches("python3 script.py"));
        assert!(python.is_python());
        assert!(!tools.programming_tools()[2].is_python());
    }
}
