// Analysis result types shared by the detectors, classifier and renderer
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Best-guess language tag for a blob of code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Bash,
    PowerShell,
    Python,
    JavaScript,
    C,
    Java,
    #[default]
    Text,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Bash => "bash",
            Language::PowerShell => "powershell",
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::C => "c",
            Language::Java => "java",
            Language::Text => "text",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageInfo {
    pub package_name: String,
    pub package_manager: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BinaryInfo {
    pub is_binary: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_extension: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl BinaryInfo {
    pub fn text() -> Self {
        Self::default()
    }
}

/// Structured description of a single shell command.
///
/// Each classification call builds a fresh value; nothing is shared between
/// calls. `urls` is a set so duplicates can't sneak in from any detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandAnalysis {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_code: Option<String>,
    pub code_language: Language,
    pub urls: BTreeSet<String>,
    pub parameters: BTreeMap<String, serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_info: Option<PackageInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binary_info: Option<BinaryInfo>,
}

impl CommandAnalysis {
    pub fn new(kind: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            description: description.into(),
            warnings: Vec::new(),
            extracted_code: None,
            code_language: Language::Text,
            urls: BTreeSet::new(),
            parameters: BTreeMap::new(),
            package_info: None,
            binary_info: None,
        }
    }

    /// Fallback result when no detector recognizes the command
    pub fn unknown() -> Self {
        Self::new("Unknown", "Unrecognized command")
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.code_language = language;
        self
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn set_param(&mut self, key: &str, value: impl Into<serde_json::Value>) {
        self.parameters.insert(key.to_string(), value.into());
    }

    pub fn is_unknown(&self) -> bool {
        self.kind == "Unknown"
    }
}
