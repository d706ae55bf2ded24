// Language sniffer - ordered substring heuristics, first hit wins
use crate::models::Language;

/// Markers checked top to bottom. A later language never wins over an
/// earlier one, so a Python script containing `$` reads as PowerShell.
const LANGUAGE_MARKERS: &[(Language, &[&str])] = &[
    (Language::Bash, &["#!/bin/bash", "#!/bin/sh"]),
    (Language::PowerShell, &["function ", "$", "param("]),
    (Language::Python, &["import ", "def ", "python"]),
    (Language::JavaScript, &["const ", "let ", "var "]),
    (Language::C, &["#include", "int main"]),
    (Language::Java, &["public class", "import java"]),
];

/// Guess the language of a text blob
pub fn detect_language(content: &str) -> Language {
    LANGUAGE_MARKERS
        .iter()
        .find(|(_, markers)| markers.iter().any(|m| content.contains(m)))
        .map(|(language, _)| *language)
        .unwrap_or(Language::Text)
}

/// Warning describing what kind of script a fetched payload looks like
pub fn content_kind_warning(content: &str) -> Option<&'static str> {
    if content.contains("#!/bin/bash") || content.contains("#!/bin/sh") {
        Some("Content is a bash script that would be executed")
    } else if content.contains("function ") || content.contains('$') || content.contains("param(")
    {
        Some("Content contains PowerShell code")
    } else if content.contains("python") || content.contains("import ") {
        Some("Content contains Python code")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_shebangs() {
        assert_eq!(detect_language("#!/bin/bash\necho hi"), Language::Bash);
        assert_eq!(detect_language("#!/bin/sh\nset -e"), Language::Bash);
    }

    #[test]
    fn test_detect_common_languages() {
        assert_eq!(detect_language("param($Name)"), Language::PowerShell);
        assert_eq!(detect_language("def main():\n    pass"), Language::Python);
        assert_eq!(detect_language("const x = 1;"), Language::JavaScript);
        assert_eq!(detect_language("#include <stdio.h>"), Language::C);
        assert_eq!(detect_language("public class X {}"), Language::Java);
        assert_eq!(detect_language("plain text"), Language::Text);
    }

    #[test]
    fn test_order_is_significant() {
        // `$` is a PowerShell marker and is checked before Python
        assert_eq!(
            detect_language("import os\nprint('$HOME')"),
            Language::PowerShell
        );
        // `import java` also contains `import `, so Python wins
        assert_eq!(detect_language("import java.util.List;"), Language::Python);
        // Shebang beats everything else
        assert_eq!(
            detect_language("#!/bin/bash\nfunction f() { echo $1; }"),
            Language::Bash
        );
    }

    #[test]
    fn test_content_kind_warning() {
        assert_eq!(
            content_kind_warning("#!/bin/sh\necho"),
            Some("Content is a bash script that would be executed")
        );
        assert_eq!(
            content_kind_warning("Write-Host $env:PATH"),
            Some("Content contains PowerShell code")
        );
        assert_eq!(
            content_kind_warning("import sys"),
            Some("Content contains Python code")
        );
        assert_eq!(content_kind_warning("hello"), None);
    }
}
