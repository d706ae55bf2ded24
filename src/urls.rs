// URL extraction from commands and fetched content
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;

lazy_static! {
    static ref COMMAND_URL: Regex = Regex::new(r#"https?://[^\s'"]+"#).unwrap();
    static ref CONTENT_URL: Regex = Regex::new(r#"https?://[^\s'"<>()]+"#).unwrap();
}

/// First URL in a command line; quotes end the match but brackets don't
pub fn first_command_url(command: &str) -> Option<&str> {
    COMMAND_URL.find(command).map(|m| m.as_str())
}

/// Every distinct URL in a text blob
pub fn extract_urls(content: &str) -> BTreeSet<String> {
    CONTENT_URL
        .find_iter(content)
        .map(|m| m.as_str().to_string())
        .collect()
}
