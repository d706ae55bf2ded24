// Generic safety checks applied to every classified command
use crate::models::CommandAnalysis;

pub const DESTRUCTIVE_WARNING: &str = "DANGER: Command might delete files or format disks!";
pub const PRIVILEGE_WARNING: &str =
    "Command requires elevated permissions or modifies file permissions";

const DESTRUCTIVE_MARKERS: &[&str] = &["rm -rf", "del /f", "format"];
const PRIVILEGE_MARKERS: &[&str] = &["chmod +x", "sudo"];

/// Append generic warnings after whatever the matching detector reported
pub fn apply_generic_checks(analysis: &mut CommandAnalysis, command: &str) {
    if DESTRUCTIVE_MARKERS.iter().any(|m| command.contains(m)) {
        analysis.warn(DESTRUCTIVE_WARNING);
    }
    if PRIVILEGE_MARKERS.iter().any(|m| command.contains(m)) {
        analysis.warn(PRIVILEGE_WARNING);
    }
}
