//! Package role classification and prerequisite inference.
//!
//! Everything here is a pure function of the identifier, the declared version
//! string and the file name.

use std::{fmt, sync::OnceLock};

use regex::Regex;

use crate::constants::{PLUGIN_PREFIX, PLUGIN_SUFFIX, PREREQUISITE_HOST, SYSTEM_PLUGIN_PREFIX};

/// What kind of package a record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    App,
    Plugin,
    SystemPlugin,
}

impl Role {
    /// The token written to the manifest's role column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::App => "app",
            Role::Plugin => "plugin",
            Role::SystemPlugin => "systemplugin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies a package by its identifier. Anything that is not a system
/// plugin or a plugin is an app.
pub fn classify_role(identifier: &str) -> Role {
    if identifier.starts_with(SYSTEM_PLUGIN_PREFIX) {
        Role::SystemPlugin
    } else if identifier.starts_with(PLUGIN_PREFIX) && identifier.ends_with(PLUGIN_SUFFIX) {
        Role::Plugin
    } else {
        Role::App
    }
}

/// Build flavor of the host a package targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    Mil,
    Civ,
}

impl Flavor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Flavor::Mil => "MIL",
            Flavor::Civ => "CIV",
        }
    }

    /// Looks for a flavor cue in the identifier or the file name. Military
    /// cues win over civilian ones.
    pub fn detect(identifier: &str, filename: &str) -> Option<Self> {
        let identifier = identifier.to_ascii_lowercase();
        let filename = filename.to_ascii_lowercase();

        [Flavor::Mil, Flavor::Civ].into_iter().find(|flavor| {
            let cue = flavor.as_str().to_ascii_lowercase();
            identifier.contains(&cue) || filename.contains(&format!("-{cue}-"))
        })
    }
}

impl fmt::Display for Flavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bracketed host version in a version string, e.g. `3.5.27 (1ad526bf) - [5.4.0]`.
fn version_string_pattern() -> &'static Regex {
    static VERSION_RE: OnceLock<Regex> = OnceLock::new();
    VERSION_RE.get_or_init(|| Regex::new(r"\[([0-9.]+)\]").unwrap())
}

/// Host version followed by a flavor tag in a file name, e.g.
/// `ATAK-Plugin-datasync-3.5.27-5.4.0-civ-release.apk`.
fn filename_pattern() -> &'static Regex {
    static FILENAME_RE: OnceLock<Regex> = OnceLock::new();
    FILENAME_RE.get_or_init(|| Regex::new(r"-([0-9.]+)-(?i:civ|mil)-").unwrap())
}

/// Host version embedded in an identifier, e.g. `...@5.4.0.CIV`.
fn identifier_pattern() -> &'static Regex {
    static IDENTIFIER_RE: OnceLock<Regex> = OnceLock::new();
    IDENTIFIER_RE.get_or_init(|| Regex::new(r"@([0-9.]+)\.(CIV|MIL)").unwrap())
}

fn first_capture<'a>(re: &Regex, haystack: &'a str) -> Option<&'a str> {
    re.captures(haystack)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Extracts the host version a package requires, trying the version string,
/// then the file name, then the identifier. The first source that yields a
/// version is used; later sources are not consulted.
pub fn extract_host_version<'a>(
    identifier: &'a str,
    version: &'a str,
    filename: &'a str,
) -> Option<&'a str> {
    let stages: [(&Regex, &'a str); 3] = [
        (version_string_pattern(), version),
        (filename_pattern(), filename),
        (identifier_pattern(), identifier),
    ];
    stages
        .into_iter()
        .find_map(|(re, haystack)| first_capture(re, haystack))
}

/// Infers the prerequisite token (`com.atakmap.app@<version>.<MIL|CIV>`) for
/// a package.
///
/// Returns an empty string when no host version is found, or when a version
/// is found but neither the identifier nor the file name carries a flavor cue.
pub fn infer_prerequisite(identifier: &str, version: &str, filename: &str) -> String {
    let Some(host_version) = extract_host_version(identifier, version, filename) else {
        return String::new();
    };
    match Flavor::detect(identifier, filename) {
        Some(flavor) => format!("{PREREQUISITE_HOST}@{host_version}.{flavor}"),
        None => String::new(),
    }
}
