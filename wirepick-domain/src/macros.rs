//! `${name}` expansion for configuration strings.
//!
//! The resolve context only needs the expanded text. [`PropertyExpander`] is the
//! default implementation; embedders with a richer macro language plug in their
//! own [`MacroExpander`].

use std::collections::BTreeMap;
use wirepick_types::Version;

/// Built-in macro rendering an `osgi.native` capability for the host.
pub const NATIVE_CAPABILITY_MACRO: &str = "native_capability";

pub trait MacroExpander: Send + Sync {
    fn expand(&self, text: &str) -> String;
}

/// Operating system and processor the run targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostPlatform {
    pub os_name: String,
    pub os_version: String,
    pub processor: String,
}

impl HostPlatform {
    pub fn new(
        os_name: impl Into<String>,
        os_version: impl Into<String>,
        processor: impl Into<String>,
    ) -> Self {
        Self {
            os_name: os_name.into(),
            os_version: os_version.into(),
            processor: processor.into(),
        }
    }

    /// The platform this process runs on. The OS version is not available
    /// portably and reads as `0.0.0`.
    pub fn current() -> Self {
        let os_name = match std::env::consts::OS {
            "macos" => "Mac OS X",
            "linux" => "Linux",
            "windows" => "Windows",
            "freebsd" => "FreeBSD",
            other => other,
        };
        Self::new(os_name, "0.0.0", std::env::consts::ARCH)
    }

    /// Renders the `osgi.native` capability clause for this platform.
    pub fn native_capability(&self) -> String {
        format!(
            "osgi.native;osgi.native.osname:List<String>=\"{}\";osgi.native.osversion:Version={};osgi.native.processor:List<String>=\"{}\"",
            os_aliases(&self.os_name).join(","),
            Version::parse_lenient(&self.os_version),
            processor_aliases(&self.processor).join(","),
        )
    }
}

fn os_aliases(name: &str) -> Vec<String> {
    let lower = name.to_ascii_lowercase();
    match lower.as_str() {
        "mac os x" | "macosx" | "macos" => vec!["MacOSX".to_string(), "Mac OS X".to_string()],
        "linux" => vec!["Linux".to_string()],
        _ if lower.starts_with("windows") => {
            let suffix = name["windows".len()..].trim();
            if suffix.is_empty() {
                vec!["Win32".to_string()]
            } else {
                vec![
                    format!("Windows{}", suffix.replace(' ', "")),
                    format!("Windows {suffix}"),
                    "Win32".to_string(),
                ]
            }
        }
        _ => vec![name.to_string()],
    }
}

fn processor_aliases(arch: &str) -> Vec<String> {
    let names: &[&str] = match arch.to_ascii_lowercase().as_str() {
        "x86_64" | "amd64" | "em64t" | "x86-64" => &["x86-64", "amd64", "em64t", "x86_64"],
        "x86" | "i386" | "i486" | "i586" | "i686" | "pentium" => {
            &["x86", "pentium", "i386", "i486", "i586", "i686"]
        }
        "aarch64" | "arm64" => &["aarch64", "arm64"],
        _ => return vec![arch.to_string()],
    };
    names.iter().map(|s| s.to_string()).collect()
}

/// Substitutes `${name}` from a property table plus the built-in
/// `${native_capability}`. Unknown macros are left untouched.
#[derive(Debug, Clone)]
pub struct PropertyExpander {
    properties: BTreeMap<String, String>,
    platform: HostPlatform,
}

impl Default for PropertyExpander {
    fn default() -> Self {
        Self::new(HostPlatform::current())
    }
}

impl PropertyExpander {
    pub fn new(platform: HostPlatform) -> Self {
        Self {
            properties: BTreeMap::new(),
            platform,
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    fn lookup(&self, name: &str) -> Option<String> {
        if name == NATIVE_CAPABILITY_MACRO {
            return Some(self.platform.native_capability());
        }
        self.properties.get(name).cloned()
    }
}

impl MacroExpander for PropertyExpander {
    fn expand(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(start) = rest.find("${") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let Some(end) = after.find('}') else {
                out.push_str(&rest[start..]);
                return out;
            };
            let name = &after[..end];
            match self.lookup(name.trim()) {
                Some(value) => out.push_str(&value),
                None => out.push_str(&rest[start..start + 2 + end + 1]),
            }
            rest = &after[end + 1..];
        }
        out.push_str(rest);
        out
    }
}
