//! Target platform resolution and the artifact mapping.
//!
//! The platform set is closed: four OS/architecture combinations, with macOS
//! collapsing architecture into a single universal variant. Keys are the
//! canonical identifiers used for staged artifact files and for looking up
//! upstream release assets.

use crate::error::{Result, SetupError};

/// A target platform for the bundled `lpac` tool.
///
/// The string key (e.g. `windows_x86`) is the canonical identifier: it names
/// the staged artifact file and selects the upstream asset via
/// [`Platform::artifact_name`]. The mapping is fixed and never mutated at
/// runtime.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Platform {
    /// Windows on x86/x86_64
    WindowsX86,
    /// Windows on ARM64
    WindowsAarch64,
    /// Linux on x86_64
    LinuxX86,
    /// macOS universal binary (x86_64 + ARM64)
    MacosUniversal,
}

/// Every platform in the fixed mapping, in declaration order.
pub const ALL_PLATFORMS: [Platform; 4] = [
    Platform::WindowsX86,
    Platform::WindowsAarch64,
    Platform::LinuxX86,
    Platform::MacosUniversal,
];

impl Platform {
    /// Canonical platform key.
    pub fn key(self) -> &'static str {
        match self {
            Platform::WindowsX86 => "windows_x86",
            Platform::WindowsAarch64 => "windows_aarch64",
            Platform::LinuxX86 => "linux_x86",
            Platform::MacosUniversal => "macos_universal",
        }
    }

    /// Upstream artifact base name for this platform.
    pub fn artifact(self) -> &'static str {
        match self {
            Platform::WindowsX86 => "lpac-windows-x86_64-mingw",
            Platform::WindowsAarch64 => "lpac-windows-arm64-mingw",
            Platform::LinuxX86 => "lpac-linux-x86_64",
            Platform::MacosUniversal => "lpac-darwin-universal",
        }
    }

    /// Exact release asset name (`<artifact>.zip`) looked up in the catalog.
    pub fn artifact_name(self) -> String {
        format!("{}.zip", self.artifact())
    }

    /// Looks up a platform by its canonical key.
    pub fn from_key(key: &str) -> Option<Self> {
        ALL_PLATFORMS.into_iter().find(|p| p.key() == key)
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Comma-separated list of all valid platform keys, for error messages.
pub fn valid_keys() -> String {
    ALL_PLATFORMS
        .iter()
        .map(|p| p.key())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Resolves the build target.
///
/// An explicit override is lowercased and returned verbatim; whether it names
/// a known platform (or `all`) is checked later by the provisioner. Without
/// an override the host OS and processor architecture are probed. macOS
/// always resolves to the universal architecture.
///
/// # Errors
///
/// `UnsupportedPlatform` when the host OS or architecture cannot be
/// classified. No side effects on any path.
pub fn resolve(explicit_override: Option<&str>) -> Result<String> {
    if let Some(target) = explicit_override {
        return Ok(target.to_lowercase());
    }
    host_platform(std::env::consts::OS, std::env::consts::ARCH)
}

/// Classifies an OS/architecture pair into a platform key.
///
/// Split out from [`resolve`] so the probe is testable without depending on
/// the machine running the tests.
fn host_platform(os: &str, arch: &str) -> Result<String> {
    let os_key = match os {
        "macos" => "macos",
        "windows" => "windows",
        "linux" => "linux",
        _ => {
            return Err(SetupError::UnsupportedPlatform {
                os: os.to_string(),
                arch: arch.to_string(),
            });
        }
    };

    let arch_key = if os_key == "macos" {
        "universal"
    } else {
        match arch {
            "x86" | "x86_64" => "x86",
            "aarch64" => "aarch64",
            _ => {
                return Err(SetupError::UnsupportedPlatform {
                    os: os.to_string(),
                    arch: arch.to_string(),
                });
            }
        }
    };

    Ok(format!("{os_key}_{arch_key}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_key_round_trips() {
        for platform in ALL_PLATFORMS {
            assert_eq!(Platform::from_key(platform.key()), Some(platform));
        }
    }

    #[test]
    fn resolve_returns_override_unchanged() {
        for platform in ALL_PLATFORMS {
            let resolved = resolve(Some(platform.key())).unwrap();
            assert_eq!(resolved, platform.key());
        }
    }

    #[test]
    fn resolve_lowercases_override() {
        assert_eq!(resolve(Some("ALL")).unwrap(), "all");
        assert_eq!(resolve(Some("Windows_X86")).unwrap(), "windows_x86");
    }

    #[test]
    fn resolve_passes_unknown_override_through() {
        // Validity is the provisioner's concern, not the resolver's
        assert_eq!(resolve(Some("solaris_x86")).unwrap(), "solaris_x86");
    }

    #[test]
    fn every_platform_has_an_artifact_name() {
        for platform in ALL_PLATFORMS {
            let name = platform.artifact_name();
            assert!(name.ends_with(".zip"), "asset name should be a zip: {name}");
            assert!(name.starts_with("lpac-"));
        }
    }

    #[test]
    fn macos_collapses_architecture() {
        assert_eq!(host_platform("macos", "x86_64").unwrap(), "macos_universal");
        assert_eq!(host_platform("macos", "aarch64").unwrap(), "macos_universal");
    }

    #[test]
    fn linux_and_windows_keep_architecture() {
        assert_eq!(host_platform("linux", "x86_64").unwrap(), "linux_x86");
        assert_eq!(host_platform("windows", "aarch64").unwrap(), "windows_aarch64");
        assert_eq!(host_platform("windows", "x86").unwrap(), "windows_x86");
    }

    #[test]
    fn unknown_os_is_unsupported() {
        let err = host_platform("solaris", "x86_64").unwrap_err();
        assert!(matches!(err, SetupError::UnsupportedPlatform { .. }));
    }

    #[test]
    fn unknown_arch_is_unsupported() {
        let err = host_platform("linux", "riscv64").unwrap_err();
        assert!(matches!(err, SetupError::UnsupportedPlatform { .. }));
    }

    #[test]
    fn valid_keys_lists_every_platform() {
        let keys = valid_keys();
        for platform in ALL_PLATFORMS {
            assert!(keys.contains(platform.key()));
        }
    }
}
