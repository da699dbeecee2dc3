//! Command line argument parsing and validation.

use clap::Parser;
use std::path::PathBuf;

/// Build-time artifact provisioning for the desktop packaging pipeline
#[derive(Parser, Debug)]
#[command(
    name = "lpac-provisioner",
    version,
    about = "Provisions lpac bundles and resource packs for the packaging pipeline",
    long_about = "Resolves the target platform, queries the latest upstream lpac release, \
downloads stale or missing platform bundles concurrently, assembles the language \
resource archive, and records build metadata for the packaging step.

Usage:
  lpac-provisioner
  lpac-provisioner --target all
  lpac-provisioner --target windows_aarch64 --github-token $GITHUB_TOKEN
  lpac-provisioner --skip-setup-resources

Exit code 0 = staged artifacts and build metadata are in place."
)]
pub struct Args {
    /// Target platform key, or "all" for every platform (defaults to the
    /// resolved host platform)
    #[arg(short, long, value_name = "TARGET")]
    pub target: Option<String>,

    /// Bearer token for the upstream release API (anonymous when omitted)
    #[arg(long, env = "GITHUB_TOKEN", value_name = "TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Skip provisioning and bundling, reusing previously cached outputs.
    ///
    /// A bare flag (or an empty value) enables the switch; otherwise the
    /// value must read "true" (case-insensitive) to enable it.
    #[arg(
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "",
        value_parser = parse_switch
    )]
    pub skip_setup_resources: Option<bool>,

    /// Build output directory
    #[arg(long, value_name = "DIR", default_value = "build")]
    pub build_dir: PathBuf,

    /// Directory holding the language resource files
    #[arg(long, value_name = "DIR", default_value = "resources/languages")]
    pub languages_dir: PathBuf,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Whether the skip switch is enabled.
    pub fn skip(&self) -> bool {
        self.skip_setup_resources.unwrap_or(false)
    }
}

/// Switch semantics: blank means enabled, anything else must read "true".
fn parse_switch(value: &str) -> Result<bool, std::convert::Infallible> {
    Ok(switch_value(value))
}

fn switch_value(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case("true")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_switch_is_enabled() {
        assert!(switch_value(""));
        assert!(switch_value("   "));
    }

    #[test]
    fn true_switch_is_case_insensitive() {
        assert!(switch_value("true"));
        assert!(switch_value("TRUE"));
        assert!(switch_value("True"));
    }

    #[test]
    fn anything_else_is_disabled() {
        assert!(!switch_value("false"));
        assert!(!switch_value("yes"));
        assert!(!switch_value("1"));
    }

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["lpac-provisioner"]).unwrap();
        assert_eq!(args.target, None);
        assert!(!args.skip());
        assert_eq!(args.build_dir, PathBuf::from("build"));
        assert_eq!(args.languages_dir, PathBuf::from("resources/languages"));
    }

    #[test]
    fn bare_skip_flag_enables_the_switch() {
        let args =
            Args::try_parse_from(["lpac-provisioner", "--skip-setup-resources"]).unwrap();
        assert!(args.skip());
    }

    #[test]
    fn explicit_false_disables_the_switch() {
        let args =
            Args::try_parse_from(["lpac-provisioner", "--skip-setup-resources=false"]).unwrap();
        assert!(!args.skip());
    }

    #[test]
    fn explicit_true_enables_the_switch() {
        let args =
            Args::try_parse_from(["lpac-provisioner", "--skip-setup-resources=TRUE"]).unwrap();
        assert!(args.skip());
    }

    #[test]
    fn unrecognized_value_disables_the_switch() {
        let args =
            Args::try_parse_from(["lpac-provisioner", "--skip-setup-resources=maybe"]).unwrap();
        assert!(!args.skip());
    }

    #[test]
    fn target_is_stored_verbatim() {
        let args = Args::try_parse_from(["lpac-provisioner", "--target", "ALL"]).unwrap();
        assert_eq!(args.target.as_deref(), Some("ALL"));
    }
}
