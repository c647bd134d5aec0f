//! External ruleset compilers as an injectable capability.
//!
//! The two real implementations shell out to the `mihomo` and `sing-box`
//! binaries; tests substitute fakes. Invocation is synchronous, the child's
//! stdout/stderr pass through to the console, and a failure means "this
//! compiled artifact is absent" — never a failed run.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::info;

use ruleforge_shared::{ConverterKind, Result, RuleForgeError};

// ---------------------------------------------------------------------------
// Port
// ---------------------------------------------------------------------------

/// Transcodes an emitted text artifact into a compiled binary ruleset.
pub trait RulesetConverter: Send + Sync {
    /// Converter name for logging.
    fn name(&self) -> &str;

    /// Compile `input` into `output`, blocking until the tool exits.
    fn convert(&self, input: &Path, output: &Path) -> Result<()>;
}

/// Resolve the executable for `kind`: explicit override → `./<name>` in the
/// working directory → `<name>` on PATH.
pub fn resolve_binary(kind: ConverterKind, override_path: Option<&Path>) -> PathBuf {
    if let Some(path) = override_path {
        return path.to_path_buf();
    }
    let local = PathBuf::from(format!("./{}", kind.binary_name()));
    if local.exists() {
        local
    } else {
        PathBuf::from(kind.binary_name())
    }
}

/// Construct the real converter for `kind`.
pub fn converter_for(kind: ConverterKind, binary: PathBuf) -> Box<dyn RulesetConverter> {
    match kind {
        ConverterKind::Mihomo => Box::new(MihomoConverter { binary }),
        ConverterKind::SingBox => Box::new(SingBoxConverter { binary }),
    }
}

// ---------------------------------------------------------------------------
// mihomo
// ---------------------------------------------------------------------------

/// `mihomo convert-ruleset domain text <input> <output>` → `.mrs`
pub struct MihomoConverter {
    binary: PathBuf,
}

impl MihomoConverter {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl RulesetConverter for MihomoConverter {
    fn name(&self) -> &str {
        "mihomo"
    }

    fn convert(&self, input: &Path, output: &Path) -> Result<()> {
        info!(
            input = %input.display(),
            output = %output.display(),
            "compiling mihomo ruleset"
        );

        let status = Command::new(&self.binary)
            .arg("convert-ruleset")
            .arg("domain")
            .arg("text")
            .arg(input)
            .arg(output)
            .status()
            .map_err(|e| spawn_error(self.name(), &self.binary, e))?;

        if status.success() {
            Ok(())
        } else {
            Err(RuleForgeError::convert(self.name(), status.to_string()))
        }
    }
}

// ---------------------------------------------------------------------------
// sing-box
// ---------------------------------------------------------------------------

/// `sing-box rule-set convert <input> --output <output> --type adguard` → `.srs`
pub struct SingBoxConverter {
    binary: PathBuf,
}

impl SingBoxConverter {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl RulesetConverter for SingBoxConverter {
    fn name(&self) -> &str {
        "sing-box"
    }

    fn convert(&self, input: &Path, output: &Path) -> Result<()> {
        info!(
            input = %input.display(),
            output = %output.display(),
            "compiling sing-box ruleset"
        );

        let status = Command::new(&self.binary)
            .arg("rule-set")
            .arg("convert")
            .arg(input)
            .arg("--output")
            .arg(output)
            .arg("--type")
            .arg("adguard")
            .status()
            .map_err(|e| spawn_error(self.name(), &self.binary, e))?;

        if status.success() {
            Ok(())
        } else {
            Err(RuleForgeError::convert(self.name(), status.to_string()))
        }
    }
}

fn spawn_error(name: &str, binary: &Path, e: std::io::Error) -> RuleForgeError {
    RuleForgeError::convert(
        name,
        format!(
            "failed to spawn {}: {e}. Is `{name}` installed?",
            binary.display()
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_prefers_override() {
        let resolved = resolve_binary(
            ConverterKind::Mihomo,
            Some(Path::new("/opt/tools/mihomo-v2")),
        );
        assert_eq!(resolved, PathBuf::from("/opt/tools/mihomo-v2"));
    }

    #[test]
    fn resolve_falls_back_to_path_lookup() {
        // No override and no local binary in the test working directory.
        let resolved = resolve_binary(ConverterKind::SingBox, None);
        assert_eq!(resolved, PathBuf::from("sing-box"));
    }

    #[test]
    fn missing_binary_is_a_convert_error() {
        let converter = MihomoConverter::new("/nonexistent/ruleforge-test/mihomo");
        let err = converter
            .convert(Path::new("in.txt"), Path::new("out.mrs"))
            .unwrap_err();
        assert!(matches!(
            err,
            RuleForgeError::Convert { ref converter, .. } if converter == "mihomo"
        ));
    }

    #[test]
    fn nonzero_exit_is_a_convert_error() {
        // `false` exits 1 regardless of arguments.
        let converter = SingBoxConverter::new("false");
        let err = converter
            .convert(Path::new("in.txt"), Path::new("out.srs"))
            .unwrap_err();
        assert!(err.to_string().contains("sing-box"));
    }
}
