//! Operation: print, bump or set the package version in ekdep.toml.

use std::path::Path;

use ekdep_core::manifest::MANIFEST_FILE;
use ekdep_core::version::SemanticVersion;
use ekdep_util::errors::EkdepError;
use toml_edit::{value, DocumentMut};

/// Which part of the version to increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionPart {
    Major,
    Minor,
    Patch,
    Build,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionAction {
    Print,
    Bump(VersionPart),
    /// `major.minor.patch[-feature]`; the build number is reset to zero.
    Set(String),
}

/// Apply `action` to the manifest in `project_root` and return the
/// resulting version. Edits preserve the rest of the file's formatting.
pub fn version(project_root: &Path, action: &VersionAction) -> miette::Result<SemanticVersion> {
    let manifest_path = project_root.join(MANIFEST_FILE);
    let content = std::fs::read_to_string(&manifest_path).map_err(|e| EkdepError::Manifest {
        message: format!("Failed to read {}: {e}", manifest_path.display()),
    })?;
    let mut doc: DocumentMut = content.parse().map_err(|e| EkdepError::Manifest {
        message: format!("Failed to parse {MANIFEST_FILE}: {e}"),
    })?;

    let current_text = doc
        .get("package")
        .and_then(|p| p.get("version"))
        .and_then(|v| v.as_str())
        .ok_or_else(|| EkdepError::Manifest {
            message: "missing [package] version".to_string(),
        })?
        .to_string();
    let current = SemanticVersion::parse(&current_text);
    let invalid_current = || EkdepError::Manifest {
        message: format!(
            "invalid version '{current_text}': expected major.minor.patch[-feature]-build"
        ),
    };

    let updated = match action {
        VersionAction::Print | VersionAction::Bump(_) if !current.is_valid() => {
            return Err(invalid_current().into());
        }
        VersionAction::Print => return Ok(current),
        VersionAction::Bump(part) => {
            let mut next = current;
            let bumped = match part {
                VersionPart::Major => next.increment_major(),
                VersionPart::Minor => next.increment_minor(),
                VersionPart::Patch => next.increment_patch(),
                VersionPart::Build => next.increment_build(),
            };
            bumped.map_err(|e| EkdepError::Generic {
                message: e.to_string(),
            })?;
            next
        }
        VersionAction::Set(text) => {
            let parsed = SemanticVersion::parse_without_build(text);
            if !parsed.is_valid() {
                return Err(EkdepError::Generic {
                    message: format!(
                        "Invalid version '{text}'. Expected major.minor.patch or major.minor.patch-feature"
                    ),
                }
                .into());
            }
            parsed
        }
    };

    doc["package"]["version"] = value(updated.to_string());
    std::fs::write(&manifest_path, doc.to_string()).map_err(EkdepError::Io)?;
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"# project
[package]
name = "ekopen.tools"
version = "1.0.8-featureX-5"  # release

[dependencies]
"ekopen.net.handy.tools" = "3.2.1-0"
"#;

    fn project() -> tempfile::TempDir {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join(MANIFEST_FILE), MANIFEST).unwrap();
        tmp
    }

    fn read(tmp: &tempfile::TempDir) -> String {
        std::fs::read_to_string(tmp.path().join(MANIFEST_FILE)).unwrap()
    }

    #[test]
    fn print_does_not_modify() {
        let tmp = project();
        let v = version(tmp.path(), &VersionAction::Print).unwrap();
        assert_eq!(v.to_string(), "1.0.8-featureX-5");
        assert_eq!(read(&tmp), MANIFEST);
    }

    #[test]
    fn bump_resets_lower_fields_and_keeps_formatting() {
        let tmp = project();
        let v = version(tmp.path(), &VersionAction::Bump(VersionPart::Minor)).unwrap();
        assert_eq!(v.to_string(), "1.1.0-featureX-0");
        let content = read(&tmp);
        assert!(content.starts_with("# project\n"));
        assert!(content.contains("\"ekopen.net.handy.tools\" = \"3.2.1-0\""));
        assert!(content.contains("version = \"1.1.0-featureX-0\""));

        let v = version(tmp.path(), &VersionAction::Bump(VersionPart::Build)).unwrap();
        assert_eq!(v.to_string(), "1.1.0-featureX-1");
    }

    #[test]
    fn set_zeros_build() {
        let tmp = project();
        let v = version(tmp.path(), &VersionAction::Set("6.8.1".to_string())).unwrap();
        assert_eq!(v.to_string(), "6.8.1-0");
        let v = version(tmp.path(), &VersionAction::Set("6.8.0-specials".to_string())).unwrap();
        assert_eq!(v.to_string(), "6.8.0-specials-0");
        assert!(read(&tmp).contains("version = \"6.8.0-specials-0\""));
    }

    #[test]
    fn set_rejects_malformed_version() {
        let tmp = project();
        let err = version(tmp.path(), &VersionAction::Set("6.8".to_string())).unwrap_err();
        assert!(err.to_string().contains("Invalid version '6.8'"));
        assert_eq!(read(&tmp), MANIFEST);
    }

    #[test]
    fn bump_past_largest_component_fails_without_writing() {
        let tmp = tempfile::tempdir().unwrap();
        let manifest = "[package]\nname = \"x\"\nversion = \"4294967295.0.0-0\"\n";
        std::fs::write(tmp.path().join(MANIFEST_FILE), manifest).unwrap();

        let err = version(tmp.path(), &VersionAction::Bump(VersionPart::Major)).unwrap_err();
        assert!(err.to_string().contains("cannot increment major version 4294967295"));
        assert_eq!(read(&tmp), manifest);

        let v = version(tmp.path(), &VersionAction::Bump(VersionPart::Minor)).unwrap();
        assert_eq!(v.to_string(), "4294967295.1.0-0");
    }

    #[test]
    fn invalid_current_version_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join(MANIFEST_FILE),
            "[package]\nname = \"x\"\nversion = \"1.0\"\n",
        )
        .unwrap();
        assert!(version(tmp.path(), &VersionAction::Print).is_err());
        assert!(version(tmp.path(), &VersionAction::Bump(VersionPart::Patch)).is_err());
    }
}
