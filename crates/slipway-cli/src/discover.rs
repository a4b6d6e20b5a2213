use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use slipway_admission::ComposeDescriptor;

/// One manifest document discovered on disk, with its optional compose
/// sidecar (`<stem>.compose.yaml` next to the manifest).
#[derive(Debug)]
pub struct ManifestFile {
    pub path: PathBuf,
    pub document: String,
    pub compose: Option<ComposeDescriptor>,
}

impl ManifestFile {
    /// A short name for messages when the manifest itself cannot be parsed.
    pub fn display_name(&self) -> String {
        self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Expands manifest paths: files are taken as-is, directories expand to
/// their sorted `*.yaml`/`*.yml` entries. Compose sidecars are attached,
/// never treated as manifests themselves.
pub fn discover(paths: &[String]) -> Result<Vec<ManifestFile>> {
    let mut files = Vec::new();
    for path in paths {
        let path = Path::new(path);
        if path.is_dir() {
            let mut entries: Vec<PathBuf> = fs::read_dir(path)
                .with_context(|| format!("Cannot read directory {}", path.display()))?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| is_manifest_candidate(p))
                .collect();
            entries.sort();
            for entry in entries {
                files.push(load_one(&entry)?);
            }
        } else {
            files.push(load_one(path)?);
        }
    }
    Ok(files)
}

fn is_manifest_candidate(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    let is_yaml = name.ends_with(".yaml") || name.ends_with(".yml");
    let is_sidecar = name.contains(".compose.");
    is_yaml && !is_sidecar
}

fn load_one(path: &Path) -> Result<ManifestFile> {
    let document = fs::read_to_string(path)
        .with_context(|| format!("Cannot read manifest {}", path.display()))?;
    let compose = load_sidecar(path)?;
    Ok(ManifestFile {
        path: path.to_path_buf(),
        document,
        compose,
    })
}

fn load_sidecar(path: &Path) -> Result<Option<ComposeDescriptor>> {
    let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
        return Ok(None);
    };
    for ext in ["yaml", "yml"] {
        let sidecar = path.with_file_name(format!("{stem}.compose.{ext}"));
        if sidecar.exists() {
            let content = fs::read_to_string(&sidecar)
                .with_context(|| format!("Cannot read compose sidecar {}", sidecar.display()))?;
            let descriptor = ComposeDescriptor::from_yaml(&content)
                .with_context(|| format!("Cannot parse compose sidecar {}", sidecar.display()))?;
            return Ok(Some(descriptor));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write(dir: &Path, name: &str, content: &str) {
        let mut file = fs::File::create(dir.join(name)).unwrap();
        file.write_all(content.as_bytes()).unwrap();
    }

    #[test]
    fn test_directory_expands_sorted_and_skips_sidecars() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "zeta.yaml", "kind: Application");
        write(dir.path(), "alpha.yaml", "kind: Application");
        write(dir.path(), "alpha.compose.yaml", "services: {}");
        write(dir.path(), "notes.txt", "not a manifest");

        let files = discover(&[dir.path().display().to_string()]).unwrap();
        let names: Vec<String> = files.iter().map(|f| f.display_name()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
        assert!(files[0].compose.is_some(), "sidecar attaches to alpha");
        assert!(files[1].compose.is_none());
    }

    #[test]
    fn test_single_file_with_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "demo.yaml", "kind: Application");
        write(
            dir.path(),
            "demo.compose.yml",
            "services:\n  web:\n    privileged: true\n",
        );

        let files = discover(&[dir.path().join("demo.yaml").display().to_string()]).unwrap();
        assert_eq!(files.len(), 1);
        let compose = files[0].compose.as_ref().unwrap();
        assert!(compose.services["web"].is_privileged());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(discover(&["does-not-exist.yaml".to_string()]).is_err());
    }
}
