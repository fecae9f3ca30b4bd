//! Command implementations.

pub mod profiles;
pub mod translate;

pub use profiles::run_profiles;
pub use translate::run_translate;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use fg_translation::{ActionRegistry, InMemoryProfileRepository, ProfileRepository, TranslationProfile};
use serde::Deserialize;
use tracing::debug;

use crate::{CliConfig, CliError, CliResult};

/// A profile file holds one definition or an array of them.
#[derive(Deserialize)]
#[serde(untagged)]
enum ProfileFile {
    Many(Vec<TranslationProfile>),
    One(TranslationProfile),
}

/// Loaded profiles plus what is needed to compile them.
pub struct Workspace {
    /// Loaded profile definitions.
    pub repository: Arc<dyn ProfileRepository>,
    /// Built-in actions.
    pub registry: Arc<ActionRegistry>,
    /// Gateway configuration.
    pub config: CliConfig,
}

impl Workspace {
    /// Loads profile definitions from files and directories.
    pub fn load(paths: &[PathBuf], config: CliConfig) -> CliResult<Self> {
        Ok(Self {
            repository: load_profiles(paths)?.into_shared(),
            registry: Arc::new(ActionRegistry::with_builtin_actions()),
            config,
        })
    }
}

/// Loads profile definitions into a repository.
///
/// A directory contributes its `*.json` files in name order. Two definitions
/// with the same name are rejected.
pub fn load_profiles(paths: &[PathBuf]) -> CliResult<InMemoryProfileRepository> {
    let repository = InMemoryProfileRepository::new();
    for file in profile_files(paths)? {
        let content = std::fs::read_to_string(&file)?;
        let parsed: ProfileFile = serde_json::from_str(&content).map_err(|e| {
            CliError::Config(format!("{}: invalid profile definition: {e}", file.display()))
        })?;
        let profiles = match parsed {
            ProfileFile::Many(profiles) => profiles,
            ProfileFile::One(profile) => vec![profile],
        };
        for profile in profiles {
            if repository.get_profile(&profile.name)?.is_some() {
                return Err(CliError::Config(format!(
                    "{}: duplicate profile '{}'",
                    file.display(),
                    profile.name
                )));
            }
            debug!(profile = %profile.name, file = %file.display(), "loaded translation profile");
            repository.add(profile);
        }
    }
    Ok(repository)
}

fn profile_files(paths: &[PathBuf]) -> CliResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut entries = std::fs::read_dir(path)?
                .map(|entry| entry.map(|e| e.path()))
                .collect::<Result<Vec<_>, _>>()?;
            entries.retain(|p| is_json(p));
            entries.sort();
            files.extend(entries);
        } else {
            files.push(path.clone());
        }
    }
    Ok(files)
}

fn is_json(path: &Path) -> bool {
    path.is_file() && path.extension().is_some_and(|ext| ext == "json")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn loads_single_and_array_files() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b.json", r#"[{"name": "b1"}, {"name": "b2"}]"#);
        write(dir.path(), "a.json", r#"{"name": "a"}"#);
        write(dir.path(), "notes.txt", "ignored");

        let repository = load_profiles(&[dir.path().to_path_buf()]).unwrap();
        let names: Vec<String> = repository
            .list_profiles()
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["a", "b1", "b2"]);
    }

    #[test]
    fn rejects_duplicate_names() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(dir.path(), "a.json", r#"{"name": "ldap"}"#);
        let b = write(dir.path(), "b.json", r#"{"name": "ldap"}"#);

        let err = load_profiles(&[a, b]).err().unwrap();
        assert!(err.to_string().contains("duplicate profile 'ldap'"));
    }

    #[test]
    fn reports_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let bad = write(dir.path(), "bad.json", r#"{"rules": 1}"#);

        let err = load_profiles(&[bad]).err().unwrap();
        assert!(matches!(err, CliError::Config(ref m) if m.contains("bad.json")));
    }
}
