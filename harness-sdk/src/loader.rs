//! Contract source loading.
//!
//! A contract is compiled from its main source plus every file it includes.
//! The compiler cannot read the harness's disk, so includes are collected
//! into a map keyed by the include path exactly as written in the source.

use crate::error::{SdkError, SdkResult};
use harness_rpc::{include_directives, is_stdlib_include, SourceUnit};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Source text of a contract with its resolved includes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractArtifact {
    source_path: PathBuf,
    source: String,
    file_system: BTreeMap<String, String>,
}

impl ContractArtifact {
    /// Reads `path` and, recursively, every non-stdlib file it includes.
    ///
    /// # Errors
    ///
    /// `SdkError::Load` naming the missing file and, for includes, the file
    /// that included it.
    pub fn load<P: AsRef<Path>>(path: P) -> SdkResult<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|e| SdkError::load(path, e.to_string()))?;

        let mut file_system = BTreeMap::new();
        let mut visited = HashSet::new();
        visited.insert(canonical(path));
        collect_includes(path, &source, &mut file_system, &mut visited)?;

        debug!(
            target: "harness_sdk",
            source = %path.display(),
            includes = file_system.len(),
            "loaded contract source"
        );

        Ok(Self {
            source_path: path.to_path_buf(),
            source,
            file_system,
        })
    }

    /// Builds an artifact from in-memory text; includes are taken as given.
    #[must_use]
    pub fn from_source<S: Into<String>>(source: S, file_system: BTreeMap<String, String>) -> Self {
        Self {
            source_path: PathBuf::from("<memory>"),
            source: source.into(),
            file_system,
        }
    }

    #[must_use]
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Include path as written -> file contents.
    #[must_use]
    pub const fn file_system(&self) -> &BTreeMap<String, String> {
        &self.file_system
    }

    /// Borrowed view handed to the compiler.
    #[must_use]
    pub fn source_unit(&self) -> SourceUnit<'_> {
        SourceUnit {
            code: &self.source,
            file_system: &self.file_system,
        }
    }
}

fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

fn collect_includes(
    includer: &Path,
    source: &str,
    file_system: &mut BTreeMap<String, String>,
    visited: &mut HashSet<PathBuf>,
) -> SdkResult<()> {
    let dir = includer.parent().unwrap_or_else(|| Path::new("."));
    let includes =
        include_directives(source).map_err(|e| SdkError::load(includer, e.to_string()))?;
    for include in includes {
        let resolved = dir.join(&include);
        if is_stdlib_include(&include) && !resolved.is_file() {
            continue;
        }
        if !visited.insert(canonical(&resolved)) {
            continue;
        }

        let text = fs::read_to_string(&resolved).map_err(|e| SdkError::Load {
            path: resolved.clone(),
            includer: Some(includer.to_path_buf()),
            message: e.to_string(),
        })?;
        collect_includes(&resolved, &text, file_system, visited)?;
        file_system.insert(include, text);
    }
    Ok(())
}
