//! Path resolution for `import("...")` expressions
//!
//! Turns an import path string, written relative to the importing module's directory, into the
//! canonical [`ModuleKey`] of the target file.
//!
//! ## Rules
//!
//! - `\` is accepted as a separator and normalized to `/`.
//! - `.` segments and empty segments are dropped; `..` removes the previous segment.
//! - The result must stay inside the project root.
//! - The module extension (`hash` unless configured otherwise) is appended when the final segment
//!   does not already carry it, so `lib/a` and `./lib/a.hash` name the same module.
//! - Normalization is lexical: the filesystem is never consulted and symlinks are not followed.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hashc::frontend::resolver::{PathResolver, ResolverConfig};
//!
//! let resolver = PathResolver::new(ResolverConfig::new("/project"))?;
//! let key = resolver.resolve(Path::new("/project/src"), "../lib/a")?;
//! assert_eq!(key.relative(), "lib/a.hash");
//! ```

use std::path::{Component, Path, PathBuf};

use super::errors::PathError;
use super::module::ModuleKey;

/// Default extension of Hash source files.
pub const DEFAULT_EXTENSION: &str = "hash";

/// Characters that may not appear in an import path.
const UNSUPPORTED_CHARACTERS: &[char] = &['*', '?', '"', '<', '>', '|', ':'];

/// Configuration for a compilation run's path resolution.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Directory no import may escape. Must be absolute.
    pub project_root: PathBuf,
    /// Extension of module files, without the leading dot.
    pub extension: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("/"),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }
}

impl ResolverConfig {
    /// Create a config for the given project root with default settings.
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            ..Self::default()
        }
    }

    /// Set the module file extension (a leading `.` is ignored).
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        let extension = extension.into();
        self.extension = extension.trim_start_matches('.').to_string();
        self
    }
}

/// Resolves import paths to [`ModuleKey`]s for one project root.
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
    extension: String,
}

impl PathResolver {
    /// ## Errors
    /// [`PathError::RelativeRoot`] if the configured root is not absolute.
    pub fn new(config: ResolverConfig) -> Result<Self, PathError> {
        if !config.project_root.is_absolute() {
            return Err(PathError::RelativeRoot(config.project_root));
        }
        Ok(Self {
            root: normalize(&config.project_root),
            extension: config.extension,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Resolve `raw_path` as written inside a module living in `importer_dir`.
    ///
    /// ## Errors
    /// - [`PathError::Empty`], [`PathError::Absolute`] or [`PathError::UnsupportedCharacter`] for
    ///   malformed paths
    /// - [`PathError::NotAFile`] if the final segment is empty, `.` or `..`
    /// - [`PathError::EscapesRoot`] if the importer or the result lies outside the project root
    pub fn resolve(&self, importer_dir: &Path, raw_path: &str) -> Result<ModuleKey, PathError> {
        if raw_path.is_empty() {
            return Err(PathError::Empty);
        }
        if let Some(c) = raw_path
            .chars()
            .find(|c| c.is_control() || UNSUPPORTED_CHARACTERS.contains(c))
        {
            return Err(PathError::UnsupportedCharacter(c));
        }

        let raw_path = raw_path.replace('\\', "/");
        if raw_path.starts_with('/') {
            return Err(PathError::Absolute);
        }
        if matches!(raw_path.rsplit('/').next(), Some("" | "." | "..")) {
            return Err(PathError::NotAFile);
        }

        let mut segments = self.segments_within_root(importer_dir)?;
        self.push_segments(&mut segments, raw_path.split('/'))?;
        self.key_for(segments)
    }

    /// Key of a compilation entry point, given absolute or relative to the project root.
    pub fn entry(&self, path: &Path) -> Result<ModuleKey, PathError> {
        let absolute = if path.is_absolute() {
            normalize(path)
        } else {
            normalize(&self.root.join(path))
        };
        let segments = self.segments_within_root(&absolute)?;
        self.key_for(segments)
    }

    /// Segments of `dir` relative to the root.
    fn segments_within_root(&self, dir: &Path) -> Result<Vec<String>, PathError> {
        let dir = normalize(dir);
        let relative = dir
            .strip_prefix(&self.root)
            .map_err(|_| PathError::EscapesRoot(self.root.clone()))?;
        Ok(relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect())
    }

    fn push_segments<'s>(
        &self,
        segments: &mut Vec<String>,
        parts: impl Iterator<Item = &'s str>,
    ) -> Result<(), PathError> {
        for part in parts {
            match part {
                "" | "." => {}
                ".." => {
                    if segments.pop().is_none() {
                        return Err(PathError::EscapesRoot(self.root.clone()));
                    }
                }
                name => segments.push(name.to_string()),
            }
        }
        Ok(())
    }

    fn key_for(&self, mut segments: Vec<String>) -> Result<ModuleKey, PathError> {
        let Some(last) = segments.last_mut() else {
            return Err(PathError::NotAFile);
        };
        let suffix = format!(".{}", self.extension);
        if !last.ends_with(&suffix) || last.len() == suffix.len() {
            last.push_str(&suffix);
        }

        let path = segments
            .iter()
            .fold(self.root.clone(), |path, segment| path.join(segment));
        Ok(ModuleKey::new(path, segments.join("/")))
    }
}

/// Lexically normalize a path: drop `.`, apply `..`, keep the root.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
