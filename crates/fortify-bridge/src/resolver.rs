//! Library location resolution
//!
//! The resolver only observes the filesystem: it never creates or mutates
//! anything, and for a fixed filesystem state and hint it always returns the
//! same location.

use fortify_logger as logger;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Where the composed script should load the library from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryLocation {
    /// An existing directory, from the hint or the candidate search
    Found(PathBuf),
    /// Skip the path stage and load the installed package by name
    UseInstalled,
    /// Nothing was found; a best-guess ancestor of the install location
    Fallback(PathBuf),
}

impl LibraryLocation {
    /// The embedded path, if this location has one
    pub fn path(&self) -> Option<&Path> {
        match self {
            LibraryLocation::Found(path) | LibraryLocation::Fallback(path) => Some(path),
            LibraryLocation::UseInstalled => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            LibraryLocation::Found(_) => "found",
            LibraryLocation::UseInstalled => "installed package",
            LibraryLocation::Fallback(_) => "fallback",
        }
    }
}

impl std::fmt::Display for LibraryLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.path() {
            Some(path) => write!(f, "{} ({})", path.display(), self.kind()),
            None => write!(f, "{}", self.kind()),
        }
    }
}

/// Searches the conventional locations for the callee library
#[derive(Debug, Clone)]
pub struct LibraryResolver {
    package_name: String,
    cwd: PathBuf,
    install_dir: PathBuf,
    prefer_installed: bool,
}

impl LibraryResolver {
    pub fn new(
        package_name: impl Into<String>,
        cwd: impl Into<PathBuf>,
        install_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            package_name: package_name.into(),
            cwd: cwd.into(),
            install_dir: install_dir.into(),
            prefer_installed: false,
        }
    }

    /// Resolver rooted at the working directory and the running executable's directory
    pub fn from_env(package_name: impl Into<String>) -> io::Result<Self> {
        let cwd = std::env::current_dir()?;
        let install_dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| cwd.clone());
        Ok(Self::new(package_name, cwd, install_dir))
    }

    /// Resolve to [`LibraryLocation::UseInstalled`] when no usable hint exists
    pub fn prefer_installed(mut self, prefer: bool) -> Self {
        self.prefer_installed = prefer;
        self
    }

    /// Candidate locations in probe order
    pub fn candidates(&self) -> Vec<PathBuf> {
        let modules = Path::new("node_modules").join(&self.package_name);
        let cwd = &self.cwd;
        let install = &self.install_dir;

        vec![
            cwd.join(&modules),
            cwd.join("..").join(&modules),
            cwd.join("..").join("..").join(&modules),
            install.join("..").join(&modules),
            install.join("..").join("..").join(&modules),
            cwd.join("dist"),
            cwd.join("..").join("dist"),
            cwd.join("lib"),
            cwd.join("..").join("lib"),
            cwd.join("src"),
            cwd.join("..").join("src"),
        ]
    }

    /// Location used when no candidate exists
    pub fn fallback(&self) -> PathBuf {
        normalize(&self.install_dir.join("..").join(".."))
    }

    pub fn resolve(&self, hint: Option<&Path>) -> LibraryLocation {
        if let Some(hint) = hint {
            let path = self.absolute(hint);
            if path.exists() {
                logger::debug(&format!("Using library path hint: {}", path.display()));
                return LibraryLocation::Found(path);
            }
            logger::warn(&format!(
                "Library path {} does not exist, searching default locations",
                hint.display()
            ));
        }

        if self.prefer_installed {
            logger::debug(&format!(
                "Loading installed package '{}' by name",
                self.package_name
            ));
            return LibraryLocation::UseInstalled;
        }

        for candidate in self.candidates() {
            if candidate.exists() {
                let path = normalize(&candidate);
                logger::debug(&format!("Found {} library at: {}", self.package_name, path.display()));
                return LibraryLocation::Found(path);
            }
        }

        let fallback = self.fallback();
        logger::warn(&format!(
            "Could not find {} library, using default path: {}",
            self.package_name,
            fallback.display()
        ));
        LibraryLocation::Fallback(fallback)
    }

    fn absolute(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            normalize(path)
        } else {
            normalize(&self.cwd.join(path))
        }
    }
}

/// Lexically fold `.` and `..` components without touching the filesystem
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(
                    normalized.components().next_back(),
                    Some(Component::Normal(_))
                );
                if can_pop {
                    normalized.pop();
                } else if !normalized.has_root() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
