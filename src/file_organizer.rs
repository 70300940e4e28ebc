/// Moving files whose names contain a search text into a target subfolder.
///
/// This module scans the immediate entries of a directory, keeps the files
/// whose names contain the search text (case-insensitively), creates the
/// target subfolder when needed, and moves each match into it. Name collisions
/// inside the target are resolved by appending `_<n>` to the file stem, so an
/// existing file is never replaced.
use crate::config::CompiledFilters;
use std::collections::HashSet;
use std::ffi::{OsStr, OsString};
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, trace, warn};

/// Errors that can occur while organizing a directory.
///
/// Every variant except [`OrganizeError::FileMoveFailed`] is a precondition
/// failure and aborts the run before any file is moved.
#[derive(Debug, Error)]
pub enum OrganizeError {
    /// The source directory does not exist.
    #[error("Directory {} does not exist", .path.display())]
    DirectoryNotFound { path: PathBuf },
    /// The source path exists but is not a directory.
    #[error("{} is not a directory", .path.display())]
    NotADirectory { path: PathBuf },
    /// The target folder name is not a single path segment.
    #[error("Invalid target folder name '{name}': {reason}")]
    InvalidTargetName { name: String, reason: &'static str },
    /// Failed to create the target folder.
    #[error("Failed to create directory {}: {source}", .path.display())]
    TargetCreationFailed { path: PathBuf, source: io::Error },
    /// Failed to read the source directory.
    #[error("Error reading directory {}: {source}", .path.display())]
    ReadDirFailed { path: PathBuf, source: io::Error },
    /// Failed to move a single file. Recorded per file, never fatal.
    #[error("Failed to move {} to {}: {error}", .file.display(), .destination.display())]
    FileMoveFailed {
        file: PathBuf,
        destination: PathBuf,
        #[source]
        error: io::Error,
    },
}

/// Result type for file organization operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// The three inputs of a single organize run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizeRequest {
    /// Directory whose immediate entries are scanned.
    pub directory: PathBuf,
    /// Text looked up in each file name, ignoring case.
    pub search_text: String,
    /// Name of the subfolder of `directory` that receives matches.
    pub target_folder: String,
}

impl OrganizeRequest {
    /// Creates a new request.
    pub fn new(
        directory: impl Into<PathBuf>,
        search_text: impl Into<String>,
        target_folder: impl Into<String>,
    ) -> Self {
        Self {
            directory: directory.into(),
            search_text: search_text.into(),
            target_folder: target_folder.into(),
        }
    }
}

/// A file selected for moving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// The file name, lossily converted for display.
    pub name: String,
    /// The full path to the file.
    pub path: PathBuf,
}

/// A validated run: the target folder exists (unless dry-run) and the
/// candidates are known.
#[derive(Debug)]
pub struct PreparedRun {
    /// The folder candidates are moved into.
    pub target_dir: PathBuf,
    /// Matching files, sorted by name.
    pub candidates: Vec<Candidate>,
}

/// The outcome of moving one candidate.
#[derive(Debug)]
pub struct MoveOutcome {
    /// The path the file was (or would have been) moved from.
    pub source: PathBuf,
    /// The final destination on success, or the reason it failed.
    pub result: Result<PathBuf, OrganizeError>,
}

/// Aggregated outcome of one organize run.
#[derive(Debug)]
pub struct OrganizeReport {
    /// The target folder files were moved into.
    pub target_path: PathBuf,
    /// `(source, destination)` for every successful move.
    pub moved: Vec<(PathBuf, PathBuf)>,
    /// `(source, reason)` for every failed move.
    pub failed: Vec<(PathBuf, String)>,
    /// Whether the run was simulated.
    pub dry_run: bool,
}

impl OrganizeReport {
    fn new(target_path: PathBuf, dry_run: bool) -> Self {
        Self {
            target_path,
            moved: Vec::new(),
            failed: Vec::new(),
            dry_run,
        }
    }

    fn record(&mut self, outcome: &MoveOutcome) {
        match &outcome.result {
            Ok(destination) => self
                .moved
                .push((outcome.source.clone(), destination.clone())),
            Err(e) => self.failed.push((outcome.source.clone(), e.to_string())),
        }
    }

    /// Number of files successfully moved.
    pub fn moved_count(&self) -> usize {
        self.moved.len()
    }

    /// Returns true if no candidate failed.
    pub fn is_complete_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Returns true if `file_name` contains `search_text`, ignoring case.
///
/// An empty search text matches every name.
///
/// # Examples
///
/// ```
/// use filegroup::file_organizer::matches_search_text;
///
/// assert!(matches_search_text("ABC_front_1.png", "front"));
/// assert!(!matches_search_text("abc.png", "front"));
/// ```
pub fn matches_search_text(file_name: &str, search_text: &str) -> bool {
    file_name
        .to_lowercase()
        .contains(&search_text.to_lowercase())
}

/// Returns true if the immediate parent directory of `path` is named `target_folder`.
fn parent_is_target(path: &Path, target_folder: &str) -> bool {
    path.parent()
        .and_then(Path::file_name)
        .is_some_and(|name| name == OsStr::new(target_folder))
}

/// Returns true if nothing occupies `path` and it has not been handed out yet.
fn is_free(path: &Path, reserved: &HashSet<PathBuf>) -> bool {
    // symlink_metadata so a dangling link still counts as occupied
    !reserved.contains(path) && fs::symlink_metadata(path).is_err()
}

/// Computes a destination inside `target_dir` that does not collide with anything.
///
/// Returns `target_dir/file_name` when free. Otherwise `_1`, `_2`, ... is
/// appended to the stem, keeping the extension, until a free name is found.
/// Paths in `reserved` are treated as taken even if they do not exist yet.
///
/// # Examples
///
/// - `scan.png` → `scan_1.png`, `scan_2.png`, ...
/// - `.env` → `.env_1`
/// - `archive.tar.gz` → `archive.tar_1.gz`
pub fn resolve_destination(
    target_dir: &Path,
    file_name: &OsStr,
    reserved: &HashSet<PathBuf>,
) -> PathBuf {
    let candidate = target_dir.join(file_name);
    if is_free(&candidate, reserved) {
        return candidate;
    }

    let base = Path::new(file_name);
    let stem = base.file_stem().unwrap_or(file_name);
    let extension = base.extension();

    let mut counter: u64 = 1;
    loop {
        let mut name = OsString::from(stem);
        name.push(format!("_{counter}"));
        if let Some(ext) = extension {
            name.push(".");
            name.push(ext);
        }

        let candidate = target_dir.join(&name);
        if is_free(&candidate, reserved) {
            return candidate;
        }
        trace!(
            name = ?name,
            dir = %target_dir.display(),
            "Destination taken, trying next suffix"
        );
        counter += 1;
    }
}

/// Moves `src` to `dest`.
///
/// Tries an atomic rename first. If source and destination live on different
/// filesystems the file is copied to a newly created `dest` and the source is
/// removed afterwards.
pub fn move_file(src: &Path, dest: &Path) -> io::Result<()> {
    match fs::rename(src, dest) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            warn!(
                src = %src.display(),
                dest = %dest.display(),
                error = %e,
                "Atomic rename not possible, copying instead"
            );
            copy_then_remove(src, dest)
        }
        Err(e) => Err(e),
    }
}

fn copy_then_remove(src: &Path, dest: &Path) -> io::Result<()> {
    if fs::symlink_metadata(src)?.file_type().is_symlink() {
        return relink_then_remove(src, dest);
    }

    let mut reader = fs::File::open(src)?;
    // create_new: never clobber something that appeared at dest meanwhile
    let mut writer = OpenOptions::new().write(true).create_new(true).open(dest)?;

    let copied = io::copy(&mut reader, &mut writer)
        .and_then(|_| writer.sync_all())
        .and_then(|()| {
            let permissions = reader.metadata()?.permissions();
            fs::set_permissions(dest, permissions)
        });

    if let Err(e) = copied {
        drop(writer);
        if let Err(cleanup) = fs::remove_file(dest) {
            debug!(dest = %dest.display(), error = %cleanup, "Could not remove partial copy");
        }
        return Err(e);
    }

    fs::remove_file(src)
}

/// Recreates the link `src` at `dest` with the same target, then removes `src`.
fn relink_then_remove(src: &Path, dest: &Path) -> io::Result<()> {
    let link_target = fs::read_link(src)?;
    create_symlink(&link_target, dest)?;
    fs::remove_file(src)
}

#[cfg(unix)]
fn create_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn create_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(target, link)
}

#[cfg(not(any(unix, windows)))]
fn create_symlink(_target: &Path, _link: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "symbolic links are not supported on this platform",
    ))
}

/// Moves files that match a search text into a target subfolder.
///
/// Holds the options that stay fixed for a run: the exclusion filters and
/// whether moves are only simulated.
#[derive(Default)]
pub struct FileOrganizer {
    filters: CompiledFilters,
    dry_run: bool,
}

impl FileOrganizer {
    /// Creates an organizer with the given filters.
    ///
    /// With `dry_run` set, nothing on disk is created or moved; outcomes
    /// report where each file would go.
    pub fn new(filters: CompiledFilters, dry_run: bool) -> Self {
        Self { filters, dry_run }
    }

    /// Returns true if this organizer only simulates moves.
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Checks that `directory` exists and is a directory.
    pub fn validate_directory(directory: &Path) -> OrganizeResult<()> {
        let metadata = match fs::metadata(directory) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(OrganizeError::DirectoryNotFound {
                    path: directory.to_path_buf(),
                });
            }
            Err(e) => {
                return Err(OrganizeError::ReadDirFailed {
                    path: directory.to_path_buf(),
                    source: e,
                });
            }
        };

        if !metadata.is_dir() {
            return Err(OrganizeError::NotADirectory {
                path: directory.to_path_buf(),
            });
        }

        Ok(())
    }

    /// Checks that `name` is a single, ordinary path segment.
    ///
    /// Rejects empty names, `.`, `..`, absolute paths, and anything containing
    /// a path separator of the current platform (`/`, plus `\` on Windows).
    pub fn validate_target_name(name: &str) -> OrganizeResult<()> {
        let invalid = |reason| OrganizeError::InvalidTargetName {
            name: name.to_string(),
            reason,
        };

        if name.is_empty() {
            return Err(invalid("name is empty"));
        }
        if name.chars().any(std::path::is_separator) {
            return Err(invalid("name must not contain path separators"));
        }

        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(()),
            _ => Err(invalid("name must be a single folder name")),
        }
    }

    /// Creates `directory/target_folder` unless it already exists.
    ///
    /// Returns the target path. In dry-run mode nothing is created, but the
    /// path is still checked so a dry run fails exactly where a real one would.
    ///
    /// # Errors
    ///
    /// Returns `TargetCreationFailed` if the folder cannot be created, which
    /// includes the name being taken by something that is not a directory.
    pub fn prepare_target(
        &self,
        directory: &Path,
        target_folder: &str,
    ) -> OrganizeResult<PathBuf> {
        let target_path = directory.join(target_folder);

        if self.dry_run {
            // only an existing directory can be reused, as below
            if fs::symlink_metadata(&target_path).is_ok() && !target_path.is_dir() {
                return Err(OrganizeError::TargetCreationFailed {
                    path: target_path,
                    source: io::Error::new(
                        io::ErrorKind::AlreadyExists,
                        "path exists and is not a directory",
                    ),
                });
            }
            debug!(path = %target_path.display(), "dry-run: not creating target folder");
            return Ok(target_path);
        }

        match fs::create_dir(&target_path) {
            Ok(()) => {
                info!(path = %target_path.display(), "Created target folder");
                Ok(target_path)
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists && target_path.is_dir() => {
                debug!(path = %target_path.display(), "Target folder already exists");
                Ok(target_path)
            }
            Err(e) => Err(OrganizeError::TargetCreationFailed {
                path: target_path,
                source: e,
            }),
        }
    }

    /// Validates `request`, creates the target folder and scans for matches.
    ///
    /// Everything that can abort a run happens here; what is left is
    /// [`FileOrganizer::move_candidates`], which never fails as a whole.
    pub fn prepare(&self, request: &OrganizeRequest) -> OrganizeResult<PreparedRun> {
        Self::validate_directory(&request.directory)?;
        Self::validate_target_name(&request.target_folder)?;

        let target_dir = self.prepare_target(&request.directory, &request.target_folder)?;
        let candidates = self.scan(
            &request.directory,
            &request.search_text,
            &request.target_folder,
        )?;

        Ok(PreparedRun {
            target_dir,
            candidates,
        })
    }

    /// Lists the files directly inside `directory` that should be moved.
    ///
    /// A file qualifies when its name contains `search_text` (ignoring case),
    /// its parent directory is not itself named `target_folder`, and the
    /// configured filters do not exclude it. Subdirectories are never entered.
    /// Candidates are returned sorted by name.
    ///
    /// # Errors
    ///
    /// Returns `ReadDirFailed` if the directory cannot be listed. Individual
    /// entries that cannot be read are skipped.
    pub fn scan(
        &self,
        directory: &Path,
        search_text: &str,
        target_folder: &str,
    ) -> OrganizeResult<Vec<Candidate>> {
        let entries = fs::read_dir(directory).map_err(|e| OrganizeError::ReadDirFailed {
            path: directory.to_path_buf(),
            source: e,
        })?;

        let mut candidates = Vec::new();

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!(error = %e, "Skipping unreadable directory entry");
                    continue;
                }
            };

            let path = entry.path();
            // Follows symlinks, so a link to a regular file is a candidate too.
            if !path.is_file() {
                continue;
            }

            let name = entry.file_name().to_string_lossy().into_owned();
            if !matches_search_text(&name, search_text) {
                continue;
            }

            if parent_is_target(&path, target_folder) {
                debug!(file = %name, "Already inside target folder, skipping");
                continue;
            }

            if !self.filters.should_include(&path) {
                debug!(file = %name, "Excluded by filters");
                continue;
            }

            candidates.push(Candidate { name, path });
        }

        candidates.sort_by(|a, b| a.name.cmp(&b.name));
        debug!(
            directory = %directory.display(),
            count = candidates.len(),
            "Scan complete"
        );

        Ok(candidates)
    }

    /// Moves every candidate into `target_dir`, one at a time.
    ///
    /// A failure on one file is recorded and the batch continues.
    /// `on_outcome` is called once per candidate, in order.
    pub fn move_candidates<F>(
        &self,
        target_dir: &Path,
        candidates: &[Candidate],
        on_outcome: F,
    ) -> OrganizeReport
    where
        F: FnMut(&MoveOutcome),
    {
        self.move_candidates_with(target_dir, candidates, on_outcome, move_file)
    }

    fn move_candidates_with<F, M>(
        &self,
        target_dir: &Path,
        candidates: &[Candidate],
        mut on_outcome: F,
        mut mover: M,
    ) -> OrganizeReport
    where
        F: FnMut(&MoveOutcome),
        M: FnMut(&Path, &Path) -> io::Result<()>,
    {
        let mut report = OrganizeReport::new(target_dir.to_path_buf(), self.dry_run);
        // Destinations handed out during a dry run, which never hit the disk.
        let mut reserved = HashSet::new();

        for candidate in candidates {
            let result = match candidate.path.file_name() {
                None => Err(OrganizeError::FileMoveFailed {
                    file: candidate.path.clone(),
                    destination: target_dir.to_path_buf(),
                    error: io::Error::new(
                        io::ErrorKind::InvalidInput,
                        "file has no name component",
                    ),
                }),
                Some(file_name) => {
                    let destination = resolve_destination(target_dir, file_name, &reserved);
                    if self.dry_run {
                        reserved.insert(destination.clone());
                        Ok(destination)
                    } else {
                        match mover(&candidate.path, &destination) {
                            Ok(()) => Ok(destination),
                            Err(e) => Err(OrganizeError::FileMoveFailed {
                                file: candidate.path.clone(),
                                destination,
                                error: e,
                            }),
                        }
                    }
                }
            };

            match &result {
                Ok(destination) => info!(
                    src = %candidate.path.display(),
                    dest = %destination.display(),
                    dry_run = self.dry_run,
                    "Moved file"
                ),
                Err(e) => debug!(src = %candidate.path.display(), error = %e, "Move failed"),
            }

            let outcome = MoveOutcome {
                source: candidate.path.clone(),
                result,
            };
            report.record(&outcome);
            on_outcome(&outcome);
        }

        report
    }

    /// Runs the whole procedure for `request`.
    ///
    /// Validates the inputs, creates the target folder, scans, and moves each
    /// match. `on_outcome` receives every per-file outcome as it happens.
    ///
    /// # Errors
    ///
    /// Only precondition failures are returned; per-file failures end up in
    /// [`OrganizeReport::failed`].
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use filegroup::file_organizer::{FileOrganizer, OrganizeRequest};
    ///
    /// let request = OrganizeRequest::new("/path/to/scans", "front", "front");
    /// match FileOrganizer::default().organize(&request, |_| {}) {
    ///     Ok(report) => println!("Moved {} files", report.moved_count()),
    ///     Err(e) => eprintln!("Organization failed: {}", e),
    /// }
    /// ```
    pub fn organize<F>(
        &self,
        request: &OrganizeRequest,
        on_outcome: F,
    ) -> OrganizeResult<OrganizeReport>
    where
        F: FnMut(&MoveOutcome),
    {
        self.organize_with(request, on_outcome, move_file)
    }

    fn organize_with<F, M>(
        &self,
        request: &OrganizeRequest,
        on_outcome: F,
        mover: M,
    ) -> OrganizeResult<OrganizeReport>
    where
        F: FnMut(&MoveOutcome),
        M: FnMut(&Path, &Path) -> io::Result<()>,
    {
        let run = self.prepare(request)?;
        Ok(self.move_candidates_with(&run.target_dir, &run.candidates, on_outcome, mover))
    }
}
