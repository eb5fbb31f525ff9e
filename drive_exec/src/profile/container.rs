//! Preloading of motion profiles from disk

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, warn};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

// Internal
use super::MotionProfile;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Default file name suffix identifying left-side profile files.
pub const DEFAULT_LEFT_SUFFIX: &str = "_left.csv";

/// Default file name suffix identifying right-side profile files.
pub const DEFAULT_RIGHT_SUFFIX: &str = "_right.csv";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The pair of side profiles making up one drivetrain trajectory.
#[derive(Debug, Clone)]
pub struct ProfilePair {
    /// The left-side profile
    pub left: Arc<MotionProfile>,

    /// The right-side profile
    pub right: Arc<MotionProfile>,
}

/// Preloads motion profile pairs from a directory so they are quickly
/// accessible at run time.
///
/// The directory should contain profile CSV files where each profile named
/// `name` is stored as `name_left.csv` and `name_right.csv`. Profiles with
/// only one side file present are skipped with a warning. Each CSV file is
/// expected to carry a header row naming the [`Point`](super::Point) fields
/// (`dt,x,y,position,velocity,acceleration,jerk,heading`), one sample per
/// row.
///
/// Loading all profiles up front can take some time for large profile sets;
/// the container is immutable afterwards.
#[derive(Debug, Clone)]
pub struct ProfileContainer {
    profiles: HashMap<String, ProfilePair>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// An error that occurs while loading profiles from disk.
#[derive(Debug, Error)]
pub enum ProfileLoadError {
    #[error("Profile directory {0:?} is not a directory")]
    NotADirectory(PathBuf),

    #[error("IO error while scanning the profile directory: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Cannot read profile file {path:?}: {source}")]
    CsvError {
        path: PathBuf,
        source: csv::Error,
    },

    #[error("Profile file {0:?} contains no points")]
    EmptyProfile(PathBuf),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ProfileContainer {
    /// Load all profile pairs from the given directory using the default
    /// file name suffixes.
    pub fn from_dir<P: AsRef<Path>>(profile_dir: P) -> Result<Self, ProfileLoadError> {
        Self::with_suffixes(profile_dir, DEFAULT_LEFT_SUFFIX, DEFAULT_RIGHT_SUFFIX)
    }

    /// Load all profile pairs from the given directory using the provided
    /// file name suffixes.
    pub fn with_suffixes<P: AsRef<Path>>(
        profile_dir: P,
        left_suffix: &str,
        right_suffix: &str,
    ) -> Result<Self, ProfileLoadError> {
        let profile_dir = profile_dir.as_ref();

        if !profile_dir.is_dir() {
            return Err(ProfileLoadError::NotADirectory(profile_dir.to_path_buf()));
        }

        // Collect side files by profile name
        let mut left_files: HashMap<String, PathBuf> = HashMap::new();
        let mut right_files: HashMap<String, PathBuf> = HashMap::new();

        for entry in fs::read_dir(profile_dir)? {
            let path = entry?.path();

            let file_name = match path.file_name().and_then(|n| n.to_str()) {
                Some(n) => n.to_string(),
                None => continue,
            };

            if let Some(name) = file_name.strip_suffix(left_suffix) {
                left_files.insert(name.to_string(), path);
            }
            else if let Some(name) = file_name.strip_suffix(right_suffix) {
                right_files.insert(name.to_string(), path);
            }
        }

        // Load every profile which has both sides present
        let mut profiles = HashMap::new();

        let mut names: Vec<&String> = left_files.keys().chain(right_files.keys()).collect();
        names.sort();
        names.dedup();

        for name in names {
            let left_path = match left_files.get(name) {
                Some(p) => p,
                None => {
                    warn!("Left-side file for profile {} does not exist", name);
                    continue;
                }
            };
            let right_path = match right_files.get(name) {
                Some(p) => p,
                None => {
                    warn!("Right-side file for profile {} does not exist", name);
                    continue;
                }
            };

            info!("Loading profile {}", name);

            profiles.insert(
                name.clone(),
                ProfilePair {
                    left: Arc::new(read_profile(left_path)?),
                    right: Arc::new(read_profile(right_path)?),
                },
            );
        }

        Ok(Self { profiles })
    }

    /// Get the profile pair with the given name, or `None` if no such
    /// profile was loaded.
    pub fn get(&self, name: &str) -> Option<&ProfilePair> {
        self.profiles.get(name)
    }

    /// Return true if a profile with the given name was loaded.
    pub fn contains(&self, name: &str) -> bool {
        self.profiles.contains_key(name)
    }

    /// Iterate over the names of all loaded profiles.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(|k| k.as_str())
    }

    /// Get the number of loaded profiles.
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Return true if no profiles were loaded.
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Read a single side's profile from a CSV file.
fn read_profile(path: &Path) -> Result<MotionProfile, ProfileLoadError> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| ProfileLoadError::CsvError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut points = Vec::new();

    for record in reader.deserialize() {
        points.push(record.map_err(|e| ProfileLoadError::CsvError {
            path: path.to_path_buf(),
            source: e,
        })?);
    }

    if points.is_empty() {
        return Err(ProfileLoadError::EmptyProfile(path.to_path_buf()));
    }

    Ok(MotionProfile::new(points))
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    const HEADER: &str = "dt,x,y,position,velocity,acceleration,jerk,heading\n";

    /// Create a scratch directory for this test, removed by the caller.
    fn scratch_dir(test_name: &str) -> PathBuf {
        let mut dir = std::env::temp_dir();
        dir.push(format!("profile_container_{}_{}", test_name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_loads_complete_pairs() {
        let dir = scratch_dir("complete");

        let csv = format!("{}0.02,0,0,0,0,0,0,0\n0.02,0,0,1,50,0,0,0\n", HEADER);
        fs::write(dir.join("foo_left.csv"), &csv).unwrap();
        fs::write(dir.join("foo_right.csv"), &csv).unwrap();

        let container = ProfileContainer::from_dir(&dir).unwrap();

        assert_eq!(container.len(), 1);
        let pair = container.get("foo").unwrap();
        assert_eq!(pair.left.len(), 2);
        assert_eq!(pair.left.get(1).position, 1.0);
        assert_eq!(pair.left.get(1).velocity, 50.0);

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_skips_incomplete_pairs() {
        let dir = scratch_dir("incomplete");

        let csv = format!("{}0.02,0,0,0,0,0,0,0\n", HEADER);
        fs::write(dir.join("bar_left.csv"), &csv).unwrap();

        let container = ProfileContainer::from_dir(&dir).unwrap();
        assert!(container.is_empty());

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_empty_file_is_an_error() {
        let dir = scratch_dir("empty");

        fs::write(dir.join("baz_left.csv"), HEADER).unwrap();
        fs::write(dir.join("baz_right.csv"), HEADER).unwrap();

        assert!(matches!(
            ProfileContainer::from_dir(&dir),
            Err(ProfileLoadError::EmptyProfile(_))
        ));

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        assert!(matches!(
            ProfileContainer::from_dir("/nonexistent/profile/dir"),
            Err(ProfileLoadError::NotADirectory(_))
        ));
    }
}
