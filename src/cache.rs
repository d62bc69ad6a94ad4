//! Per-user contribution cache.
//!
//! Each user gets one JSON file holding every fetched year. The file carries
//! a format version; files written by another version are thrown away.

use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::types::{CacheKey, YearData};

const LOG_TARGET: &str = "cache";

/// Bump whenever the layout of [`CacheFile`] or [`YearData`] changes.
pub const CACHE_VERSION: u32 = 3;

/// What lands on disk for one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheFile {
    pub version: u32,
    pub username: String,
    pub updated_at: DateTime<Utc>,
    pub years: BTreeMap<i32, YearData>,
}

/// Manages cached years, in memory and on disk
pub struct CacheManager {
    dir: Option<PathBuf>,
    cache: HashMap<CacheKey, YearData>,
    loaded_users: Vec<String>,
}

impl CacheManager {
    /// A cache backed by files in `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
            cache: HashMap::new(),
            loaded_users: Vec::new(),
        }
    }

    /// A cache that never touches the disk
    pub fn in_memory() -> Self {
        Self {
            dir: None,
            cache: HashMap::new(),
            loaded_users: Vec::new(),
        }
    }

    /// `<cache dir>/contribgraph`
    pub fn default_dir() -> Option<PathBuf> {
        dirs::cache_dir().map(|p| p.join("contribgraph"))
    }

    /// Path of the file holding `username`'s years
    pub fn user_file(&self, username: &str) -> Option<PathBuf> {
        self.dir
            .as_ref()
            .map(|dir| dir.join(format!("{}.json", sanitize_file_name(username))))
    }

    /// Read `username`'s file into memory, once.
    ///
    /// Missing files are a miss; unreadable or stale files are deleted.
    pub fn load_user(&mut self, username: &str) {
        let user = username.to_ascii_lowercase();
        if self.loaded_users.contains(&user) {
            return;
        }
        self.loaded_users.push(user.clone());

        let Some(path) = self.user_file(&user) else {
            return;
        };

        match read_cache_file(&path) {
            Ok(Some(file)) if file.version == CACHE_VERSION => {
                debug!(target: LOG_TARGET, "Cache hit for '{user}': {} years", file.years.len());
                for (year, data) in file.years {
                    if data.year == year && data.is_consistent() {
                        self.cache.insert(CacheKey::new(&user, year), data);
                    }
                }
            }
            Ok(Some(file)) => {
                debug!(target: LOG_TARGET,
                    "Discarding cache for '{user}': version {} does not match {CACHE_VERSION}",
                    file.version
                );
                remove_quietly(&path);
            }
            Ok(None) => debug!(target: LOG_TARGET, "Cache miss for '{user}'"),
            Err(e) => {
                warn!(target: LOG_TARGET, "Discarding unreadable cache '{}': {e}", path.display());
                remove_quietly(&path);
            }
        }
    }

    /// Store a year and write the user's file through.
    pub fn store(&mut self, username: &str, data: YearData) -> Result<()> {
        self.load_user(username);
        self.cache.insert(CacheKey::new(username, data.year), data);
        self.persist(username)
    }

    /// Retrieve a year from the cache
    pub fn get(&self, key: &CacheKey) -> Option<&YearData> {
        self.cache.get(key)
    }

    /// Years cached for `username`, newest first
    pub fn cached_years(&self, username: &str) -> Vec<i32> {
        let user = username.to_ascii_lowercase();
        let mut years: Vec<i32> = self
            .cache
            .keys()
            .filter(|k| k.username == user)
            .map(|k| k.year)
            .collect();
        years.sort_unstable_by(|a, b| b.cmp(a));
        years
    }

    /// Forget one user, on disk too
    pub fn clear_user(&mut self, username: &str) {
        let user = username.to_ascii_lowercase();
        self.cache.retain(|k, _| k.username != user);
        self.loaded_users.retain(|u| *u != user);
        if let Some(path) = self.user_file(&user) {
            remove_quietly(&path);
        }
    }

    /// Clear the in-memory cache
    pub fn clear(&mut self) {
        self.cache.clear();
        self.loaded_users.clear();
    }

    fn persist(&self, username: &str) -> Result<()> {
        let user = username.to_ascii_lowercase();
        let Some(path) = self.user_file(&user) else {
            return Ok(());
        };

        let years = self
            .cache
            .iter()
            .filter(|(k, _)| k.username == user)
            .map(|(k, v)| (k.year, v.clone()))
            .collect();

        let file = CacheFile {
            version: CACHE_VERSION,
            username: user,
            updated_at: Utc::now(),
            years,
        };
        write_cache_file(&path, &file)
    }
}

impl Default for CacheManager {
    fn default() -> Self {
        match Self::default_dir() {
            Some(dir) => Self::new(dir),
            None => Self::in_memory(),
        }
    }
}

fn read_cache_file(path: &Path) -> Result<Option<CacheFile>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_reader(BufReader::new(file))?))
}

fn write_cache_file(path: &Path, data: &CacheFile) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, data)?;
    writer.flush()?;
    debug!(target: LOG_TARGET, "Wrote {} years to '{}'", data.years.len(), path.display());
    Ok(())
}

fn remove_quietly(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(target: LOG_TARGET, "Unable to remove '{}': {e}", path.display());
        }
    }
}

/// Keep only characters that are safe in a file name on every platform.
fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "_".to_string()
    } else {
        cleaned
    }
}
