//! On-disk collections of game records.
//!
//! A collection is a named folder of game-record files plus JSON index
//! files describing it: one index per collection, one metadata file per
//! game (stored next to the record as `<record>.json`), and one list file
//! naming every collection index. All index files are versioned
//! `[version, payload]` arrays so older layouts are detected instead of
//! misread.
//!
//! Collections load lazily: reading an index yields the name, directory,
//! and game count immediately; per-game metadata files are only read when
//! the games themselves are first needed. Unreadable entries are skipped
//! with a warning so one stale path never blocks a whole library.

use std::fs;
use std::path::{Path, PathBuf};

use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Version tag written into every index file.
pub const FORMAT_VERSION: u32 = 2;

#[derive(Debug, Error)]
pub enum CollectionError {
    #[error("failed to {operation} {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed index file {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("unsupported index version {version} in {path}")]
    UnsupportedVersion { version: u32, path: PathBuf },
}

pub type Result<T> = std::result::Result<T, CollectionError>;

fn io_error(operation: &'static str, path: &Path) -> impl FnOnce(std::io::Error) -> CollectionError {
    let path = path.to_path_buf();
    move |source| CollectionError::Io {
        operation,
        path,
        source,
    }
}

fn write_versioned<T: Serialize>(path: &Path, payload: &T) -> Result<()> {
    let text = serde_json::to_string(&(FORMAT_VERSION, payload)).map_err(|source| {
        CollectionError::Malformed {
            path: path.to_path_buf(),
            source,
        }
    })?;
    fs::write(path, text).map_err(io_error("write", path))
}

fn read_versioned<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).map_err(io_error("read", path))?;
    let malformed = |source| CollectionError::Malformed {
        path: path.to_path_buf(),
        source,
    };
    let (version, payload): (u32, serde_json::Value) =
        serde_json::from_str(&text).map_err(malformed)?;
    if version != FORMAT_VERSION {
        return Err(CollectionError::UnsupportedVersion {
            version,
            path: path.to_path_buf(),
        });
    }
    serde_json::from_value(payload).map_err(malformed)
}

/// Game metadata as shown in a chooser: players, ranks, result, date,
/// event. Serialized with the short keys the record headers use.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameInfo {
    #[serde(rename = "bname", default, skip_serializing_if = "Option::is_none")]
    pub black_name: Option<String>,
    #[serde(rename = "wname", default, skip_serializing_if = "Option::is_none")]
    pub white_name: Option<String>,
    #[serde(rename = "brank", default, skip_serializing_if = "Option::is_none")]
    pub black_rank: Option<String>,
    #[serde(rename = "wrank", default, skip_serializing_if = "Option::is_none")]
    pub white_rank: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
}

impl GameInfo {
    /// `_black_white_event` fragment used for metadata-derived file names.
    /// Empty when none of the three fields are set.
    fn name_tag(&self) -> String {
        let mut tag = String::new();
        for part in [&self.black_name, &self.white_name, &self.event]
            .into_iter()
            .flatten()
        {
            tag.push('_');
            tag.push_str(part);
        }
        tag
    }
}

/// One game in a collection: the record file, its metadata, and whether
/// metadata changes may rename the file.
#[derive(Debug, Clone, PartialEq)]
pub struct GameEntry {
    pub path: PathBuf,
    pub can_rename: bool,
    pub info: GameInfo,
}

impl GameEntry {
    /// The metadata file for this entry, next to the record file.
    pub fn index_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".json");
        PathBuf::from(name)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let (path, can_rename, info): (PathBuf, bool, GameInfo) = read_versioned(path)?;
        Ok(Self {
            path,
            can_rename,
            info,
        })
    }

    pub fn save(&self) -> Result<()> {
        write_versioned(
            &self.index_path(),
            &(&self.path, self.can_rename, &self.info),
        )
    }
}

/// A named folder of game records with a persistent index.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    name: String,
    dir: PathBuf,
    games: Vec<GameEntry>,
    lazy_games: Vec<PathBuf>,
    loaded: bool,
}

impl Collection {
    pub fn new(name: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            dir: dir.into(),
            games: Vec::new(),
            lazy_games: Vec::new(),
            loaded: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of games, available without reading any metadata files.
    pub fn game_count(&self) -> usize {
        if self.loaded {
            self.games.len()
        } else {
            self.lazy_games.len()
        }
    }

    /// Read any metadata files deferred at load time. Unreadable entries
    /// are dropped with a warning.
    pub fn ensure_loaded(&mut self) {
        if self.loaded {
            return;
        }
        for path in std::mem::take(&mut self.lazy_games) {
            match GameEntry::load(&path) {
                Ok(entry) => self.games.push(entry),
                Err(err) => warn!("skipping unreadable game entry {}: {err}", path.display()),
            }
        }
        self.loaded = true;
    }

    pub fn games(&mut self) -> &[GameEntry] {
        self.ensure_loaded();
        &self.games
    }

    /// Load a collection index. Games stay lazy until first accessed.
    pub fn load(path: &Path) -> Result<Self> {
        let (name, dir, entries): (String, PathBuf, Vec<PathBuf>) = read_versioned(path)?;
        Ok(Self {
            name,
            dir,
            games: Vec::new(),
            loaded: entries.is_empty(),
            lazy_games: entries,
        })
    }

    /// Write the collection index to `index_path`, saving every game's
    /// metadata file first.
    pub fn save(&mut self, index_path: &Path) -> Result<()> {
        self.ensure_loaded();
        for entry in &self.games {
            entry.save()?;
        }
        let files: Vec<PathBuf> = self.games.iter().map(GameEntry::index_path).collect();
        write_versioned(index_path, &(&self.name, &self.dir, files))
    }

    /// Append a new game with a generated file name under the collection
    /// directory. Returns its index. Nothing is written until
    /// [`Collection::save`].
    pub fn add_game(&mut self, info: GameInfo, can_rename: bool) -> usize {
        self.ensure_loaded();
        let stamp = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S");
        let path = self.dir.join(format!("{stamp}{}.sgf", info.name_tag()));
        self.games.push(GameEntry {
            path,
            can_rename,
            info,
        });
        self.games.len() - 1
    }

    pub fn remove_game(&mut self, index: usize) -> Option<GameEntry> {
        self.ensure_loaded();
        if index < self.games.len() {
            Some(self.games.remove(index))
        } else {
            None
        }
    }

    /// A uniformly random game, or `None` for an empty collection.
    pub fn random_game(&mut self) -> Option<&GameEntry> {
        self.ensure_loaded();
        if self.games.is_empty() {
            return None;
        }
        self.games.get(fastrand::usize(..self.games.len()))
    }

    /// Replace a game's metadata. When renaming is permitted and the file
    /// name does not already carry the metadata-derived tag, the record
    /// file is moved to a new name under the collection directory; a
    /// missing source file is tolerated with a warning.
    pub fn set_game_info(&mut self, index: usize, info: GameInfo) -> Option<&GameEntry> {
        self.ensure_loaded();
        let dir = self.dir.clone();
        let entry = self.games.get_mut(index)?;
        entry.info = info;
        if entry.can_rename {
            let tag = entry.info.name_tag();
            let file_name = entry
                .path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default();
            if !tag.is_empty() && !file_name.contains(&tag) {
                let stamp = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S");
                let renamed = dir.join(format!("{stamp}{tag}.sgf"));
                if let Err(err) = fs::rename(&entry.path, &renamed) {
                    warn!(
                        "could not rename {} to {}: {err}",
                        entry.path.display(),
                        renamed.display()
                    );
                }
                entry.path = renamed;
            }
        }
        Some(&self.games[index])
    }
}

/// The set of collections a library directory knows about.
///
/// Layout under the base directory: `collections/` holds the list file
/// and one index per collection, `games/<name>/` holds the record files
/// of collections created here.
#[derive(Debug, Default)]
pub struct CollectionList {
    base: PathBuf,
    collections: Vec<Collection>,
}

impl CollectionList {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            collections: Vec::new(),
        }
    }

    fn index_dir(&self) -> PathBuf {
        self.base.join("collections")
    }

    fn list_path(&self) -> PathBuf {
        self.index_dir().join("collections_list.json")
    }

    fn collection_index_path(&self, name: &str) -> PathBuf {
        self.index_dir().join(format!("{name}.json"))
    }

    fn games_dir(&self, name: &str) -> PathBuf {
        self.base.join("games").join(name)
    }

    pub fn collections(&self) -> &[Collection] {
        &self.collections
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Collection> {
        self.collections.iter_mut().find(|c| c.name == name)
    }

    /// Load the collection list under `base`. Collections whose index
    /// file has gone missing are skipped with a warning.
    pub fn load(base: impl Into<PathBuf>) -> Result<Self> {
        let mut list = Self::new(base);
        let files: Vec<PathBuf> = read_versioned(&list.list_path())?;
        for file in files {
            match Collection::load(&file) {
                Ok(collection) => list.collections.push(collection),
                Err(err) => warn!("skipping unreadable collection {}: {err}", file.display()),
            }
        }
        Ok(list)
    }

    /// Persist every collection and the list file itself.
    pub fn save(&mut self) -> Result<()> {
        let index_dir = self.index_dir();
        fs::create_dir_all(&index_dir).map_err(io_error("create", &index_dir))?;
        let mut files = Vec::new();
        for collection in &mut self.collections {
            let path = index_dir.join(format!("{}.json", collection.name));
            collection.save(&path)?;
            files.push(path);
        }
        write_versioned(&self.list_path(), &files)
    }

    /// Create an empty collection: make its games directory, write its
    /// index, prepend it to the list, and persist the list.
    pub fn create_collection(&mut self, name: &str) -> Result<&Collection> {
        let dir = self.games_dir(name);
        fs::create_dir_all(&dir).map_err(io_error("create", &dir))?;
        let mut collection = Collection::new(name, dir);
        let index_dir = self.index_dir();
        fs::create_dir_all(&index_dir).map_err(io_error("create", &index_dir))?;
        collection.save(&self.collection_index_path(name))?;
        self.collections.insert(0, collection);
        self.save()?;
        Ok(&self.collections[0])
    }

    /// Drop every collection with this name from the list. Files on disk
    /// are left alone.
    pub fn delete_collection(&mut self, name: &str) {
        self.collections.retain(|c| c.name != name);
    }
}

/// Record files (`*.sgf`) directly under a directory, sorted.
pub fn scan_directory(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(io_error("read", dir))?;
    let mut found = Vec::new();
    for entry in entries {
        let entry = entry.map_err(io_error("read", dir))?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some("sgf") {
            found.push(path);
        }
    }
    found.sort();
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_tag_joins_present_fields() {
        let mut info = GameInfo::default();
        assert_eq!(info.name_tag(), "");
        info.black_name = Some("Shusaku".to_string());
        info.event = Some("Castle".to_string());
        assert_eq!(info.name_tag(), "_Shusaku_Castle");
    }

    #[test]
    fn entry_index_path_appends_json() {
        let entry = GameEntry {
            path: PathBuf::from("/tmp/games/match.sgf"),
            can_rename: true,
            info: GameInfo::default(),
        };
        assert_eq!(entry.index_path(), PathBuf::from("/tmp/games/match.sgf.json"));
    }

    #[test]
    fn add_and_remove_games() {
        let mut collection = Collection::new("test", "/tmp/games/test");
        let info = GameInfo {
            black_name: Some("B".to_string()),
            ..GameInfo::default()
        };
        let index = collection.add_game(info, true);
        assert_eq!(collection.game_count(), 1);
        let removed = collection.remove_game(index);
        assert!(removed.is_some());
        assert_eq!(collection.game_count(), 0);
        assert!(collection.remove_game(0).is_none());
    }

    #[test]
    fn random_game_on_empty_collection_is_none() {
        let mut collection = Collection::new("empty", "/tmp/games/empty");
        assert!(collection.random_game().is_none());
    }

    #[test]
    fn scan_directory_finds_only_records() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.sgf"), "(;)").unwrap();
        fs::write(dir.path().join("b.sgf"), "(;)").unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();
        let found = scan_directory(dir.path()).unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|p| p.extension().unwrap() == "sgf"));
    }
}
