//! User database persistence with file locking.
//!
//! The whole database is one JSON document mapping usernames to accounts.
//! It is read fully into memory and rewritten fully on every save; saves go
//! through a temp file and an atomic rename so a crash never leaves a
//! half-written database behind.

use crate::{Error, Result, UserAccount};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Every account, keyed by username
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct UserDatabase {
    users: BTreeMap<String, UserAccount>,
}

impl UserDatabase {
    /// Load the database from a file with shared locking
    ///
    /// A missing file is initialized on disk as an empty database.
    /// A file that cannot be parsed yields `Error::StoreCorrupt`; it is left
    /// untouched so it can be inspected or restored.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No user database at {:?}, creating an empty one", path);
            let db = Self::default();
            db.save(path)?;
            return Ok(db);
        }

        let file = File::open(path)?;

        // Acquire shared lock for reading
        file.lock_shared()?;

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        let read = reader.read_to_string(&mut contents);
        file.unlock()?;
        read?;

        let mut db: UserDatabase =
            serde_json::from_str(&contents).map_err(|e| Error::StoreCorrupt {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        for (name, account) in db.users.iter_mut() {
            if account.username.is_empty() {
                account.username = name.clone();
            }
        }

        tracing::debug!("Loaded {} account(s) from {:?}", db.users.len(), path);
        Ok(db)
    }

    /// Save the database to a file with exclusive locking
    ///
    /// Atomically writes the database by:
    /// 1. Writing to a temp file in the same directory
    /// 2. Syncing to disk
    /// 3. Renaming over the original
    pub fn save(&self, path: &Path) -> Result<()> {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;

        // Acquire exclusive lock on the temp file to serialize concurrent writers
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
            let mut serializer = serde_json::Serializer::with_formatter(&mut writer, formatter);
            self.serialize(&mut serializer)?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        // Atomically replace the old database
        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved {} account(s) to {:?}", self.users.len(), path);
        Ok(())
    }

    pub fn get(&self, username: &str) -> Option<&UserAccount> {
        self.users.get(username)
    }

    pub fn get_mut(&mut self, username: &str) -> Option<&mut UserAccount> {
        self.users.get_mut(username)
    }

    pub fn contains(&self, username: &str) -> bool {
        self.users.contains_key(username)
    }

    /// Add or replace the account stored under `account.username`
    pub fn insert(&mut self, account: UserAccount) {
        self.users.insert(account.username.clone(), account);
    }

    pub fn usernames(&self) -> impl Iterator<Item = &str> {
        self.users.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
