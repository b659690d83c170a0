//! In-process storage adapter implementing every domain port.
//!
//! One [`InMemorySocialStore`] backs accounts, posts, and the follow graph.
//! Feeds are computed on read from the post log, newest first, and cut into
//! windows with the store's [`PageSize`]. State sits behind a single
//! [`RwLock`] held for one port call at a time.

mod accounts;
mod follows;
mod posts;

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use mockable::Clock;
use pagination::{Page, PageSize, PageWindow};
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::domain::{Post, UserId, UserName};

/// Default number of accounts listed as "newest users".
pub const DEFAULT_NEWEST_USERS: usize = 10;

/// Tunables owned by the storage side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreSettings {
    /// Items per bounded feed window.
    pub page_size: PageSize,
    /// Cap on the unpaginated "newest users" list.
    pub newest_users: usize,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            page_size: PageSize::default(),
            newest_users: DEFAULT_NEWEST_USERS,
        }
    }
}

struct PasswordHash {
    salt: String,
    digest: String,
}

impl PasswordHash {
    fn new(password: &str) -> Self {
        let mut salt = [0_u8; 16];
        rand::thread_rng().fill_bytes(&mut salt);
        let salt = hex::encode(salt);
        let digest = Self::digest(&salt, password);
        Self { salt, digest }
    }

    fn digest(salt: &str, password: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(salt.as_bytes());
        hasher.update(password.as_bytes());
        hex::encode(hasher.finalize())
    }

    fn matches(&self, password: &str) -> bool {
        Self::digest(&self.salt, password) == self.digest
    }
}

struct Account {
    id: UserId,
    name: UserName,
    password: PasswordHash,
    token: Option<String>,
}

struct StoredPost {
    post: Post,
    author_id: UserId,
    mentions: BTreeSet<UserId>,
}

#[derive(Default)]
struct StoreState {
    accounts: HashMap<UserName, Account>,
    names: HashMap<UserId, UserName>,
    tokens: HashMap<String, UserName>,
    /// Handles in registration order, oldest first.
    registrations: Vec<UserName>,
    /// Posts in publication order, oldest first.
    posts: Vec<StoredPost>,
    following: HashMap<UserId, BTreeSet<UserId>>,
    followers: HashMap<UserId, BTreeSet<UserId>>,
}

impl StoreState {
    fn names_of<'a>(&self, ids: impl IntoIterator<Item = &'a UserId>) -> Vec<UserName> {
        let mut names: Vec<UserName> = ids
            .into_iter()
            .filter_map(|id| self.names.get(id).cloned())
            .collect();
        names.sort();
        names
    }

    /// Posts matching `keep`, newest first.
    fn newest_first(&self, keep: impl Fn(&StoredPost) -> bool) -> Vec<&Post> {
        self.posts
            .iter()
            .rev()
            .filter(|stored| keep(stored))
            .map(|stored| &stored.post)
            .collect()
    }
}

/// Thread-safe in-memory store for accounts, posts, and follows.
pub struct InMemorySocialStore {
    state: RwLock<StoreState>,
    clock: Arc<dyn Clock>,
    settings: StoreSettings,
}

impl InMemorySocialStore {
    /// Empty store stamping posts with `clock`.
    pub fn new(clock: Arc<dyn Clock>, settings: StoreSettings) -> Self {
        Self {
            state: RwLock::new(StoreState::default()),
            clock,
            settings,
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, StoreState>, String> {
        self.state
            .read()
            .map_err(|_| "store lock poisoned".to_owned())
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, StoreState>, String> {
        self.state
            .write()
            .map_err(|_| "store lock poisoned".to_owned())
    }

    fn page_of<T: Clone>(&self, feed: &[T], window: &PageWindow) -> Page<T> {
        Page::from_feed(feed, *window, self.settings.page_size)
    }
}

#[cfg(test)]
mod tests;
