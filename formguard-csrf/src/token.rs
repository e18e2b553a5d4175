use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

/// Generate a random hex token of exactly `length` characters.
///
/// Randomness comes from the thread-local CSPRNG, which is seeded from the
/// operating system.
pub fn generate_token(length: usize) -> String {
    let mut bytes = vec![0u8; length.div_ceil(2)];
    rand::thread_rng().fill(&mut bytes[..]);

    let mut token = hex::encode(bytes);
    token.truncate(length);
    token
}

/// Lifecycle state of a token held in a store.
///
/// Tokens the store does not know about have no state at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    /// Issued and not yet used
    Valid,
    /// Used at the given time; never valid again
    Spent(DateTime<Utc>),
}

/// Serialized form of a single collection entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub token: String,
    pub consumed_at: Option<DateTime<Utc>>,
}

/// Insertion-ordered mapping of token to consumption time.
///
/// The front of the collection is the oldest inserted token and is the first
/// to go when the collection is trimmed to capacity. Marking a token consumed
/// or re-inserting it never changes its position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<TokenRecord>", into = "Vec<TokenRecord>")]
pub struct TokenCollection {
    order: VecDeque<String>,
    consumed: HashMap<String, Option<DateTime<Utc>>>,
}

impl TokenCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `token` as valid. Returns `true` if the token was not present.
    ///
    /// A token that is already present is reset to valid in place.
    pub fn insert_valid(&mut self, token: &str) -> bool {
        self.upsert(token, None)
    }

    /// Record `token` as spent at `at`. Returns `true` if the token was present.
    ///
    /// An absent token is appended as a spent record.
    pub fn mark_consumed(&mut self, token: &str, at: DateTime<Utc>) -> bool {
        !self.upsert(token, Some(at))
    }

    fn upsert(&mut self, token: &str, consumed_at: Option<DateTime<Utc>>) -> bool {
        match self.consumed.get_mut(token) {
            Some(slot) => {
                *slot = consumed_at;
                false
            }
            None => {
                self.order.push_back(token.to_string());
                self.consumed.insert(token.to_string(), consumed_at);
                true
            }
        }
    }

    pub fn state(&self, token: &str) -> Option<TokenState> {
        self.consumed.get(token).map(|consumed_at| match consumed_at {
            Some(at) => TokenState::Spent(*at),
            None => TokenState::Valid,
        })
    }

    pub fn contains(&self, token: &str) -> bool {
        self.consumed.contains_key(token)
    }

    /// Drop the oldest entries until at most `max` remain, returning them oldest first.
    pub fn evict_to(&mut self, max: usize) -> Vec<String> {
        let mut evicted = Vec::new();
        while self.order.len() > max {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.consumed.remove(&oldest);
            evicted.push(oldest);
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterate over entries from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<DateTime<Utc>>)> + '_ {
        self.order
            .iter()
            .map(|token| (token.as_str(), self.consumed.get(token).copied().flatten()))
    }
}

impl From<Vec<TokenRecord>> for TokenCollection {
    fn from(records: Vec<TokenRecord>) -> Self {
        let mut collection = Self::new();
        for record in records {
            collection.upsert(&record.token, record.consumed_at);
        }
        collection
    }
}

impl From<TokenCollection> for Vec<TokenRecord> {
    fn from(collection: TokenCollection) -> Self {
        collection
            .iter()
            .map(|(token, consumed_at)| TokenRecord {
                token: token.to_string(),
                consumed_at,
            })
            .collect()
    }
}
