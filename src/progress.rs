use crate::catalog::Catalog;
use crate::error::ProgressError;
use crate::model::{Combo, CompletionKey, Subject};
use crate::storage::SnapshotStore;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;

// ============================================================
// Snapshot
// ============================================================

/// Persisted form: `{ "combo": "PCMB", "checked": { "S||C||T": true } }`.
///
/// Keys are kept as opaque strings so entries for topics that no longer exist
/// in the catalog survive a load/save cycle untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(
        default,
        serialize_with = "serialize_combo",
        deserialize_with = "deserialize_combo"
    )]
    pub combo: Combo,
    #[serde(default, deserialize_with = "deserialize_checked")]
    pub checked: BTreeMap<String, bool>,
}

impl Snapshot {
    /// Absent keys read as not done.
    pub fn is_done(&self, key: &CompletionKey<'_>) -> bool {
        self.checked
            .get(&key.to_string())
            .copied()
            .unwrap_or(false)
    }

    /// Lenient decode: text that is not a JSON object becomes the default
    /// snapshot. Inside a valid object each field degrades on its own.
    pub fn decode(text: &str) -> Self {
        match serde_json::from_str(text) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(error = %e, "Stored progress is corrupt, starting fresh");
                Snapshot::default()
            }
        }
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

fn serialize_combo<S: Serializer>(combo: &Combo, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(combo.code())
}

fn deserialize_combo<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Combo, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_str()
        .and_then(|code| Combo::parse(code).ok())
        .unwrap_or_default())
}

// Non-boolean marks read as not done; the key itself is kept.
fn deserialize_checked<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<String, bool>, D::Error> {
    let Value::Object(entries) = Value::deserialize(deserializer)? else {
        tracing::warn!("Stored completion map is not an object, ignoring it");
        return Ok(BTreeMap::new());
    };
    Ok(entries
        .into_iter()
        .map(|(key, mark)| {
            if !mark.is_boolean() {
                tracing::warn!(%key, "Stored completion mark is not a boolean");
            }
            (key, mark.as_bool().unwrap_or(false))
        })
        .collect())
}

// ============================================================
// Completion State Manager
// ============================================================

/// Sole owner of the completion snapshot.
///
/// Every mutation writes the full snapshot to the store before returning. If
/// the write fails the in-memory change is undone, so memory and storage
/// agree whenever a call returns.
pub struct Progress<S: SnapshotStore> {
    snapshot: Snapshot,
    store: S,
}

impl<S: SnapshotStore> Progress<S> {
    pub fn load(store: S) -> Self {
        let snapshot = match store.read() {
            Ok(Some(text)) => Snapshot::decode(&text),
            Ok(None) => {
                tracing::debug!("No stored progress, using defaults");
                Snapshot::default()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not read stored progress, using defaults");
                Snapshot::default()
            }
        };
        Progress { snapshot, store }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn combo(&self) -> Combo {
        self.snapshot.combo
    }

    pub fn is_done(&self, subject: Subject, chapter: &str, topic: &str) -> bool {
        self.snapshot
            .is_done(&CompletionKey::new(subject, chapter, topic))
    }

    /// Number of entries currently marked done, stale ones included.
    pub fn done_count(&self) -> usize {
        self.snapshot.checked.values().filter(|done| **done).count()
    }

    /// Validate and adopt a combo code. Unrecognized codes leave state as is.
    pub fn set_combo(&mut self, code: &str) -> Result<Combo, ProgressError> {
        let combo = Combo::parse(code)?;
        let previous = self.snapshot.combo;
        self.snapshot.combo = combo;
        if let Err(e) = self.persist() {
            self.snapshot.combo = previous;
            return Err(e);
        }
        Ok(combo)
    }

    pub fn toggle(
        &mut self,
        subject: Subject,
        chapter: &str,
        topic: &str,
        value: bool,
    ) -> Result<(), ProgressError> {
        let key = CompletionKey::new(subject, chapter, topic).to_string();
        let previous = self.snapshot.checked.insert(key.clone(), value);
        if let Err(e) = self.persist() {
            match previous {
                Some(old) => self.snapshot.checked.insert(key, old),
                None => self.snapshot.checked.remove(&key),
            };
            return Err(e);
        }
        Ok(())
    }

    /// Mark every topic of one chapter as not done with a single write.
    /// Returns how many topics were previously done.
    pub fn reset_chapter(
        &mut self,
        catalog: &Catalog,
        subject: Subject,
        chapter: &str,
    ) -> Result<usize, ProgressError> {
        let Some(topics) = catalog.topics(subject, chapter) else {
            return Ok(0);
        };
        let previous = self.snapshot.checked.clone();
        let mut cleared = 0;
        for topic in topics {
            let key = CompletionKey::new(subject, chapter, topic).to_string();
            if self.snapshot.checked.insert(key, false) == Some(true) {
                cleared += 1;
            }
        }
        if let Err(e) = self.persist() {
            self.snapshot.checked = previous;
            return Err(e);
        }
        Ok(cleared)
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn persist(&mut self) -> Result<(), ProgressError> {
        let json = self.snapshot.encode()?;
        self.store.write(&json)?;
        tracing::debug!(
            combo = %self.snapshot.combo,
            entries = self.snapshot.checked.len(),
            "Persisted progress"
        );
        Ok(())
    }
}
