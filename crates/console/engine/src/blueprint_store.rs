//! Blueprint store: the current blueprint plus an ordered list of saves
//!
//! Saves are appended without de-duplication, so one mission id can appear
//! more than once. With a [`KeyValueStore`] attached every save is written
//! through under `blueprints/{seq:08}/{mission_id}`, which keeps order and
//! duplicates across a reload.

use std::sync::Arc;

use console_types::{ConsoleError, ConsoleResult, MissionBlueprint, MissionId};
use tracing::{debug, info, warn};

use crate::persistence::KeyValueStore;

const KEY_PREFIX: &str = "blueprints/";

#[derive(Clone, Debug)]
struct SavedEntry {
    seq: u64,
    blueprint: MissionBlueprint,
}

impl SavedEntry {
    fn key(&self) -> String {
        format!("{}{:08}/{}", KEY_PREFIX, self.seq, self.blueprint.mission_id)
    }
}

#[derive(Clone, Default)]
pub struct BlueprintStore {
    current: Option<MissionBlueprint>,
    saved: Vec<SavedEntry>,
    next_seq: u64,
    backend: Option<Arc<dyn KeyValueStore>>,
}

impl std::fmt::Debug for BlueprintStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlueprintStore")
            .field("current", &self.current.as_ref().map(|bp| &bp.mission_id))
            .field("saved", &self.saved.len())
            .field("persistent", &self.backend.is_some())
            .finish()
    }
}

impl BlueprintStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write saves through to `backend`. Call [`hydrate`](Self::hydrate)
    /// to load what the backend already holds.
    pub fn with_backend(backend: Arc<dyn KeyValueStore>) -> Self {
        Self {
            backend: Some(backend),
            ..Self::default()
        }
    }

    /// Rebuild the saved list from the backend. Returns the number of
    /// blueprints loaded; entries that fail to decode are skipped.
    pub fn hydrate(&mut self) -> ConsoleResult<usize> {
        let Some(backend) = self.backend.clone() else {
            return Ok(0);
        };

        let mut loaded = Vec::new();
        for key in backend.keys_with_prefix(KEY_PREFIX)? {
            let Some(seq) = parse_seq(&key) else {
                warn!(key = %key, "Skipping blueprint key with no sequence number");
                continue;
            };
            let Some(raw) = backend.get(&key)? else {
                continue;
            };
            match serde_json::from_str::<MissionBlueprint>(&raw) {
                Ok(blueprint) => loaded.push(SavedEntry { seq, blueprint }),
                Err(e) => warn!(key = %key, error = %e, "Skipping unreadable blueprint"),
            }
        }
        loaded.sort_by_key(|entry| entry.seq);

        self.next_seq = loaded.last().map(|e| e.seq + 1).unwrap_or(0);
        self.saved = loaded;
        info!(count = self.saved.len(), "Blueprints hydrated");
        Ok(self.saved.len())
    }

    pub fn set_current(&mut self, blueprint: MissionBlueprint) {
        debug!(mission_id = %blueprint.mission_id, "Current blueprint set");
        self.current = Some(blueprint);
    }

    pub fn current(&self) -> Option<&MissionBlueprint> {
        self.current.as_ref()
    }

    pub fn clear_current(&mut self) -> Option<MissionBlueprint> {
        self.current.take()
    }

    /// Append a copy of `blueprint` to the saved list.
    ///
    /// If write-through fails the saved list is left untouched.
    pub fn save(&mut self, blueprint: MissionBlueprint) -> ConsoleResult<()> {
        let entry = SavedEntry {
            seq: self.next_seq,
            blueprint,
        };
        if let Some(backend) = &self.backend {
            let body = serde_json::to_string(&entry.blueprint)?;
            backend.put(&entry.key(), body)?;
        }
        info!(
            mission_id = %entry.blueprint.mission_id,
            teams = entry.blueprint.team_count(),
            agents = entry.blueprint.agent_count(),
            "Blueprint saved"
        );
        self.next_seq += 1;
        self.saved.push(entry);
        Ok(())
    }

    /// Make the most recent save of `mission_id` current.
    pub fn restore(&mut self, mission_id: &MissionId) -> ConsoleResult<&MissionBlueprint> {
        let entry = self
            .saved
            .iter()
            .rev()
            .find(|e| &e.blueprint.mission_id == mission_id)
            .ok_or_else(|| ConsoleError::BlueprintNotFound(mission_id.clone()))?;
        info!(mission_id = %mission_id, "Blueprint restored");
        let restored = self.current.insert(entry.blueprint.clone());
        Ok(&*restored)
    }

    /// Remove every save of `mission_id`. Returns how many were removed.
    pub fn delete(&mut self, mission_id: &MissionId) -> ConsoleResult<usize> {
        let doomed: Vec<&SavedEntry> = self
            .saved
            .iter()
            .filter(|e| &e.blueprint.mission_id == mission_id)
            .collect();
        if doomed.is_empty() {
            return Err(ConsoleError::BlueprintNotFound(mission_id.clone()));
        }
        if let Some(backend) = &self.backend {
            for entry in &doomed {
                backend.delete(&entry.key())?;
            }
        }
        let removed = doomed.len();
        self.saved.retain(|e| &e.blueprint.mission_id != mission_id);
        info!(mission_id = %mission_id, removed, "Blueprint deleted");
        Ok(removed)
    }

    /// Saved blueprints in insertion order
    pub fn list(&self) -> Vec<&MissionBlueprint> {
        self.saved.iter().map(|e| &e.blueprint).collect()
    }

    pub fn saved_count(&self) -> usize {
        self.saved.len()
    }
}

fn parse_seq(key: &str) -> Option<u64> {
    key.strip_prefix(KEY_PREFIX)?.split('/').next()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use console_types::{AgentManifest, BlueprintTeam};

    fn blueprint(id: &str, intent: &str) -> MissionBlueprint {
        MissionBlueprint::new(id, intent).with_team(
            BlueprintTeam::new("core", "research-team").with_agent(AgentManifest::new("a1", "analyst")),
        )
    }

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _: &str) -> ConsoleResult<Option<String>> {
            Ok(None)
        }
        fn put(&self, _: &str, _: String) -> ConsoleResult<()> {
            Err(ConsoleError::Persistence("disk full".into()))
        }
        fn delete(&self, _: &str) -> ConsoleResult<bool> {
            Ok(false)
        }
        fn keys_with_prefix(&self, _: &str) -> ConsoleResult<Vec<String>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_restore_miss_leaves_current() {
        let mut store = BlueprintStore::new();
        store.save(blueprint("mission-alpha", "a")).unwrap();
        store.set_current(blueprint("mission-alpha", "a"));

        let err = store.restore(&MissionId::new("mission-unknown")).unwrap_err();
        assert!(matches!(err, ConsoleError::BlueprintNotFound(_)));
        assert_eq!(store.current().unwrap().mission_id.as_str(), "mission-alpha");
    }

    #[test]
    fn test_duplicates_kept_and_latest_restored() {
        let mut store = BlueprintStore::new();
        store.save(blueprint("m-1", "first")).unwrap();
        store.save(blueprint("m-2", "other")).unwrap();
        store.save(blueprint("m-1", "second")).unwrap();
        assert_eq!(store.list().len(), 3);

        let restored = store.restore(&MissionId::new("m-1")).unwrap();
        assert_eq!(restored.intent, "second");
        assert_eq!(store.current().unwrap().intent, "second");
    }

    #[test]
    fn test_delete_removes_all_copies() {
        let mut store = BlueprintStore::new();
        store.save(blueprint("m-1", "a")).unwrap();
        store.save(blueprint("m-1", "b")).unwrap();
        assert_eq!(store.delete(&MissionId::new("m-1")).unwrap(), 2);
        assert!(store.list().is_empty());
        assert!(store.delete(&MissionId::new("m-1")).is_err());
    }

    #[test]
    fn test_write_through_and_hydrate() {
        let backend = MemoryStore::new();
        let mut store = BlueprintStore::with_backend(Arc::new(backend.clone()));
        store.save(blueprint("m-1", "a")).unwrap();
        store.save(blueprint("m-2", "b")).unwrap();
        store.save(blueprint("m-1", "c")).unwrap();
        assert_eq!(backend.len(), 3);

        let mut reloaded = BlueprintStore::with_backend(Arc::new(backend.clone()));
        assert_eq!(reloaded.hydrate().unwrap(), 3);
        let intents: Vec<_> = reloaded.list().iter().map(|bp| bp.intent.as_str()).collect();
        assert_eq!(intents, vec!["a", "b", "c"]);

        reloaded.save(blueprint("m-3", "d")).unwrap();
        assert!(backend.get("blueprints/00000003/m-3").unwrap().is_some());
    }

    #[test]
    fn test_failed_persist_does_not_mutate() {
        let mut store = BlueprintStore::with_backend(Arc::new(BrokenStore));
        let err = store.save(blueprint("m-1", "a")).unwrap_err();
        assert!(matches!(err, ConsoleError::Persistence(_)));
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_corrupt_entry_skipped() {
        let backend = MemoryStore::new();
        backend.put("blueprints/00000000/m-x", "{not json".into()).unwrap();
        backend
            .put(
                "blueprints/00000001/m-1",
                serde_json::to_string(&blueprint("m-1", "ok")).unwrap(),
            )
            .unwrap();
        let mut store = BlueprintStore::with_backend(Arc::new(backend));
        assert_eq!(store.hydrate().unwrap(), 1);
    }
}
