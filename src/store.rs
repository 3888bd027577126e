use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use bytes::Bytes;

/// A processed video awaiting retrieval.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub payload: Bytes,
    pub filename: String,
}

/// Keyed artifact storage. `put` issues a fresh opaque id; `take` resolves it
/// to the stored artifact or `None` once the id is unknown or consumed.
pub trait VideoStore: Send + Sync {
    fn put(&self, payload: Bytes, filename: String) -> anyhow::Result<String>;
    fn take(&self, id: &str) -> Option<Artifact>;
}

/// Single-use in-memory store: the read removes the entry atomically with the
/// lookup, so an id is servable exactly once and concurrent reads of the same
/// id resolve first-wins / second-not-found.
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Artifact>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoStore for MemoryStore {
    fn put(&self, payload: Bytes, filename: String) -> anyhow::Result<String> {
        let id = uuid::Uuid::new_v4().to_string();
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(id.clone(), Artifact { payload, filename });
        Ok(id)
    }

    fn take(&self, id: &str) -> Option<Artifact> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.remove(id)
    }
}

/// Filesystem-backed store: payload under `<dir>/<id>.mp4` with the suggested
/// download name in a `.name` sidecar. Entries persist across reads; nothing
/// reaps the directory, so disk usage grows until an external job cleans it.
pub struct DiskStore {
    dir: PathBuf,
}

impl DiskStore {
    pub fn new(dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }
}

impl VideoStore for DiskStore {
    fn put(&self, payload: Bytes, filename: String) -> anyhow::Result<String> {
        let id = uuid::Uuid::new_v4().to_string();
        std::fs::write(self.dir.join(format!("{id}.mp4")), &payload)?;
        std::fs::write(self.dir.join(format!("{id}.name")), filename)?;
        Ok(id)
    }

    fn take(&self, id: &str) -> Option<Artifact> {
        // ids are uuids we issued; anything else is unknown by construction
        if !id.chars().all(|c| c.is_ascii_hexdigit() || c == '-') {
            return None;
        }
        let payload = std::fs::read(self.dir.join(format!("{id}.mp4"))).ok()?;
        let filename = std::fs::read_to_string(self.dir.join(format!("{id}.name"))).ok()?;
        Some(Artifact {
            payload: Bytes::from(payload),
            filename,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_serves_exactly_once() {
        let store = MemoryStore::new();
        let id = store
            .put(Bytes::from_static(b"video-bytes"), "clip_blurred.mp4".into())
            .unwrap();

        let artifact = store.take(&id).expect("first take");
        assert_eq!(artifact.payload.as_ref(), b"video-bytes");
        assert_eq!(artifact.filename, "clip_blurred.mp4");

        assert!(store.take(&id).is_none(), "id must be consumed");
    }

    #[test]
    fn memory_store_issues_distinct_ids() {
        let store = MemoryStore::new();
        let a = store.put(Bytes::from_static(b"a"), "a.mp4".into()).unwrap();
        let b = store.put(Bytes::from_static(b"b"), "b.mp4".into()).unwrap();
        assert_ne!(a, b);
        assert_eq!(store.take(&a).unwrap().payload.as_ref(), b"a");
        assert_eq!(store.take(&b).unwrap().payload.as_ref(), b"b");
    }

    #[test]
    fn memory_store_unknown_id_is_not_found() {
        let store = MemoryStore::new();
        assert!(store.take("no-such-id").is_none());
    }

    #[test]
    fn disk_store_persists_across_takes() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskStore::new(dir.path()).unwrap();
        let id = store
            .put(Bytes::from_static(b"payload"), "v_blurred.mp4".into())
            .unwrap();

        for _ in 0..2 {
            let artifact = store.take(&id).expect("persistent entry");
            assert_eq!(artifact.payload.as_ref(), b"payload");
            assert_eq!(artifact.filename, "v_blurred.mp4");
        }
        assert!(store.take("../../etc/passwd").is_none());
    }
}
