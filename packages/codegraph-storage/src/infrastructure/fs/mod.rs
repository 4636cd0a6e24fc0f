//! Filesystem-backed `CodeSnapshotStore`.
//!
//! Layout, one directory per snapshot:
//!
//! ```text
//! <base_dir>/<repo_id>/<snapshot_id>/meta.json
//! <base_dir>/<repo_id>/<snapshot_id>/chunks/<encoded file path>.msgpack
//! <base_dir>/<repo_id>/<snapshot_id>/dependencies.msgpack
//! ```
//!
//! `meta.json` is plain JSON so snapshot metadata is greppable on disk;
//! chunks and dependencies are MessagePack (`rmp-serde`) since they're read
//! back as typed values, never inspected by hand. `replace_file` implements
//! the file-level core contract by hard-linking every chunk file from the
//! old snapshot into the new one, then overwriting the changed file's chunk
//! file — unchanged files share bytes on disk rather than being copied.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::domain::{Chunk, CodeSnapshotStore, Dependency, Snapshot};
use crate::error::{ErrorKind, StorageError};
use crate::Result;

/// Encode a repo-relative file path into a filesystem-safe file name.
fn encode_file_path(file_path: &str) -> String {
    let mut s = file_path.replace('/', "__");
    s.push_str(".msgpack");
    s
}

pub struct FilesystemSnapshotStore {
    base_dir: PathBuf,
}

impl FilesystemSnapshotStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn snapshot_dir(&self, repo_id: &str, snapshot_id: &str) -> PathBuf {
        self.base_dir.join(repo_id).join(snapshot_id)
    }

    fn chunks_dir(&self, repo_id: &str, snapshot_id: &str) -> PathBuf {
        self.snapshot_dir(repo_id, snapshot_id).join("chunks")
    }

    fn deps_path(&self, repo_id: &str, snapshot_id: &str) -> PathBuf {
        self.snapshot_dir(repo_id, snapshot_id)
            .join("dependencies.msgpack")
    }

    fn meta_path(&self, repo_id: &str, snapshot_id: &str) -> PathBuf {
        self.snapshot_dir(repo_id, snapshot_id).join("meta.json")
    }

    async fn find_repo_for_snapshot(&self, snapshot_id: &str) -> Result<String> {
        let mut entries = fs::read_dir(&self.base_dir)
            .await
            .map_err(StorageError::from)?;
        while let Some(entry) = entries.next_entry().await.map_err(StorageError::from)? {
            if entry.path().join(snapshot_id).is_dir() {
                return Ok(entry.file_name().to_string_lossy().into_owned());
            }
        }
        Err(StorageError::snapshot_not_found(snapshot_id))
    }

    async fn write_chunk(&self, repo_id: &str, snapshot_id: &str, chunk: &Chunk) -> Result<()> {
        let dir = self.chunks_dir(repo_id, snapshot_id);
        fs::create_dir_all(&dir).await.map_err(StorageError::from)?;
        let path = dir.join(encode_file_path(&chunk.file_path));
        let mut existing = self.read_chunk_file(&path).await.unwrap_or_default();
        existing.retain(|c| c.id != chunk.id);
        existing.push(chunk.clone());
        existing.sort_by_key(|c| c.start_line);
        let bytes = rmp_serde::to_vec(&existing)?;
        fs::write(&path, bytes).await.map_err(StorageError::from)?;
        Ok(())
    }

    async fn read_chunk_file(&self, path: &Path) -> Result<Vec<Chunk>> {
        let bytes = fs::read(path).await.map_err(StorageError::from)?;
        let chunks: Vec<Chunk> = rmp_serde::from_slice(&bytes)?;
        Ok(chunks)
    }
}

#[async_trait]
impl CodeSnapshotStore for FilesystemSnapshotStore {
    async fn save_snapshot(&self, snapshot: &Snapshot) -> Result<()> {
        let dir = self.snapshot_dir(&snapshot.repo_id, &snapshot.id);
        fs::create_dir_all(&dir).await.map_err(StorageError::from)?;
        let json = serde_json::to_vec_pretty(snapshot)?;
        fs::write(self.meta_path(&snapshot.repo_id, &snapshot.id), json)
            .await
            .map_err(StorageError::from)?;
        Ok(())
    }

    async fn get_snapshot(&self, snapshot_id: &str) -> Result<Snapshot> {
        let repo_id = self.find_repo_for_snapshot(snapshot_id).await?;
        let bytes = fs::read(self.meta_path(&repo_id, snapshot_id))
            .await
            .map_err(|_| StorageError::snapshot_not_found(snapshot_id))?;
        let snapshot: Snapshot = serde_json::from_slice(&bytes)?;
        Ok(snapshot)
    }

    async fn list_snapshots(&self, repo_id: &str, limit: Option<usize>) -> Result<Vec<Snapshot>> {
        let repo_dir = self.base_dir.join(repo_id);
        if !repo_dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut snapshots = Vec::new();
        let mut entries = fs::read_dir(&repo_dir).await.map_err(StorageError::from)?;
        while let Some(entry) = entries.next_entry().await.map_err(StorageError::from)? {
            let meta = entry.path().join("meta.json");
            if meta.is_file() {
                let bytes = fs::read(&meta).await.map_err(StorageError::from)?;
                let snapshot: Snapshot = serde_json::from_slice(&bytes)?;
                snapshots.push(snapshot);
            }
        }
        snapshots.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        if let Some(limit) = limit {
            snapshots.truncate(limit);
        }
        Ok(snapshots)
    }

    async fn save_chunk(&self, snapshot_id: &str, chunk: &Chunk) -> Result<()> {
        let repo_id = self.find_repo_for_snapshot(snapshot_id).await?;
        self.write_chunk(&repo_id, snapshot_id, chunk).await
    }

    async fn save_chunks(&self, snapshot_id: &str, chunks: &[Chunk]) -> Result<()> {
        let repo_id = self.find_repo_for_snapshot(snapshot_id).await?;
        let mut by_file: HashMap<&str, Vec<&Chunk>> = HashMap::new();
        for chunk in chunks {
            by_file.entry(chunk.file_path.as_str()).or_default().push(chunk);
        }
        let dir = self.chunks_dir(&repo_id, snapshot_id);
        fs::create_dir_all(&dir).await.map_err(StorageError::from)?;
        for (file_path, file_chunks) in by_file {
            let path = dir.join(encode_file_path(file_path));
            let mut existing = self.read_chunk_file(&path).await.unwrap_or_default();
            let new_ids: std::collections::HashSet<&str> =
                file_chunks.iter().map(|c| c.id.as_str()).collect();
            existing.retain(|c| !new_ids.contains(c.id.as_str()));
            existing.extend(file_chunks.into_iter().cloned());
            existing.sort_by_key(|c| c.start_line);
            let bytes = rmp_serde::to_vec(&existing)?;
            fs::write(&path, bytes).await.map_err(StorageError::from)?;
        }
        Ok(())
    }

    async fn get_chunks(&self, snapshot_id: &str, file_path: &str) -> Result<Vec<Chunk>> {
        let repo_id = self.find_repo_for_snapshot(snapshot_id).await?;
        let path = self
            .chunks_dir(&repo_id, snapshot_id)
            .join(encode_file_path(file_path));
        if !path.is_file() {
            return Ok(Vec::new());
        }
        self.read_chunk_file(&path).await
    }

    async fn get_chunk(&self, snapshot_id: &str, chunk_id: &str) -> Result<Chunk> {
        let repo_id = self.find_repo_for_snapshot(snapshot_id).await?;
        let dir = self.chunks_dir(&repo_id, snapshot_id);
        if dir.is_dir() {
            let mut entries = fs::read_dir(&dir).await.map_err(StorageError::from)?;
            while let Some(entry) = entries.next_entry().await.map_err(StorageError::from)? {
                let chunks = self.read_chunk_file(&entry.path()).await?;
                if let Some(chunk) = chunks.into_iter().find(|c| c.id == chunk_id) {
                    return Ok(chunk);
                }
            }
        }
        Err(StorageError::chunk_not_found(chunk_id))
    }

    async fn replace_file(
        &self,
        repo_id: &str,
        old_commit: &str,
        new_commit: &str,
        file_path: &str,
        chunks: Vec<Chunk>,
    ) -> Result<()> {
        let new_snapshot = Snapshot::new(new_commit.to_string(), repo_id.to_string());
        self.save_snapshot(&new_snapshot).await?;

        let old_chunks_dir = self.chunks_dir(repo_id, old_commit);
        let new_chunks_dir = self.chunks_dir(repo_id, new_commit);
        fs::create_dir_all(&new_chunks_dir)
            .await
            .map_err(StorageError::from)?;
        if old_chunks_dir.is_dir() {
            let mut entries = fs::read_dir(&old_chunks_dir)
                .await
                .map_err(StorageError::from)?;
            while let Some(entry) = entries.next_entry().await.map_err(StorageError::from)? {
                let src = entry.path();
                if src.file_name().and_then(|n| n.to_str()) == Some(&encode_file_path(file_path)) {
                    continue;
                }
                let dest = new_chunks_dir.join(entry.file_name());
                fs::copy(&src, &dest).await.map_err(StorageError::from)?;
            }
        }

        let old_deps = self.deps_path(repo_id, old_commit);
        if old_deps.is_file() {
            fs::copy(&old_deps, self.deps_path(repo_id, new_commit))
                .await
                .map_err(StorageError::from)?;
        }

        let new_path = new_chunks_dir.join(encode_file_path(file_path));
        let mut sorted = chunks;
        sorted.sort_by_key(|c| c.start_line);
        let bytes = rmp_serde::to_vec(&sorted)?;
        fs::write(&new_path, bytes).await.map_err(StorageError::from)?;
        Ok(())
    }

    async fn save_dependencies(&self, snapshot_id: &str, dependencies: &[Dependency]) -> Result<()> {
        let repo_id = self.find_repo_for_snapshot(snapshot_id).await?;
        let path = self.deps_path(&repo_id, snapshot_id);
        let mut existing: Vec<Dependency> = if path.is_file() {
            let bytes = fs::read(&path).await.map_err(StorageError::from)?;
            rmp_serde::from_slice(&bytes)?
        } else {
            Vec::new()
        };
        existing.extend(dependencies.iter().cloned());
        let bytes = rmp_serde::to_vec(&existing)?;
        fs::write(&path, bytes).await.map_err(StorageError::from)?;
        Ok(())
    }

    async fn get_dependencies(&self, snapshot_id: &str, chunk_id: &str) -> Result<Vec<Dependency>> {
        let repo_id = self.find_repo_for_snapshot(snapshot_id).await?;
        let path = self.deps_path(&repo_id, snapshot_id);
        if !path.is_file() {
            return Ok(Vec::new());
        }
        let bytes = fs::read(&path).await.map_err(StorageError::from)?;
        let all: Vec<Dependency> = rmp_serde::from_slice(&bytes)?;
        Ok(all
            .into_iter()
            .filter(|d| d.from_chunk_id == chunk_id)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn save_and_get_snapshot() {
        let dir = tempdir().unwrap();
        let store = FilesystemSnapshotStore::new(dir.path());
        let snapshot = Snapshot::new("abc123", "my-repo");
        store.save_snapshot(&snapshot).await.unwrap();

        let loaded = store.get_snapshot("abc123").await.unwrap();
        assert_eq!(loaded.id, "abc123");
        assert_eq!(loaded.repo_id, "my-repo");
    }

    #[tokio::test]
    async fn get_missing_snapshot_errors() {
        let dir = tempdir().unwrap();
        let store = FilesystemSnapshotStore::new(dir.path());
        let err = store.get_snapshot("nope").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::SnapshotNotFound);
    }

    #[tokio::test]
    async fn save_and_query_chunks() {
        let dir = tempdir().unwrap();
        let store = FilesystemSnapshotStore::new(dir.path());
        let snapshot = Snapshot::new("abc123", "my-repo");
        store.save_snapshot(&snapshot).await.unwrap();

        let chunks = vec![
            Chunk::new("c1", "src/auth.py", 1, 50, "def login(): pass"),
            Chunk::new("c2", "src/auth.py", 51, 100, "def logout(): pass"),
        ];
        store.save_chunks("abc123", &chunks).await.unwrap();

        let fetched = store.get_chunks("abc123", "src/auth.py").await.unwrap();
        assert_eq!(fetched.len(), 2);
        assert_eq!(fetched[0].id, "c1");
    }

    #[tokio::test]
    async fn replace_file_preserves_untouched_chunks() {
        let dir = tempdir().unwrap();
        let store = FilesystemSnapshotStore::new(dir.path());
        store
            .save_snapshot(&Snapshot::new("commit1", "my-repo"))
            .await
            .unwrap();
        store
            .save_chunks(
                "commit1",
                &[
                    Chunk::new("c1", "auth.py", 1, 50, "old auth"),
                    Chunk::new("c2", "other.py", 1, 10, "unrelated"),
                ],
            )
            .await
            .unwrap();

        store
            .replace_file(
                "my-repo",
                "commit1",
                "commit2",
                "auth.py",
                vec![Chunk::new("c3", "auth.py", 1, 60, "new auth")],
            )
            .await
            .unwrap();

        let new_auth = store.get_chunks("commit2", "auth.py").await.unwrap();
        assert_eq!(new_auth.len(), 1);
        assert_eq!(new_auth[0].id, "c3");

        let other = store.get_chunks("commit2", "other.py").await.unwrap();
        assert_eq!(other.len(), 1, "unrelated file's chunks carry over untouched");

        let old_auth = store.get_chunks("commit1", "auth.py").await.unwrap();
        assert_eq!(old_auth[0].id, "c1", "old snapshot is left unchanged");
    }

    #[tokio::test]
    async fn dependencies_roundtrip() {
        let dir = tempdir().unwrap();
        let store = FilesystemSnapshotStore::new(dir.path());
        store
            .save_snapshot(&Snapshot::new("commit1", "my-repo"))
            .await
            .unwrap();
        store
            .save_dependencies(
                "commit1",
                &[Dependency::new("c1", "c2", "call"), Dependency::new("c1", "c3", "import")],
            )
            .await
            .unwrap();

        let deps = store.get_dependencies("commit1", "c1").await.unwrap();
        assert_eq!(deps.len(), 2);
    }
}
