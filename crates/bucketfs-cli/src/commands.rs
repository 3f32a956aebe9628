//! Command implementations. Each returns the text to print.

use anyhow::{Context, Result};
use bucketfs::{BucketFs, InMemoryStore, NodeRef, ObjectMetadata};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Read a listing manifest: a JSON array of object metadata.
pub fn load_manifest(path: &Path) -> Result<Vec<ObjectMetadata>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse manifest: {}", path.display()))
}

/// Write every object in `store` back to a manifest file.
pub fn save_manifest(path: &Path, store: &InMemoryStore) -> Result<()> {
    let json = serde_json::to_string_pretty(&store.objects())?;
    std::fs::write(path, json + "\n")
        .with_context(|| format!("Failed to write manifest: {}", path.display()))
}

#[derive(Debug, Serialize)]
struct StatOutput<'a> {
    path: &'a str,
    kind: &'static str,
    key: &'a str,
    etag: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_modified: Option<String>,
    readable: bool,
    writable: bool,
    executable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    children: Option<usize>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    extra: BTreeMap<String, String>,
}

/// Describe the node at `path` as JSON.
pub fn stat(fs: &BucketFs, path: &str) -> Result<String> {
    let node = fs.get_file_info(path)?;
    let output = StatOutput {
        path: node.path().full_path(),
        kind: if node.is_folder() { "folder" } else { "file" },
        key: node.real_path(),
        etag: node.etag(),
        size: node.size(),
        last_modified: node.metadata().last_modified.map(|t| t.to_rfc3339()),
        readable: node.is_readable(),
        writable: node.is_writable(),
        executable: node.is_executable(),
        children: node.as_folder().map(|f| f.len()),
        extra: node.metadata().extra.clone(),
    };
    Ok(serde_json::to_string_pretty(&output)?)
}

/// List the direct children of a folder, folders marked with a trailing `/`.
pub fn ls(fs: &BucketFs, path: &str) -> Result<String> {
    let folder = fs.get_folder(path)?;
    let mut out = String::new();
    for (name, node) in folder.children() {
        match node {
            NodeRef::Folder(_) => out.push_str(&format!("{name}/\n")),
            NodeRef::File(file) => match file.metadata().size {
                Some(size) => out.push_str(&format!("{name}\t{size}\n")),
                None => out.push_str(&format!("{name}\n")),
            },
        }
    }
    Ok(out)
}

/// Print everything below a folder, indented by depth.
pub fn tree(fs: &BucketFs, path: &str) -> Result<String> {
    let base = fs.get_folder(path)?.path().segments().len();
    let mut out = String::new();
    for node in fs.walk(path)? {
        let depth = node.path().segments().len() - base - 1;
        let name = node.path().basename();
        let suffix = if node.is_folder() { "/" } else { "" };
        out.push_str(&format!("{}{name}{suffix}\n", "  ".repeat(depth)));
    }
    Ok(out)
}

/// Upload `file` to `path` and persist the store to `manifest`.
///
/// The already-built tree is not refreshed, so the result reports whether
/// the cached view still lacks the new object.
pub async fn put(
    fs: &BucketFs,
    store: &InMemoryStore,
    manifest: &Path,
    path: &str,
    file: &Path,
) -> Result<String> {
    let body = std::fs::read(file).with_context(|| format!("Failed to read: {}", file.display()))?;
    fs.put_file_contents(path, &body)
        .await
        .with_context(|| format!("Failed to put {path}"))?;
    save_manifest(manifest, store)?;

    let cached = if fs.exists(path) { "stale" } else { "not cached" };
    Ok(format!(
        "wrote {} bytes to {} (tree view: {cached})\n",
        body.len(),
        fs.config().key_for(path)
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bucketfs::FsConfig;
    use std::sync::Arc;

    async fn fixture() -> (BucketFs, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        store.insert(
            ObjectMetadata::new("x/y/z.txt")
                .size(3)
                .etag("m1")
                .with_extra("storage_class", "STANDARD"),
        );
        store.insert(ObjectMetadata::new("x/y2.txt"));
        let fs = BucketFs::new(store.clone(), FsConfig::new("bucket"))
            .await
            .unwrap();
        (fs, store)
    }

    #[tokio::test]
    async fn test_ls() {
        let (fs, _) = fixture().await;
        assert_eq!(ls(&fs, "/x").unwrap(), "y/\ny2.txt\n");
        assert_eq!(ls(&fs, "/x/y").unwrap(), "z.txt\t3\n");
        assert!(ls(&fs, "/x/y2.txt").is_err());
    }

    #[tokio::test]
    async fn test_tree() {
        let (fs, _) = fixture().await;
        assert_eq!(tree(&fs, "/").unwrap(), "x/\n  y/\n    z.txt\n  y2.txt\n");
        assert_eq!(tree(&fs, "/x/y").unwrap(), "z.txt\n");
    }

    #[tokio::test]
    async fn test_stat() {
        let (fs, _) = fixture().await;
        let json: serde_json::Value = serde_json::from_str(&stat(&fs, "/x/y/z.txt").unwrap()).unwrap();
        assert_eq!(json["kind"], "file");
        assert_eq!(json["etag"], "m1");
        assert_eq!(json["size"], 3);
        assert_eq!(json["writable"], true);
        assert_eq!(json["extra"]["storage_class"], "STANDARD");

        let json: serde_json::Value = serde_json::from_str(&stat(&fs, "/x").unwrap()).unwrap();
        assert_eq!(json["kind"], "folder");
        assert_eq!(json["children"], 2);
        assert!(json.get("extra").is_none());

        let err = stat(&fs, "/x/nope").unwrap_err();
        assert!(err.to_string().contains("x/nope"));
    }

    #[tokio::test]
    async fn test_put_persists_manifest() {
        let (fs, store) = fixture().await;
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("listing.json");
        let body = dir.path().join("body.txt");
        std::fs::write(&body, b"hello").unwrap();

        let out = put(&fs, &store, &manifest, "/x/new.txt", &body).await.unwrap();
        assert!(out.contains("wrote 5 bytes to x/new.txt"));
        assert!(out.contains("not cached"));

        let objects = load_manifest(&manifest).unwrap();
        assert_eq!(objects.len(), 3);
        assert!(objects.iter().any(|o| o.key == "x/new.txt" && o.size == Some(5)));
    }

    #[test]
    fn test_load_manifest_errors_name_file() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("bad.json");
        std::fs::write(&manifest, "not json").unwrap();
        let err = load_manifest(&manifest).unwrap_err();
        assert!(err.to_string().contains("bad.json"));
    }
}
