//! File-backed page store
//!
//! One file per page, named `<title>.<extension>` inside the data directory.
//! There is no cache and no locking: every load and save goes to disk, and
//! concurrent saves to the same title leave whichever write landed last.

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::{Page, Title};
use crate::error::StoreError;

/// Owner read/write only
#[cfg(unix)]
const PAGE_FILE_MODE: u32 = 0o600;

#[derive(Debug, Clone)]
pub struct PageStore {
    root: PathBuf,
    extension: String,
}

impl PageStore {
    /// Open a store rooted at `root`, creating the directory if needed
    pub fn open(root: impl Into<PathBuf>, extension: &str) -> io::Result<Self> {
        let store = Self::new(root, extension);
        std::fs::create_dir_all(&store.root)?;
        Ok(store)
    }

    /// Build a store without touching the filesystem
    pub fn new(root: impl Into<PathBuf>, extension: &str) -> Self {
        Self {
            root: root.into(),
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    /// Storage key for a title
    pub fn path_for(&self, title: &Title) -> PathBuf {
        self.root.join(format!("{}.{}", title.as_str(), self.extension))
    }

    /// Read a page back from disk
    pub async fn load(&self, title: &Title) -> Result<Page, StoreError> {
        let path = self.path_for(title);
        match fs::read(&path).await {
            Ok(body) => Ok(Page::new(title.clone(), body)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(StoreError::NotFound {
                title: title.to_string(),
            }),
            Err(source) => Err(StoreError::Io {
                title: title.to_string(),
                path,
                source,
            }),
        }
    }

    /// Persist a page, replacing any previous content
    pub async fn save(&self, page: &Page) -> Result<(), StoreError> {
        let path = self.path_for(&page.title);
        write_page_file(&path, &page.body)
            .await
            .map_err(|source| StoreError::Io {
                title: page.title.to_string(),
                path,
                source,
            })
    }
}

async fn write_page_file(path: &Path, body: &[u8]) -> io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(PAGE_FILE_MODE);

    let mut file = options.open(path).await?;
    file.write_all(body).await?;
    file.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn title(raw: &str) -> Title {
        Title::parse(raw).unwrap()
    }

    #[test]
    fn test_path_for_uses_title_and_extension() {
        let store = PageStore::new("/srv/wiki", ".txt");
        assert_eq!(
            store.path_for(&title("Test")),
            PathBuf::from("/srv/wiki/Test.txt")
        );
    }

    #[test]
    fn test_open_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("nested").join("pages");
        let store = PageStore::open(&root, "txt").unwrap();
        assert!(root.is_dir());
        assert_eq!(store.path_for(&title("A")), root.join("A.txt"));
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = PageStore::new(dir.path(), "txt");
        let page = Page::new(title("Test"), "Hello World");

        store.save(&page).await.unwrap();

        let on_disk = std::fs::read(dir.path().join("Test.txt")).unwrap();
        assert_eq!(on_disk, b"Hello World");
        assert_eq!(store.load(&title("Test")).await.unwrap(), page);
    }

    #[tokio::test]
    async fn test_second_save_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = PageStore::new(dir.path(), "txt");

        store
            .save(&Page::new(title("Notes"), "a much longer first version"))
            .await
            .unwrap();
        store.save(&Page::new(title("Notes"), "short")).await.unwrap();

        let loaded = store.load(&title("Notes")).await.unwrap();
        assert_eq!(loaded.body, b"short");
    }

    #[tokio::test]
    async fn test_empty_body_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = PageStore::new(dir.path(), "txt");
        store.save(&Page::blank(title("Empty"))).await.unwrap();
        assert!(store.load(&title("Empty")).await.unwrap().body.is_empty());
    }

    #[tokio::test]
    async fn test_load_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = PageStore::new(dir.path(), "txt");
        let err = store.load(&title("Missing")).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { ref title } if title == "Missing"));
    }

    #[tokio::test]
    async fn test_save_into_missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = PageStore::new(dir.path().join("absent"), "txt");
        let err = store
            .save(&Page::new(title("Test"), "body"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
        assert!(err.to_string().contains("Test"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_saved_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = PageStore::new(dir.path(), "txt");
        store.save(&Page::new(title("Secret"), "x")).await.unwrap();

        let mode = std::fs::metadata(dir.path().join("Secret.txt"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
