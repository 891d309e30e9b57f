use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use log::{debug, error, info, warn};
use crate::errors::WikiError;
use crate::types::{LoadOutcome, Page};

const PAGE_SUFFIX: &str = ".txt";

/// Service for loading and saving page bodies as flat files
#[derive(Clone)]
pub struct PageService {
    data_dir: PathBuf,
}

impl PageService {
    /// Create a new page service rooted at `data_dir`
    pub fn new(data_dir: PathBuf) -> Self {
        debug!("Creating PageService with data directory: {:?}", data_dir);
        Self { data_dir }
    }

    /// Map a title to its file, rejecting anything that could leave the data directory
    pub fn page_path(&self, title: &str) -> Result<PathBuf, WikiError> {
        if title.is_empty()
            || title == "."
            || title == ".."
            || title.contains(['/', '\\', '\0'])
        {
            warn!("Rejected page title: {:?}", title);
            return Err(WikiError::InvalidPath);
        }
        Ok(self.data_dir.join(format!("{}{}", title, PAGE_SUFFIX)))
    }

    /// Load a page. A missing file is `LoadOutcome::NotFound`; other read failures are errors.
    pub fn load(&self, title: &str) -> Result<LoadOutcome, WikiError> {
        let path = self.page_path(title)?;
        debug!("Loading page '{}' from {:?}", title, path);

        match fs::read(&path) {
            Ok(body) => {
                info!("Loaded page '{}', {} bytes", title, body.len());
                Ok(LoadOutcome::Found(Page::new(title, body)))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No stored page for '{}'", title);
                Ok(LoadOutcome::NotFound)
            }
            Err(e) => {
                error!("Failed to read page {:?}: {}", path, e);
                Err(WikiError::Io(e))
            }
        }
    }

    /// Persist a page, creating or truncating its file. The previous body is discarded.
    pub fn save(&self, page: &Page) -> Result<(), WikiError> {
        let path = self.page_path(&page.title)?;
        debug!("Saving page '{}' to {:?}", page.title, path);

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&path).map_err(|e| {
            error!("Failed to open {:?} for writing: {}", path, e);
            WikiError::Io(e)
        })?;
        file.write_all(&page.body).map_err(|e| {
            error!("Failed to write page {:?}: {}", path, e);
            WikiError::Io(e)
        })?;

        info!("Saved page '{}', {} bytes", page.title, page.body.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> (tempfile::TempDir, PageService) {
        let dir = tempfile::tempdir().unwrap();
        let service = PageService::new(dir.path().to_path_buf());
        (dir, service)
    }

    #[test]
    fn save_then_load_returns_same_body() {
        let (_dir, pages) = service();
        let body = b"hello [World]\n\xffraw bytes".to_vec();
        pages.save(&Page::new("Test", body.clone())).unwrap();

        match pages.load("Test").unwrap() {
            LoadOutcome::Found(page) => {
                assert_eq!(page.title, "Test");
                assert_eq!(page.body, body);
            }
            LoadOutcome::NotFound => panic!("page should exist"),
        }
    }

    #[test]
    fn empty_body_round_trips() {
        let (_dir, pages) = service();
        pages.save(&Page::empty("Blank")).unwrap();
        match pages.load("Blank").unwrap() {
            LoadOutcome::Found(page) => assert!(page.body.is_empty()),
            LoadOutcome::NotFound => panic!("page should exist"),
        }
    }

    #[test]
    fn missing_page_is_not_found() {
        let (_dir, pages) = service();
        assert!(matches!(pages.load("Nope").unwrap(), LoadOutcome::NotFound));
    }

    #[test]
    fn file_is_named_after_title() {
        let (dir, pages) = service();
        pages.save(&Page::new("abc123", "x")).unwrap();
        assert_eq!(fs::read(dir.path().join("abc123.txt")).unwrap(), b"x");
    }

    #[test]
    fn save_overwrites_previous_body() {
        let (_dir, pages) = service();
        pages.save(&Page::new("Same", "a much longer first body")).unwrap();
        pages.save(&Page::new("Same", "short")).unwrap();
        match pages.load("Same").unwrap() {
            LoadOutcome::Found(page) => assert_eq!(page.body, b"short"),
            LoadOutcome::NotFound => panic!("page should exist"),
        }
    }

    #[test]
    fn saves_from_two_threads_last_writer_wins() {
        let (_dir, pages) = service();
        let first = pages.clone();
        let b1 = vec![b'1'; 64 * 1024];
        let b2 = vec![b'2'; 64 * 1024];
        let b1_clone = b1.clone();
        std::thread::spawn(move || first.save(&Page::new("Race", b1_clone)).unwrap())
            .join()
            .unwrap();
        let second = pages.clone();
        let b2_clone = b2.clone();
        std::thread::spawn(move || second.save(&Page::new("Race", b2_clone)).unwrap())
            .join()
            .unwrap();

        match pages.load("Race").unwrap() {
            LoadOutcome::Found(page) => assert_eq!(page.body, b2),
            LoadOutcome::NotFound => panic!("page should exist"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn saved_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let (dir, pages) = service();
        pages.save(&Page::new("Secret", "body")).unwrap();
        let mode = fs::metadata(dir.path().join("Secret.txt")).unwrap().permissions().mode();
        assert_eq!(mode & 0o077, 0);
    }

    #[test]
    fn traversal_titles_are_rejected() {
        let (_dir, pages) = service();
        for title in ["", ".", "..", "../etc", "a/b", "a\\b"] {
            assert!(matches!(pages.load(title), Err(WikiError::InvalidPath)), "{title:?}");
            assert!(matches!(pages.save(&Page::empty(title)), Err(WikiError::InvalidPath)), "{title:?}");
        }
    }

    #[test]
    fn unreadable_page_is_an_io_error() {
        let (dir, pages) = service();
        fs::create_dir(dir.path().join("Dir.txt")).unwrap();
        assert!(matches!(pages.load("Dir"), Err(WikiError::Io(_))));
    }
}
