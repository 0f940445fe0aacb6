//! File access behind a trait so commands and providers can run against memory in tests.
//!
//! Only three files are ever touched: saved introspection payloads, the project
//! config, and rendered diagrams.

use std::io;
use std::path::Path;

pub trait FileSystem: Send + Sync {
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Replace the file's contents, creating missing parent directories.
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    fn exists(&self, path: &Path) -> bool;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl RealFs {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::BTreeMap;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// Files keyed by their exact path; no directory semantics.
    #[derive(Debug, Default)]
    pub struct MockFs {
        files: Mutex<BTreeMap<PathBuf, String>>,
    }

    impl MockFs {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_files<P, C>(files: impl IntoIterator<Item = (P, C)>) -> Self
        where
            P: AsRef<Path>,
            C: Into<String>,
        {
            let files = files
                .into_iter()
                .map(|(path, content)| (path.as_ref().to_path_buf(), content.into()))
                .collect();
            Self {
                files: Mutex::new(files),
            }
        }

        pub fn files(&self) -> BTreeMap<PathBuf, String> {
            self.files.lock().unwrap().clone()
        }
    }

    impl FileSystem for MockFs {
        fn read_to_string(&self, path: &Path) -> io::Result<String> {
            self.files.lock().unwrap().get(path).cloned().ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no such file: {}", path.display()),
                )
            })
        }

        fn write(&self, path: &Path, content: &str) -> io::Result<()> {
            self.files
                .lock()
                .unwrap()
                .insert(path.to_path_buf(), content.to_string());
            Ok(())
        }

        fn exists(&self, path: &Path) -> bool {
            self.files.lock().unwrap().contains_key(path)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_missing_file_is_not_found() {
            let fs = MockFs::new();
            let err = fs.read_to_string(Path::new("/schema.json")).unwrap_err();
            assert_eq!(err.kind(), io::ErrorKind::NotFound);
            assert!(!fs.exists(Path::new("/schema.json")));
        }

        #[test]
        fn test_write_replaces_contents() {
            let fs = MockFs::with_files([("/out/diagram.svg", "<svg/>")]);
            fs.write(Path::new("/out/diagram.svg"), "<svg></svg>").unwrap();

            assert_eq!(
                fs.read_to_string(Path::new("/out/diagram.svg")).unwrap(),
                "<svg></svg>"
            );
            assert_eq!(fs.files().len(), 1);
        }
    }
}
