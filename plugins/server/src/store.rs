//! Application files edited through the save endpoint

use chrono::{DateTime, Local};
use scribe_core::{Result, ScribeError};
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;
use tokio::fs;
use tracing::debug;

/// Format used for `saved_on`, matching C `ctime()` without the newline
const SAVED_ON_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

/// A file as last read from or written to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub content: String,
    pub file_hash: String,
    pub saved_on: String,
}

/// Files rooted at one directory, one sub-directory per application
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map `app` and a relative `path` to a file under the root.
    ///
    /// Only plain path segments are accepted, so the result cannot leave the
    /// application directory.
    pub fn resolve(&self, app: &str, path: &str) -> Result<PathBuf> {
        let app = Path::new(app);
        let relative = Path::new(path.trim_start_matches('/'));

        let plain = |p: &Path| {
            p.components().count() > 0
                && p.components().all(|c| matches!(c, Component::Normal(_)))
        };
        if !plain(app) || app.components().count() != 1 || !plain(relative) {
            return Err(ScribeError::server(format!(
                "Refusing path outside the application: {}/{}",
                app.display(),
                relative.display()
            )));
        }

        Ok(self.root.join(app).join(relative))
    }

    /// Read a file, `None` when it does not exist yet
    pub async fn read(&self, file: &Path) -> Result<Option<StoredFile>> {
        if !fs::try_exists(file).await? {
            return Ok(None);
        }

        let content = fs::read_to_string(file).await?;
        let saved_on = saved_on(file).await?;
        Ok(Some(StoredFile {
            file_hash: file_hash(&content),
            content,
            saved_on,
        }))
    }

    /// Write `content` and report the new hash and modification time
    pub async fn write(&self, file: &Path, content: &str) -> Result<StoredFile> {
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(file, content).await?;
        debug!("Wrote {} bytes to {}", content.len(), file.display());

        Ok(StoredFile {
            content: content.to_string(),
            file_hash: file_hash(content),
            saved_on: saved_on(file).await?,
        })
    }

    /// Keep a rejected edit next to the file as `{name}.1`
    pub async fn write_backup(&self, file: &Path, content: &str) -> Result<PathBuf> {
        let mut name = file.as_os_str().to_os_string();
        name.push(".1");
        let backup = PathBuf::from(name);
        fs::write(&backup, content).await?;
        debug!("Stored conflicting edit in {}", backup.display());
        Ok(backup)
    }
}

/// Hex md5 of the content, as sent back in `file_hash`
pub fn file_hash(content: &str) -> String {
    format!("{:x}", md5::compute(content.as_bytes()))
}

/// Normalize submitted text: unix line endings, no surrounding blank space, one final newline
pub fn normalize_content(data: &str) -> String {
    let mut content = data.replace("\r\n", "\n").trim().to_string();
    content.push('\n');
    content
}

async fn saved_on(file: &Path) -> Result<String> {
    let modified: SystemTime = fs::metadata(file).await?.modified()?;
    Ok(format_saved_on(modified))
}

pub fn format_saved_on(time: SystemTime) -> String {
    DateTime::<Local>::from(time)
        .format(SAVED_ON_FORMAT)
        .to_string()
}
