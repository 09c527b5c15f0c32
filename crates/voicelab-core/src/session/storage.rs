use super::{Session, SessionStore};
use crate::error::{Result, VoiceLabError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// On-disk representation of the session document.
///
/// The three identity fields are written and cleared as a single unit.
#[derive(Debug, Serialize, Deserialize)]
struct SessionDocument {
    token: String,
    name: String,
    email: String,
    /// Timestamp of the last save (ISO 8601 format).
    saved_at: String,
}

/// Manages session persistence to the filesystem.
///
/// `FileSessionStore` writes the session as a single JSON file under a base
/// directory:
/// ```text
/// base_dir/
/// └── session.json
/// ```
pub struct FileSessionStore {
    base_dir: PathBuf,
}

impl FileSessionStore {
    /// Creates a new `FileSessionStore` with the specified base directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    /// Creates a `FileSessionStore` at the default location (~/.voicelab).
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined or if
    /// the directory cannot be created.
    pub fn default_location() -> Result<Self> {
        let home_dir = dirs::home_dir()
            .ok_or_else(|| VoiceLabError::config("Could not determine home directory"))?;
        Self::new(home_dir.join(".voicelab"))
    }

    fn session_file_path(&self) -> PathBuf {
        self.base_dir.join("session.json")
    }

    fn read(&self) -> Result<Option<Session>> {
        let path = self.session_file_path();
        if !path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&path)?;
        let document: SessionDocument = serde_json::from_str(&json)?;

        Ok(Some(Session {
            token: document.token,
            name: document.name,
            email: document.email,
        }))
    }

    fn write(&self, session: &Session) -> Result<()> {
        let document = SessionDocument {
            token: session.token.clone(),
            name: session.name.clone(),
            email: session.email.clone(),
            saved_at: chrono::Utc::now().to_rfc3339(),
        };

        let json = serde_json::to_string_pretty(&document)?;
        fs::write(self.session_file_path(), json)?;
        Ok(())
    }

    fn remove(&self) -> Result<()> {
        let path = self.session_file_path();
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> Result<Option<Session>> {
        self.read()
    }

    async fn save(&self, session: &Session) -> Result<()> {
        self.write(session)
    }

    async fn clear(&self) -> Result<()> {
        self.remove()
    }
}
