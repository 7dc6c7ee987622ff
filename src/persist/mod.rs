//! Board persistence.
//!
//! The engine hands finished boards to a `LayoutGateway`; the default
//! implementation is a JSON file under the data directory. Saves are
//! whole-board and last-writer-wins. A short content hash travels with
//! every save so clients can cheaply detect out-of-band changes.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::layout::{validate_board, Board, LayoutError};

/// Compute SHA256 hash of a board (first 8 chars)
pub fn board_sha(board: &Board) -> String {
    let mut hasher = Sha256::new();
    let json = serde_json::to_string(board).unwrap_or_default();
    hasher.update(json.as_bytes());
    let result = hasher.finalize();
    hex::encode(&result[..4]) // First 8 hex chars
}

/// Storage backend for the board.
#[async_trait]
pub trait LayoutGateway: Send + Sync {
    /// Load the persisted board. A backend with nothing stored yet
    /// returns the empty default, not an error.
    async fn load(&self) -> Result<Board>;

    /// Persist the whole board.
    async fn save(&self, board: &Board) -> Result<()>;
}

pub type SharedGateway = Arc<dyn LayoutGateway>;

/// On-disk shape: the board plus a write timestamp. Files migrated from
/// earlier installs have no timestamp.
#[derive(Serialize, Deserialize)]
struct BoardFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    saved_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    board: Board,
}

/// JSON file under the data directory.
#[derive(Debug, Clone)]
pub struct FileLayoutGateway {
    data_dir: PathBuf,
}

impl FileLayoutGateway {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    fn board_file(&self) -> PathBuf {
        self.data_dir.join("board.json")
    }
}

#[async_trait]
impl LayoutGateway for FileLayoutGateway {
    async fn load(&self) -> Result<Board> {
        let path = self.board_file();
        if !path.exists() {
            return Ok(Board::default());
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let file: BoardFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        validate_board(&file.board)?;
        Ok(file.board)
    }

    async fn save(&self, board: &Board) -> Result<()> {
        let path = self.board_file();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let file = BoardFile {
            saved_at: Some(Utc::now()),
            board: board.clone(),
        };
        let json = serde_json::to_string_pretty(&file).context("Failed to serialize board")?;
        fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}

/// In-memory backend for demo mode and tests. Can be told to fail saves
/// to exercise the optimistic-update error path.
#[derive(Default)]
pub struct MemoryLayoutGateway {
    board: RwLock<Board>,
    failing: AtomicBool,
}

impl MemoryLayoutGateway {
    pub fn new(board: Board) -> Self {
        Self {
            board: RwLock::new(board),
            failing: AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub async fn stored(&self) -> Board {
        self.board.read().await.clone()
    }
}

#[async_trait]
impl LayoutGateway for MemoryLayoutGateway {
    async fn load(&self) -> Result<Board> {
        Ok(self.board.read().await.clone())
    }

    async fn save(&self, board: &Board) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("memory gateway rejecting saves");
        }
        *self.board.write().await = board.clone();
        Ok(())
    }
}

/// Server-side board holder: the current board behind a lock, plus the
/// gateway it syncs to.
#[derive(Clone)]
pub struct BoardStore {
    board: Arc<RwLock<Board>>,
    gateway: SharedGateway,
}

impl BoardStore {
    /// Open the store, loading whatever the gateway has. A load failure
    /// falls back to an empty board so the server still comes up.
    pub async fn open(gateway: SharedGateway) -> Self {
        let board = match gateway.load().await {
            Ok(board) => board,
            Err(e) => {
                tracing::warn!("Failed to load board, starting empty: {e:#}");
                Board::default()
            }
        };
        Self {
            board: Arc::new(RwLock::new(board)),
            gateway,
        }
    }

    pub async fn snapshot(&self) -> Board {
        self.board.read().await.clone()
    }

    pub async fn sha(&self) -> String {
        let board = self.board.read().await;
        board_sha(&board)
    }

    /// Validate and swap in a replacement board. Memory only; callers
    /// decide when to push it through the gateway.
    pub async fn replace(&self, board: Board) -> Result<String, LayoutError> {
        validate_board(&board)?;
        let sha = board_sha(&board);
        *self.board.write().await = board;
        Ok(sha)
    }

    /// Apply one edit closure to the live board under the write lock, so
    /// racing writers compose instead of overwriting each other. The
    /// closure edits a working copy that is swapped in only when it
    /// reports a change. Returns the new sha, or `None` for a no-op.
    /// Memory only, like `replace`.
    pub async fn update<F>(&self, edit: F) -> Option<String>
    where
        F: FnOnce(&mut Board) -> bool,
    {
        let mut guard = self.board.write().await;
        let mut next = guard.clone();
        if !edit(&mut next) {
            return None;
        }
        let sha = board_sha(&next);
        *guard = next;
        Some(sha)
    }

    /// Push the current board through the gateway.
    pub async fn persist(&self) -> Result<()> {
        let board = self.snapshot().await;
        self.gateway.save(&board).await
    }
}
