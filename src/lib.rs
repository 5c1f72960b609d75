//! # whiteboard-uploader
//!
//! Upload and document-conversion pipeline for real-time collaborative
//! whiteboard rooms.
//!
//! ## What this crate does
//!
//! A whiteboard room wants three things from a dropped file: raw uploads
//! with progress, slide-deck conversion materialized as scene state, and
//! image drops that appear on the canvas immediately while their bytes are
//! still in flight. [`UploadManager`] orchestrates all three against four
//! external collaborators, each a trait seam:
//!
//! ```text
//! caller
//!   │
//!   └─ UploadManager
//!        ├─ ObjectStore        multipart transfer + public URLs
//!        ├─ TaskOperator       conversion job registration, cover thumbnails
//!        ├─ ConversionPoller   bounded wait for a terminal conversion state
//!        └─ WhiteboardRoom     the narrow commit interface to shared state
//! ```
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use whiteboard_uploader::{DocumentKind, SourceFile, UploadConfig, UploadManager};
//! # use whiteboard_uploader::{ObjectStore, WhiteboardRoom};
//! # fn store() -> Arc<dyn ObjectStore> { unimplemented!() }
//! # fn room() -> Arc<dyn WhiteboardRoom> { unimplemented!() }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = UploadConfig::builder("https://api.example.com/v5")
//!         .region("cn-hz")
//!         .build()?;
//!     let manager = UploadManager::with_http_services(store(), room(), config);
//!
//!     let file = SourceFile::new("slide.pdf", std::fs::read("slide.pdf")?);
//!     let document = manager
//!         .convert_file(&file, DocumentKind::Static, "room1", "abc", "room-token", None)
//!         .await?;
//!     println!("committed document {}", document.id);
//!     Ok(())
//! }
//! ```
//!
//! ## Guarantees
//!
//! * Progress events arrive ordered, `Uploading* → Converting* → Stop`; the
//!   final event is always `Stop(1.0)`, success or failure alike.
//! * A failed upload, submission, or conversion never commits a partial
//!   document; the shared document list is untouched on those paths.
//! * After a successful conversion exactly one document in the shared list
//!   is active, and it is the newly appended one.
//! * No network operation is retried; retry policy belongs to the caller.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod manager;
pub mod model;
pub mod poller;
pub mod progress;
pub mod room;
pub mod scale;
pub mod store;
pub mod task;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{UploadConfig, UploadConfigBuilder, COVER_HEIGHT, COVER_WIDTH};
pub use error::UploadError;
pub use manager::UploadManager;
pub use model::{
    ConversionJob, DocumentKind, ImageFile, ImageSize, ImageUploadTask, SceneDefinition,
    SceneDocument, ScenePpt, SourceFile, UploadTarget, DEFAULT_COVER_URL,
};
pub use poller::{ConversionPoller, HttpConversionPoller};
pub use progress::{
    ChannelProgressObserver, NoopProgressObserver, ProgressEvent, ProgressObserver,
    SharedProgressObserver, UploadPhase,
};
pub use room::{
    AnimationMode, CameraFit, CommitError, ImageShape, Point, Tool, VersionedDocuments,
    WhiteboardRoom,
};
pub use scale::{fit_display_size, MAX_DISPLAY_EDGE};
pub use store::{ObjectStore, TransferReceipt};
pub use task::{Cover, CoverFetchError, HttpTaskOperator, TaskOperator};
