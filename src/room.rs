//! The narrow commit interface to the whiteboard's shared state store.
//!
//! The upload manager owns no durable state. Scene lists, the document
//! list, and canvas shapes all live in the room's replicated state; every
//! mutation goes through this trait, and authorization is the platform's
//! concern; whoever holds a [`WhiteboardRoom`] is assumed authorized.
//!
//! # Document-list concurrency
//!
//! The document list is committed as a whole snapshot. The source platform
//! offered only last-write-wins replacement, which silently loses one
//! side's update when two conversions race. This interface instead carries
//! a version token: [`WhiteboardRoom::read_documents`] returns the current
//! version alongside the list, and [`WhiteboardRoom::write_documents`]
//! rejects a stale `expected_version` with [`CommitError::Conflict`] so the
//! caller can re-read and reapply. Adapters over platforms without
//! conflict detection may accept any version, degrading to the old
//! last-write-wins behavior.

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{ImageSize, SceneDefinition, SceneDocument};

/// A whiteboard state write was not applied.
#[derive(Debug, Error)]
pub enum CommitError {
    /// The document list changed since it was read; re-read and reapply.
    #[error("document list version conflict: expected {expected}, current {current}")]
    Conflict { expected: u64, current: u64 },

    /// The platform rejected the write outright.
    #[error("whiteboard rejected the write: {0}")]
    Rejected(String),
}

/// The shared document list together with its version token.
#[derive(Debug, Clone)]
pub struct VersionedDocuments {
    pub version: u64,
    pub documents: Vec<SceneDocument>,
}

/// A 2-D point, in screen or world coordinates depending on context.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// A placeholder image shape to insert into the canvas.
#[derive(Debug, Clone)]
pub struct ImageShape {
    pub id: String,
    /// World-space center of the shape.
    pub center_x: f64,
    pub center_y: f64,
    pub width: f64,
    pub height: f64,
    pub locked: bool,
}

/// Interaction tool the room's local member holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Selector,
    Pencil,
    Eraser,
    Text,
}

/// How a camera move is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationMode {
    /// Jump without animation.
    Immediate,
    /// Animate over the platform's default duration.
    Continuous,
}

/// A viewport rectangle the camera should contain.
#[derive(Debug, Clone, Copy)]
pub struct CameraFit {
    pub origin_x: f64,
    pub origin_y: f64,
    pub width: f64,
    pub height: f64,
    pub animation: AnimationMode,
}

/// One collaborative whiteboard room.
#[async_trait]
pub trait WhiteboardRoom: Send + Sync {
    /// Write a scene list under `dir` (for example `/{owner}/{group}`).
    async fn put_scenes(&self, dir: &str, scenes: &[SceneDefinition]) -> Result<(), CommitError>;

    /// Point every member at the scene at `path`.
    async fn set_active_scene_path(&self, path: &str) -> Result<(), CommitError>;

    /// Snapshot the shared document list and its version.
    async fn read_documents(&self) -> VersionedDocuments;

    /// Replace the shared document list, provided it is still at
    /// `expected_version`.
    async fn write_documents(
        &self,
        expected_version: u64,
        documents: Vec<SceneDocument>,
    ) -> Result<(), CommitError>;

    /// Insert a placeholder image shape; resolved later by
    /// [`WhiteboardRoom::complete_image_shape`].
    async fn insert_image_shape(&self, shape: ImageShape) -> Result<(), CommitError>;

    /// Resolve a placeholder to the uploaded image's URL.
    async fn complete_image_shape(&self, id: &str, url: &str) -> Result<(), CommitError>;

    /// Switch the local member's interaction tool.
    async fn set_active_tool(&self, tool: Tool) -> Result<(), CommitError>;

    /// Move the camera so `fit` is fully visible, centered.
    async fn move_camera_to_fit(&self, fit: CameraFit);

    /// Convert a screen-space point to world space at the current camera.
    fn screen_to_world(&self, point: Point) -> Point;

    /// Current viewport dimensions, used by the image scaling policy.
    fn viewport_size(&self) -> ImageSize;
}
