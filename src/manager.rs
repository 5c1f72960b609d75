//! The upload manager: orchestration of upload, conversion, and commit.
//!
//! ## Pipeline overview
//!
//! ```text
//! file
//!  │
//!  ├─ 1. Upload    multipart transfer to the object store (Uploading ticks)
//!  ├─ 2. Submit    register a conversion job for the uploaded URL
//!  ├─ 3. Wait      poll the conversion service (Converting ticks, 20 min cap)
//!  ├─ 4. Commit    write scenes, activate the first, append the document
//!  ├─ 5. Cover     best-effort 192×144 thumbnail (fallback on failure)
//!  └─ 6. Camera    fit the viewport to the first scene, immediately
//! ```
//!
//! Steps are strictly sequential: each one's output feeds the next. Any
//! failure in steps 1–3 aborts the run before anything is committed, so a
//! failed conversion never leaves a partial document in shared state.
//!
//! The manager holds no durable state of its own; it borrows the room's
//! state store through [`WhiteboardRoom`] and mutates it snapshot-wise.
//! Cancellation is the caller's: dropping the returned future abandons the
//! run, but an in-flight transfer may still complete server-side.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::{UploadConfig, COVER_HEIGHT, COVER_WIDTH};
use crate::error::UploadError;
use crate::model::{
    DocumentKind, ImageFile, ImageSize, ImageUploadTask, SceneDefinition, SceneDocument,
    SourceFile, UploadTarget, DEFAULT_COVER_URL,
};
use crate::poller::{ConversionPoller, HttpConversionPoller};
use crate::progress::{emit, ProgressEvent, SharedProgressObserver, UploadPhase};
use crate::room::{AnimationMode, CameraFit, ImageShape, Point, Tool, WhiteboardRoom};
use crate::scale::fit_display_size;
use crate::store::ObjectStore;
use crate::task::{HttpTaskOperator, TaskOperator};

/// Orchestrates uploads and conversions against one whiteboard room.
pub struct UploadManager {
    store: Arc<dyn ObjectStore>,
    task: Arc<dyn TaskOperator>,
    poller: Arc<dyn ConversionPoller>,
    room: Arc<dyn WhiteboardRoom>,
    config: UploadConfig,
}

impl UploadManager {
    /// Build a manager from explicit collaborator implementations.
    pub fn new(
        store: Arc<dyn ObjectStore>,
        task: Arc<dyn TaskOperator>,
        poller: Arc<dyn ConversionPoller>,
        room: Arc<dyn WhiteboardRoom>,
        config: UploadConfig,
    ) -> Self {
        Self {
            store,
            task,
            poller,
            room,
            config,
        }
    }

    /// Build a manager wired to the platform's HTTP task and conversion
    /// services, per `config`.
    pub fn with_http_services(
        store: Arc<dyn ObjectStore>,
        room: Arc<dyn WhiteboardRoom>,
        config: UploadConfig,
    ) -> Self {
        let task = Arc::new(HttpTaskOperator::new(
            config.api_origin.clone(),
            config.region.clone(),
        ));
        let poller = Arc::new(HttpConversionPoller::new(
            config.api_origin.clone(),
            config.region.clone(),
            config.conversion_ceiling,
            config.poll_interval,
        ));
        Self::new(store, task, poller, room, config)
    }

    // ── Plain upload ──────────────────────────────────────────────────────

    /// Upload `file` to `/{folder}/{id}{ext}` and return its public URL.
    ///
    /// Exactly one network transfer; a transport failure propagates without
    /// retry.
    pub async fn upload_file(
        &self,
        file: &SourceFile,
        folder: &str,
        id: &str,
        observer: Option<&SharedProgressObserver>,
    ) -> Result<String, UploadError> {
        let target = UploadTarget::derive(folder, id, file);
        self.add_file(&target, observer).await
    }

    // ── Conversion pipeline ───────────────────────────────────────────────

    /// Upload `file`, convert it, and commit the result as the room's
    /// active document. Returns the committed document.
    pub async fn convert_file(
        &self,
        file: &SourceFile,
        kind: DocumentKind,
        folder: &str,
        id: &str,
        room_token: &str,
        observer: Option<&SharedProgressObserver>,
    ) -> Result<SceneDocument, UploadError> {
        info!(name = %file.name, ?kind, "starting document conversion");

        // Step 1: upload the raw document.
        let target = UploadTarget::derive(folder, id, file);
        let document_url = self.add_file(&target, observer).await?;

        // Step 2: register the conversion job.
        let job = self.task.create_task(&document_url).await?;
        debug!(job_id = %job.job_id, "conversion job registered");

        // Step 3: wait for a terminal state. The observer gets one Stop
        // event here whether the conversion succeeded or failed; the
        // distinction travels through the Result.
        let tick = |fraction: f64| {
            emit(
                observer,
                ProgressEvent::new(UploadPhase::Converting, fraction),
            );
        };
        let outcome = self.poller.wait_until_terminal(&job, kind, &tick).await;
        emit(observer, ProgressEvent::stop());
        let scenes = outcome?;

        if scenes.is_empty() {
            return Err(UploadError::EmptySceneList {
                job_id: job.job_id.clone(),
            });
        }

        // Steps 4–7: commit scene state, cover, document list, camera.
        let document = self
            .commit_scenes(scenes, id, kind, room_token, &job.job_id)
            .await?;

        info!(job_id = %job.job_id, document_id = %document.id, "document committed");
        Ok(document)
    }

    /// Steps 4–7 of the conversion pipeline: materialize `scenes` as
    /// whiteboard state and append the document to the shared list.
    async fn commit_scenes(
        &self,
        scenes: Vec<SceneDefinition>,
        owner_id: &str,
        kind: DocumentKind,
        room_token: &str,
        job_id: &str,
    ) -> Result<SceneDocument, UploadError> {
        let commit_err = |e: crate::room::CommitError| UploadError::StateCommit {
            detail: e.to_string(),
        };

        // Step 4: write the scene list under a fresh group and activate the
        // first scene.
        let group_id = Uuid::new_v4().to_string();
        let dir = format!("/{owner_id}/{group_id}");
        self.room.put_scenes(&dir, &scenes).await.map_err(commit_err)?;

        let first = &scenes[0];
        let active_path = format!("{dir}/{}", first.name);
        self.room
            .set_active_scene_path(&active_path)
            .await
            .map_err(commit_err)?;

        // Step 5: best-effort cover. Any failure falls back to the bundled
        // default and is never surfaced.
        let cover = match self
            .task
            .get_cover(owner_id, &active_path, COVER_WIDTH, COVER_HEIGHT, room_token)
            .await
        {
            Ok(cover) => cover.url,
            Err(e) => {
                warn!(error = %e, "cover fetch failed, using default cover");
                DEFAULT_COVER_URL.to_string()
            }
        };

        // Step 6: append to the document list, deactivating every prior
        // entry. Whole-snapshot read-modify-write; a version conflict means
        // another commit landed in between, so re-read and reapply.
        let document = SceneDocument {
            active: true,
            kind,
            id: group_id,
            scenes: scenes.clone(),
            cover,
            archive_url: Some(kind.archive_url(job_id)),
        };

        let mut conflicts = 0;
        loop {
            let snapshot = self.room.read_documents().await;
            let mut documents = snapshot.documents;
            for existing in &mut documents {
                existing.active = false;
            }
            documents.push(document.clone());

            match self.room.write_documents(snapshot.version, documents).await {
                Ok(()) => break,
                Err(crate::room::CommitError::Conflict { .. })
                    if conflicts < self.config.commit_conflict_retries =>
                {
                    conflicts += 1;
                    debug!(conflicts, "document list conflict, reapplying");
                }
                Err(e) => return Err(commit_err(e)),
            }
        }

        // Step 7: fit the camera to the first scene's declared size,
        // centered at the origin. Scenes without a declared size (blank
        // pages) skip the move.
        if let Some(ref ppt) = first.ppt {
            self.room
                .move_camera_to_fit(CameraFit {
                    origin_x: -ppt.width / 2.0,
                    origin_y: -ppt.height / 2.0,
                    width: ppt.width,
                    height: ppt.height,
                    animation: AnimationMode::Immediate,
                })
                .await;
        }

        Ok(document)
    }

    // ── Batch image upload ────────────────────────────────────────────────

    /// Insert `files` as image shapes at screen coordinate `(x, y)` and
    /// upload them.
    ///
    /// Placeholders are inserted synchronously in input order before any
    /// transfer starts; transfers then fan out with unordered completion.
    /// One failed transfer fails the whole call, and placeholders already
    /// inserted stay unresolved; there is no rollback.
    pub async fn upload_image_files(
        &self,
        files: Vec<SourceFile>,
        x: f64,
        y: f64,
        observer: Option<&SharedProgressObserver>,
        folder: Option<&str>,
    ) -> Result<(), UploadError> {
        if files.is_empty() {
            return Ok(());
        }

        let images = self.measure_images(files, x, y).await?;

        let tasks: Vec<ImageUploadTask> = images
            .into_iter()
            .map(|image| ImageUploadTask {
                task_id: Uuid::new_v4().to_string(),
                image,
            })
            .collect();

        // Placeholders first: the user sees every shape before any bytes
        // move.
        for task in &tasks {
            let center = self.room.screen_to_world(Point {
                x: task.image.coordinate_x,
                y: task.image.coordinate_y,
            });
            self.room
                .insert_image_shape(ImageShape {
                    id: task.task_id.clone(),
                    center_x: center.x,
                    center_y: center.y,
                    width: task.image.width,
                    height: task.image.height,
                    locked: false,
                })
                .await
                .map_err(|e| UploadError::StateCommit {
                    detail: e.to_string(),
                })?;
        }

        // All-or-nothing join: the first rejection fails the batch; other
        // in-flight transfers are not cancelled, only their results are
        // discarded.
        futures::future::try_join_all(
            tasks
                .iter()
                .map(|task| self.resolve_image_task(task, observer, folder)),
        )
        .await?;

        self.room
            .set_active_tool(Tool::Selector)
            .await
            .map_err(|e| UploadError::StateCommit {
                detail: e.to_string(),
            })?;

        info!(count = tasks.len(), "image batch uploaded");
        Ok(())
    }

    /// Decode pixel dimensions off the async flow and apply the display
    /// scaling policy.
    async fn measure_images(
        &self,
        files: Vec<SourceFile>,
        x: f64,
        y: f64,
    ) -> Result<Vec<ImageFile>, UploadError> {
        let viewport = self.room.viewport_size();

        futures::future::try_join_all(files.into_iter().map(|file| async move {
            let name = file.name.clone();
            let bytes = file.bytes.clone();

            // Header-only probe; decoding full pixel data is unnecessary
            // for dimensions.
            let decoded = tokio::task::spawn_blocking(move || {
                image::ImageReader::new(std::io::Cursor::new(bytes))
                    .with_guessed_format()
                    .map_err(|e| e.to_string())?
                    .into_dimensions()
                    .map_err(|e| e.to_string())
            })
            .await
            .map_err(|e| UploadError::ImageDecode {
                name: name.clone(),
                detail: format!("decode task failed: {e}"),
            })?;

            let (width, height) = decoded.map_err(|detail| UploadError::ImageDecode {
                name: name.clone(),
                detail,
            })?;

            let display =
                fit_display_size(ImageSize::new(width as f64, height as f64), viewport);

            Ok(ImageFile {
                width: display.width,
                height: display.height,
                file,
                coordinate_x: x,
                coordinate_y: y,
            })
        }))
        .await
    }

    /// Upload one image and resolve its placeholder shape.
    async fn resolve_image_task(
        &self,
        task: &ImageUploadTask,
        observer: Option<&SharedProgressObserver>,
        folder: Option<&str>,
    ) -> Result<(), UploadError> {
        let prefix = folder.map(|f| format!("{f}/")).unwrap_or_default();
        let path = format!("/{prefix}{}{}", task.task_id, task.image.file.name);
        let target = UploadTarget::for_path(path, &task.image.file);

        let url = self.add_file(&target, observer).await?;

        self.room
            .complete_image_shape(&task.task_id, &url)
            .await
            .map_err(|e| UploadError::StateCommit {
                detail: e.to_string(),
            })
    }

    // ── Transfer primitive ────────────────────────────────────────────────

    /// Transfer `target` to the object store, re-emitting native progress
    /// ticks as `Uploading` events and one unconditional `Stop` once the
    /// transport finishes. Status 200 yields the public URL; anything else
    /// is a terminal [`UploadError::Transfer`].
    pub async fn add_file(
        &self,
        target: &UploadTarget,
        observer: Option<&SharedProgressObserver>,
    ) -> Result<String, UploadError> {
        let tick = |fraction: f64| {
            emit(
                observer,
                ProgressEvent::new(UploadPhase::Uploading, fraction),
            );
        };

        let receipt = self.store.multipart_upload(target, &tick).await?;
        emit(observer, ProgressEvent::stop());

        if receipt.status == 200 {
            Ok(self.store.public_url(&target.path))
        } else {
            Err(UploadError::Transfer {
                path: target.path.clone(),
                status: receipt.status,
            })
        }
    }
}
