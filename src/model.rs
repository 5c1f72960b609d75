//! Data model for the upload and conversion pipelines.
//!
//! Nothing in this module is durable: every value is constructed at the
//! start of one orchestration call and consumed or committed by its end.
//! The only state that outlives a call (the shared document list, the
//! scene graph, canvas shapes) is owned by the whiteboard platform and
//! reached through the [`crate::room::WhiteboardRoom`] trait.

use serde::{Deserialize, Serialize};

/// Cover used for a converted document when the thumbnail service is
/// unavailable. A flat placeholder in the cover's 192×144 aspect.
pub const DEFAULT_COVER_URL: &str = "data:image/svg+xml,%3Csvg xmlns='http://www.w3.org/2000/svg' \
width='192' height='144'%3E%3Crect width='192' height='144' fill='%23e9ebee'/%3E%3C/svg%3E";

/// A caller-supplied file: the original name plus its raw bytes.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// The extension of the original filename, from the last `.` inclusive.
    /// Empty when the name has no dot.
    pub fn extension(&self) -> &str {
        self.name
            .rfind('.')
            .map(|i| &self.name[i..])
            .unwrap_or("")
    }
}

/// Destination of one object-store transfer. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct UploadTarget {
    /// Storage path, `/{folder}/{id}{ext}`.
    pub path: String,
    pub payload: Vec<u8>,
    /// MIME-ish hint derived from the file extension; the store may use it
    /// as the object's content type.
    pub content_hint: String,
}

impl UploadTarget {
    /// Derive the target for `file` under `folder` with the caller's `id`.
    pub fn derive(folder: &str, id: &str, file: &SourceFile) -> Self {
        let ext = file.extension();
        Self::for_path(format!("/{folder}/{id}{ext}"), file)
    }

    /// Target `file` at an explicit storage path.
    pub fn for_path(path: String, file: &SourceFile) -> Self {
        Self {
            path,
            payload: file.bytes.clone(),
            content_hint: content_hint_for(file.extension()).to_string(),
        }
    }
}

fn content_hint_for(ext: &str) -> &'static str {
    match ext.to_ascii_lowercase().as_str() {
        ".pdf" => "application/pdf",
        ".ppt" => "application/vnd.ms-powerpoint",
        ".pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        ".png" => "image/png",
        ".jpg" | ".jpeg" => "image/jpeg",
        ".gif" => "image/gif",
        ".webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

/// What the conversion service should produce from an uploaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// An image deck: one raster image per page.
    Static,
    /// An interactive deck preserving animations and embedded media.
    Dynamic,
}

impl DocumentKind {
    /// CDN path segment the conversion service archives results under.
    pub fn archive_segment(self) -> &'static str {
        match self {
            DocumentKind::Static => "staticConvert",
            DocumentKind::Dynamic => "dynamicConvert",
        }
    }

    /// Deterministic URL of the finished conversion archive.
    pub fn archive_url(self, job_id: &str) -> String {
        format!(
            "https://convertcdn.netless.link/{}/{job_id}.zip",
            self.archive_segment()
        )
    }
}

/// A registered conversion job. Consumed exactly once by the poller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionJob {
    pub job_id: String,
    pub access_token: String,
}

/// Declared slide content of a scene: the rendered resource and its size
/// in whiteboard logical units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenePpt {
    pub src: String,
    pub width: f64,
    pub height: f64,
}

/// One scene of a converted document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDefinition {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ppt: Option<ScenePpt>,
}

/// A converted document as stored in the shared document list.
///
/// Exactly one entry of the list has `active == true` at any time; the
/// commit step clears the flag on every prior entry before appending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    pub active: bool,
    pub kind: DocumentKind,
    /// The scene-group identifier the document's scenes were committed under.
    pub id: String,
    pub scenes: Vec<SceneDefinition>,
    /// Thumbnail of the first scene, or [`DEFAULT_COVER_URL`] when the
    /// thumbnail service was unavailable.
    pub cover: String,
    /// CDN archive of the conversion output, when the document came from a
    /// conversion job.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive_url: Option<String>,
}

/// Pixel or logical dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageSize {
    pub width: f64,
    pub height: f64,
}

impl ImageSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// An image file prepared for canvas insertion: decoded display size plus
/// the screen-space drop coordinate.
#[derive(Debug, Clone)]
pub struct ImageFile {
    /// Display width in logical units, after the scaling policy.
    pub width: f64,
    /// Display height in logical units, after the scaling policy.
    pub height: f64,
    pub file: SourceFile,
    pub coordinate_x: f64,
    pub coordinate_y: f64,
}

/// Correlates a placeholder shape on the canvas with its in-flight upload.
/// Ephemeral: lives only for the duration of one batch insert.
#[derive(Debug, Clone)]
pub struct ImageUploadTask {
    pub task_id: String,
    pub image: ImageFile,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_from_last_dot_inclusive() {
        assert_eq!(SourceFile::new("slide.pdf", vec![]).extension(), ".pdf");
        assert_eq!(
            SourceFile::new("archive.tar.gz", vec![]).extension(),
            ".gz"
        );
        assert_eq!(SourceFile::new("noext", vec![]).extension(), "");
    }

    #[test]
    fn upload_target_path_shape() {
        let file = SourceFile::new("slide.pdf", vec![1, 2, 3]);
        let target = UploadTarget::derive("room1", "abc", &file);
        assert_eq!(target.path, "/room1/abc.pdf");
        assert_eq!(target.payload, vec![1, 2, 3]);
        assert_eq!(target.content_hint, "application/pdf");
    }

    #[test]
    fn archive_url_by_kind() {
        assert_eq!(
            DocumentKind::Dynamic.archive_url("job-9"),
            "https://convertcdn.netless.link/dynamicConvert/job-9.zip"
        );
        assert_eq!(
            DocumentKind::Static.archive_url("job-9"),
            "https://convertcdn.netless.link/staticConvert/job-9.zip"
        );
    }

    #[test]
    fn scene_document_round_trips_through_json() {
        let doc = SceneDocument {
            active: true,
            kind: DocumentKind::Static,
            id: "group-1".into(),
            scenes: vec![SceneDefinition {
                name: "1".into(),
                ppt: Some(ScenePpt {
                    src: "https://cdn/1.png".into(),
                    width: 1280.0,
                    height: 720.0,
                }),
            }],
            cover: DEFAULT_COVER_URL.into(),
            archive_url: None,
        };
        let json = serde_json::to_string(&doc).unwrap();
        let back: SceneDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(back, doc);
    }
}
