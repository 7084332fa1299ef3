//! Uploaded pictures and recordings.
//!
//! An upload is first staged under a random `upload-*` name, since the
//! record it belongs to has no id yet. Once the record is written the file is
//! renamed to `<id>.<ext>` and the record's reference is updated to match.

use std::{
  io::Write as _,
  path::{Path, PathBuf},
};

use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use serde::Deserialize;

use crate::error::ApiError;

/// Where an upload lives and what it must be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
  CategoryPicture,
  SubCategoryPicture,
  CardSound,
}

impl MediaKind {
  /// Directory relative to the media root.
  pub fn dir(self) -> &'static str {
    match self {
      Self::CategoryPicture => "categories/pictures",
      Self::SubCategoryPicture => "subcategories/pictures",
      Self::CardSound => "cards/sounds",
    }
  }

  pub fn extension(self) -> &'static str {
    match self {
      Self::CategoryPicture | Self::SubCategoryPicture => "svg",
      Self::CardSound => "mp3",
    }
  }
}

/// A file sent inline in a JSON body.
#[derive(Debug, Clone, Deserialize)]
pub struct Upload {
  /// Client-side file name; only its extension is used.
  pub filename: String,
  /// Base64-encoded file contents.
  pub data:     String,
}

/// File storage under the configured media root.
#[derive(Debug, Clone)]
pub struct MediaStore {
  root: PathBuf,
}

impl MediaStore {
  pub fn new(root: impl AsRef<Path>) -> Self {
    Self { root: root.as_ref().to_path_buf() }
  }

  /// Absolute path of a stored reference.
  pub fn path_of(&self, reference: &str) -> PathBuf { self.root.join(reference) }

  /// Validate and write `upload` under a temporary name.
  ///
  /// Returns the reference (path relative to the root) of the staged file.
  pub async fn stage(&self, kind: MediaKind, upload: &Upload) -> Result<String, ApiError> {
    let ext = Path::new(&upload.filename)
      .extension()
      .and_then(|e| e.to_str())
      .map(str::to_ascii_lowercase);
    if ext.as_deref() != Some(kind.extension()) {
      return Err(ApiError::BadRequest(format!(
        "{:?} is not a .{} file",
        upload.filename,
        kind.extension()
      )));
    }

    let bytes = B64
      .decode(upload.data.trim())
      .map_err(|e| ApiError::BadRequest(format!("invalid base64 upload: {e}")))?;

    let dir = self.root.join(kind.dir());
    let suffix = format!(".{}", kind.extension());
    let path = tokio::task::spawn_blocking(move || -> std::io::Result<PathBuf> {
      std::fs::create_dir_all(&dir)?;
      let mut file = tempfile::Builder::new()
        .prefix("upload-")
        .suffix(&suffix)
        .tempfile_in(&dir)?;
      file.write_all(&bytes)?;
      let (_, path) = file.keep().map_err(|e| e.error)?;
      Ok(path)
    })
    .await
    .map_err(std::io::Error::other)??;

    let name = path
      .file_name()
      .and_then(|n| n.to_str())
      .ok_or_else(|| std::io::Error::other("staged file has no UTF-8 name"))?;
    let reference = format!("{}/{name}", kind.dir());
    tracing::debug!(reference = %reference, "upload staged");
    Ok(reference)
  }

  /// Rename a staged file to `<id>.<ext>`, replacing any previous file of
  /// that name. Returns the new reference.
  pub async fn promote(
    &self,
    kind: MediaKind,
    staged: &str,
    id: i64,
  ) -> Result<String, ApiError> {
    let reference = format!("{}/{id}.{}", kind.dir(), kind.extension());
    tokio::fs::rename(self.path_of(staged), self.path_of(&reference)).await?;
    tracing::debug!(from = %staged, to = %reference, "upload renamed");
    Ok(reference)
  }

  /// Promote a staged file and point its record at it with `update`.
  ///
  /// If `update` fails the file is moved back to `staged`, which is where the
  /// record still points.
  pub async fn commit<F, Fut>(
    &self,
    kind: MediaKind,
    staged: &str,
    id: i64,
    update: F,
  ) -> Result<String, ApiError>
  where
    F: FnOnce(String) -> Fut,
    Fut: Future<Output = Result<(), ApiError>>,
  {
    let reference = self.promote(kind, staged, id).await?;
    if let Err(e) = update(reference.clone()).await {
      if let Err(io) =
        tokio::fs::rename(self.path_of(&reference), self.path_of(staged)).await
      {
        tracing::warn!(reference = %reference, error = %io, "failed to restore upload");
      }
      return Err(e);
    }
    Ok(reference)
  }

  /// Remove a staged file whose record was never written.
  pub async fn discard(&self, staged: &str) {
    if let Err(e) = tokio::fs::remove_file(self.path_of(staged)).await {
      tracing::warn!(reference = %staged, error = %e, "failed to discard upload");
    }
  }
}
