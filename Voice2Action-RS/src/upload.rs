//! Local audio file handling: validation and multipart form construction.

use std::path::Path;

use reqwest::multipart::{Form, Part};

use crate::error::{Result, V2aError, ValidationError};
use crate::types::AnalysisType;

/// Upload ceiling: 25 MiB.
pub const MAX_UPLOAD_BYTES: u64 = 25 * 1024 * 1024;

/// MIME types the service accepts.
pub const ACCEPTED_MIME_TYPES: &[&str] = &[
    "audio/mpeg",
    "audio/ogg",
    "audio/wav",
    "audio/mp4",
    "audio/x-m4a",
    "audio/mp3",
];

/// Extensions accepted when the MIME type is missing or unrecognized.
pub const ACCEPTED_EXTENSIONS: &[&str] = &[".mp3", ".wav", ".ogg", ".m4a"];

/// An audio file ready to be uploaded.
#[derive(Debug, Clone)]
pub struct AudioFile {
    pub filename: String,
    pub mime: Option<String>,
    pub bytes: Vec<u8>,
}

impl AudioFile {
    /// Wrap in-memory bytes. Nothing is validated until upload.
    pub fn from_bytes(filename: impl Into<String>, mime: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            mime,
            bytes,
        }
    }

    /// Read and validate a file from disk.
    ///
    /// The size is checked against the file metadata before the contents
    /// are read, so oversized files are never loaded.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        let mime = mime_guess::from_path(path)
            .first()
            .map(|m| m.essence_str().to_string());

        let meta = tokio::fs::metadata(path).await.map_err(|e| V2aError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        validate_audio(&filename, mime.as_deref(), meta.len())?;

        let bytes = tokio::fs::read(path).await.map_err(|e| V2aError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Self {
            filename,
            mime,
            bytes,
        })
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Check type and size against the service limits.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        validate_audio(&self.filename, self.mime.as_deref(), self.size())
    }

    /// Build the `multipart/form-data` body: the file under `audio` and the
    /// mode under `analysis_type`.
    pub(crate) fn to_form(&self, analysis: &AnalysisType) -> Result<Form> {
        let mime = self
            .mime
            .clone()
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let part = Part::bytes(self.bytes.clone())
            .file_name(self.filename.clone())
            .mime_str(&mime)
            .map_err(|_| {
                V2aError::Validation(ValidationError::UnsupportedType {
                    filename: self.filename.clone(),
                    mime: Some(mime.clone()),
                })
            })?;
        Ok(Form::new()
            .part("audio", part)
            .text("analysis_type", analysis.as_str().to_string()))
    }
}

/// Validate an audio file by name, MIME type and size.
///
/// The file is accepted when either the MIME type or the lowercased
/// extension is on the accepted list, and the size does not exceed
/// [`MAX_UPLOAD_BYTES`].
pub fn validate_audio(
    filename: &str,
    mime: Option<&str>,
    size: u64,
) -> std::result::Result<(), ValidationError> {
    if filename.is_empty() {
        return Err(ValidationError::NoFile);
    }

    let mime_ok = mime.is_some_and(|m| ACCEPTED_MIME_TYPES.contains(&m));
    let ext_ok = extension_of(filename)
        .map(|ext| ACCEPTED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false);
    if !mime_ok && !ext_ok {
        return Err(ValidationError::UnsupportedType {
            filename: filename.to_string(),
            mime: mime.map(String::from),
        });
    }

    if size > MAX_UPLOAD_BYTES {
        return Err(ValidationError::TooLarge {
            size,
            limit: MAX_UPLOAD_BYTES,
        });
    }

    Ok(())
}

/// Lowercased extension including the leading dot.
fn extension_of(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| format!(".{}", ext.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_known_mime_with_any_name() {
        assert!(validate_audio("recording", Some("audio/mpeg"), 10).is_ok());
        assert!(validate_audio("voice.bin", Some("audio/x-m4a"), 10).is_ok());
    }

    #[test]
    fn accepts_known_extension_without_mime() {
        assert!(validate_audio("meeting.MP3", None, 10).is_ok());
        assert!(validate_audio("memo.m4a", Some("application/octet-stream"), 10).is_ok());
    }

    #[test]
    fn rejects_unknown_type_and_extension() {
        let err = validate_audio("notes.txt", Some("text/plain"), 10).unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnsupportedType {
                filename: "notes.txt".into(),
                mime: Some("text/plain".into()),
            }
        );
        assert!(validate_audio("noextension", None, 10).is_err());
    }

    #[test]
    fn size_ceiling_is_inclusive() {
        assert!(validate_audio("a.mp3", None, MAX_UPLOAD_BYTES).is_ok());
        assert_eq!(
            validate_audio("a.mp3", None, MAX_UPLOAD_BYTES + 1),
            Err(ValidationError::TooLarge {
                size: MAX_UPLOAD_BYTES + 1,
                limit: MAX_UPLOAD_BYTES,
            })
        );
    }

    #[test]
    fn type_is_checked_before_size() {
        let err = validate_audio("movie.mkv", Some("video/x-matroska"), MAX_UPLOAD_BYTES * 2);
        assert!(matches!(err, Err(ValidationError::UnsupportedType { .. })));
    }

    #[test]
    fn malformed_mime_is_a_validation_error() {
        let file = AudioFile::from_bytes("a.mp3", Some("not a mime".into()), vec![0; 4]);
        assert!(file.validate().is_ok());
        assert!(matches!(
            file.to_form(&AnalysisType::Auto),
            Err(V2aError::Validation(ValidationError::UnsupportedType { .. }))
        ));
    }

    #[test]
    fn empty_name_means_no_file() {
        assert_eq!(validate_audio("", None, 0), Err(ValidationError::NoFile));
    }

    #[test]
    fn extension_is_lowercased() {
        assert_eq!(extension_of("A.WaV").as_deref(), Some(".wav"));
        assert_eq!(extension_of("plain"), None);
    }

    #[tokio::test]
    async fn from_path_guesses_mime_and_reads_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("standup.ogg");
        std::fs::write(&path, b"OggS").unwrap();

        let file = AudioFile::from_path(&path).await.unwrap();
        assert_eq!(file.filename, "standup.ogg");
        assert_eq!(file.mime.as_deref(), Some("audio/ogg"));
        assert_eq!(file.size(), 4);
    }

    #[tokio::test]
    async fn from_path_rejects_oversized_file_before_reading() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("long.wav");
        let f = std::fs::File::create(&path).unwrap();
        f.set_len(MAX_UPLOAD_BYTES + 1).unwrap();

        let err = AudioFile::from_path(&path).await.unwrap_err();
        assert!(matches!(
            err,
            V2aError::Validation(ValidationError::TooLarge { .. })
        ));
    }

    #[tokio::test]
    async fn from_path_reports_missing_file() {
        let err = AudioFile::from_path("/definitely/not/here.mp3")
            .await
            .unwrap_err();
        assert!(matches!(err, V2aError::Io { .. }));
    }
}
