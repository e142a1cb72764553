//! Signatures supplied as files
//!
//! A `.json` file holds strokes as lists of `[x, y]` pad coordinates and is
//! replayed through the pad's pointer handling. A PNG or JPEG file is drawn
//! onto the pad scaled to its size.

use crate::error::{JurnalError, Result};
use jurnal_common::input::{InputEvent, PointerPhase, SurfaceOffset};
use jurnal_common::record::SignatureRole;
use jurnal_common::session::FormSession;
use jurnal_common::signature::DecodedSignature;
use jurnal_common::store::KeyValueBackend;
use log::debug;
use std::path::{Path, PathBuf};
use std::time::Instant;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

pub enum SignatureInput {
    Strokes(Vec<Vec<[f32; 2]>>),
    Image(DecodedSignature),
}

/// Read a signature file. Image decoding runs on the blocking pool.
pub async fn load(path: &Path) -> Result<SignatureInput> {
    if !path.exists() {
        return Err(JurnalError::FileNotFound(path.display().to_string()));
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    if extension == "json" {
        let content = tokio::fs::read_to_string(path).await?;
        let strokes: Vec<Vec<[f32; 2]>> = serde_json::from_str(&content)?;
        debug!("{}: {} strokes", path.display(), strokes.len());
        return Ok(SignatureInput::Strokes(strokes));
    }

    if IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        let owned: PathBuf = path.to_path_buf();
        let decoded = tokio::task::spawn_blocking(move || {
            image::open(&owned)
                .map(|img| DecodedSignature::from_rgba(img.to_rgba8()))
                .map_err(|e| JurnalError::ImageLoad(format!("{}: {}", owned.display(), e)))
        })
        .await
        .map_err(|e| JurnalError::Task(e.to_string()))??;
        debug!("{}: {}x{}", path.display(), decoded.width(), decoded.height());
        return Ok(SignatureInput::Image(decoded));
    }

    Err(JurnalError::UnsupportedSignature(path.display().to_string()))
}

/// Put a loaded signature on the pad for `role`.
pub fn apply<B: KeyValueBackend>(
    session: &mut FormSession<B>,
    role: SignatureRole,
    input: &SignatureInput,
    now: Instant,
) {
    match input {
        SignatureInput::Strokes(strokes) => {
            let target = session.surface(role).id();
            let offset = SurfaceOffset::default();
            for stroke in strokes {
                let Some((first, rest)) = stroke.split_first() else {
                    continue;
                };
                let down = InputEvent::pointer(PointerPhase::Down, first[0] as f64, first[1] as f64);
                session.handle_input(target, &down, offset, now);
                // a lone point still leaves a dot
                let moves = if rest.is_empty() { std::slice::from_ref(first) } else { rest };
                for point in moves {
                    let event = InputEvent::pointer(PointerPhase::Move, point[0] as f64, point[1] as f64);
                    session.handle_input(target, &event, offset, now);
                }
                let up = InputEvent::pointer(PointerPhase::Up, first[0] as f64, first[1] as f64);
                session.handle_input(target, &up, offset, now);
            }
        }
        SignatureInput::Image(decoded) => session.draw_signature(role, decoded, now),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use jurnal_common::store::{MemoryBackend, RecordStore};
    use tempfile::tempdir;

    fn session() -> FormSession<MemoryBackend> {
        let today = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        FormSession::new(RecordStore::new(MemoryBackend::new()), 400, 200, today)
    }

    #[tokio::test]
    async fn test_json_strokes_are_drawn() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ttd.json");
        std::fs::write(&path, "[[[10, 10], [60, 40]], [[100, 100]]]").unwrap();

        let input = load(&path).await.unwrap();
        let mut session = session();
        apply(&mut session, SignatureRole::Student, &input, Instant::now());

        let surface = session.surface(SignatureRole::Student);
        assert!(!surface.is_empty());
        assert_eq!(surface.strokes().len(), 2);
        assert!(session.surface(SignatureRole::Teacher).is_empty());
    }

    #[tokio::test]
    async fn test_png_is_scaled_onto_pad() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ttd.png");
        let mut img = image::RgbaImage::new(40, 20);
        for pixel in img.pixels_mut() {
            *pixel = image::Rgba([0, 0, 0, 255]);
        }
        img.save(&path).unwrap();

        let input = load(&path).await.unwrap();
        let mut session = session();
        apply(&mut session, SignatureRole::Teacher, &input, Instant::now());

        let bitmap = session.surface(SignatureRole::Teacher).bitmap();
        assert_eq!(bitmap.get_pixel(399, 199)[3], 255);
    }

    #[tokio::test]
    async fn test_unknown_extension_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ttd.txt");
        std::fs::write(&path, "x").unwrap();
        assert!(matches!(load(&path).await, Err(JurnalError::UnsupportedSignature(_))));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("none.png");
        assert!(matches!(load(&missing).await, Err(JurnalError::FileNotFound(_))));
    }
}
