//! Printable HTML output

use crate::error::Result;
use jurnal_common::record::Record;
use jurnal_common::render::{self, Document, RenderMode, SignatureSource};
use log::info;
use std::path::{Path, PathBuf};

/// `jurnal-<student>-<date>.html` with the name reduced to safe characters
pub fn default_file_name(record: &Record) -> PathBuf {
    let name = record
        .student_name
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-");
    let name = if name.is_empty() { "siswa".to_string() } else { name };
    PathBuf::from(format!("jurnal-{}-{}.html", name, record.session_date))
}

/// Render a stored record as a print document.
pub fn print_document(record: &Record) -> Result<Document> {
    Ok(render::render(record, RenderMode::Print, SignatureSource::Stored)?)
}

pub fn write_html(doc: &Document, output: &Path) -> Result<()> {
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(output, doc.to_html())?;
    info!("wrote {}", output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use jurnal_common::record::FormState;
    use jurnal_common::signature::{Point, SignatureSurface};

    fn record() -> Record {
        let mut form = FormState::new(NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
        form.student_name = "Ani Lestari".into();
        form.class = "X-1".into();
        form.focus_area = "Belajar".into();
        form.problem = "Sulit fokus".into();
        form.goal = "Fokus".into();
        form.activity = "Konseling".into();
        form.outcome = "Membaik".into();
        form.teacher_note = "Pantau dua minggu".into();
        form.teacher_name = "Bu Sari".into();

        let mut pad = SignatureSurface::new(400, 200);
        pad.begin_stroke(Point::new(10.0, 10.0));
        pad.extend_stroke(pad.id(), Point::new(80.0, 50.0));
        pad.end_stroke();
        form.validate(&pad, &pad).unwrap()
    }

    #[test]
    fn test_default_file_name() {
        assert_eq!(
            default_file_name(&record()),
            PathBuf::from("jurnal-ani-lestari-2024-01-10.html")
        );
    }

    #[test]
    fn test_write_html() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out").join("jurnal.html");
        let doc = print_document(&record()).unwrap();
        write_html(&doc, &output).unwrap();

        let html = std::fs::read_to_string(&output).unwrap();
        assert!(html.contains("Ani Lestari"));
        assert!(html.contains("Pantau dua minggu"));
        assert!(html.contains("10 Januari 2024"));
        assert!(html.contains("data:image/png;base64,"));
    }
}
