//! Record rendering
//!
//! One field-to-section mapping shared by the preview, the print document
//! and the history detail view. The modes differ only in their action
//! buttons and in where the signature images come from.

use crate::error::Result;
use crate::history::HistoryEntry;
use crate::record::{FormField, Record, SignatureRole, DATE_FORMAT};
use crate::signature::SignatureSurface;
use chrono::{Datelike, NaiveDate};
use log::warn;

pub const TITLE: &str = "Jurnal Bimbingan Individu";
/// Size of the signature images in rendered output
pub const OUTPUT_WIDTH: u32 = 200;
pub const OUTPUT_HEIGHT: u32 = 100;
/// Delay before the print dialog opens, so the images can decode
pub const PRINT_DELAY_MS: u64 = 500;

const MONTHS: [&str; 12] = [
    "Januari", "Februari", "Maret", "April", "Mei", "Juni", "Juli", "Agustus", "September",
    "Oktober", "November", "Desember",
];

const IDENTITY_FIELDS: [FormField; 5] = [
    FormField::StudentName,
    FormField::Class,
    FormField::SessionDate,
    FormField::FocusArea,
    FormField::TeacherName,
];

const CONTENT_FIELDS: [FormField; 5] = [
    FormField::Problem,
    FormField::Goal,
    FormField::Activity,
    FormField::Outcome,
    FormField::TeacherNote,
];

/// `10 Januari 2024`
pub fn format_long_date(date: NaiveDate) -> String {
    format!("{} {} {}", date.day(), MONTHS[date.month0() as usize], date.year())
}

/// Long form of a `YYYY-MM-DD` string; anything else is returned as is.
pub fn format_date_str(raw: &str) -> String {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map(format_long_date)
        .unwrap_or_else(|_| raw.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Preview,
    Print,
    HistoryDetail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Print,
    Delete,
    Close,
}

impl Action {
    pub fn id(&self) -> &'static str {
        match self {
            Action::Print => "print",
            Action::Delete => "delete",
            Action::Close => "close",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Action::Print => "Cetak",
            Action::Delete => "Hapus",
            Action::Close => "Tutup",
        }
    }
}

impl RenderMode {
    pub fn actions(&self) -> &'static [Action] {
        match self {
            RenderMode::Preview => &[Action::Print, Action::Close],
            RenderMode::Print => &[],
            RenderMode::HistoryDetail => &[Action::Print, Action::Delete, Action::Close],
        }
    }
}

/// Where the signature images are taken from
#[derive(Clone, Copy)]
pub enum SignatureSource<'a> {
    /// The pads currently on screen
    Live {
        student: &'a SignatureSurface,
        teacher: &'a SignatureSurface,
    },
    /// The encoded images inside the record
    Stored,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldView {
    pub label: String,
    pub value: String,
    /// Value goes on its own block under the label
    pub block: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectionView {
    pub title: &'static str,
    pub fields: Vec<FieldView>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignatureView {
    pub role: SignatureRole,
    pub label: String,
    pub caption: String,
    /// PNG data URL at [`OUTPUT_WIDTH`] x [`OUTPUT_HEIGHT`]
    pub image: String,
    pub signed: bool,
}

/// A rendered record
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub mode: RenderMode,
    pub title: String,
    pub date_line: String,
    pub sections: Vec<SectionView>,
    pub signatures: Vec<SignatureView>,
    pub actions: Vec<Action>,
}

pub fn render(record: &Record, mode: RenderMode, source: SignatureSource<'_>) -> Result<Document> {
    let long_date = format_long_date(record.session_date);

    let identity = IDENTITY_FIELDS
        .iter()
        .map(|&field| FieldView {
            label: field.label().to_string(),
            value: match field {
                FormField::SessionDate => long_date.clone(),
                _ => record.field(field),
            },
            block: false,
        })
        .collect();

    let content = CONTENT_FIELDS
        .iter()
        .enumerate()
        .map(|(i, &field)| FieldView {
            label: format!("{}. {}", i + 1, field.label()),
            value: record.field(field),
            block: true,
        })
        .collect();

    let mut signatures = Vec::with_capacity(2);
    for role in SignatureRole::ALL {
        let output = output_surface(record, role, source);
        let name = record.signer_name(role);
        signatures.push(SignatureView {
            role,
            label: role.label(name),
            caption: role.caption(name),
            image: output.export_encoded()?,
            signed: !output.is_empty(),
        });
    }

    Ok(Document {
        mode,
        title: TITLE.to_string(),
        date_line: format!("Tanggal: {}", long_date),
        sections: vec![
            SectionView {
                title: "Identitas Siswa",
                fields: identity,
            },
            SectionView {
                title: "Isi Bimbingan",
                fields: content,
            },
        ],
        signatures,
        actions: mode.actions().to_vec(),
    })
}

/// Signature scaled onto a fresh output-sized surface.
///
/// A stored image that fails to decode leaves the output blank.
fn output_surface(record: &Record, role: SignatureRole, source: SignatureSource<'_>) -> SignatureSurface {
    let mut output = SignatureSurface::new(OUTPUT_WIDTH, OUTPUT_HEIGHT);
    match source {
        SignatureSource::Live { student, teacher } => {
            let live = match role {
                SignatureRole::Student => student,
                SignatureRole::Teacher => teacher,
            };
            output.draw_decoded(&live.snapshot(), OUTPUT_WIDTH, OUTPUT_HEIGHT);
        }
        SignatureSource::Stored => {
            if let Err(e) = output.import_encoded(record.signature(role), OUTPUT_WIDTH, OUTPUT_HEIGHT) {
                warn!("{} signature of {} not drawn: {}", role, record.student_name, e);
            }
        }
    }
    output
}

impl Document {
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("{}\n", self.title));
        out.push_str(&format!("{}\n", self.date_line));

        for section in &self.sections {
            out.push_str(&format!("\n== {} ==\n", section.title));
            for field in &section.fields {
                if field.block {
                    out.push_str(&format!("{}:\n", field.label));
                    for line in field.value.lines() {
                        out.push_str(&format!("   {}\n", line));
                    }
                } else {
                    out.push_str(&format!("{}: {}\n", field.label, field.value));
                }
            }
        }

        out.push('\n');
        for sig in &self.signatures {
            let mark = if sig.signed { "[ditandatangani]" } else { "[kosong]" };
            out.push_str(&format!("{} {} ({})\n", sig.label, mark, sig.caption));
        }

        if !self.actions.is_empty() {
            let buttons: Vec<String> = self.actions.iter().map(|a| format!("[{}]", a.label())).collect();
            out.push_str(&format!("\n{}\n", buttons.join(" ")));
        }
        out
    }

    /// Standalone HTML document. In print mode it opens the print dialog
    /// [`PRINT_DELAY_MS`] after load.
    pub fn to_html(&self) -> String {
        let student = self
            .signatures
            .first()
            .map(|s| s.caption.as_str())
            .unwrap_or_default();

        let mut out = String::new();
        out.push_str("<!DOCTYPE html>\n");
        out.push_str("<html>\n<head>\n<meta charset=\"utf-8\">\n");
        out.push_str(&format!("<title>{} - {}</title>\n", escape_html(&self.title), escape_html(student)));
        out.push_str(&format!("<style>\n{}</style>\n</head>\n<body>\n", PRINT_CSS));

        out.push_str("<div class=\"header\">\n");
        out.push_str(&format!("<h1>{}</h1>\n", escape_html(&self.title)));
        out.push_str(&format!("<p>{}</p>\n", escape_html(&self.date_line)));
        out.push_str("</div>\n");

        for section in &self.sections {
            out.push_str(&format!("<div class=\"section\">\n<h2>{}</h2>\n", escape_html(section.title)));
            for field in &section.fields {
                if field.block {
                    out.push_str(&format!("<div class=\"field\"><strong>{}:</strong></div>\n", escape_html(&field.label)));
                    out.push_str(&format!("<div class=\"block\">{}</div>\n", escape_html(&field.value)));
                } else {
                    out.push_str(&format!(
                        "<div class=\"field\"><strong>{}:</strong> {}</div>\n",
                        escape_html(&field.label),
                        escape_html(&field.value)
                    ));
                }
            }
            out.push_str("</div>\n");
        }

        out.push_str("<div class=\"signatures\">\n");
        for sig in &self.signatures {
            out.push_str("<div class=\"signature-item\">\n");
            out.push_str(&format!("<strong>{}</strong>\n", escape_html(&sig.label)));
            out.push_str(&format!(
                "<img src=\"{}\" width=\"{}\" height=\"{}\" alt=\"{}\">\n",
                escape_html(&sig.image),
                OUTPUT_WIDTH,
                OUTPUT_HEIGHT,
                escape_html(&sig.label)
            ));
            out.push_str(&format!("<div class=\"signature-name\">{}</div>\n", escape_html(&sig.caption)));
            out.push_str("</div>\n");
        }
        out.push_str("</div>\n");

        if !self.actions.is_empty() {
            out.push_str("<div class=\"actions\">\n");
            for action in &self.actions {
                out.push_str(&format!("<button data-action=\"{}\">{}</button>\n", action.id(), action.label()));
            }
            out.push_str("</div>\n");
        }

        if self.mode == RenderMode::Print {
            out.push_str(&format!(
                "<script>\nwindow.onload = function() {{\n  setTimeout(function() {{ window.print(); }}, {});\n}};\n</script>\n",
                PRINT_DELAY_MS
            ));
        }

        out.push_str("</body>\n</html>\n");
        out
    }
}

const PRINT_CSS: &str = "body { font-family: Arial, sans-serif; margin: 20px; line-height: 1.6; }
.header { text-align: center; margin-bottom: 30px; border-bottom: 3px solid #4f46e5; padding-bottom: 20px; }
.section { margin-bottom: 25px; }
.section h2 { color: #4f46e5; margin-bottom: 15px; }
.field { margin-bottom: 10px; }
.field strong { display: inline-block; min-width: 150px; color: #4f46e5; }
.block { margin-left: 20px; margin-bottom: 15px; white-space: pre-wrap; }
.signatures { display: flex; justify-content: space-around; margin-top: 30px; padding-top: 20px; border-top: 2px solid #ccc; }
.signature-item { text-align: center; }
.signature-item strong { display: block; margin-bottom: 10px; }
.signature-item img { border: 1px solid #ccc; }
@media print { .actions { display: none; } }
";

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// One row of the history list
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryItemView {
    pub key: String,
    pub student_name: String,
    pub date: String,
    pub class: String,
    pub focus_area: String,
    pub summary: String,
}

impl HistoryItemView {
    pub fn from_entry(entry: &HistoryEntry) -> Self {
        Self {
            key: entry.key.clone(),
            student_name: entry.record.student_name.clone(),
            date: format_long_date(entry.record.session_date),
            class: entry.record.class.clone(),
            focus_area: entry.record.focus_area.clone(),
            summary: entry.summary(),
        }
    }

    pub fn to_text(&self) -> String {
        format!(
            "{} | {} | Kelas {} | {}\n  {}\n  {}",
            self.student_name, self.date, self.class, self.focus_area, self.summary, self.key
        )
    }
}
