//! Journal record model
//!
//! - FormState: in-progress form (draft), every field may be blank
//! - Record: a complete, validated session entry
//!
//! The serialized field names are the ones previously stored entries use;
//! renaming them breaks history read-back.

use crate::error::{Error, Result};
use crate::signature::SignatureSurface;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Session date wire format
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Text fields of the form, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    StudentName,
    Class,
    SessionDate,
    FocusArea,
    Problem,
    Goal,
    Activity,
    Outcome,
    TeacherNote,
    TeacherName,
}

impl FormField {
    pub const ALL: [FormField; 10] = [
        FormField::StudentName,
        FormField::Class,
        FormField::SessionDate,
        FormField::FocusArea,
        FormField::Problem,
        FormField::Goal,
        FormField::Activity,
        FormField::Outcome,
        FormField::TeacherNote,
        FormField::TeacherName,
    ];

    /// Serialized name
    pub fn key(&self) -> &'static str {
        match self {
            FormField::StudentName => "nama",
            FormField::Class => "kelas",
            FormField::SessionDate => "tanggal",
            FormField::FocusArea => "bidangFokus",
            FormField::Problem => "permasalahan",
            FormField::Goal => "tujuan",
            FormField::Activity => "materi",
            FormField::Outcome => "hasil",
            FormField::TeacherNote => "catatanGuru",
            FormField::TeacherName => "namaGuru",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FormField::StudentName => "Nama",
            FormField::Class => "Kelas",
            FormField::SessionDate => "Tanggal",
            FormField::FocusArea => "Bidang Fokus",
            FormField::Problem => "Permasalahan / Kebutuhan Siswa",
            FormField::Goal => "Tujuan Bimbingan",
            FormField::Activity => "Materi / Kegiatan Bimbingan",
            FormField::Outcome => "Hasil / Tindak Lanjut",
            FormField::TeacherNote => "Catatan Guru Wali",
            FormField::TeacherName => "Guru Wali",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }

    pub fn is_multiline(&self) -> bool {
        matches!(
            self,
            FormField::Problem
                | FormField::Goal
                | FormField::Activity
                | FormField::Outcome
                | FormField::TeacherNote
        )
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Whose signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignatureRole {
    Student,
    Teacher,
}

impl SignatureRole {
    pub const ALL: [SignatureRole; 2] = [SignatureRole::Student, SignatureRole::Teacher];

    /// Label above the pad, e.g. `Tanda Tangan Ani`
    pub fn label(&self, name: &str) -> String {
        let name = name.trim();
        if name.is_empty() {
            match self {
                SignatureRole::Student => "Tanda Tangan Siswa".to_string(),
                SignatureRole::Teacher => "Tanda Tangan Guru".to_string(),
            }
        } else {
            format!("Tanda Tangan {}", name)
        }
    }

    /// Caption under the pad
    pub fn caption(&self, name: &str) -> String {
        let name = name.trim();
        if name.is_empty() {
            match self {
                SignatureRole::Student => "Nama Siswa".to_string(),
                SignatureRole::Teacher => "Nama Guru Wali".to_string(),
            }
        } else {
            name.to_string()
        }
    }

    pub fn name_field(&self) -> FormField {
        match self {
            SignatureRole::Student => FormField::StudentName,
            SignatureRole::Teacher => FormField::TeacherName,
        }
    }
}

impl fmt::Display for SignatureRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignatureRole::Student => f.write_str("siswa"),
            SignatureRole::Teacher => f.write_str("guru"),
        }
    }
}

/// Fields and signatures that blocked validation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub fields: Vec<FormField>,
    pub signatures: Vec<SignatureRole>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.fields.is_empty() && self.signatures.is_empty()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if !self.fields.is_empty() {
            let names: Vec<&str> = self.fields.iter().map(|f| f.label()).collect();
            parts.push(format!("fields [{}]", names.join(", ")));
        }
        if !self.signatures.is_empty() {
            let names: Vec<String> = self.signatures.iter().map(|s| s.to_string()).collect();
            parts.push(format!("signatures [{}]", names.join(", ")));
        }
        write!(f, "{}", parts.join("; "))
    }
}

/// In-progress form, persisted as the draft
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormState {
    #[serde(rename = "nama")]
    pub student_name: String,
    #[serde(rename = "kelas")]
    pub class: String,
    /// Raw entered value, expected `YYYY-MM-DD`
    #[serde(rename = "tanggal")]
    pub session_date: String,
    #[serde(rename = "bidangFokus")]
    pub focus_area: String,
    #[serde(rename = "permasalahan")]
    pub problem: String,
    #[serde(rename = "tujuan")]
    pub goal: String,
    #[serde(rename = "materi")]
    pub activity: String,
    #[serde(rename = "hasil")]
    pub outcome: String,
    #[serde(rename = "catatanGuru")]
    pub teacher_note: String,
    #[serde(rename = "namaGuru")]
    pub teacher_name: String,
    #[serde(rename = "signatureSiswa", skip_serializing_if = "Option::is_none")]
    pub student_signature: Option<String>,
    #[serde(rename = "signatureGuru", skip_serializing_if = "Option::is_none")]
    pub teacher_signature: Option<String>,
}

impl FormState {
    /// Blank form with the date preset to `today`
    pub fn new(today: NaiveDate) -> Self {
        Self {
            session_date: today.format(DATE_FORMAT).to_string(),
            ..Default::default()
        }
    }

    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::StudentName => &self.student_name,
            FormField::Class => &self.class,
            FormField::SessionDate => &self.session_date,
            FormField::FocusArea => &self.focus_area,
            FormField::Problem => &self.problem,
            FormField::Goal => &self.goal,
            FormField::Activity => &self.activity,
            FormField::Outcome => &self.outcome,
            FormField::TeacherNote => &self.teacher_note,
            FormField::TeacherName => &self.teacher_name,
        }
    }

    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        let value = value.into();
        match field {
            FormField::StudentName => self.student_name = value,
            FormField::Class => self.class = value,
            FormField::SessionDate => self.session_date = value,
            FormField::FocusArea => self.focus_area = value,
            FormField::Problem => self.problem = value,
            FormField::Goal => self.goal = value,
            FormField::Activity => self.activity = value,
            FormField::Outcome => self.outcome = value,
            FormField::TeacherNote => self.teacher_note = value,
            FormField::TeacherName => self.teacher_name = value,
        }
    }

    /// Text fields that are blank, or a date that does not parse
    pub fn invalid_fields(&self) -> Vec<FormField> {
        FormField::ALL
            .into_iter()
            .filter(|&field| {
                let value = self.get(field).trim();
                value.is_empty()
                    || (field == FormField::SessionDate
                        && NaiveDate::parse_from_str(value, DATE_FORMAT).is_err())
            })
            .collect()
    }

    /// Check completeness against the live pads and assemble a [`Record`].
    pub fn validate(&self, student: &SignatureSurface, teacher: &SignatureSurface) -> Result<Record> {
        let mut report = ValidationReport {
            fields: self.invalid_fields(),
            signatures: Vec::new(),
        };
        if student.is_empty() {
            report.signatures.push(SignatureRole::Student);
        }
        if teacher.is_empty() {
            report.signatures.push(SignatureRole::Teacher);
        }
        if !report.is_ok() {
            return Err(Error::ValidationFailed(report));
        }

        let session_date = NaiveDate::parse_from_str(self.session_date.trim(), DATE_FORMAT)
            .map_err(|e| Error::decode(FormField::SessionDate.key(), e))?;

        Ok(Record {
            student_name: self.student_name.trim().to_string(),
            class: self.class.trim().to_string(),
            session_date,
            focus_area: self.focus_area.trim().to_string(),
            problem: self.problem.trim().to_string(),
            goal: self.goal.trim().to_string(),
            activity: self.activity.trim().to_string(),
            outcome: self.outcome.trim().to_string(),
            teacher_note: self.teacher_note.trim().to_string(),
            teacher_name: self.teacher_name.trim().to_string(),
            student_signature: student.export_encoded()?,
            teacher_signature: teacher.export_encoded()?,
        })
    }
}

/// A complete, stored session entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "nama")]
    pub student_name: String,
    #[serde(rename = "kelas")]
    pub class: String,
    #[serde(rename = "tanggal")]
    pub session_date: NaiveDate,
    #[serde(rename = "bidangFokus")]
    pub focus_area: String,
    #[serde(rename = "permasalahan")]
    pub problem: String,
    #[serde(rename = "tujuan")]
    pub goal: String,
    #[serde(rename = "materi")]
    pub activity: String,
    #[serde(rename = "hasil")]
    pub outcome: String,
    #[serde(rename = "catatanGuru")]
    pub teacher_note: String,
    #[serde(rename = "namaGuru")]
    pub teacher_name: String,
    #[serde(rename = "signatureSiswa")]
    pub student_signature: String,
    #[serde(rename = "signatureGuru")]
    pub teacher_signature: String,
}

impl Record {
    /// Display value of a field (the date as stored, `YYYY-MM-DD`)
    pub fn field(&self, field: FormField) -> String {
        match field {
            FormField::StudentName => self.student_name.clone(),
            FormField::Class => self.class.clone(),
            FormField::SessionDate => self.session_date.format(DATE_FORMAT).to_string(),
            FormField::FocusArea => self.focus_area.clone(),
            FormField::Problem => self.problem.clone(),
            FormField::Goal => self.goal.clone(),
            FormField::Activity => self.activity.clone(),
            FormField::Outcome => self.outcome.clone(),
            FormField::TeacherNote => self.teacher_note.clone(),
            FormField::TeacherName => self.teacher_name.clone(),
        }
    }

    pub fn signature(&self, role: SignatureRole) -> &str {
        match role {
            SignatureRole::Student => &self.student_signature,
            SignatureRole::Teacher => &self.teacher_signature,
        }
    }

    pub fn signer_name(&self, role: SignatureRole) -> &str {
        match role {
            SignatureRole::Student => &self.student_name,
            SignatureRole::Teacher => &self.teacher_name,
        }
    }

    /// Back to an editable form
    pub fn to_form_state(&self) -> FormState {
        let mut form = FormState::default();
        for field in FormField::ALL {
            form.set(field, self.field(field));
        }
        form.student_signature = Some(self.student_signature.clone());
        form.teacher_signature = Some(self.teacher_signature.clone());
        form
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::Point;

    fn filled_form() -> FormState {
        let mut form = FormState::new(NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
        for field in FormField::ALL {
            if field != FormField::SessionDate {
                form.set(field, format!("isi {}", field.key()));
            }
        }
        form
    }

    fn signed(width: u32, height: u32) -> SignatureSurface {
        let mut surface = SignatureSurface::new(width, height);
        let id = surface.id();
        surface.begin_stroke(Point::new(2.0, 2.0));
        surface.extend_stroke(id, Point::new(12.0, 8.0));
        surface.end_stroke();
        surface
    }

    #[test]
    fn test_new_form_presets_date() {
        let form = FormState::new(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        assert_eq!(form.session_date, "2024-03-05");
        assert!(form.student_name.is_empty());
    }

    #[test]
    fn test_invalid_fields_lists_blank_and_bad_date() {
        let mut form = filled_form();
        form.class = "   ".to_string();
        form.session_date = "10/01/2024".to_string();
        assert_eq!(
            form.invalid_fields(),
            vec![FormField::Class, FormField::SessionDate]
        );
    }

    #[test]
    fn test_empty_student_signature_fails_then_passes() {
        let form = filled_form();
        let mut student = SignatureSurface::new(20, 10);
        let teacher = signed(20, 10);

        match form.validate(&student, &teacher) {
            Err(Error::ValidationFailed(report)) => {
                assert!(report.fields.is_empty());
                assert_eq!(report.signatures, vec![SignatureRole::Student]);
            }
            other => panic!("expected validation failure, got {:?}", other),
        }

        let id = student.id();
        student.begin_stroke(Point::new(1.0, 1.0));
        student.extend_stroke(id, Point::new(5.0, 5.0));
        student.end_stroke();

        let record = form.validate(&student, &teacher).unwrap();
        assert_eq!(record.session_date, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
        assert!(record.student_signature.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_validate_trims_text() {
        let mut form = filled_form();
        form.student_name = "  Ani  ".to_string();
        let record = form.validate(&signed(20, 10), &signed(20, 10)).unwrap();
        assert_eq!(record.student_name, "Ani");
    }

    #[test]
    fn test_record_uses_stable_field_names() {
        let record = filled_form().validate(&signed(20, 10), &signed(20, 10)).unwrap();
        let json: serde_json::Value = serde_json::to_value(&record).unwrap();
        for field in FormField::ALL {
            assert!(json.get(field.key()).is_some(), "missing {}", field.key());
        }
        assert_eq!(json["tanggal"], "2024-01-10");
        assert!(json.get("signatureSiswa").is_some());
        assert!(json.get("signatureGuru").is_some());

        let back: Record = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_form_state_tolerates_partial_json() {
        let form: FormState = serde_json::from_str(r#"{"nama":"Budi","extra":1}"#).unwrap();
        assert_eq!(form.student_name, "Budi");
        assert!(form.class.is_empty());
        assert!(form.student_signature.is_none());
    }

    #[test]
    fn test_signature_labels() {
        assert_eq!(SignatureRole::Student.label(""), "Tanda Tangan Siswa");
        assert_eq!(SignatureRole::Teacher.label("  "), "Tanda Tangan Guru");
        assert_eq!(SignatureRole::Student.label("Ani"), "Tanda Tangan Ani");
        assert_eq!(SignatureRole::Teacher.caption(""), "Nama Guru Wali");
        assert_eq!(SignatureRole::Student.caption("Ani"), "Ani");
    }

    #[test]
    fn test_field_key_lookup() {
        assert_eq!(FormField::from_key("bidangFokus"), Some(FormField::FocusArea));
        assert_eq!(FormField::from_key("unknown"), None);
    }
}
