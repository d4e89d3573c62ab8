//! Einreichungs-Umschlag (hybrid)
//!
//! ## Felder
//! | Feld | Verfahren |
//! |---|---|
//! | courseName, examType, semester, department, filePath | RSA, je Feld einzeln |
//! | content | AES-256-CBC mit Einmal-Schluessel K, `base64(iv \|\| ct)` |
//! | encryptedAesKey | RSA(Base64(K)) |
//! | timestamp, nonce | Klartext (Replay-Schutz) |
//! | hmac | HMAC-SHA-256 ueber alle obigen Werte, Schluessel K |

use papervault_core::OrgKey;
use serde::{Deserialize, Serialize};

use crate::envelope::integrity::TagInput;
use crate::error::CryptoResult;

/// Klartext einer Pruefungs-Einreichung
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperDraft {
    /// Klassifikation (Kursname)
    pub course_name: String,
    /// Kategorie (Pruefungsart)
    pub exam_type: String,
    /// Zeitraum (Semester)
    pub semester: String,
    /// Organisationsschluessel; bestimmt auch den Zielknoten
    pub department: OrgKey,
    /// Inhalt beliebiger Laenge
    pub content: String,
    /// Optionaler Dateipfad eines Anhangs
    pub file_path: Option<String>,
}

/// Vollstaendiger, verschluesselter und getaggter Umschlag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionEnvelope {
    pub course_name: String,
    pub exam_type: String,
    pub semester: String,
    pub department: String,
    pub content: String,
    /// Leer wenn kein Pfad angegeben wurde
    #[serde(default)]
    pub file_path: String,
    pub encrypted_aes_key: String,
    pub timestamp: i64,
    pub nonce: String,
    pub hmac: String,
}

impl SubmissionEnvelope {
    /// Tag-Eingabe: alle Ciphertexte plus Zeitstempel und Nonce, nie Klartext
    pub fn tag_input(&self) -> TagInput<'_> {
        TagInput {
            course_name: &self.course_name,
            exam_type: &self.exam_type,
            semester: &self.semester,
            department: &self.department,
            content: &self.content,
            file_path: &self.file_path,
            encrypted_aes_key: &self.encrypted_aes_key,
            timestamp: self.timestamp,
            nonce: &self.nonce,
        }
    }

    /// Kanonisches JSON der Tag-Eingabe
    pub fn kanonisch(&self) -> CryptoResult<Vec<u8>> {
        self.tag_input().kanonisch()
    }

    /// Die RSA-verschluesselten Metadatenfelder (ohne leeren Pfad)
    pub fn metadaten_felder(&self) -> Vec<(&'static str, &str)> {
        let mut felder = vec![
            ("courseName", self.course_name.as_str()),
            ("examType", self.exam_type.as_str()),
            ("semester", self.semester.as_str()),
            ("department", self.department.as_str()),
        ];
        if !self.file_path.is_empty() {
            felder.push(("filePath", self.file_path.as_str()));
        }
        felder
    }

    /// Mutabler Zugriff auf ein Ciphertext-Feld per Drahtname
    pub fn feld_mut(&mut self, name: &str) -> Option<&mut String> {
        match name {
            "courseName" => Some(&mut self.course_name),
            "examType" => Some(&mut self.exam_type),
            "semester" => Some(&mut self.semester),
            "department" => Some(&mut self.department),
            "content" => Some(&mut self.content),
            "filePath" => Some(&mut self.file_path),
            "encryptedAesKey" => Some(&mut self.encrypted_aes_key),
            _ => None,
        }
    }
}

/// Drahtnamen aller Ciphertext-Felder
pub const CIPHERTEXT_FELDER: [&str; 7] = [
    "courseName",
    "examType",
    "semester",
    "department",
    "content",
    "filePath",
    "encryptedAesKey",
];
