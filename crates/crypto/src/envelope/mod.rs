//! Umschlag-Verschluesselung (Envelope Encoder)
//!
//! Baut die geschuetzten Nachrichten fuer zwei Arten von Vorgaengen:
//! - Anmeldung: nur das Geheimnis, RSA-verschluesselt
//! - Einreichung: hybrid, kurze Felder per RSA, Inhalt per AES-CBC mit
//!   einem Einmal-Schluessel K, K selbst per RSA, Tag per HMAC mit K
//!
//! ## Ablauf einer Einreichung
//! 1. Oeffentlichen Schluessel vom `KeyAgent` holen (fail closed)
//! 2. Frischen Schluessel K und frische Replay-Felder erzeugen
//! 3. Metadatenfelder einzeln per RSA verschluesseln
//! 4. Inhalt mit K verschluesseln, IV vorangestellt
//! 5. K per RSA verpacken
//! 6. Tag ueber die kanonische Form berechnen
//!
//! Scheitert ein Schritt, wird kein Umschlag zurueckgegeben.

pub mod asymmetric;
pub mod credential;
pub mod integrity;
pub mod open;
pub mod submission;
pub mod symmetric;

use std::sync::Arc;

use crate::error::{CryptoError, CryptoResult};
use crate::key_agent::KeyAgent;
use crate::replay::ReplayGuard;
use crate::types::SymmetricKey;

pub use credential::CredentialEnvelope;
pub use open::EnvelopeOpener;
pub use submission::{PaperDraft, SubmissionEnvelope, CIPHERTEXT_FELDER};

use asymmetric::rsa_encrypt_field;
use symmetric::aes_cbc_encrypt;

/// Erzeugt Umschlaege mit dem Schluessel des geteilten `KeyAgent`
#[derive(Debug, Clone)]
pub struct EnvelopeEncoder {
    agent: Arc<KeyAgent>,
    replay: ReplayGuard,
}

impl EnvelopeEncoder {
    /// Encoder ueber einem gemeinsamen `KeyAgent`
    pub fn neu(agent: Arc<KeyAgent>) -> Self {
        Self {
            agent,
            replay: ReplayGuard::neu(),
        }
    }

    /// Der verwendete Schluessel-Cache
    pub fn key_agent(&self) -> &Arc<KeyAgent> {
        &self.agent
    }

    /// Verschluesselt ein einzelnes Geheimnis (Passwort) fuer die Anmeldung
    pub async fn encrypt_credential(&self, secret: &str) -> CryptoResult<CredentialEnvelope> {
        let key = self.agent.get_public_key().await?;
        let replay = self.replay.fresh();
        let encrypted_secret = rsa_encrypt_field(&key, secret)?;

        tracing::debug!(nonce = %replay.nonce, "Anmelde-Umschlag erstellt");

        Ok(CredentialEnvelope {
            encrypted_secret,
            timestamp: replay.timestamp,
            nonce: replay.nonce,
        })
    }

    /// Baut den hybriden Einreichungs-Umschlag
    pub async fn encrypt_submission(&self, draft: &PaperDraft) -> CryptoResult<SubmissionEnvelope> {
        let key = self.agent.get_public_key().await.map_err(|e| {
            CryptoError::Verschluesselung(format!("kein oeffentlicher Schluessel: {e}"))
        })?;

        let session_key = SymmetricKey::generieren();
        let replay = self.replay.fresh();

        let course_name = rsa_encrypt_field(&key, &draft.course_name)?;
        let exam_type = rsa_encrypt_field(&key, &draft.exam_type)?;
        let semester = rsa_encrypt_field(&key, &draft.semester)?;
        let department = rsa_encrypt_field(&key, draft.department.as_str())?;
        let file_path = match draft.file_path.as_deref().filter(|p| !p.is_empty()) {
            Some(pfad) => rsa_encrypt_field(&key, pfad)?,
            None => String::new(),
        };

        let content = aes_cbc_encrypt(session_key.as_bytes(), draft.content.as_bytes())?;
        let encrypted_aes_key = rsa_encrypt_field(&key, session_key.als_base64())?;

        let mut envelope = SubmissionEnvelope {
            course_name,
            exam_type,
            semester,
            department,
            content,
            file_path,
            encrypted_aes_key,
            timestamp: replay.timestamp,
            nonce: replay.nonce,
            hmac: String::new(),
        };
        envelope.hmac = integrity::compute_tag(session_key.als_base64(), &envelope.kanonisch()?)?;

        tracing::debug!(
            nonce = %envelope.nonce,
            fingerprint = %key.fingerprint(),
            inhalt_bytes = draft.content.len(),
            "Einreichungs-Umschlag erstellt"
        );

        Ok(envelope)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
