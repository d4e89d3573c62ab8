//! # papervault-crypto
//!
//! Hybride Umschlag-Verschluesselung fuer Papervault.
//!
//! ## Module
//! - `key_agent` - Beschafft und cached den oeffentlichen Netzwerk-Schluessel
//! - `envelope` - Anmelde- und Einreichungs-Umschlaege (RSA + AES-CBC + HMAC)
//! - `replay` - Frische Zeitstempel/Nonce-Paare
//! - `types` - Schluesselmaterial, Einmal-Schluessel, Replay-Felder
//! - `error` - Fehlertypen

pub mod envelope;
pub mod error;
pub mod key_agent;
pub mod replay;
pub mod types;

#[cfg(test)]
mod testutil;

// Bequeme Re-Exports
pub use envelope::{
    CredentialEnvelope, EnvelopeEncoder, EnvelopeOpener, PaperDraft, SubmissionEnvelope,
};
pub use error::{CryptoError, CryptoResult};
pub use key_agent::{KeyAgent, KeySource};
pub use replay::ReplayGuard;
pub use types::{PublicKeyMaterial, ReplayFields, SecretBytes, SymmetricKey};
