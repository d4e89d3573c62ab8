//! # papervault-client
//!
//! Verbindet die Umschlag-Verschluesselung mit den Knoten:
//! - `node_router` - Organisation -> Knoten-URL (total, mit Default)
//! - `session` - Token, Profil und Knotenwahl in einer geteilten Zelle
//! - `transport` - Anfragen mit Bearer-Token, Frist und 401-Behandlung
//! - `backend` - HTTP-Abstraktion, reqwest-Implementierung
//! - `key_source` - Oeffentlicher Schluessel vom Bootstrap-Knoten
//! - `api` - Anmelden, Abmelden, Pruefung einreichen

pub mod api;
pub mod backend;
pub mod error;
pub mod key_source;
pub mod node_router;
pub mod prompt;
pub mod session;
pub mod transport;

pub use api::ExamClient;
pub use backend::{BackendError, HttpBackend, HttpRequest, HttpResponse, Methode, ReqwestBackend};
pub use error::{ClientError, ClientResult, TransportFailure};
pub use key_source::HttpKeySource;
pub use node_router::{NodeDirectory, NodeRouter, DEFAULT_SCHLUESSEL};
pub use prompt::{LoggingPrompt, ReauthPrompt};
pub use session::{AuthState, FileSessionStore, MemorySessionStore, SessionState, SessionStore};
pub use transport::{Anfrage, SessionTransport, STANDARD_FRIST};
