//! papervault-core – Gemeinsame Typen und Wire-Formate
//!
//! Dieses Crate stellt die Bausteine bereit, die Krypto-, Client- und
//! CLI-Crate gemeinsam nutzen: Benutzerprofil, Organisationsschluessel
//! und die JSON-Huellen der Knoten-API.

pub mod types;
pub mod wire;

// Re-Exporte fuer bequemen Zugriff
pub use types::{OrgKey, Profile, Role};
pub use wire::{ApiResponse, LoginData, LoginRequest, PublicKeyData, SUCCESS_CODE, UNAUTHORIZED_CODE};
