//! Schluesselquelle ueber HTTP: `GET {bootstrap}/auth/public-key`

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use papervault_core::{ApiResponse, PublicKeyData};
use papervault_crypto::{CryptoError, CryptoResult, KeySource};

use crate::backend::{HttpBackend, HttpRequest, Methode};

pub const PUBLIC_KEY_PFAD: &str = "auth/public-key";

/// Holt den kompakten Schluessel vom vertrauenswuerdigen Bootstrap-Knoten.
/// Ohne Token, unabhaengig von der Sitzung.
pub struct HttpKeySource {
    backend: Arc<dyn HttpBackend>,
    bootstrap_url: String,
    frist: Duration,
}

impl HttpKeySource {
    /// Quelle fuer `{bootstrap_url}/auth/public-key`
    pub fn neu(backend: Arc<dyn HttpBackend>, bootstrap_url: impl Into<String>, frist: Duration) -> Self {
        Self {
            backend,
            bootstrap_url: bootstrap_url.into(),
            frist,
        }
    }

    fn url(&self) -> String {
        format!("{}/{}", self.bootstrap_url.trim_end_matches('/'), PUBLIC_KEY_PFAD)
    }
}

#[async_trait]
impl KeySource for HttpKeySource {
    async fn fetch_compact_key(&self) -> CryptoResult<String> {
        let anfrage = HttpRequest {
            methode: Methode::Get,
            url: self.url(),
            bearer: None,
            body: None,
        };

        let antwort = tokio::time::timeout(self.frist, self.backend.send(anfrage))
            .await
            .map_err(|_| CryptoError::SchluesselNichtVerfuegbar("Zeitueberschreitung".into()))?
            .map_err(|e| CryptoError::SchluesselNichtVerfuegbar(e.to_string()))?;

        if !antwort.ist_erfolg() {
            return Err(CryptoError::SchluesselNichtVerfuegbar(format!(
                "HTTP {}",
                antwort.status
            )));
        }

        let huelle: ApiResponse<PublicKeyData> = serde_json::from_slice(&antwort.body)
            .map_err(|e| CryptoError::SchluesselNichtVerfuegbar(format!("Antwort unlesbar: {e}")))?;

        if !huelle.ist_erfolg() {
            return Err(CryptoError::SchluesselNichtVerfuegbar(format!(
                "Code {}: {}",
                huelle.code, huelle.message
            )));
        }

        huelle
            .data
            .map(|d| d.public_key)
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| CryptoError::SchluesselNichtVerfuegbar("kein Schluessel in der Antwort".into()))
    }
}

impl std::fmt::Debug for HttpKeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpKeySource")
            .field("bootstrap_url", &self.bootstrap_url)
            .finish_non_exhaustive()
    }
}
