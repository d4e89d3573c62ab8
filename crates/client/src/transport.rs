//! Sitzungs-Transport
//!
//! Pro Anfrage:
//! 1. Ziel = Override oder aktiver Knoten des Routers
//! 2. Token aus dem Sitzungsspeicher als Bearer anhaengen
//! 3. Mit fester Frist senden, keine automatische Wiederholung
//! 4. Antwort einordnen: Code 200 geht unveraendert durch, alles andere
//!    wird zu `Transport` bzw. `Application`
//! 5. Bei 401 (HTTP oder Code) Sitzung leeren, sofern sie noch das
//!    gesendete Token haelt, und einmal zur Anmeldung auffordern
//!
//! Ein leerer 2xx-Body gilt als Erfolg ohne Daten; ein Body, der keine
//! Antwort-Huelle ist, wird zu `Transport { Unknown }`.

use std::sync::Arc;
use std::time::Duration;

use papervault_core::{ApiResponse, SUCCESS_CODE, UNAUTHORIZED_CODE};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::backend::{BackendError, HttpBackend, HttpRequest, HttpResponse, Methode};
use crate::error::{ClientError, ClientResult, TransportFailure};
use crate::node_router::NodeRouter;
use crate::prompt::ReauthPrompt;
use crate::session::SessionStore;

/// Frist pro Anfrage, wenn nichts anderes konfiguriert ist
pub const STANDARD_FRIST: Duration = Duration::from_secs(30);

/// Meldung, wenn der Knoten keinen Text mitliefert
const STANDARD_FEHLERMELDUNG: &str = "Anfrage fehlgeschlagen";

/// Beschreibung einer Anfrage relativ zum Knoten
#[derive(Debug, Clone)]
pub struct Anfrage {
    methode: Methode,
    pfad: String,
    body: Option<Value>,
    endpoint: Option<String>,
    reauth: bool,
}

impl Anfrage {
    /// GET ohne Body
    pub fn get(pfad: impl Into<String>) -> Self {
        Self {
            methode: Methode::Get,
            pfad: pfad.into(),
            body: None,
            endpoint: None,
            reauth: true,
        }
    }

    /// POST mit JSON-Body
    pub fn post<B: Serialize>(pfad: impl Into<String>, body: &B) -> ClientResult<Self> {
        let body = serde_json::to_value(body)
            .map_err(|e| ClientError::EncryptionFailed(format!("Serialisierung: {e}")))?;
        Ok(Self {
            methode: Methode::Post,
            pfad: pfad.into(),
            body: Some(body),
            endpoint: None,
            reauth: true,
        })
    }

    /// Ueberschreibt den vom Router gewaehlten Knoten
    pub fn an(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// 401 leert die Sitzung, fordert aber nicht zur Anmeldung auf
    pub fn ohne_reauth(mut self) -> Self {
        self.reauth = false;
        self
    }
}

/// Fuehrt Anfragen mit Sitzung, Frist und 401-Behandlung aus
pub struct SessionTransport {
    backend: Arc<dyn HttpBackend>,
    router: NodeRouter,
    store: Arc<dyn SessionStore>,
    prompt: Arc<dyn ReauthPrompt>,
    frist: Duration,
}

impl SessionTransport {
    /// Transport mit `STANDARD_FRIST`
    pub fn neu(
        backend: Arc<dyn HttpBackend>,
        router: NodeRouter,
        store: Arc<dyn SessionStore>,
        prompt: Arc<dyn ReauthPrompt>,
    ) -> Self {
        Self {
            backend,
            router,
            store,
            prompt,
            frist: STANDARD_FRIST,
        }
    }

    /// Ersetzt die Frist pro Anfrage
    pub fn mit_frist(mut self, frist: Duration) -> Self {
        self.frist = frist;
        self
    }

    /// Router fuer den aktiven Knoten
    pub fn router(&self) -> &NodeRouter {
        &self.router
    }

    /// Gemeinsamer Sitzungsspeicher
    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Frist pro Anfrage
    pub fn frist(&self) -> Duration {
        self.frist
    }

    /// Sendet die Anfrage; bei Erfolg die Antwort mit typisiertem `data`
    pub async fn call<T: DeserializeOwned>(&self, anfrage: Anfrage) -> ClientResult<ApiResponse<T>> {
        let basis = anfrage
            .endpoint
            .clone()
            .unwrap_or_else(|| self.router.active_endpoint());
        let url = url_verbinden(&basis, &anfrage.pfad);

        let bearer = self.store.snapshot().bearer().map(str::to_string);
        let http = HttpRequest {
            methode: anfrage.methode,
            url: url.clone(),
            bearer: bearer.clone(),
            body: anfrage.body,
        };

        tracing::debug!(methode = ?anfrage.methode, url = %url, "Anfrage");

        let antwort = match tokio::time::timeout(self.frist, self.backend.send(http)).await {
            Err(_) => {
                tracing::warn!(url = %url, frist_ms = self.frist.as_millis() as u64, "Frist abgelaufen");
                return Err(ClientError::transport(TransportFailure::Timeout));
            }
            Ok(Err(e)) => return Err(backend_fehler(e)),
            Ok(Ok(antwort)) => antwort,
        };

        tracing::debug!(url = %url, status = antwort.status, "Antwort");

        match self.einordnen(antwort) {
            Err(err) if err.ist_unautorisiert() => {
                self.unautorisiert(bearer.as_deref(), anfrage.reauth);
                Err(err)
            }
            other => other,
        }
    }

    fn einordnen<T: DeserializeOwned>(&self, antwort: HttpResponse) -> ClientResult<ApiResponse<T>> {
        if !antwort.ist_erfolg() {
            let failure = TransportFailure::aus_status(antwort.status);
            let detail = serde_json::from_slice::<ApiResponse<Value>>(&antwort.body)
                .ok()
                .map(|r| r.message)
                .filter(|m| !m.is_empty());
            tracing::warn!(status = antwort.status, kategorie = ?failure, "HTTP-Fehler");
            return Err(ClientError::Transport { failure, detail });
        }

        if antwort.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(ApiResponse {
                code: SUCCESS_CODE,
                message: String::new(),
                data: None,
            });
        }

        let roh: ApiResponse<Value> = serde_json::from_slice(&antwort.body).map_err(|e| {
            tracing::warn!(status = antwort.status, fehler = %e, "Antwort ist keine Huelle");
            ClientError::transport(TransportFailure::Unknown)
        })?;

        if roh.code != SUCCESS_CODE {
            tracing::warn!(code = roh.code, "Knoten meldet Fehler");
            let message = if roh.message.is_empty() {
                STANDARD_FEHLERMELDUNG.to_string()
            } else {
                roh.message
            };
            return Err(ClientError::Application {
                code: roh.code,
                message,
            });
        }

        let data = match roh.data {
            None | Some(Value::Null) => None,
            Some(wert) => Some(serde_json::from_value(wert).map_err(|e| {
                tracing::warn!(fehler = %e, "Unerwartete Daten in der Antwort");
                ClientError::transport(TransportFailure::Unknown)
            })?),
        };

        Ok(ApiResponse {
            code: roh.code,
            message: roh.message,
            data,
        })
    }

    /// Nur der Aufruf, dessen Purge den Zustand wirklich wechselt, fordert auf.
    /// Haelt der Speicher inzwischen ein anderes Token, bleibt er unberuehrt.
    fn unautorisiert(&self, gesendet: Option<&str>, reauth: bool) {
        match self.store.purge_wenn_token(gesendet) {
            Ok(true) => {
                tracing::warn!(code = UNAUTHORIZED_CODE, "Sitzung ungueltig, Anmeldedaten geloescht");
                if reauth && !self.prompt.on_login_surface() {
                    self.prompt.prompt_reauthentication();
                }
            }
            Ok(false) => {}
            Err(e) => tracing::error!(fehler = %e, "Sitzung konnte nicht geleert werden"),
        }
    }
}

impl std::fmt::Debug for SessionTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTransport")
            .field("router", &self.router)
            .field("frist", &self.frist)
            .finish_non_exhaustive()
    }
}

fn url_verbinden(basis: &str, pfad: &str) -> String {
    format!(
        "{}/{}",
        basis.trim_end_matches('/'),
        pfad.trim_start_matches('/')
    )
}

fn backend_fehler(e: BackendError) -> ClientError {
    match e {
        BackendError::Zeitueberschreitung => ClientError::transport(TransportFailure::Timeout),
        BackendError::Verbindung(detail) => {
            tracing::warn!(fehler = %detail, "Knoten nicht erreichbar");
            ClientError::Transport {
                failure: TransportFailure::ConnectionFailed,
                detail: Some(detail),
            }
        }
        BackendError::Sonstiges(detail) => ClientError::Transport {
            failure: TransportFailure::Unknown,
            detail: Some(detail),
        },
    }
}
