//! Fachliche Aufrufe: Anmelden, Abmelden, Pruefung einreichen

use std::sync::Arc;
use std::time::Duration;

use papervault_core::{ApiResponse, LoginData, LoginRequest, Profile};
use papervault_crypto::{
    EnvelopeEncoder, KeyAgent, PaperDraft, PublicKeyMaterial, SubmissionEnvelope,
};
use serde::Serialize;
use serde_json::Value;

use crate::backend::{HttpBackend, ReqwestBackend};
use crate::error::{ClientError, ClientResult, TransportFailure};
use crate::key_source::HttpKeySource;
use crate::node_router::{NodeDirectory, NodeRouter};
use crate::prompt::ReauthPrompt;
use crate::session::{AuthState, SessionStore};
use crate::transport::{Anfrage, SessionTransport};

pub const LOGIN_PFAD: &str = "auth/login";
pub const LOGOUT_PFAD: &str = "auth/logout";
pub const PAPER_CREATE_PFAD: &str = "exam-paper/create";

/// Body von `exam-paper/create`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreatePaperRequest<'a> {
    #[serde(flatten)]
    envelope: &'a SubmissionEnvelope,
    /// Signaturmaterial fuer die spaetere Pruefung, unveraendert durchgereicht
    #[serde(skip_serializing_if = "Option::is_none")]
    private_key: Option<&'a str>,
}

/// Hoehere Client-Schicht ueber Transport und Umschlag-Encoder
pub struct ExamClient {
    transport: SessionTransport,
    encoder: EnvelopeEncoder,
}

impl ExamClient {
    /// Client aus fertig verdrahteten Teilen
    pub fn neu(transport: SessionTransport, encoder: EnvelopeEncoder) -> Self {
        Self { transport, encoder }
    }

    /// Verdrahtet alles mit reqwest; Schluessel kommt von `bootstrap_url`
    pub fn mit_reqwest(
        directory: NodeDirectory,
        store: Arc<dyn SessionStore>,
        prompt: Arc<dyn ReauthPrompt>,
        bootstrap_url: &str,
        frist: Duration,
    ) -> ClientResult<Self> {
        let backend: Arc<dyn HttpBackend> = Arc::new(ReqwestBackend::neu(frist)?);
        Ok(Self::mit_backend(backend, directory, store, prompt, bootstrap_url, frist))
    }

    /// Wie `mit_reqwest`, aber mit beliebigem Backend
    pub fn mit_backend(
        backend: Arc<dyn HttpBackend>,
        directory: NodeDirectory,
        store: Arc<dyn SessionStore>,
        prompt: Arc<dyn ReauthPrompt>,
        bootstrap_url: &str,
        frist: Duration,
    ) -> Self {
        let quelle = Arc::new(HttpKeySource::neu(backend.clone(), bootstrap_url, frist));
        let agent = Arc::new(KeyAgent::neu(quelle));
        let router = NodeRouter::neu(Arc::new(directory), store.clone());
        let transport = SessionTransport::neu(backend, router, store, prompt).mit_frist(frist);
        Self::neu(transport, EnvelopeEncoder::neu(agent))
    }

    /// Darunterliegender Transport
    pub fn transport(&self) -> &SessionTransport {
        &self.transport
    }

    /// Knoten-Router der Sitzung
    pub fn router(&self) -> &NodeRouter {
        self.transport.router()
    }

    /// Gemeinsamer Schluessel-Cache
    pub fn key_agent(&self) -> &Arc<KeyAgent> {
        self.encoder.key_agent()
    }

    /// Aktueller Anmeldezustand
    pub fn auth_state(&self) -> AuthState {
        self.transport.store().snapshot().auth_state()
    }

    /// Profil der aktuellen Anmeldung
    pub fn profile(&self) -> Option<Profile> {
        self.transport.store().snapshot().profile
    }

    /// Oeffentlicher Schluessel, bei Bedarf vom Bootstrap-Knoten geholt
    pub async fn public_key(&self) -> ClientResult<Arc<PublicKeyMaterial>> {
        Ok(self.key_agent().get_public_key().await?)
    }

    /// Anonymous -> Authenticated. Token, Profil und Knoten der Organisation
    /// landen in einem einzigen Schreibvorgang im Sitzungsspeicher.
    pub async fn login(&self, username: &str, password: &str) -> ClientResult<Profile> {
        let umschlag = self.encoder.encrypt_credential(password).await?;
        let body = LoginRequest {
            username: username.to_string(),
            encrypted_secret: umschlag.encrypted_secret,
            timestamp: umschlag.timestamp,
            nonce: umschlag.nonce,
        };

        let antwort: ApiResponse<LoginData> = self
            .transport
            .call(Anfrage::post(LOGIN_PFAD, &body)?)
            .await?;
        let daten = antwort.data.ok_or_else(|| {
            tracing::warn!("Login-Antwort ohne Daten");
            ClientError::transport(TransportFailure::Unknown)
        })?;

        let node_url = self.router().endpoint_fuer(&daten.user_info);
        self.transport
            .store()
            .anmelden(daten.token, daten.user_info.clone(), node_url)?;

        tracing::info!(
            benutzer = %daten.user_info.username,
            rolle = %daten.user_info.role,
            organisation = %daten.user_info.org_key,
            "Angemeldet"
        );
        Ok(daten.user_info)
    }

    /// Authenticated -> Anonymous; die lokale Sitzung wird immer geleert
    pub async fn logout(&self) -> ClientResult<()> {
        if self.auth_state() == AuthState::Authenticated {
            let anfrage = Anfrage::post(LOGOUT_PFAD, &Value::Null)?.ohne_reauth();
            if let Err(e) = self.transport.call::<Value>(anfrage).await {
                tracing::debug!(fehler = %e, "Abmeldung am Knoten fehlgeschlagen");
            }
        }
        self.transport.store().purge()?;
        tracing::info!("Abgemeldet");
        Ok(())
    }

    /// Baut den Umschlag und reicht ihn beim aktiven Knoten ein.
    /// Scheitert die Verschluesselung, wird nichts gesendet.
    pub async fn create_paper(
        &self,
        draft: &PaperDraft,
        private_key: Option<&str>,
    ) -> ClientResult<ApiResponse<Value>> {
        let envelope = self.encoder.encrypt_submission(draft).await?;
        let body = CreatePaperRequest {
            envelope: &envelope,
            private_key,
        };
        let antwort = self
            .transport
            .call(Anfrage::post(PAPER_CREATE_PFAD, &body)?)
            .await?;
        tracing::info!(nonce = %envelope.nonce, "Pruefung eingereicht");
        Ok(antwort)
    }
}

impl std::fmt::Debug for ExamClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExamClient")
            .field("transport", &self.transport)
            .finish_non_exhaustive()
    }
}
