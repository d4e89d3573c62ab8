//! Gemeinsame Test-Hilfen: Schluesselpaar, Skript-Backend, zaehlender Prompt

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use papervault_client::{
    BackendError, ExamClient, HttpBackend, HttpRequest, HttpResponse, MemorySessionStore,
    NodeDirectory, ReauthPrompt, SessionStore,
};
use parking_lot::Mutex;
use rand::rngs::OsRng;
use rsa::pkcs8::EncodePublicKey;
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde_json::{json, Value};

pub const DEFAULT_URL: &str = "http://localhost:58080/api";
pub const DEPT_A_URL: &str = "http://localhost:58082/api";
pub const DEPT_B_URL: &str = "http://localhost:58083/api";

pub fn schluessel() -> &'static RsaPrivateKey {
    static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
    KEY.get_or_init(|| RsaPrivateKey::new(&mut OsRng, 1024).expect("RSA-Schluessel"))
}

pub fn kompakter_schluessel() -> String {
    let der = RsaPublicKey::from(schluessel())
        .to_public_key_der()
        .expect("DER");
    STANDARD.encode(der.as_bytes())
}

pub fn verzeichnis() -> NodeDirectory {
    NodeDirectory::from_map([
        ("dept-A", DEPT_A_URL),
        ("dept-B", DEPT_B_URL),
        ("default", DEFAULT_URL),
    ])
    .expect("Verzeichnis")
}

pub fn login_antwort(org: &str) -> Value {
    json!({
        "code": 200,
        "message": "Anmeldung erfolgreich",
        "data": {
            "token": "jwt-abc",
            "userInfo": {
                "id": 11,
                "username": "lehrer01",
                "realName": "Erika Muster",
                "role": "teacher",
                "department": org
            }
        }
    })
}

type Handler = Box<dyn Fn(&HttpRequest) -> HttpResponse + Send + Sync>;

/// Beantwortet Anfragen per Closure und merkt sich alle ausser dem Schluesselabruf
pub struct SkriptBackend {
    handler: Handler,
    verzoegerung: Duration,
    anfragen: Mutex<Vec<HttpRequest>>,
}

impl SkriptBackend {
    pub fn neu(handler: impl Fn(&HttpRequest) -> HttpResponse + Send + Sync + 'static) -> Arc<Self> {
        Self::mit_verzoegerung(Duration::ZERO, handler)
    }

    pub fn mit_verzoegerung(
        verzoegerung: Duration,
        handler: impl Fn(&HttpRequest) -> HttpResponse + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            handler: Box::new(handler),
            verzoegerung,
            anfragen: Mutex::new(Vec::new()),
        })
    }

    pub fn anfragen(&self) -> Vec<HttpRequest> {
        self.anfragen.lock().clone()
    }

    pub fn letzte(&self) -> HttpRequest {
        self.anfragen.lock().last().cloned().expect("keine Anfrage")
    }
}

#[async_trait]
impl HttpBackend for SkriptBackend {
    async fn send(&self, anfrage: HttpRequest) -> Result<HttpResponse, BackendError> {
        if anfrage.url.ends_with("/auth/public-key") {
            return Ok(HttpResponse::json(
                200,
                &json!({"code": 200, "message": "ok", "data": {"publicKey": kompakter_schluessel()}}),
            ));
        }
        self.anfragen.lock().push(anfrage.clone());
        if !self.verzoegerung.is_zero() {
            tokio::time::sleep(self.verzoegerung).await;
        }
        Ok((self.handler)(&anfrage))
    }
}

#[derive(Default)]
pub struct ZaehlenderPrompt {
    pub aufrufe: AtomicUsize,
    pub login_seite: AtomicBool,
}

impl ZaehlenderPrompt {
    pub fn anzahl(&self) -> usize {
        self.aufrufe.load(Ordering::SeqCst)
    }
}

impl ReauthPrompt for ZaehlenderPrompt {
    fn on_login_surface(&self) -> bool {
        self.login_seite.load(Ordering::SeqCst)
    }

    fn prompt_reauthentication(&self) {
        self.aufrufe.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct Aufbau {
    pub client: ExamClient,
    pub backend: Arc<SkriptBackend>,
    pub store: Arc<MemorySessionStore>,
    pub prompt: Arc<ZaehlenderPrompt>,
}

pub fn aufbauen(backend: Arc<SkriptBackend>) -> Aufbau {
    aufbauen_mit_frist(backend, Duration::from_secs(5))
}

pub fn aufbauen_mit_frist(backend: Arc<SkriptBackend>, frist: Duration) -> Aufbau {
    let store = Arc::new(MemorySessionStore::neu());
    let prompt = Arc::new(ZaehlenderPrompt::default());
    let client = ExamClient::mit_backend(
        backend.clone(),
        verzeichnis(),
        store.clone() as Arc<dyn SessionStore>,
        prompt.clone(),
        DEFAULT_URL,
        frist,
    );
    Aufbau {
        client,
        backend,
        store,
        prompt,
    }
}
