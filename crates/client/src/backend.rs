//! HTTP-Backend
//!
//! Der Transport spricht nur mit dem `HttpBackend`-Trait; die echte
//! Implementierung nutzt reqwest, Tests setzen eigene Backends ein.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

use crate::error::{ClientError, ClientResult};

/// HTTP-Methode; die Knoten-API braucht nur diese beiden
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Methode {
    Get,
    Post,
}

/// Eine fertig adressierte Anfrage
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub methode: Methode,
    pub url: String,
    /// Wird als `Authorization: Bearer ...` gesendet
    pub bearer: Option<String>,
    pub body: Option<serde_json::Value>,
}

/// Status und roher Body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Antwort mit JSON-Body
    pub fn json(status: u16, wert: &serde_json::Value) -> Self {
        Self {
            status,
            body: wert.to_string().into_bytes(),
        }
    }

    /// 2xx
    pub fn ist_erfolg(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Verbindung fehlgeschlagen: {0}")]
    Verbindung(String),

    #[error("Zeitueberschreitung")]
    Zeitueberschreitung,

    #[error("{0}")]
    Sonstiges(String),
}

#[async_trait]
pub trait HttpBackend: Send + Sync {
    /// Sendet genau einmal, ohne Wiederholung
    async fn send(&self, anfrage: HttpRequest) -> Result<HttpResponse, BackendError>;
}

/// reqwest mit rustls und JSON
#[derive(Debug, Clone)]
pub struct ReqwestBackend {
    client: Client,
}

impl ReqwestBackend {
    /// HTTP-Client mit Gesamt- und Verbindungsfrist
    pub fn neu(timeout: Duration) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .build()
            .map_err(|e| ClientError::Konfiguration(format!("HTTP-Client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpBackend for ReqwestBackend {
    async fn send(&self, anfrage: HttpRequest) -> Result<HttpResponse, BackendError> {
        let mut builder = match anfrage.methode {
            Methode::Get => self.client.get(&anfrage.url),
            Methode::Post => self.client.post(&anfrage.url),
        };
        if let Some(token) = &anfrage.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &anfrage.body {
            builder = builder.json(body);
        }

        let antwort = builder.send().await.map_err(fehler_einordnen)?;
        let status = antwort.status().as_u16();
        let body = antwort.bytes().await.map_err(fehler_einordnen)?;

        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }
}

fn fehler_einordnen(e: reqwest::Error) -> BackendError {
    if e.is_timeout() {
        BackendError::Zeitueberschreitung
    } else if e.is_connect() {
        BackendError::Verbindung(e.to_string())
    } else {
        BackendError::Sonstiges(e.to_string())
    }
}
