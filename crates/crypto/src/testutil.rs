//! Test-Hilfen: einmal erzeugtes RSA-Schluesselpaar und zaehlende Schluesselquelle

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::rngs::OsRng;
use rsa::pkcs8::EncodePublicKey;
use rsa::{RsaPrivateKey, RsaPublicKey};

use crate::error::{CryptoError, CryptoResult};
use crate::key_agent::KeySource;

static SCHLUESSEL: OnceLock<RsaPrivateKey> = OnceLock::new();

/// 1024 Bit reichen fuer Tests und halten die Erzeugung kurz
pub fn schluesselpaar() -> &'static RsaPrivateKey {
    SCHLUESSEL.get_or_init(|| {
        RsaPrivateKey::new(&mut OsRng, 1024).expect("RSA-Schluessel-Erzeugung fehlgeschlagen")
    })
}

pub fn kompakter_schluessel() -> String {
    let der = RsaPublicKey::from(schluesselpaar())
        .to_public_key_der()
        .expect("DER-Kodierung fehlgeschlagen");
    STANDARD.encode(der.as_bytes())
}

/// Schluesselquelle, die ihre Aufrufe zaehlt
pub struct ZaehlendeQuelle {
    antwort: Option<String>,
    verzoegerung: Duration,
    aufrufe: AtomicUsize,
}

impl ZaehlendeQuelle {
    pub fn ok(antwort: String) -> Arc<Self> {
        Self::mit_verzoegerung(antwort, Duration::ZERO)
    }

    pub fn mit_verzoegerung(antwort: String, verzoegerung: Duration) -> Arc<Self> {
        Arc::new(Self {
            antwort: Some(antwort),
            verzoegerung,
            aufrufe: AtomicUsize::new(0),
        })
    }

    pub fn fehler() -> Arc<Self> {
        Arc::new(Self {
            antwort: None,
            verzoegerung: Duration::ZERO,
            aufrufe: AtomicUsize::new(0),
        })
    }

    pub fn anzahl(&self) -> usize {
        self.aufrufe.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeySource for ZaehlendeQuelle {
    async fn fetch_compact_key(&self) -> CryptoResult<String> {
        self.aufrufe.fetch_add(1, Ordering::SeqCst);
        if !self.verzoegerung.is_zero() {
            tokio::time::sleep(self.verzoegerung).await;
        }
        self.antwort
            .clone()
            .ok_or_else(|| CryptoError::SchluesselNichtVerfuegbar("Knoten nicht erreichbar".into()))
    }
}
