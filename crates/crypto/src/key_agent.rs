//! KeyAgent – beschafft und cached den oeffentlichen Netzwerk-Schluessel
//!
//! Der Agent wird einmal konstruiert und per `Arc` an alle Verschluesseler
//! weitergereicht. Es gibt keinen versteckten globalen Zustand.
//!
//! ## Ablauf
//! 1. Cache-Treffer: Schluessel sofort zurueckgeben
//! 2. Sonst: Fetch-Gate sperren, erneut pruefen (ein Fetch fuer viele Leser)
//! 3. Kompakte Form von der `KeySource` holen und normalisieren
//! 4. Nur bei Erfolg cachen; Fehler werden nie gecacht (fail closed)

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::sync::Mutex;

use crate::error::{CryptoError, CryptoResult};
use crate::types::PublicKeyMaterial;

/// Vertrauenswuerdige Quelle fuer die kompakte Schluesselform
#[async_trait]
pub trait KeySource: Send + Sync {
    /// Liefert den oeffentlichen Schluessel als Base64-DER
    async fn fetch_compact_key(&self) -> CryptoResult<String>;
}

/// Prozessweiter Schluessel-Cache mit expliziter Invalidierung
pub struct KeyAgent {
    source: Arc<dyn KeySource>,
    /// Ganzwert-Ersetzung, Leser sehen nie einen halben Zustand
    cached: RwLock<Option<Arc<PublicKeyMaterial>>>,
    /// Serialisiert Fetches, damit parallele Leser einen Fetch teilen
    fetch_gate: Mutex<()>,
    /// Wird bei jedem `clear_cache` erhoeht; veraltete Fetches cachen nicht
    generation: AtomicU64,
}

impl KeyAgent {
    /// Leerer Cache ueber der Quelle
    pub fn neu(source: Arc<dyn KeySource>) -> Self {
        Self {
            source,
            cached: RwLock::new(None),
            fetch_gate: Mutex::new(()),
            generation: AtomicU64::new(0),
        }
    }

    /// Gibt den gecachten Schluessel zurueck oder laedt ihn von der Quelle
    pub async fn get_public_key(&self) -> CryptoResult<Arc<PublicKeyMaterial>> {
        if let Some(key) = self.cached() {
            return Ok(key);
        }

        let _gate = self.fetch_gate.lock().await;

        // Ein anderer Aufrufer hat waehrend des Wartens geladen
        if let Some(key) = self.cached() {
            return Ok(key);
        }

        let generation = self.generation.load(Ordering::SeqCst);

        let material = match self.fetch_and_normalize().await {
            Ok(material) => Arc::new(material),
            Err(e) => {
                tracing::warn!(fehler = %e, "Oeffentlicher Schluessel konnte nicht geladen werden");
                return Err(e);
            }
        };

        {
            let mut slot = self.cached.write();
            if self.generation.load(Ordering::SeqCst) == generation {
                *slot = Some(Arc::clone(&material));
            }
        }

        tracing::info!(
            fingerprint = %material.fingerprint(),
            max_block = material.max_klartext_laenge(),
            "Oeffentlicher Schluessel geladen"
        );
        Ok(material)
    }

    /// Verwirft den Cache; der naechste Aufruf laedt neu
    pub fn clear_cache(&self) {
        let mut slot = self.cached.write();
        self.generation.fetch_add(1, Ordering::SeqCst);
        *slot = None;
        tracing::debug!("Schluessel-Cache geleert");
    }

    /// Aktueller Cache-Inhalt ohne Netzwerkzugriff
    pub fn cached(&self) -> Option<Arc<PublicKeyMaterial>> {
        self.cached.read().clone()
    }

    async fn fetch_and_normalize(&self) -> CryptoResult<PublicKeyMaterial> {
        let kompakt = self.source.fetch_compact_key().await.map_err(|e| match e {
            e @ CryptoError::SchluesselNichtVerfuegbar(_) => e,
            other => CryptoError::SchluesselNichtVerfuegbar(other.to_string()),
        })?;
        PublicKeyMaterial::aus_kompakter_form(&kompakt)
    }
}

impl std::fmt::Debug for KeyAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyAgent")
            .field("cached", &self.cached().map(|k| k.fingerprint().to_string()))
            .field("generation", &self.generation.load(Ordering::Relaxed))
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{kompakter_schluessel, ZaehlendeQuelle};
    use std::time::Duration;

    #[tokio::test]
    async fn erster_aufruf_laedt_danach_cache() {
        let quelle = ZaehlendeQuelle::ok(kompakter_schluessel());
        let agent = KeyAgent::neu(quelle.clone());

        let a = agent.get_public_key().await.unwrap();
        let b = agent.get_public_key().await.unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(quelle.anzahl(), 1);
    }

    #[tokio::test]
    async fn clear_cache_erzwingt_genau_einen_neuen_fetch() {
        let quelle = ZaehlendeQuelle::ok(kompakter_schluessel());
        let agent = KeyAgent::neu(quelle.clone());

        agent.get_public_key().await.unwrap();
        agent.clear_cache();
        assert!(agent.cached().is_none());

        agent.get_public_key().await.unwrap();
        agent.get_public_key().await.unwrap();
        assert_eq!(quelle.anzahl(), 2);
    }

    #[tokio::test]
    async fn parallele_leser_teilen_einen_fetch() {
        let quelle =
            ZaehlendeQuelle::mit_verzoegerung(kompakter_schluessel(), Duration::from_millis(50));
        let agent = Arc::new(KeyAgent::neu(quelle.clone()));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let agent = Arc::clone(&agent);
            handles.push(tokio::spawn(async move { agent.get_public_key().await }));
        }
        for h in handles {
            h.await.unwrap().unwrap();
        }

        assert_eq!(quelle.anzahl(), 1);
    }

    #[tokio::test]
    async fn fehler_wird_nicht_gecacht() {
        let quelle = ZaehlendeQuelle::fehler();
        let agent = KeyAgent::neu(quelle.clone());

        let err = agent.get_public_key().await.unwrap_err();
        assert!(err.ist_schluessel_fehler());
        assert!(agent.cached().is_none());

        // Zweiter Versuch fragt erneut an
        let _ = agent.get_public_key().await;
        assert_eq!(quelle.anzahl(), 2);
    }

    #[tokio::test]
    async fn kaputtes_material_ergibt_schluessel_fehler() {
        let quelle = ZaehlendeQuelle::ok("kein-schluessel".to_string());
        let agent = KeyAgent::neu(quelle);

        let err = agent.get_public_key().await.unwrap_err();
        assert!(matches!(err, CryptoError::SchluesselNichtVerfuegbar(_)));
        assert!(agent.cached().is_none());
    }

    #[tokio::test]
    async fn clear_waehrend_fetch_cacht_veraltetes_ergebnis_nicht() {
        let quelle =
            ZaehlendeQuelle::mit_verzoegerung(kompakter_schluessel(), Duration::from_millis(50));
        let agent = Arc::new(KeyAgent::neu(quelle.clone()));

        let laeufer = {
            let agent = Arc::clone(&agent);
            tokio::spawn(async move { agent.get_public_key().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        agent.clear_cache();

        // Der laufende Aufruf bekommt seinen Schluessel, cacht ihn aber nicht
        laeufer.await.unwrap().unwrap();
        assert!(agent.cached().is_none());

        agent.get_public_key().await.unwrap();
        assert_eq!(quelle.anzahl(), 2);
    }
}
