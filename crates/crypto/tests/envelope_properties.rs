//! Eigenschaften der Umschlaege aus Sicht eines Empfaengers

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use papervault_core::OrgKey;
use papervault_crypto::envelope::symmetric::{gepolsterte_laenge, IV_LAENGE};
use papervault_crypto::envelope::CIPHERTEXT_FELDER;
use papervault_crypto::{
    CryptoError, CryptoResult, EnvelopeEncoder, EnvelopeOpener, KeyAgent, KeySource, PaperDraft,
};
use rand::rngs::OsRng;
use rsa::pkcs8::EncodePublicKey;
use rsa::{RsaPrivateKey, RsaPublicKey};

fn schluessel() -> &'static RsaPrivateKey {
    static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
    KEY.get_or_init(|| RsaPrivateKey::new(&mut OsRng, 1024).unwrap())
}

struct FesteQuelle(Option<String>);

#[async_trait]
impl KeySource for FesteQuelle {
    async fn fetch_compact_key(&self) -> CryptoResult<String> {
        self.0
            .clone()
            .ok_or_else(|| CryptoError::SchluesselNichtVerfuegbar("offline".into()))
    }
}

fn encoder() -> EnvelopeEncoder {
    let der = RsaPublicKey::from(schluessel()).to_public_key_der().unwrap();
    let quelle = Arc::new(FesteQuelle(Some(STANDARD.encode(der.as_bytes()))));
    EnvelopeEncoder::neu(Arc::new(KeyAgent::neu(quelle)))
}

fn opener() -> EnvelopeOpener {
    EnvelopeOpener::neu(schluessel().clone())
}

fn entwurf(content: &str) -> PaperDraft {
    PaperDraft {
        course_name: "Lineare Algebra".into(),
        exam_type: "midterm".into(),
        semester: "2025-SS".into(),
        department: OrgKey::from("dept-B"),
        content: content.into(),
        file_path: Some("papers/la.pdf".into()),
    }
}

/// Kippt ein Bit im dekodierten Base64-Wert und kodiert neu
fn bit_kippen(feld: &mut String) {
    let mut bytes = STANDARD.decode(feld.as_bytes()).unwrap();
    let mitte = bytes.len() / 2;
    bytes[mitte] ^= 0x01;
    *feld = STANDARD.encode(bytes);
}

#[tokio::test]
async fn roundtrip_fuer_verschiedene_inhalte() {
    let inhalte = [
        String::new(),
        "a".to_string(),
        "x".repeat(15),
        "y".repeat(16),
        "Prüfung – Aufgabe 1: ∫ f(x) dx".to_string(),
        "z".repeat(64 * 1024),
    ];
    let enc = encoder();

    for inhalt in &inhalte {
        let draft = entwurf(inhalt);
        let env = enc.encrypt_submission(&draft).await.unwrap();

        let kodiert = STANDARD.decode(&env.content).unwrap();
        assert_eq!(kodiert.len(), IV_LAENGE + gepolsterte_laenge(inhalt.len()));

        assert_eq!(opener().open_submission(&env).unwrap(), draft);
    }
}

#[tokio::test]
async fn bitfehler_in_jedem_ciphertext_feld_bricht_das_tag() {
    let original = encoder().encrypt_submission(&entwurf("Inhalt")).await.unwrap();

    for name in CIPHERTEXT_FELDER {
        let mut env = original.clone();
        bit_kippen(env.feld_mut(name).unwrap());
        let err = match opener().verify_submission(&env) {
            Err(e) => e,
            Ok(_) => panic!("Manipulation an {name} nicht erkannt"),
        };
        // encryptedAesKey scheitert bereits beim Auspacken von K
        if name != "encryptedAesKey" {
            assert!(matches!(err, CryptoError::TagUngueltig), "{name}: {err:?}");
        }
    }
}

#[tokio::test]
async fn zeitstempel_und_nonce_sind_gebunden() {
    let original = encoder().encrypt_submission(&entwurf("Inhalt")).await.unwrap();

    let mut env = original.clone();
    env.timestamp += 1;
    assert!(matches!(
        opener().verify_submission(&env),
        Err(CryptoError::TagUngueltig)
    ));

    let mut env = original;
    env.nonce.replace_range(0..1, if env.nonce.starts_with('0') { "1" } else { "0" });
    assert!(matches!(
        opener().verify_submission(&env),
        Err(CryptoError::TagUngueltig)
    ));
}

#[tokio::test]
async fn falsches_tag_laesst_felder_entschluesselbar() {
    let mut env = encoder().encrypt_submission(&entwurf("Inhalt")).await.unwrap();
    env.hmac = "00".repeat(32);

    assert!(opener().open_submission(&env).is_err());
    assert_eq!(opener().decrypt_field(&env.course_name).unwrap(), "Lineare Algebra");
    let k = opener().recover_session_key(&env).unwrap();
    assert_eq!(opener().decrypt_body(&k, &env).unwrap(), "Inhalt");
}

#[tokio::test]
async fn jeder_umschlag_ist_frisch() {
    let enc = encoder();
    let mut nonces = std::collections::HashSet::new();
    for _ in 0..20 {
        let env = enc.encrypt_submission(&entwurf("gleich")).await.unwrap();
        assert!(nonces.insert(env.nonce));
    }
}

#[tokio::test]
async fn ohne_schluessel_kein_umschlag() {
    let enc = EnvelopeEncoder::neu(Arc::new(KeyAgent::neu(Arc::new(FesteQuelle(None)))));
    assert!(enc.encrypt_credential("pw").await.is_err());
    assert!(enc.encrypt_submission(&entwurf("x")).await.is_err());
    assert!(enc.key_agent().cached().is_none());
}

#[tokio::test]
async fn ueberlanges_metadatum_wird_abgelehnt() {
    let mut draft = entwurf("x");
    // 1024 Bit: hoechstens 117 Byte pro Feld
    draft.semester = "s".repeat(118);
    let err = encoder().encrypt_submission(&draft).await.unwrap_err();
    assert!(matches!(
        err,
        CryptoError::KlartextZuLang {
            laenge: 118,
            maximum: 117
        }
    ));
}
