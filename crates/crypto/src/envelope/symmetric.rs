//! AES-256-CBC fuer den Inhalt beliebiger Laenge
//!
//! ## Format
//! ```text
//! base64( [iv(16)] [ciphertext (PKCS#7, Vielfaches von 16)] )
//! ```
//!
//! Der IV wird pro Aufruf zufaellig erzeugt und vorangestellt, damit die
//! Entschluesselung ohne weitere Angaben auskommt.

use aes::Aes256;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::{CryptoError, CryptoResult};
use crate::types::SCHLUESSEL_LAENGE;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// Laenge des Initialisierungsvektors
pub const IV_LAENGE: usize = 16;

/// AES-Blockgroesse
pub const BLOCK_LAENGE: usize = 16;

/// Laenge des Ciphertexts (ohne IV) fuer einen Klartext gegebener Laenge
pub fn gepolsterte_laenge(klartext_laenge: usize) -> usize {
    (klartext_laenge / BLOCK_LAENGE + 1) * BLOCK_LAENGE
}

/// Verschluesselt den Inhalt und gibt `base64(iv || ciphertext)` zurueck
pub fn aes_cbc_encrypt(key_bytes: &[u8], klartext: &[u8]) -> CryptoResult<String> {
    pruefe_schluessel(key_bytes)?;

    let mut iv = [0u8; IV_LAENGE];
    OsRng.fill_bytes(&mut iv);

    let cipher = Aes256CbcEnc::new_from_slices(key_bytes, &iv)
        .map_err(|e| CryptoError::Verschluesselung(e.to_string()))?;
    let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(klartext);

    let mut out = Vec::with_capacity(IV_LAENGE + ciphertext.len());
    out.extend_from_slice(&iv);
    out.extend_from_slice(&ciphertext);
    Ok(STANDARD.encode(out))
}

/// Entschluesselt `base64(iv || ciphertext)`
pub fn aes_cbc_decrypt(key_bytes: &[u8], kodiert: &str) -> CryptoResult<Vec<u8>> {
    pruefe_schluessel(key_bytes)?;

    let daten = STANDARD.decode(kodiert.trim())?;
    if daten.len() < IV_LAENGE + BLOCK_LAENGE || (daten.len() - IV_LAENGE) % BLOCK_LAENGE != 0 {
        return Err(CryptoError::UngueltigeDaten(format!(
            "Ungueltige Ciphertext-Laenge: {}",
            daten.len()
        )));
    }

    let (iv, ciphertext) = daten.split_at(IV_LAENGE);
    let cipher = Aes256CbcDec::new_from_slices(key_bytes, iv)
        .map_err(|e| CryptoError::Entschluesselung(e.to_string()))?;
    cipher
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|e| CryptoError::Entschluesselung(e.to_string()))
}

fn pruefe_schluessel(key_bytes: &[u8]) -> CryptoResult<()> {
    if key_bytes.len() != SCHLUESSEL_LAENGE {
        return Err(CryptoError::UngueltigeSchluesselLaenge {
            erwartet: SCHLUESSEL_LAENGE,
            erhalten: key_bytes.len(),
        });
    }
    Ok(())
}
