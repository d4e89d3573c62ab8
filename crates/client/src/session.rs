//! Sitzungsspeicher
//!
//! Eine einzige geteilte Zelle (`tokio::sync::watch`) haelt Token, Profil
//! und gewaehlten Knoten. Jede Aenderung ersetzt den ganzen Wert, Leser
//! sehen also immer einen vollstaendigen Zustand vor oder nach einem
//! Schreibvorgang. Wer `subscribe()` nutzt, wird ohne Polling benachrichtigt.

use std::path::{Path, PathBuf};

use papervault_core::Profile;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::error::{ClientError, ClientResult};

/// Vollstaendiger Sitzungszustand
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub profile: Option<Profile>,
    /// `None` bedeutet: Default-Knoten
    #[serde(default)]
    pub node_url: Option<String>,
}

impl SessionState {
    /// Authenticated genau dann, wenn ein nicht-leeres Token vorliegt
    pub fn auth_state(&self) -> AuthState {
        match self.token.as_deref() {
            Some(t) if !t.is_empty() => AuthState::Authenticated,
            _ => AuthState::Anonymous,
        }
    }

    /// Token, wie es als Bearer gesendet wuerde
    pub fn bearer(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.is_empty())
    }

    /// Setzt auf den Anfangszustand zurueck; `true` wenn vorher angemeldet
    fn leeren(&mut self) -> bool {
        let hatte_token = self.auth_state() == AuthState::Authenticated;
        *self = Self::default();
        hatte_token
    }
}

/// Zustand des Anmelde-Lebenszyklus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Anonymous,
    Authenticated,
}

/// Schnittstelle zum Sitzungsspeicher
pub trait SessionStore: Send + Sync {
    /// Aktueller Zustand als Kopie
    fn snapshot(&self) -> SessionState;

    /// Ersetzt nur das Token
    fn set_credential(&self, token: String) -> ClientResult<()>;

    /// Ersetzt nur das Profil
    fn set_profile(&self, profile: Profile) -> ClientResult<()>;

    /// Ersetzt nur die Knotenwahl
    fn set_node_url(&self, url: String) -> ClientResult<()>;

    /// Anonymous -> Authenticated in einem Schreibvorgang.
    /// `node_url == None` behaelt die bisherige Knotenwahl.
    fn anmelden(&self, token: String, profile: Profile, node_url: Option<String>) -> ClientResult<()>;

    /// Loescht Token, Profil und Knotenwahl in einem Schritt.
    /// Liefert `true`, wenn vorher ein Token vorhanden war.
    fn purge(&self) -> ClientResult<bool>;

    /// Wie `purge`, aber nur solange das gespeicherte Token noch `gesendet`
    /// ist. Eine spaetere Anmeldung bleibt so unberuehrt.
    fn purge_wenn_token(&self, gesendet: Option<&str>) -> ClientResult<bool>;

    /// Empfaenger, der bei jeder Aenderung geweckt wird
    fn subscribe(&self) -> watch::Receiver<SessionState>;
}

fn anmeldung_eintragen(zustand: &mut SessionState, token: String, profile: Profile, node_url: Option<String>) {
    let node_url = node_url.or_else(|| zustand.node_url.take());
    *zustand = SessionState {
        token: Some(token),
        profile: Some(profile),
        node_url,
    };
}

fn leeren_wenn_token(zustand: &mut SessionState, gesendet: Option<&str>) -> bool {
    if zustand.bearer() == gesendet {
        zustand.leeren()
    } else {
        false
    }
}

// ---------------------------------------------------------------------------
// Im Speicher
// ---------------------------------------------------------------------------

/// Sitzung nur im Speicher; geht mit dem Prozess verloren
pub struct MemorySessionStore {
    zelle: watch::Sender<SessionState>,
}

impl MemorySessionStore {
    /// Leere Sitzung
    pub fn neu() -> Self {
        Self::mit_zustand(SessionState::default())
    }

    /// Sitzung mit vorgegebenem Anfangszustand
    pub fn mit_zustand(zustand: SessionState) -> Self {
        let (zelle, _) = watch::channel(zustand);
        Self { zelle }
    }

    /// Wendet `f` auf eine Kopie an, laesst sie von `sichern` ablegen und
    /// veroeffentlicht sie erst danach. Scheitert `sichern`, bleibt die
    /// Zelle unveraendert. Unveraenderte Werte wecken niemanden.
    fn uebergang<T>(
        &self,
        f: impl FnOnce(&mut SessionState) -> T,
        sichern: impl FnOnce(&SessionState) -> ClientResult<()>,
    ) -> ClientResult<T> {
        let mut ergebnis = None;
        self.zelle.send_if_modified(|zustand| {
            let mut neu = zustand.clone();
            let wert = f(&mut neu);
            if neu == *zustand {
                ergebnis = Some(Ok(wert));
                return false;
            }
            match sichern(&neu) {
                Ok(()) => {
                    *zustand = neu;
                    ergebnis = Some(Ok(wert));
                    true
                }
                Err(e) => {
                    ergebnis = Some(Err(e));
                    false
                }
            }
        });
        ergebnis.unwrap_or_else(|| Err(ClientError::Speicher("Zustandswechsel nicht ausgefuehrt".into())))
    }

    fn aendern<T>(&self, f: impl FnOnce(&mut SessionState) -> T) -> ClientResult<T> {
        self.uebergang(f, |_| Ok(()))
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::neu()
    }
}

impl SessionStore for MemorySessionStore {
    fn snapshot(&self) -> SessionState {
        self.zelle.borrow().clone()
    }

    fn set_credential(&self, token: String) -> ClientResult<()> {
        self.aendern(|s| s.token = Some(token))
    }

    fn set_profile(&self, profile: Profile) -> ClientResult<()> {
        self.aendern(|s| s.profile = Some(profile))
    }

    fn set_node_url(&self, url: String) -> ClientResult<()> {
        self.aendern(|s| s.node_url = Some(url))
    }

    fn anmelden(&self, token: String, profile: Profile, node_url: Option<String>) -> ClientResult<()> {
        self.aendern(|s| anmeldung_eintragen(s, token, profile, node_url))
    }

    fn purge(&self) -> ClientResult<bool> {
        self.aendern(SessionState::leeren)
    }

    fn purge_wenn_token(&self, gesendet: Option<&str>) -> ClientResult<bool> {
        self.aendern(|s| leeren_wenn_token(s, gesendet))
    }

    fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.zelle.subscribe()
    }
}

// ---------------------------------------------------------------------------
// Dateibasiert
// ---------------------------------------------------------------------------

/// Wie `MemorySessionStore`, zusaetzlich als JSON-Datei gespiegelt.
///
/// Ein neuer Zustand wird erst geschrieben und dann veroeffentlicht; Datei
/// und Zelle zeigen also nie verschiedene Staende.
pub struct FileSessionStore {
    speicher: MemorySessionStore,
    pfad: PathBuf,
}

impl FileSessionStore {
    /// Laedt den letzten Stand; fehlende oder kaputte Datei -> leer
    pub fn oeffnen(pfad: impl Into<PathBuf>) -> ClientResult<Self> {
        let pfad = pfad.into();
        let zustand = match std::fs::read(&pfad) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                tracing::warn!(pfad = %pfad.display(), fehler = %e, "Sitzungsdatei unlesbar, starte leer");
                SessionState::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => SessionState::default(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            speicher: MemorySessionStore::mit_zustand(zustand),
            pfad,
        })
    }

    fn persistieren(&self, zustand: &SessionState) -> ClientResult<()> {
        let json = serde_json::to_vec_pretty(zustand)
            .map_err(|e| ClientError::Speicher(e.to_string()))?;
        atomar_schreiben(&self.pfad, &json)
    }

    /// Leerer Zustand auf der Platte; klappt das Schreiben nicht, reicht
    /// es auch, die Datei zu entfernen
    fn leere_datei(&self, zustand: &SessionState) -> ClientResult<()> {
        match self.persistieren(zustand) {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::warn!(pfad = %self.pfad.display(), fehler = %e, "Leere Sitzung nicht schreibbar, entferne Datei");
                match std::fs::remove_file(&self.pfad) {
                    Ok(()) => Ok(()),
                    Err(io) if io.kind() == std::io::ErrorKind::NotFound => Ok(()),
                    Err(_) => Err(e),
                }
            }
        }
    }

    fn mit_persistenz<T>(&self, f: impl FnOnce(&mut SessionState) -> T) -> ClientResult<T> {
        self.speicher.uebergang(f, |z| self.persistieren(z))
    }
}

impl SessionStore for FileSessionStore {
    fn snapshot(&self) -> SessionState {
        self.speicher.snapshot()
    }

    fn set_credential(&self, token: String) -> ClientResult<()> {
        self.mit_persistenz(|s| s.token = Some(token))
    }

    fn set_profile(&self, profile: Profile) -> ClientResult<()> {
        self.mit_persistenz(|s| s.profile = Some(profile))
    }

    fn set_node_url(&self, url: String) -> ClientResult<()> {
        self.mit_persistenz(|s| s.node_url = Some(url))
    }

    fn anmelden(&self, token: String, profile: Profile, node_url: Option<String>) -> ClientResult<()> {
        self.mit_persistenz(|s| anmeldung_eintragen(s, token, profile, node_url))
    }

    fn purge(&self) -> ClientResult<bool> {
        self.speicher.uebergang(SessionState::leeren, |z| self.leere_datei(z))
    }

    fn purge_wenn_token(&self, gesendet: Option<&str>) -> ClientResult<bool> {
        self.speicher
            .uebergang(|s| leeren_wenn_token(s, gesendet), |z| self.leere_datei(z))
    }

    fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.speicher.subscribe()
    }
}

/// Schreibt erst in eine temporaere Datei und benennt sie dann um
fn atomar_schreiben(pfad: &Path, inhalt: &[u8]) -> ClientResult<()> {
    if let Some(eltern) = pfad.parent() {
        if !eltern.as_os_str().is_empty() {
            std::fs::create_dir_all(eltern)?;
        }
    }

    let tmp = pfad.with_extension("json.tmp");
    std::fs::write(&tmp, inhalt)?;
    if let Err(e) = std::fs::rename(&tmp, pfad) {
        tracing::error!(von = %tmp.display(), nach = %pfad.display(), fehler = %e, "Umbenennen fehlgeschlagen");
        let _ = std::fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
