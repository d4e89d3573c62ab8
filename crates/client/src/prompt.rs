//! Aufforderung zur erneuten Anmeldung

use std::sync::atomic::{AtomicBool, Ordering};

/// Oberflaeche, die nach einem 401 zur erneuten Anmeldung auffordert
pub trait ReauthPrompt: Send + Sync {
    /// `true` solange der Benutzer ohnehin gerade die Anmeldung sieht
    fn on_login_surface(&self) -> bool;

    /// Hoechstens einmal pro Uebergang Authenticated -> Anonymous
    fn prompt_reauthentication(&self);
}

/// Meldung ueber das Log; fuer die Kommandozeile
#[derive(Debug, Default)]
pub struct LoggingPrompt {
    login_aktiv: AtomicBool,
}

impl LoggingPrompt {
    /// Prompt, der zunaechst nicht auf der Anmeldeseite steht
    pub fn neu() -> Self {
        Self::default()
    }

    /// Markiert, ob gerade eine Anmeldung laeuft
    pub fn login_aktiv_setzen(&self, aktiv: bool) {
        self.login_aktiv.store(aktiv, Ordering::SeqCst);
    }
}

impl ReauthPrompt for LoggingPrompt {
    fn on_login_surface(&self) -> bool {
        self.login_aktiv.load(Ordering::SeqCst)
    }

    fn prompt_reauthentication(&self) {
        tracing::warn!("Anmeldung abgelaufen, bitte erneut anmelden (papervault login)");
    }
}
