//! Knoten-Routing
//!
//! Jede Organisation hat ihren eigenen Backend-Knoten. Die Zuordnung ist
//! eine totale Funktion: unbekannte Schluessel landen beim Eintrag `default`.

use std::collections::BTreeMap;
use std::sync::Arc;

use papervault_core::Profile;

use crate::error::{ClientError, ClientResult};
use crate::session::SessionStore;

/// Name des Pflicht-Eintrags
pub const DEFAULT_SCHLUESSEL: &str = "default";

/// Unveraenderliche Tabelle Organisationsschluessel -> Basis-URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDirectory {
    eintraege: BTreeMap<String, String>,
    default_url: String,
}

impl NodeDirectory {
    /// Baut die Tabelle; ohne nicht-leeren `default`-Eintrag gibt es keine
    pub fn from_map<I, K, V>(eintraege: I) -> ClientResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut tabelle = BTreeMap::new();
        for (k, v) in eintraege {
            let schluessel: String = k.into();
            let url: String = v.into();
            let url = url.trim().trim_end_matches('/').to_string();
            if url.is_empty() {
                return Err(ClientError::Konfiguration(format!(
                    "leere URL fuer Knoten '{schluessel}'"
                )));
            }
            tabelle.insert(schluessel, url);
        }

        let default_url = tabelle
            .get(DEFAULT_SCHLUESSEL)
            .cloned()
            .ok_or_else(|| ClientError::Konfiguration("Eintrag 'default' fehlt".into()))?;

        Ok(Self {
            eintraege: tabelle,
            default_url,
        })
    }

    /// Liefert immer eine URL; unbekannt -> `default`
    pub fn resolve_endpoint(&self, org_key: &str) -> &str {
        self.eintraege
            .get(org_key)
            .map(String::as_str)
            .unwrap_or(&self.default_url)
    }

    /// URL des Pflicht-Eintrags
    pub fn default_url(&self) -> &str {
        &self.default_url
    }
}

/// Bindet die Tabelle an den Sitzungsspeicher
#[derive(Clone)]
pub struct NodeRouter {
    directory: Arc<NodeDirectory>,
    store: Arc<dyn SessionStore>,
}

impl NodeRouter {
    /// Router ueber einer festen Tabelle
    pub fn neu(directory: Arc<NodeDirectory>, store: Arc<dyn SessionStore>) -> Self {
        Self { directory, store }
    }

    /// Zugrunde liegende Tabelle
    pub fn directory(&self) -> &NodeDirectory {
        &self.directory
    }

    /// Siehe [`NodeDirectory::resolve_endpoint`]
    pub fn resolve_endpoint(&self, org_key: &str) -> &str {
        self.directory.resolve_endpoint(org_key)
    }

    /// Speichert den aktiven Knoten im Sitzungsspeicher
    pub fn set_endpoint(&self, url: &str) -> ClientResult<()> {
        tracing::debug!(endpoint = %url, "Aktiver Knoten gesetzt");
        self.store.set_node_url(url.to_string())
    }

    /// Aktiver Knoten; ohne Auswahl der Default
    pub fn active_endpoint(&self) -> String {
        self.store
            .snapshot()
            .node_url
            .unwrap_or_else(|| self.directory.default_url().to_string())
    }

    /// Knoten fuer das Profil einer neuen Anmeldung.
    /// Ein leerer Organisationsschluessel liefert `None`: die Auswahl bleibt.
    pub fn endpoint_fuer(&self, profile: &Profile) -> Option<String> {
        if profile.org_key.is_empty() {
            return None;
        }
        let url = self.directory.resolve_endpoint(profile.org_key.as_str());
        tracing::info!(
            organisation = %profile.org_key,
            endpoint = %url,
            "Knoten fuer Organisation gewaehlt"
        );
        Some(url.to_string())
    }
}

impl std::fmt::Debug for NodeRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeRouter")
            .field("directory", &self.directory)
            .finish_non_exhaustive()
    }
}
