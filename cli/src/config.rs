//! CLI-Konfiguration
//!
//! Wird beim Start aus einer TOML-Datei geladen. Alle Felder haben
//! Standardwerte, die Kommandozeile laeuft also auch ohne Datei.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use papervault_client::{ClientResult, NodeDirectory, DEFAULT_SCHLUESSEL};
use serde::{Deserialize, Serialize};

/// Vollstaendige CLI-Konfiguration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Organisationsschluessel -> Basis-URL des Knotens, `default` ist Pflicht
    pub knoten: BTreeMap<String, String>,
    pub netzwerk: NetzwerkEinstellungen,
    pub sitzung: SitzungEinstellungen,
    pub logging: LoggingEinstellungen,
}

impl Default for CliConfig {
    fn default() -> Self {
        let knoten = [
            ("Informatik", "http://localhost:58080/api"),
            ("Softwaretechnik", "http://localhost:58082/api"),
            ("Informationswissenschaften", "http://localhost:58083/api"),
            (DEFAULT_SCHLUESSEL, "http://localhost:58080/api"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            knoten,
            netzwerk: NetzwerkEinstellungen::default(),
            sitzung: SitzungEinstellungen::default(),
            logging: LoggingEinstellungen::default(),
        }
    }
}

/// Netzwerk-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetzwerkEinstellungen {
    /// Vertrauenswuerdiger Knoten fuer den oeffentlichen Schluessel
    /// (leer = `default`-Knoten)
    pub bootstrap_url: Option<String>,
    /// Frist pro Anfrage in Sekunden
    pub timeout_sekunden: u64,
}

impl Default for NetzwerkEinstellungen {
    fn default() -> Self {
        Self {
            bootstrap_url: None,
            timeout_sekunden: 30,
        }
    }
}

/// Sitzungs-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SitzungEinstellungen {
    /// Datei fuer Token, Profil und Knotenwahl
    pub datei: String,
}

impl Default for SitzungEinstellungen {
    fn default() -> Self {
        Self {
            datei: "papervault-sitzung.json".into(),
        }
    }
}

/// Logging-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    /// Log-Level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Format: "json" oder "text"
    pub format: String,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "warn".into(),
            format: "text".into(),
        }
    }
}

impl CliConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei.
    /// Gibt die Standardkonfiguration zurueck wenn die Datei nicht existiert.
    pub fn laden(pfad: impl AsRef<Path>) -> anyhow::Result<Self> {
        let pfad = pfad.as_ref();
        match std::fs::read_to_string(pfad) {
            Ok(inhalt) => toml::from_str(&inhalt).map_err(|e| {
                anyhow::anyhow!("Konfigurationsfehler in '{}': {e}", pfad.display())
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(anyhow::anyhow!(
                "Konfigurationsdatei '{}' nicht lesbar: {e}",
                pfad.display()
            )),
        }
    }

    /// Knotentabelle; ohne `default` ein Konfigurationsfehler
    pub fn verzeichnis(&self) -> ClientResult<NodeDirectory> {
        NodeDirectory::from_map(self.knoten.clone())
    }

    /// Bootstrap-URL; ohne Angabe der `default`-Knoten
    pub fn bootstrap_url(&self, verzeichnis: &NodeDirectory) -> String {
        self.netzwerk
            .bootstrap_url
            .clone()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| verzeichnis.default_url().to_string())
    }

    pub fn frist(&self) -> Duration {
        Duration::from_secs(self.netzwerk.timeout_sekunden.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_config_ist_valide() {
        let cfg = CliConfig::default();
        let dir = cfg.verzeichnis().unwrap();
        assert_eq!(dir.default_url(), "http://localhost:58080/api");
        assert_eq!(dir.resolve_endpoint("Softwaretechnik"), "http://localhost:58082/api");
        assert_eq!(cfg.frist(), Duration::from_secs(30));
        assert_eq!(cfg.bootstrap_url(&dir), "http://localhost:58080/api");
    }

    #[test]
    fn config_aus_toml_string() {
        let toml = r#"
            [knoten]
            default = "https://zentrale.example/api"
            dept-A = "https://a.example/api"

            [netzwerk]
            bootstrap_url = "https://zentrale.example/api"
            timeout_sekunden = 5
        "#;
        let cfg: CliConfig = toml::from_str(toml).unwrap();
        let dir = cfg.verzeichnis().unwrap();
        assert_eq!(dir.resolve_endpoint("dept-A"), "https://a.example/api");
        assert_eq!(dir.resolve_endpoint("dept-Z"), "https://zentrale.example/api");
        assert_eq!(cfg.frist(), Duration::from_secs(5));
        // Nicht angegebene Abschnitte behalten Standardwerte
        assert_eq!(cfg.logging.format, "text");
        assert_eq!(cfg.sitzung.datei, "papervault-sitzung.json");
    }

    #[test]
    fn knoten_ohne_default_wird_abgelehnt() {
        let cfg: CliConfig = toml::from_str("[knoten]\ndept-A = \"http://a\"\n").unwrap();
        assert!(cfg.verzeichnis().is_err());
    }

    #[test]
    fn fehlende_datei_liefert_standard() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = CliConfig::laden(dir.path().join("gibt-es-nicht.toml")).unwrap();
        assert_eq!(cfg.netzwerk.timeout_sekunden, 30);
    }

    #[test]
    fn kaputte_datei_ist_fehler() {
        let dir = tempfile::tempdir().unwrap();
        let pfad = dir.path().join("papervault.toml");
        std::fs::write(&pfad, "[netzwerk\n").unwrap();
        assert!(CliConfig::laden(&pfad).is_err());
    }
}
