//! papervault-cli – Bibliotheks-Root
//!
//! Argumente, Befehle und deren Ausfuehrung. `main.rs` laedt nur
//! Konfiguration und Logging und ruft `ausfuehren` auf.

pub mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use papervault_client::{
    ClientError, ExamClient, FileSessionStore, LoggingPrompt, SessionStore,
};
use papervault_core::OrgKey;
use papervault_crypto::PaperDraft;

use config::CliConfig;

#[derive(Debug, Parser)]
#[command(name = "papervault", version, about = "Verschluesselte Pruefungs-Einreichung")]
pub struct Cli {
    /// Pfad zur Konfigurationsdatei
    #[arg(long, env = "PAPERVAULT_CONFIG", default_value = "papervault.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub befehl: Befehl,
}

#[derive(Debug, Subcommand)]
pub enum Befehl {
    /// Anmelden; das Passwort wird vor dem Senden verschluesselt
    Login {
        #[arg(short, long)]
        username: String,
        /// Ohne Angabe wird es von stdin gelesen
        #[arg(long, env = "PAPERVAULT_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Abmelden und lokale Sitzung loeschen
    Logout,
    /// Angemeldetes Profil und aktiven Knoten anzeigen
    Whoami,
    /// Knoten-URL fuer einen Organisationsschluessel
    Resolve { org_key: String },
    /// Pruefung verschluesselt einreichen
    Submit {
        #[arg(long)]
        course: String,
        #[arg(long)]
        exam_type: String,
        #[arg(long)]
        semester: String,
        /// Standard: Organisation des angemeldeten Profils
        #[arg(long)]
        department: Option<String>,
        /// Datei mit dem Inhalt der Pruefung
        #[arg(long)]
        content_file: PathBuf,
        /// Pfad eines bereits hochgeladenen Anhangs
        #[arg(long)]
        file_path: Option<String>,
        /// Signaturschluessel, wird unveraendert mitgesendet
        #[arg(long)]
        private_key_file: Option<PathBuf>,
    },
    /// Oeffentlichen Schluessel des Netzwerks abrufen und anzeigen
    PublicKey,
}

/// Wandelt Client-Fehler in die Meldung fuer den Benutzer
fn meldung(e: ClientError) -> anyhow::Error {
    anyhow::anyhow!(e.benutzer_meldung())
}

/// Fuehrt einen Befehl mit geladener Konfiguration aus
pub async fn ausfuehren(cli: Cli, config: CliConfig) -> Result<()> {
    let verzeichnis = config.verzeichnis().map_err(meldung)?;

    if let Befehl::Resolve { org_key } = &cli.befehl {
        println!("{}", verzeichnis.resolve_endpoint(org_key));
        return Ok(());
    }

    let bootstrap = config.bootstrap_url(&verzeichnis);
    let store: Arc<dyn SessionStore> =
        Arc::new(FileSessionStore::oeffnen(&config.sitzung.datei).map_err(meldung)?);
    let prompt = Arc::new(LoggingPrompt::neu());
    let client = ExamClient::mit_reqwest(
        verzeichnis,
        store,
        prompt.clone(),
        &bootstrap,
        config.frist(),
    )
    .map_err(meldung)?;

    match cli.befehl {
        Befehl::Login { username, password } => {
            let password = match password {
                Some(p) => p,
                None => passwort_lesen()?,
            };
            prompt.login_aktiv_setzen(true);
            let profil = client.login(&username, &password).await.map_err(meldung)?;
            println!(
                "Angemeldet als {} ({}, {}) -> {}",
                profil.username,
                profil.role,
                profil.org_key,
                client.router().active_endpoint()
            );
        }
        Befehl::Logout => {
            client.logout().await.map_err(meldung)?;
            println!("Abgemeldet");
        }
        Befehl::Whoami => match client.profile() {
            Some(p) => println!(
                "{} ({}) Rolle: {} Organisation: {} Knoten: {}",
                p.username,
                p.real_name,
                p.role,
                p.org_key,
                client.router().active_endpoint()
            ),
            None => println!("Nicht angemeldet (Knoten: {})", client.router().active_endpoint()),
        },
        Befehl::Submit {
            course,
            exam_type,
            semester,
            department,
            content_file,
            file_path,
            private_key_file,
        } => {
            let content = std::fs::read_to_string(&content_file)
                .with_context(|| format!("Inhalt '{}' nicht lesbar", content_file.display()))?;
            let private_key = private_key_file
                .map(|p| {
                    std::fs::read_to_string(&p)
                        .with_context(|| format!("Schluesseldatei '{}' nicht lesbar", p.display()))
                })
                .transpose()?;
            let department = department
                .map(OrgKey::neu)
                .or_else(|| client.profile().map(|p| p.org_key))
                .unwrap_or_default();

            let draft = PaperDraft {
                course_name: course,
                exam_type,
                semester,
                department,
                content,
                file_path,
            };
            let antwort = client
                .create_paper(&draft, private_key.as_deref().map(str::trim))
                .await
                .map_err(meldung)?;
            match antwort.data {
                Some(data) => println!("{data}"),
                None => println!("{}", antwort.message),
            }
        }
        Befehl::PublicKey => {
            let material = client.public_key().await.map_err(meldung)?;
            println!("Fingerprint: {}", material.fingerprint());
            println!("Max. Feldlaenge: {} Bytes", material.max_klartext_laenge());
            print!("{}", material.pem());
        }
        Befehl::Resolve { .. } => {}
    }

    Ok(())
}

fn passwort_lesen() -> Result<String> {
    eprint!("Passwort: ");
    let mut zeile = String::new();
    std::io::stdin()
        .read_line(&mut zeile)
        .context("Passwort konnte nicht gelesen werden")?;
    Ok(zeile.trim_end_matches(['\r', '\n']).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argumente_parsen() {
        let cli = Cli::try_parse_from([
            "papervault",
            "--config",
            "x.toml",
            "submit",
            "--course",
            "Analysis",
            "--exam-type",
            "final",
            "--semester",
            "2025-WS",
            "--content-file",
            "pruefung.txt",
        ])
        .unwrap();
        assert_eq!(cli.config, PathBuf::from("x.toml"));
        match cli.befehl {
            Befehl::Submit {
                course, department, ..
            } => {
                assert_eq!(course, "Analysis");
                assert!(department.is_none());
            }
            other => panic!("falscher Befehl: {other:?}"),
        }
    }

    #[test]
    fn login_braucht_benutzer() {
        assert!(Cli::try_parse_from(["papervault", "login"]).is_err());
        assert!(Cli::try_parse_from(["papervault", "login", "-u", "lehrer01"]).is_ok());
    }

    #[tokio::test]
    async fn resolve_ohne_netzwerk() {
        let cli = Cli::try_parse_from(["papervault", "resolve", "unbekannt"]).unwrap();
        ausfuehren(cli, CliConfig::default()).await.unwrap();
    }

    #[tokio::test]
    async fn whoami_ohne_sitzung() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = CliConfig::default();
        config.sitzung.datei = dir.path().join("s.json").display().to_string();

        let cli = Cli::try_parse_from(["papervault", "whoami"]).unwrap();
        ausfuehren(cli, config).await.unwrap();
    }
}
