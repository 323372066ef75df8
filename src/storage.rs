// ============================================================================
// Structure : Storage
// ============================================================================
// Persistance locale des préférences : favoris et thème. Deux fichiers JSON
// dans le répertoire de données de la plateforme, relus au démarrage.
//
// CONCEPTS RUST :
// 1. PathBuf : chemins owned, construits via le crate dirs
// 2. Écritures synchrones : save_* retourne un Result, l'appelant décide
//    (ici : on log l'échec, les favoris restent utilisables en mémoire)
// 3. Lectures tolérantes : fichier absent ou corrompu → valeur par défaut
// ============================================================================

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::ui::theme::Theme;

/// Nom du fichier des favoris (tableau JSON d'identifiants)
const FAVORITES_FILE: &str = "favorites.json";

/// Nom du fichier du thème ("light" ou "dark")
const THEME_FILE: &str = "theme.json";

/// Adaptateur de persistance des préférences
///
/// Les fichiers vivent dans :
/// - Linux/WSL : ~/.local/share/lazycoins/
/// - macOS : ~/Library/Application Support/lazycoins/
/// - Windows : C:\Users\<user>\AppData\Local\lazycoins\
#[derive(Debug, Clone)]
pub struct Storage {
    dir: PathBuf,
}

impl Storage {
    /// Crée l'adaptateur sur le répertoire de données de la plateforme
    ///
    /// Si le répertoire de données est introuvable (environnement exotique),
    /// on retombe sur le répertoire courant.
    pub fn new() -> Self {
        let dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lazycoins");
        Self { dir }
    }

    /// Crée l'adaptateur sur un répertoire arbitraire (tests)
    pub fn with_dir(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Charge l'ensemble des favoris persistés
    ///
    /// Fichier absent, illisible ou corrompu → ensemble vide. La lecture ne
    /// fait jamais échouer le démarrage.
    pub fn load_favorites(&self) -> HashSet<String> {
        let path = self.dir.join(FAVORITES_FILE);

        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<HashSet<String>>(&contents) {
                Ok(favorites) => {
                    debug!(count = favorites.len(), "Favorites loaded");
                    favorites
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Favorites file is corrupt, starting empty");
                    HashSet::new()
                }
            },
            Err(_) => {
                // Première utilisation : pas encore de fichier
                debug!(path = %path.display(), "No favorites file, starting empty");
                HashSet::new()
            }
        }
    }

    /// Persiste l'ensemble des favoris
    pub fn save_favorites(&self, favorites: &HashSet<String>) -> Result<()> {
        // Tri avant sérialisation : fichier stable d'une sauvegarde à l'autre
        let mut sorted: Vec<&String> = favorites.iter().collect();
        sorted.sort();

        let contents = serde_json::to_string_pretty(&sorted)
            .context("Échec de la sérialisation des favoris")?;
        self.write_file(FAVORITES_FILE, &contents)
    }

    /// Charge le thème persisté (clair par défaut)
    pub fn load_theme(&self) -> Theme {
        let path = self.dir.join(THEME_FILE);

        match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "Theme file is corrupt, using light");
                Theme::default()
            }),
            Err(_) => Theme::default(),
        }
    }

    /// Persiste la préférence de thème
    pub fn save_theme(&self, theme: Theme) -> Result<()> {
        let contents =
            serde_json::to_string(&theme).context("Échec de la sérialisation du thème")?;
        self.write_file(THEME_FILE, &contents)
    }

    /// Écrit un fichier de préférences, en créant le répertoire au besoin
    fn write_file(&self, name: &str, contents: &str) -> Result<()> {
        fs::create_dir_all(&self.dir).with_context(|| {
            format!("Échec de la création du répertoire {}", self.dir.display())
        })?;

        let path = self.dir.join(name);
        fs::write(&path, contents)
            .with_context(|| format!("Échec de l'écriture de {}", path.display()))?;

        debug!(path = %path.display(), "Preferences written");
        Ok(())
    }
}

impl Default for Storage {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Répertoire temporaire unique par test (évite les collisions entre tests)
    fn temp_storage(tag: &str) -> Storage {
        let dir = std::env::temp_dir()
            .join("lazycoins-tests")
            .join(format!("{}-{}", tag, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        Storage::with_dir(dir)
    }

    #[test]
    fn test_missing_files_yield_defaults() {
        let storage = temp_storage("defaults");
        assert!(storage.load_favorites().is_empty());
        assert_eq!(storage.load_theme(), Theme::Light);
    }

    #[test]
    fn test_favorites_roundtrip() {
        let storage = temp_storage("favorites");

        let favorites = HashSet::from(["bitcoin".to_string(), "ethereum".to_string()]);
        storage.save_favorites(&favorites).unwrap();

        assert_eq!(storage.load_favorites(), favorites);
    }

    #[test]
    fn test_theme_roundtrip() {
        let storage = temp_storage("theme");

        storage.save_theme(Theme::Dark).unwrap();
        assert_eq!(storage.load_theme(), Theme::Dark);

        storage.save_theme(Theme::Light).unwrap();
        assert_eq!(storage.load_theme(), Theme::Light);
    }

    #[test]
    fn test_corrupt_favorites_file_starts_empty() {
        let storage = temp_storage("corrupt");
        storage.write_file(FAVORITES_FILE, "pas du json{{").unwrap();

        assert!(storage.load_favorites().is_empty());
    }

    #[test]
    fn test_corrupt_theme_file_uses_light() {
        let storage = temp_storage("corrupt-theme");
        storage.write_file(THEME_FILE, "\"solarized\"").unwrap();

        assert_eq!(storage.load_theme(), Theme::Light);
    }
}
