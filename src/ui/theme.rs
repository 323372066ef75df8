// ============================================================================
// Theme - Palette centralisée clair / sombre
// ============================================================================
// Tout le code de rendu consulte cette table unique au lieu de choisir ses
// couleurs au cas par cas. Changer de thème revient à changer de Palette.
//
// CONCEPT RUST : Enum Copy à deux états
// - Theme est la préférence persistée (sérialisée "light" / "dark")
// - Palette est sa traduction en couleurs concrètes pour ratatui
// ============================================================================

use ratatui::style::Color;
use serde::{Deserialize, Serialize};

/// Préférence de thème, persistée entre les sessions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    /// Bascule clair ↔ sombre
    pub fn toggle(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Label affichable ("light" / "dark")
    pub fn label(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// La palette de couleurs associée à ce thème
    pub fn palette(self) -> Palette {
        match self {
            Theme::Light => Palette {
                text: Color::Rgb(30, 41, 59),
                dim: Color::DarkGray,
                grid: Color::Gray,
                border: Color::Cyan,
                accent: Color::Yellow,
                up: Color::Rgb(16, 185, 129),
                down: Color::Rgb(239, 68, 68),
            },
            Theme::Dark => Palette {
                text: Color::Rgb(248, 250, 252),
                dim: Color::Gray,
                grid: Color::DarkGray,
                border: Color::LightCyan,
                accent: Color::Yellow,
                up: Color::Rgb(16, 185, 129),
                down: Color::Rgb(239, 68, 68),
            },
        }
    }
}

impl Default for Theme {
    /// Le thème clair est le défaut (première utilisation, préférence absente)
    fn default() -> Self {
        Theme::Light
    }
}

/// Couleurs concrètes d'un thème
///
/// - text / dim : texte principal et secondaire
/// - grid : axes et grilles du graphique
/// - border : bordures des blocs
/// - accent : raccourcis clavier, étoiles de favoris
/// - up / down : tendance 24h positive / négative
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub text: Color,
    pub dim: Color,
    pub grid: Color,
    pub border: Color,
    pub accent: Color,
    pub up: Color,
    pub down: Color,
}

impl Palette {
    /// Couleur de tendance selon le signe de la variation 24h
    pub fn trend(&self, is_positive: bool) -> Color {
        if is_positive {
            self.up
        } else {
            self.down
        }
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_roundtrip() {
        assert_eq!(Theme::Light.toggle(), Theme::Dark);
        assert_eq!(Theme::Dark.toggle(), Theme::Light);
        assert_eq!(Theme::Light.toggle().toggle(), Theme::Light);
    }

    #[test]
    fn test_serialized_form() {
        // La forme persistée est la chaîne en minuscules ("light" / "dark")
        assert_eq!(serde_json::to_string(&Theme::Dark).unwrap(), "\"dark\"");
        let theme: Theme = serde_json::from_str("\"light\"").unwrap();
        assert_eq!(theme, Theme::Light);
    }

    #[test]
    fn test_palettes_differ_on_text_and_grid() {
        let light = Theme::Light.palette();
        let dark = Theme::Dark.palette();
        assert_ne!(light.text, dark.text);
        assert_ne!(light.grid, dark.grid);

        // Les couleurs de tendance sont les mêmes dans les deux thèmes
        assert_eq!(light.up, dark.up);
        assert_eq!(light.down, dark.down);
    }

    #[test]
    fn test_trend_color() {
        let palette = Theme::Light.palette();
        assert_eq!(palette.trend(true), palette.up);
        assert_eq!(palette.trend(false), palette.down);
    }
}
