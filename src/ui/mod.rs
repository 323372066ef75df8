// ============================================================================
// Module : ui
// ============================================================================
// Gère toute l'interface utilisateur (Terminal User Interface)
// ============================================================================

pub mod chart;     // Modale de graphique détaillé
pub mod dashboard; // Rendu de l'interface principale
pub mod events;    // Gestion des événements clavier et souris
pub mod theme;     // Palette centralisée clair / sombre

// Re-exports pour simplifier les imports
pub use dashboard::render;
pub use events::{Event, EventHandler};
pub use theme::{Palette, Theme};
