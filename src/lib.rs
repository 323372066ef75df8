// ============================================================================
// LazyCoins - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests
// ============================================================================

pub mod api;     // Client CoinGecko
pub mod app;     // État de l'application
pub mod models;  // Structures de données
pub mod storage; // Persistance des préférences (favoris, thème)
pub mod store;   // Snapshot de marché en mémoire
pub mod ui;      // Interface utilisateur
