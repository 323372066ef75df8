// ============================================================================
// Module : api
// ============================================================================
// Client HTTP vers la source de données de marché
// ============================================================================

pub mod coingecko; // API CoinGecko (endpoint /coins/markets)

pub use coingecko::fetch_markets;
