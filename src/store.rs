// ============================================================================
// Structure : MarketStore
// ============================================================================
// Détient le dernier snapshot de marché en mémoire et dérive les vues
// (filtrée par recherche, restreinte aux favoris).
//
// CONCEPTS RUST :
// 1. Encapsulation : le snapshot est privé, tout passe par les méthodes
// 2. Vues empruntées : filter() et select_by_ids() retournent des Vec<&T>,
//    aucune copie des pièces
// 3. Swap atomique : replace() remplace tout le snapshot d'un coup, jamais
//    de mise à jour partielle
// ============================================================================

use std::collections::HashSet;

use crate::models::CoinMarket;

/// Le snapshot de marché courant et ses vues dérivées
///
/// Invariant : deux pièces d'un même snapshot n'ont jamais le même id
/// (garanti par l'API, un id ne peut apparaître qu'une fois par page).
#[derive(Debug, Default)]
pub struct MarketStore {
    coins: Vec<CoinMarket>,
}

impl MarketStore {
    /// Crée un store vide (aucun fetch encore effectué)
    pub fn new() -> Self {
        Self { coins: Vec::new() }
    }

    /// Remplace le snapshot entier par un nouveau
    ///
    /// L'ancien snapshot est jeté, le nouveau le remplace d'un seul move.
    pub fn replace(&mut self, coins: Vec<CoinMarket>) {
        self.coins = coins;
    }

    /// Toutes les pièces du snapshot, dans l'ordre de l'API
    pub fn coins(&self) -> &[CoinMarket] {
        &self.coins
    }

    /// Retrouve une pièce par son identifiant
    pub fn get(&self, id: &str) -> Option<&CoinMarket> {
        self.coins.iter().find(|coin| coin.id == id)
    }

    /// Filtre par sous-chaîne (insensible à la casse) sur le nom ou le symbole
    ///
    /// Une requête vide retourne le snapshot entier. L'ordre du snapshot est
    /// préservé. Un résultat vide avec un snapshot non vide signifie "aucun
    /// résultat de recherche", à distinguer de "pas encore de données".
    pub fn filter(&self, query: &str) -> Vec<&CoinMarket> {
        let query = query.trim().to_lowercase();

        if query.is_empty() {
            return self.coins.iter().collect();
        }

        self.coins
            .iter()
            .filter(|coin| {
                coin.name.to_lowercase().contains(&query)
                    || coin.symbol.to_lowercase().contains(&query)
            })
            .collect()
    }

    /// Les pièces du snapshot dont l'id est dans l'ensemble donné
    ///
    /// L'ordre retourné est celui du snapshot (classement par market cap),
    /// pas l'ordre d'ajout aux favoris. Un id absent du snapshot (pièce
    /// sortie du top 100) est simplement ignoré.
    pub fn select_by_ids(&self, ids: &HashSet<String>) -> Vec<&CoinMarket> {
        self.coins
            .iter()
            .filter(|coin| ids.contains(&coin.id))
            .collect()
    }

    /// Nombre de pièces dans le snapshot
    pub fn len(&self) -> usize {
        self.coins.len()
    }

    /// true si aucun snapshot n'a encore été chargé (ou snapshot vide)
    pub fn is_empty(&self) -> bool {
        self.coins.is_empty()
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_store() -> MarketStore {
        let mut btc = CoinMarket::new("bitcoin", "Bitcoin", "btc");
        btc.price_change_percentage_24h = Some(2.5);
        let mut eth = CoinMarket::new("ethereum", "Ethereum", "eth");
        eth.price_change_percentage_24h = Some(-1.1);

        let mut store = MarketStore::new();
        store.replace(vec![btc, eth]);
        store
    }

    #[test]
    fn test_replace_swaps_whole_snapshot() {
        let mut store = sample_store();
        assert_eq!(store.len(), 2);

        store.replace(vec![CoinMarket::new("solana", "Solana", "sol")]);
        assert_eq!(store.len(), 1);
        assert!(store.get("bitcoin").is_none());
        assert!(store.get("solana").is_some());
    }

    #[test]
    fn test_filter_case_insensitive() {
        let store = sample_store();

        // Sur le nom
        let hits = store.filter("BIT");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "bitcoin");

        // Sur le symbole
        let hits = store.filter("eth");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "ethereum");
    }

    #[test]
    fn test_filter_empty_query_returns_everything() {
        let store = sample_store();
        assert_eq!(store.filter("").len(), 2);
        assert_eq!(store.filter("   ").len(), 2);
    }

    #[test]
    fn test_filter_no_match_is_distinct_from_empty_store() {
        let store = sample_store();

        // Aucun résultat, mais le snapshot existe
        let hits = store.filter("dogecoin");
        assert!(hits.is_empty());
        assert!(!store.is_empty());

        // Snapshot vide : l'autre état vide
        let empty = MarketStore::new();
        assert!(empty.filter("dogecoin").is_empty());
        assert!(empty.is_empty());
    }

    #[test]
    fn test_filter_preserves_snapshot_order() {
        let mut store = MarketStore::new();
        store.replace(vec![
            CoinMarket::new("bitcoin", "Bitcoin", "btc"),
            CoinMarket::new("bitcoin-cash", "Bitcoin Cash", "bch"),
            CoinMarket::new("ethereum", "Ethereum", "eth"),
        ]);

        let hits = store.filter("bit");
        let ids: Vec<&str> = hits.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["bitcoin", "bitcoin-cash"]);
    }

    #[test]
    fn test_select_by_ids_in_snapshot_order() {
        let mut store = MarketStore::new();
        store.replace(vec![
            CoinMarket::new("bitcoin", "Bitcoin", "btc"),
            CoinMarket::new("ethereum", "Ethereum", "eth"),
            CoinMarket::new("solana", "Solana", "sol"),
        ]);

        // Favoris ajoutés dans l'ordre inverse du classement
        let ids = HashSet::from(["solana".to_string(), "bitcoin".to_string()]);
        let selected = store.select_by_ids(&ids);

        // L'ordre reste celui du snapshot, pas celui de l'ajout
        let got: Vec<&str> = selected.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(got, vec!["bitcoin", "solana"]);
    }

    #[test]
    fn test_select_by_ids_ignores_unknown_ids() {
        let store = sample_store();

        // Un favori sorti du top 100 ne casse rien
        let ids = HashSet::from(["ethereum".to_string(), "vanished-coin".to_string()]);
        let selected = store.select_by_ids(&ids);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].id, "ethereum");
    }

    #[test]
    fn test_search_and_favorites_are_independent() {
        // Scénario : favori sur "eth", recherche "bit"
        let store = sample_store();
        let favorites = HashSet::from(["ethereum".to_string()]);

        let filtered = store.filter("bit");
        let names: Vec<&str> = filtered.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Bitcoin"]);

        let favs = store.select_by_ids(&favorites);
        let names: Vec<&str> = favs.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Ethereum"]);
    }
}
