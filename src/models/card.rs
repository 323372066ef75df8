// ============================================================================
// Structure : CoinCard
// ============================================================================
// Vue-modèle d'une pièce : tous les champs calculés dont le rendu a besoin,
// dérivés une seule fois par frame. Les fonctions de rendu ne consomment que
// des CoinCard, jamais les données brutes.
//
// CONCEPT : Découplage dérivation / affichage
// - La projection (formatage, favori, tendance) vit ici
// - L'attachement aux widgets vit dans ui/
// ============================================================================

use std::collections::HashSet;

use crate::models::coin::CoinMarket;
use crate::models::sparkline::{normalize_series, trend_glyphs};

/// Largeur (en caractères) de l'indicateur de tendance inline
pub const TREND_WIDTH: usize = 12;

/// Une ligne de la liste, prête à afficher
#[derive(Debug, Clone)]
pub struct CoinCard {
    /// Identifiant de la pièce (pour retrouver le snapshot source)
    pub id: String,

    /// Nom affichable
    pub name: String,

    /// Symbole en majuscules
    pub symbol: String,

    /// Prix formaté ("$43,251.20")
    pub price_text: String,

    /// Variation 24h formatée ("▲ 2.50%")
    pub change_text: String,

    /// true si la variation 24h est positive (pilote la couleur)
    pub is_positive: bool,

    /// true si la pièce est dans les favoris (pilote l'étoile)
    pub is_favorite: bool,

    /// Points normalisés de la série 7 jours (vide si série dégénérée)
    pub sparkline: Vec<(f64, f64)>,

    /// Tendance inline en glyphes Unicode (chaîne vide si série dégénérée)
    pub trend: String,
}

impl CoinCard {
    /// Projette une pièce du snapshot en carte affichable
    pub fn from_coin(coin: &CoinMarket, favorites: &HashSet<String>) -> Self {
        let sparkline = normalize_series(coin.prices_7d());
        let trend = trend_glyphs(&sparkline, TREND_WIDTH);

        Self {
            id: coin.id.clone(),
            name: coin.name.clone(),
            symbol: coin.symbol_upper(),
            price_text: coin.price_text(),
            change_text: coin.change_text(),
            is_positive: coin.is_positive(),
            is_favorite: favorites.contains(&coin.id),
            sparkline,
            trend,
        }
    }

    /// Indicateur de favori ("★" plein si favori, "☆" sinon)
    pub fn star(&self) -> &'static str {
        if self.is_favorite {
            "★"
        } else {
            "☆"
        }
    }
}

/// Projette une vue du snapshot (filtrée ou non) en liste de cartes
///
/// L'ordre d'entrée est préservé : les vues dérivent toujours de l'ordre du
/// snapshot, jamais de l'ordre d'insertion dans les favoris.
pub fn build_cards(coins: &[&CoinMarket], favorites: &HashSet<String>) -> Vec<CoinCard> {
    coins
        .iter()
        .map(|coin| CoinCard::from_coin(coin, favorites))
        .collect()
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn coin(id: &str, name: &str, symbol: &str, change: f64) -> CoinMarket {
        let mut coin = CoinMarket::new(id, name, symbol);
        coin.price_change_percentage_24h = Some(change);
        coin.current_price = Some(100.0);
        coin.sparkline_in_7d.price = vec![1.0, 2.0, 3.0];
        coin
    }

    #[test]
    fn test_card_projection() {
        let btc = coin("bitcoin", "Bitcoin", "btc", 2.5);
        let favorites = HashSet::from(["bitcoin".to_string()]);

        let card = CoinCard::from_coin(&btc, &favorites);
        assert_eq!(card.symbol, "BTC");
        assert!(card.is_positive);
        assert!(card.is_favorite);
        assert_eq!(card.star(), "★");
        assert_eq!(card.sparkline.len(), 3);
        assert_eq!(card.trend.chars().count(), TREND_WIDTH);
    }

    #[test]
    fn test_card_not_favorite() {
        let eth = coin("ethereum", "Ethereum", "eth", -1.1);
        let card = CoinCard::from_coin(&eth, &HashSet::new());
        assert!(!card.is_favorite);
        assert!(!card.is_positive);
        assert_eq!(card.star(), "☆");
    }

    #[test]
    fn test_card_degenerate_series() {
        // Série vide : indicateur blanc, pas de panic
        let mut flat = CoinMarket::new("stable", "Stable", "stb");
        flat.sparkline_in_7d.price.clear();
        let card = CoinCard::from_coin(&flat, &HashSet::new());
        assert!(card.sparkline.is_empty());
        assert!(card.trend.is_empty());
    }

    #[test]
    fn test_build_cards_preserves_order() {
        let btc = coin("bitcoin", "Bitcoin", "btc", 2.5);
        let eth = coin("ethereum", "Ethereum", "eth", -1.1);
        let favorites = HashSet::from(["ethereum".to_string()]);

        let cards = build_cards(&[&btc, &eth], &favorites);
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].id, "bitcoin");
        assert!(!cards[0].is_favorite);
        assert_eq!(cards[1].id, "ethereum");
        assert!(cards[1].is_favorite);
    }
}
