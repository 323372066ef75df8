// ============================================================================
// Structure : CoinMarket
// ============================================================================
// Représente une cryptomonnaie telle que retournée par l'endpoint
// /coins/markets de CoinGecko (un snapshot à l'instant du fetch).
//
// CONCEPTS RUST :
// 1. Option<f64> : l'API peut retourner null ou omettre un champ numérique
// 2. #[serde(default)] : un champ absent devient None / vide au lieu d'une
//    erreur de désérialisation
// 3. Accesseurs : l'affichage ne manipule jamais les Option directement
// ============================================================================

use serde::{Deserialize, Serialize};

/// Série de prix des 7 derniers jours, incluse dans la réponse markets
///
/// Les prix sont positionnels (intervalle fixe, pas de timestamps attachés).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SparklineIn7d {
    #[serde(default)]
    pub price: Vec<f64>,
}

/// Une cryptomonnaie dans le snapshot de marché
///
/// Tous les champs numériques sont optionnels : CoinGecko renvoie parfois
/// null (nouvelle pièce, supply inconnue, etc.). Un champ manquant s'affiche
/// comme zéro, jamais comme une erreur.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoinMarket {
    /// Identifiant unique (ex: "bitcoin"), stable d'un snapshot à l'autre
    pub id: String,

    /// Symbole en minuscules (ex: "btc")
    pub symbol: String,

    /// Nom affichable (ex: "Bitcoin")
    pub name: String,

    /// URL du logo de la pièce
    #[serde(default)]
    pub image: String,

    /// Prix courant en USD
    #[serde(default)]
    pub current_price: Option<f64>,

    /// Variation sur 24h en pourcentage (signée)
    #[serde(default)]
    pub price_change_percentage_24h: Option<f64>,

    /// Capitalisation de marché en USD
    #[serde(default)]
    pub market_cap: Option<f64>,

    /// Volume échangé sur 24h en USD
    #[serde(default)]
    pub total_volume: Option<f64>,

    /// Nombre d'unités en circulation
    #[serde(default)]
    pub circulating_supply: Option<f64>,

    /// Plus haut sur 24h
    #[serde(default)]
    pub high_24h: Option<f64>,

    /// Plus bas sur 24h
    #[serde(default)]
    pub low_24h: Option<f64>,

    /// Série de prix des 7 derniers jours
    #[serde(default)]
    pub sparkline_in_7d: SparklineIn7d,
}

impl CoinMarket {
    /// Crée une pièce sans données de marché (utile pour les tests)
    pub fn new(id: &str, name: &str, symbol: &str) -> Self {
        Self {
            id: id.to_string(),
            symbol: symbol.to_string(),
            name: name.to_string(),
            image: String::new(),
            current_price: None,
            price_change_percentage_24h: None,
            market_cap: None,
            total_volume: None,
            circulating_supply: None,
            high_24h: None,
            low_24h: None,
            sparkline_in_7d: SparklineIn7d::default(),
        }
    }

    /// Variation 24h, zéro si absente
    pub fn change_24h(&self) -> f64 {
        self.price_change_percentage_24h.unwrap_or(0.0)
    }

    /// Retourne true si la pièce est en hausse sur 24h
    pub fn is_positive(&self) -> bool {
        self.change_24h() > 0.0
    }

    /// Série des 7 derniers jours (vide si absente)
    pub fn prices_7d(&self) -> &[f64] {
        &self.sparkline_in_7d.price
    }

    /// Prix formaté pour l'affichage : "$43,251.20"
    pub fn price_text(&self) -> String {
        format!("${}", format_price(self.current_price.unwrap_or(0.0)))
    }

    /// Variation formatée : "▲ 2.50%" ou "▼ 1.10%" (valeur absolue)
    pub fn change_text(&self) -> String {
        let change = self.change_24h();
        let arrow = if self.is_positive() { "▲" } else { "▼" };
        format!("{} {:.2}%", arrow, change.abs())
    }

    /// Symbole en majuscules pour l'affichage (ex: "BTC")
    pub fn symbol_upper(&self) -> String {
        self.symbol.to_uppercase()
    }
}

// ============================================================================
// Formatage des nombres
// ============================================================================
// Équivalents des formats "locale US" : séparateurs de milliers pour les
// grandes valeurs (market cap, volume), deux décimales pour les prix.
// ============================================================================

/// Groupe la partie entière par milliers : 1234567 → "1,234,567"
///
/// Une valeur nulle ou manquante s'affiche "0" (dégradation douce, pas
/// d'erreur de rendu pour un champ absent).
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }

    let negative = value < 0.0;
    let whole = value.abs().trunc() as u64;

    // Insère une virgule tous les 3 chiffres en partant de la droite
    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    if negative {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Formate un prix avec séparateurs de milliers et deux décimales
///
/// Exemples : 43251.2 → "43,251.20", 0.095 → "0.09", 0.0 → "0.00"
pub fn format_price(value: f64) -> String {
    let negative = value < 0.0;
    let abs = value.abs();
    let whole = abs.trunc() as u64;
    let cents = ((abs - abs.trunc()) * 100.0).round() as u64;

    // L'arrondi des centimes peut déborder (ex: 9.999 → 10.00)
    let (whole, cents) = if cents >= 100 { (whole + 1, 0) } else { (whole, cents) };

    let grouped = format_number(whole as f64);

    if negative {
        format!("-{}.{:02}", grouped, cents)
    } else {
        format!("{}.{:02}", grouped, cents)
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coin_without_market_data() {
        let coin = CoinMarket::new("bitcoin", "Bitcoin", "btc");
        assert_eq!(coin.change_24h(), 0.0);
        assert!(!coin.is_positive());
        assert!(coin.prices_7d().is_empty());
        assert_eq!(coin.price_text(), "$0.00");
    }

    #[test]
    fn test_change_text() {
        let mut coin = CoinMarket::new("bitcoin", "Bitcoin", "btc");
        coin.price_change_percentage_24h = Some(2.5);
        assert_eq!(coin.change_text(), "▲ 2.50%");

        coin.price_change_percentage_24h = Some(-1.1);
        assert_eq!(coin.change_text(), "▼ 1.10%");
    }

    #[test]
    fn test_symbol_upper() {
        let coin = CoinMarket::new("ethereum", "Ethereum", "eth");
        assert_eq!(coin.symbol_upper(), "ETH");
    }

    #[test]
    fn test_deserialize_sparse_record() {
        // Un enregistrement minimal (champs numériques absents) doit passer
        let json = r#"{"id":"newcoin","symbol":"new","name":"New Coin"}"#;
        let coin: CoinMarket = serde_json::from_str(json).unwrap();
        assert_eq!(coin.id, "newcoin");
        assert_eq!(coin.current_price, None);
        assert!(coin.prices_7d().is_empty());
    }

    #[test]
    fn test_deserialize_null_fields() {
        // CoinGecko renvoie parfois null explicitement
        let json = r#"{
            "id": "newcoin", "symbol": "new", "name": "New Coin",
            "current_price": null, "market_cap": null,
            "sparkline_in_7d": {"price": [1.0, 2.0]}
        }"#;
        let coin: CoinMarket = serde_json::from_str(json).unwrap();
        assert_eq!(coin.current_price, None);
        assert_eq!(coin.prices_7d(), &[1.0, 2.0]);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(999.0), "999");
        assert_eq!(format_number(1_234.0), "1,234");
        assert_eq!(format_number(1_234_567.9), "1,234,567");
        assert_eq!(format_number(-45_000.0), "-45,000");
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(43_251.2), "43,251.20");
        assert_eq!(format_price(0.095), "0.10");
        assert_eq!(format_price(0.0), "0.00");
        assert_eq!(format_price(9.999), "10.00");
    }
}
