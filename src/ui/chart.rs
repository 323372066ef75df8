// ============================================================================
// Chart - Modale de graphique détaillé pour une pièce
// ============================================================================
// Affiche la série de prix 7 jours de la pièce sélectionnée dans une modale
// par-dessus le dashboard, avec un résumé de marché (cap, volume, offre,
// plus haut/bas 24h) sous le graphique.
//
// CONCEPTS RUST :
// 1. État préparé : ChartState est construit à l'ouverture, détruit à la
//    fermeture (ou avant l'ouverture d'une nouvelle série)
// 2. Closures et itérateurs pour transformer la série en points (x, y)
//
// CONCEPTS RATATUI :
// 1. Clear : efface la zone sous la modale
// 2. Chart / Dataset / Axis : graphique ligne avec axes configurés
// ============================================================================

use chrono::{Days, Local};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Clear, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::models::{format_number, format_price, CoinMarket};
use crate::ui::theme::Palette;

/// Nombre de jours couverts par la série sparkline de l'API
const SERIES_DAYS: usize = 7;

// ============================================================================
// Structure : ChartState
// ============================================================================
// Tout ce que la modale affiche, préparé une fois à l'ouverture. L'App le
// détient dans un Option : le remettre à None est l'opération de teardown
// (l'ancienne série est libérée avant d'en préparer une nouvelle).
// ============================================================================

/// État préparé de la modale de graphique
#[derive(Debug, Clone)]
pub struct ChartState {
    /// Nom affichable de la pièce
    pub name: String,

    /// Symbole en majuscules
    pub symbol: String,

    /// true si la variation 24h est positive (couleur de la courbe)
    pub is_positive: bool,

    /// Prix courant formaté
    pub price_text: String,

    /// Variation 24h formatée
    pub change_text: String,

    /// Série brute des 7 derniers jours
    pub series: Vec<f64>,

    /// Un label de date par jour, du plus ancien au plus récent
    pub labels: Vec<String>,

    /// Lignes du résumé de marché : (libellé, valeur formatée)
    pub summary: Vec<(&'static str, String)>,
}

impl ChartState {
    /// Prépare l'état de la modale pour une pièce du snapshot
    pub fn for_coin(coin: &CoinMarket) -> Self {
        let symbol = coin.symbol_upper();

        let summary = vec![
            ("Market cap", format!("${}", format_number(coin.market_cap.unwrap_or(0.0)))),
            ("Volume 24h", format!("${}", format_number(coin.total_volume.unwrap_or(0.0)))),
            (
                "Offre en circulation",
                format!(
                    "{} {}",
                    format_number(coin.circulating_supply.unwrap_or(0.0)),
                    symbol
                ),
            ),
            ("Plus haut 24h", format!("${}", format_price(coin.high_24h.unwrap_or(0.0)))),
            ("Plus bas 24h", format!("${}", format_price(coin.low_24h.unwrap_or(0.0)))),
        ];

        Self {
            name: coin.name.clone(),
            symbol,
            is_positive: coin.is_positive(),
            price_text: coin.price_text(),
            change_text: coin.change_text(),
            series: coin.prices_7d().to_vec(),
            labels: date_labels(SERIES_DAYS),
            summary,
        }
    }
}

/// Labels de dates des `days` derniers jours, du plus ancien au plus récent
///
/// Format court "Aug 1" comme sur l'axe d'un graphique financier classique.
fn date_labels(days: usize) -> Vec<String> {
    let today = Local::now().date_naive();

    (0..days)
        .rev()
        .map(|back| {
            let date = today
                .checked_sub_days(Days::new(back as u64))
                .unwrap_or(today);
            date.format("%b %-d").to_string()
        })
        .collect()
}

// ============================================================================
// Géométrie de la modale
// ============================================================================

/// Zone de la modale : rectangle centré couvrant 80% de l'écran
///
/// Partagée entre le rendu et le hit-test souris : un clic HORS de cette
/// zone (le backdrop) ferme la modale, un clic dedans est ignoré.
pub fn modal_area(area: Rect) -> Rect {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(10),
            Constraint::Percentage(80),
            Constraint::Percentage(10),
        ])
        .split(area);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(10),
            Constraint::Percentage(80),
            Constraint::Percentage(10),
        ])
        .split(rows[1]);

    cols[1]
}

/// true si la cellule (column, row) est dans le rectangle
pub fn hit_test(area: Rect, column: u16, row: u16) -> bool {
    column >= area.x
        && column < area.x + area.width
        && row >= area.y
        && row < area.y + area.height
}

// ============================================================================
// Rendu de la modale
// ============================================================================

/// Dessine la modale de graphique par-dessus le dashboard
pub fn render_chart_modal(frame: &mut Frame, state: &ChartState, palette: &Palette) {
    let area = modal_area(frame.size());

    // Efface ce qui se trouve sous la modale
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.border))
        .title(format!(" 📈 {} ({}) - 7 jours ", state.name, state.symbol));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),                            // Prix + raccourcis
            Constraint::Min(5),                               // Graphique
            Constraint::Length(state.summary.len() as u16 + 1), // Résumé de marché
        ])
        .split(inner);

    render_modal_header(frame, state, palette, chunks[0]);
    render_price_graph(frame, state, palette, chunks[1]);
    render_market_summary(frame, state, palette, chunks[2]);
}

/// Ligne d'entête : prix, variation et raccourcis de fermeture
fn render_modal_header(frame: &mut Frame, state: &ChartState, palette: &Palette, area: Rect) {
    let trend = palette.trend(state.is_positive);

    let text = vec![Line::from(vec![
        Span::styled(
            state.price_text.clone(),
            Style::default().fg(trend).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(state.change_text.clone(), Style::default().fg(trend)),
        Span::raw("   "),
        Span::styled("[x]", Style::default().fg(palette.accent).add_modifier(Modifier::BOLD)),
        Span::styled(" Fermer  ", Style::default().fg(palette.dim)),
        Span::styled("[ESC]", Style::default().fg(palette.accent).add_modifier(Modifier::BOLD)),
        Span::styled(" Retour", Style::default().fg(palette.dim)),
    ])];

    let paragraph = Paragraph::new(text).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

/// Le graphique ligne de la série 7 jours
fn render_price_graph(frame: &mut Frame, state: &ChartState, palette: &Palette, area: Rect) {
    // Série absente ou inexploitable : message à la place du graphique
    if state.series.len() < 2 {
        let text = vec![
            Line::from(""),
            Line::from(Span::styled(
                format!("Pas de données de prix pour {}", state.name),
                Style::default().fg(palette.dim),
            )),
        ];
        let paragraph = Paragraph::new(text).alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
        return;
    }

    // Convertit la série en points (x, y) pour le Dataset
    let points: Vec<(f64, f64)> = state
        .series
        .iter()
        .enumerate()
        .map(|(i, &price)| (i as f64, price))
        .collect();

    // Bornes verticales avec une marge de 5% pour que la courbe respire
    let (min_price, max_price) = points.iter().fold(
        (f64::MAX, f64::MIN),
        |(min, max), &(_x, y)| (min.min(y), max.max(y)),
    );
    let margin = (max_price - min_price) * 0.05;
    let y_min = (min_price - margin).max(0.0);
    let y_max = max_price + margin;

    let trend = palette.trend(state.is_positive);

    let datasets = vec![Dataset::default()
        .name(state.symbol.as_str())
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(trend))
        .data(&points)];

    // Un label de date par jour, du plus ancien au plus récent
    let x_labels: Vec<Span> = state
        .labels
        .iter()
        .map(|label| Span::styled(label.clone(), Style::default().fg(palette.text)))
        .collect();

    let x_axis = Axis::default()
        .style(Style::default().fg(palette.grid))
        .bounds([0.0, (points.len() - 1) as f64])
        .labels(x_labels);

    let y_axis = Axis::default()
        .style(Style::default().fg(palette.grid))
        .bounds([y_min, y_max])
        .labels(vec![
            Span::styled(format!("${}", format_price(y_min)), Style::default().fg(palette.text)),
            Span::styled(
                format!("${}", format_price((y_min + y_max) / 2.0)),
                Style::default().fg(palette.text),
            ),
            Span::styled(format!("${}", format_price(y_max)), Style::default().fg(palette.text)),
        ]);

    let chart = Chart::new(datasets).x_axis(x_axis).y_axis(y_axis);
    frame.render_widget(chart, area);
}

/// Le résumé de marché sous le graphique
fn render_market_summary(frame: &mut Frame, state: &ChartState, palette: &Palette, area: Rect) {
    let mut lines = vec![Line::from("")];

    for (label, value) in &state.summary {
        lines.push(Line::from(vec![
            Span::styled(format!("{:<22}", format!("{} :", label)), Style::default().fg(palette.dim)),
            Span::styled(value.clone(), Style::default().fg(palette.text)),
        ]));
    }

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_coin() -> CoinMarket {
        let mut coin = CoinMarket::new("bitcoin", "Bitcoin", "btc");
        coin.current_price = Some(43_251.2);
        coin.price_change_percentage_24h = Some(2.5);
        coin.market_cap = Some(846_512_345_678.0);
        coin.total_volume = Some(23_456_789_012.0);
        coin.circulating_supply = Some(19_600_000.0);
        coin.high_24h = Some(43_900.5);
        coin.low_24h = Some(42_100.1);
        coin.sparkline_in_7d.price = vec![42_000.0, 42_500.0, 43_251.2];
        coin
    }

    #[test]
    fn test_chart_state_for_coin() {
        let state = ChartState::for_coin(&sample_coin());
        assert_eq!(state.name, "Bitcoin");
        assert_eq!(state.symbol, "BTC");
        assert!(state.is_positive);
        assert_eq!(state.series.len(), 3);
        assert_eq!(state.labels.len(), SERIES_DAYS);
    }

    #[test]
    fn test_summary_fields() {
        let state = ChartState::for_coin(&sample_coin());
        let labels: Vec<&str> = state.summary.iter().map(|(l, _)| *l).collect();
        assert_eq!(
            labels,
            vec![
                "Market cap",
                "Volume 24h",
                "Offre en circulation",
                "Plus haut 24h",
                "Plus bas 24h"
            ]
        );

        // Valeurs formatées avec séparateurs, symbole sur l'offre
        assert_eq!(state.summary[0].1, "$846,512,345,678");
        assert_eq!(state.summary[2].1, "19,600,000 BTC");
        assert_eq!(state.summary[3].1, "$43,900.50");
    }

    #[test]
    fn test_summary_missing_fields_render_as_zero() {
        // Pièce sans données de marché : zéros, pas d'erreur
        let state = ChartState::for_coin(&CoinMarket::new("newcoin", "New Coin", "new"));
        assert_eq!(state.summary[0].1, "$0");
        assert_eq!(state.summary[3].1, "$0.00");
    }

    #[test]
    fn test_date_labels_count_and_order() {
        let labels = date_labels(7);
        assert_eq!(labels.len(), 7);

        // Le dernier label est aujourd'hui
        let today = Local::now().date_naive().format("%b %-d").to_string();
        assert_eq!(labels.last().unwrap(), &today);

        // Tous les labels sont distincts (7 jours consécutifs)
        let unique: std::collections::HashSet<&String> = labels.iter().collect();
        assert_eq!(unique.len(), 7);
    }

    #[test]
    fn test_modal_area_is_centered() {
        let screen = Rect::new(0, 0, 100, 50);
        let modal = modal_area(screen);

        // La modale est strictement à l'intérieur de l'écran
        assert!(modal.x > 0 && modal.y > 0);
        assert!(modal.x + modal.width < 100);
        assert!(modal.y + modal.height < 50);
    }

    #[test]
    fn test_hit_test_backdrop_vs_modal() {
        let screen = Rect::new(0, 0, 100, 50);
        let modal = modal_area(screen);

        // Un point au centre est dans la modale
        let center = (modal.x + modal.width / 2, modal.y + modal.height / 2);
        assert!(hit_test(modal, center.0, center.1));

        // Le coin de l'écran est sur le backdrop
        assert!(!hit_test(modal, 0, 0));
        assert!(!hit_test(modal, 99, 49));
    }
}
