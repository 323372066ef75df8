// ============================================================================
// Dashboard - Rendu de l'interface principale
// ============================================================================
// Dessine la liste des pièces, le panneau de favoris, l'entête et le footer
// en utilisant les widgets de ratatui. Toutes les couleurs viennent de la
// Palette du thème courant, jamais de constantes locales.
//
// CONCEPTS RATATUI :
// 1. Frame : surface de dessin
// 2. Layout : découpage de l'espace en zones
// 3. List / Paragraph : widgets de base
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::app::{App, Screen};
use crate::models::{build_cards, CoinCard};
use crate::ui::chart;
use crate::ui::theme::Palette;

// ============================================================================
// Fonction principale de rendu
// ============================================================================

/// Dessine l'interface complète
///
/// CONCEPT RUST : Routing avec match sur enum
/// - Le dashboard est toujours dessiné ; la modale de graphique vient
///   par-dessus quand l'écran courant est ChartView
pub fn render(frame: &mut Frame, app: &App) {
    let palette = app.theme.palette();

    render_dashboard(frame, app, &palette);

    if app.current_screen == Screen::ChartView {
        if let Some(state) = &app.chart {
            chart::render_chart_modal(frame, state, &palette);
        }
    }
}

/// Dessine le dashboard (entête, listes, footer)
fn render_dashboard(frame: &mut Frame, app: &App, palette: &Palette) {
    let size = frame.size();
    let chunks = create_layout(size);

    render_header(frame, app, palette, chunks[0]);

    // Contenu principal : liste des pièces à gauche, favoris à droite
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(68), Constraint::Percentage(32)])
        .split(chunks[1]);

    render_coin_list(frame, app, palette, columns[0]);
    render_favorites_panel(frame, app, palette, columns[1]);

    if app.is_in_search() {
        render_search_footer(frame, app, palette, chunks[2]);
    } else {
        render_footer(frame, palette, chunks[2]);
    }
}

/// Crée le layout principal (header, content, footer)
fn create_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header : 3 lignes
            Constraint::Min(0),    // Content : tout le reste
            Constraint::Length(3), // Footer : 3 lignes
        ])
        .split(area)
        .to_vec()
}

// ============================================================================
// Header : titre et état du rafraîchissement
// ============================================================================

/// Dessine le header avec le titre et le badge d'état
fn render_header(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.border))
        .title(" 🪙 LazyCoins ")
        .title_alignment(Alignment::Center);

    // Badge : rafraîchissement en cours, recherche active, thème courant
    let mut spans = vec![Span::styled(
        "Top 100 par capitalisation (USD)",
        Style::default().fg(palette.text).add_modifier(Modifier::BOLD),
    )];

    if app.is_fetching() {
        spans.push(Span::styled(
            "  ⟳ rafraîchissement...",
            Style::default().fg(palette.accent),
        ));
    }

    let query = app.active_query();
    if !query.is_empty() {
        spans.push(Span::styled(
            format!("  filtre: {}", query),
            Style::default().fg(palette.dim),
        ));
    }

    spans.push(Span::styled(
        format!("  thème: {}", app.theme.label()),
        Style::default().fg(palette.dim),
    ));

    let paragraph = Paragraph::new(vec![Line::from(spans)])
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Liste principale
// ============================================================================

/// Dessine la liste des pièces (ou l'état vide / chargement / erreur)
///
/// Quatre états distincts, dans cet ordre de priorité :
/// 1. Échec du dernier fetch → message d'erreur à la place de la liste
/// 2. Premier chargement en cours → indicateur de chargement
/// 3. Snapshot vide → "aucune pièce"
/// 4. Filtre sans résultat → "aucun résultat", distinct du snapshot vide
fn render_coin_list(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.border))
        .title(" 📊 Marché ");

    if let Some(message) = app.fetch_error() {
        let text = vec![
            Line::from(""),
            Line::from(Span::styled(
                "Impossible de charger les données de marché.",
                Style::default().fg(palette.down),
            )),
            Line::from(Span::styled(message.to_string(), Style::default().fg(palette.dim))),
            Line::from(""),
            Line::from(Span::styled(
                "Nouvelle tentative au prochain rafraîchissement.",
                Style::default().fg(palette.dim),
            )),
        ];
        frame.render_widget(
            Paragraph::new(text).block(block).alignment(Alignment::Center),
            area,
        );
        return;
    }

    if app.store.is_empty() {
        let message = if app.is_fetching() {
            "Chargement des données de marché..."
        } else {
            "Aucune cryptomonnaie trouvée."
        };
        let text = vec![
            Line::from(""),
            Line::from(Span::styled(message, Style::default().fg(palette.dim))),
        ];
        frame.render_widget(
            Paragraph::new(text).block(block).alignment(Alignment::Center),
            area,
        );
        return;
    }

    let visible = app.visible_coins();
    let cards = build_cards(&visible, &app.favorites);

    if cards.is_empty() {
        // Snapshot présent mais filtre sans résultat : l'autre état vide
        let text = vec![
            Line::from(""),
            Line::from(Span::styled(
                format!("Aucun résultat pour « {} »", app.active_query()),
                Style::default().fg(palette.dim),
            )),
        ];
        frame.render_widget(
            Paragraph::new(text).block(block).alignment(Alignment::Center),
            area,
        );
        return;
    }

    let items: Vec<ListItem> = cards
        .iter()
        .enumerate()
        .map(|(index, card)| {
            let mut item = ListItem::new(card_row(card, palette));
            if index == app.selected_index {
                item = item.style(
                    Style::default()
                        .add_modifier(Modifier::BOLD)
                        .add_modifier(Modifier::REVERSED),
                );
            }
            item
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}

/// Construit la ligne affichée pour une carte
///
/// " ★ Bitcoin            BTC      $43,251.20  ▲ 2.50%  ▁▂▃▅▆█▇▆"
fn card_row<'a>(card: &'a CoinCard, palette: &Palette) -> Line<'a> {
    let trend_style = Style::default().fg(palette.trend(card.is_positive));

    let star_style = if card.is_favorite {
        Style::default().fg(palette.accent)
    } else {
        Style::default().fg(palette.dim)
    };

    Line::from(vec![
        Span::styled(format!(" {} ", card.star()), star_style),
        Span::styled(
            format!("{:<20}", truncate_name(&card.name, 19)),
            Style::default().fg(palette.text),
        ),
        Span::styled(format!("{:<6}", card.symbol), Style::default().fg(palette.dim)),
        Span::styled(format!("{:>14}", card.price_text), Style::default().fg(palette.text)),
        Span::raw("  "),
        Span::styled(format!("{:<9}", card.change_text), trend_style),
        Span::raw(" "),
        Span::styled(card.trend.clone(), trend_style),
    ])
}

/// Tronque un nom à `max` caractères avec une ellipse si nécessaire
fn truncate_name(name: &str, max: usize) -> String {
    if name.chars().count() <= max {
        name.to_string()
    } else {
        let truncated: String = name.chars().take(max - 1).collect();
        format!("{}…", truncated)
    }
}

// ============================================================================
// Panneau de favoris
// ============================================================================

/// Dessine le panneau des favoris (miroir de l'ensemble persisté)
///
/// Reconstruit à chaque frame depuis les favoris filtrés contre le snapshot
/// vivant, dans l'ordre du snapshot. Une étoile basculée dans la liste
/// principale apparaît donc ici au frame suivant, sans autre synchronisation.
fn render_favorites_panel(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.border))
        .title(" ⭐ Favoris ");

    if app.favorites.is_empty() {
        let text = vec![
            Line::from(""),
            Line::from(Span::styled(
                "Aucun favori pour l'instant",
                Style::default().fg(palette.dim),
            )),
        ];
        frame.render_widget(
            Paragraph::new(text).block(block).alignment(Alignment::Center),
            area,
        );
        return;
    }

    let favorites = app.favorite_coins();
    let cards = build_cards(&favorites, &app.favorites);

    if cards.is_empty() {
        // Des favoris existent mais aucun n'est dans le snapshot courant
        // (pièces sorties du top 100, ou premier fetch pas encore arrivé)
        let text = vec![
            Line::from(""),
            Line::from(Span::styled(
                "Favoris hors du top 100 actuel",
                Style::default().fg(palette.dim),
            )),
        ];
        frame.render_widget(
            Paragraph::new(text).block(block).alignment(Alignment::Center),
            area,
        );
        return;
    }

    let items: Vec<ListItem> = cards
        .iter()
        .map(|card| {
            let trend_style = Style::default().fg(palette.trend(card.is_positive));
            ListItem::new(Line::from(vec![
                Span::styled(" ★ ", Style::default().fg(palette.accent)),
                Span::styled(
                    format!("{:<12}", truncate_name(&card.name, 11)),
                    Style::default().fg(palette.text),
                ),
                Span::styled(format!("{:>12}", card.price_text), Style::default().fg(palette.text)),
                Span::raw(" "),
                Span::styled(card.change_text.clone(), trend_style),
            ]))
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}

// ============================================================================
// Footer : raccourcis ou saisie de recherche
// ============================================================================

/// Dessine le footer avec les raccourcis clavier
fn render_footer(frame: &mut Frame, palette: &Palette, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.border));

    let key_style = Style::default().fg(palette.accent).add_modifier(Modifier::BOLD);

    let shortcuts = Line::from(vec![
        Span::styled("[q]", key_style),
        Span::raw(" Quitter  "),
        Span::styled("[↑↓ / j k]", key_style),
        Span::raw(" Naviguer  "),
        Span::styled("[/]", key_style),
        Span::raw(" Rechercher  "),
        Span::styled("[f]", key_style),
        Span::raw(" Favori  "),
        Span::styled("[Enter / c]", key_style),
        Span::raw(" Graphique  "),
        Span::styled("[t]", key_style),
        Span::raw(" Thème  "),
        Span::styled("[r]", key_style),
        Span::raw(" Rafraîchir"),
    ]);

    let paragraph = Paragraph::new(vec![shortcuts])
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

/// Dessine le footer en mode recherche avec la ligne de saisie
///
/// Le filtre est déjà appliqué à chaque frappe ; Enter ne fait que garder
/// le terme en quittant le mode saisie.
fn render_search_footer(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.up)); // Vert : mode saisie actif

    let input_line = Line::from(vec![
        Span::styled(
            "Recherche : ",
            Style::default().fg(palette.border).add_modifier(Modifier::BOLD),
        ),
        Span::styled(&app.search_input, Style::default().fg(palette.text)),
        Span::styled(
            "█", // Curseur
            Style::default().fg(palette.text).add_modifier(Modifier::SLOW_BLINK),
        ),
    ]);

    let help_line = Line::from(vec![
        Span::styled(
            "[Enter]",
            Style::default().fg(palette.up).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" Valider  "),
        Span::styled(
            "[ESC]",
            Style::default().fg(palette.down).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" Annuler"),
    ]);

    let paragraph = Paragraph::new(vec![input_line, help_line])
        .block(block)
        .alignment(Alignment::Left);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Tests unitaires
// ============================================================================
