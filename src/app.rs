// ============================================================================
// Structure : App
// ============================================================================
// Gère l'état global de l'application TUI
//
// CONCEPTS RUST :
// 1. State Management : centraliser l'état dans une seule structure
// 2. Mutabilité contrôlée : &mut self pour modifier l'état
// 3. Encapsulation : toutes les modifications passent par les méthodes
//
// PATTERN : Cette structure suit le pattern "Application State"
// - Tous les composants de l'UI lisent depuis App
// - L'event loop est le seul propriétaire des mutations
// - Garantit la cohérence entre liste principale, panneau de favoris et
//   préférences persistées
// ============================================================================

use std::collections::HashSet;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::models::CoinMarket;
use crate::storage::Storage;
use crate::store::MarketStore;
use crate::ui::chart::ChartState;
use crate::ui::theme::Theme;

/// Intervalle entre deux rafraîchissements automatiques du snapshot
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(60);

// ============================================================================
// Enum : Screen
// ============================================================================
// CONCEPT RUST : Enums pour state machines
// - Un seul écran actif à la fois
// - Le compilateur force à gérer tous les cas (exhaustivité)
// ============================================================================

/// Écrans de l'application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    /// Vue principale : liste des pièces + panneau de favoris
    Dashboard,

    /// Mode saisie : la barre de recherche capture le clavier
    /// Le filtre est réappliqué à chaque frappe (search-as-you-type)
    SearchInput,

    /// Vue modale : graphique détaillé de la pièce sélectionnée
    ChartView,
}

// ============================================================================
// Enum : FetchState
// ============================================================================
// Machine à états du contrôleur de rafraîchissement :
// Idle -> Fetching -> {Idle (succès), Failed (échec)} -> Fetching -> ...
// Failed se comporte comme Idle (un nouveau fetch peut démarrer) mais porte
// le message d'erreur affiché à la place de la liste.
// ============================================================================

/// État du fetch en cours
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchState {
    /// Aucun fetch en vol
    Idle,

    /// Un fetch est en vol (aucun autre ne peut démarrer)
    Fetching,

    /// Le dernier fetch a échoué ; le message remplace la liste à l'écran,
    /// le snapshot précédent reste intact en mémoire
    Failed(String),
}

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Écran actuellement affiché
    pub current_screen: Screen,

    /// Snapshot de marché courant et vues dérivées
    pub store: MarketStore,

    /// Identifiants des pièces favorites (persisté)
    pub favorites: HashSet<String>,

    /// Thème courant (persisté)
    pub theme: Theme,

    /// État du contrôleur de rafraîchissement
    pub fetch_state: FetchState,

    /// Index de la pièce sélectionnée dans la vue visible (filtrée)
    pub selected_index: usize,

    /// Filtre de recherche actif (appliqué à la liste principale)
    /// Survit aux rafraîchissements : un refresh ne vide jamais la recherche
    pub search_query: String,

    /// Buffer de saisie pendant l'édition de la recherche
    pub search_input: String,

    /// État du graphique modal (None quand la modale est fermée)
    pub chart: Option<ChartState>,

    /// Adaptateur de persistance des préférences
    storage: Storage,

    /// Départ du dernier fetch (None tant qu'aucun fetch n'a été lancé)
    last_fetch_started: Option<Instant>,
}

impl App {
    /// Crée l'état initial en relisant les préférences persistées
    pub fn new(storage: Storage) -> Self {
        let favorites = storage.load_favorites();
        let theme = storage.load_theme();
        info!(favorites = favorites.len(), theme = theme.label(), "App state initialized");

        Self {
            running: true,
            current_screen: Screen::Dashboard,
            store: MarketStore::new(),
            favorites,
            theme,
            fetch_state: FetchState::Idle,
            selected_index: 0,
            search_query: String::new(),
            search_input: String::new(),
            chart: None,
            storage,
            last_fetch_started: None,
        }
    }

    /// Quitte l'application
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Vérifie si l'application doit continuer
    pub fn is_running(&self) -> bool {
        self.running
    }

    // ========================================================================
    // Navigation entre écrans
    // ========================================================================

    pub fn is_on_dashboard(&self) -> bool {
        self.current_screen == Screen::Dashboard
    }

    pub fn is_on_chart(&self) -> bool {
        self.current_screen == Screen::ChartView
    }

    pub fn is_in_search(&self) -> bool {
        self.current_screen == Screen::SearchInput
    }

    // ========================================================================
    // Vues dérivées du snapshot
    // ========================================================================

    /// Le filtre effectivement appliqué à la liste principale
    ///
    /// Pendant la saisie, c'est le buffer en cours d'édition (le filtre suit
    /// chaque frappe) ; sinon, la dernière recherche validée.
    pub fn active_query(&self) -> &str {
        if self.is_in_search() {
            &self.search_input
        } else {
            &self.search_query
        }
    }

    /// Les pièces visibles dans la liste principale (filtre appliqué)
    pub fn visible_coins(&self) -> Vec<&CoinMarket> {
        self.store.filter(self.active_query())
    }

    /// Les pièces favorites présentes dans le snapshot, dans l'ordre du
    /// snapshot (pas l'ordre d'ajout aux favoris)
    pub fn favorite_coins(&self) -> Vec<&CoinMarket> {
        self.store.select_by_ids(&self.favorites)
    }

    /// La pièce actuellement sélectionnée dans la vue visible
    pub fn selected_coin(&self) -> Option<&CoinMarket> {
        self.visible_coins().get(self.selected_index).copied()
    }

    /// Navigue vers le haut dans la liste visible
    ///
    /// CONCEPT RUST : Saturating arithmetic
    /// - saturating_sub() : soustrait mais ne descend pas en dessous de 0
    pub fn navigate_up(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    /// Navigue vers le bas dans la liste visible
    pub fn navigate_down(&mut self) {
        let max_index = self.visible_coins().len().saturating_sub(1);
        self.selected_index = (self.selected_index + 1).min(max_index);
    }

    /// Ramène la sélection dans les bornes de la vue visible
    ///
    /// Appelé après tout changement de la vue (nouveau snapshot, nouveau
    /// filtre) pour que l'index ne pointe jamais hors de la liste.
    fn clamp_selection(&mut self) {
        let len = self.visible_coins().len();
        if len == 0 {
            self.selected_index = 0;
        } else if self.selected_index >= len {
            self.selected_index = len - 1;
        }
    }

    // ========================================================================
    // Favoris
    // ========================================================================

    /// Bascule la pièce sélectionnée dans/hors des favoris et persiste
    ///
    /// Après la mutation, toutes les vues (étoiles de la liste principale,
    /// panneau de favoris) reflètent le nouvel ensemble au prochain frame :
    /// elles sont reconstruites depuis le store à chaque rendu.
    pub fn toggle_favorite_selected(&mut self) {
        let Some(id) = self.selected_coin().map(|coin| coin.id.clone()) else {
            return;
        };
        self.toggle_favorite(&id);
    }

    /// Bascule un identifiant dans/hors des favoris et persiste
    ///
    /// Basculer deux fois est idempotent : l'ensemble revient à l'identique.
    pub fn toggle_favorite(&mut self, id: &str) {
        if !self.favorites.remove(id) {
            self.favorites.insert(id.to_string());
            info!(coin = %id, "Added to favorites");
        } else {
            info!(coin = %id, "Removed from favorites");
        }

        // Échec d'écriture : les favoris restent utilisables en mémoire
        if let Err(e) = self.storage.save_favorites(&self.favorites) {
            warn!(error = ?e, "Failed to persist favorites");
        }
    }

    // ========================================================================
    // Thème
    // ========================================================================

    /// Bascule clair ↔ sombre et persiste la préférence
    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggle();
        info!(theme = self.theme.label(), "Theme toggled");

        if let Err(e) = self.storage.save_theme(self.theme) {
            warn!(error = ?e, "Failed to persist theme");
        }
    }

    // ========================================================================
    // Recherche
    // ========================================================================

    /// Entre en mode saisie de recherche
    ///
    /// Le buffer repart de la recherche active pour pouvoir la retoucher.
    pub fn start_search(&mut self) {
        self.current_screen = Screen::SearchInput;
        self.search_input = self.search_query.clone();
    }

    /// Valide la saisie : le buffer devient le filtre actif
    pub fn submit_search(&mut self) {
        self.search_query = self.search_input.trim().to_string();
        self.current_screen = Screen::Dashboard;
        self.selected_index = 0;
        debug!(query = %self.search_query, "Search submitted");
    }

    /// Abandonne la saisie : le filtre précédemment validé est restauré
    pub fn cancel_search(&mut self) {
        self.search_input.clear();
        self.current_screen = Screen::Dashboard;
        self.clamp_selection();
    }

    /// Ajoute un caractère au buffer de recherche (filtre réappliqué de suite)
    pub fn push_search_char(&mut self, c: char) {
        self.search_input.push(c);
        self.selected_index = 0;
    }

    /// Supprime le dernier caractère du buffer de recherche
    pub fn pop_search_char(&mut self) {
        self.search_input.pop();
        self.selected_index = 0;
    }

    // ========================================================================
    // Graphique modal
    // ========================================================================

    /// Ouvre la modale de graphique pour la pièce sélectionnée
    ///
    /// L'état de graphique précédent est libéré AVANT d'en construire un
    /// nouveau (même surface visuelle, une seule série affichée à la fois).
    pub fn open_chart(&mut self) {
        self.chart = None;

        let state = self.selected_coin().map(ChartState::for_coin);
        if let Some(state) = state {
            info!(coin = %state.name, "Chart opened");
            self.chart = Some(state);
            self.current_screen = Screen::ChartView;
        }
    }

    /// Ferme la modale et libère l'état du graphique
    pub fn close_chart(&mut self) {
        self.chart = None;
        self.current_screen = Screen::Dashboard;
    }

    // ========================================================================
    // Cycle de fetch
    // ========================================================================

    /// true si un fetch est en vol
    pub fn is_fetching(&self) -> bool {
        self.fetch_state == FetchState::Fetching
    }

    /// true si le dernier fetch a échoué (message affiché à la place de la liste)
    pub fn fetch_error(&self) -> Option<&str> {
        match &self.fetch_state {
            FetchState::Failed(msg) => Some(msg),
            _ => None,
        }
    }

    /// true s'il est temps de lancer un rafraîchissement
    ///
    /// Politique skip-if-busy : si un fetch est déjà en vol au moment du
    /// tick, on ne lance rien (jamais deux fetchs concurrents contre le
    /// store). Le premier appel (aucun fetch encore lancé) retourne true.
    pub fn should_refresh(&self) -> bool {
        if self.is_fetching() {
            return false;
        }

        match self.last_fetch_started {
            None => true,
            Some(started) => started.elapsed() >= REFRESH_INTERVAL,
        }
    }

    /// Marque le départ d'un fetch (la commande vient d'être envoyée au worker)
    pub fn start_fetch(&mut self) {
        self.fetch_state = FetchState::Fetching;
        self.last_fetch_started = Some(Instant::now());
    }

    /// Applique un snapshot fraîchement récupéré (swap atomique)
    ///
    /// La recherche active survit au remplacement : le filtre courant est
    /// simplement réappliqué sur le nouveau snapshot au prochain rendu. La
    /// sélection est ramenée dans les bornes de la nouvelle vue.
    pub fn apply_snapshot(&mut self, coins: Vec<CoinMarket>) {
        debug!(coins = coins.len(), "Applying market snapshot");
        self.store.replace(coins);
        self.fetch_state = FetchState::Idle;
        self.clamp_selection();
    }

    /// Enregistre l'échec du fetch ; le snapshot précédent reste intact
    pub fn fetch_failed(&mut self, message: String) {
        warn!(error = %message, "Market fetch failed");
        self.fetch_state = FetchState::Failed(message);
    }
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
        coin
    }

    fn test_app(tag: &str) -> App {
        let dir = std::env::temp_dir()
            .join("lazycoins-app-tests")
            .join(format!("{}-{}", tag, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        App::new(Storage::with_dir(dir))
    }

    fn loaded_app(tag: &str) -> App {
        let mut app = test_app(tag);
        app.apply_snapshot(vec![
            coin("bitcoin", "Bitcoin", "btc", 2.5),
            coin("ethereum", "Ethereum", "eth", -1.1),
        ]);
        app
    }

    #[test]
    fn test_app_creation() {
        let app = test_app("creation");
        assert!(app.is_running());
        assert!(app.store.is_empty());
        assert_eq!(app.fetch_state, FetchState::Idle);
        assert_eq!(app.theme, Theme::Light);
    }

    #[test]
    fn test_toggle_favorite_is_idempotent() {
        let mut app = loaded_app("idempotent");
        let before = app.favorites.clone();

        app.toggle_favorite("bitcoin");
        assert!(app.favorites.contains("bitcoin"));

        app.toggle_favorite("bitcoin");
        assert_eq!(app.favorites, before);
    }

    #[test]
    fn test_favorites_view_follows_mutation() {
        let mut app = loaded_app("fav-view");

        app.toggle_favorite("ethereum");
        let favs: Vec<&str> = app.favorite_coins().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(favs, vec!["ethereum"]);

        app.toggle_favorite("bitcoin");
        // Ordre du snapshot, pas ordre d'ajout
        let favs: Vec<&str> = app.favorite_coins().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(favs, vec!["bitcoin", "ethereum"]);
    }

    #[test]
    fn test_search_and_favorites_are_independent() {
        // Scénario : favori sur "eth" puis recherche "bit"
        let mut app = loaded_app("independent");
        app.toggle_favorite("ethereum");

        app.start_search();
        for c in "bit".chars() {
            app.push_search_char(c);
        }
        app.submit_search();

        let visible: Vec<&str> = app.visible_coins().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(visible, vec!["Bitcoin"]);

        let favs: Vec<&str> = app.favorite_coins().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(favs, vec!["Ethereum"]);
    }

    #[test]
    fn test_refresh_preserves_search_query() {
        let mut app = loaded_app("preserve-query");
        app.start_search();
        app.push_search_char('e');
        app.push_search_char('t');
        app.push_search_char('h');
        app.submit_search();

        // Nouveau snapshot appliqué : la recherche reste en place
        app.apply_snapshot(vec![
            coin("bitcoin", "Bitcoin", "btc", 1.0),
            coin("ethereum", "Ethereum", "eth", 2.0),
            coin("tether", "Tether", "usdt", 0.0),
        ]);

        assert_eq!(app.search_query, "eth");
        let visible: Vec<&str> = app.visible_coins().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(visible, vec!["ethereum", "tether"]);
    }

    #[test]
    fn test_failed_fetch_keeps_snapshot_and_favorites() {
        let mut app = loaded_app("failure");
        app.toggle_favorite("bitcoin");

        app.start_fetch();
        app.fetch_failed("CoinGecko a retourné une erreur : HTTP 500".to_string());

        // Le snapshot et les favoris précédents sont intacts
        assert_eq!(app.store.len(), 2);
        assert!(app.favorites.contains("bitcoin"));

        // Le message d'échec est exposé pour l'affichage
        assert!(app.fetch_error().unwrap().contains("HTTP 500"));
    }

    #[test]
    fn test_skip_if_busy() {
        let mut app = loaded_app("busy");
        assert!(app.should_refresh()); // premier fetch : tout de suite

        app.start_fetch();
        assert!(!app.should_refresh()); // fetch en vol : on skippe

        app.apply_snapshot(vec![coin("bitcoin", "Bitcoin", "btc", 1.0)]);
        assert!(!app.should_refresh()); // succès récent : on attend l'intervalle
    }

    #[test]
    fn test_navigation_clamped_to_visible_view() {
        let mut app = loaded_app("navigation");

        app.navigate_down();
        assert_eq!(app.selected_index, 1);
        app.navigate_down();
        assert_eq!(app.selected_index, 1); // butée basse

        app.navigate_up();
        assert_eq!(app.selected_index, 0);
        app.navigate_up();
        assert_eq!(app.selected_index, 0); // butée haute
    }

    #[test]
    fn test_selection_clamped_after_snapshot_shrinks() {
        let mut app = loaded_app("clamp");
        app.navigate_down();
        assert_eq!(app.selected_index, 1);

        app.apply_snapshot(vec![coin("bitcoin", "Bitcoin", "btc", 1.0)]);
        assert_eq!(app.selected_index, 0);
        assert_eq!(app.selected_coin().unwrap().id, "bitcoin");
    }

    #[test]
    fn test_cancel_search_restores_previous_query() {
        let mut app = loaded_app("cancel-search");
        app.start_search();
        app.push_search_char('b');
        app.submit_search();
        assert_eq!(app.search_query, "b");

        // Nouvelle saisie abandonnée : la recherche validée reste "b"
        app.start_search();
        app.push_search_char('x');
        app.push_search_char('y');
        app.cancel_search();
        assert_eq!(app.search_query, "b");
        assert_eq!(app.active_query(), "b");
    }

    #[test]
    fn test_live_filter_while_typing() {
        let mut app = loaded_app("live-filter");
        app.start_search();
        app.push_search_char('e');
        app.push_search_char('t');
        app.push_search_char('h');

        // Avant validation, le filtre suit déjà le buffer
        let visible: Vec<&str> = app.visible_coins().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(visible, vec!["ethereum"]);
    }

    #[test]
    fn test_open_chart_replaces_previous_state() {
        let mut app = loaded_app("chart");
        app.open_chart();
        assert!(app.is_on_chart());
        assert_eq!(app.chart.as_ref().unwrap().name, "Bitcoin");

        app.close_chart();
        assert!(app.chart.is_none());
        assert!(app.is_on_dashboard());

        // Ouvre sur une autre pièce : l'état précédent est remplacé
        app.navigate_down();
        app.open_chart();
        assert_eq!(app.chart.as_ref().unwrap().name, "Ethereum");
    }

    #[test]
    fn test_open_chart_without_selection_does_nothing() {
        let mut app = test_app("chart-empty");
        app.open_chart();
        assert!(app.chart.is_none());
        assert!(app.is_on_dashboard());
    }
}
