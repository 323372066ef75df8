// ============================================================================
// LazyCoins - Dashboard crypto dans le terminal
// ============================================================================
// Programme TUI affichant le top 100 des cryptomonnaies (CoinGecko) avec
// recherche, favoris persistés, sparklines et graphique détaillé.
//
// CONCEPTS RUST CLÉS :
// 1. Terminal raw mode : contrôle total du terminal
// 2. Event loop : boucle infinie qui gère événements et rendering
// 3. Async dans sync : tokio::runtime::Runtime pour appels API
// 4. Channels mpsc : communication avec le worker de fetch
// ============================================================================

use std::io;
use std::sync::{mpsc, Arc, Mutex};

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use tracing::{debug, error, info};

use lazycoins::api::fetch_markets;
use lazycoins::app::App;
use lazycoins::models::CoinMarket;
use lazycoins::storage::Storage;
use lazycoins::ui::chart::{hit_test, modal_area};
use lazycoins::ui::{events::EventHandler, render};

// ============================================================================
// AppCommand : Commandes pour le worker thread
// ============================================================================
// CONCEPT RUST : Command pattern avec channels
// - L'event loop envoie des commandes au worker thread
// - Le worker thread exécute les tâches async (fetch API)
// - Communication via mpsc channels (multi-producer, single-consumer)
// ============================================================================

/// Commandes envoyées au worker thread pour exécuter des tâches async
#[derive(Debug, Clone)]
enum AppCommand {
    /// Récupérer un nouveau snapshot de marché complet
    /// Une seule commande peut être en vol à la fois (skip-if-busy côté
    /// event loop) : jamais deux fetchs concurrents contre le store
    FetchMarkets,
}

/// Résultats renvoyés par le worker thread
#[derive(Debug)]
enum AppResult {
    /// Snapshot récupéré avec succès (remplace l'ancien en entier)
    MarketsLoaded(Vec<CoinMarket>),

    /// Échec du fetch (réseau ou statut HTTP non-2xx)
    /// Le message est affiché tel quel à la place de la liste
    FetchFailed(String),
}

// ============================================================================
// Initialisation du logging
// ============================================================================
// CONCEPT : Logging dans une app TUI
// - Les println! ne fonctionnent pas une fois le TUI lancé
// - On log vers un fichier à la place
// - Rotation quotidienne automatique des logs
// ============================================================================

/// Initialise le système de logging vers fichier
///
/// Les logs sont écrits dans :
/// - Linux/WSL : ~/.local/share/lazycoins/logs/lazycoins.log
/// - macOS : ~/Library/Application Support/lazycoins/logs/lazycoins.log
/// - Windows : C:\Users\<user>\AppData\Local\lazycoins\logs\lazycoins.log
///
/// # Utilisation
/// ```bash
/// # Voir les logs en temps réel
/// tail -f ~/.local/share/lazycoins/logs/lazycoins.log
///
/// # Contrôler le niveau de log
/// RUST_LOG=debug cargo run
/// RUST_LOG=lazycoins=trace cargo run
/// ```
fn init_logging() -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("lazycoins")
        .join("logs");

    // Crée le répertoire s'il n'existe pas
    std::fs::create_dir_all(&log_dir).context("Échec de la création du répertoire de logs")?;

    // Rotation quotidienne : nouveau fichier chaque jour, les logs ne
    // grossissent pas indéfiniment
    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir.clone(), "lazycoins.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender) // Écrit dans le fichier
                .with_ansi(false) // Pas de codes couleur dans le fichier
                .with_target(true) // Inclut le module (ex: lazycoins::api::coingecko)
                .with_thread_ids(true) // Inclut l'ID du thread (utile pour async)
                .with_line_number(true), // Inclut le numéro de ligne
        )
        .with(
            // Filtre les logs par niveau
            // - RUST_LOG=debug : tous les logs debug+
            // - Par défaut : debug pour lazycoins, info pour les dépendances
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lazycoins=debug,info".into()),
        )
        .init();

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

fn main() -> Result<()> {
    // Initialize logging FIRST
    // Si init échoue, on affiche l'erreur et continue quand même
    init_logging().unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {}", e);
        eprintln!("   Continuing without logging...");
    });

    info!("LazyCoins starting up");

    // Relit les préférences persistées (favoris, thème)
    let storage = Storage::new();
    let app = Arc::new(Mutex::new(App::new(storage)));

    // Setup du terminal en mode TUI
    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    // Crée les channels pour communication avec le worker
    // CONCEPT RUST : mpsc channels
    // - command_tx/rx : pour envoyer des commandes au worker
    // - result_tx/rx : pour recevoir les résultats du worker
    let (command_tx, command_rx) = mpsc::channel::<AppCommand>();
    let (result_tx, result_rx) = mpsc::channel::<AppResult>();

    // Lance le worker thread en arrière-plan
    info!("Spawning background worker thread");
    spawn_background_worker(command_rx, result_tx);

    // Crée le gestionnaire d'événements
    let events = EventHandler::new();

    // Exécute l'event loop (le premier fetch part dès la première itération)
    info!("Starting event loop");
    let result = run(&mut terminal, app, &events, command_tx, result_rx);

    // Restaure le terminal (même en cas d'erreur)
    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    result
}

// ============================================================================
// Background Worker Thread
// ============================================================================
// CONCEPT RUST : Background async worker avec channels
// - Thread séparé qui traite les commandes async
// - Reçoit des AppCommand via un channel (command_rx)
// - Envoie des AppResult via un autre channel (result_tx)
// - Permet de faire des appels API sans bloquer l'UI
// ============================================================================

/// Worker thread qui exécute les fetchs en arrière-plan
///
/// Le worker ne touche jamais l'état de l'application : il ne fait que
/// répondre aux commandes par des résultats. Le swap du snapshot se fait
/// dans l'event loop, jamais pendant qu'un rendu lit le store.
fn spawn_background_worker(
    command_rx: mpsc::Receiver<AppCommand>,
    result_tx: mpsc::Sender<AppResult>,
) {
    std::thread::spawn(move || {
        // Runtime tokio propre à ce thread
        // - block_on() bloque le thread worker (pas l'UI)
        let runtime = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");

        loop {
            match command_rx.recv() {
                Ok(command) => {
                    info!(?command, "Worker received command");

                    match command {
                        AppCommand::FetchMarkets => {
                            let result = runtime.block_on(fetch_markets());

                            match result {
                                Ok(coins) => {
                                    info!(coins = coins.len(), "Market snapshot fetched");
                                    let _ = result_tx.send(AppResult::MarketsLoaded(coins));
                                }
                                Err(e) => {
                                    error!(error = ?e, "Failed to fetch market snapshot");
                                    let _ = result_tx.send(AppResult::FetchFailed(e.to_string()));
                                }
                            }
                        }
                    }
                }
                Err(_) => {
                    // Channel fermé, on quitte
                    info!("Worker thread exiting (channel closed)");
                    break;
                }
            }
        }
    });
}

// ============================================================================
// Event Loop Principal
// ============================================================================
// CONCEPT : Event Loop Pattern
// - À chaque itération :
//   0. Appliquer les résultats du worker (snapshot, erreurs)
//   1. Dessiner l'interface (render)
//   2. Traiter les événements (input)
//   3. Mettre à jour l'état (update : horloge de rafraîchissement)
//
// Un résultat de fetch est appliqué en entier avant que l'événement
// utilisateur suivant ne soit traité : pas d'état intermédiaire visible.
// ============================================================================

/// Exécute la boucle principale de l'application
fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: Arc<Mutex<App>>,
    events: &EventHandler,
    command_tx: mpsc::Sender<AppCommand>,
    result_rx: mpsc::Receiver<AppResult>,
) -> Result<()> {
    loop {
        // Vérifie si l'app est toujours en cours d'exécution
        // CONCEPT : Lock scope minimisé
        {
            let app_lock = app.lock().unwrap();
            if !app_lock.is_running() {
                break;
            }
        }

        // ========================================
        // 0. RÉSULTATS : Applique les résultats du worker
        // ========================================
        // CONCEPT : Non-blocking receive avec try_recv
        match result_rx.try_recv() {
            Ok(result) => {
                let mut app_lock = app.lock().unwrap();
                match result {
                    AppResult::MarketsLoaded(coins) => {
                        info!(coins = coins.len(), "Applying fresh market snapshot");
                        app_lock.apply_snapshot(coins);
                    }
                    AppResult::FetchFailed(message) => {
                        error!(error = %message, "Fetch failed, keeping previous snapshot");
                        app_lock.fetch_failed(message);
                    }
                }
            }
            Err(mpsc::TryRecvError::Empty) => {
                // Pas de résultat, c'est normal
            }
            Err(mpsc::TryRecvError::Disconnected) => {
                error!("Worker thread disconnected!");
                // Continue quand même, mais le worker est mort
            }
        }

        // ========================================
        // 1. UPDATE : Horloge de rafraîchissement
        // ========================================
        // Premier fetch immédiat (avant le premier rendu, pour afficher
        // l'état de chargement), puis toutes les 60 secondes.
        // Skip-if-busy : rien n'est envoyé tant qu'un fetch est en vol.
        {
            let mut app_lock = app.lock().unwrap();
            if app_lock.should_refresh() {
                debug!("Refresh due, sending fetch command");
                app_lock.start_fetch();
                let _ = command_tx.send(AppCommand::FetchMarkets);
            }
        }

        // ========================================
        // 2. RENDER : Dessine l'interface
        // ========================================
        {
            let app_clone = app.clone();
            terminal.draw(|frame| {
                let app_lock = app_clone.lock().unwrap();
                render(frame, &app_lock);
            })?;
        }

        // ========================================
        // 3. INPUT : Traite les événements
        // ========================================
        // La taille de l'écran sert au hit-test souris de la modale
        let screen = terminal.size().unwrap_or(Rect::new(0, 0, 0, 0));
        match events.next() {
            Ok(event) => {
                let mut app_lock = app.lock().unwrap();
                handle_event(&mut app_lock, event, &command_tx, screen);
            }
            Err(_) => {
                // Erreur lors de la lecture d'événement
            }
        }
    }

    Ok(())
}

// ============================================================================
// Gestion des événements
// ============================================================================
// CONCEPT : Event Handler Pattern
// - Les guards par écran garantissent qu'une touche ne déclenche qu'UNE
//   action : la saisie de recherche passe avant les raccourcis du dashboard,
//   la modale avant tout le reste
// ============================================================================

/// Traite un événement et met à jour l'état de l'application
fn handle_event(
    app: &mut App,
    event: lazycoins::ui::events::Event,
    command_tx: &mpsc::Sender<AppCommand>,
    screen: Rect,
) {
    use lazycoins::ui::events::{
        get_char_from_event, is_backspace_event, is_chart_event, is_close_event, is_down_event,
        is_enter_event, is_escape_event, is_favorite_event, is_quit_event, is_refresh_event,
        is_search_char_event, is_search_event, is_theme_event, is_up_event, left_click_position,
        Event,
    };

    match event {
        // ========================================
        // Mode recherche : la saisie capture le clavier
        // ========================================

        // ESC : abandonne la saisie, le filtre validé précédent est restauré
        Event::Key(_) if is_escape_event(&event) && app.is_in_search() => {
            debug!("Search input cancelled");
            app.cancel_search();
        }

        // Enter : valide la saisie, le buffer devient le filtre actif
        Event::Key(_) if is_enter_event(&event) && app.is_in_search() => {
            info!(query = %app.search_input, "Search submitted");
            app.submit_search();
        }

        // Backspace : supprime le dernier caractère (le filtre suit)
        Event::Key(_) if is_backspace_event(&event) && app.is_in_search() => {
            app.pop_search_char();
        }

        // Caractères : ajoute au buffer (le filtre suit chaque frappe)
        Event::Key(_) if is_search_char_event(&event) && app.is_in_search() => {
            if let Some(c) = get_char_from_event(&event) {
                app.push_search_char(c);
            }
        }

        // ========================================
        // Modale de graphique
        // ========================================

        // ESC ou 'x' : ferme la modale et libère l'état du graphique
        Event::Key(_) if (is_escape_event(&event) || is_close_event(&event)) && app.is_on_chart() => {
            debug!("Chart modal closed");
            app.close_chart();
        }

        // Clic souris : ferme seulement si le clic est sur le backdrop
        // (un clic DANS la modale ne doit pas la fermer)
        Event::Mouse(_) if app.is_on_chart() => {
            if let Some((column, row)) = left_click_position(&event) {
                if !hit_test(modal_area(screen), column, row) {
                    debug!("Backdrop clicked, closing chart modal");
                    app.close_chart();
                }
            }
        }

        // 't' : le thème reste basculable pendant que la modale est ouverte
        Event::Key(_) if is_theme_event(&event) && app.is_on_chart() => {
            app.toggle_theme();
        }

        // ========================================
        // Dashboard
        // ========================================

        // 'q' : quitter (uniquement depuis le dashboard)
        Event::Key(_) if is_quit_event(&event) && app.is_on_dashboard() => {
            info!("User requested quit");
            app.quit();
        }

        // Navigation dans la liste visible
        Event::Key(_) if is_up_event(&event) && app.is_on_dashboard() => {
            app.navigate_up();
        }
        Event::Key(_) if is_down_event(&event) && app.is_on_dashboard() => {
            app.navigate_down();
        }

        // '/' : entre en mode recherche
        Event::Key(_) if is_search_event(&event) && app.is_on_dashboard() => {
            debug!("Entering search input");
            app.start_search();
        }

        // 'f' ou Espace : bascule le favori de la pièce sélectionnée
        // Les étoiles et le panneau de favoris suivent au prochain frame
        Event::Key(_) if is_favorite_event(&event) && app.is_on_dashboard() => {
            app.toggle_favorite_selected();
        }

        // Enter ou 'c' : ouvre le graphique de la pièce sélectionnée
        // Les deux déclencheurs mènent à la même action, une seule fois
        Event::Key(_) if (is_enter_event(&event) || is_chart_event(&event)) && app.is_on_dashboard() => {
            app.open_chart();
        }

        // 't' : bascule le thème (persisté)
        Event::Key(_) if is_theme_event(&event) && app.is_on_dashboard() => {
            app.toggle_theme();
        }

        // 'r' : rafraîchissement manuel (skip-if-busy comme l'horloge)
        Event::Key(_) if is_refresh_event(&event) && app.is_on_dashboard() => {
            if !app.is_fetching() {
                info!("Manual refresh requested");
                app.start_fetch();
                let _ = command_tx.send(AppCommand::FetchMarkets);
            }
        }

        Event::Tick => {
            // Tick régulier : l'horloge de rafraîchissement est gérée dans
            // l'étape UPDATE de la boucle principale
        }

        _ => {
            // Autres événements : ignorés
        }
    }
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================
// CONCEPT RUST : Terminal raw mode
// - Raw mode : on reçoit tous les caractères directement
// - Alternate screen : écran secondaire (ne pollue pas l'historique)
// - Mouse capture : nécessaire pour le clic sur le backdrop de la modale
//
// IMPORTANT : Toujours restaurer le terminal avant de quitter !
// ============================================================================

/// Configure le terminal en mode TUI
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture // Clic sur le backdrop pour fermer la modale
    )?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| e.into())
}

/// Restaure le terminal à son état normal
///
/// Appelé dans main() même en cas d'erreur, pour ne pas laisser le
/// terminal cassé.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;

    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;

    terminal.show_cursor()?;

    Ok(())
}
