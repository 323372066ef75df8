// ============================================================================
// Sparkline - Normalisation d'une série de prix en coordonnées de tracé
// ============================================================================
// Transforme une série de prix brute (7 jours) en points (x, y) prêts à être
// dessinés, quelle que soit la magnitude des prix (Bitcoin ou memecoin).
//
// CONCEPTS RUST :
// 1. Fonctions pures : pas d'état, faciles à tester
// 2. Iterator chaining : map + collect pour transformer la série
// 3. Slices : &[f64] en entrée, pas besoin de posséder les données
// ============================================================================

/// Largeur du repère de tracé (unités arbitraires)
pub const SPAN_X: f64 = 100.0;

/// Hauteur du repère de tracé
pub const SPAN_Y: f64 = 30.0;

/// Marge réservée en haut du repère (le tracé occupe [5, 30])
pub const TOP_MARGIN: f64 = 5.0;

/// Normalise une série de prix en points (x, y) dans un repère fixe
///
/// Le repère est orienté "écran" : y grandit vers le bas, donc le maximum de
/// la série est tracé à y = 5 (marge haute) et le minimum à y = 30.
///
/// Formule : y = 30 - ((v - min) / (max - min)) * 25
///           x = index * (100 / (count - 1))
///
/// Cas dégénérés :
/// - série vide → aucun point (l'appelant affiche un indicateur vide)
/// - un seul élément → un unique point au milieu de la bande (pas de division
///   par zéro avec count - 1 = 0)
/// - amplitude nulle (tous les prix identiques) → aucun point
///
/// CONCEPT RUST : fold pour min/max
/// - f64 n'implémente pas Ord (à cause de NaN), donc pas de .min()/.max()
///   directs sur l'itérateur
/// - fold() calcule les deux bornes en un seul passage
pub fn normalize_series(values: &[f64]) -> Vec<(f64, f64)> {
    if values.is_empty() {
        return Vec::new();
    }

    // Un seul prix : un point unique, centré verticalement
    if values.len() == 1 {
        return vec![(0.0, (SPAN_Y + TOP_MARGIN) / 2.0)];
    }

    let (min, max) = values
        .iter()
        .fold((f64::MAX, f64::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)));

    let range = max - min;

    // Amplitude nulle : la ligne serait plate et la division indéfinie
    if range == 0.0 {
        return Vec::new();
    }

    let step = SPAN_X / (values.len() - 1) as f64;

    values
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let x = i as f64 * step;
            let y = SPAN_Y - ((v - min) / range) * (SPAN_Y - TOP_MARGIN);
            (x, y)
        })
        .collect()
}

// ============================================================================
// Projection en glyphes pour l'affichage inline
// ============================================================================
// Dans une liste TUI, chaque ligne ne dispose que de quelques caractères pour
// la tendance. On replie les points normalisés sur une largeur fixe avec les
// blocs Unicode ▁▂▃▄▅▆▇█ (8 niveaux).
// ============================================================================

/// Blocs verticaux Unicode, du plus bas au plus haut
const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Replie des points normalisés en une chaîne de `width` glyphes
///
/// Chaque colonne échantillonne le point le plus proche, et la coordonnée y
/// (repère écran, y = 5 en haut) est convertie en l'un des 8 niveaux.
/// Une série vide produit une chaîne vide (indicateur blanc, pas de panic).
pub fn trend_glyphs(points: &[(f64, f64)], width: usize) -> String {
    if points.is_empty() || width == 0 {
        return String::new();
    }

    (0..width)
        .map(|col| {
            // Index du point le plus proche de cette colonne
            let idx = if width == 1 {
                0
            } else {
                (col * (points.len() - 1) + (width - 1) / 2) / (width - 1)
            };
            let y = points[idx.min(points.len() - 1)].1;

            // y ∈ [5, 30] avec 5 = haut → niveau ∈ [0, 7] avec 7 = haut
            let level = ((SPAN_Y - y) / (SPAN_Y - TOP_MARGIN) * 7.0).round() as usize;
            BARS[level.min(7)]
        })
        .collect()
}

// ============================================================================
// Tests unitaires
// ============================================================================
