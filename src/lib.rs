// src/lib.rs
//
// Calculatrice précise : moteur d'expressions décimal, précision arbitraire, sensible à la locale.
//
//   evaluate("2*a + b^2", {a: "5+3", b: "3"}) -> 25
//
// Pipeline : variables (cycles + substitution) -> jetons -> RPN -> pile de valeurs.
// Tout vit dans `noyau` ; ce fichier n'expose que les points d'entrée usuels,
// avec les réglages par défaut (100 chiffres, HalfUp, locale du processus, radians).

pub mod noyau;

pub use noyau::{
    Arrondi, Decimal, Demarche, Erreur, Locale, Moteur, Politique, Reglages, Resultat,
    UniteAngle, Valeur, Variables,
};

/// Évalue une expression sans variables.
pub fn evaluate(expr: &str) -> Resultat<Valeur> {
    Moteur::default().evaluer(expr)
}

/// Évalue une expression avec une table de variables (nom -> expression).
pub fn evaluate_with_variables(expr: &str, variables: &Variables) -> Resultat<Valeur> {
    Moteur::default().evaluer_avec(expr, variables)
}

/// Résultat en texte ; en cas d'échec, un message sûr et lisible.
pub fn evaluate_to_string(expr: &str, variables: &Variables) -> String {
    Moteur::default().evaluer_en_texte(expr, variables)
}

/// Comme `evaluate_to_string`, chiffres groupés selon la locale.
pub fn evaluate_to_pretty_string(expr: &str, variables: &Variables) -> String {
    Moteur::default().evaluer_en_texte_joli(expr, variables)
}
