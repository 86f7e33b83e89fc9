//! Noyau décimal à précision arbitraire
//!
//! Organisation interne :
//! - decimal.rs    : Decimal (mantisse BigInt + échelle) + politique d'arrondi
//! - locale.rs     : séparateurs par locale + validateur de littéraux
//! - format.rs     : rendu texte (brut / joli / scientifique)
//! - primitives.rs : séries à précision de travail (π, exp, ln, sin, atan, racines, Γ)
//! - trig.rs       : trig en degrés/radians, angles spéciaux exacts
//! - fonctions.rs  : actions sémantiques de la table
//! - symboles.rs   : table des symboles (précédence, associativité, arité)
//! - variables.rs  : cycles + substitution des variables
//! - jetons.rs     : tokenisation + normalisation
//! - rpn.rs        : shunting-yard
//! - eval.rs       : pipeline complet (Moteur)

pub mod decimal;
pub mod erreurs;
pub mod eval;
pub mod fonctions;
pub mod format;
pub mod jetons;
pub mod locale;
pub mod primitives;
pub mod reglages;
pub mod rpn;
pub mod symboles;
pub mod trig;
pub mod valeur;
pub mod variables;

#[cfg(test)]
mod tests_scientifiques;

#[cfg(test)]
mod tests_fuzz_safe;

/// Traces visibles dans les tests (RUST_LOG, sinon debug).
#[cfg(test)]
pub(crate) fn init_traces_test() {
    use tracing_subscriber::{fmt, EnvFilter};

    // déjà installé par un autre test : on ignore
    let _ = fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .with_test_writer()
        .try_init();
}

// API publique minimale
pub use decimal::{Arrondi, Decimal, Politique};
pub use erreurs::{Erreur, Resultat};
pub use eval::{Demarche, Moteur};
pub use locale::Locale;
pub use reglages::Reglages;
pub use trig::UniteAngle;
pub use valeur::Valeur;
pub use variables::Variables;
