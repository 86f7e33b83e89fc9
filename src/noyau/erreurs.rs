// src/noyau/erreurs.rs
//
// Taxonomie des erreurs du pipeline (toutes fail-fast, aucune reprise interne).
//
// - Syntaxe            : jetons / RPN (caractère inattendu, parenthèses, séparateur)
// - VariableIndefinie  : substitution d'un identifiant absent de la table
// - ReferenceCyclique  : cycle détecté AVANT toute substitution
// - Domaine            : opération mathématiquement indéfinie
// - ExpressionMalformee: garde-fou de la pile d'évaluation

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Erreur {
    #[error("syntaxe invalide{}: {message}", position_txt(.position))]
    Syntaxe {
        position: Option<usize>,
        message: String,
    },

    #[error("variable non définie: {0}")]
    VariableIndefinie(String),

    #[error("référence cyclique: {}", chemin_txt(.0))]
    ReferenceCyclique(Vec<String>),

    #[error("domaine: {0}")]
    Domaine(String),

    #[error("expression mal formée ({0} valeur(s) restante(s) sur la pile)")]
    ExpressionMalformee(usize),
}

fn position_txt(position: &Option<usize>) -> String {
    match position {
        Some(p) => format!(" (position {p})"),
        None => String::new(),
    }
}

fn chemin_txt(chemin: &[String]) -> String {
    chemin.join(" → ")
}

pub type Resultat<T> = Result<T, Erreur>;

impl Erreur {
    pub fn syntaxe(position: usize, message: impl Into<String>) -> Self {
        Erreur::Syntaxe {
            position: Some(position),
            message: message.into(),
        }
    }

    pub fn syntaxe_globale(message: impl Into<String>) -> Self {
        Erreur::Syntaxe {
            position: None,
            message: message.into(),
        }
    }

    pub fn domaine(message: impl Into<String>) -> Self {
        Erreur::Domaine(message.into())
    }

    /// Message affichable tel quel à un utilisateur final.
    ///
    /// Ne reprend jamais le texte interne de l'erreur (ni les noms de variables
    /// saisis), seulement une phrase choisie par catégorie.
    pub fn message_sur(&self) -> &'static str {
        match self {
            Erreur::Syntaxe { .. } => "Erreur : expression invalide",
            Erreur::VariableIndefinie(_) => "Erreur : variable non définie",
            Erreur::ReferenceCyclique(_) => "Erreur : variables définies en boucle",
            Erreur::Domaine(_) => "Erreur : opération mathématiquement indéfinie",
            Erreur::ExpressionMalformee(_) => "Erreur : expression incomplète",
        }
    }
}
