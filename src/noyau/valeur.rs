// src/noyau/valeur.rs
//
// Valeur de la pile d'évaluation : un nombre, ou un couple (Pol / Rec).
// Les opérateurs scalaires s'appliquent composante par composante sur un couple.

use std::fmt;

use super::decimal::Decimal;
use super::erreurs::{Erreur, Resultat};
use super::format::format_decimal_joli;
use super::locale::Locale;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Valeur {
    Nombre(Decimal),
    Paire(Decimal, Decimal),
}

impl Valeur {
    pub fn trim(&self) -> Self {
        match self {
            Valeur::Nombre(d) => Valeur::Nombre(d.trim()),
            Valeur::Paire(a, b) => Valeur::Paire(a.trim(), b.trim()),
        }
    }

    /// Le nombre porté, ou une erreur si c'est un couple.
    pub fn en_nombre(&self) -> Resultat<&Decimal> {
        match self {
            Valeur::Nombre(d) => Ok(d),
            Valeur::Paire(..) => Err(Erreur::domaine("un nombre est attendu, pas un couple")),
        }
    }

    pub fn avec_locale(self, locale: Locale) -> Self {
        match self {
            Valeur::Nombre(d) => Valeur::Nombre(d.avec_locale(locale)),
            Valeur::Paire(a, b) => Valeur::Paire(a.avec_locale(locale), b.avec_locale(locale)),
        }
    }

    /// Refuse un résultat hors de la plage des ordres de grandeur admis.
    pub fn verifier_bornes(self) -> Resultat<Self> {
        match self {
            Valeur::Nombre(d) => Ok(Valeur::Nombre(d.verifier_bornes()?)),
            Valeur::Paire(a, b) => Ok(Valeur::Paire(a.verifier_bornes()?, b.verifier_bornes()?)),
        }
    }

    /// Applique `f` au nombre, ou à chaque composante du couple.
    pub fn appliquer(&self, f: impl Fn(&Decimal) -> Resultat<Decimal>) -> Resultat<Self> {
        match self {
            Valeur::Nombre(d) => Ok(Valeur::Nombre(f(d)?)),
            Valeur::Paire(a, b) => Ok(Valeur::Paire(f(a)?, f(b)?)),
        }
    }

    /// Forme "joli" (groupes de chiffres) dans la locale donnée.
    pub fn format_joli(&self, locale: Locale) -> String {
        match self {
            Valeur::Nombre(d) => format_decimal_joli(d, locale),
            Valeur::Paire(a, b) => format!(
                "({}; {})",
                format_decimal_joli(a, locale),
                format_decimal_joli(b, locale)
            ),
        }
    }
}

impl From<Decimal> for Valeur {
    fn from(d: Decimal) -> Self {
        Valeur::Nombre(d)
    }
}

impl fmt::Display for Valeur {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Valeur::Nombre(d) => write!(f, "{d}"),
            Valeur::Paire(a, b) => write!(f, "({a}; {b})"),
        }
    }
}
