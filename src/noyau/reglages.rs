// src/noyau/reglages.rs
//
// Réglages d'un moteur : politique (précision + arrondi), locale, unité d'angle.
// Copy, immuables une fois le moteur construit.

use super::decimal::{Arrondi, Politique};
use super::locale::{locale_defaut, Locale};
use super::trig::UniteAngle;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reglages {
    pub politique: Politique,
    pub locale: Locale,
    pub angle: UniteAngle,
}

impl Default for Reglages {
    /// {100 chiffres, HalfUp}, locale par défaut du processus, radians.
    fn default() -> Self {
        Self {
            politique: Politique::default(),
            locale: locale_defaut(),
            angle: UniteAngle::default(),
        }
    }
}

impl Reglages {
    pub fn avec_precision(mut self, precision: u32) -> Self {
        self.politique = Politique::new(precision, self.politique.arrondi());
        self
    }

    pub fn avec_arrondi(mut self, arrondi: Arrondi) -> Self {
        self.politique = Politique::new(self.politique.precision(), arrondi);
        self
    }

    pub fn avec_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn avec_angle(mut self, angle: UniteAngle) -> Self {
        self.angle = angle;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noyau::decimal::PRECISION_MAX;

    #[test]
    fn constructeurs_chainables() {
        let r = Reglages::default()
            .avec_precision(20)
            .avec_arrondi(Arrondi::Floor)
            .avec_angle(UniteAngle::Deg);
        assert_eq!(r.politique.precision(), 20);
        assert_eq!(r.politique.arrondi(), Arrondi::Floor);
        assert_eq!(r.angle, UniteAngle::Deg);
    }

    #[test]
    fn precision_bornee() {
        assert_eq!(Reglages::default().avec_precision(0).politique.precision(), 1);
        let r = Reglages::default().avec_precision(u32::MAX);
        assert_eq!(r.politique.precision(), PRECISION_MAX);
    }
}
