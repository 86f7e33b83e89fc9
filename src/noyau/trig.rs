// src/noyau/trig.rs
//
// Trigonométrie selon l'unité d'angle (DEG / RAD)
// -----------------------------------------------------------
// - DEG : réduction EXACTE modulo 360 (rationnel), puis table des angles
//         spéciaux (multiples de 30° / 45° à valeur rationnelle) + indéfinis
// - RAD : séries (primitives) + nettoyage du bruit d'arrondi de π
//         (sin(π) = 1E-100 -> 0)
// - réciproques : valeurs exactes en DEG pour 0, ±1/2, ±1

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Zero;

use super::decimal::{Decimal, Politique};
use super::erreurs::{Erreur, Resultat};
use super::primitives;

const GARDE: u32 = 10;

/// Au-delà, la réduction d'angle n'a plus de sens (anti-gel).
const ORDRE_ANGLE_MAX: i64 = 10_000;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum UniteAngle {
    Deg,
    #[default]
    Rad,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrigFn {
    Sin,
    Cos,
    Tan,
}

impl TrigFn {
    fn nom(self) -> &'static str {
        match self {
            TrigFn::Sin => "sin",
            TrigFn::Cos => "cos",
            TrigFn::Tan => "tan",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrigOutcome {
    Valeur(Decimal),
    Indefini,
}

/// Reconnaît les angles spéciaux (en degrés entiers) de sin/cos/tan.
///
/// Retour:
/// - Some(Valeur(v)) si la valeur est rationnelle (0, ±1/2, ±1)
/// - Some(Indefini) pour tan(90°), tan(270°)
/// - None sinon (calcul numérique)
pub fn trig_special_deg(degres: i64, f: TrigFn) -> Option<TrigOutcome> {
    let a = degres.rem_euclid(360);

    let zero = || TrigOutcome::Valeur(Decimal::zero());
    let un = || TrigOutcome::Valeur(Decimal::un());
    let moins_un = || TrigOutcome::Valeur(Decimal::from(-1));
    let demi = || TrigOutcome::Valeur(Decimal::brut(BigInt::from(5), 1));
    let moins_demi = || TrigOutcome::Valeur(Decimal::brut(BigInt::from(-5), 1));

    let out = match f {
        TrigFn::Sin => match a {
            0 | 180 => zero(),
            30 | 150 => demi(),
            210 | 330 => moins_demi(),
            90 => un(),
            270 => moins_un(),
            _ => return None,
        },

        TrigFn::Cos => match a {
            0 => un(),
            180 => moins_un(),
            60 | 300 => demi(),
            120 | 240 => moins_demi(),
            90 | 270 => zero(),
            _ => return None,
        },

        TrigFn::Tan => match a {
            0 | 180 => zero(),
            45 | 225 => un(),
            135 | 315 => moins_un(),
            90 | 270 => TrigOutcome::Indefini,
            _ => return None,
        },
    };

    Some(out)
}

/* ------------------------ Outils ------------------------ */

/// r mod periode, dans [0, periode).
fn reduire_modulo(r: &BigRational, periode: i64) -> BigRational {
    if r.is_zero() {
        return BigRational::zero();
    }

    // denom > 0 (num_rational)
    let d = r.denom().clone();
    let m = BigInt::from(periode) * &d;
    let reste = ((r.numer() % &m) + &m) % &m;
    BigRational::new(reste, d)
}

fn garde_angle(x: &Decimal) -> Resultat<()> {
    if x.ordre() > ORDRE_ANGLE_MAX {
        return Err(Erreur::domaine("argument trigonométrique trop grand"));
    }
    Ok(())
}

/// Angle en degrés ramené exactement dans [0, 360).
fn reduire_degres(x: &Decimal, travail: Politique) -> Resultat<Decimal> {
    garde_angle(x)?;
    let r = reduire_modulo(&x.vers_rationnel(), 360);
    Decimal::depuis_rationnel(&r, travail)
}

fn degres_vers_radians(d: &Decimal, travail: Politique) -> Resultat<Decimal> {
    d.multiplier(&primitives::pi(travail), travail)
        .diviser(&Decimal::from(180), travail)
}

fn radians_vers_unite(r: &Decimal, unite: UniteAngle, politique: Politique) -> Resultat<Decimal> {
    match unite {
        UniteAngle::Rad => Ok(r.arrondir(politique)),
        UniteAngle::Deg => {
            let travail = politique.avec_garde(GARDE);
            Ok(r
                .multiplier(&Decimal::from(180), travail)
                .diviser(&primitives::pi(travail), travail)?
                .arrondir(politique))
        }
    }
}

/// Quart de tour : 90° ou π/2.
fn quart_de_tour(unite: UniteAngle, politique: Politique) -> Resultat<Decimal> {
    match unite {
        UniteAngle::Deg => Ok(Decimal::from(90)),
        UniteAngle::Rad => primitives::pi(politique.avec_garde(GARDE))
            .diviser(&Decimal::from(2), politique),
    }
}

/// Résultat sous le bruit d'arrondi de l'argument (|x| >= 1 seulement) : zéro.
fn nettoyer(v: Decimal, x: &Decimal, politique: Politique) -> Decimal {
    if v.is_zero() || x.ordre() < 0 {
        return v;
    }
    let seuil = x.ordre() - i64::from(politique.precision()) + 3;
    if v.ordre() < seuil {
        Decimal::zero()
    } else {
        v
    }
}

fn indefini(f: &str) -> Erreur {
    Erreur::domaine(format!("{f} indéfini pour cet angle"))
}

/// Table exacte si l'angle (en degrés) est entier et spécial.
fn special(x: &Decimal, unite: UniteAngle, f: TrigFn, travail: Politique) -> Resultat<Option<TrigOutcome>> {
    if unite != UniteAngle::Deg {
        return Ok(None);
    }
    let reduit = reduire_degres(x, travail)?;
    Ok(reduit.vers_i64().and_then(|deg| trig_special_deg(deg, f)))
}

/// Argument en radians (réduit exactement modulo 360° en DEG).
fn en_radians(x: &Decimal, unite: UniteAngle, travail: Politique) -> Resultat<Decimal> {
    match unite {
        UniteAngle::Rad => Ok(x.clone()),
        UniteAngle::Deg => degres_vers_radians(&reduire_degres(x, travail)?, travail),
    }
}

/* ------------------------ API ------------------------ */

pub fn trig(f: TrigFn, x: &Decimal, unite: UniteAngle, politique: Politique) -> Resultat<Decimal> {
    let travail = politique.avec_garde(GARDE);

    match special(x, unite, f, travail)? {
        Some(TrigOutcome::Valeur(v)) => return Ok(v.arrondir(politique)),
        Some(TrigOutcome::Indefini) => return Err(indefini(f.nom())),
        None => {}
    }

    let r = en_radians(x, unite, travail)?;
    let v = match f {
        TrigFn::Sin => nettoyer(primitives::sin(&r, travail)?, &r, politique),
        TrigFn::Cos => nettoyer(primitives::cos(&r, travail)?, &r, politique),
        TrigFn::Tan => {
            let c = nettoyer(primitives::cos(&r, travail)?, &r, politique);
            if c.is_zero() {
                return Err(indefini("tan"));
            }
            let s = nettoyer(primitives::sin(&r, travail)?, &r, politique);
            s.diviser(&c, travail)?
        }
    };

    Ok(v.arrondir(politique))
}

pub fn sin(x: &Decimal, unite: UniteAngle, politique: Politique) -> Resultat<Decimal> {
    trig(TrigFn::Sin, x, unite, politique)
}

pub fn cos(x: &Decimal, unite: UniteAngle, politique: Politique) -> Resultat<Decimal> {
    trig(TrigFn::Cos, x, unite, politique)
}

pub fn tan(x: &Decimal, unite: UniteAngle, politique: Politique) -> Resultat<Decimal> {
    trig(TrigFn::Tan, x, unite, politique)
}

/// cot = 1/tan ; cot(90°) = 0, cot(0) indéfini.
pub fn cot(x: &Decimal, unite: UniteAngle, politique: Politique) -> Resultat<Decimal> {
    let travail = politique.avec_garde(GARDE);

    match special(x, unite, TrigFn::Tan, travail)? {
        Some(TrigOutcome::Indefini) => return Ok(Decimal::zero()),
        Some(TrigOutcome::Valeur(t)) if t.is_zero() => return Err(indefini("cot")),
        Some(TrigOutcome::Valeur(t)) => return Decimal::un().diviser(&t, politique),
        None => {}
    }

    let r = en_radians(x, unite, travail)?;
    let s = nettoyer(primitives::sin(&r, travail)?, &r, politique);
    if s.is_zero() {
        return Err(indefini("cot"));
    }
    let c = nettoyer(primitives::cos(&r, travail)?, &r, politique);
    Ok(c.diviser(&s, travail)?.arrondir(politique))
}

/* ------------------------ Réciproques ------------------------ */

/// Valeurs exactes (degrés) des réciproques en 0, ±1/2, ±1.
fn inverse_exacte_deg(f: TrigFn, x: &Decimal) -> Option<Decimal> {
    // (2x, résultat en degrés)
    let table: &[(i64, i64)] = match f {
        TrigFn::Sin => &[(0, 0), (1, 30), (-1, -30), (2, 90), (-2, -90)],
        TrigFn::Cos => &[(2, 0), (1, 60), (0, 90), (-1, 120), (-2, 180)],
        TrigFn::Tan => &[(0, 0), (2, 45), (-2, -45)],
    };
    let double = Decimal::brut(x.mantisse() * 2u32, x.echelle()).vers_i64()?;
    table
        .iter()
        .find(|(d, _)| *d == double)
        .map(|(_, deg)| Decimal::from(*deg))
}

fn hors_intervalle(f: &str) -> Erreur {
    Erreur::domaine(format!("{f} hors de [-1, 1]"))
}

/// asin en radians, |x| <= 1 déjà vérifié.
fn asin_rad(x: &Decimal, travail: Politique) -> Resultat<Decimal> {
    let un = Decimal::un();
    if x.abs() == un {
        let demi_pi = quart_de_tour(UniteAngle::Rad, travail)?;
        return Ok(if x.est_negatif() { demi_pi.neg() } else { demi_pi });
    }
    // asin x = atan(x / √(1-x²))
    let rac = primitives::racine(&un.soustraire(&x.multiplier(x, travail), travail), 2, travail)?;
    primitives::atan(&x.diviser(&rac, travail)?, travail)
}

pub fn asin(x: &Decimal, unite: UniteAngle, politique: Politique) -> Resultat<Decimal> {
    if x.abs() > Decimal::un() {
        return Err(hors_intervalle("asin"));
    }
    if unite == UniteAngle::Deg {
        if let Some(d) = inverse_exacte_deg(TrigFn::Sin, x) {
            return Ok(d);
        }
    }
    let travail = politique.avec_garde(GARDE);
    radians_vers_unite(&asin_rad(x, travail)?, unite, politique)
}

pub fn acos(x: &Decimal, unite: UniteAngle, politique: Politique) -> Resultat<Decimal> {
    if x.abs() > Decimal::un() {
        return Err(hors_intervalle("acos"));
    }
    if unite == UniteAngle::Deg {
        if let Some(d) = inverse_exacte_deg(TrigFn::Cos, x) {
            return Ok(d);
        }
    }
    let travail = politique.avec_garde(GARDE);
    let r = quart_de_tour(UniteAngle::Rad, travail)?.soustraire(&asin_rad(x, travail)?, travail);
    radians_vers_unite(&r, unite, politique)
}

pub fn atan(x: &Decimal, unite: UniteAngle, politique: Politique) -> Resultat<Decimal> {
    if unite == UniteAngle::Deg {
        if let Some(d) = inverse_exacte_deg(TrigFn::Tan, x) {
            return Ok(d);
        }
    }
    let travail = politique.avec_garde(GARDE);
    radians_vers_unite(&primitives::atan(x, travail)?, unite, politique)
}

/// acot x = atan(1/x) ; acot(0) = quart de tour.
pub fn acot(x: &Decimal, unite: UniteAngle, politique: Politique) -> Resultat<Decimal> {
    if x.is_zero() {
        return quart_de_tour(unite, politique);
    }
    let travail = politique.avec_garde(GARDE);
    atan(&Decimal::un().diviser(x, travail)?, unite, politique)
}

/// Angle du point (x, y), dans ]-demi-tour, demi-tour].
pub fn atan2(y: &Decimal, x: &Decimal, unite: UniteAngle, politique: Politique) -> Resultat<Decimal> {
    let travail = politique.avec_garde(GARDE);

    if x.is_zero() {
        return match y.signum() {
            0 => Err(Erreur::domaine("atan2(0, 0) indéfini")),
            s => {
                let q = quart_de_tour(unite, politique)?;
                Ok(if s < 0 { q.neg() } else { q })
            }
        };
    }

    let base = atan(&y.diviser(x, travail)?, unite, travail)?;
    if x.signum() > 0 {
        return Ok(base.arrondir(politique));
    }

    let demi_tour = quart_de_tour(unite, travail)?.multiplier(&Decimal::from(2), travail);
    let r = if y.est_negatif() {
        base.soustraire(&demi_tour, travail)
    } else {
        base.additionner(&demi_tour, travail)
    };
    Ok(r.arrondir(politique))
}
