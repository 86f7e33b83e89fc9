// src/noyau/fonctions.rs
//
// Actions sémantiques des symboles (pointeurs de fonction rangés dans la table).
//
// Convention : chaque action reçoit les Reglages du moteur (politique, angle) et rend
// un résultat arrondi à la politique. Le domaine est vérifié ici, au plus près de
// l'utilisateur : les messages d'erreur nomment la fonction.

use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};
use rand::Rng;

use super::decimal::{Arrondi, Decimal, Politique, PRECISION_MAX};
use super::erreurs::{Erreur, Resultat};
use super::primitives;
use super::reglages::Reglages;
use super::trig;

const GARDE: u32 = 10;

/// Garde-fou des produits combinatoires (nCr, nPr) : nombre de facteurs.
const FACTEURS_MAX: i64 = 100_000;

/* ------------------------ Constantes ------------------------ */

pub(crate) fn pi(r: &Reglages) -> Decimal {
    primitives::pi(r.politique)
}

pub(crate) fn e(r: &Reglages) -> Decimal {
    // exp(1) ne peut pas échouer (argument fixe et petit)
    primitives::exp(&Decimal::un(), r.politique).unwrap_or_else(|_| Decimal::un())
}

/* ------------------------ Opérateurs ------------------------ */

pub(crate) fn plus(a: &Decimal, b: &Decimal, r: &Reglages) -> Resultat<Decimal> {
    Ok(a.additionner(b, r.politique))
}

pub(crate) fn moins(a: &Decimal, b: &Decimal, r: &Reglages) -> Resultat<Decimal> {
    Ok(a.soustraire(b, r.politique))
}

pub(crate) fn fois(a: &Decimal, b: &Decimal, r: &Reglages) -> Resultat<Decimal> {
    Ok(a.multiplier(b, r.politique))
}

pub(crate) fn divise(a: &Decimal, b: &Decimal, r: &Reglages) -> Resultat<Decimal> {
    a.diviser(b, r.politique)
}

pub(crate) fn modulo(a: &Decimal, b: &Decimal, r: &Reglages) -> Resultat<Decimal> {
    a.reste(b, r.politique)
}

pub(crate) fn puissance(a: &Decimal, b: &Decimal, r: &Reglages) -> Resultat<Decimal> {
    a.puissance(b, r.politique)
}

pub(crate) fn factorielle(x: &Decimal, r: &Reglages) -> Resultat<Decimal> {
    x.factorielle(r.politique)
}

pub(crate) fn neg(x: &Decimal, _r: &Reglages) -> Resultat<Decimal> {
    Ok(x.neg())
}

/* ------------------------ Élémentaires ------------------------ */

pub(crate) fn abs(x: &Decimal, _r: &Reglages) -> Resultat<Decimal> {
    Ok(x.abs())
}

pub(crate) fn plancher(x: &Decimal, _r: &Reglages) -> Resultat<Decimal> {
    Ok(x.arrondir_entier(Arrondi::Floor))
}

pub(crate) fn plafond(x: &Decimal, _r: &Reglages) -> Resultat<Decimal> {
    Ok(x.arrondir_entier(Arrondi::Ceiling))
}

pub(crate) fn arrondi(x: &Decimal, _r: &Reglages) -> Resultat<Decimal> {
    Ok(x.arrondir_entier(Arrondi::HalfUp))
}

/// Partie fractionnaire, du signe de x (x - trunc(x)).
pub(crate) fn frac(x: &Decimal, r: &Reglages) -> Resultat<Decimal> {
    let t = x.arrondir_entier(Arrondi::Down);
    Ok(x.soustraire(&t, r.politique))
}

pub(crate) fn signe(x: &Decimal, _r: &Reglages) -> Resultat<Decimal> {
    Ok(Decimal::from(i64::from(x.signum())))
}

/* ------------------------ Racines ------------------------ */

pub(crate) fn racine_carree(x: &Decimal, r: &Reglages) -> Resultat<Decimal> {
    primitives::racine(x, 2, r.politique)
}

pub(crate) fn racine_cubique(x: &Decimal, r: &Reglages) -> Resultat<Decimal> {
    primitives::racine(x, 3, r.politique)
}

/// rootn(a; n) : racine n-ième ; n entier négatif = inverse ; n non entier via exp/ln (a > 0).
pub(crate) fn racine_n(a: &Decimal, n: &Decimal, r: &Reglages) -> Resultat<Decimal> {
    if n.is_zero() {
        return Err(Erreur::domaine("rootn : ordre nul"));
    }
    let pol = r.politique;
    let travail = pol.avec_garde(GARDE);

    if let Some(k) = n.vers_i64() {
        let ordre = u32::try_from(k.unsigned_abs())
            .map_err(|_| Erreur::domaine("rootn : ordre trop grand"))?;
        let rac = primitives::racine(a, ordre, travail)?;
        return if k < 0 {
            Decimal::un().diviser(&rac, pol)
        } else {
            Ok(rac.arrondir(pol))
        };
    }

    if a.est_negatif() {
        return Err(Erreur::domaine("rootn : ordre non entier d'un nombre négatif"));
    }
    if a.is_zero() {
        return Ok(Decimal::zero());
    }
    let ln_a = primitives::ln(a, travail)?;
    primitives::exp(&ln_a.diviser(n, travail)?, pol)
}

/* ------------------------ Logarithmes ------------------------ */

/// k si x = 10^k exactement.
fn exposant_dix(x: &Decimal) -> Option<i64> {
    if x.signum() <= 0 {
        return None;
    }
    let mut m = x.mantisse().clone();
    while (&m % 10u32).is_zero() {
        m /= 10u32;
    }
    m.is_one().then(|| x.ordre())
}

/// k si x = 2^k exactement (k peut être négatif : 0.125 = 2^-3).
fn exposant_deux(x: &Decimal) -> Option<i64> {
    if x.signum() <= 0 {
        return None;
    }
    let est_puissance_de_deux = |n: &BigInt| n.is_positive() && (n & &(n - 1u32)).is_zero();

    if x.est_entier() {
        let n = x.partie_entiere();
        return est_puissance_de_deux(&n).then(|| n.bits() as i64 - 1);
    }

    // 2^-k = 5^k · 10^-k
    let t = x.trim();
    let k = t.echelle();
    let cinq_k = BigInt::from(5u32).pow(u32::try_from(k).ok()?);
    (*t.mantisse() == cinq_k).then_some(-k)
}

pub(crate) fn ln(x: &Decimal, r: &Reglages) -> Resultat<Decimal> {
    primitives::ln(x, r.politique)
}

pub(crate) fn exp(x: &Decimal, r: &Reglages) -> Resultat<Decimal> {
    primitives::exp(x, r.politique)
}

fn log_base(x: &Decimal, ln_base: &Decimal, r: &Reglages) -> Resultat<Decimal> {
    let travail = r.politique.avec_garde(GARDE);
    primitives::ln(x, travail)?.diviser(ln_base, r.politique)
}

pub(crate) fn log10(x: &Decimal, r: &Reglages) -> Resultat<Decimal> {
    if let Some(k) = exposant_dix(x) {
        return Ok(Decimal::from(k));
    }
    log_base(x, &primitives::ln10(r.politique.avec_garde(GARDE)), r)
}

pub(crate) fn log2(x: &Decimal, r: &Reglages) -> Resultat<Decimal> {
    if let Some(k) = exposant_deux(x) {
        return Ok(Decimal::from(k));
    }
    log_base(x, &primitives::ln2(r.politique.avec_garde(GARDE)), r)
}

/// logbase(x; b) = ln x / ln b, b > 0 et b != 1.
pub(crate) fn logbase(x: &Decimal, b: &Decimal, r: &Reglages) -> Resultat<Decimal> {
    if b.signum() <= 0 || *b == Decimal::un() {
        return Err(Erreur::domaine("logbase : base invalide"));
    }
    let travail = r.politique.avec_garde(GARDE);
    log_base(x, &primitives::ln(b, travail)?, r)
}

/* ------------------------ Trigonométrie ------------------------ */

pub(crate) fn sin(x: &Decimal, r: &Reglages) -> Resultat<Decimal> {
    trig::sin(x, r.angle, r.politique)
}

pub(crate) fn cos(x: &Decimal, r: &Reglages) -> Resultat<Decimal> {
    trig::cos(x, r.angle, r.politique)
}

pub(crate) fn tan(x: &Decimal, r: &Reglages) -> Resultat<Decimal> {
    trig::tan(x, r.angle, r.politique)
}

pub(crate) fn cot(x: &Decimal, r: &Reglages) -> Resultat<Decimal> {
    trig::cot(x, r.angle, r.politique)
}

pub(crate) fn asin(x: &Decimal, r: &Reglages) -> Resultat<Decimal> {
    trig::asin(x, r.angle, r.politique)
}

pub(crate) fn acos(x: &Decimal, r: &Reglages) -> Resultat<Decimal> {
    trig::acos(x, r.angle, r.politique)
}

pub(crate) fn atan(x: &Decimal, r: &Reglages) -> Resultat<Decimal> {
    trig::atan(x, r.angle, r.politique)
}

pub(crate) fn acot(x: &Decimal, r: &Reglages) -> Resultat<Decimal> {
    trig::acot(x, r.angle, r.politique)
}

pub(crate) fn atan2(y: &Decimal, x: &Decimal, r: &Reglages) -> Resultat<Decimal> {
    trig::atan2(y, x, r.angle, r.politique)
}

/* ------------------------ Hyperboliques ------------------------ */

/// |x| < 10^-précision : les termes d'ordre 2 et plus tombent sous la précision.
fn sous_la_precision(x: &Decimal, r: &Reglages) -> bool {
    !x.is_zero() && x.ordre() < -i64::from(r.politique.precision())
}

/// Chiffres de garde contre l'annulation près de 0, bornés par la précision maximale.
fn garde_annulation(x: &Decimal) -> u32 {
    GARDE + (-x.ordre()).clamp(0, i64::from(PRECISION_MAX)) as u32
}

/// (e^x, e^-x) avec assez de garde pour l'annulation près de 0.
fn exp_pm(x: &Decimal, r: &Reglages) -> Resultat<(Decimal, Decimal, Politique)> {
    let travail = r.politique.avec_garde(garde_annulation(x));
    let ep = primitives::exp(x, travail)?;
    let em = Decimal::un().diviser(&ep, travail)?;
    Ok((ep, em, travail))
}

pub(crate) fn sinh(x: &Decimal, r: &Reglages) -> Resultat<Decimal> {
    if x.is_zero() {
        return Ok(Decimal::zero());
    }
    // sinh x = x + x³/6 + ...
    if sous_la_precision(x, r) {
        return Ok(x.arrondir(r.politique));
    }
    let (ep, em, travail) = exp_pm(x, r)?;
    ep.soustraire(&em, travail).diviser(&Decimal::from(2), r.politique)
}

pub(crate) fn cosh(x: &Decimal, r: &Reglages) -> Resultat<Decimal> {
    if sous_la_precision(x, r) {
        return Ok(Decimal::un());
    }
    let (ep, em, travail) = exp_pm(x, r)?;
    ep.additionner(&em, travail).diviser(&Decimal::from(2), r.politique)
}

pub(crate) fn tanh(x: &Decimal, r: &Reglages) -> Resultat<Decimal> {
    if x.is_zero() {
        return Ok(Decimal::zero());
    }
    if sous_la_precision(x, r) {
        return Ok(x.arrondir(r.politique));
    }
    let (ep, em, travail) = exp_pm(x, r)?;
    ep.soustraire(&em, travail)
        .diviser(&ep.additionner(&em, travail), r.politique)
}

pub(crate) fn coth(x: &Decimal, r: &Reglages) -> Resultat<Decimal> {
    if x.is_zero() {
        return Err(Erreur::domaine("coth(0) indéfini"));
    }
    // coth x = 1/x + x/3 - ...
    if sous_la_precision(x, r) {
        return Decimal::un().diviser(x, r.politique);
    }
    let (ep, em, travail) = exp_pm(x, r)?;
    ep.additionner(&em, travail)
        .diviser(&ep.soustraire(&em, travail), r.politique)
}

pub(crate) fn asinh(x: &Decimal, r: &Reglages) -> Resultat<Decimal> {
    if x.is_zero() {
        return Ok(Decimal::zero());
    }
    if sous_la_precision(x, r) {
        return Ok(x.arrondir(r.politique));
    }
    // sign(x)·ln(|x| + √(x²+1))
    let travail = r.politique.avec_garde(garde_annulation(x) * 2);
    let ax = x.abs();
    let rac = primitives::racine(
        &ax.multiplier(&ax, travail).additionner(&Decimal::un(), travail),
        2,
        travail,
    )?;
    let v = primitives::ln(&ax.additionner(&rac, travail), r.politique)?;
    Ok(if x.est_negatif() { v.neg() } else { v })
}

pub(crate) fn acosh(x: &Decimal, r: &Reglages) -> Resultat<Decimal> {
    let un = Decimal::un();
    if *x < un {
        return Err(Erreur::domaine("acosh : argument inférieur à 1"));
    }
    let travail = r.politique.avec_garde(GARDE);
    let rac = primitives::racine(&x.multiplier(x, travail).soustraire(&un, travail), 2, travail)?;
    primitives::ln(&x.additionner(&rac, travail), r.politique)
}

/// ½·ln((1+x)/(1-x)), |x| < 1.
pub(crate) fn atanh(x: &Decimal, r: &Reglages) -> Resultat<Decimal> {
    let un = Decimal::un();
    if x.abs() >= un {
        return Err(Erreur::domaine("atanh : argument hors de ]-1, 1["));
    }
    if x.is_zero() {
        return Ok(Decimal::zero());
    }
    if sous_la_precision(x, r) {
        return Ok(x.arrondir(r.politique));
    }
    let travail = r.politique.avec_garde(garde_annulation(x));
    let q = un
        .additionner(x, travail)
        .diviser(&un.soustraire(x, travail), travail)?;
    primitives::ln(&q, travail)?.diviser(&Decimal::from(2), r.politique)
}

/// ½·ln((x+1)/(x-1)), |x| > 1.
pub(crate) fn acoth(x: &Decimal, r: &Reglages) -> Resultat<Decimal> {
    let un = Decimal::un();
    if x.abs() <= un {
        return Err(Erreur::domaine("acoth : argument dans [-1, 1]"));
    }
    let travail = r.politique.avec_garde(GARDE);
    let q = x
        .additionner(&un, travail)
        .diviser(&x.soustraire(&un, travail), travail)?;
    primitives::ln(&q, travail)?.diviser(&Decimal::from(2), r.politique)
}

/* ------------------------ Fonctions spéciales ------------------------ */

pub(crate) fn gamma(x: &Decimal, r: &Reglages) -> Resultat<Decimal> {
    primitives::gamma(x, r.politique)
}

/// B(x; y) = Γ(x)·Γ(y) / Γ(x+y) ; 0 si x+y est un pôle de Γ.
pub(crate) fn beta(x: &Decimal, y: &Decimal, r: &Reglages) -> Resultat<Decimal> {
    let travail = r.politique.avec_garde(GARDE);
    let gx = primitives::gamma(x, travail)?;
    let gy = primitives::gamma(y, travail)?;
    let somme = x.additionner(y, travail);
    if somme.est_entier() && somme.signum() <= 0 {
        return Ok(Decimal::zero());
    }
    let gs = primitives::gamma(&somme, travail)?;
    gx.multiplier(&gy, travail).diviser(&gs, r.politique)
}

/* ------------------------ Combinatoire / arithmétique ------------------------ */

fn entier_naturel(x: &Decimal, f: &str) -> Resultat<i64> {
    match x.vers_i64() {
        Some(n) if n >= 0 => Ok(n),
        _ => Err(Erreur::domaine(format!("{f} : entier positif attendu"))),
    }
}

fn entier(x: &Decimal, f: &str) -> Resultat<BigInt> {
    if !x.est_entier() {
        return Err(Erreur::domaine(format!("{f} : entier attendu")));
    }
    Ok(x.partie_entiere())
}

/// Produit (n-r+1)·…·n, r facteurs.
fn produit_descendant(n: i64, r: i64) -> BigInt {
    (0..r).fold(BigInt::one(), |acc, i| acc * BigInt::from(n - i))
}

pub(crate) fn combinaisons(n: &Decimal, k: &Decimal, r: &Reglages) -> Resultat<Decimal> {
    let n = entier_naturel(n, "nCr")?;
    let k = entier_naturel(k, "nCr")?;
    if k > n {
        return Ok(Decimal::zero());
    }
    let k = k.min(n - k);
    if k > FACTEURS_MAX {
        return Err(Erreur::domaine("nCr : arguments trop grands"));
    }
    let num = produit_descendant(n, k);
    let den = produit_descendant(k, k);
    Ok(Decimal::from(num / den).arrondir(r.politique))
}

pub(crate) fn arrangements(n: &Decimal, k: &Decimal, r: &Reglages) -> Resultat<Decimal> {
    let n = entier_naturel(n, "nPr")?;
    let k = entier_naturel(k, "nPr")?;
    if k > n {
        return Ok(Decimal::zero());
    }
    if k > FACTEURS_MAX {
        return Err(Erreur::domaine("nPr : arguments trop grands"));
    }
    Ok(Decimal::from(produit_descendant(n, k)).arrondir(r.politique))
}

fn pgcd_entiers(a: &BigInt, b: &BigInt) -> BigInt {
    let mut a = a.abs();
    let mut b = b.abs();
    while !b.is_zero() {
        let t = &a % &b;
        a = b;
        b = t;
    }
    a
}

pub(crate) fn pgcd(a: &Decimal, b: &Decimal, r: &Reglages) -> Resultat<Decimal> {
    let (a, b) = (entier(a, "GCD")?, entier(b, "GCD")?);
    Ok(Decimal::from(pgcd_entiers(&a, &b)).arrondir(r.politique))
}

pub(crate) fn ppcm(a: &Decimal, b: &Decimal, r: &Reglages) -> Resultat<Decimal> {
    let (a, b) = (entier(a, "LCM")?, entier(b, "LCM")?);
    if a.is_zero() || b.is_zero() {
        return Ok(Decimal::zero());
    }
    let g = pgcd_entiers(&a, &b);
    Ok(Decimal::from((a * b).abs() / g).arrondir(r.politique))
}

/// Entier uniforme dans [min, max].
pub(crate) fn entier_aleatoire(min: &Decimal, max: &Decimal, _r: &Reglages) -> Resultat<Decimal> {
    let (a, b) = match (min.vers_i64(), max.vers_i64()) {
        (Some(a), Some(b)) => (a, b),
        _ => return Err(Erreur::domaine("RandInt : bornes entières attendues")),
    };
    if a > b {
        return Err(Erreur::domaine("RandInt : min > max"));
    }
    Ok(Decimal::from(rand::thread_rng().gen_range(a..=b)))
}

/* ------------------------ Coordonnées ------------------------ */

/// Pol(x; y) -> (r; θ)
pub(crate) fn polaire(x: &Decimal, y: &Decimal, r: &Reglages) -> Resultat<(Decimal, Decimal)> {
    let travail = r.politique.avec_garde(GARDE);
    let module = primitives::racine(
        &x.multiplier(x, travail).additionner(&y.multiplier(y, travail), travail),
        2,
        r.politique,
    )?;
    if module.is_zero() {
        return Ok((module, Decimal::zero()));
    }
    let angle = trig::atan2(y, x, r.angle, r.politique)?;
    Ok((module, angle))
}

/// Rec(r; θ) -> (x; y)
pub(crate) fn cartesien(module: &Decimal, angle: &Decimal, r: &Reglages) -> Resultat<(Decimal, Decimal)> {
    let travail = r.politique.avec_garde(GARDE);
    let c = trig::cos(angle, r.angle, travail)?;
    let s = trig::sin(angle, r.angle, travail)?;
    Ok((
        module.multiplier(&c, r.politique),
        module.multiplier(&s, r.politique),
    ))
}

/* ------------------------ Agrégats ------------------------ */

fn non_vide<'a>(xs: &'a [Decimal], f: &str) -> Resultat<&'a [Decimal]> {
    if xs.is_empty() {
        return Err(Erreur::syntaxe_globale(format!("{f} : au moins un argument attendu")));
    }
    Ok(xs)
}

pub(crate) fn somme(xs: &[Decimal], r: &Reglages) -> Resultat<Decimal> {
    let xs = non_vide(xs, "sum")?;
    let travail = r.politique.avec_garde(GARDE);
    let s = xs
        .iter()
        .fold(Decimal::zero(), |acc, x| acc.additionner(x, travail));
    Ok(s.arrondir(r.politique))
}

pub(crate) fn moyenne(xs: &[Decimal], r: &Reglages) -> Resultat<Decimal> {
    let xs = non_vide(xs, "avg")?;
    let travail = r.politique.avec_garde(GARDE);
    let s = somme(xs, &Reglages { politique: travail, ..*r })?;
    s.diviser(&Decimal::from(xs.len() as i64), r.politique)
}

pub(crate) fn mediane(xs: &[Decimal], r: &Reglages) -> Resultat<Decimal> {
    let xs = non_vide(xs, "median")?;
    let mut tries = xs.to_vec();
    tries.sort();
    let n = tries.len();
    if n % 2 == 1 {
        return Ok(tries[n / 2].arrondir(r.politique));
    }
    let travail = r.politique.avec_garde(GARDE);
    tries[n / 2 - 1]
        .additionner(&tries[n / 2], travail)
        .diviser(&Decimal::from(2), r.politique)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noyau::locale::Locale;
    use crate::noyau::trig::UniteAngle;

    fn reg() -> Reglages {
        Reglages::default().avec_precision(30)
    }

    fn d(s: &str) -> Decimal {
        Decimal::parse(s, Locale::neutre(), reg().politique).unwrap()
    }

    #[test]
    fn logarithmes_exacts() {
        assert_eq!(log10(&d("1000"), &reg()).unwrap(), d("3"));
        assert_eq!(log10(&d("0.001"), &reg()).unwrap(), d("-3"));
        assert_eq!(log2(&d("1024"), &reg()).unwrap(), d("10"));
        assert_eq!(log2(&d("0.125"), &reg()).unwrap(), d("-3"));
        assert!(log10(&d("0"), &reg()).is_err());
        assert!(log2(&d("-8"), &reg()).is_err());
    }

    #[test]
    fn logbase_et_domaine() {
        assert_eq!(logbase(&d("81"), &d("3"), &reg()).unwrap(), d("4"));
        assert!(logbase(&d("8"), &d("1"), &reg()).is_err());
        assert!(logbase(&d("8"), &d("-2"), &reg()).is_err());
    }

    #[test]
    fn racines() {
        assert_eq!(racine_n(&d("27"), &d("3"), &reg()).unwrap(), d("3"));
        assert_eq!(racine_n(&d("-32"), &d("5"), &reg()).unwrap(), d("-2"));
        assert_eq!(racine_n(&d("16"), &d("-2"), &reg()).unwrap(), d("0.25"));
        assert!(racine_n(&d("-16"), &d("4"), &reg()).is_err());
        assert!(racine_n(&d("16"), &d("0"), &reg()).is_err());
        assert_eq!(racine_cubique(&d("-8"), &reg()).unwrap(), d("-2"));
        assert!(racine_carree(&d("-1"), &reg()).is_err());
    }

    #[test]
    fn combinatoire() {
        assert_eq!(combinaisons(&d("5"), &d("2"), &reg()).unwrap(), d("10"));
        assert_eq!(combinaisons(&d("2"), &d("5"), &reg()).unwrap(), d("0"));
        assert_eq!(arrangements(&d("5"), &d("2"), &reg()).unwrap(), d("20"));
        assert!(combinaisons(&d("-5"), &d("2"), &reg()).is_err());
        assert!(arrangements(&d("5.5"), &d("2"), &reg()).is_err());
    }

    #[test]
    fn pgcd_ppcm() {
        assert_eq!(pgcd(&d("12"), &d("18"), &reg()).unwrap(), d("6"));
        assert_eq!(pgcd(&d("-12"), &d("18"), &reg()).unwrap(), d("6"));
        assert_eq!(ppcm(&d("4"), &d("6"), &reg()).unwrap(), d("12"));
        assert_eq!(ppcm(&d("0"), &d("6"), &reg()).unwrap(), d("0"));
        assert!(pgcd(&d("1.5"), &d("3"), &reg()).is_err());
    }

    #[test]
    fn aleatoire_dans_les_bornes() {
        for _ in 0..50 {
            let x = entier_aleatoire(&d("-3"), &d("3"), &reg()).unwrap();
            assert!(x >= d("-3") && x <= d("3"));
            assert!(x.est_entier());
        }
        assert_eq!(entier_aleatoire(&d("7"), &d("7"), &reg()).unwrap(), d("7"));
        assert!(entier_aleatoire(&d("3"), &d("1"), &reg()).is_err());
    }

    #[test]
    fn hyperboliques() {
        assert_eq!(sinh(&d("0"), &reg()).unwrap(), d("0"));
        assert_eq!(cosh(&d("0"), &reg()).unwrap(), d("1"));
        // sinh(1) = 1.17520119364380145688238185060
        assert_eq!(sinh(&d("1"), &reg()).unwrap(), d("1.17520119364380145688238185060"));
        let x = d("0.75");
        let aller_retour = asinh(&sinh(&x, &reg()).unwrap(), &reg()).unwrap();
        assert_eq!(aller_retour.arrondir(Reglages::default().avec_precision(25).politique), x);
        assert!(acosh(&d("0.5"), &reg()).is_err());
        assert!(atanh(&d("1"), &reg()).is_err());
        assert!(acoth(&d("0.5"), &reg()).is_err());
        assert!(coth(&d("0"), &reg()).is_err());
    }

    #[test]
    fn hyperboliques_arguments_minuscules() {
        // précision 30 : au-delà de 10^-30, le premier ordre suffit (et aucun calcul géant)
        let x = d("1e-900000");
        assert_eq!(sinh(&x, &reg()).unwrap(), x);
        assert_eq!(tanh(&x, &reg()).unwrap(), x);
        assert_eq!(asinh(&x, &reg()).unwrap(), x);
        assert_eq!(atanh(&x.neg(), &reg()).unwrap(), x.neg());
        assert_eq!(cosh(&x, &reg()).unwrap(), d("1"));
        assert_eq!(coth(&x, &reg()).unwrap(), d("1e900000"));

        // juste au-dessus du seuil : toujours la série, même résultat à 30 chiffres
        let y = d("1e-20");
        assert_eq!(sinh(&y, &reg()).unwrap(), y);
        assert_eq!(garde_annulation(&d("1e-900000")), GARDE + PRECISION_MAX);
    }

    #[test]
    fn coordonnees() {
        let r = reg().avec_angle(UniteAngle::Deg);
        let (m, a) = polaire(&d("3"), &d("4"), &r).unwrap();
        assert_eq!(m, d("5"));
        assert!(a > d("53.13") && a < d("53.14"));
        let (x, y) = cartesien(&d("2"), &d("90"), &r).unwrap();
        assert_eq!(x, d("0"));
        assert_eq!(y, d("2"));
    }

    #[test]
    fn agregats() {
        let xs = [d("3"), d("1"), d("4"), d("1"), d("5")];
        assert_eq!(somme(&xs, &reg()).unwrap(), d("14"));
        assert_eq!(moyenne(&xs, &reg()).unwrap(), d("2.8"));
        assert_eq!(mediane(&xs, &reg()).unwrap(), d("3"));
        assert_eq!(mediane(&xs[..4], &reg()).unwrap(), d("2"));
        assert!(moyenne(&[], &reg()).is_err());
    }

    #[test]
    fn beta_et_gamma() {
        // B(2; 3) = 1!·2!/4! = 1/12
        let attendu = d("1").diviser(&d("12"), reg().politique).unwrap();
        assert_eq!(beta(&d("2"), &d("3"), &reg()).unwrap(), attendu);
        assert_eq!(beta(&d("1.5"), &d("-1.5"), &reg()).unwrap(), d("0"));
        assert_eq!(gamma(&d("6"), &reg()).unwrap(), d("120"));
    }

    #[test]
    fn elementaires() {
        assert_eq!(frac(&d("-3.25"), &reg()).unwrap(), d("-0.25"));
        assert_eq!(plancher(&d("-3.25"), &reg()).unwrap(), d("-4"));
        assert_eq!(plafond(&d("3.25"), &reg()).unwrap(), d("4"));
        assert_eq!(arrondi(&d("2.5"), &reg()).unwrap(), d("3"));
        assert_eq!(signe(&d("-0.1"), &reg()).unwrap(), d("-1"));
    }
}
