// src/noyau/decimal.rs
//
// Décimal exact à précision arbitraire : valeur = mantisse × 10^(-echelle).
//
// - immuable : chaque opération rend un nouveau Decimal
// - égalité / ordre / hash : par VALEUR (1.50 == 1.5 == 15E-1)
// - chaque opération reçoit explicitement sa Politique (chiffres significatifs + arrondi)
// - la locale portée sert seulement au rendu (Display)

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

use super::erreurs::{Erreur, Resultat};
use super::format::format_decimal;
use super::locale::{est_nombre_valide, Locale};
use super::primitives;

/// Bornes de la précision (chiffres significatifs).
pub const PRECISION_MAX: u32 = 10_000;
pub const PRECISION_DEFAUT: u32 = 100;

/// Garde-fou : au-delà, la factorielle est refusée (anti-gel).
const FACTORIELLE_MAX: i64 = 100_000;

/// Plage des ordres de grandeur admis : |x| entre 10^-ORDRE_MAX et 10^(ORDRE_MAX+1).
/// Au-delà : erreur de domaine (dépassement), jamais un 10^n géant.
pub const ORDRE_MAX: i64 = 1_000_000;

/// Plus grand exposant accepté par `puissance_dix` (tient dans un u32).
const ECHELLE_MAX: u64 = u32::MAX as u64;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Arrondi {
    /// s'éloigne de zéro
    Up,
    /// vers zéro (troncature)
    Down,
    Ceiling,
    Floor,
    #[default]
    HalfUp,
    HalfDown,
    HalfEven,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Politique {
    precision: u32,
    arrondi: Arrondi,
}

impl Politique {
    pub fn new(precision: u32, arrondi: Arrondi) -> Self {
        Self {
            precision: precision.clamp(1, PRECISION_MAX),
            arrondi,
        }
    }

    pub fn precision(&self) -> u32 {
        self.precision
    }

    pub fn arrondi(&self) -> Arrondi {
        self.arrondi
    }

    /// Politique de travail des calculs intermédiaires : chiffres de garde, arrondi pair.
    pub fn avec_garde(&self, extra: u32) -> Self {
        Self {
            precision: self.precision.saturating_add(extra),
            arrondi: Arrondi::HalfEven,
        }
    }
}

impl Default for Politique {
    fn default() -> Self {
        Self::new(PRECISION_DEFAUT, Arrondi::HalfUp)
    }
}

/* ------------------------ Outils entiers ------------------------ */

/// 10^n. Les échelles restant dans ORDRE_MAX (plus la précision), n reste loin d'ECHELLE_MAX.
pub(crate) fn puissance_dix(n: u64) -> BigInt {
    debug_assert!(n <= ECHELLE_MAX, "10^{n} hors bornes");
    BigInt::from(10u32).pow(n.min(ECHELLE_MAX) as u32)
}

/// Nombre de chiffres décimaux de |n| (0 compte pour 1).
pub(crate) fn nb_chiffres(n: &BigInt) -> u64 {
    if n.is_zero() {
        return 1;
    }
    n.magnitude().to_str_radix(10).len() as u64
}

/// n / d arrondi selon le mode (d != 0).
pub(crate) fn diviser_arrondi(n: &BigInt, d: &BigInt, mode: Arrondi) -> BigInt {
    let q = n / d;
    let r = n % d;
    if r.is_zero() {
        return q;
    }

    // signe du quotient exact
    let positif = n.is_negative() == d.is_negative();

    let eloigner = match mode {
        Arrondi::Up => true,
        Arrondi::Down => false,
        Arrondi::Ceiling => positif,
        Arrondi::Floor => !positif,
        Arrondi::HalfUp | Arrondi::HalfDown | Arrondi::HalfEven => {
            let deux_r = r.abs() * 2u32;
            match deux_r.cmp(&d.abs()) {
                Ordering::Greater => true,
                Ordering::Less => false,
                Ordering::Equal => match mode {
                    Arrondi::HalfUp => true,
                    Arrondi::HalfDown => false,
                    _ => !(&q % 2u32).is_zero(),
                },
            }
        }
    };

    match (eloigner, positif) {
        (false, _) => q,
        (true, true) => q + 1u32,
        (true, false) => q - 1u32,
    }
}

/* ------------------------ Decimal ------------------------ */

#[derive(Clone, Debug)]
pub struct Decimal {
    mantisse: BigInt,
    echelle: i64,
    politique: Politique,
    locale: Locale,
}

impl Decimal {
    pub(crate) fn brut(mantisse: BigInt, echelle: i64) -> Self {
        Self {
            mantisse,
            echelle,
            politique: Politique::default(),
            locale: Locale::neutre(),
        }
    }

    pub fn zero() -> Self {
        Self::brut(BigInt::zero(), 0)
    }

    pub fn un() -> Self {
        Self::brut(BigInt::one(), 0)
    }

    pub fn mantisse(&self) -> &BigInt {
        &self.mantisse
    }

    pub fn echelle(&self) -> i64 {
        self.echelle
    }

    pub fn politique(&self) -> Politique {
        self.politique
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn avec_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    fn meme_contexte(mut self, modele: &Decimal, politique: Politique) -> Self {
        self.locale = modele.locale;
        self.politique = politique;
        self
    }

    pub fn is_zero(&self) -> bool {
        self.mantisse.is_zero()
    }

    pub fn est_negatif(&self) -> bool {
        self.mantisse.is_negative()
    }

    pub fn signum(&self) -> i32 {
        if self.mantisse.is_zero() {
            0
        } else if self.mantisse.is_negative() {
            -1
        } else {
            1
        }
    }

    pub fn neg(&self) -> Self {
        Self {
            mantisse: -&self.mantisse,
            ..self.clone()
        }
    }

    pub fn abs(&self) -> Self {
        Self {
            mantisse: self.mantisse.abs(),
            ..self.clone()
        }
    }

    /// Exposant décimal du premier chiffre significatif (floor(log10|x|)).
    /// Pour zéro, vaut -echelle (sans signification particulière).
    pub fn ordre(&self) -> i64 {
        (nb_chiffres(&self.mantisse) as i64 - 1).saturating_sub(self.echelle)
    }

    /// Ordre de grandeur hors de ±(ORDRE_MAX + marge) ?
    fn hors_bornes(&self, marge: i64) -> bool {
        !self.is_zero() && self.ordre().unsigned_abs() > (ORDRE_MAX + marge).unsigned_abs()
    }

    /// Refuse un nombre hors de la plage des ordres de grandeur admis.
    pub fn verifier_bornes(self) -> Resultat<Self> {
        if self.hors_bornes(0) {
            return Err(Erreur::domaine(format!(
                "dépassement de capacité (ordre de grandeur au-delà de 10^±{ORDRE_MAX})"
            )));
        }
        Ok(self)
    }

    pub fn est_entier(&self) -> bool {
        if self.echelle <= 0 || self.mantisse.is_zero() {
            return true;
        }
        // |x| < 1 et non nul : pas de 10^échelle géant à calculer
        if self.echelle as u64 >= nb_chiffres(&self.mantisse) {
            return false;
        }
        (&self.mantisse % puissance_dix(self.echelle as u64)).is_zero()
    }

    /// Partie entière (troncature vers zéro).
    pub fn partie_entiere(&self) -> BigInt {
        if self.mantisse.is_zero() {
            BigInt::zero()
        } else if self.echelle <= 0 {
            &self.mantisse * puissance_dix(self.echelle.unsigned_abs())
        } else if self.echelle as u64 >= nb_chiffres(&self.mantisse) {
            BigInt::zero()
        } else {
            &self.mantisse / puissance_dix(self.echelle as u64)
        }
    }

    /// Valeur entière exacte si elle tient dans un i64.
    pub fn vers_i64(&self) -> Option<i64> {
        if !self.est_entier() {
            return None;
        }
        // garde-fou : pas de 10^échelle géant pour un entier hors i64
        if self.ordre() > 19 {
            return None;
        }
        self.partie_entiere().to_i64()
    }

    pub fn vers_rationnel(&self) -> BigRational {
        if self.echelle <= 0 {
            BigRational::from_integer(self.partie_entiere())
        } else {
            BigRational::new(self.mantisse.clone(), puissance_dix(self.echelle as u64))
        }
    }

    pub fn depuis_rationnel(r: &BigRational, politique: Politique) -> Resultat<Self> {
        let n = Decimal::from(r.numer().clone());
        let d = Decimal::from(r.denom().clone());
        n.diviser(&d, politique)
    }

    /* ------------------------ Arrondis ------------------------ */

    /// Arrondit à `politique.precision()` chiffres significatifs.
    pub fn arrondir(&self, politique: Politique) -> Self {
        let nd = nb_chiffres(&self.mantisse);
        let p = u64::from(politique.precision());

        if nd <= p {
            return self.clone().meme_contexte(self, politique);
        }

        let retire = nd - p;
        let mut m = diviser_arrondi(&self.mantisse, &puissance_dix(retire), politique.arrondi());
        let mut echelle = self.echelle.saturating_sub(retire as i64);

        // 999.6 -> 1000 : un chiffre de trop, forcément un zéro final
        if nb_chiffres(&m) > p {
            m /= 10u32;
            echelle = echelle.saturating_sub(1);
        }

        Self::brut(m, echelle).meme_contexte(self, politique)
    }

    /// Arrondit à l'unité selon le mode (floor / ceil / round).
    pub fn arrondir_entier(&self, mode: Arrondi) -> Self {
        if self.echelle <= 0 {
            return self.clone();
        }
        let m = diviser_arrondi(&self.mantisse, &puissance_dix(self.echelle as u64), mode);
        Self::brut(m, 0).meme_contexte(self, self.politique)
    }

    /// Retire les zéros fractionnaires non significatifs (1.2500 -> 1.25 ; 100 reste 100).
    pub fn trim(&self) -> Self {
        if self.mantisse.is_zero() {
            return Self::brut(BigInt::zero(), 0).meme_contexte(self, self.politique);
        }
        let mut m = self.mantisse.clone();
        let mut e = self.echelle;
        while e > 0 && (&m % 10u32).is_zero() {
            m /= 10u32;
            e -= 1;
        }
        Self::brut(m, e).meme_contexte(self, self.politique)
    }

    /// Forme canonique complète (tous les zéros finaux retirés), pour le hash.
    fn normaliser(&self) -> (BigInt, i64) {
        if self.mantisse.is_zero() {
            return (BigInt::zero(), 0);
        }
        let mut m = self.mantisse.clone();
        let mut e = self.echelle;
        while (&m % 10u32).is_zero() {
            m /= 10u32;
            e -= 1;
        }
        (m, e)
    }

    /* ------------------------ Arithmétique ------------------------ */

    pub fn additionner(&self, autre: &Decimal, politique: Politique) -> Self {
        if autre.is_zero() {
            return self.arrondir(politique);
        }
        if self.is_zero() {
            return autre.arrondir(politique).meme_contexte(self, politique);
        }

        let (grand, petit) = if self.ordre() >= autre.ordre() {
            (self, autre)
        } else {
            (autre, self)
        };

        // Opérande négligeable : on le remplace par un "témoin" de même signe,
        // assez petit pour ne franchir aucune frontière d'arrondi.
        let seuil = (grand.ordre() - i64::from(politique.precision()) - 3).min(-grand.echelle - 1);
        let temoin;
        let petit = if petit.ordre() < seuil {
            temoin = Self::brut(BigInt::from(petit.signum()), -seuil);
            &temoin
        } else {
            petit
        };

        let (a, b, e) = aligner(grand, petit);
        Self::brut(a + b, e).arrondir(politique).meme_contexte(self, politique)
    }

    pub fn soustraire(&self, autre: &Decimal, politique: Politique) -> Self {
        self.additionner(&autre.neg(), politique)
    }

    pub fn multiplier(&self, autre: &Decimal, politique: Politique) -> Self {
        if self.is_zero() || autre.is_zero() {
            return Self::zero().meme_contexte(self, politique);
        }
        // échelle saturée : le résultat sort des bornes et sera refusé par verifier_bornes
        let echelle = self.echelle.saturating_add(autre.echelle);
        Self::brut(&self.mantisse * &autre.mantisse, echelle)
            .arrondir(politique)
            .meme_contexte(self, politique)
    }

    /// Division arrondie une seule fois à `precision` chiffres ; zéros finaux retirés.
    pub fn diviser(&self, autre: &Decimal, politique: Politique) -> Resultat<Self> {
        if autre.is_zero() {
            return Err(Erreur::domaine("division par zéro"));
        }
        if self.is_zero() {
            return Ok(Self::zero().meme_contexte(self, politique));
        }

        let p = i64::from(politique.precision());
        let da = nb_chiffres(&self.mantisse) as i64;
        let db = nb_chiffres(&autre.mantisse) as i64;

        // décalage pour un quotient de p (ou p+1) chiffres
        let mut decalage = p + db - da;
        loop {
            let (num, den) = if decalage >= 0 {
                (
                    &self.mantisse * puissance_dix(decalage as u64),
                    autre.mantisse.clone(),
                )
            } else {
                (
                    self.mantisse.clone(),
                    &autre.mantisse * puissance_dix(decalage.unsigned_abs()),
                )
            };

            if nb_chiffres(&(&num / &den)) as i64 > p {
                decalage -= 1;
                continue;
            }

            let q = diviser_arrondi(&num, &den, politique.arrondi());
            let echelle = self.echelle.saturating_sub(autre.echelle).saturating_add(decalage);
            return Ok(Self::brut(q, echelle)
                .arrondir(politique)
                .trim()
                .meme_contexte(self, politique));
        }
    }

    /// Reste de la division tronquée : a - b·trunc(a/b) (signe du dividende).
    ///
    /// Le dividende n'est jamais mis à l'échelle par un 10^n géant :
    /// (m·10^n) mod b = ((m mod b)·(10^n mod b)) mod b, avec 10^n mod b par exponentiation modulaire.
    pub fn reste(&self, autre: &Decimal, politique: Politique) -> Resultat<Self> {
        if autre.is_zero() {
            return Err(Erreur::domaine("modulo par zéro"));
        }
        if self.abs() < autre.abs() {
            return Ok(self.arrondir(politique).meme_contexte(self, politique));
        }

        // |a| >= |b| : si b a la plus grande échelle, l'écart reste sous le nombre de chiffres de a
        let e = self.echelle.max(autre.echelle);
        let b = &autre.mantisse * puissance_dix(e.abs_diff(autre.echelle));
        let module = b.abs();

        let ecart = BigInt::from(e.abs_diff(self.echelle));
        let facteur = BigInt::from(10u32).modpow(&ecart, &module);
        let r = (self.mantisse.abs() % &module) * facteur % &module;
        let r = if self.est_negatif() { -r } else { r };

        Ok(Self::brut(r, e).arrondir(politique).meme_contexte(self, politique))
    }

    /// x^n, n entier (exponentiation rapide en précision de travail).
    pub fn puissance_entiere(&self, n: i64, politique: Politique) -> Resultat<Self> {
        if n == 0 {
            return Ok(Self::un().meme_contexte(self, politique));
        }
        if self.is_zero() {
            if n < 0 {
                return Err(Erreur::domaine("division par zéro (zéro à une puissance négative)"));
            }
            return Ok(Self::zero().meme_contexte(self, politique));
        }

        let garde = 10 + nb_chiffres(&BigInt::from(n)) as u32;
        let travail = politique.avec_garde(garde);

        let mut base = self.clone();
        let mut e = n.unsigned_abs();
        let mut acc = Self::un();
        while e > 0 {
            if e & 1 == 1 {
                acc = acc.multiplier(&base, travail);
            }
            e >>= 1;
            if e > 0 {
                base = base.multiplier(&base, travail);
                // |x^n| >= |base| à un ordre près : inutile de continuer au-delà des bornes
                if base.hors_bornes(2) {
                    return Err(Erreur::domaine("dépassement de capacité (puissance)"));
                }
            }
        }

        let acc = if n < 0 {
            Self::un().diviser(&acc, travail)?
        } else {
            acc
        };
        Ok(acc.arrondir(politique).meme_contexte(self, politique))
    }

    /// x^y. Exposant entier : exact (à la précision près). Sinon exp(y·ln x), x > 0.
    pub fn puissance(&self, exposant: &Decimal, politique: Politique) -> Resultat<Self> {
        if let Some(n) = exposant.vers_i64() {
            return self.puissance_entiere(n, politique);
        }

        if self.is_zero() {
            return if exposant.signum() > 0 {
                Ok(Self::zero().meme_contexte(self, politique))
            } else {
                Err(Erreur::domaine("division par zéro (zéro à une puissance négative)"))
            };
        }

        let travail = politique.avec_garde(10);

        if exposant.est_entier() {
            // entier hors i64 : |x|^y par exp/ln, signe selon la parité
            let impair = !(exposant.partie_entiere() % 2u32).is_zero();
            let module = primitives::exp(
                &exposant.multiplier(&primitives::ln(&self.abs(), travail)?, travail),
                politique,
            )?;
            let signe_negatif = self.est_negatif() && impair;
            let r = if signe_negatif { module.neg() } else { module };
            return Ok(r.meme_contexte(self, politique));
        }

        if self.est_negatif() {
            return Err(Erreur::domaine("puissance non entière d'un nombre négatif"));
        }

        let ln_x = primitives::ln(self, travail)?;
        Ok(primitives::exp(&exposant.multiplier(&ln_x, travail), politique)?
            .meme_contexte(self, politique))
    }

    /// n! pour n entier >= 0.
    pub fn factorielle(&self, politique: Politique) -> Resultat<Self> {
        if !self.est_entier() || self.est_negatif() {
            return Err(Erreur::domaine("factorielle d'un nombre non entier ou négatif"));
        }
        let n = match self.vers_i64() {
            Some(n) if n <= FACTORIELLE_MAX => n,
            _ => return Err(Erreur::domaine("factorielle trop grande")),
        };

        let travail = politique.avec_garde(10);
        let mut acc = Self::un();
        for i in 2..=n {
            acc = acc.multiplier(&Decimal::from(i), travail);
        }
        Ok(acc.arrondir(politique).meme_contexte(self, politique))
    }

    /* ------------------------ Lecture ------------------------ */

    /// Lit un littéral selon la grammaire numérique de la locale, puis l'arrondit.
    pub fn parse(texte: &str, locale: Locale, politique: Politique) -> Resultat<Self> {
        let sep = locale.separateurs();
        if !est_nombre_valide(texte, sep) {
            return Err(Erreur::syntaxe_globale(format!("nombre invalide: {texte:?}")));
        }

        let mut chiffres = String::with_capacity(texte.len());
        let mut negatif = false;
        let mut fraction = 0i64;
        let mut dans_fraction = false;
        let mut exposant_txt = String::new();
        let mut dans_exposant = false;

        for c in texte.trim().chars() {
            if dans_exposant {
                exposant_txt.push(c);
            } else if c == '-' {
                negatif = true;
            } else if c == '+' || Some(c) == sep.groupe {
                continue;
            } else if c == sep.decimal {
                dans_fraction = true;
            } else if c == 'e' || c == 'E' {
                dans_exposant = true;
            } else {
                chiffres.push(c);
                if dans_fraction {
                    fraction += 1;
                }
            }
        }

        // exposant trop long pour un i64 : forcément hors bornes
        let exposant: i64 = if exposant_txt.is_empty() {
            0
        } else {
            exposant_txt
                .parse()
                .map_err(|_| Erreur::domaine("dépassement de capacité (exposant)"))?
        };

        let mut mantisse = BigInt::parse_bytes(chiffres.as_bytes(), 10)
            .ok_or_else(|| Erreur::syntaxe_globale(format!("nombre invalide: {texte:?}")))?;
        if negatif {
            mantisse = -mantisse;
        }

        // zéro : l'exposant n'a pas d'effet
        let echelle = if mantisse.is_zero() {
            fraction
        } else {
            fraction
                .checked_sub(exposant)
                .ok_or_else(|| Erreur::domaine("dépassement de capacité (exposant)"))?
        };

        Self {
            mantisse,
            echelle,
            politique,
            locale,
        }
        .arrondir(politique)
        .verifier_bornes()
    }

    /// Lit un littéral dont la locale n'est pas connue (auto-détection déterministe).
    pub fn parse_auto(texte: &str, politique: Politique) -> Resultat<Self> {
        let locale = Locale::detecter(texte)
            .ok_or_else(|| Erreur::syntaxe_globale(format!("nombre invalide: {texte:?}")))?;
        Self::parse(texte, locale, politique)
    }
}

/// Met deux décimaux à la même échelle : (ma', mb', échelle commune).
fn aligner(a: &Decimal, b: &Decimal) -> (BigInt, BigInt, i64) {
    let e = a.echelle.max(b.echelle);
    let ma = &a.mantisse * puissance_dix(e.abs_diff(a.echelle));
    let mb = &b.mantisse * puissance_dix(e.abs_diff(b.echelle));
    (ma, mb, e)
}

/* ------------------------ Conversions ------------------------ */

impl From<i64> for Decimal {
    fn from(n: i64) -> Self {
        Self::brut(BigInt::from(n), 0)
    }
}

impl From<BigInt> for Decimal {
    fn from(n: BigInt) -> Self {
        Self::brut(n, 0)
    }
}

/* ------------------------ Comparaisons par valeur ------------------------ */

impl Ord for Decimal {
    fn cmp(&self, other: &Self) -> Ordering {
        let (sa, sb) = (self.signum(), other.signum());
        if sa != sb {
            return sa.cmp(&sb);
        }
        if sa == 0 {
            return Ordering::Equal;
        }

        let (oa, ob) = (self.ordre(), other.ordre());
        if oa != ob {
            let c = oa.cmp(&ob);
            return if sa > 0 { c } else { c.reverse() };
        }

        let (a, b, _) = aligner(self, other);
        a.cmp(&b)
    }
}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Decimal {}

impl Hash for Decimal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.normaliser().hash(state);
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_decimal(self, self.locale))
    }
}
