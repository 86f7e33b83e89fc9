// src/noyau/primitives.rs
//
// Primitives numériques à précision arbitraire (cœur des fonctions transcendantes).
//
// - constantes π, ln 2, ln 10 : séries sur entiers "scalés" (×10^digits) + cache
// - exp, ln, sin, cos, atan   : séries de Taylor en précision de travail (chiffres de garde)
// - racines n-ièmes           : Newton entier sur la mantisse mise à l'échelle
// - Γ                         : approximation de Spouge, coefficients en cache par précision
//
// Ici : aucune notion d'angle en degrés ni de locale. Domaine vérifié au plus près
// du calcul (ln d'un non-positif, racine paire d'un négatif, pôles de Γ).

use std::collections::HashMap;
use std::sync::{Mutex, OnceLock, PoisonError};

use num_bigint::BigInt;
use num_traits::{One, Zero};

use super::decimal::{nb_chiffres, puissance_dix, Arrondi, Decimal, Politique};
use super::erreurs::{Erreur, Resultat};

/// Chiffres de garde des calculs intermédiaires.
const GARDE: u32 = 10;

/// exp(x) : x est divisé par 2^DEMI_PAS avant la série, puis le résultat est élevé au carré.
const DEMI_PAS: u32 = 8;

/* ------------------------ Constantes (entiers scalés) + cache ------------------------ */

/// atan(1/q) (alterne = true) ou atanh(1/q) (alterne = false), scalé par `scale`, tronqué :
/// z - z^3/3 + z^5/5 - ...   /   z + z^3/3 + z^5/5 + ...
fn serie_inv_q_scaled(q: i64, scale: &BigInt, alterne: bool) -> BigInt {
    let q = BigInt::from(q);

    let mut k: usize = 0;
    let mut sign_pos = true;

    // q^(2k+1)
    let mut q_pow = q.clone();
    let mut sum = BigInt::zero();

    loop {
        let denom = BigInt::from((2 * k + 1) as i64);
        let d = &q_pow * &denom;

        let term = scale / &d;
        if term.is_zero() {
            break;
        }

        if sign_pos {
            sum += &term;
        } else {
            sum -= &term;
        }

        q_pow *= &q;
        q_pow *= &q;

        if alterne {
            sign_pos = !sign_pos;
        }
        k += 1;
    }

    sum
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Constante {
    Pi,
    Ln2,
    Ln10,
}

fn constante_scaled_compute(c: Constante, digits: usize) -> BigInt {
    // extra pour amortir les erreurs de troncature
    let extra = 10usize;
    let scale = puissance_dix((digits + extra) as u64);

    let v = match c {
        // Machin : π = 16·atan(1/5) - 4·atan(1/239)
        Constante::Pi => {
            BigInt::from(16) * serie_inv_q_scaled(5, &scale, true)
                - BigInt::from(4) * serie_inv_q_scaled(239, &scale, true)
        }
        // ln 2 = 2·atanh(1/3)
        Constante::Ln2 => BigInt::from(2) * serie_inv_q_scaled(3, &scale, false),
        // ln 10 = 3·ln 2 + ln(5/4) = 6·atanh(1/3) + 2·atanh(1/9)
        Constante::Ln10 => {
            BigInt::from(6) * serie_inv_q_scaled(3, &scale, false)
                + BigInt::from(2) * serie_inv_q_scaled(9, &scale, false)
        }
    };

    v / puissance_dix(extra as u64)
}

static CONSTANTES_CACHE: OnceLock<Mutex<HashMap<(Constante, usize), BigInt>>> = OnceLock::new();

fn constante_scaled_cached(c: Constante, digits: usize) -> BigInt {
    let m = CONSTANTES_CACHE.get_or_init(|| Mutex::new(HashMap::new()));
    let mut guard = m.lock().unwrap_or_else(PoisonError::into_inner);

    if let Some(v) = guard.get(&(c, digits)) {
        return v.clone();
    }

    let v = constante_scaled_compute(c, digits);
    guard.insert((c, digits), v.clone());
    v
}

fn constante(c: Constante, politique: Politique) -> Decimal {
    let digits = (politique.precision() + GARDE) as usize;
    Decimal::brut(constante_scaled_cached(c, digits), digits as i64).arrondir(politique)
}

pub fn pi(politique: Politique) -> Decimal {
    constante(Constante::Pi, politique)
}

pub fn ln2(politique: Politique) -> Decimal {
    constante(Constante::Ln2, politique)
}

pub fn ln10(politique: Politique) -> Decimal {
    constante(Constante::Ln10, politique)
}

/* ------------------------ Séries ------------------------ */

/// Terme négligeable devant la somme à la précision de travail.
fn negligeable(terme: &Decimal, somme: &Decimal, travail: Politique) -> bool {
    terme.is_zero()
        || (!somme.is_zero()
            && terme.ordre() < somme.ordre() - i64::from(travail.precision()) - 1)
}

fn depassement() -> Erreur {
    Erreur::domaine("dépassement de capacité")
}

pub fn exp(x: &Decimal, politique: Politique) -> Resultat<Decimal> {
    if x.is_zero() {
        return Ok(Decimal::un().arrondir(politique));
    }
    if x.ordre() > 15 {
        return Err(depassement());
    }

    let travail = politique.avec_garde(GARDE + x.ordre().max(0) as u32 + 2);

    // x = k·ln2 + r, |r| <= ln2/2
    let l2 = ln2(travail);
    let k = x.diviser(&l2, travail)?.arrondir_entier(Arrondi::HalfEven);
    let k_i64 = k.vers_i64().ok_or_else(depassement)?;
    let r = x.soustraire(&k.multiplier(&l2, travail), travail);

    let y = r.diviser(&Decimal::from(1i64 << DEMI_PAS), travail)?;

    let mut somme = Decimal::un();
    let mut terme = Decimal::un();
    let mut i = 1i64;
    loop {
        terme = terme
            .multiplier(&y, travail)
            .diviser(&Decimal::from(i), travail)?;
        if negligeable(&terme, &somme, travail) {
            break;
        }
        somme = somme.additionner(&terme, travail);
        i += 1;
    }

    for _ in 0..DEMI_PAS {
        somme = somme.multiplier(&somme, travail);
    }

    let deux_k = Decimal::from(2).puissance_entiere(k_i64, travail)?;
    Ok(somme.multiplier(&deux_k, travail).arrondir(politique))
}

/// atanh(z) = z + z^3/3 + z^5/5 + ...  (|z| < 1, convergence rapide pour |z| <= 1/3)
fn serie_atanh(z: &Decimal, travail: Politique) -> Resultat<Decimal> {
    let z2 = z.multiplier(z, travail);
    let mut puissance = z.clone();
    let mut somme = z.clone();
    let mut k = 1i64;
    loop {
        puissance = puissance.multiplier(&z2, travail);
        let terme = puissance.diviser(&Decimal::from(2 * k + 1), travail)?;
        if negligeable(&terme, &somme, travail) {
            return Ok(somme);
        }
        somme = somme.additionner(&terme, travail);
        k += 1;
    }
}

pub fn ln(x: &Decimal, politique: Politique) -> Resultat<Decimal> {
    if x.signum() <= 0 {
        return Err(Erreur::domaine("logarithme d'un nombre non positif"));
    }

    let un = Decimal::un();
    if *x == un {
        return Ok(Decimal::zero());
    }

    let demi = Decimal::brut(BigInt::from(5), 1);

    // près de 1 : pas de réduction (évite l'annulation ln t - j·ln2 + e·ln10)
    let (t, j, e10) = if x.soustraire(&un, politique.avec_garde(GARDE)).abs() < demi {
        (x.clone(), 0i64, 0i64)
    } else {
        // x = m·10^e10, m ∈ [0.1, 1), puis m·2^j ∈ [0.7, 1.4)
        let e10 = x.ordre() + 1;
        let mut t = Decimal::brut(x.mantisse().clone(), x.echelle() + e10);
        let sept_dixiemes = Decimal::brut(BigInt::from(7), 1);
        let mut j = 0i64;
        while t < sept_dixiemes {
            t = Decimal::brut(t.mantisse() * 2u32, t.echelle());
            j += 1;
        }
        (t, j, e10)
    };

    let garde = GARDE + 2 + nb_chiffres(&BigInt::from(e10)) as u32;
    let travail = politique.avec_garde(garde);

    // ln t = 2·atanh((t-1)/(t+1))
    let z = t
        .soustraire(&un, travail)
        .diviser(&t.additionner(&un, travail), travail)?;
    let mut r = serie_atanh(&z, travail)?.multiplier(&Decimal::from(2), travail);

    if j != 0 {
        r = r.soustraire(&ln2(travail).multiplier(&Decimal::from(j), travail), travail);
    }
    if e10 != 0 {
        r = r.additionner(&ln10(travail).multiplier(&Decimal::from(e10), travail), travail);
    }

    Ok(r.arrondir(politique))
}

/* ------------------------ Trigonométrie (radians) ------------------------ */

/// Réduit x modulo 2π dans [-π, π].
fn reduire_deux_pi(x: &Decimal, travail: Politique) -> Resultat<Decimal> {
    if x.ordre() > 10_000 {
        return Err(Erreur::domaine("argument trigonométrique trop grand"));
    }
    let fin = travail.avec_garde(x.ordre().max(0) as u32 + 2);
    let deux_pi = pi(fin).multiplier(&Decimal::from(2), fin);
    let n = x.diviser(&deux_pi, fin)?.arrondir_entier(Arrondi::HalfEven);
    if n.is_zero() {
        return Ok(x.clone());
    }
    Ok(x.soustraire(&n.multiplier(&deux_pi, fin), fin).arrondir(travail))
}

/// Série alternée Σ (-1)^i r^(2i+depart) / (2i+depart)!
fn serie_trig(r: &Decimal, depart: i64, travail: Politique) -> Resultat<Decimal> {
    let r2 = r.multiplier(r, travail);
    let mut terme = if depart == 1 { r.clone() } else { Decimal::un() };
    let mut somme = terme.clone();
    let mut n = depart;
    loop {
        let div = Decimal::from((n + 1) * (n + 2));
        terme = terme.multiplier(&r2, travail).diviser(&div, travail)?.neg();
        if negligeable(&terme, &somme, travail) {
            return Ok(somme);
        }
        somme = somme.additionner(&terme, travail);
        n += 2;
    }
}

pub fn sin(x: &Decimal, politique: Politique) -> Resultat<Decimal> {
    if x.is_zero() {
        return Ok(Decimal::zero());
    }
    let travail = politique.avec_garde(GARDE);
    let r = reduire_deux_pi(x, travail)?;
    Ok(serie_trig(&r, 1, travail)?.arrondir(politique))
}

pub fn cos(x: &Decimal, politique: Politique) -> Resultat<Decimal> {
    if x.is_zero() {
        return Ok(Decimal::un().arrondir(politique));
    }
    let travail = politique.avec_garde(GARDE);
    let r = reduire_deux_pi(x, travail)?;
    Ok(serie_trig(&r, 0, travail)?.arrondir(politique))
}

pub fn atan(x: &Decimal, politique: Politique) -> Resultat<Decimal> {
    if x.is_zero() {
        return Ok(Decimal::zero());
    }

    let travail = politique.avec_garde(GARDE + 4);
    let un = Decimal::un();
    let seuil = Decimal::brut(BigInt::one(), 1);

    let negatif = x.est_negatif();
    let mut y = x.abs();
    let inverse = y > un;
    if inverse {
        y = un.diviser(&y, travail)?;
    }

    // atan(y) = 2·atan(y / (1 + √(1+y²)))
    let mut doublements = 0u32;
    while y > seuil {
        let rac = racine(&un.additionner(&y.multiplier(&y, travail), travail), 2, travail)?;
        y = y.diviser(&un.additionner(&rac, travail), travail)?;
        doublements += 1;
    }

    let y2 = y.multiplier(&y, travail);
    let mut puissance = y.clone();
    let mut somme = y.clone();
    let mut k = 1i64;
    loop {
        puissance = puissance.multiplier(&y2, travail).neg();
        let terme = puissance.diviser(&Decimal::from(2 * k + 1), travail)?;
        if negligeable(&terme, &somme, travail) {
            break;
        }
        somme = somme.additionner(&terme, travail);
        k += 1;
    }

    let mut r = somme.multiplier(&Decimal::from(1i64 << doublements), travail);
    if inverse {
        let demi_pi = pi(travail).diviser(&Decimal::from(2), travail)?;
        r = demi_pi.soustraire(&r, travail);
    }
    if negatif {
        r = r.neg();
    }
    Ok(r.arrondir(politique))
}

/* ------------------------ Racines ------------------------ */

/// floor(n^(1/k)) pour n >= 0 (Newton entier, départ au-dessus de la racine).
fn racine_entiere(n: &BigInt, k: u32) -> BigInt {
    if n.is_zero() || n.is_one() || k == 1 {
        return n.clone();
    }

    let bits = n.bits();
    let mut x = BigInt::one() << ((bits / u64::from(k) + 1) as usize);

    loop {
        let y = (&x * (k - 1) + n / x.pow(k - 1)) / k;
        if y >= x {
            return x;
        }
        x = y;
    }
}

/// Racine n-ième (n >= 1). Négatif accepté seulement pour n impair.
pub fn racine(x: &Decimal, n: u32, politique: Politique) -> Resultat<Decimal> {
    if n == 0 {
        return Err(Erreur::domaine("racine d'ordre zéro"));
    }
    if x.is_zero() {
        return Ok(Decimal::zero());
    }
    if x.est_negatif() {
        if n % 2 == 0 {
            return Err(Erreur::domaine("racine paire d'un nombre négatif"));
        }
        return Ok(racine(&x.abs(), n, politique)?.neg());
    }

    let travail = politique.avec_garde(GARDE);
    let n64 = i64::from(n);

    // mantisse·10^k, avec (echelle + k) divisible par n et assez de chiffres
    let cible = n64 * i64::from(travail.precision());
    let mut k = (cible - nb_chiffres(x.mantisse()) as i64).max(0);
    while (x.echelle() + k).rem_euclid(n64) != 0 {
        k += 1;
    }

    let m = x.mantisse() * puissance_dix(k as u64);
    let r = racine_entiere(&m, n);
    Ok(Decimal::brut(r, (x.echelle() + k) / n64).arrondir(politique))
}

/* ------------------------ Γ (Spouge) ------------------------ */

static SPOUGE_CACHE: OnceLock<Mutex<HashMap<u32, Vec<Decimal>>>> = OnceLock::new();

/// a tel que l'erreur de Spouge a^(-1/2)·(2π)^-(a+1/2) passe sous 10^-(p+2).
fn spouge_a(precision: u32) -> i64 {
    (f64::from(precision + 2) * 1.26).ceil() as i64 + 1
}

/// c0 = √(2π) ; c_k = (-1)^(k-1)/(k-1)! · (a-k)^(k-1/2) · e^(a-k)
fn coefficients_spouge(precision: u32) -> Resultat<Vec<Decimal>> {
    let cache = SPOUGE_CACHE.get_or_init(|| Mutex::new(HashMap::new()));
    {
        let guard = cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(c) = guard.get(&precision) {
            return Ok(c.clone());
        }
    }

    let a = spouge_a(precision);
    // les c_k alternent et atteignent ~e^a : la moitié des chiffres part en annulation
    let travail = Politique::new(precision, Arrondi::HalfEven).avec_garde(precision + 15);
    let demi = Decimal::brut(BigInt::from(5), 1);

    let deux_pi = pi(travail).multiplier(&Decimal::from(2), travail);
    let mut coeffs = Vec::with_capacity(a as usize);
    coeffs.push(racine(&deux_pi, 2, travail)?);

    let mut factorielle = Decimal::un();
    for k in 1..a {
        if k >= 2 {
            factorielle = factorielle.multiplier(&Decimal::from(k - 1), travail);
        }
        let a_k = Decimal::from(a - k);
        let exposant = Decimal::from(k)
            .soustraire(&demi, travail)
            .multiplier(&ln(&a_k, travail)?, travail)
            .additionner(&a_k, travail);
        let mut c = exp(&exposant, travail)?.diviser(&factorielle, travail)?;
        if k % 2 == 0 {
            c = c.neg();
        }
        coeffs.push(c);
    }

    let mut guard = cache.lock().unwrap_or_else(PoisonError::into_inner);
    guard.insert(precision, coeffs.clone());
    Ok(coeffs)
}

/// Γ(x) pour x >= 1/2 : Γ(z+1) = (z+a)^(z+1/2)·e^-(z+a)·[c0 + Σ c_k/(z+k)], z = x-1.
fn gamma_spouge(x: &Decimal, politique: Politique) -> Resultat<Decimal> {
    let coeffs = coefficients_spouge(politique.precision())?;
    let a = coeffs.len() as i64;
    let travail = politique.avec_garde(politique.precision() + 15);
    let demi = Decimal::brut(BigInt::from(5), 1);

    let z = x.soustraire(&Decimal::un(), travail);

    let mut somme = coeffs[0].clone();
    for (k, c) in coeffs.iter().enumerate().skip(1) {
        let den = z.additionner(&Decimal::from(k as i64), travail);
        somme = somme.additionner(&c.diviser(&den, travail)?, travail);
    }

    let za = z.additionner(&Decimal::from(a), travail);
    let exposant = z
        .additionner(&demi, travail)
        .multiplier(&ln(&za, travail)?, travail)
        .soustraire(&za, travail);

    Ok(exp(&exposant, travail)?
        .multiplier(&somme, travail)
        .arrondir(politique))
}

pub fn gamma(x: &Decimal, politique: Politique) -> Resultat<Decimal> {
    if x.est_entier() {
        if x.signum() <= 0 {
            return Err(Erreur::domaine("gamma non définie sur les entiers négatifs ou nuls"));
        }
        return x.soustraire(&Decimal::un(), politique).factorielle(politique);
    }

    let travail = politique.avec_garde(GARDE);
    let demi = Decimal::brut(BigInt::from(5), 1);

    if *x < demi {
        // réflexion : Γ(x) = π / (sin(πx)·Γ(1-x))
        let pi_w = pi(travail);
        let s = sin(&pi_w.multiplier(x, travail), travail)?;
        let g = gamma(&Decimal::un().soustraire(x, travail), travail)?;
        return Ok(pi_w
            .diviser(&s.multiplier(&g, travail), travail)?
            .arrondir(politique));
    }

    Ok(gamma_spouge(x, travail)?.arrondir(politique))
}
