// src/noyau/format.rs
//
// Rendu texte des décimaux selon la locale.
// - format_decimal      : forme brute (séparateur décimal de la locale, sans groupes)
// - format_decimal_joli : forme "joli" (zéros inutiles retirés + séparateur de groupe)
//
// Au-delà de 10^±1000, la forme pleine devient illisible : notation scientifique
// (1,5E+2000), relue telle quelle par le validateur.

use super::decimal::Decimal;
use super::locale::Locale;

const LIMITE_NOTATION_PLEINE: i64 = 1000;

/* ------------------------ Helpers ------------------------ */

/// Insère le séparateur de groupe toutes les 3 positions, depuis la droite.
fn grouper(entier: &str, groupe: Option<char>) -> String {
    let Some(g) = groupe else {
        return entier.to_string();
    };

    let n = entier.len();
    let mut out = String::with_capacity(n + n / 3 * g.len_utf8());
    for (i, c) in entier.chars().enumerate() {
        if i > 0 && (n - i) % 3 == 0 {
            out.push(g);
        }
        out.push(c);
    }
    out
}

fn rendre(d: &Decimal, decimal: char, groupe: Option<char>) -> String {
    let e = d.echelle();

    if d.is_zero() {
        return if e > 0 {
            format!("0{decimal}{}", "0".repeat(e as usize))
        } else {
            "0".to_string()
        };
    }

    let chiffres = d.mantisse().magnitude().to_str_radix(10);
    let len = chiffres.len() as i64;
    let ordre = len - 1 - e;

    let mut out = String::new();
    if d.est_negatif() {
        out.push('-');
    }

    // notation scientifique
    if ordre.abs() > LIMITE_NOTATION_PLEINE {
        let (tete, reste) = chiffres.split_at(1);
        let reste = reste.trim_end_matches('0');
        out.push_str(tete);
        if !reste.is_empty() {
            out.push(decimal);
            out.push_str(reste);
        }
        out.push('E');
        out.push(if ordre >= 0 { '+' } else { '-' });
        out.push_str(&ordre.abs().to_string());
        return out;
    }

    if e <= 0 {
        let entier = format!("{chiffres}{}", "0".repeat(e.unsigned_abs() as usize));
        out.push_str(&grouper(&entier, groupe));
        return out;
    }

    let (entier, fraction) = if len > e {
        let (a, b) = chiffres.split_at((len - e) as usize);
        (a.to_string(), b.to_string())
    } else {
        (
            "0".to_string(),
            format!("{}{chiffres}", "0".repeat((e - len) as usize)),
        )
    };

    out.push_str(&grouper(&entier, groupe));
    out.push(decimal);
    out.push_str(&fraction);
    out
}

/* ------------------------ API ------------------------ */

/// Forme brute, relisible par `Decimal::parse` dans la même locale.
pub fn format_decimal(d: &Decimal, locale: Locale) -> String {
    rendre(d, locale.separateurs().decimal, None)
}

/// Forme "joli" : zéros fractionnaires retirés, chiffres groupés.
pub fn format_decimal_joli(d: &Decimal, locale: Locale) -> String {
    let sep = locale.separateurs();
    rendre(&d.trim(), sep.decimal, sep.groupe)
}
