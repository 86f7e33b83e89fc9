//! Tests scientifiques (campagne) : propriétés du pipeline + identités + limites contrôlées.
//!
//! But : vérifier les garanties publiques sans faire chauffer la machine.
//! - budget temps global par test (large : les tests tournent aussi en debug)
//! - précisions modestes (30 à 60 chiffres) sauf mention contraire
//! - locale neutre (en-US) : les attendus sont écrits avec le point décimal

use std::time::{Duration, Instant};

use super::decimal::{Arrondi, Decimal, Politique};
use super::erreurs::Erreur;
use super::eval::Moteur;
use super::locale::Locale;
use super::reglages::Reglages;
use super::trig::UniteAngle;
use super::valeur::Valeur;
use super::variables::Variables;

fn moteur(precision: u32) -> Moteur {
    Moteur::new(
        Reglages::default()
            .avec_locale(Locale::neutre())
            .avec_precision(precision),
    )
}

fn eval_ok(expr: &str) -> String {
    moteur(40)
        .evaluer(expr)
        .unwrap_or_else(|e| panic!("expr={expr:?} err={e}"))
        .to_string()
}

fn assert_eval(expr: &str, attendu: &str) {
    assert_eq!(eval_ok(expr), attendu, "expr={expr:?}");
}

fn vars(paires: &[(&str, &str)]) -> Variables {
    paires.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

/// Budget global anti-gel.
fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

/* ------------------------ Propriétés de base ------------------------ */

#[test]
fn sci_priorites() {
    assert_eval("2+3*4", "14");
    assert_eval("(2+3)*4", "20");
}

#[test]
fn sci_puissance_associative_a_droite() {
    assert_eval("2^3^2", "512");
    assert_eval("(2^3)^2", "64");
}

#[test]
fn sci_multiplication_implicite() {
    assert_eval("2(3)", "6");
    assert_eval("(2)(3)", "6");
    assert_eval("2sqrt(9)", "6");
}

#[test]
fn sci_suites_de_signes() {
    assert_eval("5---2", "3");
    assert_eval("5--2", "7");
    assert_eval("5-+-2", "7");
}

#[test]
fn sci_variables() {
    let v = vars(&[("a", "5+3"), ("b", "3")]);
    let r = moteur(40).evaluer_avec("2*a + b^2", &v).unwrap();
    assert_eq!(r.to_string(), "25");
}

#[test]
fn sci_plage() {
    assert_eval("∑(0;5;k^2+1)", "61");
    assert_eval("∏(1;6;k)", "720");
}

#[test]
fn sci_cycle() {
    let v = vars(&[("a", "b+1"), ("b", "a+2")]);
    match moteur(40).evaluer_avec("a", &v) {
        Err(Erreur::ReferenceCyclique(chemin)) => assert_eq!(chemin, ["a", "b", "a"]),
        autre => panic!("attendu un cycle, obtenu {autre:?}"),
    }
}

#[test]
fn sci_erreurs() {
    let m = moteur(40);
    assert!(matches!(m.evaluer("(2+4"), Err(Erreur::Syntaxe { .. })));
    assert!(matches!(m.evaluer("5/0"), Err(Erreur::Domaine(_))));
    assert!(matches!(m.evaluer("sqrt(-1)"), Err(Erreur::Domaine(_))));
    assert!(matches!(m.evaluer("ln(0)"), Err(Erreur::Domaine(_))));
    assert!(matches!(m.evaluer("(-3)!"), Err(Erreur::Domaine(_))));
}

/* ------------------------ Suffixes trig : -1 contre ⁻¹ ------------------------ */

#[test]
fn sci_cos_moins_un_n_est_pas_arccos() {
    // cos-1 = cos(-1) ; cos⁻¹(1) = acos(1) = 0
    let c = eval_ok("cos-1");
    assert!(c.starts_with("0.540302305868139717400936607442"), "{c}");
    assert_eval("cos⁻¹(1)", "0");
    assert_eval("acos(1)", "0");
}

/* ------------------------ Identités ------------------------ */

#[test]
fn sci_identites_trig_degres() {
    let m = Moteur::new(
        Reglages::default()
            .avec_locale(Locale::neutre())
            .avec_angle(UniteAngle::Deg),
    );
    let ok = |s: &str| m.evaluer(s).unwrap().to_string();

    assert_eq!(ok("sin(30)"), "0.5");
    assert_eq!(ok("cos(60)"), "0.5");
    assert_eq!(ok("tan(45)"), "1");
    assert_eq!(ok("sin(-390)"), "-0.5");
    assert_eq!(ok("asin(0.5)"), "30");
    assert!(matches!(m.evaluer("tan(270)"), Err(Erreur::Domaine(_))));
}

/// |valeur - attendu| < 10^-(chiffres)
fn assert_proche(expr: &str, attendu: i64, chiffres: i64) {
    let v = moteur(30).evaluer(expr).unwrap_or_else(|e| panic!("expr={expr:?} err={e}"));
    let d = v.en_nombre().unwrap();
    let ecart = d.soustraire(&Decimal::from(attendu), Politique::default());
    assert!(
        ecart.is_zero() || ecart.ordre() < -chiffres,
        "expr={expr:?} valeur={d} écart={ecart}"
    );
}

#[test]
fn sci_identites_numeriques() {
    let t0 = Instant::now();
    let max = Duration::from_secs(10);

    // sin² + cos² = 1
    assert_proche("sin(0.7)^2+cos(0.7)^2", 1, 28);
    budget(t0, max);

    // exp(ln(x)) = x
    assert_proche("exp(ln(7))", 7, 27);
    budget(t0, max);

    // Γ(n) = (n-1)! : chemin exact
    assert_eval("gamma(6)", "120");
    budget(t0, max);
}

#[test]
fn sci_log_exacts() {
    assert_eval("log(10^50)", "50");
    assert_eval("log2(1024)", "10");
    assert_eval("logbase(81;3)", "4");
}

/* ------------------------ Politique d'arrondi ------------------------ */

#[test]
fn sci_politique_appliquee() {
    let r = Reglages::default()
        .avec_locale(Locale::neutre())
        .avec_precision(5)
        .avec_arrondi(Arrondi::Down);
    assert_eq!(Moteur::new(r).evaluer("2/3").unwrap().to_string(), "0.66666");

    let r = r.avec_arrondi(Arrondi::HalfUp);
    assert_eq!(Moteur::new(r).evaluer("2/3").unwrap().to_string(), "0.66667");
}

/* ------------------------ Locale ------------------------ */

#[test]
fn sci_locale_virgule() {
    let de = Locale::resoudre("de-DE").unwrap();
    let m = Moteur::new(Reglages::default().avec_locale(de).avec_precision(30));

    assert_eq!(m.evaluer("1,5*2").unwrap().to_string(), "3");
    assert_eq!(m.evaluer("1.000,5+0,5").unwrap().to_string(), "1001");
    assert_eq!(m.evaluer("avg(1,5;2,5)").unwrap().to_string(), "2");
    assert_eq!(m.evaluer("1/4").unwrap().to_string(), "0,25");
    assert_eq!(m.evaluer_en_texte_joli("10^6/4", &Variables::new()), "250.000");
}

/* ------------------------ Stress contrôlé ------------------------ */

#[test]
fn sci_stress_profondeur_parentheses() {
    let t0 = Instant::now();
    let max = Duration::from_secs(5);

    let mut expr = "1".to_string();
    for _ in 0..200 {
        expr = format!("({expr}+1)");
    }
    budget(t0, max);

    assert_eval(&expr, "201");
    budget(t0, max);
}

#[test]
fn sci_stress_grands_entiers() {
    let t0 = Instant::now();
    let max = Duration::from_secs(5);

    // 100! exact tient en 158 chiffres : précision 200
    let r = moteur(200).evaluer("100!/98!").unwrap();
    assert_eq!(r, Valeur::from(Decimal::from(9900)));
    budget(t0, max);

    let big = "9".repeat(100);
    let r = moteur(120).evaluer(&format!("{big}+1")).unwrap();
    assert_eq!(r.to_string(), format!("1{}", "0".repeat(100)));
    budget(t0, max);
}
