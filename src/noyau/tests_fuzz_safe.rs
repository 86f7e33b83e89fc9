//! Tests fuzz safe : robustesse + déterminisme + limites contrôlées.
//!
//! But : marteler le pipeline sans brûler la machine.
//! - RNG déterministe (seed fixe)
//! - profondeur bornée
//! - budget temps global
//! - invariant clé : l'API texte ne panique jamais et ne laisse jamais passer "exception"
//! - erreurs typées : seulement celles de la taxonomie, jamais une panique

use std::time::{Duration, Instant};

use super::erreurs::Erreur;
use super::eval::Moteur;
use super::locale::Locale;
use super::reglages::Reglages;
use super::variables::Variables;

/* ------------------------ RNG déterministe minimal ------------------------ */

#[derive(Clone)]
struct Rng {
    state: u64,
}
impl Rng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }
    fn next_u32(&mut self) -> u32 {
        // LCG simple (déterministe)
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 32) as u32
    }
    fn pick(&mut self, n: u32) -> u32 {
        if n == 0 {
            0
        } else {
            self.next_u32() % n
        }
    }
    fn choix<'a>(&mut self, options: &[&'a str]) -> &'a str {
        options[self.pick(options.len() as u32) as usize]
    }
}

/* ------------------------ Budget anti-gel ------------------------ */

fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

/* ------------------------ Helpers fuzz ------------------------ */

fn moteur() -> Moteur {
    Moteur::new(
        Reglages::default()
            .avec_locale(Locale::neutre())
            .avec_precision(20),
    )
}

fn assert_texte_sur(texte: &str, expr: &str) {
    assert!(
        !texte.to_lowercase().contains("exception"),
        "fuite de message interne: expr={expr:?} texte={texte:?}"
    );
    assert!(!texte.is_empty(), "texte vide pour expr={expr:?}");
}

/* ------------------------ Génération d’expressions (bornée) ------------------------ */

const ATOMES: &[&str] = &["0", "1", "2", "3.5", "-4", "10", "pi", "e", "0.001", "1e3"];
const OPERATEURS: &[&str] = &["+", "-", "*", "/", "^", "%"];
const FONCTIONS: &[&str] = &["sin", "cos", "tan", "sqrt", "ln", "abs", "floor", "exp", "atan", "cos⁻¹"];

/// Littéraux aux bords de la plage des ordres de grandeur (et au-delà).
const ATOMES_EXTREMES: &[&str] = &[
    "1e999999",
    "-1e999999",
    "1e-999999",
    "9.99e1000000",
    "1e-1000000",
    "1e4294967297",
    "1e-9000000000000000000",
    "1e99999999999999999999",
    "7",
    "0.5",
];
const FONCTIONS_EXTREMES: &[&str] = &["sqrt", "ln", "abs", "floor", "sinh", "cosh", "tanh", "exp", "atanh"];

fn gen_atome(rng: &mut Rng) -> String {
    rng.choix(ATOMES).to_string()
}

fn gen_expr(rng: &mut Rng, depth: usize) -> String {
    if depth == 0 {
        return gen_atome(rng);
    }

    match rng.pick(7) {
        0 => gen_atome(rng),
        1 | 2 => format!(
            "({}{}{})",
            gen_expr(rng, depth - 1),
            rng.choix(OPERATEURS),
            gen_expr(rng, depth - 1)
        ),
        3 => format!("{}({})", rng.choix(FONCTIONS), gen_expr(rng, depth - 1)),
        4 => format!("-{}", gen_expr(rng, depth - 1)),
        5 => format!("{}!", rng.choix(&["0", "3", "5", "2.5"])),
        _ => format!("{}({})", rng.choix(&["2", ""]), gen_expr(rng, depth - 1)),
    }
}

fn gen_expr_extreme(rng: &mut Rng, depth: usize) -> String {
    if depth == 0 || rng.pick(3) == 0 {
        return rng.choix(ATOMES_EXTREMES).to_string();
    }
    if rng.pick(2) == 0 {
        format!("{}({})", rng.choix(FONCTIONS_EXTREMES), gen_expr_extreme(rng, depth - 1))
    } else {
        format!(
            "({}{}{})",
            gen_expr_extreme(rng, depth - 1),
            rng.choix(OPERATEURS),
            gen_expr_extreme(rng, depth - 1)
        )
    }
}

/// Mutation grossière : coupe, double ou insère un caractère parasite.
fn muter(rng: &mut Rng, expr: &str) -> String {
    let cars: Vec<char> = expr.chars().collect();
    if cars.is_empty() {
        return "(".to_string();
    }
    let i = rng.pick(cars.len() as u32) as usize;
    let parasite = rng.choix(&["(", ")", ";", "#", "|", ".", "!", "^", "∑", "x", ",", "¹"]);
    let mut out: String = cars[..i].iter().collect();
    match rng.pick(3) {
        0 => {}
        1 => out.push_str(parasite),
        _ => {
            out.push_str(parasite);
            out.extend(cars[i..].iter());
        }
    }
    out
}

/* ------------------------ Tests ------------------------ */

#[test]
fn fuzz_safe_texte_jamais_d_exception() {
    let t0 = Instant::now();
    let max = Duration::from_secs(20);

    let m = moteur();
    let vars = Variables::new();
    let mut rng = Rng::new(0xC0FFEE_u64);

    let mut vus_ok = 0usize;
    let mut vus_err = 0usize;

    for _ in 0..150 {
        budget(t0, max);

        let expr = gen_expr(&mut rng, 4);
        assert_texte_sur(&m.evaluer_en_texte(&expr, &vars), &expr);
        assert_texte_sur(&m.evaluer_en_texte_joli(&expr, &vars), &expr);

        match m.evaluer(&expr) {
            Ok(_) => vus_ok += 1,
            Err(_) => vus_err += 1,
        }
    }

    // On veut voir un mix des deux, sinon le fuzz ne “balaye” rien.
    assert!(vus_ok > 10, "trop peu de succès: {vus_ok}");
    assert!(vus_err > 0, "aucune erreur vue: fuzz trop “sage”");
}

#[test]
fn fuzz_safe_mutations() {
    let t0 = Instant::now();
    let max = Duration::from_secs(20);

    let m = moteur();
    let vars = Variables::new();
    let mut rng = Rng::new(0xBADC0DE_u64);

    for _ in 0..150 {
        budget(t0, max);

        let base = gen_expr(&mut rng, 3);
        let expr = muter(&mut rng, &base);
        assert_texte_sur(&m.evaluer_en_texte(&expr, &vars), &expr);
    }
}

#[test]
fn fuzz_safe_determinisme() {
    let m = moteur();
    let vars = Variables::new();

    let mut a = Rng::new(42);
    let mut b = Rng::new(42);
    for _ in 0..40 {
        let ea = gen_expr(&mut a, 3);
        let eb = gen_expr(&mut b, 3);
        assert_eq!(ea, eb);
        assert_eq!(m.evaluer_en_texte(&ea, &vars), m.evaluer_en_texte(&eb, &vars));
    }
}

#[test]
fn fuzz_safe_corpus_connu() {
    let m = moteur();
    let mut vars = Variables::new();
    vars.insert("a".into(), "b".into());
    vars.insert("b".into(), "a".into());

    let corpus = [
        "", " ", "(", ")", "((", "1+", "+", "*2", "2**3", "5/0", "0^-1", "sqrt(-1)", "ln(-5)",
        "tan(pi/2)", "1..2", "1,,2", "∑(", "∑(1;2)", "∑(1;2;3;4;5)", "sum(", "avg()", "|", "||",
        "exception", "Exception(1)", "a", "zz", "1e99999999999999999999", "9!!!!", "(-1)!",
        "rootn(2;0)", "gcd(1.5;2)", "randint(5;1)", "asin(2)", "acosh(0)", "atanh(1)",
        "ncr(3;5)", "median()", "rec(1)", "pol(0;0)", "∑(0;1000000;k)", "rootn(8,125)",
        "gcd(12,144,3)", "pol(3,400)*2", "1e4294967297%7",
    ];

    for expr in corpus {
        let texte = m.evaluer_en_texte(expr, &vars);
        assert_texte_sur(&texte, expr);
    }
}

#[test]
fn fuzz_safe_erreurs_typees_seulement() {
    let m = moteur();
    let mut rng = Rng::new(7);

    for _ in 0..100 {
        let base = gen_expr(&mut rng, 2);
        let expr = muter(&mut rng, &base);
        if let Err(e) = m.evaluer(&expr) {
            assert!(matches!(
                e,
                Erreur::Syntaxe { .. }
                    | Erreur::VariableIndefinie(_)
                    | Erreur::ReferenceCyclique(_)
                    | Erreur::Domaine(_)
                    | Erreur::ExpressionMalformee(_)
            ));
            assert!(!e.message_sur().to_lowercase().contains("exception"));
        }
    }
}

/// `evaluer` ne rattrape pas les paniques : un débordement d'échelle ferait échouer ce test.
#[test]
fn fuzz_safe_exposants_extremes() {
    let t0 = Instant::now();
    let max = Duration::from_secs(20);

    let m = moteur();
    let mut rng = Rng::new(0x1E99_u64);

    let fixes = [
        "1e-9000000000000000000*1e-9000000000000000000",
        "1e4294967297 % 7",
        "sinh(1e-5000000000)",
        "1e999999*1e999999",
        "1e-999999/1e999999",
        "1e999999%1e-999999",
        "1e999999^-4",
        "2^1e999999",
        "1e-999999^1e999999",
        "1e999999!",
        "median(1e999999;1e-999999;-1e999999)",
        "∏(1;5;1e300000)",
    ];
    let aleatoires = (0..60).map(|_| gen_expr_extreme(&mut rng, 2));

    for expr in fixes.iter().map(|s| s.to_string()).chain(aleatoires) {
        budget(t0, max);
        if let Err(e) = m.evaluer(&expr) {
            assert!(
                matches!(e, Erreur::Syntaxe { .. } | Erreur::Domaine(_)),
                "expr={expr:?} erreur={e:?}"
            );
        }
    }
}
