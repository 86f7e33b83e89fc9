// tests/proprietes.rs
//
// Propriétés (proptest) sur l'API publique : lecture/écriture, trim, ordre, validateur.

use calculatrice_precise::noyau::format::{format_decimal, format_decimal_joli};
use calculatrice_precise::noyau::locale::est_nombre_valide;
use calculatrice_precise::{evaluate_to_string, Decimal, Locale, Moteur, Politique, Reglages, Variables};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn en_us() -> Locale {
    Locale::neutre()
}

fn locales() -> impl Strategy<Value = Locale> {
    let toutes: Vec<Locale> = Locale::toutes().collect();
    proptest::sample::select(toutes)
}

/// Littéral en-US : signe, partie entière, partie fractionnaire optionnelle.
fn litteral() -> impl Strategy<Value = String> {
    (any::<bool>(), "[0-9]{1,25}", proptest::option::of("[0-9]{1,25}")).prop_map(
        |(negatif, entier, fraction)| {
            let signe = if negatif { "-" } else { "" };
            match fraction {
                Some(f) => format!("{signe}{entier}.{f}"),
                None => format!("{signe}{entier}"),
            }
        },
    )
}

fn lire(texte: &str) -> Decimal {
    Decimal::parse(texte, en_us(), Politique::default()).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn ecriture_puis_lecture_dans_toute_locale(txt in litteral(), locale in locales()) {
        let d = lire(&txt);
        let brut = format_decimal(&d, locale);
        let relu = Decimal::parse(&brut, locale, Politique::default()).unwrap();
        prop_assert_eq!(&relu, &d);

        let joli = format_decimal_joli(&d, locale);
        let relu = Decimal::parse(&joli, locale, Politique::default()).unwrap();
        prop_assert_eq!(relu, d);
    }

    #[test]
    fn trim_idempotent_et_sans_perte(txt in litteral()) {
        let d = lire(&txt);
        let t = d.trim();
        prop_assert_eq!(&t, &d);
        prop_assert_eq!(t.trim().echelle(), t.echelle());
    }

    #[test]
    fn ordre_par_valeur(a in any::<i64>(), b in any::<i64>(), zeros in 0usize..6) {
        let da = Decimal::from(a);
        let db = Decimal::from(b);
        prop_assert_eq!(da.cmp(&db), a.cmp(&b));

        // 1.500 == 1.5
        let avec_zeros = format!("{a}.{}", "0".repeat(zeros.max(1)));
        prop_assert_eq!(lire(&avec_zeros), da);
    }

    #[test]
    fn validateur_et_lecture_d_accord(txt in "[-+]?[0-9,.eE]{0,12}") {
        let sep = en_us().separateurs();
        let valide = est_nombre_valide(&txt, sep);
        let lu = Decimal::parse(&txt, en_us(), Politique::default());
        prop_assert_eq!(valide, lu.is_ok(), "texte={:?}", txt);
    }

    #[test]
    fn arithmetique_entiere_exacte(a in -10_000i64..10_000, b in -10_000i64..10_000, c in -10_000i64..10_000) {
        let m = Moteur::new(Reglages::default().avec_locale(en_us()));
        let r = m.evaluer(&format!("{a}+{b}*({c})")).unwrap();
        prop_assert_eq!(r.to_string(), (a + b * c).to_string());
    }

    #[test]
    fn api_texte_sans_exception(txt in "\\PC{0,16}") {
        let sortie = evaluate_to_string(&txt, &Variables::new());
        prop_assert!(!sortie.to_lowercase().contains("exception"));
    }
}

#[test]
fn proprietes_du_document() {
    let m = Moteur::new(Reglages::default().avec_locale(en_us()));
    let ok = |s: &str| m.evaluer(s).unwrap().to_string();

    assert_eq!(ok("2+3*4"), "14");
    assert_eq!(ok("(2+3)*4"), "20");
    assert_eq!(ok("2^3^2"), "512");
    assert_eq!(ok("2(3)"), "6");
    assert_eq!(ok("(2)(3)"), "6");
    assert_eq!(ok("5---2"), "3");
    assert_eq!(ok("∑(0;5;k^2+1)"), "61");

    let mut v = Variables::new();
    v.insert("a".into(), "5+3".into());
    v.insert("b".into(), "3".into());
    assert_eq!(m.evaluer_avec("2*a + b^2", &v).unwrap().to_string(), "25");
}
