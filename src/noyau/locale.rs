// src/noyau/locale.rs
//
// Locales numériques : séparateur décimal + séparateur de groupe.
// - table figée, triée par étiquette (ordre stable pour l'auto-détection)
// - résolution d'étiquette ("fr_FR", "FR-fr", "fr") mise en cache
// - validateur de littéraux en une passe, sans allocation (chemin chaud des jetons)

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, OnceLock, PoisonError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Separateurs {
    pub decimal: char,
    pub groupe: Option<char>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Locale {
    tag: &'static str,
    separateurs: Separateurs,
}

const fn loc(tag: &'static str, decimal: char, groupe: char) -> Locale {
    Locale {
        tag,
        separateurs: Separateurs {
            decimal,
            groupe: Some(groupe),
        },
    }
}

/// Table complète, triée par étiquette.
static LOCALES: &[Locale] = &[
    loc("cs-CZ", ',', '\u{A0}'),
    loc("da-DK", ',', '.'),
    loc("de-AT", ',', '\u{A0}'),
    loc("de-CH", '.', '’'),
    loc("de-DE", ',', '.'),
    loc("en-AU", '.', ','),
    loc("en-CA", '.', ','),
    loc("en-GB", '.', ','),
    loc("en-IN", '.', ','),
    loc("en-US", '.', ','),
    loc("es-ES", ',', '.'),
    loc("es-MX", '.', ','),
    loc("fi-FI", ',', '\u{A0}'),
    loc("fr-CA", ',', '\u{A0}'),
    loc("fr-FR", ',', '\u{202F}'),
    loc("hi-IN", '.', ','),
    loc("id-ID", ',', '.'),
    loc("it-CH", '.', '’'),
    loc("it-IT", ',', '.'),
    loc("ja-JP", '.', ','),
    loc("ko-KR", '.', ','),
    loc("nb-NO", ',', '\u{A0}'),
    loc("nl-NL", ',', '.'),
    loc("pl-PL", ',', '\u{A0}'),
    loc("pt-BR", ',', '.'),
    loc("pt-PT", ',', '\u{A0}'),
    loc("ru-RU", ',', '\u{A0}'),
    loc("sv-SE", ',', '\u{A0}'),
    loc("tr-TR", ',', '.'),
    loc("zh-CN", '.', ','),
];

/// Candidats prioritaires de l'auto-détection, dans cet ordre.
/// Beaucoup de locales partagent les mêmes séparateurs : sans liste fixe,
/// la "première" locale compatible dépendrait de l'itération.
const CANDIDATS: &[&str] = &[
    "en-US", "fr-FR", "de-DE", "es-ES", "it-IT", "pt-BR", "ja-JP", "ru-RU", "de-CH",
];

const ETIQUETTE_NEUTRE: &str = "en-US";

/// Index (dans LOCALES) de la locale par défaut du processus ; usize::MAX = neutre.
static DEFAUT: AtomicUsize = AtomicUsize::new(usize::MAX);

static CACHE_RESOLUTION: OnceLock<Mutex<HashMap<String, Option<Locale>>>> = OnceLock::new();

impl Locale {
    pub fn tag(&self) -> &'static str {
        self.tag
    }

    pub fn separateurs(&self) -> Separateurs {
        self.separateurs
    }

    /// Locale "point décimal, virgule de groupe" (en-US).
    pub fn neutre() -> Locale {
        LOCALES
            .iter()
            .copied()
            .find(|l| l.tag == ETIQUETTE_NEUTRE)
            .unwrap_or(Locale {
                tag: ETIQUETTE_NEUTRE,
                separateurs: Separateurs {
                    decimal: '.',
                    groupe: Some(','),
                },
            })
    }

    /// Toutes les locales connues, ordre stable (tri par étiquette).
    pub fn toutes() -> impl Iterator<Item = Locale> {
        LOCALES.iter().copied()
    }

    /// Résout une étiquette ("fr-FR", "fr_fr", "FR") en locale connue.
    /// Le résultat (même négatif) est mis en cache.
    pub fn resoudre(tag: &str) -> Option<Locale> {
        let cle = tag.trim().replace('_', "-").to_ascii_lowercase();
        let cache = CACHE_RESOLUTION.get_or_init(|| Mutex::new(HashMap::new()));
        let mut guard = cache.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(l) = guard.get(&cle) {
            return *l;
        }

        let trouvee = resoudre_sans_cache(&cle);
        guard.insert(cle, trouvee);
        trouvee
    }

    /// Devine la locale d'un littéral : candidats prioritaires d'abord,
    /// puis toute la table dans l'ordre des étiquettes.
    pub fn detecter(texte: &str) -> Option<Locale> {
        let prioritaires = CANDIDATS
            .iter()
            .filter_map(|tag| LOCALES.iter().copied().find(|l| l.tag == *tag));

        prioritaires
            .chain(Locale::toutes())
            .find(|l| est_nombre_valide(texte, l.separateurs))
    }
}

impl Default for Locale {
    fn default() -> Self {
        locale_defaut()
    }
}

fn resoudre_sans_cache(cle: &str) -> Option<Locale> {
    if let Some(l) = LOCALES.iter().find(|l| l.tag.eq_ignore_ascii_case(cle)) {
        return Some(*l);
    }

    // langue seule ("fr") : le candidat prioritaire de cette langue, sinon la première de la table
    if !cle.contains('-') {
        let meme_langue = |l: &&Locale| {
            l.tag
                .split('-')
                .next()
                .is_some_and(|langue| langue.eq_ignore_ascii_case(cle))
        };
        let prioritaire = CANDIDATS
            .iter()
            .filter_map(|tag| LOCALES.iter().find(|l| l.tag == *tag))
            .find(meme_langue);
        return prioritaire.or_else(|| LOCALES.iter().find(meme_langue)).copied();
    }

    None
}

/// Locale par défaut du processus (en-US tant que rien n'a été défini).
pub fn locale_defaut() -> Locale {
    match LOCALES.get(DEFAUT.load(Ordering::Relaxed)) {
        Some(l) => *l,
        None => Locale::neutre(),
    }
}

/// Change la locale par défaut du processus. Retourne false si la locale est inconnue.
pub fn definir_locale_defaut(locale: Locale) -> bool {
    match LOCALES.iter().position(|l| *l == locale) {
        Some(i) => {
            DEFAUT.store(i, Ordering::Relaxed);
            true
        }
        None => false,
    }
}

/* ------------------------ Validateur de littéraux ------------------------ */

/// Vérifie qu'un texte est un nombre valide pour ces séparateurs, sans le convertir.
///
/// Grammaire :
/// - signe optionnel
/// - chiffres ; séparateur de groupe seulement après au moins un chiffre,
///   jamais doublé, jamais après le séparateur décimal
/// - au plus un séparateur décimal
/// - exposant optionnel : e/E, signe optionnel, au moins un chiffre
/// - espaces de tête/queue ignorés (sous-tranche, aucune copie)
pub fn est_nombre_valide(texte: &str, sep: Separateurs) -> bool {
    let mut it = texte.trim().chars().peekable();

    if matches!(it.peek(), Some('+' | '-')) {
        it.next();
    }

    let mut chiffres = 0usize;
    let mut vu_decimal = false;
    let mut apres_groupe = false;

    while let Some(c) = it.next() {
        if c.is_ascii_digit() {
            chiffres += 1;
            apres_groupe = false;
        } else if c == sep.decimal && !vu_decimal && !apres_groupe {
            vu_decimal = true;
        } else if Some(c) == sep.groupe && !vu_decimal && chiffres > 0 && !apres_groupe {
            apres_groupe = true;
        } else if (c == 'e' || c == 'E') && chiffres > 0 && !apres_groupe {
            if matches!(it.peek(), Some('+' | '-')) {
                it.next();
            }
            let mut chiffres_exposant = 0usize;
            for c in it.by_ref() {
                if !c.is_ascii_digit() {
                    return false;
                }
                chiffres_exposant += 1;
            }
            return chiffres_exposant > 0;
        } else {
            return false;
        }
    }

    chiffres > 0 && !apres_groupe
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sep(tag: &str) -> Separateurs {
        Locale::resoudre(tag)
            .unwrap_or_else(|| panic!("locale {tag} absente"))
            .separateurs()
    }

    #[test]
    fn table_triee_sans_doublon() {
        let tags: Vec<&str> = Locale::toutes().map(|l| l.tag()).collect();
        let mut tries = tags.clone();
        tries.sort_unstable();
        tries.dedup();
        assert_eq!(tags, tries);
    }

    #[test]
    fn validateur_en_us() {
        let s = sep("en-US");
        for ok in ["0", "12", "-12", "+1.5", "1,000", "1,000.25", ".5", "5.", "1e5", "1E-5", "2.5e+10", "  42  "] {
            assert!(est_nombre_valide(ok, s), "devrait être valide: {ok:?}");
        }
        for ko in ["", "-", ".", ",1", "1,,0", "1,", "1.2.3", "1.5,0", "1e", "1e+", "e5", "1,e5", "abc", "1 2"] {
            assert!(!est_nombre_valide(ko, s), "devrait être invalide: {ko:?}");
        }
    }

    #[test]
    fn validateur_de_de() {
        let s = sep("de-DE");
        assert!(est_nombre_valide("1.234,5", s));
        assert!(est_nombre_valide("-0,75", s));
        assert!(!est_nombre_valide("1,234.5", s));
    }

    #[test]
    fn validateur_fr_fr_groupe_insecable() {
        let s = sep("fr-FR");
        assert!(est_nombre_valide("1\u{202F}000,5", s));
        assert!(!est_nombre_valide("1.5", s));
    }

    #[test]
    fn resolution_formes_diverses() {
        assert_eq!(Locale::resoudre("fr_fr").map(|l| l.tag()), Some("fr-FR"));
        assert_eq!(Locale::resoudre("DE-de").map(|l| l.tag()), Some("de-DE"));
        assert_eq!(Locale::resoudre("de").map(|l| l.tag()), Some("de-DE"));
        assert_eq!(Locale::resoudre("nl").map(|l| l.tag()), Some("nl-NL"));
        assert_eq!(Locale::resoudre("xx-YY"), None);
        // deuxième appel : servi par le cache
        assert_eq!(Locale::resoudre("fr_fr").map(|l| l.tag()), Some("fr-FR"));
    }

    #[test]
    fn detection_deterministe() {
        // "1,5" est valide en en-US (groupe) : le premier candidat gagne toujours
        assert_eq!(Locale::detecter("1,5").map(|l| l.tag()), Some("en-US"));
        assert_eq!(Locale::detecter("1,5").map(|l| l.tag()), Some("en-US"));
        // "1.234,5" : refusé par en-US, accepté par fr-FR ? non ('.' n'y est pas groupe) -> de-DE
        assert_eq!(Locale::detecter("1.234,5").map(|l| l.tag()), Some("de-DE"));
        // apostrophe typographique : seulement les locales suisses
        assert_eq!(Locale::detecter("1’000.5").map(|l| l.tag()), Some("de-CH"));
        assert_eq!(Locale::detecter("abc"), None);
    }
}
