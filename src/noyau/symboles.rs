// src/noyau/symboles.rs
//
// Table des symboles : construite une fois (OnceLock), lecture seule ensuite.
//
// - un Descripteur par symbole : précédence, associativité, genre, action
// - l'arité découle de l'action (constante 0, unaire 1, binaire 2, plage 3, agrégat N)
// - clés en minuscules ; comparaison insensible à la casse ASCII, sauf `B` (bêta)
// - `plus_long_prefixe` : "sinh" gagne sur "sin", "sin⁻¹" sur "sin"

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use super::decimal::Decimal;
use super::erreurs::Resultat;
use super::fonctions as f;
use super::reglages::Reglages;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Associativite {
    Gauche,
    Droite,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Genre {
    /// opérateur infixe binaire
    Operateur,
    /// opérateur postfixe (factorielle)
    Postfixe,
    Fonction,
    /// liste d'arguments évalués un à un (sum, avg, median)
    Agregat,
    /// indice + bornes + sous-expression (∑, ∏)
    Plage,
    Constante,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypePlage {
    Somme,
    Produit,
}

pub type FnConstante = fn(&Reglages) -> Decimal;
pub type FnUnaire = fn(&Decimal, &Reglages) -> Resultat<Decimal>;
pub type FnBinaire = fn(&Decimal, &Decimal, &Reglages) -> Resultat<Decimal>;
pub type FnCouple = fn(&Decimal, &Decimal, &Reglages) -> Resultat<(Decimal, Decimal)>;
pub type FnVariadique = fn(&[Decimal], &Reglages) -> Resultat<Decimal>;

#[derive(Clone, Copy)]
pub enum Action {
    Constante(FnConstante),
    Unaire(FnUnaire),
    Binaire(FnBinaire),
    /// binaire dont le résultat est un couple (Pol, Rec)
    Couple(FnCouple),
    Variadique(FnVariadique),
    Plage(TypePlage),
}

impl Action {
    /// None : nombre d'arguments libre (agrégats).
    pub fn arite(&self) -> Option<usize> {
        match self {
            Action::Constante(_) => Some(0),
            Action::Unaire(_) => Some(1),
            Action::Binaire(_) | Action::Couple(_) => Some(2),
            Action::Plage(_) => Some(3),
            Action::Variadique(_) => None,
        }
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Constante(_) => f.write_str("Constante"),
            Action::Unaire(_) => f.write_str("Unaire"),
            Action::Binaire(_) => f.write_str("Binaire"),
            Action::Couple(_) => f.write_str("Couple"),
            Action::Variadique(_) => f.write_str("Variadique"),
            Action::Plage(t) => write!(f, "Plage({t:?})"),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Descripteur {
    pub symbole: &'static str,
    pub precedence: u8,
    pub associativite: Associativite,
    pub genre: Genre,
    pub sensible_casse: bool,
    pub action: Action,
}

impl Descripteur {
    pub fn arite(&self) -> Option<usize> {
        self.action.arite()
    }

    pub fn est_fonction(&self) -> bool {
        matches!(self.genre, Genre::Fonction | Genre::Agregat | Genre::Plage)
    }

    /// `texte` commence-t-il par ce symbole ?
    fn prefixe_de(&self, texte: &str) -> bool {
        let n = self.symbole.len();
        if texte.len() < n || !texte.is_char_boundary(n) {
            return false;
        }
        let tete = &texte[..n];
        if self.sensible_casse {
            tete == self.symbole
        } else {
            tete.eq_ignore_ascii_case(self.symbole)
        }
    }
}

/* ------------------------ Constructeurs ------------------------ */

const PREC_ADDITIF: u8 = 2;
const PREC_MULTIPLICATIF: u8 = 3;
const PREC_PUISSANCE: u8 = 5;
const PREC_POSTFIXE: u8 = 6;
const PREC_FONCTION: u8 = 10;

fn operateur(symbole: &'static str, precedence: u8, associativite: Associativite, action: FnBinaire) -> Descripteur {
    Descripteur {
        symbole,
        precedence,
        associativite,
        genre: Genre::Operateur,
        sensible_casse: false,
        action: Action::Binaire(action),
    }
}

fn fonction(symbole: &'static str, action: Action) -> Descripteur {
    Descripteur {
        symbole,
        precedence: PREC_FONCTION,
        associativite: Associativite::Gauche,
        genre: Genre::Fonction,
        sensible_casse: false,
        action,
    }
}

fn unaire(symbole: &'static str, action: FnUnaire) -> Descripteur {
    fonction(symbole, Action::Unaire(action))
}

fn binaire(symbole: &'static str, action: FnBinaire) -> Descripteur {
    fonction(symbole, Action::Binaire(action))
}

fn avec_genre(mut d: Descripteur, genre: Genre) -> Descripteur {
    d.genre = genre;
    d
}

fn constante(symbole: &'static str, action: FnConstante) -> Descripteur {
    avec_genre(fonction(symbole, Action::Constante(action)), Genre::Constante)
}

fn agregat(symbole: &'static str, action: FnVariadique) -> Descripteur {
    avec_genre(fonction(symbole, Action::Variadique(action)), Genre::Agregat)
}

fn plage(symbole: &'static str, t: TypePlage) -> Descripteur {
    avec_genre(fonction(symbole, Action::Plage(t)), Genre::Plage)
}

fn descripteurs() -> Vec<Descripteur> {
    use Associativite::*;

    let mut v = vec![
        // opérateurs
        operateur("+", PREC_ADDITIF, Gauche, f::plus),
        operateur("-", PREC_ADDITIF, Gauche, f::moins),
        operateur("*", PREC_MULTIPLICATIF, Gauche, f::fois),
        operateur("×", PREC_MULTIPLICATIF, Gauche, f::fois),
        operateur("/", PREC_MULTIPLICATIF, Gauche, f::divise),
        operateur("÷", PREC_MULTIPLICATIF, Gauche, f::divise),
        operateur("%", PREC_MULTIPLICATIF, Gauche, f::modulo),
        operateur("^", PREC_PUISSANCE, Droite, f::puissance),
        Descripteur {
            symbole: "!",
            precedence: PREC_POSTFIXE,
            associativite: Gauche,
            genre: Genre::Postfixe,
            sensible_casse: false,
            action: Action::Unaire(f::factorielle),
        },
        // constantes
        constante("pi", f::pi),
        constante("π", f::pi),
        constante("e", f::e),
        // élémentaires
        unaire("neg", f::neg),
        unaire("abs", f::abs),
        unaire("floor", f::plancher),
        unaire("ceil", f::plafond),
        unaire("round", f::arrondi),
        unaire("frac", f::frac),
        unaire("sign", f::signe),
        unaire("fact", f::factorielle),
        // racines
        unaire("sqrt", f::racine_carree),
        unaire("√", f::racine_carree),
        unaire("cbrt", f::racine_cubique),
        unaire("³√", f::racine_cubique),
        binaire("rootn", f::racine_n),
        // logarithmes
        unaire("ln", f::ln),
        unaire("log", f::log10),
        unaire("log10", f::log10),
        unaire("log2", f::log2),
        binaire("logbase", f::logbase),
        unaire("exp", f::exp),
        // combinatoire, arithmétique, hasard
        binaire("ncr", f::combinaisons),
        binaire("comb", f::combinaisons),
        binaire("npr", f::arrangements),
        binaire("perm", f::arrangements),
        binaire("gcd", f::pgcd),
        binaire("lcm", f::ppcm),
        binaire("randint", f::entier_aleatoire),
        // spéciales
        unaire("gamma", f::gamma),
        unaire("Γ", f::gamma),
        binaire("beta", f::beta),
        Descripteur {
            sensible_casse: true,
            ..binaire("B", f::beta)
        },
        // coordonnées
        fonction("pol", Action::Couple(f::polaire)),
        fonction("rec", Action::Couple(f::cartesien)),
        binaire("atan2", f::atan2),
        // agrégats et plages
        agregat("sum", f::somme),
        agregat("avg", f::moyenne),
        agregat("average", f::moyenne),
        agregat("median", f::mediane),
        plage("∑", TypePlage::Somme),
        plage("∏", TypePlage::Produit),
        plage("prod", TypePlage::Produit),
    ];

    // trigonométrie et hyperboliques : forme directe, a-préfixée, suffixe ⁻¹
    let familles: [(&'static str, &'static str, &'static str, FnUnaire, FnUnaire); 8] = [
        ("sin", "asin", "sin⁻¹", f::sin, f::asin),
        ("cos", "acos", "cos⁻¹", f::cos, f::acos),
        ("tan", "atan", "tan⁻¹", f::tan, f::atan),
        ("cot", "acot", "cot⁻¹", f::cot, f::acot),
        ("sinh", "asinh", "sinh⁻¹", f::sinh, f::asinh),
        ("cosh", "acosh", "cosh⁻¹", f::cosh, f::acosh),
        ("tanh", "atanh", "tanh⁻¹", f::tanh, f::atanh),
        ("coth", "acoth", "coth⁻¹", f::coth, f::acoth),
    ];
    for (direct, inverse, suffixe, fd, fi) in familles {
        v.push(unaire(direct, fd));
        v.push(unaire(inverse, fi));
        v.push(unaire(suffixe, fi));
    }

    v
}

/* ------------------------ Table ------------------------ */

pub struct TableSymboles {
    par_cle: HashMap<&'static str, Descripteur>,
    /// symboles triés par longueur décroissante (octets), pour le plus long préfixe
    par_longueur: Vec<&'static str>,
}

impl TableSymboles {
    fn construire() -> Self {
        let mut par_cle = HashMap::new();
        for d in descripteurs() {
            par_cle.insert(d.symbole, d);
        }

        let mut par_longueur: Vec<&'static str> = par_cle.keys().copied().collect();
        par_longueur.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));

        Self {
            par_cle,
            par_longueur,
        }
    }

    /// Recherche exacte, puis insensible à la casse ASCII.
    pub fn get(&self, symbole: &str) -> Option<&Descripteur> {
        if let Some(d) = self.par_cle.get(symbole) {
            return Some(d);
        }
        let bas = symbole.to_ascii_lowercase();
        self.par_cle.get(bas.as_str()).filter(|d| !d.sensible_casse)
    }

    /// Symbole le plus long qui préfixe `texte`.
    pub fn plus_long_prefixe(&self, texte: &str) -> Option<&Descripteur> {
        self.par_longueur
            .iter()
            .filter_map(|s| self.par_cle.get(s))
            .find(|d| d.prefixe_de(texte))
    }

    pub fn symboles(&self) -> impl Iterator<Item = &Descripteur> {
        self.par_longueur.iter().filter_map(|s| self.par_cle.get(s))
    }
}

static TABLE: OnceLock<TableSymboles> = OnceLock::new();

/// Table process-wide (construite au premier accès).
pub fn table() -> &'static TableSymboles {
    TABLE.get_or_init(TableSymboles::construire)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefixe(texte: &str) -> Option<&'static str> {
        table().plus_long_prefixe(texte).map(|d| d.symbole)
    }

    #[test]
    fn plus_long_prefixe_gagne() {
        assert_eq!(prefixe("sinh(2)"), Some("sinh"));
        assert_eq!(prefixe("sin(2)"), Some("sin"));
        assert_eq!(prefixe("sin⁻¹(0.5)"), Some("sin⁻¹"));
        assert_eq!(prefixe("sinh⁻¹(1)"), Some("sinh⁻¹"));
        assert_eq!(prefixe("log10(5)"), Some("log10"));
        assert_eq!(prefixe("logbase(8;2)"), Some("logbase"));
        assert_eq!(prefixe("exp(1)"), Some("exp"));
        assert_eq!(prefixe("e^2"), Some("e"));
        assert_eq!(prefixe("average(1;2)"), Some("average"));
        assert_eq!(prefixe("x"), None);
    }

    #[test]
    fn casse() {
        assert_eq!(prefixe("SIN(1)"), Some("sin"));
        assert_eq!(prefixe("nCr(5;2)"), Some("ncr"));
        assert_eq!(prefixe("RandInt(1;6)"), Some("randint"));
        assert_eq!(prefixe("PI"), Some("pi"));
        assert_eq!(prefixe("B(2;3)"), Some("B"));
        assert_eq!(prefixe("b(2;3)"), None);
        assert!(table().get("GCD").is_some());
        assert!(table().get("b").is_none());
    }

    #[test]
    fn arites_et_associativite() {
        let t = table();
        assert_eq!(t.get("^").map(|d| d.associativite), Some(Associativite::Droite));
        assert_eq!(t.get("-").map(|d| d.associativite), Some(Associativite::Gauche));
        assert_eq!(t.get("!").map(|d| d.genre), Some(Genre::Postfixe));
        assert_eq!(t.get("pi").and_then(|d| d.arite()), Some(0));
        assert_eq!(t.get("sqrt").and_then(|d| d.arite()), Some(1));
        assert_eq!(t.get("rootn").and_then(|d| d.arite()), Some(2));
        assert_eq!(t.get("∑").and_then(|d| d.arite()), Some(3));
        assert_eq!(t.get("median").and_then(|d| d.arite()), None);
        assert!(t.get("*").map(|d| d.precedence) > t.get("+").map(|d| d.precedence));
        assert!(t.get("^").map(|d| d.precedence) > t.get("/").map(|d| d.precedence));
    }

    #[test]
    fn symboles_uniques() {
        // un doublon dans la liste serait écrasé silencieusement par la HashMap
        assert_eq!(descripteurs().len(), table().symboles().count());
    }
}
