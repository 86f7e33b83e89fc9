// src/noyau/jetons.rs
//
// Tokenisation : texte -> jetons, via la table des symboles.
//
// Passe principale (espaces retirés) :
// - nombre : scan glouton puis raccourci jusqu'à ce que le validateur de la locale accepte ;
//   signe accepté seulement en position d'opérande (début, après '(' / ';' / opérateur / fonction)
// - symbole : plus long préfixe dans la table ; constantes remplacées par leur valeur
// - agrégats / plages : arguments capturés en texte brut (évalués plus tard, par ré-entrée)
// - |x| : barre ouvrante = abs(, barre fermante = )
//
// Normalisation (une passe chacune, dans cet ordre) :
// (a) nombre signé après ')' ou '!' : scindé en opérateur + nombre
// (b) multiplication implicite entre opérandes adjacents
// (c) suite de +/- : un seul opérateur, '-' si le nombre de '-' est impair
// (d) signe en position d'opérande : fusionné au nombre suivant, sinon '-' -> neg et '+' ignoré

use super::erreurs::{Erreur, Resultat};
use super::format::format_decimal;
use super::locale::{est_nombre_valide, Separateurs};
use super::reglages::Reglages;
use super::symboles::{table, Action, Genre};

/// Indice implicite de ∑(début; fin; expr).
pub const INDICE_DEFAUT: &str = "k";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Tok {
    /// littéral dans la locale du moteur (constantes comprises)
    Nombre(String),
    Operateur(&'static str),
    Fonction(&'static str),
    ParG,
    ParD,
    PointVirgule,
    Agregat {
        symbole: &'static str,
        arguments: Vec<String>,
    },
    Plage {
        symbole: &'static str,
        indice: String,
        debut: String,
        fin: String,
        corps: String,
    },
}

impl Tok {
    fn est_postfixe(&self) -> bool {
        match self {
            Tok::Operateur(s) => table().get(s).is_some_and(|d| d.genre == Genre::Postfixe),
            _ => false,
        }
    }

    /// Le jeton suivant est-il en position d'opérande ?
    fn ouvre_operande(&self) -> bool {
        match self {
            Tok::ParG | Tok::PointVirgule | Tok::Fonction(_) => true,
            Tok::Operateur(_) => !self.est_postfixe(),
            _ => false,
        }
    }

    /// Fin d'opérande (gauche d'une multiplication implicite).
    fn ferme_operande(&self) -> bool {
        matches!(
            self,
            Tok::Nombre(_) | Tok::ParD | Tok::Agregat { .. } | Tok::Plage { .. }
        ) || self.est_postfixe()
    }

    /// Début d'opérande (droite d'une multiplication implicite).
    fn debute_operande(&self) -> bool {
        matches!(
            self,
            Tok::Nombre(_) | Tok::ParG | Tok::Fonction(_) | Tok::Agregat { .. } | Tok::Plage { .. }
        )
    }

    fn est_signe(&self) -> bool {
        matches!(self, Tok::Operateur("+" | "-"))
    }
}

fn position_operande(precedent: Option<&Tok>) -> bool {
    precedent.map_or(true, Tok::ouvre_operande)
}

/// '(' d'un appel à plusieurs arguments : rootn(a,n), Pol(x,y), gcd(a,b)...
fn ouvre_appel_multiple(precedent: Option<&Tok>) -> bool {
    match precedent {
        Some(Tok::Fonction(s)) => table()
            .get(s)
            .and_then(|d| d.arite())
            .is_some_and(|n| n >= 2),
        _ => false,
    }
}

/* ------------------------ Nombres ------------------------ */

/// Séparateur de groupe suivi d'exactement 3 chiffres.
fn groupe_complet(suite: &[(usize, char)]) -> bool {
    suite.len() >= 3
        && suite[..3].iter().all(|(_, c)| c.is_ascii_digit())
        && suite.get(3).map_or(true, |(_, c)| !c.is_ascii_digit())
}

/// 'e' suivi d'un exposant (signe optionnel + au moins un chiffre) : longueur de la suite.
fn longueur_exposant(suite: &[(usize, char)]) -> Option<usize> {
    let mut j = 0;
    if matches!(suite.first(), Some((_, '+' | '-'))) {
        j = 1;
    }
    let debut = j;
    while suite.get(j).is_some_and(|(_, c)| c.is_ascii_digit()) {
        j += 1;
    }
    (j > debut).then_some(j)
}

/// Longueur (octets) du plus long littéral valide en tête de `reste`.
fn longueur_nombre(reste: &str, sep: Separateurs) -> Option<usize> {
    let cars: Vec<(usize, char)> = reste.char_indices().collect();

    let mut j = 0;
    if matches!(cars.first(), Some((_, '+' | '-'))) {
        j = 1;
    }

    let mut vu_decimal = false;
    while let Some(&(_, c)) = cars.get(j) {
        if c.is_ascii_digit() {
            j += 1;
        } else if c == sep.decimal && !vu_decimal {
            vu_decimal = true;
            j += 1;
        } else if Some(c) == sep.groupe && !vu_decimal && groupe_complet(&cars[j + 1..]) {
            j += 1;
        } else if c == 'e' || c == 'E' {
            if let Some(n) = longueur_exposant(&cars[j + 1..]) {
                j += 1 + n;
            }
            break;
        } else {
            break;
        }
    }

    let fin = |k: usize| cars.get(k).map_or(reste.len(), |(b, _)| *b);
    (1..=j)
        .rev()
        .map(fin)
        .find(|&n| est_nombre_valide(&reste[..n], sep))
}

/* ------------------------ Arguments capturés ------------------------ */

/// Octet juste après la ')' fermant la '(' située en `debut`.
fn fermeture(texte: &str, debut: usize) -> Option<usize> {
    let mut profondeur = 0usize;
    for (i, c) in texte[debut..].char_indices() {
        match c {
            '(' => profondeur += 1,
            ')' => {
                profondeur = profondeur.checked_sub(1)?;
                if profondeur == 0 {
                    return Some(debut + i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

/// Découpe au niveau 0 sur ';' (et ',' si c'est un séparateur de liste dans cette locale).
pub(crate) fn decouper_arguments(interieur: &str, virgule: bool) -> Vec<String> {
    let mut out = Vec::new();
    let mut profondeur = 0usize;
    let mut courant = String::new();
    for c in interieur.chars() {
        match c {
            '(' => profondeur += 1,
            ')' => profondeur = profondeur.saturating_sub(1),
            ';' if profondeur == 0 => {
                out.push(std::mem::take(&mut courant));
                continue;
            }
            ',' if virgule && profondeur == 0 => {
                out.push(std::mem::take(&mut courant));
                continue;
            }
            _ => {}
        }
        courant.push(c);
    }
    out.push(courant);
    out
}

pub(crate) fn est_identifiant(s: &str) -> bool {
    let mut it = s.chars();
    it.next().is_some_and(|c| c.is_ascii_alphabetic())
        && it.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn contient_virgule_liste(interieur: &str) -> bool {
    let mut profondeur = 0usize;
    for c in interieur.chars() {
        match c {
            '(' => profondeur += 1,
            ')' => profondeur = profondeur.saturating_sub(1),
            ',' if profondeur == 0 => return true,
            _ => {}
        }
    }
    false
}

/// Jeton de plage à partir de (début; fin; expr) ou (indice; début; fin; expr).
fn jeton_plage(symbole: &'static str, mut args: Vec<String>, position: usize) -> Resultat<Tok> {
    let indice = match args.len() {
        3 => INDICE_DEFAUT.to_string(),
        4 => {
            let i = args.remove(0);
            if !est_identifiant(&i) {
                return Err(Erreur::syntaxe(position, format!("indice invalide: {i:?}")));
            }
            i
        }
        _ => {
            return Err(Erreur::syntaxe(
                position,
                format!("{symbole} attend (début; fin; expression)"),
            ))
        }
    };
    let mut it = args.into_iter();
    match (it.next(), it.next(), it.next()) {
        (Some(debut), Some(fin), Some(corps)) => Ok(Tok::Plage {
            symbole,
            indice,
            debut,
            fin,
            corps,
        }),
        _ => Err(Erreur::syntaxe(position, format!("{symbole} : arguments manquants"))),
    }
}

/* ------------------------ Tokenisation ------------------------ */

/// Position (en caractères, dans l'entrée d'origine) d'un octet du texte compacté.
struct Positions {
    origine: Vec<usize>,
    octets: Vec<usize>,
}

impl Positions {
    fn de(&self, octet: usize) -> usize {
        match self.octets.binary_search(&octet) {
            Ok(i) => self.origine[i],
            Err(i) => self.origine.get(i).copied().unwrap_or(self.origine.len()),
        }
    }
}

fn compacter(entree: &str) -> (String, Positions) {
    let mut texte = String::with_capacity(entree.len());
    let mut pos = Positions {
        origine: Vec::new(),
        octets: Vec::new(),
    };
    for (i, c) in entree.chars().enumerate().filter(|(_, c)| !c.is_whitespace()) {
        pos.octets.push(texte.len());
        pos.origine.push(i);
        texte.push(c);
    }
    (texte, pos)
}

/// Tokenize une expression dans la locale des réglages.
///
/// Exemple (en-US) : "2(3)-sin(x)" -> [2, *, (, 3, ), -, sin, (, x, )] (x déjà substitué)
pub fn tokenize(entree: &str, reglages: &Reglages) -> Resultat<Vec<Tok>> {
    let (texte, positions) = compacter(entree);
    let sep = reglages.locale.separateurs();
    let virgule_liste = sep.decimal != ',';
    let t = table();

    let mut out: Vec<Tok> = Vec::new();
    let mut barres_ouvertes = 0usize;
    // une entrée par '(' ouverte : vrai si ',' y sépare les arguments
    let mut appels: Vec<bool> = Vec::new();
    let mut i = 0usize;

    while i < texte.len() {
        let reste = &texte[i..];
        let Some(c) = reste.chars().next() else {
            break;
        };
        let position = positions.de(i);

        // 1) nombre (signé seulement en position d'opérande)
        let signe_ok = (c == '+' || c == '-') && position_operande(out.last());
        if c.is_ascii_digit() || c == sep.decimal || signe_ok {
            // dans rootn(8,125), la virgule sépare les arguments, pas les milliers
            let dans_appel = appels.last() == Some(&true);
            let sep_nombre = if virgule_liste && dans_appel && sep.groupe == Some(',') {
                Separateurs { groupe: None, ..sep }
            } else {
                sep
            };
            if let Some(n) = longueur_nombre(reste, sep_nombre) {
                if reste[n..].starts_with(sep.decimal) {
                    return Err(Erreur::syntaxe(positions.de(i + n), "séparateur décimal en trop"));
                }
                out.push(Tok::Nombre(reste[..n].to_string()));
                i += n;
                continue;
            }
        }

        // 2) ponctuation
        match c {
            '(' => {
                appels.push(ouvre_appel_multiple(out.last()));
                out.push(Tok::ParG);
            }
            ')' => {
                appels.pop();
                out.push(Tok::ParD);
            }
            ';' => out.push(Tok::PointVirgule),
            ',' if virgule_liste => out.push(Tok::PointVirgule),
            '|' => {
                if barres_ouvertes == 0 || position_operande(out.last()) {
                    out.push(Tok::Fonction("abs"));
                    out.push(Tok::ParG);
                    appels.push(false);
                    barres_ouvertes += 1;
                } else {
                    out.push(Tok::ParD);
                    appels.pop();
                    barres_ouvertes -= 1;
                }
            }
            _ => {
                // 3) symbole de la table
                let Some(d) = t.plus_long_prefixe(reste) else {
                    return Err(Erreur::syntaxe(position, format!("caractère inattendu '{c}'")));
                };
                i += d.symbole.len();

                match (d.genre, d.action) {
                    (Genre::Constante, Action::Constante(f)) => {
                        out.push(Tok::Nombre(format_decimal(&f(reglages), reglages.locale)));
                    }
                    (Genre::Operateur | Genre::Postfixe, _) => out.push(Tok::Operateur(d.symbole)),
                    (Genre::Agregat | Genre::Plage, _) => {
                        if !texte[i..].starts_with('(') {
                            return Err(Erreur::syntaxe(
                                positions.de(i),
                                format!("'(' attendue après {}", d.symbole),
                            ));
                        }
                        let fin = fermeture(&texte, i)
                            .ok_or_else(|| Erreur::syntaxe(position, "parenthèses non fermées"))?;
                        let interieur = &texte[i + 1..fin - 1];
                        i = fin;

                        let liste = virgule_liste && contient_virgule_liste(interieur);
                        let args = decouper_arguments(interieur, virgule_liste);

                        // sum(a; b; expr) ou sum(i; a; b; expr) : somme sur un indice
                        let plage = d.genre == Genre::Plage
                            || (d.symbole == "sum"
                                && !liste
                                && (args.len() == 3
                                    || (args.len() == 4 && est_identifiant(&args[0]))));

                        if plage {
                            let symbole = match d.action {
                                Action::Plage(_) => d.symbole,
                                _ => "∑",
                            };
                            out.push(jeton_plage(symbole, args, position)?);
                        } else {
                            out.push(Tok::Agregat {
                                symbole: d.symbole,
                                arguments: args,
                            });
                        }
                    }
                    _ => out.push(Tok::Fonction(d.symbole)),
                }
                continue;
            }
        }
        i += c.len_utf8();
    }

    let out = scinder_signes(out);
    let out = multiplications_implicites(out);
    let out = fusionner_signes(out);
    Ok(signes_unaires(out))
}

/* ------------------------ Normalisation ------------------------ */

/// (a) "(2)-5" : Nombre("-5") après ')' ou '!' -> Operateur("-"), Nombre("5").
fn scinder_signes(jetons: Vec<Tok>) -> Vec<Tok> {
    let mut out: Vec<Tok> = Vec::with_capacity(jetons.len());
    for j in jetons {
        let apres_ferme = out.last().is_some_and(|p| matches!(p, Tok::ParD) || p.est_postfixe());
        match j {
            Tok::Nombre(n) if apres_ferme && (n.starts_with('-') || n.starts_with('+')) => {
                let (signe, corps) = n.split_at(1);
                out.push(Tok::Operateur(if signe == "-" { "-" } else { "+" }));
                out.push(Tok::Nombre(corps.to_string()));
            }
            j => out.push(j),
        }
    }
    out
}

/// (b) "2(3)", "(2)(3)", "2pi", "3sin(x)", "2!3" : insère '*'.
fn multiplications_implicites(jetons: Vec<Tok>) -> Vec<Tok> {
    let mut out: Vec<Tok> = Vec::with_capacity(jetons.len() * 2);
    for j in jetons {
        if out.last().is_some_and(Tok::ferme_operande) && j.debute_operande() {
            out.push(Tok::Operateur("*"));
        }
        out.push(j);
    }
    out
}

/// (c) "5---2" : la suite "- -" devient '+', "- - -" devient '-'.
fn fusionner_signes(jetons: Vec<Tok>) -> Vec<Tok> {
    let mut out: Vec<Tok> = Vec::with_capacity(jetons.len());
    for j in jetons {
        if j.est_signe() {
            if let Some(prec) = out.last_mut().filter(|p| p.est_signe()) {
                let negatif = (*prec == Tok::Operateur("-")) != (j == Tok::Operateur("-"));
                *prec = Tok::Operateur(if negatif { "-" } else { "+" });
                continue;
            }
        }
        out.push(j);
    }
    out
}

fn changer_signe(n: &str) -> String {
    match n.strip_prefix('-') {
        Some(corps) => corps.to_string(),
        None => format!("-{}", n.strip_prefix('+').unwrap_or(n)),
    }
}

/// (d) signe en position d'opérande : "-(2+3)" -> neg(2+3) ; "+x" -> x ; "-(-3)" garde sa forme.
///
/// `neg` a la précédence d'une fonction et lie avant '^' : "-(2)^2" vaut 4, et "-a^2"
/// avec a = 3 vaut 9 (la variable est substituée par "(3)"). Pour -9, écrire "0-a^2".
fn signes_unaires(jetons: Vec<Tok>) -> Vec<Tok> {
    let mut out: Vec<Tok> = Vec::with_capacity(jetons.len());
    let mut it = jetons.into_iter().peekable();
    while let Some(j) = it.next() {
        if j.est_signe() && position_operande(out.last()) {
            let moins = j == Tok::Operateur("-");
            match it.next_if(|t| matches!(t, Tok::Nombre(_))) {
                Some(Tok::Nombre(n)) if moins => out.push(Tok::Nombre(changer_signe(&n))),
                Some(nombre) => out.push(nombre),
                None if moins => out.push(Tok::Fonction("neg")),
                None => {}
            }
            continue;
        }
        out.push(j);
    }
    out
}

/// Format utilitaire (traces / tests) : liste de jetons en texte.
pub fn format_tokens(tokens: &[Tok]) -> String {
    let mut out = Vec::with_capacity(tokens.len());
    for t in tokens {
        let s = match t {
            Tok::Nombre(n) => n.clone(),
            Tok::Operateur(s) | Tok::Fonction(s) => (*s).to_string(),
            Tok::ParG => "(".to_string(),
            Tok::ParD => ")".to_string(),
            Tok::PointVirgule => ";".to_string(),
            Tok::Agregat { symbole, arguments } => format!("{symbole}[{}]", arguments.join("; ")),
            Tok::Plage {
                symbole,
                indice,
                debut,
                fin,
                corps,
            } => format!("{symbole}[{indice}={debut}..{fin}: {corps}]"),
        };
        out.push(s);
    }
    out.join(" ")
}
