// src/noyau/variables.rs
//
// Variables nommées : nom -> expression (texte, dans la locale du moteur).
//
// - noms : [A-Za-z][A-Za-z0-9_]*, sensibles à la casse
// - cycles détectés sur toute la table AVANT la moindre substitution
// - substitution textuelle : chaque référence devient "(développement)", mémoïsé
// - un mot peut coller variables, symboles et chiffres ("2ab", "xsin") ; à longueur égale
//   la variable gagne sur le symbole
// - arguments d'agrégats et de plages : laissés tels quels, ils sont ré-évalués
//   plus tard avec les variables (et l'indice de la plage)

use std::collections::{BTreeMap, HashMap};

use super::erreurs::{Erreur, Resultat};
use super::jetons::est_identifiant;
use super::symboles::{table, Genre};

/// Table des variables d'une évaluation.
pub type Variables = BTreeMap<String, String>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Sorte {
    Variable,
    Symbole(Genre),
    Chiffres,
}

/// Morceau d'un mot : plage d'octets relative au mot.
#[derive(Clone, Copy, Debug)]
struct Morceau {
    debut: usize,
    fin: usize,
    sorte: Sorte,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// erreur sur mot inconnu ; arguments d'agrégats et de plages ignorés
    Substitution,
    /// tout le texte, mots inconnus ignorés
    Dependances,
}

/* ------------------------ Balayage ------------------------ */

/// Longueur d'un littéral ASCII (chiffres, '.' ',' et exposant) en tête de `reste`.
fn longueur_litteral(reste: &[u8]) -> usize {
    let mut i = 0;
    while i < reste.len() && (reste[i].is_ascii_digit() || reste[i] == b'.' || reste[i] == b',') {
        i += 1;
    }
    if i < reste.len() && (reste[i] == b'e' || reste[i] == b'E') {
        let mut j = i + 1;
        if j < reste.len() && (reste[j] == b'+' || reste[j] == b'-') {
            j += 1;
        }
        if j < reste.len() && reste[j].is_ascii_digit() {
            while j < reste.len() && reste[j].is_ascii_digit() {
                j += 1;
            }
            i = j;
        }
    }
    i
}

fn longueur_mot(reste: &[u8]) -> usize {
    reste
        .iter()
        .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
        .count()
}

/// Découpe un mot en variables, symboles et chiffres (plus long préfixe d'abord).
/// None si un reste ne correspond à rien.
fn decomposer(mot: &str, variables: &Variables) -> Option<Vec<Morceau>> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < mot.len() {
        let reste = &mot[i..];

        let chiffres = reste.bytes().take_while(|b| b.is_ascii_digit()).count();
        if chiffres > 0 {
            out.push(Morceau {
                debut: i,
                fin: i + chiffres,
                sorte: Sorte::Chiffres,
            });
            i += chiffres;
            continue;
        }

        let n_var = variables
            .keys()
            .filter(|k| !k.is_empty() && reste.starts_with(k.as_str()))
            .map(String::len)
            .max()
            .unwrap_or(0);
        let symbole = table().plus_long_prefixe(reste);
        let n_sym = symbole.map_or(0, |d| d.symbole.len());

        let (n, sorte) = match symbole {
            _ if n_var > 0 && n_var >= n_sym => (n_var, Sorte::Variable),
            Some(d) => (n_sym, Sorte::Symbole(d.genre)),
            None => return None,
        };
        out.push(Morceau {
            debut: i,
            fin: i + n,
            sorte,
        });
        i += n;
    }
    Some(out)
}

/// Octet juste après la ')' fermant la '(' en `debut` (fin du texte si jamais fermée).
fn apres_fermeture(octets: &[u8], debut: usize) -> usize {
    let mut profondeur = 0usize;
    for (i, b) in octets.iter().enumerate().skip(debut) {
        match b {
            b'(' => profondeur += 1,
            b')' => {
                profondeur = profondeur.saturating_sub(1);
                if profondeur == 0 {
                    return i + 1;
                }
            }
            _ => {}
        }
    }
    octets.len()
}

fn ouvre_capture(genre: Genre) -> bool {
    matches!(genre, Genre::Agregat | Genre::Plage)
}

/// Plages d'octets (dans `texte`) des références à des variables.
fn references(texte: &str, variables: &Variables, mode: Mode) -> Resultat<Vec<(usize, usize)>> {
    let octets = texte.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;

    while i < octets.len() {
        let b = octets[i];

        if b.is_ascii_digit() {
            i += longueur_litteral(&octets[i..]);
            continue;
        }

        if b.is_ascii_alphabetic() {
            let fin = i + longueur_mot(&octets[i..]);
            let mot = &texte[i..fin];

            let Some(morceaux) = decomposer(mot, variables) else {
                if mode == Mode::Substitution {
                    return Err(Erreur::VariableIndefinie(mot.to_string()));
                }
                i = fin;
                continue;
            };

            for m in &morceaux {
                if m.sorte == Sorte::Variable {
                    out.push((i + m.debut, i + m.fin));
                }
            }
            i = fin;

            let capture = matches!(morceaux.last(), Some(m) if matches!(m.sorte, Sorte::Symbole(g) if ouvre_capture(g)));
            if capture && mode == Mode::Substitution && octets.get(i) == Some(&b'(') {
                i = apres_fermeture(octets, i);
            }
            continue;
        }

        // glyphes (∑, ∏, π, √…)
        if !b.is_ascii() {
            if let Some(d) = table().plus_long_prefixe(&texte[i..]) {
                i += d.symbole.len();
                if ouvre_capture(d.genre) && mode == Mode::Substitution && octets.get(i) == Some(&b'(') {
                    i = apres_fermeture(octets, i);
                }
                continue;
            }
            i += texte[i..].chars().next().map_or(1, char::len_utf8);
            continue;
        }

        i += 1;
    }

    Ok(out)
}

/* ------------------------ Cycles ------------------------ */

#[derive(Clone, Copy, PartialEq, Eq)]
enum Etat {
    EnCours,
    Fini,
}

/// Noms de variables référencés par `valeur` (arguments de plages compris).
fn dependances<'v>(valeur: &str, variables: &'v Variables) -> Vec<&'v str> {
    references(valeur, variables, Mode::Dependances)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(a, b)| variables.get_key_value(&valeur[a..b]).map(|(k, _)| k.as_str()))
        .collect()
}

fn visiter<'v>(
    nom: &'v str,
    variables: &'v Variables,
    etats: &mut HashMap<&'v str, Etat>,
    chemin: &mut Vec<&'v str>,
) -> Resultat<()> {
    match etats.get(nom) {
        Some(Etat::Fini) => return Ok(()),
        Some(Etat::EnCours) => {
            let depart = chemin.iter().position(|n| *n == nom).unwrap_or(0);
            let mut cycle: Vec<String> = chemin[depart..].iter().map(|s| s.to_string()).collect();
            cycle.push(nom.to_string());
            return Err(Erreur::ReferenceCyclique(cycle));
        }
        None => {}
    }

    etats.insert(nom, Etat::EnCours);
    chemin.push(nom);
    if let Some(valeur) = variables.get(nom) {
        for dep in dependances(valeur, variables) {
            visiter(dep, variables, etats, chemin)?;
        }
    }
    chemin.pop();
    etats.insert(nom, Etat::Fini);
    Ok(())
}

/// Valide les noms puis cherche un cycle (parcours en profondeur, noms dans l'ordre).
///
/// Le cycle renvoyé commence et finit par la même variable : `[a, b, a]`.
pub fn verifier_cycles(variables: &Variables) -> Resultat<()> {
    if let Some(nom) = variables.keys().find(|n| !est_identifiant(n)) {
        return Err(Erreur::syntaxe_globale(format!("nom de variable invalide: {nom:?}")));
    }

    let mut etats = HashMap::new();
    let mut chemin = Vec::new();
    for nom in variables.keys() {
        visiter(nom, variables, &mut etats, &mut chemin)?;
    }
    Ok(())
}

/* ------------------------ Substitution ------------------------ */

struct Developpeur<'v> {
    variables: &'v Variables,
    cache: HashMap<&'v str, String>,
    pile: Vec<&'v str>,
}

impl<'v> Developpeur<'v> {
    fn developper(&mut self, texte: &str) -> Resultat<String> {
        let refs = references(texte, self.variables, Mode::Substitution)?;
        if refs.is_empty() {
            return Ok(texte.to_string());
        }

        let mut out = String::with_capacity(texte.len() * 2);
        let mut dernier = 0;
        for (debut, fin) in refs {
            out.push_str(&texte[dernier..debut]);
            out.push('(');
            out.push_str(&self.variable(&texte[debut..fin])?);
            out.push(')');
            dernier = fin;
        }
        out.push_str(&texte[dernier..]);
        Ok(out)
    }

    fn variable(&mut self, nom: &str) -> Resultat<String> {
        let Some((cle, valeur)) = self.variables.get_key_value(nom) else {
            return Err(Erreur::VariableIndefinie(nom.to_string()));
        };
        let cle = cle.as_str();

        if let Some(d) = self.cache.get(cle) {
            return Ok(d.clone());
        }
        if let Some(depart) = self.pile.iter().position(|n| *n == cle) {
            let mut cycle: Vec<String> = self.pile[depart..].iter().map(|s| s.to_string()).collect();
            cycle.push(cle.to_string());
            return Err(Erreur::ReferenceCyclique(cycle));
        }

        self.pile.push(cle);
        let developpe = self.developper(valeur);
        self.pile.pop();

        let developpe = developpe?;
        self.cache.insert(cle, developpe.clone());
        Ok(developpe)
    }
}

/// Remplace chaque référence de variable par "(expression développée)".
///
/// Un mot qui n'est ni variable ni suite de symboles connus donne `VariableIndefinie`.
pub fn substituer(expr: &str, variables: &Variables) -> Resultat<String> {
    Developpeur {
        variables,
        cache: HashMap::new(),
        pile: Vec::new(),
    }
    .developper(expr)
}
