// src/noyau/rpn.rs
//
// Shunting-yard : suite de Tok -> RPN (postfixe).
//
// Règles :
// - nombres, agrégats, plages : sortie directe
// - postfixe ('!') : sortie directe (son opérande est déjà sorti)
// - fonction : empilée, sortie après son argument
// - opérateur : dépile tant que le sommet est une fonction, ou un opérateur plus prioritaire,
//   ou de même priorité quand l'entrant est associatif à gauche ('^' est associatif à droite)
// - ')' : dépile jusqu'à '(' ; une fonction sous la '(' sort aussi
// - ';' : dépile jusqu'à '(' sans la retirer (arguments d'une fonction)
//
// Le moins unaire est déjà réécrit par les jetons (littéral signé ou `neg`).

use super::erreurs::{Erreur, Resultat};
use super::jetons::Tok;
use super::symboles::{table, Associativite, Descripteur, Genre};

fn descripteur(symbole: &str) -> Resultat<&'static Descripteur> {
    table()
        .get(symbole)
        .ok_or_else(|| Erreur::syntaxe_globale(format!("symbole inconnu: {symbole}")))
}

/// Le sommet doit-il sortir avant l'opérateur entrant ?
fn doit_depiler(sommet: &Tok, entrant: &Descripteur) -> bool {
    match sommet {
        Tok::Fonction(_) => true,
        Tok::Operateur(s) => match table().get(s) {
            Some(d) => {
                d.precedence > entrant.precedence
                    || (d.precedence == entrant.precedence
                        && entrant.associativite == Associativite::Gauche)
            }
            None => false,
        },
        _ => false,
    }
}

/// Convertit une suite de jetons en RPN (notation polonaise inversée).
///
/// Exemple :
///   tokens: [sin, (, 3.14, /, 2, )]
///   rpn:    [3.14, 2, /, sin]
pub fn to_rpn(tokens: &[Tok]) -> Resultat<Vec<Tok>> {
    let mut out: Vec<Tok> = Vec::with_capacity(tokens.len());
    let mut ops: Vec<Tok> = Vec::new();

    for tok in tokens.iter().cloned() {
        match tok {
            Tok::Nombre(_) | Tok::Agregat { .. } | Tok::Plage { .. } => out.push(tok),

            Tok::Fonction(_) | Tok::ParG => ops.push(tok),

            Tok::Operateur(s) => {
                let d = descripteur(s)?;
                if d.genre == Genre::Postfixe {
                    out.push(tok);
                    continue;
                }

                while let Some(sommet) = ops.last() {
                    if !doit_depiler(sommet, d) {
                        break;
                    }
                    if let Some(t) = ops.pop() {
                        out.push(t);
                    }
                }
                ops.push(tok);
            }

            Tok::ParD => {
                // dépile jusqu'à '('
                loop {
                    match ops.pop() {
                        Some(Tok::ParG) => break,
                        Some(t) => out.push(t),
                        None => return Err(Erreur::syntaxe_globale("parenthèse fermante sans ouvrante")),
                    }
                }

                // fonction collée à la parenthèse : elle sort aussi
                if matches!(ops.last(), Some(Tok::Fonction(_))) {
                    if let Some(f) = ops.pop() {
                        out.push(f);
                    }
                }
            }

            Tok::PointVirgule => {
                // dépile jusqu'à '(' (qui reste en place)
                loop {
                    match ops.last() {
                        Some(Tok::ParG) => break,
                        Some(_) => {
                            if let Some(t) = ops.pop() {
                                out.push(t);
                            }
                        }
                        None => return Err(Erreur::syntaxe_globale("';' hors d'une liste d'arguments")),
                    }
                }
            }
        }
    }

    // vide la pile ops
    while let Some(op) = ops.pop() {
        if matches!(op, Tok::ParG) {
            return Err(Erreur::syntaxe_globale("parenthèses non fermées"));
        }
        out.push(op);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noyau::jetons::{format_tokens, tokenize};
    use crate::noyau::locale::Locale;
    use crate::noyau::reglages::Reglages;

    fn rpn(s: &str) -> String {
        let r = Reglages::default().avec_locale(Locale::neutre());
        let t = tokenize(s, &r).unwrap();
        format_tokens(&to_rpn(&t).unwrap())
    }

    fn erreur(s: &str) -> Erreur {
        let r = Reglages::default().avec_locale(Locale::neutre());
        let t = tokenize(s, &r).unwrap();
        to_rpn(&t).unwrap_err()
    }

    #[test]
    fn priorites() {
        assert_eq!(rpn("2+3*4"), "2 3 4 * +");
        assert_eq!(rpn("(2+3)*4"), "2 3 + 4 *");
        assert_eq!(rpn("8-3-2"), "8 3 - 2 -");
        assert_eq!(rpn("8/4%3"), "8 4 / 3 %");
    }

    #[test]
    fn puissance_associative_a_droite() {
        assert_eq!(rpn("2^3^2"), "2 3 2 ^ ^");
        assert_eq!(rpn("2*3^2"), "2 3 2 ^ *");
    }

    #[test]
    fn postfixe_immediat() {
        assert_eq!(rpn("3!+1"), "3 ! 1 +");
        assert_eq!(rpn("2^3!"), "2 3 ! ^");
    }

    #[test]
    fn fonctions() {
        assert_eq!(rpn("sin(1)+2"), "1 sin 2 +");
        assert_eq!(rpn("rootn(8;3)"), "8 3 rootn");
        assert_eq!(rpn("sqrt(2+2)*3"), "2 2 + sqrt 3 *");
        assert_eq!(rpn("-(2)^2"), "2 neg 2 ^");
        assert_eq!(rpn("cos-1"), "-1 cos");
        assert_eq!(rpn("ln 2^2"), "2 ln 2 ^");
    }

    #[test]
    fn implicites() {
        assert_eq!(rpn("2(3)"), "2 3 *");
        assert_eq!(rpn("(2)(3)"), "2 3 *");
    }

    #[test]
    fn erreurs_de_structure() {
        assert!(matches!(erreur("(2+4"), Erreur::Syntaxe { .. }));
        assert!(matches!(erreur("2+4)"), Erreur::Syntaxe { .. }));
        assert!(matches!(erreur("1;2"), Erreur::Syntaxe { .. }));
    }
}
