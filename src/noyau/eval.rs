//! Noyau : évaluation (pipeline complet)
//!
//! variables (cycles + substitution) -> jetons -> RPN -> pile de valeurs
//!
//! Les agrégats et les plages ré-entrent dans le pipeline complet pour chacun
//! de leurs arguments, avec leur propre pile et une copie de la table des variables.

use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::{debug, error, trace, warn};

use super::decimal::Decimal;
use super::erreurs::{Erreur, Resultat};
use super::jetons::{format_tokens, tokenize, Tok};
use super::locale::Locale;
use super::reglages::Reglages;
use super::rpn::to_rpn;
use super::symboles::{table, Action, Descripteur, FnBinaire, TypePlage};
use super::valeur::Valeur;
use super::variables::{substituer, verifier_cycles, Variables};

/// Nombre maximal de tours d'une plage (∑, ∏).
pub const ITERATIONS_MAX: i64 = 100_000;

const MESSAGE_PANIQUE: &str = "Erreur : calcul interrompu";

/// Étapes intermédiaires d'une évaluation (affichage pédagogique, traces).
#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct Demarche {
    /// texte après substitution des variables
    pub substituee: String,
    pub jetons: String,
    pub rpn: String,
}

/// Moteur d'évaluation : des réglages figés, aucun état mutable.
#[derive(Clone, Copy, Debug, Default)]
pub struct Moteur {
    reglages: Reglages,
}

fn depiler(pile: &mut Vec<Valeur>) -> Resultat<Valeur> {
    pile.pop().ok_or(Erreur::ExpressionMalformee(0))
}

/// Opérateur binaire relevé sur les couples (composante par composante).
fn binaire(f: FnBinaire, a: &Valeur, b: &Valeur, r: &Reglages) -> Resultat<Valeur> {
    match (a, b) {
        (Valeur::Nombre(x), Valeur::Nombre(y)) => Ok(Valeur::Nombre(f(x, y, r)?)),
        (Valeur::Paire(x1, x2), Valeur::Paire(y1, y2)) => {
            Ok(Valeur::Paire(f(x1, y1, r)?, f(x2, y2, r)?))
        }
        (Valeur::Paire(..), Valeur::Nombre(y)) => a.appliquer(|x| f(x, y, r)),
        (Valeur::Nombre(x), Valeur::Paire(..)) => b.appliquer(|y| f(x, y, r)),
    }
}

impl Moteur {
    pub fn new(reglages: Reglages) -> Self {
        Self { reglages }
    }

    pub fn reglages(&self) -> &Reglages {
        &self.reglages
    }

    pub fn evaluer(&self, expr: &str) -> Resultat<Valeur> {
        self.evaluer_avec(expr, &Variables::new())
    }

    /// Évalue `expr` avec une table de variables (cycles vérifiés avant tout).
    pub fn evaluer_avec(&self, expr: &str, variables: &Variables) -> Resultat<Valeur> {
        verifier_cycles(variables)?;
        let v = self.evaluer_interne(expr, variables, None)?;
        debug!(resultat = %v, "évaluation terminée");
        Ok(v.trim())
    }

    /// Comme `evaluer_avec`, et rend aussi les étapes (texte substitué, jetons, RPN).
    pub fn demarche(&self, expr: &str, variables: &Variables) -> Resultat<(Valeur, Demarche)> {
        verifier_cycles(variables)?;
        let mut d = Demarche::default();
        let v = self.evaluer_interne(expr, variables, Some(&mut d))?;
        Ok((v.trim(), d))
    }

    fn evaluer_interne(
        &self,
        expr: &str,
        variables: &Variables,
        demarche: Option<&mut Demarche>,
    ) -> Resultat<Valeur> {
        if expr.trim().is_empty() {
            return Err(Erreur::syntaxe_globale("expression vide"));
        }

        let substituee = substituer(expr, variables)?;

        let jetons = tokenize(&substituee, &self.reglages)?;
        debug!(jetons = %format_tokens(&jetons), "jetons");

        let rpn = to_rpn(&jetons)?;
        debug!(rpn = %format_tokens(&rpn), "rpn");

        if let Some(d) = demarche {
            d.jetons = format_tokens(&jetons);
            d.rpn = format_tokens(&rpn);
            d.substituee = substituee;
        }

        Ok(self.evaluer_rpn(&rpn, variables)?.avec_locale(self.reglages.locale))
    }

    /// Rejoue une suite RPN sur une pile de valeurs.
    ///
    /// `variables` sert aux arguments d'agrégats et aux corps de plages, ré-évalués ici.
    pub fn evaluer_rpn(&self, rpn: &[Tok], variables: &Variables) -> Resultat<Valeur> {
        let r = &self.reglages;
        let mut pile: Vec<Valeur> = Vec::new();

        for tok in rpn {
            match tok {
                Tok::Nombre(n) => pile.push(Decimal::parse(n, r.locale, r.politique)?.into()),

                Tok::Operateur(s) | Tok::Fonction(s) => {
                    let d = table()
                        .get(s)
                        .ok_or_else(|| Erreur::syntaxe_globale(format!("symbole inconnu: {s}")))?;
                    self.appliquer(d, &mut pile)?;
                }

                Tok::Agregat { symbole, arguments } => {
                    pile.push(self.agregat(symbole, arguments, variables)?.into());
                }

                Tok::Plage {
                    symbole,
                    indice,
                    debut,
                    fin,
                    corps,
                } => {
                    pile.push(self.plage(symbole, indice, debut, fin, corps, variables)?.into());
                }

                Tok::ParG | Tok::ParD | Tok::PointVirgule => {
                    return Err(Erreur::syntaxe_globale("parenthèse inattendue en RPN"));
                }
            }
        }

        if pile.len() != 1 {
            return Err(Erreur::ExpressionMalformee(pile.len()));
        }
        depiler(&mut pile)
    }

    /// Dépile l'arité du descripteur (l'opérande droit d'abord) et empile le résultat.
    fn appliquer(&self, d: &Descripteur, pile: &mut Vec<Valeur>) -> Resultat<()> {
        let r = &self.reglages;
        let v = match d.action {
            Action::Constante(f) => Valeur::Nombre(f(r)),
            Action::Unaire(f) => depiler(pile)?.appliquer(|x| f(x, r))?,
            Action::Binaire(f) => {
                let b = depiler(pile)?;
                let a = depiler(pile)?;
                binaire(f, &a, &b, r)?
            }
            Action::Couple(f) => {
                let b = depiler(pile)?;
                let a = depiler(pile)?;
                let (x, y) = f(a.en_nombre()?, b.en_nombre()?, r)?;
                Valeur::Paire(x, y)
            }
            Action::Variadique(_) | Action::Plage(_) => {
                return Err(Erreur::syntaxe_globale(format!(
                    "{} attend une liste d'arguments",
                    d.symbole
                )));
            }
        };
        pile.push(v.verifier_bornes()?);
        Ok(())
    }

    fn agregat(&self, symbole: &str, arguments: &[String], variables: &Variables) -> Resultat<Decimal> {
        let Some(Action::Variadique(f)) = table().get(symbole).map(|d| d.action) else {
            return Err(Erreur::syntaxe_globale(format!("{symbole} n'est pas un agrégat")));
        };

        let mut valeurs = Vec::with_capacity(arguments.len());
        for a in arguments {
            let v = self.evaluer_interne(a, variables, None)?;
            valeurs.push(v.en_nombre()?.clone());
        }
        f(&valeurs, &self.reglages)?.verifier_bornes()
    }

    /// Borne de plage : une expression entière.
    fn borne(&self, texte: &str, variables: &Variables) -> Resultat<i64> {
        let v = self.evaluer_interne(texte, variables, None)?;
        let d = v.en_nombre()?;
        if !d.est_entier() {
            return Err(Erreur::domaine("borne de plage non entière"));
        }
        d.vers_i64()
            .ok_or_else(|| Erreur::domaine("borne de plage hors limites"))
    }

    /// ∑ / ∏ : ré-évalue `corps` pour chaque valeur de l'indice, dans une copie des variables.
    fn plage(
        &self,
        symbole: &str,
        indice: &str,
        debut: &str,
        fin: &str,
        corps: &str,
        variables: &Variables,
    ) -> Resultat<Decimal> {
        let Some(Action::Plage(genre)) = table().get(symbole).map(|d| d.action) else {
            return Err(Erreur::syntaxe_globale(format!("{symbole} n'est pas une plage")));
        };

        let a = self.borne(debut, variables)?;
        let b = self.borne(fin, variables)?;

        let mut acc = match genre {
            TypePlage::Somme => Decimal::zero(),
            TypePlage::Produit => Decimal::un(),
        };
        if a > b {
            return Ok(acc);
        }
        if i128::from(b) - i128::from(a) >= i128::from(ITERATIONS_MAX) {
            return Err(Erreur::domaine(format!(
                "plage trop longue (plus de {ITERATIONS_MAX} termes)"
            )));
        }

        let politique = self.reglages.politique;
        let travail = politique.avec_garde(10);
        let mut portee = variables.clone();

        for k in a..=b {
            portee.insert(indice.to_string(), k.to_string());
            let v = self.evaluer_interne(corps, &portee, None)?;
            let terme = v.en_nombre()?;
            trace!(symbole, indice, k, terme = %terme, "terme de plage");

            acc = match genre {
                TypePlage::Somme => acc.additionner(terme, travail),
                TypePlage::Produit => acc.multiplier(terme, travail),
            }
            .verifier_bornes()?;
        }

        Ok(acc.arrondir(politique))
    }

    /// Résultat en texte ; toute erreur devient un message sûr (jamais le texte interne).
    pub fn evaluer_en_texte(&self, expr: &str, variables: &Variables) -> String {
        self.en_texte(expr, variables, |v, _| v.to_string())
    }

    /// Comme `evaluer_en_texte`, avec les groupes de chiffres de la locale.
    pub fn evaluer_en_texte_joli(&self, expr: &str, variables: &Variables) -> String {
        self.en_texte(expr, variables, |v, locale| v.format_joli(locale))
    }

    fn en_texte(
        &self,
        expr: &str,
        variables: &Variables,
        rendu: impl Fn(&Valeur, Locale) -> String,
    ) -> String {
        let locale = self.reglages.locale;
        let resultat = catch_unwind(AssertUnwindSafe(|| {
            self.evaluer_avec(expr, variables).map(|v| rendu(&v, locale))
        }));

        match resultat {
            Ok(Ok(texte)) => texte,
            Ok(Err(e)) => {
                warn!(erreur = %e, "évaluation en texte échouée");
                e.message_sur().to_string()
            }
            Err(_) => {
                error!("panique interceptée pendant l'évaluation en texte");
                MESSAGE_PANIQUE.to_string()
            }
        }
    }
}
