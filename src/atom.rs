use std::fmt::{Display, Formatter, Result as FmtResult};

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{digit1, satisfy},
    combinator::{opt, recognize},
    sequence::pair,
    IResult,
};
use thiserror::Error;

/// A number inside an atom token that does not fit its property.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AtomError {
    #[error("{property} '{digits}' is out of range")]
    NumberOutOfRange {
        property: &'static str,
        digits: String,
    },
}

/// A single atom of a molecule, together with the special properties
/// encoded in the SMILES token it was read from.
///
/// Every property is derived from the raw token. The only way to change
/// an atom is [`Atom::set_token`], which re-derives all of them at once.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Atom {
    token: String,
    bracketed: bool,
    symbol: String,
    isotope: Option<u32>,
    chirality: Option<String>,
    hydrogens: u32,
    charge: i32,
}

impl Atom {
    /// Create an atom from a bare organic-subset token such as `C`, `Cl` or `c`.
    pub fn new(token: impl Into<String>) -> Result<Self, AtomError> {
        Self::derive(token.into(), false)
    }

    /// Create an atom from the contents of a bracket atom, without the
    /// surrounding `[` and `]` (e.g. `13C@H2-2` or `NH4+`).
    pub fn bracketed(token: impl Into<String>) -> Result<Self, AtomError> {
        Self::derive(token.into(), true)
    }

    /// Replace the raw token and recompute every derived property.
    ///
    /// On error the atom is left unchanged.
    pub fn set_token(&mut self, token: impl Into<String>) -> Result<(), AtomError> {
        *self = Self::derive(token.into(), self.bracketed)?;
        Ok(())
    }

    fn derive(token: String, bracketed: bool) -> Result<Self, AtomError> {
        let (after_isotope, isotope) = isotope_mass(&token)?;
        let (_, symbol) = element_symbol(after_isotope);
        let chirality = chiral_class(&token);

        // The chirality class (e.g. `@OH3`) may itself contain an `H`.
        let hydrogen_source = match chirality.as_deref() {
            Some(class) => after_isotope.replacen(class, "", 1),
            None => after_isotope.to_string(),
        };
        let hydrogens = hydrogen_count(&hydrogen_source)?;
        let charge = formal_charge(&token)?;

        Ok(Self {
            isotope,
            symbol: symbol.to_string(),
            chirality,
            hydrogens,
            charge,
            bracketed,
            token,
        })
    }

    /// The exact text this atom was produced from.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Whether the atom was written in bracket form.
    pub fn is_bracketed(&self) -> bool {
        self.bracketed
    }

    /// The element symbol as written; lowercase for aromatic atoms.
    /// Empty when the token has no letter after its isotope digits.
    pub fn element_symbol(&self) -> &str {
        &self.symbol
    }

    /// The element symbol with its first letter capitalized, as it appears
    /// in the periodic table (`c` becomes `C`, `se` becomes `Se`).
    pub fn normalized_symbol(&self) -> String {
        let mut chars = self.symbol.chars();
        match chars.next() {
            Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
            None => String::new(),
        }
    }

    pub fn isotope(&self) -> Option<u32> {
        self.isotope
    }

    /// The chirality class, starting at the first `@` (`@`, `@@`, `@TH2`, ...).
    pub fn chirality(&self) -> Option<&str> {
        self.chirality.as_deref()
    }

    pub fn hydrogen_count(&self) -> u32 {
        self.hydrogens
    }

    pub fn charge(&self) -> i32 {
        self.charge
    }

    pub fn is_aromatic(&self) -> bool {
        self.symbol
            .chars()
            .next()
            .map(|c| c.is_ascii_lowercase())
            .unwrap_or(false)
    }

    /// A one-line description of every derived property.
    pub fn summary(&self) -> String {
        let mut out = self.symbol.clone();
        if let Some(mass) = self.isotope {
            out += &format!(" isotope={mass}");
        }
        if let Some(class) = &self.chirality {
            out += &format!(" chirality={class}");
        }
        if self.hydrogens > 0 {
            out += &format!(" H={}", self.hydrogens);
        }
        if self.charge != 0 {
            out += &format!(" charge={:+}", self.charge);
        }
        if self.is_aromatic() {
            out += " aromatic";
        }
        out
    }
}

impl Display for Atom {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        if self.bracketed {
            write!(f, "[{}]", self.token)
        } else {
            write!(f, "{}", self.token)
        }
    }
}

fn number<T: std::str::FromStr>(digits: &str, property: &'static str) -> Result<T, AtomError> {
    digits.parse().map_err(|_| AtomError::NumberOutOfRange {
        property,
        digits: digits.to_string(),
    })
}

fn isotope_mass(token: &str) -> Result<(&str, Option<u32>), AtomError> {
    let parsed: IResult<&str, &str> = digit1(token);
    match parsed {
        Ok((rest, digits)) => Ok((rest, Some(number(digits, "isotope mass")?))),
        Err(_) => Ok((token, None)),
    }
}

fn element_symbol(input: &str) -> (&str, &str) {
    let parsed: IResult<&str, &str> = recognize(pair(
        satisfy(|c| c.is_ascii_alphabetic()),
        opt(satisfy(|c| c.is_ascii_lowercase())),
    ))(input);
    match parsed {
        Ok((rest, symbol)) => (rest, symbol),
        Err(_) => (input, ""),
    }
}

fn chirality_tag(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((tag("@@"), tag("@"))),
        opt(pair(
            alt((tag("TH"), tag("AL"), tag("SP"), tag("TB"), tag("OH"))),
            digit1,
        )),
    ))(input)
}

fn chiral_class(token: &str) -> Option<String> {
    let start = token.find('@')?;
    chirality_tag(&token[start..])
        .ok()
        .map(|(_, class)| class.to_string())
}

/// The first `H` not followed by a lowercase letter counts one hydrogen,
/// unless digits after it give an explicit count. `He` and `Hf` are skipped.
fn hydrogen_count(input: &str) -> Result<u32, AtomError> {
    let Some(rest) = input
        .match_indices('H')
        .map(move |(at, _)| &input[at + 1..])
        .find(|rest| !rest.starts_with(|c: char| c.is_ascii_lowercase()))
    else {
        return Ok(0);
    };
    let digits: IResult<&str, &str> = digit1(rest);
    match digits {
        Ok((_, count)) => number(count, "hydrogen count"),
        Err(_) => Ok(1),
    }
}

fn formal_charge(token: &str) -> Result<i32, AtomError> {
    let (at, sign) = match (token.find('+'), token.find('-')) {
        (Some(at), _) => (at, 1),
        (None, Some(at)) => (at, -1),
        (None, None) => return Ok(0),
    };
    let rest = &token[at + 1..];
    let magnitude: IResult<&str, &str> = digit1(rest);
    if let Ok((_, digits)) = magnitude {
        return Ok(sign * number::<i32>(digits, "charge")?);
    }
    let symbol = if sign > 0 { '+' } else { '-' };
    let repeats = token[at..].chars().take_while(|&c| c == symbol).count() as i32;
    Ok(sign * repeats)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bracketed(token: &str) -> Atom {
        Atom::bracketed(token).unwrap()
    }

    #[test]
    fn test_full_bracket_token() {
        let atom = bracketed("13C@H2-2");
        assert_eq!(atom.isotope(), Some(13));
        assert_eq!(atom.element_symbol(), "C");
        assert_eq!(atom.chirality(), Some("@"));
        assert_eq!(atom.hydrogen_count(), 2);
        assert_eq!(atom.charge(), -2);
        assert!(!atom.is_aromatic());
    }

    #[test]
    fn test_plain_atoms() {
        let carbon = Atom::new("C").unwrap();
        assert_eq!(carbon.element_symbol(), "C");
        assert_eq!(carbon.isotope(), None);
        assert_eq!(carbon.chirality(), None);
        assert_eq!(carbon.hydrogen_count(), 0);
        assert_eq!(carbon.charge(), 0);

        let chlorine = Atom::new("Cl").unwrap();
        assert_eq!(chlorine.element_symbol(), "Cl");

        let aromatic = Atom::new("c").unwrap();
        assert!(aromatic.is_aromatic());
        assert_eq!(aromatic.normalized_symbol(), "C");
    }

    #[test]
    fn test_charges() {
        assert_eq!(bracketed("N+").charge(), 1);
        assert_eq!(bracketed("O-").charge(), -1);
        assert_eq!(bracketed("Fe++").charge(), 2);
        assert_eq!(bracketed("P---").charge(), -3);
        assert_eq!(bracketed("Fe+3").charge(), 3);
        assert_eq!(bracketed("NH4+").charge(), 1);
    }

    #[test]
    fn test_hydrogens() {
        assert_eq!(bracketed("NH4+").hydrogen_count(), 4);
        assert_eq!(bracketed("nH").hydrogen_count(), 1);
        assert_eq!(bracketed("CH").hydrogen_count(), 1);
        // Helium and hafnium carry no hydrogens.
        assert_eq!(bracketed("He").hydrogen_count(), 0);
        assert_eq!(bracketed("Hf").hydrogen_count(), 0);
        assert_eq!(bracketed("HgH").hydrogen_count(), 1);
    }

    #[test]
    fn test_hydrogen_element_counts_itself() {
        assert_eq!(bracketed("H").hydrogen_count(), 1);
        assert_eq!(bracketed("H+").hydrogen_count(), 1);
        assert_eq!(bracketed("2H").hydrogen_count(), 1);
        assert_eq!(bracketed("2H").isotope(), Some(2));
        assert_eq!(bracketed("H2").hydrogen_count(), 2);
    }

    #[test]
    fn test_chirality_classes() {
        assert_eq!(bracketed("C@@H").chirality(), Some("@@"));
        assert_eq!(bracketed("C@@H").hydrogen_count(), 1);
        assert_eq!(bracketed("Co@OH12").chirality(), Some("@OH12"));
        assert_eq!(bracketed("Co@OH12").hydrogen_count(), 0);
        assert_eq!(bracketed("C@TH2H").chirality(), Some("@TH2"));
        assert_eq!(bracketed("C@TH2H").hydrogen_count(), 1);
    }

    #[test]
    fn test_set_token_recomputes() {
        let mut atom = bracketed("13C@H2-2");
        atom.set_token("se").unwrap();
        assert_eq!(atom.element_symbol(), "se");
        assert_eq!(atom.normalized_symbol(), "Se");
        assert_eq!(atom.isotope(), None);
        assert_eq!(atom.chirality(), None);
        assert_eq!(atom.hydrogen_count(), 0);
        assert_eq!(atom.charge(), 0);
        assert!(atom.is_aromatic());
        assert!(atom.is_bracketed());
    }

    #[test]
    fn test_isotope_without_symbol() {
        let atom = bracketed("13");
        assert_eq!(atom.isotope(), Some(13));
        assert_eq!(atom.element_symbol(), "");
        assert!(!atom.is_aromatic());
    }

    #[test]
    fn test_numbers_out_of_range() {
        assert_eq!(
            Atom::bracketed("99999999999C"),
            Err(AtomError::NumberOutOfRange {
                property: "isotope mass",
                digits: "99999999999".to_string(),
            })
        );
        assert!(matches!(
            Atom::bracketed("C+99999999999"),
            Err(AtomError::NumberOutOfRange { property: "charge", .. })
        ));
        assert!(matches!(
            Atom::bracketed("CH99999999999"),
            Err(AtomError::NumberOutOfRange { property: "hydrogen count", .. })
        ));

        let mut atom = bracketed("13C");
        assert!(atom.set_token("4294967296C").is_err());
        assert_eq!(atom.isotope(), Some(13));
    }
}
