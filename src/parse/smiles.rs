use std::collections::BTreeMap;

use nom::{bytes::complete::take_while_m_n, character::complete::char, sequence::preceded, IResult};
use thiserror::Error;
use tracing::*;

use crate::{Atom, AtomError, Bond, BondOrder, Molecule, ParseOptions, PeriodicTable, RingClosurePolicy};

/// What went wrong while scanning a SMILES string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SmilesErrorKind {
    #[error("bracket '[' is never closed")]
    UnclosedBracket,
    #[error("bracket atom '[]' is empty")]
    EmptyBracket,
    #[error("branch end ')' without a matching '('")]
    UnmatchedBranchClose,
    #[error("branch start '(' without a current atom")]
    BranchWithoutAtom,
    #[error("'%' must be followed by two digits")]
    IncompleteRingLabel,
    #[error("ring closure {0} without a current atom")]
    RingClosureWithoutAtom(u16),
    #[error("ring closure {0} would bond an atom to itself")]
    RingClosureToSelf(u16),
    #[error("atoms {0} and {1} are already bonded")]
    DuplicateBond(usize, usize),
    #[error("'{0}' is not a recognized element")]
    UnknownElement(String),
    #[error("unexpected character '{0}'")]
    UnexpectedCharacter(char),
    #[error("invalid atom: {0}")]
    InvalidAtom(AtomError),
    #[error("ring closure {0} is never closed")]
    UnclosedRing(u16),
    #[error("branch '(' is never closed")]
    UnclosedBranch,
}

/// A malformed SMILES string, with the position of the offending character.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Malformed SMILES at position {position}: {kind}")]
pub struct SmilesError {
    pub position: usize,
    pub kind: SmilesErrorKind,
}

impl SmilesError {
    pub fn new(position: usize, kind: SmilesErrorKind) -> Self {
        Self { position, kind }
    }
}

/// One syntactic unit of a SMILES string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// `)`: resume from the atom saved by the matching `(`.
    BranchClose,
    /// A bare (`C`, `Cl`, `c`) or bracketed (`[13CH4]`) atom.
    Atom(Atom),
    /// A ring-closure label: one digit, or `%` and two digits.
    RingClosure(u16),
    /// `(`: save the current atom as a branch point.
    BranchOpen,
    /// A bond symbol. It is read back by the atom or ring closure right after it.
    Bond(BondOrder),
    /// `.`: the next atom starts a new, disconnected component.
    Disconnect,
    /// `/` or `\`: directional bond marks, which carry no connectivity.
    Stereo,
}

#[derive(Debug, Clone, Copy)]
struct RingOpening {
    atom: usize,
    position: usize,
}

/// Single-pass, left-to-right SMILES scanner.
///
/// ```
/// use retrochem::{PeriodicTable, SmilesParser};
///
/// let acetic_acid = SmilesParser::new("CC(=O)O", PeriodicTable::builtin())
///     .parse()
///     .unwrap();
/// assert_eq!(acetic_acid.len(), 4);
/// assert_eq!(acetic_acid.bond_count(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct SmilesParser<'a> {
    source: &'a str,
    input: &'a [u8],
    table: &'a PeriodicTable,
    options: ParseOptions,
    pos: usize,
    molecule: Molecule,
    /// The atom the next atom bonds to.
    current: Option<usize>,
    /// Branch points, with the position of their `(`.
    branches: Vec<(usize, usize)>,
    rings: BTreeMap<u16, RingOpening>,
}

/// Parses a SMILES string with the builtin periodic table and default options.
pub fn parse_smiles(smiles: &str) -> Result<Molecule, SmilesError> {
    SmilesParser::new(smiles, PeriodicTable::builtin()).parse()
}

fn ring_label(input: &str) -> IResult<&str, &str> {
    preceded(char('%'), take_while_m_n(2, 2, |c: char| c.is_ascii_digit()))(input)
}

impl<'a> SmilesParser<'a> {
    pub fn new(smiles: &'a str, table: &'a PeriodicTable) -> Self {
        Self {
            source: smiles,
            input: smiles.as_bytes(),
            table,
            options: ParseOptions::default(),
            pos: 0,
            molecule: Molecule::new(),
            current: None,
            branches: Vec::new(),
            rings: BTreeMap::new(),
        }
    }

    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    /// Scan the whole input and return the molecule.
    ///
    /// No partial molecule is ever returned: the first malformed construct
    /// aborts the parse.
    pub fn parse(mut self) -> Result<Molecule, SmilesError> {
        debug!("Parsing SMILES {:?}", self.source);
        while let Some((step, len)) = self.next_step()? {
            trace!("Step at {}: {:?}", self.pos, step);
            let start = self.pos;
            self.apply(step, start)?;
            self.pos += len;
        }
        self.finish()
    }

    fn error(&self, position: usize, kind: SmilesErrorKind) -> SmilesError {
        SmilesError::new(position, kind)
    }

    /// Read the step starting at the current position, and how many bytes it spans.
    fn next_step(&self) -> Result<Option<(Step, usize)>, SmilesError> {
        let pos = self.pos;
        let Some(&byte) = self.input.get(pos) else {
            return Ok(None);
        };
        let c = byte as char;

        let step = match c {
            ')' => (Step::BranchClose, 1),
            '(' => (Step::BranchOpen, 1),
            '.' => (Step::Disconnect, 1),
            '/' | '\\' => (Step::Stereo, 1),
            '[' => self.bracket_atom(pos)?,
            '0'..='9' => (Step::RingClosure((byte - b'0') as u16), 1),
            '%' => {
                let (_, digits) = ring_label(&self.source[pos..])
                    .map_err(|_| self.error(pos, SmilesErrorKind::IncompleteRingLabel))?;
                let label = digits
                    .parse()
                    .map_err(|_| self.error(pos, SmilesErrorKind::IncompleteRingLabel))?;
                (Step::RingClosure(label), 3)
            }
            c if c.is_ascii_alphabetic() => self.bare_atom(pos)?,
            c => match BondOrder::from_symbol(c) {
                Some(order) => (Step::Bond(order), 1),
                None => {
                    let found = self.source[pos..].chars().next().unwrap_or(c);
                    return Err(self.error(pos, SmilesErrorKind::UnexpectedCharacter(found)));
                }
            },
        };
        Ok(Some(step))
    }

    /// A two-letter element wins only if the table knows it; otherwise one letter.
    fn bare_atom(&self, pos: usize) -> Result<(Step, usize), SmilesError> {
        let two_letters = self
            .input
            .get(pos + 1)
            .filter(|next| next.is_ascii_alphabetic())
            .map(|_| &self.source[pos..pos + 2])
            .filter(|candidate| self.table.contains(candidate));

        let token = two_letters.unwrap_or(&self.source[pos..pos + 1]);
        let atom =
            Atom::new(token).map_err(|e| self.error(pos, SmilesErrorKind::InvalidAtom(e)))?;
        self.check_element(&atom, pos)?;
        Ok((Step::Atom(atom), token.len()))
    }

    fn bracket_atom(&self, pos: usize) -> Result<(Step, usize), SmilesError> {
        let end = self.input[pos..]
            .iter()
            .position(|&b| b == b']')
            .map(|offset| pos + offset)
            .ok_or_else(|| self.error(pos, SmilesErrorKind::UnclosedBracket))?;
        let token = &self.source[pos + 1..end];
        if token.is_empty() {
            return Err(self.error(pos, SmilesErrorKind::EmptyBracket));
        }
        let atom =
            Atom::bracketed(token).map_err(|e| self.error(pos, SmilesErrorKind::InvalidAtom(e)))?;
        self.check_element(&atom, pos)?;
        Ok((Step::Atom(atom), end + 1 - pos))
    }

    fn check_element(&self, atom: &Atom, pos: usize) -> Result<(), SmilesError> {
        if atom.element_symbol().is_empty() || !self.table.contains(&atom.normalized_symbol()) {
            return Err(self.error(
                pos,
                SmilesErrorKind::UnknownElement(atom.token().to_string()),
            ));
        }
        Ok(())
    }

    /// The order given by a bond symbol directly before `position`, if any.
    ///
    /// `:` only counts when aromatic bonds are enabled; otherwise it is read
    /// and the bond stays single.
    fn bond_before(&self, position: usize) -> Option<BondOrder> {
        let previous = position.checked_sub(1)?;
        match BondOrder::from_symbol(self.input[previous] as char)? {
            BondOrder::Aromatic if !self.options.infer_aromatic_bonds => None,
            order => Some(order),
        }
    }

    fn bond_order(&self, position: usize, a: usize, b: usize) -> BondOrder {
        if let Some(order) = self.bond_before(position) {
            return order;
        }
        let atoms = self.molecule.atoms();
        if self.options.infer_aromatic_bonds && atoms[a].is_aromatic() && atoms[b].is_aromatic() {
            BondOrder::Aromatic
        } else {
            BondOrder::Single
        }
    }

    fn apply(&mut self, step: Step, start: usize) -> Result<(), SmilesError> {
        match step {
            Step::BranchClose => {
                let (atom, _) = self
                    .branches
                    .pop()
                    .ok_or_else(|| self.error(start, SmilesErrorKind::UnmatchedBranchClose))?;
                self.current = Some(atom);
            }
            Step::BranchOpen => {
                let atom = self
                    .current
                    .ok_or_else(|| self.error(start, SmilesErrorKind::BranchWithoutAtom))?;
                self.branches.push((atom, start));
            }
            Step::Atom(atom) => {
                let index = self.molecule.add_atom(atom);
                debug!("Atom {}: {}", index, self.molecule.atoms()[index].summary());
                if let Some(previous) = self.current {
                    let order = self.bond_order(start, previous, index);
                    self.add_bond(previous, index, order);
                }
                self.current = Some(index);
            }
            Step::RingClosure(label) => {
                let atom = self
                    .current
                    .ok_or_else(|| self.error(start, SmilesErrorKind::RingClosureWithoutAtom(label)))?;
                match self.rings.remove(&label) {
                    Some(opening) => {
                        if opening.atom == atom {
                            return Err(self.error(start, SmilesErrorKind::RingClosureToSelf(label)));
                        }
                        if self.molecule.bond_between(opening.atom, atom).is_some() {
                            return Err(self.error(
                                start,
                                SmilesErrorKind::DuplicateBond(opening.atom, atom),
                            ));
                        }
                        let order = self.bond_order(start, opening.atom, atom);
                        self.add_bond(opening.atom, atom, order);
                    }
                    None => {
                        self.rings.insert(
                            label,
                            RingOpening {
                                atom,
                                position: start,
                            },
                        );
                    }
                }
            }
            Step::Disconnect => self.current = None,
            Step::Bond(_) | Step::Stereo => {}
        }
        Ok(())
    }

    fn add_bond(&mut self, first: usize, second: usize, order: BondOrder) {
        let index = self.molecule.add_bond(Bond::new(first, second, order));
        debug!("Bond {}: {} {} order {}", index, first, second, order);
    }

    fn finish(self) -> Result<Molecule, SmilesError> {
        let strict = self.options.ring_closures == RingClosurePolicy::Strict;
        if let Some((&label, opening)) = self.rings.iter().next() {
            if strict {
                return Err(self.error(opening.position, SmilesErrorKind::UnclosedRing(label)));
            }
            debug!(
                "Ignoring {} unclosed ring label(s) in {:?}",
                self.rings.len(),
                self.source
            );
        }
        if let Some(&(_, position)) = self.branches.last() {
            if strict {
                return Err(self.error(position, SmilesErrorKind::UnclosedBranch));
            }
            debug!("Ignoring {} unclosed branch(es)", self.branches.len());
        }
        Ok(self.molecule)
    }
}
