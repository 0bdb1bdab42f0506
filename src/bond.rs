use std::fmt::{Display, Formatter, Result as FmtResult};

/// The order of a bond between two atoms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum BondOrder {
    #[default]
    Single,
    Double,
    Triple,
    Aromatic,
}

impl BondOrder {
    /// Map a SMILES bond symbol to its order.
    ///
    /// `-` single, `=` double, `#` triple, `:` aromatic. Anything else is not a bond symbol.
    pub fn from_symbol(c: char) -> Option<Self> {
        match c {
            '-' => Some(BondOrder::Single),
            '=' => Some(BondOrder::Double),
            '#' => Some(BondOrder::Triple),
            ':' => Some(BondOrder::Aromatic),
            _ => None,
        }
    }

    /// The integer bond order: 1, 2, 3, or 4 for aromatic.
    pub fn value(&self) -> u8 {
        match self {
            BondOrder::Single => 1,
            BondOrder::Double => 2,
            BondOrder::Triple => 3,
            BondOrder::Aromatic => 4,
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            BondOrder::Single => '-',
            BondOrder::Double => '=',
            BondOrder::Triple => '#',
            BondOrder::Aromatic => ':',
        }
    }
}

impl Display for BondOrder {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{}", self.value())
    }
}

/// A bond between two atoms of a [`Molecule`](crate::Molecule), stored as
/// indices into its atom list.
///
/// `first` is the atom that was discovered earlier during parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bond {
    pub first: usize,
    pub second: usize,
    pub order: BondOrder,
}

impl Bond {
    pub fn new(first: usize, second: usize, order: BondOrder) -> Self {
        Self {
            first,
            second,
            order,
        }
    }

    pub fn contains(&self, atom: usize) -> bool {
        self.first == atom || self.second == atom
    }

    /// The atom on the other end of the bond from `atom`, if `atom` is part of it.
    pub fn other(&self, atom: usize) -> Option<usize> {
        if self.first == atom {
            Some(self.second)
        } else if self.second == atom {
            Some(self.first)
        } else {
            None
        }
    }

    /// Whether this bond joins `a` and `b`, in either direction.
    pub fn connects(&self, a: usize, b: usize) -> bool {
        (self.first == a && self.second == b) || (self.first == b && self.second == a)
    }
}
