//! Robot selection expressions.
//!
//! Users pick robots by their 1-based position in the account roster,
//! e.g. `"1,3"`. An empty expression, or `"0"`, selects every robot.
//!
//! Validation happens in two phases. [`Selection::parse`] checks the
//! expression itself and knows nothing about the fleet.
//! [`Selection::resolve`] checks the indices against the roster once it
//! has been fetched.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Errors produced while parsing or resolving a selection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("string '{token}' is not a valid robot index")]
    InvalidToken { token: String },

    #[error("cannot mix zero with other indices")]
    MixedZero,

    #[error("robot index {index} is negative, numbering starts at 1")]
    NegativeIndex { index: i64 },

    #[error("robot number {index} out of bounds, there are {total} robots in total")]
    OutOfBounds { index: usize, total: usize },
}

/// A normalized robot selection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    /// Every robot in the roster.
    #[default]
    All,
    /// A sorted, de-duplicated list of 1-based roster positions.
    Indices(Vec<usize>),
}

impl Selection {
    /// Parse a comma-separated list of 1-based robot indices.
    ///
    /// # Example
    ///
    /// ```
    /// use neato_core::Selection;
    ///
    /// assert_eq!(Selection::parse("").unwrap(), Selection::All);
    /// assert_eq!(Selection::parse("0").unwrap(), Selection::All);
    /// assert_eq!(Selection::parse("3,1,3").unwrap(), Selection::Indices(vec![1, 3]));
    /// assert!(Selection::parse("0,2").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Self, SelectionError> {
        if input.trim().is_empty() {
            return Ok(Self::All);
        }

        let mut indices = BTreeSet::new();
        for token in input.split(',') {
            let token = token.trim();
            let value: i64 = token.parse().map_err(|_| SelectionError::InvalidToken {
                token: token.to_string(),
            })?;
            let index = usize::try_from(value)
                .map_err(|_| SelectionError::NegativeIndex { index: value })?;
            indices.insert(index);
        }

        if indices.contains(&0) {
            if indices.len() > 1 {
                return Err(SelectionError::MixedZero);
            }
            return Ok(Self::All);
        }

        Ok(Self::Indices(indices.into_iter().collect()))
    }

    /// Whether this selection covers the whole roster.
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    /// Pick the selected entries out of the roster, in ascending index order.
    ///
    /// Fails if any index is zero or past the end of the roster.
    pub fn resolve<T: Clone>(&self, roster: &[T]) -> Result<Vec<T>, SelectionError> {
        match self {
            Self::All => Ok(roster.to_vec()),
            Self::Indices(indices) => indices
                .iter()
                .map(|&index| {
                    index
                        .checked_sub(1)
                        .and_then(|i| roster.get(i))
                        .cloned()
                        .ok_or(SelectionError::OutOfBounds {
                            index,
                            total: roster.len(),
                        })
                })
                .collect(),
        }
    }
}

impl FromStr for Selection {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Indices(indices) => {
                let parts: Vec<String> = indices.iter().map(|i| i.to_string()).collect();
                write!(f, "{}", parts.join(","))
            }
        }
    }
}
