use rust_decimal::Decimal;
use thiserror::Error;

use crate::ApitBracket;

/// Ways a configured APIT bracket table can be malformed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BracketTableError {
    #[error("bracket table is empty")]
    Empty,

    #[error("first bracket starts at {0}, expected 0")]
    NonZeroStart(Decimal),

    #[error("bracket {index} starts at {min_income}, not above the previous bracket")]
    NotAscending { index: usize, min_income: Decimal },

    #[error("bracket {index} ends at {max_income}, below its start {min_income}")]
    Inverted {
        index: usize,
        min_income: Decimal,
        max_income: Decimal,
    },

    #[error("bracket {index} starts at {min_income} but the previous bracket ends at {previous_max}")]
    Gap {
        index: usize,
        min_income: Decimal,
        previous_max: Decimal,
    },

    #[error("bracket {0} is open-ended but is not the last bracket")]
    OpenEndedBeforeLast(usize),

    #[error("last bracket must be open-ended")]
    BoundedLast,
}

/// Checks that `brackets` is ascending, contiguous and covers `[0, ∞)`.
///
/// A bracket may start either at the previous bracket's `max_income` or one
/// unit above it, since both conventions appear in stored tables.
pub fn validate_brackets(brackets: &[ApitBracket]) -> Result<(), BracketTableError> {
    let first = brackets.first().ok_or(BracketTableError::Empty)?;
    if !first.min_income.is_zero() {
        return Err(BracketTableError::NonZeroStart(first.min_income));
    }

    let last_index = brackets.len() - 1;
    let mut previous: Option<&ApitBracket> = None;

    for (index, bracket) in brackets.iter().enumerate() {
        if let Some(max) = bracket.max_income {
            if max < bracket.min_income {
                return Err(BracketTableError::Inverted {
                    index,
                    min_income: bracket.min_income,
                    max_income: max,
                });
            }
        } else if index != last_index {
            return Err(BracketTableError::OpenEndedBeforeLast(index));
        }

        if let Some(prev) = previous {
            if bracket.min_income <= prev.min_income {
                return Err(BracketTableError::NotAscending {
                    index,
                    min_income: bracket.min_income,
                });
            }
            // Open-ended brackets only ever appear last, checked above
            if let Some(previous_max) = prev.max_income {
                let contiguous = bracket.min_income == previous_max
                    || bracket.min_income == previous_max + Decimal::ONE;
                if !contiguous {
                    return Err(BracketTableError::Gap {
                        index,
                        min_income: bracket.min_income,
                        previous_max,
                    });
                }
            }
        }

        previous = Some(bracket);
    }

    if brackets[last_index].max_income.is_some() {
        return Err(BracketTableError::BoundedLast);
    }

    Ok(())
}
