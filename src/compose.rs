//! Two ways of turning a token sequence into a [`PredicateTree`].
//!
//! [`reduce`] closes combinators in a single right-to-left pass over the
//! sequence, in place and without recursion. Consumed slots are never removed
//! from the sequence; instead a count of the resolved tokens directly to the
//! right of the scan position tells whether the combinator at hand has its
//! operands. Once a combinator is closed it stands as exactly one resolved
//! token for whatever sits to its left, so the count restarts at 1.
//!
//! [`compose`] is the baseline: a recursive descent that reads the sequence as
//! prefix notation. Its depth grows with the length of the chain.

use tracing::trace;

use crate::error::{Result, WherechainError};
use crate::predicate::{Combinator, PredicateTree, Token};

/// Deepest nesting [`compose`] descends into before giving up. Chains of `n`
/// key pairs nest about `2n` deep.
pub const MAX_COMPOSE_DEPTH: usize = 2_048;

/// Reduces `tokens` in place. On success the single resolved tree occupies
/// index 0 and every other slot is absorbed.
pub fn reduce_in_place(tokens: &mut [Token]) -> Result<()> {
    if tokens.is_empty() {
        return Err(WherechainError::EmptyTokens);
    }
    let mut pending_closed: usize = 0;
    for index in (0..tokens.len()).rev() {
        match &tokens[index] {
            Token::Combinator(combinator) => {
                let combinator = *combinator;
                let arity = combinator.arity();
                if arity == 0 {
                    return Err(WherechainError::Degenerate { combinator, index });
                }
                if pending_closed < arity {
                    return Err(WherechainError::Arity {
                        combinator,
                        index,
                        arity,
                        available: pending_closed,
                    });
                }
                // Operands beyond the arity would be skipped over by the
                // restart below and silently fall out of the tree.
                if pending_closed > arity {
                    return Err(WherechainError::Orphaned {
                        combinator,
                        index,
                        surplus: pending_closed - arity,
                    });
                }
                let children = tokens[index + 1..=index + arity]
                    .iter_mut()
                    .map(Token::take_resolved)
                    .collect::<Result<Vec<_>>>()?;
                tokens[index] = Token::Tree(PredicateTree::node(combinator, children)?);
                pending_closed = 1;
            }
            Token::Leaf(_) | Token::Tree(_) => pending_closed += 1,
            Token::Absorbed => {
                return Err(WherechainError::Invariant(format!(
                    "absorbed slot {} reached by the scan",
                    index
                )));
            }
        }
    }
    if pending_closed != 1 {
        return Err(WherechainError::Unmerged { operands: pending_closed });
    }
    Ok(())
}

/// Reduces a token sequence to its tree. See [`reduce_in_place`]. A root
/// `Where<_>` sentinel is opened, so a single key pair reduces to its leaf.
pub fn reduce(mut tokens: Vec<Token>) -> Result<PredicateTree> {
    reduce_in_place(&mut tokens)?;
    trace!(tokens = tokens.len(), "reduced token sequence");
    Ok(open_sentinel(tokens[0].take_resolved()?))
}

/// Builds the tree by recursive descent, leaving `tokens` untouched. Fails
/// with [`WherechainError::TooDeep`] past [`MAX_COMPOSE_DEPTH`] levels.
pub fn compose(tokens: &[Token]) -> Result<PredicateTree> {
    if tokens.is_empty() {
        return Err(WherechainError::EmptyTokens);
    }
    let (tree, next) = compose_from(tokens, 0, 1)?;
    if next < tokens.len() {
        return Err(WherechainError::Trailing { index: next });
    }
    Ok(open_sentinel(tree))
}

// Where<_> passes its operand through, so dropping it at the root keeps the
// match set.
fn open_sentinel(mut tree: PredicateTree) -> PredicateTree {
    if let PredicateTree::Node { combinator: Combinator::Where, children } = &mut tree {
        if let Some(operand) = children.pop() {
            return operand;
        }
    }
    tree
}

fn compose_from(tokens: &[Token], index: usize, depth: usize) -> Result<(PredicateTree, usize)> {
    if depth > MAX_COMPOSE_DEPTH {
        return Err(WherechainError::TooDeep { index, limit: MAX_COMPOSE_DEPTH });
    }
    match &tokens[index] {
        Token::Leaf(condition) => Ok((PredicateTree::Leaf(*condition), index + 1)),
        Token::Tree(tree) => Ok((tree.clone(), index + 1)),
        Token::Combinator(combinator) => {
            let combinator = *combinator;
            let arity = combinator.arity();
            if arity == 0 {
                return Err(WherechainError::Degenerate { combinator, index });
            }
            let mut children = Vec::with_capacity(arity);
            let mut next = index + 1;
            while children.len() < arity {
                if next >= tokens.len() {
                    return Err(WherechainError::Arity {
                        combinator,
                        index,
                        arity,
                        available: children.len(),
                    });
                }
                let (child, after) = compose_from(tokens, next, depth + 1)?;
                children.push(child);
                next = after;
            }
            Ok((PredicateTree::node(combinator, children)?, next))
        }
        Token::Absorbed => Err(WherechainError::Invariant(format!(
            "absorbed slot {} in an unreduced sequence",
            index
        ))),
    }
}
