//! Predicate building blocks: parametrised leaf conditions, combinators of a
//! fixed arity, the flat token form a filter is assembled from, and the
//! resolved [`PredicateTree`].
//!
//! Trees built from large header batches are as deep as the batch is long, so
//! every walk over a tree (evaluation, simplification, depth, drop) uses an
//! explicit stack rather than recursion.

use std::fmt;
use std::mem;

// used for internal result sets
use roaring::RoaringTreemap;

use crate::construct::{Column, KeyPair};
use crate::error::{Result, WherechainError};

// ------------- Parameters -------------
/// A placeholder for a value supplied when the filter is selected, rather
/// than when it is built.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Param(pub usize);
impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

/// Ordered argument list; the value for `Param(i)` is the `i`th pushed value.
#[derive(Clone, Default, PartialEq, Eq, Debug)]
pub struct Bindings {
    values: Vec<String>,
}
impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
        }
    }
    pub fn bind(&mut self, value: impl Into<String>) -> Param {
        self.values.push(value.into());
        Param(self.values.len() - 1)
    }
    pub fn get(&self, param: Param) -> Result<&str> {
        self.values
            .get(param.0)
            .map(String::as_str)
            .ok_or(WherechainError::UnboundParameter {
                param,
                bound: self.values.len(),
            })
    }
    pub fn len(&self) -> usize {
        self.values.len()
    }
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// ------------- Condition -------------
/// A fully formed leaf filter.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Condition {
    /// `column = @p`
    Equals(Column, Param),
    /// `discriminator = @d AND reference = @r`
    KeyEquals { discriminator: Param, reference: Param },
}
impl Condition {
    /// Row-wise check of a single key against this condition.
    pub fn matches(&self, key: &KeyPair, bindings: &Bindings) -> Result<bool> {
        Ok(match self {
            Condition::Equals(column, param) => column.of(key) == bindings.get(*param)?,
            Condition::KeyEquals { discriminator, reference } => {
                key.discriminator() == bindings.get(*discriminator)?
                    && key.reference() == bindings.get(*reference)?
            }
        })
    }
}
impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Condition::Equals(column, param) => write!(f, "{} = {}", column, param),
            Condition::KeyEquals { discriminator, reference } => write!(
                f,
                "discriminator = {} AND reference = {}",
                discriminator, reference
            ),
        }
    }
}

// ------------- Combinator -------------
/// A joiner awaiting a fixed number of operands.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Combinator {
    /// Opens a filter around its single operand.
    Where,
    /// A condition followed by a chain link (`Or` or `And`).
    Where2,
    /// Chain link: the enclosing `Where2` is a disjunction.
    Or,
    /// Chain link: the enclosing `Where2` is a conjunction.
    And,
    AnyOf(usize),
    AllOf(usize),
}
impl Combinator {
    pub fn arity(&self) -> usize {
        match self {
            Combinator::Where | Combinator::Or | Combinator::And => 1,
            Combinator::Where2 => 2,
            Combinator::AnyOf(n) | Combinator::AllOf(n) => *n,
        }
    }
}
impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Combinator::Where => write!(f, "Where<_>"),
            Combinator::Where2 => write!(f, "Where2<_, _>"),
            Combinator::Or => write!(f, "Or<_>"),
            Combinator::And => write!(f, "And<_>"),
            Combinator::AnyOf(n) => write!(f, "AnyOf<{}>", n),
            Combinator::AllOf(n) => write!(f, "AllOf<{}>", n),
        }
    }
}

// ------------- Token -------------
/// One slot of a token sequence. `Tree` and `Absorbed` only appear while a
/// sequence is being reduced in place.
#[derive(Clone, PartialEq, Debug)]
pub enum Token {
    Leaf(Condition),
    Combinator(Combinator),
    Tree(PredicateTree),
    Absorbed,
}
impl Token {
    /// Moves a resolved operand out of its slot, leaving the slot absorbed.
    pub(crate) fn take_resolved(&mut self) -> Result<PredicateTree> {
        match mem::replace(self, Token::Absorbed) {
            Token::Leaf(condition) => Ok(PredicateTree::Leaf(condition)),
            Token::Tree(tree) => Ok(tree),
            other => {
                let message = format!("{:?} is not a resolved operand", other);
                *self = other;
                Err(WherechainError::Invariant(message))
            }
        }
    }
}

// ------------- PredicateTree -------------
#[derive(Clone, PartialEq, Debug)]
pub enum PredicateTree {
    Leaf(Condition),
    Node {
        combinator: Combinator,
        children: Vec<PredicateTree>,
    },
}

enum Shape {
    PassThrough,
    Any,
    All,
}

impl PredicateTree {
    pub fn node(combinator: Combinator, children: Vec<PredicateTree>) -> Result<Self> {
        if combinator.arity() == 0 || children.len() != combinator.arity() {
            return Err(WherechainError::Invariant(format!(
                "{} given {} operands",
                combinator,
                children.len()
            )));
        }
        Ok(PredicateTree::Node { combinator, children })
    }

    // Where2<a, Or<b>> reads as "a or b", any other second operand as "a and b".
    fn is_disjunctive(combinator: Combinator, children: &[PredicateTree]) -> bool {
        match combinator {
            Combinator::AnyOf(_) => true,
            Combinator::Where2 => matches!(
                children.get(1),
                Some(PredicateTree::Node { combinator: Combinator::Or, .. })
            ),
            _ => false,
        }
    }

    /// Evaluates the tree to the set of things it matches, asking `leaf` for
    /// the match set of every condition.
    pub fn evaluate<F>(&self, mut leaf: F) -> Result<RoaringTreemap>
    where
        F: FnMut(&Condition) -> Result<RoaringTreemap>,
    {
        enum Step<'t> {
            Visit(&'t PredicateTree),
            Merge(Combinator, &'t [PredicateTree]),
        }
        let mut steps = vec![Step::Visit(self)];
        let mut operands: Vec<RoaringTreemap> = Vec::new();
        while let Some(step) = steps.pop() {
            match step {
                Step::Visit(PredicateTree::Leaf(condition)) => operands.push(leaf(condition)?),
                Step::Visit(PredicateTree::Node { combinator, children }) => {
                    steps.push(Step::Merge(*combinator, children));
                    steps.extend(children.iter().rev().map(Step::Visit));
                }
                Step::Merge(combinator, children) => {
                    let from = operands.len().checked_sub(children.len()).ok_or_else(|| {
                        WherechainError::Invariant(format!("{} is missing operands", combinator))
                    })?;
                    let disjunctive = Self::is_disjunctive(combinator, children);
                    let merged = {
                        let mut merging = operands.drain(from..);
                        let mut merged = merging.next().unwrap_or_default();
                        for operand in merging {
                            if disjunctive {
                                merged |= operand;
                            } else {
                                merged &= operand;
                            }
                        }
                        merged
                    };
                    operands.push(merged);
                }
            }
        }
        operands
            .pop()
            .ok_or_else(|| WherechainError::Invariant("evaluation produced no result".into()))
    }

    /// Rewrites the tree into its canonical `Leaf | AnyOf | AllOf` form: pass
    /// through nodes disappear and `Where2` becomes a binary `AnyOf`/`AllOf`.
    pub fn simplify(self) -> Result<PredicateTree> {
        enum Step {
            Open(PredicateTree),
            Close(Shape, usize),
        }
        let mut steps = vec![Step::Open(self)];
        let mut simplified: Vec<PredicateTree> = Vec::new();
        while let Some(step) = steps.pop() {
            match step {
                Step::Open(mut tree) => match &mut tree {
                    PredicateTree::Leaf(condition) => simplified.push(PredicateTree::Leaf(*condition)),
                    PredicateTree::Node { combinator, children } => {
                        let shape = match *combinator {
                            Combinator::Where | Combinator::Or | Combinator::And => Shape::PassThrough,
                            _ if Self::is_disjunctive(*combinator, &children[..]) => Shape::Any,
                            _ => Shape::All,
                        };
                        let children = mem::take(children);
                        steps.push(Step::Close(shape, children.len()));
                        steps.extend(children.into_iter().rev().map(Step::Open));
                    }
                },
                Step::Close(shape, count) => {
                    let from = simplified.len().checked_sub(count).ok_or_else(|| {
                        WherechainError::Invariant("simplification lost operands".into())
                    })?;
                    let mut children = simplified.split_off(from);
                    let tree = match shape {
                        Shape::PassThrough => children.pop().ok_or_else(|| {
                            WherechainError::Invariant("pass through node without operand".into())
                        })?,
                        Shape::Any => PredicateTree::node(Combinator::AnyOf(children.len()), children)?,
                        Shape::All => PredicateTree::node(Combinator::AllOf(children.len()), children)?,
                    };
                    simplified.push(tree);
                }
            }
        }
        simplified
            .pop()
            .ok_or_else(|| WherechainError::Invariant("simplification produced no tree".into()))
    }

    /// Number of nodes on the longest path from the root to a leaf.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(self, 1)];
        while let Some((tree, depth)) = pending.pop() {
            deepest = deepest.max(depth);
            if let PredicateTree::Node { children, .. } = tree {
                pending.extend(children.iter().map(|child| (child, depth + 1)));
            }
        }
        deepest
    }

    pub fn leaves(&self) -> usize {
        let mut count = 0;
        let mut pending = vec![self];
        while let Some(tree) = pending.pop() {
            match tree {
                PredicateTree::Leaf(_) => count += 1,
                PredicateTree::Node { children, .. } => pending.extend(children.iter()),
            }
        }
        count
    }
}

// Dropping a deep tree recursively would overflow the stack, so children are
// moved onto a heap allocated work list instead.
impl Drop for PredicateTree {
    fn drop(&mut self) {
        let PredicateTree::Node { children, .. } = self else {
            return;
        };
        let mut pending = mem::take(children);
        while let Some(mut child) = pending.pop() {
            if let PredicateTree::Node { children, .. } = &mut child {
                pending.append(children);
            }
        }
    }
}
