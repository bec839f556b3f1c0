//! Builds the flat token form of "match header 1 OR header 2 OR ... header n".
//!
//! The stream for `n` key pairs is
//!
//! ```text
//! Where<_>  ( Where2<_, _>  KeyEquals(i)  Or<_> ) * (n - 1)  KeyEquals(n)
//! ```
//!
//! which reads right-nested: `Where<Where2<k1, Or<Where2<k2, Or<... kn>>>>>`.
//! Scanning it right to left, every combinator finds exactly as many resolved
//! tokens to its right as its arity asks for.

use crate::construct::KeyPair;
use crate::predicate::{Bindings, Combinator, Condition, Token};

#[derive(Debug)]
pub struct WhereChain {
    tokens: Vec<Token>,
    bindings: Bindings,
}

impl WhereChain {
    /// An empty batch yields an empty stream; callers are expected to skip
    /// empty batches before building.
    pub fn build(key_pairs: &[KeyPair]) -> Self {
        let mut tokens = Vec::with_capacity((3 * key_pairs.len()).saturating_sub(1));
        let mut bindings = Bindings::with_capacity(2 * key_pairs.len());
        if let Some((last, rest)) = key_pairs.split_last() {
            tokens.push(Token::Combinator(Combinator::Where));
            for key_pair in rest {
                tokens.push(Token::Combinator(Combinator::Where2));
                tokens.push(Token::Leaf(Self::key_equals(key_pair, &mut bindings)));
                tokens.push(Token::Combinator(Combinator::Or));
            }
            tokens.push(Token::Leaf(Self::key_equals(last, &mut bindings)));
        }
        Self { tokens, bindings }
    }

    fn key_equals(key_pair: &KeyPair, bindings: &mut Bindings) -> Condition {
        Condition::KeyEquals {
            discriminator: bindings.bind(key_pair.discriminator()),
            reference: bindings.bind(key_pair.reference()),
        }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }
    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }
    pub fn into_parts(self) -> (Vec<Token>, Bindings) {
        (self.tokens, self.bindings)
    }
}
