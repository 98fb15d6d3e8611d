//! Streams of lexical tokens.

use std::iter::Enumerate;
use std::ops::{Range, RangeFrom, RangeFull, RangeTo};

use nom::{InputIter, InputLength, InputTake, Needed, Slice, UnspecializedInput};

/// A window onto a slice of tokens that acts as a
/// [nom](https://crates.io/crates/nom)
/// [custom input type](https://github.com/rust-bakery/nom/blob/main/doc/custom_input_types.md).
/// `start` and `end` are offsets into the original slice, which
/// lets callers measure how far a parser got.
#[derive(PartialEq, Debug)]
pub struct Tokens<'a, T> {
    pub tok: &'a [T],
    pub start: usize,
    pub end: usize,
}

// Manual impls: a window is copyable whether or not its tokens are.
impl<'a, T> Clone for Tokens<'a, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, T> Copy for Tokens<'a, T> {}

impl<'a, T> Tokens<'a, T> {
    pub fn new(vec: &'a [T]) -> Self {
        Tokens {
            tok: vec,
            start: 0,
            end: vec.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tok.is_empty()
    }

    /// The next token, if any.
    pub fn peek(&self) -> Option<&'a T> {
        self.tok.first()
    }

    /// Drop tokens up to and including the first one that satisfies
    /// `predicate`, or everything if none does.
    pub fn skip_past<P>(&self, predicate: P) -> Self
    where
        P: Fn(&T) -> bool,
    {
        match self.tok.iter().position(predicate) {
            Some(i) => self.slice(i + 1..),
            None => self.slice(self.tok.len()..),
        }
    }
}

impl<'a, T> InputLength for Tokens<'a, T> {
    #[inline]
    fn input_len(&self) -> usize {
        self.tok.len()
    }
}

impl<'a, T> InputTake for Tokens<'a, T> {
    #[inline]
    fn take(&self, count: usize) -> Self {
        self.slice(..count)
    }

    #[inline]
    fn take_split(&self, count: usize) -> (Self, Self) {
        (self.slice(count..), self.slice(..count))
    }
}

impl<'a, T> Slice<Range<usize>> for Tokens<'a, T> {
    #[inline]
    fn slice(&self, range: Range<usize>) -> Self {
        Tokens {
            tok: &self.tok[range.clone()],
            start: self.start + range.start,
            end: self.start + range.end,
        }
    }
}

impl<'a, T> Slice<RangeTo<usize>> for Tokens<'a, T> {
    #[inline]
    fn slice(&self, range: RangeTo<usize>) -> Self {
        self.slice(0..range.end)
    }
}

impl<'a, T> Slice<RangeFrom<usize>> for Tokens<'a, T> {
    #[inline]
    fn slice(&self, range: RangeFrom<usize>) -> Self {
        self.slice(range.start..self.tok.len())
    }
}

impl<'a, T> Slice<RangeFull> for Tokens<'a, T> {
    #[inline]
    fn slice(&self, _: RangeFull) -> Self {
        *self
    }
}

impl<'a, T> InputIter for Tokens<'a, T> {
    type Item = &'a T;
    type Iter = Enumerate<::std::slice::Iter<'a, T>>;
    type IterElem = ::std::slice::Iter<'a, T>;

    #[inline]
    fn iter_indices(&self) -> Enumerate<::std::slice::Iter<'a, T>> {
        self.tok.iter().enumerate()
    }

    #[inline]
    fn iter_elements(&self) -> ::std::slice::Iter<'a, T> {
        self.tok.iter()
    }

    #[inline]
    fn position<P>(&self, predicate: P) -> Option<usize>
    where
        P: Fn(Self::Item) -> bool,
    {
        self.tok.iter().position(predicate)
    }

    #[inline]
    fn slice_index(&self, count: usize) -> Result<usize, Needed> {
        if self.tok.len() >= count {
            Ok(count)
        } else {
            Err(Needed::Unknown)
        }
    }
}

impl<'a, T> UnspecializedInput for Tokens<'a, T> {}
