use std::iter::FusedIterator;

use super::{Entry, Link, Node};

/// Lazy in-order traversal holding one stack frame per tree level.
pub(crate) struct Iter<'a, E: Entry> {
    stack: Vec<&'a Node<E>>,
    remaining: usize,
}

impl<'a, E: Entry> Iter<'a, E> {
    pub(crate) fn new(root: &'a Link<E>) -> Self {
        let mut iter = Self {
            stack: Vec::new(),
            remaining: super::size(root),
        };
        iter.push_left_spine(root);
        iter
    }

    fn push_left_spine(&mut self, mut cur: &'a Link<E>) {
        while let Some(n) = cur {
            self.stack.push(n);
            cur = &n.left;
        }
    }
}

impl<'a, E: Entry> Iterator for Iter<'a, E> {
    type Item = &'a E;

    fn next(&mut self) -> Option<Self::Item> {
        let n = self.stack.pop()?;
        self.push_left_spine(&n.right);
        self.remaining -= 1;
        Some(&n.entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<E: Entry> ExactSizeIterator for Iter<'_, E> {}

impl<E: Entry> FusedIterator for Iter<'_, E> {}

impl<E: Entry> Clone for Iter<'_, E> {
    fn clone(&self) -> Self {
        Self {
            stack: self.stack.clone(),
            remaining: self.remaining,
        }
    }
}
