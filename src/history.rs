// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Persistent entry history.
//!
//! A [`History`] is a singly linked list grown at the tail. Appending allocates one
//! node and shares every earlier node with the parent history, so deriving a new
//! ledger never copies the entries it already had.

use crate::entry::Entry;
use std::fmt;
use std::iter::FusedIterator;
use std::sync::Arc;

struct Node {
    entry: Entry,
    parent: Option<Arc<Node>>,
}

impl Drop for Node {
    // Unlink iteratively; long chains would otherwise recurse once per node.
    fn drop(&mut self) {
        let mut next = self.parent.take();
        while let Some(node) = next {
            match Arc::try_unwrap(node) {
                Ok(mut node) => next = node.parent.take(),
                Err(_) => break,
            }
        }
    }
}

/// An immutable, append-only sequence of entries with a shared prefix.
#[derive(Clone, Default)]
pub(crate) struct History {
    tail: Option<Arc<Node>>,
    len: usize,
}

impl History {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns a new history with `entry` appended. `self` is unchanged.
    pub(crate) fn push(&self, entry: Entry) -> Self {
        Self {
            tail: Some(Arc::new(Node {
                entry,
                parent: self.tail.clone(),
            })),
            len: self.len + 1,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn last(&self) -> Option<&Entry> {
        self.tail.as_deref().map(|node| &node.entry)
    }

    /// Walks back from the tail; `O(len - index)`.
    pub(crate) fn get(&self, index: usize) -> Option<&Entry> {
        if index >= self.len {
            return None;
        }
        let mut node = self.tail.as_deref()?;
        for _ in 0..(self.len - 1 - index) {
            node = node.parent.as_deref()?;
        }
        Some(&node.entry)
    }

    /// Iterates entries oldest first.
    pub(crate) fn iter(&self) -> Entries<'_> {
        let mut entries = Vec::with_capacity(self.len);
        let mut cursor = self.tail.as_deref();
        while let Some(node) = cursor {
            entries.push(&node.entry);
            cursor = node.parent.as_deref();
        }
        entries.reverse();
        Entries {
            inner: entries.into_iter(),
        }
    }

    /// Whether both histories share the same node for their last entry.
    #[cfg(test)]
    pub(crate) fn shares_tail_with(&self, other: &History) -> bool {
        match (&self.tail, &other.tail) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    #[cfg(test)]
    pub(crate) fn parent(&self) -> Option<History> {
        let tail = self.tail.as_ref()?;
        Some(Self {
            tail: tail.parent.clone(),
            len: self.len - 1,
        })
    }
}

impl FromIterator<Entry> for History {
    fn from_iter<I: IntoIterator<Item = Entry>>(entries: I) -> Self {
        entries
            .into_iter()
            .fold(History::new(), |history, entry| history.push(entry))
    }
}

impl fmt::Debug for History {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Iterator over a history's entries, oldest first.
#[derive(Debug, Clone)]
pub struct Entries<'a> {
    inner: std::vec::IntoIter<&'a Entry>,
}

impl<'a> Iterator for Entries<'a> {
    type Item = &'a Entry;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl DoubleEndedIterator for Entries<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl ExactSizeIterator for Entries<'_> {}

impl FusedIterator for Entries<'_> {}
