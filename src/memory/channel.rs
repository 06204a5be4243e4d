//! FIFO channels between a host and an engine
//!
//! A [`Channel`] is an unbounded queue of words. Each engine owns two: Input
//! (host → engine) and Output (engine → host). Popping an empty Input is the
//! only thing that suspends an engine; Output never blocks.

use super::Word;
use std::collections::VecDeque;

/// Unbounded FIFO of words
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Channel {
    queue: VecDeque<Word>,
}

impl Channel {
    pub fn new() -> Self {
        Channel {
            queue: VecDeque::new(),
        }
    }

    /// Append a value at the back
    pub fn push(&mut self, value: Word) {
        self.queue.push_back(value);
    }

    /// Remove the oldest value
    pub fn pop(&mut self) -> Option<Word> {
        self.queue.pop_front()
    }

    /// Oldest value without removing it
    pub fn front(&self) -> Option<Word> {
        self.queue.front().copied()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Iterate oldest-first without consuming
    pub fn iter(&self) -> impl Iterator<Item = Word> + '_ {
        self.queue.iter().copied()
    }

    /// Remove and return every queued value, oldest first
    pub fn drain(&mut self) -> Vec<Word> {
        self.queue.drain(..).collect()
    }
}

impl Extend<Word> for Channel {
    fn extend<I: IntoIterator<Item = Word>>(&mut self, iter: I) {
        self.queue.extend(iter);
    }
}

impl FromIterator<Word> for Channel {
    fn from_iter<I: IntoIterator<Item = Word>>(iter: I) -> Self {
        Channel {
            queue: iter.into_iter().collect(),
        }
    }
}
