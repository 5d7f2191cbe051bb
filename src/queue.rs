// Copyright 2026 The seqfield-algebra Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The mark queue: yields marks in order while letting the caller request
//! "the next `n` cells", splitting the head mark when the request doesn't
//! land on a mark boundary (spec.md §4.2).

use std::collections::VecDeque;

use crate::ids::Revision;
use crate::mark::split_mark;
use crate::mark::Mark;

pub struct MarkQueue<R, C> {
    marks: VecDeque<Mark<R, C>>,
}

impl<R: Revision, C: Clone> MarkQueue<R, C> {
    pub fn new(marks: impl IntoIterator<Item = Mark<R, C>>) -> Self {
        Self {
            marks: marks.into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    /// The count of the head mark, or `0` if the queue is empty.
    pub fn peek_count(&self) -> u32 {
        self.marks.front().map_or(0, |m| m.count)
    }

    pub fn peek(&self) -> Option<&Mark<R, C>> {
        self.marks.front()
    }

    /// Removes and returns a mark covering exactly `min(n, peek_count())`
    /// cells, splitting the head mark if `n` falls strictly inside it.
    /// Returns `None` if the queue is empty.
    pub fn pop_up_to(&mut self, n: u32) -> Option<Mark<R, C>> {
        let head = self.marks.front()?;
        if n == 0 || n >= head.count {
            self.marks.pop_front()
        } else {
            let head = self.marks.pop_front().unwrap();
            let (left, right) = split_mark(&head, n);
            self.marks.push_front(right);
            Some(left)
        }
    }

    /// Pushes a mark back onto the front of the queue, used when an
    /// operator decides it needs to re-split a mark it already popped
    /// (e.g. after aligning against the other queue's head).
    pub fn push_front(&mut self, mark: Mark<R, C>) {
        if mark.count > 0 {
            self.marks.push_front(mark);
        }
    }
}

/// Aligns the heads of two queues to the shortest run of cells both sides
/// currently cover, splitting whichever side's head mark is longer.
/// Returns `None` once either queue is exhausted.
pub fn align_heads<R: Revision, C: Clone>(
    a: &mut MarkQueue<R, C>,
    b: &mut MarkQueue<R, C>,
) -> Option<(Mark<R, C>, Mark<R, C>)> {
    let count = a.peek_count().min(b.peek_count());
    if count == 0 {
        return None;
    }
    let left = a.pop_up_to(count)?;
    let right = b.pop_up_to(count)?;
    Some((left, right))
}
