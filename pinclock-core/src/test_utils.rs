//! Test utilities for pipeline consumers

use std::collections::VecDeque;

use crate::queue::EventSource;

/// Event source that replays a fixed script
///
/// Each `None` entry stands for a pop that timed out. Once the script is
/// exhausted every call reports a timeout.
#[derive(Debug)]
pub struct ScriptedSource<T> {
    script: VecDeque<Option<T>>,
}

impl<T> ScriptedSource<T> {
    pub fn new() -> Self {
        Self {
            script: VecDeque::new(),
        }
    }

    /// Script of events with no timeouts
    pub fn from_events<I>(events: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        Self {
            script: events.into_iter().map(Some).collect(),
        }
    }

    /// Append an event
    pub fn then_event(mut self, event: T) -> Self {
        self.script.push_back(Some(event));
        self
    }

    /// Append `count` copies of an event
    pub fn then_events(mut self, event: T, count: usize) -> Self
    where
        T: Clone,
    {
        for _ in 0..count {
            self.script.push_back(Some(event.clone()));
        }
        self
    }

    /// Append a timeout
    pub fn then_timeout(mut self) -> Self {
        self.script.push_back(None);
        self
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl<T> EventSource<T> for ScriptedSource<T> {
    async fn next_event(&mut self) -> Option<T> {
        self.script.pop_front().flatten()
    }
}

/// Collects step results for later assertions
#[derive(Debug)]
pub struct OutcomeLog<E> {
    entries: Vec<E>,
}

impl<E> Default for OutcomeLog<E> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<E: PartialEq> OutcomeLog<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, entry: E) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[E] {
        &self.entries
    }

    /// How many recorded entries match `pred`
    pub fn count_where<F>(&self, pred: F) -> usize
    where
        F: Fn(&E) -> bool,
    {
        self.entries.iter().filter(|e| pred(e)).count()
    }
}
