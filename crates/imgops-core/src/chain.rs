//! Ordered, runtime-editable chain of image operations.
//!
//! Entries are `(id, operation)` pairs kept in insertion order. Ids are
//! chosen by the caller and are not required to be unique: lookups by id
//! (`modify_operation`, `remove_operation`, `operation`) act on the first
//! matching entry only.
//!
//! Execution over `n >= 2` operations uses exactly two scratch buffers
//! sized to the input and swaps them between steps, so memory stays
//! `O(height * width)` regardless of chain length.

use std::mem;

use serde::{Deserialize, Serialize};

use crate::buffer::Buffer2d;
use crate::diagnostics::{ChainDiagnostics, Clock, OperationDiagnostics};
use crate::ops::{ImageOperation, OpConfig, Operation};

/// Caller-assigned identifier of a chain entry.
pub type OpId = i32;

/// Ordered list of operations applied one after another.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationChain {
    entries: Vec<(OpId, Operation)>,
}

impl OperationChain {
    /// Create an empty chain.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append an operation built from `config` under `id`.
    ///
    /// An existing entry with the same id is kept; later lookups by this
    /// id will still find the earlier entry.
    pub fn add_operation(&mut self, id: OpId, config: OpConfig) {
        if self.contains(id) {
            log::warn!(
                "operation id {id} is already in the chain; lookups will use the first entry"
            );
        }
        log::debug!("adding {} operation with id {id}", config.kind());
        self.entries.push((id, Operation::from_config(config)));
    }

    /// Replace the operation of the first entry with `id`, keeping its
    /// position. Does nothing if no entry has this id.
    pub fn modify_operation(&mut self, id: OpId, config: OpConfig) {
        if let Some((_, op)) = self.entries.iter_mut().find(|(entry_id, _)| *entry_id == id) {
            *op = Operation::from_config(config);
        } else {
            log::debug!("modify_operation: no operation with id {id}");
        }
    }

    /// Remove the first entry with `id`. Does nothing if no entry has
    /// this id.
    pub fn remove_operation(&mut self, id: OpId) {
        if let Some(index) = self.position(id) {
            self.entries.remove(index);
        } else {
            log::debug!("remove_operation: no operation with id {id}");
        }
    }

    /// Number of entries, duplicates included.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the chain has no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether any entry has `id`.
    #[must_use]
    pub fn contains(&self, id: OpId) -> bool {
        self.position(id).is_some()
    }

    /// The operation of the first entry with `id`.
    #[must_use]
    pub fn operation(&self, id: OpId) -> Option<&Operation> {
        self.entries
            .iter()
            .find(|(entry_id, _)| *entry_id == id)
            .map(|(_, op)| op)
    }

    /// Entries in execution order.
    pub fn iter(&self) -> impl Iterator<Item = (OpId, &Operation)> {
        self.entries.iter().map(|(id, op)| (*id, op))
    }

    fn position(&self, id: OpId) -> Option<usize> {
        self.entries.iter().position(|(entry_id, _)| *entry_id == id)
    }

    /// Run every operation in order, from `input` to `output`.
    ///
    /// An empty chain copies `input` into `output`. `output` is resized
    /// to the extent of `input` when needed.
    pub fn execute_chain(&self, input: &Buffer2d<f32>, output: &mut Buffer2d<f32>) {
        self.execute_with(input, output, |_, op, src, dst| op.perform(src, dst));
    }

    /// Like [`execute_chain`](Self::execute_chain), timing each
    /// operation with `clock`.
    pub fn execute_chain_with_diagnostics<C: Clock>(
        &self,
        input: &Buffer2d<f32>,
        output: &mut Buffer2d<f32>,
        clock: &C,
    ) -> ChainDiagnostics {
        let start = clock.now();
        let mut operations = Vec::with_capacity(self.entries.len());

        self.execute_with(input, output, |id, op, src, dst| {
            let t = clock.now();
            op.perform(src, dst);
            let duration = clock.elapsed(&t);
            log::debug!("operation {id} ({}) took {duration:?}", op.kind());
            operations.push(OperationDiagnostics {
                id,
                kind: op.kind(),
                duration,
            });
        });

        ChainDiagnostics {
            width: input.width(),
            height: input.height(),
            operations,
            total_duration: clock.elapsed(&start),
        }
    }

    fn execute_with<F>(&self, input: &Buffer2d<f32>, output: &mut Buffer2d<f32>, mut run: F)
    where
        F: FnMut(OpId, &Operation, &Buffer2d<f32>, &mut Buffer2d<f32>),
    {
        log::debug!(
            "executing chain of {} operations on {}x{} input",
            self.entries.len(),
            input.height(),
            input.width(),
        );
        match self.entries.as_slice() {
            [] => {
                output.ensure_extent(input.height(), input.width());
                output.fill_from(input);
            }
            [(id, op)] => run(*id, op, input, output),
            entries => {
                let mut front = Buffer2d::new(input.height(), input.width());
                front.fill_from(input);
                let mut back = Buffer2d::new(input.height(), input.width());
                for (id, op) in entries {
                    run(*id, op, &front, &mut back);
                    mem::swap(&mut front, &mut back);
                }
                *output = front;
            }
        }
    }
}

/// Serialized form of one chain entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChainEntry {
    /// Caller-assigned id.
    pub id: OpId,
    /// Operation configuration.
    pub config: OpConfig,
}

impl Serialize for OperationChain {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let entries: Vec<ChainEntry> = self
            .iter()
            .map(|(id, op)| ChainEntry {
                id,
                config: op.config(),
            })
            .collect();
        entries.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for OperationChain {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = Vec::<ChainEntry>::deserialize(deserializer)?;
        Ok(entries.into_iter().collect())
    }
}

impl FromIterator<ChainEntry> for OperationChain {
    fn from_iter<I: IntoIterator<Item = ChainEntry>>(iter: I) -> Self {
        let mut chain = Self::new();
        for entry in iter {
            chain.add_operation(entry.id, entry.config);
        }
        chain
    }
}
