//! Per-set descriptor write queues
//!
//! Writes accumulate per logical set until compilation consumes them. A
//! second write to the same `(binding, array_element)` replaces the first.
//! A write may carry several infos for one binding; the largest info count
//! in a set's queue decides how many physical instances of that set get
//! allocated, and instance `i` takes info `i % len` from each write.

use crate::device::handles::BufferViewId;
use crate::device::types::{BufferWriteInfo, ImageWriteInfo};
use crate::reflection::MAX_PROGRAM_SET_SLOTS;

/// The resource infos of one queued write
#[derive(Debug, Clone, PartialEq)]
pub enum WritePayload {
    Buffers(Vec<BufferWriteInfo>),
    Images(Vec<ImageWriteInfo>),
    TexelViews(Vec<BufferViewId>),
}

impl WritePayload {
    /// Number of infos carried
    pub fn len(&self) -> usize {
        match self {
            WritePayload::Buffers(infos) => infos.len(),
            WritePayload::Images(infos) => infos.len(),
            WritePayload::TexelViews(infos) => infos.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Single-info payload for physical set instance `i` (modulo selection)
    pub fn select(&self, i: usize) -> WritePayload {
        match self {
            WritePayload::Buffers(infos) => {
                WritePayload::Buffers(vec![infos[i % infos.len()]])
            }
            WritePayload::Images(infos) => {
                WritePayload::Images(vec![infos[i % infos.len()]])
            }
            WritePayload::TexelViews(infos) => {
                WritePayload::TexelViews(vec![infos[i % infos.len()]])
            }
        }
    }
}

/// One pending write against a logical set
#[derive(Debug, Clone, PartialEq)]
pub struct QueuedWrite {
    pub binding: u32,
    pub array_element: u32,
    pub payload: WritePayload,
}

/// Write queues for every program set slot
#[derive(Default)]
pub struct WriteQueues {
    queues: [Vec<QueuedWrite>; MAX_PROGRAM_SET_SLOTS as usize],
}

impl WriteQueues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a write, replacing any earlier write to the same
    /// `(binding, array_element)` in the same set
    pub fn push(&mut self, set: u32, binding: u32, array_element: u32, payload: WritePayload) {
        let queue = &mut self.queues[set as usize];
        match queue
            .iter_mut()
            .find(|w| w.binding == binding && w.array_element == array_element)
        {
            Some(existing) => existing.payload = payload,
            None => queue.push(QueuedWrite { binding, array_element, payload }),
        }
    }

    /// Physical set instances needed: the widest info list queued for the
    /// set, or 0 when nothing is queued
    pub fn variant_count(&self, set: u32) -> u32 {
        self.queues[set as usize]
            .iter()
            .map(|w| w.payload.len() as u32)
            .max()
            .unwrap_or(0)
    }

    pub fn writes(&self, set: u32) -> &[QueuedWrite] {
        &self.queues[set as usize]
    }

    pub fn is_empty(&self, set: u32) -> bool {
        self.queues[set as usize].is_empty()
    }

    /// Drop every queued write in every set
    pub fn clear(&mut self) {
        for queue in &mut self.queues {
            queue.clear();
        }
    }
}

#[cfg(test)]
#[path = "write_queue_tests.rs"]
mod tests;
