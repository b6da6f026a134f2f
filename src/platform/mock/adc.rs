//! Mock analog input for testing

use crate::platform::traits::{Sample, SampleSource};
use std::collections::VecDeque;

/// Mock analog input
///
/// Returns queued samples in order; once the queue is exhausted it keeps
/// returning the last sample read (or the idle level if none was queued).
#[derive(Debug, Default)]
pub struct MockAdc {
    queue: VecDeque<Sample>,
    last: Sample,
    reads: usize,
}

impl MockAdc {
    /// Create a mock input idling at `level`
    pub fn new(level: Sample) -> Self {
        Self {
            queue: VecDeque::new(),
            last: level,
            reads: 0,
        }
    }

    /// Queue samples to be returned by subsequent reads
    pub fn push_samples(&mut self, samples: &[Sample]) {
        self.queue.extend(samples.iter().copied());
    }

    /// Number of reads so far
    pub fn reads(&self) -> usize {
        self.reads
    }
}

impl SampleSource for MockAdc {
    fn read_sample(&mut self) -> Sample {
        self.reads += 1;
        if let Some(sample) = self.queue.pop_front() {
            self.last = sample;
        }
        self.last
    }
}
