use crate::domain::recipient_record::RecipientRecord;

pub type Batch = Vec<RecipientRecord>;

/// Collects recipients, in input order, into batches of at most `batch_size`.
#[derive(Debug)]
pub struct BatchAccumulator {
    batch_size: usize,
    current: Batch,
}

impl BatchAccumulator {
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size,
            current: Vec::new(),
        }
    }

    pub fn append(&mut self, record: RecipientRecord) {
        self.current.push(record);
    }

    pub fn is_full(&self) -> bool {
        self.current.len() >= self.batch_size
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// Hands over the current batch and starts a new, empty one.
    pub fn drain(&mut self) -> Batch {
        std::mem::take(&mut self.current)
    }
}
