pub mod expand;
pub mod iris;

pub use expand::{ExpandedDataset, Mode, PermutedRecord, TrainingPair};
pub use iris::{parse_records, FisherIris, InMemory, Record, RecordSource};
