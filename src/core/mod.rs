pub mod etl;
pub mod failure;

pub use crate::domain::model::{DerivedRecord, ItemFailure, ItemResult, Record, RunReport};
pub use crate::domain::ports::{Sink, Source, Storage, TextRecognizer, Transformer};
pub use crate::utils::error::Result;
