// Adapters layer: concrete implementations of the domain ports
// (storage, http, csv files, the Twitter API, OCR).

pub mod csv_sink;
pub mod csv_source;
pub mod http;
pub mod ocr;
pub mod storage;
pub mod twitter;
