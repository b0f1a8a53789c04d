#![allow(dead_code, unused_imports)]

mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from meter_reader for tests
pub use meter_reader::{
    MeterReader, ReadError, Reading, RegionError, RegionExtractor, RegionParams, TextRecognizer,
};
