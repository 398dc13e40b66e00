/// Data layer: collecting, loading and assembling CP-center samples.
///
/// Architecture:
/// ```text
///  <dir>/<subject>_<idx>.json|.parquet
///        │
///        ▼
///   ┌───────────┐
///   │ collector │  list + parse file names → SampleFile
///   └───────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  feat_row / scores → Record (argmax label)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  table   │  Vec<Record> → SampleTable, count checks
///   └──────────┘
/// ```

pub mod collector;
pub mod loader;
pub mod model;
pub mod table;
