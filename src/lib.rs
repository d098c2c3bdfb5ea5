pub mod alignment;
pub mod document;
pub mod lookup;
pub mod pipeline;
pub mod segmenter;
pub mod structure;
pub mod timeline;

// Re-export main types for convenient access
pub use alignment::{AlignedText, AlignmentFile, AlignmentTrace, Word};
pub use document::{ContentDocument, LookupTableFile};
pub use lookup::{LookupEntry, LookupTable};
pub use pipeline::{process_alignment, PipelineConfig, ProcessedDocument};
pub use segmenter::{BreakReason, Sentence, SentenceSegmenter};
pub use structure::{StructureDetector, StructureKind, TextStructure};
