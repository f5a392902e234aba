// Resume-side text processing: vocabulary lookup, skill phrase scanning,
// experience heuristics. No I/O beyond loading the vocabulary file.

pub mod experience;
pub mod extractor;
pub mod normalize;
pub mod vocabulary;
