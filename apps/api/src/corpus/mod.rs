// Job corpus: ingestion, TF-IDF index, and the swappable snapshot store.

pub mod index;
pub mod loader;
pub mod store;
pub mod vector;
