pub mod archive;
pub mod config;
pub mod error;
pub mod index;
pub mod rank;
pub mod sample;
pub mod session;
pub mod tokenizer;
pub mod vector;

pub use config::SearchConfig;
pub use error::LoadError;
pub use index::{Corpus, DocKey, IndexedDoc, SearchHit};
pub use session::{preview, QueryOutcome, Session};
