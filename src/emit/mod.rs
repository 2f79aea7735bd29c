pub mod conllu;
pub mod corpus;
pub mod tables;

pub use conllu::{ConlluEmitter, format_document};
pub use corpus::{Corpus, CorpusEmitter};
pub use tables::{TablesEmitter, write_speaker_table};
