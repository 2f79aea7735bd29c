pub mod emit;
pub mod error;
pub mod io;
pub mod models;
pub mod pipeline;
pub mod text;
pub mod timeline;

pub use emit::{ConlluEmitter, Corpus, CorpusEmitter, TablesEmitter};
pub use error::ExportError;
pub use io::{CorpusMeta, load_corpus_meta, load_speaker_file, parse_elan_file, parse_elan_str};
pub use models::{Recording, SpeakerRecord, SpeakerTable, normalize_speaker_id};
pub use pipeline::{DocumentRecord, FormDictionary, Pipeline, SegmentRecord, TokenRecord};
pub use text::{Category, Classifier, ClassifiedToken, Normalizer, Tokenizer};
pub use timeline::{FRAME_RATE, Span, Timeline};
