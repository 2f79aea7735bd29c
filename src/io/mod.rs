pub mod input;
pub mod meta;
pub mod speakers;

pub use input::{parse_elan_file, parse_elan_str};
pub use meta::{CorpusMeta, load_corpus_meta};
pub use speakers::{load_speaker_csv, load_speaker_file};
