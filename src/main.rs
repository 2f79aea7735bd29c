use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use elanflat::emit::write_speaker_table;
use elanflat::{
    ConlluEmitter, CorpusEmitter, Pipeline, TablesEmitter, load_corpus_meta, load_speaker_file,
    parse_elan_file,
};

#[derive(Parser)]
#[command(name = "elanflat")]
#[command(author, version, about = "ELAN transcription to flat corpus export pipeline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export tab-separated document/segment/token tables
    Tables {
        /// Directory containing ELAN transcription files
        #[arg(short, long)]
        data: PathBuf,

        /// Speaker metadata CSV file
        #[arg(short, long)]
        speakers: PathBuf,

        /// Output directory for the tables
        #[arg(short, long)]
        output: PathBuf,

        /// Process at most this many recordings
        #[arg(long)]
        limit: Option<usize>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Export a line-oriented annotated token file
    Conllu {
        /// Directory containing ELAN transcription files
        #[arg(short, long)]
        data: PathBuf,

        /// Speaker metadata CSV file
        #[arg(short, long)]
        speakers: PathBuf,

        /// Output directory for the token file and speaker lookup
        #[arg(short, long)]
        output: PathBuf,

        /// Process at most this many recordings
        #[arg(long)]
        limit: Option<usize>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Export a corpus with word-level timing through the corpus builder
    Corpus {
        /// Directory containing ELAN transcription files and audio
        #[arg(short, long)]
        data: PathBuf,

        /// Speaker metadata CSV file
        #[arg(short, long)]
        speakers: PathBuf,

        /// Corpus metadata JSON file
        #[arg(short, long)]
        meta: PathBuf,

        /// Output directory for the corpus
        #[arg(short, long)]
        output: PathBuf,

        /// Copy audio files next to the corpus
        #[arg(long)]
        copy_audio: bool,

        /// Process at most this many recordings
        #[arg(long)]
        limit: Option<usize>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Analyze a single transcription file without writing output
    Analyze {
        /// ELAN transcription file
        #[arg(short, long)]
        input: PathBuf,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Tables {
            data,
            speakers,
            output,
            limit,
            verbose,
        } => {
            setup_logging(verbose);
            run_tables(&data, &speakers, &output, limit)
        }
        Commands::Conllu {
            data,
            speakers,
            output,
            limit,
            verbose,
        } => {
            setup_logging(verbose);
            run_conllu(&data, &speakers, &output, limit)
        }
        Commands::Corpus {
            data,
            speakers,
            meta,
            output,
            copy_audio,
            limit,
            verbose,
        } => {
            setup_logging(verbose);
            run_corpus(&data, &speakers, &meta, &output, copy_audio, limit)
        }
        Commands::Analyze { input, verbose } => {
            setup_logging(verbose);
            analyze_recording(&input)
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

/// Transcription files in the data directory, sorted for a deterministic
/// global timeline
fn collect_input_files(data: &Path, limit: Option<usize>) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(data)
        .with_context(|| format!("Failed to read data directory: {:?}", data))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        if matches!(extension.as_deref(), Some("xml") | Some("eaf")) {
            files.push(path);
        }
    }
    files.sort();

    if let Some(limit) = limit {
        files.truncate(limit);
    }
    Ok(files)
}

fn run_tables(
    data: &Path,
    speakers: &Path,
    output: &Path,
    limit: Option<usize>,
) -> Result<()> {
    info!("Loading speaker metadata from {:?}", speakers);
    let mut speaker_table = load_speaker_file(speakers)?;
    info!("Loaded {} speaker records", speaker_table.len());

    let files = collect_input_files(data, limit)?;
    info!("Found {} transcription files", files.len());

    let mut pipeline = Pipeline::new();
    let mut emitter = TablesEmitter::create(output)?;

    for path in &files {
        let recording = parse_elan_file(path)?;
        for tier in &recording.tiers {
            speaker_table.ensure(&tier.speaker_id);
        }
        let doc = pipeline
            .process_recording(&recording)
            .with_context(|| format!("Failed to process recording {:?}", path))?;
        info!(
            "{}: {} segments, chars {}, frames {}",
            doc.document_id,
            doc.segments.len(),
            doc.char_range,
            doc.frame_range
        );
        emitter.add_document(&doc)?;
    }

    emitter.finish(pipeline.forms(), &speaker_table)?;
    info!(
        "Exported {} recordings, {} distinct forms to {:?}",
        files.len(),
        pipeline.forms().len(),
        output
    );
    Ok(())
}

fn run_conllu(
    data: &Path,
    speakers: &Path,
    output: &Path,
    limit: Option<usize>,
) -> Result<()> {
    info!("Loading speaker metadata from {:?}", speakers);
    let mut speaker_table = load_speaker_file(speakers)?;

    let files = collect_input_files(data, limit)?;
    info!("Found {} transcription files", files.len());

    std::fs::create_dir_all(output)
        .with_context(|| format!("Failed to create output directory: {:?}", output))?;
    let conllu_path = output.join("corpus.conllu");
    let mut emitter = ConlluEmitter::create(&conllu_path)?;

    let mut pipeline = Pipeline::new();
    for path in &files {
        let recording = parse_elan_file(path)?;
        for tier in &recording.tiers {
            speaker_table.ensure(&tier.speaker_id);
        }
        let doc = pipeline
            .process_recording(&recording)
            .with_context(|| format!("Failed to process recording {:?}", path))?;
        info!("{}: {} segments", doc.document_id, doc.segments.len());
        emitter.add_document(&doc)?;
    }
    emitter.finish()?;

    write_speaker_table(&output.join("global_attribute_speaker.tsv"), &speaker_table)?;
    info!("Wrote {:?}", conllu_path);
    Ok(())
}

fn run_corpus(
    data: &Path,
    speakers: &Path,
    meta: &Path,
    output: &Path,
    copy_audio: bool,
    limit: Option<usize>,
) -> Result<()> {
    let corpus_meta = load_corpus_meta(meta)?;
    info!("Building corpus {:?}", corpus_meta.name);

    let mut speaker_table = load_speaker_file(speakers)?;
    let files = collect_input_files(data, limit)?;
    info!("Found {} transcription files", files.len());

    let mut pipeline = Pipeline::new();
    let mut emitter = CorpusEmitter::new(corpus_meta, output, data, copy_audio);

    for path in &files {
        let recording = parse_elan_file(path)?;
        for tier in &recording.tiers {
            speaker_table.ensure(&tier.speaker_id);
        }
        let doc = pipeline
            .process_recording(&recording)
            .with_context(|| format!("Failed to process recording {:?}", path))?;
        info!("{}: {} segments", doc.document_id, doc.segments.len());
        emitter.add_document(&doc)?;
    }

    emitter.finish(&speaker_table)?;
    info!("Corpus written to {:?}", output);
    Ok(())
}

fn analyze_recording(input: &Path) -> Result<()> {
    info!("Analyzing {:?}", input);
    let recording = parse_elan_file(input)?;

    let mut pipeline = Pipeline::new();
    let doc = pipeline.process_recording(&recording)?;

    println!("Recording Analysis");
    println!("==================");
    println!("Recording: {}", doc.document_id);
    println!("Media: {}", doc.media);
    println!("Duration: {:.1}s", doc.end_seconds - doc.start_seconds);
    println!("Tiers: {}", recording.tiers.len());
    println!("Segments: {}", doc.segments.len());
    println!(
        "Tokens: {}",
        doc.segments.iter().map(|s| s.tokens.len()).sum::<usize>()
    );
    println!("Distinct forms: {}", pipeline.forms().len());
    println!();

    println!("Speaker Statistics");
    println!("------------------");
    for tier in &recording.tiers {
        let segments: Vec<_> = doc
            .segments
            .iter()
            .filter(|s| s.speaker_id == tier.speaker_id)
            .collect();
        let token_count: usize = segments.iter().map(|s| s.tokens.len()).sum();
        let speech_seconds: f64 = segments
            .iter()
            .map(|s| s.end_seconds - s.start_seconds)
            .sum();
        println!(
            "{}: {} segments, {} tokens, {:.1}s speech",
            tier.speaker_id,
            segments.len(),
            token_count,
            speech_seconds
        );
    }
    println!();

    println!("Annotation Categories");
    println!("---------------------");
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for segment in &doc.segments {
        for token in &segment.tokens {
            *counts.entry(token.category.as_str()).or_insert(0) += 1;
        }
    }
    for (category, count) in &counts {
        println!("{}: {}", category, count);
    }

    Ok(())
}
