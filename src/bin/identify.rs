//! Identify the spoken language of a WAV file
//!
//! Usage: identify <model-dir> <audio.wav>
//!
//! Streams the file through a recognizer in 100 ms chunks and prints the top
//! scoring languages.

use anyhow::{bail, Context, Result};
use lid_engine::{audio, languages, LidModel, Recognizer};
use std::sync::Arc;
use tracing::level_filters::LevelFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::INFO)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        bail!("usage: {} <model-dir> <audio.wav>", args[0]);
    }
    let model_dir = &args[1];
    let wav_path = &args[2];

    let (samples, sample_rate) =
        audio::read_wav_mono(wav_path).with_context(|| format!("reading {}", wav_path))?;

    let model = Arc::new(LidModel::load(model_dir).with_context(|| format!("loading {}", model_dir))?);
    let mut recognizer = Recognizer::new(model, sample_rate)?;

    // 100 ms chunks, mirroring how a capture loop would feed the session
    let chunk = (sample_rate / 10) as usize;
    for block in samples.chunks(chunk.max(1)) {
        recognizer.accept_samples(block)?;
    }

    let mut scores = recognizer.result();
    scores.sort_by(|a, b| b.score.total_cmp(&a.score));

    println!("Scored {} frames", recognizer.frame_count());
    for entry in scores.iter().take(5) {
        println!("{:>12.4}  {}", entry.score, languages::display_name(&entry.language));
    }

    Ok(())
}
