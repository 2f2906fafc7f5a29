//! Talespin CLI — generate and narrate children's audio stories.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use talespin_core::assets::{ensure_assets, EffectRegistry};
use talespin_core::cache::assets_dir;
use talespin_core::names::create_run_dir;
use talespin_core::speech::{rest::RestSynthesizer, SpeechRenderer, SpeechSynthesizer};
use talespin_core::story::{rest::RestGenerator, StoryPipeline, StoryTextGenerator};
use talespin_core::types::{StoryLength, StoryParams, StoryRecord};
use talespin_core::voices::VoiceRegistry;
use talespin_core::Mixer;

// ─── Top-level CLI ───────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "talespin",
    about = "Children's story generation and narration pipeline",
    version,
)]
struct Cli {
    /// Show verbose output
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a new story and narrate it
    Generate(GenerateArgs),
    /// Narrate existing story text
    Narrate(NarrateArgs),
    /// List available voice profiles
    Voices(RegistryArgs),
    /// List available sound-effect cues
    Effects(RegistryArgs),
    /// Synthesize missing effect assets and the placeholder
    Setup(SetupArgs),
    /// Play a finished story through the default audio device
    #[cfg(feature = "playback")]
    Play(PlayArgs),
}

// ─── Shared arguments ────────────────────────────────────────────

#[derive(Parser, Debug)]
struct SharedArgs {
    /// Output directory
    #[arg(long, default_value = "./talespin-output")]
    output_dir: PathBuf,

    /// Voice profile id for narration
    #[arg(long, default_value = "default")]
    voice: String,

    /// JSON file overriding the built-in voice registry
    #[arg(long)]
    voices_file: Option<PathBuf>,

    /// JSON file overriding the built-in effect registry
    #[arg(long)]
    effects_file: Option<PathBuf>,

    /// Custom run name (default: auto-generated)
    #[arg(long)]
    run_name: Option<String>,

    /// RNG seed for reproducible run names
    #[arg(long)]
    seed: Option<u64>,

    /// Bundle the finished story into a zip archive
    #[arg(long, default_value_t = false)]
    bundle: bool,
}

// ─── Generate ────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(about = "Generate a new story and narrate it")]
struct GenerateArgs {
    #[command(flatten)]
    shared: SharedArgs,

    /// Theme or moral of the story (e.g. "kindness", "courage")
    #[arg(long)]
    theme: Option<String>,

    /// Character to include (repeatable)
    #[arg(long = "character")]
    characters: Vec<String>,

    /// Setting for the story (e.g. "forest", "space")
    #[arg(long)]
    setting: Option<String>,

    /// Story length
    #[arg(long, default_value = "medium", value_parser = ["short", "medium", "long"])]
    length: String,

    /// Target age group
    #[arg(long, default_value = "5-8")]
    age_group: String,

    /// Primary language code
    #[arg(long, default_value = "en")]
    language: String,

    /// Child's name for personalization
    #[arg(long)]
    child_name: Option<String>,
}

// ─── Narrate ─────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(about = "Narrate existing story text")]
struct NarrateArgs {
    #[command(flatten)]
    shared: SharedArgs,

    /// Text file containing the story
    input: Option<PathBuf>,

    /// Story text given inline instead of a file
    #[arg(long, conflicts_with = "input")]
    text: Option<String>,

    /// Story title (default: input file stem)
    #[arg(long)]
    title: Option<String>,
}

// ─── Registry listing / setup / play ─────────────────────────────

#[derive(Parser, Debug)]
struct RegistryArgs {
    /// JSON file overriding the built-in registry
    #[arg(long)]
    file: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct SetupArgs {
    /// Regenerate assets even if they already exist
    #[arg(long, default_value_t = false)]
    force: bool,
}

#[cfg(feature = "playback")]
#[derive(Parser, Debug)]
struct PlayArgs {
    /// WAV file to play
    input: PathBuf,
}

// ─── Main ────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    let result = match cli.command {
        Command::Generate(args) => run_generate(args),
        Command::Narrate(args) => run_narrate(args),
        Command::Voices(args) => run_voices(args),
        Command::Effects(args) => run_effects(args),
        Command::Setup(args) => run_setup(args),
        #[cfg(feature = "playback")]
        Command::Play(args) => run_play(args),
    };

    if let Err(e) = result {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}

// ─── Helpers ─────────────────────────────────────────────────────

fn load_voices(file: Option<&PathBuf>) -> Result<VoiceRegistry> {
    match file {
        Some(path) => VoiceRegistry::from_json_file(path),
        None => Ok(VoiceRegistry::builtin()),
    }
}

fn load_effects(file: Option<&PathBuf>) -> Result<EffectRegistry> {
    match file {
        Some(path) => EffectRegistry::from_json_file(path),
        None => Ok(EffectRegistry::builtin()),
    }
}

/// Build the pipeline with whatever providers the environment offers.
fn build_pipeline(shared: &SharedArgs, run_dir: &std::path::Path) -> Result<StoryPipeline> {
    ensure_assets(&assets_dir(), false)?;

    let voices = load_voices(shared.voices_file.as_ref())?;
    let effects = load_effects(shared.effects_file.as_ref())?;

    let synthesizer: Option<Box<dyn SpeechSynthesizer>> = match RestSynthesizer::from_env() {
        Some(Ok(s)) => Some(Box::new(s)),
        Some(Err(e)) => {
            log::warn!("Speech provider setup failed ({:#}), narration will use placeholders", e);
            None
        }
        None => {
            log::warn!("TTS_API_KEY not set, narration will use placeholders");
            None
        }
    };

    let generator: Option<Box<dyn StoryTextGenerator>> = match RestGenerator::from_env() {
        Some(Ok(g)) => Some(Box::new(g)),
        Some(Err(e)) => {
            log::warn!("Text provider setup failed ({:#}), using built-in stories", e);
            None
        }
        None => {
            log::warn!("GEMINI_API_KEY not set, using built-in stories");
            None
        }
    };

    let speech = SpeechRenderer::new(voices, synthesizer);
    let mixer = Mixer::new(speech, effects).with_output_dir(run_dir.to_path_buf());
    Ok(StoryPipeline::new(generator, mixer))
}

/// Write the story record and its text next to the audio in the run dir.
fn write_story_files(run_dir: &std::path::Path, record: &StoryRecord) -> Result<()> {
    let json = serde_json::to_string_pretty(record)?;
    std::fs::write(run_dir.join("story.json"), json)?;
    std::fs::write(run_dir.join("story.txt"), format!("{}\n\n{}\n", record.title, record.text))?;
    Ok(())
}

/// Zip the run directory's story files into story.zip.
fn bundle_story(run_dir: &std::path::Path) -> Result<PathBuf> {
    let zip_path = run_dir.join("story.zip");
    let zip_file = std::fs::File::create(&zip_path)?;
    let mut zip = zip::ZipWriter::new(zip_file);
    let options =
        zip::write::SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for entry in std::fs::read_dir(run_dir)? {
        let entry = entry?;
        let path = entry.path();
        let keep = path
            .extension()
            .map(|e| e == "wav" || e == "json" || e == "txt")
            .unwrap_or(false);
        if keep {
            let name = path.file_name().unwrap().to_string_lossy().to_string();
            zip.start_file(&name, options)?;
            let data = std::fs::read(&path)?;
            std::io::Write::write_all(&mut zip, &data)?;
        }
    }
    zip.finish()?;
    log::info!("Created {}", zip_path.display());
    Ok(zip_path)
}

// ─── Runners ─────────────────────────────────────────────────────

fn run_generate(args: GenerateArgs) -> Result<()> {
    let run_dir = create_run_dir(
        &args.shared.output_dir,
        args.shared.seed,
        args.shared.run_name.as_deref(),
    )?;
    println!("Run: {}", run_dir.file_name().unwrap().to_string_lossy());

    let pipeline = build_pipeline(&args.shared, &run_dir)?;

    let length = match args.length.as_str() {
        "short" => StoryLength::Short,
        "long" => StoryLength::Long,
        _ => StoryLength::Medium,
    };
    let params = StoryParams {
        theme: args.theme,
        characters: args.characters,
        setting: args.setting,
        length,
        age_group: args.age_group,
        language: args.language,
        child_name: args.child_name,
        voice: args.shared.voice.clone(),
    };

    let record = pipeline.generate_story(&params)?;
    write_story_files(&run_dir, &record)?;

    println!("Title:    {}", record.title);
    println!("Duration: {}", record.duration);
    println!("Audio:    {}", record.audio_path.display());
    if record.degraded {
        println!("Note: some audio degraded to placeholders (provider unavailable)");
    }

    if args.shared.bundle {
        let zip_path = bundle_story(&run_dir)?;
        println!("Bundle:   {}", zip_path.display());
    }
    Ok(())
}

fn run_narrate(args: NarrateArgs) -> Result<()> {
    let (text, default_title) = match (&args.input, &args.text) {
        (Some(path), None) => {
            if !path.exists() {
                bail!("File not found: {}", path.display());
            }
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| "Untitled".to_string());
            (text, stem)
        }
        (None, Some(text)) => (text.clone(), "Untitled".to_string()),
        _ => bail!("Provide a text file or --text"),
    };
    let title = args.title.clone().unwrap_or(default_title);

    let run_dir = create_run_dir(
        &args.shared.output_dir,
        args.shared.seed,
        args.shared.run_name.as_deref(),
    )?;
    println!("Run: {}", run_dir.file_name().unwrap().to_string_lossy());

    let pipeline = build_pipeline(&args.shared, &run_dir)?;
    let output = pipeline.generate_narration(&text, &title, &args.shared.voice)?;

    println!("Duration: {}", output.estimated_duration);
    println!("Audio:    {}", output.artifact.path().display());
    if output.artifact.is_fallback() {
        println!("Note: narration degraded to the placeholder (provider unavailable)");
    }

    if args.shared.bundle {
        let zip_path = bundle_story(&run_dir)?;
        println!("Bundle:   {}", zip_path.display());
    }
    Ok(())
}

fn run_voices(args: RegistryArgs) -> Result<()> {
    let registry = load_voices(args.file.as_ref())?;
    for voice in registry.all() {
        println!(
            "{:10} {:16} {:8} rate {:.2}  ({})",
            voice.id, voice.name, voice.language, voice.speaking_rate, voice.provider_voice
        );
    }
    Ok(())
}

fn run_effects(args: RegistryArgs) -> Result<()> {
    let registry = load_effects(args.file.as_ref())?;
    for cue in registry.cues() {
        let Some(path) = registry.resolve(cue) else { continue };
        let status = if path.exists() { "" } else { "  (missing, run `talespin setup`)" };
        println!("{:10} {}{}", cue, path.display(), status);
    }
    Ok(())
}

fn run_setup(args: SetupArgs) -> Result<()> {
    let dir = assets_dir();
    ensure_assets(&dir, args.force)?;
    println!("Assets ready in {}", dir.display());
    Ok(())
}

#[cfg(feature = "playback")]
fn run_play(args: PlayArgs) -> Result<()> {
    if !args.input.exists() {
        bail!("File not found: {}", args.input.display());
    }
    println!("Playing {}", args.input.display());
    talespin_core::audio::playback::play_wav(&args.input)
}
