use anyhow::{bail, Context, Result};
use clap::Parser;
use ptt_assistant::audio::{AudioSource, RecordingArchive, SilenceSource, WavFileSource};
use ptt_assistant::http::{self, AppState};
use ptt_assistant::knowledge::{DashScopeAgent, DifyClient, KnowledgeBase};
use ptt_assistant::llm::{ChatModel, OllamaClient};
use ptt_assistant::pipeline::{spawn_stdin_control, Pipeline, PipelineBackends};
use ptt_assistant::tts::{CommandSpeaker, ConsoleDisplay, LogSpeaker, SpeechEngine};
use ptt_assistant::{preflight, Config, SenseVoiceClient};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Push-to-talk voice assistant
#[derive(Parser, Debug)]
#[command(name = "ptt-assistant", version, about)]
struct Args {
    /// Config file (TOML, extension optional)
    #[arg(long, default_value = "config/ptt-assistant")]
    config: String,

    /// Replay this WAV file as the microphone
    #[arg(long)]
    input_wav: Option<PathBuf>,

    /// Serve the control API on this address, e.g. 127.0.0.1:8088
    #[arg(long)]
    http: Option<String>,

    /// Start even if the backends are not reachable
    #[arg(long)]
    skip_preflight: bool,

    /// Do not read control commands from stdin
    #[arg(long)]
    no_stdin: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config))?;

    info!("PTT Assistant v{}", env!("CARGO_PKG_VERSION"));
    info!("Speech recognition: {}", cfg.asr.url);
    info!("Local model: {} at {}", cfg.llm.model, cfg.llm.url);

    if args.skip_preflight {
        warn!("Skipping backend checks");
    } else {
        let report = preflight::run(&cfg)?;
        if !report.is_ready() {
            bail!("Backend checks failed, fix the services above and retry");
        }
    }

    let mut audio = open_audio_source(&args, &cfg)?;

    let model: Arc<dyn ChatModel> = Arc::new(OllamaClient::new(
        cfg.llm.url.clone(),
        cfg.llm.model.clone(),
        cfg.llm.timeout(),
    )?);

    let knowledge: Option<Arc<dyn KnowledgeBase>> = match cfg.legal.api_key() {
        Some(key) => Some(Arc::new(DifyClient::new(&cfg.legal, key)?)),
        None => {
            warn!("{} not set, legal answers disabled", cfg.legal.api_key_env);
            None
        }
    };

    let agent: Option<Arc<dyn KnowledgeBase>> = match cfg.agent.api_key() {
        Some(key) if !cfg.agent.app_id.trim().is_empty() => {
            Some(Arc::new(DashScopeAgent::new(&cfg.agent, key)?))
        }
        _ => None,
    };

    let speech: Arc<dyn SpeechEngine> = match CommandSpeaker::new(&cfg.tts) {
        Ok(speaker) => Arc::new(speaker),
        Err(e) => {
            warn!("Speech output disabled: {}", e);
            Arc::new(LogSpeaker)
        }
    };

    let backends = PipelineBackends {
        recognizer: Box::new(SenseVoiceClient::new(cfg.asr.url.clone(), cfg.asr.timeout())?),
        classifier: Arc::clone(&model),
        general: model,
        knowledge,
        agent,
        display: Arc::new(ConsoleDisplay),
        speech,
    };

    let mut pipeline = Pipeline::new(&cfg, backends);
    if let Some(dir) = &cfg.asr.archive_dir {
        let archive = RecordingArchive::new(dir)?;
        info!("Archiving recordings to {}", archive.dir().display());
        pipeline = pipeline.with_archive(archive);
    }

    let (control_tx, mut control_rx) = crossbeam_channel::unbounded();

    if !args.no_stdin {
        spawn_stdin_control(control_tx.clone()).context("Failed to start stdin control")?;
    }

    if let Some(bind) = args.http.as_deref().or(cfg.http.bind.as_deref()) {
        http::spawn_server(bind, AppState::new(control_tx.clone(), pipeline.status()))?;
    }

    let exit = Arc::new(AtomicBool::new(false));
    watch_ctrl_c(Arc::clone(&exit))?;

    pipeline.run(&mut control_rx, audio.as_mut(), &exit);

    info!("Goodbye");
    Ok(())
}

fn open_audio_source(args: &Args, cfg: &Config) -> Result<Box<dyn AudioSource>> {
    let format = cfg.audio.format();

    let Some(path) = &args.input_wav else {
        info!("No input file, recording silence");
        return Ok(Box::new(SilenceSource::new(format)));
    };

    let source = WavFileSource::open(path)
        .with_context(|| format!("Failed to open audio input {}", path.display()))?;

    if source.format() != format {
        warn!(
            "{} is {} Hz / {} ch, not the configured {} Hz / {} ch; recording in the file's format",
            path.display(),
            source.format().sample_rate,
            source.format().channels,
            format.sample_rate,
            format.channels
        );
    }

    Ok(Box::new(source))
}

/// Set `exit` on Ctrl-C
fn watch_ctrl_c(exit: Arc<AtomicBool>) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build signal runtime")?;

    thread::Builder::new()
        .name("signals".to_string())
        .spawn(move || {
            runtime.block_on(async {
                match tokio::signal::ctrl_c().await {
                    Ok(()) => {
                        info!("Interrupted, shutting down");
                        exit.store(true, Ordering::SeqCst);
                    }
                    Err(e) => error!("Failed to listen for Ctrl-C: {}", e),
                }
            })
        })
        .context("Failed to spawn signal thread")?;

    Ok(())
}
