mod tone;

use std::error::Error;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use clap::{Parser, ValueEnum};
use env_logger::Env;
use hypno_core::{load_config, FrameBuffer, FrameQueue, ResizeBus, Scene, SceneConfig, SceneRunner, Viewport};
use hypno_merkaba::MerkabaScene;
use hypno_pattern::analyser::DEFAULT_FFT_SIZE;
use hypno_pattern::{analyser_channel, FrequencySource, PatternScene, PATTERN_VIEWPORT};

use tone::ToneCapture;

const MERKABA_VIEWPORT: Viewport = Viewport::new(800, 600);

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SceneKind {
    /// Layered 2D fractal pattern
    Pattern,
    /// Rotating 3D merkaba
    Merkaba,
}

#[derive(Parser, Debug)]
#[command(name = "hypno-render")]
#[command(version, about = "Headless renderer for the hypnotic scenes", long_about = None)]
struct Cli {
    /// Scene to run
    #[arg(value_enum)]
    scene: SceneKind,

    /// Number of frames to render
    #[arg(short, long, default_value_t = 120)]
    frames: u64,

    /// Target frame rate
    #[arg(long, default_value_t = 60.0)]
    fps: f64,

    /// JSON scene config
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Surface width in pixels
    #[arg(long, requires = "height")]
    width: Option<u32>,

    /// Surface height in pixels
    #[arg(long, requires = "width")]
    height: Option<u32>,

    /// Feed the pattern's audio modulation with a sine tone of this frequency
    #[arg(long, value_name = "HZ")]
    audio_tone: Option<f32>,

    /// Debug aid: dump the final frame to a PNG after the run
    #[arg(long, value_name = "PNG")]
    snapshot: Option<PathBuf>,
}

impl Cli {
    fn viewport(&self) -> Option<Viewport> {
        match (self.width, self.height) {
            (Some(w), Some(h)) => Some(Viewport::new(w, h)),
            _ => None,
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if !(cli.fps.is_finite() && cli.fps > 0.0) {
        return Err(format!("invalid frame rate: {}", cli.fps).into());
    }

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => SceneConfig::default(),
    };

    match cli.scene {
        SceneKind::Pattern => run_pattern(&cli, config),
        SceneKind::Merkaba => run_merkaba(&cli, config),
    }
}

fn run_pattern(cli: &Cli, config: SceneConfig) -> Result<(), Box<dyn Error>> {
    let viewport = cli.viewport().unwrap_or(PATTERN_VIEWPORT);
    let mut scene = PatternScene::with_viewport(config.pattern, viewport)?;

    let mut capture = None;
    if let Some(hz) = cli.audio_tone {
        let (tx, source) = analyser_channel(DEFAULT_FFT_SIZE)?;
        capture = Some(ToneCapture::start(tx, hz)?);
        scene.enable_audio(move || Ok(Box::new(source) as Box<dyn FrequencySource>));
    }

    let mut runner = SceneRunner::new(scene);
    let mut host = FrameQueue::new();
    let elapsed = drive(&mut runner, &mut host, cli.frames, cli.fps);

    let scene = runner.scene();
    log::info!(
        "pattern: {} frames in {:.2?}, t={:.3}, {} primitives in last frame",
        runner.frames_rendered(),
        elapsed,
        runner.time(),
        scene.last_primitive_count()
    );
    if let Some(overrides) = scene.audio().last_overrides() {
        log::info!(
            "audio overrides: pulse speed {:.2}, color intensity {:.1}",
            overrides.pulse_speed,
            overrides.color_intensity
        );
    }
    if let Some(path) = &cli.snapshot {
        write_snapshot(scene.surface(), path)?;
    }

    runner.teardown(&mut host);
    drop(capture);
    Ok(())
}

fn run_merkaba(cli: &Cli, config: SceneConfig) -> Result<(), Box<dyn Error>> {
    let bus = ResizeBus::new();
    let mut scene = MerkabaScene::new(config.merkaba, MERKABA_VIEWPORT)?;
    scene.attach_resize(&bus);
    if let Some(viewport) = cli.viewport() {
        bus.publish(viewport);
    }

    let mut runner = SceneRunner::new(scene);
    let mut host = FrameQueue::new();
    let elapsed = drive(&mut runner, &mut host, cli.frames, cli.fps);

    let scene = runner.scene();
    let stats = scene.last_stats();
    log::info!(
        "merkaba: {} frames in {:.2?}, {}x{}, {} faces, {} lines, {} markers, {} grid lines",
        runner.frames_rendered(),
        elapsed,
        scene.viewport().width,
        scene.viewport().height,
        stats.faces,
        stats.lines,
        stats.markers,
        stats.grid_lines
    );
    if let Some(path) = &cli.snapshot {
        write_snapshot(scene.surface(), path)?;
    }

    runner.teardown(&mut host);
    Ok(())
}

/// Fire frame requests at a fixed pace until `frames` frames have been drawn.
fn drive<S: Scene>(runner: &mut SceneRunner<S>, host: &mut FrameQueue, frames: u64, fps: f64) -> Duration {
    let period = Duration::from_secs_f64(1.0 / fps);
    let start = Instant::now();
    let mut deadline = start;

    runner.mount(host);
    while runner.frames_rendered() < frames {
        runner.poll_changes(host);
        let Some(token) = host.pop_due() else {
            log::debug!("host queue drained, stopping");
            break;
        };
        let now = Instant::now();
        if deadline > now {
            thread::sleep(deadline - now);
        }
        let timestamp_ms = start.elapsed().as_secs_f64() * 1000.0;
        runner.on_frame(host, token, timestamp_ms);
        deadline += period;
    }
    start.elapsed()
}

fn write_snapshot(surface: Option<&FrameBuffer>, path: &Path) -> Result<(), Box<dyn Error>> {
    let surface = surface.ok_or("no surface to snapshot")?;
    surface.save_png(path)?;
    log::info!("wrote debug snapshot {}", path.display());
    Ok(())
}
