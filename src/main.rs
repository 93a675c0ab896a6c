use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use overlay_fx::capture::{FrameSource, ImageSequence};
use overlay_fx::output::{OutputSink, PngSequence};
use overlay_fx::scale::scale;
use overlay_fx::segmentation::{self, LabelSource, MaskBuilder};
use overlay_fx::{
    FrameGate, PipelineConfig, PresentationMode, RenderRequest, RenderResult,
    SegmentationOverlayPipeline, StyleKind, Viewport,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Source image file(s), one frame per file
    #[arg(short, long, num_args = 1.., required = true)]
    source: Vec<PathBuf>,

    /// Label map file(s): grayscale images, or raw label bytes (.bin/.raw)
    #[arg(short, long, num_args = 1.., required = true)]
    labels: Vec<PathBuf>,

    /// Width of raw label maps
    #[arg(long, requires = "label_height")]
    label_width: Option<u32>,

    /// Height of raw label maps
    #[arg(long, requires = "label_width")]
    label_height: Option<u32>,

    /// Viewport width
    #[arg(long, default_value_t = 1280)]
    viewport_width: u32,

    /// Viewport height
    #[arg(long, default_value_t = 720)]
    viewport_height: u32,

    /// Presentation mode; live loops the sources and covers the viewport
    #[arg(short, long, value_enum, default_value_t = Mode::Image)]
    mode: Mode,

    /// Style applied outside the primary segment
    /// (identity, grayscale, sepia, blur1, blur2, blur3, blur:<radius>)
    #[arg(long, default_value = "blur2")]
    style: StyleKind,

    /// Directory receiving the rendered frames
    #[arg(short, long, default_value = "out")]
    output_dir: PathBuf,

    /// Frames per second in live mode, pacing both capture and presentation
    /// (0 = unthrottled). Capture is a single submitter, so frames are only
    /// dropped at presentation, never collapsed in the render gate.
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Stop after this many frames (live mode runs until this is reached)
    #[arg(long)]
    frames: Option<u64>,

    /// Resize sources to the label map size instead of skipping mismatches
    #[arg(long)]
    fit_source: bool,

    /// Write the colourised label maps instead of the composited output
    #[arg(long)]
    show_labels: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    Image,
    Video,
    Live,
}

impl From<Mode> for PresentationMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Image => PresentationMode::Image,
            Mode::Video => PresentationMode::Video,
            Mode::Live => PresentationMode::LiveStream,
        }
    }
}

struct Settings {
    viewport: Viewport,
    mode: PresentationMode,
    style: StyleKind,
    frame_limit: Option<u64>,
    show_labels: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    tracing::info!("overlay-fx starting");
    tracing::info!("Viewport: {}x{}", args.viewport_width, args.viewport_height);
    tracing::info!("Mode: {:?}, style: {}", args.mode, args.style);

    let live = matches!(args.mode, Mode::Live);
    if live && args.show_labels {
        bail!("--show-labels is only available for image and video modes");
    }
    let mut capture = ImageSequence::new(&args.source, live);
    if capture.is_empty() {
        bail!("No source images given");
    }

    let raw_size = args.label_width.zip(args.label_height);
    let mut labels = segmentation::create_default_source(args.labels.clone(), raw_size);

    let mut output =
        PngSequence::new(&args.output_dir).context("Failed to create output directory")?;

    let config = PipelineConfig::default().with_resample_source(args.fit_source);
    let pipeline = SegmentationOverlayPipeline::new(config);

    let settings = Settings {
        viewport: Viewport::new(args.viewport_width, args.viewport_height),
        mode: args.mode.into(),
        style: args.style,
        frame_limit: args.frames,
        show_labels: args.show_labels,
    };

    if capture.is_live() {
        if settings.frame_limit.is_none() {
            tracing::info!("Press Ctrl+C to stop");
        }
        run_live(&mut capture, labels.as_mut(), &mut output, pipeline, &settings, args.fps)?;
    } else {
        run_pipeline(&mut capture, labels.as_mut(), &mut output, pipeline, &settings)?;
    }

    tracing::info!("Wrote {} frame(s)", output.frames_written());
    Ok(())
}

fn next_request<C, L>(capture: &mut C, labels: &mut L, settings: &Settings) -> Result<Option<RenderRequest>>
where
    C: FrameSource,
    L: LabelSource + ?Sized,
{
    let Some(frame) = capture.next_frame().context("Failed to capture frame")? else {
        return Ok(None);
    };
    let label_map = labels.segment(&frame).context("Failed to segment frame")?;

    Ok(Some(RenderRequest {
        source: Some(frame),
        labels: label_map.data,
        label_width: label_map.width,
        label_height: label_map.height,
        viewport: settings.viewport,
        mode: settings.mode,
        style: settings.style,
    }))
}

fn render_labels(request: &RenderRequest, settings: &Settings, sequence: u64) -> Result<RenderResult> {
    let overlay = MaskBuilder::colorize(&request.labels, request.label_width, request.label_height)
        .context("Failed to colourise labels")?;
    let image = scale(&overlay, settings.viewport, settings.mode.fit_policy());
    let (width, height) = image.dimensions();

    Ok(RenderResult {
        image,
        width,
        height,
        sequence,
    })
}

fn run_pipeline<C, L, O>(
    capture: &mut C,
    labels: &mut L,
    output: &mut O,
    mut pipeline: SegmentationOverlayPipeline,
    settings: &Settings,
) -> Result<()>
where
    C: FrameSource,
    L: LabelSource + ?Sized,
    O: OutputSink,
{
    let mut frame_count = 0u64;
    let mut total_render_time = Duration::ZERO;
    let mut total_output_time = Duration::ZERO;

    loop {
        if settings.frame_limit.is_some_and(|limit| frame_count >= limit) {
            break;
        }
        let Some(request) = next_request(capture, labels, settings)? else {
            break;
        };
        frame_count += 1;

        let render_start = Instant::now();
        let result = if settings.show_labels {
            Some(render_labels(&request, settings, frame_count)?)
        } else {
            pipeline
                .render_request(&request)
                .context("Failed to render frame")?
                .map(|r| (*r).clone())
        };
        total_render_time += render_start.elapsed();

        let Some(result) = result else {
            tracing::warn!("Frame {} skipped: source and labels differ in size", frame_count);
            continue;
        };

        let output_start = Instant::now();
        output
            .write_frame(&result)
            .context("Failed to write frame")?;
        total_output_time += output_start.elapsed();

        if frame_count % 30 == 0 {
            log_stats(frame_count, total_render_time, total_output_time);
        }
    }

    if frame_count > 0 {
        log_stats(frame_count, total_render_time, total_output_time);
    }
    Ok(())
}

/// Capture on a worker thread feeding a [`FrameGate`]; the calling thread
/// presents the latest complete result at the target frame rate.
fn run_live<C, L, O>(
    capture: &mut C,
    labels: &mut L,
    output: &mut O,
    pipeline: SegmentationOverlayPipeline,
    settings: &Settings,
    target_fps: u32,
) -> Result<()>
where
    C: FrameSource + Send,
    L: LabelSource + Send + ?Sized,
    O: OutputSink,
{
    let gate = FrameGate::new(pipeline);
    let stop = AtomicBool::new(false);
    let frame_duration = if target_fps == 0 {
        Duration::ZERO
    } else {
        Duration::from_secs_f32(1.0 / target_fps as f32)
    };

    std::thread::scope(|scope| -> Result<()> {
        let producer = scope.spawn(|| -> Result<u64> {
            let mut captured = 0u64;
            while !stop.load(Ordering::Relaxed) {
                let tick = Instant::now();
                let Some(request) = next_request(capture, labels, settings)? else {
                    break;
                };
                captured += 1;
                gate.submit(request).context("Failed to render frame")?;

                // Pace capture like a camera delivering frames at the target rate
                let elapsed = tick.elapsed();
                if elapsed < frame_duration {
                    std::thread::sleep(frame_duration - elapsed);
                }
            }
            Ok(captured)
        });

        let mut presented = 0u64;
        let mut last_sequence = 0u64;
        let presenting = (|| -> Result<()> {
            while !producer.is_finished() {
                if settings.frame_limit.is_some_and(|limit| presented >= limit) {
                    break;
                }
                let tick = Instant::now();

                if let Some(result) = gate.latest() {
                    if result.sequence != last_sequence {
                        last_sequence = result.sequence;
                        output
                            .write_frame(&result)
                            .context("Failed to write frame")?;
                        presented += 1;
                    }
                }

                let elapsed = tick.elapsed();
                if elapsed < frame_duration {
                    std::thread::sleep(frame_duration - elapsed);
                }
            }
            Ok(())
        })();

        stop.store(true, Ordering::Relaxed);
        let captured = match producer.join() {
            Ok(result) => result?,
            Err(_) => bail!("Capture thread panicked"),
        };
        presenting?;

        tracing::info!(
            "Captured {} frame(s), presented {} ({} dropped or superseded)",
            captured,
            presented,
            captured.saturating_sub(presented)
        );
        Ok(())
    })
}

fn log_stats(frames: u64, render: Duration, output: Duration) {
    let avg_render_ms = render.as_secs_f64() * 1000.0 / frames as f64;
    let avg_output_ms = output.as_secs_f64() * 1000.0 / frames as f64;
    let total_ms = avg_render_ms + avg_output_ms;

    tracing::info!(
        "Frame {}: render={:.1}ms, output={:.1}ms, total={:.1}ms, fps={:.1}",
        frames,
        avg_render_ms,
        avg_output_ms,
        total_ms,
        1000.0 / total_ms.max(f64::EPSILON)
    );
}
