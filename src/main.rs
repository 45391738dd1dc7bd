use anyhow::{anyhow, Context, Result};
use std::{path::PathBuf, sync::mpsc::channel, time::Duration};
use structopt::StructOpt;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;

mod analysis;
mod config;
mod display;
mod error;
mod frame_loop;
mod geometry;
mod height;
mod keypoints;
mod pose;
mod posture;
mod present;
mod replay;

#[derive(structopt::StructOpt)]
struct Opt {
    /// Recording of pose estimates, one JSON object per line.
    #[structopt(required = true)]
    recording: PathBuf,

    /// Platform whose preview conventions the display follows: android or ios.
    #[structopt(short, long, default_value = "ios")]
    platform: display::Platform,

    /// Camera in use at start: front or back.
    #[structopt(short, long, default_value = "front")]
    facing: display::CameraFacing,

    /// Device orientation at start: portrait-up, portrait-down, landscape-left or landscape-right.
    #[structopt(short, long, default_value = "portrait-up")]
    orientation: display::Orientation,

    /// Width of the camera preview on screen.
    #[structopt(short = "w", long, default_value = "360")]
    screen_width: f32,

    /// Time to wait for each frame, simulating a camera.
    #[structopt(short = "i", long, default_value = "0")]
    frame_interval_ms: u64,

    #[structopt(flatten)]
    analysis: config::Analysis,

    #[structopt(short, long, default_value = "info", env = "RUST_LOG")]
    log_level: tracing_subscriber::filter::EnvFilter,

    #[structopt(short, long)]
    show_progress: bool,
}

fn main() -> Result<()> {
    let opt = Opt::from_args();

    tracing::subscriber::set_global_default(
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer())
            .with(opt.log_level),
    )?;

    let cancel = frame_loop::CancelToken::new();
    let cancel_ctrl_c = cancel.clone();

    ctrlc::set_handler(move || {
        cancel_ctrl_c.cancel();
    })
    .context("failed setting Ctrl-C handler")?;

    let device = display::DeviceState::new(opt.orientation, opt.facing);
    let source = replay::ReplaySource::open(
        &opt.recording,
        device.clone(),
        Duration::from_millis(opt.frame_interval_ms),
    )
    .context("failed opening recording")?;

    let mapper =
        display::CoordinateMapper::new(opt.platform, opt.analysis.tensor_width, opt.screen_width);
    info!(
        message = "display geometry",
        tensor_width = mapper.tensor_dims(opt.orientation).width,
        tensor_height = mapper.tensor_dims(opt.orientation).height,
        preview_width = mapper.preview_dims().width,
        preview_height = mapper.preview_dims().height,
    );

    let (metrics_tx, metrics_rx) = channel();
    let mut frame_loop = frame_loop::FrameLoop::new(
        source,
        replay::ReplayEstimator,
        present::ChannelPresenter::new(metrics_tx),
        analysis::Analyzer::new(&opt.analysis, mapper),
        device,
        cancel,
        opt.analysis.max_consecutive_failures,
    );

    let progress = if opt.show_progress {
        Some(present::spinner())
    } else {
        None
    };

    crossbeam::thread::scope(|scope| {
        let looper = scope.spawn(move |_| {
            let exit = frame_loop.run().context("frame loop failed")?;
            let timing = frame_loop.timing;
            info!(message = "frame loop stopped", state = ?frame_loop.state());
            if timing.frames > 0 {
                info!(
                    message = "frame loop finished",
                    ?exit,
                    frames = timing.frames,
                    model_fps = timing.frames as f64 / timing.inference.as_secs_f64().max(1e-9),
                );
            }
            Ok::<_, anyhow::Error>(exit)
        });

        let latest = present::render(metrics_rx, progress.as_ref());
        if let Some(latest) = latest {
            info!(
                message = "last frame",
                height = latest.height,
                straight = latest.is_straight,
                detected = latest.is_detected,
            );
        }

        looper
            .join()
            .map_err(|_| anyhow!("frame loop thread panicked"))?
            .map(|_| ())
    })
    .map_err(|_| anyhow!("frame loop scope panicked"))?
}
