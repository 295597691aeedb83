use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(windows)]
fn run() -> anyhow::Result<()> {
    use anyhow::Context;
    use platform::{app::AppState, config::Config, present, time, window::Win32Window};
    use tracing::info;

    let config = Config::from_env().context("reading configuration")?;
    let state = AppState::new(&config).context("allocating the backbuffer")?;
    let window = Win32Window::create(&config, state).context("opening the main window")?;

    let run_counter = time::Counter::start();
    let stats = present::run(&window, |buffer, offsets| {
        game::render_weird_gradient(buffer, offsets.x, offsets.y)
    })
    .context("running the present loop")?;

    let elapsed = run_counter.elapsed();
    info!(
        frames = stats.frames,
        elapsed_ms = elapsed.as_ms(),
        fps = stats.frames as f64 / elapsed.as_secs().max(f64::EPSILON),
        "shutting down"
    );

    Ok(())
}

#[cfg(not(windows))]
fn run() -> anyhow::Result<()> {
    anyhow::bail!("the window host is only implemented for Win32")
}
