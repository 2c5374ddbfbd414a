use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Context;
use serde::Deserialize;

use autonate::config::AutonateConfig;
use autonate::export;
use autonate::render::cursor;
use autonate::session::{CursorKind, Msg, Redraw, Session, SessionEnd, SessionOptions};

/// One entry of an input script
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Step {
    /// Advance the virtual clock
    Wait { wait_ms: u64 },
    Input(Msg),
}

fn load_script(path: &Path) -> anyhow::Result<Vec<Step>> {
    let raw =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

/// Lock at the centre, then finish with the default action
fn default_script(width: u32, height: u32) -> Vec<Step> {
    let (x, y) = (width as f32 / 2.0, height as f32 / 2.0);
    vec![
        Step::Input(Msg::right_click(x, y)),
        Step::Input(Msg::right_click(x, y)),
    ]
}

fn install_cursor(session: &Session) {
    let CursorKind::Tool { tool, color, size } = session.cursor() else {
        log::debug!("Cursor: {:?}", session.cursor());
        return;
    };
    match cursor::rasterize(tool, color, size) {
        Some(glyph) => log::debug!(
            "Cursor: {:?} glyph {}x{} hotspot {:?}",
            tool,
            glyph.pixmap.width(),
            glyph.pixmap.height(),
            glyph.hotspot
        ),
        None => log::warn!("Failed to rasterize cursor for {:?}", tool),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let mut args = std::env::args().skip(1);
    let Some(capture_path) = args.next() else {
        anyhow::bail!("usage: autonate <capture.png> [script.json]");
    };
    let capture = image::open(&capture_path)
        .with_context(|| format!("decoding {}", capture_path))?
        .to_rgba8();

    let steps = match args.next() {
        Some(script) => load_script(Path::new(&script))?,
        None => default_script(capture.width(), capture.height()),
    };

    let mut config = AutonateConfig::load();
    let mut session = Session::new(capture, SessionOptions::from(&config))?;
    install_cursor(&session);

    let mut clock = Instant::now();
    let mut end = None;
    for step in steps {
        match step {
            Step::Wait { wait_ms } => clock += Duration::from_millis(wait_ms),
            Step::Input(msg) => {
                let outcome = session.handle_at(msg, clock);
                if let Some(update) = outcome.persist {
                    update.apply(&mut config);
                    config.save();
                }
                if outcome.cursor_changed {
                    install_cursor(&session);
                }
                if outcome.redraw == Redraw::NextFrame {
                    session.on_frame();
                }
                if outcome.end.is_some() {
                    end = outcome.end;
                    break;
                }
            }
        }
        session.tick(clock);
    }

    match end {
        Some(SessionEnd::Export { action, image }) => {
            if let Some(sink) = export::sink_for(action, &config) {
                export::deliver(image, sink).await;
            }
        }
        Some(SessionEnd::Cancelled) => log::info!("Capture discarded"),
        None => log::warn!("Script finished without ending the session"),
    }
    Ok(())
}
