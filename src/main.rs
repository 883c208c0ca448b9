use std::collections::VecDeque;
use std::io;
use std::path::Path;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::{error, info};
use ratatui::{Terminal, backend::CrosstermBackend};
use tui_dispatch::EffectStore;

use tilelight::app::action::Action;
use tilelight::app::effect::Effect;
use tilelight::app::reducer::reducer;
use tilelight::app::state::{AppMode, AppState, Direction};
use tilelight::app::ui;
use tilelight::distance::DistanceMetric;
use tilelight::manifest::{SceneRuntime, load_manifest};

#[derive(Parser, Debug)]
#[command(name = "tilelight")]
#[command(about = "Incremental tile lighting sandbox")]
struct Args {
    /// Scene manifest (YAML); the bundled cellar is used when omitted.
    #[arg(long)]
    scene: Option<String>,
    /// Override the lighting tick interval in milliseconds.
    #[arg(long)]
    tick_ms: Option<u64>,
    /// Override the falloff distance metric.
    #[arg(long, value_enum)]
    metric: Option<DistanceMetric>,
}

#[derive(Clone, Debug)]
struct RuntimeConfig {
    tick_ms: Option<u64>,
    metric: Option<DistanceMetric>,
}

fn main() -> io::Result<()> {
    // Logs go to stderr; redirect it (2>tilelight.log) to keep the screen clean.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();
    let config = RuntimeConfig {
        tick_ms: args.tick_ms,
        metric: args.metric,
    };

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, args.scene, &config);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    scene: Option<String>,
    config: &RuntimeConfig,
) -> io::Result<()> {
    let mut store = EffectStore::new(AppState::new(scene), reducer);
    dispatch_action(&mut store, Action::Init, config);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|frame| ui::render(frame, frame.area(), store.state()))?;

        let interval = tick_interval(store.state());
        let timeout = interval.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind != KeyEventKind::Release => {
                    if handle_key(key.code, &mut store, config) {
                        break;
                    }
                }
                _ => {}
            }
        }

        if last_tick.elapsed() >= interval {
            dispatch_action(&mut store, Action::Tick, config);
            last_tick = Instant::now();
        }
    }

    Ok(())
}

fn tick_interval(state: &AppState) -> Duration {
    let ms = state
        .scene
        .as_ref()
        .map_or(tilelight::config::DEFAULT_TICK_MS, |scene| {
            scene.config().tick_interval_ms
        });
    Duration::from_millis(ms)
}

fn handle_key(
    code: KeyCode,
    store: &mut EffectStore<AppState, Action, Effect>,
    config: &RuntimeConfig,
) -> bool {
    let action = match code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return true,
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Action::Move(Direction::Up),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Action::Move(Direction::Down),
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Action::Move(Direction::Left),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => {
            Action::Move(Direction::Right)
        }
        KeyCode::Char('e') | KeyCode::Char('E') => Action::ToggleWall,
        KeyCode::Char('f') | KeyCode::Char('F') => Action::PlaceLamp,
        KeyCode::Char('+') | KeyCode::Char('=') => Action::LanternBrighter,
        KeyCode::Char('-') => Action::LanternDimmer,
        KeyCode::Char('c') | KeyCode::Char('C') => Action::CaveIn,
        KeyCode::Char('p') | KeyCode::Char('P') => Action::LightingToggle,
        _ => return false,
    };
    dispatch_action(store, action, config);
    false
}

fn dispatch_action(
    store: &mut EffectStore<AppState, Action, Effect>,
    action: Action,
    config: &RuntimeConfig,
) {
    let mut queue = VecDeque::from([action]);

    while let Some(next_action) = queue.pop_front() {
        let result = store.dispatch(next_action);
        for effect in result.effects {
            handle_effect(store, effect, &mut queue, config);
        }
    }
}

fn handle_effect(
    store: &mut EffectStore<AppState, Action, Effect>,
    effect: Effect,
    queue: &mut VecDeque<Action>,
    config: &RuntimeConfig,
) {
    match effect {
        Effect::LoadScene { path } => match load_scene(path.as_deref(), config) {
            Ok(runtime) => {
                info!("scene '{}' loaded", runtime.name);
                store.state_mut().install(runtime);
                queue.push_back(Action::Tick);
            }
            Err(err) => {
                error!("scene load failed: {err}");
                let state = store.state_mut();
                state.mode = AppMode::Failed;
                state.last_status = Some(format!("Scene load failed: {err}"));
            }
        },
    }
}

fn load_scene(path: Option<&str>, config: &RuntimeConfig) -> tilelight::Result<SceneRuntime> {
    let mut manifest = load_manifest(path.map(Path::new))?;
    if let Some(ms) = config.tick_ms {
        manifest.lighting.tick_interval_ms = ms;
    }
    if let Some(metric) = config.metric {
        manifest.lighting.metric = metric;
    }
    manifest.into_scene()
}
