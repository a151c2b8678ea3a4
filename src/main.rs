mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser, ValueEnum};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    error::Error,
    io::{self, stdin},
    sync::mpsc,
    time::Duration,
};
use tracing::{error, info};

use fingerpaint::{
    config::{Config, ConfigStore, FileConfigStore},
    game::Game,
    gesture,
    landmarks::LandmarkSet,
    sensor::{self, HandEvent, SimHand, SimPose, SubprocessTracker},
    sketch::Sketch,
    util::Rect,
};

/// hand-gesture drawing canvas and bird-popping arcade for the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Point your index finger to draw on a canvas or swat birds out of the sky. \
                  Input comes from an external hand-landmark tracker process, or from the \
                  built-in keyboard simulator (--sim)."
)]
pub struct Cli {
    /// which experience to run
    #[clap(value_enum, default_value_t = Mode::Draw)]
    mode: Mode,

    /// use the keyboard-simulated hand instead of a tracker process
    #[clap(long)]
    sim: bool,

    /// arcade session length in seconds
    #[clap(short = 's', long)]
    secs: Option<u32>,

    /// hand-landmark tracker command (overrides the config file)
    #[clap(long)]
    tracker_cmd: Option<String>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, strum_macros::Display)]
pub enum Mode {
    /// freehand drawing canvas
    Draw,
    /// hit-the-bird arcade game
    Birds,
}

/// Everything the render loop projects: both experiences plus the most
/// recent landmark frame for the skeleton overlay. Mutated only by the
/// event loop below.
pub struct App {
    pub mode: Mode,
    pub config: Config,
    pub sketch: Sketch,
    pub game: Game,
    pub latest: Option<LandmarkSet>,
    pub sim: Option<SimHand>,
}

impl App {
    pub fn new(mode: Mode, config: Config, sim: bool) -> Self {
        let clear_button = clear_button_region(&config);
        Self {
            mode,
            sketch: Sketch::new(clear_button),
            game: Game::new(config.clone()),
            latest: None,
            sim: sim.then(SimHand::new),
            config,
        }
    }

    /// Route one frame through the classifier into the active variant.
    pub fn on_frame(&mut self, frame: Option<LandmarkSet>) {
        let gesture = gesture::classify(frame.as_ref());
        let fingertip = frame.as_ref().map(|hand| {
            hand.index_tip().to_screen(
                self.config.playfield_width,
                self.config.playfield_height,
                true,
            )
        });

        match self.mode {
            Mode::Draw => self.sketch.on_frame(gesture, fingertip),
            Mode::Birds => self.game.on_gesture(gesture, fingertip),
        }
        self.latest = frame;
    }

    pub fn info(&self) -> &str {
        match self.mode {
            Mode::Draw => &self.sketch.info,
            Mode::Birds => &self.game.info,
        }
    }
}

/// Fixed clear-button region in the playfield's top-left corner.
fn clear_button_region(config: &Config) -> Rect {
    Rect::new(4.0, 4.0, config.playfield_width * 0.2, 24.0)
}

fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let Some(path) = fingerpaint::app_dirs::AppDirs::log_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    // The TUI owns the terminal; diagnostics go to a file. If the file
    // can't be opened we run without a log channel.
    if let Ok(file) = std::fs::File::options().append(true).create(true).open(path) {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::sync::Arc::new(file))
            .with_ansi(false)
            .try_init();
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    init_logging();

    let mut config = FileConfigStore::new().load();
    if let Some(secs) = cli.secs {
        config.session_secs = secs;
    }
    if let Some(cmd) = &cli.tracker_cmd {
        config.tracker_cmd = Some(cmd.clone());
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(cli.mode, config, cli.sim);
    let result = run(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<(), Box<dyn Error>> {
    let (tx, rx) = mpsc::channel();

    sensor::spawn_interval_drivers(tx.clone(), Duration::from_millis(app.config.tick_ms));
    sensor::spawn_input_driver(tx.clone());

    // The tracker is a scoped resource: held for the lifetime of the
    // loop, killed when `_tracker` drops on any exit path below.
    let _tracker = if app.sim.is_some() {
        info!("running with the keyboard-simulated hand");
        None
    } else {
        match &app.config.tracker_cmd {
            Some(cmd) => match SubprocessTracker::spawn(cmd, tx.clone()) {
                Ok(tracker) => {
                    info!("tracker started: {cmd}");
                    Some(tracker)
                }
                Err(err) => {
                    // Interaction never starts; the shell still runs.
                    error!("failed to start tracker '{cmd}': {err}");
                    None
                }
            },
            None => {
                error!("no tracker command configured; run with --sim or set tracker_cmd");
                None
            }
        }
    };
    drop(tx);

    terminal.draw(|f| ui::draw(app, f))?;

    loop {
        match rx.recv()? {
            HandEvent::Frame(frame) => {
                app.on_frame(frame);
            }
            HandEvent::Tick => {
                if app.mode == Mode::Birds {
                    app.game.on_tick();
                }
            }
            HandEvent::Second => {
                if app.mode == Mode::Birds {
                    app.game.on_second();
                }
            }
            HandEvent::Resize => {}
            HandEvent::Key(key) => {
                if !handle_key(app, key) {
                    break;
                }
            }
        }
        terminal.draw(|f| ui::draw(app, f))?;
    }

    Ok(())
}

/// Returns false when the app should quit.
fn handle_key(app: &mut App, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return false;
    }

    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => return false,
        KeyCode::Char('c') => {
            if app.mode == Mode::Draw {
                app.sketch.clear();
            }
        }
        KeyCode::Char('s') => {
            if app.mode == Mode::Birds && !app.game.session.started {
                app.game.start();
            }
        }
        KeyCode::Char('r') => {
            if app.mode == Mode::Birds {
                app.game.restart();
            }
        }
        _ => {}
    }

    // Simulator steering; each change synthesizes a fresh frame so the
    // pipeline downstream of the tracker runs unchanged.
    if let Some(mut sim) = app.sim {
        const STEP: f64 = 0.02;
        let handled = match key.code {
            // The display is mirrored, so visual left is +x in sensor
            // space.
            KeyCode::Left => {
                sim.nudge(STEP, 0.0);
                true
            }
            KeyCode::Right => {
                sim.nudge(-STEP, 0.0);
                true
            }
            KeyCode::Up => {
                sim.nudge(0.0, -STEP);
                true
            }
            KeyCode::Down => {
                sim.nudge(0.0, STEP);
                true
            }
            KeyCode::Char('1') => {
                sim.set_pose(SimPose::Point);
                true
            }
            KeyCode::Char('2') => {
                sim.set_pose(SimPose::Fist);
                true
            }
            KeyCode::Char('3') => {
                sim.set_pose(SimPose::Open);
                true
            }
            KeyCode::Char('0') => {
                sim.set_pose(SimPose::Away);
                true
            }
            _ => false,
        };
        if handled {
            app.sim = Some(sim);
            let frame = sim.frame();
            app.on_frame(frame);
        }
    }

    true
}
