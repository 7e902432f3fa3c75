//! Interactive session. The long-lived counterpart of one-shot commands: it owns the state,
//! refreshes the timer while it runs and snapshots the timer when it exits.

use std::io::{IsTerminal, Write};

use anyhow::Result;
use input::{InputReader, SessionInput, HELP};
use tokio::{
    io::{stdin, AsyncBufReadExt, BufReader},
    sync::mpsc,
};
use tokio_stream::wrappers::LinesStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, Instrument};

use crate::{
    app::{
        commands::{Action, Outcome},
        keyboard::action_for,
        state::AppState,
        timer::TICK_PERIOD,
    },
    cli::{output::render_screen, output::render_timer, transfer},
    storage::{kv_store::KeyValueStore, repository::Repository},
    utils::clock::{next_tick, Clock, DefaultClock},
};

pub mod input;
pub mod shutdown;

/// Represents the starting point for the session.
pub async fn start_session<S: KeyValueStore>(repository: Repository<S>) -> Result<()> {
    let (sender, receiver) = mpsc::channel::<SessionInput>(10);
    let shutdown_token = CancellationToken::new();

    let reader = InputReader::new(sender, shutdown_token.clone());
    let controller = SessionController::new(
        repository,
        receiver,
        shutdown_token.clone(),
        Box::new(DefaultClock),
        Box::new(std::io::stdout()),
        std::io::stdout().is_terminal(),
    )?;

    let lines = LinesStream::new(BufReader::new(stdin()).lines());

    let (_, input_result, controller_result) = tokio::join!(
        shutdown::detect_shutdown(shutdown_token.clone()),
        async {
            let result = reader.run(lines).await;
            // Closed input ends the session like /quit does.
            shutdown_token.cancel();
            result
        },
        controller.run(),
    );

    if let Err(input_result) = input_result {
        error!("Input reader got an error {:?}", input_result);
    }

    controller_result
}

enum Flow {
    Continue,
    Quit,
}

/// Owns [AppState] for the lifetime of the session. Every input is dispatched, dirty sections are
/// written right away and the screen is redrawn.
pub struct SessionController<S: KeyValueStore> {
    repository: Repository<S>,
    state: AppState,
    receiver: mpsc::Receiver<SessionInput>,
    shutdown: CancellationToken,
    clock: Box<dyn Clock>,
    output: Box<dyn Write>,
    use_color: bool,
}

impl<S: KeyValueStore> SessionController<S> {
    pub fn new(
        repository: Repository<S>,
        receiver: mpsc::Receiver<SessionInput>,
        shutdown: CancellationToken,
        clock: Box<dyn Clock>,
        output: Box<dyn Write>,
        use_color: bool,
    ) -> Result<Self> {
        let state = repository.load(clock.time())?;
        Ok(Self {
            repository,
            state,
            receiver,
            shutdown,
            clock,
            output,
            use_color,
        })
    }

    /// Executes the session event loop.
    pub async fn run(mut self) -> Result<()> {
        self.redraw()?;
        let mut tick = self.clock.instant();
        loop {
            let now = self.clock.time();
            // Ticking is cosmetic: the timer display and clearing the status line.
            let ticking =
                self.state.timer.is_running() || self.state.visible_status(now).is_some();

            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                input = self.receiver.recv() => {
                    let Some(input) = input else {
                        break;
                    };
                    let span = info_span!("Handling session input");
                    match self.handle(input).instrument(span).await? {
                        Flow::Continue => self.redraw()?,
                        Flow::Quit => break,
                    }
                    tick = self.clock.instant();
                }
                _ = self.clock.sleep_until(next_tick(tick, self.clock.instant(), TICK_PERIOD)), if ticking => {
                    tick = self.clock.instant();
                    self.refresh_timer_line()?;
                }
            }
        }

        self.shutdown.cancel();
        self.teardown();
        Ok(())
    }

    async fn handle(&mut self, input: SessionInput) -> Result<Flow> {
        debug!("Handling {input:?}");
        let now = self.clock.time();
        match input {
            SessionInput::Key(key) => {
                if let Some(action) = action_for(key) {
                    self.apply(action);
                }
            }
            SessionInput::Type(text) => {
                let draft = format!("{}{text}", self.state.draft);
                self.apply(Action::SaveDraft(draft));
            }
            SessionInput::Action(action) => self.apply(action),
            SessionInput::Export(target) => {
                match transfer::export_notes(&self.state.notes, target, now).await {
                    Ok(path) => writeln!(self.output, "Exported into {}", path.display())?,
                    Err(e) => {
                        error!("Export failed {e:?}");
                        writeln!(self.output, "Export failed: {e}")?;
                    }
                }
            }
            SessionInput::Import(path) => match transfer::read_file(&path).await {
                Ok(raw) => self.apply(Action::Import(raw)),
                Err(e) => {
                    error!("Import failed {e:?}");
                    self.state.announce("Import failed", now);
                }
            },
            SessionInput::Config(path) => match transfer::read_file(&path).await {
                Ok(raw) => self.apply(Action::ApplyConfig(raw)),
                Err(e) => {
                    error!("Reading configuration failed {e:?}");
                    self.state.announce("Invalid categories JSON", now);
                }
            },
            SessionInput::Help => writeln!(self.output, "{HELP}")?,
            SessionInput::Unknown(line) => writeln!(self.output, "Unknown command {line}. Try /help")?,
            SessionInput::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn apply(&mut self, action: Action) {
        let now = self.clock.time();
        let Outcome { dirty, rejected, .. } = self.state.dispatch(action, now);
        if let Some(reason) = rejected {
            info!("Input rejected: {reason}");
        }
        if let Err(e) = self.repository.persist(&self.state, &dirty, now) {
            // Not distinguishable from success for the user, same as a browser's local storage.
            error!("Failed to persist {dirty:?}: {e:?}");
        }
    }

    fn redraw(&mut self) -> Result<()> {
        let screen = render_screen(&self.state, self.clock.time(), self.use_color);
        write!(self.output, "\n{screen}")?;
        self.output.flush()?;
        Ok(())
    }

    fn refresh_timer_line(&mut self) -> Result<()> {
        let now = self.clock.time();
        let status = self.state.visible_status(now).unwrap_or_default();
        write!(self.output, "\r{} {status:<24}", render_timer(&self.state, now))?;
        self.output.flush()?;
        Ok(())
    }

    fn teardown(&mut self) {
        let now = self.clock.time();
        info!("Session ending, saving timer at {}", self.state.timer.display(now));
        if let Err(e) = self.repository.save_timer_snapshot(&self.state, now) {
            error!("Failed to save timer snapshot {e:?}");
        }
    }
}
