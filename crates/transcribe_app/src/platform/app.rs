use std::io::{self, BufRead, Write};
use std::thread;

use anyhow::Context;
use engine_logging::{engine_info, engine_warn};
use tokio::sync::mpsc;
use transcribe_core::{ExitDecision, JobInput, JobSnapshot, EXIT_WARNING};
use transcribe_engine::{
    Clock, ExportOptions, JobController, Scheduler, SystemClock, TokioScheduler,
};

use super::commands::{self, Command, HELP};
use super::config::AppConfig;
use super::{logging, render};

type Controller = JobController<SystemClock, TokioScheduler>;

pub fn run_app(config: AppConfig) -> anyhow::Result<()> {
    logging::initialize(config.log, config.log_level());

    // One thread of control: every controller mutation happens on this runtime.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("failed to build event loop runtime")?;
    runtime.block_on(event_loop(config))
}

enum LoopEvent {
    Line(String),
    InputClosed,
    Fired(transcribe_core::JobGeneration),
    Tick,
}

async fn event_loop(config: AppConfig) -> anyhow::Result<()> {
    let mut controller: Controller = JobController::with_settings(
        SystemClock,
        TokioScheduler::new(),
        config.estimator_settings(),
    );
    let json = config.json;
    controller.subscribe(Box::new(move |snapshot: &JobSnapshot| {
        print_change(snapshot, json)
    }));

    let mut session = Session::new(config.clone());
    println!("Transcription demo. Type `help` for commands.");
    if let Some(path) = &config.file {
        session.select_path(&mut controller, path);
    }

    let mut lines = spawn_stdin_reader();
    let mut ticker = tokio::time::interval(config.tick_interval());
    let mut tick: u64 = 0;
    let mut input_closed = false;

    loop {
        let event = tokio::select! {
            Some(generation) = controller.scheduler_mut().next_fired(),
                if !controller.scheduler().is_idle() => LoopEvent::Fired(generation),
            line = lines.recv(), if !input_closed => match line {
                Some(line) => LoopEvent::Line(line),
                None => LoopEvent::InputClosed,
            },
            _ = ticker.tick() => LoopEvent::Tick,
        };

        match event {
            LoopEvent::Fired(generation) => {
                controller.on_completion_due(generation);
            }
            LoopEvent::Line(line) => {
                if session.handle_line(&mut controller, &line) == Flow::Exit {
                    break;
                }
            }
            LoopEvent::InputClosed => {
                input_closed = true;
                if controller.should_warn_on_exit() {
                    println!("Input closed; waiting for the running job to finish.");
                }
            }
            LoopEvent::Tick => {
                tick += 1;
                engine_logging::set_loop_tick(tick);
                let view = controller.current_state();
                if let Some(line) = render::render_progress(&view, controller.clock().now()) {
                    println!("{line}");
                }
            }
        }

        if input_closed && !controller.should_warn_on_exit() {
            break;
        }
    }

    engine_info!("Event loop finished after {} ticks", tick);
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

/// Per-run interaction state that does not belong to the job itself.
struct Session {
    config: AppConfig,
    // Set after the exit warning was shown; a second `quit` then leaves.
    quit_armed: bool,
}

impl Session {
    fn new(config: AppConfig) -> Self {
        Self {
            config,
            quit_armed: false,
        }
    }

    fn handle_line<C: Clock, S: Scheduler>(
        &mut self,
        controller: &mut JobController<C, S>,
        line: &str,
    ) -> Flow {
        let command = match commands::parse(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Flow::Continue,
            Err(err) => {
                println!("{err}");
                return Flow::Continue;
            }
        };

        let quit_armed = std::mem::take(&mut self.quit_armed);
        match command {
            Command::Select(path) => self.select_path(controller, &path),
            Command::Simulate { name, size_bytes } => {
                self.select(controller, JobInput::new(name, size_bytes))
            }
            Command::Start => {
                if let Err(err) = controller.start() {
                    engine_warn!("Start rejected: {}", err);
                    println!("Cannot start: {err}");
                }
            }
            Command::Stop => {
                if controller.should_warn_on_exit() {
                    controller.cancel();
                    println!("Stopped.");
                } else {
                    println!("Nothing is running.");
                }
            }
            Command::Status => {
                let view = controller.current_state();
                for line in render::render_status(&view, controller.clock().now()) {
                    println!("{line}");
                }
            }
            Command::Save(target) => self.save(controller, target),
            Command::Help => println!("{HELP}"),
            Command::Quit { force } => return self.quit(controller, force || quit_armed),
        }
        Flow::Continue
    }

    fn select_path<C: Clock, S: Scheduler>(
        &mut self,
        controller: &mut JobController<C, S>,
        path: &std::path::Path,
    ) {
        match commands::input_from_path(path) {
            Ok(input) => self.select(controller, input),
            Err(err) => {
                engine_warn!("Selecting {:?} failed: {:#}", path, err);
                println!("Cannot select file: {err:#}");
            }
        }
    }

    fn select<C: Clock, S: Scheduler>(
        &mut self,
        controller: &mut JobController<C, S>,
        input: JobInput,
    ) {
        if let Err(err) = controller.select_input(input) {
            engine_warn!("Select rejected: {}", err);
            println!("Cannot select a file now: {err}");
        }
    }

    fn save<C: Clock, S: Scheduler>(
        &self,
        controller: &JobController<C, S>,
        target: Option<std::path::PathBuf>,
    ) {
        let (dir, options) = match target {
            Some(path) => {
                let dir = path
                    .parent()
                    .filter(|parent| !parent.as_os_str().is_empty())
                    .map(std::path::Path::to_path_buf)
                    .unwrap_or_else(|| std::path::PathBuf::from("."));
                let options = ExportOptions {
                    output_filename: path
                        .file_name()
                        .map(|name| name.to_string_lossy().into_owned()),
                    write_manifest: false,
                };
                (dir, options)
            }
            None => (self.config.output_dir.clone(), ExportOptions::default()),
        };

        match controller.export_result(&dir, &options) {
            Ok(summary) => {
                engine_info!("Transcript saved to {:?}", summary.output_path);
                println!("Saved {}", summary.output_path.display());
                if let Some(manifest) = summary.manifest_path {
                    println!("Saved {}", manifest.display());
                }
            }
            Err(err) => {
                engine_warn!("Export failed: {}", err);
                println!("Cannot save: {err}");
            }
        }
    }

    fn quit<C: Clock, S: Scheduler>(
        &mut self,
        controller: &mut JobController<C, S>,
        confirmed: bool,
    ) -> Flow {
        match controller.exit_decision() {
            ExitDecision::Proceed => Flow::Exit,
            ExitDecision::Confirm if confirmed => {
                controller.cancel();
                Flow::Exit
            }
            ExitDecision::Confirm => {
                println!("{EXIT_WARNING}");
                println!("Type `quit` again (or `quit!`) to leave anyway.");
                self.quit_armed = true;
                Flow::Continue
            }
        }
    }
}

fn print_change(snapshot: &JobSnapshot, json: bool) {
    write_change(&mut io::stdout().lock(), snapshot, json);
}

fn write_change(out: &mut impl Write, snapshot: &JobSnapshot, json: bool) {
    let lines = if json {
        match render::render_json(snapshot) {
            Ok(line) => vec![line],
            Err(err) => {
                engine_warn!("Failed to serialize snapshot: {}", err);
                return;
            }
        }
    } else {
        render::render_change(snapshot)
    };
    let written = lines
        .iter()
        .try_for_each(|line| writeln!(out, "{line}"))
        .and_then(|()| out.flush());
    if let Err(err) = written {
        engine_warn!("Failed to write state change: {}", err);
    }
}

// Blocking stdin reads stay off the event loop; lines arrive as messages.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}
