use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, watch};
use tomato_core::effects::NullScreen;
use tomato_core::storage::sounds_dir;
use tomato_core::{
    AmbientSound, Config, Event, FullScreen, RunnerCommand, SessionRunner, SideEffectAdapter,
};
use tracing::warn;

use crate::audio;
use crate::terminal::{StatusLine, TerminalScreen};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Work phase length in minutes
    #[arg(long)]
    work: Option<u64>,
    /// Rest phase length in minutes
    #[arg(long)]
    rest: Option<u64>,
    /// Start a rest phase when work ends
    #[arg(long)]
    auto_rest: Option<bool>,
    /// Start the next work phase when rest ends
    #[arg(long)]
    auto_resume: Option<bool>,
    /// Play the ambient sound when work starts
    #[arg(long)]
    ambient: Option<bool>,
    /// Switch to the alternate screen when work starts
    #[arg(long)]
    full_screen: Option<bool>,
    /// Ambient sound id (see `tomato sounds`)
    #[arg(long)]
    sound: Option<AmbientSound>,
    /// Print events as JSON lines instead of a status line
    #[arg(long)]
    json: bool,
    /// Disable audio and full screen entirely
    #[arg(long)]
    headless: bool,
}

impl RunArgs {
    fn apply_overrides(&self, config: &mut Config) {
        let s = &mut config.session;
        if let Some(work) = self.work {
            s.work_minutes = work;
        }
        if let Some(rest) = self.rest {
            s.rest_minutes = rest;
        }
        if let Some(v) = self.auto_rest {
            s.auto_rest = v;
        }
        if let Some(v) = self.auto_resume {
            s.auto_resume = v;
        }
        if let Some(v) = self.ambient {
            s.play_ambient_on_start = v;
        }
        if let Some(v) = self.full_screen {
            s.full_screen_on_start = v;
        }
        if let Some(sound) = self.sound {
            s.ambient_sound = sound;
        }
    }

    fn effects(&self) -> Result<SideEffectAdapter, Box<dyn std::error::Error>> {
        if self.headless {
            return Ok(SideEffectAdapter::headless());
        }
        let screen: Box<dyn FullScreen> = if self.json {
            Box::new(NullScreen::default())
        } else {
            Box::new(TerminalScreen::new())
        };
        Ok(SideEffectAdapter::new(audio::player(sounds_dir()?), screen))
    }
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load()?;
    args.apply_overrides(&mut config);
    // Validate before touching the terminal or audio device.
    config.validate()?;
    config.session_config().validate()?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(run_session(args, config));
    // The stdin reader may still be parked on a blocking read.
    runtime.shutdown_background();
    result
}

async fn run_session(args: RunArgs, config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let (ev_tx, mut ev_rx) = mpsc::unbounded_channel();
    let runner = SessionRunner::from_config(&config, args.effects()?)?
        .with_events(ev_tx)
        .exit_when_idle(true);

    let (cmd_tx, cmd_rx) = mpsc::channel(16);
    let (snap_tx, mut snap_rx) = watch::channel(runner.controller().snapshot());
    cmd_tx.send(RunnerCommand::Start).await?;

    tokio::spawn(read_commands(cmd_tx.clone()));
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = cmd_tx.send(RunnerCommand::Shutdown).await;
        }
    });

    let json = args.json;
    let mut status = StatusLine::new(config.display.show_ring);
    let render = async {
        loop {
            tokio::select! {
                changed = snap_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    if !json {
                        let snapshot = snap_rx.borrow_and_update().clone();
                        status.draw(&snapshot)?;
                    }
                }
                Some(event) = ev_rx.recv() => show(&mut status, &event, json)?,
                else => break,
            }
        }
        // Events emitted during shutdown.
        while let Ok(event) = ev_rx.try_recv() {
            show(&mut status, &event, json)?;
        }
        status.finish()?;
        Ok::<(), Box<dyn std::error::Error>>(())
    };

    let (controller, rendered) = tokio::join!(runner.run(cmd_rx, snap_tx), render);
    drop(controller);
    rendered
}

fn show(status: &mut StatusLine, event: &Event, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string(event)?);
    } else {
        status.notice(event)?;
    }
    Ok(())
}

/// One command per line: `a` ambient, `c` cancel, `s` start, `q` quit.
async fn read_commands(tx: mpsc::Sender<RunnerCommand>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let command = match line.trim() {
            "a" => RunnerCommand::ToggleAmbient,
            "c" => RunnerCommand::Cancel,
            "s" => RunnerCommand::Start,
            "q" => RunnerCommand::Shutdown,
            "" => continue,
            other => {
                warn!("unknown command '{other}' (use a, c, s or q)");
                continue;
            }
        };
        if tx.send(command).await.is_err() {
            break;
        }
    }
}
