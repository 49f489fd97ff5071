use std::{
    io::BufRead,
    path::PathBuf,
    sync::{mpsc, Arc, Mutex},
    thread,
    time::{Duration, Instant},
};

use anyhow::Context;
use clap::Parser;
use layers::catalog::LayerCatalog;
use mapvote::controller::VoteController;
use rand::{rngs::StdRng, SeedableRng};
use serde::Serialize;
use vote_interface::{
    channel::CommandChannelInterface,
    config::ConfigMapVote,
    events::{PlayerId, ServerEvent},
    facts::ServerFactsInterface,
};

/// Chat-driven map vote service for a game server.
///
/// Consumes server lifecycle events as JSON lines on stdin and emits
/// server commands as JSON lines on stdout.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// layer catalog json
    #[arg(long, default_value = "layers.json")]
    layers: PathBuf,
    /// vote config json; built-in defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Default)]
struct MirrorState {
    current: Option<String>,
    next: Option<String>,
    roster: Vec<PlayerId>,
    /// map names of finished rounds, most recent first
    recent: Vec<String>,
}

/// Mirror of the host server's live state, fed from the event stream.
#[derive(Default)]
struct ServerMirror(Mutex<MirrorState>);

impl ServerMirror {
    fn apply(&self, event: &ServerEvent, catalog: &LayerCatalog) {
        let mut state = self.0.lock().unwrap();
        match event {
            ServerEvent::RoundStarted {
                layer_id,
                next_layer_id,
            } => {
                if let Some(previous) = state.current.take() {
                    if let Some(layer) = catalog.find(&previous) {
                        state.recent.insert(0, layer.map_name.clone());
                        state.recent.truncate(8);
                    }
                }
                state.current = Some(layer_id.clone());
                state.next = next_layer_id.clone();
            }
            ServerEvent::PlayerConnected { player_id } => {
                if !state.roster.contains(player_id) {
                    state.roster.push(player_id.clone());
                }
            }
            ServerEvent::PlayerDisconnected { player_id } => {
                state.roster.retain(|p| p != player_id);
            }
            ServerEvent::Chat(_) => {}
        }
    }
}

impl ServerFactsInterface for ServerMirror {
    fn current_layer(&self) -> Option<String> {
        self.0.lock().unwrap().current.clone()
    }
    fn next_layer(&self) -> Option<String> {
        self.0.lock().unwrap().next.clone()
    }
    fn player_roster(&self) -> Vec<PlayerId> {
        self.0.lock().unwrap().roster.clone()
    }
    fn population(&self) -> usize {
        self.0.lock().unwrap().roster.len()
    }
    fn recent_map_names(&self) -> Vec<String> {
        self.0.lock().unwrap().recent.clone()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
enum Command<'a> {
    Broadcast { msg: &'a str },
    Notify { player_id: &'a str, msg: &'a str },
    SetNextLayer { layer_id: &'a str },
    SetCurrentLayer { layer_id: &'a str },
}

/// Emits every server command as one JSON line on stdout.
struct StdoutChannel;

impl StdoutChannel {
    fn emit(&self, command: Command) {
        match serde_json::to_string(&command) {
            Ok(line) => println!("{line}"),
            Err(err) => log::error!("command not emitted: {err}"),
        }
    }
}

impl CommandChannelInterface for StdoutChannel {
    fn broadcast(&self, msg: &str) {
        self.emit(Command::Broadcast { msg });
    }
    fn notify(&self, player_id: &PlayerId, msg: &str) {
        self.emit(Command::Notify { player_id, msg });
    }
    fn set_next_layer(&self, layer_id: &str) {
        self.emit(Command::SetNextLayer { layer_id });
    }
    fn set_current_layer(&self, layer_id: &str) {
        self.emit(Command::SetCurrentLayer { layer_id });
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let catalog: LayerCatalog = {
        let file = std::fs::read(&args.layers)
            .with_context(|| format!("reading layer catalog {:?}", args.layers))?;
        LayerCatalog::from_json(&file).context("parsing layer catalog")?
    };
    anyhow::ensure!(!catalog.is_empty(), "layer catalog is empty");
    log::info!("{} layers loaded", catalog.len());

    let config: ConfigMapVote = match &args.config {
        Some(path) => {
            let file = std::fs::read(path)
                .with_context(|| format!("reading config {path:?}"))?;
            serde_json::from_slice(&file).context("parsing config")?
        }
        None => ConfigMapVote::default(),
    };

    let catalog = Arc::new(catalog);
    let mirror = Arc::new(ServerMirror::default());
    let mut controller = VoteController::new(
        config,
        catalog.clone(),
        mirror.clone(),
        Arc::new(StdoutChannel),
        StdRng::from_entropy(),
    );

    let (event_tx, event_rx) = mpsc::channel::<ServerEvent>();
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<ServerEvent>(&line) {
                Ok(event) => {
                    if event_tx.send(event).is_err() {
                        break;
                    }
                }
                Err(err) => log::warn!("unreadable event dropped: {err}"),
            }
        }
    });

    let started = Instant::now();
    loop {
        let now = started.elapsed();
        controller.fire_due(now);

        let timeout = controller
            .next_deadline()
            .map(|deadline| deadline.saturating_sub(now))
            .unwrap_or(Duration::from_secs(1));
        match event_rx.recv_timeout(timeout) {
            Ok(event) => {
                mirror.apply(&event, &catalog);
                controller.handle_event(&event, started.elapsed());
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }
    log::info!("event stream closed, shutting down");
    Ok(())
}
