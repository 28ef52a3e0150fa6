//! Headless client - runs the simulation and sync core on a fixed tick

pub mod autopilot;
pub mod presenter;

pub use autopilot::{Autopilot, InputSource};
pub use presenter::TracingPresenter;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::info;

use crate::game::{InputState, Presenter, RenderFrame, SimConfig, Simulation, SnapshotBuilder};
use crate::relay::RelayHub;
use crate::sync::{HubLink, NetworkSync, RelayLink};
use crate::util::time::{FrameClock, TICK_DURATION_MICROS};

/// One client: simulation, sync layer, input and presenter
pub struct ClientSession<L: RelayLink, P: Presenter> {
    sim: Simulation,
    sync: NetworkSync<L>,
    snapshots: SnapshotBuilder,
    presenter: P,
    input: InputState,
    clock: FrameClock,
}

impl<L: RelayLink, P: Presenter> ClientSession<L, P> {
    pub fn new(
        config: SimConfig,
        seed: u64,
        link: L,
        inbound: mpsc::Receiver<String>,
        presenter: P,
    ) -> Self {
        let share = config.share_wave_spawns;
        Self {
            sim: Simulation::new(config, seed),
            sync: NetworkSync::new(link, inbound, share),
            snapshots: SnapshotBuilder::new(),
            presenter,
            input: InputState::new(),
            clock: FrameClock::new(),
        }
    }

    pub fn sim(&self) -> &Simulation {
        &self.sim
    }

    pub fn sync(&self) -> &NetworkSync<L> {
        &self.sync
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// Run one tick with an explicit delta time
    pub fn step(&mut self, dt: f32) -> RenderFrame {
        // Relay traffic lands before the tick so it never races local mutation
        let mut events = self.sync.drain_inbound(&mut self.sim);

        let input = self.input.sample();
        events.extend(self.sim.tick(&input, dt));
        self.sync.advance_remote();
        self.sync.publish(&self.sim, &events);

        let frame = self.snapshots.build(
            self.sim.state(),
            self.sync.remote_player_views(),
            self.sync.remote_shot_views(),
        );
        self.presenter.present(&frame);
        frame
    }

    /// Tick at the simulation rate until `shutdown` flips to true
    pub async fn run<S: InputSource>(
        mut self,
        mut source: S,
        mut shutdown: watch::Receiver<bool>,
    ) -> Self {
        let mut tick_interval = interval(Duration::from_micros(TICK_DURATION_MICROS));
        tick_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = tick_interval.tick() => {
                    source.drive(self.sim.state(), &mut self.input);
                    let dt = self.clock.delta();
                    self.step(dt);
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        let state = self.sim().state();
        let stats = self.sync().stats();
        info!(
            conn_id = ?self.sync().self_id(),
            ticks = state.tick,
            score = state.score,
            wave = state.wave(),
            remote_players = self.sync().remote_players().len(),
            sent = stats.sent,
            skipped = stats.skipped,
            applied = stats.applied,
            discarded = stats.discarded,
            ignored = stats.ignored,
            "Client stopped"
        );
        self
    }
}

/// Connect a headless client to an in-process hub and start its tick loop
pub fn spawn_bot(
    hub: Arc<RelayHub>,
    config: SimConfig,
    seed: u64,
    shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    let (id, inbound) = hub.connect();
    let link = HubLink::new(hub, id);
    let label = format!("bot-{}", link.id().0.chars().take(8).collect::<String>());
    let sensitivity = config.mouse_sensitivity;

    info!(client = %label, seed, "Starting headless client");
    let session = ClientSession::new(config, seed, link, inbound, TracingPresenter::new(label));
    tokio::spawn(async move {
        let session = session.run(Autopilot::new(seed, sensitivity), shutdown).await;
        info!(frames = session.presenter().frames(), "Headless client presented");
        session.sync().link().close();
    })
}
