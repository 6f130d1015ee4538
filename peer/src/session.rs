//! One per-process game session: simulation, scheduler, and transport
//! wired together behind a single frame call.

use log::{debug, info};
use shared::{BoundedBody, Direction, Packet, PlayerId};
use std::time::{Duration, Instant};

use crate::game::{Simulation, Snapshot, TickReport};
use crate::network::{NetworkPeer, PeerConfig, PeerError, PeerEvent, PeerRole};
use crate::scheduler::TickScheduler;

pub struct GameSession {
    simulation: Simulation,
    peer: NetworkPeer,
    scheduler: TickScheduler,
    /// Most recent press, held until a due tick consumes it. Frames render
    /// far more often than ticks run, so steering must not require the
    /// press to land on a tick frame.
    pending_input: Option<Direction>,
}

impl GameSession {
    /// Negotiates the topology and starts a fresh simulation under the
    /// negotiated player id.
    pub fn start(config: &PeerConfig, tick_interval: Duration) -> Result<Self, PeerError> {
        let peer = NetworkPeer::negotiate(config)?;
        let simulation = Simulation::new(peer.local_player());
        Ok(Self {
            simulation,
            peer,
            scheduler: TickScheduler::new(tick_interval),
            pending_input: None,
        })
    }

    pub fn role(&self) -> PeerRole {
        self.peer.role()
    }

    pub fn local_player(&self) -> PlayerId {
        self.peer.local_player()
    }

    pub fn peer(&self) -> &NetworkPeer {
        &self.peer
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    /// One frame of work: latch any press, run every due tick, fold in
    /// network traffic, and hand back the positions to draw. A press made
    /// on a frame that runs no ticks is kept and steers the next due tick;
    /// `None` leaves the latch alone and the heading unchanged.
    pub fn frame(&mut self, input: Option<Direction>, now: Instant) -> Snapshot {
        if input.is_some() {
            self.pending_input = input;
        }
        for _ in 0..self.scheduler.due_ticks(now) {
            let report = self.simulation.tick(self.pending_input.take());
            self.publish_tick(&report);
        }
        self.drain_network();
        self.simulation.snapshot()
    }

    /// Closes the transport. Idempotent; also runs on drop.
    pub fn shutdown(&mut self) {
        self.peer.shutdown();
    }

    fn publish_tick(&mut self, report: &TickReport) {
        let player = self.local_player();
        let body = BoundedBody::truncated(&report.body);
        self.peer
            .broadcast(&Packet::BodyUpdate { player, body }, None);

        if report.ate_food {
            if self.peer.is_host() {
                // The host's relocation is final; everyone adopts it.
                let cell = self.simulation.food();
                self.peer
                    .broadcast(&Packet::FoodAssign { player, cell }, None);
            } else {
                // A client's relocation is provisional until the host answers.
                self.peer.broadcast(&Packet::FoodPickup { player }, None);
            }
        }
        if report.respawned {
            debug!("Player {} respawned", player);
        }
    }

    fn drain_network(&mut self) {
        for event in self.peer.poll_incoming() {
            match event {
                PeerEvent::Joined { player } => self.sync_new_player(player),
                PeerEvent::Packet { from, packet } => self.apply_packet(from, packet),
            }
        }
    }

    /// Brings a freshly connected client up to date with the current food
    /// location and our body.
    fn sync_new_player(&mut self, player: PlayerId) {
        info!("Player {} joined the session", player);
        let local = self.local_player();
        self.peer.send_to(
            player,
            &Packet::FoodAssign {
                player: local,
                cell: self.simulation.food(),
            },
        );
        let body = BoundedBody::truncated(&self.simulation.local_body());
        self.peer
            .send_to(player, &Packet::BodyUpdate { player: local, body });
    }

    fn apply_packet(&mut self, from: PlayerId, packet: Packet) {
        match &packet {
            Packet::BodyUpdate { .. } => {
                self.simulation.apply_remote(&packet);
                // Clients cannot see each other directly; the host relays.
                if self.peer.is_host() {
                    self.peer.broadcast(&packet, Some(from));
                }
            }
            Packet::FoodPickup { player } => {
                self.simulation.apply_remote(&packet);
                if self.peer.is_host() {
                    let cell = self.simulation.food();
                    debug!(
                        "Honoring pickup by player {}; food now at ({}, {})",
                        player, cell.x, cell.y
                    );
                    self.peer.broadcast(
                        &Packet::FoodAssign {
                            player: self.local_player(),
                            cell,
                        },
                        None,
                    );
                }
            }
            Packet::FoodAssign { .. } | Packet::None => {
                self.simulation.apply_remote(&packet);
            }
        }
    }
}
