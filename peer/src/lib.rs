//! # Grid Snake Peer
//!
//! Everything one process needs to take part in a session: the fixed-tick
//! snake simulation, the host/client transport, and thin input and render
//! shims around macroquad.
//!
//! ## Topology
//!
//! Every process runs the same binary. On startup it tries the configured
//! address for an existing host; if one answers, the process joins as a
//! client and adopts the player id the host hands it. If nobody answers,
//! the process binds the port and becomes the host, playing as id 1 and
//! assigning 2, 3, and so on to later arrivals.
//!
//! The host is authoritative for food placement. Clients that detect a
//! pickup relocate the food provisionally and report the pickup; the host
//! answers with the final location, which overwrites whatever a client
//! guessed. Body positions are not arbitrated at all: each peer simulates
//! only its own snake and broadcasts the result, with the host relaying
//! client bodies to the other clients.
//!
//! ## Frame order
//!
//! [`session::GameSession::frame`] runs once per rendered frame: apply
//! input, run every simulation tick that fell due, publish the results,
//! drain received records, then hand a position snapshot to the renderer.
//! Nothing in that path blocks; network traffic crosses over from the
//! transport's own runtime through channels.
//!
//! ## Modules
//!
//! - [`grid`]: bounds checks and random cell selection.
//! - [`snake`]: one snake's body, heading, and growth state machine.
//! - [`food`]: food placement policy.
//! - [`game`]: the local simulation and remote body bookkeeping.
//! - [`scheduler`]: fixed-interval tick pacing.
//! - [`network`]: topology negotiation and record transport.
//! - [`session`]: the pieces wired together behind one frame call.
//! - [`input`] / [`render`]: macroquad-facing shims.

pub mod food;
pub mod game;
pub mod grid;
pub mod input;
pub mod network;
pub mod render;
pub mod scheduler;
pub mod session;
pub mod snake;
