//! # rui-core
//!
//! Core library for the remote render UI: a set of controls whose changes
//! are published as named parameter updates to a render server, kept in
//! sync with values the server pushes back.
//!
//! This crate contains:
//! - **Wire**: `PacketHeader`, `Packet` and `RuiCodec` for framed TCP I/O via `tokio_util`
//! - **Network**: `Connection` split into an unbounded outbound queue and an inbound receiver
//! - **Values**: `ChannelValue`, the strict bincode codec for channel payloads
//! - **Mux / Demux**: `Publish` + `Muxer` outbound, `Demuxer` subscriber dispatch inbound
//! - **Controls**: `ControlPanel`, the parameter binding layer
//! - **Frame**: `FrameBufferSink`, streamed HDR frame assembly and PFM export
//! - **Histogram**: `TileHistogram` normalisation for the workload graph
//! - **Error**: `RuiError`, a typed, `thiserror`-based error hierarchy

pub mod channels;
pub mod codec;
pub mod controls;
pub mod demux;
pub mod error;
pub mod frame;
pub mod header;
pub mod histogram;
pub mod mux;
pub mod network;
pub mod packet;
pub mod value;

// ── Re-exports for ergonomic usage ───────────────────────────────

pub use codec::RuiCodec;
pub use controls::{ControlPanel, DisplayUpdate, ModelMenu};
pub use demux::{Demuxer, Dispatch, SubscriptionHandle};
pub use error::RuiError;
pub use frame::{FrameBufferSink, FrameSnapshot, HdrHeader, SaveOutcome};
pub use header::{HEADER_SIZE, PacketHeader};
pub use histogram::TileHistogram;
pub use mux::{Muxer, Publish};
pub use network::{Connection, ConnectionInfo, ConnectionReceiver, ConnectionSender, WriterTask};
pub use packet::{MAX_PAYLOAD_SIZE, Packet};
pub use value::ChannelValue;
