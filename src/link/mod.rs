//! Reliable command/ack link over a lossy, shared-frequency radio.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Link Stack                           │
//! │                                                             │
//! │  ┌──────────┐   ┌──────────┐   ┌──────────┐   ┌──────────┐  │
//! │  │ RadioLink│──▶│  Codec   │──▶│ Channel  │──▶│Dispatcher│  │
//! │  │ (port)   │   │ (8 byte) │   │ Filter   │   │ (role)   │  │
//! │  └──────────┘   └──────────┘   └────┬─────┘   └──────────┘  │
//! │       ▲                             │                       │
//! │       │                             ▼                       │
//! │       │        ┌───────────────────────────┐                │
//! │       └────────│ Tracker (ack / retransmit)│                │
//! │                └───────────────────────────┘                │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod codec;
pub mod dispatch;
pub mod filter;
pub mod tracker;
