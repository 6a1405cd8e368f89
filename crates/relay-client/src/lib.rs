//! # relay-client
//!
//! Consumer side of the typewriter relay. [`ChatClient`] posts a message and
//! feeds the response body through an [`EventDecoder`] into a [`Renderer`],
//! which drives a [`MessageView`].
//!
//! ## Design Notes
//!
//! ### Two typewriters
//! The server already paces tokens. The client adds its own reveal animation
//! on top, one character every 25 ms by default, so the on-screen cadence
//! does not depend on network arrival. Each message owns exactly one
//! animation task in the [`RevealAnimator`] arena; tokens only move its
//! target forward.
//!
//! ### Convergence
//! `end` (or a stream that simply stops) stops the animation and shows the
//! full text, so the displayed text always converges to what was received.

pub mod client;
pub mod decoder;
pub mod error;
pub mod render;
pub mod reveal;
pub mod view;

pub use client::ChatClient;
pub use decoder::EventDecoder;
pub use error::{ClientError, Result};
pub use render::{Control, RenderState, Renderer, Reply, ReplyStatus};
pub use reveal::{RevealAnimator, DEFAULT_REVEAL_INTERVAL};
pub use view::{MemoryView, MessageId, MessageRecord, MessageView, Role};
