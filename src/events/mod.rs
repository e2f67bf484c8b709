//! # Events Module
//!
//! Progress reporting for the comparison pipeline.
//!
//! The engine never prints. It emits events through a channel and whoever
//! holds the receiver (the CLI progress bar, a test) decides what to show.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Render(RenderEvent::Progress(p)) = event {
//!             println!("{}/{} ({})", p.completed, p.total, p.key);
//!         }
//!     }
//! });
//!
//! pipeline.run_with_events(&sender)?;
//! ```

mod channel;
mod types;

pub use channel::{EventChannel, EventReceiver, EventSender, null_sender};
pub use types::*;
