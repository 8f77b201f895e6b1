//! Line-source links for the PRT-7 decoder.
//!
//! A link is the byte pipe a frame emitter writes into:
//! - a serial tty (microcontroller over USB-serial)
//! - a Unix domain socket (emulators, replay tools)
//!
//! This is the lowest layer. Everything above reads text lines out of the
//! [`LinkStream`] returned here.

pub mod error;
pub mod stream;

#[cfg(unix)]
pub mod serial;
#[cfg(unix)]
pub mod uds;

pub use error::{LinkError, Result};
pub use stream::LinkStream;

#[cfg(unix)]
pub use serial::{SerialConfig, SerialLink, DEFAULT_BAUD, SUPPORTED_BAUD_RATES};
#[cfg(unix)]
pub use uds::LineSocket;
