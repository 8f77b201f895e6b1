use prt7_frame::{parse_with_config, Frame, FrameConfig};
use serde::Serialize;
use tracing::{debug, info};

use crate::engine::{self, DecodeEvent};
use crate::error::{DecodeError, Result};
use crate::payload::PayloadSequence;
use crate::rotor::Rotor;
use crate::sink::DecodeSink;

/// Symbols reserved up front for a session's payload.
pub const DEFAULT_PAYLOAD_CAPACITY: usize = 64;

/// The canned emitter sequence used by demos and self-tests.
pub const DEMO_FRAMES: [&str; 12] = [
    "L,H", "L,O", "L,L", "M,2", "L,A", "L, ", "L,W", "M,-2", "L,O", "L,R", "L,L", "L,D",
];

#[derive(Debug, Clone)]
pub struct DecoderConfig {
    /// Parser settings (line bound).
    pub frame: FrameConfig,
    /// Payload capacity reserved when a session starts.
    pub initial_capacity: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            frame: FrameConfig::default(),
            initial_capacity: DEFAULT_PAYLOAD_CAPACITY,
        }
    }
}

/// One decoding session: a rotor and the payload it produced.
#[derive(Debug, Clone, Default)]
pub struct Session {
    rotor: Rotor,
    payload: PayloadSequence,
    frames_applied: usize,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session with its payload storage reserved.
    pub fn try_initialize(config: &DecoderConfig) -> Result<Self> {
        Ok(Self {
            rotor: Rotor::new(),
            payload: PayloadSequence::try_with_capacity(config.initial_capacity)?,
            frames_applied: 0,
        })
    }

    pub fn apply(&mut self, frame: Frame) -> DecodeEvent {
        self.frames_applied += 1;
        engine::apply(frame, &mut self.rotor, &mut self.payload)
    }

    /// Back to a fresh rotor and an empty payload.
    pub fn reset(&mut self) {
        self.rotor = Rotor::new();
        self.payload.clear();
        self.frames_applied = 0;
    }

    pub fn rotor(&self) -> &Rotor {
        &self.rotor
    }

    pub fn payload(&self) -> &PayloadSequence {
        &self.payload
    }

    pub fn frames_applied(&self) -> usize {
        self.frames_applied
    }

    fn report(&self) -> ShutdownReport {
        ShutdownReport {
            message: self.payload.message(),
            rendered: self.payload.render(),
            frames_applied: self.frames_applied,
            rotor_offset: self.rotor.offset(),
        }
    }
}

/// Final state flushed at shutdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShutdownReport {
    /// Decoded message, empty if nothing was loaded.
    pub message: String,
    /// Display form of the message (sentinel when empty).
    pub rendered: String,
    pub frames_applied: usize,
    pub rotor_offset: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// No session; frames are refused.
    Inactive,
    /// Frames are applied to the current session.
    Active,
}

/// Session lifecycle around the decoding engine.
///
/// Starts `Inactive`. [`initialize`](Self::initialize) creates a fresh
/// session and makes it `Active`; [`shutdown`](Self::shutdown) flushes the
/// final message and drops the session. Applying frames never changes the
/// state.
#[derive(Debug, Default)]
pub struct Decoder {
    config: DecoderConfig,
    session: Option<Session>,
}

impl Decoder {
    pub fn new() -> Self {
        Self::with_config(DecoderConfig::default())
    }

    pub fn with_config(config: DecoderConfig) -> Self {
        Self {
            config,
            session: None,
        }
    }

    pub fn state(&self) -> SessionState {
        if self.session.is_some() {
            SessionState::Active
        } else {
            SessionState::Inactive
        }
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Start a fresh session. An active session is discarded and replaced.
    pub fn initialize(&mut self) -> Result<()> {
        let session = Session::try_initialize(&self.config)?;
        if self.session.replace(session).is_some() {
            debug!("discarded previous session");
        }
        info!("decoder initialized, rotor head at 'A'");
        Ok(())
    }

    /// Apply a frame to the active session.
    pub fn apply(&mut self, frame: Frame) -> Result<DecodeEvent> {
        let session = self.session.as_mut().ok_or(DecodeError::Inactive)?;
        Ok(session.apply(frame))
    }

    /// Parse `line` and apply the frame it carries.
    ///
    /// Lines that are not frames leave the session untouched.
    pub fn feed_line(&mut self, line: &str) -> Result<DecodeEvent> {
        if !self.is_active() {
            return Err(DecodeError::Inactive);
        }
        let frame = parse_with_config(line, &self.config.frame)?;
        self.apply(frame)
    }

    /// [`feed_line`](Self::feed_line), then trace the result to `sink`.
    pub fn process_line<S: DecodeSink + ?Sized>(
        &mut self,
        line: &str,
        sink: &mut S,
    ) -> Result<DecodeEvent> {
        let event = self.feed_line(line)?;
        if let Some(session) = &self.session {
            sink.frame_decoded(line, &event, session.payload());
        }
        Ok(event)
    }

    /// End the session, flushing its final state to `sink`.
    pub fn shutdown<S: DecodeSink + ?Sized>(&mut self, sink: &mut S) -> Result<ShutdownReport> {
        let session = self.session.take().ok_or(DecodeError::Inactive)?;
        let report = session.report();
        info!(
            frames = report.frames_applied,
            length = session.payload().len(),
            "decoder shut down"
        );
        sink.session_closed(&report);
        Ok(report)
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }
}
