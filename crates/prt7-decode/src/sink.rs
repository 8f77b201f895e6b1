use crate::decoder::ShutdownReport;
use crate::engine::DecodeEvent;
use crate::payload::PayloadSequence;

/// Receives decode traces. How (or whether) they are shown is up to the
/// implementor.
pub trait DecodeSink {
    /// A frame from `line` was applied; `payload` is the message so far.
    fn frame_decoded(&mut self, line: &str, event: &DecodeEvent, payload: &PayloadSequence);

    /// The session shut down with this final state.
    fn session_closed(&mut self, report: &ShutdownReport);
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DecodeSink for NullSink {
    fn frame_decoded(&mut self, _line: &str, _event: &DecodeEvent, _payload: &PayloadSequence) {}

    fn session_closed(&mut self, _report: &ShutdownReport) {}
}

/// Collects events in order.
impl DecodeSink for Vec<DecodeEvent> {
    fn frame_decoded(&mut self, _line: &str, event: &DecodeEvent, _payload: &PayloadSequence) {
        self.push(*event);
    }

    fn session_closed(&mut self, _report: &ShutdownReport) {}
}
