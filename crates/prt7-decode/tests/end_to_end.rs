use prt7_decode::{
    DecodeEvent, DecodeSink, Decoder, NullSink, PayloadSequence, ShutdownReport, DEMO_FRAMES,
};

/// Records what a display sink would show.
#[derive(Default)]
struct TraceRecorder {
    snapshots: Vec<String>,
    lines: Vec<String>,
    closed: Option<ShutdownReport>,
}

impl DecodeSink for TraceRecorder {
    fn frame_decoded(&mut self, line: &str, _event: &DecodeEvent, payload: &PayloadSequence) {
        self.lines.push(line.to_string());
        self.snapshots.push(payload.snapshot());
    }

    fn session_closed(&mut self, report: &ShutdownReport) {
        self.closed = Some(report.clone());
    }
}

#[test]
fn demo_sequence_decodes_to_literal_message() {
    let mut decoder = Decoder::new();
    decoder.initialize().unwrap();

    let mut events = Vec::new();
    for line in DEMO_FRAMES {
        decoder.process_line(line, &mut events).unwrap();
    }
    let report = decoder.shutdown(&mut NullSink).unwrap();

    assert_eq!(report.message, "HOLC YORLD");
    assert_eq!(report.frames_applied, 12);
    assert_eq!(report.rotor_offset, 0);

    let decoded: String = events
        .iter()
        .filter_map(|event| match event {
            DecodeEvent::Loaded { decoded, .. } => Some(*decoded),
            DecodeEvent::Rotated { .. } => None,
        })
        .collect();
    assert_eq!(decoded, "HOLC YORLD");

    assert_eq!(
        events[3],
        DecodeEvent::Rotated {
            amount: 2,
            head: 'C'
        }
    );
    assert_eq!(
        events[4],
        DecodeEvent::Loaded {
            symbol: 'A',
            decoded: 'C'
        }
    );
    assert_eq!(
        events[5],
        DecodeEvent::Loaded {
            symbol: ' ',
            decoded: ' '
        }
    );
    assert_eq!(
        events[6],
        DecodeEvent::Loaded {
            symbol: 'W',
            decoded: 'Y'
        }
    );
    assert_eq!(
        events[7],
        DecodeEvent::Rotated {
            amount: -2,
            head: 'A'
        }
    );
}

#[test]
fn sink_sees_every_frame_and_the_shutdown() {
    let mut decoder = Decoder::new();
    decoder.initialize().unwrap();

    let mut recorder = TraceRecorder::default();
    for line in ["TX: L,H", "noise", "[L,I]", "M,1"] {
        let _ = decoder.process_line(line, &mut recorder);
    }
    decoder.shutdown(&mut recorder).unwrap();

    assert_eq!(recorder.lines, vec!["TX: L,H", "[L,I]", "M,1"]);
    assert_eq!(recorder.snapshots, vec!["[H]", "[H][I]", "[H][I]"]);
    let closed = recorder.closed.expect("sink should see the shutdown");
    assert_eq!(closed.message, "HI");
    assert_eq!(closed.rotor_offset, 1);
}

#[test]
fn sessions_are_independent() {
    let mut first = Decoder::new();
    let mut second = Decoder::new();
    first.initialize().unwrap();
    second.initialize().unwrap();

    first.feed_line("M,13").unwrap();
    first.feed_line("L,A").unwrap();
    second.feed_line("L,A").unwrap();

    assert_eq!(first.shutdown(&mut NullSink).unwrap().message, "N");
    assert_eq!(second.shutdown(&mut NullSink).unwrap().message, "A");
}

#[test]
fn report_serializes_for_json_sinks() {
    let mut decoder = Decoder::new();
    decoder.initialize().unwrap();
    decoder.feed_line("L,Q").unwrap();
    let report = decoder.shutdown(&mut NullSink).unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["message"], "Q");
    assert_eq!(json["frames_applied"], 1);
}
