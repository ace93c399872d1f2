#![no_main]

use core::time::Duration;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use typlive_core::{EditorEvent, Environment, PageEvent};
use typlive_runtime::EditorConfig;
use typlive_web::step_editor::StepEditor;

#[derive(Debug, Arbitrary)]
enum Op {
    Type(String),
    Select(u8),
    Clear(bool),
    Compile,
    Insert { text: String, back: u8 },
    Frame { event: u8, payload: String },
    Ack { seq: u8, payload: String },
    Visible(bool),
    Advance(u16),
    Step,
}

const EVENTS: [&str; 7] = [
    "compile_result",
    "connected",
    "connect",
    "disconnect",
    "connect_error",
    "reconnect",
    "reconnect_failed",
];

fuzz_target!(|ops: Vec<Op>| {
    let mut editor = StepEditor::new(&EditorConfig::default());
    editor.init();

    for op in ops.into_iter().take(256) {
        match op {
            Op::Type(text) => editor.type_text(text),
            Op::Select(n) => {
                let env = Environment::ALL[usize::from(n) % Environment::COUNT];
                editor.push_event(EditorEvent::SelectEnvironment(env));
            }
            Op::Clear(confirmed) => editor.push_event(EditorEvent::ClearCurrent { confirmed }),
            Op::Compile => editor.push_event(EditorEvent::ManualCompile),
            Op::Insert { text, back } => editor.push_event(EditorEvent::InsertSymbol {
                text,
                cursor_back: usize::from(back),
            }),
            Op::Frame { event, payload } => {
                let _ = editor.push_frame(EVENTS[usize::from(event) % EVENTS.len()], &payload);
            }
            Op::Ack { seq, payload } => {
                let _ = editor.push_ack(u64::from(seq), &payload);
            }
            Op::Visible(visible) => {
                editor.push_event(PageEvent::VisibilityChanged { visible }.into());
            }
            Op::Advance(ms) => editor.advance_time(Duration::from_millis(u64::from(ms))),
            Op::Step => {
                editor.step();
            }
        }
    }
    editor.step();

    // Blank sources are never sent.
    for frame in editor.take_outbox() {
        assert_ne!(frame.payload, r#"{"code":""}"#);
    }
});
