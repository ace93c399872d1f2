#![no_main]

use libfuzzer_sys::fuzz_target;
use typlive_web::frame_parser::{decode_compile_ack, decode_frame};

const EVENTS: [&str; 8] = [
    "compile_result",
    "connected",
    "connect",
    "disconnect",
    "connect_error",
    "reconnect",
    "reconnect_failed",
    "unknown",
];

fuzz_target!(|data: &[u8]| {
    // First byte picks the event name, the rest is the payload.
    // Decoding must never panic, whatever the server sends.
    let Some((&pick, rest)) = data.split_first() else {
        return;
    };
    let payload = String::from_utf8_lossy(rest);
    let event = EVENTS[usize::from(pick) % EVENTS.len()];
    let _ = decode_frame(event, &payload);
    let _ = decode_compile_ack(u64::from(pick), &payload);
});
