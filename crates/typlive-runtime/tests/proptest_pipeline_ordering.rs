//! Property-based ordering tests for the compile pipeline.
//!
//! 1. Applied sequence numbers strictly increase, whatever the arrival order
//! 2. Nothing dispatched before an invalidation is ever applied after it
//! 3. A burst of edits inside one quiet window dispatches exactly once
//! 4. Each reconnect recompiles once, however many establish events report it

use std::convert::Infallible;

use proptest::prelude::*;
use typlive_backend::Transport;
use typlive_core::{
    CompileRequest, CompileResult, ConnectionEvent, DisconnectReason, Environment, TaggedResult,
};
use typlive_runtime::{
    CompilePipeline, ConnectionManager, DEFAULT_COMPILE_DELAY, Delivery, Dispatch, LinkChange,
    RetryPolicy, ViewState,
};
use web_time::Duration;

#[derive(Default)]
struct Sink {
    sent: Vec<(u64, String)>,
}

impl Transport for Sink {
    type Error = Infallible;

    fn connect(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn send_compile(&mut self, seq: u64, request: &CompileRequest) -> Result<(), Self::Error> {
        self.sent.push((seq, request.code.clone()));
        Ok(())
    }
}

struct Harness {
    pipeline: CompilePipeline,
    link: ConnectionManager,
    sink: Sink,
    view: ViewState,
}

impl Harness {
    fn connected() -> Self {
        let mut h = Self {
            pipeline: CompilePipeline::default(),
            link: ConnectionManager::new(RetryPolicy::default()),
            sink: Sink::default(),
            view: ViewState::new(Environment::Passage),
        };
        h.link.start(&mut h.sink, &mut h.view, Duration::ZERO);
        h.link
            .on_event(&ConnectionEvent::Connected, &mut h.sink, &mut h.view, Duration::ZERO);
        h
    }

    fn dispatch(&mut self, source: &str) -> Dispatch {
        self.pipeline.compile(
            Environment::Passage,
            source,
            &mut self.link,
            &mut self.sink,
            &mut self.view,
            Duration::ZERO,
        )
    }

    fn link_event(&mut self, event: &ConnectionEvent) -> LinkChange {
        self.link
            .on_event(event, &mut self.sink, &mut self.view, Duration::ZERO)
    }
}

// ── Strategies ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Step {
    Send,
    Invalidate,
    /// A `connect` or `reconnect` report while already connected.
    Establish { reconnect: bool },
    /// Deliver the result of the n-th request sent so far (modulo count).
    Deliver(usize),
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        3 => Just(Step::Send),
        1 => Just(Step::Invalidate),
        1 => any::<bool>().prop_map(|reconnect| Step::Establish { reconnect }),
        3 => any::<usize>().prop_map(Step::Deliver),
    ]
}

#[derive(Debug, Clone)]
enum LinkStep {
    Connect,
    Reconnect,
    Drop,
}

fn link_step_strategy() -> impl Strategy<Value = LinkStep> {
    prop_oneof![
        2 => Just(LinkStep::Connect),
        2 => Just(LinkStep::Reconnect),
        1 => Just(LinkStep::Drop),
    ]
}

fn establish_event(reconnect: bool) -> ConnectionEvent {
    if reconnect {
        ConnectionEvent::Reconnected { attempts: 1 }
    } else {
        ConnectionEvent::Connected
    }
}

proptest! {
    #[test]
    fn applied_sequence_numbers_strictly_increase(
        steps in prop::collection::vec(step_strategy(), 1..80),
    ) {
        let mut h = Harness::connected();
        let mut applied: Vec<u64> = Vec::new();
        let mut invalidated_through = 0u64;

        for step in &steps {
            match step {
                Step::Send => {
                    let n = h.sink.sent.len();
                    let dispatch = h.dispatch(&format!("doc {n}"));
                    prop_assert!(matches!(dispatch, Dispatch::Sent { .. }), "expected Dispatch::Sent");
                }
                Step::Invalidate => {
                    h.pipeline.invalidate();
                    invalidated_through = h.pipeline.last_sent();
                }
                Step::Establish { reconnect } => {
                    let change = h.link_event(&establish_event(*reconnect));
                    prop_assert_eq!(change, LinkChange::Unchanged);
                }
                Step::Deliver(pick) => {
                    if h.sink.sent.is_empty() {
                        continue;
                    }
                    let (seq, code) = h.sink.sent[pick % h.sink.sent.len()].clone();
                    let tagged = TaggedResult::tagged(seq, CompileResult::Rendered(code));
                    if let Delivery::Applied { seq } = h.pipeline.deliver(tagged, &mut h.view) {
                        prop_assert!(seq > invalidated_through);
                        if let Some(last) = applied.last() {
                            prop_assert!(seq > *last);
                        }
                        applied.push(seq);
                    }
                }
            }
        }
    }

    #[test]
    fn burst_inside_window_dispatches_last_content_once(
        edits in prop::collection::vec(("[a-z]{1,6}", 0u64..300), 1..20),
    ) {
        let mut h = Harness::connected();
        let mut now = Duration::ZERO;
        let mut last = String::new();

        for (text, gap_ms) in &edits {
            now += Duration::from_millis(*gap_ms);
            prop_assert!(!h.pipeline.take_due(now));
            last.clone_from(text);
            h.pipeline.schedule(now);
        }

        prop_assert!(!h.pipeline.take_due(now + DEFAULT_COMPILE_DELAY - Duration::from_millis(1)));
        prop_assert!(h.pipeline.take_due(now + DEFAULT_COMPILE_DELAY));
        h.dispatch(&last);
        prop_assert!(!h.pipeline.take_due(now + DEFAULT_COMPILE_DELAY * 10));

        prop_assert_eq!(h.sink.sent.len(), 1);
        prop_assert_eq!(&h.sink.sent[0].1, &last);
    }

    #[test]
    fn duplicate_establish_events_recompile_once(
        steps in prop::collection::vec(link_step_strategy(), 1..60),
    ) {
        let mut h = Harness::connected();
        let mut transitions = 0usize;

        for step in &steps {
            let was_connected = h.link.is_connected();
            let change = match step {
                LinkStep::Connect => h.link_event(&establish_event(false)),
                LinkStep::Reconnect => h.link_event(&establish_event(true)),
                LinkStep::Drop => h.link_event(&ConnectionEvent::Disconnected(
                    DisconnectReason::Dropped("ping timeout".into()),
                )),
            };
            match change {
                LinkChange::Established => {
                    prop_assert!(!was_connected);
                    transitions += 1;
                    let dispatch = h.dispatch("= Hi");
                    prop_assert!(matches!(dispatch, Dispatch::Sent { .. }), "expected Dispatch::Sent");
                }
                LinkChange::Lost => {
                    prop_assert!(was_connected);
                    h.pipeline.forget_outstanding();
                }
                LinkChange::Unchanged => {
                    prop_assert!(matches!(step, LinkStep::Drop) || was_connected);
                }
            }
            prop_assert!(h.link.is_connected() != matches!(step, LinkStep::Drop));
        }

        prop_assert_eq!(h.sink.sent.len(), transitions);
    }
}
