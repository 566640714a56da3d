//! Engine-level tests driving the full pipeline against a scripted
//! mock synthesizer.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::{
    ComposeConfig, Composer, CompositionStatus, EntryStatus, Error, FailureKind, PcmFormat,
    Respelling, Script, Segment, SynthesisError, SynthesisRequest, SynthesizedClip, Synthesizer,
    ValidationError, VoiceParameters,
};

/// One scripted synthesis attempt.
#[derive(Clone)]
enum Step {
    Ok { bytes: usize, delay: Duration },
    Transient,
    Permanent,
}

/// A synthesizer whose behavior is scripted per segment index.
///
/// Unscripted attempts succeed immediately with a 50ms clip. The clip
/// bytes are filled with `index + 1` so ordering is visible in the
/// composed stream.
#[derive(Default)]
struct MockSynthesizer {
    steps: Mutex<HashMap<usize, VecDeque<Step>>>,
    calls: Mutex<HashMap<usize, u32>>,
    total_calls: AtomicU32,
    in_flight: AtomicU32,
    peak_in_flight: AtomicU32,
}

impl MockSynthesizer {
    fn plan(&self, index: usize, steps: Vec<Step>) {
        self.steps.lock().unwrap().insert(index, steps.into());
    }

    fn calls_for(&self, index: usize) -> u32 {
        *self.calls.lock().unwrap().get(&index).unwrap_or(&0)
    }

    fn total_calls(&self) -> u32 {
        self.total_calls.load(Ordering::SeqCst)
    }

    fn peak_in_flight(&self) -> u32 {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Synthesizer for MockSynthesizer {
    async fn synthesize(
        &self,
        req: &SynthesisRequest,
    ) -> Result<SynthesizedClip, SynthesisError> {
        self.total_calls.fetch_add(1, Ordering::SeqCst);
        *self.calls.lock().unwrap().entry(req.index).or_insert(0) += 1;

        let step = self
            .steps
            .lock()
            .unwrap()
            .get_mut(&req.index)
            .and_then(|queue| queue.pop_front())
            .unwrap_or(Step::Ok {
                bytes: 1600,
                delay: Duration::ZERO,
            });

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(current, Ordering::SeqCst);

        let result = match step {
            Step::Ok { bytes, delay } => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                Ok(SynthesizedClip::from_pcm(
                    vec![req.index as u8 + 1; bytes],
                    PcmFormat::L16_MONO_16K,
                ))
            }
            Step::Transient => Err(SynthesisError::Transient("server error".to_string())),
            Step::Permanent => Err(SynthesisError::Permanent("speaker rejected".to_string())),
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

fn seg(speaker: &str, text: &str) -> Segment {
    Segment {
        speaker_id: speaker.to_string(),
        text: text.to_string(),
        ..Default::default()
    }
}

#[tokio::test(start_paused = true)]
async fn test_all_succeeded_ordering_and_duration() {
    let mock = Arc::new(MockSynthesizer::default());
    // Completion order is reversed: segment 0 finishes last.
    mock.plan(
        0,
        vec![Step::Ok {
            bytes: 3200, // 100ms
            delay: Duration::from_millis(300),
        }],
    );
    mock.plan(
        1,
        vec![Step::Ok {
            bytes: 1600, // 50ms
            delay: Duration::from_millis(100),
        }],
    );
    mock.plan(
        2,
        vec![Step::Ok {
            bytes: 6400, // 200ms
            delay: Duration::from_millis(10),
        }],
    );

    let mut first = seg("A", "Hello");
    first.pause_after_ms = 200;
    let script = Script::new(vec![first, seg("B", "Hi there"), seg("C", "Bye")]);

    let composer = Composer::new(mock.clone());
    let composition = composer
        .compose(&script, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(composition.manifest.status, CompositionStatus::AllSucceeded);
    let indices: Vec<usize> = composition
        .manifest
        .entries
        .iter()
        .map(|e| e.index)
        .collect();
    assert_eq!(indices, vec![0, 1, 2]);

    let audio = composition.audio.unwrap();
    // Clips 100 + 50 + 200 ms plus the configured 200ms pause.
    assert_eq!(audio.duration, Duration::from_millis(550));
    // Script order, not completion order: A, pause, B, C.
    assert_eq!(&audio.data[..3200], vec![1u8; 3200].as_slice());
    assert_eq!(&audio.data[3200..9600], vec![0u8; 6400].as_slice());
    assert_eq!(&audio.data[9600..11200], vec![2u8; 1600].as_slice());
    assert_eq!(&audio.data[11200..], vec![3u8; 6400].as_slice());
}

#[tokio::test]
async fn test_validation_short_circuits_dispatch() {
    let mock = Arc::new(MockSynthesizer::default());

    let mut bad = seg("A", "Hello");
    bad.voice = Some(VoiceParameters {
        pitch: Some(600),
        ..Default::default()
    });
    let script = Script::new(vec![bad, seg("B", "fine")]);

    let composer = Composer::new(mock.clone());
    let err = composer
        .compose(&script, CancellationToken::new())
        .await
        .unwrap_err();

    match err {
        Error::Validation(failures) => {
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].index, 0);
            assert!(matches!(
                failures[0].errors[0],
                ValidationError::OutOfRange { field: "pitch", .. }
            ));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(mock.total_calls(), 0);
}

#[tokio::test]
async fn test_invalid_respelling_short_circuits() {
    let mock = Arc::new(MockSynthesizer::default());

    let mut bad = seg("A", "Say hello");
    bad.respellings = vec![Respelling {
        word: "goodbye".to_string(),
        phonetic: "guud-BY".to_string(),
    }];
    let script = Script::new(vec![bad]);

    let composer = Composer::new(mock.clone());
    let err = composer
        .compose(&script, CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(mock.total_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_transient_failures_retried_to_success() {
    let mock = Arc::new(MockSynthesizer::default());
    mock.plan(
        0,
        vec![
            Step::Transient,
            Step::Transient,
            Step::Ok {
                bytes: 1600,
                delay: Duration::ZERO,
            },
        ],
    );

    let script = Script::new(vec![seg("A", "Hello")]);
    let composer = Composer::new(mock.clone());
    let composition = composer
        .compose(&script, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(composition.manifest.status, CompositionStatus::AllSucceeded);
    assert_eq!(mock.calls_for(0), 3);
}

#[tokio::test(start_paused = true)]
async fn test_retry_budget_exhaustion() {
    let mock = Arc::new(MockSynthesizer::default());
    mock.plan(0, vec![Step::Transient, Step::Transient, Step::Transient]);

    let script = Script::new(vec![seg("A", "Hello")]);
    let composer = Composer::new(mock.clone());
    let composition = composer
        .compose(&script, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(composition.manifest.status, CompositionStatus::TotalFailure);
    assert!(composition.audio.is_none());
    assert!(matches!(
        composition.manifest.entries[0].status,
        EntryStatus::Failed {
            kind: FailureKind::Transient,
            attempts: 3,
            ..
        }
    ));
    assert_eq!(mock.calls_for(0), 3);
}

#[tokio::test]
async fn test_permanent_failure_not_retried() {
    let mock = Arc::new(MockSynthesizer::default());
    mock.plan(0, vec![Step::Permanent]);

    let script = Script::new(vec![seg("A", "Hello")]);
    let composer = Composer::new(mock.clone());
    let composition = composer
        .compose(&script, CancellationToken::new())
        .await
        .unwrap();

    assert!(matches!(
        composition.manifest.entries[0].status,
        EntryStatus::Failed {
            kind: FailureKind::Permanent,
            attempts: 1,
            ..
        }
    ));
    assert_eq!(mock.calls_for(0), 1);
}

#[tokio::test(start_paused = true)]
async fn test_partial_failure_keeps_sibling_audio() {
    let mock = Arc::new(MockSynthesizer::default());
    mock.plan(0, vec![Step::Permanent]);
    mock.plan(
        1,
        vec![Step::Ok {
            bytes: 1600,
            delay: Duration::from_millis(50),
        }],
    );

    let mut second = seg("B", "Hi there");
    second.pause_before_ms = 100;
    let script = Script::new(vec![seg("A", "Hello"), second]);

    let composer = Composer::new(mock.clone());
    let composition = composer
        .compose(&script, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(
        composition.manifest.status,
        CompositionStatus::PartialFailure
    );
    let audio = composition.audio.unwrap();
    // 100ms pause (3200 bytes) + B's clip only; A contributes nothing.
    assert_eq!(audio.data.len(), 3200 + 1600);
    assert_eq!(&audio.data[..3200], vec![0u8; 3200].as_slice());
    assert_eq!(&audio.data[3200..], vec![2u8; 1600].as_slice());
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_returns_no_partial_artifact() {
    let mock = Arc::new(MockSynthesizer::default());
    // Segment 0 completes quickly; segment 1 would take far longer
    // than the cancellation point.
    mock.plan(
        0,
        vec![Step::Ok {
            bytes: 1600,
            delay: Duration::from_millis(10),
        }],
    );
    mock.plan(
        1,
        vec![Step::Ok {
            bytes: 1600,
            delay: Duration::from_secs(600),
        }],
    );

    let script = Script::new(vec![seg("A", "Hello"), seg("B", "Hi")]);
    let cancel = CancellationToken::new();

    let task = {
        let mock = mock.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            Composer::new(mock).compose(&script, cancel).await
        })
    };

    tokio::time::sleep(Duration::from_millis(100)).await;
    cancel.cancel();

    let result = task.await.unwrap();
    assert!(matches!(result, Err(Error::Cancelled)));
}

#[tokio::test(start_paused = true)]
async fn test_in_flight_bound_respected() {
    let mock = Arc::new(MockSynthesizer::default());
    for index in 0..6 {
        mock.plan(
            index,
            vec![Step::Ok {
                bytes: 1600,
                delay: Duration::from_millis(100),
            }],
        );
    }

    let script = Script::new((0..6).map(|i| seg(&format!("s{i}"), "text")));
    let config = ComposeConfig {
        max_in_flight: 2,
        ..Default::default()
    };

    let composer = Composer::with_config(mock.clone(), config);
    let composition = composer
        .compose(&script, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(composition.manifest.status, CompositionStatus::AllSucceeded);
    assert!(mock.peak_in_flight() <= 2, "peak {}", mock.peak_in_flight());
}
