use rimebench::charset::Charset;
use rimebench::codegen::Encoder;
use rimebench::driver::{SimulationDriver, SupplementaryResult};
use rimebench::engine::{CommitLine, EngineConsole};
use rimebench::error::{RbResult, RimeBenchError};
use rimebench::mapping::MappingTable;
use rimebench::segment::segment;
use rimebench::stats::{self, AccuracyStats};
use std::cell::RefCell;
use std::collections::VecDeque;

/// Scripted stand-in for the console process: returns queued commit logs in
/// submission order, remembering what it was asked to type.
struct ScriptedEngine {
    responses: RefCell<VecDeque<Vec<CommitLine>>>,
    submissions: RefCell<Vec<Vec<String>>>,
}

impl ScriptedEngine {
    fn new(responses: Vec<Vec<CommitLine>>) -> Self {
        Self {
            responses: RefCell::new(responses.into()),
            submissions: RefCell::new(Vec::new()),
        }
    }
}

impl EngineConsole for ScriptedEngine {
    fn submit(&self, code_lines: &[String], _label: &str) -> RbResult<Vec<CommitLine>> {
        self.submissions.borrow_mut().push(code_lines.to_vec());
        self.responses
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| RimeBenchError::Engine {
                label: "scripted".to_string(),
                detail: "no scripted response left".to_string(),
            })
    }
}

fn commits(texts: &[&str]) -> Vec<CommitLine> {
    texts.iter().map(|t| CommitLine::new(*t)).collect()
}

fn test_mapping() -> MappingTable {
    let mut t = MappingTable::default();
    for (ch, code) in [('春', "ch"), ('天', "ti"), ('来', "la"), ('了', "le")] {
        t.insert(ch, code.to_string());
    }
    t
}

fn encode(mapping: &MappingTable, lines: &[String]) -> rimebench::codegen::CodeStream {
    let mut audit = Vec::new();
    Encoder::new(mapping)
        .encode_article("test.txt", lines, &mut audit)
        .unwrap()
}

#[test]
fn clean_pass_queues_nothing() {
    let mapping = test_mapping();
    let ready = vec!["春天".to_string(), "来了".to_string()];
    let stream = encode(&mapping, &ready);

    let engine = ScriptedEngine::new(vec![commits(&["春天", "来了"])]);
    let mut driver = SimulationDriver::new(&engine);
    let log = driver.run_first_pass("test.txt", &ready, &stream).unwrap();

    assert_eq!(log.len(), 2);
    assert!(driver.batch().is_empty());
    assert!(driver.run_final_pass().unwrap().is_empty());
    // No supplementary submission happened.
    assert_eq!(engine.submissions.borrow().len(), 1);
}

#[test]
fn corrupted_line_is_retried_by_position() {
    let mapping = test_mapping();
    let ready = vec![
        "春天".to_string(),
        "来了".to_string(),
        "春天来了".to_string(),
    ];
    let stream = encode(&mapping, &ready);

    let engine = ScriptedEngine::new(vec![
        commits(&["春天", "来了", "春\u{FFFD}来了"]),
        commits(&["春天来了"]),
    ]);
    let mut driver = SimulationDriver::new(&engine);
    driver.run_first_pass("test.txt", &ready, &stream).unwrap();

    // Line 3 (1-based) was corrupted: its ready and code lines are queued.
    assert_eq!(driver.batch().ready_lines, vec!["春天来了".to_string()]);
    assert_eq!(driver.batch().code_lines, vec![stream.lines[2].clone()]);

    let sup = driver.run_final_pass().unwrap();
    assert_eq!(sup.get("春天来了").map(String::as_str), Some("春天来了"));

    // The retry submission replayed exactly the corrupted code line.
    let subs = engine.submissions.borrow();
    assert_eq!(subs.len(), 2);
    assert_eq!(subs[1], vec![stream.lines[2].clone()]);
}

#[test]
fn recovery_restores_exactly_one_correct_line() {
    let mapping = test_mapping();
    let ready = vec![
        "春天".to_string(),
        "来了".to_string(),
        "春天来了".to_string(),
    ];
    let stream = encode(&mapping, &ready);
    let log = commits(&["春天", "来了", "春\u{FFFD}来了"]);

    // Without recovery the corrupted line scores per-character.
    let (without, _) =
        stats::score("test.txt", &ready, &log, &SupplementaryResult::new()).unwrap();

    // With the supplementary result it scores as fully correct.
    let engine = ScriptedEngine::new(vec![log.clone(), commits(&["春天来了"])]);
    let mut driver = SimulationDriver::new(&engine);
    driver.run_first_pass("test.txt", &ready, &stream).unwrap();
    let sup = driver.run_final_pass().unwrap();
    let (with, _) = stats::score("test.txt", &ready, &log, &sup).unwrap();

    assert_eq!(with.lines_correct, without.lines_correct + 1);
    assert_eq!(with.chars_correct, with.chars);
}

#[test]
fn residual_corruption_after_retry_is_not_fatal() {
    let mapping = test_mapping();
    let ready = vec!["春天来了".to_string()];
    let stream = encode(&mapping, &ready);

    let engine = ScriptedEngine::new(vec![
        commits(&["春\u{FFFD}来了"]),
        commits(&["春\u{FFFD}来了"]),
    ]);
    let mut driver = SimulationDriver::new(&engine);
    driver.run_first_pass("test.txt", &ready, &stream).unwrap();
    let sup = driver.run_final_pass().unwrap();

    // The still-corrupted recovery is recorded and simply scores low.
    let log = commits(&["春\u{FFFD}来了"]);
    let (s, unmatched) = stats::score("test.txt", &ready, &log, &sup).unwrap();
    assert_eq!(s.lines_correct, 0);
    assert_eq!(s.chars_correct, 3);
    assert!(unmatched.is_empty());
}

#[test]
fn commit_count_mismatch_aborts_the_pass() {
    let mapping = test_mapping();
    let ready = vec!["春天".to_string(), "来了".to_string()];
    let stream = encode(&mapping, &ready);

    let engine = ScriptedEngine::new(vec![commits(&["春天"])]);
    let mut driver = SimulationDriver::new(&engine);
    let err = driver
        .run_first_pass("test.txt", &ready, &stream)
        .unwrap_err();
    assert!(matches!(
        err,
        RimeBenchError::LineCountMismatch {
            input: 2,
            output: 1,
            ..
        }
    ));
}

#[test]
fn ready_code_pairing_is_checked_before_submission() {
    let mapping = test_mapping();
    let ready = vec!["春天".to_string()];
    let stream = encode(&mapping, &["春天".to_string(), "来了".to_string()]);

    let engine = ScriptedEngine::new(vec![]);
    let mut driver = SimulationDriver::new(&engine);
    let err = driver
        .run_first_pass("test.txt", &ready, &stream)
        .unwrap_err();
    assert!(matches!(
        err,
        RimeBenchError::LineCountMismatch {
            input: 1,
            output: 2,
            ..
        }
    ));
    // The engine was never invoked with an unpaired stream.
    assert!(engine.submissions.borrow().is_empty());
}

#[test]
fn segment_encode_simulate_score_end_to_end() {
    let charset = Charset::from_chars("春天来了".chars());
    let mapping = test_mapping();
    let article = segment("春天来了。春天！", &charset, &mapping, 2);
    assert_eq!(article.ready_lines, vec!["春天来了", "春天"]);

    let stream = encode(&mapping, &article.ready_lines);
    assert_eq!(stream.lines, vec!["chtilale1", "chti1"]);

    let engine = ScriptedEngine::new(vec![commits(&["春天来了", "春天"])]);
    let mut driver = SimulationDriver::new(&engine);
    let log = driver
        .run_first_pass("e2e.txt", &article.ready_lines, &stream)
        .unwrap();
    let sup = driver.run_final_pass().unwrap();

    let (s, unmatched) = stats::score("e2e.txt", &article.ready_lines, &log, &sup).unwrap();
    let mut total = AccuracyStats::default();
    total.absorb(&s);
    assert_eq!(total.lines, 2);
    assert_eq!(total.lines_correct, 2);
    assert_eq!(total.chars, 6);
    assert_eq!(total.chars_correct, 6);
    assert!(unmatched.is_empty());
}
