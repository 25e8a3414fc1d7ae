//! End-to-end tests for reader failure handling.
//!
//! A malformed record leaves an empty event, marks the reader failed and
//! ends the stream. Forward references inside one record are resolved once
//! the record is complete.

use hepmc_rs::{AsciiReader, Error, Event, Reader};
use pretty_assertions::assert_eq;

// ============================================================================
// Helpers
// ============================================================================

const HEADER: &str = "HepMC::Version 3.02.06\nHepMC::Asciiv3-START_EVENT_LISTING\n";
const FOOTER: &str = "HepMC::Asciiv3-END_EVENT_LISTING\n";

fn file(body: &str) -> String {
    format!("{HEADER}{body}{FOOTER}")
}

fn read_one(text: &str) -> (AsciiReader<&[u8]>, Event, hepmc_rs::Result<bool>) {
    let mut reader = AsciiReader::new(text.as_bytes());
    let mut evt = Event::new();
    let result = reader.read_event(&mut evt);
    (reader, evt, result)
}

fn assert_failed(text: &str) -> Error {
    let (mut reader, mut evt, result) = read_one(text);
    let err = result.unwrap_err();
    assert!(evt.is_empty());
    assert!(reader.failed());
    assert!(!reader.read_event(&mut evt).unwrap());
    err
}

// ============================================================================
// 1. Malformed lines
// ============================================================================

#[test]
fn test_particle_out_of_sequence() {
    let text = file("E 0 0 2\nP 1 0 11 0 0 1 1 0 4\nP 3 0 11 0 0 1 1 0 4\n");
    let err = assert_failed(&text);
    assert!(matches!(err, Error::Parse { line: 5, .. }), "{err}");
}

#[test]
fn test_malformed_momentum() {
    let text = file("E 0 0 1\nP 1 0 11 0 0 abc 1 0 4\n");
    let err = assert_failed(&text);
    match err {
        Error::Parse { line, message } => {
            assert_eq!(line, 4);
            assert!(message.contains("pz"), "{message}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_truncated_particle_line() {
    let text = file("E 0 0 1\nP 1 0 11 0 0\n");
    assert!(matches!(assert_failed(&text), Error::Parse { .. }));
}

#[test]
fn test_positive_vertex_id() {
    // A vertex line must carry a negative id.
    let text = file("E 0 1 2\nV 1 0 [-1]\nP 1 0 11 0 0 1 1 0 4\nP 2 -1 11 0 0 1 1 0 1\n");
    assert!(matches!(assert_failed(&text), Error::Parse { line: 4, .. }));
}

#[test]
fn test_unterminated_incoming_list() {
    let text = file("E 0 1 1\nP 1 0 11 0 0 1 1 0 4\nV -1 0 [1\n");
    assert!(matches!(assert_failed(&text), Error::Parse { .. }));
}

// ============================================================================
// 2. Declared counts
// ============================================================================

#[test]
fn test_particle_count_mismatch() {
    let text = file("E 0 0 3\nP 1 0 11 0 0 1 1 0 4\nP 2 0 11 0 0 1 1 0 4\n");
    assert!(matches!(assert_failed(&text), Error::Inconsistent(_)));
}

#[test]
fn test_vertex_count_mismatch() {
    let text = file("E 0 2 2\nP 1 0 11 0 0 1 1 0 4\nV -1 0 [1]\nP 2 -1 11 0 0 1 1 0 1\n");
    assert!(matches!(assert_failed(&text), Error::Inconsistent(_)));
}

#[test]
fn test_sparse_vertex_ids() {
    let text = file("E 0 1 2\nP 1 0 11 0 0 1 1 0 4\nV -2 0 [1]\nP 2 -2 11 0 0 1 1 0 1\n");
    assert!(matches!(assert_failed(&text), Error::Inconsistent(_)));
}

#[test]
fn test_weight_count_mismatch() {
    let text = file("W a b\nE 0 0 1\nW 1.0\nP 1 0 11 0 0 1 1 0 4\n");
    let err = assert_failed(&text);
    assert!(matches!(err, Error::WeightCountMismatch { expected: 2, got: 1 }), "{err}");
}

#[test]
fn test_duplicate_weight_names() {
    let text = file("W a a\nE 0 0 0\n");
    assert!(matches!(assert_failed(&text), Error::DuplicateWeightName(_)));
}

#[test]
fn test_huge_declared_count_fails_cleanly() {
    let text = file("E 0 0 18446744073709551615\nP 1 0 11 0 0 1 1 0 4\n");
    assert!(matches!(assert_failed(&text), Error::Inconsistent(_)));

    let text = file("E 0 1000000000000 1\nP 1 0 11 0 0 1 1 0 4\n");
    assert!(matches!(assert_failed(&text), Error::Inconsistent(_)));
}

// ============================================================================
// 3. Forward references
// ============================================================================

#[test]
fn test_forward_references_resolved() {
    // Particle 1 names vertex -1 before it is declared; the vertex lists
    // particle 3 before it is read.
    let text = file(
        "E 0 1 3\n\
         P 1 -1 22 0 0 1 1 0 1\n\
         V -1 0 [3]\n\
         P 2 -1 22 0 0 -1 1 0 1\n\
         P 3 0 25 0 0 0 2 2 2\n",
    );
    let (reader, evt, result) = read_one(&text);
    assert!(result.unwrap());
    assert!(!reader.failed());

    let v = evt.vertex_by_id(-1).unwrap();
    assert_eq!(v.particles_in().map(|p| p.id()).collect::<Vec<_>>(), vec![3]);
    let mut out: Vec<i32> = v.particles_out().map(|p| p.id()).collect();
    out.sort();
    assert_eq!(out, vec![1, 2]);
    assert_eq!(evt.particle_by_id(1).unwrap().parents()[0].pid(), 25);
}

#[test]
fn test_vertex_before_its_particles() {
    let text = file("E 0 1 2\nP 1 -1 11 0 0 1 1 0 1\nV -1 0 [2]\nP 2 0 11 0 0 1 1 0 4\n");
    let (_, evt, result) = read_one(&text);
    assert!(result.unwrap());
    assert_eq!(evt.particle_by_id(2).unwrap().end_vertex().unwrap().id(), -1);
    assert_eq!(evt.particle_by_id(1).unwrap().production_vertex().unwrap().id(), -1);
}

#[test]
fn test_unresolved_vertex_reference_is_dropped() {
    // -3 never appears: the link is lost but the counts still match.
    let text = file("E 0 1 2\nP 1 0 11 0 0 1 1 0 4\nV -1 0 [1]\nP 2 -3 11 0 0 1 1 0 1\n");
    let (_, evt, result) = read_one(&text);
    assert!(result.unwrap());
    assert_eq!(evt.particle_count(), 2);
    assert!(evt.particle_by_id(2).unwrap().production_vertex().unwrap().is_root());
}

// ============================================================================
// 4. Stream state
// ============================================================================

#[test]
fn test_unsupported_format_ends_stream() {
    let text = "HepMC::Version 2.06.09\nHepMC::IO_GenEvent-START_EVENT_LISTING\nE 1 0 0\n";
    let (reader, evt, result) = read_one(text);
    assert!(!result.unwrap());
    assert!(!reader.failed());
    assert!(evt.is_empty());
}

#[test]
fn test_events_iterator_stops_after_error() {
    let text = file(
        "E 1 0 1\nP 1 0 11 0 0 1 1 0 4\n\
         E 2 0 1\nP 1 0 11 0 0 x 1 0 4\n\
         E 3 0 1\nP 1 0 11 0 0 1 1 0 4\n",
    );
    let mut reader = AsciiReader::new(text.as_bytes());
    let results: Vec<_> = reader.events().collect();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].as_ref().unwrap().event_number(), 1);
    assert!(results[1].is_err());
    assert!(reader.failed());
}

#[test]
fn test_blank_and_unknown_lines_are_skipped() {
    let text = file("\nE 4 0 1\nX something else\nP 1 0 11 0 0 1 1 0 4\n\n");
    let (_, evt, result) = read_one(&text);
    assert!(result.unwrap());
    assert_eq!(evt.event_number(), 4);
    assert_eq!(evt.particle_count(), 1);
}

#[test]
fn test_failed_record_reuses_event() {
    let good = file("E 9 0 1\nP 1 0 11 0 0 1 1 0 4\n");
    let mut evt = Event::new();
    AsciiReader::new(good.as_bytes()).read_event(&mut evt).unwrap();
    assert_eq!(evt.particle_count(), 1);

    let bad = file("E 10 0 2\nP 1 0 11 0 0 1 1 0 4\n");
    let mut reader = AsciiReader::new(bad.as_bytes());
    assert!(reader.read_event(&mut evt).is_err());
    assert!(evt.is_empty());
    assert_eq!(evt.event_number(), 0);
}
