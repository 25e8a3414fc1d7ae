//! End-to-end tests: write events as Asciiv3 text and read them back.
//!
//! A written-then-read event must have the same particle and vertex counts,
//! the same momenta and statuses, the same attribute triples and the same
//! run-level header.

use std::sync::Arc;

use hepmc_rs::{
    AsciiReader, AsciiWriter, Attribute, CrossSection, Event, FourVector, LengthUnit, MomentumUnit,
    ParticleData, Reader, RunInfo, ToolInfo, VertexData, Writer,
};
use pretty_assertions::assert_eq;

// ============================================================================
// Helpers
// ============================================================================

fn run_info() -> Arc<RunInfo> {
    let mut run = RunInfo::new();
    run.set_weight_names(vec!["nominal".into(), "muR_up".into()]).unwrap();
    run.add_tool(ToolInfo::new("Pythia", "8.310", "shower\nand hadronization"));
    run.add_attribute("ecm", 13000.0f64);
    run.add_attribute("comment", "two words");
    Arc::new(run)
}

/// pp -> Z g, Z -> mu mu, with a displaced vertex and attributes on every
/// kind of owner.
fn sample_event(run: &Arc<RunInfo>, number: i32) -> Event {
    let mut evt = Event::with_run_info(Arc::clone(run), MomentumUnit::Gev, LengthUnit::Mm);
    evt.set_event_number(number);
    evt.weights_mut().copy_from_slice(&[0.75, 1.0 / 3.0]);

    let p1 = evt.create_particle(ParticleData::new(FourVector::new(0.0, 0.0, 6500.0, 6500.0), 2212, 4).with_generated_mass(0.938272));
    let p2 = evt.create_particle(ParticleData::new(FourVector::new(0.0, 0.0, -6500.0, 6500.0), 2212, 4).with_generated_mass(0.938272));
    let z = evt.create_particle(ParticleData::new(FourVector::new(1.25, -3.5, 40.0, 101.2), 23, 2));
    let g = evt.create_particle(ParticleData::new(FourVector::new(-1.25, 3.5, 12.0, 13.1), 21, 1));
    let mu1 = evt.create_particle(ParticleData::new(FourVector::new(30.1, 2.2, 10.0, 50.0), 13, 1));
    let mu2 = evt.create_particle(ParticleData::new(FourVector::new(-28.85, -5.7, 30.0, 51.2), -13, 1));

    let hard = evt.create_vertex(VertexData::new(FourVector::new(0.0, 0.0, 0.01, 0.02)).with_status(3));
    evt.add_particle_in(hard, p1);
    evt.add_particle_in(hard, p2);
    evt.add_particle_out(hard, z);
    evt.add_particle_out(hard, g);
    evt.add_vertex(hard);

    let decay = evt.create_vertex(VertexData::default());
    evt.add_particle_in(decay, z);
    evt.add_particle_out(decay, mu1);
    evt.add_particle_out(decay, mu2);
    evt.add_vertex(decay);

    evt.add_attribute("alphaQCD", 0.118f64, 0);
    evt.add_attribute("signal_process_id", 101i32, 0);
    evt.add_particle_attribute(z, "flow1", 501i32);
    evt.add_vertex_attribute(hard, "tag", "hard scatter");
    evt.set_cross_section(CrossSection::new(1.5e3, 12.5, 100, 120));
    evt
}

fn write_all(events: &[Event]) -> String {
    let mut writer = AsciiWriter::new(Vec::new());
    for evt in events {
        writer.write_event(evt).unwrap();
    }
    String::from_utf8(writer.into_inner().unwrap()).unwrap()
}

fn momenta(evt: &Event) -> Vec<(i32, i32, i32, FourVector, f64)> {
    evt.particles()
        .map(|p| (p.id(), p.pid(), p.status(), p.momentum(), p.generated_mass()))
        .collect()
}

fn attribute_triples(evt: &Event) -> Vec<(String, i32, String)> {
    evt.attributes()
        .snapshot()
        .into_iter()
        .map(|(name, owner, att)| (name, owner, att.to_string()))
        .collect()
}

// ============================================================================
// 1. Single event
// ============================================================================

#[test]
fn test_event_survives_round_trip() {
    let run = run_info();
    let original = sample_event(&run, 7);
    let text = write_all(std::slice::from_ref(&original));

    let mut reader = AsciiReader::new(text.as_bytes());
    let mut evt = Event::new();
    assert!(reader.read_event(&mut evt).unwrap());

    assert_eq!(evt.event_number(), 7);
    assert_eq!(evt.particle_count(), original.particle_count());
    assert_eq!(evt.vertex_count(), original.vertex_count());
    assert_eq!(momenta(&evt), momenta(&original));
    assert_eq!(evt.weights(), original.weights());
    assert_eq!(attribute_triples(&evt), attribute_triples(&original));
    assert!(!reader.read_event(&mut evt).unwrap());
    assert!(!reader.failed());
}

#[test]
fn test_topology_survives_round_trip() {
    let run = run_info();
    let original = sample_event(&run, 1);
    let text = write_all(std::slice::from_ref(&original));

    let mut evt = Event::new();
    AsciiReader::new(text.as_bytes()).read_event(&mut evt).unwrap();

    let hard = evt.vertex_by_id(-1).unwrap();
    assert_eq!(hard.status(), 3);
    assert_eq!(hard.position(), FourVector::new(0.0, 0.0, 0.01, 0.02));
    assert_eq!(hard.particles_in().map(|p| p.id()).collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(hard.particles_out().map(|p| p.id()).collect::<Vec<_>>(), vec![3, 4]);

    // The decay vertex was written implicitly and inherits its position.
    let mu = evt.particle_by_id(5).unwrap();
    let decay = mu.production_vertex().unwrap();
    assert_eq!(decay.id(), -2);
    assert!(!decay.has_set_position());
    assert_eq!(decay.position(), FourVector::new(0.0, 0.0, 0.01, 0.02));
    assert_eq!(mu.parents().iter().map(|p| p.pid()).collect::<Vec<_>>(), vec![23]);
    assert_eq!(evt.beams().map(|p| p.id()).collect::<Vec<_>>(), vec![1, 2]);
}

#[test]
fn test_implicit_vertex_line_format() {
    let run = run_info();
    let text = write_all(&[sample_event(&run, 1)]);
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.iter().filter(|l| l.starts_with("V ")).count(), 1);
    assert!(lines.contains(&"V -1 3 [1,2] @ 0.0000000000000000e0 0.0000000000000000e0 1.0000000000000000e-2 2.0000000000000000e-2"));
    assert!(lines.iter().any(|l| l.starts_with("P 5 3 13 ")));
    assert!(lines.contains(&"E 1 2 6"));
    assert!(lines.contains(&"A -1 tag hard scatter"));
}

// ============================================================================
// 2. Run info
// ============================================================================

#[test]
fn test_run_info_survives_round_trip() {
    let run = run_info();
    let text = write_all(&[sample_event(&run, 1)]);
    assert!(text.contains("W nominal muR_up\n"));
    assert!(text.contains("T Pythia\\|8.310\\|shower\\|and hadronization\n"));

    let mut reader = AsciiReader::new(text.as_bytes());
    let mut evt = Event::new();
    reader.read_event(&mut evt).unwrap();

    let read = reader.run_info();
    assert_eq!(read.weight_names(), run.weight_names());
    assert_eq!(read.tools(), run.tools());
    assert_eq!(read.attribute::<f64>("ecm"), Some(13000.0));
    assert_eq!(read.attribute_as_string("comment").as_deref(), Some("two words"));

    assert!(Arc::ptr_eq(evt.run_info().unwrap(), read));
    assert_eq!(evt.weight("muR_up"), Some(1.0 / 3.0));
    // Event-level lookups fall back to the run info.
    assert_eq!(evt.attribute::<f64>("ecm", 0), Some(13000.0));
}

#[test]
fn test_cross_section_survives_round_trip() {
    let run = run_info();
    let text = write_all(&[sample_event(&run, 1)]);
    let mut evt = Event::new();
    AsciiReader::new(text.as_bytes()).read_event(&mut evt).unwrap();

    let cs = evt.cross_section().unwrap();
    assert_eq!(cs.accepted_events, 100);
    assert_eq!(cs.attempted_events, 120);
    // Padded to one entry per weight on materialization.
    assert_eq!(cs.cross_sections(), &[1.5e3, 1.5e3]);
    assert_eq!(cs.xsec_err_named("muR_up", evt.run_info().unwrap()), Some(12.5));
}

// ============================================================================
// 3. Several events
// ============================================================================

#[test]
fn test_multiple_events_in_order() {
    let run = run_info();
    let events: Vec<Event> = (1..=3).map(|n| sample_event(&run, n)).collect();
    let text = write_all(&events);
    assert_eq!(text.matches("\nW nominal").count(), 1);

    let mut reader = AsciiReader::new(text.as_bytes());
    let read: Vec<Event> = reader.events().collect::<Result<_, _>>().unwrap();
    assert_eq!(read.iter().map(Event::event_number).collect::<Vec<_>>(), vec![1, 2, 3]);
    for (a, b) in read.iter().zip(&events) {
        assert_eq!(momenta(a), momenta(b));
    }
}

#[test]
fn test_skip_then_read() {
    let run = run_info();
    let events: Vec<Event> = (10..15).map(|n| sample_event(&run, n)).collect();
    let text = write_all(&events);

    let mut reader = AsciiReader::new(text.as_bytes());
    assert!(reader.skip(3).unwrap());
    assert_eq!(reader.run_info().weight_names().len(), 2);

    let mut evt = Event::new();
    assert!(reader.read_event(&mut evt).unwrap());
    assert_eq!(evt.event_number(), 13);
    assert!(reader.read_event(&mut evt).unwrap());
    assert_eq!(evt.event_number(), 14);
    assert!(!reader.read_event(&mut evt).unwrap());
    assert!(!reader.skip(1).unwrap());
}

#[test]
fn test_writer_trait_objects() {
    let run = run_info();
    let mut writer = AsciiWriter::new(Vec::new());
    {
        let sink: &mut dyn Writer = &mut writer;
        sink.set_run_info(Arc::clone(&run));
        sink.write_event(&sample_event(&run, 1)).unwrap();
        sink.close().unwrap();
        sink.close().unwrap();
        assert!(sink.write_event(&Event::new()).is_err());
    }
    let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();
    assert_eq!(text.matches("END_EVENT_LISTING").count(), 1);
}

// ============================================================================
// 4. Units, positions and empty events
// ============================================================================

#[test]
fn test_units_and_event_position() {
    let mut evt = Event::with_units(MomentumUnit::Mev, LengthUnit::Cm);
    let p = evt.create_particle(ParticleData::new(FourVector::new(1.0, 2.0, 3.0, 4.0), 11, 1));
    evt.add_particle(p);
    evt.shift_position_to(FourVector::new(0.5, 0.0, 0.0, 1.0));

    let text = write_all(&[evt]);
    assert!(text.contains("\nU MEV CM\n"));

    let mut back = Event::new();
    AsciiReader::new(text.as_bytes()).read_event(&mut back).unwrap();
    assert_eq!(back.momentum_unit(), MomentumUnit::Mev);
    assert_eq!(back.length_unit(), LengthUnit::Cm);
    assert_eq!(back.event_pos(), FourVector::new(0.5, 0.0, 0.0, 1.0));
    assert_eq!(back.particle_by_id(1).unwrap().momentum(), FourVector::new(1.0, 2.0, 3.0, 4.0));
}

#[test]
fn test_empty_event_round_trip() {
    let text = write_all(&[Event::new()]);
    let mut evt = Event::new();
    let mut reader = AsciiReader::new(text.as_bytes());
    assert!(reader.read_event(&mut evt).unwrap());
    assert!(evt.is_empty());
    assert!(!reader.read_event(&mut evt).unwrap());
}

#[test]
fn test_escaped_attribute_value() {
    let mut evt = Event::new();
    evt.add_attribute("note", Attribute::String("first\nsecond \\ third".into()), 0);
    let text = write_all(&[evt]);
    assert!(text.contains("A 0 note first\\|second \\\\ third\n"));

    let mut back = Event::new();
    AsciiReader::new(text.as_bytes()).read_event(&mut back).unwrap();
    assert_eq!(back.attribute::<String>("note", 0).as_deref(), Some("first\nsecond \\ third"));
}
