//! Behavioural tests for capability inference and conformance synthesis.
//!
//! Each test builds a declaration table by hand and checks the engine's
//! output. This is verbose but precise — we know exactly what we're testing.

use vireo_ast::{FileId, GenericParamDecl, InheritedEntry, ModuleId, Span, Spanned};
use vireo_types::{Capability, Type};

use crate::advise;
use crate::{
    AggregateDecl, AggregateKind, CapabilityStatus, CaseInfo, ConformanceHost, ConformanceOrigin,
    EngineError, FieldInfo, FixItPlacement, MarkingKind, Session, Severity,
};

// ---------------------------------------------------------------------------
// Helpers for constructing declarations
// ---------------------------------------------------------------------------

const DUP: Capability = Capability::Duplicable;

fn sp(start: u32, end: u32) -> Span {
    Span::new(FileId(0), start, end)
}

fn module() -> ModuleId {
    ModuleId(0)
}

fn field(name: &str, ty: Type, at: u32) -> FieldInfo {
    FieldInfo {
        name: name.to_string(),
        span: sp(at, at + name.len() as u32),
        ty,
    }
}

fn case(name: &str, payload: Option<Type>, at: u32) -> CaseInfo {
    CaseInfo {
        name: name.to_string(),
        span: sp(at, at + name.len() as u32),
        payload,
    }
}

fn decl(name: &str, kind: AggregateKind, at: u32) -> AggregateDecl {
    let name_end = at + name.len() as u32;
    let mut out = AggregateDecl::new(name, kind, module(), sp(at, name_end));
    // Opening brace right after the name, as in `struct Point {`.
    out.braces_start = sp(name_end + 1, name_end + 2);
    out
}

/// A struct explicitly declared `~Duplicable`, for use as a non-conforming
/// member type.
fn define_resource(session: &mut Session) -> vireo_types::DeclId {
    let mut resource = decl("Resource", AggregateKind::Struct, 1000);
    resource.inherited = vec![InheritedEntry::inverse("Duplicable", sp(1010, 1021))];
    resource.fields = vec![field("handle", Type::Int, 1030)];
    session.decls.insert(resource)
}

// ---------------------------------------------------------------------------
// Marking elaboration and resolution
// ---------------------------------------------------------------------------

#[test]
fn explicit_markings_come_from_the_clause() {
    let mut session = Session::new();
    let resource = define_resource(&mut session);

    let marking = session.resolve_marking(resource, DUP);
    assert_eq!(marking.positive.kind(), MarkingKind::None);
    assert_eq!(marking.inverse.kind(), MarkingKind::Explicit);
    assert_eq!(marking.inverse.span(), Some(sp(1010, 1021)));
}

#[test]
fn capabilities_are_marked_independently() {
    let mut session = Session::new();
    let resource = define_resource(&mut session);

    let detach = session.resolve_marking(resource, Capability::Detachable);
    assert_eq!(detach.positive.kind(), MarkingKind::None);
    assert_eq!(detach.inverse.kind(), MarkingKind::None);

    assert_eq!(
        session.lacks_capability(&Type::nominal(resource, vec![]), Capability::Detachable),
        Ok(false)
    );
    assert_eq!(
        session.lacks_capability(&Type::nominal(resource, vec![]), DUP),
        Ok(true)
    );
}

#[test]
fn inverse_marking_is_inferred_from_nonconforming_member() {
    let mut session = Session::new();
    let resource = define_resource(&mut session);

    let mut holder = decl("Holder", AggregateKind::Struct, 0);
    holder.fields = vec![field("r", Type::nominal(resource, vec![]), 20)];
    let holder = session.decls.insert(holder);

    let marking = session.resolve_marking(holder, DUP);
    assert_eq!(marking.positive.kind(), MarkingKind::None);
    assert_eq!(marking.inverse.kind(), MarkingKind::Inferred);
    // The inferred marking points at the member that caused it.
    assert_eq!(marking.inverse.span(), Some(sp(20, 21)));
}

#[test]
fn inverse_marking_is_inferred_from_bare_generic_parameter() {
    let mut session = Session::new();
    let mut boxed = decl("Boxed", AggregateKind::Struct, 0);
    boxed.generic_params = vec![GenericParamDecl::plain("T", sp(6, 7))];
    let id = session.decls.reserve();
    boxed.fields = vec![field("value", Type::param(id, 0, "T"), 20)];
    session.decls.define(id, boxed);

    let marking = session.resolve_marking(id, DUP);
    assert_eq!(marking.inverse.kind(), MarkingKind::Inferred);
}

#[test]
fn bounded_generic_parameter_does_not_infer_inverse() {
    let mut session = Session::new();
    let mut boxed = decl("Boxed", AggregateKind::Struct, 0);
    let mut param = GenericParamDecl::plain("T", sp(6, 7));
    param.bounds = vec![Spanned::new("Duplicable".to_string(), sp(9, 19))];
    boxed.generic_params = vec![param];
    let id = session.decls.reserve();
    boxed.fields = vec![field("value", Type::param(id, 0, "T"), 25)];
    session.decls.define(id, boxed);

    let marking = session.resolve_marking(id, DUP);
    assert_eq!(marking.inverse.kind(), MarkingKind::None);
    let record = session.synthesize_conformance(id, DUP).unwrap().unwrap();
    assert!(!session.conformances.record(record).is_conditional());
}

#[test]
fn classes_never_infer_an_inverse_from_members() {
    let mut session = Session::new();
    let resource = define_resource(&mut session);

    let mut cache = decl("Cache", AggregateKind::Class, 0);
    cache.fields = vec![field("r", Type::nominal(resource, vec![]), 20)];
    let cache = session.decls.insert(cache);

    assert_eq!(session.resolve_marking(cache, DUP).inverse.kind(), MarkingKind::None);
    assert_eq!(
        session.lacks_capability(&Type::nominal(cache, vec![]), DUP),
        Ok(false)
    );
}

// ---------------------------------------------------------------------------
// Synthesis: the four-way marking table
// ---------------------------------------------------------------------------

#[test]
fn unmarked_struct_with_conforming_fields_gets_unconditional_record() {
    let mut session = Session::new();
    let mut point = decl("Point", AggregateKind::Struct, 0);
    point.fields = vec![field("x", Type::Int, 20), field("y", Type::Int, 30)];
    let point = session.decls.insert(point);

    let id = session.synthesize_conformance(point, DUP).unwrap().unwrap();
    let record = session.conformances.record(id);
    assert_eq!(record.origin, ConformanceOrigin::Synthesized);
    assert!(!record.is_conditional());
    assert_eq!(record.host, ConformanceHost::Aggregate);

    assert_eq!(
        session.lacks_capability(&Type::nominal(point, vec![]), DUP),
        Ok(false)
    );
    assert!(session.diagnostics().is_empty());
}

#[test]
fn struct_with_nonconforming_field_gets_no_record() {
    let mut session = Session::new();
    let resource = define_resource(&mut session);

    let mut holder = decl("Holder", AggregateKind::Struct, 0);
    holder.fields = vec![field("r", Type::nominal(resource, vec![]), 20)];
    let holder = session.decls.insert(holder);

    assert_eq!(session.synthesize_conformance(holder, DUP), Ok(None));
    assert_eq!(
        session.lacks_capability(&Type::nominal(holder, vec![]), DUP),
        Ok(true)
    );
}

#[test]
fn explicit_inverse_declines_synthesis() {
    let mut session = Session::new();
    let resource = define_resource(&mut session);

    assert_eq!(session.synthesize_conformance(resource, DUP), Ok(None));
    assert!(session.diagnostics().is_empty());
}

#[test]
fn generic_struct_gets_conditional_record_over_every_parameter() {
    let mut session = Session::new();
    let mut pair = decl("Pair", AggregateKind::Struct, 0);
    pair.generic_params = vec![
        GenericParamDecl::plain("A", sp(5, 6)),
        GenericParamDecl::plain("B", sp(8, 9)),
    ];
    let id = session.decls.reserve();
    pair.fields = vec![
        field("first", Type::param(id, 0, "A"), 20),
        field("second", Type::param(id, 1, "B"), 30),
    ];
    session.decls.define(id, pair);

    let record_id = session.synthesize_conformance(id, DUP).unwrap().unwrap();
    let record = session.conformances.record(record_id).clone();
    assert_eq!(record.origin, ConformanceOrigin::Synthesized);
    let rendered: Vec<String> = record
        .requirements
        .iter()
        .map(|req| format!("{}: {}", req.param.name, req.capability))
        .collect();
    assert_eq!(rendered, vec!["A: Duplicable", "B: Duplicable"]);

    // The record lives in a synthetic extension bound to the extended type.
    let ConformanceHost::SyntheticExtension(ext) = record.host else {
        panic!("expected a synthetic extension host");
    };
    let extension = session.conformances.extension(ext);
    for req in &record.requirements {
        assert!(extension.signature.requires(&req.param, req.capability));
    }
    assert_eq!(
        session.conformances.extended_type(ext),
        Some(&Type::nominal(id, session.decls.identity_args(id)))
    );
}

#[test]
fn conditional_record_requirement_set_is_exactly_the_parameter() {
    let mut session = Session::new();
    let mut boxed = decl("Boxed", AggregateKind::Struct, 0);
    boxed.generic_params = vec![GenericParamDecl::plain("T", sp(6, 7))];
    let id = session.decls.reserve();
    boxed.fields = vec![field("value", Type::param(id, 0, "T"), 20)];
    session.decls.define(id, boxed);

    let record_id = session.synthesize_conformance(id, DUP).unwrap().unwrap();
    let record = session.conformances.record(record_id);
    assert!(record.is_conditional());
    assert_eq!(record.requirements.len(), 1);
    assert_eq!(record.requirements[0].param.name, "T");
    assert_eq!(record.requirements[0].capability, DUP);
}

#[test]
fn conditional_conformance_is_decided_by_the_arguments() {
    let mut session = Session::new();
    let resource = define_resource(&mut session);

    let mut boxed = decl("Boxed", AggregateKind::Struct, 0);
    boxed.generic_params = vec![GenericParamDecl::plain("T", sp(6, 7))];
    let id = session.decls.reserve();
    boxed.fields = vec![field("value", Type::param(id, 0, "T"), 20)];
    session.decls.define(id, boxed);

    assert_eq!(
        session.lacks_capability(&Type::nominal(id, vec![Type::Int]), DUP),
        Ok(false)
    );
    assert_eq!(
        session.lacks_capability(
            &Type::nominal(id, vec![Type::nominal(resource, vec![])]),
            DUP
        ),
        Ok(true)
    );
}

#[test]
fn contradictory_markings_are_diagnosed_once_and_positive_wins() {
    let mut session = Session::new();
    let mut torn = decl("Torn", AggregateKind::Struct, 0);
    torn.inherited = vec![
        InheritedEntry::positive("Duplicable", sp(6, 16)),
        InheritedEntry::inverse("Duplicable", sp(18, 29)),
    ];
    let torn = session.decls.insert(torn);

    let first = session.synthesize_conformance(torn, DUP).unwrap().unwrap();
    let record = session.conformances.record(first);
    assert_eq!(record.origin, ConformanceOrigin::Declared);
    assert!(!record.is_conditional());

    let contradiction_count = |session: &Session| {
        session
            .diagnostics()
            .iter()
            .filter(|d| d.category == crate::Category::ContradictoryMarking)
            .count()
    };
    assert_eq!(contradiction_count(&session), 1);

    // Idempotent: same record back, no duplicate diagnostic.
    let second = session.synthesize_conformance(torn, DUP).unwrap().unwrap();
    assert_eq!(first, second);
    assert_eq!(contradiction_count(&session), 1);
}

// ---------------------------------------------------------------------------
// Structural validation and diagnostics
// ---------------------------------------------------------------------------

#[test]
fn declared_conformance_with_bad_field_is_diagnosed_at_the_member() {
    let mut session = Session::new();
    let resource = define_resource(&mut session);

    let mut claimed = decl("Claimed", AggregateKind::Struct, 0);
    claimed.inherited = vec![InheritedEntry::positive("Duplicable", sp(9, 19))];
    claimed.fields = vec![field("r", Type::nominal(resource, vec![]), 30)];
    let claimed = session.decls.insert(claimed);

    // Explicit wins: the record exists despite the bad field.
    let record = session.synthesize_conformance(claimed, DUP).unwrap().unwrap();
    assert_eq!(session.conformances.record(record).origin, ConformanceOrigin::Declared);

    // ...but validation rejects it, naming the field.
    assert_eq!(session.check_conformance(record), Ok(false));
    let errors: Vec<_> = session
        .diagnostics()
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .collect();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("stored property `r`"));
    assert!(errors[0].message.contains("`Claimed`"));

    // Secondary note points at Resource's explicit inverse marking.
    let note = session
        .diagnostics()
        .iter()
        .find(|d| d.category == crate::Category::MemberPreventsCapability)
        .expect("provenance note");
    assert!(note.message.contains("explicitly declared `~Duplicable`"));
    assert_eq!(note.location.map(|l| (l.start, l.end)), Some((1010, 1021)));
}

#[test]
fn member_note_distinguishes_inferred_inverse() {
    let mut session = Session::new();
    let resource = define_resource(&mut session);

    // Holder's inverse is inferred from its own storage.
    let mut holder = decl("Holder", AggregateKind::Struct, 100);
    holder.fields = vec![field("r", Type::nominal(resource, vec![]), 120)];
    let holder = session.decls.insert(holder);

    let mut outer = decl("Outer", AggregateKind::Struct, 200);
    outer.inherited = vec![InheritedEntry::positive("Duplicable", sp(207, 217))];
    outer.fields = vec![field("h", Type::nominal(holder, vec![]), 230)];
    let outer = session.decls.insert(outer);

    let record = session.synthesize_conformance(outer, DUP).unwrap().unwrap();
    assert_eq!(session.check_conformance(record), Ok(false));

    let note = session
        .diagnostics()
        .iter()
        .find(|d| d.category == crate::Category::MemberPreventsCapability)
        .expect("provenance note");
    assert!(note.message.contains("because of its own storage"));
}

#[test]
fn generic_parameter_offender_gets_note_at_its_declaration() {
    let mut session = Session::new();
    let mut open = decl("Open", AggregateKind::Struct, 0);
    open.inherited = vec![InheritedEntry::positive("Duplicable", sp(6, 16))];
    open.generic_params = vec![GenericParamDecl::plain("T", sp(5, 6))];
    let id = session.decls.reserve();
    open.fields = vec![field("value", Type::param(id, 0, "T"), 30)];
    session.decls.define(id, open);

    let record = session.synthesize_conformance(id, DUP).unwrap().unwrap();
    assert_eq!(session.check_conformance(record), Ok(false));

    let note = session
        .diagnostics()
        .iter()
        .find(|d| d.category == crate::Category::ParameterPreventsCapability)
        .expect("parameter note");
    assert_eq!(note.location.map(|l| (l.start, l.end)), Some((5, 6)));
}

#[test]
fn enum_walk_skips_payloadless_cases_and_reports_exactly_one() {
    let mut session = Session::new();
    let resource = define_resource(&mut session);

    let mut shape = decl("Shape", AggregateKind::Enum, 0);
    shape.inherited = vec![InheritedEntry::positive("Duplicable", sp(7, 17))];
    shape.cases = vec![
        case("empty", None, 20),
        case("holds", Some(Type::nominal(resource, vec![])), 30),
        case("alsoHolds", Some(Type::nominal(resource, vec![])), 40),
    ];
    let shape = session.decls.insert(shape);

    let record = session.synthesize_conformance(shape, DUP).unwrap().unwrap();
    assert_eq!(session.check_conformance(record), Ok(false));

    // Only the first offending payload is reported, never the second.
    let errors: Vec<_> = session
        .diagnostics()
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .collect();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("associated value of enum case `holds`"));
}

#[test]
fn entities_without_storage_always_conform() {
    let mut session = Session::new();

    let empty = session.decls.insert(decl("Empty", AggregateKind::Struct, 0));
    let mut payloadless = decl("Flag", AggregateKind::Enum, 100);
    payloadless.cases = vec![case("on", None, 110), case("off", None, 120)];
    let payloadless = session.decls.insert(payloadless);
    let iface = session
        .decls
        .insert(decl("Drawable", AggregateKind::Interface, 200));

    for id in [empty, payloadless, iface] {
        assert_eq!(session.lacks_capability(&Type::nominal(id, vec![]), DUP), Ok(false));
    }
}

#[test]
fn error_placeholder_members_are_skipped() {
    let mut session = Session::new();
    let mut broken = decl("Broken", AggregateKind::Struct, 0);
    broken.inherited = vec![InheritedEntry::positive("Duplicable", sp(8, 18))];
    broken.fields = vec![field("bad", Type::Error, 20)];
    let broken = session.decls.insert(broken);

    let record = session.synthesize_conformance(broken, DUP).unwrap().unwrap();
    assert_eq!(session.check_conformance(record), Ok(true));
    assert!(!session.has_errors());
}

#[test]
fn reference_storage_wrappers_are_transparent() {
    let mut session = Session::new();
    let resource = define_resource(&mut session);

    let mut weak_holder = decl("WeakHolder", AggregateKind::Struct, 0);
    weak_holder.fields = vec![field(
        "r",
        Type::WeakStorage(Box::new(Type::nominal(resource, vec![]))),
        20,
    )];
    let weak_holder = session.decls.insert(weak_holder);

    // The referent carries the capability question.
    assert_eq!(session.synthesize_conformance(weak_holder, DUP), Ok(None));
    assert_eq!(
        session.lacks_capability(&Type::nominal(weak_holder, vec![]), DUP),
        Ok(true)
    );
}

// ---------------------------------------------------------------------------
// Fix-it text
// ---------------------------------------------------------------------------

#[test]
fn empty_clause_fixit_inserts_at_the_opening_brace() {
    let mut session = Session::new();
    let resource = define_resource(&mut session);
    let mut bag = decl("Bag", AggregateKind::Struct, 0);
    bag.fields = vec![field("r", Type::nominal(resource, vec![]), 20)];
    let bag = session.decls.insert(bag);

    let advice = advise::advise(&session.decls, bag, &Type::nominal(resource, vec![]), DUP);
    let fixit = &advice[0].fixits[0];
    assert_eq!(fixit.text, ": ~Duplicable");
    assert_eq!(fixit.placement, FixItPlacement::Insert);
    // Anchored at the opening brace of `struct Bag {`.
    assert_eq!(fixit.insertion_offset(), 4);
}

#[test]
fn nonempty_clause_fixit_appends_after_the_last_entry() {
    let mut session = Session::new();
    let resource = define_resource(&mut session);
    let mut bag = decl("Bag", AggregateKind::Struct, 0);
    // `struct Bag: Base {` — Base is an ordinary interface, not a capability.
    bag.inherited = vec![InheritedEntry::positive("Base", sp(12, 16))];
    bag.fields = vec![field("r", Type::nominal(resource, vec![]), 30)];
    let bag = session.decls.insert(bag);

    let advice = advise::advise(&session.decls, bag, &Type::nominal(resource, vec![]), DUP);
    let fixit = &advice[0].fixits[0];
    assert_eq!(fixit.text, ", ~Duplicable");
    assert_eq!(fixit.placement, FixItPlacement::InsertAfter);
    assert_eq!(fixit.insertion_offset(), 16);
}

// ---------------------------------------------------------------------------
// The memoized query
// ---------------------------------------------------------------------------

#[test]
fn second_identical_query_is_a_cache_hit() {
    let mut session = Session::new();
    let mut point = decl("Point", AggregateKind::Struct, 0);
    point.fields = vec![field("x", Type::Int, 20)];
    let point = session.decls.insert(point);
    let ty = Type::nominal(point, vec![]);

    assert_eq!(session.lacks_capability(&ty, DUP), Ok(false));
    let after_first = session.cache.stats();
    assert_eq!(after_first.misses, 1);
    assert_eq!(after_first.hits, 0);

    assert_eq!(session.lacks_capability(&ty, DUP), Ok(false));
    let after_second = session.cache.stats();
    assert_eq!(after_second.misses, 1);
    assert_eq!(after_second.hits, 1);
}

#[test]
fn query_rejects_unsubstituted_generic_parameters() {
    let mut session = Session::new();
    let mut boxed = decl("Boxed", AggregateKind::Struct, 0);
    boxed.generic_params = vec![GenericParamDecl::plain("T", sp(6, 7))];
    let id = session.decls.reserve();
    boxed.fields = vec![field("value", Type::param(id, 0, "T"), 20)];
    session.decls.define(id, boxed);

    let err = session
        .lacks_capability(&Type::nominal(id, vec![Type::param(id, 0, "T")]), DUP)
        .unwrap_err();
    assert!(matches!(err, EngineError::UnresolvedParameter { .. }));
}

#[test]
fn pack_expansions_are_queried_through_their_pattern() {
    let mut session = Session::new();
    let resource = define_resource(&mut session);

    let pack = Type::PackExpansion(Box::new(Type::nominal(resource, vec![])));
    assert_eq!(session.lacks_capability(&pack, DUP), Ok(true));

    let benign = Type::PackExpansion(Box::new(Type::Int));
    assert_eq!(session.lacks_capability(&benign, DUP), Ok(false));
}

#[test]
fn tuples_lack_when_any_element_lacks() {
    let mut session = Session::new();
    let resource = define_resource(&mut session);

    let mixed = Type::Tuple(vec![Type::Int, Type::nominal(resource, vec![])]);
    assert_eq!(session.lacks_capability(&mixed, DUP), Ok(true));
    assert_eq!(
        session.lacks_capability(&Type::Tuple(vec![Type::Int, Type::Bool]), DUP),
        Ok(false)
    );
}

#[test]
fn self_referential_declared_conformance_fails_with_a_cycle() {
    let mut session = Session::new();
    let mut node = decl("Node", AggregateKind::Struct, 0);
    node.inherited = vec![InheritedEntry::positive("Duplicable", sp(6, 16))];
    node.generic_params = vec![GenericParamDecl::plain("T", sp(5, 6))];
    let id = session.decls.reserve();
    // `next: Node<T>` — the type involves itself through its parameter.
    node.fields = vec![field(
        "next",
        Type::nominal(id, vec![Type::param(id, 0, "T")]),
        30,
    )];
    session.decls.define(id, node);

    let err = session
        .lacks_capability(&Type::nominal(id, vec![Type::Int]), DUP)
        .unwrap_err();
    assert!(err.is_cycle(), "expected a cycle failure, got {err:?}");

    // The cycle aborts only that query; the session stays usable.
    assert_eq!(session.lacks_capability(&Type::Int, DUP), Ok(false));
}

// ---------------------------------------------------------------------------
// Provenance reports
// ---------------------------------------------------------------------------

#[test]
fn provenance_for_conditional_conformance_lists_the_parameters() {
    let mut session = Session::new();
    let mut boxed = decl("Boxed", AggregateKind::Struct, 0);
    boxed.generic_params = vec![GenericParamDecl::plain("T", sp(6, 7))];
    let id = session.decls.reserve();
    boxed.fields = vec![field("value", Type::param(id, 0, "T"), 20)];
    session.decls.define(id, boxed);

    let report = session.capability_provenance(id, DUP).unwrap();
    assert_eq!(report.status, CapabilityStatus::Conditional);
    assert_eq!(
        report.conditional_requirements.as_deref(),
        Some(&["T: Duplicable".to_string()][..])
    );

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["status"], "conditional");
    assert_eq!(json["inverse_marking"], "inferred");
}

#[test]
fn provenance_names_the_offending_member() {
    let mut session = Session::new();
    let resource = define_resource(&mut session);
    let mut holder = decl("Holder", AggregateKind::Struct, 0);
    holder.fields = vec![field("r", Type::nominal(resource, vec![]), 20)];
    let holder = session.decls.insert(holder);

    let report = session.capability_provenance(holder, DUP).unwrap();
    assert_eq!(report.status, CapabilityStatus::StructurallyLacking);
    assert_eq!(report.offending_member.as_deref(), Some("r"));

    let declined = session.capability_provenance(resource, DUP).unwrap();
    assert_eq!(declined.status, CapabilityStatus::Declined);
    assert_eq!(declined.offending_member, None);
}

#[test]
fn provenance_for_possessed_capability() {
    let mut session = Session::new();
    let mut point = decl("Point", AggregateKind::Struct, 0);
    point.fields = vec![field("x", Type::Int, 20)];
    let point = session.decls.insert(point);

    let report = session.capability_provenance(point, DUP).unwrap();
    assert_eq!(report.status, CapabilityStatus::Possessed);
    assert_eq!(report.conditional_requirements, None);
    assert_eq!(report.offending_member, None);
}
