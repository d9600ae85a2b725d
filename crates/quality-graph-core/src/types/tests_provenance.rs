//! Unit tests for provenance value objects and the Source capability split.

use super::*;

#[test]
fn test_provenance_adders_are_idempotent() {
    let mut prov = Provenance::new();
    prov.add_origin(ElementId::from("src-1"));
    prov.add_origin(ElementId::from("src-1"));
    prov.add_tag(Tag::new("security"));
    prov.add_tag(Tag::new("security"));
    prov.add_annotation(Annotation::new("reviewed", "yes"));
    prov.add_annotation(Annotation::new("reviewed", "yes"));
    assert_eq!(prov.origins.len(), 1);
    assert_eq!(prov.tags.len(), 1);
    assert_eq!(prov.annotations.len(), 1);
}

#[test]
fn test_factor_holds_full_provenance() {
    let factor = Factor::builder("F")
        .originates_from("src-1")
        .originates_from("src-2")
        .tagged_by(Tag::new("critical"))
        .annotation(Annotation::new("owner", "qa-team"))
        .create()
        .unwrap();
    assert_eq!(factor.origins().len(), 2);
    assert_eq!(factor.tags().len(), 1);
    assert_eq!(factor.annotations().len(), 1);
}

#[test]
fn test_source_is_annotated_but_not_a_provenance_holder() {
    // A Source terminates the provenance chain: the type has no origins
    // field and no `originates_from` on its builder.
    let source = Source::builder("pmd")
        .tagged_by(Tag::new("static-analysis"))
        .annotation(Annotation::new("version", "6.55"))
        .create()
        .unwrap();
    assert_eq!(source.tags().len(), 1);
    assert_eq!(source.annotations().len(), 1);

    fn assert_annotated<T: Annotated>(_: &T) {}
    assert_annotated(&source);
}

#[test]
fn test_element_id_display_and_from() {
    let id = ElementId::from("abc");
    assert_eq!(id.to_string(), "abc");
    assert_eq!(id.as_str(), "abc");
}

#[test]
fn test_model_types_serde_round_trip() {
    let factor = Factor::builder("Reliability")
        .kind(FactorKind::QualityAspect)
        .originates_from("iso-25010")
        .create()
        .unwrap();
    let json = serde_json::to_string(&factor).unwrap();
    let back: Factor = serde_json::from_str(&json).unwrap();
    assert_eq!(factor, back);
}
