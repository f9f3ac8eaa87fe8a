use manuscript_common::ManualClock;
use regex::Regex;

use super::*;
use crate::manuscript::Entity;
use crate::text::TextBuffer;

fn path(s: &str) -> Path {
    Path::parse(s).unwrap()
}

fn manuscript() -> Manuscript {
    Manuscript::new()
        .with_field("title", Node::text("Draft"))
        .with_field("bio", Node::text(""))
        .with_field("country", Node::scalar("UK"))
        .with_field(
            "affiliations",
            Node::list([
                Entity::with_id("A").with_field("label", Node::scalar("Oxford")),
                Entity::with_id("B").with_field("label", Node::scalar("MIT")),
                Entity::with_id("C").with_field("label", Node::scalar("ETH")),
            ]),
        )
}

fn text_of(m: &Manuscript, p: &str) -> String {
    TextBuffer::to_string(m.get(&path(p)).unwrap().as_text().unwrap())
}

fn order_of(m: &Manuscript, p: &str) -> Vec<String> {
    m.get(&path(p))
        .unwrap()
        .as_list()
        .unwrap()
        .iter()
        .map(|e| e.id.to_string())
        .collect()
}

fn insert(m: &Manuscript, p: &str, pos: usize, s: &str, clock: &ManualClock) -> Change {
    let doc = m.get(&path(p)).unwrap().as_text().unwrap();
    let edit = TextEdit::builder(doc).insert(pos, s).unwrap().build();
    Change::text(clock, path(p), edit)
}

fn ids(v: &[&str]) -> Vec<SmolStr> {
    v.iter().map(|s| SmolStr::new(s)).collect()
}

fn reorder(clock: &ManualClock, old: &[&str], new: &[&str]) -> Result<Change, ChangeError> {
    Change::rearrange(clock, path("affiliations"), ids(old), ids(new))
}

#[test]
fn test_scalar_round_trip() {
    let clock = ManualClock::new(1);
    let m = manuscript();
    let c = Change::scalar(&clock, path("country"), Node::scalar("UK"), Node::scalar("US"));
    let applied = c.apply(&m).unwrap();
    assert_eq!(applied.get(&path("country")).unwrap(), &Node::scalar("US"));
    assert_eq!(c.rollback(&applied).unwrap(), m);
}

#[test]
fn test_scalar_on_entity_field() {
    let clock = ManualClock::new(1);
    let m = manuscript();
    let c = Change::scalar(
        &clock,
        path("affiliations.2.label"),
        Node::scalar("ETH"),
        Node::scalar("EPFL"),
    );
    let applied = c.apply(&m).unwrap();
    assert_eq!(
        applied.get(&path("affiliations.2.label")).unwrap(),
        &Node::scalar("EPFL")
    );
    assert_eq!(c.rollback(&applied).unwrap(), m);
}

#[test]
fn test_scalar_empty_when_values_equal() {
    let clock = ManualClock::new(1);
    let same = Change::scalar(&clock, path("title"), Node::text("a"), Node::text("a"));
    assert!(same.is_empty());
    let differs = Change::scalar(&clock, path("title"), Node::text("a"), Node::text("b"));
    assert!(!differs.is_empty());
}

#[test]
fn test_text_round_trip() {
    let clock = ManualClock::new(1);
    let m = manuscript();
    let c = insert(&m, "title", 5, " one", &clock);
    let applied = c.apply(&m).unwrap();
    assert_eq!(text_of(&applied, "title"), "Draft one");
    assert_eq!(c.rollback(&applied).unwrap(), m);
}

#[test]
fn test_text_change_on_scalar_is_kind_mismatch() {
    let clock = ManualClock::new(1);
    let m = manuscript();
    let edit = TextEdit::builder(&crate::TextDocument::new(""))
        .insert(0, "x")
        .unwrap()
        .build();
    let c = Change::text(&clock, path("country"), edit);
    assert!(matches!(
        c.apply(&m),
        Err(ChangeError::KindMismatch {
            expected: "text",
            found: "scalar",
            ..
        })
    ));
}

#[test]
fn test_rearrange_scenario() {
    let clock = ManualClock::new(1);
    let m = manuscript();
    let c = Change::rearrange(
        &clock,
        path("affiliations"),
        ids(&["A", "B", "C"]),
        ids(&["C", "A", "B"]),
    )
    .unwrap();
    let applied = c.apply(&m).unwrap();
    assert_eq!(order_of(&applied, "affiliations"), ["C", "A", "B"]);
    let back = c.rollback(&applied).unwrap();
    assert_eq!(order_of(&back, "affiliations"), ["A", "B", "C"]);
    assert_eq!(back, m);
}

#[test]
fn test_rearrange_rejects_different_id_sets() {
    let clock = ManualClock::new(1);
    assert!(reorder(&clock, &["A", "B"], &["A", "C"]).is_err());
    assert!(reorder(&clock, &["A", "A"], &["A", "A"]).is_err());
}

#[test]
fn test_rearrange_unknown_id_fails_and_unlisted_go_last() {
    let clock = ManualClock::new(1);
    let m = manuscript();
    let unknown = reorder(&clock, &["Z"], &["Z"]).unwrap();
    assert!(matches!(unknown.apply(&m), Err(ChangeError::OrderMismatch { .. })));

    let partial =
        reorder(&clock, &["B", "C"], &["C", "B"]).unwrap();
    let applied = partial.apply(&m).unwrap();
    assert_eq!(order_of(&applied, "affiliations"), ["C", "B", "A"]);
}

#[test]
fn test_rearrange_empty_when_orders_equal() {
    let clock = ManualClock::new(1);
    let c = reorder(&clock, &["A", "B"], &["A", "B"]).unwrap();
    assert!(c.is_empty());
}

#[test]
fn test_batch_applies_in_order_and_rolls_back_in_reverse() {
    let clock = ManualClock::new(1);
    let m = manuscript();
    let c1 = insert(&m, "bio", 0, "A", &clock);
    let after_c1 = c1.apply(&m).unwrap();
    let c2 = insert(&after_c1, "bio", 1, "B", &clock);

    let batch = Change::batch(&clock, [c1.clone(), c2.clone()]);
    let applied = batch.apply(&m).unwrap();
    assert_eq!(applied, c2.apply(&c1.apply(&m).unwrap()).unwrap());
    assert_eq!(text_of(&applied, "bio"), "AB");

    // Undoing c1 first would shift "B" to 0, where c2's inverse no longer finds it.
    assert_eq!(batch.rollback(&applied).unwrap(), m);
}

#[test]
fn test_nested_batch_round_trip() {
    let clock = ManualClock::new(1);
    let m = manuscript();
    let inner = Change::batch(
        &clock,
        [
            Change::scalar(&clock, path("country"), Node::scalar("UK"), Node::scalar("FR")),
            reorder(&clock, &["A", "B", "C"], &["B", "C", "A"]).unwrap(),
        ],
    );
    let outer = Change::batch(&clock, [inner, insert(&m, "title", 0, "New ", &clock)]);
    assert_eq!(outer.leaf_count(), 3);
    let applied = outer.apply(&m).unwrap();
    assert_eq!(text_of(&applied, "title"), "New Draft");
    assert_eq!(outer.rollback(&applied).unwrap(), m);
}

#[test]
fn test_batch_filters_empty_children() {
    let clock = ManualClock::new(1);
    let m = manuscript();
    let doc = m.get(&path("bio")).unwrap().as_text().unwrap();
    let selection_only = Change::text(
        &clock,
        path("bio"),
        TextEdit::select(doc, crate::Selection::collapsed(0)),
    );
    let noop = Change::scalar(&clock, path("country"), Node::scalar("UK"), Node::scalar("UK"));
    let batch = Change::batch(&clock, [selection_only, noop]);
    assert!(batch.is_empty());
    let Change::Batch(inner) = &batch else {
        panic!("expected a batch");
    };
    assert_eq!(inner.len(), 0);
}

#[test]
fn test_batch_is_atomic() {
    let clock = ManualClock::new(1);
    let m = manuscript();
    let good = Change::scalar(&clock, path("country"), Node::scalar("UK"), Node::scalar("US"));
    let bad = Change::scalar(&clock, path("missing.field"), Node::scalar(1), Node::scalar(2));
    let batch = Change::batch(&clock, [good, bad]);
    match batch.apply(&m) {
        Err(ChangeError::BatchChild { index, source }) => {
            assert_eq!(index, 1);
            assert!(matches!(*source, ChangeError::PathResolution { .. }));
        }
        other => panic!("expected batch failure, got {other:?}"),
    }
    // The input was never touched.
    assert_eq!(m.get(&path("country")).unwrap(), &Node::scalar("UK"));
}

#[test]
fn test_is_path_affected() {
    let clock = ManualClock::new(1);
    let m = manuscript();
    let batch = Change::batch(
        &clock,
        [
            Change::scalar(&clock, path("country"), Node::scalar("UK"), Node::scalar("US")),
            insert(&m, "bio", 0, "x", &clock),
        ],
    );
    assert!(batch.is_path_affected(&Regex::new("^country").unwrap()));
    assert!(batch.is_path_affected(&Regex::new("^bio$").unwrap()));
    assert!(!batch.is_path_affected(&Regex::new("^abstract").unwrap()));
}

#[test]
fn test_metadata_accessors() {
    let clock = ManualClock::new(42);
    let c = Change::scalar(&clock, path("country"), Node::scalar("UK"), Node::scalar("US"));
    assert_eq!(c.timestamp(), 42);
    assert_eq!(c.path().map(Path::as_str), Some("country"));
    assert_eq!(c.kind().as_str(), "scalar");
    let batch = Change::batch(&clock, [c]);
    assert_eq!(batch.path(), None);
    assert_eq!(ChangeKind::from_str("rearranging"), Some(ChangeKind::Rearrange));
    assert_eq!(ChangeKind::from_str("move"), None);
}
