use studyroom_forms::FormKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, FormKey)]
enum Nothing {}

fn main() {
    assert!(Nothing::ALL.is_empty());
}
