use studyroom_forms::FormKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, FormKey)]
enum Tab {
    Members = 10,
    Rooms = 20,
}

fn main() {
    // Indices follow declaration order, not discriminants.
    assert_eq!(Tab::Members.index(), 0);
    assert_eq!(Tab::Rooms.index(), 1);
    assert_eq!(Tab::ALL, &[Tab::Members, Tab::Rooms]);
}
