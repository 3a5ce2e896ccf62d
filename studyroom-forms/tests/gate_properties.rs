use proptest::prelude::*;
use studyroom_forms::forms::recruit::{RecruitField, RecruitForm, RecruitTab};
use studyroom_forms::rules::FnRule;
use studyroom_forms::{
    FieldValue, FormContext, FormCoordinator, FormKey, OutboundRequest, Verdict, VerificationOutcome,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, FormKey)]
enum Field {
    A,
    B,
    C,
    Handle,
    Note,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, FormKey)]
enum Step {
    First,
    Second,
}

const REQUIRED_FIELDS: [Field; 3] = [Field::A, Field::B, Field::C];
const STEPS: [Step; 2] = [Step::First, Step::Second];

fn ok_rule() -> FnRule<fn(&FieldValue) -> Verdict> {
    fn check(value: &FieldValue) -> Verdict {
        if value.trimmed() == "ok" {
            Verdict::Pass
        } else {
            Verdict::fail("not ok")
        }
    }
    FnRule(check as fn(&FieldValue) -> Verdict)
}

fn coordinator() -> FormCoordinator<Field, Step> {
    FormCoordinator::new(context(), |_: &FormContext<Field, Step>| {
        OutboundRequest::post("/gate", &serde_json::json!({}))
    })
}

fn context() -> FormContext<Field, Step> {
    FormContext::builder("gate")
        .field(Field::A, FieldValue::text(""), ok_rule())
        .field(Field::B, FieldValue::text(""), ok_rule())
        .field(Field::C, FieldValue::text(""), ok_rule())
        .optional_field(Field::Handle, FieldValue::text(""), ok_rule())
        .optional_field(Field::Note, FieldValue::text(""), ok_rule())
        .step(Step::First, &[Field::Handle], true)
        .step(Step::Second, &[Field::Handle], true)
        .build()
        .unwrap()
}

#[test]
fn gate_matches_every_combination() {
    let total = REQUIRED_FIELDS.len() + STEPS.len();
    for mask in 0u32..(1 << total) {
        let mut coordinator = coordinator();
        coordinator.on_field_change(Field::Handle, FieldValue::text("ok")).unwrap();
        // The optional note never matters.
        coordinator.on_field_change(Field::Note, FieldValue::text("bad")).unwrap();

        for (bit, field) in REQUIRED_FIELDS.iter().enumerate() {
            let text = if mask & (1 << bit) != 0 { "ok" } else { "bad" };
            coordinator.on_field_change(*field, FieldValue::text(text)).unwrap();
        }
        for (offset, step) in STEPS.iter().enumerate() {
            if mask & (1 << (REQUIRED_FIELDS.len() + offset)) != 0 {
                let pending = coordinator.request_verification(*step).unwrap().unwrap();
                coordinator
                    .complete_verification(&pending.respond(VerificationOutcome::Confirmed))
                    .unwrap();
            }
        }

        let expected = mask == (1 << total) - 1;
        assert_eq!(coordinator.active_gate(), expected, "mask {:05b}", mask);
        assert_eq!(coordinator.active().check().is_ok(), expected, "mask {:05b}", mask);
    }
}

#[derive(Debug, Clone)]
enum Edit {
    Switch(usize),
    Category(&'static str),
    Title(String),
    Content(String),
    Room(u64),
}

fn edit() -> impl Strategy<Value = Edit> {
    prop_oneof![
        (0usize..2).prop_map(Edit::Switch),
        prop::sample::select(vec!["캠켜공", "캠끄공"]).prop_map(Edit::Category),
        "[a-z가-힣 ]{0,12}".prop_map(Edit::Title),
        "[a-z가-힣 ]{0,12}".prop_map(Edit::Content),
        (1u64..4).prop_map(Edit::Room),
    ]
}

fn apply(form: &mut RecruitForm, edit: &Edit) {
    match edit {
        Edit::Switch(index) => form.switch_tab(RecruitTab::ALL[*index]).unwrap(),
        Edit::Category(category) => form.select_category(category).unwrap(),
        Edit::Title(title) => form.set_title(title).unwrap(),
        Edit::Content(content) => form.set_content(content).unwrap(),
        Edit::Room(room) => {
            if form.context().contains(RecruitField::Room) {
                form.select_room(*room).unwrap();
            }
        }
    }
}

proptest! {
    #[test]
    fn edits_only_touch_the_active_tab(edits in prop::collection::vec(edit(), 0..40)) {
        let mut form = RecruitForm::new(1).unwrap();
        for edit in &edits {
            let inactive = RecruitTab::ALL[1 - form.active_tab().index()];
            let before = form.tab_context(inactive).unwrap().values();
            let verdicts_before: Vec<_> = {
                let context = form.tab_context(inactive).unwrap();
                context.fields().map(|field| context.verdict(field).cloned()).collect()
            };

            apply(&mut form, edit);

            if !matches!(edit, Edit::Switch(_)) {
                let context = form.tab_context(inactive).unwrap();
                prop_assert_eq!(context.values(), before);
                let verdicts_after: Vec<_> =
                    context.fields().map(|field| context.verdict(field).cloned()).collect();
                prop_assert_eq!(verdicts_after, verdicts_before);
            }
        }
    }

    #[test]
    fn replaying_edits_is_deterministic(edits in prop::collection::vec(edit(), 0..30)) {
        let mut left = RecruitForm::new(1).unwrap();
        let mut right = RecruitForm::new(1).unwrap();
        for edit in &edits {
            apply(&mut left, edit);
            apply(&mut right, edit);
        }
        for tab in RecruitTab::ALL {
            let l = left.tab_context(tab).unwrap();
            let r = right.tab_context(tab).unwrap();
            prop_assert_eq!(l.values(), r.values());
            prop_assert_eq!(l.helper_texts(), r.helper_texts());
            prop_assert_eq!(l.is_valid(), r.is_valid());
        }
    }
}
