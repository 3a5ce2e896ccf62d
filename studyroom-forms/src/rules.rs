//! Field rules used by the study-room forms.
//!
//! Every rule trims text before checking it and reports an empty value with
//! its own "required" message, distinct from the format message.

use crate::field_set::FieldSet;
use crate::key::FormKey;
use crate::validator::{FieldValidator, SiblingValues};
use crate::value::FieldValue;
use crate::verdict::Verdict;

pub mod messages {
    pub const EMAIL_REQUIRED: &str = "이메일을 입력해주세요.";
    pub const EMAIL_FORMAT: &str = "올바른 이메일 주소 형식을 입력해주세요. (예: example@example.com)";

    pub const PASSWORD_REQUIRED: &str = "비밀번호를 입력해주세요.";
    pub const PASSWORD_FORMAT: &str =
        "비밀번호는 8자 이상, 20자 이하이며, 대문자, 소문자, 숫자를 각각 최소 1개 포함해야 합니다.";

    pub const CONFIRM_REQUIRED: &str = "비밀번호를 한번 더 입력해주세요.";
    pub const CONFIRM_MISMATCH: &str = "비밀번호가 일치하지 않습니다.";

    pub const NICKNAME_REQUIRED: &str = "닉네임을 입력해주세요.";
    pub const NICKNAME_WHITESPACE: &str = "띄어쓰기를 없애주세요.";
    pub const NICKNAME_TOO_LONG: &str = "닉네임은 최대 10자까지 작성 가능합니다.";
    pub const NICKNAME_CHARSET: &str = "닉네임은 영어, 한글, 숫자만 가능합니다.";

    pub const AUTH_CODE_REQUIRED: &str = "인증코드를 입력해주세요.";
    pub const AUTH_CODE_FORMAT: &str = "인증코드는 6자리 숫자입니다.";

    pub const CATEGORY_REQUIRED: &str = "카테고리를 선택해주세요.";
    pub const CATEGORY_UNKNOWN: &str = "존재하지 않는 카테고리입니다.";

    pub const TITLE_REQUIRED: &str = "제목을 입력해주세요.";
    pub const TITLE_TOO_LONG: &str = "제목은 최대 50자까지 작성 가능합니다.";

    pub const CONTENT_REQUIRED: &str = "내용을 입력해주세요.";
    pub const CONTENT_TOO_LONG: &str = "내용은 최대 1000자까지 작성 가능합니다.";

    pub const ROOM_REQUIRED: &str = "스터디를 선택해주세요.";
    pub const ROOM_UNKNOWN: &str = "존재하지 않는 스터디입니다.";
}

use messages::*;

pub const PASSWORD_MIN_CHARS: usize = 8;
pub const PASSWORD_MAX_CHARS: usize = 20;
pub const NICKNAME_MAX_CHARS: usize = 10;
pub const AUTH_CODE_DIGITS: usize = 6;
pub const TITLE_MAX_CHARS: usize = 50;
pub const CONTENT_MAX_CHARS: usize = 1000;

#[derive(Debug, Clone, Copy, Default)]
pub struct EmailRule;

impl<K: FormKey> FieldValidator<K> for EmailRule {
    fn validate(&self, value: &FieldValue, _siblings: &dyn SiblingValues<K>) -> Verdict {
        let email = value.trimmed();
        if email.is_empty() {
            Verdict::fail(EMAIL_REQUIRED)
        } else if is_email(email) {
            Verdict::Pass
        } else {
            Verdict::fail(EMAIL_FORMAT)
        }
    }
}

fn is_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordRule;

impl<K: FormKey> FieldValidator<K> for PasswordRule {
    fn validate(&self, value: &FieldValue, _siblings: &dyn SiblingValues<K>) -> Verdict {
        let password = value.trimmed();
        if password.is_empty() {
            return Verdict::fail(PASSWORD_REQUIRED);
        }
        let length = password.chars().count();
        let well_formed = (PASSWORD_MIN_CHARS..=PASSWORD_MAX_CHARS).contains(&length)
            && password.chars().any(|c| c.is_ascii_uppercase())
            && password.chars().any(|c| c.is_ascii_lowercase())
            && password.chars().any(|c| c.is_ascii_digit());
        if well_formed {
            Verdict::Pass
        } else {
            Verdict::fail(PASSWORD_FORMAT)
        }
    }
}

/// Must repeat the value of another field.
#[derive(Debug, Clone, Copy)]
pub struct ConfirmPasswordRule<K> {
    password: K,
}

impl<K: FormKey> ConfirmPasswordRule<K> {
    pub fn new(password: K) -> Self {
        Self { password }
    }
}

impl<K: FormKey> FieldValidator<K> for ConfirmPasswordRule<K> {
    fn validate(&self, value: &FieldValue, siblings: &dyn SiblingValues<K>) -> Verdict {
        let confirm = value.trimmed();
        if confirm.is_empty() {
            return Verdict::fail(CONFIRM_REQUIRED);
        }
        let password = siblings.value(self.password).map_or("", FieldValue::trimmed);
        if confirm == password {
            Verdict::Pass
        } else {
            Verdict::fail(CONFIRM_MISMATCH)
        }
    }

    fn dependencies(&self) -> FieldSet<K> {
        FieldSet::from_keys(&[self.password])
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NicknameRule;

fn is_nickname_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || ('\u{AC00}'..='\u{D7A3}').contains(&c)
}

impl<K: FormKey> FieldValidator<K> for NicknameRule {
    fn validate(&self, value: &FieldValue, _siblings: &dyn SiblingValues<K>) -> Verdict {
        let nickname = value.trimmed();
        if nickname.is_empty() {
            Verdict::fail(NICKNAME_REQUIRED)
        } else if nickname.chars().any(char::is_whitespace) {
            Verdict::fail(NICKNAME_WHITESPACE)
        } else if nickname.chars().count() > NICKNAME_MAX_CHARS {
            Verdict::fail(NICKNAME_TOO_LONG)
        } else if !nickname.chars().all(is_nickname_char) {
            Verdict::fail(NICKNAME_CHARSET)
        } else {
            Verdict::Pass
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AuthCodeRule;

impl<K: FormKey> FieldValidator<K> for AuthCodeRule {
    fn validate(&self, value: &FieldValue, _siblings: &dyn SiblingValues<K>) -> Verdict {
        let code = value.trimmed();
        if code.is_empty() {
            Verdict::fail(AUTH_CODE_REQUIRED)
        } else if code.len() == AUTH_CODE_DIGITS && code.bytes().all(|b| b.is_ascii_digit()) {
            Verdict::Pass
        } else {
            Verdict::fail(AUTH_CODE_FORMAT)
        }
    }
}

/// Non-empty text with an upper bound on its length in characters.
#[derive(Debug, Clone)]
pub struct BoundedTextRule {
    max_chars: usize,
    required_message: &'static str,
    too_long_message: &'static str,
}

impl BoundedTextRule {
    pub fn new(max_chars: usize, required_message: &'static str, too_long_message: &'static str) -> Self {
        Self {
            max_chars,
            required_message,
            too_long_message,
        }
    }

    pub fn title() -> Self {
        Self::new(TITLE_MAX_CHARS, TITLE_REQUIRED, TITLE_TOO_LONG)
    }

    pub fn content() -> Self {
        Self::new(CONTENT_MAX_CHARS, CONTENT_REQUIRED, CONTENT_TOO_LONG)
    }
}

impl<K: FormKey> FieldValidator<K> for BoundedTextRule {
    fn validate(&self, value: &FieldValue, _siblings: &dyn SiblingValues<K>) -> Verdict {
        let text = value.trimmed();
        if text.is_empty() {
            Verdict::fail(self.required_message)
        } else if text.chars().count() > self.max_chars {
            Verdict::fail(self.too_long_message)
        } else {
            Verdict::Pass
        }
    }
}

/// One option out of a fixed list.
#[derive(Debug, Clone)]
pub struct ChoiceRule {
    options: Vec<String>,
    required_message: &'static str,
    unknown_message: &'static str,
}

impl ChoiceRule {
    pub fn new<I, S>(options: I, required_message: &'static str, unknown_message: &'static str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            options: options.into_iter().map(Into::into).collect(),
            required_message,
            unknown_message,
        }
    }

    pub fn category<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(options, CATEGORY_REQUIRED, CATEGORY_UNKNOWN)
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }
}

impl<K: FormKey> FieldValidator<K> for ChoiceRule {
    fn validate(&self, value: &FieldValue, _siblings: &dyn SiblingValues<K>) -> Verdict {
        let choice = value.trimmed();
        if choice.is_empty() {
            Verdict::fail(self.required_message)
        } else if self.options.iter().any(|option| option == choice) {
            Verdict::Pass
        } else {
            Verdict::fail(self.unknown_message)
        }
    }
}

/// Selection of a server entity.
///
/// An optional selection passes when empty. Until the set of known ids is
/// supplied any id is accepted.
#[derive(Debug, Clone)]
pub struct SelectionRule {
    required: bool,
    known: Option<Vec<u64>>,
}

impl SelectionRule {
    pub fn required() -> Self {
        Self {
            required: true,
            known: None,
        }
    }

    pub fn optional() -> Self {
        Self {
            required: false,
            known: None,
        }
    }

    pub fn among(mut self, ids: impl IntoIterator<Item = u64>) -> Self {
        self.known = Some(ids.into_iter().collect());
        self
    }
}

impl<K: FormKey> FieldValidator<K> for SelectionRule {
    fn validate(&self, value: &FieldValue, _siblings: &dyn SiblingValues<K>) -> Verdict {
        match value.as_entity() {
            None if self.required => Verdict::fail(ROOM_REQUIRED),
            None => Verdict::Pass,
            Some(id) => match &self.known {
                Some(known) if !known.contains(&id) => Verdict::fail(ROOM_UNKNOWN),
                _ => Verdict::Pass,
            },
        }
    }
}

/// Adapts a plain function into a rule without dependencies.
pub struct FnRule<F>(pub F);

impl<K, F> FieldValidator<K> for FnRule<F>
where
    K: FormKey,
    F: Fn(&FieldValue) -> Verdict + Send + Sync,
{
    fn validate(&self, value: &FieldValue, _siblings: &dyn SiblingValues<K>) -> Verdict {
        (self.0)(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, crate::FormKey)]
    enum Key {
        Password,
        Confirm,
    }

    fn check<V: FieldValidator<Key>>(rule: &V, text: &str) -> Verdict {
        rule.validate(&FieldValue::text(text), &())
    }

    #[test]
    fn email() {
        assert_eq!(check(&EmailRule, ""), Verdict::fail(EMAIL_REQUIRED));
        assert_eq!(check(&EmailRule, "  "), Verdict::fail(EMAIL_REQUIRED));
        assert_eq!(check(&EmailRule, "a@b.com"), Verdict::Pass);
        assert_eq!(check(&EmailRule, " a@b.com "), Verdict::Pass);
        for bad in ["ab.com", "@b.com", "a@b", "a@b..com", "a@.com", "a b@c.com", "a@b@c.com"] {
            assert_eq!(check(&EmailRule, bad), Verdict::fail(EMAIL_FORMAT), "{}", bad);
        }
    }

    #[test]
    fn password() {
        assert_eq!(check(&PasswordRule, ""), Verdict::fail(PASSWORD_REQUIRED));
        assert_eq!(check(&PasswordRule, "Abc12345"), Verdict::Pass);
        assert_eq!(check(&PasswordRule, "Abc1234"), Verdict::fail(PASSWORD_FORMAT));
        assert_eq!(check(&PasswordRule, "abc12345"), Verdict::fail(PASSWORD_FORMAT));
        assert_eq!(check(&PasswordRule, "ABC12345"), Verdict::fail(PASSWORD_FORMAT));
        assert_eq!(check(&PasswordRule, "Abcdefgh"), Verdict::fail(PASSWORD_FORMAT));
        assert_eq!(check(&PasswordRule, "Abc1234567890123456789"), Verdict::fail(PASSWORD_FORMAT));
    }

    #[test]
    fn confirm_password_reads_sibling() {
        let rule = ConfirmPasswordRule::new(Key::Password);
        let mut values = BTreeMap::new();
        values.insert(Key::Password, FieldValue::text("Abc12345"));

        assert_eq!(
            rule.validate(&FieldValue::text("Abc1234"), &values),
            Verdict::fail(CONFIRM_MISMATCH)
        );
        assert_eq!(rule.validate(&FieldValue::text("Abc12345"), &values), Verdict::Pass);
        assert_eq!(
            rule.validate(&FieldValue::text(""), &values),
            Verdict::fail(CONFIRM_REQUIRED)
        );
        assert_eq!(
            FieldValidator::<Key>::dependencies(&rule),
            FieldSet::from_keys(&[Key::Password])
        );
        assert!(FieldValidator::<Key>::dependencies(&PasswordRule).is_empty());
    }

    #[test]
    fn nickname() {
        assert_eq!(check(&NicknameRule, ""), Verdict::fail(NICKNAME_REQUIRED));
        assert_eq!(check(&NicknameRule, "별빛 공부"), Verdict::fail(NICKNAME_WHITESPACE));
        assert_eq!(check(&NicknameRule, "가나다라마바사아자차카"), Verdict::fail(NICKNAME_TOO_LONG));
        assert_eq!(check(&NicknameRule, "별빛_01"), Verdict::fail(NICKNAME_CHARSET));
        assert_eq!(check(&NicknameRule, "ㄱㄴ"), Verdict::fail(NICKNAME_CHARSET));
        assert_eq!(check(&NicknameRule, "별빛study0123"), Verdict::fail(NICKNAME_TOO_LONG));
        assert_eq!(check(&NicknameRule, "별빛study"), Verdict::Pass);
    }

    #[test]
    fn auth_code() {
        assert_eq!(check(&AuthCodeRule, ""), Verdict::fail(AUTH_CODE_REQUIRED));
        assert_eq!(check(&AuthCodeRule, "012345"), Verdict::Pass);
        assert_eq!(check(&AuthCodeRule, "12345"), Verdict::fail(AUTH_CODE_FORMAT));
        assert_eq!(check(&AuthCodeRule, "12a456"), Verdict::fail(AUTH_CODE_FORMAT));
        assert_eq!(check(&AuthCodeRule, "１２３４５６"), Verdict::fail(AUTH_CODE_FORMAT));
    }

    #[test]
    fn bounded_text() {
        let title = BoundedTextRule::title();
        assert_eq!(check(&title, " "), Verdict::fail(TITLE_REQUIRED));
        assert_eq!(check(&title, &"가".repeat(50)), Verdict::Pass);
        assert_eq!(check(&title, &"가".repeat(51)), Verdict::fail(TITLE_TOO_LONG));

        let content = BoundedTextRule::content();
        assert_eq!(check(&content, "c"), Verdict::Pass);
        assert_eq!(check(&content, &"x".repeat(1001)), Verdict::fail(CONTENT_TOO_LONG));
    }

    #[test]
    fn category_choice() {
        let rule = ChoiceRule::category(["캠켜공", "캠끄공"]);
        let validate = |value: FieldValue| FieldValidator::<Key>::validate(&rule, &value, &());
        assert_eq!(validate(FieldValue::Choice(None)), Verdict::fail(CATEGORY_REQUIRED));
        assert_eq!(validate(FieldValue::choice("캠켜공")), Verdict::Pass);
        assert_eq!(validate(FieldValue::choice("독서")), Verdict::fail(CATEGORY_UNKNOWN));
        assert_eq!(rule.options().len(), 2);
    }

    #[test]
    fn selection() {
        let validate = |rule: &SelectionRule, value: FieldValue| FieldValidator::<Key>::validate(rule, &value, &());

        let required = SelectionRule::required();
        assert_eq!(validate(&required, FieldValue::Entity(None)), Verdict::fail(ROOM_REQUIRED));
        assert_eq!(validate(&required, FieldValue::entity(42)), Verdict::Pass);

        let known = SelectionRule::required().among([1, 2]);
        assert_eq!(validate(&known, FieldValue::entity(2)), Verdict::Pass);
        assert_eq!(validate(&known, FieldValue::entity(3)), Verdict::fail(ROOM_UNKNOWN));

        assert_eq!(validate(&SelectionRule::optional(), FieldValue::Entity(None)), Verdict::Pass);
    }

    #[test]
    fn fn_rule() {
        let rule = FnRule(|value: &FieldValue| {
            if value.trimmed() == "ok" {
                Verdict::Pass
            } else {
                Verdict::fail("no")
            }
        });
        assert_eq!(check(&rule, "ok"), Verdict::Pass);
        assert_eq!(check(&rule, "nope"), Verdict::fail("no"));
    }

    proptest! {
        #[test]
        fn rules_are_deterministic(text in "\\PC{0,30}") {
            let value = FieldValue::text(text);
            let rules: Vec<Box<dyn FieldValidator<Key>>> = vec![
                Box::new(EmailRule),
                Box::new(PasswordRule),
                Box::new(NicknameRule),
                Box::new(AuthCodeRule),
                Box::new(BoundedTextRule::title()),
                Box::new(ChoiceRule::category(["캠켜공", "캠끄공"])),
            ];
            for rule in &rules {
                prop_assert_eq!(rule.validate(&value, &()), rule.validate(&value, &()));
            }
        }

        #[test]
        fn blank_text_never_passes(spaces in "[ \\t]{0,8}") {
            let value = FieldValue::text(spaces);
            prop_assert!(!FieldValidator::<Key>::validate(&EmailRule, &value, &()).is_pass());
            prop_assert!(!FieldValidator::<Key>::validate(&NicknameRule, &value, &()).is_pass());
            prop_assert!(!FieldValidator::<Key>::validate(&BoundedTextRule::content(), &value, &()).is_pass());
        }
    }
}
