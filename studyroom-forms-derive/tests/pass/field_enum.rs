use studyroom_forms::FormKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, FormKey)]
enum SignupField {
    Email,
    ConfirmPassword,
    #[form_key(rename = "code")]
    AuthCode,
}

fn main() {
    assert_eq!(SignupField::ALL.len(), 3);
    assert_eq!(SignupField::Email.index(), 0);
    assert_eq!(SignupField::AuthCode.index(), 2);
    assert_eq!(SignupField::ConfirmPassword.name(), "confirmPassword");
    assert_eq!(SignupField::AuthCode.name(), "code");
}
