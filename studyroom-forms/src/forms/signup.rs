//! The signup screen: one context, three verification steps.

use crate::config::FormConfig;
use crate::context::FormContext;
use crate::coordinator::FormCoordinator;
use crate::forms::Navigation;
use crate::rules::{AuthCodeRule, ConfirmPasswordRule, EmailRule, NicknameRule, PasswordRule};
use crate::submission::{OutboundRequest, SubmissionBuilder};
use crate::value::FieldValue;
use crate::verdict::HelperText;
use crate::verification::{
    Completion, PendingVerification, VerificationOutcome, VerificationResponse, VerificationState, Verifier,
};
use crate::FormKey;
use async_trait::async_trait;
use std::collections::BTreeMap;
use studyroom_error::Result;
use studyroom_transport::api::{self, SignupRequest, USERS_PATH};
use studyroom_transport::{ApiResponse, Transport};

pub const SIGNUP_CONTEXT: &str = "signup";
pub const SIGNUP_FAILURE_MESSAGE: &str = "회원가입 실패!";
pub const SIGNUP_REDIRECT: &str = "/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, FormKey)]
pub enum SignupField {
    Email,
    AuthCode,
    Nickname,
    Password,
    ConfirmPassword,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, FormKey)]
pub enum SignupStep {
    SendCode,
    CheckCode,
    CheckNickname,
}

pub fn signup_context() -> Result<FormContext<SignupField, SignupStep>> {
    use SignupField::*;
    use SignupStep::*;

    FormContext::builder(SIGNUP_CONTEXT)
        .field(Email, FieldValue::text(""), EmailRule)
        .optional_field(AuthCode, FieldValue::text(""), AuthCodeRule)
        .field(Nickname, FieldValue::text(""), NicknameRule)
        .field(Password, FieldValue::text(""), PasswordRule)
        .field(ConfirmPassword, FieldValue::text(""), ConfirmPasswordRule::new(Password))
        .step(SendCode, &[Email], false)
        .step(CheckCode, &[Email, AuthCode], true)
        .step(CheckNickname, &[Nickname], true)
        .build()
}

struct SignupSubmission;

impl SubmissionBuilder<SignupField, SignupStep> for SignupSubmission {
    fn build(&self, context: &FormContext<SignupField, SignupStep>) -> Result<OutboundRequest> {
        let request = SignupRequest {
            email: context.text(SignupField::Email).to_string(),
            nickname: context.text(SignupField::Nickname).to_string(),
            password: context.text(SignupField::Password).to_string(),
        };
        OutboundRequest::post(USERS_PATH, &request)
    }

    fn failure_message(&self) -> &str {
        SIGNUP_FAILURE_MESSAGE
    }
}

/// Runs the signup verifications against the API.
pub struct SignupVerifier<'a, T: Transport + ?Sized> {
    transport: &'a T,
}

impl<'a, T: Transport + ?Sized> SignupVerifier<'a, T> {
    pub fn new(transport: &'a T) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl<'a, T: Transport + ?Sized> Verifier<SignupField, SignupStep> for SignupVerifier<'a, T> {
    async fn verify(&self, request: &PendingVerification<SignupField, SignupStep>) -> VerificationOutcome {
        let email = request.text(SignupField::Email);
        match request.step() {
            SignupStep::SendCode => api::send_email_code(self.transport, email).await.into(),
            SignupStep::CheckCode => {
                api::check_email_code(self.transport, email, request.text(SignupField::AuthCode))
                    .await
                    .into()
            }
            SignupStep::CheckNickname => {
                api::check_nickname(self.transport, request.text(SignupField::Nickname))
                    .await
                    .into()
            }
        }
    }
}

pub struct SignupForm {
    coordinator: FormCoordinator<SignupField, SignupStep>,
    config: FormConfig,
}

impl SignupForm {
    pub fn new() -> Result<Self> {
        Self::with_config(FormConfig::default())
    }

    pub fn with_config(config: FormConfig) -> Result<Self> {
        Ok(Self {
            coordinator: FormCoordinator::new(signup_context()?, SignupSubmission),
            config,
        })
    }

    pub fn context(&self) -> &FormContext<SignupField, SignupStep> {
        self.coordinator.active()
    }

    pub fn on_field_change(&mut self, field: SignupField, text: &str) -> Result<bool> {
        self.coordinator.on_field_change(field, FieldValue::text(text))
    }

    pub fn helper_text(&self, field: SignupField) -> Option<HelperText> {
        self.context().helper_text(field)
    }

    pub fn helper_texts(&self) -> BTreeMap<SignupField, HelperText> {
        self.coordinator.active_helper_texts()
    }

    pub fn is_valid(&self) -> bool {
        self.coordinator.active_gate()
    }

    pub fn can_submit(&self) -> bool {
        self.coordinator.can_submit()
    }

    pub fn is_loading(&self) -> bool {
        self.coordinator.is_loading()
    }

    pub fn step_state(&self, step: SignupStep) -> Option<&VerificationState> {
        self.context().step_state(step)
    }

    /// The "send code" button: email passes and no code is pending or sent.
    pub fn can_request_code(&self) -> bool {
        self.context().can_request(SignupStep::SendCode)
    }

    pub fn request(&mut self, step: SignupStep) -> Result<Option<PendingVerification<SignupField, SignupStep>>> {
        self.coordinator.request_verification(step)
    }

    pub fn complete(&mut self, response: &VerificationResponse<SignupStep>) -> Result<Completion> {
        self.coordinator.complete_verification(response)
    }

    /// Request, await and apply `step` against `transport`.
    pub async fn verify<T: Transport + ?Sized>(
        &mut self,
        step: SignupStep,
        transport: &T,
    ) -> Result<Option<Completion>> {
        let verifier = SignupVerifier::new(transport);
        self.coordinator
            .verify(step, &verifier, self.config.verification_timeout)
            .await
    }

    /// Creates the account. On success the caller navigates to
    /// [`SIGNUP_REDIRECT`]; on failure the values stay for a retry.
    pub async fn submit<T: Transport + ?Sized>(&mut self, transport: &T) -> Result<Navigation> {
        self.coordinator
            .submit_then(transport, self.config.submit_timeout, |_: ApiResponse| Navigation {
                toast: None,
                path: SIGNUP_REDIRECT,
            })
            .await
    }

    pub fn coordinator(&self) -> &FormCoordinator<SignupField, SignupStep> {
        &self.coordinator
    }

    pub fn coordinator_mut(&mut self) -> &mut FormCoordinator<SignupField, SignupStep> {
        &mut self.coordinator
    }
}
