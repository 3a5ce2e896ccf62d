//! Reactive validation and submission gating for the study-room forms.
//!
//! A screen is a [`FormCoordinator`] over one or more [`FormContext`]s. Each
//! context owns its [`FieldState`]s (value, rule, verdict) and its
//! [`AsyncVerificationStep`]s, and keeps its gate current after every edit.
//! Network work is split into begin / await / complete so edits can
//! interleave with requests in flight; stale answers are dropped.
//!
//! ```
//! use studyroom_forms::forms::recruit::{RecruitField, RecruitForm, RecruitTab};
//!
//! let mut form = RecruitForm::new(1).unwrap();
//! form.switch_tab(RecruitTab::FindingRooms).unwrap();
//! form.select_category("캠끄공").unwrap();
//! form.set_title("토익 스터디룸 찾아요").unwrap();
//! form.set_content("주 3회").unwrap();
//! assert!(form.is_valid());
//! assert_eq!(form.helper_text(RecruitField::Title).unwrap().to_string(), "* 통과");
//! ```

extern crate self as studyroom_forms;

mod config;
mod context;
mod coordinator;
mod field;
mod field_set;
pub mod forms;
mod key;
pub mod rules;
mod submission;
mod validator;
mod value;
mod verdict;
mod verification;

pub use config::*;
pub use context::*;
pub use coordinator::*;
pub use field::*;
pub use field_set::*;
pub use key::*;
pub use submission::*;
pub use validator::*;
pub use value::*;
pub use verdict::*;
pub use verification::*;

pub use studyroom_error::{ErrorKind, FormError, Result};
pub use studyroom_forms_derive::FormKey;
