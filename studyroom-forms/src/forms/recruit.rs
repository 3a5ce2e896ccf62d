//! The recruit-post screen. Tab 0 looks for members of an existing study
//! room and must name the room; tab 1 looks for a room and has no room field.

use crate::config::FormConfig;
use crate::context::FormContext;
use crate::coordinator::FormCoordinator;
use crate::forms::Navigation;
use crate::rules::{BoundedTextRule, ChoiceRule, SelectionRule};
use crate::submission::{OutboundRequest, SubmissionBuilder};
use crate::value::FieldValue;
use crate::verdict::HelperText;
use crate::FormKey;
use std::collections::BTreeMap;
use studyroom_error::{require, FormError, Result};
use studyroom_transport::api::{self, CreatePostRequest, PostType, StudyRoom, POSTS_PATH};
use studyroom_transport::{ApiResponse, Transport};
use tracing::debug;

pub const CATEGORIES: [&str; 2] = ["캠켜공", "캠끄공"];
pub const RECRUIT_SUCCESS_TOAST: &str = "등록 완료!";
pub const RECRUIT_LIST_PATH: &str = "/recruit/list";
pub const RECRUIT_FAILURE_MESSAGE: &str = "서버 오류가 발생했습니다. 다시 시도해주세요.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, FormKey)]
pub enum RecruitField {
    Category,
    Title,
    Content,
    #[form_key(rename = "roomId")]
    Room,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecruitTab {
    FindingMembers,
    FindingRooms,
}

impl RecruitTab {
    pub const ALL: [RecruitTab; 2] = [RecruitTab::FindingMembers, RecruitTab::FindingRooms];

    pub fn index(self) -> usize {
        match self {
            RecruitTab::FindingMembers => 0,
            RecruitTab::FindingRooms => 1,
        }
    }

    pub fn post_type(self) -> PostType {
        match self {
            RecruitTab::FindingMembers => PostType::FindingMembers,
            RecruitTab::FindingRooms => PostType::FindingRooms,
        }
    }

    fn context(self) -> Result<FormContext<RecruitField>> {
        let builder = FormContext::builder(self.post_type().as_str())
            .field(RecruitField::Category, FieldValue::Choice(None), ChoiceRule::category(CATEGORIES))
            .field(RecruitField::Title, FieldValue::text(""), BoundedTextRule::title())
            .field(RecruitField::Content, FieldValue::text(""), BoundedTextRule::content());
        match self {
            RecruitTab::FindingMembers => builder
                .field(RecruitField::Room, FieldValue::Entity(None), SelectionRule::required())
                .build(),
            RecruitTab::FindingRooms => builder.build(),
        }
    }
}

struct RecruitSubmission {
    user_id: u64,
    tab: RecruitTab,
}

impl SubmissionBuilder<RecruitField, crate::NoStep> for RecruitSubmission {
    fn build(&self, context: &FormContext<RecruitField>) -> Result<OutboundRequest> {
        let room_id = if context.is_required(RecruitField::Room) {
            context.value(RecruitField::Room).and_then(FieldValue::as_entity)
        } else {
            None
        };
        let request = CreatePostRequest {
            user_id: self.user_id,
            title: context.text(RecruitField::Title).to_string(),
            content: context.text(RecruitField::Content).to_string(),
            post_type: self.tab.post_type(),
            is_recruited: true,
            room_id,
        };
        OutboundRequest::post(POSTS_PATH, &request)
    }

    fn failure_message(&self) -> &str {
        RECRUIT_FAILURE_MESSAGE
    }
}

pub struct RecruitForm {
    coordinator: FormCoordinator<RecruitField>,
    rooms: Vec<StudyRoom>,
    config: FormConfig,
}

impl RecruitForm {
    pub fn new(user_id: u64) -> Result<Self> {
        Self::with_config(user_id, FormConfig::default())
    }

    pub fn with_config(user_id: u64, config: FormConfig) -> Result<Self> {
        let submission = |tab| RecruitSubmission { user_id, tab };
        let coordinator = FormCoordinator::new(
            RecruitTab::FindingMembers.context()?,
            submission(RecruitTab::FindingMembers),
        )
        .with_context(
            RecruitTab::FindingRooms.context()?,
            submission(RecruitTab::FindingRooms),
        );
        Ok(Self {
            coordinator,
            rooms: Vec::new(),
            config,
        })
    }

    pub fn active_tab(&self) -> RecruitTab {
        RecruitTab::ALL[self.coordinator.active_index()]
    }

    pub fn switch_tab(&mut self, tab: RecruitTab) -> Result<()> {
        self.coordinator.switch_context(tab.index())
    }

    pub fn context(&self) -> &FormContext<RecruitField> {
        self.coordinator.active()
    }

    pub fn tab_context(&self, tab: RecruitTab) -> Result<&FormContext<RecruitField>> {
        self.coordinator.context(tab.index())
    }

    /// Selects a category, or clears it when it is already the selection.
    pub fn select_category(&mut self, category: &str) -> Result<()> {
        let next = match self.context().value(RecruitField::Category) {
            Some(FieldValue::Choice(Some(current))) if current == category => FieldValue::Choice(None),
            _ => FieldValue::choice(category),
        };
        self.coordinator.on_field_change(RecruitField::Category, next)?;
        Ok(())
    }

    pub fn set_title(&mut self, title: &str) -> Result<()> {
        self.coordinator
            .on_field_change(RecruitField::Title, FieldValue::text(title))?;
        Ok(())
    }

    pub fn set_content(&mut self, content: &str) -> Result<()> {
        self.coordinator
            .on_field_change(RecruitField::Content, FieldValue::text(content))?;
        Ok(())
    }

    /// Selects a study room, or clears it when it is already the selection.
    /// Only the members tab has a room.
    pub fn select_room(&mut self, room_id: u64) -> Result<()> {
        let context = self.context();
        require!(
            context.contains(RecruitField::Room),
            FormError::UnknownField {
                field: RecruitField::Room.name(),
                context: context.id(),
            }
        );
        let next = match context.value(RecruitField::Room).and_then(FieldValue::as_entity) {
            Some(current) if current == room_id => FieldValue::Entity(None),
            _ => FieldValue::entity(room_id),
        };
        self.coordinator.on_field_change(RecruitField::Room, next)?;
        Ok(())
    }

    pub fn rooms(&self) -> &[StudyRoom] {
        &self.rooms
    }

    /// Installs the room list and restricts room selection to it.
    pub fn set_rooms(&mut self, rooms: Vec<StudyRoom>) -> Result<()> {
        let ids: Vec<u64> = rooms.iter().map(|room| room.id).collect();
        debug!(rooms = ids.len(), "room list installed");
        self.coordinator
            .context_mut(RecruitTab::FindingMembers.index())?
            .replace_validator(RecruitField::Room, SelectionRule::required().among(ids))?;
        self.rooms = rooms;
        Ok(())
    }

    /// Fetches the rooms the user can recruit for.
    pub async fn load_rooms<T: Transport + ?Sized>(&mut self, transport: &T) -> Result<&[StudyRoom]> {
        let rooms = api::list_rooms(transport)
            .await
            .map_err(|err| FormError::submission(err.status(), err.to_string()))?;
        self.set_rooms(rooms)?;
        Ok(&self.rooms)
    }

    pub fn helper_text(&self, field: RecruitField) -> Option<HelperText> {
        self.context().helper_text(field)
    }

    pub fn helper_texts(&self) -> BTreeMap<RecruitField, HelperText> {
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

    /// Posts the active tab. Success shows [`RECRUIT_SUCCESS_TOAST`] and goes
    /// to the recruit list.
    pub async fn submit<T: Transport + ?Sized>(&mut self, transport: &T) -> Result<Navigation> {
        self.coordinator
            .submit_then(transport, self.config.submit_timeout, |_: ApiResponse| Navigation {
                toast: Some(RECRUIT_SUCCESS_TOAST),
                path: RECRUIT_LIST_PATH,
            })
            .await
    }

    pub fn coordinator(&self) -> &FormCoordinator<RecruitField> {
        &self.coordinator
    }

    pub fn coordinator_mut(&mut self) -> &mut FormCoordinator<RecruitField> {
        &mut self.coordinator
    }
}
