//! Client view state and its transition function.
//!
//! Everything the record screen shows is held in one serializable [`ViewState`]. User input and
//! server results arrive as [`Event`]s; [`update`] computes the next state plus the [`Effect`]s
//! the runtime must perform. Nothing here does I/O.
//!
//! After a successful create or update the local list is patched with the submitted fields
//! (plus the server-assigned id on create) instead of being re-fetched.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    api::models::records::{RecordPayload, RecordResponse},
    types::RecordId,
};

pub const RECORD_ADDED_MESSAGE: &str = "Record Added Successfully";
pub const RECORD_UPDATED_MESSAGE: &str = "Record Updated Successfully";
pub const DELETE_PROMPT: &str = "Are you sure you want to delete this record?";

/// Form text as typed; validation happens server side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormFields {
    pub name: String,
    pub age: String,
    pub city: String,
}

impl From<&RecordResponse> for FormFields {
    fn from(record: &RecordResponse) -> Self {
        Self {
            name: record.name.clone(),
            age: record.age.to_string(),
            city: record.city.clone(),
        }
    }
}

impl FormFields {
    pub fn set(&mut self, field: Field, value: String) {
        match field {
            Field::Name => self.name = value,
            Field::Age => self.age = value,
            Field::City => self.city = value,
        }
    }

    /// Request body; age travels as the typed string
    pub fn to_payload(&self) -> RecordPayload {
        RecordPayload {
            name: Some(self.name.clone()),
            age: Some(Value::String(self.age.clone())),
            city: Some(self.city.clone()),
        }
    }

    /// The record the server now holds, if the age text is a whole number
    fn to_record(&self, id: RecordId) -> Option<RecordResponse> {
        let age = self.age.trim().parse::<i32>().ok()?;
        Some(RecordResponse {
            id,
            name: self.name.clone(),
            age,
            city: self.city.clone(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Field {
    Name,
    Age,
    City,
}

/// What submitting the open form will do. Fixed when the form is opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    Create(FormFields),
    Update(RecordId, FormFields),
}

impl Intent {
    pub fn fields(&self) -> &FormFields {
        match self {
            Intent::Create(fields) | Intent::Update(_, fields) => fields,
        }
    }

    fn fields_mut(&mut self) -> &mut FormFields {
        match self {
            Intent::Create(fields) | Intent::Update(_, fields) => fields,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    /// Authoritative list, in server order. Never filtered.
    pub records: Vec<RecordResponse>,
    pub search: String,
    /// `records` narrowed by `search`; what the table shows
    pub filtered: Vec<RecordResponse>,
    /// Open add/edit form
    pub modal: Option<Intent>,
    /// Record shown in the detail view
    pub viewing: Option<RecordResponse>,
    /// Record awaiting delete confirmation
    pub pending_delete: Option<RecordId>,
}

/// Network call that failed, for choosing the notification text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    FetchRecords,
    SaveRecord,
    DeleteRecord,
}

impl Action {
    pub fn failure_message(self) -> &'static str {
        match self {
            Action::FetchRecords => "Failed to fetch users. Please try again.",
            Action::SaveRecord => "Failed to save user. Please try again.",
            Action::DeleteRecord => "Failed to delete user. Please try again.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// Screen opened
    Loaded { has_token: bool },
    SearchChanged(String),
    AddClicked,
    EditClicked(RecordId),
    FieldEdited(Field, String),
    ModalClosed,
    Submitted,
    ViewClicked(RecordId),
    ViewClosed,
    DeleteRequested(RecordId),
    DeleteConfirmed,
    DeleteCancelled,
    LogoutClicked,

    RecordsFetched(Vec<RecordResponse>),
    RecordCreated { id: RecordId, fields: FormFields },
    RecordUpdated { id: RecordId, fields: FormFields },
    /// Server's list after the deletion
    RecordDeleted(Vec<RecordResponse>),
    RequestFailed { action: Action, unauthorized: bool },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    RedirectToLogin,
    ClearToken,
    FetchRecords,
    CreateRecord(FormFields),
    UpdateRecord(RecordId, FormFields),
    ConfirmDelete(RecordId),
    DeleteRecord(RecordId),
    Notify(String),
}

/// Case-insensitive substring match on name or city
pub fn filter_records(records: &[RecordResponse], search: &str) -> Vec<RecordResponse> {
    let needle = search.to_lowercase();
    records
        .iter()
        .filter(|r| r.name.to_lowercase().contains(&needle) || r.city.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

impl ViewState {
    fn refilter(&mut self) {
        self.filtered = filter_records(&self.records, &self.search);
    }

    fn find(&self, id: RecordId) -> Option<&RecordResponse> {
        self.records.iter().find(|r| r.id == id)
    }
}

/// Apply one event.
pub fn update(mut state: ViewState, event: Event) -> (ViewState, Vec<Effect>) {
    let effects = match event {
        Event::Loaded { has_token: false } => vec![Effect::RedirectToLogin],
        Event::Loaded { has_token: true } => vec![Effect::FetchRecords],

        Event::SearchChanged(search) => {
            state.search = search;
            state.refilter();
            vec![]
        }

        Event::AddClicked => {
            state.modal = Some(Intent::Create(FormFields::default()));
            vec![]
        }
        Event::EditClicked(id) => {
            if let Some(fields) = state.find(id).map(FormFields::from) {
                state.modal = Some(Intent::Update(id, fields));
            }
            vec![]
        }
        Event::FieldEdited(field, value) => {
            if let Some(intent) = state.modal.as_mut() {
                intent.fields_mut().set(field, value);
            }
            vec![]
        }
        Event::ModalClosed => {
            state.modal = None;
            vec![]
        }
        Event::Submitted => match &state.modal {
            Some(Intent::Create(fields)) => vec![Effect::CreateRecord(fields.clone())],
            Some(Intent::Update(id, fields)) => vec![Effect::UpdateRecord(*id, fields.clone())],
            None => vec![],
        },

        Event::ViewClicked(id) => {
            state.viewing = state.find(id).cloned();
            vec![]
        }
        Event::ViewClosed => {
            state.viewing = None;
            vec![]
        }

        Event::DeleteRequested(id) => {
            state.pending_delete = Some(id);
            vec![Effect::ConfirmDelete(id)]
        }
        Event::DeleteConfirmed => match state.pending_delete.take() {
            Some(id) => vec![Effect::DeleteRecord(id)],
            None => vec![],
        },
        Event::DeleteCancelled => {
            state.pending_delete = None;
            vec![]
        }

        Event::LogoutClicked => {
            state = ViewState::default();
            vec![Effect::ClearToken, Effect::RedirectToLogin]
        }

        Event::RecordsFetched(records) => {
            state.records = records;
            state.refilter();
            vec![]
        }
        Event::RecordCreated { id, fields } => match fields.to_record(id) {
            Some(record) => {
                state.records.push(record);
                state.refilter();
                state.modal = None;
                vec![Effect::Notify(RECORD_ADDED_MESSAGE.to_string())]
            }
            None => {
                state.modal = None;
                vec![Effect::Notify(RECORD_ADDED_MESSAGE.to_string()), Effect::FetchRecords]
            }
        },
        Event::RecordUpdated { id, fields } => {
            let mut effects = vec![Effect::Notify(RECORD_UPDATED_MESSAGE.to_string())];
            match fields.to_record(id) {
                Some(updated) => {
                    for record in state.records.iter_mut().filter(|r| r.id == id) {
                        *record = updated.clone();
                    }
                    state.refilter();
                }
                None => effects.push(Effect::FetchRecords),
            }
            state.modal = None;
            effects
        }
        Event::RecordDeleted(records) => {
            state.records = records;
            state.refilter();
            vec![]
        }

        Event::RequestFailed { action, unauthorized } => {
            let mut effects = vec![Effect::Notify(action.failure_message().to_string())];
            if unauthorized {
                state = ViewState::default();
                effects.extend([Effect::ClearToken, Effect::RedirectToLogin]);
            }
            effects
        }
    };

    (state, effects)
}
