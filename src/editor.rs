use std::collections::HashMap;

use crate::api::{ApiCall, ItemUpdate};
use crate::model::{HuntField, HuntSnapshot, ParticipantRule};
use crate::{valid_email, RowTable, Transition};

#[derive(Debug, Clone, PartialEq)]
pub struct ItemRow {
    /// Server id, known for rows loaded with the page or created through `/new_item`.
    pub item_id: Option<i32>,
    pub name: String,
    pub required: bool,
    /// Batch field index for rows that will be submitted with the creation form.
    pub field_index: Option<usize>,
    pub editing: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParticipantRow {
    pub email: String,
    pub field_index: Option<usize>,
}

/// Result of adding an item or participant from its template input.
#[derive(Debug, Clone, PartialEq)]
pub enum AddOutcome {
    /// Empty input; nothing happens and the input is left as is.
    Ignored,
    /// Failed validation; the input keeps its value for correction.
    Rejected,
    /// A row was added locally. The template input should be cleared.
    Added(Option<Transition>),
    /// The row is created once this request succeeds. The template input should be cleared.
    Send(ApiCall),
}

impl AddOutcome {
    pub fn clears_input(&self) -> bool {
        matches!(self, AddOutcome::Added(_) | AddOutcome::Send(_))
    }
}

/// Page state for the hunt admin form.
///
/// Every user action is a method that updates local state right away and returns the request (if
/// any) the page must send. Nothing here waits on the network: success continuations such as
/// [`HuntEditor::adopt_field`] or [`HuntEditor::item_created`] are applied by the caller once a
/// response arrives, and failures change nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct HuntEditor {
    hunt_id: Option<i32>,
    /// Last value the server accepted, per field.
    baselines: HashMap<HuntField, String>,
    /// Last value the page showed when the field lost focus.
    shown: HashMap<HuntField, String>,
    items: RowTable<ItemRow>,
    participants: RowTable<ParticipantRow>,
    all_required: bool,
    num_items_group_visible: bool,
    participant_error: bool,
    checked_rule: ParticipantRule,
    highlighted_rule: ParticipantRule,
    rule_clicked: bool,
    hovered_rule: Option<ParticipantRule>,
    whitelist_visible: bool,
}

impl HuntEditor {
    pub fn new(snapshot: &HuntSnapshot) -> Self {
        let baselines = HashMap::from([
            (HuntField::Name, snapshot.name.clone()),
            (HuntField::WelcomeMessage, snapshot.welcome_message.clone()),
            (
                HuntField::CongratulationsMessage,
                snapshot.congratulations_message.clone(),
            ),
            (
                HuntField::ParticipantRule,
                snapshot.participant_rule.as_str().to_string(),
            ),
        ]);

        let mut items = RowTable::default();
        for item in &snapshot.items {
            items.push(ItemRow {
                item_id: Some(item.item_id),
                name: item.name.clone(),
                required: item.required,
                field_index: None,
                editing: false,
            });
        }

        let mut participants = RowTable::default();
        for participant in &snapshot.participants {
            participants.push(ParticipantRow {
                email: participant.email.clone(),
                field_index: None,
            });
        }

        Self {
            hunt_id: snapshot.hunt_id,
            shown: baselines.clone(),
            baselines,
            items,
            participants,
            all_required: snapshot.all_required,
            num_items_group_visible: !snapshot.all_required,
            participant_error: false,
            checked_rule: snapshot.participant_rule,
            highlighted_rule: snapshot.participant_rule,
            rule_clicked: false,
            hovered_rule: None,
            whitelist_visible: snapshot.participant_rule == ParticipantRule::ByWhitelist,
        }
    }

    pub fn hunt_id(&self) -> Option<i32> {
        self.hunt_id
    }

    /// True when editing an existing hunt, false on the creation form.
    pub fn is_editing(&self) -> bool {
        self.hunt_id.is_some()
    }

    pub fn items(&self) -> &RowTable<ItemRow> {
        &self.items
    }

    pub fn participants(&self) -> &RowTable<ParticipantRow> {
        &self.participants
    }

    pub fn all_required(&self) -> bool {
        self.all_required
    }

    pub fn num_items_group_visible(&self) -> bool {
        self.num_items_group_visible
    }

    pub fn participant_error(&self) -> bool {
        self.participant_error
    }

    pub fn whitelist_visible(&self) -> bool {
        self.whitelist_visible
    }

    pub fn checked_rule(&self) -> ParticipantRule {
        self.checked_rule
    }

    pub fn baseline(&self, field: HuntField) -> &str {
        self.baselines.get(&field).map(String::as_str).unwrap_or("")
    }

    // Hunt fields.

    pub fn shown(&self, field: HuntField) -> &str {
        self.shown.get(&field).map(String::as_str).unwrap_or("")
    }

    /// Called when a hunt field loses focus. Returns the update to send if the hunt exists and
    /// the value moved away from the last value the server accepted.
    pub fn blur_field(&mut self, field: HuntField, value: &str) -> Option<ApiCall> {
        self.shown.insert(field, value.to_string());
        let hunt_id = self.hunt_id?;
        (self.baseline(field) != value).then(|| ApiCall::edit_hunt(hunt_id, field, value))
    }

    /// Makes `value` the new baseline after the server accepted it. If the field was changed
    /// again while that request was in flight, returns the update that brings the server back in
    /// line with what the page shows.
    pub fn adopt_field(&mut self, field: HuntField, value: impl Into<String>) -> Option<ApiCall> {
        let value = value.into();
        let hunt_id = self.hunt_id?;
        let stale = self.shown(field) != value;
        self.baselines.insert(field, value);
        stale.then(|| ApiCall::edit_hunt(hunt_id, field, self.shown(field)))
    }

    // Items.

    pub fn add_item(&mut self, value: &str) -> AddOutcome {
        let name = value.trim();
        if name.is_empty() {
            return AddOutcome::Ignored;
        }
        if let Some(hunt_id) = self.hunt_id {
            return AddOutcome::Send(ApiCall::NewItem {
                hunt_id,
                name: name.to_string(),
                required: Some(self.all_required),
            });
        }

        let field_index = self.items.allocate_field_index();
        let (_, transition) = self.items.push(ItemRow {
            item_id: None,
            name: name.to_string(),
            required: self.all_required,
            field_index: Some(field_index),
            editing: false,
        });
        AddOutcome::Added(transition)
    }

    /// Appends the row for an item the server just created.
    pub fn item_created(
        &mut self,
        name: &str,
        item_id: Option<i32>,
        required: bool,
    ) -> Option<Transition> {
        let (_, transition) = self.items.push(ItemRow {
            item_id,
            name: name.to_string(),
            required,
            field_index: None,
            editing: false,
        });
        transition
    }

    /// Removes the row straight away. On an existing hunt the returned delete request should be
    /// sent, but the row stays gone whatever the outcome.
    pub fn delete_item(&mut self, key: u64) -> Option<ApiCall> {
        let (row, _) = self.items.remove(key)?;
        self.hunt_id?;
        row.item_id.map(|item_id| ApiCall::DeleteItem { item_id })
    }

    pub fn set_item_required(&mut self, key: u64, required: bool) -> Option<ApiCall> {
        let hunt_id = self.hunt_id;
        let row = self.items.get_mut(key)?;
        row.required = required;
        Some(ApiCall::EditItem {
            item_id: row.item_id?,
            update: ItemUpdate::Required {
                hunt_id: hunt_id?,
                required,
            },
        })
    }

    /// Checking forces every row to required and hides the threshold input; unchecking only
    /// brings the threshold input back. Forced rows are not sent to the server one by one.
    pub fn set_all_required(&mut self, checked: bool) {
        self.all_required = checked;
        if checked {
            for row in self.items.iter_mut() {
                row.required = true;
            }
        }
        self.num_items_group_visible = !checked;
    }

    /// Switches a row to its text input and returns the name to pre-fill.
    pub fn start_rename(&mut self, key: u64) -> Option<String> {
        let row = self.items.get_mut(key)?;
        row.editing = true;
        Some(row.name.clone())
    }

    /// Switches the row back to display mode showing `typed`. Returns the rename request when
    /// the name changed on an item the server knows about.
    pub fn finish_rename(&mut self, key: u64, typed: &str) -> Option<ApiCall> {
        let editing = self.is_editing();
        let row = self.items.get_mut(key)?;
        row.editing = false;
        if row.name == typed {
            return None;
        }
        row.name = typed.to_string();
        if !editing {
            return None;
        }
        Some(ApiCall::EditItem {
            item_id: row.item_id?,
            update: ItemUpdate::Rename {
                name: typed.to_string(),
            },
        })
    }

    // Participants.

    pub fn add_participant(&mut self, value: &str) -> AddOutcome {
        if value.is_empty() {
            return AddOutcome::Ignored;
        }
        if !valid_email(value) {
            self.participant_error = true;
            return AddOutcome::Rejected;
        }
        if let Some(hunt_id) = self.hunt_id {
            return AddOutcome::Send(ApiCall::NewParticipant {
                hunt_id,
                email: value.to_string(),
            });
        }

        let field_index = self.participants.allocate_field_index();
        let (_, transition) = self.participants.push(ParticipantRow {
            email: value.to_string(),
            field_index: Some(field_index),
        });
        AddOutcome::Added(transition)
    }

    pub fn participant_created(&mut self, email: &str) -> Option<Transition> {
        let (_, transition) = self.participants.push(ParticipantRow {
            email: email.to_string(),
            field_index: None,
        });
        transition
    }

    pub fn dismiss_participant_error(&mut self) {
        self.participant_error = false;
    }

    // Participant rule panels.

    /// Highlights the clicked rule. On the creation form this also selects it and shows the
    /// participant list only for `by_whitelist`. An existing hunt keeps its rule: the change is
    /// visual only and nothing is sent.
    pub fn select_rule(&mut self, rule: ParticipantRule) {
        self.highlighted_rule = rule;
        self.rule_clicked = true;
        if !self.is_editing() {
            self.checked_rule = rule;
            self.whitelist_visible = rule == ParticipantRule::ByWhitelist;
        }
    }

    pub fn hover_rule(&mut self, rule: Option<ParticipantRule>) {
        self.hovered_rule = rule;
    }

    pub fn rule_hovered(&self, rule: ParticipantRule) -> bool {
        self.hovered_rule == Some(rule)
    }

    pub fn rule_checkmark_visible(&self, rule: ParticipantRule) -> bool {
        self.highlighted_rule == rule
    }

    pub fn rule_opacity(&self, rule: ParticipantRule) -> f32 {
        if !self.rule_clicked || self.highlighted_rule == rule {
            1.0
        } else {
            0.7
        }
    }
}
