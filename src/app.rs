use gloo_timers::callback::Timeout;
use leptos::ev::{Event, FocusEvent, MouseEvent};
use leptos::prelude::*;
use leptos_meta::{provide_meta_context, Title};

use crate::api::{created_item_id, dispatch, ApiCall};
use crate::config::{AdminConfig, Speed};
use crate::editor::{AddOutcome, HuntEditor, ParticipantRow};
use crate::model::{HuntField, HuntSnapshot, ParticipantRule};
use crate::{format_timestamp, item_name_field, item_required_field, participant_email_field};

fn use_config() -> StoredValue<AdminConfig> {
    StoredValue::new(use_context::<AdminConfig>().unwrap_or_default())
}

/// Sends a request whose response the page doesn't need.
fn send(config: StoredValue<AdminConfig>, call: ApiCall) {
    config.with_value(|c| dispatch(c, call, |_| {}));
}

#[component]
pub fn App(snapshot: HuntSnapshot) -> impl IntoView {
    provide_meta_context();
    provide_context(snapshot.config.clone());

    let editor = RwSignal::new(HuntEditor::new(&snapshot));
    let editing = snapshot.hunt_id.is_some();
    let title = match snapshot.hunt_id {
        Some(_) => format!("Edit hunt: {}", snapshot.name),
        None => "New hunt".to_string(),
    };

    view! {
        <Title text=title />
        <form
            method="post"
            action=snapshot.config.form_action.clone()
            data-hunt-id=snapshot.hunt_id.map(|id| id.to_string())
        >
            <HuntFields editor snapshot=snapshot.clone() />
            {snapshot
                .created_at
                .clone()
                .map(|raw| {
                    view! {
                        <p class="hunt-created">"Created " <Timestamp raw=raw /></p>
                    }
                })}
            <RuleSelector editor />
            <ItemsGroup editor num_required=snapshot.num_required />
            <ParticipantsGroup editor />
            {(!editing)
                .then(|| {
                    view! {
                        <button type="submit" class="btn btn-primary">
                            "Create hunt"
                        </button>
                    }
                })}
        </form>
    }
}

/// Sends a hunt field update. Once it succeeds the value becomes the baseline, and if the field
/// was changed again in the meantime the value now on the page is sent after it.
fn save_field(
    editor: RwSignal<HuntEditor>,
    config: StoredValue<AdminConfig>,
    field: HuntField,
    value: String,
    call: ApiCall,
) {
    config.with_value(|c| {
        dispatch(c, call, move |_| {
            let Some(next) = editor.try_update(|e| e.adopt_field(field, value)).flatten() else {
                return;
            };
            let shown = editor.with_untracked(|e| e.shown(field).to_string());
            save_field(editor, config, field, shown, next);
        })
    });
}

/// Name, welcome and congratulations fields. On an existing hunt a changed field is saved when
/// it loses focus.
#[component]
fn HuntFields(editor: RwSignal<HuntEditor>, snapshot: HuntSnapshot) -> impl IntoView {
    let config = use_config();

    let commit = move |field: HuntField, value: String| {
        if let Some(call) = editor.try_update(|e| e.blur_field(field, &value)).flatten() {
            save_field(editor, config, field, value, call);
        }
    };

    view! {
        <div class="form-group">
            <label>
                "Hunt name"
                <input
                    class="form-control"
                    type="text"
                    name="name"
                    value=snapshot.name
                    on:blur=move |ev| commit(HuntField::Name, event_target_value(&ev))
                />
            </label>
        </div>
        <div class="form-group">
            <label>
                "Welcome message"
                <textarea
                    class="form-control"
                    name="welcome_message"
                    prop:value=snapshot.welcome_message
                    on:blur=move |ev| commit(HuntField::WelcomeMessage, event_target_value(&ev))
                ></textarea>
            </label>
        </div>
        <div class="form-group">
            <label>
                "Congratulations message"
                <textarea
                    class="form-control"
                    name="congratulations_message"
                    prop:value=snapshot.congratulations_message
                    on:blur=move |ev| {
                        commit(HuntField::CongratulationsMessage, event_target_value(&ev))
                    }
                ></textarea>
            </label>
        </div>
    }
}

fn rule_panel_class(hovered: bool) -> &'static str {
    if hovered {
        "panel-rect panel-rect-hover"
    } else {
        "panel-rect"
    }
}

#[component]
fn RuleSelector(editor: RwSignal<HuntEditor>) -> impl IntoView {
    view! {
        <div id="participant-rules" class="form-group">
            {ParticipantRule::ALL
                .into_iter()
                .map(|rule| {
                    view! {
                        <div
                            class=move || rule_panel_class(editor.with(|e| e.rule_hovered(rule)))
                            style:opacity=move || editor.with(|e| e.rule_opacity(rule)).to_string()
                            on:click=move |_| editor.update(|e| e.select_rule(rule))
                            on:mouseenter=move |_| editor.update(|e| e.hover_rule(Some(rule)))
                            on:mouseleave=move |_| editor.update(|e| e.hover_rule(None))
                        >
                            <input
                                type="radio"
                                name="participant_rule"
                                value=rule.as_str()
                                prop:checked=move || editor.with(|e| e.checked_rule() == rule)
                            />
                            <span class="panel-rect-label">{rule.label()}</span>
                            <Collapsible
                                class="rule-checkmark"
                                visible=Signal::derive(move || {
                                    editor.with(|e| e.rule_checkmark_visible(rule))
                                })
                                show=Speed::Instant
                            >
                                <span class="glyphicon glyphicon-ok"></span>
                            </Collapsible>
                        </div>
                    }
                })
                .collect_view()}
        </div>
    }
}

/// Adds whatever is in the item template input, either locally or through the backend.
fn submit_item(
    editor: RwSignal<HuntEditor>,
    template: RwSignal<String>,
    config: StoredValue<AdminConfig>,
) {
    let value = template.get_untracked();
    let Some(outcome) = editor.try_update(|e| e.add_item(&value)) else {
        return;
    };
    if outcome.clears_input() {
        template.set(String::new());
    }
    if let AddOutcome::Send(call) = outcome {
        let name = value.trim().to_string();
        let required = editor.with_untracked(|e| e.all_required());
        config.with_value(|c| {
            dispatch(c, call, move |body| {
                let item_id = created_item_id(&body);
                editor.update(|e| {
                    e.item_created(&name, item_id, required);
                });
            })
        });
    }
}

#[component]
fn ItemsGroup(editor: RwSignal<HuntEditor>, num_required: Option<u32>) -> impl IntoView {
    let config = use_config();
    let template = RwSignal::new(String::new());
    let add = move || submit_item(editor, template, config);

    view! {
        <div id="items-group" class="form-group">
            <div class="input-group">
                <input
                    id="items-template"
                    class="form-control"
                    type="text"
                    placeholder="Add an item"
                    prop:value=move || template.get()
                    on:input=move |ev| template.set(event_target_value(&ev))
                    on:keydown=move |ev| {
                        if ev.key() == "Enter" {
                            ev.prevent_default();
                            add();
                        }
                    }
                />
                <button type="button" id="add-item" class="btn btn-default" on:click=move |_| add()>
                    "Add item"
                </button>
            </div>
            <label>
                <input
                    type="checkbox"
                    name="all_required"
                    prop:checked=move || editor.with(|e| e.all_required())
                    on:change=move |ev| {
                        let checked = event_target_checked(&ev);
                        editor.update(|e| e.set_all_required(checked));
                    }
                />
                " All items required"
            </label>
            <Collapsible
                id="num-items-group"
                visible=Signal::derive(move || editor.with(|e| e.num_items_group_visible()))
            >
                <label>
                    "Number of items required"
                    <input
                        class="form-control"
                        type="number"
                        min="0"
                        name="num_required"
                        value=num_required.map(|n| n.to_string())
                    />
                </label>
            </Collapsible>
            <Collapsible
                id="items-table"
                visible=Signal::derive(move || editor.with(|e| e.items().is_visible()))
                show=Speed::Fast
            >
                <table class="table table-condensed">
                    <tbody>
                        <For
                            each=move || {
                                editor.with(|e| e.items().iter().map(|(key, _)| key).collect::<Vec<_>>())
                            }
                            key=|key| *key
                            children=move |row_key| view! { <ItemRowView editor row_key /> }
                        />
                    </tbody>
                </table>
            </Collapsible>
        </div>
    }
}

/// One item: click the name to rename it, toggle required, or delete it.
#[component]
fn ItemRowView(editor: RwSignal<HuntEditor>, row_key: u64) -> impl IntoView {
    let config = use_config();
    let input_ref = NodeRef::<leptos::html::Input>::new();
    let row = Memo::new(move |_| editor.with(|e| e.items().get(row_key).cloned()));

    let name = move || row.get().map(|r| r.name).unwrap_or_default();
    let renaming = move || row.get().is_some_and(|r| r.editing);
    let required = move || row.get().is_some_and(|r| r.required);
    let (item_id, field_index) = row
        .get_untracked()
        .map(|r| (r.item_id, r.field_index))
        .unwrap_or_default();

    let start_rename = move |_: MouseEvent| {
        if editor.try_update(|e| e.start_rename(row_key)).flatten().is_none() {
            return;
        }
        // Focus once the input is displayed again.
        Timeout::new(0, move || {
            if let Some(input) = input_ref.get() {
                let _ = input.focus();
            }
        })
        .forget();
    };

    let finish_rename = move |ev: FocusEvent| {
        let typed = event_target_value(&ev);
        if let Some(call) = editor.try_update(|e| e.finish_rename(row_key, &typed)).flatten() {
            send(config, call);
        }
    };

    let toggle_required = move |ev: Event| {
        let checked = event_target_checked(&ev);
        if let Some(call) = editor
            .try_update(|e| e.set_item_required(row_key, checked))
            .flatten()
        {
            send(config, call);
        }
    };

    let delete = move |_: MouseEvent| {
        if let Some(call) = editor.try_update(|e| e.delete_item(row_key)).flatten() {
            send(config, call);
        }
    };

    view! {
        <tr data-item-id=item_id.map(|id| id.to_string())>
            <td class="item-name">
                <span
                    on:click=start_rename
                    style:display=move || if renaming() { "none" } else { "" }
                >
                    {name}
                </span>
                <input
                    type="text"
                    class="form-control"
                    node_ref=input_ref
                    prop:value=name
                    style:display=move || if renaming() { "" } else { "none" }
                    on:blur=finish_rename
                />
                {field_index
                    .map(|index| view! { <input type="hidden" name=item_name_field(index) value=name /> })}
            </td>
            <td>
                <input
                    type="checkbox"
                    class="hunt-items"
                    name=field_index.map(item_required_field)
                    prop:checked=required
                    on:change=toggle_required
                />
                " Required"
            </td>
            <td class="item-delete" on:click=delete>
                <span class="glyphicon glyphicon-remove"></span>
            </td>
        </tr>
    }
}

fn submit_participant(
    editor: RwSignal<HuntEditor>,
    template: RwSignal<String>,
    config: StoredValue<AdminConfig>,
) {
    let value = template.get_untracked();
    let Some(outcome) = editor.try_update(|e| e.add_participant(&value)) else {
        return;
    };
    if outcome.clears_input() {
        template.set(String::new());
    }
    if let AddOutcome::Send(call) = outcome {
        config.with_value(|c| {
            dispatch(c, call, move |_| {
                editor.update(|e| {
                    e.participant_created(&value);
                });
            })
        });
    }
}

#[component]
fn ParticipantsGroup(editor: RwSignal<HuntEditor>) -> impl IntoView {
    let config = use_config();
    let template = RwSignal::new(String::new());
    let add = move || submit_participant(editor, template, config);

    let rows = move || {
        editor.with(|e| {
            e.participants()
                .iter()
                .map(|(key, row)| (key, row.clone()))
                .collect::<Vec<_>>()
        })
    };

    view! {
        <Collapsible
            id="participants-group"
            class="form-group"
            visible=Signal::derive(move || editor.with(|e| e.whitelist_visible()))
        >
            <div class="input-group">
                <input
                    id="participants-template"
                    class="form-control"
                    type="text"
                    placeholder="participant@example.com"
                    prop:value=move || template.get()
                    on:input=move |ev| template.set(event_target_value(&ev))
                    on:keydown=move |ev| {
                        editor.update(|e| e.dismiss_participant_error());
                        if ev.key() == "Enter" {
                            ev.prevent_default();
                            add();
                        }
                    }
                />
                <button
                    type="button"
                    id="add-participant"
                    class="btn btn-default"
                    on:click=move |_| add()
                >
                    "Add participant"
                </button>
                <For
                    each=move || {
                        rows()
                            .into_iter()
                            .filter_map(|(key, row)| row.field_index.map(|index| (key, index, row.email)))
                            .collect::<Vec<_>>()
                    }
                    key=|(key, _, _)| *key
                    children=move |(_, index, email)| {
                        view! { <input type="hidden" name=participant_email_field(index) value=email /> }
                    }
                />
            </div>
            <Collapsible
                id="participant-error"
                class="text-danger"
                visible=Signal::derive(move || editor.with(|e| e.participant_error()))
            >
                "Please enter a valid email address."
            </Collapsible>
            <Collapsible
                id="participants-table"
                visible=Signal::derive(move || editor.with(|e| e.participants().is_visible()))
                show=Speed::Fast
            >
                <table class="table table-condensed">
                    <tbody>
                        <For
                            each=rows
                            key=|(key, _)| *key
                            children=move |(_, ParticipantRow { email, .. })| {
                                view! {
                                    <tr>
                                        <td>{email}</td>
                                        <td></td>
                                    </tr>
                                }
                            }
                        />
                    </tbody>
                </table>
            </Collapsible>
        </Collapsible>
    }
}

#[component]
fn Timestamp(raw: String) -> impl IntoView {
    let text = format_timestamp(&raw).unwrap_or(raw);
    view! { <span class="hunt-timestamp">{text}</span> }
}

/// Where a collapsible panel is in its show/hide animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Shown,
    Hiding,
    Hidden,
    Showing,
}

impl Phase {
    fn initial(visible: bool) -> Self {
        if visible {
            Phase::Shown
        } else {
            Phase::Hidden
        }
    }

    /// The phase to move into when the panel should become `visible`.
    fn toward(self, visible: bool) -> Self {
        match (self, visible) {
            (Phase::Shown | Phase::Showing, true) | (Phase::Hidden | Phase::Hiding, false) => self,
            (_, true) => Phase::Showing,
            (_, false) => Phase::Hiding,
        }
    }

    /// The phase once the running animation has finished.
    fn settle(self) -> Self {
        match self {
            Phase::Showing => Phase::Shown,
            Phase::Hiding => Phase::Hidden,
            settled => settled,
        }
    }

    fn displayed(self) -> bool {
        self != Phase::Hidden
    }

    fn class(self) -> &'static str {
        match self {
            Phase::Shown => "collapsible",
            Phase::Hiding => "collapsible collapsing",
            Phase::Hidden => "collapsible collapsed",
            Phase::Showing => "collapsible expanding",
        }
    }
}

/// A block that animates in and out as `visible` changes. The animation itself is CSS on the
/// `expanding`/`collapsing` classes; the block only leaves the layout once hiding has finished.
#[component]
fn Collapsible(
    #[prop(into)] visible: Signal<bool>,
    #[prop(default = Speed::Slow)] show: Speed,
    #[prop(default = Speed::Slow)] hide: Speed,
    #[prop(optional)] id: Option<&'static str>,
    #[prop(optional)] class: &'static str,
    children: Children,
) -> impl IntoView {
    let config = use_config();
    let phase = RwSignal::new(Phase::initial(visible.get_untracked()));
    // Bumped on every change so a stale timer can't settle a newer animation.
    let generation = StoredValue::new(0u32);

    Effect::new(move || {
        let target = visible.get();
        let current = phase.get_untracked();
        let next = current.toward(target);
        if next == current {
            return;
        }
        phase.set(next);
        generation.update_value(|g| *g += 1);
        let started = generation.get_value();
        let speed = if target { show } else { hide };
        let ms = config.with_value(|c| c.duration_ms(speed));
        Timeout::new(ms, move || {
            if generation.get_value() == started {
                phase.update(|p| *p = p.settle());
            }
        })
        .forget();
    });

    let duration = move || {
        let speed = if phase.get() == Phase::Showing { show } else { hide };
        format!("{}ms", config.with_value(|c| c.duration_ms(speed)))
    };

    view! {
        <div
            id=id
            class=move || format!("{} {}", phase.get().class(), class).trim_end().to_string()
            style:display=move || if phase.get().displayed() { "" } else { "none" }
            style:transition-duration=duration
        >
            {children()}
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_transitions() {
        let phase = Phase::initial(false);
        assert_eq!(phase, Phase::Hidden);
        assert!(!phase.displayed());

        let phase = phase.toward(true);
        assert_eq!(phase, Phase::Showing);
        assert!(phase.displayed());
        assert_eq!(phase.toward(true), Phase::Showing);
        assert_eq!(phase.settle(), Phase::Shown);

        // Hiding stays in the layout until it settles.
        let phase = Phase::Shown.toward(false);
        assert_eq!(phase, Phase::Hiding);
        assert!(phase.displayed());
        assert_eq!(phase.settle(), Phase::Hidden);

        // Reversing mid-animation.
        assert_eq!(Phase::Hiding.toward(true), Phase::Showing);
        assert_eq!(Phase::Showing.toward(false), Phase::Hiding);

        assert_eq!(Phase::Shown.settle(), Phase::Shown);
        assert_eq!(Phase::Hidden.settle(), Phase::Hidden);
    }

    #[test]
    fn test_rule_panel_class() {
        assert_eq!(rule_panel_class(false), "panel-rect");
        assert_eq!(rule_panel_class(true), "panel-rect panel-rect-hover");
    }

    fn whitelist_form() -> HuntSnapshot {
        HuntSnapshot {
            participant_rule: ParticipantRule::ByWhitelist,
            ..Default::default()
        }
    }

    /// The opening tag of the element with the given id.
    fn opening_tag<'a>(html: &'a str, id: &str) -> &'a str {
        let start = html
            .find(&format!("id=\"{id}\""))
            .unwrap_or_else(|| panic!("no element #{id} in {html}"));
        let end = start + html[start..].find('>').unwrap();
        &html[start..end]
    }

    #[test]
    fn test_participant_add_renders_row_and_clears_template() {
        Owner::new().with(|| {
            let editor = RwSignal::new(HuntEditor::new(&whitelist_form()));
            let template = RwSignal::new("a@b.com".to_string());
            submit_participant(editor, template, StoredValue::new(AdminConfig::default()));
            assert_eq!(template.get_untracked(), "");

            let html = view! { <ParticipantsGroup editor /> }.to_html();
            assert!(html.contains("<tr><td>a@b.com</td><td></td></tr>"), "{html}");
            assert!(html.contains(r#"name="participants-0-email""#), "{html}");
            assert!(!opening_tag(&html, "participants-table").contains("collapsed"));
            assert!(opening_tag(&html, "participant-error").contains("collapsed"));
        });
    }

    #[test]
    fn test_invalid_participant_shows_error_and_keeps_template() {
        Owner::new().with(|| {
            let editor = RwSignal::new(HuntEditor::new(&whitelist_form()));
            let template = RwSignal::new("not-an-email".to_string());
            submit_participant(editor, template, StoredValue::new(AdminConfig::default()));
            assert_eq!(template.get_untracked(), "not-an-email");

            let html = view! { <ParticipantsGroup editor /> }.to_html();
            assert!(!opening_tag(&html, "participant-error").contains("collapsed"));
            assert!(opening_tag(&html, "participants-table").contains("collapsed"));
            assert!(!html.contains("<td>not-an-email</td>"));
        });
    }

    #[test]
    fn test_deleted_item_drops_its_batch_field() {
        Owner::new().with(|| {
            let editor = RwSignal::new(HuntEditor::new(&HuntSnapshot::default()));
            let template = RwSignal::new(String::new());
            let config = StoredValue::new(AdminConfig::default());
            for name in ["Pine cone", "Acorn"] {
                template.set(name.to_string());
                submit_item(editor, template, config);
                assert_eq!(template.get_untracked(), "");
            }
            let first = editor.with_untracked(|e| e.items().iter().map(|(key, _)| key).next());
            editor.update(|e| {
                e.delete_item(first.unwrap());
            });

            let html = view! { <ItemsGroup editor num_required=None /> }.to_html();
            assert!(!html.contains("items-0-name"), "{html}");
            assert!(html.contains(r#"name="items-1-name""#), "{html}");
            assert!(html.contains(r#"value="Acorn""#), "{html}");
            assert!(!opening_tag(&html, "items-table").contains("collapsed"));
        });
    }

    #[test]
    fn test_all_required_hides_threshold_group() {
        Owner::new().with(|| {
            let editor = RwSignal::new(HuntEditor::new(&HuntSnapshot::default()));
            let html = view! { <ItemsGroup editor num_required=Some(3) /> }.to_html();
            assert!(!opening_tag(&html, "num-items-group").contains("collapsed"));
            assert!(opening_tag(&html, "items-table").contains("collapsed"));

            editor.update(|e| e.set_all_required(true));
            let html = view! { <ItemsGroup editor num_required=Some(3) /> }.to_html();
            assert!(opening_tag(&html, "num-items-group").contains("collapsed"));
        });
    }

    #[test]
    fn test_existing_hunt_marks_form_and_rows_with_ids() {
        Owner::new().with(|| {
            let snapshot = HuntSnapshot {
                hunt_id: Some(42),
                name: "Campus hunt".to_string(),
                items: vec![crate::model::Item {
                    item_id: 17,
                    name: "Pine cone".to_string(),
                    required: true,
                }],
                ..Default::default()
            };
            let html = view! { <App snapshot /> }.to_html();
            assert!(html.contains(r#"data-hunt-id="42""#), "{html}");
            assert!(html.contains(r#"data-item-id="17""#), "{html}");
            assert!(!html.contains("Create hunt"));
        });
    }
}
