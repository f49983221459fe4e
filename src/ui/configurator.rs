/// Configurator page: browse, extend and export the first-run rules

use crate::config::{BUNDLED_CONFIG_PATH, parse_raw};
use crate::editor::{EXPORT_FILE_NAME, RuleDraft, reload_notice, to_pretty_json};
use crate::error::ExtensionError;
use crate::host;
use crate::rule::{RawRule, sanitize_entries};
use crate::storage::CUSTOM_ENTRIES_KEY;
use crate::ui::components::{RuleCard, StatusKind, StatusLine};
use log::error;
use patternfly_yew::prelude::*;
use serde_json::{Value, json};
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlInputElement, HtmlTextAreaElement};
use yew::prelude::*;

#[derive(Clone, PartialEq)]
struct Status {
    message: String,
    kind: StatusKind,
}

impl Status {
    fn ok(message: impl Into<String>) -> Option<Status> {
        Some(Status {
            message: message.into(),
            kind: StatusKind::Success,
        })
    }

    fn error(message: impl Into<String>) -> Option<Status> {
        Some(Status {
            message: message.into(),
            kind: StatusKind::Error,
        })
    }
}

/// Rules shown on the page: the bundled file followed by local additions
#[derive(Clone, PartialEq, Default)]
struct Entries {
    bundled: Vec<RawRule>,
    custom: Vec<RawRule>,
}

impl Entries {
    fn all(&self) -> Vec<RawRule> {
        self.bundled.iter().chain(self.custom.iter()).cloned().collect()
    }
}

#[function_component(Configurator)]
pub fn configurator() -> Html {
    let entries = use_state(Entries::default);
    let loading = use_state(|| true);
    let status = use_state(|| None::<Status>);
    let draft = use_state(RuleDraft::default);
    let reload = use_state(|| 0u32);

    // Load bundled and custom entries on mount and on every refresh
    {
        let entries = entries.clone();
        let loading = loading.clone();
        let status = status.clone();

        use_effect_with(*reload, move |generation| {
            let refreshed = *generation > 0;
            loading.set(true);
            spawn_local(async move {
                let bundled = load_bundled_entries().await;
                let custom = load_custom_entries().await;
                let notice = reload_notice(refreshed, &bundled, &custom);

                let bundled = match bundled {
                    Ok(rules) => rules,
                    Err(e) => {
                        error!("Unable to load first-run configuration: {}", e);
                        status.set(Status::error(format!("Unable to load configuration: {}", e)));
                        Vec::new()
                    }
                };
                let custom = match custom {
                    Ok(rules) => rules,
                    Err(e) => {
                        error!("Unable to read custom entries: {}", e);
                        status.set(Status::error(format!("Unable to read custom entries: {}", e)));
                        Vec::new()
                    }
                };

                entries.set(Entries { bundled, custom });
                loading.set(false);
                if let Some(message) = notice {
                    status.set(Status::ok(message));
                }
            });
            || ()
        });
    }

    let on_refresh = {
        let reload = reload.clone();
        Callback::from(move |_| reload.set(*reload + 1))
    };

    let on_copy = {
        let entries = entries.clone();
        let status = status.clone();
        Callback::from(move |_| {
            let status = status.clone();
            match to_pretty_json(&entries.all()) {
                Ok(json) => spawn_local(async move {
                    match host::copy_text(&json).await {
                        Ok(()) => status.set(Status::ok("Copied JSON to clipboard.")),
                        Err(e) => {
                            error!("Failed to copy JSON: {}", e);
                            status.set(Status::error("Copy failed. Select and copy the JSON manually."));
                        }
                    }
                }),
                Err(e) => status.set(Status::error(format!("Copy failed: {}", e))),
            }
        })
    };

    let on_download = {
        let entries = entries.clone();
        let status = status.clone();
        Callback::from(move |_| {
            let result = to_pretty_json(&entries.all())
                .and_then(|json| host::download_text(&json, EXPORT_FILE_NAME));
            match result {
                Ok(()) => status.set(Status::ok("Downloaded updated configuration.")),
                Err(e) => {
                    error!("Failed to download JSON: {}", e);
                    status.set(Status::error("Download failed. Try copying the JSON instead."));
                }
            }
        })
    };

    // Form field handlers
    let on_name_input = {
        let draft = draft.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                draft.set(RuleDraft {
                    name: input.value(),
                    ..(*draft).clone()
                });
            }
        })
    };

    let on_urls_input = textarea_input(draft.clone(), |d, value| d.url_patterns = value);
    let on_title_all_input = textarea_input(draft.clone(), |d, value| d.title_all = value);
    let on_title_any_input = textarea_input(draft.clone(), |d, value| d.title_any = value);

    let on_submit = {
        let draft = draft.clone();
        let entries = entries.clone();
        let status = status.clone();

        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();

            let rule = match (*draft).clone().into_rule() {
                Ok(rule) => rule,
                Err(e) => {
                    status.set(Status::error(e.to_string()));
                    return;
                }
            };

            let name = rule.name.clone();
            let mut next = (*entries).clone();
            next.custom.push(rule);
            entries.set(next.clone());
            draft.set(RuleDraft::default());

            let status = status.clone();
            spawn_local(async move {
                match save_custom_entries(&next.custom).await {
                    Ok(()) => status.set(Status::ok(format!("Added entry “{}”.", name))),
                    Err(e) => {
                        error!("Unable to save custom entries: {}", e);
                        status.set(Status::error(format!("Added entry “{}”, but it could not be saved: {}", name, e)));
                    }
                }
            });
        })
    };

    let preview = to_pretty_json(&entries.all()).unwrap_or_else(|e| e.to_string());

    html! {
        <div class="container">
            <div class="header">
                <h1 class="main-title">{"First-run configuration"}</h1>
                <div class="header-actions">
                    <Button onclick={on_refresh} variant={ButtonVariant::Secondary}>
                        {"Reload from file"}
                    </Button>
                    <Button onclick={on_copy} variant={ButtonVariant::Secondary}>
                        {"Copy JSON"}
                    </Button>
                    <Button onclick={on_download}>
                        {"Download "}{EXPORT_FILE_NAME}
                    </Button>
                </div>
            </div>

            if let Some(status) = &*status {
                <StatusLine message={status.message.clone()} kind={status.kind.clone()} />
            }

            <section class="entries">
                if *loading {
                    <div class="loading-text-center">
                        <Spinner />
                    </div>
                } else if entries.bundled.is_empty() && entries.custom.is_empty() {
                    <p class="empty-state">{"No entries loaded."}</p>
                } else {
                    {for entries.bundled.iter().map(|rule| html! { <RuleCard rule={rule.clone()} /> })}
                    {for entries.custom.iter().map(|rule| html! { <RuleCard rule={rule.clone()} custom={true} /> })}
                }
            </section>

            <form class="add-form" onsubmit={on_submit}>
                <h2>{"Add entry"}</h2>
                <label for="name-input">{"Name"}</label>
                <input
                    id="name-input"
                    type="text"
                    value={draft.name.clone()}
                    oninput={on_name_input}
                />
                <label for="url-patterns-input">{"URL patterns (one per line, * as wildcard)"}</label>
                <textarea id="url-patterns-input" value={draft.url_patterns.clone()} oninput={on_urls_input} />
                <label for="title-all-input">{"Title must include (one per line)"}</label>
                <textarea id="title-all-input" value={draft.title_all.clone()} oninput={on_title_all_input} />
                <label for="title-any-input">{"Title should include any (one per line)"}</label>
                <textarea id="title-any-input" value={draft.title_any.clone()} oninput={on_title_any_input} />
                <button type="submit" class="pf-v5-c-button pf-m-primary">{"Add entry"}</button>
            </form>

            <h2>{"JSON preview"}</h2>
            <pre class="json-preview">{preview}</pre>
        </div>
    }
}

// Helper functions

fn textarea_input(draft: UseStateHandle<RuleDraft>, apply: fn(&mut RuleDraft, String)) -> Callback<InputEvent> {
    Callback::from(move |e: InputEvent| {
        if let Some(area) = e.target_dyn_into::<HtmlTextAreaElement>() {
            let mut next = (*draft).clone();
            apply(&mut next, area.value());
            draft.set(next);
        }
    })
}

async fn load_bundled_entries() -> Result<Vec<RawRule>, ExtensionError> {
    let text = host::fetch_packaged_text(BUNDLED_CONFIG_PATH).await?;
    parse_raw(&text)
}

async fn load_custom_entries() -> Result<Vec<RawRule>, ExtensionError> {
    let stored = host::storage_get(&json!({ CUSTOM_ENTRIES_KEY: [] })).await?;

    Ok(sanitize_entries(stored.get(CUSTOM_ENTRIES_KEY).unwrap_or(&Value::Null)))
}

async fn save_custom_entries(custom: &[RawRule]) -> Result<(), ExtensionError> {
    host::storage_set(&json!({ CUSTOM_ENTRIES_KEY: custom })).await
}
