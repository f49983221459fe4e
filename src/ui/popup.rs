/// Popup UI: the auto-record switch

use crate::host;
use crate::storage::{AUTO_RECORD_ENABLED_KEY, StorageData};
use crate::ui::components::{StatusKind, StatusLine};
use log::error;
use serde_json::json;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;

#[derive(Clone, PartialEq)]
enum PopupState {
    Loading,
    Ready(bool),
    Saving(bool),
    /// Storage failed; the switch stays off and disabled
    Unavailable(String),
}

fn status_message(enabled: bool) -> &'static str {
    if enabled {
        "Auto-recording is enabled for the next browser startup."
    } else {
        "Auto-recording is currently disabled."
    }
}

#[function_component(App)]
pub fn app() -> Html {
    let state = use_state(|| PopupState::Loading);

    // Load the saved preference on mount
    {
        let state = state.clone();
        use_effect_with((), move |_| {
            spawn_local(async move {
                match load_preference().await {
                    Ok(enabled) => state.set(PopupState::Ready(enabled)),
                    Err(e) => {
                        error!("Unable to read auto-recording preference: {}", e);
                        state.set(PopupState::Unavailable(
                            "Unable to read saved preferences; auto-recording is disabled.".to_string(),
                        ));
                    }
                }
            });
            || ()
        });
    }

    let on_toggle = {
        let state = state.clone();
        Callback::from(move |e: Event| {
            let Some(input) = e.target_dyn_into::<HtmlInputElement>() else {
                return;
            };
            let enabled = input.checked();
            let state = state.clone();
            state.set(PopupState::Saving(enabled));

            spawn_local(async move {
                match save_preference(enabled).await {
                    Ok(()) => state.set(PopupState::Ready(enabled)),
                    Err(e) => {
                        error!("Unable to persist auto-recording preference: {}", e);
                        state.set(PopupState::Unavailable(
                            "Unable to save your choice; auto-recording has been disabled.".to_string(),
                        ));
                    }
                }
            });
        })
    };

    let (checked, disabled) = match &*state {
        PopupState::Loading => (false, true),
        PopupState::Ready(enabled) => (*enabled, false),
        PopupState::Saving(enabled) => (*enabled, true),
        PopupState::Unavailable(_) => (false, true),
    };

    html! {
        <div class="padding-20">
            <h1 class="popup-title">{"First-Run Closer"}</h1>

            <label class="toggle-row">
                <input
                    id="auto-record"
                    type="checkbox"
                    checked={checked}
                    disabled={disabled}
                    onchange={on_toggle}
                />
                {" Record first-run tabs after the next browser startup"}
            </label>

            {match &*state {
                PopupState::Loading => html! {},
                PopupState::Ready(enabled) | PopupState::Saving(enabled) => html! {
                    <StatusLine message={status_message(*enabled)} />
                },
                PopupState::Unavailable(msg) => html! {
                    <StatusLine message={msg.clone()} kind={StatusKind::Error} />
                },
            }}
        </div>
    }
}

// Helper functions

async fn load_preference() -> Result<bool, String> {
    let stored = host::storage_get(&json!({ AUTO_RECORD_ENABLED_KEY: false }))
        .await
        .map_err(|e| e.to_string())?;

    Ok(StorageData::from_value(&stored).auto_record_enabled)
}

async fn save_preference(enabled: bool) -> Result<(), String> {
    host::storage_set(&json!({ AUTO_RECORD_ENABLED_KEY: enabled }))
        .await
        .map_err(|e| e.to_string())
}
