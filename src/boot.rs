use leptos::logging::log;
use leptos::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Document;

use crate::app::App;
use crate::config::{BOOTSTRAP_ID, MOUNT_ID, RAW_TIME_CLASS};
use crate::error::BootError;
use crate::format_timestamp;
use crate::model::HuntSnapshot;

/// Reads the server's snapshot of the page. A page without one is a blank creation form.
pub fn read_snapshot(document: &Document) -> Result<HuntSnapshot, BootError> {
    match document.get_element_by_id(BOOTSTRAP_ID) {
        Some(element) => {
            let raw = element.text_content().unwrap_or_default();
            Ok(HuntSnapshot::from_json(&raw)?)
        }
        None => Ok(HuntSnapshot::default()),
    }
}

/// Rewrites every raw timestamp in the host page as `MM-DD-YYYY`. Runs once, before mounting.
pub fn reformat_timestamps(document: &Document) {
    let Ok(nodes) = document.query_selector_all(&format!(".{}", RAW_TIME_CLASS)) else {
        return;
    };
    for i in 0..nodes.length() {
        let Some(node) = nodes.item(i) else {
            continue;
        };
        let raw = node.text_content().unwrap_or_default();
        if let Some(pretty) = format_timestamp(&raw) {
            node.set_text_content(Some(&pretty));
        }
    }
}

pub fn mount() -> Result<(), BootError> {
    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or(BootError::NoWindow)?;

    reformat_timestamps(&document);
    let snapshot = read_snapshot(&document)?;

    let root = document
        .get_element_by_id(MOUNT_ID)
        .and_then(|element| element.dyn_into::<web_sys::HtmlElement>().ok())
        .ok_or(BootError::MissingElement(MOUNT_ID))?;

    log!(
        "mounting hunt admin ({})",
        match snapshot.hunt_id {
            Some(id) => format!("hunt {}", id),
            None => "new hunt".to_string(),
        }
    );
    leptos::mount::mount_to(root, move || view! { <App snapshot=snapshot /> }).forget();
    Ok(())
}
