use leptos::logging::{error, log};
use leptos::task::spawn_local;
use serde::Deserialize;

use crate::config::AdminConfig;
use crate::error::ApiError;
use crate::model::HuntField;

#[derive(Debug, Clone, PartialEq)]
pub enum ItemUpdate {
    Rename { name: String },
    Required { hunt_id: i32, required: bool },
}

/// One request against the hunt backend. Every call is a form-encoded POST.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    EditHunt {
        hunt_id: i32,
        changes: Vec<(HuntField, String)>,
    },
    NewParticipant {
        hunt_id: i32,
        email: String,
    },
    NewItem {
        hunt_id: i32,
        name: String,
        required: Option<bool>,
    },
    EditItem {
        item_id: i32,
        update: ItemUpdate,
    },
    DeleteItem {
        item_id: i32,
    },
}

impl ApiCall {
    pub fn edit_hunt(hunt_id: i32, field: HuntField, value: impl Into<String>) -> Self {
        ApiCall::EditHunt {
            hunt_id,
            changes: vec![(field, value.into())],
        }
    }

    pub fn path(&self) -> String {
        match self {
            ApiCall::EditHunt { hunt_id, .. } => format!("/edit_hunt/{}", hunt_id),
            ApiCall::NewParticipant { .. } => "/new_participant".to_string(),
            ApiCall::NewItem { .. } => "/new_item".to_string(),
            ApiCall::EditItem { item_id, .. } => format!("/edit_item/{}", item_id),
            ApiCall::DeleteItem { item_id } => format!("/delete_item/{}", item_id),
        }
    }

    /// The form body, in the order the fields are appended.
    pub fn form(&self) -> Vec<(&'static str, String)> {
        match self {
            ApiCall::EditHunt { changes, .. } => changes
                .iter()
                .map(|(field, value)| (field.form_name(), value.clone()))
                .collect(),
            ApiCall::NewParticipant { hunt_id, email } => {
                vec![("email", email.clone()), ("hunt_id", hunt_id.to_string())]
            }
            ApiCall::NewItem {
                hunt_id,
                name,
                required,
            } => {
                let mut form = vec![("name", name.clone()), ("hunt_id", hunt_id.to_string())];
                if let Some(required) = required {
                    form.push(("required", required.to_string()));
                }
                form
            }
            ApiCall::EditItem { update, .. } => match update {
                ItemUpdate::Rename { name } => vec![("name", name.clone())],
                ItemUpdate::Required { hunt_id, required } => vec![
                    ("hunt_id", hunt_id.to_string()),
                    ("required", required.to_string()),
                ],
            },
            ApiCall::DeleteItem { .. } => Vec::new(),
        }
    }

    /// Sends the request and returns the response body. Any non-2xx status is an error.
    #[cfg(feature = "csr")]
    pub async fn send(&self, config: &AdminConfig) -> Result<String, ApiError> {
        use wasm_bindgen::JsCast;
        use wasm_bindgen_futures::JsFuture;

        let path = self.path();
        let window = web_sys::window().ok_or_else(|| ApiError::Js("no window".to_string()))?;

        let init = web_sys::RequestInit::new();
        init.set_method("POST");

        let form = self.form();
        if !form.is_empty() {
            let params = web_sys::UrlSearchParams::new()?;
            for (key, value) in &form {
                params.append(key, value);
            }
            let headers = web_sys::Headers::new()?;
            headers.set(
                "Content-Type",
                "application/x-www-form-urlencoded; charset=UTF-8",
            )?;
            init.set_headers(&headers);
            init.set_body(&params);
        }

        let request = web_sys::Request::new_with_str_and_init(&config.url(&path), &init)?;
        let response: web_sys::Response = JsFuture::from(window.fetch_with_request(&request))
            .await?
            .dyn_into()?;
        if !response.ok() {
            return Err(ApiError::Status {
                path,
                status: response.status(),
            });
        }

        let body = JsFuture::from(response.text()?).await?;
        Ok(body.as_string().unwrap_or_default())
    }

    #[cfg(not(feature = "csr"))]
    pub async fn send(&self, _config: &AdminConfig) -> Result<String, ApiError> {
        Err(ApiError::Unsupported)
    }
}

/// Sends `call` in the background. Success runs `on_success` with the response body; failure is
/// only logged and nothing already changed on the page is undone.
pub fn dispatch<F>(config: &AdminConfig, call: ApiCall, on_success: F)
where
    F: FnOnce(String) + 'static,
{
    let config = config.clone();
    spawn_local(async move {
        match call.send(&config).await {
            Ok(body) => {
                log!("{} succeeded", call.path());
                on_success(body);
            }
            Err(e) => error!("{} failed: {}", call.path(), e),
        }
    });
}

#[derive(Deserialize)]
struct CreatedItem {
    item_id: i32,
}

/// Reads the id of a newly created item from a `/new_item` response, if the server sent one.
pub fn created_item_id(body: &str) -> Option<i32> {
    serde_json::from_str::<CreatedItem>(body)
        .ok()
        .map(|created| created.item_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_hunt() {
        let call = ApiCall::edit_hunt(42, HuntField::WelcomeMessage, "Hi all");
        assert_eq!(call.path(), "/edit_hunt/42");
        assert_eq!(call.form(), vec![("welcome_message", "Hi all".to_string())]);

        let call = ApiCall::EditHunt {
            hunt_id: 7,
            changes: vec![
                (HuntField::Name, "Spring hunt".to_string()),
                (HuntField::ParticipantRule, "by_domain".to_string()),
            ],
        };
        assert_eq!(
            call.form(),
            vec![
                ("name", "Spring hunt".to_string()),
                ("participant_rule", "by_domain".to_string()),
            ]
        );
    }

    #[test]
    fn test_new_records() {
        let call = ApiCall::NewParticipant {
            hunt_id: 42,
            email: "a@b.com".to_string(),
        };
        assert_eq!(call.path(), "/new_participant");
        assert_eq!(
            call.form(),
            vec![("email", "a@b.com".to_string()), ("hunt_id", "42".to_string())]
        );

        let call = ApiCall::NewItem {
            hunt_id: 42,
            name: "Clock tower".to_string(),
            required: Some(false),
        };
        assert_eq!(call.path(), "/new_item");
        assert_eq!(
            call.form(),
            vec![
                ("name", "Clock tower".to_string()),
                ("hunt_id", "42".to_string()),
                ("required", "false".to_string()),
            ]
        );
    }

    #[test]
    fn test_edit_item() {
        let rename = ApiCall::EditItem {
            item_id: 17,
            update: ItemUpdate::Rename {
                name: "Old well".to_string(),
            },
        };
        assert_eq!(rename.path(), "/edit_item/17");
        assert_eq!(rename.form(), vec![("name", "Old well".to_string())]);

        let required = ApiCall::EditItem {
            item_id: 17,
            update: ItemUpdate::Required {
                hunt_id: 42,
                required: true,
            },
        };
        assert_eq!(
            required.form(),
            vec![("hunt_id", "42".to_string()), ("required", "true".to_string())]
        );
    }

    #[test]
    fn test_delete_item_has_no_body() {
        let call = ApiCall::DeleteItem { item_id: 17 };
        assert_eq!(call.path(), "/delete_item/17");
        assert!(call.form().is_empty());
    }

    #[test]
    fn test_created_item_id() {
        assert_eq!(created_item_id(r#"{"item_id": 99, "name": "x"}"#), Some(99));
        assert_eq!(created_item_id("OK"), None);
        assert_eq!(created_item_id(""), None);
    }
}
