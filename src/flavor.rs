//! Flavor text from a text-generation service
//!
//! Best effort only: every failure turns into a cheerful fallback line so the
//! letter never shows an error.

use serde::{Deserialize, Serialize};

use crate::settings::FlavorSettings;

/// Shown when the service answered without any text
pub const EMPTY_REPLY: &str = "Love Error!";
/// Shown on network, timeout or decode failure
pub const UNREACHABLE: &str = "Server busy loving you!";

/// The buttons under the letter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlavorPrompt {
    Poem,
    Reason,
    Love,
    Proud,
}

impl FlavorPrompt {
    pub const ALL: [FlavorPrompt; 4] = [
        FlavorPrompt::Poem,
        FlavorPrompt::Reason,
        FlavorPrompt::Love,
        FlavorPrompt::Proud,
    ];

    pub fn prompt(&self) -> &'static str {
        match self {
            FlavorPrompt::Poem => {
                "Write a 4 line rhyming love poem about a girl learning Java in a cheerful, sweet tone."
            }
            FlavorPrompt::Reason => {
                "Write one short, heartfelt sentence about why I love my coder girlfriend. \
                 Focus on her intelligence and kindness."
            }
            FlavorPrompt::Love => {
                "Write one short sentence starting with 'I Love You Because' about why I love my \
                 future wife. Focus on her cuteness, how she cares for me, supports me through every \
                 problem, and embraces all my childish, silly, and playful moments."
            }
            FlavorPrompt::Proud => {
                "Write a short, loving sentence to remind my girlfriend how proud I am of her \
                 dedication and brilliance today, celebrating her hard work and amazing heart."
            }
        }
    }

    /// Button label while waiting
    pub fn busy_label(&self) -> &'static str {
        match self {
            FlavorPrompt::Poem => "Writing...",
            _ => "Thinking...",
        }
    }

    /// Button label at rest
    pub fn idle_label(&self) -> &'static str {
        match self {
            FlavorPrompt::Poem => "\u{2728} Magic Poem",
            FlavorPrompt::Reason => "\u{2728} Why Special?",
            FlavorPrompt::Love => "\u{1f380}  Need Some Love?",
            FlavorPrompt::Proud => "\u{1f62d} Feeling Sad?",
        }
    }

    /// DOM id of the button
    pub fn button_id(&self) -> &'static str {
        match self {
            FlavorPrompt::Poem => "poem-btn",
            FlavorPrompt::Reason => "reason-btn",
            FlavorPrompt::Love => "love-btn",
            FlavorPrompt::Proud => "proud-btn",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

/// JSON body for a generateContent call
pub fn request_body(prompt: &str) -> crate::Result<String> {
    let body = GenerateRequest {
        contents: vec![Content {
            parts: vec![Part {
                text: Some(prompt.to_string()),
            }],
        }],
    };
    Ok(serde_json::to_string(&body)?)
}

/// Extract the generated text, falling back to `EMPTY_REPLY`
///
/// A body that is not JSON at all counts as unreachable.
pub fn reply_text(body: &str) -> String {
    let response: GenerateResponse = match serde_json::from_str(body) {
        Ok(r) => r,
        Err(e) => {
            log::warn!("Flavor reply did not decode: {}", e);
            return UNREACHABLE.to_string();
        }
    };
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().next())
        .and_then(|p| p.text)
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| EMPTY_REPLY.to_string())
}

/// Client for the text-generation service
#[derive(Debug, Clone)]
pub struct FlavorClient {
    settings: FlavorSettings,
}

impl FlavorClient {
    pub fn new(settings: FlavorSettings) -> Self {
        Self { settings }
    }

    /// Full request URL, `None` without an api key
    pub fn url(&self) -> Option<String> {
        let key = self.settings.api_key.as_deref().filter(|k| !k.is_empty())?;
        Some(format!(
            "{}/{}:generateContent?key={}",
            self.settings.endpoint.trim_end_matches('/'),
            self.settings.model,
            key
        ))
    }

    /// Ask for flavor text; always resolves to something printable
    #[cfg(target_arch = "wasm32")]
    pub async fn generate(&self, prompt: FlavorPrompt) -> String {
        let Some(url) = self.url() else {
            log::warn!("No flavor api key configured");
            return UNREACHABLE.to_string();
        };
        match self.fetch(&url, prompt.prompt()).await {
            Ok(body) => reply_text(&body),
            Err(e) => {
                log::warn!("Flavor request failed: {:?}", e);
                UNREACHABLE.to_string()
            }
        }
    }

    #[cfg(target_arch = "wasm32")]
    async fn fetch(&self, url: &str, prompt: &str) -> Result<String, wasm_bindgen::JsValue> {
        use wasm_bindgen::JsCast;
        use wasm_bindgen::prelude::*;
        use wasm_bindgen_futures::JsFuture;
        use web_sys::{AbortController, Request, RequestInit, RequestMode, Response};

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let body = request_body(prompt).map_err(|e| JsValue::from_str(&e.to_string()))?;

        // Abort the request once the wait budget runs out
        let controller = AbortController::new()?;
        let abort = {
            let controller = controller.clone();
            Closure::once(move || controller.abort())
        };
        let timeout = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            abort.as_ref().unchecked_ref(),
            self.settings.timeout_ms as i32,
        )?;

        let init = RequestInit::new();
        init.set_method("POST");
        init.set_mode(RequestMode::Cors);
        init.set_body(&JsValue::from_str(&body));
        init.set_signal(Some(&controller.signal()));
        let request = Request::new_with_str_and_init(url, &init)?;
        request.headers().set("Content-Type", "application/json")?;

        let result = async {
            let response: Response = JsFuture::from(window.fetch_with_request(&request))
                .await?
                .dyn_into()?;
            let text = JsFuture::from(response.text()?).await?;
            text.as_string().ok_or_else(|| JsValue::from_str("reply is not text"))
        }
        .await;

        window.clear_timeout_with_handle(timeout);
        drop(abort);
        result
    }
}
