//! DOM helpers and the stage slide animation

use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement};

use super::timer::set_timeout;
use crate::consts::STAGE_SLIDE_PX;
use crate::stage::TransitionPlan;

pub fn document() -> Option<Document> {
    web_sys::window()?.document()
}

pub fn by_id(id: &str) -> Option<HtmlElement> {
    document()?.get_element_by_id(id)?.dyn_into().ok()
}

pub fn set_text(id: &str, text: &str) {
    match by_id(id) {
        Some(el) => el.set_text_content(Some(text)),
        None => log::warn!("Missing element #{}", id),
    }
}

pub fn show(el: &HtmlElement, visible: bool) {
    let classes = el.class_list();
    let _ = if visible {
        classes.remove_1("hidden")
    } else {
        classes.add_1("hidden")
    };
}

pub fn show_id(id: &str, visible: bool) {
    if let Some(el) = by_id(id) {
        show(&el, visible);
    }
}

pub fn set_style(el: &HtmlElement, prop: &str, value: &str) {
    let _ = el.style().set_property(prop, value);
}

fn place(el: &HtmlElement, dx: f32, scale: f32, opacity: f32) {
    set_style(el, "transform", &format!("translateX({dx}px) scale({scale})"));
    set_style(el, "opacity", &opacity.to_string());
}

/// Slide the outgoing stage out left and the incoming one in from the right
///
/// `on_done` runs once both slides are over, whether or not the elements
/// exist; a missing panel just skips its half of the animation.
pub fn animate_stage(plan: TransitionPlan, exit_ms: u32, enter_ms: u32, on_done: impl FnOnce() + 'static) {
    let outgoing = by_id(&plan.outgoing.element_id());
    let incoming = by_id(&plan.incoming.element_id());
    if outgoing.is_none() {
        log::warn!("No element for outgoing stage '{}'", plan.outgoing);
    }
    if incoming.is_none() {
        log::warn!("No element for incoming stage '{}'", plan.incoming);
    }

    if let Some(out) = &outgoing {
        set_style(out, "pointer-events", "none");
        set_style(out, "transition", &format!("transform {exit_ms}ms ease-in, opacity {exit_ms}ms ease-in"));
        place(out, -STAGE_SLIDE_PX, 0.9, 0.0);
    }
    if let Some(inc) = &incoming {
        set_style(inc, "transition", "none");
        set_style(inc, "visibility", "visible");
        place(inc, STAGE_SLIDE_PX, 1.1, 0.0);
        // flush styles so the slide starts from the offset
        let _ = inc.offset_width();
    }

    let enter = incoming.clone();
    set_timeout(exit_ms, move || {
        if let Some(inc) = &enter {
            set_style(
                inc,
                "transition",
                &format!(
                    "transform {enter_ms}ms cubic-bezier(0.34, 1.3, 0.64, 1), opacity {enter_ms}ms"
                ),
            );
            place(inc, 0.0, 1.0, 1.0);
        }
    });

    set_timeout(exit_ms + enter_ms, move || {
        if let Some(out) = &outgoing {
            let _ = out.class_list().remove_1("active");
            set_style(out, "pointer-events", "all");
            for prop in ["transition", "transform", "opacity", "visibility"] {
                let _ = out.style().remove_property(prop);
            }
        }
        if let Some(inc) = &incoming {
            let _ = inc.class_list().add_1("active");
            for prop in ["transition", "transform"] {
                let _ = inc.style().remove_property(prop);
            }
        }
        on_done();
    });
}
