//! Heart Quest entry point
//!
//! Handles platform-specific initialization and carries out the effects the
//! experience asks for.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::{Rc, Weak};

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        CanvasRenderingContext2d, HtmlButtonElement, HtmlCanvasElement, HtmlElement,
        HtmlInputElement, HtmlTextAreaElement, KeyboardEvent, TouchEvent,
    };

    use heart_quest::experience::{Cue, Effect};
    use heart_quest::flavor::{FlavorClient, FlavorPrompt};
    use heart_quest::platform::audio::AudioManager;
    use heart_quest::platform::dom::{self, by_id, set_style, set_text, show, show_id};
    use heart_quest::platform::timer::{Interval, set_timeout};
    use heart_quest::render::DrawCommand;
    use heart_quest::stage::{AnswerFeedback, CodeVerdict, Heart, QUIZ, Spark};
    use heart_quest::{Experience, Settings};

    /// Everything the browser side holds on to
    struct App {
        exp: Experience,
        interval: Option<Interval>,
        audio: AudioManager,
        canvas: HtmlCanvasElement,
        ctx: CanvasRenderingContext2d,
        input_attached: bool,
        sound: bool,
    }

    type Shared = Rc<RefCell<App>>;

    impl App {
        fn paint(&self) {
            let size = self.canvas.width() as f32;
            for cmd in self.exp.frame(size) {
                paint_command(&self.ctx, &cmd);
            }
        }

        fn resize(&self) {
            if let Some(container) = by_id("gameCanvasContainer") {
                let size = container.offset_width().max(1) as u32;
                self.canvas.set_width(size);
                self.canvas.set_height(size);
            }
            self.paint();
        }
    }

    fn paint_command(ctx: &CanvasRenderingContext2d, cmd: &DrawCommand) {
        match cmd {
            DrawCommand::Clear { size, color } => {
                ctx.set_fill_style_str(color);
                ctx.fill_rect(0.0, 0.0, *size as f64, *size as f64);
            }
            DrawCommand::Line { from, to, color } => {
                ctx.set_stroke_style_str(color);
                ctx.set_line_width(1.0);
                ctx.begin_path();
                ctx.move_to(from.x as f64, from.y as f64);
                ctx.line_to(to.x as f64, to.y as f64);
                ctx.stroke();
            }
            DrawCommand::RoundRect {
                origin,
                size,
                radius,
                color,
            } => {
                let (x, y, s) = (origin.x as f64, origin.y as f64, *size as f64);
                let r = (*radius as f64).min(s / 2.0);
                ctx.set_fill_style_str(color);
                ctx.begin_path();
                ctx.move_to(x + r, y);
                let _ = ctx.arc_to(x + s, y, x + s, y + s, r);
                let _ = ctx.arc_to(x + s, y + s, x, y + s, r);
                let _ = ctx.arc_to(x, y + s, x, y, r);
                let _ = ctx.arc_to(x, y, x + s, y, r);
                ctx.close_path();
                ctx.fill();
            }
            DrawCommand::Glyph { text, center, px } => {
                ctx.set_font(&format!("{}px sans-serif", px));
                ctx.set_text_align("center");
                ctx.set_text_baseline("middle");
                let _ = ctx.fill_text(text, center.x as f64, center.y as f64);
            }
        }
    }

    /// Carry out effects; never called with the app borrowed
    fn apply(app: &Shared, effects: Vec<Effect>) {
        for effect in effects {
            apply_one(app, effect);
        }
    }

    fn apply_one(app: &Shared, effect: Effect) {
        match effect {
            Effect::ArmTimer {
                period_ms,
                generation,
            } => {
                let weak = Rc::downgrade(app);
                match Interval::new(period_ms, move || on_timer(&weak, generation)) {
                    Ok(interval) => {
                        if let Some(old) = app.borrow_mut().interval.replace(interval) {
                            old.cancel();
                        }
                    }
                    Err(e) => log::error!("Could not arm snake timer: {:?}", e),
                }
            }
            Effect::CancelTimer => {
                if let Some(old) = app.borrow_mut().interval.take() {
                    old.cancel();
                }
            }
            Effect::AttachInput => app.borrow_mut().input_attached = true,
            Effect::DetachInput => app.borrow_mut().input_attached = false,
            Effect::Redraw => app.borrow().paint(),
            Effect::Score(score) => set_text("scoreVal", &score.to_string()),
            Effect::Cue(cue) => app.borrow().audio.play(cue),
            Effect::Popup => popup(),
            Effect::AnimateStage {
                plan,
                exit_ms,
                enter_ms,
            } => {
                let weak = Rc::downgrade(app);
                let id = plan.id;
                dom::animate_stage(plan, exit_ms, enter_ms, move || {
                    let Some(app) = weak.upgrade() else { return };
                    let result = app.borrow_mut().exp.on_transition_complete(id);
                    match result {
                        Ok(effects) => apply(&app, effects),
                        Err(e) => log::warn!("Transition completion rejected: {}", e),
                    }
                });
            }
            Effect::ShowQuestion { index } => show_question(app, index),
            Effect::QuizFeedback(feedback) => show_feedback(&feedback),
            Effect::CodeFeedback(verdict) => show_code_verdict(verdict),
            Effect::ChoiceAccepted => {
                if let Some(container) = by_id("choiceContainer") {
                    container.set_inner_html(
                        "<div class=\"text-center\">\
                         <div class=\"text-6xl mb-4 animate-ping text-primary\">\u{1f496}</div>\
                         <h2 class=\"font-script text-3xl sm:text-4xl text-primary mb-3\">I Love You Too! :)</h2>\
                         <p class=\"text-gray-600\">This is the correct answer! Get ready for your certificate!</p>\
                         </div>",
                    );
                }
            }
            Effect::DodgeNo { pos, tilt } => {
                if let Some(btn) = by_id("noBtn") {
                    set_style(&btn, "position", "absolute");
                    set_style(&btn, "transition", "left 0.3s ease-out, top 0.3s ease-out, transform 0.2s");
                    set_style(&btn, "left", &format!("{}px", pos.x));
                    set_style(&btn, "top", &format!("{}px", pos.y));
                    set_style(&btn, "transform", &format!("rotate({}deg) scale(1.1)", tilt));
                    set_timeout(300, move || set_style(&btn, "transform", "none"));
                }
            }
            Effect::RevealCard => {
                if let Some(card) = by_id("certCard") {
                    let _ = card.class_list().add_1("revealed");
                }
            }
            Effect::Sparks(sparks) => burst(&sparks),
            Effect::Hearts(hearts) => scatter_hearts(&hearts),
            Effect::FillProgress { duration_ms } => {
                if let Some(bar) = by_id("progressBar") {
                    set_style(&bar, "transition", &format!("width {}ms ease-in-out", duration_ms));
                    set_style(&bar, "width", "100%");
                }
            }
            Effect::OpenEnvelope => {
                if let Some(flap) = by_id("flap") {
                    let _ = flap.class_list().add_1("open");
                }
                if let Some(preview) = by_id("letterPreview") {
                    let _ = preview.class_list().add_1("out");
                }
            }
            Effect::Schedule { delay_ms, then } => {
                let weak = Rc::downgrade(app);
                set_timeout(delay_ms, move || {
                    let Some(app) = weak.upgrade() else { return };
                    let effects = app.borrow_mut().exp.on_deferred(then);
                    apply(&app, effects);
                });
            }
        }
    }

    fn on_timer(weak: &Weak<RefCell<App>>, generation: u64) {
        let Some(app) = weak.upgrade() else { return };
        let effects = app.borrow_mut().exp.on_timer(generation);
        apply(&app, effects);
    }

    fn popup() {
        let Some(el) = by_id("chussPopup") else { return };
        let _ = el.class_list().add_1("pop");
        set_timeout(1400, move || {
            let _ = el.class_list().remove_1("pop");
        });
    }

    fn show_question(app: &Shared, index: usize) {
        let Some(question) = QUIZ.get(index) else { return };
        set_text("qText", question.prompt);
        show_id("qExplain", false);
        show_id("nextQBtn", false);

        let Some(options) = by_id("qOptions") else { return };
        options.set_inner_html("");
        let Some(document) = dom::document() else { return };

        for (i, text) in question.options.iter().enumerate() {
            let Ok(btn) = document.create_element("button") else { continue };
            btn.set_class_name("quiz-option");
            btn.set_text_content(Some(text));
            let weak = Rc::downgrade(app);
            let closure = Closure::<dyn FnMut()>::new(move || {
                let Some(app) = weak.upgrade() else { return };
                let effects = app.borrow_mut().exp.on_quiz_answer(i);
                apply(&app, effects);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
            let _ = options.append_child(&btn);
        }
    }

    fn show_feedback(feedback: &AnswerFeedback) {
        let Some(options) = by_id("qOptions") else { return };
        let buttons = options.children();
        for i in 0..buttons.length() {
            if let Some(btn) = buttons.item(i).and_then(|b| b.dyn_into::<HtmlButtonElement>().ok()) {
                btn.set_disabled(true);
            }
        }

        let mark = |index: usize, class: &str, suffix: &str| {
            if let Some(btn) = buttons.item(index as u32) {
                let _ = btn.class_list().add_1(class);
                if !suffix.is_empty() {
                    let text = btn.text_content().unwrap_or_default();
                    btn.set_text_content(Some(&format!("{} {}", text, suffix)));
                }
            }
        };
        if feedback.is_correct {
            mark(feedback.chosen, "correct", "\u{2705}");
        } else {
            mark(feedback.chosen, "wrong", "\u{274c}");
            mark(feedback.correct, "correct-hint", "");
        }

        set_text("qExplain", &feedback.message);
        show_id("qExplain", true);
        show_id("nextQBtn", true);
    }

    fn show_code_verdict(verdict: CodeVerdict) {
        match verdict.message() {
            Some(message) => {
                set_text("errorText", message);
                show_id("codeError", true);
            }
            None => show_id("codeError", false),
        }
    }

    fn burst(sparks: &[Spark]) {
        let (Some(document), Some(card)) = (dom::document(), by_id("certCard")) else {
            return;
        };
        let Some(body) = document.body() else { return };
        let rect = card.get_bounding_client_rect();
        let center = Vec2::new(
            (rect.left() + rect.width() / 2.0) as f32,
            (rect.top() + rect.height() / 2.0) as f32,
        );

        for spark in sparks {
            let Ok(el) = document.create_element("div") else { continue };
            let Ok(el) = el.dyn_into::<HtmlElement>() else { continue };
            el.set_class_name("spark");
            let start = center + spark.origin;
            let end = center + spark.target();
            set_style(&el, "transform", &format!("translate({}px, {}px) scale(1)", start.x, start.y));
            let _ = body.append_child(&el);
            let _ = el.offset_width();
            let ms = (spark.life * 1000.0) as u32;
            set_style(&el, "transition", &format!("transform {ms}ms cubic-bezier(0.16, 1, 0.3, 1), opacity {ms}ms"));
            set_style(&el, "transform", &format!("translate({}px, {}px) scale(0)", end.x, end.y));
            set_style(&el, "opacity", "0");
            set_timeout(ms, move || el.remove());
        }
    }

    fn scatter_hearts(hearts: &[Heart]) {
        let (Some(document), Some(container)) = (dom::document(), by_id("parallaxContainer")) else {
            return;
        };
        let mut placed = Vec::with_capacity(hearts.len());
        for heart in hearts {
            let Ok(el) = document.create_element("div") else { continue };
            let Ok(el) = el.dyn_into::<HtmlElement>() else { continue };
            el.set_class_name("parallax-heart absolute");
            el.set_text_content(Some("\u{2764}\u{fe0f}"));
            set_style(&el, "left", &format!("{}%", heart.left));
            set_style(&el, "top", &format!("{}%", heart.top));
            set_style(&el, "font-size", &format!("{}px", heart.font_px));
            set_style(&el, "opacity", &heart.opacity.to_string());
            let _ = container.append_child(&el);
            placed.push((el, heart.drift));
        }

        // Drift with the letter's scroll progress
        let Some(letter) = by_id("stage-letter") else { return };
        let scroller = letter.clone();
        let closure = Closure::<dyn FnMut()>::new(move || {
            let range = (scroller.scroll_height() - scroller.client_height()).max(1) as f32;
            let progress = (scroller.scroll_top() as f32 / range).clamp(0.0, 1.0);
            for (el, drift) in &placed {
                set_style(el, "transform", &format!("translateY({}px)", drift * progress));
            }
        });
        let _ = letter.add_event_listener_with_callback("scroll", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn on_click(id: &str, app: &Shared, handler: fn(&mut Experience) -> Vec<Effect>) {
        let Some(el) = by_id(id) else {
            log::warn!("Missing button #{}", id);
            return;
        };
        let weak = Rc::downgrade(app);
        let closure = Closure::<dyn FnMut()>::new(move || {
            let Some(app) = weak.upgrade() else { return };
            let effects = handler(&mut app.borrow_mut().exp);
            apply(&app, effects);
        });
        let _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn code_input() -> String {
        let Some(el) = dom::document().and_then(|d| d.get_element_by_id("userCode")) else {
            return String::new();
        };
        match el.dyn_into::<HtmlTextAreaElement>() {
            Ok(area) => area.value(),
            Err(el) => el
                .dyn_into::<HtmlInputElement>()
                .map(|input| input.value())
                .unwrap_or_default(),
        }
    }

    fn setup_input_handlers(app: &Shared) {
        let window = web_sys::window().expect("no window");

        // Keyboard
        {
            let weak = Rc::downgrade(app);
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let Some(app) = weak.upgrade() else { return };
                let mut a = app.borrow_mut();
                if a.input_attached && a.exp.on_key(&event.key()) {
                    event.prevent_default();
                }
            });
            let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        let canvas = app.borrow().canvas.clone();

        // Touch start
        {
            let weak = Rc::downgrade(app);
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                let Some(app) = weak.upgrade() else { return };
                let mut a = app.borrow_mut();
                if !a.input_attached {
                    return;
                }
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    a.exp.on_touch_start(Vec2::new(touch.client_x() as f32, touch.client_y() as f32));
                }
            });
            let _ = canvas.add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch move
        {
            let weak = Rc::downgrade(app);
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                let Some(app) = weak.upgrade() else { return };
                let mut a = app.borrow_mut();
                if !a.input_attached {
                    return;
                }
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    a.exp.on_touch_move(Vec2::new(touch.client_x() as f32, touch.client_y() as f32));
                }
            });
            let _ = canvas.add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch end
        {
            let weak = Rc::downgrade(app);
            let closure = Closure::<dyn FnMut()>::new(move || {
                if let Some(app) = weak.upgrade() {
                    app.borrow_mut().exp.on_touch_end();
                }
            });
            let _ = canvas.add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Resize keeps the grid square and crisp
        {
            let weak = Rc::downgrade(app);
            let closure = Closure::<dyn FnMut()>::new(move || {
                if let Some(app) = weak.upgrade() {
                    app.borrow().resize();
                }
            });
            let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_stage_buttons(app: &Shared) {
        on_click("nextQBtn", app, |exp| exp.on_quiz_next());
        on_click("checkCodeBtn", app, |exp| exp.on_code_submit(&code_input()));
        on_click("yesBtn", app, |exp| exp.on_choice_yes());
        on_click("startLoadingBtn", app, |exp| exp.on_start_loading());
        on_click("envelope", app, |exp| exp.on_open_envelope());

        // The "no" button dodges both hover and click
        if let Some(no) = by_id("noBtn") {
            for event in ["mouseover", "click"] {
                let weak = Rc::downgrade(app);
                let closure = Closure::<dyn FnMut()>::new(move || {
                    let Some(app) = weak.upgrade() else { return };
                    let (Some(container), Some(btn)) = (by_id("choiceContainer"), by_id("noBtn")) else {
                        return;
                    };
                    let rect = container.get_bounding_client_rect();
                    let size = Vec2::new(rect.width() as f32, rect.height() as f32);
                    let button = Vec2::new(btn.offset_width() as f32, btn.offset_height() as f32);
                    let effects = app.borrow_mut().exp.on_choice_no(size, button);
                    apply(&app, effects);
                });
                let _ = no.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }
    }

    fn setup_flavor_buttons(client: FlavorClient) {
        for prompt in FlavorPrompt::ALL {
            let Some(btn) = by_id(prompt.button_id()).and_then(|b| b.dyn_into::<HtmlButtonElement>().ok())
            else {
                continue;
            };
            let client = client.clone();
            let target = btn.clone();
            let closure = Closure::<dyn FnMut()>::new(move || {
                let client = client.clone();
                let btn = target.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    btn.set_disabled(true);
                    btn.set_text_content(Some(prompt.busy_label()));
                    let text = client.generate(prompt).await;
                    set_text("aiOutput", &text);
                    if let Some(out) = by_id("aiOutput") {
                        show(&out, true);
                    }
                    btn.set_disabled(false);
                    btn.set_text_content(Some(prompt.idle_label()));
                });
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Heart Quest starting...");

        let settings = Settings::load();
        let canvas: HtmlCanvasElement = by_id("gameCanvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .expect("no 2d context")
            .dyn_into()
            .expect("not a 2d context");

        let seed = js_sys::Date::now() as u64;
        let flavor = FlavorClient::new(settings.flavor.clone());
        let settings_sound = settings.sound;
        let app = Rc::new(RefCell::new(App {
            audio: AudioManager::new(&settings),
            exp: Experience::new(settings, seed),
            interval: None,
            canvas,
            ctx,
            input_attached: false,
            sound: settings_sound,
        }));
        log::info!("Experience initialized with seed: {}", seed);

        setup_input_handlers(&app);
        setup_stage_buttons(&app);
        setup_flavor_buttons(flavor);

        app.borrow().resize();
        let effects = app.borrow_mut().exp.start();
        apply(&app, effects);

        if let Some(audio_toggle) = by_id("muteBtn") {
            let weak = Rc::downgrade(&app);
            let closure = Closure::<dyn FnMut()>::new(move || {
                let Some(app) = weak.upgrade() else { return };
                let mut a = app.borrow_mut();
                a.sound = !a.sound;
                let mut settings = a.exp.settings().clone();
                settings.sound = a.sound;
                settings.save();
                a.audio.set_muted(!a.sound);
                if a.sound {
                    a.audio.play(Cue::Eat);
                }
            });
            let _ = audio_toggle.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        log::info!("Heart Quest running!");
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Heart Quest (native) starting...");
    log::info!("Native mode runs a headless walkthrough - use `trunk serve` for the web version");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(2024);
    match demo::walkthrough(seed) {
        Ok(ticks) => println!("Reached the letter after {ticks} snake ticks (seed {seed})"),
        Err(e) => {
            eprintln!("walkthrough failed: {e}");
            std::process::exit(1);
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Plays the whole experience without a browser: autopilot for the snake,
/// right answers everywhere else, every animation completed immediately.
#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use std::collections::VecDeque;
    use std::error::Error;

    use heart_quest::experience::Effect;
    use heart_quest::sim::choose_direction;
    use heart_quest::stage::{QUIZ, Stage};
    use heart_quest::{Experience, Settings};

    const MAX_TICKS: u64 = 20_000;

    /// Complete animations and deferred work until nothing is pending
    fn settle(exp: &mut Experience, effects: Vec<Effect>) -> heart_quest::Result {
        let mut pending: VecDeque<Effect> = effects.into();
        while let Some(effect) = pending.pop_front() {
            match effect {
                Effect::AnimateStage { plan, .. } => {
                    log::info!("{} -> {}", plan.outgoing, plan.incoming);
                    pending.extend(exp.on_transition_complete(plan.id)?);
                }
                Effect::Schedule { then, .. } => pending.extend(exp.on_deferred(then)),
                Effect::Sparks(sparks) => log::info!("{} sparks fly", sparks.len()),
                Effect::Hearts(hearts) => log::info!("{} hearts float", hearts.len()),
                Effect::Score(score) => log::debug!("score {}", score),
                _ => {}
            }
        }
        Ok(())
    }

    pub fn walkthrough(seed: u64) -> Result<u64, Box<dyn Error>> {
        let mut exp = Experience::new(Settings::default(), seed);
        let effects = exp.start();
        settle(&mut exp, effects)?;

        while exp.sequencer().active() == Stage::Game {
            if !exp.engine().is_running() || exp.engine().state().time_ticks > MAX_TICKS {
                return Err("snake stopped before winning".into());
            }
            if let Some(dir) = choose_direction(exp.engine().state()) {
                exp.on_direction(dir);
            }
            let effects = exp.on_tick();
            settle(&mut exp, effects)?;
        }
        if !exp.engine().has_won() {
            return Err("left the game stage without winning".into());
        }
        let ticks = exp.engine().state().time_ticks;
        log::info!("Snake won in {} ticks", ticks);

        for question in QUIZ {
            let effects = exp.on_quiz_answer(question.correct);
            settle(&mut exp, effects)?;
            let effects = exp.on_quiz_next();
            settle(&mut exp, effects)?;
        }
        let steps: [fn(&mut Experience) -> Vec<Effect>; 4] = [
            |exp| exp.on_code_submit("System.out.println(\"Hamster I Like You\");"),
            |exp| exp.on_choice_yes(),
            |exp| exp.on_start_loading(),
            |exp| exp.on_open_envelope(),
        ];
        for step in steps {
            let effects = step(&mut exp);
            settle(&mut exp, effects)?;
        }

        match exp.sequencer().active() {
            Stage::Letter => Ok(ticks),
            other => Err(format!("walkthrough stuck on stage '{other}'").into()),
        }
    }
}
