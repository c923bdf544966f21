pub mod js_api;
pub mod page;
pub mod player;
pub mod rendering;
pub mod utils;

use std::{cell::RefCell, rc::Rc};

use js_api::{params_from_object, HeroSequence};
use log::{debug, error, warn};
use player::{config::SequenceConfig, SequencePlayer};
use rendering::{
    load_frame_image, resize_player, watch_container_size, watch_visibility, CanvasSurface,
    FrameLoop,
};
use utils::{init_logging, set_panic_hook};
use wasm_bindgen::prelude::*;

thread_local! {
    static SEQUENCE_CONFIG: RefCell<SequenceConfig> = RefCell::new(SequenceConfig::default());
}

fn document() -> Result<web_sys::Document, JsValue> {
    web_sys::window()
        .ok_or_else(|| JsValue::from_str("no window"))?
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))
}

/// Overrides the hero sequence settings for sequences mounted afterwards.
/// Rejected entries are reported on the console and leave the previous
/// value in place.
#[wasm_bindgen]
pub fn set_sequence_params(params: js_sys::Object) {
    let params = params_from_object(&params);
    let level = SEQUENCE_CONFIG.with_borrow_mut(|config| {
        for err in config.apply_params(&params) {
            console_warn!("{}", err);
        }
        config.log_level
    });
    log::set_max_level(level.to_level_filter());
}

/// Starts the hero sequence on the configured canvas. Returns `None` when
/// the page has no such canvas.
#[wasm_bindgen]
pub fn mount_hero_sequence() -> Result<Option<HeroSequence>, JsValue> {
    let config = SEQUENCE_CONFIG.with_borrow(|config| config.clone());
    let canvas = match document()?.get_element_by_id(&config.canvas_id) {
        Some(element) => element.dyn_into::<web_sys::HtmlCanvasElement>()?,
        None => {
            debug!("No #{} on this page, hero sequence not mounted", config.canvas_id);
            return Ok(None);
        }
    };

    let surface = CanvasSurface::new(canvas)?;
    let player = Rc::new(RefCell::new(SequencePlayer::new(config, surface)));

    let weak = Rc::downgrade(&player);
    player
        .borrow_mut()
        .preload(|index, src| load_frame_image(&weak, index, src));

    resize_player(&player);
    watch_container_size(&player)?;

    let frame_loop = Rc::new(FrameLoop::new(player.clone()));
    watch_visibility(&player, frame_loop)?;

    Ok(Some(HeroSequence::new(player)))
}

#[wasm_bindgen]
pub fn mount_page_polish() -> Result<(), JsValue> {
    let document = document()?;
    let anchors = page::mount_smooth_scroll(&document)?;
    let revealed = page::mount_reveal(&document)?;
    debug!("Page polish: {} anchors, {} reveal targets", anchors, revealed);
    Ok(())
}

async fn dom_ready() -> Result<(), JsValue> {
    let document = document()?;
    if document.ready_state() != "loading" {
        return Ok(());
    }
    let (tx, rx) = async_std::channel::bounded::<()>(1);
    let on_ready = Closure::once_into_js(move || {
        let _ = tx.try_send(());
    });
    document.add_event_listener_with_callback("DOMContentLoaded", on_ready.unchecked_ref())?;
    if rx.recv().await.is_err() {
        warn!("DOMContentLoaded listener dropped");
    }
    Ok(())
}

/// Waits for the DOM and mounts everything the page needs. Resolves to the
/// `HeroSequence` handle, or `undefined` when the page has no hero canvas.
#[wasm_bindgen]
pub async fn boot() -> Result<JsValue, JsValue> {
    dom_ready().await?;
    let sequence = mount_hero_sequence()?;
    if let Err(err) = mount_page_polish() {
        error!("Failed to mount page polish: {:?}", err);
    }
    Ok(sequence.map(JsValue::from).unwrap_or(JsValue::UNDEFINED))
}

#[wasm_bindgen(start)]
pub fn main() {
    set_panic_hook();
    init_logging(SEQUENCE_CONFIG.with_borrow(|config| config.log_level));
}
