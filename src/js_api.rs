use std::collections::HashMap;

use js_sys::Object;
use log::warn;
use wasm_bindgen::prelude::*;

use crate::rendering::SharedPlayer;

/// Reads a flat JS object of overrides. Strings are taken as-is, numbers
/// and booleans are stringified, anything else is dropped.
pub fn params_from_object(params: &Object) -> HashMap<String, String> {
    let mut result = HashMap::new();
    let keys = Object::keys(params);
    for key in keys.iter() {
        let key_str = match key.as_string() {
            Some(key_str) => key_str,
            None => continue,
        };
        let value = match js_sys::Reflect::get(params, &key) {
            Ok(value) => value,
            Err(_) => continue,
        };
        let value_str = if let Some(s) = value.as_string() {
            s
        } else if let Some(n) = value.as_f64() {
            n.to_string()
        } else if let Some(b) = value.as_bool() {
            b.to_string()
        } else {
            warn!("Ignoring sequence param '{}' with unsupported value", key_str);
            continue;
        };
        result.insert(key_str, value_str);
    }
    result
}

/// Handle to a mounted hero sequence. The page owns it; the browser
/// callbacks keep the player itself alive.
#[wasm_bindgen]
pub struct HeroSequence {
    player: SharedPlayer,
}

impl HeroSequence {
    pub fn new(player: SharedPlayer) -> HeroSequence {
        HeroSequence { player }
    }

    pub fn player(&self) -> &SharedPlayer {
        &self.player
    }
}

#[wasm_bindgen]
impl HeroSequence {
    /// 0-based index of the frame on screen.
    pub fn current_frame(&self) -> u32 {
        self.player.borrow().current_frame() as u32
    }

    pub fn is_playing(&self) -> bool {
        self.player.borrow().is_playing()
    }

    pub fn frame_count(&self) -> u32 {
        self.player.borrow().frame_count() as u32
    }

    pub fn loaded_frames(&self) -> u32 {
        self.player.borrow().progress().loaded as u32
    }

    pub fn failed_frames(&self) -> u32 {
        self.player.borrow().progress().failed as u32
    }
}
