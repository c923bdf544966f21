use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

use log::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::{
    CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement, IntersectionObserver,
    IntersectionObserverEntry, IntersectionObserverInit,
};

use crate::player::{
    geometry::{DrawRect, SurfaceGeometry},
    schedule::FrameRequests,
    FrameSurface, LoopToken, SequencePlayer,
};

pub type SharedPlayer = Rc<RefCell<SequencePlayer<CanvasSurface>>>;

pub struct CanvasSurface {
    pub canvas: HtmlCanvasElement,
    pub ctx2d: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<CanvasSurface, JsValue> {
        // Opaque context, frames always cover the whole surface.
        let options = js_sys::Object::new();
        js_sys::Reflect::set(&options, &"alpha".into(), &JsValue::FALSE)?;
        let ctx2d = canvas
            .get_context_with_context_options("2d", &options)?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        set_high_quality_smoothing(&ctx2d);
        Ok(CanvasSurface { canvas, ctx2d })
    }

    /// On-screen size of the element the canvas overlays.
    pub fn container_size(&self) -> Option<(f64, f64)> {
        let parent = self.canvas.parent_element()?;
        let rect = parent.get_bounding_client_rect();
        Some((rect.width(), rect.height()))
    }
}

fn set_high_quality_smoothing(ctx2d: &CanvasRenderingContext2d) {
    ctx2d.set_image_smoothing_enabled(true);
    // Not every binding exposes imageSmoothingQuality, set it by name.
    if let Err(err) = js_sys::Reflect::set(ctx2d, &"imageSmoothingQuality".into(), &"high".into()) {
        debug!("imageSmoothingQuality not set: {:?}", err);
    }
}

impl FrameSurface for CanvasSurface {
    type Image = HtmlImageElement;

    fn apply_geometry(&mut self, geometry: &SurfaceGeometry) {
        let (backing_width, backing_height) = geometry.backing_size();
        self.canvas.set_width(backing_width);
        self.canvas.set_height(backing_height);

        let style = self.canvas.style();
        style
            .set_property("width", &format!("{}px", geometry.css_width))
            .unwrap_or(());
        style
            .set_property("height", &format!("{}px", geometry.css_height))
            .unwrap_or(());

        // Resizing the backing store resets the context state.
        let ratio = geometry.pixel_ratio;
        if let Err(err) = self.ctx2d.set_transform(ratio, 0.0, 0.0, ratio, 0.0, 0.0) {
            warn!("Failed to scale canvas context: {:?}", err);
        }
        set_high_quality_smoothing(&self.ctx2d);
    }

    fn draw(&mut self, image: &HtmlImageElement, rect: &DrawRect) {
        if let Err(err) = self
            .ctx2d
            .draw_image_with_html_image_element_and_dw_and_dh(
                image,
                rect.x,
                rect.y,
                rect.width,
                rect.height,
            )
        {
            debug!("drawImage failed: {:?}", err);
        }
    }
}

pub fn now() -> f64 {
    web_sys::window()
        .and_then(|window| window.performance())
        .map(|performance| performance.now())
        .unwrap_or(0.0)
}

pub fn device_pixel_ratio() -> Option<f64> {
    web_sys::window().map(|window| window.device_pixel_ratio())
}

/// Creates the image element for one frame and reports its outcome back
/// to the player once the browser has loaded it.
pub fn load_frame_image(
    player: &Weak<RefCell<SequencePlayer<CanvasSurface>>>,
    index: usize,
    src: &str,
) -> Option<HtmlImageElement> {
    let image = HtmlImageElement::new().ok()?;

    let onload = {
        let player = player.clone();
        let image = image.clone();
        Closure::<dyn FnMut()>::new(move || {
            if let Some(player) = player.upgrade() {
                player
                    .borrow_mut()
                    .mark_loaded(index, image.natural_width(), image.natural_height());
            }
        })
    };
    let onerror = {
        let player = player.clone();
        Closure::<dyn FnMut()>::new(move || {
            if let Some(player) = player.upgrade() {
                player.borrow_mut().mark_failed(index);
            }
        })
    };
    image.set_onload(Some(onload.as_ref().unchecked_ref()));
    image.set_onerror(Some(onerror.as_ref().unchecked_ref()));
    onload.forget();
    onerror.forget();

    image.set_src(src);
    Some(image)
}

pub fn resize_player(player: &SharedPlayer) {
    let container_size = player.borrow().surface().container_size();
    player
        .borrow_mut()
        .resize(container_size, device_pixel_ratio());
}

/// Hooks the player up to window resizes, a one-off resize once layout has
/// settled, and an optional periodic check.
pub fn watch_container_size(player: &SharedPlayer) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let (settle_ms, poll_ms) = {
        let player = player.borrow();
        (player.config.resize_settle_ms, player.config.resize_poll_ms)
    };

    let on_resize = {
        let player = player.clone();
        Closure::<dyn FnMut()>::new(move || resize_player(&player))
    };
    window.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())?;
    window.set_timeout_with_callback_and_timeout_and_arguments_0(
        on_resize.as_ref().unchecked_ref(),
        settle_ms,
    )?;
    if poll_ms > 0 {
        window.set_interval_with_callback_and_timeout_and_arguments_0(
            on_resize.as_ref().unchecked_ref(),
            poll_ms,
        )?;
    }
    on_resize.forget();
    Ok(())
}

fn request_animation_frame(f: &Closure<dyn FnMut(f64)>) {
    if let Some(window) = web_sys::window() {
        if let Err(err) = window.request_animation_frame(f.as_ref().unchecked_ref()) {
            warn!("requestAnimationFrame failed: {:?}", err);
        }
    }
}

/// Drives `SequencePlayer::tick` from `requestAnimationFrame`.
///
/// One callback closure serves every loop the player starts. `FrameRequests`
/// keeps at most one animation frame request pending, so a pause followed by
/// a quick play never ends up with two loops.
pub struct FrameLoop {
    callback: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>,
    requests: Rc<RefCell<FrameRequests>>,
}

impl FrameLoop {
    pub fn new(player: SharedPlayer) -> FrameLoop {
        let callback: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
        let requests = Rc::new(RefCell::new(FrameRequests::default()));

        let cb = {
            let callback = callback.clone();
            let requests = requests.clone();
            Closure::<dyn FnMut(f64)>::new(move |timestamp: f64| {
                let token = match requests.borrow_mut().fire() {
                    Some(token) => token,
                    None => return,
                };
                let outcome = player.borrow_mut().tick(token, timestamp);
                if outcome.should_reschedule() && requests.borrow_mut().reschedule() {
                    if let Some(cb) = callback.borrow().as_ref() {
                        request_animation_frame(cb);
                    }
                }
            })
        };
        callback.replace(Some(cb));

        FrameLoop { callback, requests }
    }

    pub fn start(&self, token: LoopToken) {
        if !self.requests.borrow_mut().start(token) {
            return;
        }
        if let Some(cb) = self.callback.borrow().as_ref() {
            request_animation_frame(cb);
        }
    }
}

/// Plays the sequence while enough of the canvas is in view.
pub fn watch_visibility(
    player: &SharedPlayer,
    frame_loop: Rc<FrameLoop>,
) -> Result<IntersectionObserver, JsValue> {
    let threshold = player.borrow().config.visibility_threshold;
    let on_intersect = {
        let player = player.clone();
        Closure::<dyn FnMut(js_sys::Array, IntersectionObserver)>::new(
            move |entries: js_sys::Array, _observer: IntersectionObserver| {
                for entry in entries.iter() {
                    let entry: IntersectionObserverEntry = entry.unchecked_into();
                    let token = player.borrow_mut().on_visibility(
                        entry.is_intersecting(),
                        entry.intersection_ratio(),
                        now(),
                    );
                    if let Some(token) = token {
                        frame_loop.start(token);
                    }
                }
            },
        )
    };

    let options = IntersectionObserverInit::new();
    options.set_threshold(&JsValue::from_f64(threshold));
    let observer =
        IntersectionObserver::new_with_options(on_intersect.as_ref().unchecked_ref(), &options)?;
    on_intersect.forget();
    observer.observe(&player.borrow().surface().canvas);
    Ok(observer)
}
