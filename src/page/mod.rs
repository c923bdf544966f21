pub mod anchors;
pub mod reveal;

use std::{cell::RefCell, rc::Rc};

use log::debug;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, Event, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit, ScrollBehavior, ScrollIntoViewOptions,
};

use anchors::{fragment_selector, ANCHOR_SELECTOR};
use reveal::{
    reveal_selector, RevealAction, RevealTracker, HIDDEN_CLASS, REVEAL_ROOT_MARGIN,
    REVEAL_THRESHOLD, VISIBLE_CLASS,
};

fn query_elements(document: &Document, selector: &str) -> Result<Vec<Element>, JsValue> {
    let nodes = document.query_selector_all(selector)?;
    Ok((0..nodes.length())
        .filter_map(|i| nodes.get(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect())
}

fn scroll_to_fragment(document: &Document, href: &str) {
    let target = fragment_selector(href).and_then(|selector| {
        // Invalid selectors are treated like missing targets.
        document.query_selector(selector).ok().flatten()
    });
    match target {
        Some(target) => {
            let options = ScrollIntoViewOptions::new();
            options.set_behavior(ScrollBehavior::Smooth);
            target.scroll_into_view_with_scroll_into_view_options(&options);
        }
        None => debug!("No scroll target for '{}'", href),
    }
}

/// Replaces the jump of every in-page link with a smooth scroll. Returns
/// the number of links handled.
pub fn mount_smooth_scroll(document: &Document) -> Result<usize, JsValue> {
    let anchors = query_elements(document, ANCHOR_SELECTOR)?;
    for anchor in &anchors {
        let on_click = {
            let document = document.clone();
            let anchor = anchor.clone();
            Closure::<dyn FnMut(Event)>::new(move |event: Event| {
                event.prevent_default();
                if let Some(href) = anchor.get_attribute("href") {
                    scroll_to_fragment(&document, &href);
                }
            })
        };
        anchor.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
        on_click.forget();
    }
    Ok(anchors.len())
}

/// Hides the content sections and fades each one in the first time it
/// scrolls into view. Returns the number of elements watched.
pub fn mount_reveal(document: &Document) -> Result<usize, JsValue> {
    let tracker: Rc<RefCell<RevealTracker<Element>>> = Rc::new(RefCell::new(RevealTracker::new()));

    let on_intersect = {
        let tracker = tracker.clone();
        Closure::<dyn FnMut(js_sys::Array, IntersectionObserver)>::new(
            move |entries: js_sys::Array, observer: IntersectionObserver| {
                for entry in entries.iter() {
                    let entry: IntersectionObserverEntry = entry.unchecked_into();
                    let target = entry.target();
                    let action = tracker
                        .borrow_mut()
                        .on_intersection(&target, entry.is_intersecting());
                    if action == RevealAction::Reveal {
                        target.class_list().add_1(VISIBLE_CLASS).unwrap_or(());
                        observer.unobserve(&target);
                    }
                }
            },
        )
    };

    let options = IntersectionObserverInit::new();
    options.set_threshold(&JsValue::from_f64(REVEAL_THRESHOLD));
    options.set_root_margin(REVEAL_ROOT_MARGIN);
    let observer =
        IntersectionObserver::new_with_options(on_intersect.as_ref().unchecked_ref(), &options)?;
    on_intersect.forget();

    let elements = query_elements(document, &reveal_selector())?;
    for element in elements {
        element.class_list().add_1(HIDDEN_CLASS)?;
        observer.observe(&element);
        tracker.borrow_mut().watch(element);
    }
    let watched = tracker.borrow().pending();
    Ok(watched)
}
