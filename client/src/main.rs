mod api;
mod app;
mod boundary;
mod locate;
mod map;
mod popup;
mod render;
mod render_loop;
mod search;
mod sidebar;
mod tiles;

use std::any::Any;
use std::cell::RefCell;

use wasm_bindgen::JsCast;
use web_sys::HtmlElement;

const MOUNT_NODE_ID: &str = "app";

thread_local! {
    // Keeps the viewer alive; replacing it unmounts the previous tree.
    static VIEWER: RefCell<Option<Box<dyn Any>>> = const { RefCell::new(None) };
}

/// The `#app` node from index.html, or the body when the page has none.
fn mount_target() -> Option<HtmlElement> {
    let document = web_sys::window()?.document()?;
    document
        .get_element_by_id(MOUNT_NODE_ID)
        .and_then(|node| node.dyn_into::<HtmlElement>().ok())
        .or_else(|| document.body())
}

fn start_viewer(target: HtmlElement) {
    VIEWER.with(|viewer| {
        drop(viewer.borrow_mut().take());
        let handle = leptos::mount::mount_to(target, app::App);
        viewer.replace(Some(Box::new(handle)));
    });
}

fn main() {
    console_error_panic_hook::set_once();
    match mount_target() {
        Some(target) => start_viewer(target),
        None => web_sys::console::warn_1(&"no document to mount the map viewer into".into()),
    }
}
