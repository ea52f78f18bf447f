use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::prelude::*;

/// Coalesces repaint requests into one `requestAnimationFrame` callback.
///
/// The draw function returns `true` while a view animation is running, which
/// keeps frames coming without further `mark_dirty()` calls.
pub struct FrameScheduler {
    inner: Rc<Inner>,
}

struct Inner {
    window: Option<web_sys::Window>,
    dirty: Cell<bool>,
    pending: Cell<Option<i32>>,
    detached: Cell<bool>,
    callback: RefCell<Option<Closure<dyn FnMut()>>>,
}

impl Inner {
    fn request_frame(&self) {
        if self.pending.get().is_some() || self.detached.get() {
            return;
        }
        let Some(window) = self.window.as_ref() else {
            return;
        };
        let callback = self.callback.borrow();
        let Some(cb) = callback.as_ref() else {
            return;
        };
        if let Ok(id) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
            self.pending.set(Some(id));
        }
    }
}

impl FrameScheduler {
    pub fn new(draw: impl Fn() -> bool + 'static) -> Self {
        let inner = Rc::new(Inner {
            window: web_sys::window(),
            dirty: Cell::new(false),
            pending: Cell::new(None),
            detached: Cell::new(false),
            callback: RefCell::new(None),
        });

        let frame_inner = inner.clone();
        let cb = Closure::<dyn FnMut()>::new(move || {
            frame_inner.pending.set(None);
            if !frame_inner.dirty.replace(false) || frame_inner.detached.get() {
                return;
            }
            if draw() {
                frame_inner.dirty.set(true);
                frame_inner.request_frame();
            }
        });
        *inner.callback.borrow_mut() = Some(cb);

        Self { inner }
    }

    pub fn mark_dirty(&self) {
        self.inner.dirty.set(true);
        self.inner.request_frame();
    }

    /// Stop drawing for good; pending frames are cancelled.
    pub fn detach(&self) {
        self.inner.detached.set(true);
        self.inner.dirty.set(false);
        if let Some(id) = self.inner.pending.take()
            && let Some(window) = self.inner.window.as_ref()
        {
            let _ = window.cancel_animation_frame(id);
        }
    }
}

impl Drop for FrameScheduler {
    fn drop(&mut self) {
        self.detach();
        // closure holds an Rc to inner
        self.inner.callback.borrow_mut().take();
    }
}
