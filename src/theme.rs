//! Light/dark theme kept as a `dark` class on `<html>`.

use leptos::prelude::*;
use send_wrapper::SendWrapper;
use wasm_bindgen::prelude::*;
use web_sys::{Element, MutationObserver, MutationObserverInit};

pub use crate::components::network_mesh::Theme;

const DARK_CLASS: &str = "dark";

fn root_element() -> Option<Element> {
	web_sys::window()?.document()?.document_element()
}

/// Theme currently set on the document root.
pub fn document_theme() -> Theme {
	match root_element() {
		Some(root) if root.class_list().contains(DARK_CLASS) => Theme::Dark,
		_ => Theme::Light,
	}
}

/// Flips the root class; observers pick the change up.
pub fn toggle_document_theme() {
	if let Some(root) = root_element() {
		if let Err(err) = root.class_list().toggle(DARK_CLASS) {
			log::warn!("theme toggle failed: {:?}", err);
		}
	}
}

struct RootObserver {
	observer: MutationObserver,
	_callback: Closure<dyn FnMut(js_sys::Array, MutationObserver)>,
}

fn observe_root(
	root: &Element,
	mut on_change: impl FnMut() + 'static,
) -> Result<RootObserver, JsValue> {
	let callback = Closure::<dyn FnMut(js_sys::Array, MutationObserver)>::new(
		move |_: js_sys::Array, _: MutationObserver| on_change(),
	);
	let observer = MutationObserver::new(callback.as_ref().unchecked_ref())?;
	let init = MutationObserverInit::new();
	init.set_attributes(true);
	init.set_attribute_filter(&js_sys::Array::of1(&JsValue::from_str("class")));
	observer.observe_with_options(root, &init)?;
	Ok(RootObserver {
		observer,
		_callback: callback,
	})
}

/// Theme signal that follows class changes on `<html>` for as long as the
/// calling component lives.
pub fn use_document_theme() -> ReadSignal<Theme> {
	let (theme, set_theme) = signal(document_theme());
	let Some(root) = root_element() else {
		return theme;
	};

	let on_change = move || {
		let next = document_theme();
		if theme.get_untracked() != next {
			log::debug!("theme changed to {:?}", next);
			set_theme.set(next);
		}
	};

	match observe_root(&root, on_change) {
		Ok(observer) => {
			let observer = SendWrapper::new(observer);
			on_cleanup(move || observer.take().observer.disconnect());
		}
		Err(err) => log::warn!("theme changes will not be observed: {:?}", err),
	}

	theme
}
