use leptos::prelude::*;

use crate::components::network_mesh::{MeshConfig, NetworkMeshCanvas};
use crate::environment::{EnvironmentState, local_hour, use_environment};
use crate::theme::{Theme, toggle_document_theme, use_document_theme};

/// Optional `<script id="mesh-config" type="application/json">` override.
fn page_mesh_config() -> Option<MeshConfig> {
	let script = web_sys::window()?
		.document()?
		.get_element_by_id("mesh-config")?;
	let json = script.text_content()?;
	match MeshConfig::from_json(&json) {
		Ok(config) => Some(config),
		Err(err) => {
			log::warn!("{err}; using the default mesh config");
			None
		}
	}
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let theme = use_document_theme();
	let environment = use_environment(EnvironmentState::at_hour(local_hour()));
	let config = page_mesh_config();

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="hero">
				<NetworkMeshCanvas
					theme=theme
					environment=environment
					config=config.unwrap_or_default()
				/>
				<button
					class="theme-toggle"
					aria-label="Toggle theme"
					on:click=move |_| toggle_document_theme()
				>
					{move || if theme.get() == Theme::Dark { "Light" } else { "Dark" }}
				</button>
				<main class="hero-content">
					<h1 class="hero-title">"Network Mesh"</h1>
					<p class="subtitle">"Move the pointer across the mesh. It follows your weather and time of day."</p>
				</main>
			</div>
		</ErrorBoundary>
	}
}
