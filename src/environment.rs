//! Live environment input (weather, wind, temperature, time of day) and the
//! `environment-override` broadcast that replaces parts of it.

use std::time::Duration;

use leptos::leptos_dom::helpers::set_interval_with_handle;
use leptos::prelude::*;
use send_wrapper::SendWrapper;
use serde::Deserialize;
use wasm_bindgen::JsCast;
use web_sys::CustomEvent;

use crate::components::network_mesh::WindowListener;

/// Name of the window event carrying environment overrides.
pub const OVERRIDE_EVENT: &str = "environment-override";

const CLOCK_REFRESH: Duration = Duration::from_secs(60);

/// Normalised weather condition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weather {
	/// Clear sky.
	#[default]
	Clear,
	/// Overcast.
	Clouds,
	/// Rain or drizzle.
	Rain,
	/// Snow.
	Snow,
	/// Fog or mist.
	Fog,
	/// Thunderstorm.
	Storm,
}

/// Bucketed local time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
	/// 05–07h.
	Dawn,
	/// 07–12h.
	Morning,
	/// 12–17h.
	#[default]
	Afternoon,
	/// 17–20h.
	Evening,
	/// Everything else.
	Night,
}

impl TimeOfDay {
	/// Bucket for a local hour in `0..24`.
	pub fn from_hour(hour: u32) -> Self {
		match hour {
			5..=6 => TimeOfDay::Dawn,
			7..=11 => TimeOfDay::Morning,
			12..=16 => TimeOfDay::Afternoon,
			17..=19 => TimeOfDay::Evening,
			_ => TimeOfDay::Night,
		}
	}
}

/// Hour of the browser's local clock.
pub fn local_hour() -> u32 {
	js_sys::Date::new_0().get_hours()
}

/// Environment record delivered by the weather collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentState {
	/// Current weather condition.
	pub weather: Weather,
	/// Wind speed in km/h.
	pub wind_speed: f64,
	/// Temperature in °C.
	pub temperature: f64,
	/// Relative humidity in percent.
	pub humidity: f64,
	/// Local time bucket.
	pub time_of_day: TimeOfDay,
}

impl Default for EnvironmentState {
	fn default() -> Self {
		Self {
			weather: Weather::Clear,
			wind_speed: 10.0,
			temperature: 20.0,
			humidity: 50.0,
			time_of_day: TimeOfDay::Afternoon,
		}
	}
}

impl EnvironmentState {
	/// Default conditions at the given local hour.
	pub fn at_hour(hour: u32) -> Self {
		Self {
			time_of_day: TimeOfDay::from_hour(hour),
			..Self::default()
		}
	}
}

/// Detail payload of [`OVERRIDE_EVENT`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentOverride {
	/// `false` drops every override and returns to the live values.
	pub enabled: bool,
	/// Replacement time bucket.
	pub time_of_day: Option<TimeOfDay>,
	/// Replacement weather.
	pub weather: Option<Weather>,
	/// Replacement temperature.
	pub temperature: Option<f64>,
	/// Replacement humidity.
	pub humidity: Option<f64>,
	/// Replacement wind speed.
	pub wind_speed: Option<f64>,
}

impl EnvironmentOverride {
	/// Decodes the JSON form of an event detail.
	pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(json)
	}

	/// Layers the present fields over `base`.
	pub fn apply(&self, base: &EnvironmentState) -> EnvironmentState {
		if !self.enabled {
			return *base;
		}
		EnvironmentState {
			weather: self.weather.unwrap_or(base.weather),
			wind_speed: self.wind_speed.unwrap_or(base.wind_speed),
			temperature: self.temperature.unwrap_or(base.temperature),
			humidity: self.humidity.unwrap_or(base.humidity),
			time_of_day: self.time_of_day.unwrap_or(base.time_of_day),
		}
	}
}

/// Parses a stringified event detail. `None` when the detail had no JSON
/// form or did not decode.
fn parse_detail(json: Option<String>) -> Option<EnvironmentOverride> {
	let Some(json) = json else {
		log::warn!("ignoring {OVERRIDE_EVENT} without a JSON detail");
		return None;
	};
	match EnvironmentOverride::from_json(&json) {
		Ok(overrides) => Some(overrides),
		Err(err) => {
			log::warn!("ignoring malformed {OVERRIDE_EVENT} detail: {err}");
			None
		}
	}
}

fn decode_event(event: &web_sys::Event) -> Option<EnvironmentOverride> {
	let detail = event.dyn_ref::<CustomEvent>()?.detail();
	// stringify yields `undefined` for details JSON cannot represent
	let json = js_sys::JSON::stringify(&detail).ok()?;
	parse_detail(json.as_string())
}

/// Environment signal seeded with `base`. The time of day follows the local
/// clock, and override broadcasts are layered on top until the owning
/// component is cleaned up.
pub fn use_environment(base: EnvironmentState) -> Signal<EnvironmentState> {
	let (live, set_live) = signal(base);
	let (overrides, set_overrides) = signal(None::<EnvironmentOverride>);

	let listener = WindowListener::register(OVERRIDE_EVENT, move |event| {
		if let Some(next) = decode_event(&event) {
			log::debug!("environment override: {:?}", next);
			set_overrides.set(Some(next));
		}
	});
	match listener {
		Ok(listener) => {
			let listener = SendWrapper::new(listener);
			on_cleanup(move || {
				let mut listener = listener.take();
				listener.remove();
			});
		}
		Err(err) => log::warn!("environment overrides unavailable: {err}"),
	}

	let clock = set_interval_with_handle(
		move || {
			let time_of_day = TimeOfDay::from_hour(local_hour());
			if live.get_untracked().time_of_day != time_of_day {
				log::debug!("time of day is now {:?}", time_of_day);
				set_live.update(|env| env.time_of_day = time_of_day);
			}
		},
		CLOCK_REFRESH,
	);
	match clock {
		Ok(handle) => on_cleanup(move || handle.clear()),
		Err(err) => log::warn!("time of day will not refresh: {:?}", err),
	}

	Memo::new(move |_| {
		let live = live.get();
		match overrides.get() {
			Some(overrides) => overrides.apply(&live),
			None => live,
		}
	})
	.into()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn override_fields_replace_base() {
		let overrides = EnvironmentOverride::from_json(
			r#"{"enabled":true,"weather":"storm","windSpeed":40,"timeOfDay":"evening"}"#,
		)
		.unwrap();
		let env = overrides.apply(&EnvironmentState::default());
		assert_eq!(env.weather, Weather::Storm);
		assert_eq!(env.wind_speed, 40.0);
		assert_eq!(env.time_of_day, TimeOfDay::Evening);
		assert_eq!(env.temperature, 20.0);
	}

	#[test]
	fn disabled_override_restores_base() {
		let overrides =
			EnvironmentOverride::from_json(r#"{"enabled":false,"weather":"snow"}"#).unwrap();
		let base = EnvironmentState {
			temperature: -3.0,
			..EnvironmentState::default()
		};
		assert_eq!(overrides.apply(&base), base);
	}

	#[test]
	fn hours_fall_into_buckets() {
		let cases = [
			(0, TimeOfDay::Night),
			(4, TimeOfDay::Night),
			(5, TimeOfDay::Dawn),
			(6, TimeOfDay::Dawn),
			(7, TimeOfDay::Morning),
			(11, TimeOfDay::Morning),
			(12, TimeOfDay::Afternoon),
			(16, TimeOfDay::Afternoon),
			(17, TimeOfDay::Evening),
			(19, TimeOfDay::Evening),
			(20, TimeOfDay::Night),
			(23, TimeOfDay::Night),
		];
		for (hour, expected) in cases {
			assert_eq!(TimeOfDay::from_hour(hour), expected, "hour {hour}");
		}
	}

	#[test]
	fn base_follows_the_hour() {
		let night = EnvironmentState::at_hour(22);
		assert_eq!(night.time_of_day, TimeOfDay::Night);
		assert_eq!(night.wind_speed, 10.0);
		assert_eq!(night.weather, Weather::Clear);

		// overrides still win over the clock
		let overrides =
			EnvironmentOverride::from_json(r#"{"enabled":true,"timeOfDay":"morning"}"#).unwrap();
		assert_eq!(overrides.apply(&night).time_of_day, TimeOfDay::Morning);
	}

	#[test]
	fn details_without_json_are_ignored() {
		assert_eq!(parse_detail(None), None);
		assert_eq!(parse_detail(Some("not json".into())), None);
		let parsed = parse_detail(Some(r#"{"enabled":true,"weather":"rain"}"#.into()));
		assert_eq!(parsed.and_then(|o| o.weather), Some(Weather::Rain));
	}

	#[test]
	fn unknown_weather_is_rejected() {
		assert!(EnvironmentOverride::from_json(r#"{"enabled":true,"weather":"hail"}"#).is_err());
	}

	#[test]
	fn full_record_decodes() {
		let env: EnvironmentState = serde_json::from_str(
			r#"{"weather":"fog","windSpeed":5,"temperature":12,"humidity":95,"timeOfDay":"morning"}"#,
		)
		.unwrap();
		assert_eq!(env.weather, Weather::Fog);
		assert_eq!(env.time_of_day, TimeOfDay::Morning);
	}
}
