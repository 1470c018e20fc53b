use serde::Serialize;
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

use crate::duel::{Command, Duel};
use crate::events::{EventLog, MatchEvent};
use crate::session::Side;
use crate::settings::MatchSettings;
use crate::view::DuelView;

/// What the page redraws after each call: the boards and what happened.
#[derive(Serialize)]
pub struct Frame {
    pub view: DuelView,
    pub events: Vec<MatchEvent>,
}

/// Browser handle over one match. The page owns the timers: it ticks each side
/// every `dropInterval(side)` ms and calls `endSlowdown` once a slowdown has
/// lasted `slowdownDurationMs`.
#[wasm_bindgen]
pub struct DuelClient {
    duel: Duel<EventLog>,
}

impl DuelClient {
    pub fn with_settings(settings: MatchSettings) -> Self {
        Self {
            duel: Duel::new(settings, EventLog::new()),
        }
    }

    fn frame(&mut self) -> Frame {
        Frame {
            view: self.duel.snapshot(),
            events: self.duel.observer_mut().drain(),
        }
    }

    fn tick_side(&mut self, side: usize) -> Result<Frame, String> {
        let side = Side::from_index(side).ok_or("invalid side index")?;
        self.duel.tick(side);
        Ok(self.frame())
    }

    fn apply(&mut self, side: usize, command: &str) -> Result<bool, String> {
        let side = Side::from_index(side).ok_or("invalid side index")?;
        let command: Command = command.parse()?;
        self.duel.apply_input(side, command)
    }
}

#[wasm_bindgen]
impl DuelClient {
    #[wasm_bindgen(constructor)]
    pub fn new(settings: JsValue) -> Result<DuelClient, JsValue> {
        let settings: MatchSettings = if settings.is_undefined() || settings.is_null() {
            MatchSettings::default()
        } else {
            from_value(settings)?
        };
        settings.validate().map_err(|e| JsValue::from_str(&e))?;
        Ok(Self::with_settings(settings))
    }

    #[wasm_bindgen(js_name = tick)]
    pub fn tick(&mut self, side: usize) -> Result<JsValue, JsValue> {
        let frame = self.tick_side(side).map_err(|e| JsValue::from_str(&e))?;
        to_value(&frame).map_err(|e| e.into())
    }

    #[wasm_bindgen(js_name = tickJson)]
    pub fn tick_json(&mut self, side: usize) -> Result<String, JsValue> {
        let frame = self.tick_side(side).map_err(|e| JsValue::from_str(&e))?;
        serde_json::to_string(&frame).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Applies a key command (`left`, `right`, `down`, `rotate`) to `side`.
    #[wasm_bindgen(js_name = input)]
    pub fn input(&mut self, side: usize, command: &str) -> Result<bool, JsValue> {
        self.apply(side, command).map_err(|e| JsValue::from_str(&e))
    }

    #[wasm_bindgen(js_name = endSlowdown)]
    pub fn end_slowdown(&mut self) {
        self.duel.end_slowdown();
    }

    #[wasm_bindgen(js_name = dropInterval)]
    pub fn drop_interval(&self, side: usize) -> u32 {
        Side::from_index(side)
            .map(|s| self.duel.drop_interval(s))
            .unwrap_or(self.duel.settings().base_interval_ms)
    }

    #[wasm_bindgen(js_name = slowdownDurationMs)]
    pub fn slowdown_duration_ms(&self) -> u32 {
        self.duel.settings().slowdown_duration_ms
    }

    #[wasm_bindgen(js_name = isFinished)]
    pub fn is_finished(&self) -> bool {
        self.duel.is_finished()
    }

    #[wasm_bindgen(js_name = snapshot)]
    pub fn snapshot(&mut self) -> Result<JsValue, JsValue> {
        to_value(&self.frame()).map_err(|e| e.into())
    }

    #[wasm_bindgen(js_name = snapshotJson)]
    pub fn snapshot_json(&mut self) -> Result<String, JsValue> {
        serde_json::to_string(&self.frame()).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}
