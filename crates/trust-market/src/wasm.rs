//! WASM bindings for the browser front end
//!
//! The page owns the clock: it calls `tick()` once a second during discussion
//! and renders whatever `state()` returns.

#![cfg(feature = "wasm")]

use round_logic::{describe_strategy, payoff, GameMode, Move, Strategy};
use serde::Serialize;
use serde_wasm_bindgen::Serializer;
use wasm_bindgen::prelude::*;

use crate::config::GameConfig;
use crate::debrief::DebriefSummary;
use crate::state::GameSession;
use crate::transitions::SessionEvent;

/// Maps become plain objects; u64 values past 2^53 become BigInt instead of failing.
fn serializer() -> Serializer {
    Serializer::new()
        .serialize_maps_as_objects(true)
        .serialize_large_number_types_as_bigints(true)
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsError> {
    value
        .serialize(&serializer())
        .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}

/// A game in progress, driven from JavaScript
#[wasm_bindgen]
pub struct WasmGame {
    session: GameSession,
    topics: Vec<String>,
}

#[wasm_bindgen]
impl WasmGame {
    /// Start a game.
    ///
    /// # Arguments
    /// * `config_json` - JSON serialized GameConfig; missing fields take defaults
    /// * `topics` - array of discussion prompts
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str, topics: JsValue) -> Result<WasmGame, JsError> {
        let config = GameConfig::from_json(config_json)
            .map_err(|e| JsError::new(&format!("Invalid config: {}", e)))?;
        let topics: Vec<String> = serde_wasm_bindgen::from_value(topics)
            .map_err(|e| JsError::new(&format!("Invalid topics: {}", e)))?;

        let session = GameSession::start_game(config, &topics)
            .map_err(|e| JsError::new(&e.to_string()))?;
        Ok(WasmGame { session, topics })
    }

    /// Session state as a plain object (random generator state left out)
    pub fn state(&self) -> Result<JsValue, JsError> {
        to_js(&self.session.view())
    }

    pub fn phase(&self) -> String {
        self.session.phase().to_string()
    }

    pub fn tick(&mut self) -> Result<JsValue, JsError> {
        self.step(SessionEvent::Tick)
    }

    pub fn skip_discussion(&mut self) -> Result<JsValue, JsError> {
        self.step(SessionEvent::SkipDiscussion)
    }

    pub fn post_message(&mut self, text: &str) -> Result<JsValue, JsError> {
        self.step(SessionEvent::Chat(text.to_string()))
    }

    pub fn post_agent_message(&mut self, agent_id: &str, text: &str) -> Result<JsValue, JsError> {
        self.step(SessionEvent::AgentChat {
            agent_id: agent_id.to_string(),
            text: text.to_string(),
        })
    }

    /// `choice` is "cooperate" or "defect"
    pub fn submit_choice(&mut self, choice: &str) -> Result<JsValue, JsError> {
        let choice: Move = choice.parse().map_err(|e: String| JsError::new(&e))?;
        self.step(SessionEvent::Choose(choice))
    }

    pub fn continue_to_next_round(&mut self) -> Result<JsValue, JsError> {
        self.step(SessionEvent::Continue)
    }

    pub fn play_again(&mut self) -> Result<JsValue, JsError> {
        self.step(SessionEvent::PlayAgain)
    }

    /// Final summary; throws before the game is over.
    pub fn debrief(&self) -> Result<JsValue, JsError> {
        let summary = self.session.debrief().map_err(|e| JsError::new(&e.to_string()))?;
        to_js(&summary)
    }

    /// Summary of the game so far, available in any phase
    pub fn progress(&self) -> Result<JsValue, JsError> {
        to_js(&DebriefSummary::from_session(&self.session))
    }
}

impl WasmGame {
    /// Commits the next session only once its view has been handed to JS.
    fn step(&mut self, event: SessionEvent) -> Result<JsValue, JsError> {
        let next = self
            .session
            .apply(event, &self.topics)
            .map_err(|e| JsError::new(&e.to_string()))?;
        let js = to_js(&next.view())?;
        self.session = next;
        Ok(js)
    }
}

#[derive(Serialize)]
struct StrategyInfo {
    id: String,
    name: &'static str,
    description: &'static str,
}

/// Get every agent strategy with its description
#[wasm_bindgen]
pub fn get_strategy_types() -> Result<JsValue, JsError> {
    let types: Vec<StrategyInfo> = Strategy::ALL
        .iter()
        .map(|s| StrategyInfo {
            id: format!("{:?}", s),
            name: s.label(),
            description: describe_strategy(*s),
        })
        .collect();
    to_js(&types)
}

#[derive(Serialize)]
struct PayoffCell {
    human: Move,
    ai: Move,
    human_payoff: u8,
    ai_payoff: u8,
}

/// Get the four cells of the payoff matrix
#[wasm_bindgen]
pub fn get_payoff_matrix() -> Result<JsValue, JsError> {
    let moves = [Move::Cooperate, Move::Defect];
    let cells: Vec<PayoffCell> = moves
        .iter()
        .flat_map(|h| moves.iter().map(move |a| (*h, *a)))
        .map(|(human, ai)| {
            let p = payoff(human, ai);
            PayoffCell { human, ai, human_payoff: p.human, ai_payoff: p.ai }
        })
        .collect();
    to_js(&cells)
}

/// Expected game length for a mode given as JSON
#[wasm_bindgen]
pub fn get_expected_rounds(mode_json: &str) -> Result<f64, JsError> {
    let mode: GameMode = serde_json::from_str(mode_json)
        .map_err(|e| JsError::new(&format!("Invalid mode: {}", e)))?;
    Ok(mode.expected_rounds())
}
