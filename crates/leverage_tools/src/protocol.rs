//! JSON-lines play protocol.
//!
//! One JSON object per line in, one JSON object per line out:
//!
//! **Input (stdin):** an [`Intent`], or a control command (`query`, `quit`)
//! **Output (stdout):** the outcome of each intent, or the current state
//!
//! # Example Session
//!
//! ```text
//! <- {"type":"ready","version":"1.0","level":"city_hall","seed":7}
//! -> {"cmd":"scan","target":"mayor","fact":"office"}
//! <- {"type":"outcome","outcome":{"result":"scanned","content":"..."},"state":"ongoing"}
//! -> {"cmd":"hack","target":"mayor","fact":"office"}
//! <- {"type":"error","message":"Fact 'office' on target 'mayor' is already hacked","cmd":"hack"}
//! -> {"cmd":"end_day"}
//! <- {"type":"outcome","outcome":{"result":"day_ended","day":1,"state":"ongoing"},"state":"ongoing"}
//! -> {"cmd":"query"}
//! <- {"type":"state","day":1,...}
//! -> {"cmd":"quit"}
//! <- {"type":"bye","day":1,"hash":1234}
//! ```
//!
//! Every intent that parses is recorded in the session's [`Replay`], even
//! when the world rejects it.

use std::io::{self, BufRead, Write};

use leverage_core::data::LevelData;
use leverage_core::error::Result as GameResult;
use leverage_core::intent::{Intent, IntentOutcome};
use leverage_core::random::SeededRandom;
use leverage_core::replay::Replay;
use leverage_core::target::{Target, TargetState};
use leverage_core::traits::TargetTrait;
use leverage_core::world::{GameState, World};
use serde::{Deserialize, Serialize};

/// Protocol version reported in the ready message.
pub const PROTOCOL_VERSION: &str = "1.0";

// ============================================================================
// Input (controller -> session)
// ============================================================================

/// Session commands that are not game actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Control {
    /// Report the current state without changing it.
    Query,
    /// End the session.
    Quit,
}

/// One input line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Request {
    /// A session command.
    Control(Control),
    /// A game action.
    Intent(Intent),
}

// ============================================================================
// Output (session -> controller)
// ============================================================================

/// One output line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// The session is ready for input.
    Ready {
        /// Protocol version.
        version: String,
        /// Level being played.
        level: String,
        /// World seed.
        seed: u64,
    },
    /// An intent was accepted.
    Outcome {
        /// What it did.
        outcome: IntentOutcome,
        /// Game state afterwards.
        state: GameState,
    },
    /// Current state.
    State(StateView),
    /// A line was rejected.
    Error {
        /// Error message.
        message: String,
        /// Command that failed, when the line parsed.
        #[serde(skip_serializing_if = "Option::is_none")]
        cmd: Option<String>,
    },
    /// The session ended.
    Bye {
        /// Final day.
        day: u32,
        /// Final state hash.
        hash: u64,
    },
}

/// Player resources as reported to the controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    /// Action points left today.
    pub action_points: u32,
    /// Current stress.
    pub stress: f64,
    /// Current currency.
    pub currency: f64,
    /// Whether overwork was used today.
    pub overworked_today: bool,
}

/// One target as reported to the controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetView {
    /// Target name.
    pub name: String,
    /// State machine state.
    pub state: TargetState,
    /// Current stress.
    pub stress: i32,
    /// Stress at which the target breaks.
    pub max_stress: i32,
    /// Suspicion, 0 to 100.
    pub suspicion: i32,
    /// Current paranoia.
    pub paranoia: i32,
    /// Days until the next state check.
    pub countdown: i32,
    /// Trait flags.
    pub traits: Vec<TargetTrait>,
    /// Facts the player can see.
    pub visible: Vec<String>,
    /// Facts that can be scanned: hacked, or unlocked.
    pub hacked: Vec<String>,
    /// Facts scanned.
    pub scanned: Vec<String>,
    /// Scanned facts that can still be used.
    pub exposable: Vec<String>,
}

/// Full state snapshot for `query`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateView {
    /// Days elapsed.
    pub day: u32,
    /// Win/lose/ongoing.
    pub game_state: GameState,
    /// Player resources.
    pub player: PlayerView,
    /// Targets in name order.
    pub targets: Vec<TargetView>,
}

impl StateView {
    /// Capture the state of a world.
    #[must_use]
    pub fn capture(world: &World) -> Self {
        let player = world.player();
        Self {
            day: world.day(),
            game_state: world.game_state(),
            player: PlayerView {
                action_points: player.action_points(),
                stress: player.stress().to_num::<f64>(),
                currency: player.currency().to_num::<f64>(),
                overworked_today: player.overworked_today(),
            },
            targets: world
                .targets()
                .map(|target| target_view(world, target))
                .collect(),
        }
    }
}

fn target_view(world: &World, target: &Target) -> TargetView {
    let mut view = TargetView {
        name: target.name().to_owned(),
        state: target.state(),
        stress: target.stress(),
        max_stress: target.max_stress(),
        suspicion: target.suspicion(),
        paranoia: target.paranoia(),
        countdown: target.countdown(),
        traits: target.traits().iter().collect(),
        visible: Vec::new(),
        hacked: Vec::new(),
        scanned: Vec::new(),
        exposable: Vec::new(),
    };
    if let Ok(dossier) = world.dossier(target.name()) {
        view.visible = dossier.visible().iter().cloned().collect();
        view.hacked = dossier.hacked().iter().cloned().collect();
        view.scanned = dossier.summaries().keys().cloned().collect();
        view.exposable = dossier.exposable().iter().cloned().collect();
    }
    view
}

fn cmd_name(intent: &Intent) -> String {
    serde_json::to_value(intent)
        .ok()
        .and_then(|value| value.get("cmd").and_then(|c| c.as_str()).map(str::to_owned))
        .unwrap_or_default()
}

// ============================================================================
// Session
// ============================================================================

/// A game being played over the protocol.
#[derive(Debug)]
pub struct Session {
    world: World,
    replay: Replay,
    finished: bool,
}

impl Session {
    /// Start a session on `level` with `seed`.
    ///
    /// # Errors
    ///
    /// Returns an error if the level is invalid.
    pub fn new(level: LevelData, seed: u64) -> GameResult<Self> {
        let world = World::new(&level, SeededRandom::new(seed))?;
        Ok(Self {
            world,
            replay: Replay::new(level, seed),
            finished: false,
        })
    }

    /// The ready message.
    #[must_use]
    pub fn ready(&self) -> Response {
        Response::Ready {
            version: PROTOCOL_VERSION.to_string(),
            level: self.replay.level.name.clone(),
            seed: self.replay.seed,
        }
    }

    /// The world being played.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Whether `quit` was received.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Handle one input line.
    pub fn handle_line(&mut self, line: &str) -> Response {
        match serde_json::from_str::<Request>(line) {
            Ok(request) => self.handle(request),
            Err(e) => Response::Error {
                message: format!("Invalid command: {e}"),
                cmd: None,
            },
        }
    }

    /// Handle one parsed request.
    pub fn handle(&mut self, request: Request) -> Response {
        match request {
            Request::Control(Control::Query) => Response::State(StateView::capture(&self.world)),
            Request::Control(Control::Quit) => {
                self.finished = true;
                self.bye()
            }
            Request::Intent(intent) => {
                let result = self.world.apply(&intent);
                let cmd = cmd_name(&intent);
                self.replay.record(intent);
                match result {
                    Ok(outcome) => {
                        let state = self.world.game_state();
                        if state.is_over() {
                            tracing::info!(?state, day = self.world.day(), "Game over");
                        }
                        Response::Outcome { outcome, state }
                    }
                    Err(e) => Response::Error {
                        message: e.to_string(),
                        cmd: Some(cmd),
                    },
                }
            }
        }
    }

    fn bye(&self) -> Response {
        Response::Bye {
            day: self.world.day(),
            hash: self.world.state_hash(),
        }
    }

    /// Close the session, returning the finished replay.
    #[must_use]
    pub fn into_replay(mut self) -> Replay {
        self.replay.finalize(&self.world);
        self.replay
    }
}

fn write_response<W: Write>(output: &mut W, response: &Response) -> io::Result<()> {
    let json = serde_json::to_string(response).map_err(io::Error::other)?;
    writeln!(output, "{json}")?;
    output.flush()
}

/// Run a session over line-oriented input and output until `quit` or end
/// of input. Returns the recorded replay.
///
/// # Errors
///
/// Returns an error if reading or writing fails.
pub fn run_session<I: BufRead, W: Write>(
    mut session: Session,
    input: I,
    output: &mut W,
) -> io::Result<Replay> {
    write_response(output, &session.ready())?;

    for line in input.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = session.handle_line(line);
        write_response(output, &response)?;
        if session.is_finished() {
            break;
        }
    }

    if !session.is_finished() {
        write_response(output, &session.bye())?;
    }

    Ok(session.into_replay())
}
