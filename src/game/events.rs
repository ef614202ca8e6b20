//! Fight events and the acknowledged hand-off to the renderer.
//!
//! The engine pushes one event at a time and does not continue until the
//! consumer calls [`PendingEvent::acknowledge`]. Dropping the receiver (or a
//! pending event) abandons the fight.

use serde::Serialize;
use serde_json::{Map, Value};
use tokio::sync::{mpsc, oneshot};

use crate::game::fight::FightOutcome;
use crate::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "name", content = "values")]
pub enum FightEvent {
    #[serde(rename = "round")]
    Round { round: u32 },
    #[serde(rename = "round_over")]
    RoundOver { round: u32 },
    #[serde(rename = "game:select", rename_all = "camelCase")]
    GameSelect { card: String, is_boss: bool },
    #[serde(rename = "player:select")]
    PlayerSelect { card: String },
    #[serde(rename = "game:attack")]
    GameAttack {
        card: String,
        enemy: String,
        damage: u32,
    },
    #[serde(rename = "player:attack")]
    PlayerAttack {
        card: String,
        enemy: String,
        damage: u32,
    },
    #[serde(rename = "result")]
    Result { result: FightOutcome },
    #[serde(rename = "gameOver", rename_all = "camelCase")]
    GameOver {
        result: FightOutcome,
        reward_text: Option<String>,
    },
}

impl FightEvent {
    pub fn name(&self) -> &'static str {
        match self {
            FightEvent::Round { .. } => "round",
            FightEvent::RoundOver { .. } => "round_over",
            FightEvent::GameSelect { .. } => "game:select",
            FightEvent::PlayerSelect { .. } => "player:select",
            FightEvent::GameAttack { .. } => "game:attack",
            FightEvent::PlayerAttack { .. } => "player:attack",
            FightEvent::Result { .. } => "result",
            FightEvent::GameOver { .. } => "gameOver",
        }
    }

    /// Payload handed to the renderer alongside [`FightEvent::name`]: the
    /// `values` half of the serialized event.
    pub fn values(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(mut event)) => match event.remove("values") {
                Some(Value::Object(values)) => values,
                _ => Map::new(),
            },
            _ => Map::new(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, FightEvent::GameOver { .. })
    }
}

/// An event waiting for the renderer to finish with it.
#[derive(Debug)]
pub struct PendingEvent {
    pub event: FightEvent,
    ack: oneshot::Sender<()>,
}

impl PendingEvent {
    pub fn acknowledge(self) {
        let _ = self.ack.send(());
    }
}

/// Engine side of the rendezvous.
#[derive(Debug)]
pub struct EventEmitter {
    sender: mpsc::Sender<PendingEvent>,
}

/// Renderer side of the rendezvous.
#[derive(Debug)]
pub struct EventReceiver {
    receiver: mpsc::Receiver<PendingEvent>,
}

pub fn event_channel() -> (EventEmitter, EventReceiver) {
    let (sender, receiver) = mpsc::channel(1);
    (EventEmitter { sender }, EventReceiver { receiver })
}

impl EventEmitter {
    /// Hands `event` to the renderer and suspends until it is acknowledged.
    pub async fn emit(&self, event: FightEvent) -> AppResult<()> {
        let (ack, acknowledged) = oneshot::channel();
        tracing::trace!(event = event.name(), "emitting fight event");
        self.sender
            .send(PendingEvent { event, ack })
            .await
            .map_err(|_| AppError::RendererDisconnected)?;
        acknowledged
            .await
            .map_err(|_| AppError::RendererDisconnected)
    }
}

impl EventReceiver {
    pub async fn next(&mut self) -> Option<PendingEvent> {
        self.receiver.recv().await
    }

    /// Acknowledges every event immediately and returns them in order.
    pub async fn collect_all(mut self) -> Vec<FightEvent> {
        let mut events = Vec::new();
        while let Some(pending) = self.next().await {
            events.push(pending.event.clone());
            pending.acknowledge();
        }
        events
    }
}
