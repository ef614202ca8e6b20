//! Fight engine: wave combat, optional boss combat, resolution.
//!
//! Each round the enemy side strikes first, then the player's card if it
//! survived. Every step is announced through the [`EventEmitter`] and the
//! engine waits for the renderer before taking the next one.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::validation::validate_difficulty;
use crate::game::cards_types::Card;
use crate::game::collection::Collection;
use crate::game::decks::Deck;
use crate::game::dungeon::Dungeon;
use crate::game::element::{calculate_damage, ElementType};
use crate::game::events::{EventEmitter, FightEvent};
use crate::AppResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FightOutcome {
    Win,
    Loss,
}

impl fmt::Display for FightOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FightOutcome::Win => write!(f, "win"),
            FightOutcome::Loss => write!(f, "loss"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FightState {
    WaveCombat,
    BossCombat,
    Resolved(FightOutcome),
}

#[derive(Debug, Clone)]
pub struct FightReport {
    pub outcome: FightOutcome,
    pub rounds: u32,
    pub finishing_card: Option<String>,
    pub reward_text: Option<String>,
    /// The rewarded collection on a win, None on a loss.
    pub collection: Option<Collection>,
}

pub struct FightEngine<'a> {
    dungeon: &'a mut Dungeon,
    player_collection: Collection,
    player_deck: Deck,
    wave: Deck,
    player_cursor: usize,
    enemy_cursor: usize,
    player_revealed: Option<usize>,
    enemy_revealed: Option<usize>,
    boss_revealed: bool,
    round: u32,
    state: FightState,
    difficulty: u8,
    rng: StdRng,
}

impl<'a> FightEngine<'a> {
    /// `player_collection` is the fight's own copy; rewards land there.
    pub fn new(player_collection: Collection, player_deck: Deck, dungeon: &'a mut Dungeon) -> Self {
        let wave = dungeon.wave_deck();
        let rng = StdRng::seed_from_u64(fight_seed(&player_deck, dungeon.name(), 0));
        Self {
            dungeon,
            player_collection,
            player_deck,
            wave,
            player_cursor: 0,
            enemy_cursor: 0,
            player_revealed: None,
            enemy_revealed: None,
            boss_revealed: false,
            round: 0,
            state: FightState::WaveCombat,
            difficulty: 0,
            rng,
        }
    }

    pub fn with_difficulty(mut self, difficulty: u8) -> AppResult<Self> {
        validate_difficulty(difficulty)?;
        self.difficulty = difficulty;
        self.rng = StdRng::seed_from_u64(fight_seed(
            &self.player_deck,
            self.dungeon.name(),
            difficulty,
        ));
        Ok(self)
    }

    pub fn state(&self) -> FightState {
        self.state
    }

    /// Runs the fight to completion. Errors only if the renderer goes away.
    pub async fn run(mut self, emitter: EventEmitter) -> AppResult<FightReport> {
        tracing::info!(
            dungeon = self.dungeon.name(),
            deck = ?self.player_deck.card_names(),
            difficulty = self.difficulty,
            "⚔️ Fight started"
        );

        if self.player_deck.is_empty() {
            self.state = FightState::Resolved(FightOutcome::Loss);
        } else if self.wave.is_empty() {
            self.state = self.after_wave();
        }

        loop {
            match self.state {
                FightState::WaveCombat => self.wave_round(&emitter).await?,
                FightState::BossCombat => self.boss_round(&emitter).await?,
                FightState::Resolved(outcome) => return self.finish(outcome, &emitter).await,
            }
        }
    }

    async fn wave_round(&mut self, emitter: &EventEmitter) -> AppResult<()> {
        let Some((enemy_name, enemy_element, enemy_damage)) =
            self.wave.get(self.enemy_cursor).map(describe)
        else {
            self.state = self.after_wave();
            return Ok(());
        };
        let Some((player_name, player_element, player_damage)) =
            self.player_deck.get(self.player_cursor).map(describe)
        else {
            self.state = FightState::Resolved(FightOutcome::Loss);
            return Ok(());
        };

        self.round += 1;
        emitter.emit(FightEvent::Round { round: self.round }).await?;

        if self.enemy_revealed != Some(self.enemy_cursor) {
            emitter
                .emit(FightEvent::GameSelect {
                    card: enemy_name.clone(),
                    is_boss: false,
                })
                .await?;
            self.enemy_revealed = Some(self.enemy_cursor);
        }
        self.reveal_player_card(&player_name, emitter).await?;

        let damage = scale_enemy_damage(
            &mut self.rng,
            self.difficulty,
            calculate_damage(enemy_damage, enemy_element, player_element),
        );
        emitter
            .emit(FightEvent::GameAttack {
                card: enemy_name.clone(),
                enemy: player_name.clone(),
                damage,
            })
            .await?;

        if self.hit_player_card(damage) {
            tracing::debug!(round = self.round, card = %player_name, "player card defeated");
        } else {
            let damage = scale_player_damage(
                &mut self.rng,
                self.difficulty,
                calculate_damage(player_damage, player_element, enemy_element),
            );
            emitter
                .emit(FightEvent::PlayerAttack {
                    card: player_name,
                    enemy: enemy_name.clone(),
                    damage,
                })
                .await?;
            let defeated = self
                .wave
                .get_mut(self.enemy_cursor)
                .is_some_and(|enemy| enemy.take_hit(damage));
            if defeated {
                tracing::debug!(round = self.round, card = %enemy_name, "enemy card defeated");
                self.enemy_cursor += 1;
            }
        }

        emitter
            .emit(FightEvent::RoundOver { round: self.round })
            .await?;

        if self.player_cursor >= self.player_deck.len() {
            self.state = FightState::Resolved(FightOutcome::Loss);
        } else if self.enemy_cursor >= self.wave.len() {
            self.state = self.after_wave();
        }
        Ok(())
    }

    async fn boss_round(&mut self, emitter: &EventEmitter) -> AppResult<()> {
        let Some((boss_name, boss_element, boss_damage)) =
            self.dungeon.boss().map(|boss| describe(boss))
        else {
            self.state = FightState::Resolved(FightOutcome::Win);
            return Ok(());
        };
        let Some((player_name, player_element, player_damage)) =
            self.player_deck.get(self.player_cursor).map(describe)
        else {
            self.state = FightState::Resolved(FightOutcome::Loss);
            return Ok(());
        };

        self.round += 1;
        emitter.emit(FightEvent::Round { round: self.round }).await?;

        if !self.boss_revealed {
            emitter
                .emit(FightEvent::GameSelect {
                    card: boss_name.clone(),
                    is_boss: true,
                })
                .await?;
            self.boss_revealed = true;
        }
        self.reveal_player_card(&player_name, emitter).await?;

        let damage = scale_enemy_damage(
            &mut self.rng,
            self.difficulty,
            calculate_damage(boss_damage, boss_element, player_element),
        );
        emitter
            .emit(FightEvent::GameAttack {
                card: boss_name.clone(),
                enemy: player_name.clone(),
                damage,
            })
            .await?;

        let mut boss_defeated = false;
        if !self.hit_player_card(damage) {
            let damage = scale_player_damage(
                &mut self.rng,
                self.difficulty,
                calculate_damage(player_damage, player_element, boss_element),
            );
            emitter
                .emit(FightEvent::PlayerAttack {
                    card: player_name,
                    enemy: boss_name,
                    damage,
                })
                .await?;
            boss_defeated = self
                .dungeon
                .boss_mut()
                .is_some_and(|boss| boss.card_mut().take_hit(damage));
        }

        emitter
            .emit(FightEvent::RoundOver { round: self.round })
            .await?;

        if boss_defeated {
            self.state = FightState::Resolved(FightOutcome::Win);
        } else if self.player_cursor >= self.player_deck.len() {
            self.state = FightState::Resolved(FightOutcome::Loss);
        }
        Ok(())
    }

    async fn finish(
        mut self,
        outcome: FightOutcome,
        emitter: &EventEmitter,
    ) -> AppResult<FightReport> {
        let mut finishing_card = None;
        let mut reward_text = None;

        if outcome == FightOutcome::Win {
            if let Some(card) = self.player_deck.get(self.player_cursor) {
                let last_played = self
                    .player_collection
                    .get(card.template().name())
                    .cloned()
                    .unwrap_or_else(|| card.template().clone());
                let text = self
                    .dungeon
                    .reward()
                    .grant(&mut self.player_collection, &last_played);
                finishing_card = Some(last_played.name().to_string());
                reward_text = Some(text);
            }
        }

        emitter.emit(FightEvent::Result { result: outcome }).await?;
        emitter
            .emit(FightEvent::GameOver {
                result: outcome,
                reward_text: reward_text.clone(),
            })
            .await?;

        tracing::info!(
            dungeon = self.dungeon.name(),
            %outcome,
            rounds = self.round,
            reward = reward_text.as_deref().unwrap_or("-"),
            "🏁 Fight resolved"
        );

        Ok(FightReport {
            outcome,
            rounds: self.round,
            finishing_card,
            reward_text,
            collection: match outcome {
                FightOutcome::Win => Some(self.player_collection),
                FightOutcome::Loss => None,
            },
        })
    }

    fn after_wave(&self) -> FightState {
        match self.dungeon.boss() {
            Some(boss) if !boss.is_defeated() => FightState::BossCombat,
            _ => FightState::Resolved(FightOutcome::Win),
        }
    }

    async fn reveal_player_card(&mut self, name: &str, emitter: &EventEmitter) -> AppResult<()> {
        if self.player_revealed != Some(self.player_cursor) {
            emitter
                .emit(FightEvent::PlayerSelect {
                    card: name.to_string(),
                })
                .await?;
            self.player_revealed = Some(self.player_cursor);
        }
        Ok(())
    }

    /// Returns true if the active player card fell and the cursor moved on.
    fn hit_player_card(&mut self, damage: u32) -> bool {
        let defeated = self
            .player_deck
            .get_mut(self.player_cursor)
            .is_some_and(|card| card.take_hit(damage));
        if defeated {
            self.player_cursor += 1;
        }
        defeated
    }
}

fn describe(card: &Card) -> (String, ElementType, u32) {
    (card.name().to_string(), card.element(), card.damage())
}

/// Enemy hits grow by up to `difficulty` tenths, rounded up.
pub(crate) fn scale_enemy_damage(rng: &mut StdRng, difficulty: u8, damage: u32) -> u32 {
    if difficulty == 0 {
        return damage;
    }
    let roll = rng.random_range(0..=u64::from(difficulty));
    let scaled = (u64::from(damage) * (10 + roll)).div_ceil(10);
    u32::try_from(scaled).unwrap_or(u32::MAX)
}

/// Player hits shrink by up to `difficulty` twentieths, rounded down.
pub(crate) fn scale_player_damage(rng: &mut StdRng, difficulty: u8, damage: u32) -> u32 {
    if difficulty == 0 {
        return damage;
    }
    let roll = rng.random_range(0..=u64::from(difficulty));
    let scaled = u64::from(damage) * (20 - roll) / 20;
    u32::try_from(scaled).unwrap_or(u32::MAX)
}

/// FNV-1a over the deck order, dungeon name and difficulty.
fn fight_seed(deck: &Deck, dungeon_name: &str, difficulty: u8) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    let mut hash = OFFSET;
    let mut feed = |bytes: &[u8]| {
        for byte in bytes {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(PRIME);
        }
    };
    for name in deck.card_names() {
        feed(name.as_bytes());
        feed(&[0x1f]);
    }
    feed(dungeon_name.as_bytes());
    feed(&[difficulty]);
    hash
}
