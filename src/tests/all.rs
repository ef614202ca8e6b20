//! Unit tests for the card dungeon modules
//! Run with: cargo test

use std::collections::HashSet;
use std::time::Duration;

use crate::game::card_loader::{parse_element, parse_legacy, LegacyImport};
use crate::game::cards_types::{BossCard, BossProficiency, Card, CardAttribute, CardTemplate};
use crate::game::collection::Collection;
use crate::game::decks::Deck;
use crate::game::dungeon::{Dungeon, DungeonTemplate, DungeonType};
use crate::game::element::{calculate_damage, ElementType, Multiplier};
use crate::game::events::{event_channel, FightEvent};
use crate::game::fight::{
    scale_enemy_damage, scale_player_damage, FightEngine, FightOutcome, FightReport, FightState,
};
use crate::game::reward::Reward;
use crate::game::world::World;
use crate::persistence::envelope::{self, MAGIC, XOR_KEY};
use crate::persistence::{PlayerSave, UpgradedCard, WorldSave};
use crate::player::PlayerInventory;
use crate::{AppError, AppResult, ErrorCategory};

const CATALOG: &str = "\
# test world
kartya;Aragorn;5;10;levego
kartya;Selia;2;6;viz
kartya;Nyx;4;8;tuz
kartya;Dorian;3;12;fold
kartya;Liora;6;4;levego
kartya;Arin;2;5;tuz
vezer;Warden;3;9;viz;eletero

gyujtemeny;Aragorn
gyujtemeny;Nyx
gyujtemeny;Selia
gyujtemeny;Dorian
pakli;Aragorn
pakli;Nyx
kazamata;egyszeru;Cellar;Selia;sebzes
kazamata;kis;Tower;Liora;Warden;eletero
kazamata;nagy;Abyss;Dorian,Liora;Warden
kazamata;egyszeru;Pit;Dorian;eletero
";

fn import() -> LegacyImport {
    parse_legacy(CATALOG).unwrap()
}

fn world() -> World {
    World::from_legacy(1, "test", &import()).unwrap()
}

fn owned_collection() -> Collection {
    Collection::from_templates(import().owned)
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|name| name.to_string()).collect()
}

fn card(name: &str, damage: u32, health: u32, element: ElementType) -> CardTemplate {
    CardTemplate::new(name, damage, health, element).unwrap()
}

async fn run_fight(
    collection: Collection,
    deck: Deck,
    dungeon: &mut Dungeon,
    difficulty: u8,
) -> (AppResult<FightReport>, Vec<FightEvent>) {
    let (emitter, receiver) = event_channel();
    let engine = FightEngine::new(collection, deck, dungeon)
        .with_difficulty(difficulty)
        .unwrap();
    tokio::join!(engine.run(emitter), receiver.collect_all())
}

fn assert_protocol(events: &[FightEvent]) {
    let mut game_selected = HashSet::new();
    let mut player_selected = HashSet::new();
    let mut open_round = None;
    let mut attacks_in_round = 0;

    for event in events {
        match event {
            FightEvent::Round { round } => {
                assert!(open_round.is_none(), "round {} opened twice", round);
                open_round = Some(*round);
                attacks_in_round = 0;
            }
            FightEvent::RoundOver { round } => {
                assert_eq!(open_round, Some(*round));
                assert!(attacks_in_round >= 1);
                open_round = None;
            }
            FightEvent::GameSelect { card, .. } => {
                game_selected.insert(card.clone());
            }
            FightEvent::PlayerSelect { card } => {
                player_selected.insert(card.clone());
            }
            FightEvent::GameAttack { card, enemy, .. } => {
                assert!(game_selected.contains(card), "{} attacked before select", card);
                assert!(player_selected.contains(enemy), "{} hit before select", enemy);
                attacks_in_round += 1;
            }
            FightEvent::PlayerAttack { card, enemy, .. } => {
                assert!(player_selected.contains(card), "{} attacked before select", card);
                assert!(game_selected.contains(enemy), "{} hit before select", enemy);
                attacks_in_round += 1;
            }
            FightEvent::Result { .. } | FightEvent::GameOver { .. } => {
                assert!(open_round.is_none());
            }
        }
    }

    assert_eq!(events.iter().filter(|event| event.is_terminal()).count(), 1);
    assert!(events.last().unwrap().is_terminal());
}

#[cfg(test)]
mod damage_tests {
    use super::*;

    #[test]
    fn test_documented_examples() {
        assert_eq!(calculate_damage(5, ElementType::Air, ElementType::Fire), 2);
        assert_eq!(calculate_damage(5, ElementType::Fire, ElementType::Water), 10);
        assert_eq!(calculate_damage(5, ElementType::Fire, ElementType::Fire), 5);
    }

    #[test]
    fn test_multiplier_always_in_allowed_set() {
        for attacker in ElementType::ALL {
            for defender in ElementType::ALL {
                let value = attacker.multiplier_against(defender).as_f64();
                assert!([0.5, 1.0, 2.0].contains(&value));
            }
        }
    }

    #[test]
    fn test_wheel_matches_explicit_table() {
        use ElementType::*;
        let doubles = [
            (Air, Water),
            (Air, Earth),
            (Water, Air),
            (Water, Fire),
            (Fire, Earth),
            (Fire, Water),
            (Earth, Air),
            (Earth, Fire),
        ];
        let halves = [(Air, Fire), (Water, Earth), (Fire, Air), (Earth, Water)];

        for attacker in ElementType::ALL {
            for defender in ElementType::ALL {
                let expected = if doubles.contains(&(attacker, defender)) {
                    Multiplier::Double
                } else if halves.contains(&(attacker, defender)) {
                    Multiplier::Half
                } else {
                    Multiplier::Normal
                };
                assert_eq!(
                    attacker.multiplier_against(defender),
                    expected,
                    "{} vs {}",
                    attacker,
                    defender
                );
            }
        }
    }

    #[test]
    fn test_air_and_water_double_each_other() {
        assert_eq!(calculate_damage(3, ElementType::Air, ElementType::Water), 6);
        assert_eq!(calculate_damage(3, ElementType::Water, ElementType::Air), 6);
    }

    #[test]
    fn test_halving_floors() {
        assert_eq!(calculate_damage(7, ElementType::Earth, ElementType::Water), 3);
        assert_eq!(calculate_damage(1, ElementType::Fire, ElementType::Air), 0);
    }

    #[test]
    fn test_useless_is_neutral() {
        for element in ElementType::ALL {
            assert_eq!(calculate_damage(9, ElementType::Useless, element), 9);
            assert_eq!(calculate_damage(9, element, ElementType::Useless), 9);
        }
    }
}

#[cfg(test)]
mod card_tests {
    use super::*;

    #[test]
    fn test_template_validation() {
        assert!(CardTemplate::new("Ok", 2, 1, ElementType::Fire).is_ok());
        assert!(matches!(
            CardTemplate::new("", 5, 5, ElementType::Fire),
            Err(AppError::InvalidCard { .. })
        ));
        assert!(CardTemplate::new("ThisNameIsWayTooLong", 5, 5, ElementType::Fire).is_err());
        assert!(CardTemplate::new("Weak", 1, 5, ElementType::Fire).is_err());
        assert!(CardTemplate::new("Frail", 5, 0, ElementType::Fire).is_err());
        assert!(CardTemplate::new("Huge", 5, 101, ElementType::Fire).is_err());
    }

    #[test]
    fn test_promote_boosts_selected_stat() {
        let base = card("Warden", 3, 9, ElementType::Water);
        assert!(!base.is_boss());

        let tough = base.promote("Keeper", BossProficiency::Health).unwrap();
        assert!(tough.is_boss());
        assert_eq!(tough.display_name(), "Keeper");
        assert_eq!(tough.name(), "Warden");
        assert_eq!((tough.damage(), tough.health()), (3, 18));
        assert_eq!((tough.base_damage(), tough.base_health()), (3, 9));

        let fierce = base.promote("Keeper", BossProficiency::Damage).unwrap();
        assert_eq!((fierce.damage(), fierce.health()), (6, 9));
    }

    #[test]
    fn test_upgrade_is_a_new_template() {
        let base = card("Nyx", 4, 8, ElementType::Fire);
        let stronger = base.with_upgrade(CardAttribute::Damage);
        let tougher = base.with_upgrade(CardAttribute::Health);

        assert_eq!(base.base_damage(), 4);
        assert_eq!(stronger.base_damage(), 5);
        assert_eq!(tougher.base_health(), 10);
        assert_eq!(
            base.with_delta(1, 2).unwrap(),
            base.with_upgrade(CardAttribute::Damage).with_upgrade(CardAttribute::Health)
        );
    }

    #[test]
    fn test_delta_must_stay_within_card_limits() {
        let base = card("Nyx", 4, 8, ElementType::Fire);

        let error = base.with_delta(0, -8).unwrap_err();
        assert!(matches!(error, AppError::InvalidCard { .. }));
        assert_eq!(error.category(), ErrorCategory::ValidationError);
        assert!(base.with_delta(-3, 0).is_err());
        assert!(base.with_delta(4_000_000_000, 0).is_err());
        assert!(base.with_delta(i64::MIN, i64::MAX).is_err());
        assert_eq!(base.with_delta(-2, -7).unwrap().base_damage(), 2);
    }

    #[test]
    fn test_upgrade_stops_at_card_limits() {
        let maxed = card("Titan", 100, 99, ElementType::Earth);

        assert_eq!(maxed.with_upgrade(CardAttribute::Damage).base_damage(), 100);
        assert_eq!(maxed.with_upgrade(CardAttribute::Health).base_health(), 100);
    }

    #[test]
    fn test_card_health_floors_at_zero() {
        let template = card("Arin", 2, 5, ElementType::Fire);
        let mut runtime = Card::new(&template);

        assert!(!runtime.take_hit(3));
        assert_eq!(runtime.current_health(), 2);
        assert!(runtime.take_hit(50));
        assert_eq!(runtime.current_health(), 0);
        assert!(!runtime.take_hit(1), "a defeated card is not defeated twice");
        assert_eq!(template.base_health(), 5);
    }

    #[test]
    fn test_boss_card_uses_boosted_stats() {
        let base = card("Warden", 3, 9, ElementType::Water);
        assert!(BossCard::new(&base).is_none());

        let boss = BossCard::new(&base.promote("Warden", BossProficiency::Health).unwrap()).unwrap();
        assert_eq!(boss.damage(), 3);
        assert_eq!(boss.current_health(), 18);
    }
}

#[cfg(test)]
mod collection_tests {
    use super::*;

    #[test]
    fn test_collection_is_unique_by_name() {
        let mut collection = Collection::new();
        assert!(collection.add(card("Nyx", 4, 8, ElementType::Fire)));
        assert!(!collection.add(card("Nyx", 9, 9, ElementType::Water)));

        assert_eq!(collection.len(), 1);
        assert_eq!(collection.get("Nyx").unwrap().base_damage(), 4);
    }

    #[test]
    fn test_max_usable_is_half_rounded_down() {
        let mut collection = owned_collection();
        assert_eq!(collection.max_usable(), 2);
        collection.add(card("Extra", 2, 2, ElementType::Air));
        assert_eq!(collection.max_usable(), 2);
        collection.add(card("Another", 2, 2, ElementType::Air));
        assert_eq!(collection.max_usable(), 3);
    }

    #[test]
    fn test_deck_from_collection() {
        let collection = owned_collection();
        let deck = Deck::from_collection(&collection, &names(&["Nyx", "Aragorn"])).unwrap();

        assert_eq!(deck.card_names(), names(&["Nyx", "Aragorn"]));
    }

    #[test]
    fn test_deck_rejects_missing_card() {
        let collection = owned_collection();
        let result = Deck::from_collection(&collection, &names(&["Liora"]));

        assert!(matches!(result, Err(AppError::CardNotInCollection { .. })));
        assert_eq!(result.unwrap_err().category(), ErrorCategory::ValidationError);
    }

    #[test]
    fn test_deck_rejects_oversized_selection() {
        let collection = owned_collection();
        let result = Deck::from_collection(&collection, &names(&["Nyx", "Aragorn", "Selia"]));

        assert!(matches!(
            result,
            Err(AppError::DeckTooLarge {
                requested: 3,
                max_usable: 2
            })
        ));
    }

    #[test]
    fn test_deck_rejects_duplicates_and_empty() {
        let collection = owned_collection();
        assert!(matches!(
            Deck::from_collection(&collection, &names(&["Nyx", "Nyx"])),
            Err(AppError::DuplicateCard { .. })
        ));
        assert!(matches!(
            Deck::from_collection(&collection, &[]),
            Err(AppError::EmptyDeck)
        ));
    }
}

#[cfg(test)]
mod loader_tests {
    use super::*;

    #[test]
    fn test_parse_fixture() {
        let import = import();

        assert_eq!(import.catalog.cards().len(), 7);
        assert_eq!(import.catalog.bosses().len(), 1);
        assert_eq!(import.owned.len(), 4);
        assert_eq!(import.deck, names(&["Aragorn", "Nyx"]));
        assert_eq!(import.dungeons.len(), 4);

        let warden = import.catalog.boss("Warden").unwrap();
        assert_eq!(warden.boss().unwrap().proficiency, BossProficiency::Health);
        assert_eq!(warden.health(), 18);
    }

    #[test]
    fn test_element_codes() {
        assert_eq!(parse_element("tuz"), Some(ElementType::Fire));
        assert_eq!(parse_element("viz"), Some(ElementType::Water));
        assert_eq!(parse_element("fold"), Some(ElementType::Earth));
        assert_eq!(parse_element("levego"), Some(ElementType::Air));
        assert_eq!(parse_element("plasma"), None);
    }

    #[test]
    fn test_dungeon_shapes_and_rewards() {
        let import = import();
        let types: Vec<DungeonType> = import.dungeons.iter().map(|d| d.dungeon_type()).collect();
        assert_eq!(
            types,
            vec![
                DungeonType::Small,
                DungeonType::Medium,
                DungeonType::Big,
                DungeonType::Small
            ]
        );
        assert_eq!(
            import.dungeons[0].reward(),
            &Reward::Attribute(CardAttribute::Damage)
        );
        match import.dungeons[2].reward() {
            Reward::Card(cards) => assert_eq!(cards.len(), 7),
            other => panic!("unexpected reward {:?}", other),
        }
        assert!(!import.dungeons[0].has_boss());
        assert!(import.dungeons[1].has_boss());
    }

    #[test]
    fn test_owned_card_with_override_stats() {
        let text = "kartya;Nyx;4;8;tuz\ngyujtemeny;Nyx;6;10\n";
        let import = parse_legacy(text).unwrap();

        assert_eq!(import.owned[0].base_damage(), 6);
        assert_eq!(import.owned[0].base_health(), 10);
        assert_eq!(import.catalog.card("Nyx").unwrap().base_damage(), 4);
    }

    #[test]
    fn test_owned_override_outside_limits_is_rejected() {
        let rows = [
            "gyujtemeny;Nyx;4;0",
            "gyujtemeny;Nyx;0;0",
            "gyujtemeny;Nyx;101;8",
            "gyujtemeny;Nyx;4;4000000000",
        ];
        for row in rows {
            let text = format!("kartya;Nyx;4;8;tuz\n{}\n", row);
            let error = parse_legacy(&text).unwrap_err();
            assert_eq!(error.category(), ErrorCategory::ValidationError, "{}", row);
        }
    }

    #[test]
    fn test_malformed_rows_report_line() {
        let result = parse_legacy("kartya;Nyx;4;8;tuz\nvarazslat;Nyx\n");
        assert!(matches!(
            result,
            Err(AppError::MalformedCatalogRow { line: 2, .. })
        ));

        let result = parse_legacy("kartya;Nyx;four;8;tuz\n");
        assert_eq!(result.unwrap_err().category(), ErrorCategory::FormatError);

        let result = parse_legacy("kartya;Nyx;4;8;plazma\n");
        assert!(matches!(
            result,
            Err(AppError::MalformedCatalogRow { line: 1, .. })
        ));
    }

    #[test]
    fn test_unknown_references_are_validation_errors() {
        let result = parse_legacy("kartya;Nyx;4;8;tuz\nkazamata;egyszeru;Cave;Ghost;sebzes\n");
        assert!(matches!(result, Err(AppError::UnknownCard { .. })));

        let result = parse_legacy("kartya;Nyx;4;8;tuz\nkazamata;kis;Cave;Nyx;Ghost;sebzes\n");
        assert!(matches!(result, Err(AppError::UnknownBoss { .. })));

        let result = parse_legacy("gyujtemeny;Ghost\n");
        assert!(matches!(result, Err(AppError::UnknownCard { .. })));
    }
}

#[cfg(test)]
mod dungeon_tests {
    use super::*;

    #[test]
    fn test_template_shape_validation() {
        let import = import();
        let wave = Collection::from_templates([import.catalog.card("Nyx").unwrap().clone()]);
        let boss = import.catalog.boss("Warden").unwrap().clone();
        let reward = Reward::Attribute(CardAttribute::Damage);

        assert!(DungeonTemplate::new(DungeonType::Small, "A", wave.clone(), None, reward.clone()).is_ok());
        assert!(DungeonTemplate::new(DungeonType::Small, "A", wave.clone(), Some(boss.clone()), reward.clone()).is_err());
        assert!(DungeonTemplate::new(DungeonType::Medium, "A", wave.clone(), None, reward.clone()).is_err());
        assert!(DungeonTemplate::new(DungeonType::Medium, "A", Collection::new(), Some(boss.clone()), reward.clone()).is_err());
        assert!(DungeonTemplate::new(DungeonType::Big, "A", wave.clone(), Some(boss), reward).is_err());
    }

    #[test]
    fn test_world_instantiates_independent_dungeons() {
        let world = world();
        let first = world.instantiate("Tower").unwrap();
        let second = world.instantiate("Tower").unwrap();

        assert_eq!(first.boss().unwrap().current_health(), 18);
        assert_eq!(second.boss().unwrap().current_health(), 18);
        assert_eq!(first.collection(), world.dungeon("Tower").unwrap().enemies());
    }

    #[test]
    fn test_unknown_dungeon() {
        let result = world().instantiate("Nowhere");
        assert!(matches!(result, Err(AppError::UnknownDungeon { .. })));
    }

    #[test]
    fn test_starter_collection() {
        let world = world();
        let starter = world.starter_collection().unwrap();

        assert_eq!(starter.names(), names(&["Aragorn", "Nyx", "Selia", "Dorian"]));
        assert_eq!(world.starter_deck(), names(&["Aragorn", "Nyx"]).as_slice());
    }
}

#[cfg(test)]
mod reward_tests {
    use super::*;

    #[test]
    fn test_attribute_reward_upgrades_last_played() {
        let mut collection = owned_collection();
        let nyx = collection.get("Nyx").unwrap().clone();

        let text = Reward::Attribute(CardAttribute::Health).grant(&mut collection, &nyx);

        assert_eq!(collection.get("Nyx").unwrap().base_health(), 10);
        assert!(text.contains("Nyx"));
        assert_eq!(collection.get("Aragorn").unwrap().base_health(), 10);
    }

    #[test]
    fn test_card_reward_grants_first_unowned_in_order() {
        let import = import();
        let reward = Reward::Card(import.catalog.cards().to_vec());
        let mut collection = owned_collection();
        let last = collection.get("Nyx").unwrap().clone();

        assert_eq!(reward.grant(&mut collection, &last), "New card: Liora");
        assert_eq!(reward.grant(&mut collection, &last), "New card: Arin");
        assert_eq!(reward.grant(&mut collection, &last), "New card: Warden");
        assert_eq!(collection.len(), 7);
        assert_eq!(reward.grant(&mut collection, &last), "Every card is already owned");
        assert_eq!(collection.len(), 7);
    }
}

#[cfg(test)]
mod fight_tests {
    use super::*;

    fn starter_deck() -> Deck {
        Deck::from_collection(&owned_collection(), &names(&["Aragorn", "Nyx"])).unwrap()
    }

    #[tokio::test]
    async fn test_small_dungeon_win_sequence() {
        let world = world();
        let mut dungeon = world.instantiate("Cellar").unwrap();

        let (report, events) = run_fight(owned_collection(), starter_deck(), &mut dungeon, 0).await;
        let report = report.unwrap();

        let reward_text = Some("Aragorn damage +1 (6)".to_string());
        assert_eq!(
            events,
            vec![
                FightEvent::Round { round: 1 },
                FightEvent::GameSelect {
                    card: "Selia".to_string(),
                    is_boss: false
                },
                FightEvent::PlayerSelect {
                    card: "Aragorn".to_string()
                },
                FightEvent::GameAttack {
                    card: "Selia".to_string(),
                    enemy: "Aragorn".to_string(),
                    damage: 4
                },
                FightEvent::PlayerAttack {
                    card: "Aragorn".to_string(),
                    enemy: "Selia".to_string(),
                    damage: 10
                },
                FightEvent::RoundOver { round: 1 },
                FightEvent::Result {
                    result: FightOutcome::Win
                },
                FightEvent::GameOver {
                    result: FightOutcome::Win,
                    reward_text: reward_text.clone()
                },
            ]
        );
        assert_eq!(report.outcome, FightOutcome::Win);
        assert_eq!(report.finishing_card.as_deref(), Some("Aragorn"));
        assert_eq!(report.reward_text, reward_text);
        assert_eq!(
            report.collection.unwrap().get("Aragorn").unwrap().base_damage(),
            6
        );
    }

    #[tokio::test]
    async fn test_loss_grants_nothing() {
        let world = world();
        let mut dungeon = world.instantiate("Pit").unwrap();
        let collection = owned_collection();
        let deck = Deck::from_collection(&collection, &names(&["Selia"])).unwrap();

        let (report, events) = run_fight(collection.clone(), deck, &mut dungeon, 0).await;
        let report = report.unwrap();

        assert_eq!(report.outcome, FightOutcome::Loss);
        assert_eq!(report.rounds, 6);
        assert!(report.reward_text.is_none());
        assert!(report.collection.is_none());
        assert_eq!(
            events.last(),
            Some(&FightEvent::GameOver {
                result: FightOutcome::Loss,
                reward_text: None
            })
        );
        assert_protocol(&events);
    }

    #[tokio::test]
    async fn test_boss_health_persists_within_instance() {
        let world = world();
        let mut dungeon = world.instantiate("Tower").unwrap();

        let (first, events) = run_fight(owned_collection(), starter_deck(), &mut dungeon, 0).await;
        assert_eq!(first.unwrap().outcome, FightOutcome::Loss);
        assert_eq!(dungeon.boss().unwrap().current_health(), 10);
        assert!(events.contains(&FightEvent::GameSelect {
            card: "Warden".to_string(),
            is_boss: true
        }));
        assert_protocol(&events);

        let (second, _) = run_fight(owned_collection(), starter_deck(), &mut dungeon, 0).await;
        assert_eq!(second.unwrap().outcome, FightOutcome::Loss);
        assert_eq!(dungeon.boss().unwrap().current_health(), 2);

        let (third, events) = run_fight(owned_collection(), starter_deck(), &mut dungeon, 0).await;
        let third = third.unwrap();
        assert_eq!(third.outcome, FightOutcome::Win);
        assert_eq!(third.finishing_card.as_deref(), Some("Nyx"));
        assert_eq!(
            third.collection.unwrap().get("Nyx").unwrap().base_health(),
            10
        );
        assert_protocol(&events);

        let fresh = world.instantiate("Tower").unwrap();
        assert_eq!(fresh.boss().unwrap().current_health(), 18);
        assert_eq!(
            world.dungeon("Tower").unwrap().enemies().len(),
            1,
            "template wave is untouched"
        );
    }

    #[tokio::test]
    async fn test_boss_fights_every_remaining_card() {
        let world = world();
        let mut dungeon = world.instantiate("Tower").unwrap();
        let (_, events) = run_fight(owned_collection(), starter_deck(), &mut dungeon, 0).await;

        let boss_targets: Vec<&str> = events
            .iter()
            .filter_map(|event| match event {
                FightEvent::GameAttack { card, enemy, .. } if card == "Warden" => {
                    Some(enemy.as_str())
                }
                _ => None,
            })
            .collect();
        assert_eq!(boss_targets, vec!["Aragorn", "Nyx", "Nyx"]);
    }

    #[tokio::test]
    async fn test_identical_inputs_replay_identically() {
        let world = world();
        let mut outputs = Vec::new();
        for _ in 0..2 {
            let mut dungeon = world.instantiate("Abyss").unwrap();
            let (report, events) = run_fight(owned_collection(), starter_deck(), &mut dungeon, 7).await;
            report.unwrap();
            assert_protocol(&events);
            outputs.push(serde_json::to_vec(&events).unwrap());
        }
        assert_eq!(outputs[0], outputs[1]);
    }

    #[tokio::test]
    async fn test_difficulty_bounds_damage() {
        let world = world();
        let mut dungeon = world.instantiate("Cellar").unwrap();
        let (_, events) = run_fight(owned_collection(), starter_deck(), &mut dungeon, 10).await;

        // Selia hits 4 at base in either matchup; Aragorn hits Selia for 10.
        for event in &events {
            match event {
                FightEvent::GameAttack { damage, .. } => {
                    assert!((4..=8).contains(damage), "enemy damage {}", damage);
                }
                FightEvent::PlayerAttack { card, damage, .. } if card == "Aragorn" => {
                    assert!((5..=10).contains(damage), "player damage {}", damage);
                }
                _ => {}
            }
        }
        assert_protocol(&events);
    }

    #[test]
    fn test_scaling_never_overflows() {
        use rand::SeedableRng;
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);

        for _ in 0..100 {
            assert!(scale_enemy_damage(&mut rng, 10, u32::MAX) >= u32::MAX / 2);
            assert!(scale_player_damage(&mut rng, 10, u32::MAX) >= u32::MAX / 2);
            let enemy = scale_enemy_damage(&mut rng, 10, 7);
            assert!((7..=14).contains(&enemy));
            let player = scale_player_damage(&mut rng, 10, 7);
            assert!((3..=7).contains(&player));
        }
        assert_eq!(scale_enemy_damage(&mut rng, 0, 7), 7);
        assert_eq!(scale_player_damage(&mut rng, 0, 7), 7);
    }

    #[tokio::test]
    async fn test_engine_starts_in_wave_combat() {
        let world = world();
        let mut dungeon = world.instantiate("Cellar").unwrap();
        let engine = FightEngine::new(owned_collection(), starter_deck(), &mut dungeon);

        assert_eq!(engine.state(), FightState::WaveCombat);
    }

    #[tokio::test]
    async fn test_invalid_difficulty() {
        let world = world();
        let mut dungeon = world.instantiate("Cellar").unwrap();
        let result = FightEngine::new(owned_collection(), starter_deck(), &mut dungeon).with_difficulty(11);
        assert!(matches!(result, Err(AppError::InvalidDifficulty { .. })));
    }

    #[tokio::test]
    async fn test_engine_waits_for_acknowledgement() {
        let world = world();
        let mut dungeon = world.instantiate("Cellar").unwrap();
        let (emitter, mut receiver) = event_channel();
        let engine = FightEngine::new(owned_collection(), starter_deck(), &mut dungeon);

        let renderer = async move {
            let first = receiver.next().await.unwrap();
            assert_eq!(first.event.name(), "round");

            let early = tokio::time::timeout(Duration::from_millis(50), receiver.next()).await;
            assert!(early.is_err(), "no second event before the first is acknowledged");

            first.acknowledge();
            let second = receiver.next().await.unwrap();
            assert_eq!(second.event.name(), "game:select");
            // Walk away without acknowledging.
        };

        let (result, ()) = tokio::join!(engine.run(emitter), renderer);
        assert!(matches!(result, Err(AppError::RendererDisconnected)));
    }

    #[test]
    fn test_event_names_and_values() {
        let event = FightEvent::GameSelect {
            card: "Warden".to_string(),
            is_boss: true,
        };
        assert_eq!(event.name(), "game:select");
        let values = event.values();
        assert_eq!(values["card"], "Warden");
        assert_eq!(values["isBoss"], true);

        let over = FightEvent::GameOver {
            result: FightOutcome::Win,
            reward_text: Some("New card: Liora".to_string()),
        };
        assert_eq!(over.name(), "gameOver");
        assert_eq!(over.values()["result"], "win");
        assert_eq!(over.values()["rewardText"], "New card: Liora");

        let json = serde_json::to_value(&over).unwrap();
        assert_eq!(json["name"], "gameOver");
        assert_eq!(json["values"]["rewardText"], "New card: Liora");
    }
}

#[cfg(test)]
mod inventory_tests {
    use super::*;

    #[test]
    fn test_uninitialized_inventory_is_state_error() {
        let inventory = PlayerInventory::default();

        assert!(!inventory.is_initialized());
        let error = inventory.compile_deck().unwrap_err();
        assert!(matches!(error, AppError::InventoryNotInitialized));
        assert_eq!(error.category(), ErrorCategory::StateError);
    }

    #[test]
    fn test_new_game_uses_starter_data() {
        let world = world();
        let inventory = PlayerInventory::new_game(&world, "slot", 3).unwrap();

        assert_eq!(inventory.collection().unwrap().len(), 4);
        assert_eq!(inventory.selected(), names(&["Aragorn", "Nyx"]).as_slice());
        assert_eq!(inventory.difficulty, 3);
        assert!(!inventory.save_id.is_empty());
    }

    #[test]
    fn test_select_cards_validates() {
        let world = world();
        let mut inventory = PlayerInventory::new_game(&world, "slot", 0).unwrap();

        assert!(inventory.select_cards(names(&["Liora"])).is_err());
        assert!(inventory.select_cards(names(&["Selia", "Dorian", "Nyx"])).is_err());
        assert_eq!(inventory.selected(), names(&["Aragorn", "Nyx"]).as_slice());

        inventory.select_cards(names(&["Dorian"])).unwrap();
        assert_eq!(inventory.compile_deck().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_fight_commits_reward_only_on_win() {
        let world = world();
        let mut inventory = PlayerInventory::new_game(&world, "slot", 0).unwrap();

        inventory.select_cards(names(&["Selia"])).unwrap();
        let (emitter, receiver) = event_channel();
        let (report, _) = tokio::join!(inventory.fight(&world, "Pit", emitter), receiver.collect_all());
        assert_eq!(report.unwrap().outcome, FightOutcome::Loss);
        assert_eq!(inventory.collection().unwrap(), &world.starter_collection().unwrap());

        inventory.select_cards(names(&["Aragorn", "Nyx"])).unwrap();
        let (emitter, receiver) = event_channel();
        let (report, _) = tokio::join!(inventory.fight(&world, "Cellar", emitter), receiver.collect_all());
        assert_eq!(report.unwrap().outcome, FightOutcome::Win);
        assert_eq!(
            inventory.collection().unwrap().get("Aragorn").unwrap().base_damage(),
            6
        );
    }

    #[test]
    fn test_save_records_only_deltas() {
        let world = world();
        let mut inventory = PlayerInventory::new_game(&world, "slot", 2).unwrap();
        inventory.select_cards(names(&["Nyx"])).unwrap();

        let mut upgraded = inventory.collection().unwrap().clone();
        upgraded.upgrade("Nyx", CardAttribute::Health);
        upgraded.upgrade("Nyx", CardAttribute::Damage);
        let inventory = PlayerInventory::from_save(
            &PlayerSave {
                upgraded_cards: vec![UpgradedCard {
                    card_name: "Nyx".to_string(),
                    health_diff: 2,
                    damage_diff: 1,
                }],
                ..inventory.to_save(&world).unwrap()
            },
            &world,
        )
        .unwrap();

        assert_eq!(inventory.collection().unwrap(), &upgraded);
        let save = inventory.to_save(&world).unwrap();
        assert_eq!(save.upgraded_cards.len(), 1);
        assert_eq!(save.upgraded_cards[0].card_name, "Nyx");
        assert_eq!(save.selected_cards, names(&["Nyx"]));
        assert_eq!(save.save_base, 1);
        assert_eq!(save.difficulty, 2);
    }

    #[test]
    fn test_save_delta_outside_limits_is_rejected() {
        let world = world();
        let inventory = PlayerInventory::new_game(&world, "slot", 5).unwrap();

        for (damage_diff, health_diff) in [(4_000_000_000, 0), (0, -10), (-5, 0)] {
            let mut save = inventory.to_save(&world).unwrap();
            save.upgraded_cards.push(UpgradedCard {
                card_name: "Aragorn".to_string(),
                health_diff,
                damage_diff,
            });

            let error = PlayerInventory::from_save(&save, &world).unwrap_err();
            assert!(matches!(error, AppError::InvalidCard { .. }));
            assert_eq!(error.category(), ErrorCategory::ValidationError);
        }
    }

    #[test]
    fn test_deltas_replay_against_edited_catalog() {
        let world = world();
        let inventory = PlayerInventory::new_game(&world, "slot", 0).unwrap();
        let mut save = inventory.to_save(&world).unwrap();
        save.upgraded_cards.push(UpgradedCard {
            card_name: "Aragorn".to_string(),
            health_diff: 0,
            damage_diff: 1,
        });

        let edited = World::from_legacy(
            1,
            "edited",
            &parse_legacy(&CATALOG.replace("kartya;Aragorn;5;10", "kartya;Aragorn;7;10")).unwrap(),
        )
        .unwrap();
        let reloaded = PlayerInventory::from_save(&save, &edited).unwrap();

        assert_eq!(
            reloaded.collection().unwrap().get("Aragorn").unwrap().base_damage(),
            8
        );
    }
}

#[cfg(test)]
mod envelope_tests {
    use super::*;

    fn sample_player_save() -> PlayerSave {
        PlayerSave {
            unlocked_cards: names(&["Aragorn", "Nyx", "Selia", "Dorian"]),
            selected_cards: names(&["Nyx"]),
            upgraded_cards: vec![UpgradedCard {
                card_name: "Nyx".to_string(),
                health_diff: 4,
                damage_diff: -1,
            }],
            save_base: 3,
            difficulty: 5,
            save_name: "Árvíztűrő".to_string(),
            save_timestamp: 1_760_000_000,
            save_id: "6f1c".to_string(),
        }
    }

    #[test]
    fn test_layout() {
        let bytes = envelope::encode(&sample_player_save()).unwrap();

        assert_eq!(&bytes[..4], &MAGIC);
        assert_eq!(bytes[4], b'{' ^ XOR_KEY);
    }

    #[test]
    fn test_player_save_round_trip() {
        let save = sample_player_save();
        let decoded: PlayerSave = envelope::decode(&envelope::encode(&save).unwrap()).unwrap();
        assert_eq!(decoded, save);
    }

    #[test]
    fn test_world_save_round_trip() {
        let save = WorldSave::from_world(&world());
        let decoded: WorldSave = envelope::decode(&envelope::encode(&save).unwrap()).unwrap();

        assert_eq!(decoded, save);
        assert_eq!(decoded.bosses[0].original_name, "Warden");
        assert_eq!(decoded.cards.len(), 7);
    }

    #[test]
    fn test_world_rebuild_rederives_boss_stats() {
        let world = world();
        let rebuilt = WorldSave::from_world(&world).to_world().unwrap();

        assert_eq!(rebuilt.catalog(), world.catalog());
        assert_eq!(rebuilt.catalog().boss("Warden").unwrap().health(), 18);
        assert!(rebuilt.dungeons().is_empty());
    }

    #[test]
    fn test_flipped_header_is_format_error() {
        let mut bytes = envelope::encode(&sample_player_save()).unwrap();
        bytes[1] ^= 0x01;

        let error = envelope::decode::<PlayerSave>(&bytes).unwrap_err();
        assert!(matches!(error, AppError::HeaderMismatch { .. }));
        assert_eq!(error.category(), ErrorCategory::FormatError);
    }

    #[test]
    fn test_truncated_and_garbled_payloads() {
        let bytes = envelope::encode(&sample_player_save()).unwrap();

        let error = envelope::decode::<PlayerSave>(&bytes[..2]).unwrap_err();
        assert!(matches!(error, AppError::HeaderMismatch { .. }));

        let error = envelope::decode::<PlayerSave>(&bytes[..bytes.len() - 3]).unwrap_err();
        assert!(matches!(error, AppError::MalformedPayload { .. }));

        let mut unobfuscated = MAGIC.to_vec();
        unobfuscated.extend_from_slice(b"{\"saveBase\":1}");
        let error = envelope::decode::<PlayerSave>(&unobfuscated).unwrap_err();
        assert_eq!(error.category(), ErrorCategory::FormatError);
    }
}

#[cfg(test)]
mod error_tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_categories() {
        assert_eq!(AppError::EmptyDeck.category(), ErrorCategory::ValidationError);
        assert_eq!(
            AppError::UnparseableFileName {
                file_name: "dx.bin".to_string()
            }
            .category(),
            ErrorCategory::FormatError
        );
        assert_eq!(
            AppError::WorldNotFound { world_id: 1 }.category(),
            ErrorCategory::NotFoundError
        );
        assert_eq!(AppError::DeckNotSelected.category(), ErrorCategory::StateError);
    }

    #[test]
    fn test_missing_file_maps_to_not_found() {
        let missing = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let error = AppError::from_io(Path::new("saves/world1.bin"), missing);
        assert!(matches!(error, AppError::SaveNotFound { .. }));

        let denied = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "no");
        let error = AppError::from_io(Path::new("saves/world1.bin"), denied);
        assert_eq!(error.category(), ErrorCategory::IoError);
        assert!(error.should_log());
        assert_eq!(error.variant_name(), "Io");
    }

    #[test]
    fn test_user_friendly_messages() {
        let error = AppError::DeckTooLarge {
            requested: 5,
            max_usable: 2,
        };
        assert_eq!(
            error.user_friendly_message(),
            "You can take at most 2 cards into a fight"
        );
        assert!(!error.should_log());
    }
}

#[cfg(test)]
mod config_tests {
    use crate::config::{log_filter, GameConfig};
    use tracing::level_filters::LevelFilter;

    #[test]
    fn test_log_filter_honours_requested_level() {
        assert_eq!(log_filter(Some("debug")).max_level_hint(), Some(LevelFilter::DEBUG));
        assert_eq!(log_filter(Some("warn")).max_level_hint(), Some(LevelFilter::WARN));
    }

    #[test]
    fn test_log_filter_defaults_to_info() {
        assert_eq!(log_filter(None).max_level_hint(), Some(LevelFilter::INFO));
        assert_eq!(
            log_filter(Some("card_dungeon=loud")).max_level_hint(),
            Some(LevelFilter::INFO)
        );
    }

    #[test]
    fn test_default_config() {
        let config = GameConfig::default();
        assert_eq!(config.difficulty, 0);
        assert_eq!(config.event_pace_ms, 300);
    }
}
