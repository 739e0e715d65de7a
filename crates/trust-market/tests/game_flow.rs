//! Whole-game scenarios through the public API

use trust_market::{
    GameConfig, GameMode, GameSession, Move, Phase, RoundEvent, SessionError, SessionEvent,
    Strategy,
};

use Move::{Cooperate as C, Defect as D};

const TOPICS: [&str; 3] = [
    "Would you cooperate with a stranger you will never meet again?",
    "Is a reputation worth more than a single big win?",
    "Can a threat be credible if carrying it out hurts you too?",
];

/// Single-opponent game whose agent plays `strategy`
fn table_with(strategy: Strategy, mode: GameMode) -> GameSession {
    (0..500u64)
        .find_map(|seed| {
            let config = GameConfig { agent_count: 1, seed: Some(seed), mode, ..Default::default() };
            let session = GameSession::start_game(config, &TOPICS).unwrap();
            (session.agents()[0].strategy == strategy).then_some(session)
        })
        .expect("no seed produced the requested strategy")
}

fn play(mut session: GameSession, moves: &[Move]) -> GameSession {
    for m in moves {
        session = session
            .apply(SessionEvent::SkipDiscussion, &TOPICS)
            .and_then(|s| s.apply(SessionEvent::Choose(*m), &TOPICS))
            .and_then(|s| s.apply(SessionEvent::Continue, &TOPICS))
            .unwrap();
    }
    session
}

#[test]
fn grim_trigger_five_round_game() {
    let session = table_with(Strategy::GrimTrigger, GameMode::Finite { max_rounds: 5 });
    let agent_id = session.agents()[0].id.clone();
    let session = play(session, &[C, C, C, D, D]);

    assert_eq!(session.phase(), Phase::Debrief);
    assert!(session.is_ended());

    let rounds = session.rounds();
    let agent_moves: Vec<Move> = rounds.iter().map(|r| r.agent_choices[&agent_id]).collect();
    assert_eq!(agent_moves, vec![C, C, C, C, D]);

    let payoffs: Vec<u32> = rounds.iter().map(|r| r.human_payoff).collect();
    assert_eq!(payoffs, vec![3, 3, 3, 5, 1]);
    let cumulative: Vec<u32> = rounds.iter().map(|r| r.cumulative_payoff).collect();
    assert_eq!(cumulative, vec![3, 6, 9, 14, 15]);

    let events: Vec<Option<RoundEvent>> = rounds.iter().map(|r| r.event).collect();
    assert_eq!(
        events,
        vec![
            Some(RoundEvent::NashEquilibrium),
            Some(RoundEvent::NashEquilibrium),
            Some(RoundEvent::NashEquilibrium),
            Some(RoundEvent::GrimTrigger),
            Some(RoundEvent::MutualDefection),
        ]
    );
    assert_eq!(
        session.concepts_encountered(),
        [RoundEvent::NashEquilibrium, RoundEvent::GrimTrigger, RoundEvent::MutualDefection]
    );

    let agent = &session.agents()[0];
    assert!(agent.has_defected_before);
    // 70 -> 83 -> 95 -> 100 -> 90 -> 78
    assert_eq!(agent.trust_level, 78);

    let summary = session.debrief().unwrap();
    assert_eq!(summary.total_score, 15);
    assert_eq!(summary.cooperations, 3);
    assert_eq!(summary.defections, 2);
    assert_eq!(summary.reveals[0].strategy, Strategy::GrimTrigger);
}

#[test]
fn tit_for_tat_mirrors_the_human() {
    let session = table_with(Strategy::TitForTat, GameMode::Finite { max_rounds: 6 });
    let agent_id = session.agents()[0].id.clone();
    let human = [C, D, D, C, D, C];
    let session = play(session, &human);

    let agent_moves: Vec<Move> =
        session.rounds().iter().map(|r| r.agent_choices[&agent_id]).collect();
    assert_eq!(agent_moves[0], C);
    assert_eq!(&agent_moves[1..], &human[..5]);
}

#[test]
fn stochastic_games_last_at_least_three_rounds() {
    for seed in 0..200u64 {
        let config = GameConfig {
            agent_count: 2,
            seed: Some(seed),
            mode: GameMode::stochastic(),
            ..Default::default()
        };
        let mut session = GameSession::start_game(config, &TOPICS).unwrap();
        while session.phase() != Phase::Debrief {
            session = play(session, &[C]);
            assert!(session.rounds().len() < 2_000, "seed {} never ended", seed);
        }
        assert!(session.rounds().len() >= 3, "seed {} ended early", seed);
    }
}

#[test]
fn history_tracks_the_round_counter() {
    let config = GameConfig { agent_count: 4, seed: Some(99), ..Default::default() };
    let mut session = GameSession::start_game(config, &TOPICS).unwrap();

    for m in [C, D, C, C, D, D, C, D, C, C] {
        assert_eq!(session.rounds().len() as u32, session.current_round() - 1);
        session = session.skip_discussion().unwrap();
        assert_eq!(session.rounds().len() as u32, session.current_round() - 1);
        session = session.submit_choice(m).unwrap();
        assert_eq!(session.rounds().len() as u32, session.current_round());
        for agent in session.agents() {
            assert!(agent.trust_level <= 100);
        }
        session = session.continue_to_next_round(&TOPICS).unwrap();
    }

    assert_eq!(session.phase(), Phase::Debrief);
    assert_eq!(session.rounds().len(), 10);
    assert!(session.agents().iter().all(|a| a.has_defected_before));
}

#[test]
fn rejected_choice_leaves_session_untouched() {
    let session = GameSession::start_game(GameConfig { seed: Some(4), ..Default::default() }, &TOPICS)
        .unwrap()
        .post_message("Let's all cooperate this time.")
        .unwrap();
    let before = session.clone();

    let err = session.submit_choice(D).unwrap_err();
    assert!(matches!(
        err,
        SessionError::InvalidPhase { expected: Phase::Decision, found: Phase::Discussion, .. }
    ));
    assert_eq!(session, before);
}

#[test]
fn play_again_starts_a_fresh_game() {
    let config = GameConfig {
        agent_count: 3,
        seed: Some(12),
        mode: GameMode::Finite { max_rounds: 2 },
        ..Default::default()
    };
    let finished = play(GameSession::start_game(config, &TOPICS).unwrap(), &[D, D]);
    assert_eq!(finished.phase(), Phase::Debrief);

    let again = finished.apply(SessionEvent::PlayAgain, &TOPICS).unwrap();
    assert_eq!(again.phase(), Phase::Discussion);
    assert_eq!(again.current_round(), 1);
    assert_eq!(again.generation(), finished.generation() + 1);
    assert!(again.rounds().is_empty());
    assert!(again.concepts_encountered().is_empty());
    assert!(!again.is_ended());
    assert_eq!(again.agents().len(), 3);
    assert!(again.agents().iter().all(|a| !a.has_defected_before && a.trust_level == 70));
    assert_eq!(again.config(), finished.config());
}

#[test]
fn snapshot_replays_identically() {
    let config = GameConfig {
        agent_count: 5,
        seed: Some(2024),
        mode: GameMode::stochastic(),
        ..Default::default()
    };
    let midgame = play(GameSession::start_game(config, &TOPICS).unwrap(), &[C, D]);
    let json = serde_json::to_string(&midgame).unwrap();
    let restored: GameSession = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, midgame);

    let (mut a, mut b) = (midgame, restored);
    for m in [C, C, D, C, D, C, C, C] {
        if a.phase() == Phase::Debrief {
            break;
        }
        a = play(a, &[m]);
        b = play(b, &[m]);
        assert_eq!(a, b);
    }
}
