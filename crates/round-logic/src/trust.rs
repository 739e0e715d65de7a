//! Trust model
//!
//! Cooperation gains shrink as trust rises; defection losses grow with it.

use crate::strategy::Move;

/// Trust after the human plays `choice` against an agent at `current`.
pub fn update_trust(current: u8, choice: Move) -> u8 {
    let t = current as f64;
    let delta = match choice {
        Move::Cooperate => (20.0 - t * 0.1).clamp(5.0, 15.0),
        Move::Defect => (-30.0 + t * 0.2).clamp(-25.0, -10.0),
    };
    (t + delta).round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_cooperation_gains() {
        // 20 - 7 = 13
        assert_eq!(update_trust(70, Move::Cooperate), 83);
        // capped at +15
        assert_eq!(update_trust(0, Move::Cooperate), 15);
        // floor of +5 near the top, then clamped to 100
        assert_eq!(update_trust(98, Move::Cooperate), 100);
        assert_eq!(update_trust(100, Move::Cooperate), 100);
    }

    #[test]
    fn test_defection_losses() {
        // -30 + 14 = -16
        assert_eq!(update_trust(70, Move::Defect), 54);
        // at least -10
        assert_eq!(update_trust(100, Move::Defect), 90);
        // at most -25
        assert_eq!(update_trust(10, Move::Defect), 0);
        assert_eq!(update_trust(0, Move::Defect), 0);
    }

    #[test]
    fn test_diminishing_returns() {
        let low_gain = update_trust(30, Move::Cooperate) - 30;
        let high_gain = update_trust(90, Move::Cooperate) - 90;
        assert!(low_gain > high_gain);
    }

    proptest! {
        #[test]
        fn trust_stays_in_bounds(start in 0u8..=100, moves in prop::collection::vec(any::<bool>(), 0..50)) {
            let mut t = start;
            for coop in moves {
                let m = if coop { Move::Cooperate } else { Move::Defect };
                t = update_trust(t, m);
                prop_assert!(t <= 100);
            }
        }

        #[test]
        fn cooperation_never_lowers_trust(start in 0u8..=100) {
            prop_assert!(update_trust(start, Move::Cooperate) >= start);
            prop_assert!(update_trust(start, Move::Defect) <= start);
        }
    }
}
