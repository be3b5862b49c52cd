use log::{debug, info};
use puckscore_core::Team;
use serde::{Deserialize, Serialize};

use crate::result::{PuckScoreResult, RoundScore};

/// What ends a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum GameGoal {
    /// First team to reach this total.
    Points(i32),
    /// Fixed number of rounds.
    Rounds(usize),
}

impl GameGoal {
    pub const MAX: i32 = 999;

    /// Goal with its value clamped to `1..=999`.
    pub fn clamped(self) -> Self {
        match self {
            GameGoal::Points(n) => GameGoal::Points(n.clamp(1, Self::MAX)),
            GameGoal::Rounds(n) => GameGoal::Rounds(n.clamp(1, Self::MAX as usize)),
        }
    }
}

impl Default for GameGoal {
    fn default() -> Self {
        GameGoal::Points(75)
    }
}

/// One recorded round.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub red: i32,
    pub blue: i32,
    pub detail: Vec<PuckScoreResult>,
    pub timestamp_ms: u64,
}

/// Running game tally.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Game {
    goal: GameGoal,
    rounds: Vec<RoundRecord>,
    red_total: i32,
    blue_total: i32,
    ended: bool,
    ended_manually: bool,
}

impl Game {
    pub fn new(goal: GameGoal) -> Self {
        Self {
            goal: goal.clamped(),
            rounds: Vec::new(),
            red_total: 0,
            blue_total: 0,
            ended: false,
            ended_manually: false,
        }
    }

    pub fn goal(&self) -> GameGoal {
        self.goal
    }

    pub fn rounds(&self) -> &[RoundRecord] {
        &self.rounds
    }

    pub fn total(&self, team: Team) -> i32 {
        match team {
            Team::Red => self.red_total,
            Team::Blue => self.blue_total,
        }
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Team ahead on points, `None` on a tie.
    pub fn leader(&self) -> Option<Team> {
        match self.red_total.cmp(&self.blue_total) {
            std::cmp::Ordering::Greater => Some(Team::Red),
            std::cmp::Ordering::Less => Some(Team::Blue),
            std::cmp::Ordering::Equal => None,
        }
    }

    fn goal_reached(&self) -> bool {
        match self.goal {
            GameGoal::Points(n) => self.red_total >= n || self.blue_total >= n,
            GameGoal::Rounds(n) => self.rounds.len() >= n,
        }
    }

    fn update_ended(&mut self) {
        let was = self.ended;
        self.ended = self.ended_manually || self.goal_reached();
        if self.ended && !was {
            info!(
                "game goal reached after {} rounds: red {} blue {}",
                self.rounds.len(),
                self.red_total,
                self.blue_total
            );
        }
    }

    /// Append a round and re-check the goal.
    ///
    /// Play may continue after the goal is reached; later rounds still count.
    /// A game closed with [`Game::end`] takes no more rounds and returns `None`.
    pub fn record_round(&mut self, round: &RoundScore, timestamp_ms: u64) -> Option<&RoundRecord> {
        if self.ended_manually {
            debug!("game ended manually, round not recorded");
            return None;
        }
        self.red_total += round.red;
        self.blue_total += round.blue;
        self.rounds.push(RoundRecord {
            red: round.red,
            blue: round.blue,
            detail: round.results.clone(),
            timestamp_ms,
        });
        debug!(
            "round {}: red {} blue {}",
            self.rounds.len(),
            round.red,
            round.blue
        );
        self.update_ended();
        self.rounds.last()
    }

    /// Drop the last round, revert the totals and re-check the goal.
    ///
    /// Falling back below the goal reopens the game; a manual end stays.
    pub fn undo_last_round(&mut self) -> Option<RoundRecord> {
        let last = self.rounds.pop()?;
        self.red_total -= last.red;
        self.blue_total -= last.blue;
        self.update_ended();
        Some(last)
    }

    /// End the game regardless of the goal. Later rounds are rejected.
    pub fn end(&mut self) {
        self.ended_manually = true;
        self.update_ended();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round(red: i32, blue: i32) -> RoundScore {
        RoundScore {
            results: Vec::new(),
            red,
            blue,
        }
    }

    #[test]
    fn points_goal_ends_game() {
        let mut game = Game::new(GameGoal::Points(21));
        game.record_round(&round(10, 8), 1);
        assert!(!game.is_ended());
        game.record_round(&round(7, 15), 2);
        assert!(game.is_ended());
        assert_eq!(game.total(Team::Blue), 23);
        assert_eq!(game.leader(), Some(Team::Blue));
    }

    #[test]
    fn rounds_goal_ends_game_and_play_continues() {
        let mut game = Game::new(GameGoal::Rounds(2));
        game.record_round(&round(0, 0), 1);
        game.record_round(&round(7, 0), 2);
        assert!(game.is_ended());
        game.record_round(&round(0, 10), 3);
        assert_eq!(game.rounds().len(), 3);
        assert_eq!(game.total(Team::Blue), 10);
    }

    #[test]
    fn undo_reverts_totals_and_reopens() {
        let mut game = Game::new(GameGoal::Points(20));
        game.record_round(&round(10, 0), 1);
        game.record_round(&round(10, -10), 2);
        assert!(game.is_ended());

        let last = game.undo_last_round().expect("round");
        assert_eq!(last.timestamp_ms, 2);
        assert_eq!(game.total(Team::Red), 10);
        assert_eq!(game.total(Team::Blue), 0);
        assert!(!game.is_ended());

        game.undo_last_round();
        assert!(game.undo_last_round().is_none());
    }

    #[test]
    fn manual_end_survives_undo() {
        let mut game = Game::new(GameGoal::Rounds(5));
        game.record_round(&round(8, 7), 1);
        game.end();
        game.undo_last_round();
        assert!(game.is_ended());
    }

    #[test]
    fn manual_end_rejects_further_rounds() {
        let mut game = Game::new(GameGoal::Points(50));
        let recorded = game.record_round(&round(8, 7), 1).cloned();
        assert_eq!(recorded.map(|r| r.red), Some(8));

        game.end();
        assert!(game.record_round(&round(10, 0), 2).is_none());
        assert_eq!(game.rounds().len(), 1);
        assert_eq!(game.total(Team::Red), 8);
        assert!(game.is_ended());
    }

    #[test]
    fn goal_value_is_clamped() {
        assert_eq!(Game::new(GameGoal::Points(0)).goal(), GameGoal::Points(1));
        assert_eq!(
            Game::new(GameGoal::Rounds(5000)).goal(),
            GameGoal::Rounds(999)
        );
    }

    #[test]
    fn goal_serializes_tagged() {
        let s = serde_json::to_string(&GameGoal::Rounds(4)).expect("json");
        assert_eq!(s, r#"{"type":"rounds","value":4}"#);
    }
}
