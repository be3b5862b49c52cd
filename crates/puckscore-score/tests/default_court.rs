use puckscore_core::{CourtGeometry, Point2, Puck, Segment, Team, Triangle};
use puckscore_score::{score, Game, GameGoal, ScoringParams, Zone};

/// Factory court used before any calibration.
fn default_court() -> CourtGeometry {
    let p = Point2::new;
    CourtGeometry::new(
        Triangle::new(p(120.0, 120.0), p(120.0, 480.0), p(520.0, 300.0)),
        [
            Segment::new(p(430.0, 260.0), p(430.0, 340.0)),
            Segment::new(p(340.0, 230.0), p(360.0, 380.0)),
            Segment::new(p(220.0, 200.0), p(260.0, 420.0)),
        ],
    )
}

#[test]
fn slanted_lines_partition_the_default_court() {
    let params = ScoringParams::default();
    let pucks = [
        Puck::at(Team::Red, 480.0, 300.0, 6.0),
        Puck::at(Team::Blue, 390.0, 300.0, 18.0),
        Puck::at(Team::Red, 300.0, 300.0, 18.0),
        Puck::at(Team::Blue, 170.0, 300.0, 18.0),
    ];
    let round = score(&pucks, &default_court(), &params);
    let zones: Vec<Zone> = round.results.iter().map(|r| r.zone).collect();
    assert_eq!(
        zones,
        vec![Zone::Ten, Zone::Eight, Zone::Seven, Zone::MinusTen]
    );
    assert_eq!(round.red, 17);
    assert_eq!(round.blue, -2);
}

#[test]
fn rounds_feed_a_game() {
    let court = default_court();
    let params = ScoringParams::default();
    let mut game = Game::new(GameGoal::Points(15));

    let first = score(&[Puck::at(Team::Red, 390.0, 300.0, 18.0)], &court, &params);
    game.record_round(&first, 1_000);
    assert!(!game.is_ended());

    let second = score(&[Puck::at(Team::Red, 300.0, 300.0, 18.0)], &court, &params);
    game.record_round(&second, 2_000);
    assert!(game.is_ended());
    assert_eq!(game.total(Team::Red), 15);
    assert_eq!(game.rounds()[1].detail.len(), 1);
}

#[test]
fn round_score_serializes_zone_labels() {
    let round = score(
        &[Puck::at(Team::Blue, 430.0, 300.0, 18.0)],
        &default_court(),
        &ScoringParams::default(),
    );
    let json = serde_json::to_value(&round).expect("json");
    assert_eq!(json["results"][0]["zone"], "line");
    assert_eq!(json["results"][0]["valid"], false);
    assert_eq!(json["blue"], 0);
}
