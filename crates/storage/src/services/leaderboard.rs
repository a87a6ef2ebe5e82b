//! Ranking and badge computation.
//!
//! Everything here is pure with respect to its snapshot inputs: the same
//! aggregate rows and weekly gains always produce the same ordering and the
//! same badges, so the whole module is unit-testable without a database.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::dto::leaderboard::{Badge, LeaderboardEntry, StudentInfo};
use crate::dto::progress::TrendDirection;

/// Snapshot of one aggregate row joined with the student's name, as loaded
/// by `PointsRepository::totals_snapshot`.
#[derive(Debug, Clone)]
pub struct StandingRow {
    pub student_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub total: i64,
    pub has_negative_history: bool,
    pub updated_at: DateTime<Utc>,
}

/// Tie-break chain, descending priority:
/// 1. total, descending;
/// 2. at a total of exactly zero, negative history ranks *first* (a student
///    who climbed back to zero outranks one who never lost a point);
/// 3. at any nonzero total, negative history ranks *last*;
/// 4. earlier `updated_at` wins (first to reach the total keeps the spot).
fn standing_order(a: &StandingRow, b: &StandingRow) -> Ordering {
    b.total
        .cmp(&a.total)
        .then_with(|| {
            if a.total == 0 {
                b.has_negative_history.cmp(&a.has_negative_history)
            } else {
                a.has_negative_history.cmp(&b.has_negative_history)
            }
        })
        .then_with(|| a.updated_at.cmp(&b.updated_at))
}

/// Sort a snapshot into leaderboard order.
pub fn rank_standings(mut rows: Vec<StandingRow>) -> Vec<StandingRow> {
    rows.sort_by(standing_order);
    rows
}

/// Compute badges for an already-ordered leaderboard. `weekly_gains` maps
/// student ids to their summed deltas over the trailing 7 days; students
/// absent from the map gained nothing.
pub fn compute_badges(
    ordered: &[StandingRow],
    weekly_gains: &HashMap<Uuid, i64>,
) -> HashMap<Uuid, Vec<Badge>> {
    let mut badges: HashMap<Uuid, Vec<Badge>> = HashMap::new();

    if let Some(top) = ordered.first()
        && top.total > 0
    {
        badges.entry(top.student_id).or_default().push(Badge::Top1);
    }

    let gain_of = |id: Uuid| weekly_gains.get(&id).copied().unwrap_or(0);

    let max_gain = ordered.iter().map(|row| gain_of(row.student_id)).max();
    if let Some(max_gain) = max_gain
        && max_gain > 0
    {
        for row in ordered {
            if gain_of(row.student_id) == max_gain {
                badges
                    .entry(row.student_id)
                    .or_default()
                    .push(Badge::MostImproved);
            }
        }
    }

    // Reconstruct last week's ordering by backing each student's weekly gain
    // out of their current total, then compare rank indices. The sort is
    // stable and seeded from the current order, so a tie in reconstructed
    // totals cannot manufacture a climb.
    if !ordered.is_empty() {
        let previous_totals: Vec<i64> = ordered
            .iter()
            .map(|row| row.total - gain_of(row.student_id))
            .collect();

        let mut previous_order: Vec<usize> = (0..ordered.len()).collect();
        previous_order.sort_by(|&i, &j| previous_totals[j].cmp(&previous_totals[i]));

        let mut previous_rank = vec![0usize; ordered.len()];
        for (rank, &idx) in previous_order.iter().enumerate() {
            previous_rank[idx] = rank;
        }

        let max_climb = (0..ordered.len())
            .map(|idx| previous_rank[idx] as i64 - idx as i64)
            .max()
            .unwrap_or(0);

        if max_climb > 0 {
            for (idx, row) in ordered.iter().enumerate() {
                if previous_rank[idx] as i64 - idx as i64 == max_climb {
                    badges
                        .entry(row.student_id)
                        .or_default()
                        .push(Badge::BiggestClimber);
                }
            }
        }
    }

    badges
}

/// Rank a snapshot and attach badges, producing the decorated entries the
/// leaderboard endpoints serve.
pub fn build_leaderboard(
    rows: Vec<StandingRow>,
    weekly_gains: &HashMap<Uuid, i64>,
) -> Vec<LeaderboardEntry> {
    let ordered = rank_standings(rows);
    let mut badges = compute_badges(&ordered, weekly_gains);

    ordered
        .into_iter()
        .enumerate()
        .map(|(idx, row)| LeaderboardEntry {
            rank: idx as i64 + 1,
            student: StudentInfo {
                student_id: row.student_id,
                first_name: row.first_name,
                last_name: row.last_name,
            },
            total: row.total,
            has_negative_history: row.has_negative_history,
            badges: badges.remove(&row.student_id).unwrap_or_default(),
        })
        .collect()
}

/// Level is derived from the clamped total: negative standings stay at
/// level 1 with no progress.
pub fn level_for_total(total: i64) -> i64 {
    total.max(0) / 1000 + 1
}

/// Percentage of the way from the current level to the next.
pub fn progress_percent(total: i64) -> f64 {
    (total.max(0) % 1000) as f64 / 10.0
}

/// Strict comparison of the two windowed sums; magnitude is irrelevant.
pub fn trend(recent_window: i64, previous_window: i64) -> TrendDirection {
    match recent_window.cmp(&previous_window) {
        Ordering::Greater => TrendDirection::Up,
        Ordering::Less => TrendDirection::Down,
        Ordering::Equal => TrendDirection::Neutral,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn row(total: i64, has_negative_history: bool, updated_secs: i64) -> StandingRow {
        StandingRow {
            student_id: Uuid::new_v4(),
            first_name: "Test".to_string(),
            last_name: "Student".to_string(),
            total,
            has_negative_history,
            updated_at: Utc.timestamp_opt(1_700_000_000 + updated_secs, 0).unwrap(),
        }
    }

    #[test]
    fn test_orders_by_total_descending() {
        let ordered = rank_standings(vec![row(10, false, 0), row(50, false, 0), row(30, false, 0)]);
        let totals: Vec<i64> = ordered.iter().map(|r| r.total).collect();
        assert_eq!(totals, vec![50, 30, 10]);
    }

    #[test]
    fn test_zero_total_negative_history_ranks_first() {
        let redeemed = row(0, true, 0);
        let pristine = row(0, false, 0);
        let ordered = rank_standings(vec![pristine.clone(), redeemed.clone()]);
        assert_eq!(ordered[0].student_id, redeemed.student_id);
        assert_eq!(ordered[1].student_id, pristine.student_id);
    }

    #[test]
    fn test_nonzero_total_negative_history_ranks_last() {
        let tainted = row(50, true, 0);
        let clean = row(50, false, 0);
        let ordered = rank_standings(vec![tainted.clone(), clean.clone()]);
        assert_eq!(ordered[0].student_id, clean.student_id);
        assert_eq!(ordered[1].student_id, tainted.student_id);
    }

    #[test]
    fn test_earlier_update_wins_tie() {
        let late = row(40, false, 100);
        let early = row(40, false, 10);
        let ordered = rank_standings(vec![late.clone(), early.clone()]);
        assert_eq!(ordered[0].student_id, early.student_id);
    }

    #[test]
    fn test_ranking_is_deterministic() {
        let rows = vec![row(10, true, 5), row(10, false, 5), row(0, true, 1)];
        let first = rank_standings(rows.clone());
        let second = rank_standings(rows);
        let ids_a: Vec<Uuid> = first.iter().map(|r| r.student_id).collect();
        let ids_b: Vec<Uuid> = second.iter().map(|r| r.student_id).collect();
        assert_eq!(ids_a, ids_b);
    }

    #[test]
    fn test_top1_requires_positive_total() {
        let ordered = rank_standings(vec![row(0, false, 0), row(-5, false, 0)]);
        let badges = compute_badges(&ordered, &HashMap::new());
        assert!(
            badges
                .values()
                .all(|list| !list.contains(&Badge::Top1))
        );
    }

    #[test]
    fn test_badge_scenario_top1_and_most_improved() {
        let a = row(100, false, 0);
        let b = row(80, false, 0);
        let gains = HashMap::from([(a.student_id, 0), (b.student_id, 50)]);

        let ordered = rank_standings(vec![a.clone(), b.clone()]);
        let badges = compute_badges(&ordered, &gains);

        assert!(badges[&a.student_id].contains(&Badge::Top1));
        assert!(badges[&b.student_id].contains(&Badge::MostImproved));
        assert!(!badges[&b.student_id].contains(&Badge::Top1));
    }

    #[test]
    fn test_most_improved_ties_share_badge() {
        let a = row(60, false, 0);
        let b = row(40, false, 0);
        let c = row(20, false, 0);
        let gains = HashMap::from([(a.student_id, 30), (b.student_id, 30), (c.student_id, 5)]);

        let ordered = rank_standings(vec![a.clone(), b.clone(), c.clone()]);
        let badges = compute_badges(&ordered, &gains);

        assert!(badges[&a.student_id].contains(&Badge::MostImproved));
        assert!(badges[&b.student_id].contains(&Badge::MostImproved));
        assert!(!badges.get(&c.student_id).is_some_and(|l| l.contains(&Badge::MostImproved)));
    }

    #[test]
    fn test_zero_or_negative_weekly_gain_never_most_improved() {
        let a = row(100, false, 0);
        let b = row(90, true, 0);
        let gains = HashMap::from([(a.student_id, 0), (b.student_id, -20)]);

        let ordered = rank_standings(vec![a, b]);
        let badges = compute_badges(&ordered, &gains);

        assert!(
            badges
                .values()
                .all(|list| !list.contains(&Badge::MostImproved))
        );
    }

    #[test]
    fn test_biggest_climber_awarded_for_rank_gain() {
        // b was 3rd last week (30 points behind c), gained 50 and is now 2nd.
        let a = row(100, false, 0);
        let b = row(80, false, 0);
        let c = row(60, false, 0);
        let gains = HashMap::from([(b.student_id, 50)]);

        let ordered = rank_standings(vec![a.clone(), b.clone(), c.clone()]);
        let badges = compute_badges(&ordered, &gains);

        assert!(badges[&b.student_id].contains(&Badge::BiggestClimber));
        assert!(!badges[&a.student_id].contains(&Badge::BiggestClimber));
    }

    #[test]
    fn test_no_biggest_climber_when_order_unchanged() {
        let a = row(100, false, 0);
        let b = row(50, false, 0);
        let gains = HashMap::from([(a.student_id, 10), (b.student_id, 5)]);

        let ordered = rank_standings(vec![a, b]);
        let badges = compute_badges(&ordered, &gains);

        assert!(
            badges
                .values()
                .all(|list| !list.contains(&Badge::BiggestClimber))
        );
    }

    #[test]
    fn test_student_can_hold_multiple_badges() {
        // b overtakes a this week: top of the board, biggest gain, climbed.
        let a = row(80, false, 0);
        let b = row(100, false, 10);
        let gains = HashMap::from([(b.student_id, 90)]);

        let ordered = rank_standings(vec![a, b.clone()]);
        let badges = compute_badges(&ordered, &gains);

        let b_badges = &badges[&b.student_id];
        assert!(b_badges.contains(&Badge::Top1));
        assert!(b_badges.contains(&Badge::MostImproved));
        assert!(b_badges.contains(&Badge::BiggestClimber));
    }

    #[test]
    fn test_build_leaderboard_assigns_ranks_and_badges() {
        let a = row(100, false, 0);
        let b = row(80, false, 0);
        let gains = HashMap::from([(b.student_id, 50)]);

        let entries = build_leaderboard(vec![b.clone(), a.clone()], &gains);

        assert_eq!(entries[0].rank, 1);
        assert_eq!(entries[0].student.student_id, a.student_id);
        assert!(entries[0].badges.contains(&Badge::Top1));
        assert_eq!(entries[1].rank, 2);
        assert!(entries[1].badges.contains(&Badge::MostImproved));
    }

    #[test]
    fn test_build_leaderboard_empty_class() {
        let entries = build_leaderboard(vec![], &HashMap::new());
        assert!(entries.is_empty());
    }

    #[test]
    fn test_level_derivation() {
        assert_eq!(level_for_total(0), 1);
        assert_eq!(level_for_total(999), 1);
        assert_eq!(level_for_total(1000), 2);
        assert_eq!(level_for_total(2500), 3);
        assert_eq!(level_for_total(-300), 1);
    }

    #[test]
    fn test_progress_percent_clamped() {
        assert_eq!(progress_percent(250), 25.0);
        assert_eq!(progress_percent(1999), 99.9);
        assert_eq!(progress_percent(-50), 0.0);
        assert_eq!(progress_percent(1000), 0.0);
    }

    #[test]
    fn test_trend_is_strict_comparison() {
        assert_eq!(trend(10, 5), TrendDirection::Up);
        assert_eq!(trend(5, 10), TrendDirection::Down);
        assert_eq!(trend(7, 7), TrendDirection::Neutral);
        // Only direction matters, never magnitude.
        assert_eq!(trend(6, 5), TrendDirection::Up);
    }
}
