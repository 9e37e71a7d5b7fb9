//! Derived leaderboard ranking
//!
//! The backend sorts the leaderboard by descending total score and keeps
//! tied entries in whatever order it emitted them; that order is treated as
//! stable here. This module only derives the rank shown next to each row:
//! standard competition ranking (1, 1, 3) with `disable_rank` entries kept in
//! place but excluded from counting.

use crate::models::LeaderboardEntry;

/// Rank value shown to users, after tie and hidden-rank adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayRank {
    /// Positive competition rank
    Ranked(u32),
    /// Entry is excluded from ranking; rendered as `-`
    Excluded,
}

impl std::fmt::Display for DisplayRank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ranked(rank) => write!(f, "{}", rank),
            Self::Excluded => write!(f, "-"),
        }
    }
}

/// Compute the display rank for every leaderboard entry.
///
/// Single left-to-right pass over the server-sorted list. Equal consecutive
/// scores among rankable entries share a rank; the next distinct score takes
/// the count of rankable entries seen so far, so ranks may skip values after
/// a tie group. `disable_rank` entries get [`DisplayRank::Excluded`] and do
/// not advance the count.
///
/// The result is index-aligned with `entries`.
pub fn display_ranks(entries: &[LeaderboardEntry]) -> Vec<DisplayRank> {
    let mut ranks = Vec::with_capacity(entries.len());
    let mut rank = 0u32;
    let mut visible_count = 0u32;
    let mut previous_score: Option<i64> = None;

    for entry in entries {
        if entry.disable_rank {
            ranks.push(DisplayRank::Excluded);
            continue;
        }

        visible_count += 1;
        if previous_score != Some(entry.total_score) {
            rank = visible_count;
        }
        ranks.push(DisplayRank::Ranked(rank));
        previous_score = Some(entry.total_score);
    }

    ranks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(user: &str, score: i64, disable_rank: bool) -> LeaderboardEntry {
        LeaderboardEntry {
            user_id: user.to_string(),
            username: user.to_string(),
            nickname: user.to_string(),
            avatar_url: String::new(),
            total_score: score,
            problem_scores: Default::default(),
            disable_rank,
        }
    }

    fn entries(scores: &[i64]) -> Vec<LeaderboardEntry> {
        scores
            .iter()
            .enumerate()
            .map(|(i, &s)| entry(&format!("u{i}"), s, false))
            .collect()
    }

    #[test]
    fn test_competition_ranking_skips_after_ties() {
        let ranks = display_ranks(&entries(&[100, 100, 90, 80, 80]));
        assert_eq!(
            ranks,
            vec![
                DisplayRank::Ranked(1),
                DisplayRank::Ranked(1),
                DisplayRank::Ranked(3),
                DisplayRank::Ranked(4),
                DisplayRank::Ranked(4),
            ]
        );
    }

    #[test]
    fn test_disabled_entry_keeps_position_without_shifting_ranks() {
        let list = vec![
            entry("a", 100, false),
            entry("b", 90, true),
            entry("c", 80, false),
        ];
        let ranks = display_ranks(&list);
        assert_eq!(
            ranks,
            vec![
                DisplayRank::Ranked(1),
                DisplayRank::Excluded,
                DisplayRank::Ranked(2),
            ]
        );
    }

    #[test]
    fn test_disabled_entry_inside_tie_group() {
        let list = vec![
            entry("a", 100, false),
            entry("b", 100, true),
            entry("c", 100, false),
            entry("d", 50, false),
        ];
        let ranks = display_ranks(&list);
        // The hidden entry neither breaks the tie nor inflates the next rank
        assert_eq!(
            ranks,
            vec![
                DisplayRank::Ranked(1),
                DisplayRank::Excluded,
                DisplayRank::Ranked(1),
                DisplayRank::Ranked(3),
            ]
        );
    }

    #[test]
    fn test_empty_leaderboard() {
        assert!(display_ranks(&[]).is_empty());
    }

    #[test]
    fn test_all_entries_disabled() {
        let list = vec![entry("a", 100, true), entry("b", 50, true)];
        let ranks = display_ranks(&list);
        assert_eq!(ranks, vec![DisplayRank::Excluded, DisplayRank::Excluded]);
    }

    #[test]
    fn test_display_rendering() {
        assert_eq!(DisplayRank::Ranked(3).to_string(), "3");
        assert_eq!(DisplayRank::Excluded.to_string(), "-");
    }
}
