//! Load-balanced reviewer selection
//!
//! Rank, widen, shuffle: candidates are ranked by experience, review
//! activity, and inverse load, the top half (at least `k`) form a
//! shortlist, and a uniform shuffle picks the final `k`. Pure top-k
//! selection would hand every submission to the same best-ranked
//! reviewers; the widened shortlist spreads the work while still
//! preferring experienced, available people.

use peerflow_common::db::models::ReviewerRole;
use peerflow_common::db::ReviewerCandidate;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;
use uuid::Uuid;

/// Cap on each ranking sub-score
const SUB_SCORE_CAP: i64 = 10;

/// Share of the eligible pool that enters the shortlist
const SHORTLIST_RATIO: f64 = 0.5;

/// Rank score for one candidate: bounded experience + activity + inverse
/// load, 0 to 30.
pub fn rank_score(candidate: &ReviewerCandidate) -> i64 {
    let experience = (candidate.merged_submissions * 2).min(SUB_SCORE_CAP);
    let activity = candidate.completed_reviews.min(SUB_SCORE_CAP);
    let load = (SUB_SCORE_CAP - candidate.pending_assignments * 2).max(0);

    experience + activity + load
}

/// Filter the raw pool down to candidates eligible to peer review this
/// submission: not the author, not an administrator (admins are reserved
/// for mentor review).
pub fn eligible_pool(pool: &[ReviewerCandidate], author_id: Uuid) -> Vec<&ReviewerCandidate> {
    pool.iter()
        .filter(|c| c.id != author_id && c.role != ReviewerRole::Admin)
        .collect()
}

/// Select up to `k` reviewers from the eligible pool, skipping anyone in
/// `exclude` (reviewers who already hold an assignment for the
/// submission). Returns exactly `min(k, remaining)` ids; empty when
/// nobody remains.
pub fn select_reviewers<R: Rng>(
    eligible: &[&ReviewerCandidate],
    exclude: &HashSet<Uuid>,
    k: usize,
    rng: &mut R,
) -> Vec<Uuid> {
    if k == 0 {
        return Vec::new();
    }

    let mut ranked: Vec<&ReviewerCandidate> = eligible
        .iter()
        .copied()
        .filter(|c| !exclude.contains(&c.id))
        .collect();

    if ranked.is_empty() {
        return Vec::new();
    }

    // Stable sort; tie order among equal ranks is unspecified and the
    // shuffle below randomizes the final pick anyway
    ranked.sort_by_key(|c| std::cmp::Reverse(rank_score(c)));

    let widened = ((ranked.len() as f64 * SHORTLIST_RATIO).ceil() as usize)
        .max(k)
        .min(ranked.len());

    let mut shortlist: Vec<Uuid> = ranked[..widened].iter().map(|c| c.id).collect();
    shortlist.shuffle(rng);
    shortlist.truncate(k);

    shortlist
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn candidate(merged: i64, reviews: i64, pending: i64) -> ReviewerCandidate {
        ReviewerCandidate {
            id: Uuid::new_v4(),
            role: ReviewerRole::Member,
            merged_submissions: merged,
            completed_reviews: reviews,
            pending_assignments: pending,
        }
    }

    #[test]
    fn test_rank_score_bounds() {
        // Everything maxed: 10 + 10 + 10
        assert_eq!(rank_score(&candidate(50, 50, 0)), 30);

        // Fully loaded newcomer: 0 + 0 + 0
        assert_eq!(rank_score(&candidate(0, 0, 9)), 0);

        // Experience doubles and caps
        assert_eq!(rank_score(&candidate(3, 0, 5)), 6);
        assert_eq!(rank_score(&candidate(6, 0, 5)), 10);

        // Load subtracts two per pending assignment
        assert_eq!(rank_score(&candidate(0, 0, 2)), 6);
    }

    #[test]
    fn test_eligible_pool_filters_author_and_admins() {
        let author = candidate(5, 5, 0);
        let admin = ReviewerCandidate {
            role: ReviewerRole::Admin,
            ..candidate(9, 9, 0)
        };
        let member = candidate(1, 1, 1);

        let pool = vec![author.clone(), admin, member.clone()];
        let eligible = eligible_pool(&pool, author.id);

        assert_eq!(eligible.len(), 1);
        assert_eq!(eligible[0].id, member.id);
    }

    #[test]
    fn test_select_returns_exactly_k() {
        let pool: Vec<ReviewerCandidate> = (0..8).map(|i| candidate(i, i, 0)).collect();
        let eligible: Vec<&ReviewerCandidate> = pool.iter().collect();
        let mut rng = StdRng::seed_from_u64(7);

        let picked = select_reviewers(&eligible, &HashSet::new(), 2, &mut rng);
        assert_eq!(picked.len(), 2);

        // No duplicates
        let unique: HashSet<_> = picked.iter().collect();
        assert_eq!(unique.len(), 2);
    }

    #[test]
    fn test_select_caps_at_pool_size() {
        let pool = vec![candidate(1, 1, 0)];
        let eligible: Vec<&ReviewerCandidate> = pool.iter().collect();
        let mut rng = StdRng::seed_from_u64(7);

        let picked = select_reviewers(&eligible, &HashSet::new(), 5, &mut rng);
        assert_eq!(picked, vec![pool[0].id]);
    }

    #[test]
    fn test_select_empty_pool() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(select_reviewers(&[], &HashSet::new(), 2, &mut rng).is_empty());
    }

    #[test]
    fn test_select_skips_excluded() {
        let pool: Vec<ReviewerCandidate> = (0..3).map(|i| candidate(i, i, 0)).collect();
        let eligible: Vec<&ReviewerCandidate> = pool.iter().collect();
        let exclude: HashSet<Uuid> = pool.iter().take(2).map(|c| c.id).collect();
        let mut rng = StdRng::seed_from_u64(7);

        let picked = select_reviewers(&eligible, &exclude, 2, &mut rng);
        assert_eq!(picked, vec![pool[2].id]);
    }

    #[test]
    fn test_shortlist_widens_beyond_top_k() {
        // Ten candidates, one clearly best. With a widened shortlist of
        // five and many seeds, the best-ranked candidate must not win
        // every draw.
        let mut pool: Vec<ReviewerCandidate> = (0..9).map(|_| candidate(0, 0, 4)).collect();
        let star = candidate(10, 10, 0);
        pool.push(star.clone());

        let eligible: Vec<&ReviewerCandidate> = pool.iter().collect();
        let mut star_missed = false;

        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let picked = select_reviewers(&eligible, &HashSet::new(), 1, &mut rng);
            if picked[0] != star.id {
                star_missed = true;
                break;
            }
        }

        assert!(star_missed, "widened shortlist should not always pick the top-ranked candidate");
    }
}
