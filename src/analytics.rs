use std::collections::HashMap;

use crate::backend::{AdminUser, FeedbackItem, Rating};

pub const TOP_TERMS_LIMIT: usize = 10;

/// Everything the dashboard fetches, taken once per page load.
#[derive(Debug, Clone, Default)]
pub struct DashboardSnapshot {
    pub users: Vec<AdminUser>,
    pub feedback: Vec<FeedbackItem>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SummaryTotals {
    pub users: usize,
    pub searches: usize,
    pub feedback: usize,
    pub saved_items: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermCount {
    pub term: String,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedbackDistribution {
    pub positive: usize,
    pub negative: usize,
}

impl FeedbackDistribution {
    pub fn rated(&self) -> usize {
        self.positive + self.negative
    }

    /// Share of positive ratings among positive and negative ones.
    pub fn positive_share(&self) -> Option<f64> {
        share(self.positive, self.rated())
    }

    pub fn negative_share(&self) -> Option<f64> {
        share(self.negative, self.rated())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserActivity {
    pub with_searches: usize,
    pub without_searches: usize,
}

impl UserActivity {
    pub fn total(&self) -> usize {
        self.with_searches + self.without_searches
    }

    pub fn active_share(&self) -> Option<f64> {
        share(self.with_searches, self.total())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSummary {
    pub totals: SummaryTotals,
    pub top_terms: Vec<TermCount>,
    pub feedback: FeedbackDistribution,
    pub activity: UserActivity,
}

impl DashboardSummary {
    pub fn derive(snapshot: &DashboardSnapshot) -> Self {
        Self {
            totals: summary_totals(&snapshot.users, &snapshot.feedback),
            top_terms: top_terms(&snapshot.users, TOP_TERMS_LIMIT),
            feedback: feedback_distribution(&snapshot.feedback),
            activity: user_activity(&snapshot.users),
        }
    }
}

pub fn regular_users(users: &[AdminUser]) -> impl Iterator<Item = &AdminUser> {
    users.iter().filter(|user| !user.is_admin())
}

/// User count excludes admins; search and saved totals cover every account.
pub fn summary_totals(users: &[AdminUser], feedback: &[FeedbackItem]) -> SummaryTotals {
    SummaryTotals {
        users: regular_users(users).count(),
        searches: users.iter().map(|user| user.search_history.len()).sum(),
        feedback: feedback.len(),
        saved_items: users.iter().map(|user| user.saved_items.len()).sum(),
    }
}

/// Most searched terms, highest count first. Equal counts keep the order in
/// which the terms were first seen.
pub fn top_terms(users: &[AdminUser], limit: usize) -> Vec<TermCount> {
    let mut ranked: Vec<TermCount> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for entry in users.iter().flat_map(|user| user.search_history.iter()) {
        match positions.get(entry.term.as_str()) {
            Some(&idx) => ranked[idx].count += 1,
            None => {
                positions.insert(entry.term.as_str(), ranked.len());
                ranked.push(TermCount {
                    term: entry.term.clone(),
                    count: 1,
                });
            }
        }
    }

    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(limit);
    ranked
}

pub fn feedback_distribution(feedback: &[FeedbackItem]) -> FeedbackDistribution {
    feedback
        .iter()
        .fold(FeedbackDistribution::default(), |mut acc, item| {
            match item.rating() {
                Some(Rating::Positive) => acc.positive += 1,
                Some(Rating::Negative) => acc.negative += 1,
                None => {}
            }
            acc
        })
}

pub fn user_activity(users: &[AdminUser]) -> UserActivity {
    let (with_searches, without_searches) =
        regular_users(users).fold((0, 0), |(with, without), user| {
            if user.search_history.is_empty() {
                (with, without + 1)
            } else {
                (with + 1, without)
            }
        });

    UserActivity {
        with_searches,
        without_searches,
    }
}

fn share(part: usize, whole: usize) -> Option<f64> {
    if whole == 0 {
        None
    } else {
        Some(part as f64 / whole as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::HistoryEntry;
    use serde_json::json;

    fn user(role: Option<&str>, terms: &[&str], saved: usize) -> AdminUser {
        AdminUser {
            id: String::new(),
            name: String::new(),
            email: String::new(),
            role: role.map(str::to_string),
            search_history: terms.iter().map(|term| HistoryEntry::new(*term)).collect(),
            saved_items: vec![json!({}); saved],
            feedback: Vec::new(),
        }
    }

    fn rated(rating: &str) -> FeedbackItem {
        FeedbackItem {
            rating: rating.to_string(),
            ..FeedbackItem::default()
        }
    }

    #[test]
    fn equal_counts_keep_first_seen_order() {
        let users = vec![
            user(None, &["c", "a", "b", "a"], 0),
            user(None, &["b", "c", "a", "b"], 0),
            user(None, &["a", "b", "c"], 0),
        ];
        // a:4 b:4 c:3, with c seen first, then a, then b
        let ranked = top_terms(&users, TOP_TERMS_LIMIT);
        let order: Vec<(&str, usize)> = ranked
            .iter()
            .map(|entry| (entry.term.as_str(), entry.count))
            .collect();
        assert_eq!(order, vec![("a", 4), ("b", 4), ("c", 3)]);
    }

    #[test]
    fn five_five_three_ranking() {
        let mut terms = vec!["a"; 5];
        terms.extend(vec!["b"; 5]);
        terms.extend(vec!["c"; 3]);
        let users = vec![user(None, &terms, 0)];

        let ranked = top_terms(&users, TOP_TERMS_LIMIT);
        assert_eq!(
            ranked,
            vec![
                TermCount { term: "a".into(), count: 5 },
                TermCount { term: "b".into(), count: 5 },
                TermCount { term: "c".into(), count: 3 },
            ]
        );
    }

    #[test]
    fn ranking_is_capped() {
        let terms: Vec<String> = (0..15).map(|idx| format!("term{idx}")).collect();
        let term_refs: Vec<&str> = terms.iter().map(String::as_str).collect();
        let users = vec![user(None, &term_refs, 0)];

        let ranked = top_terms(&users, TOP_TERMS_LIMIT);
        assert_eq!(ranked.len(), 10);
        assert_eq!(ranked[0].term, "term0");
        assert_eq!(ranked[9].term, "term9");
    }

    #[test]
    fn totals_exclude_admins_from_user_count_only() {
        let users = vec![
            user(Some("admin"), &["x"], 2),
            user(Some("user"), &["a", "b"], 1),
            user(None, &[], 0),
        ];
        let feedback = vec![rated("positive"), rated("negative"), rated("positive")];

        let totals = summary_totals(&users, &feedback);
        assert_eq!(
            totals,
            SummaryTotals {
                users: 2,
                searches: 3,
                feedback: 3,
                saved_items: 3,
            }
        );
    }

    #[test]
    fn feedback_shares_ignore_unknown_ratings() {
        let feedback = vec![
            rated("positive"),
            rated("positive"),
            rated("positive"),
            rated("negative"),
            rated("meh"),
        ];
        let distribution = feedback_distribution(&feedback);
        assert_eq!(distribution.positive, 3);
        assert_eq!(distribution.negative, 1);
        assert_eq!(distribution.positive_share(), Some(0.75));
        assert_eq!(distribution.negative_share(), Some(0.25));

        assert_eq!(feedback_distribution(&[]).positive_share(), None);
    }

    #[test]
    fn activity_counts_regular_users_with_searches() {
        let users = vec![
            user(Some("admin"), &["x"], 0),
            user(None, &["a"], 0),
            user(None, &[], 0),
            user(None, &[], 0),
            user(None, &["b", "c"], 0),
        ];
        let activity = user_activity(&users);
        assert_eq!(activity.with_searches, 2);
        assert_eq!(activity.without_searches, 2);
        assert_eq!(activity.active_share(), Some(0.5));

        assert_eq!(user_activity(&[]).active_share(), None);
    }

    #[test]
    fn summary_is_derived_from_the_snapshot() {
        let snapshot = DashboardSnapshot {
            users: vec![user(None, &["gene", "gene", "cell"], 1)],
            feedback: vec![rated("negative")],
        };
        let summary = DashboardSummary::derive(&snapshot);
        assert_eq!(summary.totals.searches, 3);
        assert_eq!(summary.top_terms[0].term, "gene");
        assert_eq!(summary.feedback.negative, 1);
        assert_eq!(summary.activity.with_searches, 1);
    }
}
