/// Aggregation tests over realistic transaction sets.
///
/// Covers grouping, ranking, monthly buckets, pass/fail counting, the
/// audit ratio and skill classification boundaries.
use chrono::{DateTime, TimeZone, Utc};

use xpdash::analytics::{
    AuditRatio, DashboardSummary, SkillLevel, aggregate_skills, audit_ratio, bucket_by_month,
    classify_skill_level, format_magnitude, group_by_leaf_path, last_activity, pass_fail_counts,
    recent_months, top_n, total_amount,
};
use xpdash::model::{Audits, ProgressRecord, Transaction, TransactionKind};

fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
}

fn xp(id: i64, amount: i64, path: &str, when: DateTime<Utc>) -> Transaction {
    Transaction {
        id,
        amount,
        kind: TransactionKind::Xp,
        path: path.to_string(),
        created_at: when,
    }
}

fn progress(id: i64, path: &str, grade: Option<f64>) -> ProgressRecord {
    ProgressRecord {
        id,
        project_path: path.to_string(),
        grade,
        created_at: at(2024, 6, 1),
        updated_at: None,
    }
}

/// Ten transactions, 2400 XP, over three projects.
fn ten_transactions() -> Vec<Transaction> {
    vec![
        xp(1, 300, "/kisumu/module/go-reloaded", at(2024, 4, 10)),
        xp(2, 200, "/kisumu/module/go-reloaded", at(2024, 4, 20)),
        xp(3, 100, "/kisumu/module/ascii-art", at(2024, 5, 2)),
        xp(4, 400, "/kisumu/module/ascii-art", at(2024, 5, 9)),
        xp(5, 250, "/kisumu/module/go-reloaded", at(2024, 5, 30)),
        xp(6, 150, "/kisumu/module/forum", at(2024, 6, 3)),
        xp(7, 350, "/kisumu/module/forum", at(2024, 6, 17)),
        xp(8, 50, "/kisumu/module/ascii-art", at(2024, 7, 1)),
        xp(9, 300, "/kisumu/module/forum", at(2024, 7, 15)),
        xp(10, 300, "/kisumu/module/go-reloaded", at(2024, 8, 1)),
    ]
}

// ---------------------------------------------------------------------------
// Totals and grouping
// ---------------------------------------------------------------------------

#[test]
fn ten_transactions_total_2400_over_three_projects() {
    let txs = ten_transactions();
    assert_eq!(total_amount(&txs), 2400);

    let groups = group_by_leaf_path(&txs);
    assert_eq!(
        groups,
        vec![
            ("go-reloaded".to_string(), 1050),
            ("ascii-art".to_string(), 550),
            ("forum".to_string(), 800),
        ]
    );
    assert_eq!(groups.iter().map(|(_, v)| v).sum::<i64>(), 2400);
}

#[test]
fn top_two_projects_descending() {
    let groups = group_by_leaf_path(&ten_transactions());
    assert_eq!(
        top_n(&groups, 2),
        vec![("go-reloaded".to_string(), 1050), ("forum".to_string(), 800)]
    );
    assert_eq!(top_n(&groups, 10).len(), 3);
    assert!(top_n(&groups, 0).is_empty());
}

#[test]
fn negative_amounts_reduce_totals() {
    let txs = vec![
        xp(1, 500, "/m/a", at(2024, 1, 1)),
        xp(2, -200, "/m/a", at(2024, 1, 2)),
    ];
    assert_eq!(total_amount(&txs), 300);
    assert_eq!(group_by_leaf_path(&txs), vec![("a".to_string(), 300)]);
}

// ---------------------------------------------------------------------------
// Monthly buckets
// ---------------------------------------------------------------------------

#[test]
fn monthly_buckets_are_ascending_and_complete() {
    let buckets = bucket_by_month(&ten_transactions());
    let keys: Vec<(i32, u32)> = buckets.iter().map(|b| (b.year, b.month)).collect();
    assert_eq!(keys, vec![(2024, 4), (2024, 5), (2024, 6), (2024, 7), (2024, 8)]);

    let totals: Vec<i64> = buckets.iter().map(|b| b.total).collect();
    assert_eq!(totals, vec![500, 750, 500, 350, 300]);
    assert_eq!(buckets.iter().map(|b| b.count).sum::<usize>(), 10);
    assert_eq!(buckets[0].label(), "Apr 2024");
}

#[test]
fn recent_months_keeps_the_tail() {
    let buckets = bucket_by_month(&ten_transactions());
    let recent = recent_months(&buckets, 3);
    assert_eq!(recent.len(), 3);
    assert_eq!(recent[0].month, 6);
    assert_eq!(recent[2].month, 8);
    assert_eq!(recent_months(&buckets, 99).len(), 5);
}

#[test]
fn last_activity_is_newest_transaction() {
    assert_eq!(last_activity(&ten_transactions()), Some(at(2024, 8, 1)));
    assert_eq!(last_activity(&[]), None);
}

// ---------------------------------------------------------------------------
// Pass / fail
// ---------------------------------------------------------------------------

#[test]
fn pass_fail_partitions_every_record() {
    let records = vec![
        progress(1, "/m/a", Some(1.0)),
        progress(2, "/m/b", Some(1.7)),
        progress(3, "/m/c", Some(0.0)),
        progress(4, "/m/d", Some(0.4)),
        progress(5, "/m/e", None),
    ];
    let counts = pass_fail_counts(&records);
    assert_eq!(counts.passed, 2);
    assert_eq!(counts.failed, 2);
    assert_eq!(counts.pending, 1);
    assert_eq!(counts.passed + counts.failed + counts.pending, records.len());
    assert_eq!(counts.pass_rate(), Some(50.0));
}

#[test]
fn pass_rate_is_undefined_without_grades() {
    let counts = pass_fail_counts(&[progress(1, "/m/a", None)]);
    assert_eq!(counts.pass_rate(), None);
    assert_eq!(pass_fail_counts(&[]).total(), 0);
}

// ---------------------------------------------------------------------------
// Audit ratio
// ---------------------------------------------------------------------------

#[test]
fn audit_ratio_without_received_is_not_available() {
    assert_eq!(audit_ratio(500, 0), AuditRatio::NotAvailable);
    assert_eq!(audit_ratio(0, 0).to_string(), "N/A");
}

#[test]
fn audit_ratio_divides_given_by_received() {
    let ratio = audit_ratio(300, 200);
    assert_eq!(ratio, AuditRatio::Ratio(1.5));
    assert_eq!(ratio.to_string(), "1.50");
    assert_eq!(audit_ratio(0, 100).value(), Some(0.0));
}

// ---------------------------------------------------------------------------
// Skill levels
// ---------------------------------------------------------------------------

#[test]
fn skill_level_percent_boundaries_are_strict() {
    assert_eq!(classify_skill_level(15.0001, 0, 0.0), SkillLevel::Expert);
    assert_eq!(classify_skill_level(15.0, 0, 0.0), SkillLevel::Advanced);
    assert_eq!(classify_skill_level(10.0, 0, 0.0), SkillLevel::Intermediate);
    assert_eq!(classify_skill_level(5.0, 0, 0.0), SkillLevel::Beginner);
    assert_eq!(classify_skill_level(5.0001, 0, 0.0), SkillLevel::Intermediate);
}

#[test]
fn skill_level_project_boundaries_are_strict() {
    assert_eq!(classify_skill_level(0.0, 11, 80.1), SkillLevel::Expert);
    assert_eq!(classify_skill_level(0.0, 10, 100.0), SkillLevel::Advanced);
    assert_eq!(classify_skill_level(0.0, 11, 80.0), SkillLevel::Advanced);
    assert_eq!(classify_skill_level(0.0, 6, 70.0), SkillLevel::Intermediate);
    assert_eq!(classify_skill_level(0.0, 4, 50.1), SkillLevel::Intermediate);
    assert_eq!(classify_skill_level(0.0, 3, 100.0), SkillLevel::Beginner);
}

#[test]
fn skills_group_by_keyword_and_sort_by_xp() {
    let txs = vec![
        xp(1, 600, "/kisumu/module/piscine-js/quest-01", at(2024, 9, 1)),
        xp(2, 300, "/kisumu/module/forum", at(2024, 9, 2)),
        xp(3, 100, "/kisumu/module/mystery", at(2024, 9, 3)),
    ];
    let records = vec![
        progress(1, "/kisumu/module/forum", Some(1.0)),
        progress(2, "/kisumu/module/forum", Some(0.0)),
        progress(3, "/kisumu/module/docker", Some(1.0)),
    ];

    let skills = aggregate_skills(&txs, &records);
    let names: Vec<&str> = skills.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["JavaScript", "Full Stack Development", "General Programming"]);

    let full_stack = &skills[1];
    assert_eq!(full_stack.total_xp, 300);
    assert_eq!(full_stack.project_count, 2);
    assert_eq!(full_stack.passed_count, 1);
    assert!((full_stack.percent - 30.0).abs() < 1e-9);
    assert!((full_stack.pass_rate - 50.0).abs() < 1e-9);

    assert_eq!(skills[0].level, SkillLevel::Expert);
    let total: f64 = skills.iter().map(|s| s.percent).sum();
    assert!((total - 100.0).abs() < 1e-9);
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

#[test]
fn summary_ties_everything_together() {
    let txs = ten_transactions();
    let records = vec![progress(1, "/kisumu/module/forum", Some(1.0)), progress(2, "/m/x", None)];
    let audits = Audits {
        given: vec![Transaction {
            kind: TransactionKind::AuditGiven,
            ..xp(20, 2048, "/m/forum", at(2024, 6, 5))
        }],
        received: vec![Transaction {
            kind: TransactionKind::AuditReceived,
            ..xp(21, 1024, "/m/forum", at(2024, 6, 6))
        }],
    };

    let summary = DashboardSummary::compute(&txs, &records, &audits, 2, 3);
    assert_eq!(summary.total_xp, 2400);
    assert_eq!(summary.project_count, 3);
    assert_eq!(summary.top_projects.len(), 2);
    assert_eq!(summary.recent_months.len(), 3);
    assert_eq!(summary.monthly.len(), 5);
    assert_eq!(summary.pass_fail.total(), 2);
    assert_eq!(summary.audit_ratio, AuditRatio::Ratio(2.0));
    assert_eq!(format_magnitude(summary.audits_given), "2.00 KB");
    assert_eq!(summary.last_activity, Some(at(2024, 8, 1)));
}

#[test]
fn summary_of_nothing_is_empty_not_an_error() {
    let summary = DashboardSummary::compute(&[], &[], &Audits::default(), 10, 6);
    assert_eq!(summary.total_xp, 0);
    assert!(summary.top_projects.is_empty());
    assert!(summary.skills.is_empty());
    assert_eq!(summary.audit_ratio, AuditRatio::NotAvailable);
    assert_eq!(summary.last_activity, None);
}
