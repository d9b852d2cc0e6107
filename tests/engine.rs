use odt_search::cache::Trie;
use odt_search::cover::BitsetCover;
use odt_search::engine::Dl85Builder;
use odt_search::heuristics::NoHeuristic;
use odt_search::query::ClassificationQuery;
use std::time::Duration;

fn xor_dataset() -> BitsetCover {
    // (a=0,b=0,cls=0), (a=0,b=1,cls=1), (a=1,b=0,cls=1), (a=1,b=1,cls=0)
    let rows = vec![
        vec![false, false],
        vec![false, true],
        vec![true, false],
        vec![true, true],
    ];
    let labels = vec![0, 1, 1, 0];
    BitsetCover::new(&rows, &labels, 2)
}

fn learner(max_depth: usize, max_error: f64, max_time: Duration) -> odt_search::engine::Dl85<Trie, ClassificationQuery, NoHeuristic> {
    Dl85Builder::new()
        .min_support(1)
        .max_depth(max_depth)
        .max_error(max_error)
        .max_time(max_time)
        .cache(Box::new(Trie::new()))
        .query(Box::new(ClassificationQuery))
        .heuristic(Box::new(NoHeuristic))
        .build()
        .unwrap()
}

#[test]
fn s1_xor_at_depth_two_is_solved_with_zero_error() {
    let mut cover = xor_dataset();
    let mut learner = learner(2, f64::INFINITY, Duration::from_secs(60));
    learner.fit(&mut cover).unwrap();

    assert_eq!(learner.statistics.tree_error, 0.0);
    let root = learner.tree.get_node(learner.tree.get_root_index()).unwrap();
    assert_eq!(root.value.test, Some(0), "root should split on attribute a");
}

#[test]
fn s2_depth_one_cannot_beat_error_two() {
    let mut cover = xor_dataset();
    let mut learner = learner(1, f64::INFINITY, Duration::from_secs(60));
    learner.fit(&mut cover).unwrap();

    assert_eq!(learner.statistics.tree_error, 2.0);
}

#[test]
fn s3_split_failing_minsup_falls_back_to_the_majority_leaf() {
    // Ten transactions, single attribute `a`, every one at a=0: 7 class-0,
    // 3 class-1. Splitting on `a` starves the a=1 branch below minsup.
    let mut rows = Vec::new();
    let mut labels = Vec::new();
    for _ in 0..7 {
        rows.push(vec![false]);
        labels.push(0);
    }
    for _ in 0..3 {
        rows.push(vec![false]);
        labels.push(1);
    }
    let mut cover = BitsetCover::new(&rows, &labels, 2);

    let mut learner = Dl85Builder::new()
        .min_support(2)
        .max_depth(2)
        .max_error(f64::INFINITY)
        .max_time(Duration::from_secs(60))
        .cache(Box::new(Trie::new()))
        .query(Box::new(ClassificationQuery))
        .heuristic(Box::new(NoHeuristic))
        .build()
        .unwrap();
    learner.fit(&mut cover).unwrap();

    assert_eq!(learner.statistics.tree_error, 3.0);
    let root = learner.tree.get_node(learner.tree.get_root_index()).unwrap();
    assert_eq!(root.value.test, None, "no feasible split: root must be a leaf");
    assert_eq!(root.value.out, Some(0), "majority class is 0");
}

#[test]
fn s4_zero_max_error_is_infeasible_but_one_accepts_the_optimum() {
    let mut cover = xor_dataset();
    let mut infeasible = learner(2, 0.0, Duration::from_secs(60));
    infeasible.fit(&mut cover).unwrap();
    assert!(infeasible.statistics.tree_error.is_infinite());

    let mut feasible = learner(2, 1.0, Duration::from_secs(60));
    feasible.fit(&mut cover).unwrap();
    assert_eq!(feasible.statistics.tree_error, 0.0);
}

#[test]
fn s5_immediate_timeout_returns_the_majority_leaf() {
    let mut cover = xor_dataset();
    let mut learner = learner(2, f64::INFINITY, Duration::ZERO);
    learner.fit(&mut cover).unwrap();

    assert_eq!(learner.statistics.tree_error, 2.0);
    assert!(learner.statistics.time_limit_reached);
}

#[test]
fn s6_duplicate_attribute_terminates_with_the_same_optimum() {
    // `c` is a verbatim copy of `a`; the search must not loop forever on
    // the redundant candidate and should still reach the same error as S1.
    let rows = vec![
        vec![false, false, false],
        vec![false, true, false],
        vec![true, false, true],
        vec![true, true, true],
    ];
    let labels = vec![0, 1, 1, 0];
    let mut cover = BitsetCover::new(&rows, &labels, 2);

    let mut learner = learner(2, f64::INFINITY, Duration::from_secs(60));
    learner.fit(&mut cover).unwrap();

    assert_eq!(learner.statistics.tree_error, 0.0);
}
