use proptest::prelude::*;
use rimebench::charset::Charset;
use rimebench::driver::SupplementaryResult;
use rimebench::engine::CommitLine;
use rimebench::mapping::MappingTable;
use rimebench::segment::segment;
use rimebench::stats;
use rstest::rstest;

const MEMBERS: &str = "大小中文重庆";

fn charset() -> Charset {
    Charset::from_chars(MEMBERS.chars())
}

fn mapping() -> MappingTable {
    let mut t = MappingTable::default();
    // 文 stays unmapped on purpose: in charset, not encodable.
    for c in "大小中重庆".chars() {
        t.insert(c, "xx".to_string());
    }
    t
}

proptest! {
    #[test]
    fn full_lines_are_maximal_charset_runs(raw in "[大小中文重庆。！a b\n]{0,60}") {
        let cs = charset();
        let article = segment(&raw, &cs, &mapping(), 2);

        for line in &article.full_lines {
            prop_assert!(!line.is_empty());
            prop_assert!(line.chars().all(|c| cs.contains(c)));
        }
        // The runs reassemble into the source minus non-members.
        let joined: String = article.full_lines.concat();
        let filtered: String = raw.chars().filter(|&c| cs.contains(c)).collect();
        prop_assert_eq!(joined, filtered);
    }

    #[test]
    fn ready_lines_are_an_encodable_subset(raw in "[大小中文重庆。！x]{0,60}") {
        let cs = charset();
        let table = mapping();
        let article = segment(&raw, &cs, &table, 2);

        let mut remaining = article.full_lines.clone();
        for line in &article.ready_lines {
            prop_assert!(line.chars().count() >= 2);
            prop_assert!(line.chars().all(|c| table.contains(c)));
            // Each ready line is one of the full lines (multiset inclusion).
            let pos = remaining.iter().position(|l| l == line);
            prop_assert!(pos.is_some());
            remaining.remove(pos.unwrap());
        }
    }

    #[test]
    fn echoed_commits_always_score_perfectly(lines in proptest::collection::vec("[大小中重庆]{1,8}", 0..8)) {
        let commits: Vec<CommitLine> = lines.iter().map(CommitLine::new).collect();
        let (s, unmatched) =
            stats::score("prop", &lines, &commits, &SupplementaryResult::new()).unwrap();
        prop_assert_eq!(s.lines, lines.len() as u64);
        prop_assert_eq!(s.lines_correct, s.lines);
        prop_assert_eq!(s.chars_correct, s.chars);
        prop_assert!(unmatched.is_empty());
    }
}

#[rstest]
#[case("春天来了", "春天来了", 4, true)]
#[case("春天来了", "春地来了", 3, false)]
#[case("春天来了", "春天", 2, false)]
#[case("春天", "春天来了", 2, false)]
#[case("春天来了", "秋地去走", 0, false)]
fn positional_scoring_cases(
    #[case] ready: &str,
    #[case] committed: &str,
    #[case] expected_chars: u64,
    #[case] expected_exact: bool,
) {
    let ready_lines = vec![ready.to_string()];
    let commits = vec![CommitLine::new(committed)];
    let (s, _) =
        stats::score("case", &ready_lines, &commits, &SupplementaryResult::new()).unwrap();
    assert_eq!(s.chars_correct, expected_chars);
    assert_eq!(s.lines_correct == 1, expected_exact);
}
