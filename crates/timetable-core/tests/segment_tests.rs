//! Tests for per-day conflict segmentation.

use std::collections::BTreeSet;

use timetable_core::segment::courses_on;
use timetable_core::{build_segments, segments_for_day, week_segments, Course, Segment};

fn course(id: &str, weekday: u8, sections: (u32, u32), weeks: (u32, u32)) -> Course {
    Course {
        id: id.to_string(),
        name: id.to_uppercase(),
        location: String::new(),
        instructor: String::new(),
        weekday,
        start_section: sections.0,
        end_section: sections.1,
        start_week: weeks.0,
        end_week: weeks.1,
        color: 0,
    }
}

fn ids(list: &[&str]) -> BTreeSet<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn seg(start: u32, end: u32, list: &[&str]) -> Segment {
    Segment {
        start_section: start,
        end_section: end,
        course_ids: ids(list),
        is_conflict: list.len() > 1,
    }
}

// ---------------------------------------------------------------------------
// build_segments
// ---------------------------------------------------------------------------

#[test]
fn empty_input_gives_no_segments() {
    let none: Vec<Course> = Vec::new();
    assert!(build_segments(&none).is_empty());
}

#[test]
fn single_course_is_one_plain_segment() {
    let courses = vec![course("a", 1, (3, 5), (1, 16))];
    assert_eq!(build_segments(&courses), vec![seg(3, 5, &["a"])]);
}

#[test]
fn partial_overlap_splits_into_three() {
    // A: 1-2, B: 2-3 → [1]{A}, [2]{A,B}, [3]{B}
    let courses = vec![
        course("a", 1, (1, 2), (1, 16)),
        course("b", 1, (2, 3), (1, 16)),
    ];

    let segments = build_segments(&courses);

    assert_eq!(
        segments,
        vec![seg(1, 1, &["a"]), seg(2, 2, &["a", "b"]), seg(3, 3, &["b"])]
    );
    assert!(segments[1].is_conflict);
    assert!(!segments[0].is_conflict);
}

#[test]
fn identical_ranges_form_one_conflict() {
    let courses = vec![
        course("a", 2, (5, 6), (1, 16)),
        course("b", 2, (5, 6), (1, 16)),
    ];
    assert_eq!(build_segments(&courses), vec![seg(5, 6, &["a", "b"])]);
}

#[test]
fn contained_course_splits_the_outer_one() {
    // A: 1-5, B: 2-3 → [1]{A}, [2-3]{A,B}, [4-5]{A}
    let courses = vec![
        course("a", 1, (1, 5), (1, 16)),
        course("b", 1, (2, 3), (1, 16)),
    ];
    assert_eq!(
        build_segments(&courses),
        vec![seg(1, 1, &["a"]), seg(2, 3, &["a", "b"]), seg(4, 5, &["a"])]
    );
}

#[test]
fn three_way_overlap_at_one_section() {
    // A: 1-3, B: 3-5, C: 3-3 → [1-2]{A}, [3]{A,B,C}, [4-5]{B}
    let courses = vec![
        course("a", 1, (1, 3), (1, 16)),
        course("b", 1, (3, 5), (1, 16)),
        course("c", 1, (3, 3), (1, 16)),
    ];

    let segments = build_segments(&courses);

    assert_eq!(
        segments,
        vec![
            seg(1, 2, &["a"]),
            seg(3, 3, &["a", "b", "c"]),
            seg(4, 5, &["b"])
        ]
    );
    assert_eq!(segments[1].width(), 1);
}

#[test]
fn gap_between_courses_produces_no_segment() {
    let courses = vec![
        course("a", 1, (1, 2), (1, 16)),
        course("b", 1, (5, 6), (1, 16)),
    ];
    assert_eq!(
        build_segments(&courses),
        vec![seg(1, 2, &["a"]), seg(5, 6, &["b"])]
    );
}

#[test]
fn back_to_back_courses_stay_separate() {
    let courses = vec![
        course("a", 1, (1, 2), (1, 16)),
        course("b", 1, (3, 4), (1, 16)),
    ];
    let segments = build_segments(&courses);
    assert_eq!(segments, vec![seg(1, 2, &["a"]), seg(3, 4, &["b"])]);
    assert!(segments.iter().all(|s| !s.is_conflict));
}

#[test]
fn input_order_does_not_matter() {
    let forward = vec![
        course("a", 1, (1, 4), (1, 16)),
        course("b", 1, (3, 6), (1, 16)),
        course("c", 1, (6, 8), (1, 16)),
    ];
    let mut reversed = forward.clone();
    reversed.reverse();
    assert_eq!(build_segments(&forward), build_segments(&reversed));
}

// ---------------------------------------------------------------------------
// Filtering by weekday and week
// ---------------------------------------------------------------------------

#[test]
fn segments_for_day_filters_weekday_and_week() {
    let courses = vec![
        course("a", 1, (1, 2), (1, 16)),
        course("b", 1, (2, 3), (1, 16)),
        course("late", 1, (1, 3), (10, 16)),
        course("tue", 2, (1, 3), (1, 16)),
    ];

    let segments = segments_for_day(&courses, 1, 5);

    assert_eq!(
        segments,
        vec![seg(1, 1, &["a"]), seg(2, 2, &["a", "b"]), seg(3, 3, &["b"])]
    );
}

#[test]
fn inactive_week_removes_the_conflict() {
    let courses = vec![
        course("a", 3, (1, 2), (1, 8)),
        course("b", 3, (1, 2), (9, 16)),
    ];
    assert_eq!(segments_for_day(&courses, 3, 8), vec![seg(1, 2, &["a"])]);
    assert_eq!(segments_for_day(&courses, 3, 9), vec![seg(1, 2, &["b"])]);
    assert!(segments_for_day(&courses, 3, 17).is_empty());
}

#[test]
fn courses_on_keeps_only_matching() {
    let courses = vec![
        course("a", 1, (1, 2), (1, 4)),
        course("b", 2, (1, 2), (1, 4)),
        course("c", 1, (1, 2), (5, 8)),
    ];
    let found: Vec<&str> = courses_on(&courses, 1, 4).map(|c| c.id.as_str()).collect();
    assert_eq!(found, vec!["a"]);
}

#[test]
fn week_segments_covers_all_seven_days() {
    let courses = vec![
        course("mon", 1, (1, 2), (1, 16)),
        course("sun", 7, (9, 10), (1, 16)),
    ];

    let week = week_segments(&courses, 1);

    assert_eq!(week.len(), 7);
    assert_eq!(week[0].weekday, 1);
    assert_eq!(week[0].segments, vec![seg(1, 2, &["mon"])]);
    assert!(week[1..6].iter().all(|d| d.segments.is_empty()));
    assert_eq!(week[6].weekday, 7);
    assert_eq!(week[6].segments, vec![seg(9, 10, &["sun"])]);
}

#[test]
fn segment_serializes_camel_case() {
    let json = serde_json::to_value(seg(2, 2, &["a", "b"])).unwrap();
    assert_eq!(json["startSection"], 2);
    assert_eq!(json["isConflict"], true);
    assert_eq!(json["courseIds"], serde_json::json!(["a", "b"]));
}
