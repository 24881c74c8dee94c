//! Regression coverage for article validation, likes and comments.

use super::*;
use chrono::TimeDelta;
use rstest::{fixture, rstest};

fn at(seconds: i64) -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH + TimeDelta::seconds(seconds)
}

#[fixture]
fn draft_article() -> News {
    let draft = NewsDraft::try_new(
        "Rangers unveil new coach",
        Some("Flying Antelopes name their new boss"),
        "Full story here.",
        "general",
        Some("rangers, NPFL"),
        None,
    )
    .expect("valid draft");
    News::new(
        NewsId::random(),
        "rangers-unveil-new-coach".into(),
        draft,
        AdminId::random(),
        None,
        at(0),
    )
}

#[rstest]
fn drafts_are_unpublished(draft_article: News) {
    assert_eq!(draft_article.status, NewsStatus::Draft);
    assert!(draft_article.published_at.is_none());
    assert_eq!(draft_article.tags, vec!["rangers", "npfl"]);
}

#[rstest]
#[case("Goal", "content", "general", "title")]
#[case("A proper title", "   ", "general", "content")]
#[case("A proper title", "content", "gossip", "category")]
fn draft_validation_names_field(
    #[case] title: &str,
    #[case] content: &str,
    #[case] category: &str,
    #[case] field: &str,
) {
    let err = NewsDraft::try_new(title, None, content, category, None, None).expect_err("invalid");
    assert_eq!(err.field(), field);
}

#[rstest]
fn tags_are_capped() {
    let raw = (0..=TAGS_MAX).map(|n| format!("t{n}")).collect::<Vec<_>>().join(",");
    assert_eq!(
        parse_tags(&raw).expect_err("too many"),
        ValidationError::TooMany {
            field: "tags",
            max: TAGS_MAX
        }
    );
}

#[rstest]
fn first_publication_sets_timestamp_once(mut draft_article: News) {
    let publish = NewsPatch::try_new(None, None, None, None, None, Some("published"))
        .expect("valid patch");
    draft_article.apply(publish.clone(), None, at(10));
    assert_eq!(draft_article.published_at, Some(at(10)));

    let unpublish =
        NewsPatch::try_new(None, None, None, None, None, Some("draft")).expect("valid patch");
    draft_article.apply(unpublish, None, at(20));
    draft_article.apply(publish, None, at(30));
    assert_eq!(draft_article.published_at, Some(at(10)));
}

#[rstest]
fn patch_keeps_slug_and_clears_summary(mut draft_article: News) {
    let patch = NewsPatch::try_new(Some("A different headline"), Some(""), None, None, None, None)
        .expect("valid patch");
    draft_article.apply(patch, Some("https://img/1.jpg".into()), at(5));
    assert_eq!(draft_article.title, "A different headline");
    assert_eq!(draft_article.slug, "rangers-unveil-new-coach");
    assert_eq!(draft_article.summary, None);
    assert_eq!(draft_article.image_url.as_deref(), Some("https://img/1.jpg"));
}

#[rstest]
fn like_toggle_round_trips(mut draft_article: News) {
    let fan = UserId::random();
    assert!(draft_article.toggle_like(fan));
    assert_eq!(draft_article.likes.len(), 1);
    assert!(!draft_article.toggle_like(fan));
    assert!(draft_article.likes.is_empty());
}

#[rstest]
fn comments_can_be_removed(mut draft_article: News) {
    let comment = Comment {
        id: CommentId::random(),
        user_id: UserId::random(),
        author_name: "Chioma Okafor".into(),
        body: CommentBody::new("  Great signing ").expect("body").as_str().to_owned(),
        created_at: at(3),
    };
    let id = comment.id;
    assert_eq!(draft_article.add_comment(comment).body, "Great signing");
    assert!(draft_article.comment(id).is_some());
    assert!(draft_article.remove_comment(id).is_some());
    assert!(draft_article.remove_comment(id).is_none());
}

#[rstest]
fn comment_body_is_bounded() {
    assert_eq!(CommentBody::new("").expect_err("blank").field(), "body");
    assert!(CommentBody::new(&"x".repeat(COMMENT_MAX + 1)).is_err());
}

#[rstest]
fn public_filter_hides_drafts(draft_article: News) {
    assert!(!NewsFilter::default().accepts(&draft_article));
    let staff = NewsFilter {
        include_drafts: true,
        ..NewsFilter::default()
    };
    assert!(staff.accepts(&draft_article));
}

#[rstest]
fn filter_matches_tag_and_search(mut draft_article: News) {
    draft_article.status = NewsStatus::Published;
    let filter = NewsFilter {
        tag: Some("NPFL".into()),
        search: Some("coach".into()),
        ..NewsFilter::default()
    };
    assert!(filter.accepts(&draft_article));
    let filter = NewsFilter {
        category: Some(NewsCategory::Transfer),
        ..NewsFilter::default()
    };
    assert!(!filter.accepts(&draft_article));
}

#[rstest]
fn categories_serialise_snake_case() {
    assert_eq!(
        serde_json::to_value(NewsCategory::MatchReport).expect("serialise"),
        "match_report"
    );
    assert_eq!(
        NewsCategory::parse("Match_Report").expect("known"),
        NewsCategory::MatchReport
    );
}
