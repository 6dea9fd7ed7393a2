mod common;

use chrono::{Duration, Utc};
use skillswap::{
    error::DbError,
    models::{
        MatchStatus, MessageType, NewMatch, NewMessage, NewSession, SessionPatch, SessionStatus, SkillPatch, SkillType,
    },
    state::ProfileState,
};

use common::{accepted_match, member, pending_match, skill, store, user};

fn text(content: &str) -> NewMessage {
    NewMessage {
        content: content.to_owned(),
        message_type: MessageType::Text,
    }
}

#[tokio::test]
async fn first_load_provisions_profile_once() {
    let store = store().await;
    let ada = user("ada");

    let first = ProfileState::load(store.clone(), ada.clone()).await.unwrap();
    let profile = first.profile.clone().unwrap();
    assert_eq!(profile.display_name.as_deref(), Some("ada"));
    assert!(!profile.profile_completed);
    assert_eq!(profile.credits, 10);
    assert_eq!(profile.languages, vec!["English".to_owned()]);

    store.caches.clear_data();
    let second = ProfileState::load(store.clone(), ada).await.unwrap();
    assert_eq!(second.profile, Some(profile));
}

#[tokio::test]
async fn removed_skill_is_gone_from_next_listing() {
    let store = store().await;
    let ada = member(&store, "ada").await;
    let keep = skill(&store, &ada, "Rust", SkillType::Teach).await;
    let drop = skill(&store, &ada, "Go", SkillType::Learn).await;

    // warm the cache before removing
    assert_eq!(store.skills.for_user(&ada.id).await.unwrap().len(), 2);

    store.skills.remove(&ada.id, drop.id).await.unwrap();
    let ids: Vec<_> = store.skills.for_user(&ada.id).await.unwrap().into_iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![keep.id]);
}

#[tokio::test]
async fn only_owner_may_remove_skill() {
    let store = store().await;
    let ada = member(&store, "ada").await;
    let bob = member(&store, "bob").await;
    let rust = skill(&store, &ada, "Rust", SkillType::Teach).await;

    let err = store.skills.remove(&bob.id, rust.id).await.unwrap_err();
    assert!(matches!(err, DbError::Forbidden(_)), "{err}");
    assert_eq!(store.skills.for_user(&ada.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn library_search_matches_substring_by_popularity() {
    let store = store().await;
    store.library.add_item("Python", None, None, 90).await.unwrap();
    store.library.add_item("Photography", None, None, 80).await.unwrap();
    store.library.add_item("Pythonic Testing", None, None, 10).await.unwrap();

    let names: Vec<_> = store
        .library
        .search("Pyth", None, 20)
        .await
        .unwrap()
        .into_iter()
        .map(|item| item.name)
        .collect();
    assert_eq!(names, vec!["Python", "Pythonic Testing"]);

    let lower = store.library.search("pYTH", None, 1).await.unwrap();
    assert_eq!(lower.len(), 1);
    assert_eq!(lower[0].name, "Python");
}

#[tokio::test]
async fn library_search_folds_non_ascii_case() {
    let store = store().await;
    store.library.add_item("Ébénisterie", None, None, 50).await.unwrap();
    store.library.add_item("Origami", None, None, 40).await.unwrap();

    for query in ["Ébén", "ébén", "ÉBÉNISTERIE"] {
        let found = store.library.search(query, None, 20).await.unwrap();
        assert_eq!(found.len(), 1, "{query}");
        assert_eq!(found[0].name, "Ébénisterie");
    }
}

#[tokio::test]
async fn blank_library_query_lists_most_popular() {
    let store = store().await;
    assert!(store.library.seed_if_empty().await.unwrap());
    assert!(!store.library.seed_if_empty().await.unwrap());

    let top = store.library.search("  ", None, 3).await.unwrap();
    assert_eq!(top.len(), 3);
    assert_eq!(top[0].name, "Python");
    assert!(top.windows(2).all(|w| w[0].popularity_score >= w[1].popularity_score));
    assert!(top[0].category.as_ref().is_some_and(|c| c.name == "Technology"));

    let categories = store.library.categories().await.unwrap();
    let music = categories.iter().find(|c| c.name == "Music").unwrap();
    let in_music = store.library.by_category(music.id, 20).await.unwrap();
    assert_eq!(in_music.len(), 2);
    assert!(in_music.iter().all(|item| item.category_id == Some(music.id)));
}

#[tokio::test]
async fn user_skill_search_filters_by_type() {
    let store = store().await;
    let ada = member(&store, "ada").await;
    let bob = member(&store, "bob").await;
    skill(&store, &ada, "Python", SkillType::Teach).await;
    skill(&store, &bob, "python scripting", SkillType::Learn).await;
    skill(&store, &bob, "Photography", SkillType::Teach).await;

    let all = store.skills.search("PYTH", None).await.unwrap();
    assert_eq!(all.len(), 2);

    let teach = store.skills.search("pyth", Some(SkillType::Teach)).await.unwrap();
    assert_eq!(teach.len(), 1);
    assert_eq!(teach[0].skill.user_id, "ada");
    assert_eq!(teach[0].owner_display_name.as_deref(), Some("ada"));

    // a new skill shows up despite the cached search
    skill(&store, &bob, "Python", SkillType::Teach).await;
    let teach = store.skills.search("pyth", Some(SkillType::Teach)).await.unwrap();
    assert_eq!(teach.len(), 2);
}

#[tokio::test]
async fn user_skill_search_folds_non_ascii_case() {
    let store = store().await;
    let ada = member(&store, "ada").await;
    let added = skill(&store, &ada, "Ötztal Hiking", SkillType::Teach).await;

    let found = store.skills.search("ötz", None).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].skill.skill_name, "Ötztal Hiking");

    let patch = SkillPatch {
        skill_name: Some("Übersetzen".to_owned()),
        ..SkillPatch::default()
    };
    store.skills.update(&ada.id, added.id, &patch).await.unwrap();
    assert!(store.skills.search("ötz", None).await.unwrap().is_empty());
    let renamed = store.skills.search("ÜBER", None).await.unwrap();
    assert_eq!(renamed.len(), 1);
    assert_eq!(renamed[0].skill.skill_name, "Übersetzen");
}

#[tokio::test]
async fn match_follows_transition_table() {
    let store = store().await;
    let ada = member(&store, "ada").await;
    let bob = member(&store, "bob").await;
    let pending = pending_match(&store, &ada, &bob).await;
    assert_eq!(pending.status, MatchStatus::Pending);
    assert_eq!(pending.teacher_id, "ada");
    assert_eq!(pending.learner_id, "bob");

    let err = store
        .matches
        .update_status(&ada.id, pending.id, MatchStatus::Completed)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DbError::IllegalTransition { from: MatchStatus::Pending, to: MatchStatus::Completed }
    ));

    let accepted = store.matches.update_status(&bob.id, pending.id, MatchStatus::Accepted).await.unwrap();
    assert_eq!(accepted.status, MatchStatus::Accepted);
    assert!(accepted.updated_at >= pending.updated_at);

    let err = store
        .matches
        .update_status(&ada.id, pending.id, MatchStatus::Rejected)
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::IllegalTransition { from: MatchStatus::Accepted, .. }));

    let done = store.matches.update_status(&ada.id, pending.id, MatchStatus::Completed).await.unwrap();
    assert_eq!(done.status, MatchStatus::Completed);
}

#[tokio::test]
async fn stale_transition_loses_to_the_status_that_won() {
    let store = store().await;
    let ada = member(&store, "ada").await;
    let bob = member(&store, "bob").await;
    let pending = pending_match(&store, &ada, &bob).await;

    store.matches.update_status(&bob.id, pending.id, MatchStatus::Accepted).await.unwrap();

    // ada still believes the match is pending
    let err = store
        .matches
        .transition(pending.id, MatchStatus::Pending, MatchStatus::Rejected)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DbError::IllegalTransition { from: MatchStatus::Accepted, to: MatchStatus::Rejected }
    ));
    assert_eq!(store.matches.get(pending.id).await.unwrap().status, MatchStatus::Accepted);
}

#[tokio::test]
async fn racing_transitions_have_one_winner() {
    let store = store().await;
    let ada = member(&store, "ada").await;
    let bob = member(&store, "bob").await;
    let pending = pending_match(&store, &ada, &bob).await;

    let (accept, reject) = tokio::join!(
        store.matches.update_status(&bob.id, pending.id, MatchStatus::Accepted),
        store.matches.update_status(&ada.id, pending.id, MatchStatus::Rejected),
    );

    let latest = store.matches.get(pending.id).await.unwrap();
    match (accept, reject) {
        (Ok(won), Err(DbError::IllegalTransition { from, to })) => {
            assert_eq!(won.status, MatchStatus::Accepted);
            assert_eq!((from, to), (MatchStatus::Accepted, MatchStatus::Rejected));
        }
        (Err(DbError::IllegalTransition { from, to }), Ok(won)) => {
            assert_eq!(won.status, MatchStatus::Rejected);
            assert_eq!((from, to), (MatchStatus::Rejected, MatchStatus::Accepted));
        }
        other => panic!("expected exactly one winner, got {other:?}"),
    }
    assert_ne!(latest.status, MatchStatus::Pending);
}

#[tokio::test]
async fn outsiders_cannot_move_matches() {
    let store = store().await;
    let ada = member(&store, "ada").await;
    let bob = member(&store, "bob").await;
    let eve = member(&store, "eve").await;
    let pending = pending_match(&store, &ada, &bob).await;

    let err = store
        .matches
        .update_status(&eve.id, pending.id, MatchStatus::Accepted)
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Forbidden(_)));
    assert_eq!(store.matches.get(pending.id).await.unwrap().status, MatchStatus::Pending);
}

#[tokio::test]
async fn match_needs_teach_and_learn_from_two_people() {
    let store = store().await;
    let ada = member(&store, "ada").await;
    let teach = skill(&store, &ada, "Rust", SkillType::Teach).await;
    let learn = skill(&store, &ada, "Rust", SkillType::Learn).await;

    let same_person = store
        .matches
        .create(&NewMatch { teacher_skill_id: teach.id, learner_skill_id: learn.id })
        .await;
    assert!(matches!(same_person, Err(DbError::Forbidden(_))));

    let swapped = store
        .matches
        .create(&NewMatch { teacher_skill_id: learn.id, learner_skill_id: teach.id })
        .await;
    assert!(matches!(swapped, Err(DbError::Forbidden(_))));
}

#[tokio::test]
async fn matches_for_user_join_both_sides() {
    let store = store().await;
    let ada = member(&store, "ada").await;
    let bob = member(&store, "bob").await;
    let pending = pending_match(&store, &ada, &bob).await;

    for side in [&ada, &bob] {
        let matches = store.matches.for_user(&side.id).await.unwrap();
        assert_eq!(matches.len(), 1);
        let details = &matches[0];
        assert_eq!(details.record.id, pending.id);
        assert_eq!(details.teacher_profile.display_name.as_deref(), Some("ada"));
        assert_eq!(details.learner_profile.display_name.as_deref(), Some("bob"));
        assert_eq!(details.teacher_skill.as_ref().map(|s| s.skill_name.as_str()), Some("Python"));
    }
}

#[tokio::test]
async fn sent_message_is_last_in_history() {
    let store = store().await;
    let ada = member(&store, "ada").await;
    let bob = member(&store, "bob").await;
    let pairing = accepted_match(&store, &ada, &bob).await;

    store.messages.send(&bob.id, pairing.id, &text("hello")).await.unwrap();
    store.messages.send(&ada.id, pairing.id, &text("  hi  ")).await.unwrap();

    let history = store.messages.for_match(pairing.id).await.unwrap();
    assert_eq!(history.len(), 2);
    let last = history.last().unwrap();
    assert_eq!(last.content, "hi");
    assert_eq!(last.sender_id, ada.id);
    assert!(last.read_at.is_none());
}

#[tokio::test]
async fn sending_needs_an_accepted_match() {
    let store = store().await;
    let ada = member(&store, "ada").await;
    let bob = member(&store, "bob").await;
    let eve = member(&store, "eve").await;
    let pending = pending_match(&store, &ada, &bob).await;

    let err = store.messages.send(&ada.id, pending.id, &text("hi")).await.unwrap_err();
    assert!(matches!(err, DbError::Forbidden(_)));

    store.matches.update_status(&bob.id, pending.id, MatchStatus::Accepted).await.unwrap();
    let err = store.messages.send(&eve.id, pending.id, &text("hi")).await.unwrap_err();
    assert!(matches!(err, DbError::Forbidden(_)));

    let err = store.messages.send(&ada.id, pending.id, &text("   ")).await.unwrap_err();
    assert!(matches!(err, DbError::Invalid(_)));
}

#[tokio::test]
async fn only_the_recipient_marks_read() {
    let store = store().await;
    let ada = member(&store, "ada").await;
    let bob = member(&store, "bob").await;
    let pairing = accepted_match(&store, &ada, &bob).await;
    let from_bob = store.messages.send(&bob.id, pairing.id, &text("ping")).await.unwrap();

    assert!(!store.messages.mark_as_read(&bob.id, from_bob.id).await.unwrap());
    assert!(store.messages.get(from_bob.id).await.unwrap().read_at.is_none());

    assert!(store.messages.mark_as_read(&ada.id, from_bob.id).await.unwrap());
    let read_at = store.messages.get(from_bob.id).await.unwrap().read_at;
    assert!(read_at.is_some());

    // a second read keeps the first timestamp
    assert!(!store.messages.mark_as_read(&ada.id, from_bob.id).await.unwrap());
    assert_eq!(store.messages.get(from_bob.id).await.unwrap().read_at, read_at);
}

#[tokio::test]
async fn conversations_summarise_accepted_matches() {
    let store = store().await;
    let ada = member(&store, "ada").await;
    let bob = member(&store, "bob").await;
    let cy = member(&store, "cy").await;
    let with_bob = accepted_match(&store, &ada, &bob).await;
    let _quiet = accepted_match(&store, &ada, &cy).await;
    pending_match(&store, &bob, &cy).await;

    store.messages.send(&bob.id, with_bob.id, &text("one")).await.unwrap();
    let two = store.messages.send(&bob.id, with_bob.id, &text("two")).await.unwrap();
    store.messages.send(&ada.id, with_bob.id, &text("three")).await.unwrap();
    store.messages.mark_as_read(&ada.id, two.id).await.unwrap();

    let conversations = store.messages.conversations(&ada.id).await.unwrap();
    assert_eq!(conversations.len(), 2);

    let first = &conversations[0];
    assert_eq!(first.match_id, with_bob.id);
    assert_eq!(first.other_user.id, "bob");
    assert_eq!(first.last_message.as_ref().map(|m| m.content.as_str()), Some("three"));
    assert_eq!(first.unread_count, 1);

    let quiet = &conversations[1];
    assert_eq!(quiet.other_user.display_name.as_deref(), Some("cy"));
    assert!(quiet.last_message.is_none());
    assert_eq!(quiet.unread_count, 0);

    // bob has not read ada's message
    let bobs = store.messages.conversations(&bob.id).await.unwrap();
    assert_eq!(bobs.len(), 1);
    assert_eq!(bobs[0].other_user.id, "ada");
    assert_eq!(bobs[0].unread_count, 1);
}

#[tokio::test]
async fn sessions_take_sides_from_the_match() {
    let store = store().await;
    let ada = member(&store, "ada").await;
    let bob = member(&store, "bob").await;
    let eve = member(&store, "eve").await;
    let pairing = accepted_match(&store, &ada, &bob).await;

    let new = NewSession {
        match_id: pairing.id,
        title: " Intro to Python ".to_owned(),
        description: None,
        scheduled_at: Utc::now() + Duration::days(1),
        duration_minutes: None,
        meeting_link: None,
        notes: None,
    };
    let session = store.sessions.create(&bob.id, &new).await.unwrap();
    assert_eq!(session.title, "Intro to Python");
    assert_eq!(session.teacher_id, "ada");
    assert_eq!(session.learner_id, "bob");
    assert_eq!(session.duration_minutes, 60);
    assert_eq!(session.status, SessionStatus::Scheduled);

    assert!(matches!(store.sessions.create(&eve.id, &new).await, Err(DbError::Forbidden(_))));
    let bad = NewSession { duration_minutes: Some(0), ..new.clone() };
    assert!(matches!(store.sessions.create(&ada.id, &bad).await, Err(DbError::Invalid(_))));

    let patch = SessionPatch {
        status: Some(SessionStatus::Completed),
        ..Default::default()
    };
    let updated = store.sessions.update(&ada.id, session.id, &patch).await.unwrap();
    assert_eq!(updated.status, SessionStatus::Completed);
    assert_eq!(updated.title, session.title);
    assert!(updated.updated_at >= session.updated_at);

    assert!(matches!(
        store.sessions.update(&eve.id, session.id, &patch).await,
        Err(DbError::Forbidden(_))
    ));
}
