#![allow(dead_code)]

use skillswap::{
    auth::CurrentUser,
    cache::Caches,
    db::Database,
    models::{Match, MatchStatus, NewMatch, NewProfile, NewSkill, Skill, SkillLevel, SkillType},
    realtime::MessageHub,
    store::Store,
};

/// Store over a fresh, migrated in-memory database.
pub async fn store() -> Store {
    let db = Database::in_memory().await.expect("in-memory database");
    db.migrate().await.expect("migrations");
    Store::new(db.pool().clone(), Caches::default(), MessageHub::default())
}

pub fn user(id: &str) -> CurrentUser {
    CurrentUser {
        id: id.to_owned(),
        email: Some(format!("{id}@example.com")),
    }
}

/// Signed-up user with a provisioned profile.
pub async fn member(store: &Store, id: &str) -> CurrentUser {
    let user = user(id);
    store
        .profiles
        .create(&NewProfile::for_first_login(&user.id, user.email.as_deref()))
        .await
        .expect("create profile");
    user
}

pub async fn skill(store: &Store, user: &CurrentUser, name: &str, skill_type: SkillType) -> Skill {
    store
        .skills
        .add(
            &user.id,
            &NewSkill {
                skill_name: name.to_owned(),
                skill_type,
                skill_level: SkillLevel::Intermediate,
                description: None,
            },
        )
        .await
        .expect("add skill")
}

/// `teacher` teaches Python to `learner`; the match is left pending.
pub async fn pending_match(store: &Store, teacher: &CurrentUser, learner: &CurrentUser) -> Match {
    let teach = skill(store, teacher, "Python", SkillType::Teach).await;
    let learn = skill(store, learner, "Python", SkillType::Learn).await;
    store
        .matches
        .create(&NewMatch {
            teacher_skill_id: teach.id,
            learner_skill_id: learn.id,
        })
        .await
        .expect("create match")
}

pub async fn accepted_match(store: &Store, teacher: &CurrentUser, learner: &CurrentUser) -> Match {
    let pending = pending_match(store, teacher, learner).await;
    store
        .matches
        .update_status(&learner.id, pending.id, MatchStatus::Accepted)
        .await
        .expect("accept match")
}
