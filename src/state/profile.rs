use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::CurrentUser,
    error::DbError,
    models::{NewProfile, NewSkill, Profile, ProfilePatch, Skill, SkillLevel, SkillType},
    store::Store,
    validation,
};

use super::LoadStatus;

/// One skill entered on the profile setup form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetupSkill {
    pub name: String,
    #[serde(rename = "type")]
    pub skill_type: SkillType,
    pub level: SkillLevel,
}

pub struct ProfileState {
    store: Store,
    user: CurrentUser,
    pub profile: Option<Profile>,
    pub skills: Vec<Skill>,
    pub status: LoadStatus,
}

impl ProfileState {
    pub fn new(store: Store, user: CurrentUser) -> Self {
        Self {
            store,
            user,
            profile: None,
            skills: Vec::new(),
            status: LoadStatus::default(),
        }
    }

    /// Creates and loads in one go.
    pub async fn load(store: Store, user: CurrentUser) -> Result<Self, DbError> {
        let mut state = Self::new(store, user);
        state.refetch().await?;
        Ok(state)
    }

    /// Loads profile and skills together. A user without a profile gets a
    /// minimal one named after their email.
    pub async fn refetch(&mut self) -> Result<(), DbError> {
        self.status.begin();
        let result = tokio::try_join!(
            ensure_profile(&self.store, &self.user),
            self.store.skills.for_user(&self.user.id),
        );
        self.status.finish(&result, "profile");

        let (profile, skills) = result?;
        self.profile = Some(profile);
        self.skills = skills;
        Ok(())
    }

    pub fn teach_skills(&self) -> impl Iterator<Item = &Skill> {
        self.skills.iter().filter(|s| s.skill_type == SkillType::Teach)
    }

    pub fn learn_skills(&self) -> impl Iterator<Item = &Skill> {
        self.skills.iter().filter(|s| s.skill_type == SkillType::Learn)
    }

    pub async fn update_profile(&mut self, patch: &ProfilePatch) -> Result<&Profile, DbError> {
        if let Some(name) = &patch.display_name {
            validation::display_name(name)?;
        }
        validation::bio(patch.bio.as_deref())?;

        let updated = self
            .store
            .profiles
            .update(&self.user.id, patch)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, user_id = %self.user.id, "profile update failed"))?;
        Ok(self.profile.insert(updated))
    }

    pub async fn add_skill(&mut self, skill: &NewSkill) -> Result<&Skill, DbError> {
        let added = self
            .store
            .skills
            .add(&self.user.id, skill)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, user_id = %self.user.id, "adding skill failed"))?;
        self.skills.insert(0, added);
        Ok(&self.skills[0])
    }

    pub async fn remove_skill(&mut self, skill_id: Uuid) -> Result<(), DbError> {
        self.store
            .skills
            .remove(&self.user.id, skill_id)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, %skill_id, "removing skill failed"))?;
        self.skills.retain(|s| s.id != skill_id);
        Ok(())
    }

    /// Profile setup form: names the profile, marks it complete and adds
    /// the listed skills.
    pub async fn complete_setup(
        &mut self,
        display_name: &str,
        bio: Option<&str>,
        skills: &[SetupSkill],
    ) -> Result<(), DbError> {
        let display_name = validation::display_name(display_name)?;
        validation::bio(bio)?;
        for skill in skills {
            validation::skill_name(&skill.name)?;
        }

        let patch = ProfilePatch {
            display_name: Some(display_name),
            bio: bio.map(str::trim).filter(|b| !b.is_empty()).map(str::to_owned),
            profile_completed: Some(true),
            ..Default::default()
        };
        self.update_profile(&patch).await?;

        for skill in skills {
            self.add_skill(&NewSkill {
                skill_name: skill.name.clone(),
                skill_type: skill.skill_type,
                skill_level: skill.level,
                description: None,
            })
            .await?;
        }
        Ok(())
    }
}

async fn ensure_profile(store: &Store, user: &CurrentUser) -> Result<Profile, DbError> {
    match store.profiles.get(&user.id).await {
        Err(e) if e.is_not_found() => {
            let new = NewProfile::for_first_login(&user.id, user.email.as_deref());
            store.profiles.create(&new).await
        }
        result => result,
    }
}
