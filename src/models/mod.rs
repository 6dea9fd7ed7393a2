mod library;
mod matches;
mod message;
mod profile;
mod schedule;
mod skill;

pub use library::{SkillCategory, SkillLibraryItem};
pub use matches::{Match, MatchDetails, MatchStatus, NewMatch, ProfileSummary, SkillSummary};
pub use message::{Conversation, ConversationPeer, Message, MessageType, NewMessage};
pub use profile::{NewProfile, Profile, ProfilePatch, DEFAULT_CREDITS, DEFAULT_LANGUAGES};
pub use schedule::{LearningSession, NewSession, SessionPatch, SessionStatus, DEFAULT_SESSION_MINUTES};
pub use skill::{NewSkill, Skill, SkillLevel, SkillPatch, SkillType, SkillWithOwner};
