use serde::{Deserialize, Serialize};
use surrealdb::{RecordId, sql::Datetime};

use crate::auth::Role;
use crate::types::{CourseSlug, DepartmentSlug};

/// Persisted representation of an account in SurrealDB.
///
/// The stored password hash deserializes from the database but is never
/// serialized back out, so a record can be returned from an API handler
/// without leaking credential material.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    /// Stable database identifier for this user (table: `user`).
    pub id: RecordId,
    pub first_name: String,
    pub last_name: String,
    /// Login identifier; unique, stored normalized (lowercase).
    pub email: String,
    /// PHC-format argon2 hash. Absent for accounts that cannot log in yet.
    #[serde(default, skip_serializing)]
    pub password_hash: Option<String>,
    pub role: Role,
    /// Slug of the department this user belongs to, if any.
    pub department: Option<DepartmentSlug>,
    /// Avatar as a public URL or data URI.
    pub avatar_url: Option<String>,
    /// Public profile text shown on the collaborator board.
    pub bio: Option<String>,
    /// Gamification points, awarded on course completion.
    #[serde(default)]
    pub points: i64,
    /// Per-user course progress entries.
    #[serde(default)]
    pub course_progress: Vec<CourseProgress>,
    /// Disabled accounts cannot log in or refresh.
    #[serde(default = "default_true")]
    pub active: bool,
    pub created_at: Option<Datetime>,
    pub updated_at: Option<Datetime>,
}

fn default_true() -> bool {
    true
}

/// One entry of a user's course progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseProgress {
    /// Slug of the course this entry tracks.
    pub course: CourseSlug,
    /// Course display name at the time the entry was created.
    pub name: Option<String>,
    pub completed: bool,
    pub completed_at: Option<Datetime>,
}

/// Payload used when inserting a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreate {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Already-hashed password; handlers hash before building this payload
    /// so plaintext never reaches the database layer.
    pub password_hash: Option<String>,
    pub role: Role,
    pub department: Option<DepartmentSlug>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
}

/// Partial update for a user; unset fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<DepartmentSlug>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

/// Persisted representation of a department.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepartmentRecord {
    pub id: RecordId,
    pub name: String,
    /// Unique, stable identifier referenced by users and courses.
    pub slug: DepartmentSlug,
    /// Parent slug for hierarchy display; not enforced referentially.
    pub parent_slug: Option<DepartmentSlug>,
    #[serde(default)]
    pub sort_order: i64,
    #[serde(default = "default_true")]
    pub active: bool,
    pub created_at: Option<Datetime>,
    pub updated_at: Option<Datetime>,
}

/// Payload used when inserting a new department.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepartmentCreate {
    pub name: String,
    pub slug: DepartmentSlug,
    pub parent_slug: Option<DepartmentSlug>,
    #[serde(default)]
    pub sort_order: i64,
}

/// Partial update for a department; unset fields are left untouched. The
/// slug is immutable once assigned, it is what other records reference.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DepartmentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_slug: Option<DepartmentSlug>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

/// Kinds of announcements on the intranet board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnouncementKind {
    General,
    Highlight,
    Mural,
    Congrats,
    Farewell,
    NewHire,
}

/// Persisted representation of an announcement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnouncementRecord {
    pub id: RecordId,
    pub title: String,
    /// Rich HTML body produced by the editor.
    pub body_html: Option<String>,
    pub kind: AnnouncementKind,
    /// When set, the announcement is scoped to one department's board.
    pub department: Option<DepartmentSlug>,
    #[serde(default)]
    pub pinned: bool,
    /// The user who posted it, when known.
    pub author_id: Option<RecordId>,
    pub created_at: Option<Datetime>,
    pub updated_at: Option<Datetime>,
}

/// Payload used when inserting a new announcement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnouncementCreate {
    pub title: String,
    pub body_html: Option<String>,
    pub kind: AnnouncementKind,
    pub department: Option<DepartmentSlug>,
    #[serde(default)]
    pub pinned: bool,
    pub author_id: Option<RecordId>,
}

/// Partial update for an announcement; covers edits and pin toggling.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnnouncementUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<AnnouncementKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pinned: Option<bool>,
}

/// Persisted representation of a course in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseRecord {
    pub id: RecordId,
    pub name: String,
    /// Unique, stable identifier referenced by progress entries.
    pub slug: CourseSlug,
    /// Department that owns this course.
    pub department: DepartmentSlug,
    /// Workload in hours.
    pub hours: Option<f64>,
    /// Points awarded on completion.
    #[serde(default)]
    pub points: i64,
    /// Where the course is hosted.
    pub url: Option<String>,
    #[serde(default = "default_true")]
    pub active: bool,
    pub created_at: Option<Datetime>,
    pub updated_at: Option<Datetime>,
}

/// Payload used when inserting a new course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseCreate {
    pub name: String,
    pub slug: CourseSlug,
    pub department: DepartmentSlug,
    pub hours: Option<f64>,
    #[serde(default = "default_course_points")]
    pub points: i64,
    pub url: Option<String>,
}

fn default_course_points() -> i64 {
    10
}

/// Partial update for a course; the slug stays fixed so progress entries
/// keep resolving.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CourseUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<DepartmentSlug>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

/// Directory projection of a user for the collaborator board.
///
/// Deliberately narrow: no credential material, no progress details, no
/// inactive accounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollaboratorRow {
    pub id: RecordId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub department: Option<DepartmentSlug>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    #[serde(default)]
    pub points: i64,
}
