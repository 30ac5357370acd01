// Database query helpers for SurrealDB.
//
// All access to the document store funnels through `QueryBuilder` so the
// HTTP handlers stay free of query strings. Updates go through MERGE with
// serde-built payloads; partial-update structs skip unset fields, so an
// omitted field never clobbers stored data.

use crate::auth::{Credential, CredentialStore};
use crate::db::connection::Db;
use crate::db::schema::*;
use anyhow::{Result, anyhow};
use surrealdb::RecordId;
use surrealdb::sql::Datetime;

pub struct QueryBuilder;

impl QueryBuilder {
    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    /// Insert a new user. Fails when the (unique) email is already taken.
    pub async fn create_user(db: &Db, data: &UserCreate) -> Result<UserRecord> {
        let mut res = db
            .query(
                r#"
                CREATE user SET
                    first_name = $first_name,
                    last_name = $last_name,
                    email = string::lowercase($email),
                    password_hash = $password_hash,
                    role = $role,
                    department = $department,
                    avatar_url = $avatar_url,
                    bio = $bio,
                    points = 0,
                    course_progress = [],
                    active = true,
                    created_at = time::now(),
                    updated_at = time::now()
                "#,
            )
            .bind(("first_name", data.first_name.clone()))
            .bind(("last_name", data.last_name.clone()))
            .bind(("email", data.email.clone()))
            .bind(("password_hash", data.password_hash.clone()))
            .bind(("role", data.role))
            .bind(("department", data.department.clone()))
            .bind(("avatar_url", data.avatar_url.clone()))
            .bind(("bio", data.bio.clone()))
            .await?;

        let created: Option<UserRecord> = res.take(0)?;
        created.ok_or_else(|| anyhow!("failed to create user record"))
    }

    pub async fn find_user_by_email(db: &Db, email: &str) -> Result<Option<UserRecord>> {
        let email = email.to_string();

        let mut res = db
            .query(
                r#"
                SELECT * FROM user
                WHERE email = string::lowercase($email)
                LIMIT 1
                "#,
            )
            .bind(("email", email))
            .await?;

        let users: Vec<UserRecord> = res.take(0)?;
        Ok(users.into_iter().next())
    }

    pub async fn find_user_by_id(db: &Db, user_id: &RecordId) -> Result<Option<UserRecord>> {
        let mut res = db
            .query("SELECT * FROM user WHERE id = $id LIMIT 1")
            .bind(("id", user_id.clone()))
            .await?;

        let users: Vec<UserRecord> = res.take(0)?;
        Ok(users.into_iter().next())
    }

    /// Resolve a token subject (record id string) to a user.
    ///
    /// An unparseable subject resolves to `None`; a token carrying a bogus
    /// id behaves like one for a deleted account.
    pub async fn find_user_by_subject(db: &Db, subject: &str) -> Result<Option<UserRecord>> {
        match subject.parse::<RecordId>() {
            Ok(id) => Self::find_user_by_id(db, &id).await,
            Err(_) => Ok(None),
        }
    }

    pub async fn list_users(db: &Db) -> Result<Vec<UserRecord>> {
        let mut res = db
            .query("SELECT * FROM user ORDER BY first_name ASC")
            .await?;
        let users: Vec<UserRecord> = res.take(0)?;
        Ok(users)
    }

    /// Apply a partial update and return the updated record, or `None` when
    /// the user does not exist.
    pub async fn update_user(
        db: &Db,
        user_id: &RecordId,
        update: &UserUpdate,
    ) -> Result<Option<UserRecord>> {
        let data = serde_json::to_value(update)?;

        let mut res = db
            .query("UPDATE $id MERGE $data")
            .bind(("id", user_id.clone()))
            .bind(("data", data))
            .await?;

        let updated: Option<UserRecord> = res.take(0)?;
        Ok(updated)
    }

    /// Delete a user; returns whether a record was removed.
    pub async fn delete_user(db: &Db, user_id: &RecordId) -> Result<bool> {
        let mut res = db
            .query("DELETE $id RETURN BEFORE")
            .bind(("id", user_id.clone()))
            .await?;

        let deleted: Option<UserRecord> = res.take(0)?;
        Ok(deleted.is_some())
    }

    /// Directory listing for the collaborator board: active users only,
    /// optionally filtered by department slug and a case-insensitive
    /// name/email search, projected without sensitive fields.
    pub async fn list_collaborators(
        db: &Db,
        department: Option<&str>,
        search: Option<&str>,
        limit: usize,
    ) -> Result<Vec<CollaboratorRow>> {
        let mut conditions = vec!["active = true"];
        if department.is_some() {
            conditions.push("department = $department");
        }
        if search.is_some() {
            conditions.push(
                "(string::lowercase(first_name) CONTAINS $search \
                 OR string::lowercase(last_name) CONTAINS $search \
                 OR string::lowercase(email) CONTAINS $search)",
            );
        }

        let query = format!(
            "SELECT id, first_name, last_name, email, department, avatar_url, bio, points \
             FROM user WHERE {} ORDER BY first_name ASC LIMIT $limit",
            conditions.join(" AND ")
        );

        let mut q = db.query(query).bind(("limit", limit as i64));
        if let Some(dept) = department {
            q = q.bind(("department", dept.trim().to_lowercase()));
        }
        if let Some(s) = search {
            q = q.bind(("search", s.trim().to_lowercase()));
        }

        let mut res = q.await?;
        let rows: Vec<CollaboratorRow> = res.take(0)?;
        Ok(rows)
    }

    /// Toggle a user's completion state for a course.
    ///
    /// Completing awards the course's points; un-completing takes them back.
    /// Returns the updated user, or `None` when the user does not exist.
    pub async fn toggle_course_progress(
        db: &Db,
        user_id: &RecordId,
        course: &CourseRecord,
    ) -> Result<Option<UserRecord>> {
        let Some(user) = Self::find_user_by_id(db, user_id).await? else {
            return Ok(None);
        };

        let mut progress = user.course_progress.clone();
        let mut points = user.points;

        match progress.iter_mut().find(|p| p.course == course.slug) {
            Some(entry) if entry.completed => {
                entry.completed = false;
                entry.completed_at = None;
                points -= course.points;
            }
            Some(entry) => {
                entry.completed = true;
                entry.completed_at = Some(Datetime::from(chrono::Utc::now()));
                points += course.points;
            }
            None => {
                progress.push(CourseProgress {
                    course: course.slug.clone(),
                    name: Some(course.name.clone()),
                    completed: true,
                    completed_at: Some(Datetime::from(chrono::Utc::now())),
                });
                points += course.points;
            }
        }

        let mut res = db
            .query(
                r#"
                UPDATE $id SET
                    course_progress = $progress,
                    points = $points
                "#,
            )
            .bind(("id", user_id.clone()))
            .bind(("progress", progress))
            .bind(("points", points.max(0)))
            .await?;

        let updated: Option<UserRecord> = res.take(0)?;
        Ok(updated)
    }

    // ------------------------------------------------------------------
    // Departments
    // ------------------------------------------------------------------

    pub async fn create_department(db: &Db, data: &DepartmentCreate) -> Result<DepartmentRecord> {
        let mut res = db
            .query(
                r#"
                CREATE department SET
                    name = $name,
                    slug = string::lowercase($slug),
                    parent_slug = $parent_slug,
                    sort_order = $sort_order,
                    active = true,
                    created_at = time::now(),
                    updated_at = time::now()
                "#,
            )
            .bind(("name", data.name.clone()))
            .bind(("slug", data.slug.clone()))
            .bind(("parent_slug", data.parent_slug.clone()))
            .bind(("sort_order", data.sort_order))
            .await?;

        let created: Option<DepartmentRecord> = res.take(0)?;
        created.ok_or_else(|| anyhow!("failed to create department record"))
    }

    pub async fn find_department_by_slug(
        db: &Db,
        slug: &str,
    ) -> Result<Option<DepartmentRecord>> {
        let slug = slug.trim().to_lowercase();

        let mut res = db
            .query("SELECT * FROM department WHERE slug = $slug LIMIT 1")
            .bind(("slug", slug))
            .await?;

        let departments: Vec<DepartmentRecord> = res.take(0)?;
        Ok(departments.into_iter().next())
    }

    pub async fn list_departments(db: &Db) -> Result<Vec<DepartmentRecord>> {
        let mut res = db
            .query("SELECT * FROM department ORDER BY sort_order ASC, name ASC")
            .await?;
        let departments: Vec<DepartmentRecord> = res.take(0)?;
        Ok(departments)
    }

    pub async fn update_department(
        db: &Db,
        department_id: &RecordId,
        update: &DepartmentUpdate,
    ) -> Result<Option<DepartmentRecord>> {
        let data = serde_json::to_value(update)?;

        let mut res = db
            .query("UPDATE $id MERGE $data")
            .bind(("id", department_id.clone()))
            .bind(("data", data))
            .await?;

        let updated: Option<DepartmentRecord> = res.take(0)?;
        Ok(updated)
    }

    pub async fn delete_department(db: &Db, department_id: &RecordId) -> Result<bool> {
        let mut res = db
            .query("DELETE $id RETURN BEFORE")
            .bind(("id", department_id.clone()))
            .await?;

        let deleted: Option<DepartmentRecord> = res.take(0)?;
        Ok(deleted.is_some())
    }

    // ------------------------------------------------------------------
    // Announcements
    // ------------------------------------------------------------------

    pub async fn create_announcement(
        db: &Db,
        data: &AnnouncementCreate,
    ) -> Result<AnnouncementRecord> {
        let mut res = db
            .query(
                r#"
                CREATE announcement SET
                    title = $title,
                    body_html = $body_html,
                    kind = $kind,
                    department = $department,
                    pinned = $pinned,
                    author_id = $author_id,
                    created_at = time::now(),
                    updated_at = time::now()
                "#,
            )
            .bind(("title", data.title.clone()))
            .bind(("body_html", data.body_html.clone()))
            .bind(("kind", data.kind))
            .bind(("department", data.department.clone()))
            .bind(("pinned", data.pinned))
            .bind(("author_id", data.author_id.clone()))
            .await?;

        let created: Option<AnnouncementRecord> = res.take(0)?;
        created.ok_or_else(|| anyhow!("failed to create announcement record"))
    }

    /// List announcements, newest first, pinned on top. When a department is
    /// given, returns that department's posts plus the global ones.
    pub async fn list_announcements(
        db: &Db,
        department: Option<&str>,
    ) -> Result<Vec<AnnouncementRecord>> {
        let (query, department) = match department {
            Some(dept) => (
                "SELECT * FROM announcement \
                 WHERE department = $department OR department = NONE \
                 ORDER BY pinned DESC, created_at DESC",
                Some(dept.trim().to_lowercase()),
            ),
            None => (
                "SELECT * FROM announcement ORDER BY pinned DESC, created_at DESC",
                None,
            ),
        };

        let mut q = db.query(query);
        if let Some(dept) = department {
            q = q.bind(("department", dept));
        }

        let mut res = q.await?;
        let announcements: Vec<AnnouncementRecord> = res.take(0)?;
        Ok(announcements)
    }

    pub async fn find_announcement_by_id(
        db: &Db,
        announcement_id: &RecordId,
    ) -> Result<Option<AnnouncementRecord>> {
        let mut res = db
            .query("SELECT * FROM announcement WHERE id = $id LIMIT 1")
            .bind(("id", announcement_id.clone()))
            .await?;

        let announcements: Vec<AnnouncementRecord> = res.take(0)?;
        Ok(announcements.into_iter().next())
    }

    pub async fn update_announcement(
        db: &Db,
        announcement_id: &RecordId,
        update: &AnnouncementUpdate,
    ) -> Result<Option<AnnouncementRecord>> {
        let data = serde_json::to_value(update)?;

        let mut res = db
            .query("UPDATE $id MERGE $data")
            .bind(("id", announcement_id.clone()))
            .bind(("data", data))
            .await?;

        let updated: Option<AnnouncementRecord> = res.take(0)?;
        Ok(updated)
    }

    pub async fn delete_announcement(db: &Db, announcement_id: &RecordId) -> Result<bool> {
        let mut res = db
            .query("DELETE $id RETURN BEFORE")
            .bind(("id", announcement_id.clone()))
            .await?;

        let deleted: Option<AnnouncementRecord> = res.take(0)?;
        Ok(deleted.is_some())
    }

    // ------------------------------------------------------------------
    // Courses
    // ------------------------------------------------------------------

    pub async fn create_course(db: &Db, data: &CourseCreate) -> Result<CourseRecord> {
        let mut res = db
            .query(
                r#"
                CREATE course SET
                    name = $name,
                    slug = string::lowercase($slug),
                    department = string::lowercase($department),
                    hours = $hours,
                    points = $points,
                    url = $url,
                    active = true,
                    created_at = time::now(),
                    updated_at = time::now()
                "#,
            )
            .bind(("name", data.name.clone()))
            .bind(("slug", data.slug.clone()))
            .bind(("department", data.department.clone()))
            .bind(("hours", data.hours))
            .bind(("points", data.points))
            .bind(("url", data.url.clone()))
            .await?;

        let created: Option<CourseRecord> = res.take(0)?;
        created.ok_or_else(|| anyhow!("failed to create course record"))
    }

    pub async fn find_course_by_slug(db: &Db, slug: &str) -> Result<Option<CourseRecord>> {
        let slug = slug.trim().to_lowercase();

        let mut res = db
            .query("SELECT * FROM course WHERE slug = $slug LIMIT 1")
            .bind(("slug", slug))
            .await?;

        let courses: Vec<CourseRecord> = res.take(0)?;
        Ok(courses.into_iter().next())
    }

    /// List courses, optionally restricted to one department's catalog.
    pub async fn list_courses(db: &Db, department: Option<&str>) -> Result<Vec<CourseRecord>> {
        let (query, department) = match department {
            Some(dept) => (
                "SELECT * FROM course WHERE department = $department ORDER BY name ASC",
                Some(dept.trim().to_lowercase()),
            ),
            None => ("SELECT * FROM course ORDER BY name ASC", None),
        };

        let mut q = db.query(query);
        if let Some(dept) = department {
            q = q.bind(("department", dept));
        }

        let mut res = q.await?;
        let courses: Vec<CourseRecord> = res.take(0)?;
        Ok(courses)
    }

    pub async fn update_course(
        db: &Db,
        course_id: &RecordId,
        update: &CourseUpdate,
    ) -> Result<Option<CourseRecord>> {
        let data = serde_json::to_value(update)?;

        let mut res = db
            .query("UPDATE $id MERGE $data")
            .bind(("id", course_id.clone()))
            .bind(("data", data))
            .await?;

        let updated: Option<CourseRecord> = res.take(0)?;
        Ok(updated)
    }

    pub async fn delete_course(db: &Db, course_id: &RecordId) -> Result<bool> {
        let mut res = db
            .query("DELETE $id RETURN BEFORE")
            .bind(("id", course_id.clone()))
            .await?;

        let deleted: Option<CourseRecord> = res.take(0)?;
        Ok(deleted.is_some())
    }
}

/// Database-backed credential store for the auth core.
///
/// This is the narrow read adapter the session authenticator consumes; it
/// never writes.
pub struct UserStore {
    db: Db,
}

impl UserStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

fn credential_from_user(user: UserRecord) -> Credential {
    Credential {
        id: user.id.to_string(),
        identifier: user.email,
        password_hash: user.password_hash,
        role: user.role,
        department: user.department,
        active: user.active,
    }
}

impl CredentialStore for UserStore {
    async fn find_credential(&self, identifier: &str) -> Result<Option<Credential>> {
        let user = QueryBuilder::find_user_by_email(&self.db, identifier).await?;
        Ok(user.map(credential_from_user))
    }

    async fn find_credential_by_id(&self, id: &str) -> Result<Option<Credential>> {
        let user = QueryBuilder::find_user_by_subject(&self.db, id).await?;
        Ok(user.map(credential_from_user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::db::{DatabaseConfig, create_connection, ensure_schema};
    use crate::types::{CourseSlug, DepartmentSlug};

    async fn setup_test_db() -> Db {
        let config = DatabaseConfig {
            url: "memory".to_string(),
            ..Default::default()
        };
        let db = create_connection(config).await.unwrap();
        ensure_schema(&db).await.unwrap();
        db
    }

    fn user_create(email: &str, department: Option<&str>) -> UserCreate {
        UserCreate {
            first_name: "Alice".to_string(),
            last_name: "Souza".to_string(),
            email: email.to_string(),
            password_hash: Some("$argon2id$fake".to_string()),
            role: Role::Employee,
            department: department.map(DepartmentSlug::new),
            avatar_url: None,
            bio: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_find_user_by_email() {
        let db = setup_test_db().await;

        let created =
            QueryBuilder::create_user(&db, &user_create("Alice@Example.com", Some("fiscal")))
                .await
                .unwrap();
        assert_eq!(created.email, "alice@example.com");
        assert!(created.active);
        assert_eq!(created.points, 0);

        // Lookup is case-insensitive because both sides normalize.
        let found = QueryBuilder::find_user_by_email(&db, "ALICE@example.COM")
            .await
            .unwrap();
        assert_eq!(found.unwrap().id, created.id);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let db = setup_test_db().await;

        QueryBuilder::create_user(&db, &user_create("alice@example.com", None))
            .await
            .unwrap();
        let dup = QueryBuilder::create_user(&db, &user_create("alice@example.com", None)).await;
        assert!(dup.is_err());
    }

    #[tokio::test]
    async fn test_find_user_by_subject_handles_garbage() {
        let db = setup_test_db().await;
        let found = QueryBuilder::find_user_by_subject(&db, "not a record id")
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_update_user_merges_partial_fields() {
        let db = setup_test_db().await;
        let created = QueryBuilder::create_user(&db, &user_create("a@example.com", None))
            .await
            .unwrap();

        let updated = QueryBuilder::update_user(
            &db,
            &created.id,
            &UserUpdate {
                bio: Some("Tax analyst".to_string()),
                role: Some(Role::Manager),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(updated.bio.as_deref(), Some("Tax analyst"));
        assert_eq!(updated.role, Role::Manager);
        // Untouched fields survive the merge.
        assert_eq!(updated.first_name, "Alice");
        assert_eq!(updated.email, "a@example.com");
    }

    #[tokio::test]
    async fn test_delete_user() {
        let db = setup_test_db().await;
        let created = QueryBuilder::create_user(&db, &user_create("a@example.com", None))
            .await
            .unwrap();

        assert!(QueryBuilder::delete_user(&db, &created.id).await.unwrap());
        assert!(!QueryBuilder::delete_user(&db, &created.id).await.unwrap());
        assert!(
            QueryBuilder::find_user_by_id(&db, &created.id)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_collaborator_listing_filters_and_projects() {
        let db = setup_test_db().await;

        QueryBuilder::create_user(&db, &user_create("alice@example.com", Some("fiscal")))
            .await
            .unwrap();

        let mut bob = user_create("bob@example.com", Some("rh"));
        bob.first_name = "Bob".to_string();
        QueryBuilder::create_user(&db, &bob).await.unwrap();

        let mut hidden = user_create("carol@example.com", Some("fiscal"));
        hidden.first_name = "Carol".to_string();
        let carol = QueryBuilder::create_user(&db, &hidden).await.unwrap();
        QueryBuilder::update_user(
            &db,
            &carol.id,
            &UserUpdate {
                active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        // Department filter: only active fiscal members.
        let fiscal = QueryBuilder::list_collaborators(&db, Some("fiscal"), None, 50)
            .await
            .unwrap();
        assert_eq!(fiscal.len(), 1);
        assert_eq!(fiscal[0].email, "alice@example.com");

        // Search filter, case-insensitive.
        let found = QueryBuilder::list_collaborators(&db, None, Some("BOB"), 50)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].first_name, "Bob");
    }

    #[tokio::test]
    async fn test_department_crud() {
        let db = setup_test_db().await;

        let created = QueryBuilder::create_department(
            &db,
            &DepartmentCreate {
                name: "Fiscal".to_string(),
                slug: DepartmentSlug::new("Fiscal"),
                parent_slug: None,
                sort_order: 1,
            },
        )
        .await
        .unwrap();
        assert_eq!(created.slug.as_str(), "fiscal");

        let found = QueryBuilder::find_department_by_slug(&db, "fiscal")
            .await
            .unwrap();
        assert!(found.is_some());

        // Slug is unique.
        let dup = QueryBuilder::create_department(
            &db,
            &DepartmentCreate {
                name: "Fiscal 2".to_string(),
                slug: DepartmentSlug::new("fiscal"),
                parent_slug: None,
                sort_order: 2,
            },
        )
        .await;
        assert!(dup.is_err());

        assert!(
            QueryBuilder::delete_department(&db, &created.id)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_department_update_merges_partial_fields() {
        let db = setup_test_db().await;

        let created = QueryBuilder::create_department(
            &db,
            &DepartmentCreate {
                name: "Fiscal".to_string(),
                slug: DepartmentSlug::new("fiscal"),
                parent_slug: None,
                sort_order: 1,
            },
        )
        .await
        .unwrap();

        let updated = QueryBuilder::update_department(
            &db,
            &created.id,
            &DepartmentUpdate {
                name: Some("Fiscal & Tax".to_string()),
                sort_order: Some(5),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(updated.name, "Fiscal & Tax");
        assert_eq!(updated.sort_order, 5);
        // The slug is untouched by a partial update.
        assert_eq!(updated.slug.as_str(), "fiscal");
    }

    #[tokio::test]
    async fn test_course_update_merges_partial_fields() {
        let db = setup_test_db().await;

        let created = QueryBuilder::create_course(
            &db,
            &CourseCreate {
                name: "Tax Planning".to_string(),
                slug: CourseSlug::new("tax-planning"),
                department: DepartmentSlug::new("fiscal"),
                hours: Some(8.0),
                points: 10,
                url: None,
            },
        )
        .await
        .unwrap();

        let updated = QueryBuilder::update_course(
            &db,
            &created.id,
            &CourseUpdate {
                points: Some(20),
                url: Some("https://learn.example.com/tax".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(updated.points, 20);
        assert_eq!(updated.url.as_deref(), Some("https://learn.example.com/tax"));
        assert_eq!(updated.name, "Tax Planning");
        assert_eq!(updated.slug.as_str(), "tax-planning");
    }

    #[tokio::test]
    async fn test_announcement_update_toggles_pin() {
        let db = setup_test_db().await;

        let created = QueryBuilder::create_announcement(
            &db,
            &AnnouncementCreate {
                title: "Quarter results".to_string(),
                body_html: None,
                kind: AnnouncementKind::Highlight,
                department: None,
                pinned: false,
                author_id: None,
            },
        )
        .await
        .unwrap();

        let pinned = QueryBuilder::update_announcement(
            &db,
            &created.id,
            &AnnouncementUpdate {
                pinned: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

        assert!(pinned.pinned);
        assert_eq!(pinned.title, "Quarter results");
        assert_eq!(pinned.kind, AnnouncementKind::Highlight);

        // A missing record updates to nothing.
        let ghost = RecordId::from_table_key("announcement", "missing");
        let updated = QueryBuilder::update_announcement(
            &db,
            &ghost,
            &AnnouncementUpdate {
                pinned: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(updated.is_none());
    }

    #[tokio::test]
    async fn test_announcement_listing_scopes_by_department() {
        let db = setup_test_db().await;

        QueryBuilder::create_announcement(
            &db,
            &AnnouncementCreate {
                title: "Welcome aboard".to_string(),
                body_html: Some("<p>Hi!</p>".to_string()),
                kind: AnnouncementKind::NewHire,
                department: None,
                pinned: true,
                author_id: None,
            },
        )
        .await
        .unwrap();

        QueryBuilder::create_announcement(
            &db,
            &AnnouncementCreate {
                title: "Fiscal closing dates".to_string(),
                body_html: None,
                kind: AnnouncementKind::General,
                department: Some(DepartmentSlug::new("fiscal")),
                pinned: false,
                author_id: None,
            },
        )
        .await
        .unwrap();

        QueryBuilder::create_announcement(
            &db,
            &AnnouncementCreate {
                title: "HR only".to_string(),
                body_html: None,
                kind: AnnouncementKind::General,
                department: Some(DepartmentSlug::new("rh")),
                pinned: false,
                author_id: None,
            },
        )
        .await
        .unwrap();

        // Fiscal board: its own post plus the global one, pinned first.
        let fiscal = QueryBuilder::list_announcements(&db, Some("fiscal"))
            .await
            .unwrap();
        assert_eq!(fiscal.len(), 2);
        assert_eq!(fiscal[0].title, "Welcome aboard");

        let all = QueryBuilder::list_announcements(&db, None).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn test_course_progress_toggle_awards_and_revokes_points() {
        let db = setup_test_db().await;

        let user = QueryBuilder::create_user(&db, &user_create("a@example.com", Some("fiscal")))
            .await
            .unwrap();

        let course = QueryBuilder::create_course(
            &db,
            &CourseCreate {
                name: "Tax Planning".to_string(),
                slug: CourseSlug::new("tax-planning"),
                department: DepartmentSlug::new("fiscal"),
                hours: Some(8.0),
                points: 10,
                url: None,
            },
        )
        .await
        .unwrap();

        // Complete: entry added, points awarded.
        let after = QueryBuilder::toggle_course_progress(&db, &user.id, &course)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(after.points, 10);
        assert_eq!(after.course_progress.len(), 1);
        assert!(after.course_progress[0].completed);
        assert!(after.course_progress[0].completed_at.is_some());

        // Toggle back: entry kept, points revoked.
        let after = QueryBuilder::toggle_course_progress(&db, &user.id, &course)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(after.points, 0);
        assert_eq!(after.course_progress.len(), 1);
        assert!(!after.course_progress[0].completed);
        assert!(after.course_progress[0].completed_at.is_none());
    }

    #[tokio::test]
    async fn test_course_listing_by_department() {
        let db = setup_test_db().await;

        for (name, slug, dept) in [
            ("Tax Planning", "tax-planning", "fiscal"),
            ("Onboarding", "onboarding", "rh"),
        ] {
            QueryBuilder::create_course(
                &db,
                &CourseCreate {
                    name: name.to_string(),
                    slug: CourseSlug::new(slug),
                    department: DepartmentSlug::new(dept),
                    hours: None,
                    points: 10,
                    url: None,
                },
            )
            .await
            .unwrap();
        }

        let fiscal = QueryBuilder::list_courses(&db, Some("fiscal")).await.unwrap();
        assert_eq!(fiscal.len(), 1);
        assert_eq!(fiscal[0].slug.as_str(), "tax-planning");

        let all = QueryBuilder::list_courses(&db, None).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_user_store_exposes_credentials() {
        let db = setup_test_db().await;

        let created = QueryBuilder::create_user(&db, &user_create("a@example.com", Some("fiscal")))
            .await
            .unwrap();

        let store = UserStore::new(db);

        let credential = store
            .find_credential("a@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(credential.identifier, "a@example.com");
        assert_eq!(credential.role, Role::Employee);
        assert!(credential.active);
        assert!(credential.password_hash.is_some());

        let by_id = store
            .find_credential_by_id(&created.id.to_string())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_id.id, credential.id);

        assert!(
            store
                .find_credential("nobody@example.com")
                .await
                .unwrap()
                .is_none()
        );
    }
}
