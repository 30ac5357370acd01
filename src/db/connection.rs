use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;
use surrealdb::Surreal;
use surrealdb::engine::any::Any;
use surrealdb::opt::auth::Root;

pub type Db = Surreal<Any>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub namespace: String,
    pub database: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: env::var("INTRANET_DB_URL").unwrap_or_else(|_| "memory".to_string()),
            namespace: env::var("INTRANET_DB_NAMESPACE")
                .unwrap_or_else(|_| "intranet".to_string()),
            database: env::var("INTRANET_DB_DATABASE")
                .unwrap_or_else(|_| "backend".to_string()),
            username: env::var("INTRANET_DB_USERNAME").ok(),
            password: env::var("INTRANET_DB_PASSWORD").ok(),
        }
    }
}

pub async fn create_connection(config: DatabaseConfig) -> Result<Db> {
    let db = surrealdb::engine::any::connect(config.url).await?;

    // Sign in if credentials are provided
    if let (Some(username), Some(password)) = (config.username, config.password) {
        db.signin(Root {
            username: &username,
            password: &password,
        })
        .await?;
    }

    db.use_ns(config.namespace).use_db(config.database).await?;

    Ok(db)
}

pub async fn ensure_schema(db: &Db) -> Result<()> {
    let schema_queries = vec![
        // Accounts and profiles. SCHEMALESS because profile fields keep
        // growing; the indexed fields are declared explicitly.
        "DEFINE TABLE user SCHEMALESS;
         DEFINE FIELD first_name ON TABLE user TYPE string;
         DEFINE FIELD last_name ON TABLE user TYPE string;
         DEFINE FIELD email ON TABLE user TYPE string;
         DEFINE FIELD password_hash ON TABLE user TYPE option<string>;
         DEFINE FIELD role ON TABLE user TYPE string;
         DEFINE FIELD department ON TABLE user TYPE option<string>;
         DEFINE FIELD avatar_url ON TABLE user TYPE option<string>;
         DEFINE FIELD bio ON TABLE user TYPE option<string>;
         DEFINE FIELD points ON TABLE user TYPE number DEFAULT 0;
         DEFINE FIELD course_progress ON TABLE user TYPE array DEFAULT [];
         DEFINE FIELD active ON TABLE user TYPE bool DEFAULT true;
         DEFINE FIELD created_at ON TABLE user VALUE time::now();
         DEFINE FIELD updated_at ON TABLE user VALUE time::now();",

        // Department hierarchy
        "DEFINE TABLE department SCHEMAFULL;
         DEFINE FIELD name ON TABLE department TYPE string;
         DEFINE FIELD slug ON TABLE department TYPE string;
         DEFINE FIELD parent_slug ON TABLE department TYPE option<string>;
         DEFINE FIELD sort_order ON TABLE department TYPE number DEFAULT 0;
         DEFINE FIELD active ON TABLE department TYPE bool DEFAULT true;
         DEFINE FIELD created_at ON TABLE department VALUE time::now();
         DEFINE FIELD updated_at ON TABLE department VALUE time::now();",

        // Announcements (mural posts, highlights, new-hire welcomes, ...)
        "DEFINE TABLE announcement SCHEMAFULL;
         DEFINE FIELD title ON TABLE announcement TYPE string;
         DEFINE FIELD body_html ON TABLE announcement TYPE option<string>;
         DEFINE FIELD kind ON TABLE announcement TYPE string DEFAULT 'general';
         DEFINE FIELD department ON TABLE announcement TYPE option<string>;
         DEFINE FIELD pinned ON TABLE announcement TYPE bool DEFAULT false;
         DEFINE FIELD author_id ON TABLE announcement TYPE option<record<user>>;
         DEFINE FIELD created_at ON TABLE announcement VALUE time::now();
         DEFINE FIELD updated_at ON TABLE announcement VALUE time::now();",

        // Course catalog
        "DEFINE TABLE course SCHEMAFULL;
         DEFINE FIELD name ON TABLE course TYPE string;
         DEFINE FIELD slug ON TABLE course TYPE string;
         DEFINE FIELD department ON TABLE course TYPE string;
         DEFINE FIELD hours ON TABLE course TYPE option<float>;
         DEFINE FIELD points ON TABLE course TYPE number DEFAULT 10;
         DEFINE FIELD url ON TABLE course TYPE option<string>;
         DEFINE FIELD active ON TABLE course TYPE bool DEFAULT true;
         DEFINE FIELD created_at ON TABLE course VALUE time::now();
         DEFINE FIELD updated_at ON TABLE course VALUE time::now();",

        // Indexes. Login identity and slugs must be unique.
        "DEFINE INDEX user_email ON TABLE user COLUMNS email UNIQUE;
         DEFINE INDEX user_department ON TABLE user COLUMNS department;
         DEFINE INDEX department_slug ON TABLE department COLUMNS slug UNIQUE;
         DEFINE INDEX course_slug ON TABLE course COLUMNS slug UNIQUE;
         DEFINE INDEX announcement_kind ON TABLE announcement COLUMNS kind;",
    ];

    for query in schema_queries {
        db.query(query).await?;
    }

    Ok(())
}
