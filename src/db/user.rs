use sqlx::sqlite::SqlitePool;

#[derive(Clone)]
pub struct UserStore {
    pool: SqlitePool,
}

/// User role for authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum UserRole {
    Teacher,
    Student,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Teacher => "Teacher",
            UserRole::Student => "Student",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "Teacher" => UserRole::Teacher,
            _ => UserRole::Student,
        }
    }
}

/// A stored user, including the password hash.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub first_name: Option<String>,
    pub last_name_1: Option<String>,
    pub last_name_2: Option<String>,
    pub phone: Option<String>,
    pub deleted: bool,
    pub created_at: String,
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    password: String,
    role: String,
    first_name: Option<String>,
    last_name_1: Option<String>,
    last_name_2: Option<String>,
    phone: Option<String>,
    deleted: i32,
    created_at: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            email: row.email,
            password_hash: row.password,
            role: UserRole::from_str(&row.role),
            first_name: row.first_name,
            last_name_1: row.last_name_1,
            last_name_2: row.last_name_2,
            phone: row.phone,
            deleted: row.deleted != 0,
            created_at: row.created_at,
        }
    }
}

/// Fields for inserting a user. The password must already be hashed.
#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: UserRole,
    pub first_name: Option<&'a str>,
    pub last_name_1: Option<&'a str>,
    pub last_name_2: Option<&'a str>,
    pub phone: Option<&'a str>,
}

impl UserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new user. Returns the user ID.
    pub async fn create(&self, user: &NewUser<'_>) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO users (username, email, password, role, first_name, last_name_1, last_name_2, phone)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(user.username)
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.role.as_str())
        .bind(user.first_name)
        .bind(user.last_name_1)
        .bind(user.last_name_2)
        .bind(user.phone)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Get an active user by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>, sqlx::Error> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, username, email, password, role, first_name, last_name_1, last_name_2, phone, deleted, created_at
             FROM users WHERE id = ? AND deleted = 0",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    /// Get an active user by username.
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, username, email, password, role, first_name, last_name_1, last_name_2, phone, deleted, created_at
             FROM users WHERE username = ? AND deleted = 0",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    /// Get an active user by (already lowercased) email.
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, username, email, password, role, first_name, last_name_1, last_name_2, phone, deleted, created_at
             FROM users WHERE email = ? AND deleted = 0",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    /// Find any user (soft-deleted included) holding either the email or the username.
    pub async fn find_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, username, email, password, role, first_name, last_name_1, last_name_2, phone, deleted, created_at
             FROM users WHERE email = ? OR username = ? LIMIT 1",
        )
        .bind(email)
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    /// Mark a user as deleted. Their username and email stay reserved.
    #[cfg(test)]
    pub async fn soft_delete(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET deleted = 1 WHERE id = ? AND deleted = 0")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
