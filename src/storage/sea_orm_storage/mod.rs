//! SeaORM 存储实现
//!
//! 关系型数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod assignments;
mod courses;
mod enrollments;
mod submissions;
mod users;

use crate::config::AppConfig;
use crate::errors::{ClassroomError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr, SqlErr};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 根据全局配置创建存储实例并运行迁移
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(&config.database.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite:") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        Self::migrate(&db).await?;
        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self { db })
    }

    /// 内存 SQLite 数据库，只保留一个常驻连接
    pub async fn in_memory() -> Result<Self> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| ClassroomError::database_config(format!("SQLite URL 解析失败: {e}")))?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(opt)
            .await
            .map_err(|e| ClassroomError::database_connection(format!("SQLite 连接失败: {e}")))?;

        let db = SqlxSqliteConnector::from_sqlx_sqlite_pool(pool);
        Self::migrate(&db).await?;
        Ok(Self { db })
    }

    async fn migrate(db: &DatabaseConnection) -> Result<()> {
        Migrator::up(db, None)
            .await
            .map_err(|e| ClassroomError::database_operation(format!("数据库迁移失败: {e}")))
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| ClassroomError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.database.pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| ClassroomError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.database.pool_size)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(config.database.timeout))
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| ClassroomError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite:") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") {
            Ok(format!("sqlite://{url}?mode=rwc"))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(ClassroomError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

/// 唯一索引冲突转换为对应的业务错误，其余错误按数据库错误处理
pub(crate) fn map_unique_violation(
    err: DbErr,
    context: &str,
    on_conflict: impl FnOnce() -> ClassroomError,
) -> ClassroomError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => on_conflict(),
        _ => ClassroomError::database_operation(format!("{context}: {err}")),
    }
}

pub(crate) fn db_error(context: &str) -> impl FnOnce(DbErr) -> ClassroomError + '_ {
    move |e| ClassroomError::database_operation(format!("{context}: {e}"))
}

// Storage trait 实现
use crate::models::{
    assignments::entities::Assignment,
    courses::entities::Course,
    enrollments::entities::Enrollment,
    submissions::entities::Submission,
    users::{entities::User, requests::UpdateUserRequest},
};
use crate::storage::{DeleteOutcome, Storage};
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    fn backend_name(&self) -> &'static str {
        crate::storage::register::SEA_ORM_BACKEND
    }

    // 用户模块
    async fn create_user(&self, user: User) -> Result<User> {
        self.create_user_impl(user).await
    }

    async fn get_user_by_id(&self, id: &str) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.get_user_by_email_impl(email).await
    }

    async fn list_users_by_ids(&self, ids: &[String]) -> Result<Vec<User>> {
        self.list_users_by_ids_impl(ids).await
    }

    async fn update_user(&self, id: &str, update: UpdateUserRequest) -> Result<Option<User>> {
        self.update_user_impl(id, update).await
    }

    // 课程模块
    async fn create_course(&self, course: Course) -> Result<Course> {
        self.create_course_impl(course).await
    }

    async fn get_course_by_id(&self, id: &str) -> Result<Option<Course>> {
        self.get_course_by_id_impl(id).await
    }

    async fn list_courses(&self, teacher_id: Option<&str>) -> Result<Vec<Course>> {
        self.list_courses_impl(teacher_id).await
    }

    async fn list_courses_by_ids(&self, ids: &[String]) -> Result<Vec<Course>> {
        self.list_courses_by_ids_impl(ids).await
    }

    async fn delete_course(&self, id: &str) -> Result<DeleteOutcome> {
        self.delete_course_impl(id).await
    }

    // 选课模块
    async fn create_enrollment(&self, enrollment: Enrollment) -> Result<Enrollment> {
        self.create_enrollment_impl(enrollment).await
    }

    async fn get_enrollment(
        &self,
        student_id: &str,
        course_id: &str,
    ) -> Result<Option<Enrollment>> {
        self.get_enrollment_impl(student_id, course_id).await
    }

    async fn delete_enrollment(&self, student_id: &str, course_id: &str) -> Result<bool> {
        self.delete_enrollment_impl(student_id, course_id).await
    }

    async fn list_enrollments_by_student(&self, student_id: &str) -> Result<Vec<Enrollment>> {
        self.list_enrollments_by_student_impl(student_id).await
    }

    async fn list_enrollments_by_course(&self, course_id: &str) -> Result<Vec<Enrollment>> {
        self.list_enrollments_by_course_impl(course_id).await
    }

    // 作业模块
    async fn create_assignment(&self, assignment: Assignment) -> Result<Assignment> {
        self.create_assignment_impl(assignment).await
    }

    async fn get_assignment_by_id(&self, id: &str) -> Result<Option<Assignment>> {
        self.get_assignment_by_id_impl(id).await
    }

    async fn list_assignments_by_course(&self, course_id: &str) -> Result<Vec<Assignment>> {
        self.list_assignments_by_course_impl(course_id).await
    }

    async fn delete_assignment(&self, id: &str) -> Result<DeleteOutcome> {
        self.delete_assignment_impl(id).await
    }

    // 提交模块
    async fn create_submission(&self, submission: Submission) -> Result<Submission> {
        self.create_submission_impl(submission).await
    }

    async fn get_submission_by_id(&self, id: &str) -> Result<Option<Submission>> {
        self.get_submission_by_id_impl(id).await
    }

    async fn get_submission_by_assignment_and_student(
        &self,
        assignment_id: &str,
        student_id: &str,
    ) -> Result<Option<Submission>> {
        self.get_submission_by_assignment_and_student_impl(assignment_id, student_id)
            .await
    }

    async fn list_submissions_by_assignment(
        &self,
        assignment_id: &str,
        student_id: Option<&str>,
    ) -> Result<Vec<Submission>> {
        self.list_submissions_by_assignment_impl(assignment_id, student_id)
            .await
    }

    async fn grade_submission(
        &self,
        id: &str,
        grade: i32,
        feedback: Option<String>,
    ) -> Result<Option<Submission>> {
        self.grade_submission_impl(id, grade, feedback).await
    }
}
