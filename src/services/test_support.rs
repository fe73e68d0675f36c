//! 业务层测试辅助：内存 SQLite 存储 + 临时附件目录

use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::models::{
    assignments::{entities::Assignment, requests::CreateAssignmentRequest},
    auth::RegisterRequest,
    courses::{entities::Course, requests::CreateCourseRequest},
    users::entities::User,
};
use crate::services::{assignments::create, auth::register, courses};
use crate::storage::{AttachmentStore, Storage, sea_orm_storage::SeaOrmStorage};
use crate::utils::multipart::PendingFile;

pub const PASSWORD: &str = "password123";

pub fn register_request(email: &str, name: &str, role: &str) -> RegisterRequest {
    RegisterRequest {
        email: email.to_string(),
        name: name.to_string(),
        role: role.to_string(),
        password: PASSWORD.to_string(),
    }
}

pub fn text_file(content: &str) -> PendingFile {
    PendingFile::new(
        "answer.txt",
        Some("text/plain".to_string()),
        content.as_bytes().to_vec(),
    )
}

pub struct TestContext {
    pub storage: Arc<dyn Storage>,
    pub attachments: AttachmentStore,
}

impl TestContext {
    pub async fn new() -> Self {
        let storage = SeaOrmStorage::in_memory()
            .await
            .expect("in-memory storage should start");
        let attachments = AttachmentStore::new(
            std::env::temp_dir().join(format!("classroom-test-{}", uuid::Uuid::new_v4())),
        );
        Self {
            storage: Arc::new(storage),
            attachments,
        }
    }

    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    async fn user(&self, email: &str, role: &str) -> User {
        let name = email.split('@').next().unwrap_or(email);
        let (_, user) = register::register(self.storage(), register_request(email, name, role))
            .await
            .expect("registration should succeed");
        user
    }

    pub async fn teacher(&self, email: &str) -> User {
        self.user(email, "teacher").await
    }

    pub async fn student(&self, email: &str) -> User {
        self.user(email, "student").await
    }

    pub async fn course(&self, teacher: &User, title: &str) -> Course {
        courses::create::create_course(
            self.storage(),
            teacher,
            CreateCourseRequest {
                title: title.to_string(),
                description: format!("{title} description"),
            },
        )
        .await
        .expect("course creation should succeed")
    }

    pub async fn assignment(&self, teacher: &User, course: &Course, total_points: i32) -> Assignment {
        create::create_assignment(
            self.storage(),
            &self.attachments,
            teacher,
            CreateAssignmentRequest {
                course_id: course.id.clone(),
                title: "Homework".to_string(),
                description: "Solve the problems".to_string(),
                due_date: (Utc::now() + Duration::days(7)).to_rfc3339(),
                total_points,
            },
            None,
        )
        .await
        .expect("assignment creation should succeed")
    }
}
