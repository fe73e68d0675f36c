use bson::doc;
use futures_util::TryStreamExt;
use mongodb::ClientSession;
use mongodb::options::FindOptions;

use super::{
    MongoStorage,
    documents::{AssignmentDocument, CourseDocument, SubmissionDocument},
};
use crate::errors::Result;
use crate::models::courses::entities::Course;
use crate::storage::DeleteOutcome;

impl MongoStorage {
    pub async fn create_course_impl(&self, course: Course) -> Result<Course> {
        let document = CourseDocument::from(course);
        self.courses().insert_one(&document, None).await?;
        Ok(document.into_course())
    }

    pub async fn get_course_by_id_impl(&self, id: &str) -> Result<Option<Course>> {
        let result = self.courses().find_one(doc! { "_id": id }, None).await?;
        Ok(result.map(CourseDocument::into_course))
    }

    pub async fn list_courses_impl(&self, teacher_id: Option<&str>) -> Result<Vec<Course>> {
        let filter = match teacher_id {
            Some(teacher_id) => doc! { "teacher_id": teacher_id },
            None => doc! {},
        };
        self.find_courses(filter).await
    }

    pub async fn list_courses_by_ids_impl(&self, ids: &[String]) -> Result<Vec<Course>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.find_courses(doc! { "_id": { "$in": ids.to_vec() } })
            .await
    }

    async fn find_courses(&self, filter: bson::Document) -> Result<Vec<Course>> {
        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1, "_id": 1 })
            .build();
        let cursor = self.courses().find(filter, options).await?;
        let documents: Vec<CourseDocument> = cursor.try_collect().await?;
        Ok(documents.into_iter().map(CourseDocument::into_course).collect())
    }

    /// 在事务中删除课程及其作业、提交和选课记录
    pub async fn delete_course_impl(&self, id: &str) -> Result<DeleteOutcome> {
        let mut session = self.begin().await?;
        let result = self.delete_course_in_session(id, &mut session).await;
        Self::finish(session, result).await
    }

    async fn delete_course_in_session(
        &self,
        id: &str,
        session: &mut ClientSession,
    ) -> Result<DeleteOutcome> {
        if self
            .courses()
            .find_one_with_session(doc! { "_id": id }, None, session)
            .await?
            .is_none()
        {
            return Ok(DeleteOutcome::not_found());
        }

        let mut attachments = Vec::new();
        let mut assignment_ids = Vec::new();
        let mut cursor = self
            .assignments()
            .find_with_session(doc! { "course_id": id }, None, session)
            .await?;
        while let Some(assignment) = cursor.next(session).await {
            let assignment: AssignmentDocument = assignment?;
            attachments.extend(assignment.attachment_url);
            assignment_ids.push(assignment.id);
        }

        if !assignment_ids.is_empty() {
            let filter = doc! { "assignment_id": { "$in": assignment_ids } };
            let mut cursor = self
                .submissions()
                .find_with_session(filter.clone(), None, session)
                .await?;
            while let Some(submission) = cursor.next(session).await {
                let submission: SubmissionDocument = submission?;
                attachments.push(submission.attachment_url);
            }
            self.submissions()
                .delete_many_with_session(filter, None, session)
                .await?;
        }

        self.assignments()
            .delete_many_with_session(doc! { "course_id": id }, None, session)
            .await?;
        self.enrollments()
            .delete_many_with_session(doc! { "course_id": id }, None, session)
            .await?;
        let result = self
            .courses()
            .delete_one_with_session(doc! { "_id": id }, None, session)
            .await?;

        Ok(DeleteOutcome {
            deleted: result.deleted_count > 0,
            attachments,
        })
    }
}
