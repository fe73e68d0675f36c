use bson::{Document, doc};
use futures_util::TryStreamExt;
use mongodb::options::FindOptions;

use super::{MongoStorage, documents::EnrollmentDocument, map_duplicate};
use crate::errors::{ClassroomError, Result};
use crate::models::enrollments::entities::Enrollment;

impl MongoStorage {
    pub async fn create_enrollment_impl(&self, enrollment: Enrollment) -> Result<Enrollment> {
        let document = EnrollmentDocument::from(enrollment);
        self.enrollments()
            .insert_one(&document, None)
            .await
            .map_err(|e| {
                map_duplicate(e, || {
                    ClassroomError::already_enrolled("Already enrolled in this course")
                })
            })?;

        Ok(document.into_enrollment())
    }

    pub async fn get_enrollment_impl(
        &self,
        student_id: &str,
        course_id: &str,
    ) -> Result<Option<Enrollment>> {
        let result = self
            .enrollments()
            .find_one(doc! { "student_id": student_id, "course_id": course_id }, None)
            .await?;
        Ok(result.map(EnrollmentDocument::into_enrollment))
    }

    pub async fn delete_enrollment_impl(&self, student_id: &str, course_id: &str) -> Result<bool> {
        let result = self
            .enrollments()
            .delete_one(doc! { "student_id": student_id, "course_id": course_id }, None)
            .await?;
        Ok(result.deleted_count > 0)
    }

    pub async fn list_enrollments_impl(&self, filter: Document) -> Result<Vec<Enrollment>> {
        let options = FindOptions::builder().sort(doc! { "enrolled_at": 1 }).build();
        let cursor = self.enrollments().find(filter, options).await?;
        let documents: Vec<EnrollmentDocument> = cursor.try_collect().await?;
        Ok(documents
            .into_iter()
            .map(EnrollmentDocument::into_enrollment)
            .collect())
    }
}
