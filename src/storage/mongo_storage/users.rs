use bson::{Document, doc};
use futures_util::TryStreamExt;
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument};

use super::{MongoStorage, documents::UserDocument, map_duplicate};
use crate::errors::{ClassroomError, Result};
use crate::models::users::{entities::User, requests::UpdateUserRequest};

impl MongoStorage {
    pub async fn create_user_impl(&self, user: User) -> Result<User> {
        let document = UserDocument::from(user);
        self.users()
            .insert_one(&document, None)
            .await
            .map_err(|e| {
                map_duplicate(e, || {
                    ClassroomError::duplicate_email("Email already registered")
                })
            })?;

        document.into_user()
    }

    pub async fn get_user_by_id_impl(&self, id: &str) -> Result<Option<User>> {
        let result = self.users().find_one(doc! { "_id": id }, None).await?;
        result.map(UserDocument::into_user).transpose()
    }

    pub async fn get_user_by_email_impl(&self, email: &str) -> Result<Option<User>> {
        let result = self.users().find_one(doc! { "email": email }, None).await?;
        result.map(UserDocument::into_user).transpose()
    }

    pub async fn list_users_by_ids_impl(&self, ids: &[String]) -> Result<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let options = FindOptions::builder().sort(doc! { "name": 1 }).build();
        let cursor = self
            .users()
            .find(doc! { "_id": { "$in": ids.to_vec() } }, options)
            .await?;
        let documents: Vec<UserDocument> = cursor.try_collect().await?;

        documents.into_iter().map(UserDocument::into_user).collect()
    }

    pub async fn update_user_impl(&self, id: &str, update: UpdateUserRequest) -> Result<Option<User>> {
        let mut set = Document::new();
        if let Some(name) = update.name {
            set.insert("name", name);
        }
        if let Some(password_hash) = update.password_hash {
            set.insert("password_hash", password_hash);
        }

        if set.is_empty() {
            return self.get_user_by_id_impl(id).await;
        }

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        let result = self
            .users()
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": set }, options)
            .await?;

        result.map(UserDocument::into_user).transpose()
    }
}
