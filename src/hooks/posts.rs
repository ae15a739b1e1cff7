use async_trait::async_trait;

use super::{MutationDef, UseMutation};
use crate::api::ClassroomApi;
use crate::cache::QueryKey;
use crate::errors::Result;
use crate::models::posts::requests::MessageRequest;

#[derive(Debug, Clone)]
pub struct UpdatePostArgs {
    pub post_id: String,
    pub message: String,
}

/// 更新公告内容；班级与公告列表都会展示公告，两者一并失效
pub struct UpdatePost;

#[async_trait]
impl MutationDef for UpdatePost {
    type Args = UpdatePostArgs;
    type Output = ();

    const NAME: &'static str = "update_post";

    async fn call(&self, api: &dyn ClassroomApi, args: &UpdatePostArgs) -> Result<()> {
        api.update_post(&args.post_id, &MessageRequest::new(args.message.clone()))
            .await
    }

    fn invalidates(&self, _: &UpdatePostArgs) -> Vec<QueryKey> {
        vec![QueryKey::classes(), QueryKey::posts()]
    }
}

/// 删除公告，参数为公告ID
pub struct DeletePost;

#[async_trait]
impl MutationDef for DeletePost {
    type Args = String;
    type Output = ();

    const NAME: &'static str = "delete_post";

    async fn call(&self, api: &dyn ClassroomApi, post_id: &String) -> Result<()> {
        api.delete_post(post_id).await
    }

    fn invalidates(&self, _: &String) -> Vec<QueryKey> {
        vec![QueryKey::classes(), QueryKey::posts()]
    }
}

pub type UseUpdatePost = UseMutation<UpdatePost>;
pub type UseDeletePost = UseMutation<DeletePost>;
