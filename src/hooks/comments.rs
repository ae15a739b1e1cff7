use async_trait::async_trait;

use super::{MutationDef, QueryDef, UseMutation, UseQuery};
use crate::api::ClassroomApi;
use crate::cache::QueryKey;
use crate::errors::Result;
use crate::models::{comments::entities::Comment, posts::requests::MessageRequest};

/// 某条公告下的全部评论
pub struct GetComments {
    pub post_id: String,
}

#[async_trait]
impl QueryDef for GetComments {
    type Data = Vec<Comment>;

    const NAME: &'static str = "get_comments";

    fn key(&self) -> QueryKey {
        QueryKey::comments(&self.post_id)
    }

    fn enabled(&self) -> bool {
        !self.post_id.is_empty()
    }

    fn initial_data(&self) -> Option<Vec<Comment>> {
        Some(Vec::new())
    }

    async fn fetch(&self, api: &dyn ClassroomApi) -> Result<Vec<Comment>> {
        api.list_comments(&self.post_id).await
    }
}

#[derive(Debug, Clone)]
pub struct CreateCommentArgs {
    pub post_id: String,
    pub message: String,
}

pub struct CreateComment;

#[async_trait]
impl MutationDef for CreateComment {
    type Args = CreateCommentArgs;
    type Output = ();

    const NAME: &'static str = "create_comment";

    async fn call(&self, api: &dyn ClassroomApi, args: &CreateCommentArgs) -> Result<()> {
        api.create_comment(&args.post_id, &MessageRequest::new(args.message.clone()))
            .await
    }

    fn invalidates(&self, args: &CreateCommentArgs) -> Vec<QueryKey> {
        vec![QueryKey::comments(&args.post_id)]
    }
}

#[derive(Debug, Clone)]
pub struct UpdateCommentArgs {
    pub comment_id: String,
    pub message: String,
}

/// 更新评论；不知道评论属于哪条公告，失效全部评论
pub struct UpdateComment;

#[async_trait]
impl MutationDef for UpdateComment {
    type Args = UpdateCommentArgs;
    type Output = ();

    const NAME: &'static str = "update_comment";

    async fn call(&self, api: &dyn ClassroomApi, args: &UpdateCommentArgs) -> Result<()> {
        api.update_comment(&args.comment_id, &MessageRequest::new(args.message.clone()))
            .await
    }

    fn invalidates(&self, _: &UpdateCommentArgs) -> Vec<QueryKey> {
        vec![QueryKey::all_comments()]
    }
}

/// 删除评论，参数为评论ID
pub struct DeleteComment;

#[async_trait]
impl MutationDef for DeleteComment {
    type Args = String;
    type Output = ();

    const NAME: &'static str = "delete_comment";

    async fn call(&self, api: &dyn ClassroomApi, comment_id: &String) -> Result<()> {
        api.delete_comment(comment_id).await
    }

    fn invalidates(&self, _: &String) -> Vec<QueryKey> {
        vec![QueryKey::all_comments()]
    }
}

pub type UseGetComments = UseQuery<GetComments>;
pub type UseCreateComment = UseMutation<CreateComment>;
pub type UseUpdateComment = UseMutation<UpdateComment>;
pub type UseDeleteComment = UseMutation<DeleteComment>;
