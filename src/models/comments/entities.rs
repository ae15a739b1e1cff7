use serde::{Deserialize, Serialize};

use crate::models::Identified;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    // 评论ID
    #[serde(rename = "_id")]
    pub id: String,
    // 所属公告ID
    #[serde(default)]
    pub post_id: String,
    // 评论者名称
    #[serde(default)]
    pub user_name: String,
    // 评论内容
    pub message: String,
    // 评论时间
    pub time: chrono::DateTime<chrono::Utc>,
}

impl Identified for Comment {
    fn id(&self) -> &str {
        &self.id
    }
}
