use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Identified;

const DAY_MILLIS: i64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    // 作业ID
    #[serde(rename = "_id")]
    pub id: String,
    // 所属班级ID
    #[serde(default)]
    pub class_id: String,
    // 作业标题
    pub title: String,
    // 作业描述
    #[serde(default)]
    pub description: String,
    // 截止时间
    pub due_date: DateTime<Utc>,
}

/// 截止时间紧迫程度，只用于展示
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    Overdue,
    DueSoon { days_left: i64 },
    Normal { days_left: i64 },
}

impl Urgency {
    pub fn label(&self) -> String {
        match self {
            Urgency::Overdue => "OVERDUE".to_string(),
            Urgency::DueSoon { days_left } | Urgency::Normal { days_left } => {
                format!("{days_left} days left")
            }
        }
    }
}

impl Assignment {
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.due_date < now
    }

    /// 剩余天数，向上取整；已过期时为 0 或负数
    pub fn days_left(&self, now: DateTime<Utc>) -> i64 {
        let millis = self.due_date.signed_duration_since(now).num_milliseconds();
        if millis > 0 {
            (millis + DAY_MILLIS - 1) / DAY_MILLIS
        } else {
            millis / DAY_MILLIS
        }
    }

    pub fn urgency(&self, now: DateTime<Utc>) -> Urgency {
        if self.is_overdue(now) {
            return Urgency::Overdue;
        }
        let days_left = self.days_left(now);
        if days_left <= 1 {
            Urgency::DueSoon { days_left }
        } else {
            Urgency::Normal { days_left }
        }
    }
}

impl Identified for Assignment {
    fn id(&self) -> &str {
        &self.id
    }
}
