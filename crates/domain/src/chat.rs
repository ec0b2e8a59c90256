//! # 農業相談チャット
//!
//! チャットの 1 往復（質問と回答）を [`ChatTurn`] として記録する。
//! セッション ID はクライアントが採番し、ユーザーごとに履歴を分離する。

use chrono::{DateTime, Utc};

use crate::user::UserId;

define_serial_id! {
   /// 質問 ID
   pub struct ChatTurnId;
}

define_validated_string! {
   /// チャットセッション ID（クライアント採番、最大 36 文字）
   pub struct ChatSessionId {
      label: "session_id",
      max_length: 36,
   }
}

/// 過去の 1 往復（回答生成時の文脈として渡す）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatExchange {
   pub question: String,
   pub answer:   String,
}

/// チャット記録の作成内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewChatTurn {
   pub user_id:      UserId,
   pub session_id:   ChatSessionId,
   pub session_name: String,
   pub question:     String,
   pub answer:       String,
   pub created_at:   DateTime<Utc>,
}

/// チャット記録
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
   id:           ChatTurnId,
   user_id:      UserId,
   session_id:   ChatSessionId,
   session_name: String,
   question:     String,
   answer:       String,
   created_at:   DateTime<Utc>,
}

impl ChatTurn {
   pub fn new(id: ChatTurnId, input: NewChatTurn) -> Self {
      Self {
         id,
         user_id: input.user_id,
         session_id: input.session_id,
         session_name: input.session_name,
         question: input.question,
         answer: input.answer,
         created_at: input.created_at,
      }
   }

   pub fn id(&self) -> ChatTurnId {
      self.id
   }

   pub fn user_id(&self) -> UserId {
      self.user_id
   }

   pub fn session_id(&self) -> &ChatSessionId {
      &self.session_id
   }

   pub fn session_name(&self) -> &str {
      &self.session_name
   }

   pub fn question(&self) -> &str {
      &self.question
   }

   pub fn answer(&self) -> &str {
      &self.answer
   }

   pub fn created_at(&self) -> DateTime<Utc> {
      self.created_at
   }

   pub fn to_exchange(&self) -> ChatExchange {
      ChatExchange {
         question: self.question.clone(),
         answer:   self.answer.clone(),
      }
   }
}

/// セッション一覧の 1 行
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChatSessionSummary {
   pub session_id:   ChatSessionId,
   pub session_name: String,
}
