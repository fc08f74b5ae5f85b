#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Router,
};
use serde_json::json;
use world_news_summarizer::error::{AppError, Result};
use world_news_summarizer::llm::{ChatMessage, ChatModel, ChatReply};

/// Hands out canned replies in order and records every request.
#[derive(Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<ChatReply>>>,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply_text(self, text: &str) -> Self {
        self.reply(ChatReply(text_reply(text)))
    }

    pub fn reply(self, reply: ChatReply) -> Self {
        self.replies.lock().unwrap().push_back(Ok(reply));
        self
    }

    pub fn fail(self, err: AppError) -> Self {
        self.replies.lock().unwrap().push_back(Err(err));
        self
    }

    pub fn calls(&self) -> Vec<Vec<ChatMessage>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn chat(&self, messages: Vec<ChatMessage>) -> Result<ChatReply> {
        self.calls.lock().unwrap().push(messages);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AppError::Llm("no scripted reply left".into())))
    }
}

pub fn text_reply(text: &str) -> serde_json::Value {
    json!({
        "id": "test",
        "message": {
            "role": "assistant",
            "content": [{"type": "text", "text": text}]
        },
        "finish_reason": "COMPLETE"
    })
}

#[derive(Clone)]
struct MockState {
    status: u16,
    body: String,
    requests: Arc<Mutex<Vec<SeenRequest>>>,
}

#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub params: HashMap<String, String>,
    pub user_agent: Option<String>,
}

/// A stand-in for the DOC API on an ephemeral local port.
pub struct MockNewsApi {
    pub url: String,
    requests: Arc<Mutex<Vec<SeenRequest>>>,
}

impl MockNewsApi {
    pub async fn start(status: u16, body: impl Into<String>) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            status,
            body: body.into(),
            requests: requests.clone(),
        };
        let app = Router::new()
            .route("/api/v2/doc/doc", get(doc_handler))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0))
            .await
            .unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{}/api/v2/doc/doc", addr),
            requests,
        }
    }

    pub fn requests(&self) -> Vec<SeenRequest> {
        self.requests.lock().unwrap().clone()
    }
}

async fn doc_handler(
    State(state): State<MockState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, String) {
    let user_agent = headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state
        .requests
        .lock()
        .unwrap()
        .push(SeenRequest { params, user_agent });

    (
        StatusCode::from_u16(state.status).unwrap(),
        state.body.clone(),
    )
}

pub fn one_article_body() -> String {
    json!({
        "articles": [{
            "url": "https://www.example.es/barcelona-protesta",
            "url_mobile": "",
            "title": "Miles de personas protestan en Barcelona",
            "seendate": "20201016T083000Z",
            "socialimage": "",
            "domain": "example.es",
            "language": "Spanish",
            "sourcecountry": "Spain"
        }]
    })
    .to_string()
}
