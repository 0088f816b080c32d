//! HTTP chat endpoint around a tool-augmented agent
//!
//! Two routes: the root path serves the static chat page, and the chat path
//! forwards one user message to the agent. Agent failures map to a generic
//! 500 body; details stay in the logs.

use crate::agent::Agent;
use crate::config::Config;
use crate::error::sanitize_error_message;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::path::PathBuf;
use std::sync::Arc;
use warp::Filter;

/// Request body for `POST /chat`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// Success body for `POST /chat`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

/// Failure body for `POST /chat`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatErrorResponse {
    pub error: String,
}

/// HTTP server bridging the static chat page and the agent
pub struct ChatServer {
    agent: Arc<Agent>,
    static_page: PathBuf,
    port: u16,
}

impl ChatServer {
    pub fn new(agent: Arc<Agent>, config: &Config) -> Self {
        Self {
            agent,
            static_page: PathBuf::from(&config.chat_server.static_page),
            port: config.chat_server.port,
        }
    }

    /// Build the route filter served by [`ChatServer::run`]
    pub fn routes(
        &self,
    ) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
        // GET / - static chat page
        let index_route = warp::path::end()
            .and(warp::get())
            .and(warp::fs::file(self.static_page.clone()));

        // POST /chat - one user message in, the agent's answer out
        let chat_agent = self.agent.clone();
        let chat_route = warp::path("chat")
            .and(warp::post())
            .and(warp::body::json())
            .and_then(move |request: ChatRequest| {
                let agent = chat_agent.clone();
                async move {
                    match agent.run(&request.message).await {
                        Ok(messages) => {
                            let response = ChatResponse {
                                response: Agent::final_answer(&messages).to_string(),
                            };
                            Ok::<_, Infallible>(warp::reply::with_status(
                                warp::reply::json(&response),
                                warp::http::StatusCode::OK,
                            ))
                        }
                        Err(e) => {
                            tracing::error!(
                                error = %sanitize_error_message(&e.to_string()),
                                "Agent error"
                            );
                            let response = ChatErrorResponse {
                                error: "Failed to process request".to_string(),
                            };
                            Ok::<_, Infallible>(warp::reply::with_status(
                                warp::reply::json(&response),
                                warp::http::StatusCode::INTERNAL_SERVER_ERROR,
                            ))
                        }
                    }
                }
            });

        index_route.or(chat_route)
    }

    /// Serve until the process is terminated
    pub async fn run(&self) {
        let routes = self.routes();

        tracing::info!("Server is started at {}", self.port);

        warp::serve(routes).run(([0, 0, 0, 0], self.port)).await;
    }
}
