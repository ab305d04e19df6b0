//! # Taskboard Client Library
//!
//! Client side of the task board: a typed API client and the application
//! state it feeds.
//!
//! ## Modules
//!
//! - `api`: request types, the [`api::TaskboardApi`] trait and its HTTP client
//! - `error`: [`error::ClientError`] and user-facing messages
//! - `state`: [`state::BoardState`], fetch states and outcomes
//! - `actions`: cancellable operations that call the API and update state
//! - `mock`: in-process API over a memory store
//!
//! ## Example
//!
//! ```no_run
//! use taskboard_client::{actions, api::HttpClient, state::BoardState};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let api = HttpClient::new("http://localhost:8080")?.with_token("eyJ...");
//! let mut board = BoardState::new();
//! let cancel = CancellationToken::new();
//!
//! actions::load_projects(&api, &mut board, "user-42", &cancel).await;
//! if let Some(project_id) = board.current_project_id.clone() {
//!     actions::load_tasks(&api, &mut board, &project_id, &cancel).await;
//! }
//! # Ok(())
//! # }
//! ```

pub mod actions;
pub mod api;
pub mod error;
pub mod mock;
pub mod state;
