// Data models shared by the API, the session store and the event stream

pub mod agent;
pub mod idea;
pub mod search;
pub mod session;
pub mod state_machine;
pub mod user;

pub use agent::{AgentLog, AgentMessage, AgentRole};
pub use idea::BusinessIdea;
pub use search::{SearchType, WebSearchQuery, WebSearchResult};
pub use session::{CreateSessionInput, IdeationSession, SessionStatus, UpdateSessionInput};
pub use user::{CreateUserInput, User};
