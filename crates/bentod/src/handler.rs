//! Command dispatch
//!
//! Every data command is executed for the owner behind the request token.
//! The request never names an owner itself.

use bento_api::{
    Command, ErrorCode, ErrorInfo, Identity, Request, Response, ResponsePayload, API_VERSION,
};
use bento_store::{Repositories, StoreError, StoreResult};
use bento_util::SessionToken;
use tracing::{debug, error};

/// Executes protocol commands against the store
pub struct CommandHandler {
    repos: Repositories,
}

impl CommandHandler {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    pub async fn handle(&self, request: Request) -> Response {
        let request_id = request.request_id;

        if request.api_version != API_VERSION {
            return Response::error(
                request_id,
                ErrorInfo::new(
                    ErrorCode::UnsupportedVersion,
                    format!(
                        "API version {} not supported (expected {})",
                        request.api_version, API_VERSION
                    ),
                ),
            );
        }

        match self.dispatch(request.token, request.command).await {
            Ok(payload) => Response::success(request_id, payload),
            Err(e) => {
                if matches!(e, StoreError::Database(_) | StoreError::Io(_) | StoreError::Serialization(_)) {
                    error!(request_id, error = %e, "Store failure");
                } else {
                    debug!(request_id, error = %e, "Request rejected");
                }
                Response::error(request_id, error_info(&e))
            }
        }
    }

    async fn dispatch(&self, token: Option<SessionToken>, command: Command) -> StoreResult<ResponsePayload> {
        match command {
            Command::Ping => Ok(ResponsePayload::Pong),

            Command::Register { credentials } => {
                let grant = self.repos.identity.register(&credentials).await?;
                Ok(ResponsePayload::Session { grant })
            }

            Command::SignIn { credentials } => {
                let grant = self.repos.identity.sign_in(&credentials).await?;
                Ok(ResponsePayload::Session { grant })
            }

            command => {
                let token = token.ok_or(StoreError::Unauthenticated)?;
                let identity = self.repos.identity.resolve(&token).await?;
                self.dispatch_for(&token, identity, command).await
            }
        }
    }

    /// Commands that run on behalf of a resolved session
    async fn dispatch_for(
        &self,
        token: &SessionToken,
        identity: Identity,
        command: Command,
    ) -> StoreResult<ResponsePayload> {
        let owner = &identity.owner_id;
        debug!(owner_id = %owner, command = command_name(&command), "Dispatching");

        match command {
            Command::ResolveSession => Ok(ResponsePayload::Identity { identity }),

            Command::SignOut => {
                self.repos.identity.sign_out(token).await?;
                Ok(ResponsePayload::SignedOut)
            }

            Command::ListTodos => {
                let todos = self.repos.todos.list_by_owner(owner).await?;
                Ok(ResponsePayload::Todos { todos })
            }

            Command::CreateTodo { todo } => {
                let todo = self.repos.todos.create(owner, todo).await?;
                Ok(ResponsePayload::Todo { todo })
            }

            Command::UpdateTodo { id, patch } => {
                let todo = self.repos.todos.update(owner, &id, patch).await?;
                Ok(ResponsePayload::Todo { todo })
            }

            Command::DeleteTodo { id } => {
                self.repos.todos.delete(owner, &id).await?;
                Ok(ResponsePayload::Deleted)
            }

            Command::ListJournal => {
                let entries = self.repos.journal.list_by_owner(owner).await?;
                Ok(ResponsePayload::JournalEntries { entries })
            }

            Command::FindJournal { date } => {
                let entry = self.repos.journal.find_by_date(owner, date).await?;
                Ok(ResponsePayload::JournalLookup { entry })
            }

            Command::CreateJournal { date, content } => {
                let entry = self.repos.journal.create(owner, date, content).await?;
                Ok(ResponsePayload::JournalEntry { entry })
            }

            Command::UpdateJournal { id, content } => {
                let entry = self.repos.journal.update(owner, &id, content).await?;
                Ok(ResponsePayload::JournalEntry { entry })
            }

            Command::DeleteJournal { id } => {
                self.repos.journal.delete(owner, &id).await?;
                Ok(ResponsePayload::Deleted)
            }

            Command::Ping | Command::Register { .. } | Command::SignIn { .. } => Err(
                StoreError::Validation("command does not take a session".into()),
            ),
        }
    }
}

/// Short name for logs; never includes credentials or content
fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Register { .. } => "register",
        Command::SignIn { .. } => "sign_in",
        Command::ResolveSession => "resolve_session",
        Command::SignOut => "sign_out",
        Command::ListTodos => "list_todos",
        Command::CreateTodo { .. } => "create_todo",
        Command::UpdateTodo { .. } => "update_todo",
        Command::DeleteTodo { .. } => "delete_todo",
        Command::ListJournal => "list_journal",
        Command::FindJournal { .. } => "find_journal",
        Command::CreateJournal { .. } => "create_journal",
        Command::UpdateJournal { .. } => "update_journal",
        Command::DeleteJournal { .. } => "delete_journal",
        Command::Ping => "ping",
    }
}

/// Protocol form of a store error
pub fn error_info(e: &StoreError) -> ErrorInfo {
    match e {
        StoreError::Unauthenticated => ErrorInfo::new(ErrorCode::Unauthenticated, e.to_string()),
        StoreError::InvalidCredentials => {
            ErrorInfo::new(ErrorCode::InvalidCredentials, e.to_string())
        }
        StoreError::NotFound(msg) => ErrorInfo::new(ErrorCode::NotFound, msg.clone()),
        StoreError::Conflict(msg) => ErrorInfo::new(ErrorCode::Conflict, msg.clone()),
        StoreError::Validation(msg) => ErrorInfo::new(ErrorCode::ValidationFailed, msg.clone()),
        StoreError::Database(_) | StoreError::Io(_) | StoreError::Serialization(_) => {
            ErrorInfo::new(ErrorCode::StoreError, e.to_string())
        }
        StoreError::Remote(msg) => ErrorInfo::new(ErrorCode::InternalError, msg.clone()),
    }
}
